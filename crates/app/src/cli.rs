use std::path::PathBuf;

use sportmate_api::{ChatId, InvitationId};

use crate::config::AppConfig;

/// Command line client for invitations, chats and the onboarding survey
#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The config file path
    #[clap(long, env = "SPORTMATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Overrides the configured api base url
    #[clap(long)]
    pub base_url: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(AppConfig::default_path)
    }
}

#[derive(Debug, clap::Args)]
pub struct SubCommand<T: clap::Subcommand> {
    #[clap(subcommand)]
    pub command: T,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Invitation commands
    Invite(SubCommand<InviteCommand>),

    /// Chat commands
    Chat(SubCommand<ChatCommand>),

    /// Survey commands
    Survey(SubCommand<SurveyCommand>),

    /// Config commands
    Config(SubCommand<ConfigCommand>),
}

#[derive(Debug, clap::Subcommand)]
pub enum InviteCommand {
    /// Create an invitation
    Create {
        /// The invitation title
        #[clap(long)]
        name: String,

        /// Where the game takes place
        #[clap(long)]
        place: String,

        /// The sport being played
        #[clap(long)]
        sport_type: String,

        /// When the game starts, as the backend expects it
        #[clap(long)]
        date_time: String,

        /// Free-form note
        #[clap(long, default_value = "")]
        note: String,
    },

    /// Delete an invitation
    Delete {
        /// The invitation id
        id: InvitationId,
    },

    /// Show an invitation
    Show {
        /// The invitation id
        id: InvitationId,
    },
}

#[derive(Debug, clap::Subcommand)]
pub enum ChatCommand {
    /// Follow a chat until ctrl-c
    Watch {
        /// The chat id
        chat_id: ChatId,
    },

    /// Post one message to a chat
    Send {
        /// The chat id
        chat_id: ChatId,

        /// The message text
        text: String,
    },
}

#[derive(Debug, clap::Subcommand)]
pub enum SurveyCommand {
    /// Validate a survey json file step by step
    Check {
        /// The survey file path
        file: PathBuf,
    },
}

#[derive(Debug, clap::Subcommand)]
pub enum ConfigCommand {
    /// Write the effective config to the config path
    Init {
        /// Overwrite an existing file
        #[clap(long)]
        force: bool,
    },

    /// Print the effective config
    Show,
}
