use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::{Local, TimeZone};
use snafu::{OptionExt, ResultExt};
use sportmate_api::{ApiClient, ChatId, Invitation, Message, NewInvitation, UserId};
use sportmate_chat::{ChatEvent, ChatHeader, ChatRoom, Composer};
use sportmate_survey::{SurveyFlow, SurveyForm};
use tracing::{info, warn};

use crate::cli::{ChatCommand, Cli, Commands, ConfigCommand, InviteCommand, SurveyCommand};
use crate::config::AppConfig;
use crate::error::{
    ApiSnafu, AppResult, ConfigExistsSnafu, ConfigSnafu, EmptyMessageSnafu, ParseSurveySnafu,
    ReadSurveySnafu, RenderOutputSnafu, SignalSnafu, SurveyIncompleteSnafu, UnauthorizedSnafu,
};

pub async fn run(cli: Cli, config: AppConfig) -> AppResult<()> {
    let config_path = cli.config_path();
    match cli.command {
        Commands::Invite(sub) => invite(sub.command, &config).await,
        Commands::Chat(sub) => chat(sub.command, &config).await,
        Commands::Survey(sub) => survey(sub.command),
        Commands::Config(sub) => config_command(sub.command, &config, &config_path),
    }
}

fn client(config: &AppConfig) -> AppResult<ApiClient> {
    ApiClient::new(&config.base_url, &config.session(), config.request_timeout()).context(
        ApiSnafu {
            stage: "build-api-client",
        },
    )
}

async fn invite(command: InviteCommand, config: &AppConfig) -> AppResult<()> {
    let client = client(config)?;
    match command {
        InviteCommand::Create {
            name,
            place,
            sport_type,
            date_time,
            note,
        } => {
            let invitation = NewInvitation::new(name, place, sport_type, date_time, note);
            client
                .create_invitation(&invitation)
                .await
                .context(ApiSnafu {
                    stage: "create-invitation",
                })?;
            println!("created invitation '{}'", invitation.name);
        }
        InviteCommand::Delete { id } => {
            client.delete_invitation(id).await.context(ApiSnafu {
                stage: "delete-invitation",
            })?;
            println!("deleted invitation {id}");
        }
        InviteCommand::Show { id } => {
            let invitation = client.get_invitation(id).await.context(ApiSnafu {
                stage: "get-invitation",
            })?;
            print!("{}", format_invitation(&invitation));
        }
    }
    Ok(())
}

async fn chat(command: ChatCommand, config: &AppConfig) -> AppResult<()> {
    let client = client(config)?;
    match command {
        ChatCommand::Watch { chat_id } => watch(client, chat_id, config).await,
        ChatCommand::Send { chat_id, text } => send(&client, chat_id, text).await,
    }
}

async fn watch(client: ApiClient, chat_id: ChatId, config: &AppConfig) -> AppResult<()> {
    let user_id = config.user_id;
    let (room, mut events) = ChatRoom::open(Arc::new(client), chat_id, config.room_config());

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let outcome = loop {
        tokio::select! {
            signal = &mut shutdown => {
                break signal.context(SignalSnafu { stage: "wait-for-ctrl-c" });
            }
            event = events.recv() => match event {
                Some(ChatEvent::HeaderResolved { header, .. }) => {
                    println!("{}", format_header(&header));
                }
                Some(ChatEvent::MessagesAppended { messages, .. }) => {
                    for message in &messages {
                        println!("{}", format_message(message, user_id, &Local));
                    }
                }
                Some(ChatEvent::FetchFailed { failure, .. }) => {
                    eprintln!("! {}", failure.message);
                }
                Some(ChatEvent::Unauthorized { chat_id }) => {
                    break UnauthorizedSnafu { chat_id }.fail();
                }
                Some(_) => {}
                None => break Ok(()),
            },
        }
    };

    room.shutdown().await;
    info!(chat_id = %chat_id, "stopped watching chat");
    outcome
}

async fn send(client: &ApiClient, chat_id: ChatId, text: String) -> AppResult<()> {
    let mut composer = Composer::new();
    composer.set_draft(text);
    let content = composer.begin_send().context(EmptyMessageSnafu {
        stage: "compose-message",
    })?;

    let result = client.post_message(chat_id, &content).await;
    composer.finish_send(result.is_ok());
    if let Err(error) = &result {
        warn!(chat_id = %chat_id, %error, draft = composer.draft(), "message not sent");
    }
    result.context(ApiSnafu {
        stage: "post-message",
    })?;

    println!("sent to chat {chat_id}");
    Ok(())
}

fn survey(command: SurveyCommand) -> AppResult<()> {
    match command {
        SurveyCommand::Check { file } => {
            let raw = std::fs::read_to_string(&file).context(ReadSurveySnafu {
                stage: "read-survey-file",
                path: file.clone(),
            })?;
            let form = serde_json::from_str::<SurveyForm>(&raw).context(ParseSurveySnafu {
                stage: "parse-survey-json",
                path: file,
            })?;

            let mut flow = SurveyFlow::with_form(form);
            let answers = match flow.finish() {
                Ok(answers) => answers,
                Err(error) => {
                    return Err(error).context(SurveyIncompleteSnafu { step: flow.step() });
                }
            };

            let rendered = serde_json::to_string_pretty(&answers).context(RenderOutputSnafu {
                stage: "render-survey-answers",
            })?;
            println!("{rendered}");
            Ok(())
        }
    }
}

fn config_command(command: ConfigCommand, config: &AppConfig, path: &Path) -> AppResult<()> {
    match command {
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return ConfigExistsSnafu {
                    stage: "init-config",
                    path: path.to_path_buf(),
                }
                .fail();
            }
            config.save(path).context(ConfigSnafu)?;
            println!("wrote {}", path.display());
        }
        ConfigCommand::Show => {
            let rendered =
                serde_json::to_string_pretty(&config.masked()).context(RenderOutputSnafu {
                    stage: "render-config",
                })?;
            println!("{rendered}");
        }
    }
    Ok(())
}

fn format_header(header: &ChatHeader) -> String {
    format!(
        "== {} | {} @ {} | {} ==",
        header.title, header.sport_type, header.place, header.date_time
    )
}

fn format_invitation(invitation: &Invitation) -> String {
    let mut rendered = format!(
        "#{} {}\n  sport: {}\n  place: {}\n  time:  {}\n  owner: {}\n",
        invitation.id,
        invitation.name,
        invitation.sport_type,
        invitation.place,
        invitation.date_time,
        invitation.owner_id
    );
    if !invitation.note.trim().is_empty() {
        rendered.push_str(&format!("  note:  {}\n", invitation.note.trim()));
    }
    rendered
}

fn format_message<Tz>(message: &Message, user_id: Option<UserId>, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let time = message.created_at.with_timezone(zone).format("%H:%M");
    if message.kind.is_service() {
        return format!("[{time}] * {}", message.display_text());
    }
    let author = match user_id {
        Some(user_id) if message.is_own(user_id) => "me",
        _ => message.sender.name.as_str(),
    };
    format!("[{time}] {author}: {}", message.display_text())
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};
    use sportmate_api::{InvitationId, MessageId, MessageKind, Sender};

    use super::*;

    fn at(epoch_ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(epoch_ms).unwrap()
    }

    #[test]
    fn times_render_in_the_given_zone() {
        // 2024-03-01T13:05:59Z
        let sender = Sender::new(UserId::new(7), "Kai");
        let message = Message::text(MessageId::new(1), sender, at(1_709_298_359_000), "hi");
        let taipei = FixedOffset::east_opt(8 * 3600).unwrap();

        assert_eq!(format_message(&message, None, &Utc), "[13:05] Kai: hi");
        assert_eq!(format_message(&message, None, &taipei), "[21:05] Kai: hi");
    }

    #[test]
    fn own_messages_are_marked() {
        let sender = Sender::new(UserId::new(7), "Kai");
        let message = Message::text(MessageId::new(1), sender, at(0), "on my way");

        assert_eq!(
            format_message(&message, Some(UserId::new(7)), &Utc),
            "[00:00] me: on my way"
        );
        assert_eq!(
            format_message(&message, Some(UserId::new(8)), &Utc),
            "[00:00] Kai: on my way"
        );
        assert_eq!(format_message(&message, None, &Utc), "[00:00] Kai: on my way");
    }

    #[test]
    fn service_messages_use_derived_text() {
        let sender = Sender::new(UserId::new(3), "Noa");
        let message = Message::service(MessageId::new(2), sender, at(0), MessageKind::UserJoined);

        assert_eq!(format_message(&message, None, &Utc), "[00:00] * Noa joined the chat");
    }

    #[test]
    fn invitation_note_is_optional() {
        let invitation = Invitation {
            id: InvitationId::new(5),
            owner_id: UserId::new(1),
            name: "Friday hoops".to_string(),
            place: "Riverside court".to_string(),
            sport_type: "basketball".to_string(),
            date_time: "2024-05-03 19:00".to_string(),
            note: String::new(),
        };

        let rendered = format_invitation(&invitation);

        assert!(rendered.starts_with("#5 Friday hoops\n"));
        assert!(!rendered.contains("note"));
    }
}
