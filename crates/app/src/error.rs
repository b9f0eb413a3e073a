use std::path::PathBuf;

use snafu::Snafu;
use sportmate_api::{ApiError, ChatId};
use sportmate_survey::{Step, SurveyError};

use crate::config::ConfigError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AppError {
    #[snafu(display("{source}"))]
    Config { source: ConfigError },
    #[snafu(display("config file already exists at {path:?}; pass --force to overwrite"))]
    ConfigExists { stage: &'static str, path: PathBuf },
    #[snafu(display("{source}"))]
    Api { stage: &'static str, source: ApiError },
    #[snafu(display("not authorized to read chat {chat_id}"))]
    Unauthorized { chat_id: ChatId },
    #[snafu(display("message is empty"))]
    EmptyMessage { stage: &'static str },
    #[snafu(display("failed to read survey file {path:?} on `{stage}`: {source}"))]
    ReadSurvey {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("survey file {path:?} is not valid json on `{stage}`: {source}"))]
    ParseSurvey {
        stage: &'static str,
        path: PathBuf,
        source: serde_json::Error,
    },
    #[snafu(display("survey stopped at {step}: {source}"))]
    SurveyIncomplete { step: Step, source: SurveyError },
    #[snafu(display("failed to render output on `{stage}`: {source}"))]
    RenderOutput {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to listen for ctrl-c on `{stage}`: {source}"))]
    Signal {
        stage: &'static str,
        source: std::io::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;
