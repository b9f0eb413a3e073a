use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApiError {
    #[snafu(display("api id '{raw}' is invalid for {id_type}"))]
    InvalidId {
        stage: &'static str,
        id_type: &'static str,
        raw: String,
        source: std::num::ParseIntError,
    },
    #[snafu(display("api base url '{raw}' is invalid on `{stage}`: {source}"))]
    InvalidBaseUrl {
        stage: &'static str,
        raw: String,
        source: url::ParseError,
    },
    #[snafu(display("session token cannot be used as a header on `{stage}`"))]
    InvalidToken {
        stage: &'static str,
        source: reqwest::header::InvalidHeaderValue,
    },
    #[snafu(display("failed to build http client on `{stage}`: {source}"))]
    BuildClient {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("failed to resolve endpoint '{path}' on `{stage}`: {source}"))]
    JoinUrl {
        stage: &'static str,
        path: String,
        source: url::ParseError,
    },
    #[snafu(display("request failed on `{stage}`: {source}"))]
    Transport {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("request to {url} was rejected as unauthorized"))]
    Unauthorized { stage: &'static str, url: String },
    #[snafu(display("server returned status {status} on `{stage}`: {body}"))]
    Status {
        stage: &'static str,
        status: u16,
        body: String,
    },
    #[snafu(display("failed to decode response body on `{stage}`: {source}"))]
    Decode {
        stage: &'static str,
        source: reqwest::Error,
    },
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Coarse failure classes the chat page reacts to differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Network unreachable, or the client could not even build the request.
    Transport,
    /// 401, the host is expected to navigate away.
    Unauthorized,
    /// Any other non-2xx status or an unreadable body.
    Server,
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Unauthorized { .. } => FailureKind::Unauthorized,
            Self::Status { .. } | Self::Decode { .. } => FailureKind::Server,
            Self::InvalidId { .. }
            | Self::InvalidBaseUrl { .. }
            | Self::InvalidToken { .. }
            | Self::BuildClient { .. }
            | Self::JoinUrl { .. }
            | Self::Transport { .. } => FailureKind::Transport,
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidId { stage, .. }
            | Self::InvalidBaseUrl { stage, .. }
            | Self::InvalidToken { stage, .. }
            | Self::BuildClient { stage, .. }
            | Self::JoinUrl { stage, .. }
            | Self::Transport { stage, .. }
            | Self::Unauthorized { stage, .. }
            | Self::Status { stage, .. }
            | Self::Decode { stage, .. } => stage,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == FailureKind::Unauthorized
    }
}
