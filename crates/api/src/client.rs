use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use snafu::ResultExt;
use url::Url;

use super::error::{
    ApiResult, BuildClientSnafu, DecodeSnafu, InvalidBaseUrlSnafu, InvalidTokenSnafu,
    JoinUrlSnafu, StatusSnafu, TransportSnafu, UnauthorizedSnafu,
};
use super::ids::{ChatId, InvitationId, MessageId, UserId};
use super::types::{Invitation, Message, NewInvitation, NewMessage};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const INVITATION_PATH: &str = "invite/invitation";

/// Credentials handed over by whatever owns the login session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub user_id: Option<UserId>,
    pub token: Option<String>,
}

impl Session {
    pub fn new(user_id: Option<UserId>, token: Option<String>) -> Self {
        Self {
            user_id,
            token: token
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Thin REST client for the invitation and chat endpoints.
///
/// Every call is single-shot: no retries, no caching. Non-2xx statuses surface as
/// [`ApiError::Status`](super::ApiError::Status) or
/// [`ApiError::Unauthorized`](super::ApiError::Unauthorized).
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, session: &Session, timeout: Duration) -> ApiResult<Self> {
        let base_url = parse_base_url(base_url)?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &session.token {
            let mut value =
                HeaderValue::from_str(&format!("Bearer {token}")).context(InvalidTokenSnafu {
                    stage: "build-authorization-header",
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context(BuildClientSnafu {
                stage: "build-http-client",
            })?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[tracing::instrument(skip(self, invitation), fields(name = %invitation.name), err)]
    pub async fn create_invitation(&self, invitation: &NewInvitation) -> ApiResult<()> {
        let url = self.endpoint(INVITATION_PATH)?;
        self.execute("create-invitation", self.http.post(url).json(invitation))
            .await?;
        tracing::info!("invitation created");
        Ok(())
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn delete_invitation(&self, id: InvitationId) -> ApiResult<()> {
        let url = self.endpoint(&format!("{INVITATION_PATH}/{id}"))?;
        self.execute("delete-invitation", self.http.delete(url))
            .await?;
        tracing::info!("invitation deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn get_invitation(&self, id: InvitationId) -> ApiResult<Invitation> {
        let url = self.endpoint(&format!("{INVITATION_PATH}/{id}"))?;
        let response = self.execute("get-invitation", self.http.get(url)).await?;
        response.json::<Invitation>().await.context(DecodeSnafu {
            stage: "decode-invitation",
        })
    }

    /// Messages strictly newer than `since_id`, ascending by id.
    #[tracing::instrument(skip(self), err)]
    pub async fn fetch_messages(
        &self,
        chat_id: ChatId,
        since_id: MessageId,
    ) -> ApiResult<Vec<Message>> {
        let url = self.messages_url(chat_id, Some(since_id))?;
        let response = self.execute("fetch-messages", self.http.get(url)).await?;
        let messages = response.json::<Vec<Message>>().await.context(DecodeSnafu {
            stage: "decode-messages",
        })?;
        tracing::debug!(count = messages.len(), "fetched messages");
        Ok(messages)
    }

    #[tracing::instrument(skip(self, content), err)]
    pub async fn post_message(&self, chat_id: ChatId, content: &str) -> ApiResult<()> {
        let url = self.messages_url(chat_id, None)?;
        let body = NewMessage {
            content: content.to_string(),
        };
        self.execute("post-message", self.http.post(url).json(&body))
            .await?;
        Ok(())
    }

    pub(crate) fn endpoint(&self, path: &str) -> ApiResult<Url> {
        self.base_url.join(path).context(JoinUrlSnafu {
            stage: "resolve-endpoint",
            path,
        })
    }

    pub(crate) fn messages_url(
        &self,
        chat_id: ChatId,
        since_id: Option<MessageId>,
    ) -> ApiResult<Url> {
        let mut url = self.endpoint(&format!("chats/{chat_id}/messages"))?;
        if let Some(since_id) = since_id {
            url.query_pairs_mut()
                .append_pair("sinceId", &since_id.to_string());
        }
        Ok(url)
    }

    async fn execute(
        &self,
        stage: &'static str,
        request: reqwest::RequestBuilder,
    ) -> ApiResult<reqwest::Response> {
        let response = request.send().await.context(TransportSnafu { stage })?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return UnauthorizedSnafu {
                stage,
                url: response.url().to_string(),
            }
            .fail();
        }

        if !status.is_success() {
            // The body is only diagnostic, an unreadable one must not mask the status.
            let body = response.text().await.unwrap_or_default();
            return StatusSnafu {
                stage,
                status: status.as_u16(),
                body,
            }
            .fail();
        }

        Ok(response)
    }
}

fn parse_base_url(raw: &str) -> ApiResult<Url> {
    let mut normalized = raw.trim().to_string();
    // `Url::join` drops the last path segment unless the base ends with a slash.
    if !normalized.ends_with('/') {
        normalized.push('/');
    }

    Url::parse(&normalized).context(InvalidBaseUrlSnafu {
        stage: "parse-base-url",
        raw,
    })
}
