use futures::FutureExt;
pub use futures::future::BoxFuture;

use super::client::ApiClient;
use super::error::ApiResult;
use super::ids::{ChatId, InvitationId, MessageId};
use super::types::{Invitation, Message};

/// Remote side of one chat page: message polling, posting, and the invitation behind it.
///
/// Implemented by [`ApiClient`]; tests substitute in-memory fakes.
pub trait ChatBackend: Send + Sync + 'static {
    fn fetch_messages(
        &self,
        chat_id: ChatId,
        since_id: MessageId,
    ) -> BoxFuture<'_, ApiResult<Vec<Message>>>;

    fn post_message(&self, chat_id: ChatId, content: String) -> BoxFuture<'_, ApiResult<()>>;

    fn get_invitation(&self, id: InvitationId) -> BoxFuture<'_, ApiResult<Invitation>>;
}

impl ChatBackend for ApiClient {
    fn fetch_messages(
        &self,
        chat_id: ChatId,
        since_id: MessageId,
    ) -> BoxFuture<'_, ApiResult<Vec<Message>>> {
        ApiClient::fetch_messages(self, chat_id, since_id).boxed()
    }

    fn post_message(&self, chat_id: ChatId, content: String) -> BoxFuture<'_, ApiResult<()>> {
        async move { ApiClient::post_message(self, chat_id, &content).await }.boxed()
    }

    fn get_invitation(&self, id: InvitationId) -> BoxFuture<'_, ApiResult<Invitation>> {
        ApiClient::get_invitation(self, id).boxed()
    }
}
