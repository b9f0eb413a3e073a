//! Wire types and REST client for the invitation and chat endpoints.
pub mod backend;
pub mod client;
pub mod error;
pub mod ids;
pub mod types;

pub use backend::{BoxFuture, ChatBackend};
pub use client::{ApiClient, DEFAULT_REQUEST_TIMEOUT, Session};
pub use error::{ApiError, ApiResult, FailureKind};
pub use ids::{ChatId, InvitationId, MessageId, UserId};
pub use types::{Invitation, Message, MessageKind, NewInvitation, NewMessage, Sender};
