use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{InvitationId, MessageId, UserId};

/// Author of a chat message as embedded by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: UserId,
    pub name: String,
}

impl Sender {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Message type tag. Service events carry no authored text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Text,
    InviteCreated,
    UserJoined,
    UserLeft,
    #[serde(other)]
    Unknown,
}

impl MessageKind {
    pub fn is_service(self) -> bool {
        matches!(self, Self::InviteCreated | Self::UserJoined | Self::UserLeft)
    }
}

/// One chat message. `id` doubles as the synchronization cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    /// Epoch milliseconds on the wire.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Message {
    pub fn text(
        id: MessageId,
        sender: Sender,
        created_at: DateTime<Utc>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            sender,
            created_at,
            kind: MessageKind::Text,
            content: Some(content.into()),
        }
    }

    pub fn service(
        id: MessageId,
        sender: Sender,
        created_at: DateTime<Utc>,
        kind: MessageKind,
    ) -> Self {
        Self {
            id,
            sender,
            created_at,
            kind,
            content: None,
        }
    }

    /// Text shown for the message, synthesized for service events.
    pub fn display_text(&self) -> String {
        let name = self.sender.name.as_str();
        match self.kind {
            MessageKind::InviteCreated => format!("{name} created the invitation"),
            MessageKind::UserJoined => format!("{name} joined the chat"),
            MessageKind::UserLeft => format!("{name} left the chat"),
            MessageKind::Text | MessageKind::Unknown => self.content.clone().unwrap_or_default(),
        }
    }

    pub fn is_own(&self, user_id: UserId) -> bool {
        self.sender.id == user_id
    }
}

/// Invitation metadata as stored by the backend. Immutable from the client's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    #[serde(rename = "i_id")]
    pub id: InvitationId,
    #[serde(rename = "u_id")]
    pub owner_id: UserId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Place")]
    pub place: String,
    #[serde(rename = "sp_type")]
    pub sport_type: String,
    #[serde(rename = "DateTime")]
    pub date_time: String,
    #[serde(rename = "Other", default)]
    pub note: String,
}

/// Creation payload for `POST invite/invitation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvitation {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Place")]
    pub place: String,
    #[serde(rename = "sp_type")]
    pub sport_type: String,
    #[serde(rename = "DateTime")]
    pub date_time: String,
    #[serde(rename = "Other")]
    pub note: String,
}

impl NewInvitation {
    pub fn new(
        name: impl Into<String>,
        place: impl Into<String>,
        sport_type: impl Into<String>,
        date_time: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            place: place.into(),
            sport_type: sport_type.into(),
            date_time: date_time.into(),
            note: note.into(),
        }
    }
}

/// Body of `POST chats/{chatId}/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub content: String,
}
