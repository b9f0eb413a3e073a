use sportmate_api::{ChatId, Invitation, Message, MessageId};

use crate::composer::KeyPress;
use crate::feed::FetchFailure;
use crate::scroll::{FollowState, Viewport};

/// Title bar data for a chat, resolved from its invitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatHeader {
    pub title: String,
    pub place: String,
    pub sport_type: String,
    pub date_time: String,
}

impl From<Invitation> for ChatHeader {
    fn from(invitation: Invitation) -> Self {
        Self {
            title: invitation.name,
            place: invitation.place,
            sport_type: invitation.sport_type,
            date_time: invitation.date_time,
        }
    }
}

/// Everything a chat page renders, published after each state change.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSnapshot {
    pub chat_id: ChatId,
    /// `None` until the first successful fetch.
    pub messages: Option<Vec<Message>>,
    pub loading: bool,
    pub error: Option<FetchFailure>,
    pub header: Option<ChatHeader>,
    pub draft: String,
    pub sending: bool,
    pub follow: FollowState,
}

impl ChatSnapshot {
    pub fn empty(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            messages: None,
            loading: true,
            error: None,
            header: None,
            draft: String::new(),
            sending: false,
            follow: FollowState::Following,
        }
    }

    pub fn message_ids(&self) -> Vec<MessageId> {
        self.messages
            .iter()
            .flatten()
            .map(|message| message.id)
            .collect()
    }
}

/// Side effects the host has to act on.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    MessagesAppended {
        chat_id: ChatId,
        messages: Vec<Message>,
    },
    ScrollToBottom {
        chat_id: ChatId,
        message_id: Option<MessageId>,
    },
    HeaderResolved {
        chat_id: ChatId,
        header: ChatHeader,
    },
    FetchFailed {
        chat_id: ChatId,
        failure: FetchFailure,
    },
    MessageSent {
        chat_id: ChatId,
    },
    SendFailed {
        chat_id: ChatId,
        message: String,
    },
    /// Message fetch returned 401; the room has stopped.
    Unauthorized {
        chat_id: ChatId,
    },
}

/// Inputs accepted by a running chat room.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomCommand {
    SwitchChat(ChatId),
    Reload,
    UserScrolled(Viewport),
    EditDraft(String),
    KeyPress(KeyPress),
    Send,
}
