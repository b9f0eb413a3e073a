#![deny(unsafe_code)]

//! Chat page state: message polling, auto-scroll policy, and the send flow.
//!
//! The pure pieces ([`ChatFeed`], [`ScrollPolicy`], [`Composer`]) hold no I/O and
//! are driven by [`ChatRoom`], which runs them on a tokio task against a
//! [`sportmate_api::ChatBackend`].
/// Draft editing and the single-flight send state.
pub mod composer;
/// Event and command contracts between a chat room and its host.
pub mod events;
/// Message list, fetch tickets and the `sinceId` cursor.
pub mod feed;
/// The tokio task that polls, sends and publishes snapshots.
pub mod room;
/// Follow-the-bottom policy for the message viewport.
pub mod scroll;

pub use composer::{Composer, Key, KeyPress};
pub use events::{ChatEvent, ChatHeader, ChatSnapshot, RoomCommand};
pub use feed::{ChatFeed, CommitOutcome, FetchFailure, FetchTicket, Generation};
pub use room::{ChatRoom, ChatRoomHandle, DEFAULT_POLL_INTERVAL, RoomConfig};
pub use scroll::{DEFAULT_FOLLOW_THRESHOLD, FollowState, ScrollAction, ScrollPolicy, Viewport};
