use sportmate_api::{ApiError, ChatId, FailureKind, Message, MessageId};

/// Monotonic counter bumped whenever the feed is re-targeted or torn down.
///
/// Results carrying an older generation are stale and must not touch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Generation(pub u64);

impl Generation {
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Issued by [`ChatFeed::begin_fetch`]; must be handed back to [`ChatFeed::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub chat_id: ChatId,
    pub generation: Generation,
    pub since_id: MessageId,
}

/// Cloneable summary of the last failed fetch, kept for the error banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&ApiError> for FetchFailure {
    fn from(error: &ApiError) -> Self {
        Self::new(error.kind(), error.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The ticket belongs to a previous chat or a torn-down feed; nothing changed.
    Stale,
    /// First successful load, possibly empty.
    Loaded { count: usize },
    Appended { count: usize },
    /// Successful fetch with nothing new.
    Unchanged,
    Failed,
}

/// Locally materialized message sequence for one chat.
///
/// `messages` is `None` until the first successful fetch, which distinguishes
/// "not loaded yet" from "loaded and empty". At most one fetch is outstanding
/// per generation.
#[derive(Debug, Clone)]
pub struct ChatFeed {
    chat_id: ChatId,
    generation: Generation,
    messages: Option<Vec<Message>>,
    loading: bool,
    error: Option<FetchFailure>,
    in_flight: bool,
}

impl ChatFeed {
    pub fn new(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            generation: Generation::default(),
            messages: None,
            loading: true,
            error: None,
            in_flight: false,
        }
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn messages(&self) -> Option<&[Message]> {
        self.messages.as_deref()
    }

    /// True until the first fetch for the current chat completes.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&FetchFailure> {
        self.error.as_ref()
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight
    }

    pub fn is_loaded(&self) -> bool {
        self.messages.is_some() && !self.loading
    }

    pub fn newest_id(&self) -> Option<MessageId> {
        self.messages
            .as_ref()
            .and_then(|messages| messages.last())
            .map(|message| message.id)
    }

    /// Cursor for the next fetch: newest known id, or zero.
    pub fn since_id(&self) -> MessageId {
        self.newest_id().unwrap_or(MessageId::ORIGIN)
    }

    /// Claims the single fetch slot. Returns `None` while a fetch is outstanding.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        if self.in_flight {
            return None;
        }

        self.in_flight = true;
        Some(FetchTicket {
            chat_id: self.chat_id,
            generation: self.generation,
            since_id: self.since_id(),
        })
    }

    /// Applies a finished fetch. Stale tickets are ignored entirely.
    pub fn commit(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<Message>, FetchFailure>,
    ) -> CommitOutcome {
        if !self.accepts(ticket) {
            return CommitOutcome::Stale;
        }

        self.in_flight = false;
        self.loading = false;

        let batch = match result {
            Ok(batch) => batch,
            Err(failure) => {
                self.error = Some(failure);
                return CommitOutcome::Failed;
            }
        };

        self.error = None;
        let batch = newer_than(batch, ticket.since_id);

        let count = batch.len();

        if let Some(messages) = self.messages.as_mut() {
            if count == 0 {
                return CommitOutcome::Unchanged;
            }
            messages.extend(batch);
            return CommitOutcome::Appended { count };
        }

        // An empty first response still flips the feed to "loaded".
        self.messages = Some(batch);
        CommitOutcome::Loaded { count }
    }

    pub fn accepts(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation && ticket.chat_id == self.chat_id
    }

    /// Re-targets the feed. Any outstanding fetch becomes stale.
    pub fn switch_chat(&mut self, chat_id: ChatId) {
        self.chat_id = chat_id;
        self.generation = self.generation.next();
        self.messages = None;
        self.loading = true;
        self.error = None;
        self.in_flight = false;
    }

    /// Marks every outstanding ticket stale without changing visible state.
    pub fn invalidate(&mut self) {
        self.generation = self.generation.next();
        self.in_flight = false;
    }

    /// The tail appended by the last `count` messages.
    pub fn tail(&self, count: usize) -> &[Message] {
        match &self.messages {
            Some(messages) => &messages[messages.len().saturating_sub(count)..],
            None => &[],
        }
    }
}

fn newer_than(mut batch: Vec<Message>, since_id: MessageId) -> Vec<Message> {
    let before = batch.len();
    batch.retain(|message| message.id > since_id);
    if batch.len() != before {
        tracing::warn!(
            %since_id,
            dropped = before - batch.len(),
            "server returned messages at or below the cursor"
        );
    }
    batch
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use sportmate_api::{Sender, UserId};

    use super::*;

    fn message(id: u64) -> Message {
        Message::text(
            MessageId::new(id),
            Sender::new(UserId::new(1), "Mei"),
            Utc.timestamp_opt(id as i64, 0).unwrap(),
            format!("message {id}"),
        )
    }

    fn ids(feed: &ChatFeed) -> Vec<u64> {
        feed.messages()
            .unwrap_or_default()
            .iter()
            .map(|message| message.id.get())
            .collect()
    }

    #[test]
    fn empty_first_fetch_marks_feed_loaded() {
        let mut feed = ChatFeed::new(ChatId::new(1));
        assert!(feed.is_loading());
        assert!(feed.messages().is_none());

        let ticket = feed.begin_fetch().expect("slot free");
        assert_eq!(ticket.since_id, MessageId::ORIGIN);

        let outcome = feed.commit(&ticket, Ok(Vec::new()));

        assert_eq!(outcome, CommitOutcome::Loaded { count: 0 });
        assert!(!feed.is_loading());
        assert_eq!(feed.messages(), Some(&[][..]));
        assert!(feed.is_loaded());
    }

    #[test]
    fn later_fetches_use_newest_id_as_cursor_and_append() {
        let mut feed = ChatFeed::new(ChatId::new(1));
        let ticket = feed.begin_fetch().unwrap();
        feed.commit(&ticket, Ok(vec![message(1), message(2)]));

        let ticket = feed.begin_fetch().unwrap();
        assert_eq!(ticket.since_id, MessageId::new(2));
        assert_eq!(
            feed.commit(&ticket, Ok(vec![message(3)])),
            CommitOutcome::Appended { count: 1 }
        );

        let ticket = feed.begin_fetch().unwrap();
        assert_eq!(feed.commit(&ticket, Ok(Vec::new())), CommitOutcome::Unchanged);

        assert_eq!(ids(&feed), vec![1, 2, 3]);
        assert_eq!(feed.tail(1)[0].id, MessageId::new(3));
    }

    #[test]
    fn entries_at_or_below_cursor_are_never_appended() {
        let mut feed = ChatFeed::new(ChatId::new(1));
        let ticket = feed.begin_fetch().unwrap();
        feed.commit(&ticket, Ok(vec![message(1), message(2)]));

        let ticket = feed.begin_fetch().unwrap();
        feed.commit(&ticket, Ok(vec![message(2), message(3)]));

        assert_eq!(ids(&feed), vec![1, 2, 3]);
    }

    #[test]
    fn second_fetch_is_refused_while_one_is_outstanding() {
        let mut feed = ChatFeed::new(ChatId::new(1));
        let ticket = feed.begin_fetch().unwrap();

        assert!(feed.is_fetching());
        assert!(feed.begin_fetch().is_none());

        feed.commit(&ticket, Ok(Vec::new()));
        assert!(feed.begin_fetch().is_some());
    }

    #[test]
    fn failure_keeps_messages_and_records_error() {
        let mut feed = ChatFeed::new(ChatId::new(1));
        let ticket = feed.begin_fetch().unwrap();
        feed.commit(&ticket, Ok(vec![message(1)]));

        let ticket = feed.begin_fetch().unwrap();
        let outcome = feed.commit(
            &ticket,
            Err(FetchFailure::new(FailureKind::Transport, "connection refused")),
        );

        assert_eq!(outcome, CommitOutcome::Failed);
        assert_eq!(ids(&feed), vec![1]);
        assert_eq!(feed.error().map(|failure| failure.kind), Some(FailureKind::Transport));
        assert!(!feed.is_fetching());

        let ticket = feed.begin_fetch().unwrap();
        feed.commit(&ticket, Ok(vec![message(2)]));
        assert!(feed.error().is_none());
    }

    #[test]
    fn failed_first_fetch_is_not_loaded() {
        let mut feed = ChatFeed::new(ChatId::new(1));
        let ticket = feed.begin_fetch().unwrap();
        feed.commit(
            &ticket,
            Err(FetchFailure::new(FailureKind::Server, "status 500")),
        );

        assert!(!feed.is_loading());
        assert!(feed.messages().is_none());
        assert!(!feed.is_loaded());
    }

    #[test]
    fn result_from_previous_chat_is_stale() {
        let mut feed = ChatFeed::new(ChatId::new(1));
        let old_ticket = feed.begin_fetch().unwrap();

        feed.switch_chat(ChatId::new(2));
        let new_ticket = feed.begin_fetch().expect("switch frees the slot");

        assert_eq!(
            feed.commit(&old_ticket, Ok(vec![message(1), message(2)])),
            CommitOutcome::Stale
        );
        assert!(feed.messages().is_none());
        assert!(feed.is_fetching());

        feed.commit(&new_ticket, Ok(vec![message(10)]));
        assert_eq!(ids(&feed), vec![10]);
    }

    #[test]
    fn invalidate_discards_outstanding_ticket() {
        let mut feed = ChatFeed::new(ChatId::new(1));
        let ticket = feed.begin_fetch().unwrap();

        feed.invalidate();

        assert_eq!(feed.commit(&ticket, Ok(vec![message(1)])), CommitOutcome::Stale);
        assert!(feed.messages().is_none());
    }
}
