use std::sync::Arc;
use std::time::Duration;

use sportmate_api::{ApiResult, ChatBackend, ChatId, Invitation, Message};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::composer::{Composer, KeyPress};
use crate::events::{ChatEvent, ChatHeader, ChatSnapshot, RoomCommand};
use crate::feed::{ChatFeed, CommitOutcome, FetchFailure, FetchTicket, Generation};
use crate::scroll::{DEFAULT_FOLLOW_THRESHOLD, ScrollAction, ScrollPolicy, Viewport};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2_000);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomConfig {
    /// Delay between the end of one fetch and the start of the next.
    pub poll_interval: Duration,
    pub follow_threshold: f32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            follow_threshold: DEFAULT_FOLLOW_THRESHOLD,
        }
    }
}

/// Background results routed back into the room's own loop.
enum Completion {
    Fetch {
        ticket: FetchTicket,
        result: ApiResult<Vec<Message>>,
    },
    Send {
        chat_id: ChatId,
        generation: Generation,
        result: ApiResult<()>,
    },
    Header {
        chat_id: ChatId,
        generation: Generation,
        result: ApiResult<Invitation>,
    },
}

/// Polling chat page state, owned by a single tokio task.
///
/// All mutation happens inside that task, driven by [`RoomCommand`]s and by the
/// completions of the requests it spawned. Requests are never aborted: a switch
/// or teardown bumps the feed generation and late results are dropped on arrival.
pub struct ChatRoom;

impl ChatRoom {
    /// Spawns the room task and returns its handle with the event stream.
    ///
    /// Events are only sent when something changes (new messages, a failure, a
    /// header, a scroll request), not on idle polls. The channel is unbounded, so
    /// the host must keep draining the receiver or drop it. After a drop, events
    /// are discarded and the snapshot from [`ChatRoomHandle::subscribe`] keeps
    /// updating.
    pub fn open(
        backend: Arc<dyn ChatBackend>,
        chat_id: ChatId,
        config: RoomConfig,
    ) -> (ChatRoomHandle, mpsc::UnboundedReceiver<ChatEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(ChatSnapshot::empty(chat_id));

        let worker = RoomWorker {
            backend,
            config,
            feed: ChatFeed::new(chat_id),
            scroll: ScrollPolicy::new(config.follow_threshold),
            composer: Composer::new(),
            header: None,
            reload_pending: false,
            next_poll: None,
            stopped: false,
            completions: completion_tx,
            events: event_tx,
            snapshot: snapshot_tx,
        };

        tracing::info!(%chat_id, "opening chat room");
        let task = tokio::spawn(worker.run(command_rx, completion_rx));

        let handle = ChatRoomHandle {
            commands: command_tx,
            snapshot: snapshot_rx,
            task,
        };
        (handle, event_rx)
    }
}

pub struct ChatRoomHandle {
    commands: mpsc::UnboundedSender<RoomCommand>,
    snapshot: watch::Receiver<ChatSnapshot>,
    task: JoinHandle<()>,
}

impl ChatRoomHandle {
    pub fn snapshot(&self) -> ChatSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.snapshot.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn switch_chat(&self, chat_id: ChatId) {
        self.command(RoomCommand::SwitchChat(chat_id));
    }

    /// Out-of-cycle fetch. Coalesced with a fetch that is already in flight.
    pub fn reload(&self) {
        self.command(RoomCommand::Reload);
    }

    pub fn user_scrolled(&self, viewport: Viewport) {
        self.command(RoomCommand::UserScrolled(viewport));
    }

    pub fn edit_draft(&self, draft: impl Into<String>) {
        self.command(RoomCommand::EditDraft(draft.into()));
    }

    pub fn key_press(&self, key: KeyPress) {
        self.command(RoomCommand::KeyPress(key));
    }

    pub fn send(&self) {
        self.command(RoomCommand::Send);
    }

    pub fn command(&self, command: RoomCommand) {
        if self.commands.send(command).is_err() {
            tracing::debug!("chat room already stopped, dropping command");
        }
    }

    /// Tears the room down and waits for its task to finish.
    pub async fn shutdown(self) {
        let Self { commands, task, .. } = self;
        drop(commands);
        if let Err(error) = task.await {
            tracing::warn!(%error, "chat room task ended abnormally");
        }
    }
}

struct RoomWorker {
    backend: Arc<dyn ChatBackend>,
    config: RoomConfig,
    feed: ChatFeed,
    scroll: ScrollPolicy,
    composer: Composer,
    header: Option<ChatHeader>,
    reload_pending: bool,
    next_poll: Option<Instant>,
    stopped: bool,
    completions: mpsc::UnboundedSender<Completion>,
    events: mpsc::UnboundedSender<ChatEvent>,
    snapshot: watch::Sender<ChatSnapshot>,
}

impl RoomWorker {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<RoomCommand>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        self.open_chat();

        while !self.stopped {
            let next_poll = self.next_poll;
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(completion) = completions.recv() => self.handle_completion(completion),
                () = wait_until(next_poll) => {
                    self.next_poll = None;
                    self.start_fetch();
                }
            }
        }

        self.feed.invalidate();
        tracing::info!(chat_id = %self.feed.chat_id(), "chat room closed");
    }

    fn handle_command(&mut self, command: RoomCommand) {
        match command {
            RoomCommand::SwitchChat(chat_id) => self.switch_chat(chat_id),
            RoomCommand::Reload => self.reload(),
            RoomCommand::UserScrolled(viewport) => {
                let before = self.scroll.state();
                if self.scroll.on_user_scroll(viewport) != before {
                    tracing::debug!(state = ?self.scroll.state(), "follow state changed");
                    self.publish();
                }
            }
            RoomCommand::EditDraft(draft) => {
                self.composer.set_draft(draft);
                self.publish();
            }
            RoomCommand::KeyPress(key) => {
                if let Some(content) = self.composer.on_key(key) {
                    self.start_send(content);
                }
            }
            RoomCommand::Send => match self.composer.begin_send() {
                Some(content) => self.start_send(content),
                None => tracing::debug!(
                    sending = self.composer.is_sending(),
                    "send ignored, draft empty or send in flight"
                ),
            },
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Fetch { ticket, result } => self.finish_fetch(ticket, result),
            Completion::Send {
                chat_id,
                generation,
                result,
            } => self.finish_send(chat_id, generation, result),
            Completion::Header {
                chat_id,
                generation,
                result,
            } => self.finish_header(chat_id, generation, result),
        }
    }

    fn open_chat(&mut self) {
        self.start_fetch();
        self.resolve_header();
    }

    fn switch_chat(&mut self, chat_id: ChatId) {
        if chat_id == self.feed.chat_id() {
            return;
        }

        tracing::info!(from = %self.feed.chat_id(), to = %chat_id, "switching chat");
        self.feed.switch_chat(chat_id);
        self.scroll.reset();
        self.composer.reset();
        self.header = None;
        self.reload_pending = false;
        self.next_poll = None;
        self.publish();
        self.open_chat();
    }

    fn reload(&mut self) {
        tracing::debug!(chat_id = %self.feed.chat_id(), "reload requested");
        self.start_fetch();
    }

    fn start_fetch(&mut self) {
        let Some(ticket) = self.feed.begin_fetch() else {
            // Single-flight: run once more as soon as the outstanding fetch lands.
            self.reload_pending = true;
            return;
        };

        self.next_poll = None;
        tracing::debug!(chat_id = %ticket.chat_id, since_id = %ticket.since_id, "fetching messages");

        let backend = Arc::clone(&self.backend);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = backend.fetch_messages(ticket.chat_id, ticket.since_id).await;
            let _ = completions.send(Completion::Fetch { ticket, result });
        });
    }

    fn finish_fetch(&mut self, ticket: FetchTicket, result: ApiResult<Vec<Message>>) {
        if !self.feed.accepts(&ticket) {
            tracing::debug!(chat_id = %ticket.chat_id, "discarding stale fetch result");
            return;
        }

        let unauthorized = matches!(&result, Err(error) if error.is_unauthorized());
        let result = result.map_err(|error| {
            tracing::warn!(chat_id = %ticket.chat_id, %error, "failed to fetch messages");
            FetchFailure::from(&error)
        });

        let chat_id = ticket.chat_id;
        let had_error = self.feed.error().is_some();
        let outcome = self.feed.commit(&ticket, result);
        match outcome {
            CommitOutcome::Stale => return,
            CommitOutcome::Loaded { count } | CommitOutcome::Appended { count } if count > 0 => {
                tracing::debug!(%chat_id, count, "appended messages");
                let messages = self.feed.tail(count).to_vec();
                self.emit(ChatEvent::MessagesAppended { chat_id, messages });
            }
            CommitOutcome::Failed => {
                if let Some(failure) = self.feed.error().cloned() {
                    self.emit(ChatEvent::FetchFailed { chat_id, failure });
                }
            }
            CommitOutcome::Loaded { .. }
            | CommitOutcome::Appended { .. }
            | CommitOutcome::Unchanged => {}
        }

        if unauthorized {
            tracing::warn!(%chat_id, "session rejected, closing chat room");
            self.emit(ChatEvent::Unauthorized { chat_id });
            self.stopped = true;
            self.publish();
            return;
        }

        self.apply_scroll();
        // An idle poll leaves the snapshot as it was, skip cloning the message list.
        if outcome != CommitOutcome::Unchanged || had_error {
            self.publish();
        }
        self.schedule_next_fetch();
    }

    fn schedule_next_fetch(&mut self) {
        if self.reload_pending {
            self.reload_pending = false;
            self.start_fetch();
        } else {
            self.next_poll = Some(Instant::now() + self.config.poll_interval);
        }
    }

    fn apply_scroll(&mut self) {
        let newest = self.feed.newest_id();
        if self.scroll.on_feed_update(newest, self.feed.is_loaded()) == ScrollAction::ScrollToBottom
        {
            self.emit(ChatEvent::ScrollToBottom {
                chat_id: self.feed.chat_id(),
                message_id: newest,
            });
        }
    }

    fn start_send(&mut self, content: String) {
        let chat_id = self.feed.chat_id();
        let generation = self.feed.generation();
        tracing::debug!(%chat_id, length = content.len(), "sending message");

        let backend = Arc::clone(&self.backend);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = backend.post_message(chat_id, content).await;
            let _ = completions.send(Completion::Send {
                chat_id,
                generation,
                result,
            });
        });

        self.publish();
    }

    fn finish_send(&mut self, chat_id: ChatId, generation: Generation, result: ApiResult<()>) {
        if !self.is_current(chat_id, generation) {
            tracing::debug!(%chat_id, "discarding send result for previous chat");
            return;
        }

        match result {
            Ok(()) => {
                tracing::info!(%chat_id, "message sent");
                self.composer.finish_send(true);
                self.scroll.force_follow();
                self.emit(ChatEvent::MessageSent { chat_id });
                self.reload();
            }
            Err(error) => {
                tracing::warn!(%chat_id, %error, "failed to send message");
                self.composer.finish_send(false);
                self.emit(ChatEvent::SendFailed {
                    chat_id,
                    message: error.to_string(),
                });
            }
        }

        self.publish();
    }

    fn resolve_header(&mut self) {
        let chat_id = self.feed.chat_id();
        let generation = self.feed.generation();

        let backend = Arc::clone(&self.backend);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = backend.get_invitation(chat_id.invitation_id()).await;
            let _ = completions.send(Completion::Header {
                chat_id,
                generation,
                result,
            });
        });
    }

    fn finish_header(
        &mut self,
        chat_id: ChatId,
        generation: Generation,
        result: ApiResult<Invitation>,
    ) {
        if !self.is_current(chat_id, generation) {
            return;
        }

        match result {
            Ok(invitation) => {
                let header = ChatHeader::from(invitation);
                tracing::debug!(%chat_id, title = %header.title, "chat header resolved");
                self.header = Some(header.clone());
                self.emit(ChatEvent::HeaderResolved { chat_id, header });
                self.publish();
            }
            Err(error) => {
                tracing::warn!(%chat_id, %error, "failed to resolve chat header");
            }
        }
    }

    fn is_current(&self, chat_id: ChatId, generation: Generation) -> bool {
        chat_id == self.feed.chat_id() && generation == self.feed.generation()
    }

    fn emit(&self, event: ChatEvent) {
        // A host that dropped its event receiver still gets snapshots.
        let _ = self.events.send(event);
    }

    fn publish(&self) {
        self.snapshot.send_replace(ChatSnapshot {
            chat_id: self.feed.chat_id(),
            messages: self.feed.messages().map(<[Message]>::to_vec),
            loading: self.feed.is_loading(),
            error: self.feed.error().cloned(),
            header: self.header.clone(),
            draft: self.composer.draft().to_string(),
            sending: self.composer.is_sending(),
            follow: self.scroll.state(),
        });
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
