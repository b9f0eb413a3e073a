use sportmate_api::MessageId;

/// Distance from the bottom within which the view keeps following new messages.
pub const DEFAULT_FOLLOW_THRESHOLD: f32 = 64.0;

/// Geometry of the message viewport, in the host's layout units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_offset: f32,
    pub content_height: f32,
    pub viewport_height: f32,
}

impl Viewport {
    pub fn new(scroll_offset: f32, content_height: f32, viewport_height: f32) -> Self {
        Self {
            scroll_offset,
            content_height,
            viewport_height,
        }
    }

    pub fn distance_from_bottom(&self) -> f32 {
        (self.content_height - self.viewport_height - self.scroll_offset).max(0.0)
    }
}

/// Auto-scroll state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FollowState {
    #[default]
    Following,
    Paused,
}

impl FollowState {
    /// State implied by a user scroll that leaves the view at `viewport`.
    pub fn from_viewport(viewport: Viewport, threshold: f32) -> Self {
        if viewport.distance_from_bottom() > threshold {
            Self::Paused
        } else {
            Self::Following
        }
    }

    pub fn is_following(self) -> bool {
        matches!(self, Self::Following)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAction {
    Stay,
    ScrollToBottom,
}

/// Decides when the message list is programmatically pinned to its tail.
///
/// A user reading history is never pulled down by incoming messages; the view
/// snaps again once they return near the bottom or send something themselves.
#[derive(Debug, Clone)]
pub struct ScrollPolicy {
    threshold: f32,
    state: FollowState,
    last_scrolled: Option<MessageId>,
    initialized: bool,
}

impl ScrollPolicy {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            state: FollowState::Following,
            last_scrolled: None,
            initialized: false,
        }
    }

    pub fn state(&self) -> FollowState {
        self.state
    }

    pub fn is_following(&self) -> bool {
        self.state.is_following()
    }

    pub fn last_scrolled(&self) -> Option<MessageId> {
        self.last_scrolled
    }

    pub fn on_user_scroll(&mut self, viewport: Viewport) -> FollowState {
        self.state = FollowState::from_viewport(viewport, self.threshold);
        self.state
    }

    /// Called right after the local user sent a message.
    pub fn force_follow(&mut self) {
        self.state = FollowState::Following;
    }

    /// Forget everything about the previous chat.
    pub fn reset(&mut self) {
        self.state = FollowState::Following;
        self.last_scrolled = None;
        self.initialized = false;
    }

    /// Evaluates the feed after it changed.
    ///
    /// `loaded` is true once a fetch succeeded and the feed is no longer loading.
    /// The first loaded evaluation always scrolls, whatever the follow state.
    pub fn on_feed_update(&mut self, newest: Option<MessageId>, loaded: bool) -> ScrollAction {
        if !loaded {
            return ScrollAction::Stay;
        }

        if !self.initialized {
            self.initialized = true;
            self.last_scrolled = newest;
            return ScrollAction::ScrollToBottom;
        }

        match newest {
            Some(id) if self.state.is_following() && self.last_scrolled != Some(id) => {
                self.last_scrolled = Some(id);
                ScrollAction::ScrollToBottom
            }
            _ => ScrollAction::Stay,
        }
    }
}

impl Default for ScrollPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FOLLOW_THRESHOLD)
    }
}
