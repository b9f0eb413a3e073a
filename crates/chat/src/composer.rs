#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Other,
}

/// Key press as seen by the message input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
    /// An input-method composition is still in progress.
    pub composing: bool,
}

impl KeyPress {
    pub const fn enter() -> Self {
        Self {
            key: Key::Enter,
            shift: false,
            composing: false,
        }
    }

    pub const fn composing_enter() -> Self {
        Self {
            key: Key::Enter,
            shift: false,
            composing: true,
        }
    }

    pub const fn shift_enter() -> Self {
        Self {
            key: Key::Enter,
            shift: true,
            composing: false,
        }
    }

    fn submits(&self) -> bool {
        self.key == Key::Enter && !self.shift && !self.composing
    }
}

/// Compose buffer with a single in-flight send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    draft: String,
    sending: bool,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn can_send(&self) -> bool {
        !self.sending && !self.draft.trim().is_empty()
    }

    /// Claims the send slot and returns the content to post.
    pub fn begin_send(&mut self) -> Option<String> {
        if !self.can_send() {
            return None;
        }

        self.sending = true;
        Some(self.draft.trim().to_string())
    }

    /// Releases the send slot. The draft survives a failed send for retry.
    pub fn finish_send(&mut self, delivered: bool) {
        self.sending = false;
        if delivered {
            self.draft.clear();
        }
    }

    /// Enter submits unless Shift is held or an IME composition is open.
    pub fn on_key(&mut self, key: KeyPress) -> Option<String> {
        if !key.submits() {
            return None;
        }
        self.begin_send()
    }

    pub fn reset(&mut self) {
        self.draft.clear();
        self.sending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_returns_trimmed_draft_and_blocks_second_send() {
        let mut composer = Composer::new();
        composer.set_draft("  see you there \n");

        assert_eq!(composer.begin_send().as_deref(), Some("see you there"));
        assert!(composer.is_sending());
        assert_eq!(composer.begin_send(), None);
    }

    #[test]
    fn whitespace_draft_is_not_sent() {
        let mut composer = Composer::new();
        composer.set_draft(" \t\n");

        assert_eq!(composer.begin_send(), None);
        assert!(!composer.is_sending());
    }

    #[test]
    fn delivered_send_clears_draft() {
        let mut composer = Composer::new();
        composer.set_draft("hello");
        composer.begin_send();

        composer.finish_send(true);

        assert_eq!(composer.draft(), "");
        assert!(!composer.is_sending());
    }

    #[test]
    fn failed_send_keeps_draft() {
        let mut composer = Composer::new();
        composer.set_draft("hello");
        composer.begin_send();

        composer.finish_send(false);

        assert_eq!(composer.draft(), "hello");
        assert!(composer.can_send());
    }

    #[test]
    fn enter_submits_only_outside_composition() {
        let mut composer = Composer::new();
        composer.set_draft("こんにちは");

        assert_eq!(composer.on_key(KeyPress::composing_enter()), None);
        assert_eq!(composer.on_key(KeyPress::shift_enter()), None);
        assert_eq!(
            composer.on_key(KeyPress {
                key: Key::Other,
                shift: false,
                composing: false,
            }),
            None
        );
        assert_eq!(composer.on_key(KeyPress::enter()).as_deref(), Some("こんにちは"));
    }
}
