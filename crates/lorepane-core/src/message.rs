//! Styled message model.
//!
//! A [`Message`] is one logical log line before word-wrap: an ordered list of
//! [`StyledSpan`]s. Style tags are semantic and UI-agnostic; paint targets
//! translate them into real colors at paint time.

use unicode_width::UnicodeWidthStr;

/// Semantic style identifiers (UI-agnostic).
///
/// These are translated to actual terminal styles by the paint target.
/// This keeps the pipeline free of terminal dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Style {
    /// No styling.
    #[default]
    Plain,
    /// Panel title row.
    Title,
    /// Section headers ("=== ENTERING DUNGEON ===").
    Header,
    /// Narrative/exploration text.
    Narrative,
    /// Environmental flavor text.
    Environment,
    /// The active player character's name.
    Player,
    /// Enemy names.
    Enemy,
    /// Regular damage numbers.
    Damage,
    /// Critical hits.
    Critical,
    /// Healing amounts.
    Heal,
    /// Misses and blocked attacks.
    Miss,
    /// Status effect messages.
    Effect,
    /// Loot and rewards.
    Loot,
    /// Menu entries.
    Menu,
    /// Menu hotkeys ("[1]").
    MenuKey,
    /// System/info messages.
    System,
    /// Warnings.
    Warning,
    /// De-emphasized text (roll info, timestamps).
    Dim,
}

/// A styled span of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    pub text: String,
    pub style: Style,
}

impl StyledSpan {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Creates an unstyled span.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Style::Plain)
    }

    /// Display width of the span in terminal columns.
    pub fn display_length(&self) -> usize {
        self.text.width()
    }
}

/// One logical line of styled spans.
///
/// An empty span list is a blank line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub spans: Vec<StyledSpan>,
}

impl Message {
    /// Creates a blank line.
    pub fn empty() -> Self {
        Self { spans: Vec::new() }
    }

    /// Creates a single-span unstyled message.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::styled(text, Style::Plain)
    }

    /// Creates a single-span message with the given style.
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::empty();
        }
        Self {
            spans: vec![StyledSpan::new(text, style)],
        }
    }

    pub fn from_spans(spans: Vec<StyledSpan>) -> Self {
        Self { spans }
    }

    /// Appends a span, builder style.
    #[must_use]
    pub fn with(mut self, text: impl Into<String>, style: Style) -> Self {
        self.push(text, style);
        self
    }

    pub fn push(&mut self, text: impl Into<String>, style: Style) {
        self.spans.push(StyledSpan::new(text, style));
    }

    /// Returns true if the message renders as an empty line.
    pub fn is_blank(&self) -> bool {
        self.spans.iter().all(|span| span.text.is_empty())
    }

    /// Sum of the display widths of all spans.
    pub fn display_length(&self) -> usize {
        self.spans.iter().map(StyledSpan::display_length).sum()
    }

    /// Concatenated span text without styles.
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::plain(text)
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::plain(text)
    }
}

impl From<Vec<StyledSpan>> for Message {
    fn from(spans: Vec<StyledSpan>) -> Self {
        Message::from_spans(spans)
    }
}

impl From<Option<Message>> for Message {
    fn from(message: Option<Message>) -> Self {
        message.unwrap_or_default()
    }
}

/// Origin category of a message, used by [`crate::display::MessageFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MessageKind {
    Combat,
    Menu,
    #[default]
    System,
    Title,
    MainTitle,
    Environmental,
    EffectMessage,
    DamageOverTime,
    RollInfo,
    Encounter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_length_sums_spans() {
        let message = Message::plain("Goblin")
            .with(" hits you for ", Style::Plain)
            .with("12", Style::Damage);
        assert_eq!(message.display_length(), 20);
        assert_eq!(message.plain_text(), "Goblin hits you for 12");
    }

    #[test]
    fn test_empty_text_is_blank() {
        assert!(Message::plain("").is_blank());
        assert!(Message::empty().is_blank());
        assert!(Message::from(None).is_blank());
        assert_eq!(Message::empty().display_length(), 0);
    }

    #[test]
    fn test_wide_characters_count_columns() {
        // CJK characters take 2 terminal columns each
        assert_eq!(Message::plain("中文").display_length(), 4);
    }
}
