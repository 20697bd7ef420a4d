//! Message filtering by kind.

use crate::message::MessageKind;

/// Decides whether a message of a given kind reaches the panel.
pub trait MessageFilter: Send + Sync {
    fn should_display(&self, kind: MessageKind) -> bool;
}

impl<F> MessageFilter for F
where
    F: Fn(MessageKind) -> bool + Send + Sync,
{
    fn should_display(&self, kind: MessageKind) -> bool {
        self(kind)
    }
}

/// Lets everything through.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl MessageFilter for AllowAll {
    fn should_display(&self, _kind: MessageKind) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closures_are_filters() {
        let no_rolls = |kind: MessageKind| kind != MessageKind::RollInfo;
        assert!(no_rolls.should_display(MessageKind::Combat));
        assert!(!no_rolls.should_display(MessageKind::RollInfo));
        assert!(AllowAll.should_display(MessageKind::RollInfo));
    }
}
