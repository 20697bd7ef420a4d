//! Scoped batching of panel messages.

use super::manager::CenterPanelDisplayManager;
use crate::error::PanelError;
use crate::message::Message;

/// Accumulates messages locally and flushes them in one call.
///
/// Prefer [`CenterPanelDisplayManager::batch`]. A transaction dropped without
/// [`Self::commit`] discards what it collected.
#[derive(Debug)]
pub struct DisplayBatchTransaction<'a> {
    manager: &'a CenterPanelDisplayManager,
    messages: Vec<Message>,
    auto_render: bool,
    released: bool,
}

impl<'a> DisplayBatchTransaction<'a> {
    pub(crate) fn new(manager: &'a CenterPanelDisplayManager, auto_render: bool) -> Self {
        Self {
            manager,
            messages: Vec::new(),
            auto_render,
            released: false,
        }
    }

    fn ensure_open(&self) -> Result<(), PanelError> {
        if self.released {
            Err(PanelError::TransactionReleased)
        } else {
            Ok(())
        }
    }

    pub fn add(&mut self, message: impl Into<Message>) -> Result<(), PanelError> {
        self.ensure_open()?;
        self.messages.push(message.into());
        Ok(())
    }

    pub fn add_range<I>(&mut self, messages: I) -> Result<(), PanelError>
    where
        I: IntoIterator,
        I::Item: Into<Message>,
    {
        self.ensure_open()?;
        self.messages.extend(messages.into_iter().map(Into::into));
        Ok(())
    }

    /// Messages collected so far.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Flushes everything to the panel and, with auto-render, requests one render.
    ///
    /// Returns how many messages were flushed.
    pub fn commit(&mut self) -> Result<usize, PanelError> {
        self.ensure_open()?;
        self.released = true;
        let messages = std::mem::take(&mut self.messages);
        Ok(self.manager.flush_batch(messages, self.auto_render))
    }

    /// Drops the collected messages. Idempotent.
    pub fn discard(&mut self) {
        if !self.released && !self.messages.is_empty() {
            tracing::debug!(count = self.messages.len(), "batch discarded");
        }
        self.released = true;
        self.messages.clear();
    }
}

impl Drop for DisplayBatchTransaction<'_> {
    fn drop(&mut self) {
        self.discard();
    }
}
