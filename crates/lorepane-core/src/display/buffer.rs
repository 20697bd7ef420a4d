//! Bounded message log with scroll state.

use std::collections::VecDeque;

use crate::message::Message;

/// Scroll mode for the center panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollMode {
    /// Auto-scroll to show latest content (bottom of the log).
    #[default]
    FollowLatest,
    /// User scrolled manually; offset is the wrapped-line index from the top.
    Anchored { offset: usize },
}

/// Scroll state for the panel.
///
/// Offsets are stored raw and clamped against the caller's `max_offset`
/// whenever they are read, since the wrapped height depends on the geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    pub mode: ScrollMode,
}

impl ScrollState {
    /// Returns true if currently following output (auto-scroll).
    pub fn is_following(&self) -> bool {
        matches!(self.mode, ScrollMode::FollowLatest)
    }

    /// Returns true if the user pinned the view.
    pub fn is_manual(&self) -> bool {
        !self.is_following()
    }

    /// Stored manual offset without clamping. Zero under auto-follow.
    pub fn raw_offset(&self) -> usize {
        match self.mode {
            ScrollMode::FollowLatest => 0,
            ScrollMode::Anchored { offset } => offset,
        }
    }

    /// Returns the effective offset, clamped into `[0, max_offset]`.
    ///
    /// Auto-follow sits at the bottom (`max_offset`).
    pub fn offset(&self, max_offset: usize) -> usize {
        match self.mode {
            ScrollMode::FollowLatest => max_offset,
            ScrollMode::Anchored { offset } => offset.min(max_offset),
        }
    }

    fn scroll_up(&mut self, lines: usize, max_offset: usize) {
        let offset = self.offset(max_offset).saturating_sub(lines);
        self.mode = ScrollMode::Anchored { offset };
    }

    fn scroll_down(&mut self, lines: usize, max_offset: usize) {
        let offset = self.offset(max_offset).saturating_add(lines).min(max_offset);
        self.mode = ScrollMode::Anchored { offset };
    }

    fn reset(&mut self) {
        self.mode = ScrollMode::FollowLatest;
    }
}

/// Options for a [`DisplayBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferOptions {
    /// Capacity; the oldest entries are evicted beyond it.
    pub max_lines: usize,
    /// Skip a non-blank message equal to the current last entry.
    pub collapse_duplicates: bool,
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self {
            max_lines: DisplayBuffer::DEFAULT_MAX_LINES,
            collapse_duplicates: false,
        }
    }
}

/// Bounded FIFO log of styled messages plus scroll-offset state.
#[derive(Debug, Clone)]
pub struct DisplayBuffer {
    messages: VecDeque<Message>,
    max_lines: usize,
    collapse_duplicates: bool,
    scroll: ScrollState,
    /// Bumped on every stored message and on clear; never decreases.
    revision: u64,
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new(BufferOptions::default())
    }
}

impl DisplayBuffer {
    pub const DEFAULT_MAX_LINES: usize = 100;

    /// Creates an empty buffer. A capacity of zero is raised to one.
    pub fn new(options: BufferOptions) -> Self {
        let max_lines = options.max_lines.max(1);
        Self {
            messages: VecDeque::with_capacity(max_lines),
            max_lines,
            collapse_duplicates: options.collapse_duplicates,
            scroll: ScrollState::default(),
            revision: 0,
        }
    }

    pub fn with_capacity(max_lines: usize) -> Self {
        Self::new(BufferOptions {
            max_lines,
            ..BufferOptions::default()
        })
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn scroll(&self) -> ScrollState {
        self.scroll
    }

    /// Changes whenever the content changes, including evictions at capacity.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Appends a message, evicting the oldest entry when full.
    ///
    /// Returns false only when the message was collapsed as a duplicate.
    pub fn add(&mut self, message: Message) -> bool {
        if self.collapse_duplicates
            && !message.is_blank()
            && self.messages.back() == Some(&message)
        {
            return false;
        }

        if self.messages.len() == self.max_lines {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
        self.revision = self.revision.wrapping_add(1);
        true
    }

    /// Appends messages in order. Returns how many were stored.
    pub fn add_range<I>(&mut self, messages: I) -> usize
    where
        I: IntoIterator<Item = Message>,
    {
        messages
            .into_iter()
            .map(|message| self.add(message))
            .filter(|added| *added)
            .count()
    }

    /// Removes all messages and returns to auto-follow.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.scroll.reset();
        self.revision = self.revision.wrapping_add(1);
    }

    /// Returns the newest `count` messages in insertion order.
    pub fn get_last(&self, count: usize) -> impl ExactSizeIterator<Item = &Message> {
        let skip = self.messages.len().saturating_sub(count);
        self.messages.range(skip..)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Message> {
        self.messages.iter()
    }

    /// Scrolls toward older content and pins the view.
    pub fn scroll_up(&mut self, lines: usize, max_offset: usize) {
        self.scroll.scroll_up(lines, max_offset);
    }

    /// Scrolls toward newer content and pins the view.
    ///
    /// Reaching the bottom stays pinned; [`Self::reset_scroll`] is the only
    /// way back to auto-follow.
    pub fn scroll_down(&mut self, lines: usize, max_offset: usize) {
        self.scroll.scroll_down(lines, max_offset);
    }

    /// Returns to auto-follow. Idempotent.
    pub fn reset_scroll(&mut self) {
        self.scroll.reset();
    }

    /// Sets an explicit offset.
    ///
    /// An offset at or past the bottom switches back to auto-follow.
    pub fn set_scroll_offset(&mut self, offset: usize, max_offset: usize) {
        if offset >= max_offset {
            self.scroll.reset();
        } else {
            self.scroll.mode = ScrollMode::Anchored { offset };
        }
    }

    /// Effective offset for the given maximum.
    pub fn scroll_offset(&self, max_offset: usize) -> usize {
        self.scroll.offset(max_offset)
    }

    /// Persists the clamp of a manual offset without leaving manual mode.
    pub(crate) fn clamp_scroll(&mut self, max_offset: usize) -> usize {
        let offset = self.scroll.offset(max_offset);
        if let ScrollMode::Anchored { offset: stored } = &mut self.scroll.mode {
            *stored = offset;
        }
        offset
    }
}
