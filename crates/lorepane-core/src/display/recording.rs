//! In-memory paint target that records every call.

use crate::message::Message;

use super::paint::{PaintTarget, wrapped_line_count};

/// A recorded `write_wrapped` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteCall {
    pub text: String,
    pub x: u16,
    pub y: u16,
    pub max_width: u16,
    /// Rows reported back to the renderer.
    pub lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaintCall {
    Clear { x: u16, y: u16, width: u16, height: u16 },
    Write(WriteCall),
    Refresh,
}

/// Paint target for tests and headless runs.
#[derive(Debug, Default, Clone)]
pub struct RecordingCanvas {
    calls: Vec<PaintCall>,
    writes: Vec<WriteCall>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[PaintCall] {
        &self.calls
    }

    pub fn writes(&self) -> &[WriteCall] {
        &self.writes
    }

    pub fn clear_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, PaintCall::Clear { .. }))
            .count()
    }

    pub fn refresh_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, PaintCall::Refresh))
            .count()
    }

    /// Text of every write since the last clear, in order.
    pub fn visible_text(&self) -> Vec<String> {
        let start = self
            .calls
            .iter()
            .rposition(|call| matches!(call, PaintCall::Clear { .. }))
            .map_or(0, |i| i + 1);
        self.calls[start..]
            .iter()
            .filter_map(|call| match call {
                PaintCall::Write(write) => Some(write.text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Forgets everything recorded so far.
    pub fn take(&mut self) -> Vec<PaintCall> {
        self.writes.clear();
        std::mem::take(&mut self.calls)
    }
}

impl PaintTarget for RecordingCanvas {
    fn clear_rect(&mut self, x: u16, y: u16, width: u16, height: u16) {
        self.calls.push(PaintCall::Clear {
            x,
            y,
            width,
            height,
        });
    }

    fn write_wrapped(&mut self, message: &Message, x: u16, y: u16, max_width: u16) -> usize {
        let lines = wrapped_line_count(message.display_length(), usize::from(max_width));
        let write = WriteCall {
            text: message.plain_text(),
            x,
            y,
            max_width,
            lines,
        };
        self.writes.push(write.clone());
        self.calls.push(PaintCall::Write(write));
        lines
    }

    fn refresh(&mut self) {
        self.calls.push(PaintCall::Refresh);
    }
}
