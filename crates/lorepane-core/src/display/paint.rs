//! Paint target boundary.
//!
//! The pipeline only ever emits these three calls. Implementations decide
//! what a cell, a color and a refresh mean.

use crate::message::Message;

/// A rectangular grid of character cells.
pub trait PaintTarget {
    /// Blanks `width` x `height` cells starting at (`x`, `y`).
    fn clear_rect(&mut self, x: u16, y: u16, width: u16, height: u16);

    /// Writes `message` at (`x`, `y`), wrapping at `max_width` columns.
    ///
    /// Returns the number of rows consumed. A blank message consumes one row.
    fn write_wrapped(&mut self, message: &Message, x: u16, y: u16, max_width: u16) -> usize;

    /// Signals that a batch of paint calls is complete.
    fn refresh(&mut self);
}

impl<T: PaintTarget + ?Sized> PaintTarget for &mut T {
    fn clear_rect(&mut self, x: u16, y: u16, width: u16, height: u16) {
        (**self).clear_rect(x, y, width, height);
    }

    fn write_wrapped(&mut self, message: &Message, x: u16, y: u16, max_width: u16) -> usize {
        (**self).write_wrapped(message, x, y, max_width)
    }

    fn refresh(&mut self) {
        (**self).refresh();
    }
}

/// Number of rows a message of `display_length` columns takes at `width`.
///
/// Always at least one; a zero width counts as one row.
pub fn wrapped_line_count(display_length: usize, width: usize) -> usize {
    if width == 0 {
        return 1;
    }
    display_length.div_ceil(width).max(1)
}
