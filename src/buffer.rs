//! The shared parsing buffer.
//!
//! Decoded code points are appended at the back by the reader and consumed
//! from the front by whichever sub-parser is active. The buffer keeps a
//! logical window over a growable `Vec<char>`: `start` marks the first code
//! point that has not been committed yet and `cursor` the next one to
//! examine. Committing ("erasing") only moves `start`; the storage is
//! compacted lazily on the next append, so memory stays bounded by the
//! unconsumed tail of the document.

use crate::error::Position;

/// Outcome of matching a literal at the cursor without consuming it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookahead {
    /// The buffered input at the cursor starts with the literal.
    Matched,
    /// The buffered input at the cursor differs from the literal.
    Mismatch,
    /// The buffered input is a proper prefix of the literal.
    NeedMoreData,
}

/// A growable, prunable buffer of decoded code points.
#[derive(Debug, Clone)]
pub struct ParsingBuffer {
    data: Vec<char>,
    /// First uncommitted code point.
    start: usize,
    /// Next code point to examine, always `start <= cursor <= data.len()`.
    cursor: usize,
    /// Code points dropped by compaction, for absolute offsets.
    compacted: usize,
    line: usize,
    column: usize,
}

impl Default for ParsingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ParsingBuffer {
    /// Creates an empty buffer.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty buffer with room for `capacity` code points.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            start: 0,
            cursor: 0,
            compacted: 0,
            line: 1,
            column: 1,
        }
    }

    /// Appends decoded text at the back of the buffer.
    pub fn append(&mut self, text: &str) {
        self.compact();
        self.data.extend(text.chars());
    }

    /// Appends code points at the back of the buffer.
    pub fn extend<I: IntoIterator<Item = char>>(&mut self, chars: I) {
        self.compact();
        self.data.extend(chars);
    }

    /// Physically drops the committed prefix once it dominates the storage.
    fn compact(&mut self) {
        if self.start > 0 && self.start * 2 >= self.data.len() {
            let _ = self.data.drain(..self.start);
            self.compacted += self.start;
            self.cursor -= self.start;
            self.start = 0;
        }
    }

    /// Returns `true` when the cursor sits at the end of the buffered input.
    #[inline]
    pub fn is_more_data_needed(&self) -> bool {
        self.cursor >= self.data.len()
    }

    /// Returns the code point under the cursor, `None` when more data is needed.
    #[inline]
    pub fn current_char(&self) -> Option<char> {
        self.data.get(self.cursor).copied()
    }

    /// Returns the code point at `index`, relative to the committed boundary.
    #[inline]
    pub fn at(&self, index: usize) -> Option<char> {
        self.data.get(self.start + index).copied()
    }

    /// Cursor position relative to the committed boundary.
    #[inline]
    pub fn current_position(&self) -> usize {
        self.cursor - self.start
    }

    /// Moves the cursor past the current code point.
    ///
    /// Does nothing when more data is needed.
    pub fn increment_position(&mut self) {
        if let Some(c) = self.current_char() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.cursor += 1;
        }
    }

    /// Extracts the code points in `start..end`, relative to the committed
    /// boundary. The range is clamped to the buffered input.
    pub fn substring(&self, start: usize, end: usize) -> String {
        let upper = (self.start + end).min(self.data.len());
        let lower = (self.start + start).min(upper);
        self.data[lower..upper].iter().collect()
    }

    /// Commits everything before the cursor.
    ///
    /// Code points at or after the cursor are never discarded.
    #[inline]
    pub fn erase_to_current_position(&mut self) {
        self.start = self.cursor;
    }

    /// Number of buffered code points after the committed boundary.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() - self.start
    }

    /// Returns `true` if nothing is buffered after the committed boundary.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of code points at or after the cursor.
    #[inline]
    pub fn pending_len(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// Matches `literal` against the input at the cursor without consuming it.
    pub fn lookahead(&self, literal: &str) -> Lookahead {
        let mut index = self.cursor;
        for expected in literal.chars() {
            match self.data.get(index) {
                Some(&c) if c == expected => index += 1,
                Some(_) => return Lookahead::Mismatch,
                None => return Lookahead::NeedMoreData,
            }
        }
        Lookahead::Matched
    }

    /// Returns the code point `offset` places after the cursor.
    #[inline]
    pub fn peek(&self, offset: usize) -> Option<char> {
        self.data.get(self.cursor + offset).copied()
    }

    /// Moves the cursor past `count` code points.
    pub fn skip(&mut self, count: usize) {
        for _ in 0..count {
            self.increment_position();
        }
    }

    /// Returns the document position of the cursor.
    #[inline]
    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            offset: self.compacted + self.cursor,
        }
    }

    /// Drops all buffered input and resets position tracking.
    pub fn clear(&mut self) {
        self.data.clear();
        self.start = 0;
        self.cursor = 0;
        self.compacted = 0;
        self.line = 1;
        self.column = 1;
    }

    /// Capacity of the underlying storage, in code points.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_more_data_needed_at_end() {
        let mut buffer = ParsingBuffer::new();
        assert!(buffer.is_more_data_needed());
        assert_eq!(buffer.current_char(), None);

        buffer.append("ab");
        assert!(!buffer.is_more_data_needed());
        assert_eq!(buffer.current_char(), Some('a'));

        buffer.increment_position();
        buffer.increment_position();
        assert!(buffer.is_more_data_needed());
        assert_eq!(buffer.current_position(), 2);
    }

    #[test]
    fn test_erase_keeps_unconsumed_tail() {
        let mut buffer = ParsingBuffer::new();
        buffer.append("<abc>");
        buffer.skip(2);
        buffer.erase_to_current_position();

        assert_eq!(buffer.current_position(), 0);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.current_char(), Some('b'));
        assert_eq!(buffer.substring(0, 3), "bc>");
    }

    #[test]
    fn test_substring_and_at_are_relative() {
        let mut buffer = ParsingBuffer::new();
        buffer.append("xx name=");
        buffer.skip(3);
        buffer.erase_to_current_position();
        buffer.skip(4);

        assert_eq!(buffer.at(0), Some('n'));
        assert_eq!(buffer.at(3), Some('e'));
        assert_eq!(buffer.substring(0, buffer.current_position()), "name");
        assert_eq!(buffer.substring(2, 100), "me=");
    }

    #[test]
    fn test_compaction_on_append() {
        let mut buffer = ParsingBuffer::new();
        buffer.append("0123456789");
        buffer.skip(8);
        buffer.erase_to_current_position();
        buffer.append("ab");

        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.substring(0, 4), "89ab");
        assert_eq!(buffer.position().offset, 8);
    }

    #[test]
    fn test_lookahead() {
        let mut buffer = ParsingBuffer::new();
        buffer.append("<!-");
        assert_eq!(buffer.lookahead("<!--"), Lookahead::NeedMoreData);
        assert_eq!(buffer.lookahead("<?"), Lookahead::Mismatch);
        assert_eq!(buffer.lookahead("<!"), Lookahead::Matched);
        assert_eq!(buffer.current_position(), 0);

        buffer.append("-");
        assert_eq!(buffer.lookahead("<!--"), Lookahead::Matched);
    }

    #[test]
    fn test_position_tracking() {
        let mut buffer = ParsingBuffer::new();
        buffer.append("a\nbc");
        buffer.skip(3);

        let pos = buffer.position();
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 2);
        assert_eq!(pos.offset, 3);
    }

    #[test]
    fn test_increment_at_end_is_noop() {
        let mut buffer = ParsingBuffer::new();
        buffer.increment_position();
        assert_eq!(buffer.current_position(), 0);
        assert_eq!(buffer.position(), Position::START);
    }
}
