use std::fmt;

use xi_rope::delta::Builder;
use xi_rope::{Delta, Rope, RopeInfo};

use crate::editing::TextEdit;
use crate::models::{Anchor, Position};

/// Read-only view of a source file, backed by an xi-rope buffer.
///
/// This is the document-provider seam: the engine slices anchor text, clamps
/// ranges and tokenizes lines through it, and never holds on to it between
/// calls. Line/offset positions are converted to rope byte offsets here and
/// nowhere else.
#[derive(Clone)]
pub struct Document {
    buffer: Rope,
}

impl Document {
    pub fn new(text: &str) -> Self {
        Self {
            buffer: Rope::from(text),
        }
    }

    /// Full text of the document.
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// Number of lines; an empty document and a trailing newline both count
    /// the final (empty) line.
    pub fn line_count(&self) -> usize {
        self.buffer.line_of_offset(self.buffer.len()) + 1
    }

    /// Text of line `n` without its terminator.
    pub fn line(&self, n: usize) -> Option<String> {
        if n >= self.line_count() {
            return None;
        }
        let start = self.buffer.offset_of_line(n);
        let end = self.buffer.offset_of_line(n + 1);
        let raw = self.buffer.slice_to_cow(start..end);
        let trimmed = raw.strip_suffix('\n').unwrap_or(&raw);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
        Some(trimmed.to_string())
    }

    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count())
            .filter_map(|n| self.line(n))
            .collect()
    }

    /// Length of line `n` in chars, 0 for lines past the end.
    pub fn line_len(&self, n: usize) -> usize {
        self.line(n).map(|line| line.chars().count()).unwrap_or(0)
    }

    /// True when line `n` is missing or holds only whitespace.
    pub fn is_blank_line(&self, n: usize) -> bool {
        self.line(n).is_none_or(|line| line.trim().is_empty())
    }

    /// Position just past the last character.
    pub fn end_position(&self) -> Position {
        let last = self.line_count() - 1;
        Position::new(last, self.line_len(last))
    }

    pub fn clamp_position(&self, position: Position) -> Position {
        let line = position.line.min(self.line_count() - 1);
        let offset = if position.line > line {
            self.line_len(line)
        } else {
            position.offset.min(self.line_len(line))
        };
        Position::new(line, offset)
    }

    /// Bounds both ends of the anchor to existing lines and columns.
    pub fn clamp(&self, anchor: &Anchor) -> Anchor {
        Anchor::new(
            self.clamp_position(anchor.start()),
            self.clamp_position(anchor.end()),
        )
    }

    /// True when the anchor is ordered and fits inside the document.
    pub fn is_valid(&self, anchor: &Anchor) -> bool {
        anchor.is_ordered()
            && self.clamp_position(anchor.start()) == anchor.start()
            && self.clamp_position(anchor.end()) == anchor.end()
    }

    /// Text covered by the (clamped) anchor.
    pub fn slice(&self, anchor: &Anchor) -> String {
        let anchor = self.clamp(anchor);
        let start = self.byte_offset(anchor.start());
        let end = self.byte_offset(anchor.end());
        self.buffer.slice_to_cow(start..end).into_owned()
    }

    /// Applies one edit in place. The edit's range is interpreted against the
    /// current contents and clamped to them.
    pub fn apply_edit(&mut self, edit: &TextEdit) {
        let start = self.byte_offset(self.clamp_position(edit.range.start));
        let end = self.byte_offset(self.clamp_position(edit.range.end));
        let (start, end) = if start <= end { (start, end) } else { (end, start) };

        let delta = self.compile_edit(start..end, &edit.text);
        self.buffer = delta.apply(&self.buffer);
    }

    fn compile_edit(&self, range: std::ops::Range<usize>, text: &str) -> Delta<RopeInfo> {
        let mut builder = Builder::new(self.buffer.len());
        if text.is_empty() {
            builder.delete(range);
        } else {
            builder.replace(range, Rope::from(text));
        }
        builder.build()
    }

    /// Rope byte offset for a line/char position (clamped).
    fn byte_offset(&self, position: Position) -> usize {
        let position = self.clamp_position(position);
        let line_start = self.buffer.offset_of_line(position.line);
        let line = self.line(position.line).unwrap_or_default();
        let within = line
            .char_indices()
            .nth(position.offset)
            .map(|(idx, _)| idx)
            .unwrap_or(line.len());
        line_start + within
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("text", &self.text())
            .finish()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.text() == other.text()
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}
