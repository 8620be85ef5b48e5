use serde::{Deserialize, Serialize};

use crate::models::Position;

/// Range replaced by an edit, in pre-edit coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EditRange {
    pub start: Position,
    pub end: Position,
}

/// One contiguous change as reported by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub range: EditRange,
    /// Text inserted in place of `range`.
    #[serde(default)]
    pub text: String,
    /// Number of chars removed by the edit.
    #[serde(default)]
    pub range_length: usize,
}

impl TextEdit {
    /// Edit whose `range_length` is taken on trust from the caller.
    pub fn new(start: Position, end: Position, text: impl Into<String>, range_length: usize) -> Self {
        Self {
            range: EditRange { start, end },
            text: text.into(),
            range_length,
        }
    }

    pub fn insert(at: Position, text: impl Into<String>) -> Self {
        Self::new(at, at, text, 0)
    }

    /// Deletion within a single line or across lines. `range_length` is
    /// derived for single-line ranges only; multi-line callers that need it
    /// exact should use [`TextEdit::new`].
    pub fn delete(start: Position, end: Position) -> Self {
        Self::replace(start, end, "")
    }

    pub fn replace(start: Position, end: Position, text: impl Into<String>) -> Self {
        let range_length = if start.line == end.line {
            end.offset.saturating_sub(start.offset)
        } else {
            0
        };
        Self::new(start, end, text, range_length)
    }

    pub fn start(&self) -> Position {
        self.range.start
    }

    pub fn end(&self) -> Position {
        self.range.end
    }

    /// Inserted length in chars.
    pub fn text_length(&self) -> usize {
        self.text.chars().count()
    }

    pub fn lines_inserted(&self) -> usize {
        self.text.matches('\n').count()
    }

    pub fn lines_replaced(&self) -> usize {
        self.range.end.line.saturating_sub(self.range.start.line)
    }

    /// Net change in line count (`lines_inserted - lines_replaced`).
    pub fn diff(&self) -> isize {
        self.lines_inserted() as isize - self.lines_replaced() as isize
    }

    pub fn is_noop(&self) -> bool {
        self.text.is_empty() && self.range.start == self.range.end
    }

    /// Where the inserted text ends in the post-edit document.
    pub fn inserted_end(&self) -> Position {
        let start = self.range.start;
        match self.text.rfind('\n') {
            Some(idx) => Position::new(
                start.line + self.lines_inserted(),
                self.text[idx + 1..].chars().count(),
            ),
            None => Position::new(start.line, start.offset + self.text_length()),
        }
    }
}

/// Editor indentation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndentConfig {
    pub tab_size: usize,
    pub insert_spaces: bool,
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            tab_size: 4,
            insert_spaces: true,
        }
    }
}

impl IndentConfig {
    /// True for a lone tab, or a run of spaces exactly one indent unit wide
    /// when the editor indents with spaces.
    pub fn is_indent_unit(&self, text: &str) -> bool {
        if text == "\t" {
            return true;
        }
        self.insert_spaces
            && self.tab_size > 0
            && text.len() == self.tab_size
            && text.chars().all(|c| c == ' ')
    }
}
