use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::Document;

/// A line/column location in a document.
///
/// Lines are 0-based. Offsets count Unicode scalar values from the start of
/// the line, so they line up with what an editor reports as a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, offset: usize) -> Self {
        Self { line, offset }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.offset)
    }
}

/// Line/offset range identifying annotated code.
///
/// Invariant: `(start_line, start_offset) <= (end_line, end_offset)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Anchor {
    pub start_line: usize,
    pub start_offset: usize,
    pub end_line: usize,
    pub end_offset: usize,
}

impl Anchor {
    /// Builds an anchor from two positions, swapping them if they are reversed.
    pub fn new(start: Position, end: Position) -> Self {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        Self {
            start_line: start.line,
            start_offset: start.offset,
            end_line: end.line,
            end_offset: end.offset,
        }
    }

    pub fn start(&self) -> Position {
        Position::new(self.start_line, self.start_offset)
    }

    pub fn end(&self) -> Position {
        Position::new(self.end_line, self.end_offset)
    }

    pub fn is_single_line(&self) -> bool {
        self.start_line == self.end_line
    }

    pub fn is_empty(&self) -> bool {
        self.start() == self.end()
    }

    /// True when `(start) <= (end)` holds.
    pub fn is_ordered(&self) -> bool {
        self.start() <= self.end()
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start(), self.end())
    }
}

/// Shape of the annotated span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorType {
    PartialLine,
    OneLine,
    MultiLine,
    File,
}

impl AnchorType {
    /// Derives the anchor type from where the range sits in the document.
    ///
    /// Leading and trailing whitespace on a line is ignored when deciding
    /// whether a single-line anchor covers the whole line.
    pub fn classify(anchor: &Anchor, document: &Document) -> Self {
        let doc_end = document.end_position();
        if anchor.start() == Position::new(0, 0) && anchor.end() >= doc_end && doc_end.line > 0 {
            return AnchorType::File;
        }
        if !anchor.is_single_line() {
            return AnchorType::MultiLine;
        }

        let Some(line) = document.line(anchor.start_line) else {
            return AnchorType::PartialLine;
        };
        let first_content = line.chars().take_while(|c| c.is_whitespace()).count();
        let last_content = line.trim_end().chars().count();
        if anchor.start_offset <= first_content && anchor.end_offset >= last_content {
            AnchorType::OneLine
        } else {
            AnchorType::PartialLine
        }
    }
}

impl fmt::Display for AnchorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AnchorType::PartialLine => "partial-line",
            AnchorType::OneLine => "one-line",
            AnchorType::MultiLine => "multi-line",
            AnchorType::File => "file",
        };
        f.write_str(label)
    }
}
