use regex::Regex;
use std::sync::OnceLock;

use crate::document::Document;
use crate::models::Position;

/// A whitespace-delimited token and the column it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeToken {
    pub token: String,
    /// Absolute column, in chars.
    pub offset: usize,
}

impl CodeToken {
    pub fn new(token: impl Into<String>, offset: usize) -> Self {
        Self {
            token: token.into(),
            offset,
        }
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.token.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }

    /// Column just past the token.
    pub fn end(&self) -> usize {
        self.offset + self.len()
    }

    /// True for tokens made only of punctuation/symbols, like `}`, `);` or `=>`.
    pub fn is_punctuation(&self) -> bool {
        static PUNCTUATION: OnceLock<Regex> = OnceLock::new();
        PUNCTUATION
            .get_or_init(|| Regex::new(r"^[\p{P}\p{S}]+$").expect("Invalid punctuation regex"))
            .is_match(&self.token)
    }
}

/// Tokenized view of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLine {
    pub line: usize,
    /// True when the line holds nothing but whitespace.
    pub is_empty: bool,
    pub tokens: Vec<CodeToken>,
}

impl CodeLine {
    pub fn new(line: usize, tokens: Vec<CodeToken>) -> Self {
        Self {
            line,
            is_empty: tokens.is_empty(),
            tokens,
        }
    }

    /// Tokens joined by single spaces; indentation and spacing differences are
    /// ignored.
    pub fn joined(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.token.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// A non-empty line whose every token is punctuation.
    pub fn is_punctuation_only(&self) -> bool {
        !self.tokens.is_empty() && self.tokens.iter().all(CodeToken::is_punctuation)
    }

    pub fn first_token(&self) -> Option<&CodeToken> {
        self.tokens.first()
    }

    pub fn last_token(&self) -> Option<&CodeToken> {
        self.tokens.last()
    }

    /// The same line restricted to tokens starting in `[from, to)`.
    pub fn restricted(&self, from: usize, to: usize) -> CodeLine {
        let tokens = self
            .tokens
            .iter()
            .filter(|t| t.offset >= from && t.offset < to)
            .cloned()
            .collect();
        CodeLine::new(self.line, tokens)
    }
}

/// Splits one line into tokens. `line_number` and `base_offset` are added to the
/// line index and every column.
pub fn tokenize_line(text: &str, line_number: usize, base_offset: usize) -> CodeLine {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut start = 0;

    for (column, ch) in text.chars().enumerate() {
        if ch.is_whitespace() {
            if !current.is_empty() {
                tokens.push(CodeToken::new(std::mem::take(&mut current), base_offset + start));
            }
        } else {
            if current.is_empty() {
                start = column;
            }
            current.push(ch);
        }
    }
    if !current.is_empty() {
        tokens.push(CodeToken::new(current, base_offset + start));
    }

    CodeLine::new(line_number, tokens)
}

/// Tokenizes `text` line by line.
///
/// With an `origin`, line numbers start at `origin.line` and the first line's
/// columns start at `origin.offset`, so tokens of a sliced range carry their
/// real document coordinates.
pub fn tokenize(text: &str, origin: Option<Position>) -> Vec<CodeLine> {
    let origin = origin.unwrap_or_default();
    text.split('\n')
        .enumerate()
        .map(|(index, line)| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let base_offset = if index == 0 { origin.offset } else { 0 };
            tokenize_line(line, origin.line + index, base_offset)
        })
        .collect()
}

/// Tokenizes every line of the document.
pub fn tokenize_document(document: &Document) -> Vec<CodeLine> {
    document
        .lines()
        .iter()
        .enumerate()
        .map(|(index, line)| tokenize_line(line, index, 0))
        .collect()
}

/// Tokenizes a block of captured lines, numbering them from `first_line`.
pub fn tokenize_block(lines: &[String], first_line: usize) -> Vec<CodeLine> {
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| tokenize_line(line, first_line + index, 0))
        .collect()
}
