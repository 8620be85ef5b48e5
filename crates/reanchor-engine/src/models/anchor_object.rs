use relative_path::RelativePathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::anchor::{Anchor, AnchorType};
use crate::document::Document;

/// Unique identifier for an anchor
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct AnchorId(pub Uuid);

impl AnchorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AnchorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which file (and which git state of it) an anchor was made against.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileIdentity {
    pub path: RelativePathBuf,
    #[serde(default)]
    pub git_url: Option<String>,
    #[serde(default)]
    pub git_branch: Option<String>,
    #[serde(default)]
    pub git_commit: Option<String>,
}

impl FileIdentity {
    pub fn from_path(path: impl Into<RelativePathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// Lines captured directly above and below an anchor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SurroundingCode {
    pub lines_before: Vec<String>,
    pub lines_after: Vec<String>,
}

impl SurroundingCode {
    /// Captures up to `n` lines on each side of the anchor.
    pub fn capture(document: &Document, anchor: &Anchor, n: usize) -> Self {
        let first = anchor.start_line.saturating_sub(n);
        let lines_before = (first..anchor.start_line)
            .filter_map(|line| document.line(line))
            .collect();

        let last = (anchor.end_line + n).min(document.line_count().saturating_sub(1));
        let lines_after = (anchor.end_line + 1..=last)
            .filter_map(|line| document.line(line))
            .collect();

        Self {
            lines_before,
            lines_after,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines_before.is_empty() && self.lines_after.is_empty()
    }
}

/// An anchor plus its cached text snapshot and linking metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorObject {
    pub anchor_id: AnchorId,
    /// Annotation this anchor belongs to.
    pub parent_id: Uuid,
    pub anchor: Anchor,
    pub anchor_text: String,
    pub anchor_type: AnchorType,
    pub file: FileIdentity,
    /// Structural location supplied by the syntax-tree collaborator. Opaque here.
    #[serde(default)]
    pub path: Vec<String>,
    #[serde(default)]
    pub surrounding_code: SurroundingCode,
}

impl AnchorObject {
    /// Snapshots `anchor` from `document` into a fresh anchor object.
    pub fn capture(
        document: &Document,
        anchor: Anchor,
        file: FileIdentity,
        parent_id: Uuid,
        path: Vec<String>,
        surrounding_lines: usize,
    ) -> Self {
        let anchor = document.clamp(&anchor);
        Self {
            anchor_id: AnchorId::new(),
            parent_id,
            anchor,
            anchor_text: document.slice(&anchor),
            anchor_type: AnchorType::classify(&anchor, document),
            file,
            path,
            surrounding_code: SurroundingCode::capture(document, &anchor, surrounding_lines),
        }
    }

    /// True when the cached text no longer matches what the document holds at
    /// the anchor's range.
    pub fn is_stale(&self, document: &Document) -> bool {
        !document.is_valid(&self.anchor) || document.slice(&self.anchor) != self.anchor_text
    }

    /// Replaces the range and refreshes everything derived from it.
    pub fn relocate(&mut self, anchor: Anchor, document: &Document) {
        self.anchor = anchor;
        self.anchor_text = document.slice(&anchor);
        self.anchor_type = AnchorType::classify(&anchor, document);
    }
}

/// Why a relocation candidate was proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReasonSuggested {
    /// Window scan sized to a multi-line anchor.
    MultiLine,
    /// Best match near where the anchor used to be.
    Locale,
    /// Span between the captured context blocks.
    Context,
    /// Whole-document sliding window.
    Fallback,
    /// Single-token anchor matched against individual tokens.
    SingleToken,
}

impl fmt::Display for ReasonSuggested {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReasonSuggested::MultiLine => "multi-line",
            ReasonSuggested::Locale => "locale",
            ReasonSuggested::Context => "context",
            ReasonSuggested::Fallback => "fallback",
            ReasonSuggested::SingleToken => "single-token",
        };
        f.write_str(label)
    }
}

/// A proposed relocation. Lower `weight` means more similar.
///
/// Never replaces an [`AnchorObject`] on its own; the caller has to accept it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotentialAnchorObject {
    pub candidate_id: Uuid,
    pub anchor_id: AnchorId,
    pub parent_id: Uuid,
    pub anchor: Anchor,
    pub anchor_text: String,
    pub anchor_type: AnchorType,
    pub file: FileIdentity,
    pub path: Vec<String>,
    pub weight: f64,
    pub reason_suggested: ReasonSuggested,
}

impl PotentialAnchorObject {
    pub fn from_candidate(
        original: &AnchorObject,
        anchor: Anchor,
        weight: f64,
        reason: ReasonSuggested,
        document: &Document,
    ) -> Self {
        Self {
            candidate_id: Uuid::new_v4(),
            anchor_id: original.anchor_id,
            parent_id: original.parent_id,
            anchor,
            anchor_text: document.slice(&anchor),
            anchor_type: AnchorType::classify(&anchor, document),
            file: original.file.clone(),
            path: original.path.clone(),
            weight,
            reason_suggested: reason,
        }
    }

    /// Turns the candidate into the anchor object that replaces the original.
    ///
    /// The surrounding context is recaptured from `document`.
    pub fn accept(&self, document: &Document, surrounding_lines: usize) -> AnchorObject {
        AnchorObject {
            anchor_id: self.anchor_id,
            parent_id: self.parent_id,
            anchor: self.anchor,
            anchor_text: self.anchor_text.clone(),
            anchor_type: self.anchor_type,
            file: self.file.clone(),
            path: self.path.clone(),
            surrounding_code: SurroundingCode::capture(document, &self.anchor, surrounding_lines),
        }
    }
}
