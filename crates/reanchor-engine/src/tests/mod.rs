use uuid::Uuid;

use crate::document::Document;
use crate::models::{Anchor, AnchorObject, FileIdentity, Position};

mod integration;

/// Shorthand for an anchor from raw coordinates
pub fn anchor(start_line: usize, start_offset: usize, end_line: usize, end_offset: usize) -> Anchor {
    Anchor::new(
        Position::new(start_line, start_offset),
        Position::new(end_line, end_offset),
    )
}

/// Capture an anchor object over `text` with five lines of context
pub fn capture(text: &str, anchor: Anchor) -> AnchorObject {
    AnchorObject::capture(
        &Document::new(text),
        anchor,
        FileIdentity::from_path("src/main.rs"),
        Uuid::new_v4(),
        Vec::new(),
        5,
    )
}
