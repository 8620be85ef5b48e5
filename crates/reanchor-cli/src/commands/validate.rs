use anyhow::Result;
use reanchor_engine::{Anchor, AnchorId};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

use super::{read_anchor, read_document};
use crate::output::print_json;

#[derive(Serialize)]
struct Validation {
    anchor_id: AnchorId,
    anchor: Anchor,
    stale: bool,
    expected: String,
    found: String,
}

pub fn run(anchor_path: &Path, document_path: &Path) -> Result<ExitCode> {
    let object = read_anchor(anchor_path)?;
    let document = read_document(document_path)?;

    let stale = object.is_stale(&document);
    print_json(&Validation {
        anchor_id: object.anchor_id,
        anchor: object.anchor,
        stale,
        expected: object.anchor_text.clone(),
        found: document.slice(&object.anchor),
    })?;

    Ok(if stale {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}
