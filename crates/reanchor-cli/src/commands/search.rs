use anyhow::Result;
use reanchor_engine::reanchor;
use std::path::Path;
use std::process::ExitCode;

use super::{Settings, read_anchor, read_document};
use crate::output::print_json;

pub fn run(
    settings: &Settings,
    anchor_path: &Path,
    document_path: &Path,
    limit: Option<usize>,
) -> Result<ExitCode> {
    let object = read_anchor(anchor_path)?;
    let document = read_document(document_path)?;

    let mut candidates = reanchor(&object, &document, &settings.config.reanchor());
    if let Some(limit) = limit {
        candidates.truncate(limit);
    }
    if candidates.is_empty() {
        log::info!("No candidates found for anchor {}", object.anchor_id);
    }

    print_json(&candidates)?;
    Ok(ExitCode::SUCCESS)
}
