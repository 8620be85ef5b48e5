use anyhow::{Context, Result, bail};
use reanchor_engine::{Anchor, AnchorObject, Position};
use std::path::Path;
use std::process::ExitCode;
use uuid::Uuid;

use super::{Settings, read_document};
use crate::output::print_json;

pub fn run(
    settings: &Settings,
    document_path: &Path,
    range: &str,
    parent: Option<Uuid>,
) -> Result<ExitCode> {
    let document = read_document(document_path)?;
    let anchor = parse_range(range)?;
    if !document.is_valid(&anchor) {
        log::warn!("Range {anchor} lies outside the document; clamping it");
    }

    let object = AnchorObject::capture(
        &document,
        anchor,
        settings.file_identity(document_path)?,
        parent.unwrap_or_else(Uuid::new_v4),
        Vec::new(),
        settings.config.surrounding_lines,
    );
    print_json(&object)?;
    Ok(ExitCode::SUCCESS)
}

/// Parses `LINE:COL-LINE:COL`.
pub fn parse_range(range: &str) -> Result<Anchor> {
    let Some((start, end)) = range.split_once('-') else {
        bail!("Invalid range '{range}': expected LINE:COL-LINE:COL");
    };
    let start = parse_position(start).with_context(|| format!("Invalid range '{range}'"))?;
    let end = parse_position(end).with_context(|| format!("Invalid range '{range}'"))?;
    if end < start {
        bail!("Invalid range '{range}': end comes before start");
    }
    Ok(Anchor::new(start, end))
}

fn parse_position(text: &str) -> Result<Position> {
    let Some((line, offset)) = text.trim().split_once(':') else {
        bail!("expected LINE:COL, got '{text}'");
    };
    let line = line.parse().with_context(|| format!("bad line number '{line}'"))?;
    let offset = offset.parse().with_context(|| format!("bad column '{offset}'"))?;
    Ok(Position::new(line, offset))
}
