use anyhow::{Context, Result};
use reanchor_engine::{AnchorObject, TextEdit, Translation, translate_batch};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

use super::{Settings, read_anchor, read_document, read_json};
use crate::output::print_json;

#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
enum Outcome {
    Unchanged,
    Updated { anchor: AnchorObject },
    Deleted,
    Invalidated,
}

impl From<Translation> for Outcome {
    fn from(translation: Translation) -> Self {
        match translation {
            Translation::Unchanged => Outcome::Unchanged,
            Translation::Updated(anchor) => Outcome::Updated { anchor },
            Translation::Deleted => Outcome::Deleted,
            Translation::Invalidated => Outcome::Invalidated,
        }
    }
}

pub fn run(
    settings: &Settings,
    anchor_path: &Path,
    edits_path: &Path,
    document_path: &Path,
    output_document: Option<&Path>,
) -> Result<ExitCode> {
    let object = read_anchor(anchor_path)?;
    let edits: Vec<TextEdit> = read_json(edits_path).context("Expected a JSON array of edits")?;
    let document = read_document(document_path)?;

    let batch = translate_batch(&object, &edits, &document, &settings.config.indent);
    if batch.translation.needs_reanchor() {
        log::info!("Anchor {} needs re-anchoring", object.anchor_id);
    }

    if let Some(path) = output_document {
        std::fs::write(path, batch.document.text())
            .with_context(|| format!("Failed to write document: {}", path.display()))?;
    }

    print_json(&Outcome::from(batch.translation))?;
    Ok(ExitCode::SUCCESS)
}
