use super::tokenize::{CodeLine, CodeToken};
use crate::document::Document;
use crate::models::{Anchor, Position};

fn tokens_from(
    lines: &[CodeLine],
    start: Position,
) -> impl Iterator<Item = (usize, &CodeToken)> {
    lines
        .iter()
        .filter(move |line| line.line >= start.line)
        .flat_map(|line| line.tokens.iter().map(move |token| (line.line, token)))
        .filter(move |(line, token)| *line > start.line || token.offset >= start.offset)
}

/// Grows a candidate's end so that it covers the whole anchor text.
///
/// First tries to rebuild the anchor's whitespace-free text by concatenating
/// document tokens from the candidate start. Failing that, matches the anchor
/// tokens as an in-order subsequence within `anchor tokens * span_factor`
/// document tokens. The result never ends before `candidate` does.
pub fn expand(
    candidate: Anchor,
    anchor_lines: &[CodeLine],
    document_lines: &[CodeLine],
    span_factor: usize,
) -> Anchor {
    let anchor_tokens: Vec<&CodeToken> = anchor_lines.iter().flat_map(|l| &l.tokens).collect();
    if anchor_tokens.is_empty() {
        return candidate;
    }

    let end = concatenated_end(candidate.start(), &anchor_tokens, document_lines).or_else(|| {
        subsequence_end(
            candidate.start(),
            &anchor_tokens,
            document_lines,
            anchor_tokens.len() * span_factor.max(1),
        )
    });

    match end {
        Some(end) if end > candidate.end() => {
            log::trace!("Expanded candidate {candidate} to end at {end}");
            Anchor::new(candidate.start(), end)
        }
        _ => candidate,
    }
}

fn concatenated_end(
    start: Position,
    anchor_tokens: &[&CodeToken],
    document_lines: &[CodeLine],
) -> Option<Position> {
    let target: String = anchor_tokens.iter().map(|t| t.token.as_str()).collect();
    let mut built = String::new();

    for (line, token) in tokens_from(document_lines, start) {
        built.push_str(&token.token);
        if built == target {
            return Some(Position::new(line, token.end()));
        }
        if !target.starts_with(&built) {
            return None;
        }
    }
    None
}

fn subsequence_end(
    start: Position,
    anchor_tokens: &[&CodeToken],
    document_lines: &[CodeLine],
    limit: usize,
) -> Option<Position> {
    let mut next = 0;

    for (line, token) in tokens_from(document_lines, start).take(limit) {
        if token.token == anchor_tokens[next].token {
            next += 1;
            if next == anchor_tokens.len() {
                return Some(Position::new(line, token.end()));
            }
        } else if next == 0 {
            return None;
        }
    }
    None
}

/// Narrows a single-line candidate onto an exact occurrence of `anchor_text`
/// inside it, for anchors that start or end in the middle of a token.
pub fn snap_to_text(candidate: Anchor, anchor_text: &str, document: &Document) -> Anchor {
    if anchor_text.is_empty() || anchor_text.contains('\n') || !candidate.is_single_line() {
        return candidate;
    }
    let Some(line) = document.line(candidate.start_line) else {
        return candidate;
    };

    let width = anchor_text.chars().count();
    line.match_indices(anchor_text)
        .map(|(byte, _)| line[..byte].chars().count())
        .filter(|&column| {
            column >= candidate.start_offset && column + width <= candidate.end_offset
        })
        .min_by_key(|&column| column - candidate.start_offset)
        .map(|column| {
            Anchor::new(
                Position::new(candidate.start_line, column),
                Position::new(candidate.start_line, column + width),
            )
        })
        .unwrap_or(candidate)
}
