use std::cmp::Ordering;

use super::score::SimilarityScorer;
use super::tokenize::{CodeLine, CodeToken};
use crate::models::{Anchor, Position};

/// Orders two weights, treating anything within `epsilon` as a tie that is
/// broken by distance to `original_line`.
pub fn compare(
    (weight_a, line_a): (f64, usize),
    (weight_b, line_b): (f64, usize),
    original_line: usize,
    epsilon: f64,
) -> Ordering {
    if (weight_a - weight_b).abs() <= epsilon {
        line_a
            .abs_diff(original_line)
            .cmp(&line_b.abs_diff(original_line))
    } else {
        weight_a.total_cmp(&weight_b)
    }
}

/// Index of the lowest-weight item, ties going to the item nearest
/// `original_line`. The first of equally near items wins.
pub fn select_best<T>(
    items: &[T],
    key: impl Fn(&T) -> (f64, usize),
    original_line: usize,
    epsilon: f64,
) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, item) in items.iter().enumerate() {
        match best {
            None => best = Some(index),
            Some(current) => {
                if compare(key(item), key(&items[current]), original_line, epsilon)
                    == Ordering::Less
                {
                    best = Some(index);
                }
            }
        }
    }
    best
}

/// Picks the token of `line` most like `target`, looking only at tokens
/// starting at or after `min_offset`. Ties go to the token whose offset is
/// closest to the target's.
pub fn best_token<'a>(
    scorer: &SimilarityScorer<'_>,
    line: &'a CodeLine,
    target: &CodeToken,
    target_line: usize,
    min_offset: usize,
    epsilon: f64,
) -> Option<&'a CodeToken> {
    let candidates: Vec<&CodeToken> = line
        .tokens
        .iter()
        .filter(|token| token.offset >= min_offset)
        .collect();

    let best = select_best(
        &candidates,
        |token| {
            (
                scorer.token_weight(token, target, line.line, target_line),
                token.offset,
            )
        },
        target.offset,
        epsilon,
    )?;
    Some(candidates[best])
}

/// Anchor running from the start of `start` to the end of `end`.
pub fn anchor_from_tokens(
    start_line: usize,
    start: &CodeToken,
    end_line: usize,
    end: &CodeToken,
) -> Anchor {
    Anchor::new(
        Position::new(start_line, start.offset),
        Position::new(end_line, end.end()),
    )
}
