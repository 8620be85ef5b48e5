use std::collections::HashSet;

use super::config::ReanchorConfig;
use super::expand::{expand, snap_to_text};
use super::score::SimilarityScorer;
use super::select::{anchor_from_tokens, best_token, select_best};
use super::tokenize::{CodeLine, CodeToken, tokenize, tokenize_block, tokenize_document};
use crate::document::Document;
use crate::models::{
    Anchor, AnchorObject, AnchorType, Position, PotentialAnchorObject, ReasonSuggested,
};

/// Tokenized view of a stale anchor, its captured context and the current
/// document.
///
/// Anchor and context tokens keep the coordinates they had when captured, so
/// line-distance scoring measures how far a candidate is from where the
/// anchor used to be.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchInput {
    pub anchor_lines: Vec<CodeLine>,
    pub before_lines: Vec<CodeLine>,
    pub after_lines: Vec<CodeLine>,
    pub document_lines: Vec<CodeLine>,
    pub anchor_start_line: usize,
    pub anchor_end_line: usize,
    pub anchor_type: AnchorType,
}

impl SearchInput {
    pub fn new(object: &AnchorObject, document: &Document) -> Self {
        let anchor = object.anchor;
        let context = &object.surrounding_code;
        Self {
            anchor_lines: tokenize(&object.anchor_text, Some(anchor.start())),
            before_lines: tokenize_block(
                &context.lines_before,
                anchor.start_line.saturating_sub(context.lines_before.len()),
            ),
            after_lines: tokenize_block(&context.lines_after, anchor.end_line + 1),
            document_lines: tokenize_document(document),
            anchor_start_line: anchor.start_line,
            anchor_end_line: anchor.end_line,
            anchor_type: object.anchor_type,
        }
    }

    /// Number of lines the anchor text spans.
    pub fn height(&self) -> usize {
        self.anchor_lines.len().max(1)
    }

    pub fn token_count(&self) -> usize {
        self.anchor_lines.iter().map(|line| line.tokens.len()).sum()
    }

    /// The anchor's only token, when it has exactly one.
    pub fn single_token(&self) -> Option<(usize, &CodeToken)> {
        if self.token_count() != 1 {
            return None;
        }
        self.anchor_lines
            .iter()
            .find_map(|line| line.first_token().map(|token| (line.line, token)))
    }

    fn is_punctuation_only(&self) -> bool {
        self.anchor_lines
            .iter()
            .flat_map(|line| &line.tokens)
            .all(CodeToken::is_punctuation)
    }
}

/// One scored location found by a search phase.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub anchor: Anchor,
    pub weight: f64,
    pub reason: ReasonSuggested,
}

type Phase<'a> = fn(&ProximitySearch<'a>) -> Vec<Candidate>;

/// Multi-phase search for where a stale anchor's text went.
///
/// Phases run in a fixed order, each adding candidates: a height-sized window
/// scan for multi-line anchors, a recheck around the original location, a
/// scan guided by the captured context blocks, and a whole-document fallback.
/// [`ProximitySearch::run`] merges and ranks what they find.
pub struct ProximitySearch<'a> {
    input: &'a SearchInput,
    config: &'a ReanchorConfig,
    scorer: SimilarityScorer<'a>,
}

impl<'a> ProximitySearch<'a> {
    pub fn new(input: &'a SearchInput, config: &'a ReanchorConfig) -> Self {
        Self {
            input,
            config,
            scorer: SimilarityScorer::new(&config.scoring),
        }
    }

    fn passable(&self) -> f64 {
        self.config.search.passable_threshold
    }

    fn epsilon(&self) -> f64 {
        self.config.search.tie_epsilon
    }

    fn document_len(&self) -> usize {
        self.input.document_lines.len()
    }

    /// Start lines of anchor-height windows lying inside `[from, to)`. A region
    /// shorter than the anchor still yields one (truncated) window.
    fn window_starts(&self, from: usize, to: usize) -> std::ops::RangeInclusive<usize> {
        let last = to.saturating_sub(self.input.height()).max(from);
        from..=last
    }

    /// Scores the anchor-height window starting at document line `start`.
    ///
    /// When pairing lines in order scores at or above the high-similarity
    /// threshold, windows up to `window_slack` lines taller are tried as well,
    /// each extra line costing `window_slack_penalty`. A taller window scores
    /// every anchor line against its best window line, so a line inserted
    /// inside a moved block no longer shifts every pairing after it.
    fn score_window(&self, start: usize, reason: ReasonSuggested) -> Option<Candidate> {
        let height = self.input.height();
        let fitted = self.score_span(start, height, reason);
        let search = &self.config.search;
        let good_enough = fitted
            .as_ref()
            .is_some_and(|candidate| candidate.weight < search.high_similarity_threshold);
        if height < 2 || good_enough {
            return fitted;
        }

        let grown = (1..=search.window_slack).filter_map(|extra| {
            let mut candidate = self.score_span(start, height + extra, reason)?;
            candidate.weight += extra as f64 * search.window_slack_penalty;
            Some(candidate)
        });
        fitted
            .into_iter()
            .chain(grown)
            .min_by(|a, b| a.weight.total_cmp(&b.weight))
    }

    /// Scores the `height`-line window starting at document line `start`.
    ///
    /// The candidate span starts at the token of the first non-blank window
    /// line most like the anchor's first token and ends after the token of the
    /// last non-blank line most like the anchor's last token.
    fn score_span(&self, start: usize, height: usize, reason: ReasonSuggested) -> Option<Candidate> {
        let lines = &self.input.document_lines;
        let end = (start + height).min(lines.len());
        let window = lines.get(start..end)?;

        let first = window.iter().position(|line| !line.is_empty)?;
        let last = window.iter().rposition(|line| !line.is_empty)?;
        let anchor_lines = &self.input.anchor_lines;
        let (first_line, first_token) = anchor_lines
            .iter()
            .find_map(|line| line.first_token().map(|token| (line.line, token)))?;
        let (last_line, last_token) = anchor_lines
            .iter()
            .rev()
            .find_map(|line| line.last_token().map(|token| (line.line, token)))?;

        let start_token = best_token(
            &self.scorer,
            &window[first],
            first_token,
            first_line,
            0,
            self.epsilon(),
        )?;
        let min_end = if first == last { start_token.offset } else { 0 };
        let end_token = best_token(
            &self.scorer,
            &window[last],
            last_token,
            last_line,
            min_end,
            self.epsilon(),
        )?;

        let restricted: Vec<CodeLine> = window
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let from = if index == first { start_token.offset } else { 0 };
                let to = if index == last { end_token.end() } else { usize::MAX };
                line.restricted(from, to)
            })
            .collect();

        Some(Candidate {
            anchor: anchor_from_tokens(window[first].line, start_token, window[last].line, end_token),
            weight: self.scorer.window_weight(&restricted, anchor_lines),
            reason,
        })
    }

    /// Scores every token of `lines` against a single-token anchor.
    fn token_matches(&self, lines: &[CodeLine]) -> Vec<Candidate> {
        let Some((anchor_line, anchor_token)) = self.input.single_token() else {
            return Vec::new();
        };
        let anchor_only = CodeLine::new(anchor_line, vec![anchor_token.clone()]);

        let mut candidates = Vec::new();
        for line in lines {
            for token in &line.tokens {
                let single = CodeLine::new(line.line, vec![token.clone()]);
                candidates.push(Candidate {
                    anchor: Anchor::new(
                        Position::new(line.line, token.offset),
                        Position::new(line.line, token.end()),
                    ),
                    weight: self.scorer.line_weight(&single, &anchor_only),
                    reason: ReasonSuggested::SingleToken,
                });
            }
        }
        candidates
    }

    /// Candidates for every window starting in `[from, to)`, or every token
    /// there for single-token anchors.
    fn scan_region(&self, from: usize, to: usize, reason: ReasonSuggested) -> Vec<Candidate> {
        let to = to.min(self.document_len());
        if from >= to {
            return Vec::new();
        }
        if self.input.single_token().is_some() {
            return self.token_matches(&self.input.document_lines[from..to]);
        }
        self.window_starts(from, to)
            .filter(|&start| start < to)
            .filter_map(|start| self.score_window(start, reason))
            .collect()
    }

    /// Weight of document lines `[from, to)` against `block`, if that region
    /// exists.
    fn region_weight(&self, from: usize, to: usize, block: &[CodeLine]) -> Option<f64> {
        if block.is_empty() {
            return None;
        }
        let to = to.min(self.document_len());
        let window = self.input.document_lines.get(from..to)?;
        if window.is_empty() {
            return None;
        }
        Some(self.scorer.window_weight(window, block))
    }

    fn best_of(&self, candidates: Vec<Candidate>) -> Option<Candidate> {
        let best = select_best(
            &candidates,
            |candidate| (candidate.weight, candidate.anchor.start_line),
            self.input.anchor_start_line,
            self.epsilon(),
        )?;
        candidates.into_iter().nth(best)
    }

    /// Window scan sized to the anchor, for multi-line anchors only.
    pub fn multi_line_scan(&self) -> Vec<Candidate> {
        if !matches!(self.input.anchor_type, AnchorType::MultiLine | AnchorType::File) {
            return Vec::new();
        }
        let passable = self.passable();
        self.scan_region(0, self.document_len(), ReasonSuggested::MultiLine)
            .into_iter()
            .filter(|candidate| candidate.weight < passable)
            .collect()
    }

    /// Rechecks the original location.
    ///
    /// Scores the original span and the regions where the before and after
    /// context used to sit. If the area still looks familiar (average under
    /// the high-similarity threshold, or every region passable), the best
    /// candidate within `num_surrounding_lines` of the original span is
    /// returned.
    pub fn locale_recheck(&self) -> Vec<Candidate> {
        let input = self.input;
        let len = self.document_len();
        if len == 0 {
            return Vec::new();
        }
        let start = input.anchor_start_line.min(len - 1);
        let end = start + input.height() - 1;

        let weights: Vec<f64> = [
            self.region_weight(start, end + 1, &input.anchor_lines),
            self.region_weight(
                start.saturating_sub(input.before_lines.len()),
                start,
                &input.before_lines,
            ),
            self.region_weight(end + 1, end + 1 + input.after_lines.len(), &input.after_lines),
        ]
        .into_iter()
        .flatten()
        .collect();
        if weights.is_empty() {
            return Vec::new();
        }

        let search = &self.config.search;
        let average = weights.iter().sum::<f64>() / weights.len() as f64;
        let all_passable = weights.iter().all(|&weight| weight < search.passable_threshold);
        if average >= search.high_similarity_threshold && !all_passable {
            log::debug!("Locale no longer resembles the anchor (average weight {average:.3})");
            return Vec::new();
        }

        let from = start.saturating_sub(search.num_surrounding_lines);
        let to = end + search.num_surrounding_lines + 1;
        self.best_of(self.scan_region(from, to, ReasonSuggested::Locale))
            .filter(|candidate| candidate.weight < search.passable_threshold)
            .into_iter()
            .collect()
    }

    /// Finds where `block` best fits in the document, preferring the line it
    /// was expected at on ties.
    fn locate_block(&self, block: &[CodeLine]) -> Option<(usize, f64)> {
        let expected = block.first()?.line;
        if block.iter().all(|line| line.is_empty) {
            return None;
        }

        let len = self.document_len();
        let last = len.saturating_sub(block.len());
        let placements: Vec<(usize, f64)> = (0..=last)
            .filter_map(|start| {
                self.region_weight(start, start + block.len(), block)
                    .filter(|&weight| weight < self.passable())
                    .map(|weight| (start, weight))
            })
            .collect();

        let best = select_best(
            &placements,
            |&(start, weight)| (weight, start),
            expected,
            self.epsilon(),
        )?;
        Some(placements[best])
    }

    /// Locates the captured context blocks and proposes what lies between or
    /// next to them.
    ///
    /// Catches anchors whose own text changed beyond recognition while their
    /// neighbourhood survived. The weight is the context match plus a fixed
    /// penalty, since the anchor body itself was not matched.
    pub fn context_scan(&self) -> Vec<Candidate> {
        let input = self.input;
        let before = self.locate_block(&input.before_lines);
        let after = self.locate_block(&input.after_lines);
        let height = input.height();

        let (from, to) = match (before, after) {
            (Some((b, _)), Some((a, _))) => (b + input.before_lines.len(), a),
            (Some((b, _)), None) => {
                let from = b + input.before_lines.len();
                (from, from + height)
            }
            (None, Some((a, _))) => (a.saturating_sub(height), a),
            (None, None) => return Vec::new(),
        };
        let to = to.min(self.document_len());
        if from >= to {
            log::debug!("Context blocks leave no room for the anchor");
            return Vec::new();
        }

        let matched: Vec<f64> = [before, after].into_iter().flatten().map(|(_, w)| w).collect();
        let weight = matched.iter().sum::<f64>() / matched.len() as f64
            + self.config.search.context_penalty;
        if weight >= self.passable() {
            return Vec::new();
        }

        let span = &input.document_lines[from..to];
        let anchor = if input.single_token().is_some() {
            self.best_of(self.token_matches(span)).map(|candidate| candidate.anchor)
        } else {
            let first = span.iter().find(|line| !line.is_empty);
            let last = span.iter().rev().find(|line| !line.is_empty);
            match (first, last) {
                (Some(first), Some(last)) => match (first.first_token(), last.last_token()) {
                    (Some(start), Some(end)) => {
                        Some(anchor_from_tokens(first.line, start, last.line, end))
                    }
                    _ => None,
                },
                _ => None,
            }
        };

        anchor
            .map(|anchor| Candidate {
                anchor,
                weight,
                reason: ReasonSuggested::Context,
            })
            .into_iter()
            .collect()
    }

    /// Sliding-window scan over the regions where the context blocks used to
    /// be, then over the whole document.
    ///
    /// Keeps passable, non-degenerate results, one per start line, capped at
    /// `max_fallback_results`.
    pub fn fallback_scan(&self) -> Vec<Candidate> {
        let input = self.input;
        let regions = [
            (
                input.anchor_start_line.saturating_sub(input.before_lines.len()),
                input.anchor_start_line,
            ),
            (
                input.anchor_end_line + 1,
                input.anchor_end_line + 1 + input.after_lines.len(),
            ),
            (0, self.document_len()),
        ];

        let passable = self.passable();
        let mut candidates: Vec<Candidate> = regions
            .into_iter()
            .flat_map(|(from, to)| self.scan_region(from, to, ReasonSuggested::Fallback))
            .filter(|candidate| candidate.weight < passable && !self.is_degenerate(candidate))
            .collect();

        candidates.sort_by(|a, b| self.rank_order(a, b));
        let mut seen = HashSet::new();
        candidates.retain(|candidate| seen.insert(candidate.anchor.start_line));
        candidates.truncate(self.config.search.max_fallback_results);
        candidates
    }

    fn rank_order(&self, a: &Candidate, b: &Candidate) -> std::cmp::Ordering {
        let original = self.input.anchor_start_line;
        a.weight.total_cmp(&b.weight).then_with(|| {
            a.anchor
                .start_line
                .abs_diff(original)
                .cmp(&b.anchor.start_line.abs_diff(original))
        })
    }

    /// Tokens the candidate covers.
    fn covered_tokens(&self, anchor: &Anchor) -> Vec<&CodeToken> {
        let lines = &self.input.document_lines;
        let last = anchor.end_line.min(lines.len().saturating_sub(1));
        lines
            .get(anchor.start_line..=last)
            .unwrap_or_default()
            .iter()
            .flat_map(|line| {
                line.tokens.iter().filter(move |token| {
                    (line.line > anchor.start_line || token.offset >= anchor.start_offset)
                        && (line.line < anchor.end_line || token.offset < anchor.end_offset)
                })
            })
            .collect()
    }

    /// A candidate covering nothing, or only punctuation, unless the anchor
    /// itself is punctuation.
    fn is_degenerate(&self, candidate: &Candidate) -> bool {
        if self.input.is_punctuation_only() {
            return false;
        }
        self.covered_tokens(&candidate.anchor)
            .iter()
            .all(|token| token.is_punctuation())
    }

    /// Runs every phase and ranks the merged result, best first.
    pub fn run(&self) -> Vec<Candidate> {
        self.run_until(|| false)
    }

    /// Like [`run`](Self::run), but checks `cancelled` before each phase and
    /// ranks whatever was found so far once it returns true.
    pub fn run_until(&self, cancelled: impl Fn() -> bool) -> Vec<Candidate> {
        if self.input.token_count() == 0 {
            log::debug!("Anchor text has no tokens, nothing to search for");
            return Vec::new();
        }

        let phases: [(&str, Phase<'a>); 4] = [
            ("multi-line", Self::multi_line_scan),
            ("locale", Self::locale_recheck),
            ("context", Self::context_scan),
            ("fallback", Self::fallback_scan),
        ];

        let mut found = Vec::new();
        for (name, phase) in phases {
            if cancelled() {
                log::debug!("Search cancelled before {name} phase");
                break;
            }
            let candidates = phase(self);
            log::debug!("{name} phase produced {} candidates", candidates.len());
            found.extend(candidates);
        }
        self.rank(found)
    }

    /// Drops degenerate and duplicate candidates, orders by weight (ties by
    /// distance to the original line) and expands the winner.
    fn rank(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates.retain(|candidate| candidate.weight.is_finite() && !self.is_degenerate(candidate));
        self.order(&mut candidates);

        if let Some(best) = candidates.first_mut() {
            best.anchor = expand(
                best.anchor,
                &self.input.anchor_lines,
                &self.input.document_lines,
                self.config.search.expansion_span_factor,
            );
            log::debug!(
                "Best candidate {} ({}) weight {:.4}",
                best.anchor,
                best.reason,
                best.weight
            );
        }
        candidates
    }

    /// Sorts, removes duplicate ranges and moves the tie-broken best to the
    /// front.
    fn order(&self, candidates: &mut Vec<Candidate>) {
        candidates.sort_by(|a, b| self.rank_order(a, b));

        let mut seen = HashSet::new();
        candidates.retain(|candidate| seen.insert(candidate.anchor));

        if let Some(best) = select_best(
            candidates.as_slice(),
            |candidate| (candidate.weight, candidate.anchor.start_line),
            self.input.anchor_start_line,
            self.epsilon(),
        ) {
            candidates.swap(0, best);
        }
    }

    /// Narrows single-line candidates onto exact occurrences of `anchor_text`
    /// and scores each narrowed range on its own tokens.
    ///
    /// Search works on whole tokens, so an anchor that starts or ends inside a
    /// token never matches its surroundings exactly. Once a candidate is
    /// narrowed, its clipped tokens are scored against the anchor's, and the
    /// list is re-ranked if anything changed.
    pub fn snap(
        &self,
        candidates: Vec<Candidate>,
        anchor_text: &str,
        document: &Document,
    ) -> Vec<Candidate> {
        let mut narrowed = false;
        let mut candidates: Vec<Candidate> = candidates
            .into_iter()
            .map(|candidate| {
                let anchor = snap_to_text(candidate.anchor, anchor_text, document);
                if anchor == candidate.anchor {
                    return candidate;
                }
                narrowed = true;
                let clipped = tokenize(&document.slice(&anchor), Some(anchor.start()));
                let weight = self
                    .scorer
                    .window_weight(&clipped, &self.input.anchor_lines)
                    .min(candidate.weight);
                log::trace!("Snapped {} to {anchor}, weight {weight:.4}", candidate.anchor);
                Candidate {
                    anchor,
                    weight,
                    ..candidate
                }
            })
            .collect();

        if narrowed {
            self.order(&mut candidates);
        }
        candidates
    }
}

/// Searches `document` for the text of a stale anchor and returns relocation
/// candidates, best first.
pub fn reanchor(
    object: &AnchorObject,
    document: &Document,
    config: &ReanchorConfig,
) -> Vec<PotentialAnchorObject> {
    reanchor_until(object, document, config, || false)
}

/// [`reanchor`] with a cancellation check between search phases.
pub fn reanchor_until(
    object: &AnchorObject,
    document: &Document,
    config: &ReanchorConfig,
    cancelled: impl Fn() -> bool,
) -> Vec<PotentialAnchorObject> {
    log::debug!("Re-anchoring {} from {}", object.anchor_id, object.anchor);
    let input = SearchInput::new(object, document);
    let search = ProximitySearch::new(&input, config);
    let candidates = search.run_until(cancelled);
    search
        .snap(candidates, &object.anchor_text, document)
        .into_iter()
        .map(|candidate| {
            PotentialAnchorObject::from_candidate(
                object,
                candidate.anchor,
                candidate.weight,
                candidate.reason,
                document,
            )
        })
        .collect()
}
