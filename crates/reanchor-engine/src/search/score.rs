use super::config::{Bucket, ScoringConfig};
use super::tokenize::{CodeLine, CodeToken};

/// Edit distance between two strings, counted in chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j]
            } else {
                1 + previous[j].min(previous[j + 1]).min(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Scores how alike two tokens or two lines are. Lower is more similar.
///
/// Token weights are shifted so that an identical token at the identical
/// position scores 0; line weights multiply the mean token weight by a
/// line-level factor so that lines sharing a few short common tokens are not
/// over-ranked.
#[derive(Debug, Clone, Copy)]
pub struct SimilarityScorer<'a> {
    config: &'a ScoringConfig,
}

impl<'a> SimilarityScorer<'a> {
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self { config }
    }

    /// Unshifted token weight: match bonus, plus reciprocal line-distance and
    /// Levenshtein classes, minus the reciprocal offset class.
    pub fn raw_token_weight(
        &self,
        candidate: &CodeToken,
        anchor: &CodeToken,
        candidate_line: usize,
        anchor_line: usize,
    ) -> f64 {
        let config = self.config;
        let mut weight = 0.0;

        if candidate.token == anchor.token {
            weight += config.exact_match_bonus;
        } else if !candidate.is_empty()
            && !anchor.is_empty()
            && (candidate.token.contains(&anchor.token) || anchor.token.contains(&candidate.token))
        {
            weight += config.substring_bonus;
        }

        let line_bucket = Bucket::of(
            candidate_line.abs_diff(anchor_line),
            config.line_close_within,
            config.line_near_within,
        );
        weight += config.line_distance_classes.reciprocal(line_bucket);

        let distance = levenshtein(&candidate.token, &anchor.token);
        let lev_bucket = Bucket::of(
            distance,
            config.levenshtein_close_within,
            config.levenshtein_near_within,
        );
        weight += config.levenshtein_classes.reciprocal(lev_bucket);

        weight -= 1.0 / self.offset_class(candidate.offset.abs_diff(anchor.offset));
        weight
    }

    fn offset_class(&self, distance: usize) -> f64 {
        let classes = &self.config.offset_classes;
        if distance == 0 {
            classes.same
        } else if distance <= self.config.offset_close_within {
            classes.close
        } else {
            classes.far
        }
    }

    /// Raw weight of an identical token at the identical position.
    pub fn best_raw_token_weight(&self) -> f64 {
        let config = self.config;
        config.exact_match_bonus
            + config.line_distance_classes.reciprocal(Bucket::Exact)
            + config.levenshtein_classes.reciprocal(Bucket::Exact)
            - 1.0 / config.offset_classes.same
    }

    /// Raw weight of an unrelated token far away.
    pub fn worst_raw_token_weight(&self) -> f64 {
        let config = self.config;
        config.line_distance_classes.reciprocal(Bucket::Far)
            + config.levenshtein_classes.reciprocal(Bucket::Far)
            - 1.0 / config.offset_classes.far
    }

    /// Token weight shifted so the best possible match scores 0.
    pub fn token_weight(
        &self,
        candidate: &CodeToken,
        anchor: &CodeToken,
        candidate_line: usize,
        anchor_line: usize,
    ) -> f64 {
        let raw = self.raw_token_weight(candidate, anchor, candidate_line, anchor_line);
        (raw - self.best_raw_token_weight()).max(0.0)
    }

    /// Mean over the anchor line's tokens of each one's best match in the
    /// candidate line. A blank line against a non-blank one gets the worst
    /// possible token weight; two blank lines match perfectly.
    pub fn mean_token_weight(&self, candidate: &CodeLine, anchor: &CodeLine) -> f64 {
        match (candidate.tokens.is_empty(), anchor.tokens.is_empty()) {
            (true, true) => 0.0,
            (true, false) | (false, true) => {
                self.worst_raw_token_weight() - self.best_raw_token_weight()
            }
            (false, false) => {
                let total: f64 = anchor
                    .tokens
                    .iter()
                    .map(|anchor_token| {
                        candidate
                            .tokens
                            .iter()
                            .map(|token| {
                                self.token_weight(token, anchor_token, candidate.line, anchor.line)
                            })
                            .fold(f64::INFINITY, f64::min)
                    })
                    .sum();
                total / anchor.tokens.len() as f64
            }
        }
    }

    fn line_levenshtein_weight(&self, distance: usize) -> f64 {
        let config = self.config;
        config
            .line_levenshtein_limits
            .iter()
            .position(|&limit| distance <= limit)
            .map(|bucket| config.line_levenshtein_weights[bucket])
            .unwrap_or(config.line_levenshtein_weights[config.line_levenshtein_limits.len()])
    }

    /// Line-level multiplier: whole-line edit distance, line distance, token
    /// count difference, blank-line bonus and the punctuation-only penalty.
    pub fn line_factor(&self, candidate: &CodeLine, anchor: &CodeLine) -> f64 {
        let config = self.config;
        let mut factor = config.line_weight_base;

        factor += self.line_levenshtein_weight(levenshtein(&candidate.joined(), &anchor.joined()));

        let line_bucket = Bucket::of(
            candidate.line.abs_diff(anchor.line),
            config.line_close_within,
            config.line_near_within,
        );
        factor += config.line_distance_weights.weight(line_bucket);

        factor += config.token_count_scale * candidate.tokens.len().abs_diff(anchor.tokens.len()) as f64;

        if candidate.is_empty || anchor.is_empty {
            factor += config.blank_line_bonus;
        }
        if candidate.is_punctuation_only() && !anchor.is_punctuation_only() {
            factor += config.punctuation_penalty;
        }

        factor.max(0.0)
    }

    pub fn line_weight(&self, candidate: &CodeLine, anchor: &CodeLine) -> f64 {
        self.mean_token_weight(candidate, anchor) * self.line_factor(candidate, anchor)
    }

    /// Mean line weight of a window against the anchor's lines.
    ///
    /// Equal heights pair lines in order. Otherwise (a window truncated at the
    /// end of the document) every anchor line is scored against its best
    /// window line.
    pub fn window_weight(&self, window: &[CodeLine], anchor: &[CodeLine]) -> f64 {
        if window.is_empty() || anchor.is_empty() {
            return f64::INFINITY;
        }

        let total: f64 = if window.len() == anchor.len() {
            window
                .iter()
                .zip(anchor)
                .map(|(candidate, anchor_line)| self.line_weight(candidate, anchor_line))
                .sum()
        } else {
            anchor
                .iter()
                .map(|anchor_line| {
                    window
                        .iter()
                        .map(|candidate| self.line_weight(candidate, anchor_line))
                        .fold(f64::INFINITY, f64::min)
                })
                .sum()
        };
        total / anchor.len() as f64
    }
}
