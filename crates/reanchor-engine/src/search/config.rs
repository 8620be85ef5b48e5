use serde::{Deserialize, Serialize};

/// Distance bucket shared by the line, token-Levenshtein and offset classifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Exact,
    Close,
    Near,
    Far,
}

impl Bucket {
    /// Buckets `distance`: 0 is exact, up to `close_within` is close, up to
    /// `near_within` is near, anything further is far.
    pub fn of(distance: usize, close_within: usize, near_within: usize) -> Self {
        if distance == 0 {
            Bucket::Exact
        } else if distance <= close_within {
            Bucket::Close
        } else if distance <= near_within {
            Bucket::Near
        } else {
            Bucket::Far
        }
    }
}

/// Numeric class per bucket. Scores use the reciprocal of the class, so a
/// bigger class means a smaller contribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketClasses {
    pub exact: f64,
    pub close: f64,
    pub near: f64,
    pub far: f64,
}

impl BucketClasses {
    pub fn class(&self, bucket: Bucket) -> f64 {
        match bucket {
            Bucket::Exact => self.exact,
            Bucket::Close => self.close,
            Bucket::Near => self.near,
            Bucket::Far => self.far,
        }
    }

    pub fn reciprocal(&self, bucket: Bucket) -> f64 {
        1.0 / self.class(bucket)
    }
}

/// Offset classes; the offset term enters the score sign-flipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetClasses {
    pub same: f64,
    pub close: f64,
    pub far: f64,
}

/// Additive weight per bucket (used by the line-level factor).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketWeights {
    pub exact: f64,
    pub close: f64,
    pub near: f64,
    pub far: f64,
}

impl BucketWeights {
    pub fn weight(&self, bucket: Bucket) -> f64 {
        match bucket {
            Bucket::Exact => self.exact,
            Bucket::Close => self.close,
            Bucket::Near => self.near,
            Bucket::Far => self.far,
        }
    }
}

/// Every constant the similarity scorer uses.
///
/// The relative sizes matter more than the absolute values: exact matches beat
/// substring matches, nearby lines beat distant ones, punctuation-only lines
/// are pushed far down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub exact_match_bonus: f64,
    pub substring_bonus: f64,

    pub line_close_within: usize,
    pub line_near_within: usize,
    pub line_distance_classes: BucketClasses,

    pub levenshtein_close_within: usize,
    pub levenshtein_near_within: usize,
    pub levenshtein_classes: BucketClasses,

    pub offset_close_within: usize,
    pub offset_classes: OffsetClasses,

    /// Upper edit distances for the first four line-Levenshtein buckets; the
    /// fifth bucket is everything beyond the last limit.
    pub line_levenshtein_limits: [usize; 4],
    pub line_levenshtein_weights: [f64; 5],
    pub line_distance_weights: BucketWeights,
    pub token_count_scale: f64,
    pub blank_line_bonus: f64,
    pub punctuation_penalty: f64,
    pub line_weight_base: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            exact_match_bonus: -0.3,
            substring_bonus: -0.2,

            line_close_within: 3,
            line_near_within: 10,
            line_distance_classes: BucketClasses {
                exact: 10.0,
                close: 8.0,
                near: 6.0,
                far: 4.0,
            },

            levenshtein_close_within: 2,
            levenshtein_near_within: 5,
            levenshtein_classes: BucketClasses {
                exact: 4.0,
                close: 3.0,
                near: 2.0,
                far: 1.0,
            },

            offset_close_within: 4,
            offset_classes: OffsetClasses {
                same: 2.0,
                close: 3.0,
                far: 4.0,
            },

            line_levenshtein_limits: [0, 3, 8, 15],
            line_levenshtein_weights: [0.0, 0.25, 0.5, 0.75, 1.0],
            line_distance_weights: BucketWeights {
                exact: 0.0,
                close: 0.05,
                near: 0.1,
                far: 0.2,
            },
            token_count_scale: 0.1,
            blank_line_bonus: -0.5,
            punctuation_penalty: 10.0,
            line_weight_base: 1.0,
        }
    }
}

/// Thresholds and sizes for the search phases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Lines above and below the original location checked by the locale phase.
    pub num_surrounding_lines: usize,
    pub high_similarity_threshold: f64,
    pub passable_threshold: f64,
    pub max_fallback_results: usize,
    /// Added to context-derived candidates, whose body was not matched.
    pub context_penalty: f64,
    /// How many source tokens anchor expansion may span per anchor token.
    pub expansion_span_factor: usize,
    /// Weights closer than this are treated as tied.
    pub tie_epsilon: f64,
    /// Extra lines a multi-line window may grow by when pairing lines in order
    /// scores badly, to absorb lines inserted inside a moved block.
    pub window_slack: usize,
    /// Added per extra line to the weight of a grown window.
    pub window_slack_penalty: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_surrounding_lines: 5,
            high_similarity_threshold: 0.3,
            passable_threshold: 0.8,
            max_fallback_results: 10,
            context_penalty: 0.3,
            expansion_span_factor: 2,
            tie_epsilon: 1e-9,
            window_slack: 2,
            window_slack_penalty: 0.02,
        }
    }
}

/// Everything the re-anchor search needs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReanchorConfig {
    pub scoring: ScoringConfig,
    pub search: SearchConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, Bucket::Exact)]
    #[case(1, Bucket::Close)]
    #[case(3, Bucket::Close)]
    #[case(4, Bucket::Near)]
    #[case(10, Bucket::Near)]
    #[case(11, Bucket::Far)]
    fn test_line_distance_buckets(#[case] distance: usize, #[case] expected: Bucket) {
        assert_eq!(Bucket::of(distance, 3, 10), expected);
    }

    #[test]
    fn test_reciprocal_shrinks_with_class() {
        let classes = ScoringConfig::default().line_distance_classes;
        assert!(classes.reciprocal(Bucket::Exact) < classes.reciprocal(Bucket::Close));
        assert!(classes.reciprocal(Bucket::Near) < classes.reciprocal(Bucket::Far));
    }

    #[test]
    fn test_thresholds_keep_their_order() {
        let search = SearchConfig::default();
        assert!(search.high_similarity_threshold < search.passable_threshold);
    }
}
