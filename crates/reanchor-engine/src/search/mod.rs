/*!
 * # Re-anchor Search
 *
 * Finds where a stale anchor's text went, by fuzzy matching the whitespace
 * tokens of the anchor (and of its captured context) against the current
 * document.
 *
 * ## Scoring
 *
 * [`SimilarityScorer`] works at two levels. Each token pair gets a weight from
 * exact/substring match, token edit distance, line distance and column drift.
 * Each line pair then multiplies the mean best-match token weight by a factor
 * built from whole-line edit distance, line distance, token count difference,
 * a blank-line bonus and a penalty for punctuation-only lines. Lower is more
 * similar; an unmoved, unchanged anchor scores 0.
 *
 * ## Phases
 *
 * [`ProximitySearch`] runs four phases and merges their candidates:
 *
 * 1. `multi_line_scan` - anchor-height windows over the whole document
 * 2. `locale_recheck` - best match near the old location, if it still looks familiar
 * 3. `context_scan` - the span between (or next to) the relocated context blocks
 * 4. `fallback_scan` - capped whole-document scan
 *
 * Candidates are ranked by weight, ties going to the one nearest the old
 * location, and the winner is grown to cover the whole anchor text.
 *
 * Nothing here mutates an anchor. Results are [`PotentialAnchorObject`]s the
 * caller may accept or ignore.
 *
 * [`PotentialAnchorObject`]: crate::models::PotentialAnchorObject
 */

pub mod config;
pub mod expand;
pub mod proximity;
pub mod score;
pub mod select;
pub mod tokenize;

pub use config::{ReanchorConfig, ScoringConfig, SearchConfig};
pub use proximity::{Candidate, ProximitySearch, SearchInput, reanchor, reanchor_until};
pub use score::{SimilarityScorer, levenshtein};
pub use tokenize::{CodeLine, CodeToken, tokenize, tokenize_document};
