//! Logit-to-probability conversion and confidence thresholding.

use crate::detection::Detection;
use crate::trace::{trace_event, trace_span};
use crate::util::math::{clamp_logit, sigmoid};
use crate::util::{SsdFaceError, SsdFaceResult};

/// Logits are clamped to `[-RAW_SCORE_LIMIT, RAW_SCORE_LIMIT]` before the
/// sigmoid.
pub const RAW_SCORE_LIMIT: f32 = 80.0;

/// Default minimum probability for a candidate to survive filtering.
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.3;

/// Parameters for [`filter_scores`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreFilter {
    /// Symmetric clamp applied to raw logits.
    pub limit: f32,
    /// Inclusive minimum probability.
    pub threshold: f32,
}

impl Default for ScoreFilter {
    fn default() -> Self {
        Self {
            limit: RAW_SCORE_LIMIT,
            threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }
}

impl ScoreFilter {
    pub fn validate(&self) -> SsdFaceResult<()> {
        if self.limit.is_nan() || self.limit < 0.0 {
            return Err(SsdFaceError::InvalidConfig {
                reason: "score limit must be non-negative",
            });
        }
        if self.threshold.is_nan() {
            return Err(SsdFaceError::InvalidConfig {
                reason: "score threshold must not be NaN",
            });
        }
        Ok(())
    }

    /// Runs [`filter_scores`] with these parameters.
    pub fn apply(&self, logits: &[f32], boxes: Vec<Vec<f32>>) -> Vec<Detection> {
        filter_scores(logits, boxes, self.limit, self.threshold)
    }
}

/// Converts a raw logit into a probability.
pub fn logit_to_probability(logit: f32, limit: f32) -> f32 {
    sigmoid(clamp_logit(logit, limit))
}

/// Pairs logits with decoded boxes and keeps those scoring at least
/// `threshold`.
///
/// Pairs are matched by position and the input order is preserved. Extra
/// entries on either side are ignored.
pub fn filter_scores(
    logits: &[f32],
    boxes: Vec<Vec<f32>>,
    limit: f32,
    threshold: f32,
) -> Vec<Detection> {
    let _span = trace_span!("filter_scores", candidates = boxes.len()).entered();

    let kept: Vec<Detection> = boxes
        .into_iter()
        .zip(logits.iter())
        .filter_map(|(data, &logit)| {
            let score = logit_to_probability(logit, limit);
            (score >= threshold).then(|| Detection::from_parts(score, data))
        })
        .collect();

    trace_event!("scored_candidates", count = kept.len());
    kept
}
