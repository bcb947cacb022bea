//! Non-maximum suppression over scored detections.
//!
//! Two strategies share the same ordering and overlap measure:
//!
//! - [`SuppressionMode::Greedy`] keeps the highest-scoring detection of each
//!   overlap cluster and discards the rest.
//! - [`SuppressionMode::Weighted`] replaces each cluster with one detection
//!   whose geometry is the score-weighted mean of the cluster and whose score
//!   is the best member's.
//!
//! Detections are visited in descending score order; equal scores keep their
//! input order so results are reproducible.

mod greedy;
mod similarity;
mod weighted;

pub use similarity::overlap_similarity;

use crate::detection::Detection;
use crate::trace::{trace_event, trace_span};
use crate::util::{SsdFaceError, SsdFaceResult};

/// Suppression strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SuppressionMode {
    /// Discard detections overlapping an already kept one.
    Greedy,
    /// Average overlapping detections, weighted by score.
    #[default]
    Weighted,
}

/// Parameters for [`non_max_suppression`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NmsConfig {
    /// Strategy to apply.
    pub mode: SuppressionMode,
    /// Overlap above which two detections belong to the same object.
    pub suppression_threshold: f32,
    /// Stop once the current best detection scores below this.
    pub min_score: Option<f32>,
}

impl Default for NmsConfig {
    fn default() -> Self {
        Self {
            mode: SuppressionMode::Weighted,
            suppression_threshold: 0.5,
            min_score: Some(0.3),
        }
    }
}

impl NmsConfig {
    pub fn validate(&self) -> SsdFaceResult<()> {
        if self.suppression_threshold.is_nan() {
            return Err(SsdFaceError::InvalidConfig {
                reason: "suppression_threshold must not be NaN",
            });
        }
        if self.min_score.is_some_and(f32::is_nan) {
            return Err(SsdFaceError::InvalidConfig {
                reason: "min_score must not be NaN",
            });
        }
        Ok(())
    }
}

/// Returns `(index, score)` pairs sorted by descending score, ties by index.
pub(crate) fn sort_by_score_desc(detections: &[Detection]) -> Vec<(usize, f32)> {
    let mut order: Vec<(usize, f32)> = detections
        .iter()
        .enumerate()
        .map(|(index, det)| (index, det.score()))
        .collect();
    order.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    order
}

/// Resolves overlapping detections with the configured strategy.
pub fn non_max_suppression(detections: &[Detection], cfg: &NmsConfig) -> Vec<Detection> {
    let _span = trace_span!("non_max_suppression", candidates = detections.len()).entered();

    let order = sort_by_score_desc(detections);
    let out = match cfg.mode {
        SuppressionMode::Greedy => greedy::greedy(
            &order,
            detections,
            cfg.suppression_threshold,
            cfg.min_score,
        ),
        SuppressionMode::Weighted => weighted::weighted(
            &order,
            detections,
            cfg.suppression_threshold,
            cfg.min_score,
        ),
    };

    trace_event!("suppressed", kept = out.len());
    out
}

/// Greedy suppression; see [`SuppressionMode::Greedy`].
pub fn greedy_nms(
    detections: &[Detection],
    suppression_threshold: f32,
    min_score: Option<f32>,
) -> Vec<Detection> {
    non_max_suppression(
        detections,
        &NmsConfig {
            mode: SuppressionMode::Greedy,
            suppression_threshold,
            min_score,
        },
    )
}

/// Weighted suppression; see [`SuppressionMode::Weighted`].
pub fn weighted_nms(
    detections: &[Detection],
    suppression_threshold: f32,
    min_score: Option<f32>,
) -> Vec<Detection> {
    non_max_suppression(
        detections,
        &NmsConfig {
            mode: SuppressionMode::Weighted,
            suppression_threshold,
            min_score,
        },
    )
}
