//! Greedy suppression: keep the best box, drop anything overlapping it.

use crate::detection::{BBox, Detection};
use crate::nms::similarity::overlap_similarity;

pub(crate) fn greedy(
    order: &[(usize, f32)],
    detections: &[Detection],
    suppression_threshold: f32,
    min_score: Option<f32>,
) -> Vec<Detection> {
    let mut kept_boxes: Vec<BBox> = Vec::new();
    let mut out = Vec::new();

    'outer: for &(index, score) in order {
        if min_score.is_some_and(|min| score < min) {
            break;
        }
        let detection = &detections[index];
        let bbox = detection.bbox();
        for kept in &kept_boxes {
            if overlap_similarity(kept, &bbox) > suppression_threshold {
                continue 'outer;
            }
        }
        kept_boxes.push(bbox);
        out.push(detection.clone());
    }

    out
}
