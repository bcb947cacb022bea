//! Weighted suppression: merge each overlap cluster into a score-weighted
//! average.

use crate::detection::Detection;
use crate::nms::similarity::overlap_similarity;

pub(crate) fn weighted(
    order: &[(usize, f32)],
    detections: &[Detection],
    suppression_threshold: f32,
    min_score: Option<f32>,
) -> Vec<Detection> {
    let mut working: Vec<(usize, f32)> = order.to_vec();
    let mut candidates: Vec<(usize, f32)> = Vec::new();
    let mut remaining: Vec<(usize, f32)> = Vec::new();
    let mut out = Vec::new();

    while let Some(&(anchor_index, _)) = working.first() {
        let anchor = &detections[anchor_index];
        // Everything after the first low-score anchor is dropped, not just the
        // anchor itself.
        if min_score.is_some_and(|min| anchor.score() < min) {
            break;
        }
        let anchor_box = anchor.bbox();

        candidates.clear();
        remaining.clear();
        for &(index, score) in &working {
            let similarity = overlap_similarity(&detections[index].bbox(), &anchor_box);
            if similarity > suppression_threshold {
                candidates.push((index, score));
            } else {
                remaining.push((index, score));
            }
        }

        // An anchor with a degenerate box (or a threshold >= 1) does not
        // overlap itself; it is emitted unchanged.
        let merged = if candidates.is_empty() {
            anchor.clone()
        } else {
            let data = weighted_average(&candidates, detections, anchor.data().len());
            Detection::from_parts(anchor.score(), data)
        };
        out.push(merged);

        // Nothing was removed from the working set, so the loop cannot make
        // progress.
        if remaining.len() == working.len() {
            break;
        }
        std::mem::swap(&mut working, &mut remaining);
    }

    out
}

fn weighted_average(cluster: &[(usize, f32)], detections: &[Detection], len: usize) -> Vec<f32> {
    let mut acc = vec![0.0f32; len];
    let mut total_score = 0.0f32;
    for &(index, score) in cluster {
        total_score += score;
        for (sum, &value) in acc.iter_mut().zip(detections[index].data()) {
            *sum += value * score;
        }
    }
    for sum in &mut acc {
        *sum /= total_score;
    }
    acc
}
