//! Box overlap measure used by both suppression variants.

use crate::detection::BBox;

/// Intersection-over-union of two boxes.
///
/// Returns 0 when the boxes share no interior or the union is not positive.
pub fn overlap_similarity(a: &BBox, b: &BBox) -> f32 {
    let Some(intersection) = a.intersect(b) else {
        return 0.0;
    };
    let intersect_area = intersection.area();
    let denominator = a.area() + b.area() - intersect_area;
    if denominator > 0.0 {
        intersect_area / denominator
    } else {
        0.0
    }
}
