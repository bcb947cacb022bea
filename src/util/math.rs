//! Scalar helpers for score conversion.

/// Logistic function `1 / (1 + e^-x)`.
pub(crate) fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Clamps a raw logit to `[-limit, limit]`.
///
/// NaN passes through unchanged. Unlike `f32::clamp` this never panics on a
/// bad limit.
pub(crate) fn clamp_logit(x: f32, limit: f32) -> f32 {
    if x < -limit {
        -limit
    } else if x > limit {
        limit
    } else {
        x
    }
}
