//! Error types for ssdface.

use thiserror::Error;

/// Result alias for ssdface operations.
pub type Result<T> = std::result::Result<T, SsdFaceError>;

/// Errors that can occur when post-processing detector output.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SsdFaceError {
    /// The network produced more rows than there are anchors.
    #[error("raw output has {actual} rows but the anchor table only has {expected} anchors")]
    ConfigMismatch { expected: usize, actual: usize },
    /// The number of logits does not match the number of decoded rows.
    #[error("got {scores} classification scores for {boxes} regression rows")]
    ScoreCountMismatch { boxes: usize, scores: usize },
    /// The anchor grid configuration is unusable.
    #[error("invalid grid config: {reason}")]
    InvalidGrid { reason: &'static str },
    /// A score filter or suppression parameter is out of range.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },
    /// Regression rows must hold a box plus whole keypoint pairs.
    #[error("invalid row length {row_len}: expected 4 box values plus an even keypoint block")]
    InvalidRowLength { row_len: usize },
    /// The flat regressor buffer is not a whole number of rows.
    #[error("buffer of {len} values is not a whole number of {row_len}-value rows")]
    RaggedBuffer { len: usize, row_len: usize },
    /// Image dimensions are zero or overflow.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Pixel views need at least three interleaved channels.
    #[error("invalid channel count {channels}: at least 3 are required")]
    InvalidChannels { channels: usize },
    /// Row stride is shorter than one row of pixels.
    #[error("invalid stride {stride} for row of {row_len} values")]
    InvalidStride { row_len: usize, stride: usize },
    /// The backing buffer is too small for the requested view.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Pixel view size differs from the network input size.
    #[error("input is {width}x{height} but the network expects {expected_width}x{expected_height}")]
    InputShapeMismatch {
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },
    /// Detection data is too short or holds half a keypoint.
    #[error("invalid detection data of length {len}")]
    InvalidDetection { len: usize },
    /// The inference backend failed.
    #[error("inference failed: {reason}")]
    Inference { reason: String },
}
