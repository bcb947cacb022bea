//! ssdface turns raw SSD face-detector output into faces.
//!
//! The crate covers the algorithmic half of an anchor-based detector: the
//! anchor grid the network's rows are keyed to, decoding of box and keypoint
//! offsets, logit thresholding, and greedy or weighted non-maximum
//! suppression. Running the network itself is left to an
//! [`InferenceEngine`] implementation.
//!
//! ```
//! use ssdface::{Detector, RawBoxes};
//!
//! let detector = Detector::front();
//! let regressors = vec![0.0f32; detector.anchors().len() * 16];
//! let classificators = vec![-10.0f32; detector.anchors().len()];
//! let raw = RawBoxes::with_keypoints(&regressors, 6).unwrap();
//! let faces = detector.detect(raw, &classificators).unwrap();
//! assert!(faces.is_empty());
//! ```

pub mod anchor;
pub mod decode;
pub mod detection;
pub mod detector;
pub mod engine;
pub mod image;
pub mod nms;
pub mod preprocess;
pub mod raw;
pub mod score;
mod trace;
pub mod util;

pub use anchor::{Anchor, AnchorTable, GridConfig};
pub use decode::decode_boxes;
#[cfg(feature = "rayon")]
pub use decode::rayon::decode_boxes_par;
pub use detection::{BBox, Detection, Landmark};
pub use detector::{Detector, DetectorConfig};
pub use engine::{InferenceEngine, RawOutput};
pub use image::PixelView;
pub use nms::{
    greedy_nms, non_max_suppression, overlap_similarity, weighted_nms, NmsConfig,
    SuppressionMode,
};
pub use preprocess::{preprocess, InputTensor};
pub use raw::RawBoxes;
pub use score::{
    filter_scores, logit_to_probability, ScoreFilter, DEFAULT_SCORE_THRESHOLD, RAW_SCORE_LIMIT,
};
pub use util::{SsdFaceError, SsdFaceResult};
