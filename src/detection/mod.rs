//! Detection records produced by the post-processing pipeline.
//!
//! A detection keeps its geometry as one flat vector laid out like a raw
//! regression row: `xmin, ymin, xmax, ymax`, then `x, y` for each keypoint.
//! Weighted suppression averages that vector as a whole, so the flat form is
//! kept rather than splitting boxes and keypoints into separate fields.

mod bbox;

pub use bbox::BBox;

use crate::util::{SsdFaceError, SsdFaceResult};

/// Keypoints emitted by the six-landmark face models.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Landmark {
    RightEye = 0,
    LeftEye = 1,
    Nose = 2,
    Mouth = 3,
    RightCheek = 4,
    LeftCheek = 5,
}

impl Landmark {
    /// All landmarks in output order.
    pub const ALL: [Landmark; 6] = [
        Landmark::RightEye,
        Landmark::LeftEye,
        Landmark::Nose,
        Landmark::Mouth,
        Landmark::RightCheek,
        Landmark::LeftCheek,
    ];

    /// Keypoint index of this landmark.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A scored detection in normalized `[0, 1]` image coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    score: f32,
    data: Vec<f32>,
}

impl Detection {
    /// Creates a detection, checking that `data` holds a box and whole
    /// keypoint pairs.
    pub fn new(score: f32, data: Vec<f32>) -> SsdFaceResult<Self> {
        if data.len() < 4 || data.len() % 2 != 0 {
            return Err(SsdFaceError::InvalidDetection { len: data.len() });
        }
        Ok(Self { score, data })
    }

    /// Builds a detection from decoder output, which is well-formed by
    /// construction.
    pub(crate) fn from_parts(score: f32, data: Vec<f32>) -> Self {
        debug_assert!(data.len() >= 4 && data.len() % 2 == 0);
        Self { score, data }
    }

    /// Confidence in `[0, 1]`.
    pub fn score(&self) -> f32 {
        self.score
    }

    /// Box followed by keypoint coordinates.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Consumes the detection and returns its data vector.
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    pub fn bbox(&self) -> BBox {
        BBox::new(self.data[0], self.data[1], self.data[2], self.data[3])
    }

    pub fn num_keypoints(&self) -> usize {
        (self.data.len() - 4) / 2
    }

    /// Returns keypoint `index` as `(x, y)`.
    pub fn keypoint(&self, index: usize) -> Option<(f32, f32)> {
        let base = index.checked_mul(2)?.checked_add(4)?;
        match self.data.get(base..base.checked_add(2)?) {
            Some(&[x, y]) => Some((x, y)),
            _ => None,
        }
    }

    /// Returns the named landmark, if the model emitted it.
    pub fn landmark(&self, landmark: Landmark) -> Option<(f32, f32)> {
        self.keypoint(landmark.index())
    }

    /// Iterates `(x, y)` keypoints in output order.
    pub fn keypoints(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.data[4..].chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }
}
