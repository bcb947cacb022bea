//! Borrowed views over raw network output.
//!
//! Regressors arrive as one flat `f32` buffer holding `N` rows of
//! `4 + 2K` values: box center, box size, then `K` keypoint pairs. `RawBoxes`
//! validates that layout once so the decoder can walk rows without further
//! checks.

use crate::util::{SsdFaceError, SsdFaceResult};

/// Row-major view of regression rows.
#[derive(Copy, Clone, Debug)]
pub struct RawBoxes<'a> {
    data: &'a [f32],
    row_len: usize,
}

impl<'a> RawBoxes<'a> {
    /// Creates a view of `data.len() / row_len` rows.
    pub fn new(data: &'a [f32], row_len: usize) -> SsdFaceResult<Self> {
        if row_len < 4 || row_len % 2 != 0 {
            return Err(SsdFaceError::InvalidRowLength { row_len });
        }
        if data.len() % row_len != 0 {
            return Err(SsdFaceError::RaggedBuffer {
                len: data.len(),
                row_len,
            });
        }
        Ok(Self { data, row_len })
    }

    /// Creates a view for `K` keypoints per row.
    pub fn with_keypoints(data: &'a [f32], num_keypoints: usize) -> SsdFaceResult<Self> {
        Self::new(data, 4 + 2 * num_keypoints)
    }

    /// Returns the number of values per row.
    pub fn row_len(&self) -> usize {
        self.row_len
    }

    /// Returns the number of keypoints carried by each row.
    pub fn num_keypoints(&self) -> usize {
        (self.row_len - 4) / 2
    }

    /// Returns the number of rows.
    pub fn num_rows(&self) -> usize {
        self.data.len() / self.row_len
    }

    /// Returns true when the view holds no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the flat backing slice.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Returns row `index` if it exists.
    pub fn row(&self, index: usize) -> Option<&'a [f32]> {
        let start = index.checked_mul(self.row_len)?;
        let end = start.checked_add(self.row_len)?;
        self.data.get(start..end)
    }

    /// Iterates rows in order.
    pub fn rows(&self) -> std::slice::ChunksExact<'a, f32> {
        self.data.chunks_exact(self.row_len)
    }
}
