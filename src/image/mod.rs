//! Borrowed pixel views for the preprocessing step.
//!
//! `PixelView` is a borrowed interleaved 8-bit image with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than `width * channels` represents padded rows. Acquiring
//! and letterboxing the image into the network's square input happens before
//! a view is built.

use crate::util::{SsdFaceError, SsdFaceResult};

/// Borrowed interleaved image with at least three channels.
#[derive(Copy, Clone, Debug)]
pub struct PixelView<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    channels: usize,
    stride: usize,
}

impl<'a> PixelView<'a> {
    /// Creates a contiguous view with `stride == width * channels`.
    pub fn from_slice(
        data: &'a [u8],
        width: usize,
        height: usize,
        channels: usize,
    ) -> SsdFaceResult<Self> {
        let stride = width
            .checked_mul(channels)
            .ok_or(SsdFaceError::InvalidDimensions { width, height })?;
        Self::new(data, width, height, channels, stride)
    }

    /// Creates a view with an explicit row stride.
    pub fn new(
        data: &'a [u8],
        width: usize,
        height: usize,
        channels: usize,
        stride: usize,
    ) -> SsdFaceResult<Self> {
        let needed = required_len(width, height, channels, stride)?;
        if data.len() < needed {
            return Err(SsdFaceError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of interleaved channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the `width * channels` values of row `y`.
    pub fn row(&self, y: usize) -> Option<&'a [u8]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width * self.channels)?;
        self.data.get(start..end)
    }

    /// Returns the channels of pixel `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> Option<&'a [u8]> {
        if x >= self.width {
            return None;
        }
        let row = self.row(y)?;
        let start = x * self.channels;
        row.get(start..start + self.channels)
    }
}

fn required_len(
    width: usize,
    height: usize,
    channels: usize,
    stride: usize,
) -> SsdFaceResult<usize> {
    if width == 0 || height == 0 {
        return Err(SsdFaceError::InvalidDimensions { width, height });
    }
    if channels < 3 {
        return Err(SsdFaceError::InvalidChannels { channels });
    }
    let row_len = width
        .checked_mul(channels)
        .ok_or(SsdFaceError::InvalidDimensions { width, height })?;
    if stride < row_len {
        return Err(SsdFaceError::InvalidStride { row_len, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(row_len))
        .ok_or(SsdFaceError::InvalidDimensions { width, height })
}
