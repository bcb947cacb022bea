//! Input normalization for the face detection networks.
//!
//! The networks take an HWC `f32` tensor with three channels scaled to
//! roughly `[-1, 1]`: each 8-bit value `v` becomes `(v - 128) / 128`. Any
//! channels after the third (alpha) are dropped.

use crate::image::PixelView;

/// Normalized `height x width x 3` network input.
#[derive(Clone, Debug, PartialEq)]
pub struct InputTensor {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl InputTensor {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Always 3.
    pub fn channels(&self) -> usize {
        3
    }

    /// Tensor shape as `[height, width, channels]`.
    pub fn shape(&self) -> [usize; 3] {
        [self.height, self.width, 3]
    }

    /// Values in HWC order.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }
}

/// Maps one 8-bit sample to the network's input range.
#[inline]
pub fn normalize_sample(value: u8) -> f32 {
    (value as f32 - 128.0) / 128.0
}

/// Builds the network input tensor from a pixel view.
pub fn preprocess(pixels: PixelView<'_>) -> InputTensor {
    let width = pixels.width();
    let height = pixels.height();
    let channels = pixels.channels();

    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let Some(row) = pixels.row(y) else {
            break;
        };
        for pixel in row.chunks_exact(channels) {
            data.extend(pixel[..3].iter().map(|&v| normalize_sample(v)));
        }
    }

    InputTensor {
        data,
        width,
        height,
    }
}
