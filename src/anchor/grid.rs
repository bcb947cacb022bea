//! SSD grid configuration and the built-in model presets.

use crate::util::{SsdFaceError, SsdFaceResult};

/// Layout of the SSD feature-map grid a network's outputs are keyed to.
#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
    /// Number of output layers.
    pub num_layers: usize,
    /// Stride of each layer in input pixels, one per layer.
    pub strides: Vec<u32>,
    /// Network input height in pixels.
    pub input_height: u32,
    /// Network input width in pixels.
    pub input_width: u32,
    /// Anchor center offset within a cell along x, as a fraction of the cell.
    pub anchor_offset_x: f32,
    /// Anchor center offset within a cell along y, as a fraction of the cell.
    pub anchor_offset_y: f32,
    /// Interpolated scale aspect ratio; any value other than exactly 1.0 adds
    /// one extra anchor per layer.
    pub interpolated_scale_aspect_ratio: f32,
}

impl GridConfig {
    /// Grid for the short-range "front" camera model (128x128 input).
    pub fn front() -> Self {
        Self {
            num_layers: 4,
            strides: vec![8, 16, 16, 16],
            input_height: 128,
            input_width: 128,
            anchor_offset_x: 0.5,
            anchor_offset_y: 0.5,
            interpolated_scale_aspect_ratio: 1.0,
        }
    }

    /// Grid for the full-range "back" camera model (256x256 input).
    pub fn back() -> Self {
        Self {
            num_layers: 4,
            strides: vec![16, 32, 32, 32],
            input_height: 256,
            input_width: 256,
            anchor_offset_x: 0.5,
            anchor_offset_y: 0.5,
            interpolated_scale_aspect_ratio: 1.0,
        }
    }

    /// Number of anchors emitted per grid cell for a single layer.
    pub fn anchors_per_layer(&self) -> usize {
        if self.interpolated_scale_aspect_ratio == 1.0 {
            2
        } else {
            3
        }
    }

    /// Checks that every layer maps onto a whole feature map.
    pub fn validate(&self) -> SsdFaceResult<()> {
        if self.num_layers == 0 {
            return Err(SsdFaceError::InvalidGrid {
                reason: "num_layers must be at least 1",
            });
        }
        if self.strides.len() != self.num_layers {
            return Err(SsdFaceError::InvalidGrid {
                reason: "strides must have one entry per layer",
            });
        }
        if self.input_width == 0 || self.input_height == 0 {
            return Err(SsdFaceError::InvalidGrid {
                reason: "input size must be non-zero",
            });
        }
        if !self.anchor_offset_x.is_finite() || !self.anchor_offset_y.is_finite() {
            return Err(SsdFaceError::InvalidGrid {
                reason: "anchor offsets must be finite",
            });
        }
        if self.interpolated_scale_aspect_ratio.is_nan() {
            return Err(SsdFaceError::InvalidGrid {
                reason: "interpolated_scale_aspect_ratio must not be NaN",
            });
        }
        for &stride in &self.strides {
            if stride == 0 {
                return Err(SsdFaceError::InvalidGrid {
                    reason: "strides must be non-zero",
                });
            }
            if self.input_width % stride != 0 || self.input_height % stride != 0 {
                return Err(SsdFaceError::InvalidGrid {
                    reason: "input size must be a multiple of every stride",
                });
            }
        }
        Ok(())
    }
}
