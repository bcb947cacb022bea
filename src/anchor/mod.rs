//! Anchor generation for SSD-style detection heads.
//!
//! The network emits one regression row and one logit per anchor, with no
//! index attached. Decoding therefore relies entirely on the order produced
//! here: stride groups in layer order, then grid rows, then grid columns, then
//! the per-cell repeats.

mod grid;

pub use grid::GridConfig;

use crate::trace::{trace_event, trace_span};
use std::ops::Index;

/// Normalized anchor center in `[0, 1]` image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    /// Horizontal center.
    pub x_center: f32,
    /// Vertical center.
    pub y_center: f32,
}

impl Anchor {
    /// Creates an anchor from its normalized center.
    pub fn new(x_center: f32, y_center: f32) -> Self {
        Self { x_center, y_center }
    }
}

/// Ordered anchors aligned with the network's output rows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnchorTable {
    anchors: Vec<Anchor>,
}

impl AnchorTable {
    /// Generates the anchor table for `config`.
    ///
    /// Consecutive layers sharing a stride are merged into one feature map
    /// whose cells carry the anchors of every merged layer. Only the first
    /// `num_layers` strides are read, and zero strides contribute nothing.
    /// A stride that does not divide the input size leaves a fractional
    /// feature map; the grid then covers `ceil` of it, which
    /// [`GridConfig::validate`] rejects up front.
    pub fn generate(config: &GridConfig) -> Self {
        let layers = config.num_layers.min(config.strides.len());
        let strides = &config.strides[..layers];
        let _span = trace_span!("generate_anchors", layers = layers).entered();

        let mut anchors = Vec::new();
        let mut layer_id = 0usize;
        while layer_id < strides.len() {
            let stride = strides[layer_id];
            let mut last_same_stride = layer_id;
            let mut repeats = 0usize;
            while last_same_stride < strides.len() && strides[last_same_stride] == stride {
                last_same_stride += 1;
                repeats += config.anchors_per_layer();
            }

            if stride > 0 {
                let feature_map_height = config.input_height as f32 / stride as f32;
                let feature_map_width = config.input_width as f32 / stride as f32;

                let mut y = 0usize;
                while (y as f32) < feature_map_height {
                    let y_center = (y as f32 + config.anchor_offset_y) / feature_map_height;
                    let mut x = 0usize;
                    while (x as f32) < feature_map_width {
                        let x_center = (x as f32 + config.anchor_offset_x) / feature_map_width;
                        for _ in 0..repeats {
                            anchors.push(Anchor { x_center, y_center });
                        }
                        x += 1;
                    }
                    y += 1;
                }
            }

            layer_id = last_same_stride;
        }

        trace_event!("anchors_generated", count = anchors.len());
        Self { anchors }
    }

    /// Wraps an explicit anchor list.
    pub fn from_anchors(anchors: Vec<Anchor>) -> Self {
        Self { anchors }
    }

    /// Returns the number of anchors.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Returns true when the table holds no anchors.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Returns the anchor at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Anchor> {
        self.anchors.get(index)
    }

    /// Returns the anchors as a slice.
    pub fn as_slice(&self) -> &[Anchor] {
        &self.anchors
    }

    /// Iterates anchors in output-row order.
    pub fn iter(&self) -> std::slice::Iter<'_, Anchor> {
        self.anchors.iter()
    }
}

impl Index<usize> for AnchorTable {
    type Output = Anchor;

    fn index(&self, index: usize) -> &Anchor {
        &self.anchors[index]
    }
}

impl<'a> IntoIterator for &'a AnchorTable {
    type Item = &'a Anchor;
    type IntoIter = std::slice::Iter<'a, Anchor>;

    fn into_iter(self) -> Self::IntoIter {
        self.anchors.iter()
    }
}
