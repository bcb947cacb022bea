//! Axis-aligned boxes in normalized image coordinates.

/// Axis-aligned box given by its corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl BBox {
    /// Creates a box from its corners.
    pub fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    pub fn width(&self) -> f32 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f32 {
        self.ymax - self.ymin
    }

    /// Signed area; negative for inverted boxes.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Returns the overlap rectangle, or `None` when it has no interior.
    ///
    /// Touching edges do not count as overlap.
    pub fn intersect(&self, other: &BBox) -> Option<BBox> {
        let xmin = self.xmin.max(other.xmin);
        let ymin = self.ymin.max(other.ymin);
        let xmax = self.xmax.min(other.xmax);
        let ymax = self.ymax.min(other.ymax);
        if xmin < xmax && ymin < ymax {
            Some(BBox {
                xmin,
                ymin,
                xmax,
                ymax,
            })
        } else {
            None
        }
    }

    /// Maps a normalized box onto a `width` x `height` canvas.
    pub fn scale(&self, width: f32, height: f32) -> BBox {
        BBox {
            xmin: self.xmin * width,
            ymin: self.ymin * height,
            xmax: self.xmax * width,
            ymax: self.ymax * height,
        }
    }
}
