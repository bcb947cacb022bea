//! High-level detector tying anchors, decoding, scoring and suppression
//! together.

use crate::anchor::{AnchorTable, GridConfig};
use crate::decode::decode_boxes;
use crate::detection::Detection;
use crate::engine::InferenceEngine;
use crate::image::PixelView;
use crate::nms::{non_max_suppression, NmsConfig};
use crate::preprocess::preprocess;
use crate::raw::RawBoxes;
use crate::score::ScoreFilter;
use crate::trace::{trace_event, trace_span};
use crate::util::{SsdFaceError, SsdFaceResult};

/// Full post-processing configuration for one network variant.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorConfig {
    /// Anchor grid the network was trained with.
    pub grid: GridConfig,
    /// Logit clamp and confidence threshold.
    pub score: ScoreFilter,
    /// Suppression strategy and thresholds.
    pub nms: NmsConfig,
    /// Decode rows in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::front()
    }
}

impl DetectorConfig {
    /// Settings for the 128x128 "front" model.
    pub fn front() -> Self {
        Self::with_grid(GridConfig::front())
    }

    /// Settings for the 256x256 "back" model.
    pub fn back() -> Self {
        Self::with_grid(GridConfig::back())
    }

    /// Default scoring and weighted suppression over `grid`.
    pub fn with_grid(grid: GridConfig) -> Self {
        Self {
            grid,
            score: ScoreFilter::default(),
            nms: NmsConfig::default(),
            parallel: false,
        }
    }

    pub fn validate(&self) -> SsdFaceResult<()> {
        self.grid.validate()?;
        self.score.validate()?;
        self.nms.validate()
    }
}

/// Post-processor for one SSD face model.
///
/// The anchor table is generated once at construction and never mutated, so a
/// `Detector` can be shared across threads.
#[derive(Clone, Debug)]
pub struct Detector {
    cfg: DetectorConfig,
    anchors: AnchorTable,
}

impl Detector {
    /// Validates `cfg` and generates its anchors.
    pub fn new(cfg: DetectorConfig) -> SsdFaceResult<Self> {
        cfg.validate()?;
        let anchors = AnchorTable::generate(&cfg.grid);
        Ok(Self { cfg, anchors })
    }

    /// Detector for the "front" model with default thresholds.
    pub fn front() -> Self {
        Self::from_preset(DetectorConfig::front())
    }

    /// Detector for the "back" model with default thresholds.
    pub fn back() -> Self {
        Self::from_preset(DetectorConfig::back())
    }

    fn from_preset(cfg: DetectorConfig) -> Self {
        let anchors = AnchorTable::generate(&cfg.grid);
        Self { cfg, anchors }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.cfg
    }

    pub fn anchors(&self) -> &AnchorTable {
        &self.anchors
    }

    /// Network input size as `(width, height)`.
    pub fn input_shape(&self) -> (usize, usize) {
        (
            self.cfg.grid.input_width as usize,
            self.cfg.grid.input_height as usize,
        )
    }

    /// Turns raw network output into final detections.
    ///
    /// `classificators` must hold one logit per regression row. The result is
    /// ordered by descending score.
    pub fn detect(
        &self,
        regressors: RawBoxes<'_>,
        classificators: &[f32],
    ) -> SsdFaceResult<Vec<Detection>> {
        let _span = trace_span!("detect", rows = regressors.num_rows()).entered();

        let boxes = self.decode(regressors)?;
        if classificators.len() != boxes.len() {
            return Err(SsdFaceError::ScoreCountMismatch {
                boxes: boxes.len(),
                scores: classificators.len(),
            });
        }
        let candidates = self.cfg.score.apply(classificators, boxes);
        let detections = non_max_suppression(&candidates, &self.cfg.nms);

        trace_event!("detections", count = detections.len());
        Ok(detections)
    }

    /// Preprocesses `pixels`, runs `engine` and post-processes its output.
    ///
    /// `pixels` must already be resized to the network input.
    pub fn run<E: InferenceEngine>(
        &self,
        engine: &E,
        pixels: PixelView<'_>,
    ) -> SsdFaceResult<Vec<Detection>> {
        let (expected_width, expected_height) = self.input_shape();
        if pixels.width() != expected_width || pixels.height() != expected_height {
            return Err(SsdFaceError::InputShapeMismatch {
                width: pixels.width(),
                height: pixels.height(),
                expected_width,
                expected_height,
            });
        }

        let input = preprocess(pixels);
        let output = engine.infer(&input)?;
        self.detect(output.boxes()?, &output.classificators)
    }

    fn decode(&self, regressors: RawBoxes<'_>) -> SsdFaceResult<Vec<Vec<f32>>> {
        let size = self.cfg.grid.input_width;
        #[cfg(feature = "rayon")]
        {
            if self.cfg.parallel {
                return crate::decode::rayon::decode_boxes_par(
                    size,
                    self.anchors.as_slice(),
                    regressors,
                );
            }
        }
        decode_boxes(size, self.anchors.as_slice(), regressors)
    }
}
