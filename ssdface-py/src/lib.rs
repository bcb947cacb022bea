//! Python bindings for the ssdface post-processing library.
//!
//! This module exposes the detector, anchor generation and the input
//! preprocessing recipe to Python via PyO3.

use numpy::{
    PyArray1, PyArray2, PyArray3, PyArrayMethods, PyReadonlyArray3, PyReadonlyArrayDyn,
    PyUntypedArrayMethods,
};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use ssdface::{
    AnchorTable, Detection as RustDetection, Detector as RustDetector,
    DetectorConfig as RustDetectorConfig, GridConfig, NmsConfig, PixelView, RawBoxes,
    ScoreFilter, SsdFaceError, SuppressionMode,
};

/// Convert an SsdFaceError to a Python exception.
fn to_py_err(err: SsdFaceError) -> PyErr {
    PyRuntimeError::new_err(err.to_string())
}

fn parse_grid(model: &str) -> PyResult<GridConfig> {
    match model.to_lowercase().as_str() {
        "front" => Ok(GridConfig::front()),
        "back" => Ok(GridConfig::back()),
        _ => Err(PyValueError::new_err("model must be 'front' or 'back'")),
    }
}

fn parse_mode(mode: &str) -> PyResult<SuppressionMode> {
    match mode.to_lowercase().as_str() {
        "weighted" => Ok(SuppressionMode::Weighted),
        "greedy" => Ok(SuppressionMode::Greedy),
        _ => Err(PyValueError::new_err(
            "suppression must be 'weighted' or 'greedy'",
        )),
    }
}

/// A detected face in normalized image coordinates.
#[pyclass]
#[derive(Clone)]
pub struct Detection {
    /// Confidence in [0, 1].
    #[pyo3(get)]
    pub score: f32,
    /// Box as (xmin, ymin, xmax, ymax).
    #[pyo3(get)]
    pub bbox: (f32, f32, f32, f32),
    /// Keypoints as (x, y) pairs.
    #[pyo3(get)]
    pub keypoints: Vec<(f32, f32)>,
    /// Flat box + keypoint vector.
    #[pyo3(get)]
    pub data: Vec<f32>,
}

#[pymethods]
impl Detection {
    fn __repr__(&self) -> String {
        let (xmin, ymin, xmax, ymax) = self.bbox;
        format!(
            "Detection(score={:.4}, bbox=({:.3}, {:.3}, {:.3}, {:.3}), keypoints={})",
            self.score,
            xmin,
            ymin,
            xmax,
            ymax,
            self.keypoints.len()
        )
    }
}

impl From<RustDetection> for Detection {
    fn from(d: RustDetection) -> Self {
        let bbox = d.bbox();
        Self {
            score: d.score(),
            bbox: (bbox.xmin, bbox.ymin, bbox.xmax, bbox.ymax),
            keypoints: d.keypoints().collect(),
            data: d.into_data(),
        }
    }
}

/// Post-processor for one SSD face model.
#[pyclass]
pub struct Detector {
    inner: RustDetector,
}

#[pymethods]
impl Detector {
    /// Create a detector.
    ///
    /// Args:
    ///     model: "front" (128x128) or "back" (256x256) (default: "front")
    ///     score_threshold: Minimum probability kept (default: 0.3)
    ///     score_limit: Symmetric logit clamp (default: 80.0)
    ///     suppression: "weighted" or "greedy" (default: "weighted")
    ///     suppression_threshold: IoU above which boxes merge (default: 0.5)
    ///     min_score: Stop suppression below this score, or None (default: 0.3)
    ///     parallel: Decode rows in parallel (default: False)
    #[new]
    #[pyo3(signature = (
        model = "front",
        score_threshold = 0.3,
        score_limit = 80.0,
        suppression = "weighted",
        suppression_threshold = 0.5,
        min_score = Some(0.3),
        parallel = false
    ))]
    fn new(
        model: &str,
        score_threshold: f32,
        score_limit: f32,
        suppression: &str,
        suppression_threshold: f32,
        min_score: Option<f32>,
        parallel: bool,
    ) -> PyResult<Self> {
        let cfg = RustDetectorConfig {
            grid: parse_grid(model)?,
            score: ScoreFilter {
                limit: score_limit,
                threshold: score_threshold,
            },
            nms: NmsConfig {
                mode: parse_mode(suppression)?,
                suppression_threshold,
                min_score,
            },
            parallel,
        };
        let inner = RustDetector::new(cfg).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Network input size as (width, height).
    #[getter]
    fn input_shape(&self) -> (usize, usize) {
        self.inner.input_shape()
    }

    /// Number of anchors (expected regression rows).
    #[getter]
    fn num_anchors(&self) -> usize {
        self.inner.anchors().len()
    }

    /// Anchor centers as a float32 array of shape (N, 2).
    fn anchors<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f32>>> {
        anchors_to_array(py, self.inner.anchors())
    }

    /// Post-process raw network output.
    ///
    /// Args:
    ///     regressors: float32 array whose last axis is 4 + 2K (e.g. (1, 896, 16))
    ///     classificators: float32 array with one logit per row (e.g. (1, 896, 1))
    ///
    /// Returns:
    ///     List of Detection objects, best first
    fn detect(
        &self,
        regressors: PyReadonlyArrayDyn<'_, f32>,
        classificators: PyReadonlyArrayDyn<'_, f32>,
    ) -> PyResult<Vec<Detection>> {
        let row_len = regressors
            .shape()
            .last()
            .copied()
            .ok_or_else(|| PyValueError::new_err("regressors must have at least one axis"))?;
        let boxes = RawBoxes::new(regressors.as_slice()?, row_len).map_err(to_py_err)?;
        let logits = classificators.as_slice()?;

        let detections = self.inner.detect(boxes, logits).map_err(to_py_err)?;
        Ok(detections.into_iter().map(Detection::from).collect())
    }

    fn __repr__(&self) -> String {
        let (width, height) = self.inner.input_shape();
        format!(
            "Detector(input={}x{}, anchors={})",
            width,
            height,
            self.inner.anchors().len()
        )
    }
}

fn anchors_to_array<'py>(
    py: Python<'py>,
    anchors: &AnchorTable,
) -> PyResult<Bound<'py, PyArray2<f32>>> {
    let flat: Vec<f32> = anchors
        .iter()
        .flat_map(|a| [a.x_center, a.y_center])
        .collect();
    PyArray1::from_vec(py, flat).reshape([anchors.len(), 2])
}

/// Generate the anchor table of a built-in model.
///
/// Args:
///     model: "front" or "back"
///
/// Returns:
///     float32 array of shape (N, 2) with normalized (x, y) centers
#[pyfunction]
#[pyo3(signature = (model = "front"))]
fn generate_anchors<'py>(py: Python<'py>, model: &str) -> PyResult<Bound<'py, PyArray2<f32>>> {
    let grid = parse_grid(model)?;
    anchors_to_array(py, &AnchorTable::generate(&grid))
}

/// Normalize an image for the network: keep 3 channels, map v to (v - 128) / 128.
///
/// Args:
///     pixels: uint8 array of shape (H, W, C) with C >= 3, already resized
///
/// Returns:
///     float32 array of shape (H, W, 3)
#[pyfunction]
fn preprocess<'py>(
    py: Python<'py>,
    pixels: PyReadonlyArray3<'_, u8>,
) -> PyResult<Bound<'py, PyArray3<f32>>> {
    let shape = pixels.shape();
    let (height, width, channels) = (shape[0], shape[1], shape[2]);
    let view =
        PixelView::from_slice(pixels.as_slice()?, width, height, channels).map_err(to_py_err)?;
    let tensor = ssdface::preprocess(view);
    PyArray1::from_vec(py, tensor.into_data()).reshape([height, width, 3])
}

/// Python module for ssdface.
#[pymodule]
fn _ssdface(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Detection>()?;
    m.add_class::<Detector>()?;
    m.add_function(wrap_pyfunction!(generate_anchors, m)?)?;
    m.add_function(wrap_pyfunction!(preprocess, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
