use serde::Deserialize;
use ssdface::{
    Detector, DetectorConfig, GridConfig, InferenceEngine, InputTensor, Landmark, NmsConfig,
    PixelView, RawBoxes, RawOutput, SsdFaceError, SsdFaceResult, SuppressionMode,
};
use std::cell::Cell;

const ROW_LEN: usize = 16;

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Background rows with two faces: a pair of near-duplicate boxes on the fine
/// grid and a single box on the coarse grid.
fn synthetic_front_output(num_anchors: usize) -> (Vec<f32>, Vec<f32>) {
    let mut regressors = vec![0.0f32; num_anchors * ROW_LEN];
    let mut classificators = vec![-20.0f32; num_anchors];

    // Fine grid cell (x=5, y=7); both repeats fire.
    for (index, dx, logit) in [(234usize, 0.0f32, 3.0f32), (235, 1.0, 2.0)] {
        let row = &mut regressors[index * ROW_LEN..(index + 1) * ROW_LEN];
        row[0] = dx;
        row[2] = 32.0;
        row[3] = 32.0;
        row[4] = 8.0;
        row[5] = -8.0;
        classificators[index] = logit;
    }

    // Coarse grid cell (x=1, y=6).
    let index = 512 + 6 * (6 * 8 + 1);
    let row = &mut regressors[index * ROW_LEN..(index + 1) * ROW_LEN];
    row[2] = 16.0;
    row[3] = 16.0;
    classificators[index] = 1.0;

    (regressors, classificators)
}

#[test]
fn front_detector_finds_two_faces() {
    let detector = Detector::front();
    let (regressors, classificators) = synthetic_front_output(detector.anchors().len());
    let raw = RawBoxes::with_keypoints(&regressors, 6).unwrap();
    let faces = detector.detect(raw, &classificators).unwrap();

    assert_eq!(faces.len(), 2);

    let p1 = sigmoid(3.0);
    let p2 = sigmoid(2.0);
    let first = &faces[0];
    assert!((first.score() - p1).abs() < 1e-6);
    let bbox = first.bbox();
    let center_x = 5.5 / 16.0 + (p2 / (p1 + p2)) / 128.0;
    assert!(((bbox.xmin + bbox.xmax) / 2.0 - center_x).abs() < 1e-5);
    assert!(((bbox.ymin + bbox.ymax) / 2.0 - 7.5 / 16.0).abs() < 1e-5);
    assert!((bbox.width() - 0.25).abs() < 1e-5);
    let eye = first.landmark(Landmark::RightEye).unwrap();
    assert!((eye.0 - (5.5 / 16.0 + 0.0625)).abs() < 1e-5);
    assert!((eye.1 - (7.5 / 16.0 - 0.0625)).abs() < 1e-5);
    assert_eq!(first.num_keypoints(), 6);

    let second = &faces[1];
    assert!((second.score() - sigmoid(1.0)).abs() < 1e-6);
    let bbox = second.bbox();
    assert!((bbox.xmin - (1.5 / 8.0 - 0.0625)).abs() < 1e-5);
    assert!((bbox.ymax - (6.5 / 8.0 + 0.0625)).abs() < 1e-5);
}

#[test]
fn greedy_mode_keeps_best_duplicate_unchanged() {
    let cfg = DetectorConfig {
        nms: NmsConfig {
            mode: SuppressionMode::Greedy,
            ..NmsConfig::default()
        },
        ..DetectorConfig::front()
    };
    let detector = Detector::new(cfg).unwrap();
    let (regressors, classificators) = synthetic_front_output(detector.anchors().len());
    let raw = RawBoxes::with_keypoints(&regressors, 6).unwrap();
    let faces = detector.detect(raw, &classificators).unwrap();

    assert_eq!(faces.len(), 2);
    let bbox = faces[0].bbox();
    assert!(((bbox.xmin + bbox.xmax) / 2.0 - 5.5 / 16.0).abs() < 1e-6);
}

#[test]
fn all_background_yields_no_faces() {
    let detector = Detector::back();
    let n = detector.anchors().len();
    let regressors = vec![0.0f32; n * ROW_LEN];
    let classificators = vec![-3.0f32; n];
    let raw = RawBoxes::with_keypoints(&regressors, 6).unwrap();
    assert!(detector.detect(raw, &classificators).unwrap().is_empty());
}

#[test]
fn empty_output_is_not_an_error() {
    let detector = Detector::front();
    let raw = RawBoxes::with_keypoints(&[], 6).unwrap();
    assert!(detector.detect(raw, &[]).unwrap().is_empty());
}

#[test]
fn too_many_rows_is_config_mismatch() {
    let detector = Detector::front();
    let regressors = vec![0.0f32; 900 * ROW_LEN];
    let classificators = vec![0.0f32; 900];
    let raw = RawBoxes::with_keypoints(&regressors, 6).unwrap();
    assert_eq!(
        detector.detect(raw, &classificators),
        Err(SsdFaceError::ConfigMismatch {
            expected: 896,
            actual: 900,
        })
    );
}

#[test]
fn detector_is_shareable_across_threads() {
    let detector = Detector::front();
    let (regressors, classificators) = synthetic_front_output(detector.anchors().len());
    let expected = detector
        .detect(
            RawBoxes::with_keypoints(&regressors, 6).unwrap(),
            &classificators,
        )
        .unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let raw = RawBoxes::with_keypoints(&regressors, 6).unwrap();
                    detector.detect(raw, &classificators).unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

struct StubEngine {
    output: RawOutput,
    calls: Cell<usize>,
}

impl InferenceEngine for StubEngine {
    fn infer(&self, input: &InputTensor) -> SsdFaceResult<RawOutput> {
        self.calls.set(self.calls.get() + 1);
        assert_eq!(input.shape(), [128, 128, 3]);
        assert_eq!(&input.data()[..3], &[-1.0, 0.0, 0.5]);
        Ok(self.output.clone())
    }
}

struct FailingEngine;

impl InferenceEngine for FailingEngine {
    fn infer(&self, _input: &InputTensor) -> SsdFaceResult<RawOutput> {
        Err(SsdFaceError::Inference {
            reason: "device lost".to_string(),
        })
    }
}

fn rgba_frame(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for _ in 0..width * height {
        pixels.extend_from_slice(&[0, 128, 192, 255]);
    }
    pixels
}

#[test]
fn run_preprocesses_and_detects() {
    let detector = Detector::front();
    let (regressors, classificators) = synthetic_front_output(detector.anchors().len());
    let engine = StubEngine {
        output: RawOutput {
            regressors,
            row_len: ROW_LEN,
            classificators,
        },
        calls: Cell::new(0),
    };
    let frame = rgba_frame(128, 128);
    let view = PixelView::from_slice(&frame, 128, 128, 4).unwrap();

    let faces = detector.run(&engine, view).unwrap();
    assert_eq!(engine.calls.get(), 1);
    assert_eq!(faces.len(), 2);
}

#[test]
fn run_rejects_wrong_input_size() {
    let detector = Detector::back();
    let frame = rgba_frame(128, 128);
    let view = PixelView::from_slice(&frame, 128, 128, 4).unwrap();
    assert_eq!(
        detector.run(&FailingEngine, view),
        Err(SsdFaceError::InputShapeMismatch {
            width: 128,
            height: 128,
            expected_width: 256,
            expected_height: 256,
        })
    );
}

#[test]
fn run_forwards_engine_errors() {
    let detector = Detector::front();
    let frame = rgba_frame(128, 128);
    let view = PixelView::from_slice(&frame, 128, 128, 4).unwrap();
    let err = detector.run(&FailingEngine, view).unwrap_err();
    assert_eq!(err.to_string(), "inference failed: device lost");
}

#[derive(Debug, Deserialize)]
struct Fixture {
    grid: FixtureGrid,
    regressors: Vec<Vec<f32>>,
    classificators: Vec<f32>,
    expected: Vec<ExpectedFace>,
}

#[derive(Debug, Deserialize)]
struct FixtureGrid {
    strides: Vec<u32>,
    input_size: u32,
}

#[derive(Debug, Deserialize)]
struct ExpectedFace {
    score: f32,
    bbox: [f32; 4],
    keypoints: Vec<[f32; 2]>,
}

const FIXTURE: &str = r#"{
    "grid": { "strides": [2], "input_size": 4 },
    "regressors": [
        [0, 0, 2, 2, 0, 0],
        [0, 0, 2, 2, 0, 0],
        [0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0],
        [0, 0, 1, 1, 0.4, -0.4],
        [0, 0, 1, 1, 0, 0]
    ],
    "classificators": [4.0, 2.0, -4.0, -4.0, -4.0, -4.0, 0.0, -1.0],
    "expected": [
        { "score": 0.98201376, "bbox": [0.0, 0.0, 0.5, 0.5], "keypoints": [[0.25, 0.25]] },
        { "score": 0.5, "bbox": [0.625, 0.625, 0.875, 0.875], "keypoints": [[0.85, 0.65]] }
    ]
}"#;

fn fixture_detector(fixture: &Fixture, mode: SuppressionMode) -> Detector {
    let grid = GridConfig {
        num_layers: fixture.grid.strides.len(),
        strides: fixture.grid.strides.clone(),
        input_height: fixture.grid.input_size,
        input_width: fixture.grid.input_size,
        anchor_offset_x: 0.5,
        anchor_offset_y: 0.5,
        interpolated_scale_aspect_ratio: 1.0,
    };
    let mut cfg = DetectorConfig::with_grid(grid);
    cfg.nms.mode = mode;
    Detector::new(cfg).unwrap()
}

#[test]
fn json_fixture_matches_expected_faces() {
    let fixture: Fixture = serde_json::from_str(FIXTURE).unwrap();
    let flat: Vec<f32> = fixture.regressors.iter().flatten().copied().collect();

    for mode in [SuppressionMode::Weighted, SuppressionMode::Greedy] {
        let detector = fixture_detector(&fixture, mode);
        let raw = RawBoxes::new(&flat, fixture.regressors[0].len()).unwrap();
        let faces = detector.detect(raw, &fixture.classificators).unwrap();

        assert_eq!(faces.len(), fixture.expected.len(), "{mode:?}");
        for (face, want) in faces.iter().zip(fixture.expected.iter()) {
            assert!((face.score() - want.score).abs() < 1e-6);
            let b = face.bbox();
            for (got, want) in [b.xmin, b.ymin, b.xmax, b.ymax].iter().zip(want.bbox) {
                assert!((got - want).abs() < 1e-6, "{mode:?}: {got} vs {want}");
            }
            let keypoints: Vec<(f32, f32)> = face.keypoints().collect();
            assert_eq!(keypoints.len(), want.keypoints.len());
            for (got, want) in keypoints.iter().zip(want.keypoints.iter()) {
                assert!((got.0 - want[0]).abs() < 1e-6);
                assert!((got.1 - want[1]).abs() < 1e-6);
            }
        }
    }
}
