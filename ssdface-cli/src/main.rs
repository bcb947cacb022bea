use clap::Parser;
use serde::{Deserialize, Serialize};
use ssdface::{
    Detection, Detector, DetectorConfig, GridConfig, NmsConfig, RawBoxes, ScoreFilter,
    SuppressionMode,
};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "SSD face detector post-processing (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Print the anchor table of the configured model as JSON and exit.
    #[arg(long)]
    print_anchors: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ModelConfig {
    #[default]
    Front,
    Back,
    Custom,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SuppressionModeConfig {
    Greedy,
    #[default]
    Weighted,
}

impl From<SuppressionModeConfig> for SuppressionMode {
    fn from(value: SuppressionModeConfig) -> Self {
        match value {
            SuppressionModeConfig::Greedy => SuppressionMode::Greedy,
            SuppressionModeConfig::Weighted => SuppressionMode::Weighted,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct GridConfigJson {
    num_layers: usize,
    strides: Vec<u32>,
    input_height: u32,
    input_width: u32,
    anchor_offset_x: f32,
    anchor_offset_y: f32,
    interpolated_scale_aspect_ratio: f32,
}

impl Default for GridConfigJson {
    fn default() -> Self {
        let cfg = GridConfig::front();
        Self {
            num_layers: cfg.num_layers,
            strides: cfg.strides,
            input_height: cfg.input_height,
            input_width: cfg.input_width,
            anchor_offset_x: cfg.anchor_offset_x,
            anchor_offset_y: cfg.anchor_offset_y,
            interpolated_scale_aspect_ratio: cfg.interpolated_scale_aspect_ratio,
        }
    }
}

impl From<GridConfigJson> for GridConfig {
    fn from(value: GridConfigJson) -> Self {
        Self {
            num_layers: value.num_layers,
            strides: value.strides,
            input_height: value.input_height,
            input_width: value.input_width,
            anchor_offset_x: value.anchor_offset_x,
            anchor_offset_y: value.anchor_offset_y,
            interpolated_scale_aspect_ratio: value.interpolated_scale_aspect_ratio,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ScoreConfigJson {
    limit: f32,
    threshold: f32,
}

impl Default for ScoreConfigJson {
    fn default() -> Self {
        let cfg = ScoreFilter::default();
        Self {
            limit: cfg.limit,
            threshold: cfg.threshold,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct NmsConfigJson {
    mode: SuppressionModeConfig,
    suppression_threshold: f32,
    min_score: Option<f32>,
}

impl Default for NmsConfigJson {
    fn default() -> Self {
        let cfg = NmsConfig::default();
        Self {
            mode: SuppressionModeConfig::Weighted,
            suppression_threshold: cfg.suppression_threshold,
            min_score: cfg.min_score,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    input_path: String,
    output_path: Option<String>,
    model: ModelConfig,
    grid: Option<GridConfigJson>,
    score: ScoreConfigJson,
    nms: NmsConfigJson,
    parallel: bool,
}

/// Raw network output as written by the inference side.
#[derive(Debug, Deserialize)]
struct RawOutputJson {
    regressors: Vec<Vec<f32>>,
    classificators: Classificators,
}

/// Logits either flat (`[N]`) or with a trailing unit axis (`[N][1]`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Classificators {
    Flat(Vec<f32>),
    Nested(Vec<Vec<f32>>),
}

impl Classificators {
    fn into_flat(self) -> Vec<f32> {
        match self {
            Classificators::Flat(values) => values,
            Classificators::Nested(rows) => rows.into_iter().flatten().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct BBoxRecord {
    xmin: f32,
    ymin: f32,
    xmax: f32,
    ymax: f32,
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    score: f32,
    bbox: BBoxRecord,
    keypoints: Vec<[f32; 2]>,
}

impl From<&Detection> for DetectionRecord {
    fn from(value: &Detection) -> Self {
        let bbox = value.bbox();
        Self {
            score: value.score(),
            bbox: BBoxRecord {
                xmin: bbox.xmin,
                ymin: bbox.ymin,
                xmax: bbox.xmax,
                ymax: bbox.ymax,
            },
            keypoints: value.keypoints().map(|(x, y)| [x, y]).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    count: usize,
    detections: Vec<DetectionRecord>,
}

fn detector_config(config: Config) -> Result<DetectorConfig, Box<dyn std::error::Error>> {
    let grid = match (config.model, config.grid) {
        (ModelConfig::Front, None) => GridConfig::front(),
        (ModelConfig::Back, None) => GridConfig::back(),
        (ModelConfig::Custom, Some(grid)) => grid.into(),
        (ModelConfig::Custom, None) => {
            return Err("model \"custom\" requires a grid section".into());
        }
        (_, Some(_)) => {
            return Err("grid may only be set when model is \"custom\"".into());
        }
    };
    Ok(DetectorConfig {
        grid,
        score: ScoreFilter {
            limit: config.score.limit,
            threshold: config.score.threshold,
        },
        nms: NmsConfig {
            mode: config.nms.mode.into(),
            suppression_threshold: config.nms.suppression_threshold,
            min_score: config.nms.min_score,
        },
        parallel: config.parallel,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("ssdface=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    let input_path = config.input_path.clone();
    let output_path = config.output_path.clone();
    let detector = Detector::new(detector_config(config)?)?;

    if cli.print_anchors {
        let anchors: Vec<[f32; 2]> = detector
            .anchors()
            .iter()
            .map(|a| [a.x_center, a.y_center])
            .collect();
        println!("{}", serde_json::to_string(&anchors)?);
        return Ok(());
    }

    if input_path.is_empty() {
        return Err("input_path must be set in the config".into());
    }
    let raw_text = fs::read_to_string(&input_path)?;
    let raw: RawOutputJson = serde_json::from_str(&raw_text)?;
    let row_len = raw.regressors.first().map_or(16, Vec::len);
    if raw.regressors.iter().any(|row| row.len() != row_len) {
        return Err("all regressor rows must have the same length".into());
    }
    let regressors: Vec<f32> = raw.regressors.into_iter().flatten().collect();
    let classificators = raw.classificators.into_flat();
    tracing::info!(
        rows = regressors.len() / row_len.max(1),
        anchors = detector.anchors().len(),
        "loaded raw output"
    );

    let boxes = RawBoxes::new(&regressors, row_len)?;
    let detections = detector.detect(boxes, &classificators)?;
    let output = Output {
        count: detections.len(),
        detections: detections.iter().map(DetectionRecord::from).collect(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
