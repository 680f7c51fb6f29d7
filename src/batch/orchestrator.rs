use crate::annotations::class_catalog::ClassCatalog;
use crate::annotations::codec;
use crate::annotations::detection_set::ImageDetectionSet;
use crate::batch::outcome::{BatchReport, FileOutcome};
use crate::postprocessing::merge::merge;
use crate::postprocessing::suppression::{SuppressionConfig, suppress};
use crate::rendering::draw::render;
use ab_glyph::FontVec;
use image::{ImageFormat, RgbImage};
use itertools::Itertools;
use log::{debug, warn};
use rayon::prelude::*;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Confidence written for records that never carried one.
const DEFAULT_CONFIDENCE: f32 = 0.0;

/// A set of custom errors raised before any file is processed. Batch runs
/// fail fast on bad configuration; per-file problems are reported as
/// outcomes instead.
#[derive(Debug)]
pub enum ConfigurationError {
    MissingInputDirectory {
        path: PathBuf,
    },
    ThresholdOutOfRange {
        name: &'static str,
        value: f32,
    },
    OutputDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::MissingInputDirectory { path } => {
                write!(f, "Input directory {:?} does not exist or is not a directory.", path)
            }
            ConfigurationError::ThresholdOutOfRange { name, value } => {
                write!(f, "{} must lie in [0, 1], got {}.", name, value)
            }
            ConfigurationError::OutputDirectory { path, source } => {
                write!(f, "Failed to create output directory {:?}: {}.", path, source)
            }
        }
    }
}

impl Error for ConfigurationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigurationError::OutputDirectory { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Merges two annotation directories into one, pairing files by base name.
///
/// Every base name present in either directory yields one output file: both
/// sides are decoded (a missing side contributes the empty set, so the
/// override has nothing to touch), merged in memory, and written in a single
/// atomic step. This replaces the append-into-destination approach of the
/// original tooling, which could duplicate records across runs and interleave
/// writers.
pub fn merge_directories(
    primary_dir: &Path,
    secondary_dir: &Path,
    out_dir: &Path,
    override_confidence: Option<f32>,
) -> Result<BatchReport, ConfigurationError> {
    ensure_input_directory(primary_dir)?;
    ensure_input_directory(secondary_dir)?;
    if let Some(value) = override_confidence {
        ensure_unit_interval("override_confidence", value)?;
    }
    prepare_output_directory(out_dir)?;

    let names: Vec<String> = annotation_base_names(primary_dir)
        .into_iter()
        .chain(annotation_base_names(secondary_dir))
        .unique()
        .sorted()
        .collect();
    let outcomes = names
        .par_iter()
        .map(|name| merge_one(primary_dir, secondary_dir, out_dir, name, override_confidence))
        .collect();
    Ok(BatchReport::from_outcomes(outcomes))
}

fn merge_one(
    primary_dir: &Path,
    secondary_dir: &Path,
    out_dir: &Path,
    name: &str,
    override_confidence: Option<f32>,
) -> FileOutcome {
    let primary_path = primary_dir.join(format!("{name}.txt"));
    let secondary_path = secondary_dir.join(format!("{name}.txt"));

    let primary = match decode_optional(&primary_path) {
        Ok(set) => set,
        Err(message) => return FileOutcome::Failed { source: primary_path, message },
    };
    let secondary = match decode_optional(&secondary_path) {
        Ok(set) => set,
        Err(message) => return FileOutcome::Failed { source: secondary_path, message },
    };

    let source = if primary_path.exists() { primary_path } else { secondary_path };

    let merged = merge(&primary, &secondary, override_confidence);
    let output = out_dir.join(format!("{name}.txt"));
    match write_text_atomically(&output, &codec::encode(&merged, DEFAULT_CONFIDENCE)) {
        Ok(()) => {
            debug!("merged {} records into {:?}", merged.len(), output);
            FileOutcome::Written { source, output }
        }
        Err(message) => FileOutcome::Failed { source, message },
    }
}

/// Applies score filtering and non-maximum suppression to every annotation
/// file in a directory.
///
/// An image whose detections all get filtered away produces no output file,
/// the same as an image with zero input detections; the distinction lives in
/// the report (`EmptyResult`), not in the directory listing.
pub fn suppress_directory(
    src_dir: &Path,
    out_dir: &Path,
    config: &SuppressionConfig,
) -> Result<BatchReport, ConfigurationError> {
    ensure_input_directory(src_dir)?;
    ensure_unit_interval("score_threshold", config.score_threshold)?;
    ensure_unit_interval("iou_threshold", config.iou_threshold)?;
    prepare_output_directory(out_dir)?;

    let names: Vec<String> = annotation_base_names(src_dir).into_iter().sorted().collect();
    let outcomes = names
        .par_iter()
        .map(|name| suppress_one(src_dir, out_dir, name, config))
        .collect();
    Ok(BatchReport::from_outcomes(outcomes))
}

fn suppress_one(
    src_dir: &Path,
    out_dir: &Path,
    name: &str,
    config: &SuppressionConfig,
) -> FileOutcome {
    let source = src_dir.join(format!("{name}.txt"));
    let set = match decode_annotation_file(&source) {
        Ok(set) => set,
        Err(message) => return FileOutcome::Failed { source, message },
    };
    let filtered = suppress(&set, config);
    if filtered.is_empty() {
        debug!("no boxes survived for {:?}; writing nothing", source);
        return FileOutcome::EmptyResult { source };
    }
    let output = out_dir.join(format!("{name}.txt"));
    match write_text_atomically(&output, &codec::encode(&filtered, DEFAULT_CONFIDENCE)) {
        Ok(()) => {
            debug!("kept {} of {} boxes for {:?}", filtered.len(), set.len(), source);
            FileOutcome::Written { source, output }
        }
        Err(message) => FileOutcome::Failed { source, message },
    }
}

/// Renders every annotation file in a directory onto its matching image.
///
/// Annotation files with no correspondingly named `.jpg` are skipped rather
/// than treated as errors; each skip is logged and reported.
pub fn render_directory(
    bbox_dir: &Path,
    image_dir: &Path,
    out_dir: &Path,
    catalog: &ClassCatalog,
    font: &FontVec,
) -> Result<BatchReport, ConfigurationError> {
    ensure_input_directory(bbox_dir)?;
    ensure_input_directory(image_dir)?;
    prepare_output_directory(out_dir)?;

    let names: Vec<String> = annotation_base_names(bbox_dir).into_iter().sorted().collect();
    let outcomes = names
        .par_iter()
        .map(|name| render_one(bbox_dir, image_dir, out_dir, name, catalog, font))
        .collect();
    Ok(BatchReport::from_outcomes(outcomes))
}

fn render_one(
    bbox_dir: &Path,
    image_dir: &Path,
    out_dir: &Path,
    name: &str,
    catalog: &ClassCatalog,
    font: &FontVec,
) -> FileOutcome {
    let source = bbox_dir.join(format!("{name}.txt"));
    let expected_image = image_dir.join(format!("{name}.jpg"));
    if !expected_image.exists() {
        warn!("no image for annotation file {:?}; skipping", source);
        return FileOutcome::SkippedMissingImage { source, expected_image };
    }
    let set = match decode_annotation_file(&source) {
        Ok(set) => set,
        Err(message) => return FileOutcome::Failed { source, message },
    };
    let image = match image::open(&expected_image) {
        Ok(image) => image.into_rgb8(),
        Err(error) => {
            return FileOutcome::Failed {
                source,
                message: format!("{:?}: {}", expected_image, error),
            };
        }
    };
    let rendered = render(&image, &set, catalog, font);
    let output = out_dir.join(format!("{name}.jpg"));
    match write_image_atomically(&rendered, &output) {
        Ok(()) => {
            debug!("rendered {} boxes onto {:?}", set.len(), output);
            FileOutcome::Written { source, output }
        }
        Err(message) => FileOutcome::Failed { source, message },
    }
}

fn ensure_input_directory(path: &Path) -> Result<(), ConfigurationError> {
    if !path.is_dir() {
        return Err(ConfigurationError::MissingInputDirectory { path: path.to_path_buf() });
    }
    Ok(())
}

fn ensure_unit_interval(name: &'static str, value: f32) -> Result<(), ConfigurationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigurationError::ThresholdOutOfRange { name, value });
    }
    Ok(())
}

fn prepare_output_directory(path: &Path) -> Result<(), ConfigurationError> {
    fs::create_dir_all(path).map_err(|source| ConfigurationError::OutputDirectory {
        path: path.to_path_buf(),
        source,
    })
}

/// Base filenames (without extension) of the `.txt` files directly inside a
/// directory.
fn annotation_base_names(dir: &Path) -> Vec<String> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "txt"))
        .filter_map(|entry| {
            entry
                .path()
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .collect()
}

fn decode_annotation_file(path: &Path) -> Result<ImageDetectionSet, String> {
    let text = fs::read_to_string(path).map_err(|error| format!("{:?}: {}", path, error))?;
    codec::decode(&text).map_err(|error| format!("{:?}: {}", path, error))
}

/// Decodes an annotation file that may legitimately be absent (one-sided
/// merges); a missing file contributes the empty set.
fn decode_optional(path: &Path) -> Result<ImageDetectionSet, String> {
    if !path.exists() {
        return Ok(ImageDetectionSet::new());
    }
    decode_annotation_file(path)
}

/// Writes via a temporary sibling and a rename, so concurrent readers never
/// observe a partially written file. No two units of work share an output
/// path, so the temporary names cannot collide either.
fn write_text_atomically(path: &Path, text: &str) -> Result<(), String> {
    let tmp = temporary_sibling(path);
    fs::write(&tmp, text).map_err(|error| format!("{:?}: {}", tmp, error))?;
    fs::rename(&tmp, path).map_err(|error| format!("{:?}: {}", path, error))
}

fn write_image_atomically(image: &RgbImage, path: &Path) -> Result<(), String> {
    let tmp = temporary_sibling(path);
    image
        .save_with_format(&tmp, ImageFormat::Jpeg)
        .map_err(|error| format!("{:?}: {}", tmp, error))?;
    fs::rename(&tmp, path).map_err(|error| format!("{:?}: {}", path, error))
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
