//! Post-processing for object-detection annotation datasets.
//!
//! The pipeline takes per-image YOLO-style annotation text files produced by
//! one or more detectors, merges the sources per image, suppresses redundant
//! overlapping boxes, and renders the survivors onto the matching images for
//! inspection. Every image is processed independently; there is no
//! cross-image state anywhere in the crate.

pub mod annotations;
pub mod batch;
pub mod postprocessing;
pub mod rendering;
