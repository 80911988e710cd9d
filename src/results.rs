//! Detection and OCR result graphs
//!
//! Results are owned values allocated by the engine during dispatch and
//! handed to the caller; dropping a result releases every nested buffer
//! (detections, hypotheses, text lines, crops). A result is always fully
//! populated; partial results are never returned.

use image::GrayImage;

use crate::geometry::{AffineMap, BoundingBox};
use crate::labels::DetectionLabel;

/// Plate type reported for a false-positive detection.
pub const PLATE_TYPE_UNKNOWN: &str = "UNK";
/// Plate type reported when reading ADR hazard plates.
pub const PLATE_TYPE_ADR: &str = "ADR";
/// Plate type reported when reading trash-load plates.
pub const PLATE_TYPE_TRASH: &str = "TRASH";

/// Additional per-detection attributes introduced with the extension record.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionExtension {
    /// Occlusion degree in [0, 1]; negative when unknown.
    pub occlusion: f32,
    /// -1 unknown, 0 not truncated, 1 truncated.
    pub truncated: i32,
    /// Shared id across physically connected detections; 0 undefined,
    /// valid ids start at 1, -1 when the cluster is not known.
    pub cluster_id: i32,
    /// Confidence of the cluster assignment.
    pub cluster_confidence: f64,
}

impl Default for DetectionExtension {
    fn default() -> Self {
        Self {
            occlusion: -1.0,
            truncated: -1,
            cluster_id: -1,
            cluster_confidence: 0.0,
        }
    }
}

/// One localized object reported by a module's detector.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Detection confidence, non-negative.
    pub confidence: f64,
    /// Reported quadrilateral in source image coordinates.
    pub position: BoundingBox,
    pub label: DetectionLabel,
    /// Crop of the detection; absent when crop generation is disabled.
    pub crop: Option<GrayImage>,
    /// Affine mapping from crop coordinates to source image coordinates.
    pub affine_mapping: AffineMap,
}

/// Detection result owned by the caller after a successful `run_det`.
#[derive(Debug, Clone)]
pub struct DetResult {
    /// Id of the module that produced the result.
    pub module_id: i32,
    /// Index of the module that produced the result.
    pub module_index: usize,
    /// Detections sorted by descending confidence.
    pub detections: Vec<Detection>,
    /// Parallel per-detection extensions; either empty or one per detection.
    pub extensions: Vec<DetectionExtension>,
}

impl DetResult {
    pub fn num_detections(&self) -> usize {
        self.detections.len()
    }
}

/// One recognized text line, in reading order within the hypothesis.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Confidence for the whole line.
    pub line_confidence: f64,
    /// Text as Unicode code points (UTF-32).
    pub characters: Vec<char>,
    /// Per-character confidences, same length as `characters`.
    pub character_confidences: Vec<f64>,
}

impl TextLine {
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// The line as a `String`; ASCII-only consumers may downcast further.
    pub fn text(&self) -> String {
        self.characters.iter().collect()
    }
}

/// Predicted physical plate dimensions in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlateDimensions {
    pub width_mm: u32,
    pub height_mm: u32,
}

/// Readability attributes introduced with the hypothesis extension record.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrHypothesisExtension {
    /// 1 = unreadable, 0 = readable; negative when unavailable.
    pub unreadable: f64,
    /// 1 = fully obstructed, 0 = unobstructed; negative when unavailable.
    pub obstructed: f64,
}

impl Default for OcrHypothesisExtension {
    fn default() -> Self {
        Self {
            unreadable: -1.0,
            obstructed: -1.0,
        }
    }
}

/// One candidate reading of a detection.
#[derive(Debug, Clone)]
pub struct OcrHypothesis {
    pub confidence: f64,
    /// Text lines in reading order, top to bottom.
    pub text_lines: Vec<TextLine>,
    /// ILPC country code, or "ADR"/"TRASH"/"UNK".
    pub plate_type: String,
    pub plate_type_confidence: f64,
    pub dimensions: PlateDimensions,
    pub dimensions_confidence: f64,
    pub extension: Option<OcrHypothesisExtension>,
}

impl OcrHypothesis {
    /// True when the module flagged the detection as a false positive.
    pub fn is_false_positive(&self) -> bool {
        self.plate_type == PLATE_TYPE_UNKNOWN
    }
}

/// OCR result owned by the caller after a successful `run_ocr`.
///
/// Hypotheses are ranked best-first; the leading hypothesis is the
/// authoritative reading.
#[derive(Debug, Clone)]
pub struct OcrResult {
    pub module_id: i32,
    pub module_index: usize,
    pub hypotheses: Vec<OcrHypothesis>,
}

impl OcrResult {
    pub fn num_hypotheses(&self) -> usize {
        self.hypotheses.len()
    }

    /// The highest-ranked reading.
    pub fn best(&self) -> Option<&OcrHypothesis> {
        self.hypotheses.first()
    }
}
