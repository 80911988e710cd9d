//! Detection and OCR call routing
//!
//! Dispatch validates the target module state, clips the region of interest,
//! invokes the backend, and normalizes the returned structures (confidence
//! ordering, crop stripping, invariant checks) into owned result values.

use std::time::Instant;

use tracing::debug;

use crate::error::{Error, ErrorCode, Result};
use crate::geometry::BoundingBox;
use crate::image::ImageFrame;
use crate::labels::DetectionLabel;
use crate::registry::ModuleDescriptor;
use crate::results::{DetResult, Detection, DetectionExtension, OcrResult};
use crate::runtime::{BackendError, LoadedModule};

/// Run the detector of a loaded module over a region of interest.
pub fn run_det(
    descriptor: &ModuleDescriptor,
    module: &mut LoadedModule,
    index: usize,
    image: &ImageFrame<'_>,
    roi: &BoundingBox,
) -> Result<DetResult> {
    if !module.detector_enabled() {
        return Err(Error::new(
            ErrorCode::SubUnitDisabled,
            format!("detector of module '{}' is disabled", descriptor.name),
        ));
    }

    if let Err(err) = module.check_quota() {
        // Exhausted quota retires the module family until relicensed.
        descriptor.deactivate();
        return Err(err);
    }

    let clipped = roi.clipped(image.width(), image.height());
    let start = Instant::now();

    let raw = if clipped.is_empty() {
        // An empty clip is a valid result with zero detections.
        Vec::new()
    } else {
        module
            .backend_mut()
            .detect(image, &clipped)
            .map_err(map_backend_error)?
    };

    let mut detections = Vec::with_capacity(raw.len());
    let mut extensions = Vec::with_capacity(raw.len());
    for item in raw {
        let mut detection = item.detection;
        if detection.confidence < 0.0 {
            return Err(Error::new(
                ErrorCode::InternalError,
                format!(
                    "module '{}' reported a negative detection confidence",
                    descriptor.name
                ),
            ));
        }
        detection.position = detection.position.clipped(image.width(), image.height());
        if !descriptor.generate_crops {
            detection.crop = None;
            detection.affine_mapping = Default::default();
        }
        detections.push(detection);
        extensions.push(item.extension);
    }

    // Descending confidence; stable, so ties keep insertion order.
    let mut order: Vec<usize> = (0..detections.len()).collect();
    order.sort_by(|&a, &b| {
        detections[b]
            .confidence
            .partial_cmp(&detections[a].confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let detections: Vec<Detection> = order.iter().map(|&i| detections[i].clone()).collect();
    let extensions: Vec<DetectionExtension> =
        order.iter().map(|&i| extensions[i].clone()).collect();

    module.debit_execution();

    debug!(
        "Detection on module '{}' complete in {:?}: {} detections",
        descriptor.name,
        start.elapsed(),
        detections.len()
    );

    Ok(DetResult {
        module_id: descriptor.id,
        module_index: index,
        detections,
        extensions,
    })
}

/// Run the OCR variant selected by `label` on a detection quadrilateral.
pub fn run_ocr(
    descriptor: &ModuleDescriptor,
    module: &mut LoadedModule,
    index: usize,
    image: &ImageFrame<'_>,
    position: &BoundingBox,
    label: DetectionLabel,
) -> Result<OcrResult> {
    if !module.ocr_enabled() {
        return Err(Error::new(
            ErrorCode::SubUnitDisabled,
            format!("OCR of module '{}' is disabled", descriptor.name),
        ));
    }

    // An empty label list in the manifest leaves the decision to the module.
    if !descriptor.supported_labels.is_empty() && !descriptor.supports_label(label) {
        return Err(Error::new(
            ErrorCode::LabelNotSupported,
            format!(
                "module '{}' has no OCR variant for label {}",
                descriptor.name,
                label.code()
            ),
        ));
    }

    let start = Instant::now();
    let mut hypotheses = module
        .backend_mut()
        .recognize(image, position, label)
        .map_err(map_backend_error)?;

    if hypotheses.is_empty() {
        return Err(Error::new(
            ErrorCode::InternalError,
            format!("module '{}' returned no OCR hypotheses", descriptor.name),
        ));
    }

    for hyp in &hypotheses {
        for line in &hyp.text_lines {
            if line.characters.len() != line.character_confidences.len() {
                return Err(Error::new(
                    ErrorCode::InternalError,
                    format!(
                        "module '{}' returned a text line with mismatched confidence array",
                        descriptor.name
                    ),
                ));
            }
        }
    }

    // Ranked best-first; the leading hypothesis is the authoritative reading.
    hypotheses.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    debug!(
        "OCR on module '{}' complete in {:?}: {} hypotheses",
        descriptor.name,
        start.elapsed(),
        hypotheses.len()
    );

    Ok(OcrResult {
        module_id: descriptor.id,
        module_index: index,
        hypotheses,
    })
}

fn map_backend_error(err: BackendError) -> Error {
    match err {
        BackendError::LabelNotSupported(label) => Error::new(
            ErrorCode::LabelNotSupported,
            format!("label {} not supported", label.code()),
        ),
        BackendError::OpenFailed(detail) => Error::new(ErrorCode::ModuleLoadFailed, detail),
        BackendError::Internal(detail) => Error::new(ErrorCode::InternalError, detail),
    }
}
