//! Uniform module entry-point contract
//!
//! The core never contains recognition logic. Each module is reached
//! through [`ModuleBackend`]; a [`BackendFactory`] registered under the
//! runtime kind named in the module manifest opens the instance at load
//! time. The embedding application registers factories on the engine.

use std::sync::Arc;

use crate::config::SubUnitSetup;
use crate::geometry::BoundingBox;
use crate::image::ImageFrame;
use crate::labels::DetectionLabel;
use crate::registry::ModuleDescriptor;
use crate::results::{Detection, DetectionExtension, OcrHypothesis};
use crate::runtime::pool::WorkerPool;
use crate::view::CameraViewParams;

/// Failure reported from inside a module backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend could not open the module (missing artifact, bad config).
    #[error("backend failed to open module: {0}")]
    OpenFailed(String),
    /// OCR invoked with a label this module has no variant for.
    #[error("detection label {0:?} is not supported by this module")]
    LabelNotSupported(DetectionLabel),
    /// Any other module-internal failure.
    #[error("module internal error: {0}")]
    Internal(String),
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// One raw detection handed back by a module's detector sub-unit.
#[derive(Debug, Clone)]
pub struct BackendDetection {
    pub detection: Detection,
    pub extension: DetectionExtension,
}

/// Everything a factory needs to open a module instance.
pub struct BackendContext<'a> {
    /// Descriptor of the module being loaded.
    pub descriptor: &'a ModuleDescriptor,
    /// Effective camera view calibration.
    pub view: &'a CameraViewParams,
    /// Resolved detector setup; `None` when the sub-unit is disabled.
    pub det: Option<&'a SubUnitSetup>,
    /// Resolved OCR setup; `None` when the sub-unit is disabled.
    pub ocr: Option<&'a SubUnitSetup>,
    /// CPU worker pool for the detector, present for CPU targets.
    pub det_pool: Option<Arc<WorkerPool>>,
    /// CPU worker pool for the OCR, present for CPU targets.
    pub ocr_pool: Option<Arc<WorkerPool>>,
}

/// A live module instance. Calls against one instance are serialized by the
/// engine; the backend may still fan work out over the pools it was given.
pub trait ModuleBackend: Send {
    /// Run the detector on the (already clipped) region of interest.
    fn detect(
        &mut self,
        image: &ImageFrame<'_>,
        roi: &BoundingBox,
    ) -> BackendResult<Vec<BackendDetection>>;

    /// Run the OCR variant selected by `label` on a detection quadrilateral.
    /// On success at least one hypothesis is returned.
    fn recognize(
        &mut self,
        image: &ImageFrame<'_>,
        position: &BoundingBox,
        label: DetectionLabel,
    ) -> BackendResult<Vec<OcrHypothesis>>;

    /// Remaining executions in the module's own persisted license counter,
    /// queried once at load. `None` defers to the manifest value.
    fn executions_left(&self) -> Option<u64> {
        None
    }

    /// Persist one execution against the module's license counter. Driven
    /// after every successful detection call.
    fn debit_execution(&mut self) {}
}

/// Opens module instances for one runtime kind (e.g. "onnx").
pub trait BackendFactory: Send + Sync {
    fn open(&self, ctx: &BackendContext<'_>) -> BackendResult<Box<dyn ModuleBackend>>;
}
