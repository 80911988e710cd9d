//! Per-module loaded state
//!
//! A loaded module owns its backend instance, its effective calibration and
//! configuration, and the worker pools for CPU sub-units. The state machine
//! per index is `unloaded -> loaded -> unloaded`; reloading an already
//! loaded index frees the previous instance first. Teardown drops the
//! backend before joining the pools.

pub mod backend;
pub mod pool;

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{ComputeTarget, ModuleConfig, SubUnitSetup};
use crate::error::{Error, ErrorCode, Result};
use crate::registry::ModuleDescriptor;
use crate::view::CameraViewParams;

pub use backend::{
    BackendContext, BackendDetection, BackendError, BackendFactory, BackendResult, ModuleBackend,
};
pub use pool::WorkerPool;

/// A live module instance with its resolved configuration.
pub struct LoadedModule {
    // Backend must drop before the pools so teardown can join them last.
    backend: Box<dyn ModuleBackend>,
    view: CameraViewParams,
    det: Option<SubUnitSetup>,
    ocr: Option<SubUnitSetup>,
    det_pool: Option<Arc<WorkerPool>>,
    ocr_pool: Option<Arc<WorkerPool>>,
    /// Mirror of the license execution counter; `None` means uncounted.
    executions_left: Option<u64>,
}

impl LoadedModule {
    /// Instantiate the module described by `descriptor`.
    ///
    /// Missing view parameters fall back to the module defaults from the
    /// manifest; a missing config falls back to the conventional config
    /// files next to the module. License validation happens here; on a
    /// license failure the caller clears the descriptor's active flag. A
    /// descriptor already retired by quota exhaustion refuses to load; the
    /// remaining count is the backend's persisted value, not the scan-time
    /// manifest value.
    pub fn load(
        descriptor: &ModuleDescriptor,
        factory: &dyn BackendFactory,
        view: Option<&CameraViewParams>,
        config: Option<&ModuleConfig>,
    ) -> Result<Self> {
        descriptor.license.validate_now()?;
        if !descriptor.is_active() {
            return Err(Error::new(
                ErrorCode::QuotaExhausted,
                format!("module '{}' execution quota is exhausted", descriptor.name),
            ));
        }

        let view = view.copied().unwrap_or(descriptor.default_view);
        let default_config;
        let config = match config {
            Some(config) => config,
            None => {
                default_config = ModuleConfig::default();
                &default_config
            }
        };
        let resolved = config.resolve(&descriptor.path);

        let det_pool = match resolved.det.as_ref() {
            Some(setup) => cpu_pool(setup, &format!("{}-det", descriptor.name))?,
            None => None,
        };
        let ocr_pool = match resolved.ocr.as_ref() {
            Some(setup) => cpu_pool(setup, &format!("{}-ocr", descriptor.name))?,
            None => None,
        };

        let ctx = BackendContext {
            descriptor,
            view: &view,
            det: resolved.det.as_ref(),
            ocr: resolved.ocr.as_ref(),
            det_pool: det_pool.clone(),
            ocr_pool: ocr_pool.clone(),
        };

        let backend = factory.open(&ctx).map_err(|err| match err {
            BackendError::OpenFailed(detail) => Error::new(
                ErrorCode::ModuleLoadFailed,
                format!("module '{}' failed to open: {detail}", descriptor.name),
            ),
            other => Error::new(ErrorCode::ModuleLoadFailed, other.to_string()),
        })?;

        // Counted licenses mirror the module's own persisted count; the
        // manifest value only seeds modules that do not track one.
        let executions_left = if descriptor.license.is_using_counter() {
            backend
                .executions_left()
                .or(descriptor.license.executions_left)
        } else {
            None
        };

        info!(
            "Loaded module '{}' (det: {}, ocr: {})",
            descriptor.name,
            resolved.det.is_some(),
            resolved.ocr.is_some()
        );

        Ok(Self {
            backend,
            view,
            det: resolved.det,
            ocr: resolved.ocr,
            det_pool,
            ocr_pool,
            executions_left,
        })
    }

    pub fn backend_mut(&mut self) -> &mut dyn ModuleBackend {
        self.backend.as_mut()
    }

    pub fn view(&self) -> &CameraViewParams {
        &self.view
    }

    pub fn detector_enabled(&self) -> bool {
        self.det.is_some()
    }

    pub fn ocr_enabled(&self) -> bool {
        self.ocr.is_some()
    }

    /// Remaining executions when the license counter is enabled.
    pub fn executions_left(&self) -> Option<u64> {
        self.executions_left
    }

    /// Check the execution quota before a detection call.
    pub fn check_quota(&self) -> Result<()> {
        match self.executions_left {
            Some(0) => Err(Error::new(
                ErrorCode::QuotaExhausted,
                "module execution quota exhausted",
            )),
            _ => Ok(()),
        }
    }

    /// Debit one execution after a successful detection call. The module
    /// persists its own counter; the mirror only drives the quota check.
    pub fn debit_execution(&mut self) {
        if let Some(left) = self.executions_left.as_mut() {
            *left = left.saturating_sub(1);
            self.backend.debit_execution();
            debug!("Execution counter now at {left}");
        }
    }
}

impl std::fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModule")
            .field("view", &self.view)
            .field("det", &self.det)
            .field("ocr", &self.ocr)
            .field("executions_left", &self.executions_left)
            .finish_non_exhaustive()
    }
}

fn cpu_pool(setup: &SubUnitSetup, name: &str) -> Result<Option<Arc<WorkerPool>>> {
    match setup.target {
        ComputeTarget::Cpu { num_threads } => {
            let pool = WorkerPool::new(num_threads, name).map_err(|err| {
                Error::new(
                    ErrorCode::ModuleLoadFailed,
                    format!("cannot start worker pool '{name}': {err}"),
                )
            })?;
            Ok(Some(Arc::new(pool)))
        }
        ComputeTarget::Gpu { .. } => Ok(None),
    }
}
