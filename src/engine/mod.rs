//! The engine: an opaque handle over registry, runtime and dispatch
//!
//! One engine owns one registry scan, the per-index loaded instances, the
//! registered backend factories and the last-error register. Engines are
//! independent of each other; operations on one engine are serialized by
//! Rust's borrow rules (`&mut self` on every mutating call).

mod dispatch;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ModuleConfig;
use crate::error::{Error, ErrorChannel, ErrorCode, Result};
use crate::geometry::BoundingBox;
use crate::image::ImageFrame;
use crate::labels::DetectionLabel;
use crate::registry::{ModuleDescriptor, Registry};
use crate::results::{DetResult, OcrResult};
use crate::runtime::{BackendFactory, LoadedModule};
use crate::view::CameraViewParams;

/// Opaque engine state. All SDK operations go through this handle.
pub struct Engine {
    // Loaded instances drop before the registry on teardown.
    loaded: Vec<Option<LoadedModule>>,
    registry: Registry,
    backends: HashMap<String, Arc<dyn BackendFactory>>,
    errors: ErrorChannel,
}

impl Engine {
    /// Create an engine and scan `modules_dir` for installed modules.
    ///
    /// Fails with `DirectoryNotFound` when the directory does not exist. A
    /// directory with no usable modules yields an engine with zero modules;
    /// consumers must check [`Engine::num_modules`].
    pub fn init(modules_dir: &Path) -> Result<Self> {
        let registry = Registry::scan(modules_dir)?;
        let loaded = (0..registry.num_modules()).map(|_| None).collect();
        info!(
            "Engine initialized with {} modules from {}",
            registry.num_modules(),
            modules_dir.display()
        );
        Ok(Self {
            loaded,
            registry,
            backends: HashMap::new(),
            errors: ErrorChannel::new(),
        })
    }

    /// Register a backend factory for a runtime kind named in module
    /// manifests. Replaces a previously registered factory of the same kind.
    pub fn register_backend(&mut self, kind: impl Into<String>, factory: Arc<dyn BackendFactory>) {
        let kind = kind.into();
        if self.backends.insert(kind.clone(), factory).is_some() {
            warn!("Replacing backend factory for runtime kind '{kind}'");
        }
    }

    /// Number of discovered modules.
    pub fn num_modules(&self) -> usize {
        self.registry.num_modules()
    }

    /// Descriptor of the module at `index`. The reference is stable for the
    /// engine's lifetime.
    pub fn module_info(&self, index: usize) -> Result<&ModuleDescriptor> {
        self.record(self.registry.descriptor(index).ok_or_else(|| {
            Error::new(
                ErrorCode::BadArgument,
                format!("module index {index} out of range"),
            )
        }))
    }

    /// Resolve a module index from id and version; `(0, 0)` selects the
    /// latest version of the family.
    pub fn module_index(&self, id: i32, version: u32, subversion: u32) -> Result<usize> {
        self.record(
            self.registry
                .find_by_id(id, version, subversion)
                .ok_or_else(|| {
                    Error::new(
                        ErrorCode::ModuleNotFound,
                        format!("no module with id {id} version {version}.{subversion}"),
                    )
                }),
        )
    }

    /// Resolve a module index from its exact name.
    pub fn module_index_by_name(&self, name: &str) -> Result<usize> {
        if name.is_empty() {
            return self.record(Err(Error::new(
                ErrorCode::BadArgument,
                "module name must not be empty",
            )));
        }
        self.record(self.registry.find_by_name(name).ok_or_else(|| {
            Error::new(
                ErrorCode::ModuleNotFound,
                format!("no module named '{name}'"),
            )
        }))
    }

    /// Load the module at `index` with optional calibration and config.
    ///
    /// Loading an already loaded index frees the previous instance first.
    pub fn load_module(
        &mut self,
        index: usize,
        view: Option<&CameraViewParams>,
        config: Option<&ModuleConfig>,
    ) -> Result<()> {
        let result = self.load_module_inner(index, view, config);
        self.record(result)
    }

    fn load_module_inner(
        &mut self,
        index: usize,
        view: Option<&CameraViewParams>,
        config: Option<&ModuleConfig>,
    ) -> Result<()> {
        let descriptor = self.registry.descriptor(index).ok_or_else(|| {
            Error::new(
                ErrorCode::BadArgument,
                format!("module index {index} out of range"),
            )
        })?;

        let factory = self
            .backends
            .get(&descriptor.runtime)
            .cloned()
            .ok_or_else(|| {
                Error::new(
                    ErrorCode::ModuleLoadFailed,
                    format!(
                        "no backend registered for runtime kind '{}'",
                        descriptor.runtime
                    ),
                )
            })?;

        // Reload frees the previous instance first.
        if self.loaded[index].take().is_some() {
            info!("Freeing previously loaded instance of module {index}");
        }

        match LoadedModule::load(descriptor, factory.as_ref(), view, config) {
            Ok(module) => {
                self.loaded[index] = Some(module);
                Ok(())
            }
            Err(err) => {
                if matches!(
                    err.code(),
                    ErrorCode::LicenseInvalid | ErrorCode::LicenseExpired
                ) {
                    descriptor.deactivate();
                }
                Err(err)
            }
        }
    }

    /// Free the loaded instance at `index`. A no-op on an unloaded index.
    pub fn free_module(&mut self, index: usize) -> Result<()> {
        if index >= self.loaded.len() {
            return self.record(Err(Error::new(
                ErrorCode::BadArgument,
                format!("module index {index} out of range"),
            )));
        }
        if self.loaded[index].take().is_some() {
            info!("Freed module instance {index}");
        }
        Ok(())
    }

    /// Whether the module at `index` currently has a loaded instance.
    pub fn is_loaded(&self, index: usize) -> bool {
        self.loaded.get(index).is_some_and(|slot| slot.is_some())
    }

    /// Run detection with the module at `index` over a region of interest.
    /// The region is clipped to the image bounds; an empty clip yields a
    /// valid result with zero detections.
    pub fn run_det(
        &mut self,
        index: usize,
        image: &ImageFrame<'_>,
        roi: &BoundingBox,
    ) -> Result<DetResult> {
        let result = match self.loaded_mut(index) {
            Ok((descriptor, module)) => dispatch::run_det(descriptor, module, index, image, roi),
            Err(err) => Err(err),
        };
        self.record(result)
    }

    /// Run OCR with the module at `index` on a detection quadrilateral.
    pub fn run_ocr(
        &mut self,
        index: usize,
        image: &ImageFrame<'_>,
        position: &BoundingBox,
        label: DetectionLabel,
    ) -> Result<OcrResult> {
        let result = match self.loaded_mut(index) {
            Ok((descriptor, module)) => {
                dispatch::run_ocr(descriptor, module, index, image, position, label)
            }
            Err(err) => Err(err),
        };
        self.record(result)
    }

    /// Most recent failure code; reading resets the register to `Success`.
    pub fn last_error(&self) -> ErrorCode {
        self.errors.take()
    }

    // Dispatch against any index without a live instance reports
    // ModuleNotLoaded, out-of-range indices included.
    fn loaded_mut(&mut self, index: usize) -> Result<(&ModuleDescriptor, &mut LoadedModule)> {
        let descriptor = self.registry.descriptor(index).ok_or_else(|| {
            Error::new(
                ErrorCode::ModuleNotLoaded,
                format!("module {index} is not loaded"),
            )
        })?;
        let module = self.loaded[index].as_mut().ok_or_else(|| {
            Error::new(
                ErrorCode::ModuleNotLoaded,
                format!("module {index} is not loaded"),
            )
        })?;
        Ok((descriptor, module))
    }

    fn record<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.errors.record(err.code());
        }
        result
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("modules", &self.registry.num_modules())
            .field(
                "loaded",
                &self.loaded.iter().filter(|slot| slot.is_some()).count(),
            )
            .finish_non_exhaustive()
    }
}
