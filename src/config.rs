//! Module load configuration
//!
//! The legacy configuration carries a single GPU flag pair applied to the
//! whole module. The extension record, when present, overrides it with
//! independent detector and OCR selections (config file, compute target,
//! thread count, disable switch). Resolution flattens both forms into one
//! [`SubUnitSetup`] per sub-unit.

use std::path::{Path, PathBuf};

/// Default config file names looked up next to the module.
pub const DEFAULT_OCR_CONFIG: &str = "config.ini";
pub const DEFAULT_DET_CONFIG: &str = "config-det.ini";

/// Where a sub-unit runs its inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeTarget {
    /// CPU inference with a fixed-size thread pool.
    Cpu { num_threads: usize },
    /// GPU inference on the given device.
    Gpu { device_id: i32 },
}

/// Per-sub-unit portion of the configuration extension.
#[derive(Debug, Clone, Default)]
pub struct SubUnitConfig {
    /// Sub-unit config file; defaults to the conventional name when unset.
    pub config_filename: Option<PathBuf>,
    /// Run on GPU instead of CPU.
    pub compute_on_gpu: bool,
    /// GPU device identifier; only used when `compute_on_gpu` is set.
    pub gpu_device_id: i32,
    /// CPU thread count; zero or negative means ~90% of logical processors.
    pub num_threads: i32,
    /// Skip loading this sub-unit entirely.
    pub disable: bool,
}

/// Extension record with independent detector and OCR selections.
#[derive(Debug, Clone, Default)]
pub struct ModuleConfigExtension {
    pub ocr: SubUnitConfig,
    pub det: SubUnitConfig,
}

/// Configuration handed to module load.
#[derive(Debug, Clone, Default)]
pub struct ModuleConfig {
    /// Legacy whole-module GPU flag; superseded by `extension`.
    pub compute_on_gpu: bool,
    /// Legacy GPU device identifier.
    pub gpu_device_id: i32,
    /// Optional extension; when present it fully overrides the legacy fields
    /// for the sub-units it addresses.
    pub extension: Option<ModuleConfigExtension>,
}

impl ModuleConfig {
    /// Legacy-only configuration: the GPU flags apply to both sub-units.
    pub fn legacy(compute_on_gpu: bool, gpu_device_id: i32) -> Self {
        Self {
            compute_on_gpu,
            gpu_device_id,
            extension: None,
        }
    }
}

/// Fully resolved settings for one sub-unit of a loaded module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubUnitSetup {
    /// Absolute path of the sub-unit config file inside the module directory.
    pub config_path: PathBuf,
    pub target: ComputeTarget,
}

/// Resolved detector + OCR setups; `None` means the sub-unit is disabled.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub det: Option<SubUnitSetup>,
    pub ocr: Option<SubUnitSetup>,
}

impl ModuleConfig {
    /// Flatten legacy fields and the extension into per-sub-unit setups,
    /// rooted at the module installation directory.
    pub fn resolve(&self, module_dir: &Path) -> ResolvedConfig {
        match &self.extension {
            Some(ext) => ResolvedConfig {
                det: resolve_sub_unit(&ext.det, module_dir, DEFAULT_DET_CONFIG),
                ocr: resolve_sub_unit(&ext.ocr, module_dir, DEFAULT_OCR_CONFIG),
            },
            None => {
                // Legacy GPU flags apply to both sub-units.
                let legacy = SubUnitConfig {
                    config_filename: None,
                    compute_on_gpu: self.compute_on_gpu,
                    gpu_device_id: self.gpu_device_id,
                    num_threads: 0,
                    disable: false,
                };
                ResolvedConfig {
                    det: resolve_sub_unit(&legacy, module_dir, DEFAULT_DET_CONFIG),
                    ocr: resolve_sub_unit(&legacy, module_dir, DEFAULT_OCR_CONFIG),
                }
            }
        }
    }
}

fn resolve_sub_unit(
    config: &SubUnitConfig,
    module_dir: &Path,
    default_filename: &str,
) -> Option<SubUnitSetup> {
    if config.disable {
        return None;
    }

    let filename = config
        .config_filename
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_filename));
    let config_path = if filename.is_absolute() {
        filename
    } else {
        module_dir.join(filename)
    };

    let target = if config.compute_on_gpu {
        ComputeTarget::Gpu {
            device_id: config.gpu_device_id,
        }
    } else {
        ComputeTarget::Cpu {
            num_threads: effective_thread_count(config.num_threads),
        }
    };

    Some(SubUnitSetup {
        config_path,
        target,
    })
}

/// Interpret a configured thread count. Values of zero or below mean ~90%
/// of the logical processors, rounded down, never less than one.
pub fn effective_thread_count(configured: i32) -> usize {
    if configured > 0 {
        return configured as usize;
    }
    let logical = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    ((logical as f64 * 0.9) as usize).max(1)
}
