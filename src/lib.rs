//! platekit - license plate reading SDK core
//!
//! The module registry and dispatch runtime of an ANPR SDK. An [`Engine`]
//! scans a module installation directory, publishes immutable module
//! descriptors, loads module instances with camera-view calibration and
//! per-sub-unit configuration, and routes detection/OCR calls to them
//! through a uniform backend contract. The recognition engines themselves
//! live outside this crate; embedders register a [`runtime::BackendFactory`]
//! per runtime kind named in the module manifests.

pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod image;
pub mod labels;
pub mod license;
pub mod registry;
pub mod results;
pub mod runtime;
pub mod view;

pub use config::{ModuleConfig, ModuleConfigExtension, SubUnitConfig};
pub use engine::Engine;
pub use error::{Error, ErrorCode, Result};
pub use geometry::{AffineMap, BoundingBox, Point};
pub use image::{ImageFrame, PixelFormat};
pub use labels::{DetectionLabel, DetectorKind, ObjectKind, OcrRegion, PropertyFlags};
pub use registry::ModuleDescriptor;
pub use results::{DetResult, Detection, OcrHypothesis, OcrResult, TextLine};
pub use view::{load_view_config, write_view_config, CameraViewParams, ViewType};

/// Maximum filesystem path length accepted over the binary interface.
pub const MAX_PATH_LEN: usize = 4096;
/// Maximum length of names and other short strings.
pub const MAX_STR_LEN: usize = 256;

/// Engine version encoded in one integer: high byte of the low 16 bits is
/// the major version, low byte the minor version.
pub fn version() -> u32 {
    let major = parse_version_component(env!("CARGO_PKG_VERSION_MAJOR"));
    let minor = parse_version_component(env!("CARGO_PKG_VERSION_MINOR"));
    (major << 8) | minor
}

/// Build date of the engine in `"Mmm dd yyyy"` form.
pub fn compilation_date() -> &'static str {
    env!("PLATEKIT_BUILD_DATE")
}

const fn parse_version_component(text: &str) -> u32 {
    let bytes = text.as_bytes();
    let mut value = 0u32;
    let mut i = 0;
    while i < bytes.len() {
        value = value * 10 + (bytes[i] - b'0') as u32;
        i += 1;
    }
    value & 0xFF
}
