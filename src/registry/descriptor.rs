//! Immutable metadata of a discovered module
//!
//! A descriptor is built once from the module manifest during the registry
//! scan and never changes afterwards, with one exception: the active flag,
//! which license validation may clear.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;

use crate::labels::{DetectionLabel, DetectorKind, ObjectKind, PropertyFlags};
use crate::license::LicenseInfo;
use crate::view::CameraViewParams;

/// Min/mean/max triple describing an expected plate geometry range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range3<T> {
    pub min: T,
    pub mean: T,
    pub max: T,
}

impl<T: Copy> Range3<T> {
    pub fn new(min: T, mean: T, max: T) -> Self {
        Self { min, mean, max }
    }
}

/// Immutable metadata of one discovered module.
#[derive(Debug)]
pub struct ModuleDescriptor {
    /// Vendor-assigned identity of the module family.
    pub id: i32,
    /// Human-readable name, unique within the registry after disambiguation.
    pub name: String,
    pub version: u32,
    pub subversion: u32,
    /// Release date of the module build.
    pub release_date: NaiveDate,
    /// Filesystem location of the module installation.
    pub path: PathBuf,
    /// Backend kind that can open this module (e.g. "onnx").
    pub runtime: String,
    /// Detector kind tag; `None` when the module ships no detector.
    pub detector_kind: Option<DetectorKind>,
    /// Kind of object the detector reports.
    pub object_kind: Option<ObjectKind>,
    /// Recognition kind tag ("ceu3", "cz", "adr", "vcl", ...).
    pub recognition_kind: String,
    /// Name of the input image type the module expects.
    pub input_image_type: String,
    /// Desired pixel aspect ratio of input images.
    pub pixel_aspect_ratio: f64,
    /// Supported license plate country codes, comma separated.
    pub countries: String,
    /// Detection labels the OCR sub-unit accepts.
    pub supported_labels: Vec<DetectionLabel>,
    /// Whether detections carry a cropped image and affine mapping.
    pub generate_crops: bool,
    /// Expected plate width range in pixels.
    pub plate_width: Range3<u32>,
    /// Expected plate height range in pixels.
    pub plate_height: Range3<u32>,
    /// Expected in-plane rotation range in degrees.
    pub plate_rotation: Range3<f64>,
    /// Capability bit-set derived from the tags above.
    pub flags: PropertyFlags,
    /// Default camera view parameters encoded in the manifest.
    pub default_view: CameraViewParams,
    /// License metadata read from the manifest.
    pub license: LicenseInfo,
    active: AtomicBool,
}

impl ModuleDescriptor {
    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Whether the module may still be loaded and run. Cleared when license
    /// validation fails or the execution quota runs out.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    pub(crate) fn deactivate(&self) {
        self.active.store(false, Ordering::Relaxed);
    }

    pub fn supports_label(&self, label: DetectionLabel) -> bool {
        self.supported_labels.contains(&label)
    }
}

/// Builder-side constructor used by manifest parsing.
#[allow(clippy::too_many_arguments)]
pub(crate) fn new_descriptor(
    id: i32,
    name: String,
    version: u32,
    subversion: u32,
    release_date: NaiveDate,
    path: PathBuf,
    runtime: String,
    detector_kind: Option<DetectorKind>,
    object_kind: Option<ObjectKind>,
    recognition_kind: String,
    input_image_type: String,
    pixel_aspect_ratio: f64,
    countries: String,
    supported_labels: Vec<DetectionLabel>,
    generate_crops: bool,
    plate_width: Range3<u32>,
    plate_height: Range3<u32>,
    plate_rotation: Range3<f64>,
    flags: PropertyFlags,
    default_view: CameraViewParams,
    license: LicenseInfo,
) -> ModuleDescriptor {
    let active = AtomicBool::new(license.is_valid);
    ModuleDescriptor {
        id,
        name,
        version,
        subversion,
        release_date,
        path,
        runtime,
        detector_kind,
        object_kind,
        recognition_kind,
        input_image_type,
        pixel_aspect_ratio,
        countries,
        supported_labels,
        generate_crops,
        plate_width,
        plate_height,
        plate_rotation,
        flags,
        default_view,
        license,
        active,
    }
}
