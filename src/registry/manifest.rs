//! Per-module manifest parsing
//!
//! Each module directory carries a `module.toml` manifest describing the
//! module identity, capabilities, defaults and license. The manifest is the
//! only file the core interprets; the sub-unit config files (`config.ini`,
//! `config-det.ini`) are opaque to it.

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{Error, ErrorCode, Result};
use crate::labels::{
    DetectionLabel, DetectorKind, ObjectKind, OcrRegion, PropertyFlags, RecognitionKind,
};
use crate::license::LicenseInfo;
use crate::registry::descriptor::{new_descriptor, ModuleDescriptor, Range3};
use crate::view::{CameraViewParams, ViewType};
use crate::MAX_STR_LEN;

/// Manifest file name expected inside every module directory.
pub const MANIFEST_FILENAME: &str = "module.toml";

#[derive(Debug, Deserialize)]
struct Manifest {
    module: ModuleSection,
    #[serde(default)]
    detector: Option<DetectorSection>,
    #[serde(default)]
    ocr: Option<OcrSection>,
    #[serde(default)]
    view: Option<ViewSection>,
    #[serde(default)]
    license: Option<LicenseSection>,
}

#[derive(Debug, Deserialize)]
struct ModuleSection {
    id: i32,
    name: String,
    version: u32,
    subversion: u32,
    release_date: String,
    runtime: String,
    #[serde(default = "default_image_type")]
    input_image_type: String,
    #[serde(default = "default_aspect_ratio")]
    pixel_aspect_ratio: f64,
}

fn default_image_type() -> String {
    "gray8".to_string()
}

fn default_aspect_ratio() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
struct DetectorSection {
    kind: String,
    object: String,
    #[serde(default)]
    generate_crops: bool,
    #[serde(default = "default_width_range")]
    plate_width: [u32; 3],
    #[serde(default = "default_height_range")]
    plate_height: [u32; 3],
    #[serde(default = "default_rotation_range")]
    plate_rotation: [f64; 3],
}

fn default_width_range() -> [u32; 3] {
    [40, 100, 200]
}

fn default_height_range() -> [u32; 3] {
    [10, 22, 45]
}

fn default_rotation_range() -> [f64; 3] {
    [-15.0, 0.0, 15.0]
}

#[derive(Debug, Deserialize)]
struct OcrSection {
    #[serde(default)]
    regions: Vec<String>,
    #[serde(default)]
    recognition: String,
    #[serde(default)]
    countries: String,
    #[serde(default)]
    labels: Vec<i32>,
}

#[derive(Debug, Deserialize)]
struct ViewSection {
    #[serde(default)]
    view_type: i32,
    min_horizontal_resolution: u32,
    max_horizontal_resolution: u32,
    #[serde(default = "default_density_ratio")]
    density_ratio: f32,
}

fn default_density_ratio() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
struct LicenseSection {
    #[serde(default = "default_true")]
    valid: bool,
    #[serde(default)]
    expires: Option<String>,
    #[serde(default)]
    executions_left: Option<u64>,
}

fn default_true() -> bool {
    true
}

/// Read and validate the manifest of the module installed at `module_dir`.
pub fn read_manifest(module_dir: &Path) -> Result<ModuleDescriptor> {
    let manifest_path = module_dir.join(MANIFEST_FILENAME);
    let content = std::fs::read_to_string(&manifest_path).map_err(|err| {
        Error::new(
            ErrorCode::ModuleLoadFailed,
            format!("cannot read manifest {}: {err}", manifest_path.display()),
        )
    })?;

    let manifest: Manifest = toml::from_str(&content).map_err(|err| {
        Error::new(
            ErrorCode::ModuleLoadFailed,
            format!("malformed manifest {}: {err}", manifest_path.display()),
        )
    })?;

    build_descriptor(manifest, module_dir)
}

fn build_descriptor(manifest: Manifest, module_dir: &Path) -> Result<ModuleDescriptor> {
    let malformed = |detail: String| {
        Error::new(
            ErrorCode::ModuleLoadFailed,
            format!("manifest in {}: {detail}", module_dir.display()),
        )
    };

    let m = &manifest.module;
    if m.name.is_empty() || m.name.len() > MAX_STR_LEN {
        return Err(malformed(format!(
            "module name must be 1..={MAX_STR_LEN} bytes"
        )));
    }
    if m.runtime.is_empty() {
        return Err(malformed("missing runtime kind".to_string()));
    }

    let release_date = NaiveDate::parse_from_str(&m.release_date, "%Y-%m-%d")
        .map_err(|_| malformed(format!("bad release_date '{}'", m.release_date)))?;

    let mut flags = PropertyFlags::empty();

    let (detector_kind, object_kind, generate_crops, plate_width, plate_height, plate_rotation) =
        match &manifest.detector {
            Some(det) => {
                let kind = DetectorKind::from_tag(&det.kind)
                    .ok_or_else(|| malformed(format!("unknown detector kind '{}'", det.kind)))?;
                let object = ObjectKind::from_tag(&det.object)
                    .ok_or_else(|| malformed(format!("unknown object kind '{}'", det.object)))?;
                flags = flags.with_detector(kind).with_object(object);
                (
                    Some(kind),
                    Some(object),
                    det.generate_crops,
                    Range3::new(det.plate_width[0], det.plate_width[1], det.plate_width[2]),
                    Range3::new(det.plate_height[0], det.plate_height[1], det.plate_height[2]),
                    Range3::new(
                        det.plate_rotation[0],
                        det.plate_rotation[1],
                        det.plate_rotation[2],
                    ),
                )
            }
            None => (
                None,
                None,
                false,
                Range3::new(
                    default_width_range()[0],
                    default_width_range()[1],
                    default_width_range()[2],
                ),
                Range3::new(
                    default_height_range()[0],
                    default_height_range()[1],
                    default_height_range()[2],
                ),
                Range3::new(
                    default_rotation_range()[0],
                    default_rotation_range()[1],
                    default_rotation_range()[2],
                ),
            ),
        };

    let mut recognition_kind = String::new();
    let mut countries = String::new();
    let mut supported_labels = Vec::new();

    if let Some(ocr) = &manifest.ocr {
        for tag in &ocr.regions {
            let region = OcrRegion::from_tag(tag)
                .ok_or_else(|| malformed(format!("unknown OCR region '{tag}'")))?;
            flags = flags.with_ocr_region(region);
        }
        if let Some(rcg) = RecognitionKind::from_tag(&ocr.recognition) {
            flags = flags.with_recognition(rcg);
        }
        recognition_kind = ocr.recognition.clone();
        countries = ocr.countries.clone();
        for code in &ocr.labels {
            let label = DetectionLabel::from_code(*code)
                .ok_or_else(|| malformed(format!("unknown detection label code {code}")))?;
            supported_labels.push(label);
        }
    }

    let default_view = match &manifest.view {
        Some(view) => CameraViewParams {
            view_type: ViewType::from_code(view.view_type)
                .ok_or_else(|| malformed(format!("bad view_type {}", view.view_type)))?,
            min_horizontal_resolution: view.min_horizontal_resolution,
            max_horizontal_resolution: view.max_horizontal_resolution,
            density_ratio: view.density_ratio,
        },
        None => CameraViewParams::default(),
    };

    let license = match &manifest.license {
        Some(section) => {
            let expiration_date = section
                .expires
                .as_deref()
                .map(|text| {
                    NaiveDate::parse_from_str(text, "%Y-%m-%d")
                        .map_err(|_| malformed(format!("bad license expiry '{text}'")))
                })
                .transpose()?;
            LicenseInfo {
                is_valid: section.valid,
                expiration_date,
                executions_left: section.executions_left,
            }
        }
        None => LicenseInfo::perpetual(),
    };

    Ok(new_descriptor(
        m.id,
        m.name.clone(),
        m.version,
        m.subversion,
        release_date,
        module_dir.to_path_buf(),
        m.runtime.clone(),
        detector_kind,
        object_kind,
        recognition_kind,
        m.input_image_type.clone(),
        m.pixel_aspect_ratio,
        countries,
        supported_labels,
        generate_crops,
        plate_width,
        plate_height,
        plate_rotation,
        flags,
        default_view,
        license,
    ))
}
