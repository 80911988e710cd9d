//! Camera view calibration persistence
//!
//! View parameters describe the geometry of the incoming video feed. They
//! are persisted as a plain-text key=value file so installations can be
//! tuned without rebuilding anything. Unknown keys are ignored; missing
//! keys fall back to the defaults.

use std::fmt::Write as _;
use std::path::Path;

use tracing::warn;

use crate::error::{Error, ErrorCode, Result};

/// Camera mounting geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ViewType {
    /// Frontal images of cars (e.g. overhead gantry installation).
    #[default]
    Frontal = 0,
    /// Generic images of cars (e.g. camera in a moving vehicle).
    Generic = 1,
}

impl ViewType {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ViewType::Frontal),
            1 => Some(ViewType::Generic),
            _ => None,
        }
    }
}

/// Camera view calibration record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraViewParams {
    /// Mounting geometry of the camera.
    pub view_type: ViewType,
    /// Minimal horizontal resolution in pixels per meter.
    pub min_horizontal_resolution: u32,
    /// Maximal horizontal resolution in pixels per meter.
    pub max_horizontal_resolution: u32,
    /// Vertical over horizontal pixel density; 1.0 for square pixels.
    pub density_ratio: f32,
}

impl Default for CameraViewParams {
    fn default() -> Self {
        Self {
            view_type: ViewType::Frontal,
            min_horizontal_resolution: 115,
            max_horizontal_resolution: 260,
            density_ratio: 1.0,
        }
    }
}

/// Load camera view parameters from a key=value file.
///
/// `None` yields the defaults without touching the filesystem.
pub fn load_view_config(path: Option<&Path>) -> Result<CameraViewParams> {
    let Some(path) = path else {
        return Ok(CameraViewParams::default());
    };

    let content = std::fs::read_to_string(path).map_err(|err| {
        Error::new(
            ErrorCode::IoError,
            format!("cannot read view config {}: {err}", path.display()),
        )
    })?;

    parse_view_config(&content, path)
}

/// Write camera view parameters, creating or overwriting the file.
pub fn write_view_config(path: &Path, params: &CameraViewParams) -> Result<()> {
    let mut content = String::new();
    let _ = writeln!(content, "view_type={}", params.view_type.code());
    let _ = writeln!(
        content,
        "min_horizontal_resolution={}",
        params.min_horizontal_resolution
    );
    let _ = writeln!(
        content,
        "max_horizontal_resolution={}",
        params.max_horizontal_resolution
    );
    let _ = writeln!(content, "density_ratio={}", params.density_ratio);

    std::fs::write(path, content).map_err(|err| {
        Error::new(
            ErrorCode::IoError,
            format!("cannot write view config {}: {err}", path.display()),
        )
    })
}

fn parse_view_config(content: &str, path: &Path) -> Result<CameraViewParams> {
    let mut params = CameraViewParams::default();

    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(Error::new(
                ErrorCode::IoError,
                format!(
                    "malformed view config {} line {}: expected key=value",
                    path.display(),
                    lineno + 1
                ),
            ));
        };
        let (key, value) = (key.trim(), value.trim());

        let malformed = |what: &str| {
            Error::new(
                ErrorCode::IoError,
                format!(
                    "malformed view config {} line {}: bad {what} value '{value}'",
                    path.display(),
                    lineno + 1
                ),
            )
        };

        match key {
            "view_type" => {
                let code: i32 = value.parse().map_err(|_| malformed("view_type"))?;
                params.view_type =
                    ViewType::from_code(code).ok_or_else(|| malformed("view_type"))?;
            }
            "min_horizontal_resolution" => {
                params.min_horizontal_resolution =
                    value.parse().map_err(|_| malformed("resolution"))?;
            }
            "max_horizontal_resolution" => {
                params.max_horizontal_resolution =
                    value.parse().map_err(|_| malformed("resolution"))?;
            }
            "density_ratio" => {
                params.density_ratio = value.parse().map_err(|_| malformed("density_ratio"))?;
            }
            other => {
                warn!("Ignoring unknown view config key '{other}' in {}", path.display());
            }
        }
    }

    Ok(params)
}
