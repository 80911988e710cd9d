//! Error taxonomy and the engine-scoped last-error register
//!
//! Every failure carries a stable integer code from [`ErrorCode`]; the codes
//! are part of the external ABI and must never be renumbered. The register
//! has read-and-clear semantics: reading it returns the most recent failure
//! code and resets it to `Success`.

use parking_lot::Mutex;

/// Stable integer error codes surfaced to SDK consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    /// No error.
    Success = 0,
    /// Null/empty where a value is required, or an out-of-range index.
    BadArgument = 1,
    /// Operation on a torn-down engine.
    NotInitialized = 2,
    /// Module base directory does not exist.
    DirectoryNotFound = 3,
    /// Module base directory contains no usable modules.
    DirectoryEmpty = 4,
    /// Module lookup miss (id/version or name).
    ModuleNotFound = 5,
    /// Bad manifest, missing artifact, or backend refused to open.
    ModuleLoadFailed = 6,
    /// Module license is not valid.
    LicenseInvalid = 7,
    /// Module license has expired.
    LicenseExpired = 8,
    /// Execution counter reached zero.
    QuotaExhausted = 9,
    /// Dispatch against an unloaded module index.
    ModuleNotLoaded = 10,
    /// Detector or OCR sub-unit disabled by configuration.
    SubUnitDisabled = 11,
    /// OCR called with a label the module does not support.
    LabelNotSupported = 12,
    /// File read/write failure.
    IoError = 13,
    /// Module-reported failure.
    InternalError = 14,
}

impl ErrorCode {
    /// Numeric code as returned over the binary interface.
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// SDK error: a stable code plus a human-readable message.
#[derive(Debug, thiserror::Error)]
#[error("{message} (code {})", code.code())]
pub struct Error {
    code: ErrorCode,
    message: String,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorCode::IoError, err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Last-error register with read-and-clear semantics.
///
/// One register lives inside each [`crate::Engine`]; separate engines never
/// observe each other's failures. Successful operations leave the stored
/// value untouched.
#[derive(Debug, Default)]
pub struct ErrorChannel {
    last: Mutex<Option<ErrorCode>>,
}

impl ErrorChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure code. Called by every failing engine operation.
    pub fn record(&self, code: ErrorCode) {
        *self.last.lock() = Some(code);
    }

    /// Return the most recent failure and reset the register to `Success`.
    pub fn take(&self) -> ErrorCode {
        self.last.lock().take().unwrap_or(ErrorCode::Success)
    }
}
