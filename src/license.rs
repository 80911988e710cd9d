//! Module license metadata and validation
//!
//! Every discovered module carries license metadata. Validation happens at
//! load time; the execution counter, when enabled, is debited once per
//! successful detection call. The counter itself is persisted by the module;
//! the core only mirrors the remaining count and drives the decrement.

use chrono::NaiveDate;

use crate::error::{Error, ErrorCode, Result};

/// License metadata attached to a module descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseInfo {
    /// Whether the license itself is valid.
    pub is_valid: bool,
    /// Expiration date; `None` means perpetual.
    pub expiration_date: Option<NaiveDate>,
    /// Remaining executions; `None` means execution-unlimited.
    pub executions_left: Option<u64>,
}

impl LicenseInfo {
    /// A perpetual, uncounted, valid license.
    pub fn perpetual() -> Self {
        Self {
            is_valid: true,
            expiration_date: None,
            executions_left: None,
        }
    }

    /// True when the execution counter is enabled.
    pub fn is_using_counter(&self) -> bool {
        self.executions_left.is_some()
    }

    /// Validate the license against the given date. Used at module load.
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        if !self.is_valid {
            return Err(Error::new(ErrorCode::LicenseInvalid, "module license is invalid"));
        }
        if let Some(expiry) = self.expiration_date {
            if today > expiry {
                return Err(Error::new(
                    ErrorCode::LicenseExpired,
                    format!("module license expired on {expiry}"),
                ));
            }
        }
        Ok(())
    }

    /// Validate against the current wall-clock date.
    pub fn validate_now(&self) -> Result<()> {
        self.validate(chrono::Local::now().date_naive())
    }
}
