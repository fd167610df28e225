use dora_shared::errors::ErrorCode;

use crate::models::Severity;
use crate::services::alert_service::AlertItem;

/// Upper bound (exclusive) for the optional coverage attribute.
pub const COVERAGE_MAX: i32 = 10_000;

/// Why an alert item was rejected before storage.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AlertValidationError {
    #[error("Invalid severity, must be one of: low, medium, high, critical")]
    InvalidSeverity,

    #[error("Invalid coverage {0}, must be in range [0, 10000)")]
    InvalidCoverage(i32),

    #[error("No locations provided. Must provide at least one of: cities, countries, states, pincodes")]
    NoTargetsSpecified,
}

impl AlertValidationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidSeverity => ErrorCode::InvalidSeverity,
            Self::InvalidCoverage(_) => ErrorCode::InvalidCoverage,
            Self::NoTargetsSpecified => ErrorCode::NoTargetsSpecified,
        }
    }
}

/// Check a single alert item. Pure, no I/O.
///
/// Returns the parsed severity so callers store the canonical lowercase
/// form rather than whatever casing the request carried.
pub fn validate(item: &AlertItem) -> Result<Severity, AlertValidationError> {
    let severity: Severity = item
        .severity
        .parse()
        .map_err(|_| AlertValidationError::InvalidSeverity)?;

    if let Some(coverage) = item.coverage {
        if !(0..COVERAGE_MAX).contains(&coverage) {
            return Err(AlertValidationError::InvalidCoverage(coverage));
        }
    }

    if !item.inform_all && !item.has_targets() {
        return Err(AlertValidationError::NoTargetsSpecified);
    }

    Ok(severity)
}
