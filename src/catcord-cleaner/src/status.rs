//! Coarse storage health labels.

use std::fmt;

use serde::Serialize;

/// Below this percentage storage is healthy.
pub const HEALTHY_BELOW_PERCENT: f64 = 50.0;

/// Below this percentage storage is OK; above it, tight.
pub const OK_BELOW_PERCENT: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageStatus {
    Healthy,
    #[serde(rename = "OK")]
    Ok,
    Tight,
    Pressure,
    Critical,
}

/// Label a used-space percentage against the configured thresholds (also in
/// percent).
pub fn label(used_percent: f64, pressure_percent: f64, emergency_percent: f64) -> StorageStatus {
    if used_percent < HEALTHY_BELOW_PERCENT {
        StorageStatus::Healthy
    } else if used_percent < OK_BELOW_PERCENT {
        StorageStatus::Ok
    } else if used_percent < pressure_percent {
        StorageStatus::Tight
    } else if used_percent < emergency_percent {
        StorageStatus::Pressure
    } else {
        StorageStatus::Critical
    }
}

impl StorageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Ok => "OK",
            Self::Tight => "tight",
            Self::Pressure => "pressure",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for StorageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
