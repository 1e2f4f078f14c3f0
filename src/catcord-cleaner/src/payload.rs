//! JSON payload handed to the external summary reporter.
//!
//! The shape is fixed:
//!
//! ```json
//! {
//!   "mode": "retention",
//!   "server": "catcord",
//!   "run_id": "2024-01-01T01:00:00Z-retention",
//!   "disk": {"percent_before": 45.2, "percent_after": 45.2,
//!            "pressure_threshold": 85.0, "emergency_threshold": 92.0},
//!   "actions": {"deleted_count": 10, "freed_gb": 1.5,
//!               "deleted_by_type": {"images": 3, "non_images": 7}},
//!   "candidates_count": 50,
//!   "total_files_count": 1000,
//!   "timing": {"duration_seconds": 5.0}
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::engine::EvictionMode;
use crate::result::{DeletedByType, RunResult};
use crate::Result;

/// Bytes per reported gigabyte (decimal).
pub const BYTES_PER_GB: f64 = 1_000_000_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunPayload {
    pub mode: EvictionMode,
    pub server: String,
    pub run_id: String,
    pub disk: DiskPayload,
    pub actions: ActionsPayload,
    pub candidates_count: usize,
    pub total_files_count: usize,
    pub timing: TimingPayload,
}

/// Disk usage and thresholds, all in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskPayload {
    pub percent_before: f64,
    pub percent_after: f64,
    pub pressure_threshold: f64,
    pub emergency_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionsPayload {
    pub deleted_count: usize,
    pub freed_gb: f64,
    pub deleted_by_type: TypeCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCounts {
    pub images: usize,
    pub non_images: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingPayload {
    pub duration_seconds: f64,
}

impl RunPayload {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<&RunResult> for RunPayload {
    fn from(result: &RunResult) -> Self {
        Self {
            mode: result.mode,
            server: result.server_label.clone(),
            run_id: result.run_id.clone(),
            disk: DiskPayload {
                percent_before: ratio_to_percent(result.disk_before.used_ratio),
                percent_after: ratio_to_percent(result.disk_after.used_ratio),
                pressure_threshold: ratio_to_percent(result.pressure_threshold),
                emergency_threshold: ratio_to_percent(result.emergency_threshold),
            },
            actions: ActionsPayload {
                deleted_count: result.deleted_count,
                freed_gb: bytes_to_gb(result.freed_bytes),
                deleted_by_type: result.deleted_by_type.into(),
            },
            candidates_count: result.candidates_count,
            total_files_count: result.total_files_count,
            timing: TimingPayload {
                duration_seconds: round_to(result.duration_seconds, 2),
            },
        }
    }
}

impl From<DeletedByType> for TypeCounts {
    fn from(counts: DeletedByType) -> Self {
        Self {
            images: counts.images,
            non_images: counts.non_images,
        }
    }
}

/// Ratio in `[0, 1]` to a percentage truncated to one decimal.
///
/// Truncation keeps a ratio just below a threshold from reporting at it.
pub fn ratio_to_percent(ratio: f64) -> f64 {
    // Absorbs representation error such as 0.85 * 1000 = 849.999...
    ((ratio * 1000.0) + 1e-6).floor() / 10.0
}

/// Bytes to decimal gigabytes with two decimals.
pub fn bytes_to_gb(bytes: u64) -> f64 {
    round_to(bytes as f64 / BYTES_PER_GB, 2)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
