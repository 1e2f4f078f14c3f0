//! Retention policy: per-type age limits and disk-pressure thresholds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catcord_media::{ContentType, MediaFile};

use crate::{CleanerError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default retention for images, in days.
pub const DEFAULT_IMAGE_RETENTION_DAYS: u32 = 90;

/// Default retention for everything else, in days.
pub const DEFAULT_NON_IMAGE_RETENTION_DAYS: u32 = 30;

/// Default used-space ratio at which oldest-first eviction starts.
pub const DEFAULT_PRESSURE_THRESHOLD: f64 = 0.85;

/// Default used-space ratio at which eviction re-probes after every file.
pub const DEFAULT_EMERGENCY_THRESHOLD: f64 = 0.92;

// ============================================================================
// Policy
// ============================================================================

/// Immutable retention configuration.
///
/// Always satisfies `0 < pressure_threshold < emergency_threshold <= 1`;
/// both [`RetentionPolicy::new`] and deserialization reject anything else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolicyFields")]
pub struct RetentionPolicy {
    image_retention_days: u32,
    non_image_retention_days: u32,
    pressure_threshold: f64,
    emergency_threshold: f64,
}

impl RetentionPolicy {
    pub fn new(
        image_retention_days: u32,
        non_image_retention_days: u32,
        pressure_threshold: f64,
        emergency_threshold: f64,
    ) -> Result<Self> {
        if !(pressure_threshold > 0.0 && pressure_threshold <= 1.0) {
            return Err(CleanerError::InvalidPolicy(format!(
                "pressure_threshold must be in (0, 1], got {pressure_threshold}"
            )));
        }
        if !(emergency_threshold > 0.0 && emergency_threshold <= 1.0) {
            return Err(CleanerError::InvalidPolicy(format!(
                "emergency_threshold must be in (0, 1], got {emergency_threshold}"
            )));
        }
        if pressure_threshold >= emergency_threshold {
            return Err(CleanerError::InvalidPolicy(format!(
                "pressure_threshold ({pressure_threshold}) must be below emergency_threshold ({emergency_threshold})"
            )));
        }

        Ok(Self {
            image_retention_days,
            non_image_retention_days,
            pressure_threshold,
            emergency_threshold,
        })
    }

    pub fn image_retention_days(&self) -> u32 {
        self.image_retention_days
    }

    pub fn non_image_retention_days(&self) -> u32 {
        self.non_image_retention_days
    }

    pub fn pressure_threshold(&self) -> f64 {
        self.pressure_threshold
    }

    pub fn emergency_threshold(&self) -> f64 {
        self.emergency_threshold
    }

    /// Classify a file by extension/name.
    pub fn classify(&self, file: &MediaFile) -> ContentType {
        ContentType::from_path(&file.path)
    }

    /// Maximum age in days for a content type. Unknown content is kept as
    /// long as non-image content.
    pub fn threshold_days(&self, content_type: ContentType) -> u32 {
        match content_type {
            ContentType::Image => self.image_retention_days,
            ContentType::NonImage | ContentType::Unknown => self.non_image_retention_days,
        }
    }

    /// Whether `file` has outlived its retention period at `now`.
    pub fn is_expired(&self, file: &MediaFile, now: DateTime<Utc>) -> bool {
        file.age_days(now) > u64::from(self.threshold_days(self.classify(file)))
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            image_retention_days: DEFAULT_IMAGE_RETENTION_DAYS,
            non_image_retention_days: DEFAULT_NON_IMAGE_RETENTION_DAYS,
            pressure_threshold: DEFAULT_PRESSURE_THRESHOLD,
            emergency_threshold: DEFAULT_EMERGENCY_THRESHOLD,
        }
    }
}

/// Unvalidated wire form of [`RetentionPolicy`].
#[derive(Debug, Deserialize)]
struct PolicyFields {
    #[serde(default = "default_image_days")]
    image_retention_days: u32,
    #[serde(default = "default_non_image_days")]
    non_image_retention_days: u32,
    #[serde(default = "default_pressure")]
    pressure_threshold: f64,
    #[serde(default = "default_emergency")]
    emergency_threshold: f64,
}

fn default_image_days() -> u32 {
    DEFAULT_IMAGE_RETENTION_DAYS
}

fn default_non_image_days() -> u32 {
    DEFAULT_NON_IMAGE_RETENTION_DAYS
}

fn default_pressure() -> f64 {
    DEFAULT_PRESSURE_THRESHOLD
}

fn default_emergency() -> f64 {
    DEFAULT_EMERGENCY_THRESHOLD
}

impl TryFrom<PolicyFields> for RetentionPolicy {
    type Error = CleanerError;

    fn try_from(fields: PolicyFields) -> Result<Self> {
        Self::new(
            fields.image_retention_days,
            fields.non_image_retention_days,
            fields.pressure_threshold,
            fields.emergency_threshold,
        )
    }
}
