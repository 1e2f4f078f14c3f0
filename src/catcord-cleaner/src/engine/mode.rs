//! Eviction modes and their candidate-selection strategies.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catcord_media::MediaFile;

use crate::policy::RetentionPolicy;

/// Deletions between disk re-probes while under pressure.
pub const PRESSURE_REPROBE_BATCH: usize = 5;

/// Deletions between disk re-probes in an emergency.
pub const EMERGENCY_REPROBE_BATCH: usize = 1;

/// How aggressively a cycle evicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionMode {
    /// Delete only files past their per-type retention period.
    Retention,
    /// Delete oldest-first until usage drops below the pressure threshold.
    Pressure,
    /// Like pressure, re-probing after every deletion.
    Emergency,
}

/// Ordered candidates plus the rules for working through them.
#[derive(Debug)]
pub struct EvictionPlan {
    pub mode: EvictionMode,
    pub candidates: Vec<MediaFile>,
    /// Files seen by the scan, candidates or not.
    pub scanned: usize,
    /// Stop once the used ratio drops below this.
    pub stop_below: Option<f64>,
    /// Re-probe disk usage after this many deletion attempts.
    pub reprobe_every: Option<usize>,
    policy: RetentionPolicy,
    now: DateTime<Utc>,
}

impl EvictionMode {
    /// Pick the mode for the current used-space ratio.
    pub fn for_usage(used_ratio: f64, policy: &RetentionPolicy) -> Self {
        if used_ratio >= policy.emergency_threshold() {
            Self::Emergency
        } else if used_ratio >= policy.pressure_threshold() {
            Self::Pressure
        } else {
            Self::Retention
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retention => "retention",
            Self::Pressure => "pressure",
            Self::Emergency => "emergency",
        }
    }

    pub fn is_pressure_driven(&self) -> bool {
        !matches!(self, Self::Retention)
    }

    /// Select and order candidates from a scan of the media root.
    ///
    /// Retention filters the scan as it streams; the pressure-driven modes
    /// need every file in hand to order them by age.
    pub fn plan<I>(
        self,
        files: I,
        policy: &RetentionPolicy,
        now: DateTime<Utc>,
    ) -> catcord_media::Result<EvictionPlan>
    where
        I: IntoIterator<Item = catcord_media::Result<MediaFile>>,
    {
        let mut scanned = 0;
        let (candidates, stop_below, reprobe_every) = match self {
            Self::Retention => {
                let mut expired = Vec::new();
                for file in files {
                    let file = file?;
                    scanned += 1;
                    if policy.is_expired(&file, now) {
                        expired.push(file);
                    }
                }
                (by_path(expired), None, None)
            }
            // Emergency also stops below the pressure threshold, not its own.
            Self::Pressure | Self::Emergency => {
                let all = files.into_iter().collect::<catcord_media::Result<Vec<_>>>()?;
                scanned = all.len();
                let every = match self {
                    Self::Emergency => EMERGENCY_REPROBE_BATCH,
                    _ => PRESSURE_REPROBE_BATCH,
                };
                (
                    oldest_first(all),
                    Some(policy.pressure_threshold()),
                    Some(every),
                )
            }
        };

        Ok(EvictionPlan {
            mode: self,
            candidates,
            scanned,
            stop_below,
            reprobe_every,
            policy: *policy,
            now,
        })
    }
}

impl fmt::Display for EvictionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EvictionPlan {
    /// Whether `attempted` deletions complete a re-probe batch.
    pub fn reprobe_due(&self, attempted: usize) -> bool {
        self.reprobe_every
            .is_some_and(|every| attempted > 0 && attempted % every == 0)
    }

    /// Whether a measured ratio satisfies the stop condition.
    pub fn satisfied_by(&self, used_ratio: f64) -> bool {
        self.stop_below.is_some_and(|limit| used_ratio < limit)
    }

    /// Whether `file` is past retention. Expired files are deleted even after
    /// the stop condition is met.
    pub fn is_expired(&self, file: &MediaFile) -> bool {
        self.policy.is_expired(file, self.now)
    }
}

fn by_path(mut files: Vec<MediaFile>) -> Vec<MediaFile> {
    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}

fn oldest_first(mut files: Vec<MediaFile>) -> Vec<MediaFile> {
    files.sort_by(|a, b| {
        a.modified_at
            .cmp(&b.modified_at)
            .then_with(|| a.path.cmp(&b.path))
    });
    files
}
