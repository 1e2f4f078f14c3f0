//! Retention/eviction cycles over a media root.
//!
//! A cycle:
//! 1. Measures disk usage and picks an [`EvictionMode`]
//! 2. Scans the media root and plans candidates for that mode
//! 3. Deletes candidates in order, re-probing disk usage under pressure;
//!    past the target only expired media is still deleted
//! 4. Measures disk usage again and returns a [`RunResult`]
//!
//! Cycles on the same root are serialized with a [`CycleLock`]; a second
//! cycle fails fast with [`crate::CleanerError::CycleInProgress`].

mod mode;

pub use mode::{EvictionMode, EvictionPlan, EMERGENCY_REPROBE_BATCH, PRESSURE_REPROBE_BATCH};

use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

use chrono::SecondsFormat;
use tracing::{debug, info, warn};

use catcord_media::{walk, MediaFile};

use crate::cancel::CancelFlag;
use crate::clock::{Clock, SystemClock};
use crate::config::CleanerConfig;
use crate::disk::{probe_path, DiskProbe, DiskSnapshot, StatvfsProbe};
use crate::lock::CycleLock;
use crate::policy::RetentionPolicy;
use crate::result::{Completion, DeletionOutcome, DeletionTally, RunResult};
use crate::Result;

/// Label used when none is configured.
pub const DEFAULT_SERVER_LABEL: &str = "catcord";

/// Runs retention/eviction cycles with a fixed policy.
pub struct EvictionEngine<P = StatvfsProbe, C = SystemClock> {
    policy: RetentionPolicy,
    probe: P,
    clock: C,
    server_label: String,
}

impl EvictionEngine {
    /// Engine probing the real disk with wall-clock time.
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            policy,
            probe: StatvfsProbe,
            clock: SystemClock,
            server_label: DEFAULT_SERVER_LABEL.to_string(),
        }
    }

    pub fn from_config(config: &CleanerConfig) -> Self {
        Self::new(config.policy).with_server_label(config.server_label.clone())
    }
}

impl<P: DiskProbe, C: Clock> EvictionEngine<P, C> {
    pub fn with_probe<Q: DiskProbe>(self, probe: Q) -> EvictionEngine<Q, C> {
        EvictionEngine {
            policy: self.policy,
            probe,
            clock: self.clock,
            server_label: self.server_label,
        }
    }

    pub fn with_clock<D: Clock>(self, clock: D) -> EvictionEngine<P, D> {
        EvictionEngine {
            policy: self.policy,
            probe: self.probe,
            clock,
            server_label: self.server_label,
        }
    }

    pub fn with_server_label(mut self, label: impl Into<String>) -> Self {
        self.server_label = label.into();
        self
    }

    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Run one cycle against `root`.
    ///
    /// Fails only when the initial disk probe or the scan of the root cannot
    /// be performed, or when another cycle holds the root. Individual deletion
    /// failures are recorded in the result.
    pub fn run_cycle(&self, root: &Path) -> Result<RunResult> {
        self.run_cycle_with_cancel(root, &CancelFlag::new())
    }

    /// Run one cycle, checking `cancel` between deletions.
    ///
    /// A cancelled cycle still returns the work done so far, tagged
    /// [`Completion::Cancelled`].
    pub fn run_cycle_with_cancel(&self, root: &Path, cancel: &CancelFlag) -> Result<RunResult> {
        let start = Instant::now();

        // A missing root has nothing to delete, so there is nothing to guard.
        let _lock = if root.exists() {
            Some(CycleLock::acquire(root)?)
        } else {
            None
        };

        let probe_at = probe_path(root);
        let disk_before = self.snapshot(&probe_at)?;
        let mode = EvictionMode::for_usage(disk_before.used_ratio, &self.policy);
        let run_id = format!(
            "{}-{}",
            disk_before.taken_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            mode
        );

        info!(
            root = %root.display(),
            run_id = %run_id,
            mode = %mode,
            used_percent = disk_before.used_percent(),
            "Starting cleaner cycle"
        );

        let plan = mode.plan(walk(root), &self.policy, disk_before.taken_at)?;
        let total_files_count = plan.scanned;
        let candidates_count = plan.candidates.len();

        debug!(
            total_files_count,
            candidates_count,
            stop_below = ?plan.stop_below,
            "Planned eviction"
        );

        let mut tally = DeletionTally::default();
        let mut completion = Completion::Completed;
        let mut last = disk_before;

        // Below target, expired files are still deleted; nothing else is.
        let mut target_reached = false;
        for file in plan.candidates.iter() {
            if cancel.is_cancelled() {
                info!(attempted = tally.attempted(), "Cleaner cycle cancelled");
                completion = Completion::Cancelled;
                break;
            }
            if !target_reached && plan.satisfied_by(last.used_ratio) {
                debug!(used_ratio = last.used_ratio, "Disk usage below target, deleting only expired media");
                target_reached = true;
            }
            if target_reached && !plan.is_expired(file) {
                continue;
            }

            tally.record(delete_file(file));

            if !target_reached && plan.reprobe_due(tally.attempted()) {
                match self.snapshot(&probe_at) {
                    Ok(snapshot) => last = snapshot,
                    Err(e) => {
                        warn!(error = %e, "Disk re-probe failed, stopping deletions");
                        completion = Completion::Interrupted;
                        break;
                    }
                }
            }
        }

        let disk_after = self.snapshot(&probe_at).unwrap_or_else(|e| {
            warn!(error = %e, "Final disk probe failed, reusing last measurement");
            last
        });

        let result = RunResult {
            run_id,
            server_label: self.server_label.clone(),
            mode,
            completion,
            disk_before,
            disk_after,
            pressure_threshold: self.policy.pressure_threshold(),
            emergency_threshold: self.policy.emergency_threshold(),
            candidates_count,
            total_files_count,
            deleted_count: tally.deleted_count,
            freed_bytes: tally.freed_bytes,
            deleted_by_type: tally.deleted_by_type,
            duration_seconds: start.elapsed().as_secs_f64(),
            outcomes: tally.outcomes,
        };

        info!(
            run_id = %result.run_id,
            mode = %result.mode,
            completion = ?result.completion,
            deleted = result.deleted_count,
            failed = result.failed_count(),
            freed_bytes = result.freed_bytes,
            used_percent_after = result.disk_after.used_percent(),
            "Cleaner cycle completed"
        );

        Ok(result)
    }

    fn snapshot(&self, path: &Path) -> Result<DiskSnapshot> {
        let used_ratio = self.probe.used_ratio(path)?;
        Ok(DiskSnapshot {
            used_ratio,
            taken_at: self.clock.now(),
        })
    }
}

fn delete_file(file: &MediaFile) -> DeletionOutcome {
    match fs::remove_file(&file.path) {
        Ok(()) => {
            debug!(
                path = %file.path.display(),
                size_bytes = file.size_bytes,
                content_type = %file.content_type,
                "Deleted media file"
            );
            DeletionOutcome::deleted(file.clone())
        }
        Err(e) => {
            let reason = match e.kind() {
                io::ErrorKind::NotFound => "already removed".to_string(),
                io::ErrorKind::PermissionDenied => "permission denied".to_string(),
                _ => e.to_string(),
            };
            warn!(path = %file.path.display(), error = %e, "Failed to delete media file");
            DeletionOutcome::failed(file.clone(), reason)
        }
    }
}

/// One cycle on the real disk with the given policy and clock.
pub fn run_cycle<C: Clock>(root: &Path, policy: RetentionPolicy, clock: C) -> Result<RunResult> {
    EvictionEngine::new(policy).with_clock(clock).run_cycle(root)
}
