//! Outcome of one retention/eviction cycle.

use serde::Serialize;

use catcord_media::{ContentType, MediaFile};

use crate::disk::DiskSnapshot;
use crate::engine::EvictionMode;
use crate::payload::RunPayload;

/// Result of trying to delete one candidate.
#[derive(Debug, Clone)]
pub struct DeletionOutcome {
    pub file: MediaFile,
    pub succeeded: bool,
    pub failure_reason: Option<String>,
}

impl DeletionOutcome {
    pub fn deleted(file: MediaFile) -> Self {
        Self {
            file,
            succeeded: true,
            failure_reason: None,
        }
    }

    pub fn failed(file: MediaFile, reason: impl Into<String>) -> Self {
        Self {
            file,
            succeeded: false,
            failure_reason: Some(reason.into()),
        }
    }
}

/// Successful deletions tallied by content class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeletedByType {
    pub images: usize,
    pub non_images: usize,
}

impl DeletedByType {
    /// Count one deletion. Unknown content counts as non-image.
    pub fn record(&mut self, content_type: ContentType) {
        if content_type.is_image() {
            self.images += 1;
        } else {
            self.non_images += 1;
        }
    }
}

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Completion {
    /// Every planned candidate was handled or the stop condition was met.
    Completed,
    /// Stopped early through a [`crate::CancelFlag`].
    Cancelled,
    /// Stopped early because disk usage could no longer be measured.
    Interrupted,
}

/// Everything one cycle did, produced once and handed to the reporter.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub run_id: String,
    pub server_label: String,
    pub mode: EvictionMode,
    pub completion: Completion,
    pub disk_before: DiskSnapshot,
    pub disk_after: DiskSnapshot,
    pub pressure_threshold: f64,
    pub emergency_threshold: f64,
    /// Files selected for evaluation before any stop condition applied.
    pub candidates_count: usize,
    pub total_files_count: usize,
    pub deleted_count: usize,
    /// Sum of the sizes of deleted files; not derived from disk usage.
    pub freed_bytes: u64,
    pub deleted_by_type: DeletedByType,
    pub duration_seconds: f64,
    /// Every attempted deletion, in order.
    pub outcomes: Vec<DeletionOutcome>,
}

impl RunResult {
    pub fn is_complete(&self) -> bool {
        self.completion == Completion::Completed
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeletionOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded)
    }

    /// The reporter-facing JSON payload.
    pub fn to_payload(&self) -> RunPayload {
        RunPayload::from(self)
    }
}

/// Running totals for the deletion phase.
#[derive(Debug, Default)]
pub(crate) struct DeletionTally {
    pub outcomes: Vec<DeletionOutcome>,
    pub deleted_count: usize,
    pub freed_bytes: u64,
    pub deleted_by_type: DeletedByType,
}

impl DeletionTally {
    pub fn record(&mut self, outcome: DeletionOutcome) {
        if outcome.succeeded {
            self.deleted_count += 1;
            self.freed_bytes += outcome.file.size_bytes;
            self.deleted_by_type.record(outcome.file.content_type);
        }
        self.outcomes.push(outcome);
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }
}
