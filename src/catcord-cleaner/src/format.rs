//! Plain-text renderings of a run payload.
//!
//! Deterministic fallbacks for when no summary renderer is configured or the
//! renderer declines. They only restate numbers already in the payload.

use std::fmt::Write;

use crate::payload::RunPayload;
use crate::status;

/// Multi-line `key: value` block describing any run.
pub fn format_retention_stats(payload: &RunPayload) -> String {
    let disk = &payload.disk;
    let actions = &payload.actions;
    let storage_status = status::label(
        disk.percent_before,
        disk.pressure_threshold,
        disk.emergency_threshold,
    );

    let mut out = String::new();
    let _ = writeln!(out, "mode: {}", payload.mode);
    let _ = writeln!(out, "server: {}", payload.server);
    let _ = writeln!(out, "run_id: {}", payload.run_id);
    let _ = writeln!(out, "disk_percent_before: {:.1}%", disk.percent_before);
    let _ = writeln!(out, "disk_percent_after: {:.1}%", disk.percent_after);
    let _ = writeln!(out, "pressure_threshold: {:.1}%", disk.pressure_threshold);
    let _ = writeln!(out, "emergency_threshold: {:.1}%", disk.emergency_threshold);
    let _ = writeln!(out, "storage_status: {storage_status}");
    let _ = writeln!(out, "candidates_count: {}", payload.candidates_count);
    let _ = writeln!(out, "deleted_count: {}", actions.deleted_count);
    let _ = writeln!(out, "deleted_images: {}", actions.deleted_by_type.images);
    let _ = writeln!(out, "deleted_non_images: {}", actions.deleted_by_type.non_images);
    let _ = writeln!(out, "freed_gb: {:.2}", actions.freed_gb);
    let _ = writeln!(out, "total_files_on_disk: {}", payload.total_files_count);
    let _ = write!(out, "duration_seconds: {}", payload.timing.duration_seconds);
    out
}

/// One-line disk pressure update.
pub fn format_pressure_stats(payload: &RunPayload) -> String {
    let disk = &payload.disk;
    let actions = &payload.actions;

    let deleted = if actions.deleted_count == 0 {
        "No deletions".to_string()
    } else {
        format!(
            "Deleted: {} (images {}, non-images {})",
            actions.deleted_count,
            actions.deleted_by_type.images,
            actions.deleted_by_type.non_images
        )
    };

    format!(
        "Disk usage: {:.1}%→{:.1}% (threshold {:.1}%). {}. Freed: {:.2} GB. Took {}s.",
        disk.percent_before,
        disk.percent_after,
        disk.pressure_threshold,
        deleted,
        actions.freed_gb,
        payload.timing.duration_seconds
    )
}

/// The fallback that fits the run's mode.
pub fn format_stats(payload: &RunPayload) -> String {
    if payload.mode.is_pressure_driven() {
        format_pressure_stats(payload)
    } else {
        format_retention_stats(payload)
    }
}
