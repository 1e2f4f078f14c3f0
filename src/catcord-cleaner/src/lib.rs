//! Retention and disk-pressure eviction for the Catcord media store.
//!
//! Keeps the media store's filesystem from filling up by deleting stored
//! media on a schedule and, under disk pressure, oldest-first.
//!
//! # Features
//!
//! - **Retention**: deletes media past a per-type age limit (images vs. everything else)
//! - **Pressure eviction**: deletes oldest-first until usage drops below the pressure threshold
//! - **Emergency eviction**: same, re-probing disk usage after every deletion
//! - **Per-root locking**: at most one cycle per media root at a time
//! - **Cooperative cancellation**: a cancelled cycle still returns its partial result
//! - **Reporting boundary**: a typed JSON payload plus deterministic text fallbacks
//!
//! # Example
//!
//! ```rust,no_run
//! use catcord_cleaner::{CleanerConfig, EvictionEngine};
//!
//! let config = CleanerConfig::default();
//! let engine = EvictionEngine::from_config(&config);
//!
//! let result = engine.run_cycle(&config.media_root).expect("cleaner cycle failed");
//! println!("{}", result.to_payload().to_json_pretty().expect("serializable payload"));
//! ```

pub mod cancel;
pub mod clock;
pub mod config;
pub mod disk;
pub mod engine;
pub mod error;
pub mod format;
pub mod lock;
pub mod payload;
pub mod policy;
pub mod report;
pub mod result;
pub mod status;

pub use cancel::CancelFlag;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CleanerConfig;
pub use disk::{used_ratio, DiskProbe, DiskSnapshot, StatvfsProbe};
pub use engine::{run_cycle, EvictionEngine, EvictionMode, EvictionPlan};
pub use error::{CleanerError, Result};
pub use format::{format_pressure_stats, format_retention_stats, format_stats};
pub use lock::{CycleLock, CYCLE_LOCK_FILE};
pub use payload::RunPayload;
pub use policy::RetentionPolicy;
pub use report::{summarize, SummaryRenderer, ThrottledRenderer};
pub use result::{Completion, DeletedByType, DeletionOutcome, RunResult};
pub use status::{label, StorageStatus};

pub use catcord_media::{parse_reference, ContentType, MediaFile, MediaReference};
