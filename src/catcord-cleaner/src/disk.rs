//! Disk usage probing.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{CleanerError, Result};

/// Used-space ratio of a filesystem at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiskSnapshot {
    /// `used / total`, in `[0, 1]`.
    pub used_ratio: f64,
    pub taken_at: DateTime<Utc>,
}

impl DiskSnapshot {
    pub fn used_percent(&self) -> f64 {
        self.used_ratio * 100.0
    }
}

/// Something that can report how full the filesystem holding a path is.
pub trait DiskProbe: Send + Sync {
    /// Used-space ratio in `[0, 1]` of the filesystem containing `path`.
    fn used_ratio(&self, path: &Path) -> Result<f64>;
}

/// Probe backed by `statvfs(3)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatvfsProbe;

impl DiskProbe for StatvfsProbe {
    fn used_ratio(&self, path: &Path) -> Result<f64> {
        used_ratio(path)
    }
}

impl<P: DiskProbe + ?Sized> DiskProbe for &P {
    fn used_ratio(&self, path: &Path) -> Result<f64> {
        (**self).used_ratio(path)
    }
}

impl<P: DiskProbe + ?Sized> DiskProbe for std::sync::Arc<P> {
    fn used_ratio(&self, path: &Path) -> Result<f64> {
        (**self).used_ratio(path)
    }
}

/// Used-space ratio of the filesystem containing `path`.
///
/// `used` counts every block that is not free, including blocks reserved for
/// the superuser. No retries and no caching.
pub fn used_ratio(path: &Path) -> Result<f64> {
    let (total, free) = capacity(path).map_err(|source| CleanerError::Filesystem {
        path: path.to_path_buf(),
        source,
    })?;

    if total == 0 {
        return Err(CleanerError::Filesystem {
            path: path.to_path_buf(),
            source: io::Error::other("filesystem reports zero capacity"),
        });
    }

    let used = total.saturating_sub(free);
    Ok((used as f64 / total as f64).clamp(0.0, 1.0))
}

/// Closest existing ancestor of `path` (including itself).
///
/// A media root that has not been created yet still lives on some filesystem.
pub fn probe_path(path: &Path) -> PathBuf {
    path.ancestors()
        .find(|p| !p.as_os_str().is_empty() && p.exists())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| path.to_path_buf())
}

/// Total and free bytes (platform-specific).
#[cfg(unix)]
#[allow(clippy::unnecessary_cast)] // Cast needed for cross-platform: macOS has u32, Linux has u64
fn capacity(path: &Path) -> io::Result<(u64, u64)> {
    use std::ffi::CString;
    use std::mem::MaybeUninit;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    unsafe {
        let mut statvfs = MaybeUninit::<libc::statvfs>::uninit();
        if libc::statvfs(c_path.as_ptr(), statvfs.as_mut_ptr()) == 0 {
            let statvfs = statvfs.assume_init();
            let block = statvfs.f_frsize as u64;
            Ok((
                (statvfs.f_blocks as u64) * block,
                (statvfs.f_bfree as u64) * block,
            ))
        } else {
            Err(io::Error::last_os_error())
        }
    }
}

#[cfg(not(unix))]
fn capacity(_path: &Path) -> io::Result<(u64, u64)> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "disk usage probing is only implemented for unix",
    ))
}
