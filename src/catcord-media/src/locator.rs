//! Discovery of media files under a media root.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{MediaError, Result};
use crate::file::{is_media_id_char, sharded_media_id, MediaFile};
use crate::reference::parse_reference;

/// Name prefix of media stored flat under the root (`media_<id>`).
pub const MEDIA_NAME_PREFIX: &str = "media_";

/// Lazy walk over the regular files below a media root.
///
/// Entries come out in path order (directories are read with their entries
/// sorted by name). Dot-files are bookkeeping, not media, and are skipped.
/// A root that does not exist yields nothing.
pub struct MediaWalk {
    root: PathBuf,
    inner: Option<walkdir::IntoIter>,
}

/// Start a lazy walk of `root`.
pub fn walk(root: &Path) -> MediaWalk {
    let mut walk = MediaWalk {
        root: root.to_path_buf(),
        inner: None,
    };
    walk.restart();
    walk
}

impl MediaWalk {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Rewind to the beginning, rescanning the disk.
    pub fn restart(&mut self) {
        self.inner = self.root.exists().then(|| {
            WalkDir::new(&self.root)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
        });
    }
}

impl Iterator for MediaWalk {
    type Item = Result<MediaFile>;

    fn next(&mut self) -> Option<Self::Item> {
        let inner = self.inner.as_mut()?;
        loop {
            let entry = match inner.next()? {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Some(Err(MediaError::Walk {
                        path: self.root.clone(),
                        source: e,
                    }));
                }
                Err(e) => {
                    warn!(root = %self.root.display(), error = %e, "Skipping unreadable media entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() || is_hidden(entry.path()) {
                continue;
            }

            match entry.metadata() {
                Ok(metadata) => {
                    let path = entry.into_path();
                    return Some(Ok(MediaFile::from_metadata(&self.root, path, &metadata)));
                }
                // Removed between readdir and stat.
                Err(e) if e.io_error().map(io::Error::kind) == Some(io::ErrorKind::NotFound) => {
                    debug!(path = %entry.path().display(), "Media file vanished during scan");
                }
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "Cannot stat media file");
                }
            }
        }
    }
}

/// Enumerate every media file under `root`, sorted by path.
///
/// A missing root is an empty, valid store.
pub fn enumerate_all(root: &Path) -> Result<Vec<MediaFile>> {
    walk(root).collect()
}

/// Find the files that back `media_id`: originals and any derived thumbnails.
///
/// A file matches when its path encodes the id in the sharded `aa/bb/rest`
/// layout, or when its name contains the id as a whole token: bounded by
/// characters that cannot be part of an id, or preceded by `media_`. Results
/// are sorted by path.
pub fn locate(root: &Path, media_id: &str) -> Result<Vec<MediaFile>> {
    if media_id.is_empty() {
        return Ok(Vec::new());
    }

    let mut matches = Vec::new();
    for file in walk(root) {
        let file = file?;
        if encodes_media_id(root, &file.path, media_id) {
            matches.push(file);
        }
    }

    debug!(
        root = %root.display(),
        media_id,
        matches = matches.len(),
        "Located media files"
    );
    Ok(matches)
}

/// Parse an `mxc://` URI and locate its files. Unparseable URIs match nothing.
pub fn locate_uri(root: &Path, uri: &str) -> Result<Vec<MediaFile>> {
    match parse_reference(Some(uri)) {
        Some(reference) => locate(root, &reference.media_id),
        None => {
            debug!(uri, "Not a media reference");
            Ok(Vec::new())
        }
    }
}

fn encodes_media_id(root: &Path, path: &Path, media_id: &str) -> bool {
    if sharded_media_id(root, path).is_some_and(|id| id == media_id) {
        return true;
    }
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| contains_token(name, media_id))
}

/// `true` when `token` occurs in `haystack` as a whole media id.
///
/// Neither neighbour may be a media-id character, except that the id may
/// follow a [`MEDIA_NAME_PREFIX`].
fn contains_token(haystack: &str, token: &str) -> bool {
    haystack.match_indices(token).any(|(start, _)| {
        let before = &haystack[..start];
        let before = before.strip_suffix(MEDIA_NAME_PREFIX).unwrap_or(before);
        let after = &haystack[start + token.len()..];
        !before.ends_with(is_media_id_char) && !after.starts_with(is_media_id_char)
    })
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}
