//! Media files discovered on disk and their content classification.

use std::fmt;
use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};

/// File extensions treated as images.
const IMAGE_EXTENSIONS: &[&str] = &[
    "apng", "avif", "bmp", "gif", "heic", "heif", "ico", "jpeg", "jpg", "png", "svg", "tif",
    "tiff", "webp",
];

/// Marker embedded in generated thumbnail names, e.g. `32-32-image-jpeg-crop`.
const THUMBNAIL_IMAGE_MARKER: &str = "-image-";

/// Coarse content class used to pick a retention period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Image,
    NonImage,
    /// No extension and no recognisable thumbnail name.
    Unknown,
}

impl ContentType {
    /// Classify a file by its name.
    pub fn from_path(path: &Path) -> Self {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return Self::Unknown;
        };

        match Path::new(name).extension().and_then(|e| e.to_str()) {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) => {
                Self::Image
            }
            Some(_) => Self::NonImage,
            None if name.contains(THUMBNAIL_IMAGE_MARKER) => Self::Image,
            None => Self::Unknown,
        }
    }

    pub fn is_image(self) -> bool {
        matches!(self, Self::Image)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Image => "image",
            Self::NonImage => "non_image",
            Self::Unknown => "unknown",
        })
    }
}

/// A regular file found under a media root.
///
/// Built fresh by every scan and never cached between cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    /// Media id recovered from the file's location, best effort.
    pub media_id: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
    pub content_type: ContentType,
}

impl MediaFile {
    /// Describe `path` (found under `root`) from already-fetched metadata.
    pub fn from_metadata(root: &Path, path: PathBuf, metadata: &Metadata) -> Self {
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        Self {
            media_id: media_id_for(root, &path),
            content_type: ContentType::from_path(&path),
            size_bytes: metadata.len(),
            modified_at: DateTime::<Utc>::from(modified),
            path,
        }
    }

    /// Whole days elapsed between the last modification and `now`.
    ///
    /// Files modified in the future count as zero days old.
    pub fn age_days(&self, now: DateTime<Utc>) -> u64 {
        (now - self.modified_at).num_days().max(0) as u64
    }
}

/// Recover the media id a stored file belongs to.
///
/// The media store shards ids as `aa/bb/rest`, with thumbnails kept in a
/// directory named after the id tail. The first such run of components below
/// `root` wins; otherwise the file stem is used.
pub(crate) fn media_id_for(root: &Path, path: &Path) -> String {
    if let Some(id) = sharded_media_id(root, path) {
        return id;
    }
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.split('.').next().unwrap_or(n).to_string())
        .unwrap_or_default()
}

pub(crate) fn sharded_media_id(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<&str> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();

    parts.windows(3).find_map(|window| {
        let &[first, second, rest] = window else {
            return None;
        };
        let is_shard = |s: &str| s.len() == 2 && s.chars().all(is_media_id_char);
        (is_shard(first) && is_shard(second) && !rest.is_empty() && rest.chars().all(is_media_id_char))
            .then(|| format!("{first}{second}{rest}"))
    })
}

pub(crate) fn is_media_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_classify_by_extension() {
        assert_eq!(ContentType::from_path(Path::new("a/cat.JPG")), ContentType::Image);
        assert_eq!(ContentType::from_path(Path::new("a/cat.webp")), ContentType::Image);
        assert_eq!(ContentType::from_path(Path::new("a/clip.mp4")), ContentType::NonImage);
        assert_eq!(ContentType::from_path(Path::new("a/notes.pdf")), ContentType::NonImage);
        assert_eq!(ContentType::from_path(Path::new("a/media_abc")), ContentType::Unknown);
    }

    #[test]
    fn test_classify_thumbnail_names() {
        assert_eq!(
            ContentType::from_path(Path::new("local_thumbnails/ab/cd/ef/32-32-image-jpeg-crop")),
            ContentType::Image
        );
    }

    #[test]
    fn test_sharded_media_id() {
        let root = Path::new("/store");
        assert_eq!(
            media_id_for(root, Path::new("/store/local_content/ab/cd/efghij")),
            "abcdefghij"
        );
        assert_eq!(
            media_id_for(
                root,
                Path::new("/store/local_thumbnails/ab/cd/efghij/32-32-image-png-scale")
            ),
            "abcdefghij"
        );
        assert_eq!(media_id_for(root, Path::new("/store/media_test123")), "media_test123");
        assert_eq!(media_id_for(root, Path::new("/store/photo.tar.gz")), "photo");
    }

    #[test]
    fn test_age_days_whole_days() {
        let now = Utc::now();
        let file = MediaFile {
            path: PathBuf::from("x"),
            media_id: "x".into(),
            size_bytes: 1,
            modified_at: now - Duration::hours(47),
            content_type: ContentType::Unknown,
        };
        assert_eq!(file.age_days(now), 1);
        assert_eq!(file.age_days(now - Duration::days(5)), 0);
    }
}
