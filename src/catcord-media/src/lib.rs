//! Media references and on-disk media discovery for the Catcord media store.
//!
//! - **Reference parsing**: turns `mxc://<server>/<media_id>` URIs into [`MediaReference`]
//! - **Classification**: derives a [`ContentType`] from a file's name
//! - **Location**: lazily walks a media root and finds the files backing a media id
//!
//! # Example
//!
//! ```rust,no_run
//! use catcord_media::{locate, parse_reference};
//! use std::path::Path;
//!
//! let reference = parse_reference(Some("mxc://example.com/abc123")).expect("valid mxc uri");
//! let files = locate(Path::new("/var/lib/synapse/media_store"), &reference.media_id)
//!     .expect("media root readable");
//! println!("{} files back {}", files.len(), reference);
//! ```

pub mod error;
pub mod file;
pub mod locator;
pub mod reference;

pub use error::{MediaError, Result};
pub use file::{ContentType, MediaFile};
pub use locator::{enumerate_all, locate, locate_uri, walk, MediaWalk, MEDIA_NAME_PREFIX};
pub use reference::{parse_reference, MediaReference, ReferenceError, MXC_SCHEME};
