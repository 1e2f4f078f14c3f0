//! Parsing of `mxc://` media references.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// URI scheme prefix of a media reference.
pub const MXC_SCHEME: &str = "mxc://";

/// Parsed identity of a stored media object.
///
/// Both fields are always non-empty; the only way to build one is through
/// [`parse_reference`] or [`FromStr`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaReference {
    /// Homeserver that owns the media.
    pub server_name: String,
    /// Opaque media identifier, stored verbatim.
    pub media_id: String,
}

/// Why a string is not a media reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("missing mxc:// scheme")]
    MissingScheme,
    #[error("missing '/' between server name and media id")]
    MissingSeparator,
    #[error("empty server name")]
    EmptyServerName,
    #[error("empty media id")]
    EmptyMediaId,
}

/// Parse a media URI of the form `mxc://<server_name>/<media_id>`.
///
/// Returns `None` for absent input or anything that is not a well-formed
/// reference. The components are kept as-is: no percent-decoding and no case
/// folding.
pub fn parse_reference(uri: Option<&str>) -> Option<MediaReference> {
    uri?.parse().ok()
}

impl FromStr for MediaReference {
    type Err = ReferenceError;

    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        let rest = uri
            .strip_prefix(MXC_SCHEME)
            .ok_or(ReferenceError::MissingScheme)?;
        let (server_name, media_id) = rest
            .split_once('/')
            .ok_or(ReferenceError::MissingSeparator)?;

        if server_name.is_empty() {
            return Err(ReferenceError::EmptyServerName);
        }
        if media_id.is_empty() {
            return Err(ReferenceError::EmptyMediaId);
        }

        Ok(Self {
            server_name: server_name.to_string(),
            media_id: media_id.to_string(),
        })
    }
}

impl fmt::Display for MediaReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", MXC_SCHEME, self.server_name, self.media_id)
    }
}
