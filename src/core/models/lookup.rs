use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::models::token_identity::{Fingerprint, TokenIdentity};

/// Where a public key can be looked up.
///
/// The first three form the fallback chain; `ContentFile` is the manual,
/// one-shot path the user triggers by picking a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupSource {
    LocalStore,
    UrlFetch,
    Keyserver,
    ContentFile,
}

impl LookupSource {
    /// Chain sources in the order they are tried.
    pub const CHAIN: [LookupSource; 3] = [Self::LocalStore, Self::UrlFetch, Self::Keyserver];

    pub fn name(self) -> &'static str {
        match self {
            Self::LocalStore => "local",
            Self::UrlFetch => "url",
            Self::Keyserver => "keyserver",
            Self::ContentFile => "content_file",
        }
    }
}

impl fmt::Display for LookupSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The parameters handed to a lookup collaborator, one shape per source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum LookupRequest {
    LocalStore {
        fingerprints: Vec<Fingerprint>,
    },
    UrlFetch {
        url: Option<String>,
        fingerprints: Vec<Fingerprint>,
    },
    Keyserver {
        fingerprint_sign: Fingerprint,
    },
    ContentFile {
        fingerprint_sign: Fingerprint,
        file: PathBuf,
    },
}

impl LookupRequest {
    /// Build the request for a chain source from the token description.
    ///
    /// Returns `None` for `ContentFile`, which needs a file reference.
    pub fn for_chain(source: LookupSource, token: &TokenIdentity) -> Option<Self> {
        match source {
            LookupSource::LocalStore => Some(Self::LocalStore {
                fingerprints: token.fingerprints.clone(),
            }),
            LookupSource::UrlFetch => Some(Self::UrlFetch {
                url: token.url.clone(),
                fingerprints: token.fingerprints.clone(),
            }),
            LookupSource::Keyserver => Some(Self::Keyserver {
                fingerprint_sign: token.fingerprint_sign.clone(),
            }),
            LookupSource::ContentFile => None,
        }
    }

    pub fn content_file(token: &TokenIdentity, file: PathBuf) -> Self {
        Self::ContentFile {
            fingerprint_sign: token.fingerprint_sign.clone(),
            file,
        }
    }

    pub fn source(&self) -> LookupSource {
        match self {
            Self::LocalStore { .. } => LookupSource::LocalStore,
            Self::UrlFetch { .. } => LookupSource::UrlFetch,
            Self::Keyserver { .. } => LookupSource::Keyserver,
            Self::ContentFile { .. } => LookupSource::ContentFile,
        }
    }
}

/// Search round counter, bumped on every user-initiated retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Epoch(pub u64);

impl Epoch {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Identifies one dispatched lookup. A completion is only accepted when it
/// carries the ticket of the lookup currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTicket {
    pub source: LookupSource,
    pub epoch: Epoch,
    pub sequence: u64,
}
