//! # Corpus Profile
//!
//! The profile is the JSON document that binds logical map names to the
//! physical shard files of one corpus generation. It is loaded once, at
//! construction, and immutable afterwards; everything the query facade
//! knows about the corpus layout comes from here.
//!
//! ## Document Shape
//!
//! ```json
//! {
//!   "schema_version": 1,
//!   "maps": {
//!     "P2c": [{
//!       "dtypes": ["s", "h"],
//!       "sharding_bits": 3,
//!       "shards": ["/da/P2c.0.tch", "..."],
//!       "larges": { "8277ede9": "/da/P2c.large.8277ede9" }
//!     }]
//!   },
//!   "objects": {
//!     "commit.tch": { "sharding_bits": 7, "shards": ["..."] }
//!   }
//! }
//! ```
//!
//! A map name resolves to a *list* of descriptors so several on-disk
//! generations can coexist; readers use the first entry. Datatype tags are
//! lifted to enums at load time, and tags this reader does not implement
//! are kept as [`OutDType::Reserved`] so querying such a map surfaces
//! [`crate::Error::Unsupported`] rather than poisoning the whole profile.
//!
//! ## Discovery
//!
//! [`Profile::discover`] searches, in order: caller-supplied paths,
//! `./wocprofile.json`, `~/.wocprofile.json`, `/etc/wocprofile.json`.
//! Nothing found in any location is [`crate::Error::ProfileMissing`].

use std::fs;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use serde::Deserialize;
use tracing::debug;

use crate::config::{PROFILE_FILE_NAME, PROFILE_SYSTEM_PATH, SUPPORTED_SCHEMA_VERSIONS};
use crate::error::{Error, Result};

/// Key kind of a mapping: content hashes route by their first raw byte,
/// anything else routes through FNV-1a of the key bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InDType {
    Hash,
    Str,
}

impl InDType {
    fn from_tag(tag: &str) -> Self {
        if tag == "h" {
            InDType::Hash
        } else {
            InDType::Str
        }
    }

    pub fn fnv_keyed(self) -> bool {
        matches!(self, InDType::Str)
    }
}

/// Value encoding of a mapping, selecting the decoder in [`crate::decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutDType {
    /// `h`: concatenated 20-byte hashes.
    Hashes,
    /// `s`: `;`-separated strings, uncompressed.
    Strings,
    /// `cs`: LZF-framed `;`-separated strings; empties and `EMPTY` dropped.
    CompStrings,
    /// `cs3`: LZF-framed `;`-separated fields grouped into triples.
    CompTriples,
    /// `sh`: `time;author` text with a trailing 20-byte hash.
    TimeAuthorHash,
    /// `r`: 20-byte hash plus a BER-packed stacked-blob pointer.
    BlobPointer,
    /// `c?`: maybe-compressed raw bytes, decoded by later stages.
    Raw,
    /// Tags the profile may carry but this reader does not implement
    /// (`hhwww` and anything unknown).
    Reserved(String),
}

impl OutDType {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "h" => OutDType::Hashes,
            "s" => OutDType::Strings,
            "cs" => OutDType::CompStrings,
            "cs3" => OutDType::CompTriples,
            "sh" => OutDType::TimeAuthorHash,
            "r" => OutDType::BlobPointer,
            "c?" => OutDType::Raw,
            other => OutDType::Reserved(other.to_owned()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            OutDType::Hashes => "h",
            OutDType::Strings => "s",
            OutDType::CompStrings => "cs",
            OutDType::CompTriples => "cs3",
            OutDType::TimeAuthorHash => "sh",
            OutDType::BlobPointer => "r",
            OutDType::Raw => "c?",
            OutDType::Reserved(tag) => tag,
        }
    }
}

/// The `dtypes` pair of a map descriptor; defaults to `("h", "c?")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DTypes {
    pub input: InDType,
    pub output: OutDType,
}

impl Default for DTypes {
    fn default() -> Self {
        Self {
            input: InDType::Hash,
            output: OutDType::Raw,
        }
    }
}

impl<'de> Deserialize<'de> for DTypes {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (input, output) = <(String, String)>::deserialize(deserializer)?;
        Ok(Self {
            input: InDType::from_tag(&input),
            output: OutDType::from_tag(&output),
        })
    }
}

/// One on-disk generation of a logical mapping.
#[derive(Debug, Clone, Deserialize)]
pub struct MapDescriptor {
    #[serde(default)]
    pub dtypes: DTypes,
    pub sharding_bits: u32,
    #[serde(default)]
    pub shards: Vec<PathBuf>,
    /// Oversized values spilled to external files, keyed by the hex form of
    /// the original key (raw-hash hex, or hex FNV-1a for string keys).
    #[serde(default)]
    pub larges: HashMap<String, PathBuf>,
}

impl MapDescriptor {
    /// Checks the shard-table invariant `len(shards) == 2^sharding_bits`.
    /// The routing value is one byte, so more than 8 bits can never match.
    pub fn check_shards(&self, name: &str) -> Result<()> {
        if self.sharding_bits > 8 {
            return Err(Error::ProfileUnsupported {
                reason: format!(
                    "map {} declares {} sharding bits, routing is one byte",
                    name, self.sharding_bits
                ),
            });
        }
        let expected = 1usize << self.sharding_bits;
        if self.shards.len() != expected {
            return Err(Error::ProfileUnsupported {
                reason: format!(
                    "map {} declares {} sharding bits but {} shards",
                    name,
                    self.sharding_bits,
                    self.shards.len()
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub schema_version: u64,
    #[serde(default)]
    pub maps: HashMap<String, Vec<MapDescriptor>>,
    #[serde(default)]
    pub objects: HashMap<String, MapDescriptor>,
}

impl Profile {
    /// Loads and validates a profile from one file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let profile: Profile = serde_json::from_slice(&bytes)?;
        profile.validate()?;
        debug!(
            path = %path.display(),
            maps = profile.maps.len(),
            objects = profile.objects.len(),
            "loaded corpus profile"
        );
        Ok(profile)
    }

    /// Searches the discovery order and loads the first profile found.
    ///
    /// Caller-supplied paths are tried first and must parse if present; a
    /// broken explicit profile is an error, not a reason to fall through.
    pub fn discover<P: AsRef<Path>>(explicit: &[P]) -> Result<Self> {
        let mut candidates: Vec<PathBuf> =
            explicit.iter().map(|p| p.as_ref().to_owned()).collect();
        candidates.push(PathBuf::from(PROFILE_FILE_NAME));
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(format!(".{}", PROFILE_FILE_NAME)));
        }
        candidates.push(PathBuf::from(PROFILE_SYSTEM_PATH));

        for candidate in &candidates {
            if candidate.is_file() {
                return Self::load(candidate);
            }
        }
        Err(Error::ProfileMissing {
            searched: candidates,
        })
    }

    fn validate(&self) -> Result<()> {
        if !SUPPORTED_SCHEMA_VERSIONS.contains(&self.schema_version) {
            return Err(Error::ProfileUnsupported {
                reason: format!("schema_version {} not supported", self.schema_version),
            });
        }
        if self.maps.is_empty() {
            return Err(Error::ProfileUnsupported {
                reason: "profile defines no maps".to_owned(),
            });
        }
        Ok(())
    }

    /// First-generation descriptor for a logical map, if present.
    pub fn map(&self, name: &str) -> Option<&MapDescriptor> {
        self.maps.get(name).and_then(|generations| generations.first())
    }

    /// Descriptor for an object store, if present.
    pub fn object(&self, name: &str) -> Option<&MapDescriptor> {
        self.objects.get(name)
    }

    /// Logical map names, in arbitrary order.
    pub fn map_names(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(String::as_str)
    }
}
