//! # Query Facade
//!
//! [`Corpus`] is the public entry point: it owns the loaded [`Profile`] and
//! the shard handle pool, and exposes the two read operations the corpus
//! supports:
//!
//! - [`Corpus::get_values`]: mapping lookup. Normalizes the key, checks the
//!   map's spill table, routes to a shard, fetches, and decodes under the
//!   map's out-dtype.
//! - [`Corpus::show_content`]: object lookup. Fetches a tree, commit, or
//!   blob by content hash and decodes it into its logical structure.
//!
//! The facade is cheap to share: the profile is immutable and the pool is
//! internally synchronized, so one `Corpus` (or an `Arc` of it) serves any
//! number of threads. All I/O is synchronous; callers wanting latency
//! bounds should pool their requests externally.
//!
//! ## Key Forms
//!
//! Hash-keyed maps accept either the raw 20 bytes or the 40-character hex
//! form; string-keyed maps take the key bytes as-is. At the API boundary
//! hashes always come back as lowercase hex.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tracing::{debug, trace};

use crate::config::{HASH_HEX_LEN, HASH_RAW_LEN, HEX_KEYED_MAPS};
use crate::decode::{decode_commit, decode_tree, decode_value, Commit, TreeEntry, Value};
use crate::encoding::{decode_str, fnvhash, try_decomp, unber};
use crate::error::{Error, Result};
use crate::largefile::read_large;
use crate::profile::{InDType, MapDescriptor, OutDType, Profile};
use crate::shard::{shard_index, ShardPool};

/// Decoded result of [`Corpus::show_content`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Tree(Vec<TreeEntry>),
    Commit(Commit),
    Blob(String),
}

/// Object-store aliases accepted by the facade alongside the literal
/// store names from the profile.
const OBJECT_ALIASES: &[(&str, &str)] = &[
    ("tree", "tree.tch"),
    ("commit", "commit.tch"),
    ("blob", "sha1.blob.tch"),
];

/// Object kinds the corpus reserves but this reader does not serve.
const RESERVED_OBJECTS: &[&str] = &["tkns", "tag", "bdiff"];

/// A read-only handle on one corpus generation.
#[derive(Debug)]
pub struct Corpus {
    profile: Profile,
    pool: ShardPool,
}

impl Corpus {
    /// Opens the corpus using the standard profile discovery order.
    pub fn open() -> Result<Self> {
        Ok(Self::from_profile(Profile::discover::<&Path>(&[])?))
    }

    /// Opens the corpus, trying the given profile paths before the
    /// standard discovery order.
    pub fn open_at<P: AsRef<Path>>(profile_paths: &[P]) -> Result<Self> {
        Ok(Self::from_profile(Profile::discover(profile_paths)?))
    }

    /// Wraps an already-loaded profile.
    pub fn from_profile(profile: Profile) -> Self {
        Self {
            profile,
            pool: ShardPool::new(),
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// True when `get_values` can resolve the name.
    pub fn has_map(&self, name: &str) -> bool {
        self.descriptor(name).is_ok()
    }

    /// Fetches and decodes one mapping value.
    pub fn get_values(&self, map: &str, key: impl AsRef<[u8]>) -> Result<Value> {
        let descriptor = self.descriptor(map)?;
        let (raw_key, hex_form) = normalize_key(map, descriptor.dtypes.input, key.as_ref())?;
        debug!(map, key = %hex_form, "get_values");

        if let Some(spill) = descriptor.larges.get(hex_form.as_str()) {
            // Spilled text lists are stored uncompressed, so `cs` reads
            // back with the plain string decoder.
            let payload = read_large(spill, &descriptor.dtypes.output)?;
            let effective = match &descriptor.dtypes.output {
                OutDType::CompStrings => OutDType::Strings,
                other => other.clone(),
            };
            return decode_value(&payload, &effective);
        }

        let raw = self.fetch(map, descriptor, &raw_key, &hex_form)?;
        decode_value(&raw, &descriptor.dtypes.output)
    }

    /// Fetches and decodes one object by content hash.
    pub fn show_content(&self, object: &str, key: impl AsRef<[u8]>) -> Result<Content> {
        match object {
            "tree" => {
                let raw = self.fetch_object(object, key.as_ref())?;
                Ok(Content::Tree(decode_tree(&try_decomp(&raw))?))
            }
            "commit" => {
                let raw = self.fetch_object(object, key.as_ref())?;
                Ok(Content::Commit(decode_commit(&try_decomp(&raw))?))
            }
            "blob" => self.read_blob(key.as_ref()),
            reserved if RESERVED_OBJECTS.contains(&reserved) => {
                Err(Error::unsupported(format!("object kind {}", reserved)))
            }
            other => Err(Error::UnknownMap {
                name: other.to_owned(),
            }),
        }
    }

    /// Resolves a name against `maps` first, then `objects` (with the
    /// tree/commit/blob aliases).
    fn descriptor(&self, name: &str) -> Result<&MapDescriptor> {
        if let Some(descriptor) = self.profile.map(name) {
            return Ok(descriptor);
        }
        let store = OBJECT_ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, store)| *store)
            .unwrap_or(name);
        self.profile.object(store).ok_or_else(|| Error::UnknownMap {
            name: name.to_owned(),
        })
    }

    fn fetch_object(&self, object: &str, key: &[u8]) -> Result<Vec<u8>> {
        let descriptor = self.descriptor(object)?;
        let (raw_key, hex_form) = normalize_key(object, descriptor.dtypes.input, key)?;
        debug!(object, key = %hex_form, "show_content");
        self.fetch(object, descriptor, &raw_key, &hex_form)
    }

    fn fetch(
        &self,
        name: &str,
        descriptor: &MapDescriptor,
        raw_key: &[u8],
        hex_form: &str,
    ) -> Result<Vec<u8>> {
        descriptor.check_shards(name)?;
        let index = shard_index(
            raw_key,
            descriptor.sharding_bits,
            descriptor.dtypes.input.fnv_keyed(),
        );
        let path = &descriptor.shards[index];
        let reader = self.pool.get(path)?;
        trace!(name, shard = index, path = %path.display(), "routed");

        let found = if HEX_KEYED_MAPS.contains(&name) {
            // Quirk stores: the store key is the lowercase hex of the raw
            // key, while routing stays on the raw first byte.
            reader.get(hex::encode(raw_key).as_bytes())?
        } else {
            reader.get(raw_key)?
        };

        match found {
            Some(value) => Ok(value.to_vec()),
            None => Err(Error::NotFound {
                map: name.to_owned(),
                key: hex_form.to_owned(),
            }),
        }
    }

    fn read_blob(&self, key: &[u8]) -> Result<Content> {
        let pointer = self.fetch_object("blob", key)?;
        if pointer.len() < HASH_RAW_LEN {
            return Err(Error::corrupt("blob pointer shorter than its hash"));
        }
        let offsets = unber(&pointer[HASH_RAW_LEN..])?;
        if offsets.len() != 2 {
            return Err(Error::corrupt(format!(
                "blob pointer packs {} integers, expected 2",
                offsets.len()
            )));
        }
        let (offset, length) = (offsets[0], offsets[1]);
        let hash = &pointer[..HASH_RAW_LEN];

        let descriptor = self
            .profile
            .object("blob.bin")
            .ok_or_else(|| Error::UnknownMap {
                name: "blob.bin".to_owned(),
            })?;
        descriptor.check_shards("blob.bin")?;
        let index = shard_index(hash, descriptor.sharding_bits, false);
        let path = &descriptor.shards[index];
        if !path.is_file() {
            return Err(Error::ShardMissing { path: path.clone() });
        }
        trace!(shard = index, offset, length, "reading stacked blob");

        // Stacked blob files are opened per call; only hash-table handles
        // are pooled.
        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(offset))?;
        let mut payload = vec![0u8; length as usize];
        file.read_exact(&mut payload)?;

        Ok(Content::Blob(decode_str(&try_decomp(&payload))))
    }
}

/// Normalizes a caller key into `(lookup bytes, hex form)`.
///
/// Hash keys arrive raw or as 40-char hex; string keys pass through with
/// their FNV-1a hex as the spill-table form.
fn normalize_key(map: &str, input: InDType, key: &[u8]) -> Result<(Vec<u8>, String)> {
    match input {
        InDType::Hash => {
            if key.len() == HASH_RAW_LEN {
                return Ok((key.to_vec(), hex::encode(key)));
            }
            if key.len() == HASH_HEX_LEN {
                let text = std::str::from_utf8(key).map_err(|_| bad_key(map, "non-ASCII hex key"))?;
                let raw = hex::decode(text).map_err(|_| bad_key(map, "key is not valid hex"))?;
                return Ok((raw, text.to_ascii_lowercase()));
            }
            Err(bad_key(
                map,
                format!("hash key must be 20 raw or 40 hex bytes, got {}", key.len()),
            ))
        }
        InDType::Str => Ok((key.to_vec(), format!("{:x}", fnvhash(key)))),
    }
}

fn bad_key(map: &str, reason: impl Into<String>) -> Error {
    Error::BadKey {
        map: map.to_owned(),
        reason: reason.into(),
    }
}
