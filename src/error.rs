//! # Error Types
//!
//! All fallible operations in wocdb return [`Result<T>`], an alias over the
//! crate-wide [`Error`] enum. Callers are expected to match on the variants:
//! a missing key ([`Error::NotFound`]) is a normal outcome for speculative
//! lookups, while [`Error::DecodeCorrupt`] or [`Error::ShardMissing`] point
//! at a damaged or misconfigured corpus.
//!
//! ## Propagation Policy
//!
//! Decoders that attempt "maybe compressed" input recover decode failures
//! locally and fall back to the literal bytes (see
//! [`crate::encoding::try_decomp`]); every other error propagates unchanged.
//! Nothing in this crate retries I/O.

use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No profile document was found in any searched location.
    #[error("no corpus profile found (searched {searched:?})")]
    ProfileMissing { searched: Vec<PathBuf> },

    /// The profile exists but cannot be used: unsupported schema version,
    /// empty map table, or a shard table whose size contradicts its
    /// sharding bits.
    #[error("unsupported corpus profile: {reason}")]
    ProfileUnsupported { reason: String },

    /// The requested map or object name is not in the profile.
    #[error("unknown map or object: {name}")]
    UnknownMap { name: String },

    /// The key shape does not match the map's input datatype.
    #[error("bad key for {map}: {reason}")]
    BadKey { map: String, reason: String },

    /// The profile references a shard file that does not exist on disk.
    #[error("shard file missing: {path}")]
    ShardMissing { path: PathBuf },

    /// The key routed to the correct shard but the store has no entry.
    #[error("key {key} not found in {map}")]
    NotFound { map: String, key: String },

    /// A decoder's structural invariants failed on the value bytes.
    #[error("corrupt value: {reason}")]
    DecodeCorrupt { reason: String },

    /// A datatype tag or object kind that is reserved but not implemented.
    #[error("unsupported: {what}")]
    Unsupported { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The profile document is not well-formed JSON for the expected shape.
    #[error("malformed corpus profile: {0}")]
    ProfileInvalid(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Error::DecodeCorrupt {
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(what: impl Into<String>) -> Self {
        Error::Unsupported { what: what.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = Error::NotFound {
            map: "c2p".to_string(),
            key: "e4af89166a17785c1d741b8b1d5775f3223f510f".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("c2p"));
        assert!(text.contains("e4af89166a17785c1d741b8b1d5775f3223f510f"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
