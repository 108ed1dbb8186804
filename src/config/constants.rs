//! # Corpus Configuration Constants
//!
//! This module centralizes the fixed parameters of the on-disk corpus layout
//! and the profile discovery order. Constants that depend on each other are
//! co-located so a format change cannot leave a dependent value behind.
//!
//! ## Relationships
//!
//! ```text
//! HASH_RAW_LEN (20 bytes)
//!       │
//!       ├─> HASH_HEX_LEN (derived: 2 * HASH_RAW_LEN)
//!       │
//!       └─> LARGE_HASH_HEADER_LEN (hash-list spill files start with one
//!           content SHA1 of the remainder)
//!
//! LARGE_HEADER_SCAN (256 bytes)
//!       Text-list spill files may carry a one-line header; the newline is
//!       only honored if it falls inside this window.
//! ```
//!
//! ## Profile Discovery
//!
//! [`crate::profile::Profile::discover`] searches, in order: caller-supplied
//! paths, [`PROFILE_FILE_NAME`] in the working directory, the same name as a
//! dotfile in the home directory, then [`PROFILE_SYSTEM_PATH`].

/// Raw length of a content hash (SHA1).
pub const HASH_RAW_LEN: usize = 20;

/// Length of a content hash rendered as lowercase hexadecimal.
pub const HASH_HEX_LEN: usize = 2 * HASH_RAW_LEN;

/// Hash-list spill files begin with a SHA1 of the remaining content.
pub const LARGE_HASH_HEADER_LEN: usize = HASH_RAW_LEN;

/// Window scanned for the optional header newline in text-list spill files.
pub const LARGE_HEADER_SCAN: usize = 256;

/// Profile schema versions this reader understands.
pub const SUPPORTED_SCHEMA_VERSIONS: &[u64] = &[1, 2];

/// Profile file name searched in the working and home directories.
pub const PROFILE_FILE_NAME: &str = "wocprofile.json";

/// System-wide profile location, searched last.
pub const PROFILE_SYSTEM_PATH: &str = "/etc/wocprofile.json";

/// Maps whose on-disk store keys are the lowercase ASCII hex of the raw key
/// rather than the raw bytes. Shard routing still uses the raw key; only the
/// store lookup is hex-encoded.
pub const HEX_KEYED_MAPS: &[&str] = &["bb2cf"];

const _: () = assert!(HASH_HEX_LEN == 40);
const _: () = assert!(LARGE_HASH_HEADER_LEN == HASH_RAW_LEN);
