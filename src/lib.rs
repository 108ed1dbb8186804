//! # wocdb - Sharded Version-Control Corpus Reader
//!
//! wocdb provides read-only random access to a very large, sharded,
//! content-addressed corpus of version-control objects (commits, trees,
//! blobs) and derived relational mappings (project to commits, author to
//! commits, blob to containing commits). The corpus never fits in memory;
//! it lives on disk as hundreds of hash-table shard files per mapping plus
//! append-only stacked blob files, bound together by a JSON profile.
//!
//! ## Quick Start
//!
//! ```ignore
//! use wocdb::{Corpus, Value, Content};
//!
//! let corpus = Corpus::open()?; // finds wocprofile.json
//!
//! if let Value::Hashes(commits) = corpus.get_values("P2c", "user2589_minicms")? {
//!     for id in commits {
//!         if let Content::Commit(c) = corpus.show_content("commit", &id)? {
//!             println!("{} {}", c.author.timestamp, c.message.lines().next().unwrap_or(""));
//!         }
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │       Public API (Corpus)            │  get_values / show_content
//! ├──────────────────────────────────────┤
//! │  Profile (maps, objects, larges)     │  key normalization, dtypes
//! ├───────────────────┬──────────────────┤
//! │   Shard router    │   Handle pool    │  FNV / first-byte routing
//! ├───────────────────┴──────────────────┤
//! │  Hash-table shards (mmap, read-only) │  bucket + record-tree lookup
//! ├──────────────────────────────────────┤
//! │  Value decoders (h, s, cs, cs3, ...) │  BER, LZF framing, charset
//! └──────────────────────────────────────┘
//! ```
//!
//! ## Corpus Layout
//!
//! ```text
//! /da/
//! ├── wocprofile.json        # binds map names to shard files
//! ├── P2c.{0..7}.tch         # string-keyed mapping, 2^3 shards
//! ├── c2p.{0..127}.tch       # hash-keyed mapping, 2^7 shards
//! ├── P2c.large.8277ede9     # spilled oversized values
//! ├── commit.{0..}.tch       # commit objects, LZF framed
//! ├── tree.{0..}.tch         # tree objects
//! ├── sha1.blob.{0..}.tch    # blob (offset, length) pointers
//! └── blob.{0..}.bin         # stacked blob payloads
//! ```
//!
//! ## Guarantees
//!
//! - **Read-only**: nothing here writes, repairs, or caches decoded values;
//!   only opened shard handles persist, for the life of the process.
//! - **Thread-safe**: the profile is immutable and the pool is internally
//!   synchronized; share one [`Corpus`] across threads freely.
//! - **Zero-copy leaning**: shard lookups return borrowed mmap slices and
//!   the decoders slice one contiguous buffer; owned values materialize
//!   only at the API boundary.
//!
//! ## Module Overview
//!
//! - [`profile`]: the profile document, datatype tags, discovery order
//! - [`query`]: the [`Corpus`] facade
//! - [`decode`]: value, tree, and commit decoders
//! - [`shard`]: key routing and the process-wide handle pool
//! - [`tch`]: read-only Tokyo-Cabinet-style hash-file access
//! - [`encoding`]: BER varints, FNV-1a, LZF framing, text decoding
//! - [`largefile`]: oversized-value spill files
//! - [`config`]: corpus layout constants

pub mod config;
pub mod decode;
pub mod encoding;
pub mod error;
pub mod largefile;
pub mod profile;
pub mod query;
pub mod shard;
pub mod tch;

pub use decode::{Commit, Signature, TreeEntry, Value};
pub use error::{Error, Result};
pub use profile::{InDType, MapDescriptor, OutDType, Profile};
pub use query::{Content, Corpus};
