//! # Sharding Module
//!
//! Routes keys to shard files and pools the opened handles:
//!
//! - [`router`]: the key-to-shard-index function
//! - [`pool`]: process-lifetime cache of opened read-only shard handles

pub mod pool;
pub mod router;

pub use pool::ShardPool;
pub use router::shard_index;
