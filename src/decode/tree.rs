//! # Tree Object Decoder
//!
//! A tree object is a concatenation of entries, each
//! `mode SP filename NUL hash20`. The decoder walks the buffer linearly
//! with byte-search primitives; nothing is allocated per byte, and entries
//! come out in file order.

use memchr::memchr;

use crate::config::HASH_RAW_LEN;
use crate::encoding::decode_str;
use crate::error::{Error, Result};

/// One tree entry: mode digits, filename, and the referenced hash as hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: String,
    pub filename: String,
    pub hash: String,
}

/// Decodes a full tree object buffer into its entries.
pub fn decode_tree(data: &[u8]) -> Result<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    let mut rest = data;

    while !rest.is_empty() {
        let space = memchr(b' ', rest)
            .ok_or_else(|| Error::corrupt("tree entry has no mode terminator"))?;
        let nul = memchr(b'\0', &rest[space + 1..])
            .ok_or_else(|| Error::corrupt("tree entry has no filename terminator"))?;

        let hash_start = space + 1 + nul + 1;
        let hash_end = hash_start + HASH_RAW_LEN;
        if rest.len() < hash_end {
            return Err(Error::corrupt("tree entry hash is truncated"));
        }

        entries.push(TreeEntry {
            mode: decode_str(&rest[..space]),
            filename: decode_str(&rest[space + 1..space + 1 + nul]),
            hash: hex::encode(&rest[hash_start..hash_end]),
        });
        rest = &rest[hash_end..];
    }

    Ok(entries)
}
