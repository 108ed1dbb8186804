//! # Read-Only Hash-Table Shards
//!
//! Each shard of a corpus mapping is a Tokyo-Cabinet-style on-disk hash
//! table. This module implements the read side of that format and nothing
//! else: the corpus is immutable, so there is no write, update, or repair
//! surface here.
//!
//! ## File Layout
//!
//! ```text
//! +---------------------------+
//! |   Header (256 bytes)      |  magic, apow, opts, bucket count
//! +---------------------------+
//! |   Bucket array            |  bucket_count entries, 4 or 8 bytes each
//! +---------------------------+
//! |   Free block pool         |  skipped by the read path
//! +---------------------------+
//! |   Records                 |  binary trees chained from the buckets
//! +---------------------------+
//! ```
//!
//! Bucket entries and record child offsets are stored right-shifted by the
//! header's alignment power. A key hashes to a bucket with a multiplicative
//! hash; within a bucket's tree, descent compares a one-byte secondary hash
//! first and falls back to a length-then-bytes key comparison.
//!
//! ## Record Layout
//!
//! ```text
//! Offset  Size      Description
//! 0       1         Magic (0xc8 record, 0xb0 free block)
//! 1       1         Secondary hash of the key
//! 2       4 or 8    Left child offset (>> apow)
//! +       4 or 8    Right child offset (>> apow)
//! +       2         Padding size after the value
//! +       1-5       Key size (signed continuation varint)
//! +       1-5       Value size (signed continuation varint)
//! +       ksiz      Key bytes
//! +       vsiz      Value bytes
//! ```
//!
//! ## Zero-Copy Access
//!
//! The shard file is memory-mapped read-only and [`TchReader::get`] returns
//! a borrowed slice into the map. Nothing is copied until a decoder needs
//! an owned value.
//!
//! ## Concurrency
//!
//! The map is never mutated after open, so lookups are safe from any number
//! of threads; the handle pool in [`crate::shard`] shares readers as
//! `Arc<TchReader>`.

pub mod header;

use std::cmp::Ordering;
use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::error::{Error, Result};
use header::{ShardHeader, BUCKET_ARRAY_OFFSET, HEADER_SIZE};

pub const RECORD_MAGIC: u8 = 0xc8;
pub const FREE_BLOCK_MAGIC: u8 = 0xb0;

/// One opened, memory-mapped shard.
#[derive(Debug)]
pub struct TchReader {
    mmap: Mmap,
    path: PathBuf,
    bucket_count: u64,
    apow: u8,
    wide: bool,
}

struct Record<'a> {
    hash: u8,
    left: u64,
    right: u64,
    key: &'a [u8],
    value: &'a [u8],
}

impl TchReader {
    /// Opens a shard read-only and validates its header.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;

        // SAFETY: Mmap::map is unsafe because the file could be modified
        // externally while mapped. The corpus layout is append-once and the
        // shard files are never rewritten in place; the map is dropped with
        // the reader and all access is bounds-checked against mmap.len().
        let mmap = unsafe { Mmap::map(&file)? };

        let header = ShardHeader::from_bytes(&mmap).map_err(|err| match err {
            Error::DecodeCorrupt { reason } => Error::DecodeCorrupt {
                reason: format!("{}: {}", path.display(), reason),
            },
            other => other,
        })?;

        let reader = Self {
            bucket_count: header.bucket_count(),
            apow: header.apow(),
            wide: header.wide(),
            path: path.to_owned(),
            mmap,
        };

        let bucket_end = BUCKET_ARRAY_OFFSET as u64 + reader.bucket_count * reader.entry_width();
        if bucket_end > reader.mmap.len() as u64 {
            return Err(reader.corrupt("bucket array extends past end of file"));
        }

        Ok(reader)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Looks up a key, returning a borrowed slice of the value bytes.
    /// Absence is `Ok(None)`, distinct from structural corruption.
    pub fn get(&self, key: &[u8]) -> Result<Option<&[u8]>> {
        let (bucket, hash) = bucket_hashes(key, self.bucket_count);
        let mut off = self.bucket_entry(bucket);

        while off > 0 {
            let record = self.read_record(off)?;
            match hash.cmp(&record.hash) {
                Ordering::Greater => off = record.left,
                Ordering::Less => off = record.right,
                Ordering::Equal => match key_order(key, record.key) {
                    Ordering::Greater => off = record.left,
                    Ordering::Less => off = record.right,
                    Ordering::Equal => return Ok(Some(record.value)),
                },
            }
        }
        Ok(None)
    }

    fn entry_width(&self) -> u64 {
        if self.wide {
            8
        } else {
            4
        }
    }

    fn bucket_entry(&self, bucket: u64) -> u64 {
        let width = self.entry_width() as usize;
        let start = BUCKET_ARRAY_OFFSET + bucket as usize * width;
        let stored = if self.wide {
            u64::from_le_bytes(self.mmap[start..start + 8].try_into().unwrap())
        } else {
            u64::from(u32::from_le_bytes(
                self.mmap[start..start + 4].try_into().unwrap(),
            ))
        };
        stored << self.apow
    }

    fn read_record(&self, off: u64) -> Result<Record<'_>> {
        let buf = &self.mmap;
        let off = off as usize;
        if off < HEADER_SIZE || off >= buf.len() {
            return Err(self.corrupt(format!("record offset {} out of range", off)));
        }

        let magic = buf[off];
        if magic == FREE_BLOCK_MAGIC {
            return Err(self.corrupt("record chain points into a free block"));
        }
        if magic != RECORD_MAGIC {
            return Err(self.corrupt(format!("bad record magic {:#04x}", magic)));
        }

        let width = self.entry_width() as usize;
        let fixed_end = off + 2 + 2 * width + 2;
        if fixed_end > buf.len() {
            return Err(self.corrupt("record header truncated"));
        }

        let hash = buf[off + 1];
        let (left, right) = if self.wide {
            (
                u64::from_le_bytes(buf[off + 2..off + 10].try_into().unwrap()),
                u64::from_le_bytes(buf[off + 10..off + 18].try_into().unwrap()),
            )
        } else {
            (
                u64::from(u32::from_le_bytes(buf[off + 2..off + 6].try_into().unwrap())),
                u64::from(u32::from_le_bytes(
                    buf[off + 6..off + 10].try_into().unwrap(),
                )),
            )
        };

        // Padding size occupies the two bytes before the size varints; the
        // read path never walks past the value, so only its width matters.
        let mut pos = fixed_end;
        let (ksiz, step) = read_vnum(buf, pos).ok_or_else(|| self.corrupt("bad key size"))?;
        pos += step;
        let (vsiz, step) = read_vnum(buf, pos).ok_or_else(|| self.corrupt("bad value size"))?;
        pos += step;

        let key_end = pos
            .checked_add(ksiz as usize)
            .filter(|&end| end <= buf.len())
            .ok_or_else(|| self.corrupt("record key extends past end of file"))?;
        let value_end = key_end
            .checked_add(vsiz as usize)
            .filter(|&end| end <= buf.len())
            .ok_or_else(|| self.corrupt("record value extends past end of file"))?;

        Ok(Record {
            hash,
            left: left << self.apow,
            right: right << self.apow,
            key: &buf[pos..key_end],
            value: &buf[key_end..value_end],
        })
    }

    fn corrupt(&self, reason: impl std::fmt::Display) -> Error {
        Error::corrupt(format!("{}: {}", self.path.display(), reason))
    }
}

/// Primary bucket index and one-byte secondary hash for a key.
pub(crate) fn bucket_hashes(key: &[u8], bucket_count: u64) -> (u64, u8) {
    let mut idx: u64 = 19_780_211;
    for &byte in key {
        idx = idx.wrapping_mul(37).wrapping_add(u64::from(byte));
    }

    let mut hash: u32 = 751;
    for &byte in key.iter().rev() {
        hash = hash.wrapping_mul(31) ^ u32::from(byte);
    }

    (idx % bucket_count, hash as u8)
}

/// Chain ordering: shorter keys sort first, ties broken bytewise.
pub(crate) fn key_order(a: &[u8], b: &[u8]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Signed continuation varint: negative bytes continue, the first
/// non-negative byte terminates. Little-endian 7-bit groups.
fn read_vnum(buf: &[u8], start: usize) -> Option<(u64, usize)> {
    let mut num: u64 = 0;
    let mut base: u64 = 1;
    let mut i = start;
    loop {
        let byte = *buf.get(i)? as i8;
        if byte >= 0 {
            num = num.checked_add(u64::from(byte as u8).checked_mul(base)?)?;
            return Some((num, i - start + 1));
        }
        num = num.checked_add(base.checked_mul((-(i64::from(byte) + 1)) as u64)?)?;
        base = base.checked_shl(7)?;
        i += 1;
    }
}
