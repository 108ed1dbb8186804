//! # Hash-File Header
//!
//! Zerocopy view of the 256-byte header at the front of every hash-table
//! shard. Only the fields the read path needs are surfaced; the rest of the
//! header (free-block pool bookkeeping, opaque region) stays reserved bytes.
//!
//! ## Layout
//!
//! ```text
//! Offset  Size  Description
//! 0       32    Magic: "ToKyO CaBiNeT\n" plus version text
//! 32      1     Database type (0x00 = hash)
//! 33      1     Additional flags
//! 34      1     Alignment power (record offsets are stored >> apow)
//! 35      1     Free block pool power
//! 36      1     Options (bit 0: wide, 8-byte bucket entries and offsets)
//! 37      3     Padding
//! 40      8     Bucket count (little-endian)
//! 48      8     Record count (little-endian)
//! 56      8     File size (little-endian)
//! 64      8     Offset of the first record (little-endian)
//! 72      184   Free block bookkeeping and opaque region
//! ```

use zerocopy::little_endian::U64;
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

use crate::error::{Error, Result};

pub const HEADER_SIZE: usize = 256;
pub const MAGIC_PREFIX: &[u8] = b"ToKyO CaBiNeT\n";
pub const BUCKET_ARRAY_OFFSET: usize = HEADER_SIZE;

pub const DBTYPE_HASH: u8 = 0x00;

/// Options bit: bucket entries and chain offsets are 8 bytes wide.
pub const OPT_WIDE: u8 = 0x01;

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
pub struct ShardHeader {
    magic: [u8; 32],
    dbtype: u8,
    flags: u8,
    apow: u8,
    fpow: u8,
    opts: u8,
    _pad: [u8; 3],
    bucket_count: U64,
    record_count: U64,
    file_size: U64,
    first_record: U64,
    _reserved: [u8; 184],
}

const _: () = assert!(std::mem::size_of::<ShardHeader>() == HEADER_SIZE);

impl ShardHeader {
    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::corrupt(format!(
                "shard header truncated: {} bytes",
                bytes.len()
            )));
        }

        let header = Self::ref_from_bytes(&bytes[..HEADER_SIZE])
            .map_err(|_| Error::corrupt("shard header is not readable"))?;

        if !header.magic.starts_with(MAGIC_PREFIX) {
            return Err(Error::corrupt("shard file magic mismatch"));
        }
        if header.dbtype != DBTYPE_HASH {
            return Err(Error::corrupt(format!(
                "shard is not a hash database (type {:#04x})",
                header.dbtype
            )));
        }
        if header.bucket_count.get() == 0 {
            return Err(Error::corrupt("shard declares zero buckets"));
        }

        Ok(header)
    }

    pub fn apow(&self) -> u8 {
        self.apow
    }

    pub fn wide(&self) -> bool {
        self.opts & OPT_WIDE != 0
    }

    pub fn bucket_count(&self) -> u64 {
        self.bucket_count.get()
    }

    pub fn record_count(&self) -> u64 {
        self.record_count.get()
    }

    pub fn file_size(&self) -> u64 {
        self.file_size.get()
    }

    pub fn first_record(&self) -> u64 {
        self.first_record.get()
    }
}
