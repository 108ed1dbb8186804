//! Fixture builders for the integration tests: a minimal writer for the
//! hash-table shard format, LZF frame and gzip helpers, and a profile
//! writer. Everything here exists to build miniature corpora under a
//! tempdir; the library itself has no write surface.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

const HEADER_SIZE: usize = 256;
const MAGIC_PREFIX: &[u8] = b"ToKyO CaBiNeT\n";
const RECORD_MAGIC: u8 = 0xc8;

/// Builds one hash-table shard file: 256-byte header, bucket array of
/// 4-byte offsets (alignment power zero), records chained as binary trees
/// in the same order the reader descends them.
pub struct TchBuilder {
    bucket_count: u64,
    entries: Vec<(Vec<u8>, Vec<u8>)>,
}

impl TchBuilder {
    pub fn new(bucket_count: u64) -> Self {
        Self {
            bucket_count,
            entries: Vec::new(),
        }
    }

    pub fn insert(mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    pub fn write(&self, path: &Path) {
        let bnum = self.bucket_count as usize;
        let bucket_end = HEADER_SIZE + bnum * 4;
        let mut buf = vec![0u8; bucket_end];

        buf[..MAGIC_PREFIX.len()].copy_from_slice(MAGIC_PREFIX);
        buf[32] = 0x00; // hash database
        buf[34] = 0; // apow: offsets stored unshifted
        buf[35] = 10; // fpow, unused by the read path
        buf[36] = 0x00; // narrow: 4-byte bucket entries
        buf[40..48].copy_from_slice(&self.bucket_count.to_le_bytes());
        buf[48..56].copy_from_slice(&(self.entries.len() as u64).to_le_bytes());
        buf[64..72].copy_from_slice(&(bucket_end as u64).to_le_bytes());

        for (key, value) in &self.entries {
            let off = buf.len() as u32;
            append_record(&mut buf, key, value);
            link_record(&mut buf, self.bucket_count, key, off);
        }

        let file_size = buf.len() as u64;
        buf[56..64].copy_from_slice(&file_size.to_le_bytes());

        fs::write(path, &buf).unwrap();
    }
}

fn append_record(buf: &mut Vec<u8>, key: &[u8], value: &[u8]) {
    let (_, hash) = bucket_hashes(key, 1);
    buf.push(RECORD_MAGIC);
    buf.push(hash);
    buf.extend_from_slice(&0u32.to_le_bytes()); // left child
    buf.extend_from_slice(&0u32.to_le_bytes()); // right child
    buf.extend_from_slice(&0u16.to_le_bytes()); // padding size
    push_vnum(buf, key.len() as u64);
    push_vnum(buf, value.len() as u64);
    buf.extend_from_slice(key);
    buf.extend_from_slice(value);
}

/// Attaches a freshly appended record into its bucket's tree, taking the
/// same branches the reader's descent takes.
fn link_record(buf: &mut [u8], bucket_count: u64, key: &[u8], off: u32) {
    let (bucket, hash) = bucket_hashes(key, bucket_count);
    let slot = HEADER_SIZE + bucket as usize * 4;

    let head = u32::from_le_bytes(buf[slot..slot + 4].try_into().unwrap());
    if head == 0 {
        buf[slot..slot + 4].copy_from_slice(&off.to_le_bytes());
        return;
    }

    let mut cur = head as usize;
    loop {
        let cur_hash = buf[cur + 1];
        let go_left = if hash != cur_hash {
            hash > cur_hash
        } else {
            match key_order(key, record_key(buf, cur)) {
                std::cmp::Ordering::Greater => true,
                std::cmp::Ordering::Less => false,
                std::cmp::Ordering::Equal => panic!("duplicate key in fixture shard"),
            }
        };

        let field = if go_left { cur + 2 } else { cur + 6 };
        let child = u32::from_le_bytes(buf[field..field + 4].try_into().unwrap());
        if child == 0 {
            buf[field..field + 4].copy_from_slice(&off.to_le_bytes());
            return;
        }
        cur = child as usize;
    }
}

fn record_key<'a>(buf: &'a [u8], off: usize) -> &'a [u8] {
    let mut pos = off + 12; // magic, hash, left, right, padding size
    let (ksiz, step) = read_vnum(buf, pos);
    pos += step;
    let (_, step) = read_vnum(buf, pos);
    pos += step;
    &buf[pos..pos + ksiz as usize]
}

fn push_vnum(buf: &mut Vec<u8>, mut num: u64) {
    if num == 0 {
        buf.push(0);
        return;
    }
    while num > 0 {
        let rem = (num & 0x7f) as u8;
        num >>= 7;
        if num > 0 {
            buf.push((-(rem as i8 as i16) - 1) as i8 as u8);
        } else {
            buf.push(rem);
        }
    }
}

fn read_vnum(buf: &[u8], start: usize) -> (u64, usize) {
    let mut num: u64 = 0;
    let mut base: u64 = 1;
    let mut i = start;
    loop {
        let byte = buf[i] as i8;
        if byte >= 0 {
            num += u64::from(byte as u8) * base;
            return (num, i - start + 1);
        }
        num += base * (-(i64::from(byte) + 1)) as u64;
        base <<= 7;
        i += 1;
    }
}

/// Primary bucket index and one-byte secondary hash, mirroring the shard
/// format's key placement.
fn bucket_hashes(key: &[u8], bucket_count: u64) -> (u64, u8) {
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

fn key_order(a: &[u8], b: &[u8]) -> std::cmp::Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Wraps bytes in an LZF frame: compressed with a 1- or 2-byte length
/// header when LZF can shrink it, a literal zero-prefixed frame otherwise.
pub fn lzf_frame(data: &[u8]) -> Vec<u8> {
    if let Ok(compressed) = lzf::compress(data) {
        if data.len() < 128 {
            let mut framed = vec![data.len() as u8];
            framed.extend_from_slice(&compressed);
            return framed;
        }
        if data.len() < 2048 {
            let mut framed = vec![
                0xc0 | (data.len() >> 6) as u8,
                0x80 | (data.len() & 0x3f) as u8,
            ];
            framed.extend_from_slice(&compressed);
            return framed;
        }
    }
    let mut framed = vec![0u8];
    framed.extend_from_slice(data);
    framed
}

/// Gzips a byte string the way text-list spill files are stored.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Writes a profile document and returns its path.
pub fn write_profile(dir: &Path, profile: &serde_json::Value) -> PathBuf {
    let path = dir.join("wocprofile.json");
    fs::write(&path, serde_json::to_vec_pretty(profile).unwrap()).unwrap();
    path
}

/// Decodes a 40-char hex string into its 20 raw bytes.
pub fn raw_hash(hex_str: &str) -> Vec<u8> {
    hex::decode(hex_str).unwrap()
}
