//! # Large-Value Spill Files
//!
//! The hash-table engine has a per-key value limit; values that outgrow it
//! are spilled to standalone files named in the map's `larges` table. Two
//! formats exist:
//!
//! - **Hash lists** (out-dtype `h`): raw file whose first 20 bytes are a
//!   SHA1 of the remainder; the remainder is the concatenated hash list.
//! - **Text lists** (everything else): a gzip stream whose decompressed
//!   form may start with a one-line header. The header is dropped when its
//!   newline falls within the first 256 bytes; otherwise the whole payload
//!   is the value.
//!
//! Spilled text is stored uncompressed inside the gzip stream, so a `cs`
//! map degrades to `s` decoding on this path (the caller applies that
//! rule). Spill files are opened per call and closed on return; only
//! hash-table handles are pooled.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use memchr::memchr;
use tracing::debug;

use crate::config::{LARGE_HASH_HEADER_LEN, LARGE_HEADER_SCAN};
use crate::error::{Error, Result};
use crate::profile::OutDType;

/// Reads one spilled value, returning the decodable payload bytes.
pub fn read_large(path: &Path, out_dtype: &OutDType) -> Result<Vec<u8>> {
    debug!(path = %path.display(), dtype = out_dtype.tag(), "reading spilled value");
    match out_dtype {
        OutDType::Hashes => read_hash_list(path),
        _ => read_text_list(path),
    }
}

fn read_hash_list(path: &Path) -> Result<Vec<u8>> {
    let mut data = fs::read(path)?;
    if data.len() < LARGE_HASH_HEADER_LEN {
        return Err(Error::corrupt(format!(
            "hash-list spill {} shorter than its content hash",
            path.display()
        )));
    }
    data.drain(..LARGE_HASH_HEADER_LEN);
    Ok(data)
}

fn read_text_list(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut payload = Vec::new();
    GzDecoder::new(file).read_to_end(&mut payload)?;

    let window = &payload[..payload.len().min(LARGE_HEADER_SCAN)];
    match memchr(b'\n', window) {
        Some(newline) => Ok(payload.split_off(newline + 1)),
        None => Ok(payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn write_gzip(path: &Path, content: &[u8]) {
        let file = File::create(path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(content).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn hash_list_skips_content_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a2c.large");
        let mut content = vec![0xaa; 20];
        content.extend_from_slice(&[0x11; 20]);
        content.extend_from_slice(&[0x22; 20]);
        fs::write(&path, &content).unwrap();

        let payload = read_large(&path, &OutDType::Hashes).unwrap();
        assert_eq!(payload.len(), 40);
        assert_eq!(&payload[..20], &[0x11; 20]);
    }

    #[test]
    fn hash_list_of_only_header_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a2c.large");
        fs::write(&path, [0xaa; 20]).unwrap();

        let payload = read_large(&path, &OutDType::Hashes).unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn truncated_hash_list_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a2c.large");
        fs::write(&path, [0xaa; 7]).unwrap();

        assert!(matches!(
            read_large(&path, &OutDType::Hashes),
            Err(Error::DecodeCorrupt { .. })
        ));
    }

    #[test]
    fn text_list_drops_header_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("P2c.large");
        write_gzip(&path, b"header line\nalpha;beta;gamma");

        let payload = read_large(&path, &OutDType::Strings).unwrap();
        assert_eq!(payload, b"alpha;beta;gamma");
    }

    #[test]
    fn text_list_without_early_newline_returns_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("P2c.large");
        let content = vec![b'x'; 400];
        write_gzip(&path, &content);

        let payload = read_large(&path, &OutDType::Strings).unwrap();
        assert_eq!(payload, content);
    }

    #[test]
    fn newline_outside_scan_window_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("P2c.large");
        let mut content = vec![b'x'; 300];
        content.push(b'\n');
        content.extend_from_slice(b"tail");
        write_gzip(&path, &content);

        let payload = read_large(&path, &OutDType::Strings).unwrap();
        assert_eq!(payload, content);
    }
}
