//! # LZF Framing
//!
//! Values in the corpus that are LZF-compressed carry a 1 to 5 byte header
//! encoding the uncompressed length, followed by the LZF byte stream. The
//! header is the Perl `Compress::LZF` dialect, which differs from raw
//! liblzf framing in its length bit-layout.
//!
//! ## Header Format
//!
//! The first byte both starts the length and, through its high bits, says
//! how many header bytes follow:
//!
//! ```text
//! 0xxxxxxx                  1 byte,  length = low 7 bits
//! 110xxxxx 10xxxxxx         2 bytes, length = 5 + 6 payload bits
//! 1110xxxx 10xxxxxx ...     3 bytes, length = 4 + 12 payload bits
//! ...                       up to 5 header bytes
//! ```
//!
//! The scan masks the first byte starting at `0x80`; the first shift is by
//! two bits and every later shift by one. This asymmetry is part of the
//! on-disk dialect and is pinned by the header tests below.
//!
//! A first byte of zero is a different animal entirely: it marks a literal
//! frame, and the remaining bytes are the value, uncompressed.
//!
//! ## Fallback Contract
//!
//! Several corpus value kinds are "maybe compressed". [`try_decomp`] encodes
//! that contract: it returns the decompressed bytes when the frame parses,
//! and the input unchanged when it does not. Callers never see a decode
//! error from that path.

use tracing::trace;

use crate::error::{Error, Result};

/// Parses the length header of an LZF frame.
///
/// Returns `(header_len, uncompressed_len)`. Fails with
/// [`Error::DecodeCorrupt`] when the mask is exhausted before the length
/// terminates or when the encoded length is zero.
pub fn lzf_length(raw: &[u8]) -> Result<(usize, usize)> {
    let Some(&lower) = raw.first() else {
        return Err(Error::corrupt("empty LZF frame header"));
    };

    let mut mask: u8 = 0x80;
    let mut start = 1usize;
    while mask != 0 && start < raw.len() && (lower & mask) != 0 {
        mask = if mask == 0x80 { mask >> 2 } else { mask >> 1 };
        start += 1;
    }
    if mask == 0 {
        return Err(Error::corrupt("LZF length header is corrupted"));
    }

    let mut ulen = u64::from(lower & (mask - 1));
    for &byte in &raw[1..start] {
        ulen = (ulen << 6) | u64::from(byte & 0x3f);
    }
    if ulen == 0 {
        return Err(Error::corrupt("LZF length header encodes zero length"));
    }

    Ok((start, ulen as usize))
}

/// Decompresses one framed value.
///
/// Empty input returns empty output; a leading zero byte marks a literal
/// frame whose remainder is returned verbatim. Anything else is a length
/// header followed by an LZF byte stream.
pub fn decomp(raw: &[u8]) -> Result<Vec<u8>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    if raw[0] == 0 {
        return Ok(raw[1..].to_vec());
    }

    let (start, ulen) = lzf_length(raw)?;
    lzf::decompress(&raw[start..], ulen)
        .map_err(|err| Error::corrupt(format!("LZF payload rejected: {:?}", err)))
}

/// Decompresses a "maybe compressed" value, falling back to the input bytes
/// when the frame does not parse or the payload is rejected.
pub fn try_decomp(raw: &[u8]) -> Vec<u8> {
    match decomp(raw) {
        Ok(data) => data,
        Err(_) => {
            trace!(len = raw.len(), "value is not an LZF frame, keeping literal bytes");
            raw.to_vec()
        }
    }
}
