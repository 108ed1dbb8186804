//! # Value Decoders
//!
//! A fetched value is a byte string; what it *means* is dictated by the
//! map's out-dtype tag. This module lifts raw bytes into [`Value`], the sum
//! of every logical shape the corpus stores:
//!
//! | Tag   | Decoded form                                         |
//! |-------|------------------------------------------------------|
//! | `h`   | ordered hashes, rendered as lowercase hex            |
//! | `s`   | `;`-separated strings                                |
//! | `cs`  | LZF-framed strings; empties and `EMPTY` dropped      |
//! | `cs3` | LZF-framed fields grouped into consecutive triples   |
//! | `sh`  | one `(time, author, hash)` record                    |
//! | `r`   | stacked-blob pointer, surfaced as `(hash, length)`   |
//! | `c?`  | raw bytes, decoded by the object decoders downstream |
//!
//! Tree and commit objects have their own decoders in [`tree`] and
//! [`commit`]; they run under `show_content`, not here.
//!
//! ## Strictness
//!
//! These decoders are strict: a trailing partial hash, a field count that
//! does not divide into triples, or a short `sh` record all fail with
//! `DecodeCorrupt`. The lenient "maybe compressed" fallback lives one layer
//! up, in [`crate::encoding::try_decomp`], and only applies to object
//! payloads.

pub mod commit;
pub mod tree;

use crate::config::HASH_RAW_LEN;
use crate::encoding::{decode_str, decomp, unber};
use crate::error::{Error, Result};
use crate::profile::OutDType;

pub use commit::{decode_commit, Commit, Signature};
pub use tree::{decode_tree, TreeEntry};

/// A decoded mapping value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Tag `h`: hashes in stored order, as lowercase hex.
    Hashes(Vec<String>),
    /// Tags `s` and `cs`: strings in stored order.
    Strings(Vec<String>),
    /// Tag `cs3`: consecutive field triples.
    Triples(Vec<(String, String, String)>),
    /// Tag `sh`: a single timestamped author record.
    TimeAuthor {
        time: String,
        author: String,
        hash: String,
    },
    /// Tag `r`: a stacked-blob pointer (hash hex and stored length).
    Pointer { hash: String, length: u64 },
    /// Tag `c?`: undecoded bytes for the object decoders.
    Raw(Vec<u8>),
}

/// Decodes value bytes under an out-dtype tag.
pub fn decode_value(value: &[u8], out_dtype: &OutDType) -> Result<Value> {
    match out_dtype {
        OutDType::Hashes => decode_hashes(value),
        OutDType::Strings => Ok(Value::Strings(split_strings(value, false))),
        OutDType::CompStrings => {
            let raw = decomp(value)?;
            Ok(Value::Strings(split_strings(&raw, true)))
        }
        OutDType::CompTriples => {
            let raw = decomp(value)?;
            decode_triples(&raw)
        }
        OutDType::TimeAuthorHash => decode_time_author(value),
        OutDType::BlobPointer => decode_pointer(value),
        OutDType::Raw => Ok(Value::Raw(value.to_vec())),
        OutDType::Reserved(tag) => Err(Error::unsupported(format!("value dtype {}", tag))),
    }
}

fn decode_hashes(value: &[u8]) -> Result<Value> {
    if value.len() % HASH_RAW_LEN != 0 {
        return Err(Error::corrupt(format!(
            "hash list length {} is not a multiple of {}",
            value.len(),
            HASH_RAW_LEN
        )));
    }
    Ok(Value::Hashes(
        value.chunks_exact(HASH_RAW_LEN).map(hex::encode).collect(),
    ))
}

/// Splits on `;`. The compressed variant drops empty fragments and the
/// literal `EMPTY` placeholder; the plain variant keeps everything.
fn split_strings(raw: &[u8], drop_empties: bool) -> Vec<String> {
    raw.split(|&byte| byte == b';')
        .filter(|fragment| !drop_empties || (!fragment.is_empty() && *fragment != b"EMPTY"))
        .map(decode_str)
        .collect()
}

fn decode_triples(raw: &[u8]) -> Result<Value> {
    let text = decode_str(raw);
    let fields: Vec<&str> = text.split(';').collect();
    if fields.len() % 3 != 0 {
        return Err(Error::corrupt(format!(
            "field count {} does not group into triples",
            fields.len()
        )));
    }
    Ok(Value::Triples(
        fields
            .chunks_exact(3)
            .map(|triple| {
                (
                    triple[0].to_owned(),
                    triple[1].to_owned(),
                    triple[2].to_owned(),
                )
            })
            .collect(),
    ))
}

fn decode_time_author(value: &[u8]) -> Result<Value> {
    if value.len() < HASH_RAW_LEN + 1 {
        return Err(Error::corrupt("record too short for time;author + hash"));
    }
    // One separator byte sits between the text prefix and the hash tail.
    let prefix = &value[..value.len() - HASH_RAW_LEN - 1];
    let tail = &value[value.len() - HASH_RAW_LEN..];

    let text = decode_str(prefix);
    let mut fields = text.split(';');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(time), Some(author), None) => Ok(Value::TimeAuthor {
            time: time.to_owned(),
            author: author.to_owned(),
            hash: hex::encode(tail),
        }),
        _ => Err(Error::corrupt("expected exactly two fields before hash")),
    }
}

fn decode_pointer(value: &[u8]) -> Result<Value> {
    if value.len() < HASH_RAW_LEN {
        return Err(Error::corrupt("pointer record shorter than its hash"));
    }
    let offsets = unber(&value[HASH_RAW_LEN..])?;
    if offsets.len() != 2 {
        return Err(Error::corrupt(format!(
            "pointer record packs {} integers, expected 2",
            offsets.len()
        )));
    }
    Ok(Value::Pointer {
        hash: hex::encode(&value[..HASH_RAW_LEN]),
        length: offsets[1],
    })
}
