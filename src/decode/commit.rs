//! # Commit Object Decoder
//!
//! A commit body is a header and a message separated by the first blank
//! line. The header is walked line by line; each line splits on its first
//! space into a key and a value. Keys the corpus cares about are `tree`,
//! `parent` (repeatable, order preserved), `author`, `committer`, `gpgsig`
//! (which opens a signature block skipped until its end marker), and
//! `encoding` (which selects the charset for identities and the message).
//!
//! ## Identity Lines
//!
//! An `author` or `committer` value ends in `... name <email> SP timestamp
//! SP timezone`. The name may itself contain spaces, so the split runs
//! right to left: the last space starts the timezone, the space before it
//! starts the timestamp, and everything earlier is the identity. A line
//! with fewer than two trailing fields is skipped and the identity stays
//! empty; no stricter validation is applied.
//!
//! Identity bytes stay undecoded until the whole header has been read,
//! because the `encoding` line may come after them.

use memchr::{memchr, memmem, memrchr};
use smallvec::SmallVec;

use crate::encoding::{decode_str, decode_with_label};
use crate::error::{Error, Result};

/// An author or committer stamp. All fields are empty when the header line
/// was missing or malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub identity: String,
    pub timestamp: String,
    pub timezone: String,
}

/// A decoded commit object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub tree: String,
    pub parents: SmallVec<[String; 1]>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

const PGP_END: &[u8] = b"-----END PGP SIGNATURE-----";

/// Decodes a commit object body.
pub fn decode_commit(data: &[u8]) -> Result<Commit> {
    if data.is_empty() {
        return Err(Error::corrupt("empty commit object"));
    }
    let split = memmem::find(data, b"\n\n")
        .ok_or_else(|| Error::corrupt("commit has no header/message separator"))?;
    let header = &data[..split];
    let message_raw = &data[split + 2..];

    let mut tree = String::new();
    let mut parents = SmallVec::new();
    let mut author_raw: Option<(&[u8], &[u8], &[u8])> = None;
    let mut committer_raw: Option<(&[u8], &[u8], &[u8])> = None;
    let mut encoding: Option<String> = None;
    let mut in_pgp = false;

    for line in header.split(|&byte| byte == b'\n') {
        if in_pgp {
            if line == PGP_END {
                in_pgp = false;
            }
            continue;
        }
        let Some(space) = memchr(b' ', line) else {
            continue;
        };
        let (key, value) = (&line[..space], &line[space + 1..]);
        match key {
            b"tree" => tree = decode_str(value),
            b"parent" => parents.push(decode_str(value)),
            b"author" => author_raw = split_identity(value),
            b"committer" => committer_raw = split_identity(value),
            b"gpgsig" => in_pgp = true,
            b"encoding" => encoding = Some(decode_str(value)),
            _ => {}
        }
    }

    let decode = |bytes: &[u8]| match &encoding {
        Some(label) => decode_with_label(bytes, label),
        None => decode_str(bytes),
    };

    Ok(Commit {
        tree,
        parents,
        author: to_signature(author_raw, &decode),
        committer: to_signature(committer_raw, &decode),
        message: decode(message_raw),
    })
}

/// Right-to-left split of an identity value into
/// `(identity, timestamp, timezone)`. `None` when fewer than two spaces
/// remain, in which case the caller leaves the signature empty.
fn split_identity(value: &[u8]) -> Option<(&[u8], &[u8], &[u8])> {
    let tz_space = memrchr(b' ', value)?;
    let ts_space = memrchr(b' ', &value[..tz_space])?;
    Some((
        &value[..ts_space],
        &value[ts_space + 1..tz_space],
        &value[tz_space + 1..],
    ))
}

fn to_signature(
    raw: Option<(&[u8], &[u8], &[u8])>,
    decode: &impl Fn(&[u8]) -> String,
) -> Signature {
    match raw {
        Some((identity, timestamp, timezone)) => Signature {
            identity: decode(identity),
            timestamp: decode_str(timestamp),
            timezone: decode_str(timezone),
        },
        None => Signature::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"tree f1b66dcca490b5c4455af319bc961a34f69c72c2\n\
parent c19ff598808b181f1ab2383ff0214520cb3ec659\n\
author Audris Mockus <audris@utk.edu> 1410029988 -0400\n\
committer Audris Mockus <audris@utk.edu> 1410029988 -0400\n\n\
News for Sep 5, 2014\n";

    #[test]
    fn decodes_single_parent_commit() {
        let commit = decode_commit(SAMPLE).unwrap();
        assert_eq!(commit.tree, "f1b66dcca490b5c4455af319bc961a34f69c72c2");
        assert_eq!(
            commit.parents.as_slice(),
            ["c19ff598808b181f1ab2383ff0214520cb3ec659"]
        );
        assert_eq!(
            commit.author,
            Signature {
                identity: "Audris Mockus <audris@utk.edu>".to_owned(),
                timestamp: "1410029988".to_owned(),
                timezone: "-0400".to_owned(),
            }
        );
        assert_eq!(commit.committer, commit.author);
        assert_eq!(commit.message, "News for Sep 5, 2014\n");
    }

    #[test]
    fn commit_without_parents() {
        let data = b"tree f1b66dcca490b5c4455af319bc961a34f69c72c2\n\
author A <a@b.c> 1 +0000\n\
committer A <a@b.c> 1 +0000\n\ninitial\n";
        let commit = decode_commit(data).unwrap();
        assert!(commit.parents.is_empty());
        assert_eq!(commit.message, "initial\n");
    }

    #[test]
    fn merge_commit_keeps_parent_order() {
        let data = b"tree f1b66dcca490b5c4455af319bc961a34f69c72c2\n\
parent 1111111111111111111111111111111111111111\n\
parent 2222222222222222222222222222222222222222\n\
parent 3333333333333333333333333333333333333333\n\
author A <a@b.c> 1 +0000\n\
committer A <a@b.c> 1 +0000\n\nthree-way merge\n";
        let commit = decode_commit(data).unwrap();
        assert_eq!(
            commit.parents.as_slice(),
            [
                "1111111111111111111111111111111111111111",
                "2222222222222222222222222222222222222222",
                "3333333333333333333333333333333333333333",
            ]
        );
    }

    #[test]
    fn empty_input_is_corrupt() {
        assert!(matches!(
            decode_commit(b""),
            Err(Error::DecodeCorrupt { .. })
        ));
    }

    #[test]
    fn missing_separator_is_corrupt() {
        assert!(matches!(
            decode_commit(b"tree f1b66dcca490b5c4455af319bc961a34f69c72c2\n"),
            Err(Error::DecodeCorrupt { .. })
        ));
    }

    #[test]
    fn malformed_identity_line_leaves_signature_empty() {
        let data = b"tree f1b66dcca490b5c4455af319bc961a34f69c72c2\n\
author no-spaces-here\n\
committer A <a@b.c> 1 +0000\n\nmsg";
        let commit = decode_commit(data).unwrap();
        assert_eq!(commit.author, Signature::default());
        assert_eq!(commit.committer.timestamp, "1");
    }

    #[test]
    fn name_with_extra_spaces_splits_right_to_left() {
        let data = b"tree f1b66dcca490b5c4455af319bc961a34f69c72c2\n\
author Dr. Strange  Name <x@y.z> 1410029988 -0400\n\
committer A <a@b.c> 1 +0000\n\nmsg";
        let commit = decode_commit(data).unwrap();
        assert_eq!(commit.author.identity, "Dr. Strange  Name <x@y.z>");
        assert_eq!(commit.author.timestamp, "1410029988");
        assert_eq!(commit.author.timezone, "-0400");
    }

    #[test]
    fn gpgsig_block_is_skipped() {
        let data = b"tree f1b66dcca490b5c4455af319bc961a34f69c72c2\n\
author A <a@b.c> 1 +0000\n\
committer A <a@b.c> 1 +0000\n\
gpgsig -----BEGIN PGP SIGNATURE-----\n\
parent beefbeefbeefbeefbeefbeefbeefbeefbeefbeef\n\
-----END PGP SIGNATURE-----\n\
encoding iso-8859-1\n\nsigned\n";
        let commit = decode_commit(data).unwrap();
        // The fake parent inside the signature block must not be recorded.
        assert!(commit.parents.is_empty());
        assert_eq!(commit.message, "signed\n");
    }

    #[test]
    fn lines_without_spaces_are_ignored() {
        let data = b"tree f1b66dcca490b5c4455af319bc961a34f69c72c2\n\
not-a-header-line\n\
committer A <a@b.c> 1 +0000\n\nmsg";
        let commit = decode_commit(data).unwrap();
        assert_eq!(commit.committer.timezone, "+0000");
    }

    #[test]
    fn declared_encoding_applies_to_identity_and_message() {
        let mut data = b"tree f1b66dcca490b5c4455af319bc961a34f69c72c2\n\
committer A <a@b.c> 1 +0000\n\
encoding iso-8859-1\n".to_vec();
        data.extend_from_slice(b"author Caf\xe9 <c@f.e> 1410029988 -0400\n");
        data.extend_from_slice(b"\ncaf\xe9\n");
        // author line after encoding: ordering within the header must not
        // matter, identities decode once the whole header is read.
        let commit = decode_commit(&data).unwrap();
        assert_eq!(commit.author.identity, "Café <c@f.e>");
        assert_eq!(commit.message, "café\n");
    }

    #[test]
    fn unknown_header_keys_are_ignored() {
        let data = b"tree f1b66dcca490b5c4455af319bc961a34f69c72c2\n\
mergetag object deadbeefdeadbeefdeadbeefdeadbeefdeadbeef\n\
author A <a@b.c> 1 +0000\n\
committer A <a@b.c> 1 +0000\n\nmsg";
        let commit = decode_commit(data).unwrap();
        assert_eq!(commit.tree, "f1b66dcca490b5c4455af319bc961a34f69c72c2");
    }
}
