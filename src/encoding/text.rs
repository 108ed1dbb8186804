//! # Text Decoding
//!
//! Corpus values carry text from two decades of repositories in whatever
//! encoding their authors used. The observable contract for turning value
//! bytes into `String` is: strict UTF-8 first; on failure, detect the
//! charset and decode with replacement characters for residual errors.
//!
//! Commit objects may additionally declare their own encoding in an
//! `encoding` header line; [`decode_with_label`] honors such labels when
//! the encoding is known, and falls back to detection otherwise.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// Decodes bytes as strict UTF-8, falling back to charset detection with
/// replacement on residual errors.
pub fn decode_str(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            let encoding = detector.guess(None, true);
            let (text, _, _) = encoding.decode(bytes);
            text.into_owned()
        }
    }
}

/// Decodes bytes under a declared encoding label (for example a commit's
/// `encoding` header). Unknown labels degrade to [`decode_str`].
pub fn decode_with_label(bytes: &[u8], label: &str) -> String {
    match Encoding::for_label(label.trim().as_bytes()) {
        Some(encoding) => {
            let (text, _, _) = encoding.decode(bytes);
            text.into_owned()
        }
        None => decode_str(bytes),
    }
}
