//! # Encoding Module
//!
//! The leaf primitives of the query engine:
//!
//! - **BER-like integer streams**: continuation-bit varints, MSB first
//! - **FNV-1a**: 32-bit hash for shard routing of string keys
//! - **LZF framing**: the Perl-dialect length header over LZF payloads
//! - **Text decoding**: strict UTF-8 with charset-detection fallback
//!
//! Everything here is pure and allocation-light; the decoders in
//! [`crate::decode`] compose these over borrowed value slices.

pub mod ber;
pub mod fnv;
pub mod lzf;
pub mod text;

pub use self::ber::{ber, unber};
pub use self::fnv::fnvhash;
pub use self::lzf::{decomp, lzf_length, try_decomp};
pub use self::text::{decode_str, decode_with_label};
