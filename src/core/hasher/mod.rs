//! # Hasher Module
//!
//! Computes the MD5 content hash used both as a change-detection key and
//! a display value.
//!
//! The hash is content-addressed: identical bytes always produce the same
//! hash, regardless of which photo identity they came from. It is rendered
//! as lowercase hex so it can live in the string cache as-is.

use md5::{Digest, Md5};

/// Compute the lowercase-hex MD5 digest of a photo's full byte content.
pub fn md5_hex(bytes: &[u8]) -> String {
    format!("{:x}", Md5::digest(bytes))
}
