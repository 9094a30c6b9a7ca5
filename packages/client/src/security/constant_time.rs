//! Salted constant-time string comparison

use ring::digest::{Context as DigestContext, SHA256};
use subtle::ConstantTimeEq;

use crate::crypto::generate_salt;

/// Compare two byte strings without leaking the length of their common
/// prefix through timing.
///
/// Both operands are prefixed with the same fresh random salt and hashed
/// with SHA-256; the fixed-size digests are then compared with a
/// constant-time byte comparison. Operands of different lengths simply
/// produce different digests.
#[must_use]
pub fn salted_eq(a: &[u8], b: &[u8]) -> bool {
    let salt = generate_salt();
    let digest_a = salted_digest(&salt, a);
    let digest_b = salted_digest(&salt, b);
    digest_a.as_ref().ct_eq(digest_b.as_ref()).into()
}

/// [`salted_eq`] over UTF-8 strings.
#[must_use]
pub fn salted_str_eq(a: &str, b: &str) -> bool {
    salted_eq(a.as_bytes(), b.as_bytes())
}

fn salted_digest(salt: &[u8], value: &[u8]) -> ring::digest::Digest {
    let mut ctx = DigestContext::new(&SHA256);
    ctx.update(salt);
    ctx.update(value);
    ctx.finish()
}
