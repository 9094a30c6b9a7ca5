//! Random number generation utilities

use rand::Rng;

/// Length of the salt prepended to each operand of a salted comparison.
pub const SALT_LEN: usize = 20;

/// Generate boundary string for multipart forms
#[must_use]
pub fn generate_boundary() -> String {
    let mut rng = rand::rng();
    format!("----diagreport-{:016x}{:016x}", rng.random::<u64>(), rng.random::<u64>())
}

/// Fresh salt from the thread-local CSPRNG.
#[must_use]
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill(&mut salt[..]);
    salt
}
