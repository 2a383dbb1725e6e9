// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document integrity — SHA-256 hashing for tamper detection.

use carimbo_core::error::CarimboError;
use sha2::{Digest, Sha256};
use tracing::warn;

/// Length of a SHA-256 digest rendered as hex.
pub const SHA256_HEX_LEN: usize = 64;

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
///
/// Used for both fingerprints of a processed contract: the untouched upload
/// and the pre-stamp serialization. Defined for every byte sequence,
/// including the empty one.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// True when `value` has the shape of a SHA-256 hex digest (any case).
pub fn is_sha256_hex(value: &str) -> bool {
    value.len() == SHA256_HEX_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Verify that `data` matches the expected SHA-256 hex digest.
///
/// The expected value is compared case-insensitively, since registries and
/// people copying from a stamp do not always preserve case. Returns
/// `Err(CarimboError::IntegrityMismatch)` with both values on mismatch.
pub fn verify_hash(data: &[u8], expected_hex: &str) -> Result<(), CarimboError> {
    let actual = sha256_hex(data);
    if actual.eq_ignore_ascii_case(expected_hex.trim()) {
        Ok(())
    } else {
        warn!(expected = expected_hex, %actual, "hash mismatch");
        Err(CarimboError::IntegrityMismatch {
            expected: expected_hex.to_owned(),
            actual,
        })
    }
}
