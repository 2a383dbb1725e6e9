// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sealed documents — serialized PDF bytes that can no longer be edited in place.

use carimbo_core::error::CarimboError;
use carimbo_security::sha256_hex;

use super::reader::MutableDocument;

/// A serialized PDF. Immutable by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedDocument {
    bytes: Vec<u8>,
}

impl SealedDocument {
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// SHA-256 of the serialized bytes.
    pub fn sha256(&self) -> String {
        sha256_hex(&self.bytes)
    }

    /// Parse the sealed bytes into a new, independent mutable document.
    ///
    /// These bytes were produced by this crate, so a parse failure here is an
    /// internal error rather than bad input.
    pub fn reopen(&self) -> Result<MutableDocument, CarimboError> {
        MutableDocument::parse(&self.bytes).map_err(|err| {
            CarimboError::Processing(format!("sealed document does not reparse: {}", err))
        })
    }
}
