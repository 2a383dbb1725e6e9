// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// carimbo-security — Content fingerprints for tamper evidence.
//
// Every hash that ends up in a stamp or in the document registry is produced
// here, so the digest algorithm and its textual form live in one place.

pub mod integrity;

pub use integrity::{is_sha256_hex, sha256_hex, verify_hash};
