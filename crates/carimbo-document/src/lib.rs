// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// carimbo-document — Document processing for the Carimbo contract stamper.
//
// Normalizes raster uploads, assembles or parses PDFs, stamps every page with
// the institutional footer and recovers uploads that do not parse. The
// `ContractProcessor` ties these into the two upload paths.

pub mod image;
pub mod layout;
pub mod pdf;
pub mod pipeline;
pub mod recovery;
pub mod stamp;

#[cfg(test)]
mod test_support;

// Re-export the primary structs so callers can use `carimbo_document::ContractProcessor` etc.
pub use image::{ImageNormalizer, NormalizedImage};
pub use pdf::{DraftDocument, LoadOutcome, MutableDocument, PageWriter, SealedDocument};
pub use pipeline::ContractProcessor;
pub use stamp::{StampCompositor, StampText};
