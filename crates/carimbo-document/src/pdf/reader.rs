// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — parse existing PDF bytes into an editable page sequence using
// the `lopdf` crate.

use std::panic::{self, AssertUnwindSafe};

use lopdf::{Document, ObjectId};
use carimbo_core::error::CarimboError;
use tracing::{debug, info, instrument, warn};

use super::sealed::SealedDocument;

/// Result of trying to load uploaded bytes as a PDF.
///
/// `Unparseable` is an expected outcome, not an error: it routes the upload
/// to corrupted-document recovery.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(MutableDocument),
    Unparseable(String),
}

/// A parsed PDF whose pages may still be edited.
///
/// Wraps `lopdf::Document`. Every page of the source is preserved; editing
/// only ever appends content and resources.
#[derive(Debug)]
pub struct MutableDocument {
    /// The underlying lopdf document.
    document: Document,
}

impl MutableDocument {
    // -- Construction ---------------------------------------------------------

    /// Load uploaded bytes, classifying anything that is not a usable PDF as
    /// `Unparseable`. A container with no pages counts as unusable since it
    /// could not carry a stamp.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn load(data: &[u8]) -> LoadOutcome {
        match Self::parse(data) {
            Ok(document) if document.page_count() == 0 => {
                warn!("PDF parsed but has no pages");
                LoadOutcome::Unparseable("document has no pages".into())
            }
            Ok(document) => {
                info!(pages = document.page_count(), "PDF loaded");
                LoadOutcome::Loaded(document)
            }
            Err(err) => {
                warn!(%err, "PDF could not be parsed");
                LoadOutcome::Unparseable(err.to_string())
            }
        }
    }

    /// Parse PDF bytes held in memory.
    pub(crate) fn parse(data: &[u8]) -> Result<Self, CarimboError> {
        // Uploads are untrusted; a parser panic is reported as a parse failure.
        let parsed = panic::catch_unwind(AssertUnwindSafe(|| Document::load_mem(data)))
            .map_err(|_| CarimboError::PdfParse("PDF parser panicked".into()))?;

        let document = parsed.map_err(|err| {
            CarimboError::PdfParse(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF parsed from bytes");
        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Page object ids in page order.
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.document.get_pages().into_values().collect()
    }

    #[cfg(test)]
    pub(crate) fn document(&self) -> &Document {
        &self.document
    }

    pub(crate) fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    // -- Sealing --------------------------------------------------------------

    /// Serialize the document. The mutable handle is consumed.
    #[instrument(skip_all, fields(pages = self.page_count()))]
    pub fn seal(mut self) -> Result<SealedDocument, CarimboError> {
        let mut output = Vec::new();
        self.document.save_to(&mut output).map_err(|err| {
            CarimboError::Processing(format!("failed to serialise PDF: {}", err))
        })?;

        debug!(output_bytes = output.len(), "PDF sealed");
        Ok(SealedDocument::from_bytes(output))
    }
}
