// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Carimbo contract stamper.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything printed in the institutional stamp.
///
/// Supplied by the upload layer. `hash_final` starts out empty and is filled
/// in by the pipeline once the pre-stamp serialization exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampMetadata {
    /// Name of the institution (ILPI) that owns the contract.
    pub institution_name: String,
    /// Institution tax id (CNPJ), printed as given.
    pub institution_tax_id: String,
    /// Full name of the user who uploaded and validated the document.
    pub uploader_name: String,
    /// Role of the uploader (e.g. "Administrador").
    pub uploader_role: String,
    /// Professional registry (e.g. "COREN-SP 123456"), when the uploader has one.
    pub professional_registry: Option<String>,
    /// Instant of the upload.
    pub uploaded_at: DateTime<Utc>,
    /// Opaque token resolved later by the public verification endpoint.
    pub public_token: String,
    /// SHA-256 of the pre-stamp serialization. Late-bound.
    #[serde(default)]
    pub hash_final: Option<String>,
}

impl StampMetadata {
    /// Copy of this metadata with `hash_final` bound.
    pub fn with_hash_final(&self, hash_final: impl Into<String>) -> Self {
        Self {
            hash_final: Some(hash_final.into()),
            ..self.clone()
        }
    }
}

/// Which branch of the pipeline produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingPath {
    /// A raster upload placed on a fresh A4 page.
    Image,
    /// An existing PDF, stamped page by page.
    Pdf,
    /// The PDF could not be parsed; a single warning page replaced it.
    Recovered,
}

/// Output of one pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedFileResult {
    /// Final stamped PDF, exactly as it should be stored.
    #[serde(skip)]
    pub pdf_bytes: Vec<u8>,
    /// SHA-256 of the untouched upload.
    pub hash_original: String,
    /// SHA-256 of the pre-stamp serialization (the value printed in the stamp).
    pub hash_final: String,
    /// Number of pages in `pdf_bytes`.
    pub page_count: usize,
    pub path: ProcessingPath,
}

/// Kind of upload, decided from its declared MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    Image,
    Pdf,
}

impl InputKind {
    /// `image/*` uploads go through the raster path; everything else is
    /// treated as a PDF (and recovered if it is not one).
    pub fn from_mime(mime: &str) -> Self {
        if mime.trim().to_ascii_lowercase().starts_with("image/") {
            Self::Image
        } else {
            Self::Pdf
        }
    }
}
