// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Carimbo.

use thiserror::Error;

/// Top-level error type for all Carimbo operations.
#[derive(Debug, Error)]
pub enum CarimboError {
    // -- Input errors --
    #[error("image decode failed: {0}")]
    ImageDecode(String),

    /// Never escapes the orchestrator: an unparseable PDF is rerouted to
    /// corrupted-document recovery.
    #[error("PDF parse failed: {0}")]
    PdfParse(String),

    // -- Output errors --
    #[error("stamp composition failed: {0}")]
    StampComposition(String),

    #[error("processing failed: {0}")]
    Processing(String),

    // -- Integrity --
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CarimboError>;
