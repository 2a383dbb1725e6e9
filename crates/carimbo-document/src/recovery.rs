// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corrupted-document recovery — a single replacement page that records why
// the upload could not be used and which bytes were received.

use carimbo_core::PageGeometry;
use tracing::{instrument, warn};

use crate::pdf::{DraftDocument, PageWriter};
use crate::pdf::writer::TextBlock;
use crate::stamp::text::{sanitize_text, wrap_to_width};

/// Where the notice is drawn on the replacement page.
pub const NOTICE_BLOCK: TextBlock = TextBlock {
    x: 50.0,
    y: 700.0,
    font_size: 12.0,
    line_height: 16.0,
};

/// The notice text, Portuguese first, then English. Blank strings are
/// paragraph gaps.
pub fn notice_lines(hash_original: &str) -> Vec<String> {
    let hash = sanitize_text(hash_original);
    vec![
        "DOCUMENTO RECONSTRUIDO / RECONSTRUCTED DOCUMENT".to_string(),
        String::new(),
        "O arquivo original nao pode ser processado devido a corrupcao ou formato invalido."
            .to_string(),
        "Este PDF foi reconstruido para preservar a integridade do sistema.".to_string(),
        String::new(),
        "The original file could not be processed because it is corrupted or not a valid PDF."
            .to_string(),
        "This PDF was rebuilt to preserve the integrity of the record.".to_string(),
        String::new(),
        "Hash SHA-256 do arquivo original / of the original file:".to_string(),
        hash,
        String::new(),
        "Para verificar a autenticidade, entre em contato com a ILPI.".to_string(),
        "To verify authenticity, contact the institution.".to_string(),
    ]
}

/// Build the one-page replacement document for an unparseable upload.
///
/// Lines are wrapped to the page width minus the notice's left offset on
/// both sides.
#[instrument(skip_all, fields(hash_original = %hash_original))]
pub fn recovery_draft(
    writer: &PageWriter,
    geometry: &PageGeometry,
    hash_original: &str,
) -> DraftDocument {
    warn!("Rebuilding unparseable upload as a notice page");

    let max_width = geometry.page_width - 2.0 * NOTICE_BLOCK.x;
    let lines: Vec<String> = notice_lines(hash_original)
        .iter()
        .flat_map(|line| {
            if line.is_empty() {
                vec![String::new()]
            } else {
                wrap_to_width(line, NOTICE_BLOCK.font_size, max_width)
            }
        })
        .collect();

    writer.text_page(&lines, NOTICE_BLOCK)
}
