// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stamp text — the four footer lines, sanitized for the standard Helvetica
// font, and Helvetica metrics for wrapping them.
//
//   ILPI: <institution> | CNPJ: <tax id>
//   Validado por: <name> - <role>[ (<registry>)] | <dd/mm/yyyy hh:mm:ss> (UTC-3)
//   SHA-256: <first 16>...<last 16>
//   Validar: <base url>/<token>

use chrono::FixedOffset;
use carimbo_core::error::CarimboError;
use carimbo_core::{ProcessingConfig, StampMetadata};
use unicode_normalization::UnicodeNormalization;

/// Shown in place of the hash while it is not yet bound.
pub const HASH_PLACEHOLDER: &str = "CALCULANDO...";

/// Length of a full SHA-256 hex digest.
const FULL_HASH_CHARS: usize = 64;

/// Characters kept from each end of a full digest.
const HASH_PREVIEW_CHARS: usize = 16;

/// Helvetica advance widths (1/1000 em) for ' ' (0x20) through '~' (0x7E).
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// The composed footer: exactly four logical lines of printable ASCII.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampText {
    lines: [String; 4],
}

impl StampText {
    /// Build the footer for `metadata` using the URL and clock settings in
    /// `config`. Every dynamic field is sanitized.
    pub fn compose(
        metadata: &StampMetadata,
        config: &ProcessingConfig,
    ) -> Result<Self, CarimboError> {
        let institution = sanitize_text(&metadata.institution_name);
        let tax_id = sanitize_text(&metadata.institution_tax_id);
        let uploader = sanitize_text(&metadata.uploader_name);
        let role = sanitize_text(&metadata.uploader_role);
        let registry_part = metadata
            .professional_registry
            .as_deref()
            .map(sanitize_text)
            .filter(|registry| !registry.trim().is_empty())
            .map(|registry| format!(" ({registry})"))
            .unwrap_or_default();

        let offset = FixedOffset::east_opt(config.utc_offset_hours * 3600).ok_or_else(|| {
            CarimboError::StampComposition(format!(
                "invalid UTC offset: {}h",
                config.utc_offset_hours
            ))
        })?;
        let timestamp = metadata
            .uploaded_at
            .with_timezone(&offset)
            .format("%d/%m/%Y %H:%M:%S");

        let hash = metadata
            .hash_final
            .as_deref()
            .filter(|hash| !hash.is_empty())
            .map(|hash| hash_preview(&sanitize_text(hash)))
            .unwrap_or_else(|| HASH_PLACEHOLDER.to_string());

        let base_url = sanitize_text(config.verification_base_url.trim_end_matches('/'));
        let token = sanitize_text(&metadata.public_token);

        Ok(Self {
            lines: [
                format!("ILPI: {institution} | CNPJ: {tax_id}"),
                format!(
                    "Validado por: {uploader} - {role}{registry_part} | {timestamp} (UTC{:+})",
                    config.utc_offset_hours
                ),
                format!("SHA-256: {hash}"),
                format!("Validar: {base_url}/{token}"),
            ],
        })
    }

    /// The four logical lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The lines as drawn: any line wider than `max_width` at `font_size` is
    /// wrapped.
    pub fn wrapped_lines(&self, font_size: f32, max_width: f32) -> Vec<String> {
        self.lines
            .iter()
            .flat_map(|line| wrap_to_width(line, font_size, max_width))
            .collect()
    }
}

/// Reduce `text` to printable ASCII.
///
/// Accents are removed by canonical decomposition (NFD) followed by dropping
/// the combining diacritical marks U+0300..=U+036F. Runs of ASCII whitespace
/// become a single space; every other character outside ' '..='~' becomes '?'.
pub fn sanitize_text(text: &str) -> String {
    let mut sanitized = String::with_capacity(text.len());
    let chars = text
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036F}').contains(c))
        .map(|c| match c {
            ' '..='~' => c,
            c if c.is_ascii_whitespace() => ' ',
            _ => '?',
        });
    for c in chars {
        if c == ' ' && sanitized.ends_with(' ') {
            continue;
        }
        sanitized.push(c);
    }
    sanitized
}

/// `first16...last16` for a 64-character digest; anything else verbatim.
pub fn hash_preview(hash: &str) -> String {
    let chars: Vec<char> = hash.chars().collect();
    if chars.len() == FULL_HASH_CHARS {
        let head: String = chars[..HASH_PREVIEW_CHARS].iter().collect();
        let tail: String = chars[chars.len() - HASH_PREVIEW_CHARS..].iter().collect();
        format!("{head}...{tail}")
    } else {
        hash.to_string()
    }
}

/// Width of `text` in points when set in Helvetica at `font_size`.
///
/// Characters outside printable ASCII are measured as '?', which is what
/// sanitization turns them into.
pub fn helvetica_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| {
            let index = match c {
                ' '..='~' => c as usize - 0x20,
                _ => '?' as usize - 0x20,
            };
            HELVETICA_WIDTHS[index] as u32
        })
        .sum();
    units as f32 * font_size / 1000.0
}

/// Wrap `line` on spaces so that no piece is wider than `max_width` points.
///
/// Words that alone exceed the width (long URLs, tokens) are force-broken.
pub fn wrap_to_width(line: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let fits = |s: &str| helvetica_width(s, font_size) <= max_width;

    if fits(line) {
        return vec![line.to_string()];
    }

    let mut result = Vec::new();
    let mut current_line = String::new();

    for word in line.split(' ').filter(|w| !w.is_empty()) {
        let candidate = if current_line.is_empty() {
            word.to_string()
        } else {
            format!("{current_line} {word}")
        };

        if fits(&candidate) {
            current_line = candidate;
            continue;
        }

        if !current_line.is_empty() {
            result.push(std::mem::take(&mut current_line));
        }

        if fits(word) {
            current_line.push_str(word);
            continue;
        }

        // Force-break the oversized word.
        for c in word.chars() {
            current_line.push(c);
            if !fits(&current_line) && current_line.chars().count() > 1 {
                current_line.pop();
                result.push(std::mem::take(&mut current_line));
                current_line.push(c);
            }
        }
    }

    if !current_line.is_empty() {
        result.push(current_line);
    }

    result
}
