// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contract pipeline — turn one upload into a stamped, hashed PDF.
//
// Every path follows the same shape:
//
//   hash input -> build/parse -> seal -> hash_final -> reopen -> stamp -> seal
//
// The processor holds only configuration and the caller's tracing span, so it
// is `Send + Sync` and one instance can serve concurrent requests.

use carimbo_core::error::{CarimboError, Result};
use carimbo_core::{
    InputKind, ProcessedFileResult, ProcessingConfig, ProcessingPath, StampMetadata,
};
use carimbo_security::sha256_hex;
use tracing::{Span, debug, error, info, info_span, warn};

use crate::image::ImageNormalizer;
use crate::pdf::{LoadOutcome, MutableDocument, PageWriter, SealedDocument};
use crate::recovery;
use crate::stamp::{StampCompositor, StampText};

/// Stamps uploaded contracts.
#[derive(Debug, Clone)]
pub struct ContractProcessor {
    config: ProcessingConfig,
    /// Parent for every span this processor opens.
    span: Span,
}

impl ContractProcessor {
    /// Create a processor after validating `config`.
    pub fn new(config: ProcessingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            span: Span::current(),
        })
    }

    /// Attach this processor's spans under `span` (e.g. the request span of
    /// the upload handler).
    pub fn with_parent_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    fn writer(&self) -> PageWriter {
        PageWriter::new(self.config.page, self.config.document_title.clone())
    }

    // -- Entry points ---------------------------------------------------------

    /// Route an upload by its declared MIME type: `image/*` to
    /// [`process_image`](Self::process_image), anything else to
    /// [`process_pdf`](Self::process_pdf).
    pub fn process_upload(
        &self,
        data: &[u8],
        mime: &str,
        metadata: &StampMetadata,
    ) -> Result<ProcessedFileResult> {
        match InputKind::from_mime(mime) {
            InputKind::Image => self.process_image(data, mime, metadata),
            InputKind::Pdf => self.process_pdf(data, metadata),
        }
    }

    /// Place a raster upload on a fresh A4 page and stamp it.
    pub fn process_image(
        &self,
        data: &[u8],
        mime: &str,
        metadata: &StampMetadata,
    ) -> Result<ProcessedFileResult> {
        let _span = info_span!(
            parent: &self.span,
            "process_image",
            token = %metadata.public_token,
            mime,
            bytes_len = data.len()
        )
        .entered();

        let hash_original = sha256_hex(data);
        debug!(%hash_original, "Original hashed");

        let image = ImageNormalizer::normalize(data, mime).inspect_err(|err| {
            warn!(%err, "Image upload rejected");
        })?;
        let sealed = self.writer().image_page(&image)?.seal()?;

        self.stamp_and_seal(sealed, hash_original, metadata, ProcessingPath::Image)
    }

    /// Stamp every page of an uploaded PDF. Bytes that do not parse as a PDF
    /// are replaced by a recovery page; that is not an error.
    pub fn process_pdf(&self, data: &[u8], metadata: &StampMetadata) -> Result<ProcessedFileResult> {
        let _span = info_span!(
            parent: &self.span,
            "process_pdf",
            token = %metadata.public_token,
            bytes_len = data.len()
        )
        .entered();

        let hash_original = sha256_hex(data);
        debug!(%hash_original, "Original hashed");

        match MutableDocument::load(data) {
            LoadOutcome::Loaded(document) => {
                let sealed = document.seal()?;
                self.stamp_and_seal(sealed, hash_original, metadata, ProcessingPath::Pdf)
            }
            LoadOutcome::Unparseable(reason) => {
                warn!(%reason, "Upload is not a usable PDF, recovering");
                self.recover(hash_original, metadata)
            }
        }
    }

    // -- Internals ------------------------------------------------------------

    fn recover(&self, hash_original: String, metadata: &StampMetadata) -> Result<ProcessedFileResult> {
        let draft = recovery::recovery_draft(&self.writer(), &self.config.page, &hash_original);
        let result = draft
            .seal()
            .and_then(|sealed| {
                self.stamp_and_seal(sealed, hash_original, metadata, ProcessingPath::Recovered)
            })
            .inspect_err(|err| error!(%err, "Recovery failed"))?;
        Ok(result)
    }

    /// Hash the sealed pre-stamp document, reopen it, stamp every page with
    /// that hash and seal the result.
    fn stamp_and_seal(
        &self,
        sealed: SealedDocument,
        hash_original: String,
        metadata: &StampMetadata,
        path: ProcessingPath,
    ) -> Result<ProcessedFileResult> {
        let hash_final = sealed.sha256();
        let bound = metadata.with_hash_final(hash_final.clone());
        let stamp = StampText::compose(&bound, &self.config)?;

        let mut document = sealed.reopen()?;
        let page_count = StampCompositor::new(self.config.stamp).apply(&mut document, &stamp)?;
        let output = document.seal()?;

        if output.is_empty() {
            return Err(CarimboError::Processing("stamped document is empty".into()));
        }

        info!(
            ?path,
            pages = page_count,
            output_bytes = output.len(),
            %hash_final,
            "Contract stamped"
        );

        Ok(ProcessedFileResult {
            pdf_bytes: output.into_bytes(),
            hash_original,
            hash_final,
            page_count,
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        multi_page_pdf, number, page_operations, page_text, sample_jpeg, sample_metadata,
        stamp_lines,
    };
    use carimbo_security::is_sha256_hex;

    fn processor() -> ContractProcessor {
        ContractProcessor::new(ProcessingConfig::default()).unwrap()
    }

    fn assert_hashes(result: &ProcessedFileResult, input: &[u8]) {
        assert_eq!(result.hash_original, sha256_hex(input));
        assert!(is_sha256_hex(&result.hash_final));
        assert!(!result.hash_final.chars().any(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn photo_becomes_one_stamped_page() {
        let jpeg = sample_jpeg(1000, 1400);
        let result = processor()
            .process_image(&jpeg, "image/jpeg", &sample_metadata())
            .unwrap();

        assert_eq!(result.path, ProcessingPath::Image);
        assert_eq!(result.page_count, 1);
        assert_hashes(&result, &jpeg);

        let pages = stamp_lines(&result.pdf_bytes);
        assert_eq!(pages.len(), 1);
        let lines = &pages[0];
        assert!(lines[0].starts_with("ILPI: Associacao Lar Sao Vicente"));
        assert!(lines.iter().any(|l| l.ends_with("/validar/tok-123")));
        let preview = format!(
            "SHA-256: {}...{}",
            &result.hash_final[..16],
            &result.hash_final[48..]
        );
        assert!(lines.contains(&preview));
    }

    #[test]
    fn photo_hangs_from_top_margin_centred() {
        let jpeg = sample_jpeg(1000, 1400);
        let result = processor()
            .process_image(&jpeg, "image/jpeg", &sample_metadata())
            .unwrap();

        // 1000x1400 px in a 515x712 pt area: scale 712/1400, so the image is
        // 508.57 x 712 pt, centred horizontally and 40 pt below the top edge.
        let operations = &page_operations(&result.pdf_bytes)[0];
        let cm = operations
            .iter()
            .find(|op| op.operator == "cm")
            .expect("image placement matrix");
        let matrix: Vec<f32> = cm.operands.iter().map(number).collect();
        let expected = [508.571, 0.0, 0.0, 712.0, 43.214, 90.0];
        assert_eq!(matrix.len(), 6);
        for (got, want) in matrix.iter().zip(expected) {
            assert!((got - want).abs() < 0.01, "cm {matrix:?}");
        }
        assert!(operations.iter().any(|op| op.operator == "Do"));
    }

    #[test]
    fn three_page_pdf_keeps_three_identically_stamped_pages() {
        let pdf = multi_page_pdf(3);
        let result = processor().process_pdf(&pdf, &sample_metadata()).unwrap();

        assert_eq!(result.path, ProcessingPath::Pdf);
        assert_eq!(result.page_count, 3);
        assert_hashes(&result, &pdf);

        let pages = stamp_lines(&result.pdf_bytes);
        assert_eq!(pages.len(), 3);
        assert!(pages.iter().all(|lines| lines == &pages[0]));
    }

    #[test]
    fn random_bytes_are_recovered_not_rejected() {
        let junk: Vec<u8> = (0u8..20).map(|i| i.wrapping_mul(97) ^ 0x5A).collect();
        let result = processor().process_pdf(&junk, &sample_metadata()).unwrap();

        assert_eq!(result.path, ProcessingPath::Recovered);
        assert_eq!(result.page_count, 1);
        assert_hashes(&result, &junk);
        assert_eq!(stamp_lines(&result.pdf_bytes).len(), 1);

        let shown = &page_text(&result.pdf_bytes)[0];
        let hash = sha256_hex(&junk);
        assert!(shown.iter().any(|text| text == &hash), "{shown:?}");
        assert!(shown.iter().any(|text| text.contains("RECONSTRUIDO")), "{shown:?}");
    }

    #[test]
    fn missing_registry_leaves_no_parentheses() {
        let mut metadata = sample_metadata();
        metadata.professional_registry = None;
        let result = processor()
            .process_pdf(&multi_page_pdf(1), &metadata)
            .unwrap();

        let pages = stamp_lines(&result.pdf_bytes);
        let validated = pages[0]
            .iter()
            .find(|l| l.starts_with("Validado por:"))
            .unwrap();
        assert!(validated.starts_with("Validado por: Ana Conceicao - Enfermeira | "));
        assert!(!validated.contains("()"));
    }

    #[test]
    fn stamp_text_is_ascii_only() {
        let result = processor()
            .process_pdf(&multi_page_pdf(2), &sample_metadata())
            .unwrap();
        for lines in stamp_lines(&result.pdf_bytes) {
            assert!(lines.iter().all(|l| l.bytes().all(|b| (0x20..=0x7E).contains(&b))));
        }
    }

    #[test]
    fn undecodable_image_is_an_image_decode_error() {
        let err = processor()
            .process_image(b"definitely not a picture", "image/png", &sample_metadata())
            .unwrap_err();
        assert!(matches!(err, CarimboError::ImageDecode(_)));
    }

    #[test]
    fn upload_dispatches_on_mime() {
        let jpeg = sample_jpeg(40, 30);
        let processor = processor();
        let metadata = sample_metadata();

        let image = processor.process_upload(&jpeg, "image/jpeg", &metadata).unwrap();
        assert_eq!(image.path, ProcessingPath::Image);

        // A photo declared as a PDF is not a PDF.
        let misdeclared = processor
            .process_upload(&jpeg, "application/pdf", &metadata)
            .unwrap();
        assert_eq!(misdeclared.path, ProcessingPath::Recovered);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = ProcessingConfig::default();
        config.stamp.font_size = 0.0;
        assert!(matches!(
            ContractProcessor::new(config),
            Err(CarimboError::Config(_))
        ));
    }

    #[test]
    fn processor_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ContractProcessor>();

        let processor = processor();
        let pdf = multi_page_pdf(1);
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..2)
                .map(|_| scope.spawn(|| processor.process_pdf(&pdf, &sample_metadata())))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap().unwrap().page_count, 1);
            }
        });
    }
}
