// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — build fresh single-page documents using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use carimbo_core::PageGeometry;
use carimbo_core::error::CarimboError;
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, RawImage,
    RawImageData, RawImageFormat, TextItem, XObjectTransform,
};
use tracing::{debug, info, instrument};

use super::sealed::SealedDocument;
use crate::image::NormalizedImage;
use crate::layout;

/// Pixels are placed at 72 dpi so that one pixel is one point before scaling.
const IMAGE_DPI: f32 = 72.0;

/// A block of left-aligned text lines in Helvetica.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBlock {
    pub x: f32,
    /// Baseline of the first line.
    pub y: f32,
    pub font_size: f32,
    pub line_height: f32,
}

/// A freshly built document that has not been serialized yet.
pub struct DraftDocument {
    document: PdfDocument,
}

impl DraftDocument {
    /// Number of pages in the draft.
    pub fn page_count(&self) -> usize {
        self.document.pages.len()
    }

    /// Serialize the draft. The draft is consumed.
    #[instrument(skip_all, fields(pages = self.page_count()))]
    pub fn seal(self) -> Result<SealedDocument, CarimboError> {
        // No image optimisation: the raster must stay lossless and unscaled.
        let options = PdfSaveOptions {
            image_optimization: None,
            ..PdfSaveOptions::default()
        };
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = self.document.save(&options, &mut warnings);

        if output.is_empty() {
            return Err(CarimboError::Processing(
                "PDF writer produced no output".into(),
            ));
        }

        debug!(
            output_bytes = output.len(),
            warnings = warnings.len(),
            "Draft sealed"
        );
        Ok(SealedDocument::from_bytes(output))
    }
}

/// Creates fresh letterhead pages.
pub struct PageWriter {
    geometry: PageGeometry,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: String,
}

impl PageWriter {
    pub fn new(geometry: PageGeometry, title: impl Into<String>) -> Self {
        Self {
            geometry,
            title: title.into(),
        }
    }

    /// Page dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        (
            pt_to_mm(self.geometry.page_width),
            pt_to_mm(self.geometry.page_height),
        )
    }

    // -- Image page -----------------------------------------------------------

    /// Create a single page with `image` fitted into the usable area.
    ///
    /// The image is embedded at its native resolution; fitting is done by the
    /// placement transform only.
    #[instrument(skip_all, fields(width = image.width, height = image.height))]
    pub fn image_page(&self, image: &NormalizedImage) -> Result<DraftDocument, CarimboError> {
        let (page_w, page_h) = self.page_dimensions();
        let placement = layout::fit_to_page(&self.geometry, image.width, image.height)?;

        info!(title = %self.title, "Creating image page");

        let rgb_image = image.to_rgb()?;
        let raw = RawImage {
            pixels: RawImageData::U8(rgb_image.into_raw()),
            width: image.width as usize,
            height: image.height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };

        let mut doc = PdfDocument::new(&self.title);
        let xobject_id = doc.add_image(&raw);

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(placement.x)),
                translate_y: Some(Pt(placement.y)),
                scale_x: Some(placement.scale),
                scale_y: Some(placement.scale),
                dpi: Some(IMAGE_DPI),
                rotate: None,
            },
        }];

        doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);

        debug!(
            x = placement.x,
            y = placement.y,
            display_w = placement.width,
            display_h = placement.height,
            scale = placement.scale,
            "Image placed on page"
        );

        Ok(DraftDocument { document: doc })
    }

    // -- Text page ------------------------------------------------------------

    /// Create a single page carrying `lines` in Helvetica, one text section
    /// per line, moving down by the block's line height.
    #[instrument(skip_all, fields(lines = lines.len()))]
    pub fn text_page(&self, lines: &[String], block: TextBlock) -> DraftDocument {
        let (page_w, page_h) = self.page_dimensions();
        let mut ops: Vec<Op> = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let y_pt = block.y - index as f32 * block.line_height;

            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(block.x),
                    y: Pt(y_pt),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(block.font_size),
                font: BuiltinFont::Helvetica,
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(line.clone())],
                font: BuiltinFont::Helvetica,
            });
            ops.push(Op::EndTextSection);
        }

        let mut doc = PdfDocument::new(&self.title);
        doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);

        DraftDocument { document: doc }
    }
}

fn pt_to_mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}
