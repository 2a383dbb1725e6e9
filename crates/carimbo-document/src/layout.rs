// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout calculator — where a raster goes on the letterhead page.
//
// Pixels map to points 1:1 before scaling. The scale is the largest one that
// keeps the whole image inside the usable area, which means small images are
// enlarged as well as large ones reduced.

use carimbo_core::PageGeometry;
use carimbo_core::error::CarimboError;

/// Display rectangle of a raster on the page, in PDF points with the origin
/// at the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Fit `content_width` x `content_height` pixels into the usable area of
/// `page`, centred horizontally and hanging from the top margin.
pub fn fit_to_page(
    page: &PageGeometry,
    content_width: u32,
    content_height: u32,
) -> Result<Placement, CarimboError> {
    if content_width == 0 || content_height == 0 {
        return Err(CarimboError::Processing(format!(
            "cannot lay out empty content ({}x{})",
            content_width, content_height
        )));
    }

    let content_w = content_width as f32;
    let content_h = content_height as f32;

    let scale = (page.usable_width() / content_w).min(page.usable_height() / content_h);
    let width = content_w * scale;
    let height = content_h * scale;

    Ok(Placement {
        scale,
        x: (page.page_width - width) / 2.0,
        y: page.page_height - page.margin_top - height,
        width,
        height,
    })
}
