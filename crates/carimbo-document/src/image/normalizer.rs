// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image normalizer — decode a JPEG/PNG/WEBP upload and re-encode it losslessly
// as PNG at its original pixel size, using the `image` crate.
//
// Nothing is resized here. Fitting the image onto the page is a display
// transform applied by the PDF writer.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use carimbo_core::error::CarimboError;
use tracing::{debug, info, instrument, warn};

/// A raster upload re-encoded as PNG.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// PNG-encoded pixels.
    pub png_bytes: Vec<u8>,
    /// Width in pixels (unchanged from the upload).
    pub width: u32,
    /// Height in pixels (unchanged from the upload).
    pub height: u32,
}

impl NormalizedImage {
    /// Decode the PNG back into 8-bit RGB, flattening any transparency onto
    /// white paper.
    pub fn to_rgb(&self) -> Result<RgbImage, CarimboError> {
        let image = image::load_from_memory_with_format(&self.png_bytes, ImageFormat::Png)
            .map_err(|err| {
                CarimboError::Processing(format!("normalized PNG does not decode: {}", err))
            })?;
        Ok(flatten_on_white(&image))
    }
}

/// Decodes raster uploads into the canonical PNG form.
pub struct ImageNormalizer;

impl ImageNormalizer {
    /// Decode `data` and re-encode it as PNG.
    ///
    /// The format is sniffed from the bytes; `declared_mime` is only used when
    /// sniffing fails. A disagreement between the two is logged, not fatal,
    /// since MIME validation belongs to the upload layer.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn normalize(data: &[u8], declared_mime: &str) -> Result<NormalizedImage, CarimboError> {
        let format = detect_format(data, declared_mime)?;

        let image = image::load_from_memory_with_format(data, format).map_err(|err| {
            CarimboError::ImageDecode(format!("failed to decode {:?} image: {}", format, err))
        })?;

        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(CarimboError::ImageDecode(format!(
                "image has no pixels ({}x{})",
                width, height
            )));
        }

        info!(width, height, ?format, "Image decoded");

        let png_bytes = encode_to_format(&image, ImageFormat::Png)?;

        debug!(
            from_bytes = data.len(),
            to_bytes = png_bytes.len(),
            "Image re-encoded as PNG"
        );

        Ok(NormalizedImage {
            png_bytes,
            width,
            height,
        })
    }
}

/// Pick the decoder: content sniffing first, declared MIME type second.
fn detect_format(data: &[u8], declared_mime: &str) -> Result<ImageFormat, CarimboError> {
    let declared = ImageFormat::from_mime_type(declared_mime.trim());

    match image::guess_format(data) {
        Ok(sniffed) => {
            if let Some(declared) = declared
                && declared != sniffed
            {
                warn!(
                    ?declared,
                    ?sniffed,
                    "Declared MIME type disagrees with image content, using content"
                );
            }
            Ok(sniffed)
        }
        Err(err) => declared.ok_or_else(|| {
            CarimboError::ImageDecode(format!(
                "unrecognised image data (declared {:?}): {}",
                declared_mime, err
            ))
        }),
    }
}

/// Composite `image` over a white background and drop the alpha channel.
fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let image::Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let alpha = a as u32;
        let blend = |channel: u8| -> u8 {
            ((channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8
        };
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(
    image: &DynamicImage,
    format: ImageFormat,
) -> Result<Vec<u8>, CarimboError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image.write_to(&mut cursor, format).map_err(|err| {
        CarimboError::Processing(format!("image encoding failed: {}", err))
    })?;
    Ok(buffer)
}
