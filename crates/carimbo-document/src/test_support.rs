// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fixtures shared by the unit tests of this crate.

use chrono::{TimeZone, Utc};
use carimbo_core::StampMetadata;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

pub fn sample_metadata() -> StampMetadata {
    StampMetadata {
        institution_name: "Associação Lar São Vicente".into(),
        institution_tax_id: "12.345.678/0001-90".into(),
        uploader_name: "Ana Conceição".into(),
        uploader_role: "Enfermeira".into(),
        professional_registry: Some("COREN-SP 123456".into()),
        uploaded_at: Utc.with_ymd_and_hms(2026, 3, 1, 15, 4, 5).unwrap(),
        public_token: "tok-123".into(),
        hash_final: None,
    }
}

/// A gradient photo encoded as JPEG.
pub fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    let pixels = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(pixels)
        .write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Jpeg)
        .unwrap();
    buffer
}

/// An uncompressed `pages`-page PDF. MediaBox and Resources live on the page
/// tree root, so pages inherit them; each page has one content stream.
pub fn multi_page_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages);
    for number in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("Clausula {number}"))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Resources" => resources_id,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// The strings drawn by the last content stream of every page, in page
/// order. After stamping, that stream is the stamp.
pub fn stamp_lines(pdf: &[u8]) -> Vec<Vec<String>> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let page = doc.get_dictionary(page_id).unwrap();
            let last = match page.get(b"Contents").unwrap() {
                Object::Array(items) => items.last().unwrap().as_reference().unwrap(),
                Object::Reference(id) => *id,
                other => panic!("unexpected /Contents {other:?}"),
            };
            let stream = doc.get_object(last).unwrap().as_stream().unwrap();
            let bytes = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());

            Content::decode(&bytes)
                .unwrap()
                .operations
                .into_iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| match op.operands.first() {
                    Some(Object::String(text, _)) => Some(String::from_utf8_lossy(text).into_owned()),
                    _ => None,
                })
                .collect()
        })
        .collect()
}

/// Every content operation of every page, in page order. Each content stream
/// is decoded on its own and the operations are chained.
pub fn page_operations(pdf: &[u8]) -> Vec<Vec<Operation>> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            doc.get_page_contents(page_id)
                .into_iter()
                .flat_map(|stream_id| {
                    let stream = doc.get_object(stream_id).unwrap().as_stream().unwrap();
                    let bytes = stream
                        .decompressed_content()
                        .unwrap_or_else(|_| stream.content.clone());
                    Content::decode(&bytes).unwrap().operations
                })
                .collect()
        })
        .collect()
}

/// All strings shown on each page by `Tj` or `TJ`, in drawing order.
pub fn page_text(pdf: &[u8]) -> Vec<Vec<String>> {
    page_operations(pdf)
        .into_iter()
        .map(|operations| {
            operations
                .iter()
                .filter(|op| op.operator == "Tj" || op.operator == "TJ")
                .map(|op| {
                    let mut shown = String::new();
                    for operand in &op.operands {
                        collect_strings(operand, &mut shown);
                    }
                    shown
                })
                .collect()
        })
        .collect()
}

fn collect_strings(operand: &Object, shown: &mut String) {
    match operand {
        Object::String(text, _) => shown.push_str(&String::from_utf8_lossy(text)),
        Object::Array(items) => items.iter().for_each(|item| collect_strings(item, shown)),
        _ => {}
    }
}

/// Numeric value of an integer or real operand.
pub fn number(operand: &Object) -> f32 {
    match operand {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r,
        other => panic!("not a number: {other:?}"),
    }
}
