// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stamp compositor — draw the footer on every page of a mutable document by
// appending content streams with `lopdf`.
//
// Each page ends up with /Contents [open, <original streams...>, stamp] where
// `open` is a lone `q` and `stamp` starts with the matching `Q`. Whatever
// graphics state the original content leaves behind is discarded before the
// stamp is drawn.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use carimbo_core::StampStyle;
use carimbo_core::error::CarimboError;
use tracing::{debug, info, instrument};

use super::text::StampText;
use crate::pdf::MutableDocument;

/// Preferred resource name for the stamp font.
const FONT_KEY: &str = "FCarimbo";

/// Bound on /Parent hops when looking for inherited resources.
const MAX_TREE_DEPTH: usize = 64;

fn stamp_err(detail: impl Into<String>) -> CarimboError {
    CarimboError::StampComposition(detail.into())
}

/// Draws a [`StampText`] onto pages.
pub struct StampCompositor {
    style: StampStyle,
}

impl StampCompositor {
    pub fn new(style: StampStyle) -> Self {
        Self { style }
    }

    /// Stamp every page of `document`, returning the number of pages stamped.
    ///
    /// Any failure aborts the whole operation; the caller must then discard
    /// the document rather than serialize it half-stamped.
    #[instrument(skip_all, fields(pages = document.page_count()))]
    pub fn apply(
        &self,
        document: &mut MutableDocument,
        stamp: &StampText,
    ) -> Result<usize, CarimboError> {
        let lines = stamp.wrapped_lines(self.style.font_size, self.style.max_width);
        if let Some(line) = lines
            .iter()
            .find(|line| !line.bytes().all(|b| (0x20..=0x7E).contains(&b)))
        {
            return Err(stamp_err(format!(
                "stamp line is not printable ASCII: {:?}",
                line
            )));
        }

        let page_ids = document.page_ids();
        if page_ids.is_empty() {
            return Err(stamp_err("document has no pages to stamp"));
        }

        let doc = document.document_mut();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let open_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));

        for (index, page_id) in page_ids.iter().enumerate() {
            let font_key = register_font(doc, *page_id, font_id)?;
            let content = self.stamp_content(&lines, &font_key)?;
            let stamp_id = doc.add_object(Stream::new(dictionary! {}, content));
            wrap_page_contents(doc, *page_id, open_id, stamp_id)?;
            debug!(page = index + 1, %font_key, "Stamp added");
        }

        info!(
            pages = page_ids.len(),
            lines = lines.len(),
            "Institutional stamp applied"
        );
        Ok(page_ids.len())
    }

    /// Content stream that closes the wrapper `q` and draws the text block.
    fn stamp_content(&self, lines: &[String], font_key: &str) -> Result<Vec<u8>, CarimboError> {
        let style = &self.style;
        let mut operations = vec![
            Operation::new("Q", vec![]),
            Operation::new("q", vec![]),
            Operation::new("g", vec![Object::Real(style.gray)]),
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(font_key.as_bytes().to_vec()),
                    Object::Real(style.font_size),
                ],
            ),
            Operation::new("TL", vec![Object::Real(style.line_height)]),
            Operation::new("Td", vec![Object::Real(style.x), Object::Real(style.y)]),
        ];

        for (index, line) in lines.iter().enumerate() {
            if index > 0 {
                operations.push(Operation::new("T*", vec![]));
            }
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(line.as_bytes().to_vec())],
            ));
        }

        operations.push(Operation::new("ET", vec![]));
        operations.push(Operation::new("Q", vec![]));

        Content { operations }
            .encode()
            .map_err(|err| stamp_err(format!("failed to encode stamp content: {}", err)))
    }
}

/// Make the page carry its own /Resources with the stamp font registered,
/// returning the resource name used for the font.
fn register_font(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
) -> Result<String, CarimboError> {
    let mut resources = effective_resources(doc, page_id)?;

    let mut fonts = match resources.get(b"Font") {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        Ok(Object::Reference(id)) => doc
            .get_dictionary(*id)
            .map_err(|err| stamp_err(format!("font resources {:?} unreadable: {}", id, err)))?
            .clone(),
        Ok(other) => {
            return Err(stamp_err(format!(
                "page {:?} has malformed /Font resources: {:?}",
                page_id, other
            )));
        }
        Err(_) => Dictionary::new(),
    };

    let font_key = unused_key(&fonts);
    fonts.set(font_key.as_bytes().to_vec(), Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    let page = doc
        .get_dictionary_mut(page_id)
        .map_err(|err| stamp_err(format!("page {:?} is not a dictionary: {}", page_id, err)))?;
    page.set("Resources", Object::Dictionary(resources));

    Ok(font_key)
}

/// The resources in force for a page: its own, or the nearest ancestor's in
/// the page tree. Returned as an owned copy.
fn effective_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary, CarimboError> {
    let mut current = page_id;

    for _ in 0..MAX_TREE_DEPTH {
        let node = doc
            .get_dictionary(current)
            .map_err(|err| stamp_err(format!("page tree node {:?} unreadable: {}", current, err)))?;

        match node.get(b"Resources") {
            Ok(Object::Dictionary(dict)) => return Ok(dict.clone()),
            Ok(Object::Reference(id)) => {
                return doc.get_dictionary(*id).cloned().map_err(|err| {
                    stamp_err(format!("resources {:?} unreadable: {}", id, err))
                });
            }
            _ => {}
        }

        match node.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => current = parent,
            Err(_) => return Ok(Dictionary::new()),
        }
    }

    Err(stamp_err(format!(
        "page tree above {:?} is deeper than {} levels",
        page_id, MAX_TREE_DEPTH
    )))
}

/// First of `FCarimbo`, `FCarimbo1`, `FCarimbo2`, ... not already in `fonts`.
fn unused_key(fonts: &Dictionary) -> String {
    let mut key = FONT_KEY.to_string();
    let mut suffix = 0;
    while fonts.has(key.as_bytes()) {
        suffix += 1;
        key = format!("{FONT_KEY}{suffix}");
    }
    key
}

/// Replace the page's /Contents with [open, ...existing, stamp].
fn wrap_page_contents(
    doc: &mut Document,
    page_id: ObjectId,
    open_id: ObjectId,
    stamp_id: ObjectId,
) -> Result<(), CarimboError> {
    let existing: Vec<Object> = {
        let page = doc
            .get_dictionary(page_id)
            .map_err(|err| stamp_err(format!("page {:?} is not a dictionary: {}", page_id, err)))?;

        match page.get(b"Contents") {
            Err(_) => Vec::new(),
            Ok(Object::Array(items)) => items.clone(),
            Ok(Object::Reference(id)) => match doc.get_object(*id) {
                // An indirect array of stream references.
                Ok(Object::Array(items)) => items.clone(),
                Ok(Object::Stream(_)) => vec![Object::Reference(*id)],
                Ok(other) => {
                    return Err(stamp_err(format!(
                        "page {:?} /Contents points at {:?}",
                        page_id, other
                    )));
                }
                Err(err) => {
                    return Err(stamp_err(format!(
                        "page {:?} /Contents unreadable: {}",
                        page_id, err
                    )));
                }
            },
            Ok(other) => {
                return Err(stamp_err(format!(
                    "page {:?} has malformed /Contents: {:?}",
                    page_id, other
                )));
            }
        }
    };

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(open_id));
    contents.extend(existing);
    contents.push(Object::Reference(stamp_id));

    let page = doc
        .get_dictionary_mut(page_id)
        .map_err(|err| stamp_err(format!("page {:?} is not a dictionary: {}", page_id, err)))?;
    page.set("Contents", Object::Array(contents));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::LoadOutcome;
    use crate::test_support::{multi_page_pdf, sample_metadata, stamp_lines};
    use carimbo_core::ProcessingConfig;

    fn loaded(bytes: &[u8]) -> MutableDocument {
        match MutableDocument::load(bytes) {
            LoadOutcome::Loaded(doc) => doc,
            LoadOutcome::Unparseable(reason) => panic!("fixture must load: {reason}"),
        }
    }

    fn stamp() -> StampText {
        let metadata = sample_metadata().with_hash_final("f".repeat(64));
        StampText::compose(&metadata, &ProcessingConfig::default()).unwrap()
    }

    #[test]
    fn stamps_every_page_with_identical_text() {
        let mut doc = loaded(&multi_page_pdf(3));
        let stamped = StampCompositor::new(StampStyle::default())
            .apply(&mut doc, &stamp())
            .unwrap();
        assert_eq!(stamped, 3);

        let bytes = doc.seal().unwrap().into_bytes();
        let pages = stamp_lines(&bytes);
        assert_eq!(pages.len(), 3);
        for lines in &pages {
            assert_eq!(lines.as_slice(), stamp().lines());
        }
    }

    #[test]
    fn original_content_is_kept_between_wrapper_streams() {
        let mut doc = loaded(&multi_page_pdf(1));
        let page_id = doc.page_ids()[0];
        StampCompositor::new(StampStyle::default())
            .apply(&mut doc, &stamp())
            .unwrap();

        let page = doc.document().get_dictionary(page_id).unwrap();
        let contents = page.get(b"Contents").unwrap().as_array().unwrap();
        assert_eq!(contents.len(), 3);

        let open = contents[0].as_reference().unwrap();
        let open_stream = doc.document().get_object(open).unwrap().as_stream().unwrap();
        assert_eq!(open_stream.content, b"q\n".to_vec());
    }

    #[test]
    fn inherited_resources_are_materialized_with_the_font() {
        let mut doc = loaded(&multi_page_pdf(2));
        let page_id = doc.page_ids()[1];
        assert!(doc.document().get_dictionary(page_id).unwrap().get(b"Resources").is_err());

        StampCompositor::new(StampStyle::default())
            .apply(&mut doc, &stamp())
            .unwrap();

        let page = doc.document().get_dictionary(page_id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        // The fixture's own font survives next to the stamp font.
        assert!(fonts.has(b"F1"));
        assert!(fonts.has(FONT_KEY.as_bytes()));
    }

    #[test]
    fn font_key_avoids_collisions() {
        let mut fonts = Dictionary::new();
        assert_eq!(unused_key(&fonts), "FCarimbo");
        fonts.set("FCarimbo", Object::Null);
        fonts.set("FCarimbo1", Object::Null);
        assert_eq!(unused_key(&fonts), "FCarimbo2");
    }

    #[test]
    fn stamp_stream_positions_first_line_at_style_origin() {
        let compositor = StampCompositor::new(StampStyle::default());
        let bytes = compositor
            .stamp_content(&["a".to_string(), "b".to_string()], "FCarimbo")
            .unwrap();
        let content = Content::decode(&bytes).unwrap();
        let ops: Vec<&str> = content.operations.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(
            ops,
            vec!["Q", "q", "g", "BT", "Tf", "TL", "Td", "Tj", "T*", "Tj", "ET", "Q"]
        );
    }
}
