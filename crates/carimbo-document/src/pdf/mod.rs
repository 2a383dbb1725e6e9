// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — document assembly in two explicit states.
//
// MUTABLE: a `DraftDocument` (fresh pages built with printpdf) or a
// `MutableDocument` (parsed pages held by lopdf). SEALED: a `SealedDocument`,
// which is nothing but serialized bytes. Sealing consumes the mutable value;
// the only way back to editing is `SealedDocument::reopen`, which parses the
// bytes into a new `MutableDocument`.

pub mod reader;
pub mod sealed;
pub mod writer;

pub use reader::{LoadOutcome, MutableDocument};
pub use sealed::SealedDocument;
pub use writer::{DraftDocument, PageWriter};
