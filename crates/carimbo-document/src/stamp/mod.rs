// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Institutional stamp: footer text composition and page stamping.

pub mod compositor;
pub mod text;

pub use compositor::StampCompositor;
pub use text::{StampText, sanitize_text};
