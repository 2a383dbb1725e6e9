// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Processing configuration. The geometry defaults are the business constants
// of the institutional letterhead.

use serde::{Deserialize, Serialize};

use crate::error::{CarimboError, Result};

/// Page size and the margins that frame embedded content, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    /// Applied to both left and right.
    pub margin_side: f32,
    /// Reserved for the stamp.
    pub margin_bottom: f32,
}

impl PageGeometry {
    /// Width available to content (515pt for A4 with default margins).
    pub fn usable_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin_side
    }

    /// Height available to content (712pt for A4 with default margins).
    pub fn usable_height(&self) -> f32 {
        self.page_height - self.margin_top - self.margin_bottom
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_width: 595.0,
            page_height: 842.0,
            margin_top: 40.0,
            margin_side: 40.0,
            margin_bottom: 90.0,
        }
    }
}

/// Placement and typography of the footer stamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StampStyle {
    /// Left edge of the text block.
    pub x: f32,
    /// Baseline of the first line; following lines go down.
    pub y: f32,
    pub font_size: f32,
    pub line_height: f32,
    pub max_width: f32,
    /// Fill gray level, 0.0 (black) to 1.0 (white).
    pub gray: f32,
}

impl Default for StampStyle {
    fn default() -> Self {
        Self {
            x: 50.0,
            y: 50.0,
            font_size: 7.0,
            line_height: 9.0,
            max_width: 495.0,
            gray: 0.3,
        }
    }
}

/// Settings for the contract processing pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub page: PageGeometry,
    pub stamp: StampStyle,
    /// Public verification URL; the token is appended after a `/`.
    pub verification_base_url: String,
    /// Offset used to print the upload time. The stamp labels it `UTC-3`.
    pub utc_offset_hours: i32,
    /// Title written into the /Info dictionary of fresh documents.
    pub document_title: String,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            page: PageGeometry::default(),
            stamp: StampStyle::default(),
            verification_base_url: "https://rafa-ilpi.rafalabs.com.br/validar".into(),
            utc_offset_hours: -3,
            document_title: "Contrato".into(),
        }
    }
}

impl ProcessingConfig {
    /// Parse a JSON document; missing fields fall back to the defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject geometry that leaves no room for content or stamp.
    pub fn validate(&self) -> Result<()> {
        let page = &self.page;
        if page.usable_width() <= 0.0 || page.usable_height() <= 0.0 {
            return Err(CarimboError::Config(format!(
                "usable area must be positive, got {}x{}pt",
                page.usable_width(),
                page.usable_height()
            )));
        }
        if self.stamp.font_size <= 0.0 || self.stamp.max_width <= 0.0 {
            return Err(CarimboError::Config(
                "stamp font size and max width must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.stamp.gray) {
            return Err(CarimboError::Config(format!(
                "stamp gray must be within 0..=1, got {}",
                self.stamp.gray
            )));
        }
        if !(-14..=14).contains(&self.utc_offset_hours) {
            return Err(CarimboError::Config(format!(
                "UTC offset out of range: {}",
                self.utc_offset_hours
            )));
        }
        if self.verification_base_url.trim().is_empty() {
            return Err(CarimboError::Config(
                "verification base URL is empty".into(),
            ));
        }
        Ok(())
    }
}
