//! Typeface JSON decoding and glyph layout
//!
//! A typeface document is a JSON object holding per-glyph outlines encoded as
//! a compact command string (`m`, `l`, `q`, `b`, `z`) in font units, plus the
//! font metrics needed to lay out a line of text.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::outline::Point2;

/// Glyph used when a character has no outline of its own.
pub const FALLBACK_GLYPH: char = '?';

#[derive(Error, Debug)]
pub enum TypefaceError {
    #[error("Failed to parse typeface JSON: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid typeface: {0}")]
    ValidationError(String),
    #[error("Malformed outline for glyph '{glyph}': {message}")]
    OutlineError { glyph: char, message: String },
    #[error("No glyph for '{0}' and no fallback glyph")]
    MissingGlyph(char),
}

/// Font bounding box in font units
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(rename = "xMin", default)]
    pub x_min: f32,
    #[serde(rename = "xMax", default)]
    pub x_max: f32,
    #[serde(rename = "yMin", default)]
    pub y_min: f32,
    #[serde(rename = "yMax", default)]
    pub y_max: f32,
}

/// A single glyph entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Glyph {
    /// Horizontal advance
    pub ha: f32,
    #[serde(default)]
    pub x_min: Option<f32>,
    #[serde(default)]
    pub x_max: Option<f32>,
    /// Outline command string; absent for blank glyphs such as space
    #[serde(default)]
    pub o: Option<String>,
}

/// Decoded typeface document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Typeface {
    pub glyphs: HashMap<String, Glyph>,
    #[serde(rename = "familyName", default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub ascender: f32,
    #[serde(default)]
    pub descender: f32,
    #[serde(rename = "underlinePosition", default)]
    pub underline_position: f32,
    #[serde(rename = "underlineThickness", default)]
    pub underline_thickness: f32,
    #[serde(rename = "boundingBox", default)]
    pub bounding_box: BoundingBox,
    /// Font units per em
    pub resolution: f32,
}

/// One outline drawing command, already in scene units
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point2),
    LineTo(Point2),
    QuadTo { ctrl: Point2, to: Point2 },
    CubicTo { ctrl1: Point2, ctrl2: Point2, to: Point2 },
    Close,
}

/// Outline of one laid-out character
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphPath {
    pub ch: char,
    pub commands: Vec<PathCommand>,
}

impl Typeface {
    /// Parse a typeface from its JSON text
    pub fn from_json(json: &str) -> Result<Self, TypefaceError> {
        let typeface: Typeface = serde_json::from_str(json)?;
        typeface.validate()?;
        Ok(typeface)
    }

    fn validate(&self) -> Result<(), TypefaceError> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(TypefaceError::ValidationError(format!(
                "resolution must be positive, got {}",
                self.resolution
            )));
        }
        if self.glyphs.is_empty() {
            return Err(TypefaceError::ValidationError("no glyphs".to_string()));
        }
        Ok(())
    }

    /// Look up a glyph, falling back to `?`
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        let mut buf = [0u8; 4];
        self.glyphs
            .get(ch.encode_utf8(&mut buf) as &str)
            .or_else(|| self.glyphs.get(FALLBACK_GLYPH.encode_utf8(&mut buf) as &str))
    }

    /// Distance between baselines for text of the given size
    pub fn line_height(&self, size: f32) -> f32 {
        let bb = &self.bounding_box;
        (bb.y_max - bb.y_min + self.underline_thickness) * (size / self.resolution)
    }

    /// Lay out `text` at `size`, returning one outline per drawn character.
    ///
    /// Characters without a glyph (and without the fallback) are skipped.
    pub fn layout(&self, text: &str, size: f32) -> Result<Vec<GlyphPath>, TypefaceError> {
        let scale = size / self.resolution;
        let line_height = self.line_height(size);

        let mut paths = Vec::new();
        let mut offset = Point2::new(0.0, 0.0);

        for ch in text.chars() {
            if ch == '\n' {
                offset.x = 0.0;
                offset.y -= line_height;
                continue;
            }

            let Some(glyph) = self.glyph(ch) else {
                tracing::warn!(%ch, "Typeface has no glyph for character, skipping");
                continue;
            };

            let commands = match &glyph.o {
                Some(outline) => parse_outline(ch, outline, scale, offset)?,
                None => Vec::new(),
            };
            paths.push(GlyphPath { ch, commands });
            offset.x += glyph.ha * scale;
        }

        Ok(paths)
    }

    /// Fail on the first visible character that has neither its own glyph
    /// nor the fallback
    pub fn check_coverage(&self, text: &str) -> Result<(), TypefaceError> {
        match text.chars().find(|&ch| !ch.is_whitespace() && self.glyph(ch).is_none()) {
            Some(ch) => Err(TypefaceError::MissingGlyph(ch)),
            None => Ok(()),
        }
    }
}

/// Decode an outline command string, scaling and offsetting every point
pub fn parse_outline(
    glyph: char,
    outline: &str,
    scale: f32,
    offset: Point2,
) -> Result<Vec<PathCommand>, TypefaceError> {
    let mut tokens = outline.split_whitespace();
    let mut commands = Vec::new();

    let point = |tokens: &mut std::str::SplitWhitespace<'_>| -> Result<Point2, TypefaceError> {
        let x = next_number(glyph, tokens)?;
        let y = next_number(glyph, tokens)?;
        Ok(Point2::new(x * scale + offset.x, y * scale + offset.y))
    };

    while let Some(action) = tokens.next() {
        let command = match action {
            "m" => PathCommand::MoveTo(point(&mut tokens)?),
            "l" => PathCommand::LineTo(point(&mut tokens)?),
            // End point comes first, then the control point(s)
            "q" => {
                let to = point(&mut tokens)?;
                let ctrl = point(&mut tokens)?;
                PathCommand::QuadTo { ctrl, to }
            }
            "b" => {
                let to = point(&mut tokens)?;
                let ctrl1 = point(&mut tokens)?;
                let ctrl2 = point(&mut tokens)?;
                PathCommand::CubicTo { ctrl1, ctrl2, to }
            }
            "z" => PathCommand::Close,
            other => {
                return Err(TypefaceError::OutlineError {
                    glyph,
                    message: format!("unknown command '{}'", other),
                })
            }
        };
        commands.push(command);
    }

    Ok(commands)
}

fn next_number(
    glyph: char,
    tokens: &mut std::str::SplitWhitespace<'_>,
) -> Result<f32, TypefaceError> {
    let token = tokens.next().ok_or_else(|| TypefaceError::OutlineError {
        glyph,
        message: "unexpected end of outline".to_string(),
    })?;
    token.parse::<f32>().map_err(|_| TypefaceError::OutlineError {
        glyph,
        message: format!("invalid number '{}'", token),
    })
}
