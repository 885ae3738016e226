//! Chapter title font loading and rasterization (ab_glyph).

use std::path::Path;

use ab_glyph::{Font, FontVec, GlyphId, PxScale, ScaleFont, point};

use crate::error::{ProgressError, ProgressResult};

/// A title font loaded once per render.
pub struct TitleFont {
    font: FontVec,
    scale: PxScale,
}

impl TitleFont {
    /// Read and parse a TrueType/OpenType font; `size` is the em size in pixels.
    pub fn load(path: &Path, size: u32) -> ProgressResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            ProgressError::config(format!(
                "failed to read title font '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_bytes(bytes, size).map_err(|e| {
            ProgressError::config(format!("title font '{}': {e}", path.display()))
        })
    }

    pub fn from_bytes(bytes: Vec<u8>, size: u32) -> ProgressResult<Self> {
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| ProgressError::config(format!("invalid font data: {e}")))?;
        let units_per_em = font
            .units_per_em()
            .ok_or_else(|| ProgressError::config("font has no units-per-em"))?;
        // PxScale measures ascent-to-descent height, not the em square.
        let scale = PxScale::from(size as f32 * font.height_unscaled() / units_per_em);
        Ok(Self { font, scale })
    }

    /// Rasterizes `text` on a single line.
    ///
    /// The origin is the left end of the line at the ascender; glyph pixels
    /// are positioned relative to it.
    pub fn rasterize(&self, text: &str) -> TextMask {
        let scaled = self.font.as_scaled(self.scale);
        let mut caret = 0.0f32;
        let mut last: Option<GlyphId> = None;
        let mut outlines = Vec::new();

        for c in text.chars() {
            if c.is_control() {
                continue;
            }
            let id = scaled.glyph_id(c);
            if let Some(prev) = last {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(self.scale, point(caret, scaled.ascent()));
            caret += scaled.h_advance(id);
            last = Some(id);
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                outlines.push(outlined);
            }
        }

        if outlines.is_empty() {
            return TextMask::empty();
        }

        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for g in &outlines {
            let b = g.px_bounds();
            min_x = min_x.min(b.min.x);
            min_y = min_y.min(b.min.y);
            max_x = max_x.max(b.max.x);
            max_y = max_y.max(b.max.y);
        }

        let left = min_x.floor() as i64;
        let top = min_y.floor() as i64;
        let width = (max_x.ceil() as i64 - left).max(0) as u32;
        let height = (max_y.ceil() as i64 - top).max(0) as u32;
        let mut mask = TextMask {
            left,
            top,
            width,
            height,
            coverage: vec![0; width as usize * height as usize],
        };

        for g in &outlines {
            let b = g.px_bounds();
            let dx = b.min.x as i64 - left;
            let dy = b.min.y as i64 - top;
            g.draw(|x, y, c| {
                let mx = dx + i64::from(x);
                let my = dy + i64::from(y);
                let value = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
                mask.raise(mx, my, value);
            });
        }

        mask
    }
}

/// Antialiased coverage of a rasterized title.
///
/// `left`/`top` place the mask relative to the text origin, so
/// `right()`/`bottom()` form the text's pixel bounding box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextMask {
    pub left: i64,
    pub top: i64,
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<u8>,
}

impl TextMask {
    pub fn empty() -> Self {
        Self {
            left: 0,
            top: 0,
            width: 0,
            height: 0,
            coverage: Vec::new(),
        }
    }

    /// Fully covered block of `width x height` pixels at the origin.
    #[cfg(test)]
    pub fn solid(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            width,
            height,
            coverage: vec![255; width as usize * height as usize],
        }
    }

    pub fn right(&self) -> i64 {
        self.left + i64::from(self.width)
    }

    pub fn bottom(&self) -> i64 {
        self.top + i64::from(self.height)
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.coverage[(y * self.width + x) as usize]
    }

    fn raise(&mut self, x: i64, y: i64, value: u8) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let ix = (y as u32 * self.width + x as u32) as usize;
        self.coverage[ix] = self.coverage[ix].max(value);
    }
}
