//! Raster rendering of verdict views.
//!
//! Draws a card with a coloured banner, the claimed identity and one row per
//! stage. Geometry is defined in logical pixels and multiplied by the export
//! scale. Without a font the card is still drawn, only the text is skipped.

use super::view::VerdictView;
use crate::core::config::ExportConfig;
use crate::core::constants::{DEFAULT_EXPORT_FONT_SIZE, MAX_EXPORT_SCALE, SYSTEM_FONT_PATHS};
use crate::core::errors::ExportError;
use crate::core::traits::VerdictRenderer;
use ab_glyph::FontVec;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::Path;
use tracing::{debug, info};

const BACKGROUND_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

const TEXT_COLOR: Rgb<u8> = Rgb([20, 20, 20]);

const BANNER_TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

const PASS_COLOR: Rgb<u8> = Rgb([46, 160, 67]);

const FAIL_COLOR: Rgb<u8> = Rgb([207, 34, 46]);

const BORDER_COLOR: Rgb<u8> = Rgb([210, 210, 210]);

const CARD_WIDTH: u32 = 480;
const PADDING: u32 = 16;
const BANNER_HEIGHT: u32 = 48;
const LINE_HEIGHT: u32 = 28;
const MARKER_SIZE: u32 = 12;

/// Default [`VerdictRenderer`] drawing with `imageproc` and `ab_glyph`.
pub struct RasterVerdictRenderer {
    font: Option<FontVec>,
    font_size: f32,
}

impl std::fmt::Debug for RasterVerdictRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterVerdictRenderer")
            .field("has_font", &self.font.is_some())
            .field("font_size", &self.font_size)
            .finish()
    }
}

impl Default for RasterVerdictRenderer {
    fn default() -> Self {
        Self {
            font: None,
            font_size: DEFAULT_EXPORT_FONT_SIZE,
        }
    }
}

impl RasterVerdictRenderer {
    /// Creates a renderer that draws no text.
    pub fn without_font() -> Self {
        Self::default()
    }

    /// Creates a renderer with a font loaded from `font_path`.
    pub fn with_font_path(font_path: &Path, font_size: f32) -> Result<Self, ExportError> {
        let font_data = std::fs::read(font_path).map_err(|e| {
            ExportError::render(format!("failed to read font {}: {e}", font_path.display()))
        })?;
        let font = FontVec::try_from_vec(font_data).map_err(|_| {
            ExportError::render(format!("failed to parse font file: {}", font_path.display()))
        })?;
        Ok(Self {
            font: Some(font),
            font_size,
        })
    }

    /// Creates a renderer with the first system font found, or none.
    pub fn with_system_font(font_size: f32) -> Self {
        for path in SYSTEM_FONT_PATHS {
            if let Ok(font_data) = std::fs::read(path)
                && let Ok(font) = FontVec::try_from_vec(font_data)
            {
                info!("Loaded system font: {}", path);
                return Self {
                    font: Some(font),
                    font_size,
                };
            }
        }

        debug!("No system font found, text rendering will be skipped");
        Self {
            font: None,
            font_size,
        }
    }

    /// Creates a renderer from export settings: the configured font when
    /// set, otherwise a system font.
    pub fn from_config(config: &ExportConfig) -> Result<Self, ExportError> {
        match &config.font_path {
            Some(path) => Self::with_font_path(path, config.font_size),
            None => Ok(Self::with_system_font(config.font_size)),
        }
    }

    /// Returns true if text will be drawn.
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    fn draw_text(&self, img: &mut RgbImage, color: Rgb<u8>, x: u32, y: u32, scale: u32, text: &str) {
        if let Some(font) = &self.font {
            let px = self.font_size * scale as f32;
            draw_text_mut(img, color, x as i32, y as i32, px, font, text);
        }
    }
}

/// Logical height of a card with `rows` stage rows.
fn card_height(rows: usize) -> u32 {
    BANNER_HEIGHT + PADDING + LINE_HEIGHT * (rows as u32 + 2) + PADDING
}

impl VerdictRenderer for RasterVerdictRenderer {
    fn render(&self, view: &VerdictView, scale: u32) -> Result<RgbImage, ExportError> {
        if scale == 0 {
            return Err(ExportError::render("scale must be at least 1"));
        }
        if scale > MAX_EXPORT_SCALE {
            return Err(ExportError::render(format!(
                "scale {scale} exceeds the maximum of {MAX_EXPORT_SCALE}"
            )));
        }
        let width = CARD_WIDTH
            .checked_mul(scale)
            .ok_or_else(|| ExportError::render("card width overflows"))?;
        let height = card_height(view.rows.len())
            .checked_mul(scale)
            .ok_or_else(|| ExportError::render("card height overflows"))?;

        let mut img = RgbImage::from_pixel(width, height, BACKGROUND_COLOR);
        let s = |v: u32| v * scale;

        let banner_color = if view.overall_valid { PASS_COLOR } else { FAIL_COLOR };
        draw_filled_rect_mut(
            &mut img,
            Rect::at(0, 0).of_size(width, s(BANNER_HEIGHT)),
            banner_color,
        );
        self.draw_text(&mut img, BANNER_TEXT_COLOR, s(PADDING), s(14), scale, &view.title);

        let mut y = BANNER_HEIGHT + PADDING;
        self.draw_text(
            &mut img,
            TEXT_COLOR,
            s(PADDING),
            s(y),
            scale,
            &format!("Identity: {}", view.claimed_identity),
        );
        y += LINE_HEIGHT;

        for row in &view.rows {
            let marker_color = if row.valid { PASS_COLOR } else { FAIL_COLOR };
            draw_filled_rect_mut(
                &mut img,
                Rect::at(s(PADDING) as i32, s(y + 4) as i32).of_size(s(MARKER_SIZE), s(MARKER_SIZE)),
                marker_color,
            );
            self.draw_text(
                &mut img,
                TEXT_COLOR,
                s(PADDING + MARKER_SIZE + 8),
                s(y),
                scale,
                &format!("{}: {}", row.label, row.detail),
            );
            y += LINE_HEIGHT;
        }

        self.draw_text(
            &mut img,
            TEXT_COLOR,
            s(PADDING),
            s(y),
            scale,
            &format!("Checked {}", view.checked_at.format("%Y-%m-%d %H:%M UTC")),
        );

        draw_hollow_rect_mut(
            &mut img,
            Rect::at(0, 0).of_size(width, height),
            BORDER_COLOR,
        );

        Ok(img)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ViewRow;
    use chrono::Utc;

    fn view(valid: bool) -> VerdictView {
        VerdictView {
            title: "Eligibility verified".to_string(),
            claimed_identity: "Aeris".to_string(),
            overall_valid: valid,
            rows: vec![
                ViewRow {
                    label: "Identity".to_string(),
                    detail: "Aeris".to_string(),
                    valid: true,
                },
                ViewRow {
                    label: "Kill count evidence".to_string(),
                    detail: "10306".to_string(),
                    valid,
                },
            ],
            checked_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_scales_and_fills_white() {
        let renderer = RasterVerdictRenderer::without_font();
        let one = renderer.render(&view(true), 1).unwrap();
        let two = renderer.render(&view(true), 2).unwrap();

        assert_eq!(two.width(), one.width() * 2);
        assert_eq!(two.height(), one.height() * 2);

        // Interior point below the banner, right of every marker.
        let x = two.width() - 8;
        let y = two.height() - 8;
        assert_eq!(*two.get_pixel(x, y), BACKGROUND_COLOR);
    }

    #[test]
    fn test_banner_colour_follows_verdict() {
        let renderer = RasterVerdictRenderer::without_font();
        let passed = renderer.render(&view(true), 1).unwrap();
        let failed = renderer.render(&view(false), 1).unwrap();
        assert_eq!(*passed.get_pixel(CARD_WIDTH / 2, 4), PASS_COLOR);
        assert_eq!(*failed.get_pixel(CARD_WIDTH / 2, 4), FAIL_COLOR);
    }

    #[test]
    fn test_zero_scale_is_render_error() {
        let renderer = RasterVerdictRenderer::without_font();
        assert!(matches!(
            renderer.render(&view(true), 0),
            Err(ExportError::Render { .. })
        ));
    }

    #[test]
    fn test_oversized_scale_is_render_error() {
        let renderer = RasterVerdictRenderer::without_font();
        assert!(renderer.render(&view(true), MAX_EXPORT_SCALE).is_ok());
        assert!(matches!(
            renderer.render(&view(true), MAX_EXPORT_SCALE + 1),
            Err(ExportError::Render { .. })
        ));
        assert!(matches!(
            renderer.render(&view(true), 200_000),
            Err(ExportError::Render { .. })
        ));
    }

    #[test]
    fn test_bad_font_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("font.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(RasterVerdictRenderer::with_font_path(&path, 16.0).is_err());
        assert!(RasterVerdictRenderer::with_font_path(&dir.path().join("missing.ttf"), 16.0).is_err());
    }
}
