// ABOUTME: Pre-rendered row bitmaps in the hot and dim palettes, one pair per column.
// ABOUTME: Segment blits copy sub-rectangles from here instead of drawing text each frame.

use glitch_core::{Bitmap, ColorRole, StyleResolver, Surface};
use glitch_layout::{LayoutState, Side, TextGridModel};

/// Extra logical pixels around the painted rows
const EDGE_PAD_PX: f32 = 2.0;

/// Both palettes of one column.
#[derive(Debug, Clone)]
pub struct GlyphAtlas {
    pub hot: Bitmap,
    pub dim: Bitmap,
}

#[derive(Debug, Default)]
pub struct GlyphAtlasCache {
    sides: [Option<GlyphAtlas>; 2],
    pixel_ratio: f32,
    css_size: (f32, f32),
    pad_top: f32,
    pad_bottom: f32,
    rebuilds: u64,
}

impl GlyphAtlasCache {
    pub fn new(pad_top: f32, pad_bottom: f32) -> Self {
        Self {
            pad_top,
            pad_bottom,
            pixel_ratio: 1.0,
            ..Self::default()
        }
    }

    pub fn is_ready(&self) -> bool {
        self.sides.iter().all(Option::is_some)
    }

    pub fn side(&self, side: Side) -> Option<&GlyphAtlas> {
        self.sides[side.index()].as_ref()
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Logical size of each bitmap
    pub fn css_size(&self) -> (f32, f32) {
        self.css_size
    }

    /// Number of completed rebuilds
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn clear(&mut self) {
        self.sides = [None, None];
    }

    /// Repaint every bitmap from scratch. Leaves the cache empty when the
    /// layout has no usable size yet.
    pub fn rebuild(
        &mut self,
        surface: &dyn Surface,
        model: &TextGridModel,
        layout: &LayoutState,
        styles: &dyn StyleResolver,
        font_size: f32,
    ) -> bool {
        if !layout.is_ready() {
            self.clear();
            return false;
        }

        let rows = model.rows();
        let cols = model.cols();
        let row_h = layout.row_height_px;

        let width_css = (cols as f32 * layout.char_width_px + EDGE_PAD_PX).ceil();
        let height_css =
            (rows as f32 * row_h + self.pad_top + self.pad_bottom + EDGE_PAD_PX).ceil();

        let ratio = layout.pixel_ratio.max(1.0);
        let width_px = (width_css * ratio).floor() as u32;
        let height_px = (height_css * ratio).floor() as u32;
        if !Bitmap::fits(width_px, height_px) {
            tracing::warn!(
                "Glyph atlas of {width_px}x{height_px} pixels is too large ({rows} rows, {cols} cols), segments disabled"
            );
            self.clear();
            return false;
        }

        let hot = styles.color(ColorRole::TextHot);
        let dim = styles.color(ColorRole::TextDim);

        let paint = |side: Side, color| {
            let mut target = surface.create_offscreen(width_css, height_css);
            target.set_font_size(font_size);
            target.clear();
            for row in 0..rows {
                target.fill_text(model.row(side, row), 0.0, self.pad_top + row as f32 * row_h, color);
            }
            target.into_bitmap()
        };

        let sides = Side::ALL.map(|side| {
            Some(GlyphAtlas {
                hot: paint(side, hot),
                dim: paint(side, dim),
            })
        });

        self.sides = sides;
        self.pixel_ratio = layout.pixel_ratio;
        self.css_size = (width_css, height_css);
        self.rebuilds += 1;

        tracing::info!(
            "Rebuilt glyph atlas: {}x{} css ({} rows, {} cols)",
            width_css,
            height_css,
            rows,
            cols
        );
        true
    }
}
