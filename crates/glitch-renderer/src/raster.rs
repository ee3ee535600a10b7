// ABOUTME: Software raster surface with a canvas-like API over an RGBA bitmap.
// ABOUTME: Text goes through fontdue; blending is source-over with straight alpha.

use fontdue::Metrics;
use glitch_core::{Bitmap, Color, PixelRect, RectF, Surface};
use std::collections::HashMap;

use crate::fonts::GlyphSource;

const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Transform and alpha; pushed by `save`, popped by `restore`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DrawState {
    tx: f32,
    ty: f32,
    sx: f32,
    sy: f32,
    alpha: f32,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            tx: 0.0,
            ty: 0.0,
            sx: 1.0,
            sy: 1.0,
            alpha: 1.0,
        }
    }
}

struct RasterGlyph {
    metrics: Metrics,
    coverage: Vec<u8>,
}

pub struct PixelSurface {
    glyphs: GlyphSource,
    font_size: f32,
    pixel_ratio: f32,
    bitmap: Bitmap,
    state: DrawState,
    stack: Vec<DrawState>,
    /// Rasterized glyphs keyed by character and device pixel size
    cache: HashMap<(char, u32), RasterGlyph>,
}

/// Source-over blend of a straight-alpha color into one RGBA8 pixel.
fn blend(dst: &mut [u8], rgb: [f32; 3], alpha: f32) {
    let a = alpha.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = a + da * (1.0 - a);
    for i in 0..3 {
        let dc = dst[i] as f32 / 255.0;
        let c = (rgb[i] * a + dc * da * (1.0 - a)) / out_a;
        dst[i] = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

impl PixelSurface {
    pub fn new(glyphs: GlyphSource) -> Self {
        Self {
            glyphs,
            font_size: DEFAULT_FONT_SIZE,
            pixel_ratio: 1.0,
            bitmap: Bitmap::new(1, 1),
            state: DrawState::default(),
            stack: Vec::new(),
            cache: HashMap::new(),
        }
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn glyphs(&self) -> &GlyphSource {
        &self.glyphs
    }

    fn to_device(&self, x: f32, y: f32) -> (f32, f32) {
        let s = &self.state;
        (
            (s.tx + s.sx * x) * self.pixel_ratio,
            (s.ty + s.sy * y) * self.pixel_ratio,
        )
    }

    fn blend_at(&mut self, x: i32, y: i32, rgb: [f32; 3], alpha: f32) {
        if x < 0 || y < 0 {
            return;
        }
        let Some(i) = self.bitmap.offset(x as u32, y as u32) else {
            return;
        };
        blend(&mut self.bitmap.pixels_mut()[i..i + 4], rgb, alpha);
    }

    /// Device-pixel span covered by `[a, b)`, clipped to `limit`.
    fn span(a: f32, b: f32, limit: u32) -> std::ops::Range<i32> {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let lo = (lo.round() as i32).max(0);
        let hi = (hi.round() as i32).min(limit as i32);
        lo..hi.max(lo)
    }

    fn fill_device_rect(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, rgb: [f32; 3], alpha: f32) {
        let xs = Self::span(x0, x1, self.bitmap.width());
        let ys = Self::span(y0, y1, self.bitmap.height());
        for y in ys {
            for x in xs.clone() {
                self.blend_at(x, y, rgb, alpha);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_glyph(&mut self, c: char, size_px: f32, pen_x: f32, baseline: f32, stretch: f32, rgb: [f32; 3], alpha: f32) {
        let GlyphSource::Font(font) = &self.glyphs else {
            return;
        };
        let key = (c, size_px.to_bits());
        if !self.cache.contains_key(&key) {
            let (metrics, coverage) = font.rasterize(c, size_px);
            self.cache.insert(key, RasterGlyph { metrics, coverage });
        }
        let Some(glyph) = self.cache.get(&key) else {
            return;
        };
        let m = glyph.metrics;
        if m.width == 0 || m.height == 0 {
            return;
        }

        // fontdue's ymin is the bitmap bottom measured upward from the baseline
        let top = baseline - (m.ymin as f32 + m.height as f32) * stretch;
        let left = pen_x.round() as i32 + m.xmin;
        let rows = ((m.height as f32 * stretch).ceil() as usize).max(1);

        let mut spans = Vec::with_capacity(rows * m.width);
        for gy in 0..rows {
            let src_row = ((gy as f32 / stretch) as usize).min(m.height - 1);
            let y = (top + gy as f32).round() as i32;
            for gx in 0..m.width {
                let cov = glyph.coverage[src_row * m.width + gx];
                if cov > 0 {
                    spans.push((left + gx as i32, y, cov));
                }
            }
        }
        for (x, y, cov) in spans {
            self.blend_at(x, y, rgb, alpha * cov as f32 / 255.0);
        }
    }
}

impl Surface for PixelSurface {
    fn pixel_size(&self) -> (u32, u32) {
        (self.bitmap.width(), self.bitmap.height())
    }

    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn resize(&mut self, width_css: f32, height_css: f32, pixel_ratio: f32) {
        self.pixel_ratio = pixel_ratio.max(1.0);
        let width = (width_css.max(0.0) * self.pixel_ratio).floor() as u32;
        let height = (height_css.max(0.0) * self.pixel_ratio).floor() as u32;
        self.bitmap = Bitmap::try_new(width, height).unwrap_or_else(|| {
            tracing::warn!("Surface of {width}x{height} pixels is too large, drawing nothing");
            Bitmap::new(1, 1)
        });
        self.state = DrawState::default();
        self.stack.clear();
    }

    fn clear(&mut self) {
        self.bitmap.clear();
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.state.tx += self.state.sx * dx;
        self.state.ty += self.state.sy * dy;
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.state.sx *= sx;
        self.state.sy *= sy;
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_font_size(&mut self, px: f32) {
        self.font_size = px.max(0.0);
    }

    fn measure_text(&self, text: &str) -> f32 {
        text.chars()
            .map(|c| self.glyphs.advance(c, self.font_size))
            .sum()
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Color) {
        let alpha = color.a * self.state.alpha;
        if alpha <= 0.0 || self.font_size <= 0.0 || self.state.sx <= 0.0 {
            return;
        }
        let rgb = [color.r, color.g, color.b];
        let ratio = self.pixel_ratio;
        let (sx, sy) = (self.state.sx, self.state.sy);
        let size_px = self.font_size * ratio * sx;
        let stretch = sy / sx;
        let ascent = self.glyphs.ascent(self.font_size);

        let (mut pen_x, top) = self.to_device(x, y);
        let baseline = top + ascent * ratio * sy;

        for c in text.chars() {
            let advance = self.glyphs.advance(c, self.font_size) * ratio * sx;
            if !c.is_whitespace() {
                if self.glyphs.is_blocks() {
                    let inset = advance * 0.1;
                    let height = ascent * ratio * sy;
                    self.fill_device_rect(
                        pen_x + inset,
                        baseline - height,
                        pen_x + advance - inset,
                        baseline,
                        rgb,
                        alpha,
                    );
                } else {
                    self.draw_glyph(c, size_px, pen_x, baseline, stretch, rgb, alpha);
                }
            }
            pen_x += advance;
        }
    }

    fn fill_rect(&mut self, rect: RectF, color: Color) {
        let (x0, y0) = self.to_device(rect.x, rect.y);
        let (x1, y1) = self.to_device(rect.x + rect.width, rect.y + rect.height);
        let alpha = color.a * self.state.alpha;
        self.fill_device_rect(x0, y0, x1, y1, [color.r, color.g, color.b], alpha);
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap, src: PixelRect, dst: RectF) {
        if src.width == 0 || src.height == 0 {
            return;
        }
        let (x0, y0) = self.to_device(dst.x, dst.y);
        let (x1, y1) = self.to_device(dst.x + dst.width, dst.y + dst.height);
        let (w, h) = (x1 - x0, y1 - y0);
        if w.abs() < f32::EPSILON || h.abs() < f32::EPSILON {
            return;
        }

        let global = self.state.alpha;
        for y in Self::span(y0, y1, self.bitmap.height()) {
            let v = ((y as f32 + 0.5 - y0) / h * src.height as f32).floor();
            if v < 0.0 || v >= src.height as f32 {
                continue;
            }
            for x in Self::span(x0, x1, self.bitmap.width()) {
                let u = ((x as f32 + 0.5 - x0) / w * src.width as f32).floor();
                if u < 0.0 || u >= src.width as f32 {
                    continue;
                }
                let texel = bitmap.pixel(src.x + u as u32, src.y + v as u32);
                if texel[3] == 0 {
                    continue;
                }
                let c = Color::from_rgba8(texel);
                self.blend_at(x, y, [c.r, c.g, c.b], c.a * global);
            }
        }
    }

    fn create_offscreen(&self, width_css: f32, height_css: f32) -> Box<dyn Surface> {
        let mut surface = PixelSurface::new(self.glyphs.clone());
        surface.font_size = self.font_size;
        surface.resize(width_css, height_css, self.pixel_ratio);
        Box::new(surface)
    }

    fn into_bitmap(self: Box<Self>) -> Bitmap {
        self.bitmap
    }
}
