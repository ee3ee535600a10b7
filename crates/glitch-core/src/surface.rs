// ABOUTME: Drawing surface contract used by the compositor and the glyph atlas.
// ABOUTME: Includes the RGBA bitmap type and a command-recording surface.

use crate::Color;

/// Rectangle in logical (CSS) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Rectangle in device pixels of a bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Largest bitmap accepted, in pixels (256 MiB of RGBA)
pub const MAX_BITMAP_PIXELS: usize = 1 << 26;

/// Straight-alpha RGBA8 pixel buffer. Never smaller than 1x1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Blank bitmap; falls back to 1x1 when the size is past [`MAX_BITMAP_PIXELS`].
    pub fn new(width: u32, height: u32) -> Self {
        Self::try_new(width, height).unwrap_or_else(|| Self {
            width: 1,
            height: 1,
            pixels: vec![0; 4],
        })
    }

    /// Blank bitmap, or `None` when the size is past [`MAX_BITMAP_PIXELS`].
    pub fn try_new(width: u32, height: u32) -> Option<Self> {
        let width = width.max(1);
        let height = height.max(1);
        let len = Self::byte_len(width, height)?;
        Some(Self {
            width,
            height,
            pixels: vec![0; len],
        })
    }

    /// Buffer length for a `width` x `height` bitmap, `None` past the pixel cap.
    pub fn byte_len(width: u32, height: u32) -> Option<usize> {
        let pixels = (width.max(1) as usize).checked_mul(height.max(1) as usize)?;
        if pixels > MAX_BITMAP_PIXELS {
            return None;
        }
        pixels.checked_mul(4)
    }

    pub fn fits(width: u32, height: u32) -> bool {
        Self::byte_len(width, height).is_some()
    }

    /// Byte offset of pixel `(x, y)`, `None` outside the bitmap
    pub fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let Some(i) = self.offset(x, y) else {
            return [0; 4];
        };
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let Some(i) = self.offset(x, y) else {
            return;
        };
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// True when every pixel is fully transparent
    pub fn is_blank(&self) -> bool {
        self.pixels.chunks_exact(4).all(|p| p[3] == 0)
    }
}

/// A 2D raster target with canvas-like drawing operations.
///
/// Coordinates are logical pixels; implementations apply their pixel ratio.
/// Text is positioned by the top of its line box.
pub trait Surface {
    /// Backing size in device pixels
    fn pixel_size(&self) -> (u32, u32);

    fn pixel_ratio(&self) -> f32;

    /// Resize the backing store; contents are discarded and state reset.
    fn resize(&mut self, width_css: f32, height_css: f32, pixel_ratio: f32);

    /// Clear every pixel to transparent.
    fn clear(&mut self);

    fn save(&mut self);

    fn restore(&mut self);

    fn translate(&mut self, dx: f32, dy: f32);

    fn scale(&mut self, sx: f32, sy: f32);

    fn set_global_alpha(&mut self, alpha: f32);

    fn set_font_size(&mut self, px: f32);

    fn measure_text(&self, text: &str) -> f32;

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Color);

    fn fill_rect(&mut self, rect: RectF, color: Color);

    /// Copy `src` (bitmap pixels) into `dst` (logical pixels), honoring global alpha.
    fn draw_bitmap(&mut self, bitmap: &Bitmap, src: PixelRect, dst: RectF);

    /// A new surface sharing this one's pixel ratio, font, and font size.
    fn create_offscreen(&self, width_css: f32, height_css: f32) -> Box<dyn Surface>;

    fn into_bitmap(self: Box<Self>) -> Bitmap;
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Clear,
    Save,
    Restore,
    Translate(f32, f32),
    Scale(f32, f32),
    GlobalAlpha(f32),
    FontSize(f32),
    FillText {
        text: String,
        x: f32,
        y: f32,
        color: Color,
    },
    FillRect {
        rect: RectF,
        color: Color,
    },
    DrawBitmap {
        bitmap_size: (u32, u32),
        src: PixelRect,
        dst: RectF,
    },
}

/// Surface that records calls instead of rasterizing. Every glyph advances by
/// a fixed width.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    char_width: f32,
    width_css: f32,
    height_css: f32,
    pixel_ratio: f32,
    ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    pub fn new(char_width: f32) -> Self {
        Self {
            char_width,
            width_css: 0.0,
            height_css: 0.0,
            pixel_ratio: 1.0,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    /// Ops recorded since the most recent `Clear` (inclusive)
    pub fn last_frame(&self) -> &[SurfaceOp] {
        let start = self
            .ops
            .iter()
            .rposition(|op| *op == SurfaceOp::Clear)
            .unwrap_or(0);
        &self.ops[start..]
    }
}

impl Surface for RecordingSurface {
    fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width_css * self.pixel_ratio).floor().max(1.0) as u32,
            (self.height_css * self.pixel_ratio).floor().max(1.0) as u32,
        )
    }

    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn resize(&mut self, width_css: f32, height_css: f32, pixel_ratio: f32) {
        self.width_css = width_css;
        self.height_css = height_css;
        self.pixel_ratio = pixel_ratio.max(1.0);
    }

    fn clear(&mut self) {
        self.ops.push(SurfaceOp::Clear);
    }

    fn save(&mut self) {
        self.ops.push(SurfaceOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(SurfaceOp::Restore);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.ops.push(SurfaceOp::Translate(dx, dy));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.ops.push(SurfaceOp::Scale(sx, sy));
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.ops.push(SurfaceOp::GlobalAlpha(alpha));
    }

    fn set_font_size(&mut self, px: f32) {
        self.ops.push(SurfaceOp::FontSize(px));
    }

    fn measure_text(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.char_width
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Color) {
        self.ops.push(SurfaceOp::FillText {
            text: text.to_string(),
            x,
            y,
            color,
        });
    }

    fn fill_rect(&mut self, rect: RectF, color: Color) {
        self.ops.push(SurfaceOp::FillRect { rect, color });
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap, src: PixelRect, dst: RectF) {
        self.ops.push(SurfaceOp::DrawBitmap {
            bitmap_size: (bitmap.width(), bitmap.height()),
            src,
            dst,
        });
    }

    fn create_offscreen(&self, width_css: f32, height_css: f32) -> Box<dyn Surface> {
        let mut surface = RecordingSurface::new(self.char_width);
        surface.resize(width_css, height_css, self.pixel_ratio);
        Box::new(surface)
    }

    fn into_bitmap(self: Box<Self>) -> Bitmap {
        let (w, h) = self.pixel_size();
        Bitmap::new(w, h)
    }
}
