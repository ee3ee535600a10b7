// ABOUTME: Canvas geometry for the two-column text layout.
// ABOUTME: Derives column origins, row height, and canvas size from container size and metrics.

use glitch_core::{Metrics, Surface};

use crate::Side;

/// Geometry of the canvas, in logical pixels unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutState {
    /// Device pixels per logical pixel, never below 1
    pub pixel_ratio: f32,
    pub canvas_width_css: f32,
    pub canvas_height_css: f32,
    /// Half the container width
    pub column_width_css: f32,
    /// Advance of one monospace cell
    pub char_width_px: f32,
    pub row_height_px: f32,
    /// Padding around both columns
    pub inset_px: f32,
    pub split_gap_px: f32,
}

impl LayoutState {
    /// False while any dimension needed for drawing is zero
    pub fn is_ready(&self) -> bool {
        self.pixel_ratio > 0.0
            && self.canvas_width_css > 0.0
            && self.canvas_height_css > 0.0
            && self.char_width_px > 0.0
            && self.row_height_px > 0.0
    }

    /// Top-left corner of a column before any motion offset.
    pub fn column_origin(&self, side: Side) -> (f32, f32) {
        let x = match side {
            Side::Left => self.inset_px,
            Side::Right => self.column_width_css + self.split_gap_px + self.inset_px,
        };
        (x, self.inset_px)
    }

    /// Canvas size in device pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.canvas_width_css * self.pixel_ratio).floor().max(1.0) as u32,
            (self.canvas_height_css * self.pixel_ratio).floor().max(1.0) as u32,
        )
    }
}

#[derive(Debug, Clone)]
pub struct LayoutEngine {
    metrics: Metrics,
    state: LayoutState,
}

impl LayoutEngine {
    pub fn new(metrics: Metrics) -> Self {
        Self {
            metrics,
            state: LayoutState::default(),
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn state(&self) -> &LayoutState {
        &self.state
    }

    pub fn row_height(&self) -> f32 {
        self.metrics.font_size_px * self.metrics.line_height
    }

    /// Width of one cell, measured with "M" at the configured font size.
    pub fn measure_char_width(&self, surface: &mut dyn Surface) -> f32 {
        surface.set_font_size(self.metrics.font_size_px);
        surface.measure_text("M")
    }

    pub fn recompute(
        &mut self,
        container_width_css: f32,
        pixel_ratio: f32,
        rows: usize,
        char_width: f32,
    ) -> LayoutState {
        let row_height = self.row_height();
        let padding = self.metrics.padding_px;
        let width = container_width_css.max(0.0);

        self.state = LayoutState {
            pixel_ratio: pixel_ratio.max(1.0),
            canvas_width_css: width,
            canvas_height_css: (rows as f32 * row_height).ceil() + padding * 2.0,
            column_width_css: width / 2.0,
            char_width_px: char_width.max(0.0),
            row_height_px: row_height,
            inset_px: padding,
            split_gap_px: self.metrics.split_gap_px,
        };

        if self.state.is_ready() {
            tracing::info!(
                "Layout: {:.0}x{:.0} css @{}x, char {:.2}px, row {:.3}px",
                self.state.canvas_width_css,
                self.state.canvas_height_css,
                self.state.pixel_ratio,
                self.state.char_width_px,
                self.state.row_height_px
            );
        } else {
            tracing::warn!("Layout not ready (width {width}, char width {char_width})");
        }

        self.state
    }
}
