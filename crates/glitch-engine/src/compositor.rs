// ABOUTME: Per-frame drawing of the base text with row shifts, row swell, and block offsets.
// ABOUTME: Runs only when the dirty flag is set; overlays paint on top afterwards.

use glitch_core::{ColorRole, StyleResolver, Surface, Toggle, ToggleState};
use glitch_layout::{LayoutState, Side, TextGridModel};

use crate::effects::{Effect, EffectSet, RenderContext};
use crate::GlyphAtlasCache;

/// Canvas needs repainting.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirtyFlag {
    dirty: bool,
}

impl DirtyFlag {
    pub fn mark(&mut self) {
        self.dirty = true;
    }

    pub fn is_set(&self) -> bool {
        self.dirty
    }

    /// Read and clear. Marks made after this call are kept for the next frame.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

/// Where every row lands this frame. Captured once so the base text and the
/// segment overlay use identical offsets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameGeometry {
    origins: [(f32, f32); 2],
    shifts: [Vec<f32>; 2],
    scales: Vec<f32>,
}

impl FrameGeometry {
    pub fn capture(
        toggles: &ToggleState,
        effects: &mut EffectSet,
        layout: &LayoutState,
        rows: usize,
        now_ms: f64,
    ) -> Self {
        let orbit_on = toggles.active(Toggle::Orbit);
        let scan_on = toggles.active(Toggle::Scan) && effects.scan.is_running();
        let swell_on = toggles.active(Toggle::Swell);

        let origins = Side::ALL.map(|side| {
            let (x, y) = layout.column_origin(side);
            let (dx, dy) = if orbit_on {
                effects.orbit.offset(side)
            } else {
                (0.0, 0.0)
            };
            (x + dx, y + dy)
        });

        let shifts = Side::ALL.map(|side| {
            (0..rows)
                .map(|row| {
                    if scan_on {
                        effects.scan.shift_at(side, row, now_ms)
                    } else {
                        0.0
                    }
                })
                .collect()
        });

        let scales = (0..rows)
            .map(|row| if swell_on { effects.swell.scale(row) } else { 1.0 })
            .collect();

        Self {
            origins,
            shifts,
            scales,
        }
    }

    pub fn origin(&self, side: Side) -> (f32, f32) {
        self.origins[side.index()]
    }

    pub fn shift(&self, side: Side, row: usize) -> f32 {
        self.shifts[side.index()].get(row).copied().unwrap_or(0.0)
    }

    pub fn scale(&self, row: usize) -> f32 {
        self.scales.get(row).copied().unwrap_or(1.0)
    }
}

/// Inputs for one draw.
pub struct Scene<'a> {
    pub toggles: &'a ToggleState,
    pub model: &'a TextGridModel,
    pub layout: &'a LayoutState,
    pub styles: &'a dyn StyleResolver,
    pub atlas: &'a GlyphAtlasCache,
    pub effects: &'a EffectSet,
    pub geometry: &'a FrameGeometry,
    pub now_ms: f64,
}

#[derive(Debug, Clone)]
pub struct Compositor {
    font_size: f32,
    frames_drawn: u64,
}

impl Compositor {
    pub fn new(font_size: f32) -> Self {
        Self {
            font_size,
            frames_drawn: 0,
        }
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn draw(&mut self, surface: &mut dyn Surface, scene: &Scene<'_>) {
        self.frames_drawn += 1;
        surface.clear();
        if !scene.toggles.master {
            return;
        }

        let base = scene.styles.color(ColorRole::TextBase);
        let row_h = scene.layout.row_height_px;
        surface.set_font_size(self.font_size);

        for side in Side::ALL {
            let (x, y) = scene.geometry.origin(side);
            for row in 0..scene.model.rows() {
                let text = scene.model.row(side, row);
                let row_x = x + scene.geometry.shift(side, row);
                let row_y = y + row as f32 * row_h;
                let scale = scene.geometry.scale(row);

                if scale != 1.0 {
                    surface.save();
                    surface.translate(row_x, row_y);
                    surface.scale(1.0, scale);
                    surface.fill_text(text, 0.0, 0.0, base);
                    surface.restore();
                } else {
                    surface.fill_text(text, row_x, row_y, base);
                }
            }
        }

        if scene.toggles.active(Toggle::Segments) {
            let ctx = RenderContext {
                model: scene.model,
                layout: scene.layout,
                atlas: scene.atlas,
                geometry: scene.geometry,
                now_ms: scene.now_ms,
            };
            scene.effects.segments.render(surface, &ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_clears_and_later_marks_survive() {
        let mut dirty = DirtyFlag::default();
        assert!(!dirty.take());
        dirty.mark();
        assert!(dirty.take());
        assert!(!dirty.is_set());
        dirty.mark();
        assert!(dirty.is_set());
    }

    #[test]
    fn missing_rows_read_as_neutral() {
        let geometry = FrameGeometry::default();
        assert_eq!(geometry.shift(Side::Left, 9), 0.0);
        assert_eq!(geometry.scale(9), 1.0);
    }
}
