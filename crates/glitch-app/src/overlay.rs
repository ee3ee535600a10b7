// ABOUTME: Paints the status readout and FPS label onto the HUD layer.
// ABOUTME: The layer sits above the canvas, so the canvas stays untouched.

use glitch_core::{Color, RectF, Surface};
use glitch_engine::HudReadout;

const HUD_TEXT: Color = Color::rgb(0.85, 0.9, 0.94);
const HUD_PANEL: Color = Color::rgba(0.0, 0.0, 0.0, 0.65);

#[derive(Debug, Clone)]
pub struct HudPainter {
    pub font_size: f32,
    pub line_height: f32,
    pub margin: f32,
}

impl Default for HudPainter {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            line_height: 15.0,
            margin: 12.0,
        }
    }
}

impl HudPainter {
    /// Redraw the layer. `width_css` is the logical layer width.
    pub fn paint(
        &self,
        surface: &mut dyn Surface,
        width_css: f32,
        readout: Option<&HudReadout>,
        fps_label: Option<&str>,
    ) {
        surface.clear();
        if readout.is_none() && fps_label.is_none() {
            return;
        }
        surface.set_font_size(self.font_size);

        if let Some(readout) = readout {
            let lines: Vec<&str> = readout.text.lines().collect();
            let text_width = lines
                .iter()
                .map(|line| surface.measure_text(line))
                .fold(0.0f32, f32::max);
            let pad = self.margin / 2.0;

            surface.save();
            surface.set_global_alpha(readout.opacity);
            surface.fill_rect(
                RectF::new(
                    self.margin - pad,
                    self.margin - pad,
                    text_width + pad * 2.0,
                    lines.len() as f32 * self.line_height + pad * 2.0,
                ),
                HUD_PANEL,
            );
            for (i, line) in lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let y = self.margin + i as f32 * self.line_height;
                surface.fill_text(line, self.margin, y, HUD_TEXT);
            }
            surface.restore();
        }

        if let Some(label) = fps_label {
            let x = width_css - surface.measure_text(label) - self.margin;
            surface.fill_text(label, x.max(0.0), self.margin, HUD_TEXT);
        }
    }
}
