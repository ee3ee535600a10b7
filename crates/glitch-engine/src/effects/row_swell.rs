// ABOUTME: Row swell: bands of rows stretch vertically in a half-sine bump.
// ABOUTME: Scales relax exponentially back to 1.0 and snap once close enough.

use std::f32::consts::PI;

use glitch_core::effects::SwellTunables;
use glitch_core::Toggle;
use rand::rngs::StdRng;

use super::{between, count_between, engine_rng, index_below, Effect, FrameContext};

pub struct RowSwell {
    tunables: SwellTunables,
    rng: StdRng,
    running: bool,
    next_at: f64,
    scales: Vec<f32>,
}

impl RowSwell {
    pub fn new(tunables: SwellTunables, seed: u64) -> Self {
        Self {
            tunables,
            rng: engine_rng(seed, 0x5E11),
            running: false,
            next_at: 0.0,
            scales: Vec::new(),
        }
    }

    /// Vertical scale of a row; 1.0 while stopped.
    pub fn scale(&self, row: usize) -> f32 {
        if !self.running {
            return 1.0;
        }
        match self.scales.get(row) {
            Some(&s) if s > 0.0 => s,
            _ => 1.0,
        }
    }

    /// Raise `band` rows from `start_row` by a half-sine of height `amp`.
    /// Existing larger scales are kept.
    pub fn bump(&mut self, start_row: usize, band: usize, amp: f32) {
        for i in 0..band {
            let row = start_row + i;
            let Some(scale) = self.scales.get_mut(row) else {
                continue;
            };
            let t = if band <= 1 {
                0.0
            } else {
                i as f32 / (band - 1) as f32
            };
            let s = 1.0 + amp * (t * PI).sin();
            if s > *scale {
                *scale = s;
            }
        }
    }

    fn emit(&mut self) -> bool {
        let rows = self.scales.len();
        if rows == 0 {
            return false;
        }
        let t = &self.tunables;
        let (band_min, band_max, amp_min, amp_max) = (t.band_min, t.band_max, t.amp_min, t.amp_max);

        let band = count_between(&mut self.rng, band_min, band_max);
        let start_row = index_below(&mut self.rng, rows.saturating_sub(band) + 1);
        let amp = between(&mut self.rng, amp_min, amp_max);

        self.bump(start_row, band, amp);
        true
    }

    fn relax(&mut self, dt_secs: f64) -> bool {
        let k = (self.tunables.relax_per_sec * dt_secs as f32).min(1.0);
        let epsilon = self.tunables.snap_epsilon;
        let mut changed = false;

        for scale in &mut self.scales {
            let s = *scale;
            if s == 1.0 {
                continue;
            }
            let next = s + (1.0 - s) * k;
            let next = if (next - 1.0).abs() < epsilon { 1.0 } else { next };
            if next != s {
                *scale = next;
                changed = true;
            }
        }
        changed
    }

    fn reset_scales(&mut self) {
        self.scales.fill(1.0);
    }
}

impl Effect for RowSwell {
    fn toggle(&self) -> Toggle {
        Toggle::Swell
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn start(&mut self, now_ms: f64, ctx: &FrameContext<'_>) {
        if self.running {
            return;
        }
        self.running = true;
        if self.scales.len() != ctx.model.rows() {
            self.on_grid_changed(ctx.model.rows());
        }
        self.next_at = now_ms + between(&mut self.rng, self.tunables.next_min_ms, self.tunables.next_max_ms);
    }

    fn stop(&mut self) {
        self.running = false;
        self.reset_scales();
    }

    fn update(&mut self, now_ms: f64, dt_secs: f64, _ctx: &FrameContext<'_>) -> bool {
        if !self.running {
            return false;
        }

        let mut changed = false;
        if now_ms >= self.next_at {
            changed |= self.emit();
            self.next_at = now_ms + between(&mut self.rng, self.tunables.next_min_ms, self.tunables.next_max_ms);
        }

        self.relax(dt_secs) || changed
    }

    fn on_grid_changed(&mut self, rows: usize) {
        self.scales = vec![1.0; rows];
    }

    fn is_neutral(&self) -> bool {
        !self.running || self.scales.iter().all(|&s| s == 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glitch_layout::{LayoutState, TextGridModel};

    fn quiet() -> SwellTunables {
        // No emissions during the test window
        SwellTunables {
            next_min_ms: 1.0e12,
            next_max_ms: 1.0e12,
            ..SwellTunables::default()
        }
    }

    fn started(tunables: SwellTunables, model: &TextGridModel) -> RowSwell {
        let layout = LayoutState::default();
        let mut swell = RowSwell::new(tunables, 7);
        swell.start(0.0, &FrameContext { model, layout: &layout });
        swell
    }

    #[test]
    fn bump_peaks_in_the_middle() {
        let model = TextGridModel::new(&"x\n".repeat(9), "");
        let mut swell = started(quiet(), &model);
        swell.bump(2, 5, 0.4);

        assert_eq!(swell.scale(1), 1.0);
        assert_eq!(swell.scale(2), 1.0);
        assert!((swell.scale(4) - 1.4).abs() < 1e-6);
        assert!(swell.scale(3) > 1.0 && swell.scale(3) < swell.scale(4));
        assert!((swell.scale(3) - swell.scale(5)).abs() < 1e-6);
    }

    #[test]
    fn bumps_combine_with_max() {
        let model = TextGridModel::new(&"x\n".repeat(9), "");
        let mut swell = started(quiet(), &model);
        swell.bump(0, 5, 0.5);
        swell.bump(0, 5, 0.2);
        assert!((swell.scale(2) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn single_row_band_is_flat() {
        let model = TextGridModel::new("x\nx", "");
        let mut swell = started(quiet(), &model);
        swell.bump(1, 1, 0.5);
        assert_eq!(swell.scale(1), 1.0);
    }

    #[test]
    fn relaxation_converges_to_exactly_one() {
        let model = TextGridModel::new(&"x\n".repeat(20), "");
        let layout = LayoutState::default();
        let ctx = FrameContext {
            model: &model,
            layout: &layout,
        };
        let mut swell = started(quiet(), &model);
        swell.bump(3, 10, 0.5);

        let mut last = swell.scale(7);
        let mut steps = 0;
        while !swell.is_neutral() {
            swell.update(steps as f64 * 16.0, 1.0 / 60.0, &ctx);
            let s = swell.scale(7);
            assert!(s <= last && s >= 1.0);
            last = s;
            steps += 1;
            assert!(steps < 1000, "did not converge");
        }
        assert_eq!(swell.scale(7), 1.0);
    }

    #[test]
    fn stop_restores_unit_scale() {
        let model = TextGridModel::new(&"x\n".repeat(20), "");
        let mut swell = started(quiet(), &model);
        swell.bump(0, 14, 0.5);
        swell.stop();
        swell.stop();
        assert!(swell.is_neutral());
        assert!((0..20).all(|row| swell.scale(row) == 1.0));
    }
}
