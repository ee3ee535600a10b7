// ABOUTME: Horizontal sync loss: random rows jump sideways for a moment.
// ABOUTME: Also arms short whole-loop freezes that the frame loop consumes.

use glitch_core::effects::ScanTunables;
use glitch_core::Toggle;
use glitch_layout::Side;
use rand::rngs::StdRng;

use super::{between, chance, count_between, engine_rng, index_below, Effect, FrameContext};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct RowShift {
    dx: f32,
    /// Expiry timestamp (ms); 0 when idle
    until: f64,
}

pub struct ScanDesync {
    tunables: ScanTunables,
    rng: StdRng,
    running: bool,
    next_at: f64,
    freeze_frames: u32,
    shifts: [Vec<RowShift>; 2],
}

impl ScanDesync {
    pub fn new(tunables: ScanTunables, seed: u64) -> Self {
        Self {
            tunables,
            rng: engine_rng(seed, 0x5CA4),
            running: false,
            next_at: 0.0,
            freeze_frames: 0,
            shifts: [Vec::new(), Vec::new()],
        }
    }

    /// Horizontal displacement of a row at `now_ms`. Expired shifts read as 0
    /// even before the next update clears them.
    pub fn shift_at(&self, side: Side, row: usize, now_ms: f64) -> f32 {
        if !self.running {
            return 0.0;
        }
        match self.shifts[side.index()].get(row) {
            Some(slot) if slot.until > 0.0 && now_ms < slot.until => slot.dx,
            _ => 0.0,
        }
    }

    /// Expiry time of a row's pending shift, if any
    pub fn shift_expiry(&self, side: Side, row: usize) -> Option<f64> {
        self.shifts[side.index()]
            .get(row)
            .filter(|slot| slot.until > 0.0)
            .map(|slot| slot.until)
    }

    /// Displace one row by `dx` for `duration_ms` starting at `now_ms`.
    pub fn apply_shift(&mut self, side: Side, row: usize, dx: f32, now_ms: f64, duration_ms: f64) {
        if let Some(slot) = self.shifts[side.index()].get_mut(row) {
            slot.dx = dx;
            slot.until = now_ms + duration_ms;
        }
    }

    pub fn freeze_frames(&self) -> u32 {
        self.freeze_frames
    }

    pub fn arm_freeze(&mut self, frames: u32) {
        if self.running {
            self.freeze_frames = frames;
        }
    }

    /// Consume one freeze frame. True when the caller should skip this frame.
    pub fn take_freeze_frame(&mut self) -> bool {
        if self.running && self.freeze_frames > 0 {
            self.freeze_frames -= 1;
            true
        } else {
            false
        }
    }

    fn clear_shifts(&mut self) {
        for side in &mut self.shifts {
            side.fill(RowShift::default());
        }
    }

    fn expire(&mut self, now_ms: f64) -> bool {
        let mut expired = false;
        for slot in self.shifts.iter_mut().flatten() {
            if slot.until > 0.0 && now_ms >= slot.until {
                *slot = RowShift::default();
                expired = true;
            }
        }
        expired
    }

    fn tick(&mut self, now_ms: f64) -> bool {
        let t = self.tunables.clone();
        self.next_at = now_ms + between(&mut self.rng, t.next_tick_min_ms, t.next_tick_max_ms);

        // One roll decides both: freezes are a subset of shifting ticks
        let roll: f64 = between(&mut self.rng, 0.0, 1.0);

        if roll < t.freeze_chance {
            self.freeze_frames = 1 + index_below(&mut self.rng, 2) as u32;
            tracing::debug!("Scan freeze for {} frames", self.freeze_frames);
        }

        if roll >= t.shift_chance {
            return false;
        }

        let rows = self.shifts[0].len();
        if rows == 0 {
            return false;
        }

        let count = count_between(&mut self.rng, t.shift_line_count_min, t.shift_line_count_max);
        let duration = between(&mut self.rng, t.shift_duration_min_ms, t.shift_duration_max_ms);
        let max_shift = between(&mut self.rng, t.shift_max_px_min, t.shift_max_px_max);

        for _ in 0..count {
            let row = index_below(&mut self.rng, rows);
            let sign: f32 = if chance(&mut self.rng, 0.5) { -1.0 } else { 1.0 };
            let dx = sign * between(&mut self.rng, t.shift_min_px, max_shift);

            match index_below(&mut self.rng, 3) {
                0 => self.apply_shift(Side::Left, row, dx, now_ms, duration),
                1 => self.apply_shift(Side::Right, row, -dx, now_ms, duration),
                _ => {
                    self.apply_shift(Side::Left, row, dx, now_ms, duration);
                    self.apply_shift(Side::Right, row, -dx, now_ms, duration);
                }
            }
        }

        tracing::debug!("Scan desync: {count} rows for {duration:.0}ms");
        true
    }
}

impl Effect for ScanDesync {
    fn toggle(&self) -> Toggle {
        Toggle::Scan
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn start(&mut self, now_ms: f64, ctx: &FrameContext<'_>) {
        if self.running {
            return;
        }
        self.running = true;
        self.freeze_frames = 0;
        if self.shifts[0].len() != ctx.model.rows() {
            self.on_grid_changed(ctx.model.rows());
        }
        self.clear_shifts();
        self.next_at = now_ms
            + between(
                &mut self.rng,
                self.tunables.initial_delay_min_ms,
                self.tunables.initial_delay_max_ms,
            );
    }

    fn stop(&mut self) {
        self.running = false;
        self.freeze_frames = 0;
        self.clear_shifts();
    }

    fn update(&mut self, now_ms: f64, _dt_secs: f64, _ctx: &FrameContext<'_>) -> bool {
        if !self.running {
            return false;
        }
        let expired = self.expire(now_ms);
        if now_ms < self.next_at {
            return expired;
        }
        self.tick(now_ms) || expired
    }

    fn on_grid_changed(&mut self, rows: usize) {
        for side in &mut self.shifts {
            side.clear();
            side.resize(rows, RowShift::default());
        }
    }

    fn is_neutral(&self) -> bool {
        self.freeze_frames == 0 && self.shifts.iter().flatten().all(|slot| slot.dx == 0.0)
    }
}
