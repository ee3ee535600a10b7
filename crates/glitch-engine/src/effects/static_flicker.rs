// ABOUTME: Static overlay flicker: a steady faint opacity with rare short blackouts.
// ABOUTME: Publishes an opacity value; the presenter draws the noise itself.

use glitch_core::effects::StaticTunables;
use glitch_core::Toggle;
use rand::rngs::StdRng;

use super::{between, chance, engine_rng, Effect, FrameContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Steady,
    Blackout,
}

pub struct StaticFlicker {
    tunables: StaticTunables,
    rng: StdRng,
    running: bool,
    phase: Phase,
    next_at: f64,
    off_until: f64,
}

impl StaticFlicker {
    pub fn new(tunables: StaticTunables, seed: u64) -> Self {
        Self {
            tunables,
            rng: engine_rng(seed, 0x57A7),
            running: false,
            phase: Phase::Steady,
            next_at: 0.0,
            off_until: 0.0,
        }
    }

    /// Overlay opacity to show right now; 0 while stopped or blacked out.
    pub fn opacity(&self) -> f32 {
        match (self.running, self.phase) {
            (true, Phase::Steady) => self.tunables.opacity,
            _ => 0.0,
        }
    }

    pub fn is_blackout(&self) -> bool {
        self.running && self.phase == Phase::Blackout
    }

    fn schedule_next(&mut self, now_ms: f64) {
        self.next_at = now_ms
            + between(
                &mut self.rng,
                self.tunables.next_tick_min_ms,
                self.tunables.next_tick_max_ms,
            );
    }
}

impl Effect for StaticFlicker {
    fn toggle(&self) -> Toggle {
        Toggle::Static
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn start(&mut self, now_ms: f64, _ctx: &FrameContext<'_>) {
        if self.running {
            return;
        }
        self.running = true;
        self.phase = Phase::Steady;
        self.off_until = 0.0;
        self.schedule_next(now_ms);
    }

    fn stop(&mut self) {
        self.running = false;
        self.phase = Phase::Steady;
        self.off_until = 0.0;
    }

    fn update(&mut self, now_ms: f64, _dt_secs: f64, _ctx: &FrameContext<'_>) -> bool {
        if !self.running {
            return false;
        }

        let before = self.phase;

        if self.off_until > now_ms {
            self.phase = Phase::Blackout;
            return before != self.phase;
        }
        self.phase = Phase::Steady;

        if now_ms >= self.next_at {
            self.schedule_next(now_ms);
            if chance(&mut self.rng, self.tunables.flicker_chance) {
                let off_for = between(
                    &mut self.rng,
                    self.tunables.off_for_min_ms,
                    self.tunables.off_for_max_ms,
                );
                self.off_until = now_ms + off_for;
                self.phase = Phase::Blackout;
                tracing::debug!("Static blackout for {off_for:.0}ms");
            }
        }

        before != self.phase
    }

    fn is_neutral(&self) -> bool {
        self.opacity() == 0.0
    }
}
