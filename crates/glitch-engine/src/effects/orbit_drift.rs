// ABOUTME: Orbit drift: each column block circles slowly around a wandering center.
// ABOUTME: Left and right orbit in opposite directions; every query adds fresh jitter.

use std::f32::consts::TAU;

use glitch_core::effects::OrbitTunables;
use glitch_core::Toggle;
use glitch_layout::Side;
use rand::rngs::StdRng;

use super::{between, engine_rng, Effect, FrameContext};

pub struct OrbitDrift {
    tunables: OrbitTunables,
    rng: StdRng,
    running: bool,
    phase: f32,
    radius: f32,
    /// Revolutions per second
    speed: f32,
    drift_target: (f32, f32),
    drift: (f32, f32),
}

impl OrbitDrift {
    pub fn new(tunables: OrbitTunables, seed: u64) -> Self {
        Self {
            tunables,
            rng: engine_rng(seed, 0x0B17),
            running: false,
            phase: 0.0,
            radius: 14.0,
            speed: 0.06,
            drift_target: (0.0, 0.0),
            drift: (0.0, 0.0),
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn drift(&self) -> (f32, f32) {
        self.drift
    }

    /// Orbit plus drift for one side, without jitter
    pub fn base_offset(&self, side: Side) -> (f32, f32) {
        if !self.running {
            return (0.0, 0.0);
        }
        let dir = match side {
            Side::Left => 1.0,
            Side::Right => -1.0,
        };
        let angle = self.phase * dir;
        (
            angle.cos() * self.radius + self.drift.0,
            angle.sin() * self.radius * self.tunables.y_scale + self.drift.1,
        )
    }

    /// Block offset for one side; `(0, 0)` while stopped.
    pub fn offset(&mut self, side: Side) -> (f32, f32) {
        if !self.running {
            return (0.0, 0.0);
        }
        let (x, y) = self.base_offset(side);
        let jitter = self.tunables.micro_jitter;
        let jx = between(&mut self.rng, -jitter, jitter);
        let jy = between(&mut self.rng, -jitter, jitter);
        (x + jx, y + jy)
    }

    fn reset_drift(&mut self) {
        self.drift_target = (0.0, 0.0);
        self.drift = (0.0, 0.0);
    }
}

impl Effect for OrbitDrift {
    fn toggle(&self) -> Toggle {
        Toggle::Orbit
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn start(&mut self, _now_ms: f64, _ctx: &FrameContext<'_>) {
        if self.running {
            return;
        }
        self.running = true;
        let t = &self.tunables;
        let (radius_min, radius_max, speed_min, speed_max) = (t.radius_min, t.radius_max, t.speed_min, t.speed_max);
        self.radius = between(&mut self.rng, radius_min, radius_max);
        self.speed = between(&mut self.rng, speed_min, speed_max);
        self.phase = between(&mut self.rng, 0.0, TAU);
        self.reset_drift();
        tracing::debug!("Orbit radius {:.1}px at {:.3} rev/s", self.radius, self.speed);
    }

    fn stop(&mut self) {
        self.running = false;
        self.reset_drift();
    }

    fn update(&mut self, _now_ms: f64, dt_secs: f64, _ctx: &FrameContext<'_>) -> bool {
        if !self.running {
            return false;
        }
        let dt = dt_secs as f32;
        let t = self.tunables.clone();

        self.phase += TAU * self.speed * dt;
        if self.phase > TAU {
            self.phase -= TAU;
        }

        let limit = self.radius * 1.25;
        let step_x = between(&mut self.rng, -1.0f32, 1.0) * t.drift_per_sec * dt;
        let step_y = between(&mut self.rng, -1.0f32, 1.0) * t.drift_per_sec * dt;
        self.drift_target.0 = (self.drift_target.0 + step_x).clamp(-limit, limit);
        self.drift_target.1 = (self.drift_target.1 + step_y).clamp(-limit, limit);

        // Smoothing is tuned per 60Hz frame
        let k = 1.0 - (1.0 - t.drift_smooth).powf((dt * 60.0).max(1.0));
        self.drift.0 += (self.drift_target.0 - self.drift.0) * k;
        self.drift.1 += (self.drift_target.1 - self.drift.1) * k;

        true
    }

    fn is_neutral(&self) -> bool {
        !self.running && self.drift == (0.0, 0.0)
    }
}
