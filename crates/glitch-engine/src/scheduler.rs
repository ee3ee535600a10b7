// ABOUTME: Frame pacing: the dt clock and schedulers that invoke the per-frame callback.
// ABOUTME: ManualScheduler feeds injected timestamps; ThreadScheduler sleeps in real time.

use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

/// Turns absolute timestamps into capped frame deltas.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt_ms: f64,
}

impl FrameClock {
    pub fn new(max_dt_ms: f64) -> Self {
        Self {
            last_ms: None,
            max_dt_ms,
        }
    }

    /// Seconds since the previous tick, capped. The first tick yields 0.
    pub fn tick(&mut self, now_ms: f64) -> f64 {
        let dt_ms = match self.last_ms {
            Some(last) => (now_ms - last).clamp(0.0, self.max_dt_ms),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt_ms / 1000.0
    }
}

/// Repeatedly invokes a frame callback with the current time in milliseconds
/// until the callback breaks or the scheduler runs out of frames.
pub trait FrameScheduler {
    fn run_forever(&mut self, frame: &mut dyn FnMut(f64) -> ControlFlow<()>);
}

/// Scheduler driven by a fixed list of timestamps.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    timestamps: VecDeque<f64>,
}

impl ManualScheduler {
    pub fn from_timestamps(timestamps: impl IntoIterator<Item = f64>) -> Self {
        Self {
            timestamps: timestamps.into_iter().collect(),
        }
    }

    /// `frames` evenly spaced timestamps starting at `start_ms`
    pub fn fixed_rate(start_ms: f64, step_ms: f64, frames: usize) -> Self {
        Self::from_timestamps((0..frames).map(|i| start_ms + i as f64 * step_ms))
    }

    pub fn push(&mut self, now_ms: f64) {
        self.timestamps.push_back(now_ms);
    }

    pub fn remaining(&self) -> usize {
        self.timestamps.len()
    }
}

impl FrameScheduler for ManualScheduler {
    fn run_forever(&mut self, frame: &mut dyn FnMut(f64) -> ControlFlow<()>) {
        while let Some(now) = self.timestamps.pop_front() {
            if frame(now).is_break() {
                break;
            }
        }
    }
}

/// Real-time scheduler that sleeps between frames on the calling thread.
#[derive(Debug, Clone)]
pub struct ThreadScheduler {
    frame_interval: Duration,
    epoch: Instant,
}

impl ThreadScheduler {
    pub fn new(fps: u32) -> Self {
        Self {
            frame_interval: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }
}

impl FrameScheduler for ThreadScheduler {
    fn run_forever(&mut self, frame: &mut dyn FnMut(f64) -> ControlFlow<()>) {
        loop {
            let started = Instant::now();
            if frame(self.now_ms()).is_break() {
                break;
            }
            if let Some(rest) = self.frame_interval.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dt_is_capped_and_never_negative() {
        let mut clock = FrameClock::new(50.0);
        assert_eq!(clock.tick(1000.0), 0.0);
        assert!((clock.tick(1016.0) - 0.016).abs() < 1e-12);
        assert_eq!(clock.tick(5000.0), 0.05);
        assert_eq!(clock.tick(4000.0), 0.0);
    }

    #[test]
    fn manual_scheduler_stops_on_break() {
        let mut scheduler = ManualScheduler::fixed_rate(0.0, 10.0, 5);
        let mut seen = Vec::new();
        scheduler.run_forever(&mut |now| {
            seen.push(now);
            if now >= 20.0 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(seen, vec![0.0, 10.0, 20.0]);
        assert_eq!(scheduler.remaining(), 2);
    }

    #[test]
    fn thread_scheduler_advances_time() {
        let mut scheduler = ThreadScheduler::new(500);
        let mut seen = Vec::new();
        scheduler.run_forever(&mut |now| {
            seen.push(now);
            if seen.len() == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert!(seen.windows(2).all(|w| w[1] > w[0]));
    }
}
