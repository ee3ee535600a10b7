// ABOUTME: Frame rate sampling over a fixed window of accumulated frame time.
// ABOUTME: Publishes a new reading only when a window closes with a changed value.

#[derive(Debug, Clone)]
pub struct FpsCounter {
    window_secs: f64,
    acc_secs: f64,
    acc_frames: u32,
    shown: Option<u32>,
}

impl FpsCounter {
    pub fn new(window_secs: f64) -> Self {
        Self {
            window_secs,
            acc_secs: 0.0,
            acc_frames: 0,
            shown: None,
        }
    }

    /// Last published value
    pub fn value(&self) -> Option<u32> {
        self.shown
    }

    /// Count one frame. Returns the new value when a window closes with a
    /// different reading. Nothing accumulates while disabled.
    pub fn sample(&mut self, dt_secs: f64, enabled: bool) -> Option<u32> {
        if !enabled {
            return None;
        }

        self.acc_secs += dt_secs;
        self.acc_frames += 1;

        if self.acc_secs < self.window_secs || self.acc_secs <= 0.0 {
            return None;
        }

        let fps = (self.acc_frames as f64 / self.acc_secs).round() as u32;
        self.acc_secs = 0.0;
        self.acc_frames = 0;

        if self.shown == Some(fps) {
            return None;
        }
        self.shown = Some(fps);
        Some(fps)
    }

    /// Readout text, right-aligned to two digits
    pub fn label(&self) -> String {
        match self.shown {
            Some(fps) => format!("FPS: {fps:>2}"),
            None => "FPS: --".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishes_once_per_window() {
        let mut fps = FpsCounter::new(0.25);
        let mut published = Vec::new();
        for _ in 0..60 {
            if let Some(v) = fps.sample(1.0 / 60.0, true) {
                published.push(v);
            }
        }
        assert_eq!(published, vec![60]);
        assert_eq!(fps.label(), "FPS: 60");
    }

    #[test]
    fn disabled_counter_does_not_accumulate() {
        let mut fps = FpsCounter::new(0.25);
        for _ in 0..100 {
            assert_eq!(fps.sample(0.02, false), None);
        }
        assert_eq!(fps.value(), None);
        assert_eq!(fps.label(), "FPS: --");
    }

    #[test]
    fn single_digit_rates_are_padded() {
        let mut fps = FpsCounter::new(0.25);
        fps.sample(0.2, true);
        assert_eq!(fps.sample(0.2, true), Some(5));
        assert_eq!(fps.label(), "FPS:  5");
    }
}
