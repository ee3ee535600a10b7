// ABOUTME: Glitch effect tunables.
// ABOUTME: Timing, probability, and magnitude parameters for the five effect engines.

use serde::{Deserialize, Serialize};

/// Static overlay flicker: steady low opacity with rare short blackouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticTunables {
    /// Overlay opacity while steady
    pub opacity: f32,
    /// Minimum interval between flicker rolls (ms)
    pub next_tick_min_ms: f64,
    /// Maximum interval between flicker rolls (ms)
    pub next_tick_max_ms: f64,
    /// Probability that a roll starts a blackout
    pub flicker_chance: f64,
    pub off_for_min_ms: f64,
    pub off_for_max_ms: f64,
}

impl Default for StaticTunables {
    fn default() -> Self {
        Self {
            opacity: 0.05,
            next_tick_min_ms: 6000.0,
            next_tick_max_ms: 18000.0,
            flicker_chance: 0.22,
            off_for_min_ms: 70.0,
            off_for_max_ms: 120.0,
        }
    }
}

/// Scanline sync loss: per-row horizontal shifts plus short frame freezes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanTunables {
    pub next_tick_min_ms: f64,
    pub next_tick_max_ms: f64,
    /// Delay before the first tick after start (ms)
    pub initial_delay_min_ms: f64,
    pub initial_delay_max_ms: f64,
    /// Probability that a tick freezes the loop for 1-2 frames
    pub freeze_chance: f64,
    /// Probability that a tick shifts rows (shares the roll with `freeze_chance`)
    pub shift_chance: f64,
    pub shift_line_count_min: usize,
    pub shift_line_count_max: usize,
    pub shift_duration_min_ms: f64,
    pub shift_duration_max_ms: f64,
    /// Range the per-tick maximum shift is drawn from (px)
    pub shift_max_px_min: f32,
    pub shift_max_px_max: f32,
    /// Smallest shift magnitude (px)
    pub shift_min_px: f32,
}

impl Default for ScanTunables {
    fn default() -> Self {
        Self {
            next_tick_min_ms: 280.0,
            next_tick_max_ms: 900.0,
            initial_delay_min_ms: 250.0,
            initial_delay_max_ms: 850.0,
            freeze_chance: 0.14,
            shift_chance: 0.78,
            shift_line_count_min: 2,
            shift_line_count_max: 10,
            shift_duration_min_ms: 70.0,
            shift_duration_max_ms: 190.0,
            shift_max_px_min: 14.0,
            shift_max_px_max: 46.0,
            shift_min_px: 5.0,
        }
    }
}

/// Segment hot/dim overlay drawn from the glyph atlas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentTunables {
    pub max_active_per_side: usize,
    pub seg_len_min: usize,
    pub seg_len_max: usize,
    pub spawn_per_sec_left: f64,
    pub spawn_per_sec_right: f64,
    /// Probability that a spawned segment uses the hot palette
    pub hot_chance: f64,
    /// Segment lifetime range (seconds)
    pub life_min_secs: f64,
    pub life_max_secs: f64,
    pub fade_in_secs: f64,
    pub fade_out_secs: f64,
    /// Probability of skipping a candidate span that sampled mostly blank
    pub skip_space_prob: f64,
    /// Alpha of the dark rectangle drawn beneath dim segments
    pub dim_darken_alpha: f32,
    /// Atlas row padding above each row (px)
    pub row_pad_top: f32,
    /// Atlas row padding below each row (px)
    pub row_pad_bottom: f32,
}

impl Default for SegmentTunables {
    fn default() -> Self {
        Self {
            max_active_per_side: 40,
            seg_len_min: 5,
            seg_len_max: 20,
            spawn_per_sec_left: 40.0,
            spawn_per_sec_right: 40.0,
            hot_chance: 0.48,
            life_min_secs: 1.5,
            life_max_secs: 2.5,
            fade_in_secs: 0.5,
            fade_out_secs: 0.5,
            skip_space_prob: 0.65,
            dim_darken_alpha: 0.75,
            row_pad_top: 2.0,
            row_pad_bottom: 2.0,
        }
    }
}

/// Row swell: bands of rows stretched vertically, relaxing back to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwellTunables {
    pub next_min_ms: f64,
    pub next_max_ms: f64,
    pub band_min: usize,
    pub band_max: usize,
    pub amp_min: f32,
    pub amp_max: f32,
    /// Exponential relaxation rate toward 1.0 (per second)
    pub relax_per_sec: f32,
    /// Scales closer than this to 1.0 snap to exactly 1.0
    pub snap_epsilon: f32,
}

impl Default for SwellTunables {
    fn default() -> Self {
        Self {
            next_min_ms: 150.0,
            next_max_ms: 300.0,
            band_min: 4,
            band_max: 14,
            amp_min: 0.2,
            amp_max: 0.5,
            relax_per_sec: 3.2,
            snap_epsilon: 0.001,
        }
    }
}

/// Orbit drift: whole-block circular motion with a wandering center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitTunables {
    pub radius_min: f32,
    pub radius_max: f32,
    /// Angular speed range in revolutions per second
    pub speed_min: f32,
    pub speed_max: f32,
    /// Random walk speed of the drift target (px/s)
    pub drift_per_sec: f32,
    /// Per-60Hz-frame smoothing factor toward the drift target
    pub drift_smooth: f32,
    /// Per-query jitter amplitude (px)
    pub micro_jitter: f32,
    /// Vertical flattening of the orbit
    pub y_scale: f32,
}

impl Default for OrbitTunables {
    fn default() -> Self {
        Self {
            radius_min: 6.0,
            radius_max: 24.0,
            speed_min: 0.03,
            speed_max: 0.12,
            drift_per_sec: 10.0,
            drift_smooth: 0.08,
            micro_jitter: 0.6,
            y_scale: 0.75,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    pub static_flicker: StaticTunables,
    pub scan: ScanTunables,
    pub segments: SegmentTunables,
    pub swell: SwellTunables,
    pub orbit: OrbitTunables,
}
