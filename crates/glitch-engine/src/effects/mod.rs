// ABOUTME: Common lifecycle for the animated effects and the fixed set that holds them.
// ABOUTME: Each engine owns a seeded RNG so runs can be replayed exactly.

mod orbit_drift;
mod row_swell;
mod scan_desync;
mod segments;
mod static_flicker;

pub use orbit_drift::OrbitDrift;
pub use row_swell::RowSwell;
pub use scan_desync::ScanDesync;
pub use segments::{Segment, SegmentHotDim};
pub use static_flicker::StaticFlicker;

use glitch_core::{EffectSettings, Surface, Toggle};
use glitch_layout::{LayoutState, TextGridModel};
use rand::distributions::uniform::SampleUniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{FrameGeometry, GlyphAtlasCache};

/// Read-only view of the text and layout handed to engines each frame.
#[derive(Clone, Copy)]
pub struct FrameContext<'a> {
    pub model: &'a TextGridModel,
    pub layout: &'a LayoutState,
}

/// Everything an engine needs to paint on top of the base text.
pub struct RenderContext<'a> {
    pub model: &'a TextGridModel,
    pub layout: &'a LayoutState,
    pub atlas: &'a GlyphAtlasCache,
    pub geometry: &'a FrameGeometry,
    pub now_ms: f64,
}

/// Start/stop/update lifecycle shared by every effect.
///
/// `start` and `stop` are idempotent. After `stop` the effect contributes
/// nothing visible and `is_neutral` holds until the next `start`.
pub trait Effect {
    /// Toggle that enables this effect
    fn toggle(&self) -> Toggle;

    fn is_running(&self) -> bool;

    fn start(&mut self, now_ms: f64, ctx: &FrameContext<'_>);

    fn stop(&mut self);

    /// Advance by one frame. Returns true when the canvas needs a redraw.
    fn update(&mut self, now_ms: f64, dt_secs: f64, ctx: &FrameContext<'_>) -> bool;

    fn on_grid_changed(&mut self, _rows: usize) {}

    fn render(&self, _surface: &mut dyn Surface, _ctx: &RenderContext<'_>) {}

    /// True when the effect currently leaves the picture untouched
    fn is_neutral(&self) -> bool;
}

/// The five engines, in the order the frame loop updates them.
pub struct EffectSet {
    pub scan: ScanDesync,
    pub statik: StaticFlicker,
    pub swell: RowSwell,
    pub segments: SegmentHotDim,
    pub orbit: OrbitDrift,
}

impl EffectSet {
    pub fn new(settings: &EffectSettings, seed: u64) -> Self {
        Self {
            scan: ScanDesync::new(settings.scan.clone(), seed),
            statik: StaticFlicker::new(settings.static_flicker.clone(), seed),
            swell: RowSwell::new(settings.swell.clone(), seed),
            segments: SegmentHotDim::new(settings.segments.clone(), seed),
            orbit: OrbitDrift::new(settings.orbit.clone(), seed),
        }
    }

    /// Scan, static, swell, segments, orbit
    pub fn in_update_order(&mut self) -> [&mut dyn Effect; 5] {
        [
            &mut self.scan,
            &mut self.statik,
            &mut self.swell,
            &mut self.segments,
            &mut self.orbit,
        ]
    }

    pub fn iter(&self) -> [&dyn Effect; 5] {
        [
            &self.scan,
            &self.statik,
            &self.swell,
            &self.segments,
            &self.orbit,
        ]
    }

    pub fn on_grid_changed(&mut self, rows: usize) {
        for effect in self.in_update_order() {
            effect.on_grid_changed(rows);
        }
    }
}

pub(crate) fn engine_rng(seed: u64, salt: u64) -> StdRng {
    StdRng::seed_from_u64(seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Uniform sample in `[min, max)`; `min` when the range is empty.
pub(crate) fn between<T>(rng: &mut StdRng, min: T, max: T) -> T
where
    T: SampleUniform + PartialOrd + Copy,
{
    if min < max {
        rng.gen_range(min..max)
    } else {
        min
    }
}

/// Uniform integer in `min..=max`
pub(crate) fn count_between(rng: &mut StdRng, min: usize, max: usize) -> usize {
    if min < max {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

/// Uniform index in `0..n`; 0 when `n` is 0.
pub(crate) fn index_below(rng: &mut StdRng, n: usize) -> usize {
    if n == 0 {
        0
    } else {
        rng.gen_range(0..n)
    }
}

pub(crate) fn chance(rng: &mut StdRng, probability: f64) -> bool {
    rng.gen::<f64>() < probability
}
