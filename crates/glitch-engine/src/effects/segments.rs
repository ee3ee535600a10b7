// ABOUTME: Segment hot/dim overlay: short spans of a row flare bright or sink dark.
// ABOUTME: Spans fade in and out and are drawn as blits from the glyph atlas.

use glitch_core::effects::SegmentTunables;
use glitch_core::{Color, PixelRect, RectF, Surface, Toggle};
use glitch_layout::{Side, TextGridModel};
use rand::rngs::StdRng;

use super::{
    between, chance, count_between, engine_rng, index_below, Effect, FrameContext, RenderContext,
};

/// Positions sampled per candidate when checking for blank spans
const BLANK_SAMPLES: usize = 4;
const BLANK_HITS_TO_SKIP: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub row: usize,
    pub start_col: usize,
    pub len: usize,
    pub hot: bool,
    pub spawn_ms: f64,
    pub expire_ms: f64,
}

impl Segment {
    /// Fade envelope: linear ramps in and out, multiplied, then squared.
    pub fn opacity(&self, now_ms: f64, fade_in_secs: f64, fade_out_secs: f64) -> f32 {
        let age = (now_ms - self.spawn_ms) / 1000.0;
        let remaining = (self.expire_ms - now_ms) / 1000.0;

        let fade_in = if fade_in_secs > 0.0 {
            (age / fade_in_secs).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let fade_out = if fade_out_secs > 0.0 {
            (remaining / fade_out_secs).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let a = fade_in * fade_out;
        (a * a) as f32
    }

    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms >= self.expire_ms
    }
}

pub struct SegmentHotDim {
    tunables: SegmentTunables,
    rng: StdRng,
    running: bool,
    segments: [Vec<Segment>; 2],
}

impl SegmentHotDim {
    pub fn new(tunables: SegmentTunables, seed: u64) -> Self {
        Self {
            tunables,
            rng: engine_rng(seed, 0x5E65),
            running: false,
            segments: [Vec::new(), Vec::new()],
        }
    }

    pub fn tunables(&self) -> &SegmentTunables {
        &self.tunables
    }

    pub fn segments(&self, side: Side) -> &[Segment] {
        &self.segments[side.index()]
    }

    pub fn active_count(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }

    pub fn opacity(&self, segment: &Segment, now_ms: f64) -> f32 {
        segment.opacity(
            now_ms,
            self.tunables.fade_in_secs,
            self.tunables.fade_out_secs,
        )
    }

    fn clear(&mut self) {
        for list in &mut self.segments {
            list.clear();
        }
    }

    fn spawn_rate(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.tunables.spawn_per_sec_left,
            Side::Right => self.tunables.spawn_per_sec_right,
        }
    }

    /// True when most sampled cells of the span are spaces.
    fn looks_blank(&mut self, model: &TextGridModel, side: Side, row: usize, x0: usize, len: usize) -> bool {
        let grid = model.grid(side);
        let hits = (0..BLANK_SAMPLES)
            .filter(|_| {
                let x = x0 + index_below(&mut self.rng, len.max(1));
                grid.cell(row, x).unwrap_or(' ') == ' '
            })
            .count();
        hits >= BLANK_HITS_TO_SKIP
    }

    fn spawn_side(&mut self, side: Side, now_ms: f64, dt_secs: f64, model: &TextGridModel) -> usize {
        let rows = model.rows();
        let cols = model.cols();
        if rows == 0 || cols == 0 {
            return 0;
        }

        let expected = (self.spawn_rate(side) * dt_secs).max(0.0);
        let mut n = expected.floor() as usize;
        if chance(&mut self.rng, expected - expected.floor()) {
            n += 1;
        }

        let cap = self.tunables.max_active_per_side;
        let t = self.tunables.clone();
        let mut spawned = 0;

        for _ in 0..n {
            if self.segments[side.index()].len() >= cap {
                break;
            }

            let row = index_below(&mut self.rng, rows);
            let len = count_between(&mut self.rng, t.seg_len_min, t.seg_len_max);
            let start_col = index_below(&mut self.rng, cols.saturating_sub(len) + 1);

            if t.skip_space_prob > 0.0
                && self.looks_blank(model, side, row, start_col, len)
                && chance(&mut self.rng, t.skip_space_prob)
            {
                continue;
            }

            let hot = chance(&mut self.rng, t.hot_chance);
            let life_secs = between(&mut self.rng, t.life_min_secs, t.life_max_secs);

            self.segments[side.index()].push(Segment {
                row,
                start_col,
                len,
                hot,
                spawn_ms: now_ms,
                expire_ms: now_ms + life_secs * 1000.0,
            });
            spawned += 1;
        }

        spawned
    }

    fn draw_segment(&self, surface: &mut dyn Surface, ctx: &RenderContext<'_>, side: Side, segment: &Segment) {
        let Some(glyphs) = ctx.atlas.side(side) else {
            return;
        };
        let layout = ctx.layout;
        let rows = ctx.model.rows();
        let cols = ctx.model.cols();
        if segment.row >= rows {
            return;
        }

        let alpha = self.opacity(segment, ctx.now_ms);
        if alpha <= 0.001 {
            return;
        }

        let start_col = segment.start_col.min(cols);
        let len = segment.len.min(cols - start_col);
        if len == 0 {
            return;
        }

        let t = &self.tunables;
        let char_w = layout.char_width_px;
        let row_h = layout.row_height_px;

        // Source band starts at the row top; the atlas row sits `row_pad_top` below it
        let sx_css = start_col as f32 * char_w;
        let sy_css = segment.row as f32 * row_h;
        let sw_css = len as f32 * char_w;
        let sh_css = row_h + t.row_pad_top + t.row_pad_bottom;

        let ratio = ctx.atlas.pixel_ratio();
        let src = PixelRect::new(
            (sx_css * ratio).floor() as u32,
            (sy_css * ratio).floor() as u32,
            ((sw_css * ratio).floor() as u32).max(1),
            ((sh_css * ratio).floor() as u32).max(1),
        );

        let (origin_x, origin_y) = ctx.geometry.origin(side);
        let shift = ctx.geometry.shift(side, segment.row);
        let dst = RectF::new(
            origin_x + shift + sx_css,
            origin_y + sy_css - t.row_pad_top,
            sw_css,
            sh_css,
        );

        surface.set_global_alpha(alpha);
        if !segment.hot {
            surface.save();
            surface.set_global_alpha(alpha * t.dim_darken_alpha);
            surface.fill_rect(dst, Color::BLACK);
            surface.restore();
        }

        let bitmap = if segment.hot { &glyphs.hot } else { &glyphs.dim };
        surface.draw_bitmap(bitmap, src, dst);
    }
}

impl Effect for SegmentHotDim {
    fn toggle(&self) -> Toggle {
        Toggle::Segments
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn start(&mut self, _now_ms: f64, _ctx: &FrameContext<'_>) {
        if self.running {
            return;
        }
        self.running = true;
        self.clear();
    }

    fn stop(&mut self) {
        self.running = false;
        self.clear();
    }

    fn update(&mut self, now_ms: f64, dt_secs: f64, ctx: &FrameContext<'_>) -> bool {
        if !self.running {
            return false;
        }

        let mut spawned = 0;
        if ctx.layout.is_ready() {
            for side in Side::ALL {
                spawned += self.spawn_side(side, now_ms, dt_secs, ctx.model);
            }
        }

        let before = self.active_count();
        for list in &mut self.segments {
            list.retain(|segment| !segment.is_expired(now_ms));
        }
        let removed = before - self.active_count();

        // Live segments keep fading, so they need a redraw every frame
        spawned > 0 || removed > 0 || self.active_count() > 0
    }

    fn on_grid_changed(&mut self, _rows: usize) {
        self.clear();
    }

    fn render(&self, surface: &mut dyn Surface, ctx: &RenderContext<'_>) {
        if !self.running || !ctx.atlas.is_ready() {
            return;
        }

        surface.save();
        for side in Side::ALL {
            for segment in &self.segments[side.index()] {
                self.draw_segment(surface, ctx, side, segment);
            }
        }
        surface.restore();
    }

    fn is_neutral(&self) -> bool {
        self.active_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glitch_core::Metrics;
    use glitch_layout::{LayoutEngine, LayoutState};
    use proptest::prelude::*;

    fn ready_layout(rows: usize) -> LayoutState {
        LayoutEngine::new(Metrics::default()).recompute(800.0, 1.0, rows, 5.0)
    }

    fn segment(spawn_ms: f64, expire_ms: f64) -> Segment {
        Segment {
            row: 0,
            start_col: 0,
            len: 5,
            hot: true,
            spawn_ms,
            expire_ms,
        }
    }

    fn started(tunables: SegmentTunables, seed: u64, model: &TextGridModel, layout: &LayoutState) -> SegmentHotDim {
        let mut segments = SegmentHotDim::new(tunables, seed);
        segments.start(0.0, &FrameContext { model, layout });
        segments
    }

    #[test]
    fn envelope_rises_holds_and_falls() {
        let seg = segment(1000.0, 3000.0);
        let alpha = |t: f64| seg.opacity(t, 0.5, 0.5);

        assert_eq!(alpha(1000.0), 0.0);
        let mut last = 0.0;
        for step in 1..=10 {
            let a = alpha(1000.0 + step as f64 * 50.0);
            assert!(a > last);
            last = a;
        }
        assert_eq!(alpha(1500.0), 1.0);
        assert_eq!(alpha(2000.0), 1.0);
        assert!(alpha(2750.0) < 1.0 && alpha(2750.0) > 0.0);
        assert_eq!(alpha(3000.0), 0.0);
        assert_eq!(alpha(3500.0), 0.0);
        assert!(!seg.is_expired(2999.9));
        assert!(seg.is_expired(3000.0));
    }

    #[test]
    fn expired_segments_are_removed() {
        let model = TextGridModel::new(&"#".repeat(40), &"#".repeat(40));
        let layout = ready_layout(model.rows());
        let ctx = FrameContext {
            model: &model,
            layout: &layout,
        };
        let mut engine = started(SegmentTunables::default(), 3, &model, &layout);

        engine.update(0.0, 0.05, &ctx);
        engine.update(16.0, 0.05, &ctx);
        assert!(engine.active_count() > 0);

        let spawned: Vec<Segment> = Side::ALL
            .iter()
            .flat_map(|&side| engine.segments(side).to_vec())
            .collect();

        // Past every lifetime, with no new spawns (dt = 0)
        engine.update(2600.0, 0.0, &ctx);
        assert_eq!(engine.active_count(), 0);
        assert!(spawned.iter().all(|s| s.expire_ms <= 2600.0 + 16.0));
    }

    #[test]
    fn cap_limits_active_segments() {
        let model = TextGridModel::new(&"#".repeat(80), &"#".repeat(80));
        let layout = ready_layout(model.rows());
        let ctx = FrameContext {
            model: &model,
            layout: &layout,
        };
        let mut engine = started(SegmentTunables::default(), 8, &model, &layout);
        for frame in 0..60 {
            engine.update(frame as f64 * 16.0, 0.05, &ctx);
        }
        assert_eq!(engine.segments(Side::Left).len(), 40);
        assert_eq!(engine.segments(Side::Right).len(), 40);
        for seg in engine.segments(Side::Left) {
            assert!((5..=20).contains(&seg.len));
            assert!(seg.start_col + seg.len <= 80);
        }
    }

    #[test]
    fn blank_spans_are_skipped_statistically() {
        let tunables = SegmentTunables {
            max_active_per_side: usize::MAX,
            spawn_per_sec_left: 2000.0,
            spawn_per_sec_right: 0.0,
            ..SegmentTunables::default()
        };
        let blank = TextGridModel::new(&" ".repeat(60), "");
        let filled = TextGridModel::new(&"@".repeat(60), "");
        let layout = ready_layout(1);

        let count = |model: &TextGridModel| {
            let ctx = FrameContext {
                model,
                layout: &layout,
            };
            let mut engine = started(tunables.clone(), 21, model, &layout);
            engine.update(0.0, 1.0, &ctx);
            engine.segments(Side::Left).len()
        };

        let filled_spawns = count(&filled);
        let blank_spawns = count(&blank);
        assert_eq!(filled_spawns, 2000);
        // About 35% of blank candidates survive the skip roll
        assert!((500..=900).contains(&blank_spawns), "{blank_spawns}");
    }

    #[test]
    fn unready_layout_spawns_nothing() {
        let model = TextGridModel::new("some text here", "");
        let layout = LayoutState::default();
        let ctx = FrameContext {
            model: &model,
            layout: &layout,
        };
        let mut engine = started(SegmentTunables::default(), 1, &model, &layout);
        for frame in 0..30 {
            engine.update(frame as f64 * 16.0, 0.05, &ctx);
        }
        assert!(engine.is_neutral());
    }

    #[test]
    fn stop_empties_both_sides() {
        let model = TextGridModel::new(&"#".repeat(40), &"#".repeat(40));
        let layout = ready_layout(model.rows());
        let ctx = FrameContext {
            model: &model,
            layout: &layout,
        };
        let mut engine = started(SegmentTunables::default(), 5, &model, &layout);
        engine.update(0.0, 0.05, &ctx);
        engine.stop();
        assert!(engine.is_neutral());
        engine.stop();
        assert!(engine.is_neutral());
        assert!(!engine.update(50.0, 0.05, &ctx));
        assert!(engine.is_neutral());
    }

    proptest! {
        #[test]
        fn envelope_stays_in_unit_range(
            spawn in 0.0f64..10_000.0,
            life in 1.0f64..5_000.0,
            offset in -1_000.0f64..10_000.0,
            fade_in in 0.0f64..1.0,
            fade_out in 0.0f64..1.0,
        ) {
            let seg = segment(spawn, spawn + life);
            let a = seg.opacity(spawn + offset, fade_in, fade_out);
            prop_assert!((0.0..=1.0).contains(&a));
            if offset >= life {
                prop_assert!(seg.is_expired(spawn + offset));
            }
        }
    }
}
