// ABOUTME: The glitch engine: text, layout, effects, atlas, and drawing behind one facade.
// ABOUTME: Hosts feed it texts, resizes, commands, and frame timestamps.

use glitch_core::{Config, StyleResolver, Surface, Toggle, ToggleState};
use glitch_layout::{LayoutEngine, LayoutState, Side, TextGridModel};

use crate::compositor::Scene;
use crate::effects::{Effect, FrameContext};
use crate::hud::status_text;
use crate::{
    Command, Compositor, DirtyFlag, EffectSet, FpsCounter, FrameClock, FrameGeometry,
    GlyphAtlasCache, Hud, HudReadout,
};

/// Signals for the overlays drawn outside the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySignals {
    pub glitch_visible: bool,
    pub static_visible: bool,
    /// Current static opacity; 0 during a blackout
    pub static_opacity: f32,
    pub scanlines_visible: bool,
    pub fps_visible: bool,
}

/// What happened during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    pub dt_secs: f64,
    /// Effect updates were skipped by a scan freeze
    pub frozen: bool,
    pub drew: bool,
    /// Newly published frame rate
    pub fps: Option<u32>,
}

pub struct GlitchEngine<S: Surface> {
    surface: S,
    styles: Box<dyn StyleResolver>,
    toggles: ToggleState,
    model: TextGridModel,
    layout: LayoutEngine,
    container: (f32, f32),
    atlas: GlyphAtlasCache,
    effects: EffectSet,
    compositor: Compositor,
    dirty: DirtyFlag,
    clock: FrameClock,
    fps: FpsCounter,
    hud: Hud,
    last_now: f64,
}

impl<S: Surface> GlitchEngine<S> {
    pub fn new(config: &Config, surface: S, styles: Box<dyn StyleResolver>, seed: u64) -> Self {
        let segments = &config.effects.segments;
        let mut toggles = config.toggles.clone();
        toggles.cycle_profile(0, styles.profile_count());

        let mut engine = Self {
            surface,
            styles,
            toggles,
            model: TextGridModel::default(),
            layout: LayoutEngine::new(config.metrics.clone()),
            container: (0.0, 1.0),
            atlas: GlyphAtlasCache::new(segments.row_pad_top, segments.row_pad_bottom),
            effects: EffectSet::new(&config.effects, seed),
            compositor: Compositor::new(config.metrics.font_size_px),
            dirty: DirtyFlag::default(),
            clock: FrameClock::new(config.frame.max_dt_ms),
            fps: FpsCounter::new(config.frame.fps_window_secs),
            hud: Hud::new(config.hud.clone()),
            last_now: 0.0,
        };

        tracing::info!("Glitch engine created (seed {seed})");
        engine.effects.on_grid_changed(engine.model.rows());
        engine.apply(0.0);
        engine
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn toggles(&self) -> &ToggleState {
        &self.toggles
    }

    pub fn model(&self) -> &TextGridModel {
        &self.model
    }

    pub fn layout(&self) -> &LayoutState {
        self.layout.state()
    }

    pub fn effects(&self) -> &EffectSet {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut EffectSet {
        &mut self.effects
    }

    pub fn atlas(&self) -> &GlyphAtlasCache {
        &self.atlas
    }

    pub fn styles(&self) -> &dyn StyleResolver {
        self.styles.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_set()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.compositor.frames_drawn()
    }

    pub fn request_render(&mut self) {
        self.dirty.mark();
    }

    pub fn set_text(&mut self, side: Side, text: &str) {
        self.model.set_text(side, text);
        self.grid_changed();
    }

    pub fn set_texts(&mut self, left: &str, right: &str) {
        self.model.set_texts(left, right);
        self.grid_changed();
    }

    /// Container size changed (logical width and device pixel ratio).
    pub fn resize(&mut self, width_css: f32, pixel_ratio: f32) {
        self.container = (width_css, pixel_ratio);
        self.relayout();
        self.rebuild_atlas();
        self.dirty.mark();
    }

    fn grid_changed(&mut self) {
        self.effects.on_grid_changed(self.model.rows());
        self.relayout();
        self.rebuild_atlas();
        self.dirty.mark();
    }

    fn relayout(&mut self) {
        let char_width = self.layout.measure_char_width(&mut self.surface);
        let (width, ratio) = self.container;
        let state = self
            .layout
            .recompute(width, ratio, self.model.rows(), char_width);
        self.surface
            .resize(state.canvas_width_css, state.canvas_height_css, state.pixel_ratio);
    }

    fn rebuild_atlas(&mut self) {
        self.atlas.rebuild(
            &self.surface,
            &self.model,
            self.layout.state(),
            self.styles.as_ref(),
            self.layout.metrics().font_size_px,
        );
    }

    /// Mutate state for a command, then run the apply pass.
    pub fn handle(&mut self, command: Command, now_ms: f64) {
        command.apply_to(&mut self.toggles, self.styles.profile_count());
        tracing::info!("{command:?} -> master {}", self.toggles.master);
        self.apply(now_ms);
    }

    /// Start or stop every engine to match the toggles, select the profile,
    /// rebuild the atlas, and show the status readout.
    fn apply(&mut self, now_ms: f64) {
        let ctx = FrameContext {
            model: &self.model,
            layout: self.layout.state(),
        };
        for effect in self.effects.in_update_order() {
            if self.toggles.active(effect.toggle()) {
                effect.start(now_ms, &ctx);
            } else {
                effect.stop();
            }
        }

        self.styles.set_active_profile(self.toggles.profile_index);
        self.rebuild_atlas();
        self.dirty.mark();

        let profile = self.profile_name().to_string();
        self.hud.show(now_ms, status_text(&self.toggles, &profile));
    }

    pub fn profile_name(&self) -> &str {
        self.styles
            .profile_name(self.toggles.profile_index)
            .unwrap_or("gray")
    }

    /// Advance one frame at `now_ms`.
    pub fn frame(&mut self, now_ms: f64) -> FrameReport {
        let dt_secs = self.clock.tick(now_ms);
        self.last_now = now_ms;

        let frozen =
            self.toggles.active(Toggle::Scan) && self.effects.scan.take_freeze_frame();

        let mut drew = false;
        if !frozen {
            let ctx = FrameContext {
                model: &self.model,
                layout: self.layout.state(),
            };
            for effect in self.effects.in_update_order() {
                if self.toggles.active(effect.toggle()) && effect.update(now_ms, dt_secs, &ctx) {
                    self.dirty.mark();
                }
            }

            if self.dirty.take() {
                self.draw(now_ms);
                drew = true;
            }
        }

        let fps = self
            .fps
            .sample(dt_secs, self.toggles.active(Toggle::FpsCounter));

        FrameReport {
            dt_secs,
            frozen,
            drew,
            fps,
        }
    }

    fn draw(&mut self, now_ms: f64) {
        let geometry = FrameGeometry::capture(
            &self.toggles,
            &mut self.effects,
            self.layout.state(),
            self.model.rows(),
            now_ms,
        );
        let scene = Scene {
            toggles: &self.toggles,
            model: &self.model,
            layout: self.layout.state(),
            styles: self.styles.as_ref(),
            atlas: &self.atlas,
            effects: &self.effects,
            geometry: &geometry,
            now_ms,
        };
        self.compositor.draw(&mut self.surface, &scene);
    }

    pub fn overlay_signals(&self) -> OverlaySignals {
        let static_visible = self.toggles.active(Toggle::Static);
        OverlaySignals {
            glitch_visible: self.toggles.active(Toggle::GlitchOverlay),
            static_visible,
            static_opacity: if static_visible {
                self.effects.statik.opacity()
            } else {
                0.0
            },
            scanlines_visible: self.toggles.active(Toggle::Scan),
            fps_visible: self.toggles.active(Toggle::FpsCounter),
        }
    }

    pub fn hud_readout(&self, now_ms: f64) -> Option<HudReadout> {
        self.hud.readout(now_ms)
    }

    /// FPS label while the counter is enabled
    pub fn fps_label(&self) -> Option<String> {
        self.toggles
            .active(Toggle::FpsCounter)
            .then(|| self.fps.label())
    }

    /// Timestamp of the most recent frame
    pub fn last_frame_ms(&self) -> f64 {
        self.last_now
    }
}
