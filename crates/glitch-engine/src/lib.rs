// ABOUTME: Animation core for ascii-glitch.
// ABOUTME: Effect engines, glyph atlas, compositor, frame scheduling, and toggle commands.

pub mod atlas;
pub mod compositor;
pub mod controller;
pub mod effects;
pub mod engine;
pub mod fps;
pub mod hud;
pub mod scheduler;

pub use atlas::{GlyphAtlas, GlyphAtlasCache};
pub use compositor::{Compositor, DirtyFlag, FrameGeometry, Scene};
pub use controller::Command;
pub use effects::{
    Effect, EffectSet, FrameContext, OrbitDrift, RenderContext, RowSwell, ScanDesync, Segment,
    SegmentHotDim, StaticFlicker,
};
pub use engine::{FrameReport, GlitchEngine, OverlaySignals};
pub use fps::FpsCounter;
pub use hud::{Hud, HudReadout};
pub use scheduler::{FrameClock, FrameScheduler, ManualScheduler, ThreadScheduler};
