// ABOUTME: Shared types and configuration for ascii-glitch.
// ABOUTME: Defines colors, tunables, profiles, toggles, and the drawing surface contract.

pub mod color;
pub mod config;
pub mod effects;
pub mod profile;
pub mod surface;
pub mod toggles;

pub use color::Color;
pub use config::{Config, ConfigError, FrameSettings, HudSettings, Metrics};
pub use effects::EffectSettings;
pub use profile::{ColorRole, ProfilePalette, ProfileStyles, StyleResolver};
pub use surface::{Bitmap, MAX_BITMAP_PIXELS, PixelRect, RecordingSurface, RectF, Surface, SurfaceOp};
pub use toggles::{Toggle, ToggleState};
