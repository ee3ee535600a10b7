// ABOUTME: Software rasterization of the glitch canvas and GPU presentation.
// ABOUTME: Uses fontdue for glyphs and wgpu to put the canvas and overlays on screen.

pub mod fonts;
mod gpu;
pub mod presenter;
pub mod raster;

pub use fonts::{find_system_font, load_font_file, FontError, GlyphSource};
pub use presenter::{OverlayParams, Presenter, RenderError};
pub use raster::PixelSurface;
