// ABOUTME: Monospace font discovery and loading for the software raster surface.
// ABOUTME: Falls back to solid block glyphs when no usable font file is found.

use fontdue::{Font, FontSettings};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Well-known monospace font locations, tried in order.
pub const SYSTEM_MONOSPACE_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu-sans-mono-fonts/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
    "/usr/share/fonts/TTF/LiberationMono-Regular.ttf",
    "/Library/Fonts/Courier New.ttf",
    "/System/Library/Fonts/Supplemental/Courier New.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
    "C:\\Windows\\Fonts\\cour.ttf",
];

/// Width of a block glyph cell relative to the font size
const BLOCK_ADVANCE: f32 = 0.6;
/// Ascent of block glyphs relative to the font size
const BLOCK_ASCENT: f32 = 0.8;

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("Failed to read font file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse font file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Load and parse a font file.
pub fn load_font_file(path: &Path) -> Result<Font, FontError> {
    let data = std::fs::read(path).map_err(|source| FontError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Font::from_bytes(data, FontSettings::default()).map_err(|message| FontError::Parse {
        path: path.to_path_buf(),
        message: message.to_string(),
    })
}

/// First well-known monospace font that exists on this machine.
pub fn find_system_font() -> Option<PathBuf> {
    SYSTEM_MONOSPACE_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}

/// Where glyph shapes come from.
#[derive(Clone)]
pub enum GlyphSource {
    Font(Arc<Font>),
    /// Every visible character is a solid block
    Blocks,
}

impl fmt::Debug for GlyphSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlyphSource::Font(font) => f
                .debug_tuple("Font")
                .field(&font.name().unwrap_or("unnamed"))
                .finish(),
            GlyphSource::Blocks => f.write_str("Blocks"),
        }
    }
}

impl GlyphSource {
    /// Use the configured font, or search the system for one.
    ///
    /// A configured font that cannot be loaded is an error. A failed search
    /// degrades to block glyphs.
    pub fn load(configured: Option<&Path>) -> Result<Self, FontError> {
        if let Some(path) = configured {
            let font = load_font_file(path)?;
            tracing::info!("Loaded font {}", path.display());
            return Ok(GlyphSource::Font(Arc::new(font)));
        }

        for path in SYSTEM_MONOSPACE_PATHS.iter().map(Path::new) {
            if !path.is_file() {
                continue;
            }
            match load_font_file(path) {
                Ok(font) => {
                    tracing::info!("Using system font {}", path.display());
                    return Ok(GlyphSource::Font(Arc::new(font)));
                }
                Err(e) => tracing::warn!("Skipping font: {e}"),
            }
        }

        tracing::warn!("No monospace font found, drawing block glyphs");
        Ok(GlyphSource::Blocks)
    }

    pub fn is_blocks(&self) -> bool {
        matches!(self, GlyphSource::Blocks)
    }

    /// Horizontal advance of `c` at `size` pixels
    pub fn advance(&self, c: char, size: f32) -> f32 {
        match self {
            GlyphSource::Font(font) => font.metrics(c, size).advance_width,
            GlyphSource::Blocks => size * BLOCK_ADVANCE,
        }
    }

    /// Distance from the top of the line box to the baseline
    pub fn ascent(&self, size: f32) -> f32 {
        match self {
            GlyphSource::Font(font) => font
                .horizontal_line_metrics(size)
                .map(|m| m.ascent)
                .unwrap_or(size * BLOCK_ASCENT),
            GlyphSource::Blocks => size * BLOCK_ASCENT,
        }
    }
}
