// ABOUTME: Application configuration handling.
// ABOUTME: Loads and saves metrics, startup toggles, tunables, and palettes from TOML.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{EffectSettings, ProfilePalette, ToggleState};

/// Text metrics for the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    /// Logical font size in pixels
    pub font_size_px: f32,
    /// Row height as a multiple of the font size
    pub line_height: f32,
    /// Inner padding around both columns
    pub padding_px: f32,
    /// Gap between the left and right column
    pub split_gap_px: f32,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            font_size_px: 9.0,
            line_height: 0.575,
            padding_px: 0.0,
            split_gap_px: 0.0,
        }
    }
}

/// Status readout timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudSettings {
    /// How long the readout stays fully visible after a state change (ms)
    pub visible_ms: f64,
    /// Fade-out duration after the visible period (ms)
    pub fade_ms: f64,
}

impl Default for HudSettings {
    fn default() -> Self {
        Self {
            visible_ms: 2000.0,
            fade_ms: 1000.0,
        }
    }
}

/// Main loop pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSettings {
    /// Upper bound for the per-frame time step (ms)
    pub max_dt_ms: f64,
    /// Accumulated time per FPS sample (seconds)
    pub fps_window_secs: f64,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            max_dt_ms: 50.0,
            fps_window_secs: 0.25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub metrics: Metrics,

    /// Startup on/off state
    pub toggles: ToggleState,

    /// Effect tunables
    pub effects: EffectSettings,

    /// Color profiles in cycling order
    pub profiles: Vec<ProfilePalette>,

    pub hud: HudSettings,

    pub frame: FrameSettings,

    /// Monospace font file; a system font is searched when unset
    pub font_path: Option<PathBuf>,

    /// Fixed random seed for reproducible effects
    pub seed: Option<u64>,

    /// Window dimensions
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metrics: Metrics::default(),
            toggles: ToggleState::default(),
            effects: EffectSettings::default(),
            profiles: ProfilePalette::presets(),
            hud: HudSettings::default(),
            frame: FrameSettings::default(),
            font_path: None,
            seed: None,
            window_width: 1200,
            window_height: 800,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,
}

impl Config {
    /// Get the default config file path (~/.config/ascii-glitch/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ascii-glitch").join("config.toml"))
    }

    /// Load config from a path
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from default path, or return default config if not found
    pub fn load_or_default() -> Self {
        Self::default_path()
            .and_then(|path| Self::load(&path).ok())
            .unwrap_or_default()
    }

    /// Save config to a path
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save config to default path
    pub fn save_to_default(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save(&path)?;
        Ok(path)
    }

    /// Row height in logical pixels
    pub fn row_height(&self) -> f32 {
        self.metrics.font_size_px * self.metrics.line_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            seed = 7

            [toggles]
            orbit = true

            [effects.static_flicker]
            flicker_chance = 0.0
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(7));
        assert!(config.toggles.orbit);
        assert!(config.toggles.master);
        assert_eq!(config.effects.static_flicker.flicker_chance, 0.0);
        assert_eq!(config.effects.static_flicker.opacity, 0.05);
        assert_eq!(config.profiles.len(), 4);
        assert_eq!(config.metrics.font_size_px, 9.0);
    }

    #[test]
    fn save_then_load() {
        let mut config = Config::default();
        config.metrics.line_height = 1.2;
        config.toggles.fps = true;

        let path = std::env::temp_dir().join("ascii-glitch-config-test.toml");
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(loaded.metrics.line_height, 1.2);
        assert!(loaded.toggles.fps);
        assert_eq!(loaded.effects, config.effects);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn row_height_uses_line_height_multiplier() {
        let config = Config::default();
        assert!((config.row_height() - 5.175).abs() < 1e-4);
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let path = std::env::temp_dir().join("ascii-glitch-config-bad.toml");
        std::fs::write(&path, "metrics = [").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::ParseError(_))));
        let _ = std::fs::remove_file(&path);
    }
}
