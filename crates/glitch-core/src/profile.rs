// ABOUTME: Color profiles and the named-color style resolver.
// ABOUTME: The renderer asks for colors by semantic name; the active profile answers.

use serde::{Deserialize, Serialize};

use crate::Color;

/// Semantic text colors the renderer requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    TextBase,
    TextHot,
    TextDim,
}

impl ColorRole {
    pub const ALL: [ColorRole; 3] = [ColorRole::TextBase, ColorRole::TextHot, ColorRole::TextDim];

    /// Style variable name used for lookups
    pub fn var_name(self) -> &'static str {
        match self {
            ColorRole::TextBase => "--text-base",
            ColorRole::TextHot => "--text-hot",
            ColorRole::TextDim => "--text-dim",
        }
    }

    /// Color used when the resolver has no usable answer
    pub fn fallback(self) -> Color {
        let hex = match self {
            ColorRole::TextBase => "#8f98a1",
            ColorRole::TextHot => "#eaf6ff",
            ColorRole::TextDim => "#5e6670",
        };
        Color::parse_css(hex).unwrap_or(Color::WHITE)
    }
}

/// Named-color lookup service, implicitly parameterized by the active profile.
pub trait StyleResolver {
    /// Look up a style variable (e.g. `--text-hot`) for the active profile.
    fn lookup(&self, name: &str) -> Option<String>;

    fn profile_count(&self) -> usize;

    fn active_profile(&self) -> usize;

    fn set_active_profile(&mut self, index: usize);

    fn profile_name(&self, index: usize) -> Option<&str>;

    /// Resolve a role to a color, falling back to the built-in default when the
    /// lookup is missing or unparsable.
    fn color(&self, role: ColorRole) -> Color {
        self.lookup(role.var_name())
            .and_then(|v| Color::parse_css(&v))
            .unwrap_or_else(|| role.fallback())
    }
}

/// A named base/hot/dim triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilePalette {
    pub name: String,
    pub base: String,
    pub hot: String,
    pub dim: String,
}

impl ProfilePalette {
    fn new(name: &str, base: &str, hot: &str, dim: &str) -> Self {
        Self {
            name: name.to_string(),
            base: base.to_string(),
            hot: hot.to_string(),
            dim: dim.to_string(),
        }
    }

    pub fn gray() -> Self {
        Self::new("gray", "#8f98a1", "#eaf6ff", "#5e6670")
    }

    pub fn red() -> Self {
        Self::new("red", "#a1585a", "#ffd9d6", "#5c2a2c")
    }

    pub fn green() -> Self {
        Self::new("green", "#5f9a6c", "#dcffe4", "#2c5234")
    }

    pub fn blue() -> Self {
        Self::new("blue", "#5d7fa8", "#dcecff", "#2b3f5c")
    }

    /// The four profiles, in cycling order
    pub fn presets() -> Vec<ProfilePalette> {
        vec![Self::gray(), Self::red(), Self::green(), Self::blue()]
    }
}

/// Style resolver backed by a fixed list of palettes.
#[derive(Debug, Clone)]
pub struct ProfileStyles {
    palettes: Vec<ProfilePalette>,
    active: usize,
}

impl ProfileStyles {
    pub fn new(palettes: Vec<ProfilePalette>) -> Self {
        let palettes = if palettes.is_empty() {
            ProfilePalette::presets()
        } else {
            palettes
        };
        Self { palettes, active: 0 }
    }

    pub fn palettes(&self) -> &[ProfilePalette] {
        &self.palettes
    }
}

impl Default for ProfileStyles {
    fn default() -> Self {
        Self::new(ProfilePalette::presets())
    }
}

impl StyleResolver for ProfileStyles {
    fn lookup(&self, name: &str) -> Option<String> {
        let palette = self.palettes.get(self.active)?;
        let value = match name {
            "--text-base" => &palette.base,
            "--text-hot" => &palette.hot,
            "--text-dim" => &palette.dim,
            _ => return None,
        };
        Some(value.clone())
    }

    fn profile_count(&self) -> usize {
        self.palettes.len()
    }

    fn active_profile(&self) -> usize {
        self.active
    }

    fn set_active_profile(&mut self, index: usize) {
        self.active = index.min(self.palettes.len().saturating_sub(1));
    }

    fn profile_name(&self, index: usize) -> Option<&str> {
        self.palettes.get(index).map(|p| p.name.as_str())
    }
}
