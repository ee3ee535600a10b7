// ABOUTME: Master/effect on-off state and color profile selection.
// ABOUTME: A single explicit state struct read by every component each frame.

use serde::{Deserialize, Serialize};

/// Everything the user can switch on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toggle {
    /// Frame rate readout
    FpsCounter,
    /// Full-screen glitch image overlay
    GlitchOverlay,
    /// Static overlay with flicker
    Static,
    /// Scanlines, row desync, and frame freeze
    Scan,
    /// Row swell bands
    Swell,
    /// Segment hot/dim overlay
    Segments,
    /// Block orbit motion
    Orbit,
}

impl Toggle {
    pub const ALL: [Toggle; 7] = [
        Toggle::FpsCounter,
        Toggle::GlitchOverlay,
        Toggle::Static,
        Toggle::Scan,
        Toggle::Swell,
        Toggle::Segments,
        Toggle::Orbit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Toggle::FpsCounter => "FPS",
            Toggle::GlitchOverlay => "Glitch",
            Toggle::Static => "Static",
            Toggle::Scan => "Scan",
            Toggle::Swell => "LineDist",
            Toggle::Segments => "Hot/Dim",
            Toggle::Orbit => "Move",
        }
    }

    /// Digit key bound to this toggle
    pub fn hotkey(self) -> char {
        match self {
            Toggle::FpsCounter => '0',
            Toggle::GlitchOverlay => '1',
            Toggle::Static => '2',
            Toggle::Scan => '3',
            Toggle::Swell => '4',
            Toggle::Segments => '5',
            Toggle::Orbit => '6',
        }
    }

    pub fn from_hotkey(c: char) -> Option<Toggle> {
        Toggle::ALL.into_iter().find(|t| t.hotkey() == c)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToggleState {
    pub master: bool,
    pub fps: bool,
    pub glitch: bool,
    pub statik: bool,
    pub scan: bool,
    pub swell: bool,
    pub segments: bool,
    pub orbit: bool,
    pub profile_index: usize,
}

impl Default for ToggleState {
    fn default() -> Self {
        Self {
            master: true,
            fps: false,
            glitch: true,
            statik: true,
            scan: true,
            swell: true,
            segments: true,
            orbit: false,
            profile_index: 0,
        }
    }
}

impl ToggleState {
    pub fn flag(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::FpsCounter => self.fps,
            Toggle::GlitchOverlay => self.glitch,
            Toggle::Static => self.statik,
            Toggle::Scan => self.scan,
            Toggle::Swell => self.swell,
            Toggle::Segments => self.segments,
            Toggle::Orbit => self.orbit,
        }
    }

    fn flag_mut(&mut self, toggle: Toggle) -> &mut bool {
        match toggle {
            Toggle::FpsCounter => &mut self.fps,
            Toggle::GlitchOverlay => &mut self.glitch,
            Toggle::Static => &mut self.statik,
            Toggle::Scan => &mut self.scan,
            Toggle::Swell => &mut self.swell,
            Toggle::Segments => &mut self.segments,
            Toggle::Orbit => &mut self.orbit,
        }
    }

    /// Whether a toggle is effectively on (its own flag and the master flag)
    pub fn active(&self, toggle: Toggle) -> bool {
        self.master && self.flag(toggle)
    }

    pub fn toggle_master(&mut self) {
        self.master = !self.master;
    }

    pub fn toggle(&mut self, toggle: Toggle) {
        let flag = self.flag_mut(toggle);
        *flag = !*flag;
    }

    /// Step the profile index by `direction`, wrapping around `count` profiles.
    pub fn cycle_profile(&mut self, direction: i32, count: usize) {
        if count == 0 {
            self.profile_index = 0;
            return;
        }
        let n = count as i64;
        let next = (self.profile_index as i64 + direction as i64).rem_euclid(n);
        self.profile_index = next as usize;
    }
}
