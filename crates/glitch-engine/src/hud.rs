// ABOUTME: Transient status readout shown after every state change.
// ABOUTME: Fully visible for a while, then fades out linearly.

use glitch_core::{HudSettings, Toggle, ToggleState};

/// Text and opacity of the readout at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct HudReadout {
    pub text: String,
    pub opacity: f32,
}

#[derive(Debug, Clone)]
pub struct Hud {
    settings: HudSettings,
    shown_at: Option<f64>,
    text: String,
}

fn on_off(value: bool) -> &'static str {
    if value {
        "ON "
    } else {
        "OFF"
    }
}

/// Status block: master/profile/FPS, every effect, and the key legend.
pub fn status_text(state: &ToggleState, profile_name: &str) -> String {
    let effect = |toggle: Toggle| {
        format!(
            "{} {:<8} : {}",
            toggle.hotkey(),
            toggle.label(),
            on_off(state.flag(toggle))
        )
    };

    [
        format!(
            "MASTER     : {}   PROFILE   : {}  FPS    : {}",
            on_off(state.master),
            profile_name.to_uppercase(),
            on_off(state.fps)
        ),
        String::new(),
        format!(
            "{}   {}   {}",
            effect(Toggle::GlitchOverlay),
            effect(Toggle::Static),
            effect(Toggle::Scan)
        ),
        format!(
            "{}   {}   {}",
            effect(Toggle::Swell),
            effect(Toggle::Segments),
            effect(Toggle::Orbit)
        ),
        String::new(),
        "Controls".to_string(),
        " 0        FPS counter".to_string(),
        " 1..6     Toggle effects".to_string(),
        " +/-      Color profile".to_string(),
        " A/Space  Master toggle".to_string(),
        " Click    Master toggle".to_string(),
    ]
    .join("\n")
}

impl Hud {
    pub fn new(settings: HudSettings) -> Self {
        Self {
            settings,
            shown_at: None,
            text: String::new(),
        }
    }

    /// Restart the visible period with fresh text.
    pub fn show(&mut self, now_ms: f64, text: String) {
        self.shown_at = Some(now_ms);
        self.text = text;
    }

    pub fn opacity(&self, now_ms: f64) -> f32 {
        let Some(shown_at) = self.shown_at else {
            return 0.0;
        };
        let elapsed = now_ms - shown_at;
        let visible = self.settings.visible_ms;
        let fade = self.settings.fade_ms;

        if elapsed < visible {
            1.0
        } else if fade > 0.0 && elapsed < visible + fade {
            (1.0 - (elapsed - visible) / fade) as f32
        } else {
            0.0
        }
    }

    pub fn readout(&self, now_ms: f64) -> Option<HudReadout> {
        let opacity = self.opacity(now_ms);
        (opacity > 0.0).then(|| HudReadout {
            text: self.text.clone(),
            opacity,
        })
    }
}
