// ABOUTME: Maps keyboard keys to engine commands.
// ABOUTME: Digits toggle effects, +/- cycle profiles, Space/Enter/A flip the master switch.

use glitch_core::Toggle;
use glitch_engine::Command;
use winit::keyboard::{Key, NamedKey};

/// Command bound to a logical key, if any. Letters match case-insensitively.
pub fn command_for_key(key: &Key) -> Option<Command> {
    match key {
        Key::Named(NamedKey::Space | NamedKey::Enter) => Some(Command::ToggleMaster),
        Key::Character(text) => {
            let mut chars = text.chars();
            let c = chars.next()?.to_ascii_lowercase();
            if chars.next().is_some() {
                return None;
            }
            match c {
                ' ' | 'a' => Some(Command::ToggleMaster),
                '+' | '=' => Some(Command::CycleProfile(1)),
                '-' | '_' => Some(Command::CycleProfile(-1)),
                c => Toggle::from_hotkey(c).map(Command::Toggle),
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(s: &str) -> Key {
        Key::Character(s.into())
    }

    #[test]
    fn master_keys() {
        for key in [ch("a"), ch("A"), ch(" "), Key::Named(NamedKey::Space), Key::Named(NamedKey::Enter)] {
            assert_eq!(command_for_key(&key), Some(Command::ToggleMaster));
        }
    }

    #[test]
    fn digits_toggle_effects() {
        assert_eq!(command_for_key(&ch("0")), Some(Command::Toggle(Toggle::FpsCounter)));
        assert_eq!(command_for_key(&ch("1")), Some(Command::Toggle(Toggle::GlitchOverlay)));
        assert_eq!(command_for_key(&ch("4")), Some(Command::Toggle(Toggle::Swell)));
        assert_eq!(command_for_key(&ch("6")), Some(Command::Toggle(Toggle::Orbit)));
        assert_eq!(command_for_key(&ch("7")), None);
    }

    #[test]
    fn profile_keys() {
        assert_eq!(command_for_key(&ch("+")), Some(Command::CycleProfile(1)));
        assert_eq!(command_for_key(&ch("=")), Some(Command::CycleProfile(1)));
        assert_eq!(command_for_key(&ch("-")), Some(Command::CycleProfile(-1)));
        assert_eq!(command_for_key(&ch("_")), Some(Command::CycleProfile(-1)));
    }

    #[test]
    fn unbound_keys_do_nothing() {
        assert_eq!(command_for_key(&ch("q")), None);
        assert_eq!(command_for_key(&ch("ab")), None);
        assert_eq!(command_for_key(&Key::Named(NamedKey::Escape)), None);
    }
}
