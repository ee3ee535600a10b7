// ABOUTME: Discrete user commands and the state mutations they cause.
// ABOUTME: The engine follows every command with a full apply pass.

use glitch_core::{Toggle, ToggleState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleMaster,
    Toggle(Toggle),
    /// Step through color profiles; +1 forward, -1 back
    CycleProfile(i32),
}

impl Command {
    /// Mutate the toggle state. `profile_count` bounds profile cycling.
    pub fn apply_to(self, state: &mut ToggleState, profile_count: usize) {
        match self {
            Command::ToggleMaster => state.toggle_master(),
            Command::Toggle(toggle) => state.toggle(toggle),
            Command::CycleProfile(direction) => state.cycle_profile(direction.signum(), profile_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_mutate_state() {
        let mut state = ToggleState::default();

        Command::Toggle(Toggle::Orbit).apply_to(&mut state, 4);
        assert!(state.orbit);

        Command::ToggleMaster.apply_to(&mut state, 4);
        assert!(!state.master);

        Command::CycleProfile(-1).apply_to(&mut state, 4);
        assert_eq!(state.profile_index, 3);
        Command::CycleProfile(5).apply_to(&mut state, 4);
        assert_eq!(state.profile_index, 0);
    }
}
