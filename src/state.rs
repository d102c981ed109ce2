//! State machine for the push-to-talk trigger
//!
//! Idle ──press──▶ Pressed ──release──▶ Idle
//!
//! Duplicate presses, spurious releases and any other value (autorepeat)
//! leave the state unchanged and issue no command.

use crate::input::{KEY_PRESS, KEY_RELEASE};

/// Trigger state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PttState {
    /// Trigger up, microphone muted
    #[default]
    Idle,

    /// Trigger held, microphone open
    Pressed,
}

/// Command the state machine asks the mute controller to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuteCommand {
    Mute,
    Unmute,
}

impl MuteCommand {
    /// Argument for `set_mute`
    pub fn muted(self) -> bool {
        matches!(self, MuteCommand::Mute)
    }
}

impl PttState {
    /// Apply one trigger event value
    pub fn on_trigger(self, value: i32) -> (PttState, Option<MuteCommand>) {
        match (self, value) {
            (PttState::Idle, KEY_PRESS) => (PttState::Pressed, Some(MuteCommand::Unmute)),
            (PttState::Pressed, KEY_RELEASE) => (PttState::Idle, Some(MuteCommand::Mute)),
            (state, _) => (state, None),
        }
    }
}

impl std::fmt::Display for PttState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PttState::Idle => write!(f, "idle"),
            PttState::Pressed => write!(f, "pressed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_press_unmutes() {
        assert_eq!(
            PttState::Idle.on_trigger(KEY_PRESS),
            (PttState::Pressed, Some(MuteCommand::Unmute))
        );
    }

    #[test]
    fn test_pressed_release_mutes() {
        assert_eq!(
            PttState::Pressed.on_trigger(KEY_RELEASE),
            (PttState::Idle, Some(MuteCommand::Mute))
        );
    }

    #[test]
    fn test_duplicate_press_ignored() {
        assert_eq!(PttState::Pressed.on_trigger(KEY_PRESS), (PttState::Pressed, None));
    }

    #[test]
    fn test_spurious_release_ignored() {
        assert_eq!(PttState::Idle.on_trigger(KEY_RELEASE), (PttState::Idle, None));
    }

    #[test]
    fn test_autorepeat_ignored() {
        assert_eq!(PttState::Idle.on_trigger(2), (PttState::Idle, None));
        assert_eq!(PttState::Pressed.on_trigger(2), (PttState::Pressed, None));
    }

    #[test]
    fn test_display() {
        assert_eq!(PttState::default().to_string(), "idle");
        assert_eq!(PttState::Pressed.to_string(), "pressed");
    }

    #[test]
    fn test_mute_command_argument() {
        assert!(MuteCommand::Mute.muted());
        assert!(!MuteCommand::Unmute.muted());
    }
}
