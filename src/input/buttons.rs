//! On-screen buttons
//!
//! Each button maps to either a key number or a console command. Fire and
//! quit inject commands directly so they work regardless of the player's
//! key bindings.

use crate::engine::keys::{KeyNum, K_ESCAPE, K_MWHEELDOWN, K_MWHEELUP, K_SPACE};

/// The fixed set of overlay buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ControlButton {
    Fire = 0,
    Jump = 1,
    PrevWeapon = 2,
    NextWeapon = 3,
    ConsoleToggle = 4,
    Escape = 5,
    Quit = 6,
    ExpandToggle = 7,
}

impl ControlButton {
    pub const COUNT: usize = 8;

    pub const ALL: [ControlButton; Self::COUNT] = [
        ControlButton::Fire,
        ControlButton::Jump,
        ControlButton::PrevWeapon,
        ControlButton::NextWeapon,
        ControlButton::ConsoleToggle,
        ControlButton::Escape,
        ControlButton::Quit,
        ControlButton::ExpandToggle,
    ];

    /// Create from the integer used across the C ABI
    pub fn from_i32(value: i32) -> Option<Self> {
        Self::ALL.get(usize::try_from(value).ok()?).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn action(self) -> ButtonAction {
        match self {
            ControlButton::Fire => ButtonAction::Command {
                press: "+attack\n",
                release: Some("-attack\n"),
            },
            ControlButton::Quit => ButtonAction::Command {
                press: "disconnect\n",
                release: None,
            },
            ControlButton::Jump => ButtonAction::Key(K_SPACE),
            ControlButton::Escape => ButtonAction::Key(K_ESCAPE),
            ControlButton::PrevWeapon => ButtonAction::Key(K_MWHEELDOWN),
            ControlButton::NextWeapon => ButtonAction::Key(K_MWHEELUP),
            ControlButton::ConsoleToggle => ButtonAction::ConsoleKeyboard,
            ControlButton::ExpandToggle => ButtonAction::Expand,
        }
    }
}

/// What a button does when pressed and released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    /// Inject command text; `release` is sent on release when present
    Command {
        press: &'static str,
        release: Option<&'static str>,
    },
    /// Timestamped key down on press, key up on release
    Key(KeyNum),
    /// Toggle the console virtual keyboard on press
    ConsoleKeyboard,
    /// Toggle the secondary button cluster on press
    Expand,
}

/// Per-button press and presentation state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonState {
    pub pressed: bool,
    pub visible: bool,
    pub enabled: bool,
}

impl Default for ButtonState {
    fn default() -> Self {
        Self {
            pressed: false,
            visible: true,
            enabled: true,
        }
    }
}

impl ButtonState {
    /// Whether a press should be accepted right now
    pub fn interactable(&self) -> bool {
        self.visible && self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_i32_roundtrips_index() {
        for button in ControlButton::ALL {
            assert_eq!(ControlButton::from_i32(button as i32), Some(button));
        }
        assert_eq!(ControlButton::from_i32(-1), None);
        assert_eq!(ControlButton::from_i32(8), None);
    }

    #[test]
    fn test_fire_and_quit_use_commands() {
        assert!(matches!(
            ControlButton::Fire.action(),
            ButtonAction::Command { press: "+attack\n", release: Some("-attack\n") }
        ));
        assert!(matches!(
            ControlButton::Quit.action(),
            ButtonAction::Command { press: "disconnect\n", release: None }
        ));
    }

    #[test]
    fn test_key_buttons() {
        assert_eq!(ControlButton::Jump.action(), ButtonAction::Key(32));
        assert_eq!(ControlButton::Escape.action(), ButtonAction::Key(27));
        assert_eq!(ControlButton::PrevWeapon.action(), ButtonAction::Key(183));
        assert_eq!(ControlButton::NextWeapon.action(), ButtonAction::Key(184));
    }

    #[test]
    fn test_button_state_interactable() {
        let mut state = ButtonState::default();
        assert!(state.interactable());
        state.visible = false;
        assert!(!state.interactable());
        state.visible = true;
        state.enabled = false;
        assert!(!state.interactable());
    }
}
