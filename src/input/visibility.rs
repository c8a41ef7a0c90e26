//! Overlay visibility policy
//!
//! A pure projection from five flags to per-control visibility. Nothing
//! here talks to the engine.

use super::buttons::ControlButton;
use super::stick::StickId;

/// Any control on the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Button(ControlButton),
    Stick(StickId),
}

/// Visibility inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayVisibilityState {
    /// Secondary cluster expanded
    pub expanded: bool,
    /// Operator asked to hide the overlay
    pub hidden: bool,
    /// Console owns keyboard focus
    pub console_active: bool,
    /// No console or UI capture
    pub in_game: bool,
    /// A physical controller is attached
    pub controller_connected: bool,
}

impl OverlayVisibilityState {
    /// Fire, jump, weapon cycle and both sticks
    pub fn gameplay_visible(&self) -> bool {
        !self.hidden && !self.console_active
    }

    /// Escape and its companions in the expandable cluster
    pub fn secondary_visible(&self) -> bool {
        self.expanded && !self.hidden
    }

    pub fn quit_visible(&self) -> bool {
        self.in_game && !self.controller_connected
    }

    pub fn is_visible(&self, control: Control) -> bool {
        match control {
            Control::Stick(_) => self.gameplay_visible(),
            Control::Button(button) => match button {
                ControlButton::Fire
                | ControlButton::Jump
                | ControlButton::PrevWeapon
                | ControlButton::NextWeapon => self.gameplay_visible(),
                ControlButton::Escape => self.secondary_visible(),
                ControlButton::ExpandToggle => !self.hidden,
                ControlButton::Quit => self.quit_visible(),
                ControlButton::ConsoleToggle => true,
            },
        }
    }
}

/// Expand/collapse animation window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandTransition {
    pub started_at: u32,
    pub duration_ms: u32,
    pub expanding: bool,
}

impl ExpandTransition {
    pub const DURATION_MS: u32 = 500;

    pub fn new(started_at: u32, expanding: bool) -> Self {
        Self {
            started_at,
            duration_ms: Self::DURATION_MS,
            expanding,
        }
    }

    /// Progress in [0, 1]
    pub fn progress(&self, now: u32) -> f32 {
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed as f32 / self.duration_ms as f32).min(1.0)
    }

    /// Opacity of the secondary cluster at `now`
    pub fn secondary_alpha(&self, now: u32) -> f32 {
        let p = self.progress(now);
        if self.expanding {
            p
        } else {
            1.0 - p
        }
    }

    pub fn is_finished(&self, now: u32) -> bool {
        self.progress(now) >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const GAMEPLAY: [Control; 6] = [
        Control::Button(ControlButton::Fire),
        Control::Button(ControlButton::Jump),
        Control::Button(ControlButton::PrevWeapon),
        Control::Button(ControlButton::NextWeapon),
        Control::Stick(StickId::Movement),
        Control::Stick(StickId::Look),
    ];

    #[rstest]
    fn test_hidden_hides_gameplay(
        #[values(false, true)] console_active: bool,
        #[values(false, true)] in_game: bool,
        #[values(false, true)] controller_connected: bool,
        #[values(false, true)] expanded: bool,
    ) {
        let state = OverlayVisibilityState {
            expanded,
            hidden: true,
            console_active,
            in_game,
            controller_connected,
        };
        for control in GAMEPLAY {
            assert!(!state.is_visible(control), "{:?} visible while hidden", control);
        }
        assert!(!state.is_visible(Control::Button(ControlButton::Escape)));
        assert!(!state.is_visible(Control::Button(ControlButton::ExpandToggle)));
    }

    #[test]
    fn test_console_hides_gameplay_but_not_console_toggle() {
        let state = OverlayVisibilityState {
            console_active: true,
            ..Default::default()
        };
        for control in GAMEPLAY {
            assert!(!state.is_visible(control));
        }
        assert!(state.is_visible(Control::Button(ControlButton::ConsoleToggle)));
        assert!(state.is_visible(Control::Button(ControlButton::ExpandToggle)));
    }

    #[test]
    fn test_secondary_cluster_requires_expanded() {
        let mut state = OverlayVisibilityState::default();
        assert!(!state.is_visible(Control::Button(ControlButton::Escape)));
        state.expanded = true;
        assert!(state.is_visible(Control::Button(ControlButton::Escape)));
    }

    #[rstest]
    #[case(true, false, true)]
    #[case(true, true, false)]
    #[case(false, false, false)]
    #[case(false, true, false)]
    fn test_quit_visibility(
        #[case] in_game: bool,
        #[case] controller_connected: bool,
        #[case] expected: bool,
    ) {
        let state = OverlayVisibilityState {
            in_game,
            controller_connected,
            ..Default::default()
        };
        assert_eq!(state.is_visible(Control::Button(ControlButton::Quit)), expected);
    }

    #[test]
    fn test_transition_progress() {
        let t = ExpandTransition::new(1000, true);
        assert_eq!(t.progress(1000), 0.0);
        assert_eq!(t.progress(1250), 0.5);
        assert_eq!(t.progress(5000), 1.0);
        assert!(t.is_finished(1500));

        let collapse = ExpandTransition::new(1000, false);
        assert_eq!(collapse.secondary_alpha(1000), 1.0);
        assert_eq!(collapse.secondary_alpha(1500), 0.0);

        // A clock earlier than the start reads as not started
        assert_eq!(t.progress(10), 0.0);
    }
}
