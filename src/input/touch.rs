//! Virtual input controller
//!
//! Owns the two on-screen sticks, the button set, the visibility state and
//! the console virtual keyboard. Every entry point takes the engine sink
//! explicitly; the controller never reaches for global state.

use crate::engine::{EngineSink, EngineStatus, SharedEngineStatus};

use super::buttons::{ButtonAction, ButtonState, ControlButton};
use super::stick::{AnalogStick, MovementKeys, StickId, StickTuning, StickVector};
use super::visibility::{Control, ExpandTransition, OverlayVisibilityState};
use super::vkeyboard::VirtualKeyboard;

/// Touch overlay controller
#[derive(Debug)]
pub struct TouchControls {
    tuning: StickTuning,
    movement: AnalogStick,
    look: AnalogStick,
    movement_keys: MovementKeys,
    buttons: [ButtonState; ControlButton::COUNT],
    visibility: OverlayVisibilityState,
    transition: Option<ExpandTransition>,
    keyboard: VirtualKeyboard,
    status: SharedEngineStatus,
    last_time: u32,
}

impl Default for TouchControls {
    fn default() -> Self {
        Self::new(StickTuning::default())
    }
}

impl TouchControls {
    pub fn new(tuning: StickTuning) -> Self {
        Self::with_status(tuning, SharedEngineStatus::new())
    }

    /// Create a controller reading engine status from a shared handle
    pub fn with_status(tuning: StickTuning, status: SharedEngineStatus) -> Self {
        let visibility = OverlayVisibilityState {
            in_game: true,
            ..Default::default()
        };
        let mut controls = Self {
            tuning: tuning.sanitized(),
            movement: AnalogStick::new(StickId::Movement),
            look: AnalogStick::new(StickId::Look),
            movement_keys: MovementKeys::new(),
            buttons: [ButtonState::default(); ControlButton::COUNT],
            visibility,
            transition: None,
            keyboard: VirtualKeyboard::new(),
            status,
            last_time: 0,
        };
        for button in ControlButton::ALL {
            controls.buttons[button.index()].visible =
                visibility.is_visible(Control::Button(button));
        }
        controls
    }

    pub fn tuning(&self) -> StickTuning {
        self.tuning
    }

    pub fn set_tuning(&mut self, tuning: StickTuning) {
        self.tuning = tuning.sanitized();
    }

    pub fn status(&self) -> &SharedEngineStatus {
        &self.status
    }

    pub fn visibility(&self) -> OverlayVisibilityState {
        self.visibility
    }

    pub fn is_visible(&self, control: Control) -> bool {
        self.visibility.is_visible(control)
    }

    pub fn button_state(&self, button: ControlButton) -> ButtonState {
        self.buttons[button.index()]
    }

    pub fn set_enabled(&mut self, button: ControlButton, enabled: bool) {
        self.buttons[button.index()].enabled = enabled;
    }

    pub fn stick(&self, id: StickId) -> &AnalogStick {
        match id {
            StickId::Movement => &self.movement,
            StickId::Look => &self.look,
        }
    }

    pub fn movement_keys(&self) -> &MovementKeys {
        &self.movement_keys
    }

    pub fn keyboard(&self) -> &VirtualKeyboard {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut VirtualKeyboard {
        &mut self.keyboard
    }

    /// Secondary cluster animation, if one has been started
    pub fn transition(&self) -> Option<ExpandTransition> {
        self.transition
    }

    /// Engine time for the next event; never goes backwards
    pub fn now(&mut self, sink: &dyn EngineSink) -> u32 {
        self.last_time = self.last_time.max(sink.milliseconds());
        self.last_time
    }

    /// Feed one drag sample from an on-screen stick
    pub fn on_stick_sample(&mut self, id: StickId, x: f32, y: f32, sink: &mut dyn EngineSink) {
        if !self.visibility.is_visible(Control::Stick(id)) {
            return;
        }
        let time = self.now(sink);
        let deadzone = self.tuning.deadzone;

        match id {
            StickId::Movement => {
                let v = self.movement.sample(x, y, deadzone);
                self.movement_keys
                    .apply(v, self.tuning.movement_scale, sink, time);
            }
            StickId::Look => {
                let v = self.look.sample(x, y, deadzone);
                let (dx, dy) = self.tuning.look_delta(v);
                if dx != 0 || dy != 0 {
                    sink.send_mouse_motion(dx, dy, time, true);
                }
            }
        }
    }

    /// Feed a press or release of an on-screen button
    pub fn on_button_event(&mut self, button: ControlButton, is_down: bool, sink: &mut dyn EngineSink) {
        let state = self.buttons[button.index()];

        if is_down {
            if state.pressed || !state.interactable() {
                return;
            }
            self.buttons[button.index()].pressed = true;
            self.press(button, sink);
        } else {
            if !state.pressed {
                return;
            }
            self.buttons[button.index()].pressed = false;
            self.release(button, sink);
        }
    }

    fn press(&mut self, button: ControlButton, sink: &mut dyn EngineSink) {
        match button.action() {
            ButtonAction::Command { press, .. } => sink.inject_command(press),
            ButtonAction::Key(key) => {
                let time = self.now(sink);
                sink.send_key_event(key, true, time);
            }
            ButtonAction::ConsoleKeyboard => {
                let time = self.now(sink);
                self.keyboard.toggle(sink, time);
            }
            ButtonAction::Expand => self.toggle_expand(sink),
        }
    }

    fn release(&mut self, button: ControlButton, sink: &mut dyn EngineSink) {
        match button.action() {
            ButtonAction::Command {
                release: Some(text),
                ..
            } => sink.inject_command(text),
            ButtonAction::Key(key) => {
                let time = self.now(sink);
                sink.send_key_event(key, false, time);
            }
            _ => {}
        }
    }

    /// Project visibility from the given flags and release anything that
    /// disappeared while held
    pub fn recompute_visibility(
        &mut self,
        console_active: bool,
        in_game: bool,
        controller_connected: bool,
        hidden: bool,
        sink: &mut dyn EngineSink,
    ) {
        self.visibility = OverlayVisibilityState {
            expanded: self.visibility.expanded,
            hidden,
            console_active,
            in_game,
            controller_connected,
        };
        self.apply_visibility(sink);
    }

    /// Recompute visibility from a point-in-time engine status
    pub fn refresh_from_snapshot(&mut self, hidden: bool, status: EngineStatus, sink: &mut dyn EngineSink) {
        self.recompute_visibility(
            status.console_active(),
            status.in_game(),
            status.controller_connected,
            hidden,
            sink,
        );
    }

    /// Read the capture flags once, publish them, and recompute
    pub fn refresh_from_engine(&mut self, hidden: bool, sink: &mut dyn EngineSink) {
        self.status.publish_key_catch(sink.key_capture_flags());
        let snapshot = self.status.snapshot();
        self.refresh_from_snapshot(hidden, snapshot, sink);
    }

    /// Record a controller attach or detach and recompute with the last
    /// `hidden` flag
    pub fn set_controller_connected(&mut self, connected: bool, sink: &mut dyn EngineSink) {
        self.status.set_controller_connected(connected);
        self.refresh_from_engine(self.visibility.hidden, sink);
    }

    /// Flip the secondary cluster and start its transition
    pub fn toggle_expand(&mut self, sink: &mut dyn EngineSink) {
        self.visibility.expanded = !self.visibility.expanded;
        let now = self.now(sink);
        self.transition = Some(ExpandTransition::new(now, self.visibility.expanded));
        log::debug!(
            "Button cluster {}",
            if self.visibility.expanded { "expanded" } else { "collapsed" }
        );
        self.apply_visibility(sink);
    }

    fn apply_visibility(&mut self, sink: &mut dyn EngineSink) {
        for button in ControlButton::ALL {
            let visible = self.visibility.is_visible(Control::Button(button));
            let state = &mut self.buttons[button.index()];
            state.visible = visible;
            if !visible && state.pressed {
                state.pressed = false;
                log::debug!("Releasing hidden button {:?}", button);
                self.release(button, sink);
            }
        }

        if !self.visibility.is_visible(Control::Stick(StickId::Movement)) {
            let time = self.now(sink);
            self.movement_keys.release_all(sink, time);
            self.movement.sample(0.0, 0.0, self.tuning.deadzone);
        }
        if !self.visibility.is_visible(Control::Stick(StickId::Look)) {
            self.look.sample(0.0, 0.0, self.tuning.deadzone);
        }
    }

    /// Center a stick whose touch ended
    pub fn recenter(&mut self, id: StickId, sink: &mut dyn EngineSink) {
        if self.stick(id).raw == StickVector::ZERO && self.stick(id).is_centered() {
            return;
        }
        self.on_stick_sample(id, 0.0, 0.0, sink);
    }
}
