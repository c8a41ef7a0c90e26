//! Physical game controller mapping
//!
//! The platform layer samples the controller once per frame into a
//! [`GamepadSnapshot`]. [`GamepadMapper`] diffs it against the previous
//! frame and feeds the engine analog axes, key events and bound commands.

use std::collections::HashMap;

use crate::engine::keys::{
    key_from_name, KeyNum, K_CTRL, K_DOWNARROW, K_ENTER, K_ESCAPE, K_HOME, K_JOY5, K_JOY6, K_JOY7,
    K_LEFTARROW, K_MOUSE1, K_RIGHTARROW, K_SHIFT, K_SPACE, K_TAB, K_UPARROW,
};
use crate::engine::EngineSink;

use super::stick::apply_axial_deadzone;
use super::vkeyboard::VirtualKeyboard;

/// Engine joystick axis value at full deflection
pub const AXIS_SCALE: f32 = 10240.0;

/// Analog trigger travel past which a trigger counts as pressed
pub const TRIGGER_THRESHOLD: f32 = 0.5;

/// Controller buttons, including the two triggers read digitally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GamepadButton {
    A,
    B,
    X,
    Y,
    LeftShoulder,
    RightShoulder,
    LeftTrigger,
    RightTrigger,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    Menu,
    Options,
    LeftThumbstick,
    RightThumbstick,
}

impl GamepadButton {
    pub const COUNT: usize = 16;

    pub const ALL: [GamepadButton; Self::COUNT] = [
        GamepadButton::A,
        GamepadButton::B,
        GamepadButton::X,
        GamepadButton::Y,
        GamepadButton::LeftShoulder,
        GamepadButton::RightShoulder,
        GamepadButton::LeftTrigger,
        GamepadButton::RightTrigger,
        GamepadButton::DpadUp,
        GamepadButton::DpadDown,
        GamepadButton::DpadLeft,
        GamepadButton::DpadRight,
        GamepadButton::Menu,
        GamepadButton::Options,
        GamepadButton::LeftThumbstick,
        GamepadButton::RightThumbstick,
    ];

    /// Face, shoulder, menu and thumbstick buttons, in processing order
    const REGULAR: [GamepadButton; 10] = [
        GamepadButton::A,
        GamepadButton::B,
        GamepadButton::X,
        GamepadButton::Y,
        GamepadButton::LeftShoulder,
        GamepadButton::RightShoulder,
        GamepadButton::Menu,
        GamepadButton::Options,
        GamepadButton::LeftThumbstick,
        GamepadButton::RightThumbstick,
    ];

    const DPAD: [GamepadButton; 4] = [
        GamepadButton::DpadUp,
        GamepadButton::DpadDown,
        GamepadButton::DpadLeft,
        GamepadButton::DpadRight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        Self::ALL.get(usize::try_from(value).ok()?).copied()
    }

    /// Name used in binding templates and the config file
    pub fn name(self) -> &'static str {
        match self {
            GamepadButton::A => "buttonA",
            GamepadButton::B => "buttonB",
            GamepadButton::X => "buttonX",
            GamepadButton::Y => "buttonY",
            GamepadButton::LeftShoulder => "leftShoulder",
            GamepadButton::RightShoulder => "rightShoulder",
            GamepadButton::LeftTrigger => "leftTrigger",
            GamepadButton::RightTrigger => "rightTrigger",
            GamepadButton::DpadUp => "dpadUp",
            GamepadButton::DpadDown => "dpadDown",
            GamepadButton::DpadLeft => "dpadLeft",
            GamepadButton::DpadRight => "dpadRight",
            GamepadButton::Menu => "buttonMenu",
            GamepadButton::Options => "buttonOptions",
            GamepadButton::LeftThumbstick => "leftThumbstickButton",
            GamepadButton::RightThumbstick => "rightThumbstickButton",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.name().eq_ignore_ascii_case(name))
    }

    pub fn default_binding(self) -> &'static str {
        match self {
            GamepadButton::A => "+moveup",
            GamepadButton::B => "+button2",
            GamepadButton::X => "+movedown",
            GamepadButton::Y => "+gesture",
            GamepadButton::LeftShoulder => "+moveup",
            GamepadButton::RightShoulder => "weapnext",
            GamepadButton::LeftTrigger => "+zoom",
            GamepadButton::RightTrigger => "+attack",
            GamepadButton::DpadUp => "",
            GamepadButton::DpadDown => "drop",
            GamepadButton::DpadLeft => "weapprev",
            GamepadButton::DpadRight => "weapnext",
            GamepadButton::Menu => "togglemenu",
            GamepadButton::Options => "+scores",
            GamepadButton::LeftThumbstick => "+speed",
            GamepadButton::RightThumbstick => "centerview",
        }
    }

    /// Key sent when the button has no binding; the d-pad has none
    pub fn fallback_key(self) -> Option<KeyNum> {
        match self {
            GamepadButton::A => Some(K_SPACE),
            GamepadButton::B => Some(K_ENTER),
            GamepadButton::X => Some(K_CTRL),
            GamepadButton::Y => Some(K_HOME),
            GamepadButton::LeftShoulder => Some(K_JOY5),
            GamepadButton::RightShoulder => Some(K_JOY6),
            GamepadButton::LeftTrigger => Some(K_JOY7),
            GamepadButton::RightTrigger => Some(K_MOUSE1),
            GamepadButton::Menu => Some(K_ESCAPE),
            GamepadButton::Options => Some(K_TAB),
            GamepadButton::LeftThumbstick => Some(K_SHIFT),
            GamepadButton::RightThumbstick => Some(K_HOME),
            GamepadButton::DpadUp
            | GamepadButton::DpadDown
            | GamepadButton::DpadLeft
            | GamepadButton::DpadRight => None,
        }
    }

    /// Arrow key the d-pad sends in menus
    fn menu_key(self) -> Option<KeyNum> {
        match self {
            GamepadButton::DpadUp => Some(K_UPARROW),
            GamepadButton::DpadDown => Some(K_DOWNARROW),
            GamepadButton::DpadLeft => Some(K_LEFTARROW),
            GamepadButton::DpadRight => Some(K_RIGHTARROW),
            _ => None,
        }
    }
}

/// What a binding string means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Console command; `+cmd` pairs with `-cmd` on release
    Command(String),
    /// Key press and release
    Key(KeyNum),
    /// Empty, or a name that matches no key
    Unbound,
}

impl Binding {
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Binding::Unbound;
        }
        if is_command(text) {
            return Binding::Command(text.to_string());
        }
        match key_from_name(text) {
            Some(key) if key > 0 => Binding::Key(key),
            _ => Binding::Unbound,
        }
    }
}

fn is_command(text: &str) -> bool {
    const NAMED: [&str; 4] = ["weapnext", "weapprev", "centerview", "togglemenu"];
    text.contains(' ')
        || text.starts_with('+')
        || text.starts_with('-')
        || NAMED.iter().any(|n| n.eq_ignore_ascii_case(text))
}

/// Button to binding-string table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamepadBindings {
    bindings: HashMap<GamepadButton, String>,
}

impl Default for GamepadBindings {
    fn default() -> Self {
        let bindings = GamepadButton::ALL
            .iter()
            .map(|b| (*b, b.default_binding().to_string()))
            .collect();
        Self { bindings }
    }
}

impl GamepadBindings {
    /// Table with every button unbound
    pub fn empty() -> Self {
        let bindings = GamepadButton::ALL
            .iter()
            .map(|b| (*b, String::new()))
            .collect();
        Self { bindings }
    }

    pub fn get(&self, button: GamepadButton) -> &str {
        self.bindings.get(&button).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, button: GamepadButton, binding: &str) {
        self.bindings.insert(button, binding.trim().to_string());
    }

    /// Bindings in button order
    pub fn iter(&self) -> impl Iterator<Item = (GamepadButton, &str)> + '_ {
        GamepadButton::ALL.iter().map(move |b| (*b, self.get(*b)))
    }
}

/// Controller tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamepadOptions {
    pub deadzone: f32,
    pub left_stick_sensitivity: f32,
    pub right_stick_sensitivity: f32,
    pub menu_mouse_speed: f32,
    pub use_analog: bool,
    pub side_axis: i32,
    pub forward_axis: i32,
    pub yaw_axis: i32,
    pub pitch_axis: i32,
}

impl Default for GamepadOptions {
    fn default() -> Self {
        Self {
            deadzone: 0.15,
            left_stick_sensitivity: 1.0,
            right_stick_sensitivity: 5.0,
            menu_mouse_speed: 20.0,
            use_analog: true,
            side_axis: 0,
            forward_axis: 1,
            yaw_axis: 2,
            pitch_axis: 3,
        }
    }
}

impl GamepadOptions {
    /// Replace out-of-range values with their defaults
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let mut options = self;
        if !(0.0..1.0).contains(&options.deadzone) {
            log::warn!("Controller deadzone {} out of range, using {}", options.deadzone, defaults.deadzone);
            options.deadzone = defaults.deadzone;
        }
        if !options.left_stick_sensitivity.is_finite() {
            options.left_stick_sensitivity = defaults.left_stick_sensitivity;
        }
        if !options.right_stick_sensitivity.is_finite() {
            options.right_stick_sensitivity = defaults.right_stick_sensitivity;
        }
        if !options.menu_mouse_speed.is_finite() || options.menu_mouse_speed < 0.0 {
            options.menu_mouse_speed = defaults.menu_mouse_speed;
        }
        options
    }
}

/// One frame of controller state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GamepadSnapshot {
    pub connected: bool,
    pub left_x: f32,
    pub left_y: f32,
    pub right_x: f32,
    pub right_y: f32,
    pub left_trigger: f32,
    pub right_trigger: f32,
    buttons: [bool; GamepadButton::COUNT],
}

impl GamepadSnapshot {
    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Default::default()
        }
    }

    /// Digital state; triggers compare their travel with the threshold
    pub fn pressed(&self, button: GamepadButton) -> bool {
        match button {
            GamepadButton::LeftTrigger => self.left_trigger > TRIGGER_THRESHOLD,
            GamepadButton::RightTrigger => self.right_trigger > TRIGGER_THRESHOLD,
            _ => self.buttons[button.index()],
        }
    }

    pub fn set_button(&mut self, button: GamepadButton, down: bool) {
        let travel = if down { 1.0 } else { 0.0 };
        match button {
            GamepadButton::LeftTrigger => self.left_trigger = travel,
            GamepadButton::RightTrigger => self.right_trigger = travel,
            _ => self.buttons[button.index()] = down,
        }
    }

    pub fn with_button(mut self, button: GamepadButton, down: bool) -> Self {
        self.set_button(button, down);
        self
    }
}

/// Edge state for the virtual keyboard navigation
#[derive(Debug, Clone, Copy, Default)]
struct KeyboardNav {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    select: bool,
    backspace: bool,
}

/// Edge state for menu navigation
#[derive(Debug, Clone, Copy, Default)]
struct MenuNav {
    click: bool,
    enter: bool,
    escape: bool,
    accum_x: f32,
    accum_y: f32,
}

/// Frame-to-frame controller translator
#[derive(Debug, Clone)]
pub struct GamepadMapper {
    options: GamepadOptions,
    bindings: GamepadBindings,
    previous: [bool; GamepadButton::COUNT],
    keyboard_nav: KeyboardNav,
    menu_nav: MenuNav,
    combo_active: bool,
}

impl Default for GamepadMapper {
    fn default() -> Self {
        Self::new(GamepadOptions::default(), GamepadBindings::default())
    }
}

impl GamepadMapper {
    pub fn new(options: GamepadOptions, bindings: GamepadBindings) -> Self {
        Self {
            options: options.sanitized(),
            bindings,
            previous: [false; GamepadButton::COUNT],
            keyboard_nav: KeyboardNav::default(),
            menu_nav: MenuNav::default(),
            combo_active: false,
        }
    }

    pub fn options(&self) -> &GamepadOptions {
        &self.options
    }

    pub fn bindings(&self) -> &GamepadBindings {
        &self.bindings
    }

    pub fn set_bindings(&mut self, bindings: GamepadBindings) {
        self.bindings = bindings;
    }

    /// Process one frame
    pub fn update(
        &mut self,
        snap: &GamepadSnapshot,
        keyboard: &mut VirtualKeyboard,
        sink: &mut dyn EngineSink,
    ) {
        if !snap.connected {
            return;
        }
        let time = sink.milliseconds();
        let dz = self.options.deadzone;
        let left_x = apply_axial_deadzone(snap.left_x, dz) * self.options.left_stick_sensitivity;
        let left_y = apply_axial_deadzone(snap.left_y, dz) * self.options.left_stick_sensitivity;
        let right_x = apply_axial_deadzone(snap.right_x, dz) * self.options.right_stick_sensitivity;
        let right_y = apply_axial_deadzone(snap.right_y, dz) * self.options.right_stick_sensitivity;

        if self.options.use_analog {
            let o = &self.options;
            sink.send_joystick_axis(o.side_axis, (left_x * AXIS_SCALE) as i32, time);
            sink.send_joystick_axis(o.forward_axis, (-left_y * AXIS_SCALE) as i32, time);
            sink.send_joystick_axis(o.yaw_axis, (right_x * AXIS_SCALE) as i32, time);
            sink.send_joystick_axis(o.pitch_axis, (-right_y * AXIS_SCALE) as i32, time);
        }

        let l3 = snap.pressed(GamepadButton::LeftThumbstick);
        let r3 = snap.pressed(GamepadButton::RightThumbstick);
        if l3 && r3 {
            if !self.combo_active {
                keyboard.toggle(sink, time);
                self.combo_active = true;
            }
        } else {
            self.combo_active = false;
        }

        let in_game = sink.key_capture_flags().in_game();

        if keyboard.is_active() {
            self.navigate_keyboard(snap, keyboard, sink, time);
            return;
        }

        for button in GamepadButton::REGULAR {
            let down = snap.pressed(button);
            if self.edge(button, down) {
                self.fire_binding(button, down, sink, time);
            }
        }

        for button in GamepadButton::DPAD {
            let down = snap.pressed(button);
            if !self.edge(button, down) {
                continue;
            }
            let binding = self.bindings.get(button);
            if in_game && !binding.is_empty() {
                self.dispatch(binding, down, sink, time);
            } else if !in_game {
                if let Some(key) = button.menu_key() {
                    sink.send_key_event(key, down, time);
                }
            }
        }

        if !in_game {
            self.simulate_menu_mouse(snap, left_x, left_y, sink, time);
        }

        for button in [GamepadButton::LeftTrigger, GamepadButton::RightTrigger] {
            let down = snap.pressed(button);
            if self.edge(button, down) {
                self.fire_binding(button, down, sink, time);
            }
        }
    }

    /// Record the new state; true when it changed
    fn edge(&mut self, button: GamepadButton, down: bool) -> bool {
        let slot = &mut self.previous[button.index()];
        let changed = *slot != down;
        *slot = down;
        changed
    }

    fn fire_binding(&self, button: GamepadButton, down: bool, sink: &mut dyn EngineSink, time: u32) {
        let binding = self.bindings.get(button);
        if binding.is_empty() {
            if let Some(key) = button.fallback_key() {
                sink.send_key_event(key, down, time);
            }
        } else {
            self.dispatch(binding, down, sink, time);
        }
    }

    fn dispatch(&self, binding: &str, down: bool, sink: &mut dyn EngineSink, time: u32) {
        match Binding::parse(binding) {
            Binding::Command(cmd) => {
                if let Some(rest) = cmd.strip_prefix('+') {
                    if down {
                        sink.inject_command(&format!("{}\n", cmd));
                    } else {
                        sink.inject_command(&format!("-{}\n", rest));
                    }
                } else if down {
                    sink.inject_command(&format!("{}\n", cmd));
                }
            }
            Binding::Key(key) => sink.send_key_event(key, down, time),
            Binding::Unbound => {
                log::debug!("Controller binding {:?} resolves to nothing", binding);
            }
        }
    }

    fn navigate_keyboard(
        &mut self,
        snap: &GamepadSnapshot,
        keyboard: &mut VirtualKeyboard,
        sink: &mut dyn EngineSink,
        time: u32,
    ) {
        let left = snap.pressed(GamepadButton::DpadLeft);
        let right = snap.pressed(GamepadButton::DpadRight);
        let up = snap.pressed(GamepadButton::DpadUp);
        let down = snap.pressed(GamepadButton::DpadDown);
        let select = snap.pressed(GamepadButton::A);
        let backspace = snap.pressed(GamepadButton::B);
        let prev = self.keyboard_nav;

        if left && !prev.left {
            keyboard.move_cursor(-1, 0);
        }
        if right && !prev.right {
            keyboard.move_cursor(1, 0);
        }
        if up && !prev.up {
            keyboard.move_cursor(0, -1);
        }
        if down && !prev.down {
            keyboard.move_cursor(0, 1);
        }
        if select && !prev.select {
            keyboard.select(sink, time);
        }
        if backspace && !prev.backspace {
            keyboard.backspace(sink, time);
        }

        self.keyboard_nav = KeyboardNav {
            left,
            right,
            up,
            down,
            select,
            backspace,
        };
    }

    fn simulate_menu_mouse(
        &mut self,
        snap: &GamepadSnapshot,
        left_x: f32,
        left_y: f32,
        sink: &mut dyn EngineSink,
        time: u32,
    ) {
        let nav = &mut self.menu_nav;
        nav.accum_x += left_x * self.options.menu_mouse_speed;
        nav.accum_y += -left_y * self.options.menu_mouse_speed;

        let dx = nav.accum_x as i32;
        let dy = nav.accum_y as i32;
        if dx != 0 || dy != 0 {
            sink.send_mouse_motion(dx, dy, time, true);
            nav.accum_x -= dx as f32;
            nav.accum_y -= dy as f32;
        }

        let click = snap.right_trigger > TRIGGER_THRESHOLD;
        if click != nav.click {
            sink.send_key_event(K_MOUSE1, click, time);
            nav.click = click;
        }

        let enter = snap.pressed(GamepadButton::A);
        if enter != nav.enter {
            sink.send_key_event(K_ENTER, enter, time);
            nav.enter = enter;
        }

        let escape = snap.pressed(GamepadButton::B);
        if escape != nav.escape {
            sink.send_key_event(K_ESCAPE, escape, time);
            nav.escape = escape;
        }
    }
}
