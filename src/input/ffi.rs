//! C FFI bindings for the input front-end
//!
//! The native view layer creates one [`InputHandle`] with a table of engine
//! callbacks, then forwards touches, button presses and controller frames
//! through the `rust_Input_*` exports. All exports tolerate a null handle.

use std::ffi::{c_char, c_int, c_uint, CStr, CString};
use std::path::Path;

use crate::engine::{EngineSink, KeyCatch, KeyNum};

use super::buttons::ControlButton;
use super::gamepad::{GamepadButton, GamepadMapper, GamepadSnapshot};
use super::layout::{InputRouter, OverlayLayout, Point};
use super::stick::{StickId, StickTuning};
use super::templates::ControlTemplate;
use super::touch::TouchControls;
use super::visibility::Control;

/// Engine entry points supplied by the native side
///
/// Field order is part of the C ABI. Missing entries are
/// treated as no-ops.
#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct EngineCallbacks {
    pub key_event: Option<extern "C" fn(key: c_int, down: c_int, time: c_uint)>,
    pub mouse_event: Option<extern "C" fn(dx: c_int, dy: c_int, time: c_uint)>,
    pub char_event: Option<extern "C" fn(ch: c_int)>,
    pub joystick_axis: Option<extern "C" fn(axis: c_int, value: c_int, time: c_uint)>,
    pub add_command_text: Option<extern "C" fn(text: *const c_char)>,
    pub get_key_catcher: Option<extern "C" fn() -> c_int>,
    pub milliseconds: Option<extern "C" fn() -> c_int>,
}

/// [`EngineSink`] over a callback table
pub struct CallbackSink<'a> {
    callbacks: &'a EngineCallbacks,
}

impl<'a> CallbackSink<'a> {
    pub fn new(callbacks: &'a EngineCallbacks) -> Self {
        Self { callbacks }
    }
}

impl EngineSink for CallbackSink<'_> {
    fn send_key_event(&mut self, key: KeyNum, down: bool, time: u32) {
        if let Some(f) = self.callbacks.key_event {
            f(key, down as c_int, time);
        }
    }

    fn send_mouse_motion(&mut self, dx: i32, dy: i32, time: u32, _relative: bool) {
        if let Some(f) = self.callbacks.mouse_event {
            f(dx, dy, time);
        }
    }

    fn send_char_event(&mut self, ch: u8) {
        if let Some(f) = self.callbacks.char_event {
            f(ch as c_int);
        }
    }

    fn send_joystick_axis(&mut self, axis: i32, value: i32, time: u32) {
        if let Some(f) = self.callbacks.joystick_axis {
            f(axis, value, time);
        }
    }

    fn inject_command(&mut self, text: &str) {
        let Some(f) = self.callbacks.add_command_text else {
            return;
        };
        match CString::new(text) {
            Ok(cs) => f(cs.as_ptr()),
            Err(_) => log::warn!("Dropping command with embedded NUL: {:?}", text),
        }
    }

    fn key_capture_flags(&self) -> KeyCatch {
        self.callbacks
            .get_key_catcher
            .map(|f| KeyCatch(f() as u32))
            .unwrap_or_default()
    }

    fn milliseconds(&self) -> u32 {
        self.callbacks.milliseconds.map(|f| f() as u32).unwrap_or(0)
    }
}

/// Controller frame as filled in by the native side
///
/// `buttons` is a bitmask indexed by `GamepadButton`; the trigger bits are
/// ignored in favor of the analog trigger values.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct GamepadState {
    pub connected: c_int,
    pub left_x: f32,
    pub left_y: f32,
    pub right_x: f32,
    pub right_y: f32,
    pub left_trigger: f32,
    pub right_trigger: f32,
    pub buttons: c_uint,
}

impl GamepadState {
    pub fn to_snapshot(&self) -> GamepadSnapshot {
        let mut snap = GamepadSnapshot::default();
        snap.connected = self.connected != 0;
        snap.left_x = self.left_x;
        snap.left_y = self.left_y;
        snap.right_x = self.right_x;
        snap.right_y = self.right_y;
        for button in GamepadButton::ALL {
            snap.set_button(button, self.buttons & (1 << button.index()) != 0);
        }
        snap.left_trigger = self.left_trigger;
        snap.right_trigger = self.right_trigger;
        snap
    }
}

/// Everything the front-end needs, behind one opaque pointer
pub struct InputHandle {
    callbacks: EngineCallbacks,
    controls: TouchControls,
    router: InputRouter,
    gamepad: GamepadMapper,
}

impl InputHandle {
    pub fn new(callbacks: EngineCallbacks, width: f32, height: f32) -> Self {
        Self {
            callbacks,
            controls: TouchControls::default(),
            router: InputRouter::new(OverlayLayout::new(width, height)),
            gamepad: GamepadMapper::default(),
        }
    }

    pub fn controls(&self) -> &TouchControls {
        &self.controls
    }
}

/// Run `f` on a live handle, or return `default` for null
///
/// # Safety
/// `handle` must be null or a pointer returned by `rust_Input_Create`
/// that has not been destroyed.
unsafe fn with_handle<R>(handle: *mut InputHandle, default: R, f: impl FnOnce(&mut InputHandle) -> R) -> R {
    match handle.as_mut() {
        Some(h) => f(h),
        None => default,
    }
}

fn stick_from_c(stick: c_int) -> Option<StickId> {
    match stick {
        0 => Some(StickId::Movement),
        1 => Some(StickId::Look),
        _ => None,
    }
}

/// Create an input handle
///
/// Returns null if `callbacks` is null.
///
/// # Safety
/// `callbacks` must be null or point to a valid `EngineCallbacks`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_Create(
    callbacks: *const EngineCallbacks,
    width: f32,
    height: f32,
) -> *mut InputHandle {
    let Some(callbacks) = callbacks.as_ref() else {
        log::warn!("rust_Input_Create called without callbacks");
        return std::ptr::null_mut();
    };
    log::info!("Input overlay created at {}x{}", width, height);
    Box::into_raw(Box::new(InputHandle::new(*callbacks, width, height)))
}

/// Destroy an input handle
///
/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_Destroy(handle: *mut InputHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Feed a stick drag sample (0 = movement, 1 = look)
///
/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_StickSample(handle: *mut InputHandle, stick: c_int, x: f32, y: f32) -> c_int {
    with_handle(handle, -1, |h| {
        let Some(id) = stick_from_c(stick) else {
            return -1;
        };
        let mut sink = CallbackSink::new(&h.callbacks);
        h.controls.on_stick_sample(id, x, y, &mut sink);
        0
    })
}

/// Feed a button press or release
///
/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_ButtonEvent(handle: *mut InputHandle, button: c_int, down: c_int) -> c_int {
    with_handle(handle, -1, |h| {
        let Some(button) = ControlButton::from_i32(button) else {
            return -1;
        };
        let mut sink = CallbackSink::new(&h.callbacks);
        h.controls.on_button_event(button, down != 0, &mut sink);
        0
    })
}

/// Recompute visibility from the engine's current capture flags
///
/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_RefreshVisibility(handle: *mut InputHandle, hidden: c_int) {
    with_handle(handle, (), |h| {
        let mut sink = CallbackSink::new(&h.callbacks);
        h.controls.refresh_from_engine(hidden != 0, &mut sink);
    })
}

/// Publish controller attach/detach and recompute visibility
///
/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_SetControllerConnected(handle: *mut InputHandle, connected: c_int) {
    with_handle(handle, (), |h| {
        let mut sink = CallbackSink::new(&h.callbacks);
        h.controls.set_controller_connected(connected != 0, &mut sink);
    })
}

/// Whether a button is currently shown (1) or hidden (0); -1 on bad input
///
/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_IsButtonVisible(handle: *mut InputHandle, button: c_int) -> c_int {
    with_handle(handle, -1, |h| match ControlButton::from_i32(button) {
        Some(b) => h.controls.is_visible(Control::Button(b)) as c_int,
        None => -1,
    })
}

/// Whether a stick is currently shown (1) or hidden (0); -1 on bad input
///
/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_IsStickVisible(handle: *mut InputHandle, stick: c_int) -> c_int {
    with_handle(handle, -1, |h| match stick_from_c(stick) {
        Some(id) => h.controls.is_visible(Control::Stick(id)) as c_int,
        None => -1,
    })
}

/// Opacity of the expandable cluster at engine time `now`
///
/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_ExpandAlpha(handle: *mut InputHandle, now: c_uint) -> f32 {
    with_handle(handle, 0.0, |h| {
        match h.controls.transition() {
            Some(t) => t.secondary_alpha(now),
            None => {
                if h.controls.visibility().expanded {
                    1.0
                } else {
                    0.0
                }
            }
        }
    })
}

/// Replace the stick tuning; invalid values fall back to defaults
///
/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_SetTuning(
    handle: *mut InputHandle,
    deadzone: f32,
    look_sensitivity: f32,
    look_acceleration: f32,
    look_pixel_scale: f32,
) {
    with_handle(handle, (), |h| {
        let tuning = StickTuning {
            deadzone,
            look_sensitivity,
            look_acceleration,
            look_pixel_scale,
            ..h.controls.tuning()
        };
        h.controls.set_tuning(tuning);
    })
}

/// Route a touch-down in overlay coordinates; 1 if a control took it
///
/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_TouchDown(handle: *mut InputHandle, touch: u64, x: f32, y: f32) -> c_int {
    with_handle(handle, 0, |h| {
        let mut sink = CallbackSink::new(&h.callbacks);
        h.router
            .touch_down(touch, Point::new(x, y), &mut h.controls, &mut sink) as c_int
    })
}

/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_TouchMove(handle: *mut InputHandle, touch: u64, x: f32, y: f32) {
    with_handle(handle, (), |h| {
        let mut sink = CallbackSink::new(&h.callbacks);
        h.router
            .touch_move(touch, Point::new(x, y), &mut h.controls, &mut sink);
    })
}

/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_TouchUp(handle: *mut InputHandle, touch: u64, x: f32, y: f32) {
    with_handle(handle, (), |h| {
        let mut sink = CallbackSink::new(&h.callbacks);
        h.router
            .touch_up(touch, Point::new(x, y), &mut h.controls, &mut sink);
    })
}

/// Release all touches, as when the view loses focus
///
/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_CancelTouches(handle: *mut InputHandle) {
    with_handle(handle, (), |h| {
        let mut sink = CallbackSink::new(&h.callbacks);
        h.router.cancel_all(&mut h.controls, &mut sink);
    })
}

/// Relayout for a new overlay size
///
/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_Resize(handle: *mut InputHandle, width: f32, height: f32) {
    with_handle(handle, (), |h| {
        let mut sink = CallbackSink::new(&h.callbacks);
        h.router.resize(width, height, &mut h.controls, &mut sink);
    })
}

/// Process one controller frame
///
/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`;
/// `state` must be null or point to a valid `GamepadState`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_GamepadFrame(handle: *mut InputHandle, state: *const GamepadState) {
    let Some(state) = state.as_ref() else {
        return;
    };
    with_handle(handle, (), |h| {
        let snap = state.to_snapshot();
        let mut sink = CallbackSink::new(&h.callbacks);
        h.gamepad
            .update(&snap, h.controls.keyboard_mut(), &mut sink);
    })
}

/// Load controller bindings from a template file; 0 on success
///
/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`;
/// `path` must be null or a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_LoadTemplate(handle: *mut InputHandle, path: *const c_char) -> c_int {
    if path.is_null() {
        return -1;
    }
    let Ok(path) = CStr::from_ptr(path).to_str() else {
        return -1;
    };
    with_handle(handle, -1, |h| match ControlTemplate::load(Path::new(path)) {
        Ok(template) => {
            log::info!("Loaded controller template {:?}", template.name);
            h.gamepad.set_bindings(template.bindings);
            0
        }
        Err(e) => {
            log::warn!("Failed to load controller template {}: {}", path, e);
            -1
        }
    })
}

/// Apply the touch and controller settings from a `q3ios.cfg` file
///
/// Returns 0 on success, -1 if the file cannot be read.
///
/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`, and
/// `path` a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_LoadConfig(handle: *mut InputHandle, path: *const c_char) -> c_int {
    if path.is_null() {
        return -1;
    }
    let Ok(path) = CStr::from_ptr(path).to_str() else {
        return -1;
    };
    with_handle(handle, -1, |h| match crate::config::load_config_file(Path::new(path)) {
        Ok(options) => {
            h.controls.set_tuning(options.tuning);
            h.gamepad = GamepadMapper::new(options.gamepad, options.bindings);
            0
        }
        Err(e) => {
            log::warn!("Failed to load input settings: {:#}", e);
            -1
        }
    })
}

/// Open or close the console virtual keyboard
///
/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_KeyboardToggle(handle: *mut InputHandle) {
    with_handle(handle, (), |h| {
        let mut sink = CallbackSink::new(&h.callbacks);
        let time = h.controls.now(&sink);
        h.controls.keyboard_mut().toggle(&mut sink, time);
    })
}

/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_KeyboardActive(handle: *mut InputHandle) -> c_int {
    with_handle(handle, 0, |h| h.controls.keyboard().is_active() as c_int)
}

/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_KeyboardMove(handle: *mut InputHandle, dx: c_int, dy: c_int) {
    with_handle(handle, (), |h| h.controls.keyboard_mut().move_cursor(dx, dy))
}

/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_KeyboardSelect(handle: *mut InputHandle) {
    with_handle(handle, (), |h| {
        let mut sink = CallbackSink::new(&h.callbacks);
        let time = h.controls.now(&sink);
        h.controls.keyboard_mut().select(&mut sink, time);
    })
}

/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_KeyboardBackspace(handle: *mut InputHandle) {
    with_handle(handle, (), |h| {
        let mut sink = CallbackSink::new(&h.callbacks);
        let time = h.controls.now(&sink);
        h.controls.keyboard_mut().backspace(&mut sink, time);
    })
}

/// Cursor position for drawing, as column and row
///
/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`;
/// `col` and `row` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_KeyboardCursor(handle: *mut InputHandle, col: *mut c_int, row: *mut c_int) {
    with_handle(handle, (), |h| {
        let (x, y) = h.controls.keyboard().cursor();
        if let Some(col) = col.as_mut() {
            *col = x as c_int;
        }
        if let Some(row) = row.as_mut() {
            *row = y as c_int;
        }
    })
}

/// Touch the keyboard in video pixels; 1 if a key was hit
///
/// # Safety
/// `handle` must be null or a live pointer from `rust_Input_Create`.
#[no_mangle]
pub unsafe extern "C" fn rust_Input_KeyboardTouch(
    handle: *mut InputHandle,
    x: f32,
    y: f32,
    console_height: f32,
    vid_width: c_int,
    vid_height: c_int,
) -> c_int {
    with_handle(handle, 0, |h| {
        let mut sink = CallbackSink::new(&h.callbacks);
        let time = h.controls.now(&sink);
        h.controls
            .keyboard_mut()
            .touch(x, y, console_height, vid_width, vid_height, &mut sink, time) as c_int
    })
}
