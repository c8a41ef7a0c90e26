//! Touch and controller input
//!
//! Turns raw touches and controller frames into engine key, mouse and
//! command events.
//!
//! # Architecture
//!
//! - [`touch::TouchControls`] owns the on-screen sticks and buttons, their
//!   visibility rules, and the console virtual keyboard
//! - [`layout::InputRouter`] hit-tests touches against the overlay layout
//!   and drives the controller
//! - [`gamepad::GamepadMapper`] diffs physical controller frames
//! - [`ffi`] exposes all of it to the native view layer through one opaque
//!   handle
//!
//! Nothing here is global; every call that emits events takes the
//! [`EngineSink`](crate::engine::EngineSink) to emit into.

pub mod buttons;
pub mod ffi;
pub mod gamepad;
pub mod layout;
pub mod stick;
pub mod templates;
pub mod touch;
pub mod visibility;
pub mod vkeyboard;

pub use buttons::{ButtonAction, ButtonState, ControlButton};
pub use gamepad::{Binding, GamepadBindings, GamepadButton, GamepadMapper, GamepadOptions, GamepadSnapshot};
pub use layout::{ButtonZone, ControlAction, InputRouter, OverlayLayout, Point, PointerTarget, ScreenRect, StickZone};
pub use stick::{AnalogStick, MoveKey, MovementKeys, StickId, StickTuning, StickVector};
pub use templates::{ControlTemplate, TemplateError};
pub use touch::TouchControls;
pub use visibility::{Control, ExpandTransition, OverlayVisibilityState};
pub use vkeyboard::{KeyboardMetrics, VirtualKeyboard};
