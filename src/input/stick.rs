//! Analog stick processing
//!
//! Deadzone normalization, the look acceleration curve, and the discrete
//! movement keys derived from a deadzoned movement vector.

use crate::engine::keys::{KeyNum, K_DOWNARROW, K_STRAFE_LEFT, K_STRAFE_RIGHT, K_UPARROW};
use crate::engine::EngineSink;

/// Which logical stick a sample belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StickId {
    /// Left stick, drives the movement keys
    Movement,
    /// Right stick, drives relative mouse motion
    Look,
}

/// A 2D stick vector, Y positive up
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StickVector {
    pub x: f32,
    pub y: f32,
}

impl StickVector {
    pub const ZERO: StickVector = StickVector { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Clamp components to [-1, 1] and the length to 1
    ///
    /// Non-finite components read as centered.
    pub fn clamped(self) -> Self {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Self::ZERO;
        }
        let v = Self::new(self.x.clamp(-1.0, 1.0), self.y.clamp(-1.0, 1.0));
        let m = v.magnitude();
        if m > 1.0 {
            Self::new(v.x / m, v.y / m)
        } else {
            v
        }
    }
}

/// Radial deadzone with rescaling
///
/// Inside the deadzone the result is zero. Outside it, the length is
/// remapped from `[deadzone, 1]` to `[0, 1]` keeping the direction, so
/// the output starts at exactly zero on the deadzone edge.
pub fn apply_radial_deadzone(x: f32, y: f32, deadzone: f32) -> StickVector {
    let m = (x * x + y * y).sqrt();
    if !m.is_finite() || m <= 0.0 || m < deadzone {
        return StickVector::ZERO;
    }
    let scaled = (m - deadzone) / (1.0 - deadzone);
    StickVector::new(x / m * scaled, y / m * scaled)
}

/// Per-axis deadzone used by physical controllers
pub fn apply_axial_deadzone(value: f32, deadzone: f32) -> f32 {
    if !value.is_finite() || value.abs() < deadzone {
        return 0.0;
    }
    let sign = if value < 0.0 { -1.0 } else { 1.0 };
    sign * ((value.abs() - deadzone) / (1.0 - deadzone))
}

/// Signed power curve: `v * |v|^(exponent - 1)`
pub fn accelerate(value: f32, exponent: f32) -> f32 {
    value * value.abs().powf(exponent - 1.0)
}

/// Tuning values for both touch sticks
///
/// The acceleration exponent and pixel scale have no derivation beyond
/// feel on the devices they were tried on; keep them configurable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickTuning {
    /// Radial deadzone, in [0, 1)
    pub deadzone: f32,
    /// Look sensitivity multiplier
    pub look_sensitivity: f32,
    /// Look power curve exponent (1.0 = linear)
    pub look_acceleration: f32,
    /// Look motion units at full deflection and sensitivity 1
    pub look_pixel_scale: f32,
    /// Scale for the auxiliary movement magnitude
    pub movement_scale: f32,
}

impl Default for StickTuning {
    fn default() -> Self {
        Self {
            deadzone: 0.02,
            look_sensitivity: 0.6,
            look_acceleration: 1.2,
            look_pixel_scale: 50.0,
            movement_scale: 60.0,
        }
    }
}

impl StickTuning {
    /// Replace out-of-range values with their defaults
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let mut tuning = self;

        if !(0.0..1.0).contains(&tuning.deadzone) {
            log::warn!("Stick deadzone {} out of range, using {}", tuning.deadzone, defaults.deadzone);
            tuning.deadzone = defaults.deadzone;
        }
        if !tuning.look_sensitivity.is_finite() || tuning.look_sensitivity <= 0.0 {
            log::warn!("Look sensitivity {} invalid, using default", tuning.look_sensitivity);
            tuning.look_sensitivity = defaults.look_sensitivity;
        }
        if !tuning.look_acceleration.is_finite() || tuning.look_acceleration <= 0.0 {
            log::warn!("Look acceleration {} invalid, using default", tuning.look_acceleration);
            tuning.look_acceleration = defaults.look_acceleration;
        }
        if !tuning.look_pixel_scale.is_finite() || tuning.look_pixel_scale <= 0.0 {
            log::warn!("Look pixel scale {} invalid, using default", tuning.look_pixel_scale);
            tuning.look_pixel_scale = defaults.look_pixel_scale;
        }
        if !tuning.movement_scale.is_finite() || tuning.movement_scale < 0.0 {
            tuning.movement_scale = defaults.movement_scale;
        }

        tuning
    }

    /// Relative mouse delta for a deadzoned look vector
    ///
    /// Y is inverted: pushing the stick up looks up, which the engine
    /// expects as negative Y motion.
    pub fn look_delta(&self, v: StickVector) -> (i32, i32) {
        let accel_x = accelerate(v.x, self.look_acceleration);
        let accel_y = accelerate(v.y, self.look_acceleration);

        let dx = (accel_x * self.look_sensitivity * self.look_pixel_scale) as i32;
        let dy = (-accel_y * self.look_sensitivity * self.look_pixel_scale) as i32;
        (dx, dy)
    }
}

/// One logical on-screen stick
#[derive(Debug, Clone)]
pub struct AnalogStick {
    pub id: StickId,
    /// Last raw sample
    pub raw: StickVector,
    /// Last deadzoned sample
    pub adjusted: StickVector,
}

impl AnalogStick {
    pub fn new(id: StickId) -> Self {
        Self {
            id,
            raw: StickVector::ZERO,
            adjusted: StickVector::ZERO,
        }
    }

    /// Store a new raw sample and return its deadzoned value
    pub fn sample(&mut self, x: f32, y: f32, deadzone: f32) -> StickVector {
        self.raw = StickVector::new(x, y).clamped();
        self.adjusted = apply_radial_deadzone(self.raw.x, self.raw.y, deadzone);
        self.adjusted
    }

    pub fn is_centered(&self) -> bool {
        self.adjusted.is_zero()
    }
}

/// Direction keys driven by the movement stick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKey {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
}

impl MoveKey {
    pub const ALL: [MoveKey; 4] = [
        MoveKey::Forward,
        MoveKey::Back,
        MoveKey::StrafeLeft,
        MoveKey::StrafeRight,
    ];

    pub fn key(self) -> KeyNum {
        match self {
            MoveKey::Forward => K_UPARROW,
            MoveKey::Back => K_DOWNARROW,
            MoveKey::StrafeLeft => K_STRAFE_LEFT,
            MoveKey::StrafeRight => K_STRAFE_RIGHT,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Analog-weighted movement magnitude per direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveScale {
    pub forward: i32,
    pub back: i32,
    pub left: i32,
    pub right: i32,
}

/// Press state of the four movement keys
///
/// Each key starts in an unknown state, so the very first sample
/// synchronizes the engine with an explicit down/up for every key.
/// After that only changes are emitted.
#[derive(Debug, Clone, Default)]
pub struct MovementKeys {
    state: [Option<bool>; 4],
    scale: MoveScale,
}

impl MovementKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self, key: MoveKey) -> bool {
        self.state[key.index()] == Some(true)
    }

    pub fn scale(&self) -> MoveScale {
        self.scale
    }

    /// Derive key states from a deadzoned vector and emit the changes
    pub fn apply(&mut self, v: StickVector, movement_scale: f32, sink: &mut dyn EngineSink, time: u32) {
        if v.y > 0.0 {
            self.scale.forward = (v.y.abs() * movement_scale) as i32;
            self.scale.back = 0;
            self.set(MoveKey::Forward, true, sink, time);
            self.set(MoveKey::Back, false, sink, time);
        } else if v.y < 0.0 {
            self.scale.forward = 0;
            self.scale.back = (v.y.abs() * movement_scale) as i32;
            self.set(MoveKey::Forward, false, sink, time);
            self.set(MoveKey::Back, true, sink, time);
        } else {
            self.scale.forward = 0;
            self.scale.back = 0;
            self.set(MoveKey::Forward, false, sink, time);
            self.set(MoveKey::Back, false, sink, time);
        }

        if v.x > 0.0 {
            self.scale.right = (v.x.abs() * movement_scale) as i32;
            self.scale.left = 0;
            self.set(MoveKey::StrafeRight, true, sink, time);
            self.set(MoveKey::StrafeLeft, false, sink, time);
        } else if v.x < 0.0 {
            self.scale.right = 0;
            self.scale.left = (v.x.abs() * movement_scale) as i32;
            self.set(MoveKey::StrafeLeft, true, sink, time);
            self.set(MoveKey::StrafeRight, false, sink, time);
        } else {
            self.scale.left = 0;
            self.scale.right = 0;
            self.set(MoveKey::StrafeLeft, false, sink, time);
            self.set(MoveKey::StrafeRight, false, sink, time);
        }
    }

    /// Release every key known to be held
    pub fn release_all(&mut self, sink: &mut dyn EngineSink, time: u32) {
        for key in MoveKey::ALL {
            if self.is_pressed(key) {
                self.set(key, false, sink, time);
            }
        }
        self.scale = MoveScale::default();
    }

    fn set(&mut self, key: MoveKey, down: bool, sink: &mut dyn EngineSink, time: u32) {
        let slot = &mut self.state[key.index()];
        if *slot != Some(down) {
            sink.send_key_event(key.key(), down, time);
            *slot = Some(down);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RecordingSink;
    use proptest::prelude::*;
    use rstest::rstest;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_deadzone_inside_is_zero() {
        assert_eq!(apply_radial_deadzone(0.01, 0.01, 0.02), StickVector::ZERO);
        assert_eq!(apply_radial_deadzone(0.0, 0.0, 0.0), StickVector::ZERO);
    }

    #[test]
    fn test_deadzone_edges() {
        let at_edge = apply_radial_deadzone(0.02, 0.0, 0.02);
        assert!(at_edge.magnitude().abs() < EPS);

        let full = apply_radial_deadzone(0.0, 1.0, 0.02);
        assert_eq!(full.magnitude(), 1.0);
    }

    #[test]
    fn test_deadzone_preserves_direction() {
        let v = apply_radial_deadzone(0.3, -0.4, 0.1);
        // Input direction is (0.6, -0.8)
        assert!((v.x / v.magnitude() - 0.6).abs() < EPS);
        assert!((v.y / v.magnitude() + 0.8).abs() < EPS);
    }

    #[rstest]
    #[case(0.1, 0.15, 0.0)]
    #[case(-0.1, 0.15, 0.0)]
    #[case(1.0, 0.15, 1.0)]
    #[case(-1.0, 0.15, -1.0)]
    fn test_axial_deadzone(#[case] value: f32, #[case] deadzone: f32, #[case] expected: f32) {
        assert!((apply_axial_deadzone(value, deadzone) - expected).abs() < EPS);
    }

    #[test]
    fn test_accelerate_linear_and_sign() {
        assert_eq!(accelerate(0.5, 1.0), 0.5);
        assert!((accelerate(-0.5, 2.0) + 0.25).abs() < EPS);
        assert_eq!(accelerate(0.0, 1.2), 0.0);
    }

    #[test]
    fn test_look_delta_inverts_y() {
        let tuning = StickTuning::default();
        let (dx, dy) = tuning.look_delta(StickVector::new(0.0, 1.0));
        assert_eq!(dx, 0);
        assert_eq!(dy, -30); // 1 * 0.6 * 50
    }

    #[test]
    fn test_look_delta_small_deflection_truncates_to_zero() {
        let tuning = StickTuning::default();
        assert_eq!(tuning.look_delta(StickVector::new(0.01, -0.01)), (0, 0));
    }

    #[test]
    fn test_sanitized_replaces_invalid_values() {
        let tuning = StickTuning {
            deadzone: 1.0,
            look_sensitivity: -2.0,
            look_acceleration: f32::NAN,
            look_pixel_scale: 0.0,
            movement_scale: -1.0,
        }
        .sanitized();
        assert_eq!(tuning, StickTuning::default());
    }

    #[test]
    fn test_stick_clamps_raw_sample() {
        let mut stick = AnalogStick::new(StickId::Look);
        stick.sample(3.0, 0.0, 0.02);
        assert_eq!(stick.raw, StickVector::new(1.0, 0.0));

        let v = stick.sample(1.0, 1.0, 0.0);
        assert!((v.magnitude() - 1.0).abs() < EPS);

        assert_eq!(stick.sample(f32::NAN, 0.5, 0.02), StickVector::ZERO);
    }

    #[test]
    fn test_movement_first_sample_synchronizes() {
        let mut keys = MovementKeys::new();
        let mut sink = RecordingSink::new();

        keys.apply(StickVector::new(0.0, 0.5), 60.0, &mut sink, 0);
        assert_eq!(
            sink.key_transitions(),
            vec![
                (K_UPARROW, true),
                (K_DOWNARROW, false),
                (K_STRAFE_LEFT, false),
                (K_STRAFE_RIGHT, false),
            ]
        );
        assert_eq!(keys.scale().forward, 30);
    }

    #[test]
    fn test_movement_reversal() {
        let mut keys = MovementKeys::new();
        let mut sink = RecordingSink::new();

        keys.apply(StickVector::new(0.5, 0.0), 60.0, &mut sink, 0);
        sink.take();

        keys.apply(StickVector::new(-0.5, 0.0), 60.0, &mut sink, 0);
        assert_eq!(
            sink.key_transitions(),
            vec![(K_STRAFE_LEFT, true), (K_STRAFE_RIGHT, false)]
        );
        assert!(keys.is_pressed(MoveKey::StrafeLeft));
        assert_eq!(keys.scale().left, 30);
        assert_eq!(keys.scale().right, 0);
    }

    #[test]
    fn test_release_all() {
        let mut keys = MovementKeys::new();
        let mut sink = RecordingSink::new();

        keys.apply(StickVector::new(0.5, -0.5), 60.0, &mut sink, 0);
        sink.take();

        keys.release_all(&mut sink, 0);
        assert_eq!(
            sink.key_transitions(),
            vec![(K_DOWNARROW, false), (K_STRAFE_RIGHT, false)]
        );
        assert_eq!(keys.scale(), MoveScale::default());
    }

    proptest! {
        #[test]
        fn prop_inside_deadzone_is_zero(frac in 0.0f32..0.99, angle in 0.0f32..6.28, dz in 0.01f32..0.9) {
            let r = frac * dz;
            let (x, y) = (r * angle.cos(), r * angle.sin());
            prop_assert_eq!(apply_radial_deadzone(x, y, dz), StickVector::ZERO);
        }

        #[test]
        fn prop_rescaled_magnitude_in_unit_range(x in -1.0f32..1.0, y in -1.0f32..1.0, dz in 0.0f32..0.9) {
            let v = StickVector::new(x, y).clamped();
            let out = apply_radial_deadzone(v.x, v.y, dz);
            let m = out.magnitude();
            prop_assert!(m >= 0.0);
            prop_assert!(m <= 1.0 + 1e-5);
        }

        #[test]
        fn prop_look_delta_is_odd(x in -1.0f32..1.0, y in -1.0f32..1.0) {
            let tuning = StickTuning::default();
            let (dx, dy) = tuning.look_delta(StickVector::new(x, y));
            let (nx, ny) = tuning.look_delta(StickVector::new(-x, -y));
            prop_assert_eq!(dx, -nx);
            prop_assert_eq!(dy, -ny);
        }
    }
}
