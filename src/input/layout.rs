//! Overlay layout and pointer routing
//!
//! Each on-screen control is a [`PointerTarget`] with a hit region. The
//! [`InputRouter`] owns the targets, assigns each touch to the control it
//! started on, and turns the resulting [`ControlAction`]s into calls on a
//! [`TouchControls`].

use std::collections::HashMap;

use crate::engine::EngineSink;

use super::buttons::ControlButton;
use super::stick::{StickId, StickVector};
use super::touch::TouchControls;
use super::visibility::Control;

/// A point in overlay coordinates, Y down
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in overlay coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Result of a pointer event on a control
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    Stick(StickId, f32, f32),
    Button(ControlButton, bool),
}

/// Something on the overlay that reacts to a touch
pub trait PointerTarget {
    fn control(&self) -> Control;

    fn hit(&self, p: Point) -> bool;

    fn on_pointer_down(&mut self, p: Point) -> Option<ControlAction>;

    fn on_pointer_drag(&mut self, p: Point) -> Option<ControlAction>;

    fn on_pointer_up(&mut self, p: Point) -> Option<ControlAction>;
}

/// A thumb stick: the touch offset from the center, scaled by the radius
#[derive(Debug, Clone)]
pub struct StickZone {
    pub id: StickId,
    pub rect: ScreenRect,
}

impl StickZone {
    pub fn new(id: StickId, rect: ScreenRect) -> Self {
        Self { id, rect }
    }

    fn radius(&self) -> f32 {
        self.rect.width.min(self.rect.height) / 2.0
    }

    /// Stick vector for a touch, Y up, length at most 1
    pub fn deflection(&self, p: Point) -> StickVector {
        let radius = self.radius();
        if radius <= 0.0 {
            return StickVector::ZERO;
        }
        let center = self.rect.center();
        StickVector::new((p.x - center.x) / radius, (center.y - p.y) / radius).clamped()
    }

    fn action(&self, p: Point) -> ControlAction {
        let v = self.deflection(p);
        ControlAction::Stick(self.id, v.x, v.y)
    }
}

impl PointerTarget for StickZone {
    fn control(&self) -> Control {
        Control::Stick(self.id)
    }

    fn hit(&self, p: Point) -> bool {
        self.rect.contains(p)
    }

    fn on_pointer_down(&mut self, p: Point) -> Option<ControlAction> {
        Some(self.action(p))
    }

    fn on_pointer_drag(&mut self, p: Point) -> Option<ControlAction> {
        Some(self.action(p))
    }

    fn on_pointer_up(&mut self, _p: Point) -> Option<ControlAction> {
        Some(ControlAction::Stick(self.id, 0.0, 0.0))
    }
}

/// A momentary button; releases wherever the finger lifts
#[derive(Debug, Clone)]
pub struct ButtonZone {
    pub button: ControlButton,
    pub rect: ScreenRect,
}

impl ButtonZone {
    pub fn new(button: ControlButton, rect: ScreenRect) -> Self {
        Self { button, rect }
    }
}

impl PointerTarget for ButtonZone {
    fn control(&self) -> Control {
        Control::Button(self.button)
    }

    fn hit(&self, p: Point) -> bool {
        self.rect.contains(p)
    }

    fn on_pointer_down(&mut self, _p: Point) -> Option<ControlAction> {
        Some(ControlAction::Button(self.button, true))
    }

    fn on_pointer_drag(&mut self, _p: Point) -> Option<ControlAction> {
        None
    }

    fn on_pointer_up(&mut self, _p: Point) -> Option<ControlAction> {
        Some(ControlAction::Button(self.button, false))
    }
}

/// Control frames for an overlay of the given size
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayout {
    pub width: f32,
    pub height: f32,
    pub fire: ScreenRect,
    pub jump: ScreenRect,
    pub movement_stick: ScreenRect,
    pub look_stick: ScreenRect,
    pub quit: ScreenRect,
    pub console: ScreenRect,
    pub expand: ScreenRect,
    pub escape: ScreenRect,
    pub prev_weapon: ScreenRect,
    pub next_weapon: ScreenRect,
}

impl OverlayLayout {
    const STICK_SIZE: f32 = 100.0;
    const STICK_MARGIN: f32 = 50.0;
    const CLUSTER_SPACING: f32 = 8.0;

    pub fn new(width: f32, height: f32) -> Self {
        let stick_y = height - Self::STICK_SIZE - Self::STICK_MARGIN;
        let expand = ScreenRect::new(50.0, 50.0, 50.0, 30.0);

        Self {
            width,
            height,
            fire: ScreenRect::new(width - 250.0, height - 90.0, 75.0, 75.0),
            jump: ScreenRect::new(width - 90.0, height - 135.0, 75.0, 75.0),
            movement_stick: ScreenRect::new(Self::STICK_MARGIN, stick_y, Self::STICK_SIZE, Self::STICK_SIZE),
            look_stick: ScreenRect::new(
                width - Self::STICK_SIZE - Self::STICK_MARGIN,
                stick_y,
                Self::STICK_SIZE,
                Self::STICK_SIZE,
            ),
            quit: ScreenRect::new(10.0, 10.0, 30.0, 30.0),
            console: ScreenRect::new(width - 40.0, 10.0, 30.0, 30.0),
            expand,
            escape: ScreenRect::new(
                expand.x + expand.width + Self::CLUSTER_SPACING,
                expand.y,
                60.0,
                expand.height,
            ),
            prev_weapon: ScreenRect::new(width / 3.0, height / 2.0, width / 3.0, height / 2.0),
            next_weapon: ScreenRect::new(width / 3.0, 0.0, width / 3.0, height / 2.0),
        }
    }

    /// Targets in hit-test order: small controls first, weapon zones last
    pub fn targets(&self) -> Vec<Box<dyn PointerTarget>> {
        vec![
            Box::new(ButtonZone::new(ControlButton::ConsoleToggle, self.console)),
            Box::new(ButtonZone::new(ControlButton::Quit, self.quit)),
            Box::new(ButtonZone::new(ControlButton::ExpandToggle, self.expand)),
            Box::new(ButtonZone::new(ControlButton::Escape, self.escape)),
            Box::new(ButtonZone::new(ControlButton::Fire, self.fire)),
            Box::new(ButtonZone::new(ControlButton::Jump, self.jump)),
            Box::new(StickZone::new(StickId::Movement, self.movement_stick)),
            Box::new(StickZone::new(StickId::Look, self.look_stick)),
            Box::new(ButtonZone::new(ControlButton::NextWeapon, self.next_weapon)),
            Box::new(ButtonZone::new(ControlButton::PrevWeapon, self.prev_weapon)),
        ]
    }
}

/// Touch id to target bookkeeping
pub struct InputRouter {
    layout: OverlayLayout,
    /// Layout targets first, then registered ones
    targets: Vec<Box<dyn PointerTarget>>,
    layout_targets: usize,
    active: HashMap<u64, usize>,
}

impl InputRouter {
    pub fn new(layout: OverlayLayout) -> Self {
        let targets = layout.targets();
        Self {
            layout,
            layout_targets: targets.len(),
            targets,
            active: HashMap::new(),
        }
    }

    pub fn layout(&self) -> &OverlayLayout {
        &self.layout
    }

    /// Add a target behind all existing ones
    pub fn register(&mut self, target: Box<dyn PointerTarget>) {
        self.targets.push(target);
    }

    /// Rebuild the layout targets for a new overlay size, releasing held
    /// touches; registered targets are kept behind them
    pub fn resize(&mut self, width: f32, height: f32, controls: &mut TouchControls, sink: &mut dyn EngineSink) {
        self.cancel_all(controls, sink);
        self.layout = OverlayLayout::new(width, height);

        let registered = self.targets.split_off(self.layout_targets);
        self.targets = self.layout.targets();
        self.layout_targets = self.targets.len();
        self.targets.extend(registered);
    }

    pub fn active_touches(&self) -> usize {
        self.active.len()
    }

    /// Route a new touch; returns whether anything took it
    ///
    /// While the console keyboard is up only the console button keeps its
    /// touches; everything else goes to the key grid.
    pub fn touch_down(
        &mut self,
        touch: u64,
        p: Point,
        controls: &mut TouchControls,
        sink: &mut dyn EngineSink,
    ) -> bool {
        if self.active.contains_key(&touch) {
            return false;
        }

        let keyboard_up = controls.keyboard().is_active();
        let found = self.targets.iter().position(|t| {
            let control = t.control();
            (!keyboard_up || control == Control::Button(ControlButton::ConsoleToggle))
                && controls.is_visible(control)
                && t.hit(p)
        });
        let Some(index) = found else {
            if keyboard_up {
                let console_height = self.layout.height * 0.5;
                let (w, h) = (self.layout.width as i32, self.layout.height as i32);
                let time = controls.now(sink);
                return controls
                    .keyboard_mut()
                    .touch(p.x, p.y, console_height, w, h, sink, time);
            }
            return false;
        };

        self.active.insert(touch, index);
        if let Some(action) = self.targets[index].on_pointer_down(p) {
            apply(action, controls, sink);
        }
        true
    }

    pub fn touch_move(&mut self, touch: u64, p: Point, controls: &mut TouchControls, sink: &mut dyn EngineSink) {
        let Some(&index) = self.active.get(&touch) else {
            return;
        };
        if let Some(action) = self.targets[index].on_pointer_drag(p) {
            apply(action, controls, sink);
        }
    }

    pub fn touch_up(&mut self, touch: u64, p: Point, controls: &mut TouchControls, sink: &mut dyn EngineSink) {
        let Some(index) = self.active.remove(&touch) else {
            return;
        };
        if let Some(action) = self.targets[index].on_pointer_up(p) {
            apply(action, controls, sink);
        }
    }

    /// End every tracked touch, as when the view loses focus
    pub fn cancel_all(&mut self, controls: &mut TouchControls, sink: &mut dyn EngineSink) {
        let touches: Vec<(u64, usize)> = self.active.drain().collect();
        for (_, index) in touches {
            if let Some(action) = self.targets[index].on_pointer_up(Point::default()) {
                apply(action, controls, sink);
            }
        }
    }
}

fn apply(action: ControlAction, controls: &mut TouchControls, sink: &mut dyn EngineSink) {
    match action {
        ControlAction::Stick(id, x, y) => {
            if x == 0.0 && y == 0.0 {
                controls.recenter(id, sink);
            } else {
                controls.on_stick_sample(id, x, y, sink);
            }
        }
        ControlAction::Button(button, down) => controls.on_button_event(button, down, sink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::keys::{K_CONSOLE, K_MWHEELDOWN, K_MWHEELUP, K_SPACE, K_UPARROW};
    use crate::engine::{KeyCatch, RecordingSink, SinkEvent};

    fn setup() -> (InputRouter, TouchControls, RecordingSink) {
        (
            InputRouter::new(OverlayLayout::new(1000.0, 600.0)),
            TouchControls::default(),
            RecordingSink::new(),
        )
    }

    #[test]
    fn test_layout_frames() {
        let layout = OverlayLayout::new(1000.0, 600.0);
        assert_eq!(layout.fire, ScreenRect::new(750.0, 510.0, 75.0, 75.0));
        assert_eq!(layout.movement_stick, ScreenRect::new(50.0, 450.0, 100.0, 100.0));
        assert_eq!(layout.look_stick, ScreenRect::new(850.0, 450.0, 100.0, 100.0));
        assert_eq!(layout.console, ScreenRect::new(960.0, 10.0, 30.0, 30.0));
        assert_eq!(layout.escape.x, 108.0);
    }

    #[test]
    fn test_stick_deflection_is_clamped_and_y_up() {
        let zone = StickZone::new(StickId::Movement, ScreenRect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(zone.deflection(Point::new(50.0, 25.0)), StickVector::new(0.0, 0.5));
        let far = zone.deflection(Point::new(250.0, 50.0));
        assert_eq!(far, StickVector::new(1.0, 0.0));
    }

    #[test]
    fn test_fire_touch_routes_commands() {
        let (mut router, mut controls, mut sink) = setup();
        let fire = router.layout().fire.center();

        assert!(router.touch_down(1, fire, &mut controls, &mut sink));
        router.touch_move(1, Point::new(0.0, 0.0), &mut controls, &mut sink);
        router.touch_up(1, Point::new(0.0, 0.0), &mut controls, &mut sink);

        assert_eq!(sink.commands(), vec!["+attack\n", "-attack\n"]);
        assert_eq!(router.active_touches(), 0);
    }

    #[test]
    fn test_stick_drag_and_release() {
        let (mut router, mut controls, mut sink) = setup();
        let center = router.layout().movement_stick.center();

        router.touch_down(7, center, &mut controls, &mut sink);
        router.touch_move(7, Point::new(center.x, center.y - 25.0), &mut controls, &mut sink);
        assert!(sink.key_transitions().contains(&(K_UPARROW, true)));
        sink.take();

        router.touch_up(7, Point::new(center.x, center.y - 25.0), &mut controls, &mut sink);
        assert_eq!(sink.key_transitions(), vec![(K_UPARROW, false)]);
    }

    #[test]
    fn test_weapon_zones() {
        let (mut router, mut controls, mut sink) = setup();

        router.touch_down(1, Point::new(500.0, 100.0), &mut controls, &mut sink);
        router.touch_down(2, Point::new(500.0, 400.0), &mut controls, &mut sink);
        assert_eq!(router.active_touches(), 2);
        assert_eq!(
            sink.key_transitions(),
            vec![(K_MWHEELUP, true), (K_MWHEELDOWN, true)]
        );
    }

    #[test]
    fn test_invisible_controls_do_not_take_touches() {
        let (mut router, mut controls, mut sink) = setup();
        controls.recompute_visibility(false, true, false, true, &mut sink);
        let fire = router.layout().fire.center();

        assert!(!router.touch_down(1, fire, &mut controls, &mut sink));
        assert!(sink.events.is_empty());

        // The console button is always available
        let console = router.layout().console.center();
        assert!(router.touch_down(2, console, &mut controls, &mut sink));
    }

    #[test]
    fn test_touches_go_to_keyboard_when_active() {
        let (mut router, mut controls, mut sink) = setup();
        let console = router.layout().console.center();
        router.touch_down(1, console, &mut controls, &mut sink);
        router.touch_up(1, console, &mut controls, &mut sink);
        assert!(controls.keyboard().is_active());
        sink.take();

        // 1000x600 with a 300 high console: keys start at (81, 310)
        assert!(router.touch_down(2, Point::new(90.0, 315.0), &mut controls, &mut sink));
        assert_eq!(sink.take(), vec![SinkEvent::Char(b'1')]);
        assert_eq!(router.active_touches(), 0);
    }

    #[test]
    fn test_console_button_closes_keyboard() {
        let (mut router, mut controls, mut sink) = setup();
        let console = router.layout().console.center();

        router.touch_down(1, console, &mut controls, &mut sink);
        router.touch_up(1, console, &mut controls, &mut sink);
        assert!(controls.keyboard().is_active());
        sink.catcher = KeyCatch(KeyCatch::CONSOLE);
        sink.take();

        assert!(router.touch_down(2, console, &mut controls, &mut sink));
        router.touch_up(2, console, &mut controls, &mut sink);
        assert!(!controls.keyboard().is_active());
        assert_eq!(
            sink.key_transitions(),
            vec![(K_CONSOLE, true), (K_CONSOLE, false)]
        );
        assert_eq!(router.active_touches(), 0);
    }

    #[test]
    fn test_resize_keeps_registered_targets() {
        let (mut router, mut controls, mut sink) = setup();
        let corner = ScreenRect::new(0.0, 560.0, 40.0, 40.0);
        router.register(Box::new(ButtonZone::new(ControlButton::Jump, corner)));

        router.resize(800.0, 600.0, &mut controls, &mut sink);
        assert_eq!(router.layout().width, 800.0);

        assert!(router.touch_down(1, corner.center(), &mut controls, &mut sink));
        assert_eq!(sink.key_transitions(), vec![(K_SPACE, true)]);
    }

    #[test]
    fn test_cancel_all_releases() {
        let (mut router, mut controls, mut sink) = setup();
        let jump = router.layout().jump.center();
        router.touch_down(3, jump, &mut controls, &mut sink);
        sink.take();

        router.cancel_all(&mut controls, &mut sink);
        assert_eq!(sink.key_transitions(), vec![(32, false)]);
        assert_eq!(router.active_touches(), 0);
    }
}
