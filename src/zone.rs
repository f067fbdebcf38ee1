//! Capture zones: a set of target identities plus a two-state gesture machine.
//!
//! A zone never looks at geometry. It only checks whether the intersection map
//! for an event mentions one of its targets, and tracks whether it currently
//! owns a drag. Mutual exclusion between zones is the dispatcher's job.

use std::collections::HashSet;

use crate::event::{IntersectionMap, PointerEvent, TargetId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneState {
    Idle,
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneTargets {
    Identities(HashSet<TargetId>),
    /// Accepts a press only when no other zone's targets were hit.
    Background,
}

/// A drag step delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEvent {
    pub pointer: PointerEvent,
    /// Movement since the previous event this zone saw, in normalized
    /// coordinates.
    pub delta: [f64; 2],
}

pub type DragCallback = Box<dyn FnMut(&DragEvent, &IntersectionMap)>;
pub type HoverCallback = Box<dyn FnMut()>;

/// Something the dispatcher can hand a gesture to.
pub trait CaptureZone {
    fn targets(&self) -> &ZoneTargets;

    fn state(&self) -> ZoneState;

    fn is_active(&self) -> bool {
        self.state() == ZoneState::Active
    }

    fn is_background(&self) -> bool {
        matches!(self.targets(), ZoneTargets::Background)
    }

    /// Whether `intersections` mention any of this zone's targets. The
    /// background sentinel matches nothing by itself.
    fn matches(&self, intersections: &IntersectionMap) -> bool {
        match self.targets() {
            ZoneTargets::Identities(ids) => ids.iter().any(|id| intersections.contains_key(id)),
            ZoneTargets::Background => false,
        }
    }

    /// Feeds one event. `claimed` tells whether any non-background zone's
    /// targets were hit by this event. Returns `true` if the event caused a
    /// transition or a drag callback.
    fn process(
        &mut self,
        event: &PointerEvent,
        intersections: &IntersectionMap,
        claimed: bool,
    ) -> bool;

    /// Drops an ongoing gesture without notifying subscribers.
    fn cancel(&mut self);
}

pub struct DragCaptureZone {
    name: String,
    targets: ZoneTargets,
    state: ZoneState,
    last_position: [f64; 2],
    hovered: bool,
    on_drag: Vec<DragCallback>,
    on_hover_in: Vec<HoverCallback>,
    on_hover_out: Vec<HoverCallback>,
}

impl DragCaptureZone {
    /// A zone that captures presses landing on any of `targets`.
    pub fn new(name: impl Into<String>, targets: impl IntoIterator<Item = TargetId>) -> Self {
        Self::with_targets(name, ZoneTargets::Identities(targets.into_iter().collect()))
    }

    /// The catch-all zone for presses no other zone claims.
    pub fn background(name: impl Into<String>) -> Self {
        Self::with_targets(name, ZoneTargets::Background)
    }

    fn with_targets(name: impl Into<String>, targets: ZoneTargets) -> Self {
        Self {
            name: name.into(),
            targets,
            state: ZoneState::Idle,
            last_position: [0.0, 0.0],
            hovered: false,
            on_drag: Vec::new(),
            on_hover_in: Vec::new(),
            on_hover_out: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subscribes to moves while this zone owns the gesture.
    pub fn on_drag(&mut self, callback: impl FnMut(&DragEvent, &IntersectionMap) + 'static) {
        self.on_drag.push(Box::new(callback));
    }

    /// Called when the pointer starts hitting one of the targets.
    pub fn on_hover_in(&mut self, callback: impl FnMut() + 'static) {
        self.on_hover_in.push(Box::new(callback));
    }

    /// Called when the pointer stops hitting the targets.
    pub fn on_hover_out(&mut self, callback: impl FnMut() + 'static) {
        self.on_hover_out.push(Box::new(callback));
    }

    fn accepts_press(&self, intersections: &IntersectionMap, claimed: bool) -> bool {
        match self.targets {
            ZoneTargets::Identities(_) => self.matches(intersections),
            ZoneTargets::Background => !claimed,
        }
    }

    fn update_hover(&mut self, intersections: &IntersectionMap) {
        let over = self.matches(intersections);
        if over == self.hovered {
            return;
        }
        self.hovered = over;
        let callbacks = if over {
            &mut self.on_hover_in
        } else {
            &mut self.on_hover_out
        };
        for callback in callbacks.iter_mut() {
            callback();
        }
    }
}

impl CaptureZone for DragCaptureZone {
    fn targets(&self) -> &ZoneTargets {
        &self.targets
    }

    fn state(&self) -> ZoneState {
        self.state
    }

    fn process(
        &mut self,
        event: &PointerEvent,
        intersections: &IntersectionMap,
        claimed: bool,
    ) -> bool {
        match (self.state, event) {
            (ZoneState::Idle, PointerEvent::Down { x, y }) => {
                if !self.accepts_press(intersections, claimed) {
                    return false;
                }
                self.state = ZoneState::Active;
                self.last_position = [*x, *y];
                tracing::debug!("[zone] {} captured the pointer", self.name);
                true
            }
            (ZoneState::Idle, PointerEvent::Move { .. }) => {
                self.update_hover(intersections);
                false
            }
            (ZoneState::Active, PointerEvent::Move { x, y, .. }) => {
                let drag = DragEvent {
                    pointer: *event,
                    delta: [x - self.last_position[0], y - self.last_position[1]],
                };
                for callback in self.on_drag.iter_mut() {
                    callback(&drag, intersections);
                }
                self.last_position = [*x, *y];
                true
            }
            (ZoneState::Active, PointerEvent::Up { .. }) => {
                self.state = ZoneState::Idle;
                tracing::debug!("[zone] {} released the pointer", self.name);
                true
            }
            _ => false,
        }
    }

    fn cancel(&mut self) {
        if self.state == ZoneState::Active {
            tracing::debug!("[zone] {} gesture cancelled", self.name);
        }
        self.state = ZoneState::Idle;
    }
}

impl std::fmt::Debug for DragCaptureZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragCaptureZone")
            .field("name", &self.name)
            .field("targets", &self.targets)
            .field("state", &self.state)
            .field("last_position", &self.last_position)
            .field("hovered", &self.hovered)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Intersection;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn hit(ids: &[u64]) -> IntersectionMap {
        ids.iter()
            .map(|&id| {
                (
                    TargetId(id),
                    Intersection {
                        point: [0.0, 0.0, 1.0],
                        distance: 1.0,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_press_on_target_activates() {
        let mut zone = DragCaptureZone::new("handle", [TargetId(7)]);
        assert!(!zone.process(&PointerEvent::down(0.0, 0.0), &hit(&[3]), true));
        assert_eq!(zone.state(), ZoneState::Idle);

        assert!(zone.process(&PointerEvent::down(0.0, 0.0), &hit(&[3, 7]), true));
        assert_eq!(zone.state(), ZoneState::Active);

        assert!(zone.process(&PointerEvent::up(0.0, 0.0), &hit(&[]), false));
        assert_eq!(zone.state(), ZoneState::Idle);
    }

    #[test]
    fn test_delta_is_measured_from_last_seen_position() {
        let deltas = Rc::new(RefCell::new(Vec::new()));
        let mut zone = DragCaptureZone::new("handle", [TargetId(1)]);
        let sink = Rc::clone(&deltas);
        zone.on_drag(move |drag, _| sink.borrow_mut().push(drag.delta));

        zone.process(&PointerEvent::down(0.0, 0.0), &hit(&[1]), true);
        zone.process(&PointerEvent::moved(0.1, 0.0, 5.0, 0.0), &hit(&[]), false);
        zone.process(&PointerEvent::moved(0.3, -0.2, 10.0, 10.0), &hit(&[]), false);

        let deltas = deltas.borrow();
        assert_eq!(deltas.len(), 2);
        assert!((deltas[0][0] - 0.1).abs() < 1e-12);
        assert!((deltas[1][0] - 0.2).abs() < 1e-12);
        assert!((deltas[1][1] + 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_up_fires_no_callback_and_idle_moves_are_ignored() {
        let calls = Rc::new(RefCell::new(0));
        let mut zone = DragCaptureZone::new("handle", [TargetId(1)]);
        let counter = Rc::clone(&calls);
        zone.on_drag(move |_, _| *counter.borrow_mut() += 1);

        assert!(!zone.process(&PointerEvent::moved(0.5, 0.5, 1.0, 1.0), &hit(&[1]), true));
        zone.process(&PointerEvent::down(0.0, 0.0), &hit(&[1]), true);
        zone.process(&PointerEvent::up(0.0, 0.0), &hit(&[1]), true);
        assert_eq!(*calls.borrow(), 0);

        // a second press while active is not a transition
        zone.process(&PointerEvent::down(0.0, 0.0), &hit(&[1]), true);
        assert!(!zone.process(&PointerEvent::down(0.0, 0.0), &hit(&[1]), true));
    }

    #[test]
    fn test_background_only_takes_unclaimed_presses() {
        let mut zone = DragCaptureZone::background("background");
        assert!(!zone.process(&PointerEvent::down(0.0, 0.0), &hit(&[1]), true));
        assert!(zone.process(&PointerEvent::down(0.0, 0.0), &hit(&[1]), false));
        assert!(zone.is_active());
    }

    #[test]
    fn test_hover_in_and_out() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut zone = DragCaptureZone::new("handle", [TargetId(1)]);
        let enter = Rc::clone(&log);
        zone.on_hover_in(move || enter.borrow_mut().push("in"));
        let leave = Rc::clone(&log);
        zone.on_hover_out(move || leave.borrow_mut().push("out"));

        zone.process(&PointerEvent::moved(0.0, 0.0, 0.0, 0.0), &hit(&[1]), true);
        zone.process(&PointerEvent::moved(0.1, 0.0, 0.0, 0.0), &hit(&[1]), true);
        zone.process(&PointerEvent::moved(0.9, 0.0, 0.0, 0.0), &hit(&[]), false);

        assert_eq!(*log.borrow(), vec!["in", "out"]);
        assert_eq!(zone.state(), ZoneState::Idle);
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let mut zone = DragCaptureZone::new("handle", [TargetId(1)]);
        zone.process(&PointerEvent::down(0.0, 0.0), &hit(&[1]), true);
        zone.cancel();
        assert_eq!(zone.state(), ZoneState::Idle);
    }
}
