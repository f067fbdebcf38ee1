//! One Bloch sphere on screen: the quantum state, the view, the gate whose
//! rotation is being shown, and the dispatcher that turns pointer input into
//! state-vector drags and view rotation.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::Settings;
use crate::dispatcher::{EventDispatcher, EventSender, ZoneId};
use crate::error::{BlochError, GeometryError, RotationError};
use crate::event::{IntersectionMap, IntersectionQuery, PointerEvent};
use crate::geometry::QuantumState;
use crate::presets::StatePreset;
use crate::rotation::{extract_rotation, GateMatrix, Rotation, RotationDescriptor};
use crate::view::{SphereView, ViewPreset, SPHERE, STATE_HANDLE};
use crate::zone::{DragCaptureZone, DragEvent};

pub type StateListener = Box<dyn FnMut(f64, f64)>;

struct SessionCore {
    state: QuantumState,
    view: SphereView,
    sensitivity: f64,
    gate: Option<GateMatrix>,
    indicator: Option<RotationDescriptor>,
    handle_hovered: bool,
    dragged_once: bool,
    listeners: Vec<StateListener>,
}

impl SessionCore {
    fn publish(&mut self, state: QuantumState) {
        self.state = state;
        tracing::debug!(
            "[session] state theta={:.4} phi={:.4}",
            state.theta(),
            state.phi()
        );
        for listener in self.listeners.iter_mut() {
            listener(state.theta(), state.phi());
        }
    }

    /// Points the state vector at the dragged position: the sphere hit when
    /// there is one, otherwise the pointer's spot on the z=0 plane.
    fn drag_state(&mut self, drag: &DragEvent, intersections: &IntersectionMap) {
        let world = match intersections.get(&SPHERE) {
            Some(hit) => hit.point,
            None => self.view.pointer_to_world(drag.pointer.position()),
        };
        let local = self.view.world_to_local(&world);
        match QuantumState::from_point(&local) {
            Ok(state) => {
                self.dragged_once = true;
                self.publish(state);
            }
            Err(err) => tracing::debug!("[session] ignoring drag step: {err}"),
        }
    }

    fn drag_view(&mut self, drag: &DragEvent) {
        if let PointerEvent::Move {
            delta_x, delta_y, ..
        } = drag.pointer
        {
            let s = self.sensitivity;
            self.view.rotate_by(&[delta_y * s, 0.0, delta_x * s]);
        }
    }
}

/// Answers dispatcher queries against the current view and state.
struct SceneLookup(Rc<RefCell<SessionCore>>);

impl IntersectionQuery for SceneLookup {
    fn intersect(&self, pointer: [f64; 2]) -> IntersectionMap {
        let core = self.0.borrow();
        core.view.intersect(pointer, &core.state.to_point())
    }
}

pub struct BlochSession {
    core: Rc<RefCell<SessionCore>>,
    dispatcher: EventDispatcher,
    scene: SceneLookup,
    handle_zone: ZoneId,
    background_zone: ZoneId,
}

impl BlochSession {
    pub fn new(settings: &Settings) -> Result<Self, GeometryError> {
        let (theta, phi) = settings.initial_angles();
        let core = Rc::new(RefCell::new(SessionCore {
            state: QuantumState::new(theta, phi)?,
            view: SphereView::new(settings.extent, settings.camera_z, settings.handle_tolerance),
            sensitivity: settings.sensitivity,
            gate: None,
            indicator: None,
            handle_hovered: false,
            dragged_once: false,
            listeners: Vec::new(),
        }));

        let mut dispatcher = EventDispatcher::new();

        let mut handle = DragCaptureZone::new("state-vector", [STATE_HANDLE]);
        let drag_core = Rc::clone(&core);
        handle.on_drag(move |drag, hits| drag_core.borrow_mut().drag_state(drag, hits));
        let hover_core = Rc::clone(&core);
        handle.on_hover_in(move || hover_core.borrow_mut().handle_hovered = true);
        let hover_core = Rc::clone(&core);
        handle.on_hover_out(move || hover_core.borrow_mut().handle_hovered = false);
        let handle_zone = dispatcher.register(handle);

        let mut background = DragCaptureZone::background("background");
        let view_core = Rc::clone(&core);
        background.on_drag(move |drag, _| view_core.borrow_mut().drag_view(drag));
        let background_zone = dispatcher.register(background);

        tracing::info!("[session] started at theta={theta:.4} phi={phi:.4}");
        Ok(BlochSession {
            scene: SceneLookup(Rc::clone(&core)),
            core,
            dispatcher,
            handle_zone,
            background_zone,
        })
    }

    /// Producer handle for input sources.
    pub fn sender(&self) -> EventSender {
        self.dispatcher.sender()
    }

    pub fn on_mouse_down(&self, x: f64, y: f64) {
        self.dispatcher.enqueue(PointerEvent::down(x, y));
    }

    pub fn on_mouse_up(&self, x: f64, y: f64) {
        self.dispatcher.enqueue(PointerEvent::up(x, y));
    }

    pub fn on_mouse_move(&self, x: f64, y: f64, delta_x: f64, delta_y: f64) {
        self.dispatcher
            .enqueue(PointerEvent::moved(x, y, delta_x, delta_y));
    }

    /// Drains queued input. Call once per frame.
    pub fn tick(&mut self) -> usize {
        self.dispatcher.drain(&self.scene)
    }

    /// Drops any gesture in progress, e.g. when the window loses focus.
    pub fn cancel_drag(&mut self) {
        self.dispatcher.cancel_active();
    }

    pub fn dragging_state(&self) -> bool {
        self.dispatcher.is_active(self.handle_zone)
    }

    pub fn rotating_view(&self) -> bool {
        self.dispatcher.is_active(self.background_zone)
    }

    pub fn handle_hovered(&self) -> bool {
        self.core.borrow().handle_hovered
    }

    /// Whether the "drag me" hint should still show.
    pub fn hint_visible(&self) -> bool {
        !self.core.borrow().dragged_once
    }

    pub fn state(&self) -> QuantumState {
        self.core.borrow().state
    }

    pub fn set_quantum_state_vector(&mut self, theta: f64, phi: f64) -> Result<(), GeometryError> {
        let state = QuantumState::new(theta, phi)?;
        self.core.borrow_mut().publish(state);
        Ok(())
    }

    pub fn set_state_preset(&mut self, preset: StatePreset) {
        self.core.borrow_mut().publish(preset.state());
    }

    /// Registers a callback receiving `(theta, phi)` after every state change.
    pub fn on_state_changed(&mut self, listener: impl FnMut(f64, f64) + 'static) {
        self.core.borrow_mut().listeners.push(Box::new(listener));
    }

    /// Shows the rotation `matrix` induces. A malformed matrix leaves the
    /// previous gate and indicator in place.
    pub fn set_gate_matrix(&mut self, matrix: GateMatrix) -> Result<Rotation, RotationError> {
        let rotation = match extract_rotation(&matrix) {
            Ok(rotation) => rotation,
            Err(err) => {
                tracing::warn!("[session] keeping previous gate: {err}");
                return Err(err);
            }
        };
        let mut core = self.core.borrow_mut();
        core.gate = Some(matrix);
        core.indicator = rotation.descriptor().copied();
        match core.indicator {
            Some(ref d) => tracing::info!(
                "[session] gate rotates by {:.4} about ({:.3}, {:.3}, {:.3})",
                d.angle,
                d.axis[0],
                d.axis[1],
                d.axis[2]
            ),
            None => tracing::info!("[session] gate is a global phase, indicator hidden"),
        }
        Ok(rotation)
    }

    pub fn clear_gate(&mut self) {
        let mut core = self.core.borrow_mut();
        core.gate = None;
        core.indicator = None;
    }

    pub fn gate(&self) -> Option<GateMatrix> {
        self.core.borrow().gate
    }

    pub fn rotation_indicator(&self) -> Option<RotationDescriptor> {
        self.core.borrow().indicator
    }

    /// Replaces the state with the current gate applied to it. Without a gate
    /// the state is left as is.
    pub fn apply_gate(&mut self) -> Result<QuantumState, BlochError> {
        let (gate, state) = {
            let core = self.core.borrow();
            (core.gate, core.state)
        };
        let Some(gate) = gate else {
            return Ok(state);
        };
        let next = gate.apply(&state)?;
        self.core.borrow_mut().publish(next);
        Ok(next)
    }

    pub fn view(&self) -> SphereView {
        self.core.borrow().view.clone()
    }

    pub fn set_view_preset(&mut self, preset: ViewPreset) {
        self.core.borrow_mut().view.set_preset(preset);
    }

    pub fn set_aspect(&mut self, aspect: f64) {
        self.core.borrow_mut().view.set_aspect(aspect);
    }
}

impl std::fmt::Debug for BlochSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.core.borrow();
        f.debug_struct("BlochSession")
            .field("state", &core.state)
            .field("view", &core.view)
            .field("indicator", &core.indicator)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::GatePreset;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    fn session() -> BlochSession {
        BlochSession::new(&Settings::default()).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let session = session();
        assert!((session.state().theta() - FRAC_PI_4).abs() < 1e-12);
        assert!((session.state().phi() - FRAC_PI_2).abs() < 1e-12);
        assert!(session.hint_visible());
    }

    #[test]
    fn test_listeners_receive_numeric_input() {
        let mut session = session();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        session.on_state_changed(move |theta, phi| sink.borrow_mut().push((theta, phi)));

        session.set_quantum_state_vector(FRAC_PI_2, 0.0).unwrap();
        assert!(session.set_quantum_state_vector(f64::NAN, 0.0).is_err());

        assert_eq!(*seen.borrow(), vec![(FRAC_PI_2, 0.0)]);
    }

    #[test]
    fn test_invalid_gate_keeps_previous_indicator() {
        let mut session = session();
        session.set_gate_matrix(GatePreset::X.matrix().unwrap()).unwrap();
        let before = session.rotation_indicator();
        assert!(before.is_some());

        let mut broken = GateMatrix::identity();
        broken.entries[0][1].re = f64::INFINITY;
        assert!(session.set_gate_matrix(broken).is_err());
        assert_eq!(session.rotation_indicator(), before);
        assert_eq!(session.gate(), Some(GatePreset::X.matrix().unwrap()));
    }

    #[test]
    fn test_identity_gate_hides_indicator() {
        let mut session = session();
        session.set_gate_matrix(GatePreset::H.matrix().unwrap()).unwrap();
        let rotation = session.set_gate_matrix(GateMatrix::identity()).unwrap();
        assert_eq!(rotation, Rotation::NoRotation);
        assert!(session.rotation_indicator().is_none());
    }

    #[test]
    fn test_apply_gate_publishes() {
        let mut session = session();
        session.set_state_preset(StatePreset::Zero);
        session.set_gate_matrix(GatePreset::X.matrix().unwrap()).unwrap();
        let next = session.apply_gate().unwrap();
        assert!((next.theta() - std::f64::consts::PI).abs() < 1e-9);
        assert_eq!(session.state(), next);

        session.clear_gate();
        assert_eq!(session.apply_gate().unwrap(), next);
    }

    #[test]
    fn test_background_drag_rotates_view() {
        let mut session = session();
        let before = session.view().euler();
        // top-left corner is off the sphere and far from the handle
        session.on_mouse_down(-0.95, 0.95);
        session.on_mouse_move(-0.9, 0.95, 10.0, 5.0);
        session.tick();
        assert!(session.rotating_view());

        let after = session.view().euler();
        assert!((after[0] - before[0] - 0.05).abs() < 1e-12);
        assert!((after[2] - before[2] - 0.1).abs() < 1e-12);

        session.on_mouse_up(-0.9, 0.95);
        session.tick();
        assert!(!session.rotating_view());
    }

    #[test]
    fn test_hovering_the_handle() {
        let mut session = session();
        let view = session.view();
        let tip = view.world_to_pointer(&view.local_to_world(&session.state().to_point()));
        session.on_mouse_move(tip[0], tip[1], 0.0, 0.0);
        session.tick();
        assert!(session.handle_hovered());
        session.on_mouse_move(-0.95, -0.95, 0.0, 0.0);
        session.tick();
        assert!(!session.handle_hovered());
    }

    #[test]
    fn test_focus_loss_cancels_drag() {
        let mut session = session();
        session.on_mouse_down(-0.95, 0.95);
        session.tick();
        assert!(session.rotating_view());
        session.cancel_drag();
        assert!(!session.rotating_view());
    }
}
