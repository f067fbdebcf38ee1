//! Routes queued pointer events to capture zones, one gesture owner at a time.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::event::{sanitize, IntersectionQuery, PointerEvent};
use crate::zone::{CaptureZone, ZoneState};

/// Handle returned by [`EventDispatcher::register`]. Registration order is
/// priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZoneId(usize);

type EventQueue = Arc<Mutex<VecDeque<PointerEvent>>>;

/// Cloneable producer side of the dispatcher queue. Input sources hold one of
/// these; events are only processed when the owner calls
/// [`EventDispatcher::drain`].
#[derive(Debug, Clone)]
pub struct EventSender {
    queue: EventQueue,
}

impl EventSender {
    /// Queues `event` behind everything already pending.
    pub fn send(&self, event: PointerEvent) {
        self.queue.lock().push_back(event);
    }

    /// Queues a press at `(x, y)`.
    pub fn down(&self, x: f64, y: f64) {
        self.send(PointerEvent::down(x, y));
    }

    /// Queues a release at `(x, y)`.
    pub fn up(&self, x: f64, y: f64) {
        self.send(PointerEvent::up(x, y));
    }

    /// Queues a move with the source's own deltas.
    pub fn moved(&self, x: f64, y: f64, delta_x: f64, delta_y: f64) {
        self.send(PointerEvent::moved(x, y, delta_x, delta_y));
    }
}

#[derive(Default)]
pub struct EventDispatcher {
    zones: Vec<Box<dyn CaptureZone>>,
    queue: EventQueue,
    active: Option<usize>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a zone after every zone registered so far.
    pub fn register(&mut self, zone: impl CaptureZone + 'static) -> ZoneId {
        self.zones.push(Box::new(zone));
        ZoneId(self.zones.len() - 1)
    }

    /// A producer handle that can be moved to another thread.
    pub fn sender(&self) -> EventSender {
        EventSender {
            queue: Arc::clone(&self.queue),
        }
    }

    /// Same as [`EventSender::send`] on the owner's side.
    pub fn enqueue(&self, event: PointerEvent) {
        self.queue.lock().push_back(event);
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// The zone that owns the current gesture, if any.
    pub fn active_zone(&self) -> Option<ZoneId> {
        self.active.map(ZoneId)
    }

    pub fn is_active(&self, id: ZoneId) -> bool {
        self.active == Some(id.0)
    }

    pub fn zone_state(&self, id: ZoneId) -> Option<ZoneState> {
        self.zones.get(id.0).map(|zone| zone.state())
    }

    /// Processes every queued event in arrival order against `scene`.
    /// Returns how many events were consumed by some zone.
    pub fn drain(&mut self, scene: &dyn IntersectionQuery) -> usize {
        let mut consumed = 0;
        // pop one at a time so events sent from callbacks land in this drain
        while let Some(event) = self.next_event() {
            if self.dispatch(&event, scene) {
                consumed += 1;
            }
        }
        consumed
    }

    fn next_event(&self) -> Option<PointerEvent> {
        self.queue.lock().pop_front()
    }

    fn dispatch(&mut self, event: &PointerEvent, scene: &dyn IntersectionQuery) -> bool {
        let intersections = sanitize(scene.intersect(event.position()));

        if let Some(index) = self.active {
            let zone = &mut self.zones[index];
            let consumed = zone.process(event, &intersections, true);
            if !zone.is_active() {
                tracing::debug!("[dispatcher] zone {index} released on {}", event.kind());
                self.active = None;
            }
            return consumed;
        }

        let claimed = self
            .zones
            .iter()
            .any(|zone| !zone.is_background() && zone.matches(&intersections));

        let mut consumed = false;
        for (index, zone) in self.zones.iter_mut().enumerate() {
            consumed |= zone.process(event, &intersections, claimed);
            if zone.is_active() {
                tracing::debug!("[dispatcher] zone {index} captured {}", event.kind());
                self.active = Some(index);
                break;
            }
        }
        consumed
    }

    /// Terminal cancellation such as focus loss. Clears the queue too.
    pub fn cancel_active(&mut self) {
        self.queue.lock().clear();
        if let Some(index) = self.active.take() {
            tracing::info!("[dispatcher] cancelling gesture owned by zone {index}");
            self.zones[index].cancel();
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("zones", &self.zones.len())
            .field("pending", &self.pending())
            .field("active", &self.active)
            .finish()
    }
}
