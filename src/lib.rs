//! Bloch sphere state explorer.
//!
//! The geometry engine maps qubit states to points on the unit sphere and
//! extracts the rotation a 2×2 gate induces. The capture-zone dispatcher turns
//! a queue of pointer events into exclusive drag gestures over overlapping
//! targets. [`session::BlochSession`] wires both together.

pub mod canvas;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod expr;
pub mod geometry;
pub mod math;
pub mod presets;
pub mod rotation;
pub mod session;
pub mod view;
pub mod zone;

pub use dispatcher::{EventDispatcher, EventSender, ZoneId};
pub use error::{BlochError, ExprError, GeometryError, RotationError};
pub use event::{Intersection, IntersectionMap, IntersectionQuery, PointerEvent, TargetId};
pub use geometry::{to_cartesian, to_spherical, QuantumState};
pub use rotation::{extract_rotation, GateMatrix, Rotation, RotationDescriptor};
pub use session::BlochSession;
pub use zone::{CaptureZone, DragCaptureZone, DragEvent, ZoneState};
