//! Pointer input and the intersection results the dispatcher routes on.

use std::collections::HashMap;

use crate::math::Vec3;

/// A raw pointer event in normalized device coordinates (`-1..=1` on both
/// axes, `y` up). Immutable once enqueued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    /// `delta_x`/`delta_y` are whatever the input source measured since its
    /// previous move, in its own units.
    Move {
        x: f64,
        y: f64,
        delta_x: f64,
        delta_y: f64,
    },
}

impl PointerEvent {
    pub fn down(x: f64, y: f64) -> Self {
        PointerEvent::Down { x, y }
    }

    pub fn up(x: f64, y: f64) -> Self {
        PointerEvent::Up { x, y }
    }

    pub fn moved(x: f64, y: f64, delta_x: f64, delta_y: f64) -> Self {
        PointerEvent::Move {
            x,
            y,
            delta_x,
            delta_y,
        }
    }

    pub fn position(&self) -> [f64; 2] {
        match *self {
            PointerEvent::Down { x, y }
            | PointerEvent::Up { x, y }
            | PointerEvent::Move { x, y, .. } => [x, y],
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PointerEvent::Down { .. } => "down",
            PointerEvent::Up { .. } => "up",
            PointerEvent::Move { .. } => "move",
        }
    }
}

/// Opaque identity of something a ray can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// World-space hit point.
    pub point: Vec3,
    /// Distance along the ray.
    pub distance: f64,
}

pub type IntersectionMap = HashMap<TargetId, Intersection>;

/// Ray/scene query supplied by whatever owns the scene.
pub trait IntersectionQuery {
    /// Everything under the normalized pointer coordinate.
    fn intersect(&self, pointer: [f64; 2]) -> IntersectionMap;
}

impl<F> IntersectionQuery for F
where
    F: Fn([f64; 2]) -> IntersectionMap,
{
    fn intersect(&self, pointer: [f64; 2]) -> IntersectionMap {
        self(pointer)
    }
}

/// Drops entries that carry non-finite data. Missing data is just absence.
pub fn sanitize(mut intersections: IntersectionMap) -> IntersectionMap {
    intersections.retain(|_, hit| {
        hit.point.iter().all(|c| c.is_finite()) && hit.distance.is_finite()
    });
    intersections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_drops_malformed_hits() {
        let mut map = IntersectionMap::new();
        map.insert(
            TargetId(1),
            Intersection {
                point: [0.0, 0.0, 1.0],
                distance: 1.0,
            },
        );
        map.insert(
            TargetId(2),
            Intersection {
                point: [f64::NAN, 0.0, 1.0],
                distance: 1.0,
            },
        );
        let clean = sanitize(map);
        assert!(clean.contains_key(&TargetId(1)));
        assert!(!clean.contains_key(&TargetId(2)));
    }

    #[test]
    fn test_closure_is_a_query() {
        let empty = |_: [f64; 2]| IntersectionMap::new();
        assert!(empty.intersect([0.0, 0.0]).is_empty());
    }
}
