//! The sphere as seen by an orthographic camera on the +z axis.
//!
//! World space is the camera's frame. Local space is the sphere's own frame,
//! where state vectors live; the two differ by the sphere orientation.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::event::{Intersection, IntersectionMap, TargetId};
use crate::math::{
    distance_squared_to_segment, euler_xyz, multiply_matrix_vector, transpose, Mat3, Vec3,
};

/// The unit sphere body.
pub const SPHERE: TargetId = TargetId(1);
/// The state vector arrow, origin to tip.
pub const STATE_HANDLE: TargetId = TargetId(2);

pub const DEFAULT_EXTENT: f64 = 1.5;
pub const DEFAULT_CAMERA_Z: f64 = 2.0;
pub const DEFAULT_HANDLE_TOLERANCE: f64 = 0.06;

/// Fixed orientations offered next to the sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPreset {
    Default,
    /// |0⟩ facing the camera
    Zero,
    /// |i⟩ facing the camera
    PlusI,
    /// |+⟩ facing the camera
    Plus,
}

impl ViewPreset {
    pub const ALL: [ViewPreset; 4] = [
        ViewPreset::Default,
        ViewPreset::Zero,
        ViewPreset::PlusI,
        ViewPreset::Plus,
    ];

    /// Euler angles (XYZ order) of the preset.
    pub fn euler(self) -> Vec3 {
        match self {
            ViewPreset::Default => [-FRAC_PI_4, 0.0, -3.0 * FRAC_PI_4],
            ViewPreset::Zero => [0.0, 0.0, -FRAC_PI_2],
            ViewPreset::PlusI => [-FRAC_PI_2, 0.0, -PI],
            ViewPreset::Plus => [-FRAC_PI_2, 0.0, -FRAC_PI_2],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewPreset::Default => "default",
            ViewPreset::Zero => "0",
            ViewPreset::PlusI => "i",
            ViewPreset::Plus => "+",
        }
    }

    /// The preset after this one, wrapping around.
    pub fn next(self) -> ViewPreset {
        let index = ViewPreset::ALL
            .iter()
            .position(|preset| *preset == self)
            .unwrap_or(0);
        ViewPreset::ALL[(index + 1) % ViewPreset::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SphereView {
    euler: Vec3,
    /// Half the visible height in world units.
    extent: f64,
    /// Visible width over visible height.
    aspect: f64,
    camera_z: f64,
    /// Pick radius around the state vector, in normalized coordinates.
    handle_tolerance: f64,
}

impl Default for SphereView {
    fn default() -> Self {
        SphereView::new(DEFAULT_EXTENT, DEFAULT_CAMERA_Z, DEFAULT_HANDLE_TOLERANCE)
    }
}

impl SphereView {
    pub fn new(extent: f64, camera_z: f64, handle_tolerance: f64) -> Self {
        SphereView {
            euler: ViewPreset::Default.euler(),
            extent,
            aspect: 1.0,
            camera_z,
            handle_tolerance,
        }
    }

    pub fn euler(&self) -> Vec3 {
        self.euler
    }

    pub fn set_euler(&mut self, euler: Vec3) {
        if euler.iter().all(|angle| angle.is_finite()) {
            self.euler = euler;
        }
    }

    pub fn set_preset(&mut self, preset: ViewPreset) {
        self.euler = preset.euler();
    }

    /// Adds `delta` to the Euler angles.
    pub fn rotate_by(&mut self, delta: &Vec3) {
        self.set_euler([
            self.euler[0] + delta[0],
            self.euler[1] + delta[1],
            self.euler[2] + delta[2],
        ]);
    }

    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    /// Ignores degenerate ratios so a zero-sized terminal keeps the last one.
    pub fn set_aspect(&mut self, aspect: f64) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn rotation(&self) -> Mat3 {
        euler_xyz(&self.euler)
    }

    pub fn local_to_world(&self, point: &Vec3) -> Vec3 {
        multiply_matrix_vector(&self.rotation(), point)
    }

    pub fn world_to_local(&self, point: &Vec3) -> Vec3 {
        multiply_matrix_vector(&transpose(&self.rotation()), point)
    }

    /// The point on the z=0 plane under a normalized pointer coordinate.
    pub fn pointer_to_world(&self, pointer: [f64; 2]) -> Vec3 {
        [
            pointer[0] * self.extent * self.aspect,
            pointer[1] * self.extent,
            0.0,
        ]
    }

    /// Normalized coordinate a world point projects to.
    pub fn world_to_pointer(&self, world: &Vec3) -> [f64; 2] {
        [
            world[0] / (self.extent * self.aspect),
            world[1] / self.extent,
        ]
    }

    /// Front-facing hit of the camera ray with the unit sphere.
    pub fn intersect_sphere(&self, pointer: [f64; 2]) -> Option<Intersection> {
        let [x, y, _] = self.pointer_to_world(pointer);
        let r_sq = x * x + y * y;
        if !(r_sq <= 1.0) {
            return None;
        }
        let z = (1.0 - r_sq).sqrt();
        Some(Intersection {
            point: [x, y, z],
            distance: self.camera_z - z,
        })
    }

    /// Screen-space pick of the arrow from the origin to `tip` (local frame).
    pub fn intersect_handle(&self, pointer: [f64; 2], tip: &Vec3) -> Option<Intersection> {
        let tip_world = self.local_to_world(tip);
        let tip_screen = self.world_to_pointer(&tip_world);
        let d_sq = distance_squared_to_segment(pointer, [0.0, 0.0], tip_screen);
        if !(d_sq <= self.handle_tolerance * self.handle_tolerance) {
            return None;
        }
        Some(Intersection {
            point: tip_world,
            distance: self.camera_z - tip_world[2],
        })
    }

    /// Everything under `pointer` given the current state vector tip.
    pub fn intersect(&self, pointer: [f64; 2], tip: &Vec3) -> IntersectionMap {
        let mut hits = IntersectionMap::new();
        if let Some(hit) = self.intersect_sphere(pointer) {
            hits.insert(SPHERE, hit);
        }
        if let Some(hit) = self.intersect_handle(pointer, tip) {
            hits.insert(STATE_HANDLE, hit);
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::length;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < 1e-9, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn test_local_world_round_trip() {
        let view = SphereView::default();
        let p = [0.3, -0.2, 0.9];
        assert_vec_eq(view.world_to_local(&view.local_to_world(&p)), p);
    }

    #[test]
    fn test_default_orientation_tilts_zero_towards_viewer() {
        let view = SphereView::default();
        let zero = view.local_to_world(&[0.0, 0.0, 1.0]);
        assert!((zero[1] - FRAC_PI_4.sin()).abs() < 1e-9);
        assert!((zero[2] - FRAC_PI_4.cos()).abs() < 1e-9);
    }

    #[test]
    fn test_presets_face_their_state() {
        let mut view = SphereView::default();
        view.set_preset(ViewPreset::Zero);
        assert_vec_eq(view.local_to_world(&[0.0, 0.0, 1.0]), [0.0, 0.0, 1.0]);
        view.set_preset(ViewPreset::PlusI);
        assert_vec_eq(view.local_to_world(&[0.0, 1.0, 0.0]), [0.0, 0.0, 1.0]);
        view.set_preset(ViewPreset::Plus);
        assert_vec_eq(view.local_to_world(&[1.0, 0.0, 0.0]), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_sphere_hit_is_on_the_front_surface() {
        let view = SphereView::default();
        let hit = view.intersect_sphere([0.2, 0.1]).unwrap();
        assert!((length(&hit.point) - 1.0).abs() < 1e-12);
        assert!(hit.point[2] > 0.0);
        assert!((hit.distance - (DEFAULT_CAMERA_Z - hit.point[2])).abs() < 1e-12);

        // 1 / 1.5 is the rim
        assert!(view.intersect_sphere([0.7, 0.0]).is_none());
        assert!(view.intersect_sphere([f64::NAN, 0.0]).is_none());
    }

    #[test]
    fn test_handle_hit_along_the_arrow() {
        let mut view = SphereView::default();
        view.set_preset(ViewPreset::Plus);
        // |0⟩ is straight up on screen for this orientation
        let tip = [0.0, 0.0, 1.0];
        let up = view.local_to_world(&tip);
        let screen = view.world_to_pointer(&up);
        assert!(view.intersect_handle([screen[0] / 2.0, screen[1] / 2.0], &tip).is_some());
        assert!(view.intersect_handle([screen[0] + 0.5, screen[1]], &tip).is_none());
    }

    #[test]
    fn test_aspect_widens_the_visible_area() {
        let mut view = SphereView::default();
        view.set_aspect(2.0);
        assert_vec_eq(view.pointer_to_world([1.0, 1.0]), [3.0, 1.5, 0.0]);
        view.set_aspect(0.0);
        assert_eq!(view.aspect(), 2.0);
    }

    #[test]
    fn test_view_preset_cycle() {
        let mut preset = ViewPreset::Default;
        for _ in 0..ViewPreset::ALL.len() {
            preset = preset.next();
        }
        assert_eq!(preset, ViewPreset::Default);
    }
}
