//! Conversions between Bloch-sphere angles and Cartesian points.
//!
//! Everything here is pure: no shared state, safe to call from any thread.

use std::f64::consts::{PI, TAU};

use num_complex::Complex64;

use crate::error::GeometryError;
use crate::math::Vec3;

/// Converts spherical coordinates to a Cartesian point of radius `r`.
///
/// Defined for all real inputs; the result is canonical only for
/// `theta` in `[0, PI]` and `phi` in `[0, TAU)`.
pub fn to_cartesian(theta: f64, phi: f64, r: f64) -> Vec3 {
    let (sin_t, cos_t) = theta.sin_cos();
    let (sin_p, cos_p) = phi.sin_cos();
    [r * sin_t * cos_p, r * sin_t * sin_p, r * cos_t]
}

/// Converts a direction to `(theta, phi)` with `theta` in `[0, PI]` and `phi`
/// in `[0, TAU)`.
///
/// The input does not need unit length. A zero-length or non-finite input has
/// no direction and is rejected instead of being snapped to some axis.
pub fn to_spherical(point: &Vec3) -> Result<(f64, f64), GeometryError> {
    if point.iter().any(|c| !c.is_finite()) {
        return Err(GeometryError::NonFinite(*point));
    }
    let [x, y, z] = *point;
    if x == 0.0 && y == 0.0 && z == 0.0 {
        return Err(GeometryError::ZeroLength);
    }

    // both angles are ratios, so the raw components are used unscaled
    let theta = x.hypot(y).atan2(z);
    Ok((theta, wrap_phi(y.atan2(x))))
}

/// Wraps an azimuth into `[0, TAU)`.
pub fn wrap_phi(phi: f64) -> f64 {
    let wrapped = phi.rem_euclid(TAU) + 0.0;
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// A pure single-qubit state as a point on the Bloch sphere.
///
/// Always canonical: `theta` in `[0, PI]`, `phi` in `[0, TAU)`. Instances are
/// replaced wholesale, never edited in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantumState {
    theta: f64,
    phi: f64,
}

impl Default for QuantumState {
    /// |0⟩
    fn default() -> Self {
        Self { theta: 0.0, phi: 0.0 }
    }
}

impl QuantumState {
    /// Builds a state from arbitrary finite angles, folding them into the
    /// canonical ranges. A polar angle past a pole continues on the opposite
    /// meridian, so `phi` is shifted by `PI` whenever `theta` is folded.
    pub fn new(theta: f64, phi: f64) -> Result<Self, GeometryError> {
        if !theta.is_finite() || !phi.is_finite() {
            return Err(GeometryError::NonFiniteAngles { theta, phi });
        }
        let mut theta = theta.rem_euclid(TAU);
        let mut phi = phi;
        if theta > PI {
            theta = TAU - theta;
            phi += PI;
        }
        Ok(Self {
            theta,
            phi: wrap_phi(phi),
        })
    }

    /// The state whose Bloch vector points along `point`.
    pub fn from_point(point: &Vec3) -> Result<Self, GeometryError> {
        let (theta, phi) = to_spherical(point)?;
        Ok(Self { theta, phi })
    }

    /// Recovers the state from a pair of amplitudes, discarding norm and
    /// global phase.
    pub fn from_amplitudes(alpha: Complex64, beta: Complex64) -> Result<Self, GeometryError> {
        let a = alpha.norm();
        let b = beta.norm();
        if !(a + b).is_finite() || a + b <= 0.0 {
            return Err(GeometryError::ZeroAmplitudes);
        }
        let theta = 2.0 * b.atan2(a);
        let tiny = 1e-12 * a.max(b);
        let phi = if a <= tiny || b <= tiny {
            0.0
        } else {
            beta.arg() - alpha.arg()
        };
        Ok(Self {
            theta,
            phi: wrap_phi(phi),
        })
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// Unit Bloch vector of this state.
    pub fn to_point(&self) -> Vec3 {
        to_cartesian(self.theta, self.phi, 1.0)
    }

    /// `[cos(θ/2), e^{iφ} sin(θ/2)]`
    pub fn amplitudes(&self) -> [Complex64; 2] {
        let half = self.theta / 2.0;
        [
            Complex64::new(half.cos(), 0.0),
            Complex64::from_polar(half.sin(), self.phi),
        ]
    }
}
