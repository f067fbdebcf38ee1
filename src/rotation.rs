//! Rotation of the Bloch sphere induced by a 2x2 gate matrix.
//!
//! A unitary `U = e^{iα} (cos(θ/2) I - i sin(θ/2) n·σ)` rotates every Bloch
//! vector by `θ` about `n`. The matrix is decomposed onto `{I, σx, σy, σz}` in
//! closed form, the global phase is divided out, and the axis and angle are
//! read from what is left.

use num_complex::Complex64;

use crate::error::{BlochError, RotationError};
use crate::expr;
use crate::geometry::QuantumState;
use crate::math::Vec3;

/// Coefficients whose magnitudes are all below this are treated as zero.
pub const ZERO_TOLERANCE: f64 = 1e-6;

/// A 2x2 complex operator with an optional real scale, defined up to global
/// phase. It does not have to be unitary while it is being edited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateMatrix {
    pub entries: [[Complex64; 2]; 2],
    pub scalar: f64,
}

impl GateMatrix {
    /// A matrix with scalar `1`.
    pub fn new(entries: [[Complex64; 2]; 2]) -> Self {
        Self {
            entries,
            scalar: 1.0,
        }
    }

    /// A matrix whose entries are multiplied by `scalar` before use.
    pub fn with_scalar(entries: [[Complex64; 2]; 2], scalar: f64) -> Self {
        Self { entries, scalar }
    }

    /// Builds a matrix from real entries.
    pub fn real(entries: [[f64; 2]; 2]) -> Self {
        Self::new(entries.map(|row| row.map(|v| Complex64::new(v, 0.0))))
    }

    /// The identity gate.
    pub fn identity() -> Self {
        Self::real([[1.0, 0.0], [0.0, 1.0]])
    }

    /// Parses the textual form a matrix editor commits. A blank scalar is `1`.
    pub fn parse(scalar: &str, entries: &[[String; 2]; 2]) -> Result<Self, BlochError> {
        let scalar = expr::evaluate_scalar(scalar)?;
        let mut parsed = [[Complex64::new(0.0, 0.0); 2]; 2];
        for (row, entry_row) in entries.iter().enumerate() {
            for (col, entry) in entry_row.iter().enumerate() {
                parsed[row][col] = expr::evaluate(entry)?;
            }
        }
        Ok(Self::with_scalar(parsed, scalar))
    }

    /// Parses a compact literal such as `1 1 \\ 1 -1`.
    pub fn parse_literal(scalar: &str, literal: &str) -> Result<Self, BlochError> {
        let entries = expr::split_matrix(literal)?;
        Self::parse(scalar, &entries)
    }

    /// Entries with the scalar applied, or `InvalidMatrix` when anything is
    /// not finite.
    pub fn scaled(&self) -> Result<[[Complex64; 2]; 2], RotationError> {
        if !self.scalar.is_finite() {
            return Err(RotationError::NonFiniteScalar(self.scalar));
        }
        let mut scaled = self.entries;
        for (row, entries) in scaled.iter_mut().enumerate() {
            for (col, entry) in entries.iter_mut().enumerate() {
                *entry *= self.scalar;
                if !entry.re.is_finite() || !entry.im.is_finite() {
                    return Err(RotationError::NonFiniteEntry { row, col });
                }
            }
        }
        Ok(scaled)
    }

    /// Coefficients `[c0, cx, cy, cz]` with `M = c0 I + cx σx + cy σy + cz σz`.
    pub fn pauli_decomposition(&self) -> Result<[Complex64; 4], RotationError> {
        let [[a, b], [c, d]] = self.scaled()?;
        Ok([
            (a + d) / 2.0,
            (b + c) / 2.0,
            Complex64::i() * (b - c) / 2.0,
            (a - d) / 2.0,
        ])
    }

    /// Applies the gate to `state`, returning the resulting state up to norm
    /// and global phase.
    pub fn apply(&self, state: &QuantumState) -> Result<QuantumState, BlochError> {
        let [[a, b], [c, d]] = self.scaled()?;
        let [alpha, beta] = state.amplitudes();
        let out = QuantumState::from_amplitudes(a * alpha + b * beta, c * alpha + d * beta)?;
        Ok(out)
    }
}

/// Axis and angle of a sphere rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationDescriptor {
    /// Unit rotation axis.
    pub axis: Vec3,
    /// Angle in radians, within `(0, PI]`. A turn by `θ > PI` is the same
    /// rotation as `2·PI − θ` about the negated axis, and is reported that way.
    pub angle: f64,
}

impl RotationDescriptor {
    /// Rotates `point` about the axis by `angle` (Rodrigues).
    pub fn rotate(&self, point: &Vec3) -> Vec3 {
        let [kx, ky, kz] = self.axis;
        let [px, py, pz] = *point;
        let (sin, cos) = self.angle.sin_cos();
        let k_dot_p = kx * px + ky * py + kz * pz;
        let cross = [ky * pz - kz * py, kz * px - kx * pz, kx * py - ky * px];
        [
            px * cos + cross[0] * sin + kx * k_dot_p * (1.0 - cos),
            py * cos + cross[1] * sin + ky * k_dot_p * (1.0 - cos),
            pz * cos + cross[2] * sin + kz * k_dot_p * (1.0 - cos),
        ]
    }
}

/// Outcome of a successful extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rotation {
    Rotation(RotationDescriptor),
    /// No axis can be read off the matrix. For a unitary this means a scalar
    /// multiple of the identity, which moves nothing.
    NoRotation,
}

impl Rotation {
    /// Axis and angle, or `None` for [`Rotation::NoRotation`].
    pub fn descriptor(&self) -> Option<&RotationDescriptor> {
        match self {
            Rotation::Rotation(descriptor) => Some(descriptor),
            Rotation::NoRotation => None,
        }
    }
}

/// Extracts the sphere rotation a gate induces.
///
/// `Err` means the matrix is malformed; the caller should keep whatever it
/// displayed before.
///
/// Unitarity is not checked. A non-unitary matrix whose σ coefficients are in
/// phase with its identity coefficient, such as the projector
/// `[[1, 0], [0, 0]]`, has no rotation quaternion and gives `NoRotation`.
pub fn extract_rotation(matrix: &GateMatrix) -> Result<Rotation, RotationError> {
    let [c0, cx, cy, cz] = matrix.pauli_decomposition()?;

    if [cx, cy, cz].iter().all(|c| c.norm() < ZERO_TOLERANCE) {
        return Ok(Rotation::NoRotation);
    }

    // For a unitary these share the phase e^{iα}: [cos(θ/2), sin(θ/2) n].
    let components = [c0, Complex64::i() * cx, Complex64::i() * cy, Complex64::i() * cz];
    let reference = components
        .iter()
        .copied()
        .fold(Complex64::new(0.0, 0.0), |best, c| {
            if c.norm() > best.norm() {
                c
            } else {
                best
            }
        });
    let phase = reference / reference.norm();
    let mut q = components.map(|c| (c / phase).re);

    // q and -q are the same rotation; keep the scalar part non-negative
    if q[0] < 0.0 {
        q = q.map(|v| -v);
    }

    let vector_norm = (q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt();
    if vector_norm < ZERO_TOLERANCE * reference.norm() {
        return Ok(Rotation::NoRotation);
    }

    let axis = [q[1] / vector_norm, q[2] / vector_norm, q[3] / vector_norm];
    // q[0] >= 0 keeps this in (0, PI]
    let angle = 2.0 * vector_norm.atan2(q[0]);

    Ok(Rotation::Rotation(RotationDescriptor { axis, angle }))
}
