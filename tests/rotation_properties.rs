use std::f64::consts::{FRAC_1_SQRT_2, PI};

use bloch::{extract_rotation, GateMatrix, QuantumState, Rotation};
use num_complex::Complex64;
use proptest::prelude::*;

/// `e^{i·phase} · k · (cos(a/2) I − i sin(a/2) n·σ)`
fn gate(axis: [f64; 3], angle: f64, phase: f64, k: f64) -> GateMatrix {
    let (s, c) = (angle / 2.0).sin_cos();
    let [nx, ny, nz] = axis;
    let i = Complex64::i();
    let global = Complex64::from_polar(k, phase);
    let entries = [
        [
            global * (c - i * s * nz),
            global * (-i * s * nx - s * ny),
        ],
        [
            global * (-i * s * nx + s * ny),
            global * (c + i * s * nz),
        ],
    ];
    GateMatrix::new(entries)
}

fn unit(v: [f64; 3]) -> Option<[f64; 3]> {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    (len > 1e-3).then(|| [v[0] / len, v[1] / len, v[2] / len])
}

#[test]
fn pauli_x_and_hadamard() {
    let x = GateMatrix::real([[0.0, 1.0], [1.0, 0.0]]);
    let d = *extract_rotation(&x).unwrap().descriptor().unwrap();
    assert!((d.axis[0] - 1.0).abs() < 1e-12);
    assert!((d.angle - PI).abs() < 1e-12);

    let h = GateMatrix::with_scalar(
        GateMatrix::real([[1.0, 1.0], [1.0, -1.0]]).entries,
        FRAC_1_SQRT_2,
    );
    let d = *extract_rotation(&h).unwrap().descriptor().unwrap();
    assert!((d.axis[0] - FRAC_1_SQRT_2).abs() < 1e-12);
    assert!(d.axis[1].abs() < 1e-12);
    assert!((d.axis[2] - FRAC_1_SQRT_2).abs() < 1e-12);
    assert!((d.angle - PI).abs() < 1e-12);
}

#[test]
fn scalar_identity_has_no_axis() {
    for k in [1.0, -3.0, 0.25] {
        assert_eq!(
            extract_rotation(&gate([0.0, 0.0, 1.0], 0.0, 0.7, k)).unwrap(),
            Rotation::NoRotation
        );
    }
}

proptest! {
    #[test]
    fn recovers_axis_and_angle(
        v in prop::array::uniform3(-1.0f64..1.0),
        angle in 0.05f64..(PI - 0.05),
        phase in -PI..PI,
        k in 0.2f64..5.0,
    ) {
        let Some(axis) = unit(v) else { return Ok(()); };
        let rotation = extract_rotation(&gate(axis, angle, phase, k)).unwrap();
        let d = rotation.descriptor().copied().unwrap();
        prop_assert!((d.angle - angle).abs() < 1e-9);
        for i in 0..3 {
            prop_assert!((d.axis[i] - axis[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn descriptor_agrees_with_gate_action(
        v in prop::array::uniform3(-1.0f64..1.0),
        angle in 0.05f64..PI,
        theta in 0.0f64..PI,
        phi in 0.0f64..(2.0 * PI),
    ) {
        let Some(axis) = unit(v) else { return Ok(()); };
        let matrix = gate(axis, angle, 0.3, 1.0);
        let state = QuantumState::new(theta, phi).unwrap();
        let d = extract_rotation(&matrix).unwrap().descriptor().copied().unwrap();

        let rotated = d.rotate(&state.to_point());
        let applied = matrix.apply(&state).unwrap().to_point();
        for i in 0..3 {
            prop_assert!((rotated[i] - applied[i]).abs() < 1e-9);
        }
    }
}
