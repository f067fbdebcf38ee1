/// A point or direction in 3D space
pub type Vec3 = [f64; 3];

/// A row-major 3x3 matrix
pub type Mat3 = [[f64; 3]; 3];

pub const IDENTITY: Mat3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Multiplies a 3x3 matrix by a 3-dimensional vector
pub fn multiply_matrix_vector(matrix: &Mat3, vector: &Vec3) -> Vec3 {
    let mut result = [0.0; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i] += matrix[i][j] * vector[j];
        }
    }
    result
}

/// Multiplies two 3x3 matrices
pub fn multiply_matrices(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut result = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

pub fn transpose(m: &Mat3) -> Mat3 {
    let mut result = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i][j] = m[j][i];
        }
    }
    result
}

/// Euclidean length, free of overflow and underflow in the squares
pub fn length(v: &Vec3) -> f64 {
    v[0].hypot(v[1]).hypot(v[2])
}

/// Rotation about the X-axis
pub fn rotation_x(angle: f64) -> Mat3 {
    let (sin, cos) = angle.sin_cos();
    [[1.0, 0.0, 0.0], [0.0, cos, -sin], [0.0, sin, cos]]
}

/// Rotation about the Y-axis
pub fn rotation_y(angle: f64) -> Mat3 {
    let (sin, cos) = angle.sin_cos();
    [[cos, 0.0, sin], [0.0, 1.0, 0.0], [-sin, 0.0, cos]]
}

/// Rotation about the Z-axis
pub fn rotation_z(angle: f64) -> Mat3 {
    let (sin, cos) = angle.sin_cos();
    [[cos, -sin, 0.0], [sin, cos, 0.0], [0.0, 0.0, 1.0]]
}

/// Combined rotation for Euler angles applied in XYZ order: `Rx * Ry * Rz`.
pub fn euler_xyz(angles: &Vec3) -> Mat3 {
    let xy = multiply_matrices(&rotation_x(angles[0]), &rotation_y(angles[1]));
    multiply_matrices(&xy, &rotation_z(angles[2]))
}

/// Squared distance from `p` to the segment `a..b` in the plane
pub fn distance_squared_to_segment(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let ap = [p[0] - a[0], p[1] - a[1]];
    let len_sq = ab[0] * ab[0] + ab[1] * ab[1];
    let t = if len_sq > 0.0 {
        ((ap[0] * ab[0] + ap[1] * ab[1]) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = [a[0] + ab[0] * t, a[1] + ab[1] * t];
    let d = [p[0] - closest[0], p[1] - closest[1]];
    d[0] * d[0] + d[1] * d[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < 1e-12, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn test_rotation_z_quarter_turn() {
        let v = multiply_matrix_vector(&rotation_z(FRAC_PI_2), &[1.0, 0.0, 0.0]);
        assert_vec_eq(v, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_euler_transpose_is_inverse() {
        let m = euler_xyz(&[0.3, -1.1, 2.4]);
        let product = multiply_matrices(&m, &transpose(&m));
        for i in 0..3 {
            assert_vec_eq(product[i], IDENTITY[i]);
        }
    }

    #[test]
    fn test_length_of_extreme_components() {
        assert_eq!(length(&[0.0, 3.0, 4.0]), 5.0);
        assert!((length(&[1e200, 1e200, 0.0]) / 1e200 - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(length(&[1e-200, 0.0, 0.0]), 1e-200);
    }

    #[test]
    fn test_segment_distance() {
        let d = distance_squared_to_segment([0.5, 1.0], [0.0, 0.0], [1.0, 0.0]);
        assert!((d - 1.0).abs() < 1e-12);
        // beyond the end clamps to the endpoint
        let d = distance_squared_to_segment([2.0, 0.0], [0.0, 0.0], [1.0, 0.0]);
        assert!((d - 1.0).abs() < 1e-12);
    }
}
