use super::Vec3;

/// Row-major 3x3 matrix, used for camera orientation.
#[derive(Debug, Clone, Copy)]
pub struct Mat3 {
    value: [f64; 9],
}

impl Mat3 {
    pub fn identity() -> Mat3 {
        Mat3 {
            value: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Build the matrix whose columns are the given basis vectors, mapping
    /// camera-space coordinates onto that basis.
    pub fn from_basis(right: Vec3, up: Vec3, forward: Vec3) -> Mat3 {
        Mat3 {
            value: [
                right.x, up.x, forward.x, //
                right.y, up.y, forward.y, //
                right.z, up.z, forward.z,
            ],
        }
    }

    pub fn rotate(axis: Vec3, angle: f64) -> Mat3 {
        // https://en.wikipedia.org/wiki/Rotation_matrix#Rotation_matrix_from_axis_and_angle
        let u = axis.normalize();
        let cos_t = angle.cos();
        let sin_t = angle.sin();
        Mat3 {
            value: [
                cos_t + (u.x * u.x) * (1.0 - cos_t),
                u.x * u.y * (1.0 - cos_t) - u.z * sin_t,
                u.x * u.z * (1.0 - cos_t) + u.y * sin_t,
                u.y * u.x * (1.0 - cos_t) + u.z * sin_t,
                cos_t + (u.y * u.y) * (1.0 - cos_t),
                u.y * u.z * (1.0 - cos_t) - u.x * sin_t,
                u.z * u.x * (1.0 - cos_t) - u.y * sin_t,
                u.z * u.y * (1.0 - cos_t) + u.x * sin_t,
                cos_t + (u.z * u.z) * (1.0 - cos_t),
            ],
        }
    }

    pub fn then(&self, other: &Mat3) -> Mat3 {
        // other * self
        let mut value = [0.0; 9];
        for row in 0..3 {
            for col in 0..3 {
                let mut sum = 0.0;
                for k in 0..3 {
                    sum += other.value[row * 3 + k] * self.value[k * 3 + col];
                }
                value[row * 3 + col] = sum;
            }
        }
        Mat3 { value }
    }

    pub fn apply(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.value[0] * v.x + self.value[1] * v.y + self.value[2] * v.z,
            self.value[3] * v.x + self.value[4] * v.y + self.value[5] * v.z,
            self.value[6] * v.x + self.value[7] * v.y + self.value[8] * v.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_close(a: Vec3, b: Vec3) {
        assert!(a.distance(b) < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_identity_leaves_vectors_unchanged() {
        let v = Vec3::new(1.0, -2.0, 3.0);
        assert_close(Mat3::identity().apply(v), v);
    }

    #[test]
    fn test_quarter_turn_about_y_maps_z_to_x() {
        let rotation = Mat3::rotate(Vec3::y_axis(), FRAC_PI_2);
        assert_close(rotation.apply(Vec3::z_axis()), Vec3::x_axis());
    }

    #[test]
    fn test_two_quarter_turns_compose_to_a_half_turn() {
        let quarter = Mat3::rotate(Vec3::y_axis(), FRAC_PI_2);
        let composed = quarter.then(&quarter);
        let half = Mat3::rotate(Vec3::y_axis(), PI);
        assert_close(composed.apply(Vec3::z_axis()), half.apply(Vec3::z_axis()));
        assert_close(composed.apply(Vec3::z_axis()), -Vec3::z_axis());
    }

    #[test]
    fn test_from_basis_maps_camera_axes_onto_the_basis() {
        let right = Vec3::new(0.0, 0.0, -1.0);
        let up = Vec3::y_axis();
        let forward = Vec3::x_axis();
        let rotation = Mat3::from_basis(right, up, forward);
        assert_close(rotation.apply(Vec3::x_axis()), right);
        assert_close(rotation.apply(Vec3::y_axis()), up);
        assert_close(rotation.apply(Vec3::z_axis()), forward);
    }
}
