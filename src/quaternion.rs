use std::ops::{Neg, Add, Mul, MulAssign};
use std::fmt;

use crate::vector::Vec3;
use crate::matrix::Mat4x4;

/// `qslerp` switches to normalized linear interpolation above this |cos θ|.
pub const SLERP_LINEAR_THRESHOLD: f64 = 1.0 - 1e-6;

/// Rotation quaternion stored scalar-last, so its memory layout is
/// `[x, y, z, w]`.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Quaternion {
    pub v: Vec3,
    pub s: f64,
}
impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(xi: f64, yj: f64, zk: f64, s: f64) -> Self {
        Self {
            v: Vec3::new(xi, yj, zk),
            s,
        }
    }

    /// Rotation of `radians` about `axis`. The axis is normalized first;
    /// `None` if it is degenerate.
    pub fn from_axis_angle(axis: Vec3, radians: f64) -> Option<Self> {
        let axis = axis.normalized()?;
        let (sin, cos) = (radians * 0.5).sin_cos();
        Some(Self {
            v: axis * sin,
            s: cos,
        })
    }

    pub fn dot(&self, other: Quaternion) -> f64 {
        self.v.dot(other.v) + self.s * other.s
    }

    pub fn len(&self) -> f64 {
        self.v.len().hypot(self.s)
    }

    /// Divides by the length in place. The quaternion must not be zero.
    pub fn normalize(&mut self) {
        let len = self.len();
        self.v = self.v / len;
        self.s /= len;
    }

    pub fn normalized(&self) -> Self {
        let mut q = *self;
        q.normalize();
        q
    }

    pub fn conjugate(&self) -> Self {
        Self {
            v: -self.v,
            s: self.s,
        }
    }

    /// Inverse of a unit quaternion: its conjugate, renormalized to absorb
    /// slight denormalization of the input.
    pub fn inverse(&self) -> Self {
        self.conjugate().normalized()
    }

    /// Rotates `vec` by this unit quaternion.
    pub fn rotate_vec3(&self, vec: Vec3) -> Vec3 {
        let t = self.v.cross(vec) * 2.0;
        vec + t * self.s + self.v.cross(t)
    }

    /// Spherical linear interpolation from `start` to `end` along the
    /// shorter arc. `t` is clamped to `[0, 1]`; the endpoints are returned
    /// exactly as given.
    pub fn slerp(start: Self, end: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 {
            return start;
        }
        if t == 1.0 {
            return end;
        }

        let mut cos_theta = start.dot(end);
        let mut end_adjusted = end;

        // q and -q are the same rotation; flip to stay on the short arc.
        if cos_theta < 0.0 {
            cos_theta = -cos_theta;
            end_adjusted = -end;
        }

        if cos_theta > SLERP_LINEAR_THRESHOLD {
            return (start * (1.0 - t) + end_adjusted * t).normalized();
        }

        let theta = cos_theta.acos();
        let sin_theta = theta.sin();
        let scale_start = ((1.0 - t) * theta).sin() / sin_theta;
        let scale_end = (t * theta).sin() / sin_theta;

        start * scale_start + end_adjusted * scale_end
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Neg for Quaternion {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            v: -self.v,
            s: -self.s,
        }
    }
}

impl Add for Quaternion {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self {
            v: self.v + other.v,
            s: self.s + other.s,
        }
    }
}

impl Mul<f64> for Quaternion {
    type Output = Self;

    fn mul(self, other: f64) -> Self::Output {
        Self {
            v: self.v * other,
            s: self.s * other,
        }
    }
}

impl Mul for Quaternion {
    type Output = Self;

    /// Hamilton product. `a * b` applies `b` first, then `a`.
    fn mul(self, other: Self) -> Self::Output {
        Self {
            v: other.v * self.s + self.v * other.s + self.v.cross(other.v),
            s: self.s * other.s - self.v.dot(other.v),
        }
    }
}

impl MulAssign for Quaternion {
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}

impl From<&Mat4x4> for Quaternion {
    /// Extract the rotation held in the upper-left 3 x 3 block.
    ///
    /// Picks the largest of the trace and the three diagonal terms as the
    /// pivot so the divisor never approaches zero.
    fn from(mat: &Mat4x4) -> Quaternion {
        // mRC = row R, column C
        let (m00, m10, m20) = (mat.c0.x, mat.c0.y, mat.c0.z);
        let (m01, m11, m21) = (mat.c1.x, mat.c1.y, mat.c1.z);
        let (m02, m12, m22) = (mat.c2.x, mat.c2.y, mat.c2.z);

        let trace = m00 + m11 + m22;

        let q = if trace > 0.0 {
            let s = 2.0 * (trace + 1.0).sqrt();
            Quaternion::new(
                (m21 - m12) / s,
                (m02 - m20) / s,
                (m10 - m01) / s,
                0.25 * s,
            )
        }
        else if m00 > m11 && m00 > m22 {
            let s = 2.0 * (1.0 + m00 - m11 - m22).sqrt();
            Quaternion::new(
                0.25 * s,
                (m01 + m10) / s,
                (m02 + m20) / s,
                (m21 - m12) / s,
            )
        }
        else if m11 > m22 {
            let s = 2.0 * (1.0 + m11 - m00 - m22).sqrt();
            Quaternion::new(
                (m01 + m10) / s,
                0.25 * s,
                (m12 + m21) / s,
                (m02 - m20) / s,
            )
        }
        else {
            let s = 2.0 * (1.0 + m22 - m00 - m11).sqrt();
            Quaternion::new(
                (m02 + m20) / s,
                (m12 + m21) / s,
                0.25 * s,
                (m10 - m01) / s,
            )
        };
        q.normalized()
    }
}

impl From<[f64; 4]> for Quaternion {
    fn from(arr: [f64; 4]) -> Quaternion {
        Quaternion::new(arr[0], arr[1], arr[2], arr[3])
    }
}

impl From<Quaternion> for [f64; 4] {
    fn from(q: Quaternion) -> [f64; 4] {
        [q.v.x, q.v.y, q.v.z, q.s]
    }
}

impl From<Quaternion> for cgmath::Quaternion<f64> {
    fn from(q: Quaternion) -> cgmath::Quaternion<f64> {
        cgmath::Quaternion::new(q.s, q.v.x, q.v.y, q.v.z)
    }
}

impl From<cgmath::Quaternion<f64>> for Quaternion {
    fn from(q: cgmath::Quaternion<f64>) -> Quaternion {
        Quaternion::new(q.v.x, q.v.y, q.v.z, q.s)
    }
}

impl fmt::Display for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.4}, {:.4}, {:.4} | {:.4}]", self.v.x, self.v.y, self.v.z, self.s)
    }
}


#[cfg(test)]
fn assert_quat_near(expected: Quaternion, actual: Quaternion, tolerance: f64) {
    let e: [f64; 4] = expected.into();
    let a: [f64; 4] = actual.into();
    for i in 0..4 {
        assert!(
            (e[i] - a[i]).abs() <= tolerance,
            "quaternions differ at index {i}: expected {expected}, got {actual}",
        );
    }
}

#[cfg(test)]
fn assert_same_rotation(expected: Quaternion, actual: Quaternion, tolerance: f64) {
    let sign = if expected.dot(actual) < 0.0 { -1.0 } else { 1.0 };
    assert_quat_near(expected, actual * sign, tolerance);
}

#[test]
fn normalize_quaternion() {
    let mut q = Quaternion::new(2.0, 0.0, 0.0, 0.0);
    q.normalize();
    assert_quat_near(Quaternion::new(1.0, 0.0, 0.0, 0.0), q, 1e-10);

    let mut q = Quaternion::new(1.0, 1.0, 1.0, 1.0);
    q.normalize();
    assert_quat_near(Quaternion::new(0.5, 0.5, 0.5, 0.5), q, 1e-10);
    assert!((q.len() - 1.0).abs() < 1e-10);
}

#[test]
fn normalize_quaternion_extreme_magnitudes() {
    let mut tiny = Quaternion::new(1e-200, 0.0, 0.0, 0.0);
    tiny.normalize();
    assert_quat_near(Quaternion::new(1.0, 0.0, 0.0, 0.0), tiny, 1e-10);

    let mut huge = Quaternion::new(1e200, 0.0, 0.0, 1e200);
    huge.normalize();
    let half = std::f64::consts::FRAC_1_SQRT_2;
    assert_quat_near(Quaternion::new(half, 0.0, 0.0, half), huge, 1e-10);
    assert!((huge.len() - 1.0).abs() < 1e-10);

    let mut mixed = Quaternion::new(-1e300, 1e300, 1e300, 1e300);
    mixed.normalize();
    assert_quat_near(Quaternion::new(-0.5, 0.5, 0.5, 0.5), mixed, 1e-10);

    assert_quat_near(Quaternion::new(-1.0, 0.0, 0.0, 0.0), tiny.inverse(), 1e-10);
}

#[test]
fn invert_quaternion() {
    let q = Quaternion::new(0.5, 0.5, 0.5, 0.5);
    assert_quat_near(Quaternion::new(-0.5, -0.5, -0.5, 0.5), q.inverse(), 1e-10);
    assert_quat_near(Quaternion::IDENTITY, Quaternion::IDENTITY.inverse(), 1e-10);
    assert_quat_near(Quaternion::IDENTITY, q * q.inverse(), 1e-10);
}

#[test]
fn multiply_by_identity() {
    let x_flip = Quaternion::new(1.0, 0.0, 0.0, 0.0);
    let mut q = Quaternion::IDENTITY;
    q *= x_flip;
    assert_quat_near(x_flip, q, 1e-10);

    let mut q = Quaternion::new(1.0, 2.0, 3.0, 4.0);
    q *= Quaternion::IDENTITY;
    assert_quat_near(Quaternion::new(1.0, 2.0, 3.0, 4.0), q, 1e-10);
}

#[test]
fn multiply_applies_right_operand_first() {
    let half_pi = std::f64::consts::FRAC_PI_2;
    let about_z = Quaternion::from_axis_angle(Vec3::unit_z(), half_pi).unwrap();
    let about_x = Quaternion::from_axis_angle(Vec3::unit_x(), half_pi).unwrap();

    // x -> y under about_z, then y -> z under about_x.
    let rotated = (about_x * about_z).rotate_vec3(Vec3::unit_x());
    assert!((rotated - Vec3::unit_z()).len() < 1e-10);
}

#[test]
fn slerp_endpoints() {
    let q1 = Quaternion::new(1.0, 0.0, 0.0, 0.0);
    let q2 = Quaternion::new(0.0, 1.0, 0.0, 0.0);

    assert_quat_near(q1, Quaternion::slerp(q1, q2, 0.0), 1e-10);
    assert_quat_near(q2, Quaternion::slerp(q1, q2, 1.0), 1e-10);

    // Antipodal-side endpoints are still returned as given.
    let q3 = Quaternion::new(-0.6, 0.0, 0.0, -0.8);
    assert_quat_near(q3, Quaternion::slerp(q1, q3, 1.0), 1e-10);
}

#[test]
fn slerp_midpoint_is_half_angle() {
    let start = Quaternion::IDENTITY;
    let end = Quaternion::from_axis_angle(Vec3::unit_y(), 1.2).unwrap();
    let mid = Quaternion::slerp(start, end, 0.5);

    let expected = Quaternion::from_axis_angle(Vec3::unit_y(), 0.6).unwrap();
    assert_quat_near(expected, mid, 1e-10);
    assert!((mid.len() - 1.0).abs() < 1e-10);
}

#[test]
fn slerp_takes_shorter_arc() {
    let start = Quaternion::IDENTITY;
    let end = Quaternion::from_axis_angle(Vec3::unit_z(), 0.5).unwrap();

    // Same rotation as `end`, on the far hemisphere.
    let mid = Quaternion::slerp(start, -end, 0.5);
    let expected = Quaternion::from_axis_angle(Vec3::unit_z(), 0.25).unwrap();
    assert_quat_near(expected, mid, 1e-10);
}

#[test]
fn slerp_nearly_identical_is_finite() {
    let start = Quaternion::from_axis_angle(Vec3::unit_x(), 0.3).unwrap();
    let end = Quaternion::from_axis_angle(Vec3::unit_x(), 0.3 + 1e-9).unwrap();

    for t in [0.1, 0.5, 0.9] {
        let q = Quaternion::slerp(start, end, t);
        assert!(q.v.x.is_finite() && q.s.is_finite());
        assert!((q.len() - 1.0).abs() < 1e-10);
        assert_same_rotation(start, q, 1e-8);
    }

    let same = Quaternion::slerp(start, start, 0.5);
    assert_quat_near(start, same, 1e-12);
}

#[test]
fn slerp_matches_cgmath() {
    use cgmath::InnerSpace;

    let start = Quaternion::from_axis_angle(Vec3::new(1.0, 2.0, 0.5), 0.4).unwrap();
    let end = Quaternion::from_axis_angle(Vec3::new(-0.3, 1.0, 2.0), 1.1).unwrap();
    assert!(start.dot(end) > 0.0);

    for t in [0.25, 0.5, 0.75] {
        let ours = Quaternion::slerp(start, end, t);
        let reference = cgmath::Quaternion::from(start)
            .slerp(cgmath::Quaternion::from(end), t)
            .normalize();
        assert_same_rotation(reference.into(), ours, 1e-9);
    }
}

#[test]
fn identity_matrix_to_quaternion() {
    let q = Quaternion::from(&Mat4x4::identity());
    assert!((q.len() - 1.0).abs() < 1e-10);
    assert_same_rotation(Quaternion::IDENTITY, q, 1e-10);
}

#[test]
fn matrix_round_trip() {
    let mut rand = crate::random::Randf64::seed(0x5eed_cafe);
    for _ in 0..200 {
        let q = rand.unit_quaternion();
        let mut mat = Mat4x4::identity();
        mat.set_rotation(q);
        assert_same_rotation(q, Quaternion::from(&mat), 1e-9);
    }
}

#[test]
fn matrix_round_trip_small_trace() {
    // Rotations near 180 degrees drive the trace toward -1.
    for axis in [Vec3::unit_x(), Vec3::unit_y(), Vec3::unit_z(), Vec3::new(1.0, 1.0, 0.0)] {
        let q = Quaternion::from_axis_angle(axis, std::f64::consts::PI - 1e-4).unwrap();
        let mat = Mat4x4::from(q);
        assert_same_rotation(q, Quaternion::from(&mat), 1e-9);
    }
}

#[test]
fn rotate_vec3_matches_matrix() {
    let q = Quaternion::from_axis_angle(Vec3::new(0.2, -1.0, 0.7), 2.3).unwrap();
    let mat = Mat4x4::from(q);
    let vec = Vec3::new(0.5, -2.0, 3.0);

    let by_matrix = (vec.extend(0.0) * mat).truncate();
    assert!((q.rotate_vec3(vec) - by_matrix).len() < 1e-10);
}
