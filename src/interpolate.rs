//! Vector and quaternion primitives over plain `f64` arrays.
//!
//! These are the entry points for code that keeps poses as raw data:
//! 3-vectors are `[f64; 3]`, quaternions are `[x, y, z, w]` and matrices
//! are 16 column-major values (see [`crate::MATRIX_LAYOUT`]). Each function
//! views its arguments as the typed equivalents without copying.

use crate::vector::Vec3;
use crate::quaternion::Quaternion;
use crate::matrix::Mat4x4;

/// Dot product of two 3-vectors.
pub fn dot(x: &[f64; 3], y: &[f64; 3]) -> f64 {
    let x: &Vec3 = bytemuck::cast_ref(x);
    x.dot(*bytemuck::cast_ref::<_, Vec3>(y))
}

/// Normalize `x` in place. Returns false, leaving `x` as it was, when its
/// length is at or below [`crate::vector::NORMALIZE_EPSILON`].
pub fn normalize(x: &mut [f64; 3]) -> bool {
    bytemuck::cast_mut::<_, Vec3>(x).normalize()
}

/// Scale `q` to unit length. `q` must not be zero.
pub fn qnormalize(q: &mut [f64; 4]) {
    bytemuck::cast_mut::<_, Quaternion>(q).normalize();
}

/// Write the inverse of unit quaternion `q` to `out`.
pub fn qinvert(out: &mut [f64; 4], q: &[f64; 4]) {
    *out = bytemuck::cast_ref::<_, Quaternion>(q).inverse().into();
}

/// `q1 = q1 * q2`. The result rotates by `q2` first, then by the old `q1`.
pub fn qmul(q1: &mut [f64; 4], q2: &[f64; 4]) {
    *bytemuck::cast_mut::<_, Quaternion>(q1) *= *bytemuck::cast_ref::<_, Quaternion>(q2);
}

/// Unit quaternion for the rotation block of `m`.
pub fn mat2quat(m: &[f64; 16], q: &mut [f64; 4]) {
    *q = Quaternion::from(bytemuck::cast_ref::<_, Mat4x4>(m)).into();
}

/// Write the rotation block for unit quaternion `q` into `m`. Slots 3, 7,
/// 11 and 12..15 are not touched.
pub fn quat2mat(q: &[f64; 4], m: &mut [f64; 16]) {
    bytemuck::cast_mut::<_, Mat4x4>(m).set_rotation(*bytemuck::cast_ref(q));
}

/// Spherical interpolation from `q1` (`t = 0`) to `q2` (`t = 1`) along the
/// shorter arc.
///
/// When `q1 . q2 < 0` the interior values approach `-q2`, so the sign of
/// every component jumps at exactly `t = 1` even though the rotation does
/// not. Compare results up to sign.
pub fn qslerp(q1: &[f64; 4], q2: &[f64; 4], out: &mut [f64; 4], t: f64) {
    *out = Quaternion::slerp(*bytemuck::cast_ref(q1), *bytemuck::cast_ref(q2), t).into();
}


#[cfg(test)]
fn expect_array_near(expected: &[f64], actual: &[f64], tolerance: f64) {
    assert_eq!(expected.len(), actual.len());
    for (i, (e, a)) in expected.iter().zip(actual.iter()).enumerate() {
        assert!((e - a).abs() <= tolerance, "arrays differ at index {i}: {e} != {a}");
    }
}

#[test]
fn dot_product() {
    assert_eq!(32.0, dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]));
    assert_eq!(0.0, dot(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0]));
    assert_eq!(0.0, dot(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]));
}

#[test]
fn normalize_arrays() {
    let mut x = [3.0, 4.0, 0.0];
    assert!(normalize(&mut x));
    expect_array_near(&[0.6, 0.8, 0.0], &x, 1e-10);
    assert!((dot(&x, &x).sqrt() - 1.0).abs() < 1e-10);

    let mut zero = [0.0; 3];
    assert!(!normalize(&mut zero));

    let mut tiny = [1e-20, 0.0, 0.0];
    assert!(!normalize(&mut tiny));
    assert_eq!([1e-20, 0.0, 0.0], tiny);
}

#[test]
fn normalize_random_vectors_are_unit() {
    let mut rand = crate::random::Randf64::seed(77);
    for _ in 0..100 {
        let mut x: [f64; 3] = rand.vec3_in(-50.0..50.0).into();
        let len = dot(&x, &x).sqrt();
        assert_eq!(len > crate::vector::NORMALIZE_EPSILON, normalize(&mut x));
        assert!((dot(&x, &x).sqrt() - 1.0).abs() < 1e-10);
    }
}

#[test]
fn qnormalize_and_qinvert() {
    let mut q = [1.0, 1.0, 1.0, 1.0];
    qnormalize(&mut q);
    expect_array_near(&[0.5; 4], &q, 1e-10);

    let mut out = [0.0; 4];
    qinvert(&mut out, &q);
    expect_array_near(&[-0.5, -0.5, -0.5, 0.5], &out, 1e-10);
    expect_array_near(&[0.5; 4], &q, 0.0);

    qinvert(&mut out, &[0.0, 0.0, 0.0, 1.0]);
    expect_array_near(&[0.0, 0.0, 0.0, 1.0], &out, 1e-10);
}

#[test]
fn qnormalize_extreme_magnitudes() {
    let mut tiny = [1e-200, 0.0, 0.0, 0.0];
    qnormalize(&mut tiny);
    expect_array_near(&[1.0, 0.0, 0.0, 0.0], &tiny, 1e-10);

    let mut huge = [1e200, 0.0, 0.0, 1e200];
    qnormalize(&mut huge);
    let half = std::f64::consts::FRAC_1_SQRT_2;
    expect_array_near(&[half, 0.0, 0.0, half], &huge, 1e-10);

    let mut big = [1e200, 0.0, 0.0];
    assert!(normalize(&mut big));
    expect_array_near(&[1.0, 0.0, 0.0], &big, 1e-10);
}

#[test]
fn qmul_with_identity() {
    let mut q1 = [0.0, 0.0, 0.0, 1.0];
    qmul(&mut q1, &[1.0, 0.0, 0.0, 0.0]);
    expect_array_near(&[1.0, 0.0, 0.0, 0.0], &q1, 1e-10);

    let mut q1 = [1.0, 2.0, 3.0, 4.0];
    qmul(&mut q1, &[0.0, 0.0, 0.0, 1.0]);
    expect_array_near(&[1.0, 2.0, 3.0, 4.0], &q1, 1e-10);
}

#[test]
fn matrix_conversions() {
    let identity: [f64; 16] = *Mat4x4::identity().as_array();
    let mut q = [0.0; 4];
    mat2quat(&identity, &mut q);
    assert!((q[3].abs() - 1.0).abs() < 1e-10);
    expect_array_near(&[0.0; 3], &q[..3], 1e-10);

    let mut m = [0.0; 16];
    quat2mat(&[0.0, 0.0, 0.0, 1.0], &mut m);
    expect_array_near(&[1.0, 0.0, 0.0], &m[0..3], 1e-10);
    expect_array_near(&[0.0, 1.0, 0.0], &m[4..7], 1e-10);
    expect_array_near(&[0.0, 0.0, 1.0], &m[8..11], 1e-10);
    expect_array_near(&[0.0; 4], &m[12..16], 0.0);
}

#[test]
fn qslerp_endpoints() {
    let q1 = [1.0, 0.0, 0.0, 0.0];
    let q2 = [0.0, 1.0, 0.0, 0.0];
    let mut qr = [0.0; 4];

    qslerp(&q1, &q2, &mut qr, 0.0);
    expect_array_near(&q1, &qr, 1e-10);

    qslerp(&q1, &q2, &mut qr, 1.0);
    expect_array_near(&q2, &qr, 1e-10);
}
