use std::ops::Mul;

use crate::vector::{Vec3, Vec4};
use crate::quaternion::Quaternion;

/// Column-major 4 x 4 matrix. Flattened it reads `c0, c1, c2, c3`, so the
/// translation lives at offsets 12..15 and the rotation block at 0..2,
/// 4..6 and 8..10.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Mat4x4 {
    pub c0: Vec4,
    pub c1: Vec4,
    pub c2: Vec4,
    pub c3: Vec4,
}
impl Mat4x4 {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        c0r0: f64, c0r1: f64, c0r2: f64, c0r3: f64,
        c1r0: f64, c1r1: f64, c1r2: f64, c1r3: f64,
        c2r0: f64, c2r1: f64, c2r2: f64, c2r3: f64,
        c3r0: f64, c3r1: f64, c3r2: f64, c3r3: f64,
    ) -> Self {
        Self::from_cols(
            Vec4::new(c0r0, c0r1, c0r2, c0r3),
            Vec4::new(c1r0, c1r1, c1r2, c1r3),
            Vec4::new(c2r0, c2r1, c2r2, c2r3),
            Vec4::new(c3r0, c3r1, c3r2, c3r3),
        )
    }

    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self { c0, c1, c2, c3 }
    }

    pub const fn identity() -> Self {
        Self::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0
        )
    }

    pub fn from_translation(v: Vec3) -> Self {
        let mut mat = Self::identity();
        mat.c3.set_xyz(v);
        mat
    }

    pub fn as_array(&self) -> &[f64; 16] {
        bytemuck::cast_ref(self)
    }

    pub fn as_array_mut(&mut self) -> &mut [f64; 16] {
        bytemuck::cast_mut(self)
    }

    /// Write the rotation for unit quaternion `quat` into the upper-left
    /// 3 x 3 block. The `w` row and the translation column are left alone.
    pub fn set_rotation(&mut self, quat: Quaternion) {
        let x2 = quat.v.x + quat.v.x;
        let y2 = quat.v.y + quat.v.y;
        let z2 = quat.v.z + quat.v.z;

        let xx2 = x2 * quat.v.x;
        let xy2 = x2 * quat.v.y;
        let xz2 = x2 * quat.v.z;

        let yy2 = y2 * quat.v.y;
        let yz2 = y2 * quat.v.z;
        let zz2 = z2 * quat.v.z;

        let sy2 = y2 * quat.s;
        let sz2 = z2 * quat.s;
        let sx2 = x2 * quat.s;

        self.c0.set_xyz(Vec3::new(1.0 - yy2 - zz2, xy2 + sz2,       xz2 - sy2));
        self.c1.set_xyz(Vec3::new(xy2 - sz2,       1.0 - xx2 - zz2, yz2 + sx2));
        self.c2.set_xyz(Vec3::new(xz2 + sy2,       yz2 - sx2,       1.0 - xx2 - yy2));
    }
}

impl Default for Mat4x4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[[f64; 4]; 4]> for Mat4x4 {
    fn from(mat: [[f64; 4]; 4]) -> Mat4x4 {
        Self::from_cols(mat[0].into(), mat[1].into(), mat[2].into(), mat[3].into())
    }
}

impl From<Mat4x4> for [[f64; 4]; 4] {
    fn from(mat: Mat4x4) -> [[f64; 4]; 4] {
        [mat.c0.into(), mat.c1.into(), mat.c2.into(), mat.c3.into()]
    }
}

impl From<Quaternion> for Mat4x4 {
    /// Convert the quaternion to a 4 x 4 rotation matrix.
    fn from(quat: Quaternion) -> Mat4x4 {
        let mut mat = Mat4x4::identity();
        mat.set_rotation(quat);
        mat
    }
}

impl From<Mat4x4> for cgmath::Matrix4<f64> {
    fn from(mat: Mat4x4) -> cgmath::Matrix4<f64> {
        let cols: [[f64; 4]; 4] = mat.into();
        cols.into()
    }
}

impl Mul for Mat4x4 {
    type Output = Self;

    fn mul(self, other: Self) -> Self::Output {
        let v0 = other.c0 * self;
        let v1 = other.c1 * self;
        let v2 = other.c2 * self;
        let v3 = other.c3 * self;

        Mat4x4::from_cols(v0, v1, v2, v3)
    }
}


#[test]
fn mat_multiply() {
    let mat1 = Mat4x4::new(
        1.0, 5.0, 9.0, 4.0,
        2.0, 6.0, 1.0, 5.0,
        3.0, 7.0, 2.0, 6.0,
        4.0, 8.0, 3.0, 7.0
    );
    let mat2 = Mat4x4::new(
        10.0, 14.0, 18.0, 12.0,
        11.0, 15.0, 19.0, 13.0,
        12.0, 16.0, 10.0, 14.0,
        13.0, 17.0, 11.0, 15.0
    );
    let res = mat1 * mat2;

    assert!(res == Mat4x4::new(
        140.0, 356.0, 176.0, 302.0,
        150.0, 382.0, 191.0, 324.0,
        130.0, 338.0, 186.0, 286.0,
        140.0, 364.0, 201.0, 308.0
    ));
}

#[test]
fn flat_layout_is_column_major() {
    let mut mat = Mat4x4::from_translation(Vec3::new(7.0, 8.0, 9.0));
    assert!(mat.as_array()[12..15] == [7.0, 8.0, 9.0]);
    assert!(mat.as_array()[15] == 1.0);

    mat.as_array_mut()[4] = 3.0;
    assert!(mat.c1.x == 3.0);
}

#[test]
fn rotation_times_inverse_rotation() {
    let q = Quaternion::from_axis_angle(Vec3::new(0.3, -0.8, 0.5), 2.1).unwrap();
    let mut mat = Mat4x4::from_translation(Vec3::new(1e8, -0.1, 1e-9));
    mat.set_rotation(q);

    let mut inverse = Mat4x4::from(q.inverse());
    let back = q.inverse().rotate_vec3(-mat.c3.truncate());
    inverse.c3.set_xyz(back);

    let product = mat * inverse;
    let identity = Mat4x4::identity();
    for (a, b) in product.as_array().iter().zip(identity.as_array().iter()) {
        assert!((a - b).abs() < 1e-7, "{a} != {b}");
    }
    // Rotation block alone is exact to f64 rounding.
    for col in [product.c0, product.c1, product.c2] {
        assert!((col.truncate().len() - 1.0).abs() < 1e-14);
    }
}

#[test]
fn identity_quaternion_to_matrix() {
    let mut mat = Mat4x4::from_cols(Vec4::zero(), Vec4::zero(), Vec4::zero(), Vec4::zero());
    mat.set_rotation(Quaternion::IDENTITY);

    let m = mat.as_array();
    let expected = [
        1.0, 0.0, 0.0,
        0.0, 1.0, 0.0,
        0.0, 0.0, 1.0,
    ];
    for (col, chunk) in expected.chunks(3).enumerate() {
        for (row, value) in chunk.iter().enumerate() {
            assert!((m[col * 4 + row] - value).abs() < 1e-10);
        }
    }
}

#[test]
fn set_rotation_keeps_translation() {
    let mut mat = Mat4x4::from_translation(Vec3::new(1.0, -2.0, 3.0));
    mat.c0.w = 5.0;
    let q = Quaternion::from_axis_angle(Vec3::new(1.0, 1.0, 1.0), 0.7).unwrap();
    mat.set_rotation(q);

    assert!(mat.c3 == Vec4::new(1.0, -2.0, 3.0, 1.0));
    assert!(mat.c0.w == 5.0);
}

#[test]
fn rotation_matches_cgmath() {
    let q = Quaternion::from_axis_angle(Vec3::new(-0.4, 0.9, 0.2), 1.9).unwrap();
    let ours = Mat4x4::from(q);
    let reference = cgmath::Matrix3::from(cgmath::Quaternion::from(q));

    let cols = [ours.c0, ours.c1, ours.c2];
    let ref_cols = [reference.x, reference.y, reference.z];
    for (col, ref_col) in cols.iter().zip(ref_cols.iter()) {
        assert!((col.x - ref_col.x).abs() < 1e-12);
        assert!((col.y - ref_col.y).abs() < 1e-12);
        assert!((col.z - ref_col.z).abs() < 1e-12);
    }
}
