use std::ops::{Neg, Add, AddAssign, Sub, SubAssign, Mul, Div};
use std::fmt;

use crate::matrix::Mat4x4;

/// Vectors whose length is at or below this are rejected by `Vec3::normalize`.
pub const NORMALIZE_EPSILON: f64 = 1e-12;

#[repr(C)]
#[derive(PartialEq, Clone, Copy, Default, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}
impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub const fn unit_x() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    pub const fn unit_y() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    pub const fn unit_z() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    /// Euclidean length, free of overflow and underflow in the squares.
    pub fn len(&self) -> f64 {
        self.x.hypot(self.y).hypot(self.z)
    }

    pub fn len_sq(&self) -> f64 {
        self.dot(*self)
    }

    pub fn dot(&self, vec: Vec3) -> f64 {
        self.x*vec.x + self.y*vec.y + self.z*vec.z
    }

    pub fn cross(&self, vec: Vec3) -> Self {
        Self::new(
            self.y*vec.z - self.z*vec.y,
            self.z*vec.x - self.x*vec.z,
            self.x*vec.y - self.y*vec.x,
        )
    }

    /// Scales to unit length in place. Returns false and leaves the
    /// vector untouched when its length is at or below `NORMALIZE_EPSILON`.
    pub fn normalize(&mut self) -> bool {
        let len = self.len();
        if len <= NORMALIZE_EPSILON {
            return false;
        }
        self.x /= len;
        self.y /= len;
        self.z /= len;
        true
    }

    /// Unit copy of this vector, or `None` if it is too short to normalize.
    pub fn normalized(&self) -> Option<Self> {
        let mut vec = *self;
        vec.normalize().then_some(vec)
    }

    pub fn extend(&self, w: f64) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, w)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    fn mul(self, other: f64) -> Self::Output {
        Self::new(self.x * other, self.y * other, self.z * other)
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;

    fn div(self, other: f64) -> Self::Output {
        Self::new(self.x / other, self.y / other, self.z / other)
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(arr: [f64; 3]) -> Vec3 {
        Vec3::new(arr[0], arr[1], arr[2])
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(vec: Vec3) -> [f64; 3] {
        [vec.x, vec.y, vec.z]
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4}, {:.4})", self.x, self.y, self.z)
    }
}


/// One column of a `Mat4x4`. Basis columns only use `x`, `y`, `z`.
#[repr(C)]
#[derive(PartialEq, Clone, Copy, Default, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vec4 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}
impl Vec4 {
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self {
            x,
            y,
            z,
            w,
        }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    pub fn len(&self) -> f64 {
        self.truncate().len().hypot(self.w)
    }

    pub fn len_sq(&self) -> f64 {
        self.dot(*self)
    }

    pub fn dot(&self, vec: Vec4) -> f64 {
        self.x*vec.x + self.y*vec.y + self.z*vec.z + self.w*vec.w
    }

    /// The `x`, `y`, `z` prefix.
    pub fn truncate(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Overwrites `x`, `y`, `z`, keeping `w`.
    pub fn set_xyz(&mut self, vec: Vec3) {
        self.x = vec.x;
        self.y = vec.y;
        self.z = vec.z;
    }
}

impl Neg for Vec4 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

impl Add for Vec4 {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z, self.w + other.w)
    }
}

impl AddAssign for Vec4 {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Vec4 {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z, self.w - other.w)
    }
}

impl Mul<f64> for Vec4 {
    type Output = Self;

    fn mul(self, other: f64) -> Self::Output {
        Self::new(self.x * other, self.y * other, self.z * other, self.w * other)
    }
}

impl Mul<Mat4x4> for Vec4 {
    type Output = Self;

    fn mul(self, other: Mat4x4) -> Self::Output {
        let c0 = other.c0 * self.x;
        let c1 = other.c1 * self.y;
        let c2 = other.c2 * self.z;
        let c3 = other.c3 * self.w;

        c0 + c1 + c2 + c3
    }
}

impl From<[f64; 4]> for Vec4 {
    fn from(arr: [f64; 4]) -> Vec4 {
        Vec4::new(arr[0], arr[1], arr[2], arr[3])
    }
}

impl From<Vec4> for [f64; 4] {
    fn from(vec: Vec4) -> [f64; 4] {
        [vec.x, vec.y, vec.z, vec.w]
    }
}

impl fmt::Display for Vec4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4}, {:.4}, {:.4})", self.x, self.y, self.z, self.w)
    }
}


#[test]
fn cross_test() {
    let v  = Vec3::new(4.0, 3.0, 6.0);
    let v2 = Vec3::new(2.0, 9.0, 3.0);

    let cross = v.cross(v2);
    assert!(cross == Vec3::new(-45.0, 0.0, 30.0));
}

#[test]
fn dot_test() {
    let v  = Vec3::new(4.0, 3.0, 6.0);
    let v2 = Vec3::new(2.0, 9.0, 3.0);

    assert!(v.dot(v2) == 53.0);
    assert!(Vec3::zero().dot(v2) == 0.0);
    assert!(Vec3::unit_x().dot(Vec3::unit_y()) == 0.0);
}

#[test]
fn normalize_test() {
    let mut v = Vec3::new(3.0, 4.0, 0.0);
    assert!(v.normalize());
    assert!((v.x - 0.6).abs() < 1e-10);
    assert!((v.y - 0.8).abs() < 1e-10);
    assert!((v.len() - 1.0).abs() < 1e-10);

    let mut unit = Vec3::unit_x();
    assert!(unit.normalize());
    assert!(unit == Vec3::unit_x());
}

#[test]
fn normalize_rejects_tiny_vectors() {
    let mut zero = Vec3::zero();
    assert!(!zero.normalize());
    assert!(zero == Vec3::zero());

    let mut tiny = Vec3::new(1e-20, 0.0, 0.0);
    assert!(!tiny.normalize());
    assert!(tiny == Vec3::new(1e-20, 0.0, 0.0));
    assert!(tiny.normalized().is_none());
}

#[test]
fn normalize_extreme_magnitudes() {
    let mut huge = Vec3::new(1e200, 0.0, 0.0);
    assert!(huge.normalize());
    assert!(huge == Vec3::unit_x());

    let mut huge = Vec3::new(-3e300, 4e300, 0.0);
    assert!(huge.normalize());
    assert!((huge.x + 0.6).abs() < 1e-10);
    assert!((huge.y - 0.8).abs() < 1e-10);
    assert!((huge.len() - 1.0).abs() < 1e-10);

    assert!((Vec3::new(3e-200, 4e-200, 0.0).len() - 5e-200).abs() < 1e-210);
}

#[test]
fn multiply_vec_by_mat() {
    let vec = Vec4::new(10.0, 11.0, 12.0, 13.0);
    let mat = Mat4x4::new(
        1.0, 5.0, 9.0, 4.0,
        2.0, 6.0, 1.0, 5.0,
        3.0, 7.0, 2.0, 6.0,
        4.0, 8.0, 3.0, 7.0
    );
    let res = vec * mat;
    assert!(res == Vec4::new(120.0, 304.0, 164.0, 258.0));
}

#[test]
fn translate_point_keeps_f64_precision() {
    // In f32 the 0.25 offset would be lost next to 1e8.
    let mat = Mat4x4::from_translation(Vec3::new(1e8, -0.1, 1e-9));
    let point = Vec3::new(0.25, 0.1, 2e-9).extend(1.0) * mat;
    assert!(point == Vec4::new(1e8 + 0.25, 0.0, 2e-9 + 1e-9, 1.0));

    let dir = Vec3::new(0.25, 0.1, 2e-9).extend(0.0) * mat;
    assert!(dir == Vec4::new(0.25, 0.1, 2e-9, 0.0));
}
