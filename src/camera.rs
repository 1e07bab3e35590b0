use crate::error::{CamposeError, CamposeResult};
use crate::matrix::Mat4x4;
use crate::quaternion::Quaternion;
use crate::vector::{Vec3, Vec4};

/// Camera position and orientation, optionally tagged as an animation
/// keyframe.
///
/// `transform` holds the basis as columns: right (`c0`), up (`c1`),
/// ahead (`c2`) and position (`c3`). `orientation` tracks the same
/// rotation as a quaternion, but the two are only synchronized when the
/// caller asks for it with `sync_basis_from_orientation` or
/// `sync_orientation_from_basis`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub transform:   Mat4x4,
    pub orientation: Quaternion,
    key_frame:       bool,
}
impl CameraPose {
    /// Pose at `position` whose basis is built from `orientation`.
    pub fn new(position: Vec3, orientation: Quaternion) -> Self {
        let orientation = orientation.normalized();
        let mut transform = Mat4x4::from_translation(position);
        transform.set_rotation(orientation);

        Self {
            transform,
            orientation,
            key_frame: false,
        }
    }

    /// Pose at `eye` looking toward `target`, with `up` as the approximate
    /// up direction.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> CamposeResult<Self> {
        let ahead = (target - eye).normalized()
            .ok_or(CamposeError::DegenerateVector("view direction"))?;
        let right = up.cross(ahead).normalized()
            .ok_or(CamposeError::DegenerateVector("up vector"))?;
        let up = ahead.cross(right);

        let transform = Mat4x4::from_cols(
            right.extend(0.0),
            up.extend(0.0),
            ahead.extend(0.0),
            eye.extend(1.0),
        );
        let orientation = Quaternion::from(&transform);
        log::debug!("look_at {eye} -> {target}: orientation {orientation}");

        Ok(Self {
            transform,
            orientation,
            key_frame: false,
        })
    }

    pub fn is_key_frame(&self) -> bool {
        self.key_frame
    }

    pub fn set_key_frame(&mut self, key_frame: bool) {
        self.key_frame = key_frame;
    }

    /// Flat offsets 0..4.
    pub fn right_axis(&self) -> &Vec4 {
        &self.transform.c0
    }

    pub fn right_axis_mut(&mut self) -> &mut Vec4 {
        &mut self.transform.c0
    }

    /// Flat offsets 4..8.
    pub fn up_axis(&self) -> &Vec4 {
        &self.transform.c1
    }

    pub fn up_axis_mut(&mut self) -> &mut Vec4 {
        &mut self.transform.c1
    }

    /// Flat offsets 8..12.
    pub fn ahead_axis(&self) -> &Vec4 {
        &self.transform.c2
    }

    pub fn ahead_axis_mut(&mut self) -> &mut Vec4 {
        &mut self.transform.c2
    }

    /// Flat offsets 12..16.
    pub fn position(&self) -> &Vec4 {
        &self.transform.c3
    }

    pub fn position_mut(&mut self) -> &mut Vec4 {
        &mut self.transform.c3
    }

    pub fn as_array(&self) -> &[f64; 16] {
        self.transform.as_array()
    }

    pub fn as_array_mut(&mut self) -> &mut [f64; 16] {
        self.transform.as_array_mut()
    }

    /// Translate along the pose's own axes. The stored basis is used as is,
    /// so any drift in it carries into the motion.
    pub fn move_relative(&mut self, d_right: f64, d_up: f64, d_ahead: f64) {
        let offset = self.right_axis().truncate() * d_right
            + self.up_axis().truncate() * d_up
            + self.ahead_axis().truncate() * d_ahead;
        self.translate(offset);
    }

    /// Translate by `direction * distance` in world space. `direction` is
    /// not normalized.
    pub fn move_absolute(&mut self, direction: Vec3, distance: f64) {
        self.translate(direction * distance);
    }

    fn translate(&mut self, offset: Vec3) {
        let position = self.position().truncate() + offset;
        self.position_mut().set_xyz(position);
    }

    pub fn distance_to(&self, other: &CameraPose) -> f64 {
        (self.position().truncate() - other.position().truncate()).len()
    }

    /// Compose `orientation` with a rotation of `angle_degrees` about the
    /// given axis. The new rotation is applied after the current one. The
    /// basis in `transform` is not updated.
    pub fn rotate(&mut self, angle_degrees: f64, axis_x: f64, axis_y: f64, axis_z: f64) {
        let axis = Vec3::new(axis_x, axis_y, axis_z);
        let delta = match Quaternion::from_axis_angle(axis, angle_degrees.to_radians()) {
            Some(delta) => delta,
            None => {
                log::warn!("rotate: ignoring rotation about degenerate axis {axis}");
                return;
            }
        };

        let mut orientation = delta;
        orientation *= self.orientation;
        orientation.normalize();
        self.orientation = orientation;
    }

    /// Re-orthonormalize the basis with Gram-Schmidt, keeping the direction
    /// of `ahead`. Position and orientation are not touched.
    pub fn orthogonalize(&mut self) {
        let mut ahead = self.ahead_axis().truncate();
        if !ahead.normalize() {
            log::warn!("orthogonalize: degenerate ahead axis, resetting to +z");
            ahead = Vec3::unit_z();
        }

        let right_raw = self.right_axis().truncate();
        let mut right = right_raw - ahead * right_raw.dot(ahead);
        if !right.normalize() {
            log::warn!("orthogonalize: right axis collapsed onto ahead, rebuilding it");
            right = self.up_axis().truncate().cross(ahead);
            if !right.normalize() {
                right = perpendicular(ahead);
            }
        }

        let mut up = self.up_axis().truncate();
        up -= ahead * up.dot(ahead);
        up -= right * up.dot(right);
        if !up.normalize() {
            log::warn!("orthogonalize: up axis collapsed, rebuilding it");
            up = ahead.cross(right);
        }

        self.right_axis_mut().set_xyz(right);
        self.up_axis_mut().set_xyz(up);
        self.ahead_axis_mut().set_xyz(ahead);
    }

    /// Overwrite the basis with the rotation held in `orientation`.
    pub fn sync_basis_from_orientation(&mut self) {
        self.transform.set_rotation(self.orientation);
    }

    /// Overwrite `orientation` with the rotation held in the basis.
    pub fn sync_orientation_from_basis(&mut self) {
        self.orientation = Quaternion::from(&self.transform);
    }

    /// World-to-camera matrix, the inverse of `transform` for an
    /// orthonormal basis.
    pub fn view_matrix(&self) -> Mat4x4 {
        let right = self.right_axis().truncate();
        let up = self.up_axis().truncate();
        let ahead = self.ahead_axis().truncate();
        let position = self.position().truncate();

        Mat4x4::new(
            right.x, up.x, ahead.x, 0.0,
            right.y, up.y, ahead.y, 0.0,
            right.z, up.z, ahead.z, 0.0,
            -right.dot(position), -up.dot(position), -ahead.dot(position), 1.0,
        )
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(Vec3::zero(), Quaternion::IDENTITY)
    }
}

/// Unit vector perpendicular to unit vector `v`.
fn perpendicular(v: Vec3) -> Vec3 {
    let other = if v.x.abs() < 0.9 { Vec3::unit_x() } else { Vec3::unit_y() };
    let perp = v.cross(other);
    perp / perp.len()
}

impl From<&CameraPose> for cgmath::Matrix4<f64> {
    fn from(pose: &CameraPose) -> cgmath::Matrix4<f64> {
        pose.transform.into()
    }
}

impl From<&CameraPose> for cgmath::Quaternion<f64> {
    fn from(pose: &CameraPose) -> cgmath::Quaternion<f64> {
        pose.orientation.into()
    }
}

/// GPU-ready snapshot of a pose.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PoseUniform {
    pub view:     [[f32; 4]; 4],
    pub view_pos: [f32; 4],
}
impl From<&CameraPose> for PoseUniform {
    fn from(pose: &CameraPose) -> Self {
        let view: [[f64; 4]; 4] = pose.view_matrix().into();
        let position: [f64; 4] = (*pose.position()).into();

        Self {
            view:     view.map(|col| col.map(|v| v as f32)),
            view_pos: position.map(|v| v as f32),
        }
    }
}


#[cfg(test)]
fn expect_vec3_near(expected: Vec3, actual: Vec3, tolerance: f64) {
    assert!(
        (expected - actual).len() <= tolerance,
        "expected {expected}, got {actual}",
    );
}

#[cfg(test)]
fn identity_basis_at_origin() -> CameraPose {
    let mut pose = CameraPose::default();
    pose.right_axis_mut().set_xyz(Vec3::unit_x());
    pose.up_axis_mut().set_xyz(Vec3::unit_y());
    pose.ahead_axis_mut().set_xyz(Vec3::unit_z());
    pose.position_mut().set_xyz(Vec3::zero());
    pose
}

#[test]
fn default_pose() {
    let pose = CameraPose::default();
    assert!(!pose.is_key_frame());
    assert!(pose.transform == Mat4x4::identity());
    assert!(pose.orientation == Quaternion::IDENTITY);
}

#[test]
fn key_frame_flag() {
    let mut pose = CameraPose::default();
    pose.set_key_frame(true);
    assert!(pose.is_key_frame());
    pose.set_key_frame(false);
    assert!(!pose.is_key_frame());
}

#[test]
fn accessors_view_the_flat_transform() {
    let mut pose = CameraPose::default();
    let base = pose.as_array().as_ptr();
    assert!(std::ptr::eq(base, pose.right_axis() as *const Vec4 as *const f64));
    assert!(std::ptr::eq(base.wrapping_add(4), pose.up_axis() as *const Vec4 as *const f64));
    assert!(std::ptr::eq(base.wrapping_add(8), pose.ahead_axis() as *const Vec4 as *const f64));
    assert!(std::ptr::eq(base.wrapping_add(12), pose.position() as *const Vec4 as *const f64));

    pose.position_mut().y = 42.0;
    assert!(pose.as_array()[13] == 42.0);
    pose.as_array_mut()[8] = -1.0;
    assert!(pose.ahead_axis().x == -1.0);
}

#[test]
fn move_relative_accumulates() {
    let mut pose = identity_basis_at_origin();

    pose.move_relative(1.0, 0.0, 0.0);
    expect_vec3_near(Vec3::new(1.0, 0.0, 0.0), pose.position().truncate(), 1e-10);

    pose.move_relative(0.0, 2.0, 0.0);
    expect_vec3_near(Vec3::new(1.0, 2.0, 0.0), pose.position().truncate(), 1e-10);

    pose.move_relative(0.0, 0.0, 3.0);
    expect_vec3_near(Vec3::new(1.0, 2.0, 3.0), pose.position().truncate(), 1e-10);
    assert!(pose.position().w == 1.0);
}

#[test]
fn move_relative_follows_stale_basis() {
    let mut pose = identity_basis_at_origin();
    pose.right_axis_mut().set_xyz(Vec3::new(2.0, 0.0, 0.0));

    pose.move_relative(1.0, 0.0, 0.0);
    expect_vec3_near(Vec3::new(2.0, 0.0, 0.0), pose.position().truncate(), 1e-10);
}

#[test]
fn move_absolute() {
    let mut pose = CameraPose::default();
    pose.position_mut().set_xyz(Vec3::new(1.0, 2.0, 3.0));
    pose.move_absolute(Vec3::unit_x(), 5.0);
    expect_vec3_near(Vec3::new(6.0, 2.0, 3.0), pose.position().truncate(), 1e-10);

    let mut pose = CameraPose::default();
    let length = 2.0f64.sqrt();
    pose.move_absolute(Vec3::new(1.0 / length, 1.0 / length, 0.0), length);
    expect_vec3_near(Vec3::new(1.0, 1.0, 0.0), pose.position().truncate(), 1e-10);
}

#[test]
fn distance_between_poses() {
    let a = CameraPose::default();
    let mut b = CameraPose::default();
    b.position_mut().set_xyz(Vec3::new(3.0, 4.0, 0.0));

    assert!((a.distance_to(&b) - 5.0).abs() < 1e-10);
    assert!(a.distance_to(&b) == b.distance_to(&a));

    let mut c = CameraPose::default();
    c.position_mut().set_xyz(Vec3::new(3.0, 4.0, 0.0));
    assert!(b.distance_to(&c) == 0.0);
}

#[test]
fn rotate_normalizes_axis() {
    let mut pose = CameraPose::default();
    pose.rotate(90.0, 0.0, 0.0, 5.0);

    let expected = Quaternion::from_axis_angle(Vec3::unit_z(), std::f64::consts::FRAC_PI_2).unwrap();
    let actual: [f64; 4] = pose.orientation.into();
    let expected: [f64; 4] = expected.into();
    for i in 0..4 {
        assert!((actual[i] - expected[i]).abs() < 1e-10);
    }

    // Only the angle about z; a long axis must not scale the rotation.
    expect_vec3_near(Vec3::unit_y(), pose.orientation.rotate_vec3(Vec3::unit_x()), 1e-10);
}

#[test]
fn orthogonalize_huge_basis() {
    let mut pose = CameraPose::default();
    pose.right_axis_mut().set_xyz(Vec3::new(1e200, 1e199, 0.0));
    pose.up_axis_mut().set_xyz(Vec3::new(0.0, 1e200, 0.0));
    pose.ahead_axis_mut().set_xyz(Vec3::new(0.0, 0.0, 1e200));

    pose.orthogonalize();

    assert_orthonormal(&pose);
    let expected_right = Vec3::new(10.0, 1.0, 0.0).normalized().unwrap();
    expect_vec3_near(expected_right, pose.right_axis().truncate(), 1e-10);
    expect_vec3_near(Vec3::unit_z(), pose.ahead_axis().truncate(), 1e-10);
}

#[test]
fn rotate_keeps_unit_length() {
    let mut pose = CameraPose::default();
    pose.rotate(90.0, 0.0, 0.0, 1.0);
    assert!((pose.orientation.len() - 1.0).abs() < 1e-10);

    let expected = Quaternion::from_axis_angle(Vec3::unit_z(), std::f64::consts::FRAC_PI_2).unwrap();
    assert!((pose.orientation.dot(expected) - 1.0).abs() < 1e-10);
}

#[test]
fn rotate_zero_degrees_is_noop() {
    let mut pose = CameraPose::default();
    pose.rotate(0.0, 1.0, 0.0, 0.0);
    assert!((pose.orientation.dot(Quaternion::IDENTITY) - 1.0).abs() < 1e-10);
    assert!(pose.orientation.v.len() < 1e-10);
}

#[test]
fn rotate_then_unrotate_restores() {
    let mut pose = CameraPose::new(Vec3::zero(), Quaternion::new(0.1, -0.3, 0.2, 0.9));
    let before = pose.orientation;

    pose.rotate(37.5, 1.0, 2.0, -0.5);
    pose.rotate(-37.5, 1.0, 2.0, -0.5);

    let after: [f64; 4] = pose.orientation.into();
    let before: [f64; 4] = before.into();
    for i in 0..4 {
        assert!((after[i] - before[i]).abs() < 1e-10);
    }
}

#[test]
fn rotate_leaves_basis_and_ignores_zero_axis() {
    let mut pose = CameraPose::default();
    pose.rotate(45.0, 0.0, 1.0, 0.0);
    assert!(pose.transform == Mat4x4::identity());

    let orientation = pose.orientation;
    pose.rotate(45.0, 0.0, 0.0, 0.0);
    assert!(pose.orientation == orientation);
}

#[test]
fn rotate_applies_after_current_orientation() {
    let mut pose = CameraPose::default();
    pose.rotate(90.0, 0.0, 0.0, 1.0);
    pose.rotate(90.0, 1.0, 0.0, 0.0);

    // x -> y about z, then y -> z about x.
    expect_vec3_near(Vec3::unit_z(), pose.orientation.rotate_vec3(Vec3::unit_x()), 1e-10);
}

#[cfg(test)]
fn assert_orthonormal(pose: &CameraPose) {
    let right = pose.right_axis().truncate();
    let up = pose.up_axis().truncate();
    let ahead = pose.ahead_axis().truncate();

    for axis in [right, up, ahead] {
        assert!((axis.len() - 1.0).abs() < 1e-10, "axis {axis} is not unit length");
    }
    assert!(right.dot(up).abs() < 1e-10);
    assert!(right.dot(ahead).abs() < 1e-10);
    assert!(up.dot(ahead).abs() < 1e-10);
}

#[test]
fn orthogonalize_near_orthonormal_basis() {
    let mut pose = CameraPose::default();
    pose.right_axis_mut().set_xyz(Vec3::new(1.1, 0.1, 0.0));
    pose.up_axis_mut().set_xyz(Vec3::new(0.1, 1.1, 0.0));
    pose.ahead_axis_mut().set_xyz(Vec3::new(0.0, 0.0, 1.0));
    pose.position_mut().set_xyz(Vec3::new(4.0, 5.0, 6.0));
    let orientation = pose.orientation;

    pose.orthogonalize();

    assert_orthonormal(&pose);
    expect_vec3_near(Vec3::unit_z(), pose.ahead_axis().truncate(), 1e-12);
    expect_vec3_near(Vec3::new(4.0, 5.0, 6.0), pose.position().truncate(), 0.0);
    assert!(pose.orientation == orientation);
}

#[test]
fn orthogonalize_degenerate_basis() {
    let mut pose = CameraPose::default();
    pose.right_axis_mut().set_xyz(Vec3::new(0.0, 0.0, 3.0));
    pose.up_axis_mut().set_xyz(Vec3::zero());
    pose.ahead_axis_mut().set_xyz(Vec3::zero());

    pose.orthogonalize();

    assert_orthonormal(&pose);
    assert!(pose.as_array().iter().all(|v| v.is_finite()));
}

#[test]
fn orthogonalize_after_drift() {
    let mut pose = CameraPose::new(Vec3::zero(), Quaternion::IDENTITY);
    for i in 0..1000 {
        pose.rotate(0.7, 0.3, 1.0, (i as f64).sin());
        pose.sync_basis_from_orientation();
        let drift = pose.transform * Mat4x4::from(Quaternion::from_axis_angle(Vec3::unit_y(), 1e-3).unwrap());
        pose.transform = drift;
        pose.right_axis_mut().x += 1e-7;
    }
    pose.orthogonalize();
    assert_orthonormal(&pose);
}

#[test]
fn sync_between_representations() {
    let mut pose = CameraPose::default();
    pose.rotate(60.0, 1.0, 1.0, 0.0);
    pose.sync_basis_from_orientation();

    let rotated = pose.orientation.rotate_vec3(Vec3::unit_z());
    expect_vec3_near(rotated, pose.ahead_axis().truncate(), 1e-10);

    let orientation = pose.orientation;
    pose.orientation = Quaternion::IDENTITY;
    pose.sync_orientation_from_basis();
    assert!((pose.orientation.dot(orientation).abs() - 1.0).abs() < 1e-10);
}

#[test]
fn look_at_builds_orthonormal_pose() {
    let pose = CameraPose::look_at(
        Vec3::new(0.0, 1.0, 2.0),
        Vec3::zero(),
        Vec3::unit_y(),
    ).unwrap();

    assert_orthonormal(&pose);
    let expected_ahead = Vec3::new(0.0, -1.0, -2.0).normalized().unwrap();
    expect_vec3_near(expected_ahead, pose.ahead_axis().truncate(), 1e-12);
    expect_vec3_near(expected_ahead, pose.orientation.rotate_vec3(Vec3::unit_z()), 1e-10);
}

#[test]
fn look_at_rejects_degenerate_input() {
    let eye = Vec3::new(1.0, 2.0, 3.0);
    assert_eq!(
        CameraPose::look_at(eye, eye, Vec3::unit_y()),
        Err(CamposeError::DegenerateVector("view direction")),
    );
    assert_eq!(
        CameraPose::look_at(Vec3::zero(), Vec3::unit_y(), Vec3::unit_y()),
        Err(CamposeError::DegenerateVector("up vector")),
    );
}

#[test]
fn view_matrix_inverts_transform() {
    use cgmath::SquareMatrix;

    let mut pose = CameraPose::new(
        Vec3::new(3.0, -1.0, 2.0),
        Quaternion::from_axis_angle(Vec3::new(0.4, 1.0, -0.2), 0.8).unwrap(),
    );
    pose.set_key_frame(true);

    let product = pose.transform * pose.view_matrix();
    let identity: [f64; 16] = *Mat4x4::identity().as_array();
    for (a, b) in product.as_array().iter().zip(identity.iter()) {
        assert!((a - b).abs() < 1e-10);
    }

    let reference = cgmath::Matrix4::from(&pose).invert().unwrap();
    let view: [[f64; 4]; 4] = pose.view_matrix().into();
    let reference: [[f64; 4]; 4] = reference.into();
    for (col, ref_col) in view.iter().zip(reference.iter()) {
        for (a, b) in col.iter().zip(ref_col.iter()) {
            assert!((a - b).abs() < 1e-10);
        }
    }
}

#[test]
fn uniform_is_plain_data() {
    let pose = CameraPose::new(Vec3::new(1.0, 2.0, 3.0), Quaternion::IDENTITY);
    let uniform = PoseUniform::from(&pose);

    assert!(uniform.view_pos == [1.0, 2.0, 3.0, 1.0]);
    assert!(uniform.view[3] == [-1.0, -2.0, -3.0, 1.0]);
    assert_eq!(bytemuck::bytes_of(&uniform).len(), 80);
}
