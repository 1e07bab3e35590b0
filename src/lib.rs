//! Camera poses for keyframed camera paths, and the vector and quaternion
//! math behind them.
//!
//! Conventions used throughout the crate:
//!
//! * Matrices are column-major (see [`MATRIX_LAYOUT`]). A pose's transform
//!   stores its right, up and ahead axes and its position as columns, at
//!   flat offsets 0, 4, 8 and 12.
//! * Quaternions are scalar-last: `[x, y, z, w]`.
//! * [`CameraPose::rotate`] takes degrees. Everything else takes radians.

#[cfg(test)]
mod random;
pub mod vector;
pub mod matrix;
pub mod quaternion;
pub mod interpolate;
pub mod camera;
pub mod config;
pub mod error;

pub use crate::camera::{CameraPose, PoseUniform};
pub use crate::error::{CamposeError, CamposeResult};
pub use crate::matrix::Mat4x4;
pub use crate::quaternion::Quaternion;
pub use crate::vector::{Vec3, Vec4};

/// Memory layout of every 16-element matrix in this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatrixLayout {
    /// Element `(row, col)` lives at flat index `col * 4 + row`.
    ColumnMajor,
}

pub const MATRIX_LAYOUT: MatrixLayout = MatrixLayout::ColumnMajor;
