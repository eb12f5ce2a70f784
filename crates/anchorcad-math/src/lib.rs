#![warn(missing_docs)]

//! Vector algebra for anchorcad.
//!
//! A deliberately small 3D vector type: enough to rotate, cross, measure
//! signed angles, and solve the rotation that aligns one direction with
//! another. Degenerate inputs (null, parallel, antiparallel vectors) are
//! reported as typed [`VectorError`]s so the alignment code can fall back
//! locally instead of producing NaNs.

mod error;
mod vector;

pub use error::VectorError;
pub use vector::{Vector, AXIS_X, AXIS_Y, AXIS_Z, ORIGIN};

use serde::{Deserialize, Serialize};

/// The nalgebra vector used for the actual arithmetic.
pub type Vec3 = nalgebra::Vector3<f64>;

/// Tolerances for approximate vector comparison.
///
/// Two components `a` and `b` are considered equal when
/// `|a - b| <= absolute + relative * |b|`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Relative tolerance, scaled by the magnitude of the reference component.
    pub relative: f64,
    /// Absolute tolerance floor.
    pub absolute: f64,
}

impl Tolerance {
    /// Default comparison tolerances (1e-5 relative, 1e-8 absolute).
    pub const DEFAULT: Self = Self {
        relative: 1e-5,
        absolute: 1e-8,
    };

    /// Check if `a` is close to the reference value `b`.
    pub fn is_close(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.absolute + self.relative * b.abs()
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
