//! Affine transformation descriptors.
//!
//! Rotations mirror OpenSCAD's `rotate(a, v)` argument forms: a single
//! angle about an optional pole (Z when absent), or an Euler triple applied
//! about world X, then Y, then Z.

use anchorcad_ir as ir;
use anchorcad_math::{Vector, VectorError, AXIS_X, AXIS_Y, AXIS_Z};
use serde::{Deserialize, Serialize};

/// Angle argument of a rotation, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RotationAngle {
    /// A single angle about the rotation's pole.
    Single(f64),
    /// Successive rotations about world X, then Y, then Z.
    Euler([f64; 3]),
}

/// Parameters of a rotation.
///
/// `angle` is optional only so that malformed rotations can be represented
/// and rejected at application time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    /// Angle(s) in degrees.
    pub angle: Option<RotationAngle>,
    /// Rotation pole; ignored for Euler angles, Z when absent.
    pub pole: Option<Vector>,
}

/// A single affine transformation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AffineTransformation {
    /// Translation by an offset.
    Translate {
        /// The offset.
        offset: Vector,
    },
    /// Rotation.
    Rotate(Rotation),
    /// Non-uniform scale.
    Scale {
        /// Scale factor per axis.
        factor: Vector,
    },
}

impl AffineTransformation {
    /// Translation by `offset`.
    pub fn translate(offset: Vector) -> Self {
        Self::Translate { offset }
    }

    /// Rotation by `angle` degrees about `pole`.
    pub fn rotate_about(angle: f64, pole: Vector) -> Self {
        Self::Rotate(Rotation {
            angle: Some(RotationAngle::Single(angle)),
            pole: Some(pole),
        })
    }

    /// Rotation by `angle` degrees about the Z axis.
    pub fn rotate_z(angle: f64) -> Self {
        Self::Rotate(Rotation {
            angle: Some(RotationAngle::Single(angle)),
            pole: None,
        })
    }

    /// Euler rotation: `angles[0]` about X, then `angles[1]` about Y, then
    /// `angles[2]` about Z.
    pub fn rotate_euler(angles: [f64; 3]) -> Self {
        Self::Rotate(Rotation {
            angle: Some(RotationAngle::Euler(angles)),
            pole: None,
        })
    }

    /// Non-uniform scale.
    pub fn scale(factor: Vector) -> Self {
        Self::Scale { factor }
    }

    /// Translation of `distance` along +Z. Fails for a NaN or infinite
    /// distance.
    pub fn up(distance: f64) -> Result<Self, VectorError> {
        Ok(Self::translate(AXIS_Z.scaled(distance)?))
    }

    /// Translation of `distance` along -Z.
    pub fn down(distance: f64) -> Result<Self, VectorError> {
        Ok(Self::translate(AXIS_Z.scaled(-distance)?))
    }

    /// Translation of `distance` along +X.
    pub fn right(distance: f64) -> Result<Self, VectorError> {
        Ok(Self::translate(AXIS_X.scaled(distance)?))
    }

    /// Translation of `distance` along -X.
    pub fn left(distance: f64) -> Result<Self, VectorError> {
        Ok(Self::translate(AXIS_X.scaled(-distance)?))
    }

    /// Translation of `distance` along +Y.
    pub fn forward(distance: f64) -> Result<Self, VectorError> {
        Ok(Self::translate(AXIS_Y.scaled(distance)?))
    }

    /// Translation of `distance` along -Y.
    pub fn back(distance: f64) -> Result<Self, VectorError> {
        Ok(Self::translate(AXIS_Y.scaled(-distance)?))
    }

    /// The body-expression tag for this transformation.
    pub fn to_ir(&self) -> ir::Transform {
        match self {
            Self::Translate { offset } => ir::Transform::Translate {
                offset: ir_vec(offset),
            },
            Self::Rotate(Rotation { angle, pole }) => ir::Transform::Rotate {
                angle: angle.map(|angle| match angle {
                    RotationAngle::Single(a) => ir::RotationAngle::Single(a),
                    RotationAngle::Euler([x, y, z]) => {
                        ir::RotationAngle::Euler(ir::Vec3::new(x, y, z))
                    }
                }),
                pole: pole.as_ref().map(ir_vec),
            },
            Self::Scale { factor } => ir::Transform::Scale {
                factor: ir_vec(factor),
            },
        }
    }
}

fn ir_vec(v: &Vector) -> ir::Vec3 {
    ir::Vec3::new(v.x(), v.y(), v.z())
}
