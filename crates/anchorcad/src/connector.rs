//! Connectors: oriented attachment points.
//!
//! A connector is a point plus two directions. The `axis` is the primary
//! alignment direction; the `normal` fixes rotation about it. Aligning one
//! connector with another yields the transformations that bring the first
//! into coincidence with the second.

use std::fmt;

use anchorcad_math::{Vector, VectorError, AXIS_X, AXIS_Y, AXIS_Z, ORIGIN};
use serde::{Deserialize, Serialize};

use crate::affine::Holonomic;
use crate::error::TransformError;
use crate::transform::{AffineTransformation, Rotation, RotationAngle};

/// An attachment point with a primary axis and a perpendicular normal.
///
/// Equality is approximate, component by component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    /// Attachment location.
    pub point: Vector,
    /// Primary alignment direction.
    pub axis: Vector,
    /// Secondary alignment direction, perpendicular to `axis`.
    pub normal: Vector,
}

impl Default for Connector {
    /// The world frame: origin, Z axis, X normal.
    fn default() -> Self {
        Self::new(ORIGIN, AXIS_Z, AXIS_X)
    }
}

impl Connector {
    /// Create a connector from its three vectors, taken as given.
    pub fn new(point: Vector, axis: Vector, normal: Vector) -> Self {
        Self {
            point,
            axis,
            normal,
        }
    }

    /// Create a connector from raw components and a roll.
    ///
    /// `axis` is normalized. The normal is the X axis rolled by `roll`
    /// degrees about Z, then carried along with the rotation that takes Z
    /// onto `axis`.
    pub fn from_components(point: [f64; 3], axis: [f64; 3], roll: f64) -> Result<Self, VectorError> {
        let axis = Vector::try_from(axis)?.normalized()?;
        let normal = AXIS_X
            .rotate(roll, &AXIS_Z)?
            .rotate_to_alignment(&AXIS_Z, &axis)?;
        Ok(Self::new(Vector::try_from(point)?, axis, normal))
    }

    /// This connector with a different point.
    pub fn with_point(self, point: Vector) -> Self {
        Self { point, ..self }
    }

    /// This connector with a different axis.
    pub fn with_axis(self, axis: Vector) -> Self {
        Self { axis, ..self }
    }

    /// This connector with a different normal.
    pub fn with_normal(self, normal: Vector) -> Self {
        Self { normal, ..self }
    }

    /// The angle, in degrees, between X and the normal once the axis has
    /// been rotated onto Z.
    pub fn roll(&self) -> Result<f64, VectorError> {
        let normal = self.normal.rotate_to_alignment(&self.axis, &AXIS_Z)?;
        AXIS_X.angle_between(&normal, Some(&AXIS_Z))
    }

    /// Rotate all three vectors by `angle` degrees about `pole`, which runs
    /// through the origin and must be normalized.
    pub fn rotate_about(self, angle: f64, pole: &Vector) -> Result<Self, VectorError> {
        Ok(Self::new(
            self.point.rotate(angle, pole)?,
            self.axis.rotate(angle, pole)?,
            self.normal.rotate(angle, pole)?,
        ))
    }

    /// The transformations that bring this connector onto `other` (the
    /// default connector when `None`).
    ///
    /// At most three steps are produced, each only when needed: a rotation
    /// cancelling the axis misalignment, a rotation cancelling the roll, and
    /// a translation. Applying them in order to this connector reproduces
    /// `other`, given both normals are perpendicular to their axes.
    pub fn align(&self, other: Option<&Connector>) -> Result<Vec<AffineTransformation>, TransformError> {
        let target = other.copied().unwrap_or_default();
        let mut working = *self;
        let mut steps = Vec::with_capacity(3);

        if working.axis != target.axis {
            let (angle, pole) = working.axis.alignment_rotation_parameters(&target.axis, None)?;
            let step = AffineTransformation::rotate_about(-angle, pole);
            log::debug!("align {self}: axis step {step:?}");
            working = working.apply(&step)?;
            steps.push(step);
        }

        if working.normal != target.normal {
            // The axes agree now, so the roll is always about the target axis.
            // Opposite normals have no cross product to say so.
            let step = match working.normal.normal(&target.normal) {
                Err(VectorError::NoNormalForAntiparallels { .. }) => {
                    AffineTransformation::rotate_about(180.0, target.axis)
                }
                _ => {
                    let (angle, pole) =
                        working.normal.alignment_rotation_parameters(&target.normal, None)?;
                    AffineTransformation::rotate_about(-angle, pole)
                }
            };
            log::debug!("align {self}: roll step {step:?}");
            working = working.apply(&step)?;
            steps.push(step);
        }

        if working.point != target.point {
            let offset = Vector::from_vec3(target.point.to_vec3() - working.point.to_vec3())?;
            let step = AffineTransformation::translate(offset);
            log::debug!("align {self}: translation step {step:?}");
            steps.push(step);
        }

        Ok(steps)
    }
}

impl Holonomic for Connector {
    fn translate(self, offset: &Vector) -> Result<Self, TransformError> {
        let point = Vector::from_vec3(self.point.to_vec3() + offset.to_vec3())?;
        Ok(self.with_point(point))
    }

    fn rotate(self, rotation: &Rotation) -> Result<Self, TransformError> {
        let rotated = match (rotation.angle, rotation.pole) {
            (Some(RotationAngle::Single(angle)), None) => self.rotate_about(angle, &AXIS_Z)?,
            (Some(RotationAngle::Single(angle)), Some(pole)) => {
                self.rotate_about(angle, &pole.normalized()?)?
            }
            (Some(RotationAngle::Euler([x, y, z])), _) => self
                .rotate_about(x, &AXIS_X)?
                .rotate_about(y, &AXIS_Y)?
                .rotate_about(z, &AXIS_Z)?,
            (None, pole) => return Err(TransformError::MalformedRotation { pole }),
        };
        Ok(rotated)
    }

    /// Only the point is scaled; directions are unchanged.
    fn scale(self, factor: &Vector) -> Result<Self, TransformError> {
        let point = Vector::from_vec3(self.point.to_vec3().component_mul(&factor.to_vec3()))?;
        Ok(self.with_point(point))
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}; {}; {}}}", self.point, self.axis, self.normal)
    }
}
