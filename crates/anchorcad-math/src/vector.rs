//! The [`Vector`] value type.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::{Tolerance, Vec3, VectorError};

/// Cross products shorter than this fraction of `|a| * |b|` count as colinear.
const COLINEAR_EPSILON: f64 = 1e-12;

/// The zero vector.
pub const ORIGIN: Vector = Vector::raw(0.0, 0.0, 0.0);
/// The world X axis.
pub const AXIS_X: Vector = Vector::raw(1.0, 0.0, 0.0);
/// The world Y axis.
pub const AXIS_Y: Vector = Vector::raw(0.0, 1.0, 0.0);
/// The world Z axis.
pub const AXIS_Z: Vector = Vector::raw(0.0, 0.0, 1.0);

/// An immutable 3-dimensional vector.
///
/// [`Vector::new`], [`Vector::rotate`] and [`Vector::scaled`] reject a NaN
/// magnitude. The arithmetic operators do not check, so `inf + -inf`
/// gives a NaN vector. Equality is approximate (see [`Tolerance::DEFAULT`]) and
/// ordering compares magnitudes only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vector {
    x: f64,
    y: f64,
    z: f64,
}

impl Vector {
    const fn raw(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Create a vector from its components.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::NaN`] if the resulting magnitude is undefined.
    pub fn new(x: f64, y: f64, z: f64) -> Result<Self, VectorError> {
        let v = Self::raw(x, y, z);
        if v.magnitude().is_nan() {
            return Err(VectorError::NaN {
                components: [x, y, z],
            });
        }
        Ok(v)
    }

    /// Create a vector from an nalgebra vector, checking for NaN.
    pub fn from_vec3(v: Vec3) -> Result<Self, VectorError> {
        Self::new(v.x, v.y, v.z)
    }

    /// The nalgebra representation of this vector.
    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    // The operators skip the NaN check; fallible paths go through
    // `from_vec3` instead.
    fn unchecked(v: Vec3) -> Self {
        Self::raw(v.x, v.y, v.z)
    }

    /// X component.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y component.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Z component.
    pub fn z(&self) -> f64 {
        self.z
    }

    /// The components as an array.
    pub fn components(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// This vector's length.
    pub fn magnitude(&self) -> f64 {
        if self.x == 0.0 && self.y == 0.0 && self.z == 0.0 {
            return 0.0;
        }
        self.to_vec3().norm()
    }

    /// True if every component is exactly zero.
    pub fn is_null(&self) -> bool {
        self.magnitude() == 0.0
    }

    /// A vector parallel to this one with a magnitude of 1.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::NaN`] for the null vector.
    pub fn normalized(&self) -> Result<Self, VectorError> {
        Self::from_vec3(self.to_vec3() / self.magnitude())
    }

    /// This vector multiplied by a scalar.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::NaN`] if `factor` is NaN, or infinite on a
    /// vector with a zero component.
    pub fn scaled(&self, factor: f64) -> Result<Self, VectorError> {
        Self::from_vec3(self.to_vec3() * factor)
    }

    /// Approximate equality under an explicit tolerance.
    pub fn approx_eq(&self, other: &Vector, tolerance: &Tolerance) -> bool {
        tolerance.is_close(self.x, other.x)
            && tolerance.is_close(self.y, other.y)
            && tolerance.is_close(self.z, other.z)
    }

    /// The unit vector normal to this vector and `other`.
    ///
    /// This is the normalized cross product, so it is anticommutative:
    /// `a.normal(b) == -b.normal(a)`.
    ///
    /// # Errors
    ///
    /// - [`VectorError::NoNormalForNulls`] if either vector has zero
    ///   magnitude (the smaller vector is reported first).
    /// - [`VectorError::NoNormalForParallels`] /
    ///   [`VectorError::NoNormalForAntiparallels`] if the vectors are colinear.
    pub fn normal(&self, other: &Vector) -> Result<Self, VectorError> {
        if self.is_null() || other.is_null() {
            let (null, other) = if self.magnitude() <= other.magnitude() {
                (*self, *other)
            } else {
                (*other, *self)
            };
            return Err(VectorError::NoNormalForNulls { null, other });
        }

        let (a, b) = (self.to_vec3(), other.to_vec3());
        let cross = a.cross(&b);
        let length = cross.norm();
        if length <= COLINEAR_EPSILON * a.norm() * b.norm() {
            return Err(if a.dot(&b) > 0.0 {
                VectorError::NoNormalForParallels {
                    left: *self,
                    right: *other,
                }
            } else {
                VectorError::NoNormalForAntiparallels {
                    left: *self,
                    right: *other,
                }
            });
        }

        Self::from_vec3(cross / length)
    }

    /// Rotate by `angle` degrees about `pole` (right-hand rule).
    ///
    /// `pole` is assumed to be normalized.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::NaN`] if `angle` is not finite.
    pub fn rotate(&self, angle: f64, pole: &Vector) -> Result<Self, VectorError> {
        let (s, c) = angle.to_radians().sin_cos();
        let k = pole.to_vec3();
        let v = self.to_vec3();
        // Rodrigues' rotation formula
        Self::from_vec3(v * c + k.cross(&v) * s + k * (k.dot(&v) * (1.0 - c)))
    }

    /// Rotate this vector through the angle that aligns `inclined` with
    /// `reference`, about the same axis.
    ///
    /// Swapping `inclined` and `reference` reverses the rotation.
    pub fn rotate_to_alignment(
        &self,
        inclined: &Vector,
        reference: &Vector,
    ) -> Result<Self, VectorError> {
        let (angle, axis) = self.alignment_rotation_parameters(inclined, Some(reference))?;
        self.rotate(angle, &axis)
    }

    /// The `(angle, axis)` such that rotating `inclined` by `angle` about
    /// `axis` aligns it with `reference` (this vector, if not given).
    ///
    /// When `inclined` and `reference` are colinear the axis falls back to the
    /// normal of this vector and `reference`, and failing that to an
    /// arbitrary normal of this vector.
    pub fn alignment_rotation_parameters(
        &self,
        inclined: &Vector,
        reference: Option<&Vector>,
    ) -> Result<(f64, Vector), VectorError> {
        let reference = reference.copied().unwrap_or(*self);

        let axis = match inclined.normal(&reference) {
            Ok(axis) => axis,
            Err(err) if err.is_colinear() => {
                log::trace!("{inclined} and {reference} are colinear; trying {self}");
                match self.normal(&reference) {
                    Ok(axis) => axis,
                    Err(err) if err.is_colinear() => {
                        log::trace!("{self} is colinear too; using an arbitrary normal");
                        self.arbitrary_normal()?
                    }
                    Err(err) => return Err(err),
                }
            }
            Err(err) => return Err(err),
        };

        Ok((inclined.angle_between(&reference, Some(&axis))?, axis))
    }

    /// The first world axis-derived normal to this vector, trying X, Y and Z.
    pub fn arbitrary_normal(&self) -> Result<Self, VectorError> {
        for axis in [AXIS_X, AXIS_Y, AXIS_Z] {
            match self.normal(&axis) {
                Ok(normal) => return Ok(normal),
                Err(err) if err.is_colinear() => continue,
                Err(err) => return Err(err),
            }
        }
        Err(VectorError::NoArbitraryNormal { vector: *self })
    }

    /// The signed angle, in degrees, that rotates this vector onto `other`
    /// about `normal`.
    ///
    /// Both vectors are projected onto the plane perpendicular to `normal`.
    /// Without a `normal` the cross product of the two is used, which makes
    /// the result non-negative. Parallel vectors give `0.0`; antiparallel
    /// vectors give `180.0` (though `-180.0` would be just as correct).
    pub fn angle_between(&self, other: &Vector, normal: Option<&Vector>) -> Result<f64, VectorError> {
        let look = match normal {
            Some(normal) => *normal,
            None => match self.normal(other) {
                Ok(normal) => normal,
                Err(VectorError::NoNormalForParallels { .. }) => return Ok(0.0),
                Err(VectorError::NoNormalForAntiparallels { .. }) => return Ok(180.0),
                Err(err) => return Err(err),
            },
        };

        if self.is_null() || other.is_null() {
            // Reuse the null-vector diagnostics of `normal`.
            return Err(self.normal(other).err().unwrap_or(VectorError::NoArbitraryNormal {
                vector: *self,
            }));
        }

        Ok(signed_angle(&self.to_vec3(), &other.to_vec3(), &look.to_vec3()))
    }
}

/// Component of `v` perpendicular to `axis`.
fn reject(v: &Vec3, axis: &Vec3) -> Vec3 {
    let len2 = axis.norm_squared();
    if len2 == 0.0 {
        return *v;
    }
    v - axis * (v.dot(axis) / len2)
}

fn signed_angle(a: &Vec3, b: &Vec3, look: &Vec3) -> f64 {
    let (pa, pb) = (reject(a, look), reject(b, look));
    let (pa, pb) = if pa.norm() > 0.0 && pb.norm() > 0.0 {
        (pa, pb)
    } else {
        (*a, *b)
    };

    let cos = (pa.dot(&pb) / (pa.norm() * pb.norm())).clamp(-1.0, 1.0);
    let unsigned = cos.acos().to_degrees();

    // Colinear vectors count as a positive rotation
    if a.cross(b).dot(look) < 0.0 {
        -unsigned
    } else {
        unsigned
    }
}

impl Default for Vector {
    fn default() -> Self {
        ORIGIN
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other, &Tolerance::DEFAULT)
    }
}

impl PartialOrd for Vector {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.magnitude().partial_cmp(&other.magnitude())
    }
}

impl Neg for Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        Self::unchecked(-self.to_vec3())
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, rhs: Vector) -> Vector {
        Self::unchecked(self.to_vec3() + rhs.to_vec3())
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, rhs: Vector) -> Vector {
        self + (-rhs)
    }
}

/// Component-wise product.
impl Mul for Vector {
    type Output = Vector;
    fn mul(self, rhs: Vector) -> Vector {
        Self::unchecked(self.to_vec3().component_mul(&rhs.to_vec3()))
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}, {}, {}>",
            Significant(self.x),
            Significant(self.y),
            Significant(self.z)
        )
    }
}

/// Number of significant digits shown by `Display`.
const DISPLAY_DIGITS: i32 = 3;

/// A component printed to [`DISPLAY_DIGITS`] significant digits.
///
/// Fixed-point output keeps at least one decimal (`1.0`, `0.625`); values
/// that need more integer digits than that, or are below `1e-4`, switch to
/// scientific notation (`1.23e+02`, `1e-05`).
struct Significant(f64);

impl fmt::Display for Significant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        if value == 0.0 || !value.is_finite() {
            return write!(f, "{value:.1}");
        }

        // Round first so that 99.96 counts as 1e2
        let sci = format!("{:.*e}", (DISPLAY_DIGITS - 1) as usize, value);
        let (mantissa, exponent) = sci.split_once('e').ok_or(fmt::Error)?;
        let exponent: i32 = exponent.parse().map_err(|_| fmt::Error)?;

        if (-4..DISPLAY_DIGITS - 1).contains(&exponent) {
            let decimals = (DISPLAY_DIGITS - 1 - exponent) as usize;
            let fixed = format!("{value:.decimals$}");
            let trimmed = fixed.trim_end_matches('0');
            if trimmed.ends_with('.') {
                write!(f, "{trimmed}0")
            } else {
                f.write_str(trimmed)
            }
        } else {
            let mantissa = if mantissa.contains('.') {
                mantissa.trim_end_matches('0').trim_end_matches('.')
            } else {
                mantissa
            };
            let sign = if exponent < 0 { '-' } else { '+' };
            write!(f, "{mantissa}e{sign}{:02}", exponent.abs())
        }
    }
}

impl TryFrom<[f64; 3]> for Vector {
    type Error = VectorError;

    fn try_from(raw: [f64; 3]) -> Result<Self, Self::Error> {
        Self::new(raw[0], raw[1], raw[2])
    }
}

impl From<Vector> for [f64; 3] {
    fn from(v: Vector) -> Self {
        v.components()
    }
}

impl From<Vector> for Vec3 {
    fn from(v: Vector) -> Self {
        v.to_vec3()
    }
}
