//! Primitive shapes and their untransformed anchors.

use anchorcad_ir::Primitive;
use anchorcad_math::{Vector, VectorError};
use serde::{Deserialize, Serialize};

use crate::connector::Connector;

/// Named attachment frames a shape may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anchor {
    /// Center of the top face.
    Top,
    /// Center of the bottom face.
    Bottom,
    /// Center of the shape's middle plane (or the sphere's center).
    Center,
}

/// A frustum along Z.
///
/// Before transformation one vertex of each face lies on the X axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frustum {
    /// Diameter of the circle circumscribing the bottom face.
    pub bottom_diameter: f64,
    /// Diameter of the circle circumscribing the top face; zero meets at a point.
    pub top_diameter: f64,
    /// Height along Z.
    pub height: f64,
    /// Center the height on the origin instead of resting on the XY plane.
    pub center: bool,
    /// Number of sides; `None` is circular.
    pub segments: Option<u32>,
}

impl Frustum {
    /// Create a frustum. The top diameter defaults to the bottom diameter.
    pub fn new(
        bottom_diameter: f64,
        height: f64,
        top_diameter: Option<f64>,
        center: bool,
        segments: Option<u32>,
    ) -> Self {
        Self {
            bottom_diameter,
            top_diameter: top_diameter.unwrap_or(bottom_diameter),
            height,
            center,
            segments,
        }
    }

    fn end_distance(&self) -> f64 {
        self.height / 2.0
    }

    /// The untransformed connector for `anchor`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::NaN`] if the height is NaN.
    pub fn anchor(&self, anchor: Anchor) -> Result<Connector, VectorError> {
        let center = if self.center { 0.0 } else { self.end_distance() };
        let z = match anchor {
            Anchor::Top => center + self.end_distance(),
            Anchor::Bottom => center - self.end_distance(),
            Anchor::Center => center,
        };
        Ok(Connector::default().with_point(Vector::new(0.0, 0.0, z)?))
    }

    fn primitive(&self) -> Primitive {
        Primitive::Frustum {
            bottom_diameter: self.bottom_diameter,
            top_diameter: self.top_diameter,
            height: self.height,
            center: self.center,
            segments: self.segments,
        }
    }
}

/// A sphere centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// Sphere diameter.
    pub diameter: f64,
}

impl Sphere {
    /// Half the diameter.
    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }
}

/// The primitive shape carried by a component.
///
/// Cylinders and cones are frustums with fixed top diameters; they stay
/// separate variants so that a cylinder never equals a frustum with the
/// same dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// A general frustum, polygonal when `segments` is set.
    Frustum(Frustum),
    /// A circular frustum with equal diameters.
    Cylinder(Frustum),
    /// A circular frustum with a zero top diameter.
    Cone(Frustum),
    /// A sphere.
    Sphere(Sphere),
}

impl Shape {
    /// A frustum with an optional number of sides.
    pub fn frustum(
        bottom_diameter: f64,
        height: f64,
        top_diameter: Option<f64>,
        center: bool,
        segments: Option<u32>,
    ) -> Self {
        Self::Frustum(Frustum::new(bottom_diameter, height, top_diameter, center, segments))
    }

    /// A frustum with circular faces.
    pub fn circular_frustum(
        bottom_diameter: f64,
        height: f64,
        top_diameter: Option<f64>,
        center: bool,
    ) -> Self {
        Self::frustum(bottom_diameter, height, top_diameter, center, None)
    }

    /// A cylinder.
    pub fn cylinder(diameter: f64, height: f64, center: bool) -> Self {
        Self::Cylinder(Frustum::new(diameter, height, None, center, None))
    }

    /// A cone with its apex on top.
    pub fn cone(bottom_diameter: f64, height: f64, center: bool) -> Self {
        Self::Cone(Frustum::new(bottom_diameter, height, Some(0.0), center, None))
    }

    /// A sphere.
    pub fn sphere(diameter: f64) -> Self {
        Self::Sphere(Sphere { diameter })
    }

    /// The untransformed connector for `anchor`, if this shape has one.
    pub fn anchor(&self, anchor: Anchor) -> Result<Option<Connector>, VectorError> {
        match self {
            Self::Frustum(f) | Self::Cylinder(f) | Self::Cone(f) => f.anchor(anchor).map(Some),
            Self::Sphere(_) => Ok(match anchor {
                Anchor::Center => Some(Connector::default()),
                Anchor::Top | Anchor::Bottom => None,
            }),
        }
    }

    /// The renderer's descriptor for this shape.
    pub fn primitive(&self) -> Primitive {
        match self {
            Self::Frustum(f) | Self::Cylinder(f) | Self::Cone(f) => f.primitive(),
            Self::Sphere(s) => Primitive::Sphere {
                diameter: s.diameter,
            },
        }
    }
}
