//! Symbolic body expressions for the anchorcad ecosystem.
//!
//! This crate defines the tree that a finished component hands to an external
//! renderer. It is purely declarative: primitive descriptors, boolean
//! compositions, transform wrappers and color wrappers, nested in exactly the
//! order they were built. Turning it into a CAD description language is the
//! job of a [`Renderer`].

use serde::{Deserialize, Serialize};

/// 3D vector with f64 components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new Vec3.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// RGBA color with channels in 0.0..1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
    /// Alpha channel (1.0 = opaque).
    pub a: f64,
}

impl Rgba {
    /// Create a color from all four channels.
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color.
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::new(r, g, b, 1.0)
    }
}

/// Boolean operator of a composition node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOp {
    /// Union of all operands.
    Union,
    /// First operand minus all others.
    Difference,
    /// Intersection of all operands.
    Intersection,
}

/// Angle argument of a rotation, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RotationAngle {
    /// A single angle about the rotation's pole.
    Single(f64),
    /// Successive rotations about world X, then Y, then Z.
    Euler(Vec3),
}

/// Affine transform tag of a transform wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Transform {
    /// Translation by an offset vector.
    Translate {
        /// Translation offset.
        offset: Vec3,
    },
    /// Rotation, mirroring OpenSCAD's `rotate(a, v)`.
    Rotate {
        /// Rotation angle(s), if any.
        angle: Option<RotationAngle>,
        /// Rotation pole, if any.
        pole: Option<Vec3>,
    },
    /// Non-uniform scale.
    Scale {
        /// Scale factors per axis.
        factor: Vec3,
    },
}

/// Primitive shape descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Primitive {
    /// Frustum along the Z axis; a cylinder or cone in the circular cases.
    Frustum {
        /// Diameter of the circle circumscribing the bottom face.
        bottom_diameter: f64,
        /// Diameter of the circle circumscribing the top face (0 for a point).
        top_diameter: f64,
        /// Height along Z.
        height: f64,
        /// Center the height on the origin instead of resting on the XY plane.
        center: bool,
        /// Number of sides; `None` leaves it to the renderer's facet settings.
        segments: Option<u32>,
    },
    /// Sphere centered at origin.
    Sphere {
        /// Sphere diameter.
        diameter: f64,
    },
}

/// A body expression: the fully resolved geometry of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Body {
    /// A leaf shape.
    Primitive {
        /// The shape descriptor.
        primitive: Primitive,
    },
    /// A boolean operation over ordered operands.
    Composition {
        /// The boolean operator.
        operator: BooleanOp,
        /// Operands, in application order.
        operands: Vec<Body>,
    },
    /// An affine transform around a single child.
    Transform {
        /// The transform to apply.
        transform: Transform,
        /// The wrapped expression.
        child: Box<Body>,
    },
    /// A color tag around a single child.
    Color {
        /// The color.
        rgba: Rgba,
        /// The wrapped expression.
        child: Box<Body>,
    },
}

impl Body {
    /// Wrap a primitive descriptor.
    pub fn primitive(primitive: Primitive) -> Self {
        Self::Primitive { primitive }
    }

    /// Combine ordered operands with a boolean operator.
    pub fn composition(operator: BooleanOp, operands: Vec<Body>) -> Self {
        Self::Composition { operator, operands }
    }

    /// Wrap this body in a transform.
    pub fn transformed(self, transform: Transform) -> Self {
        Self::Transform {
            transform,
            child: Box::new(self),
        }
    }

    /// Wrap this body in a color tag.
    pub fn colored(self, rgba: Rgba) -> Self {
        Self::Color {
            rgba,
            child: Box::new(self),
        }
    }

    /// Number of primitive leaves in this expression.
    pub fn primitive_count(&self) -> usize {
        match self {
            Self::Primitive { .. } => 1,
            Self::Composition { operands, .. } => operands.iter().map(Body::primitive_count).sum(),
            Self::Transform { child, .. } | Self::Color { child, .. } => child.primitive_count(),
        }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The external renderer contract: turn a body into a target artifact.
///
/// Implementations must preserve operand order and transform nesting
/// exactly as built.
pub trait Renderer {
    /// The produced artifact (typically source text).
    type Output;
    /// Rendering failure.
    type Error: std::error::Error;

    /// Render a body expression.
    fn render(&self, body: &Body) -> Result<Self::Output, Self::Error>;
}
