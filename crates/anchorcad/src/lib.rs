#![warn(missing_docs)]

//! anchorcad: connector-aligned component trees for CSG modeling
//!
//! Shapes expose *anchors*: oriented attachment frames. Aligning one anchor
//! onto another yields the affine transformations that move a component
//! into place. Components form a tree in an [`Assembly`]; transforming a
//! parent moves its children, and boolean compositions combine components
//! into a symbolic [`Body`] that a [`Renderer`] turns into CAD source.
//!
//! # Example
//!
//! ```rust
//! use anchorcad::{Anchor, Assembly, NewComponent, Renderer, ScadRenderer, Shape};
//!
//! let mut asm = Assembly::new();
//! let base = asm.add(Shape::cylinder(15.0, 7.5, false));
//! let knob = asm.add(Shape::sphere(4.0));
//!
//! // Sit the knob's center on the cylinder's top face
//! let seat = asm.anchor(base, Anchor::Top)?;
//! let steps = asm.anchor(knob, Anchor::Center)?.align(Some(&seat))?;
//! asm.transform(knob, steps)?;
//!
//! let part = asm.create(NewComponent::new().children([base, knob]))?;
//! let source = ScadRenderer::default().render(&asm.body(part)?).unwrap();
//! assert!(source.starts_with("union() {"));
//! # Ok::<(), anchorcad::ComponentError>(())
//! ```

pub mod affine;
pub mod assembly;
pub mod connector;
pub mod error;
pub mod export;
pub mod frame;
pub mod shape;
pub mod transform;

pub use affine::{Historical, Holonomic};
pub use assembly::{
    Assembly, Component, ComponentId, ComponentRef, ComposeOptions, Composition, NewComponent,
    Transformations,
};
pub use connector::Connector;
pub use error::{ComponentError, Result, TransformError};
pub use export::{ScadOptions, ScadRenderer};
pub use frame::{reference_frame, reference_frame_from_connector};
pub use shape::{Anchor, Frustum, Shape, Sphere};
pub use transform::{AffineTransformation, Rotation, RotationAngle};

pub use anchorcad_ir::{BooleanOp, Body, Renderer, Rgba};
pub use anchorcad_math::{Tolerance, Vector, VectorError, AXIS_X, AXIS_Y, AXIS_Z, ORIGIN};
