//! Error types for transformations and component trees.

use anchorcad_math::{Vector, VectorError};
use thiserror::Error;

use crate::assembly::ComponentId;
use crate::shape::Anchor;

/// Errors raised while applying an affine transformation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// A rotation carried a pole but no angle, or neither.
    #[error("rotation needs an angle (pole: {pole:?})")]
    MalformedRotation {
        /// The pole the rotation was given, if any.
        pole: Option<Vector>,
    },

    /// Degenerate vector arithmetic.
    #[error(transparent)]
    Vector(#[from] VectorError),
}

/// Errors raised by [`Assembly`](crate::Assembly) operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    /// The child already belongs to a different parent.
    #[error("component {child:?} already has parent {current:?}")]
    Reparent {
        /// The component being adopted.
        child: ComponentId,
        /// Its existing parent.
        current: ComponentId,
    },

    /// The requested parent is the child itself or one of its descendants.
    #[error("component {child:?} cannot be a child of its descendant {parent:?}")]
    CyclicParent {
        /// The component being adopted.
        child: ComponentId,
        /// The requested parent.
        parent: ComponentId,
    },

    /// The operand (or child) already depends on the component, through
    /// children or composition operands, so using it would form a loop.
    #[error("component {operand:?} depends on {component:?} and cannot be part of it")]
    CyclicComposition {
        /// The component that would use `operand`.
        component: ComponentId,
        /// The operand or child being added.
        operand: ComponentId,
    },

    /// No shape, no uncomposed children and no compositions.
    #[error("component {0:?} has no body")]
    Disembodied(ComponentId),

    /// The id does not belong to this assembly (or was never inserted).
    #[error("unknown component {0:?}")]
    UnknownComponent(ComponentId),

    /// The component's shape does not define the requested anchor.
    #[error("component {component:?} has no {anchor:?} anchor")]
    MissingAnchor {
        /// The component asked.
        component: ComponentId,
        /// The anchor requested.
        anchor: Anchor,
    },

    /// A transformation could not be applied.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Degenerate vector arithmetic.
    #[error(transparent)]
    Vector(#[from] VectorError),
}

/// Result type for component operations.
pub type Result<T> = std::result::Result<T, ComponentError>;
