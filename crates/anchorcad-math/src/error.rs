//! Error types for vector operations.

use thiserror::Error;

use crate::Vector;

/// Degenerate-geometry conditions raised by [`Vector`] operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VectorError {
    /// The components would give the vector an undefined magnitude.
    #[error("vector {components:?} has a NaN magnitude")]
    NaN {
        /// The offending components.
        components: [f64; 3],
    },

    /// A normal was sought for a zero-magnitude vector.
    #[error("no normal exists between null vector {null} and {other}")]
    NoNormalForNulls {
        /// The smaller-magnitude (null) vector.
        null: Vector,
        /// The larger-magnitude vector.
        other: Vector,
    },

    /// A normal was sought for two parallel vectors.
    #[error("no normal exists between parallel vectors {left} and {right}")]
    NoNormalForParallels {
        /// The vector `normal` was called on.
        left: Vector,
        /// The argument to `normal`.
        right: Vector,
    },

    /// A normal was sought for two antiparallel vectors.
    #[error("no normal exists between antiparallel vectors {left} and {right}")]
    NoNormalForAntiparallels {
        /// The vector `normal` was called on.
        left: Vector,
        /// The argument to `normal`.
        right: Vector,
    },

    /// None of the world axes is independent of the vector.
    #[error("no arbitrary normal exists for {vector}")]
    NoArbitraryNormal {
        /// The vector without an arbitrary normal.
        vector: Vector,
    },
}

impl VectorError {
    /// True for the parallel and antiparallel cases, where the normal is
    /// undefined because the two vectors are colinear.
    pub fn is_colinear(&self) -> bool {
        matches!(
            self,
            Self::NoNormalForParallels { .. } | Self::NoNormalForAntiparallels { .. }
        )
    }
}
