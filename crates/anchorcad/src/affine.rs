//! The two ways a value can receive affine transformations.
//!
//! A [`Holonomic`] value is changed by each transformation it receives and
//! keeps no memory of them: a [`Connector`](crate::Connector) is moved in
//! place. A [`Historical`] value records its transformations instead, and
//! replays them on demand, either onto a holonomic value or as wrappers
//! around a body expression.

use anchorcad_ir::Body;
use anchorcad_math::Vector;

use crate::error::TransformError;
use crate::transform::{AffineTransformation, Rotation};

/// A value that is directly changed by transformations.
pub trait Holonomic: Sized {
    /// Move by `offset`.
    fn translate(self, offset: &Vector) -> Result<Self, TransformError>;

    /// Rotate about the origin.
    fn rotate(self, rotation: &Rotation) -> Result<Self, TransformError>;

    /// Scale by `factor` per axis.
    fn scale(self, factor: &Vector) -> Result<Self, TransformError>;

    /// Apply one transformation.
    fn apply(self, transformation: &AffineTransformation) -> Result<Self, TransformError> {
        match transformation {
            AffineTransformation::Translate { offset } => self.translate(offset),
            AffineTransformation::Rotate(rotation) => self.rotate(rotation),
            AffineTransformation::Scale { factor } => self.scale(factor),
        }
    }

    /// Apply transformations in order; the first is applied first.
    fn transform<'a, I>(self, transformations: I) -> Result<Self, TransformError>
    where
        I: IntoIterator<Item = &'a AffineTransformation>,
    {
        transformations
            .into_iter()
            .try_fold(self, |value, t| value.apply(t))
    }
}

/// A value that records transformations rather than being changed by them.
pub trait Historical {
    /// Iterator over the effective transformation sequence.
    type Transformations<'a>: Iterator<Item = &'a AffineTransformation> + Clone
    where
        Self: 'a;

    /// The effective sequence, first-applied first.
    fn transformations(&self) -> Self::Transformations<'_>;

    /// Replay the sequence onto a holonomic value.
    fn transformed<T: Holonomic>(&self, target: T) -> Result<T, TransformError> {
        target.transform(self.transformations())
    }

    /// Wrap `body` in one transform node per transformation; the first
    /// becomes the innermost wrap.
    fn wrapped(&self, body: Body) -> Body {
        self.transformations()
            .fold(body, |body, t| body.transformed(t.to_ir()))
    }

    /// True when both effective sequences have the same length and are
    /// pairwise equal.
    fn same_transformations<H: Historical + ?Sized>(&self, other: &H) -> bool {
        self.transformations().eq(other.transformations())
    }
}
