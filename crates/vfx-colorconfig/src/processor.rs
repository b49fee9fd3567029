//! Finalized transform pipelines for applying color conversions.
//!
//! A [`Processor`] wraps a resolved [`TransformSequence`]. It is immutable:
//! its nodes can be inspected (count, order, parameters, direction) and it
//! can be applied to pixels, but not edited.
//!
//! # Example
//!
//! ```
//! use vfx_colorconfig::{ColorSpace, Config, Transform};
//!
//! let mut config = Config::new();
//! config.add_colorspace(ColorSpace::new("linear")).unwrap();
//! config
//!     .add_colorspace(
//!         ColorSpace::builder("gamma 2.2")
//!             .from_reference(Transform::exponent(2.2).inverse())
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let processor = config.processor("gamma 2.2", "linear").unwrap();
//! let mut pixels = [[0.5_f32, 0.5, 0.5]; 4];
//! processor.apply_rgb(&mut pixels);
//! assert!((pixels[0][0] - 0.5_f32.powf(2.2)).abs() < 1e-6);
//! ```

use crate::error::ConfigResult;
use crate::sequence::TransformSequence;
use crate::transform::Transform;

/// Immutable color transform pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Processor {
    sequence: TransformSequence,
}

impl Processor {
    /// Creates an identity processor.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a resolved sequence.
    #[inline]
    pub fn from_sequence(sequence: TransformSequence) -> Self {
        Self { sequence }
    }

    /// Builds a processor from a transform tree.
    pub fn from_transform(transform: &Transform) -> ConfigResult<Self> {
        TransformSequence::from_transform(transform).map(Self::from_sequence)
    }

    /// The underlying sequence.
    #[inline]
    pub fn sequence(&self) -> &TransformSequence {
        &self.sequence
    }

    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Checks if the processor has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Node at `index`.
    #[inline]
    pub fn node(&self, index: usize) -> Option<&Transform> {
        self.sequence.get(index)
    }

    /// All nodes in application order.
    #[inline]
    pub fn nodes(&self) -> &[Transform] {
        self.sequence.nodes()
    }

    /// Iterates nodes in application order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Transform> {
        self.sequence.iter()
    }

    /// Processor applying `self` then `next`.
    #[must_use]
    pub fn then(&self, next: &Processor) -> Self {
        Self::from_sequence(self.sequence.clone().then(next.sequence.clone()))
    }

    /// Processor undoing this one.
    pub fn inverse(&self) -> ConfigResult<Self> {
        self.sequence.inverse().map(Self::from_sequence)
    }

    /// Simplified copy with merged matrices; same numeric result.
    #[must_use]
    pub fn optimized(&self) -> Self {
        Self::from_sequence(self.sequence.optimized())
    }

    /// Checks if the processor reduces to no operations after optimization.
    pub fn is_identity(&self) -> bool {
        self.sequence.optimized().is_empty()
    }

    /// Checks if the processor has no effect on the given samples.
    pub fn is_identity_on(&self, samples: &[[f64; 3]], tol: f64) -> bool {
        self.sequence.is_identity_on(samples, tol)
    }

    /// Evaluates one RGB triple in double precision.
    #[inline]
    pub fn eval_rgb(&self, rgb: [f64; 3]) -> [f64; 3] {
        self.sequence.eval_rgb(rgb)
    }

    /// Applies to RGB pixels in place.
    pub fn apply_rgb(&self, pixels: &mut [[f32; 3]]) {
        if self.is_empty() {
            return;
        }
        for px in pixels {
            let out = self.sequence.eval_rgb([px[0] as f64, px[1] as f64, px[2] as f64]);
            *px = [out[0] as f32, out[1] as f32, out[2] as f32];
        }
    }

    /// Applies to RGBA pixels in place.
    pub fn apply_rgba(&self, pixels: &mut [[f32; 4]]) {
        if self.is_empty() {
            return;
        }
        for px in pixels {
            let mut v = px.map(f64::from);
            self.sequence.apply_rgba(&mut v);
            *px = v.map(|c| c as f32);
        }
    }
}

impl<'a> IntoIterator for &'a Processor {
    type Item = &'a Transform;
    type IntoIter = std::slice::Iter<'a, Transform>;

    fn into_iter(self) -> Self::IntoIter {
        self.sequence.iter()
    }
}
