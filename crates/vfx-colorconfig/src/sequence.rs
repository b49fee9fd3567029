//! Flattened transform pipelines.
//!
//! A [`TransformSequence`] is the executable form of a transform tree: groups
//! and builtin references are expanded, every node carries its resolved
//! direction, and matrices are stored in forward form (an inverse-direction
//! matrix is replaced by its analytic inverse when the sequence is built).
//!
//! Sequences compose end-to-end and invert as
//! `inverse(seq) == reverse(map(inverse, seq))`.
//!
//! # Example
//!
//! ```
//! use vfx_colorconfig::{Transform, TransformSequence};
//!
//! let seq = TransformSequence::from_transform(&Transform::exponent(2.2)).unwrap();
//! let back = seq.inverse().unwrap();
//! let rgb = back.eval_rgb(seq.eval_rgb([0.18, 0.5, 1.0]));
//! assert!((rgb[0] - 0.18).abs() < 1e-12);
//! ```

use tracing::trace;

use crate::builtin_transforms;
use crate::error::ConfigResult;
use crate::transform::{GroupTransform, MatrixTransform, Transform, TransformDirection};

/// Ordered list of leaf transforms with resolved directions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformSequence {
    nodes: Vec<Transform>,
}

impl TransformSequence {
    /// Creates an empty (identity) sequence.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens a transform tree into a sequence.
    pub fn from_transform(transform: &Transform) -> ConfigResult<Self> {
        let mut seq = Self::new();
        seq.push(transform)?;
        Ok(seq)
    }

    /// Appends a transform tree, flattening groups and builtins.
    pub fn push(&mut self, transform: &Transform) -> ConfigResult<()> {
        flatten(transform, TransformDirection::Forward, &mut self.nodes)
    }

    /// Appends all nodes of `other`.
    #[inline]
    pub fn append(&mut self, other: TransformSequence) {
        self.nodes.extend(other.nodes);
    }

    /// Returns `self` followed by `other`.
    #[must_use]
    pub fn then(mut self, other: TransformSequence) -> Self {
        self.append(other);
        self
    }

    /// Returns the inverse pipeline: nodes reversed, each one inverted.
    pub fn inverse(&self) -> ConfigResult<Self> {
        let nodes = self
            .nodes
            .iter()
            .rev()
            .map(|node| match node {
                Transform::Matrix(m) => m.inverted().map(Transform::Matrix),
                other => Ok(other.clone().inverse()),
            })
            .collect::<ConfigResult<Vec<_>>>()?;
        Ok(Self { nodes })
    }

    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Checks if the sequence has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Transform> {
        self.nodes.get(index)
    }

    /// All nodes in application order.
    #[inline]
    pub fn nodes(&self) -> &[Transform] {
        &self.nodes
    }

    /// Iterates nodes in application order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Transform> {
        self.nodes.iter()
    }

    /// Applies the pipeline to one RGBA pixel.
    pub fn apply_rgba(&self, px: &mut [f64; 4]) {
        for node in &self.nodes {
            node.apply_leaf(px);
        }
    }

    /// Evaluates one RGB triple (alpha fixed at 1).
    pub fn eval_rgb(&self, rgb: [f64; 3]) -> [f64; 3] {
        let mut px = [rgb[0], rgb[1], rgb[2], 1.0];
        self.apply_rgba(&mut px);
        [px[0], px[1], px[2]]
    }

    /// Checks that every sample maps onto itself within `tol`.
    pub fn is_identity_on(&self, samples: &[[f64; 3]], tol: f64) -> bool {
        samples.iter().all(|s| {
            let out = self.eval_rgb(*s);
            out.iter().zip(s.iter()).all(|(a, b)| (a - b).abs() <= tol)
        })
    }

    /// Returns a simplified copy.
    ///
    /// Adjacent matrices are multiplied together and identity matrices are
    /// dropped. Output matches the unoptimized sequence up to rounding.
    #[must_use]
    pub fn optimized(&self) -> Self {
        let mut nodes: Vec<Transform> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            match (nodes.last_mut(), node) {
                (Some(Transform::Matrix(prev)), Transform::Matrix(next)) => {
                    *prev = prev.then(next);
                }
                _ => nodes.push(node.clone()),
            }
        }
        nodes.retain(|n| !matches!(n, Transform::Matrix(m) if m.is_identity(1e-12)));
        trace!(before = self.nodes.len(), after = nodes.len(), "optimized sequence");
        Self { nodes }
    }
}

impl<'a> IntoIterator for &'a TransformSequence {
    type Item = &'a Transform;
    type IntoIter = std::slice::Iter<'a, Transform>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// Recursively expands `t` applied in `outer` direction.
fn flatten(t: &Transform, outer: TransformDirection, out: &mut Vec<Transform>) -> ConfigResult<()> {
    let dir = t.direction().combine(outer);
    match t {
        Transform::Group(GroupTransform { transforms, .. }) => flatten_children(transforms, dir, out),
        Transform::Builtin(b) => {
            let ops = builtin_transforms::expand(&b.style)?;
            flatten_children(&ops, dir, out)
        }
        Transform::Matrix(m) => {
            let fwd = MatrixTransform {
                direction: dir,
                ..m.clone()
            }
            .to_forward()?;
            out.push(Transform::Matrix(fwd));
            Ok(())
        }
        leaf => {
            leaf.validate()?;
            out.push(leaf.clone().with_direction(dir));
            Ok(())
        }
    }
}

fn flatten_children(
    children: &[Transform],
    dir: TransformDirection,
    out: &mut Vec<Transform>,
) -> ConfigResult<()> {
    match dir {
        TransformDirection::Forward => children.iter().try_for_each(|c| flatten(c, dir, out)),
        TransformDirection::Inverse => children.iter().rev().try_for_each(|c| flatten(c, dir, out)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin_transforms::{AP0_TO_AP1, AP1_TO_AP0};

    const SAMPLES: [[f64; 3]; 4] = [[0.7, 0.4, 0.02], [0.02, 0.6, 0.2], [0.3, 0.02, 0.5], [1.0, 1.0, 1.0]];

    #[test]
    fn inverse_group_reverses_and_flips() {
        let g = Transform::group(vec![Transform::matrix3(AP0_TO_AP1), Transform::exponent(2.2).inverse()]);
        let seq = TransformSequence::from_transform(&g.inverse()).unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.nodes()[0].kind(), "exponent");
        assert_eq!(seq.nodes()[0].direction(), TransformDirection::Forward);
        match &seq.nodes()[1] {
            Transform::Matrix(m) => {
                assert_eq!(m.direction, TransformDirection::Forward);
                assert!((m.matrix[0] - AP1_TO_AP0[0]).abs() < 1e-9);
            }
            other => panic!("unexpected {}", other.kind()),
        }
    }

    #[test]
    fn builtin_expands_inline() {
        let seq = TransformSequence::from_transform(&Transform::builtin("ACEScct_to_ACES2065-1")).unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.nodes()[0].direction(), TransformDirection::Inverse);

        let inv = TransformSequence::from_transform(&Transform::builtin("ACEScct_to_ACES2065-1").inverse()).unwrap();
        assert_eq!(inv.nodes()[0].kind(), "matrix");
        assert_eq!(inv.nodes()[1].direction(), TransformDirection::Forward);
    }

    #[test]
    fn unknown_builtin_propagates() {
        assert!(TransformSequence::from_transform(&Transform::builtin("nope")).is_err());
    }

    #[test]
    fn inverse_is_reverse_of_inverted_nodes() {
        let mut seq = TransformSequence::new();
        seq.push(&Transform::builtin("ACEScct_to_ACES2065-1")).unwrap();
        seq.push(&Transform::exponent_with_linear(2.4, 0.055).inverse()).unwrap();
        let inv = seq.inverse().unwrap();
        assert_eq!(inv.len(), 3);
        for (a, b) in seq.iter().rev().zip(inv.iter()) {
            assert_eq!(a.kind(), b.kind());
            if !matches!(a, Transform::Matrix(_)) {
                assert_eq!(a.direction().inverse(), b.direction());
            }
        }
        let round = seq.clone().then(inv);
        assert!(round.is_identity_on(&SAMPLES, 1e-9));
    }

    #[test]
    fn optimize_keeps_output() {
        let mut seq = TransformSequence::new();
        seq.push(&Transform::matrix3([2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0])).unwrap();
        seq.push(&Transform::matrix3([0.5, 0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 0.5])).unwrap();
        seq.push(&Transform::exponent(2.0)).unwrap();
        seq.push(&Transform::matrix3(AP0_TO_AP1)).unwrap();
        let opt = seq.optimized();
        assert_eq!(opt.len(), 2);
        for s in SAMPLES {
            let a = seq.eval_rgb(s);
            let b = opt.eval_rgb(s);
            for c in 0..3 {
                assert!((a[c] - b[c]).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn empty_is_identity() {
        let seq = TransformSequence::new();
        assert!(seq.is_empty());
        assert!(seq.is_identity_on(&SAMPLES, 0.0));
        assert!(seq.inverse().unwrap().is_empty());
    }
}
