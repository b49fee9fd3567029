//! Transform definitions for color space conversions.
//!
//! A color space describes its relation to the reference space with a tree of
//! transforms. Leaves are numeric operators:
//! - Matrix transforms (primaries conversion)
//! - Log-affine and log-camera encodings
//! - Pure power functions
//! - Power functions with a linear toe (sRGB-style curves)
//!
//! Leaves can be chained via [`GroupTransform`] or referenced by name via
//! [`BuiltinTransform`]. Every leaf has an exact analytic inverse.
//!
//! # Example
//!
//! ```
//! use vfx_colorconfig::{Transform, TransformDirection};
//!
//! let t = Transform::exponent(2.2).inverse();
//! assert_eq!(t.direction(), TransformDirection::Inverse);
//! ```

use glam::DMat4;

use crate::error::{ConfigError, ConfigResult};

/// Smallest value fed into a logarithm.
const LOG_MIN: f64 = f64::MIN_POSITIVE;

/// Transform application direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransformDirection {
    /// Forward transform.
    #[default]
    Forward,
    /// Inverse transform.
    Inverse,
}

impl TransformDirection {
    /// Returns the opposite direction.
    #[inline]
    pub fn inverse(self) -> Self {
        match self {
            Self::Forward => Self::Inverse,
            Self::Inverse => Self::Forward,
        }
    }

    /// Combines two directions: applying `other` on top of `self`.
    #[inline]
    pub fn combine(self, other: Self) -> Self {
        if self == other {
            Self::Forward
        } else {
            Self::Inverse
        }
    }

    /// Parses a config direction string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "forward" => Some(Self::Forward),
            "inverse" => Some(Self::Inverse),
            _ => None,
        }
    }

    /// Returns config string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Inverse => "inverse",
        }
    }
}

/// Negative value handling for power functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NegativeStyle {
    /// Clamp negatives to zero.
    #[default]
    Clamp,
    /// Mirror: sign * pow(abs(x), exp).
    Mirror,
    /// Pass negatives through unchanged.
    PassThru,
    /// Continue the linear segment below zero.
    Linear,
}

impl NegativeStyle {
    /// Parses negative style from config string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "clamp" => Some(Self::Clamp),
            "mirror" => Some(Self::Mirror),
            "pass_thru" | "passthru" => Some(Self::PassThru),
            "linear" => Some(Self::Linear),
            _ => None,
        }
    }
}

/// Color transform definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// 4x4 matrix with offset.
    Matrix(MatrixTransform),
    /// Affine log encoding.
    LogAffine(LogAffineTransform),
    /// Log encoding with a linear toe.
    LogCamera(LogCameraTransform),
    /// Exponent/gamma.
    Exponent(ExponentTransform),
    /// Gamma with linear segment near black.
    ExponentWithLinear(ExponentWithLinearTransform),
    /// Group of chained transforms.
    Group(GroupTransform),
    /// Builtin transform by name.
    Builtin(BuiltinTransform),
}

impl Transform {
    /// Creates a matrix transform from a row-major 4x4 array.
    pub fn matrix(m: [f64; 16]) -> Self {
        Self::Matrix(MatrixTransform::new(m))
    }

    /// Creates a matrix transform from a row-major 3x3 array.
    pub fn matrix3(m: [f64; 9]) -> Self {
        Self::Matrix(MatrixTransform::from_mat3(m))
    }

    /// Creates a forward exponent transform with the same value on RGB.
    pub fn exponent(value: f64) -> Self {
        Self::Exponent(ExponentTransform {
            value: [value, value, value, 1.0],
            negative_style: NegativeStyle::Clamp,
            direction: TransformDirection::Forward,
        })
    }

    /// Creates a forward exponent-with-linear transform with the same values on RGB.
    pub fn exponent_with_linear(gamma: f64, offset: f64) -> Self {
        Self::ExponentWithLinear(ExponentWithLinearTransform {
            gamma: [gamma, gamma, gamma, 1.0],
            offset: [offset, offset, offset, 0.0],
            negative_style: NegativeStyle::Linear,
            direction: TransformDirection::Forward,
        })
    }

    /// Creates a group transform.
    pub fn group(transforms: Vec<Transform>) -> Self {
        Self::Group(GroupTransform {
            transforms,
            direction: TransformDirection::Forward,
        })
    }

    /// Creates a builtin transform reference.
    pub fn builtin(style: impl Into<String>) -> Self {
        Self::Builtin(BuiltinTransform {
            style: style.into(),
            direction: TransformDirection::Forward,
        })
    }

    /// Returns the declared direction.
    pub fn direction(&self) -> TransformDirection {
        match self {
            Self::Matrix(t) => t.direction,
            Self::LogAffine(t) => t.direction,
            Self::LogCamera(t) => t.direction,
            Self::Exponent(t) => t.direction,
            Self::ExponentWithLinear(t) => t.direction,
            Self::Group(t) => t.direction,
            Self::Builtin(t) => t.direction,
        }
    }

    /// Returns a copy with the given direction.
    pub fn with_direction(mut self, direction: TransformDirection) -> Self {
        match &mut self {
            Self::Matrix(t) => t.direction = direction,
            Self::LogAffine(t) => t.direction = direction,
            Self::LogCamera(t) => t.direction = direction,
            Self::Exponent(t) => t.direction = direction,
            Self::ExponentWithLinear(t) => t.direction = direction,
            Self::Group(t) => t.direction = direction,
            Self::Builtin(t) => t.direction = direction,
        }
        self
    }

    /// Returns the inverse of this transform.
    ///
    /// Only the direction flag changes. An inverse group is applied as its
    /// children reversed and individually inverted when flattened.
    pub fn inverse(self) -> Self {
        let dir = self.direction().inverse();
        self.with_direction(dir)
    }

    /// Checks if this is a numeric leaf (not a group or builtin reference).
    #[inline]
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Self::Group(_) | Self::Builtin(_))
    }

    /// Short operator name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Matrix(_) => "matrix",
            Self::LogAffine(_) => "log_affine",
            Self::LogCamera(_) => "log_camera",
            Self::Exponent(_) => "exponent",
            Self::ExponentWithLinear(_) => "exponent_with_linear",
            Self::Group(_) => "group",
            Self::Builtin(_) => "builtin",
        }
    }

    /// Checks that the parameters describe an invertible operator.
    ///
    /// Groups are checked recursively. Builtin styles are resolved when the
    /// transform is flattened, and matrices when they are inverted.
    pub fn validate(&self) -> ConfigResult<()> {
        match self {
            Self::Matrix(_) | Self::Builtin(_) => Ok(()),
            Self::LogAffine(t) => t.validate(),
            Self::LogCamera(t) => t.validate(),
            Self::Exponent(t) => t.validate(),
            Self::ExponentWithLinear(t) => t.validate(),
            Self::Group(g) => g.transforms.iter().try_for_each(Transform::validate),
        }
    }

    /// Applies a leaf to one RGBA pixel.
    ///
    /// Groups and builtin references are not evaluated here; flatten them into
    /// a [`crate::TransformSequence`] first. Matrices are applied as stored.
    pub(crate) fn apply_leaf(&self, px: &mut [f64; 4]) {
        match self {
            Self::Matrix(t) => t.apply(px),
            Self::LogAffine(t) => t.apply(px),
            Self::LogCamera(t) => t.apply(px),
            Self::Exponent(t) => t.apply(px),
            Self::ExponentWithLinear(t) => t.apply(px),
            Self::Group(_) | Self::Builtin(_) => {}
        }
    }
}

/// 4x4 matrix + offset transform.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixTransform {
    /// 4x4 matrix in row-major order.
    pub matrix: [f64; 16],
    /// RGBA offset.
    pub offset: [f64; 4],
    /// Direction.
    pub direction: TransformDirection,
}

impl MatrixTransform {
    /// Identity matrix.
    pub const IDENTITY: [f64; 16] = [
        1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
    ];

    /// Creates a forward matrix without offset.
    pub fn new(matrix: [f64; 16]) -> Self {
        Self {
            matrix,
            offset: [0.0; 4],
            direction: TransformDirection::Forward,
        }
    }

    /// Expands a row-major 3x3 matrix to 4x4 with alpha passthrough.
    pub fn from_mat3(m: [f64; 9]) -> Self {
        Self::new([
            m[0], m[1], m[2], 0.0, m[3], m[4], m[5], 0.0, m[6], m[7], m[8], 0.0, 0.0, 0.0, 0.0,
            1.0,
        ])
    }

    /// Checks if matrix and offset are identity within tolerance.
    pub fn is_identity(&self, tol: f64) -> bool {
        self.matrix
            .iter()
            .zip(Self::IDENTITY.iter())
            .all(|(a, b)| (a - b).abs() <= tol)
            && self.offset.iter().all(|o| o.abs() <= tol)
    }

    /// Checks if the RGB block mixes channels by more than `threshold`.
    pub fn has_off_diagonal(&self, threshold: f64) -> bool {
        (0..3).any(|r| (0..3).any(|c| r != c && self.matrix[r * 4 + c].abs() > threshold))
    }

    /// Returns the analytic inverse as a forward matrix.
    ///
    /// `y = M·x + o` inverts to `x = M⁻¹·y - M⁻¹·o`.
    pub fn inverted(&self) -> ConfigResult<Self> {
        // glam is column-major; loading row-major data gives the transpose,
        // and inverse(transpose(M)) == transpose(inverse(M)).
        let m = DMat4::from_cols_array(&self.matrix);
        let det = m.determinant();
        if !det.is_finite() || det.abs() < 1e-12 {
            return Err(ConfigError::InvalidTransform {
                reason: format!("matrix is singular (det = {det:e})"),
            });
        }
        let matrix = m.inverse().to_cols_array();
        let mut offset = [0.0; 4];
        for (r, out) in offset.iter_mut().enumerate() {
            *out = -(0..4).map(|c| matrix[r * 4 + c] * self.offset[c]).sum::<f64>();
        }
        Ok(Self {
            matrix,
            offset,
            direction: TransformDirection::Forward,
        })
    }

    /// Returns an equivalent matrix with forward direction.
    pub fn to_forward(&self) -> ConfigResult<Self> {
        match self.direction {
            TransformDirection::Forward => Ok(self.clone()),
            TransformDirection::Inverse => {
                let mut fwd = self.clone();
                fwd.direction = TransformDirection::Forward;
                fwd.inverted()
            }
        }
    }

    /// Composes `self` followed by `next`. Both must be forward.
    pub fn then(&self, next: &Self) -> Self {
        let a = &self.matrix;
        let b = &next.matrix;
        let mut matrix = [0.0; 16];
        for r in 0..4 {
            for c in 0..4 {
                matrix[r * 4 + c] = (0..4).map(|k| b[r * 4 + k] * a[k * 4 + c]).sum();
            }
        }
        let mut offset = [0.0; 4];
        for (r, out) in offset.iter_mut().enumerate() {
            *out = (0..4).map(|k| b[r * 4 + k] * self.offset[k]).sum::<f64>() + next.offset[r];
        }
        Self {
            matrix,
            offset,
            direction: TransformDirection::Forward,
        }
    }

    /// Applies matrix and offset as stored, ignoring direction.
    #[inline]
    pub fn apply(&self, px: &mut [f64; 4]) {
        let m = &self.matrix;
        let x = *px;
        for (r, out) in px.iter_mut().enumerate() {
            *out = m[r * 4] * x[0]
                + m[r * 4 + 1] * x[1]
                + m[r * 4 + 2] * x[2]
                + m[r * 4 + 3] * x[3]
                + self.offset[r];
        }
    }
}

/// Affine log transform.
///
/// Forward (lin to log): `y = log_slope * log_base(lin_slope * x + lin_offset) + log_offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogAffineTransform {
    /// Logarithm base.
    pub base: f64,
    /// Per-channel log side slope.
    pub log_side_slope: [f64; 3],
    /// Per-channel log side offset.
    pub log_side_offset: [f64; 3],
    /// Per-channel linear side slope.
    pub lin_side_slope: [f64; 3],
    /// Per-channel linear side offset.
    pub lin_side_offset: [f64; 3],
    /// Direction.
    pub direction: TransformDirection,
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::InvalidTransform { reason }
}

fn check_base(base: f64) -> ConfigResult<()> {
    if base.is_finite() && base > 0.0 && base != 1.0 {
        Ok(())
    } else {
        Err(invalid(format!("log base must be positive and not 1, got {base}")))
    }
}

fn check_nonzero(what: &str, values: &[f64]) -> ConfigResult<()> {
    match values.iter().find(|v| !v.is_finite() || **v == 0.0) {
        Some(v) => Err(invalid(format!("{what} must be finite and non-zero, got {v}"))),
        None => Ok(()),
    }
}

impl LogAffineTransform {
    /// Plain `log_base(x)`.
    pub fn with_base(base: f64) -> Self {
        Self {
            base,
            log_side_slope: [1.0; 3],
            log_side_offset: [0.0; 3],
            lin_side_slope: [1.0; 3],
            lin_side_offset: [0.0; 3],
            direction: TransformDirection::Forward,
        }
    }

    /// Rejects a degenerate base or zero slopes.
    pub fn validate(&self) -> ConfigResult<()> {
        check_base(self.base)?;
        check_nonzero("log side slope", &self.log_side_slope)?;
        check_nonzero("lin side slope", &self.lin_side_slope)
    }

    #[inline]
    fn encode(&self, i: usize, x: f64) -> f64 {
        let v = (self.lin_side_slope[i] * x + self.lin_side_offset[i]).max(LOG_MIN);
        self.log_side_slope[i] * v.ln() / self.base.ln() + self.log_side_offset[i]
    }

    #[inline]
    fn decode(&self, i: usize, y: f64) -> f64 {
        let e = (y - self.log_side_offset[i]) / self.log_side_slope[i];
        (self.base.powf(e) - self.lin_side_offset[i]) / self.lin_side_slope[i]
    }

    /// Applies to RGB; alpha unchanged.
    pub fn apply(&self, px: &mut [f64; 4]) {
        for (i, v) in px.iter_mut().take(3).enumerate() {
            *v = match self.direction {
                TransformDirection::Forward => self.encode(i, *v),
                TransformDirection::Inverse => self.decode(i, *v),
            };
        }
    }
}

/// Log transform with a linear segment below `lin_side_break`.
///
/// Used by camera log curves such as ACEScct.
#[derive(Debug, Clone, PartialEq)]
pub struct LogCameraTransform {
    /// Logarithm base.
    pub base: f64,
    /// Per-channel log side slope.
    pub log_side_slope: [f64; 3],
    /// Per-channel log side offset.
    pub log_side_offset: [f64; 3],
    /// Per-channel linear side slope.
    pub lin_side_slope: [f64; 3],
    /// Per-channel linear side offset.
    pub lin_side_offset: [f64; 3],
    /// Per-channel break point on the linear side.
    pub lin_side_break: [f64; 3],
    /// Slope of the linear segment; derived for continuity when `None`.
    pub linear_slope: Option<[f64; 3]>,
    /// Direction.
    pub direction: TransformDirection,
}

impl LogCameraTransform {
    /// Rejects a degenerate base, zero slopes or a break outside the log domain.
    pub fn validate(&self) -> ConfigResult<()> {
        check_base(self.base)?;
        check_nonzero("log side slope", &self.log_side_slope)?;
        check_nonzero("lin side slope", &self.lin_side_slope)?;
        if let Some(slope) = &self.linear_slope {
            check_nonzero("linear slope", slope)?;
        }
        for i in 0..3 {
            let at_break = self.lin_side_slope[i] * self.lin_side_break[i] + self.lin_side_offset[i];
            if !(at_break.is_finite() && at_break > 0.0) {
                return Err(invalid(format!(
                    "lin side break {} falls outside the log domain",
                    self.lin_side_break[i]
                )));
            }
        }
        Ok(())
    }

    #[inline]
    fn log_segment(&self, i: usize, x: f64) -> f64 {
        let v = (self.lin_side_slope[i] * x + self.lin_side_offset[i]).max(LOG_MIN);
        self.log_side_slope[i] * v.ln() / self.base.ln() + self.log_side_offset[i]
    }

    /// Slope and offset of the linear segment for channel `i`.
    fn linear_segment(&self, i: usize) -> (f64, f64) {
        let brk = self.lin_side_break[i];
        let slope = match self.linear_slope {
            Some(s) => s[i],
            None => {
                self.log_side_slope[i] * self.lin_side_slope[i]
                    / ((self.lin_side_slope[i] * brk + self.lin_side_offset[i])
                        * self.base.ln())
            }
        };
        let offset = self.log_segment(i, brk) - slope * brk;
        (slope, offset)
    }

    #[inline]
    fn encode(&self, i: usize, x: f64) -> f64 {
        if x > self.lin_side_break[i] {
            self.log_segment(i, x)
        } else {
            let (s, o) = self.linear_segment(i);
            s * x + o
        }
    }

    #[inline]
    fn decode(&self, i: usize, y: f64) -> f64 {
        let log_break = self.log_segment(i, self.lin_side_break[i]);
        if y > log_break {
            let e = (y - self.log_side_offset[i]) / self.log_side_slope[i];
            (self.base.powf(e) - self.lin_side_offset[i]) / self.lin_side_slope[i]
        } else {
            let (s, o) = self.linear_segment(i);
            (y - o) / s
        }
    }

    /// Applies to RGB; alpha unchanged.
    pub fn apply(&self, px: &mut [f64; 4]) {
        for (i, v) in px.iter_mut().take(3).enumerate() {
            *v = match self.direction {
                TransformDirection::Forward => self.encode(i, *v),
                TransformDirection::Inverse => self.decode(i, *v),
            };
        }
    }
}

/// Exponent/gamma transform: forward is `x^value`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentTransform {
    /// Per-channel exponents [R, G, B, A].
    pub value: [f64; 4],
    /// Negative handling style.
    pub negative_style: NegativeStyle,
    /// Direction.
    pub direction: TransformDirection,
}

impl ExponentTransform {
    /// Rejects zero or non-finite exponents.
    pub fn validate(&self) -> ConfigResult<()> {
        check_nonzero("exponent", &self.value)
    }

    /// Applies to all four channels.
    pub fn apply(&self, px: &mut [f64; 4]) {
        for (v, &e) in px.iter_mut().zip(self.value.iter()) {
            let e = match self.direction {
                TransformDirection::Forward => e,
                TransformDirection::Inverse => 1.0 / e,
            };
            *v = match self.negative_style {
                NegativeStyle::Mirror => v.signum() * v.abs().powf(e),
                // No linear segment on a pure power, negatives pass through.
                NegativeStyle::PassThru | NegativeStyle::Linear if *v < 0.0 => *v,
                _ => v.max(0.0).powf(e),
            };
        }
    }
}

/// Power function with a linear segment near zero (moncurve).
///
/// Forward decodes: `((x + offset) / (1 + offset))^gamma` above the break,
/// a straight line through the origin below it. RGB only.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentWithLinearTransform {
    /// Per-channel gamma [R, G, B, A].
    pub gamma: [f64; 4],
    /// Per-channel offset [R, G, B, A].
    pub offset: [f64; 4],
    /// Negative handling, `Linear` or `Mirror`.
    pub negative_style: NegativeStyle,
    /// Direction.
    pub direction: TransformDirection,
}

impl ExponentWithLinearTransform {
    /// Requires `gamma > 1` and `offset > 0` on RGB, where the linear segment exists.
    pub fn validate(&self) -> ConfigResult<()> {
        for i in 0..3 {
            let (g, o) = (self.gamma[i], self.offset[i]);
            if !(g.is_finite() && g > 1.0 && o.is_finite() && o > 0.0) {
                return Err(invalid(format!(
                    "exponent with linear needs gamma > 1 and offset > 0, got gamma {g} offset {o}"
                )));
            }
        }
        Ok(())
    }

    /// Encoded break point and linear slope for channel `i`.
    fn params(&self, i: usize) -> (f64, f64) {
        let g = self.gamma[i];
        let o = self.offset[i];
        let brk = o / (g - 1.0);
        let slope = (o * g / ((g - 1.0) * (1.0 + o))).powf(g) / brk;
        (brk, slope)
    }

    #[inline]
    fn decode(&self, i: usize, x: f64) -> f64 {
        let (brk, slope) = self.params(i);
        if x >= brk {
            ((x + self.offset[i]) / (1.0 + self.offset[i])).powf(self.gamma[i])
        } else {
            x * slope
        }
    }

    #[inline]
    fn encode(&self, i: usize, y: f64) -> f64 {
        let (brk, slope) = self.params(i);
        if y >= brk * slope {
            (1.0 + self.offset[i]) * y.powf(1.0 / self.gamma[i]) - self.offset[i]
        } else {
            y / slope
        }
    }

    /// Applies to RGB; alpha unchanged.
    pub fn apply(&self, px: &mut [f64; 4]) {
        for (i, v) in px.iter_mut().take(3).enumerate() {
            let (sign, x) = match self.negative_style {
                NegativeStyle::Mirror => (v.signum(), v.abs()),
                _ => (1.0, *v),
            };
            let y = match self.direction {
                TransformDirection::Forward => self.decode(i, x),
                TransformDirection::Inverse => self.encode(i, x),
            };
            *v = sign * y;
        }
    }
}

/// Group of chained transforms.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTransform {
    /// Ordered list of transforms.
    pub transforms: Vec<Transform>,
    /// Direction (inverse applies children reversed and inverted).
    pub direction: TransformDirection,
}

/// Builtin transform by style name (e.g. "ACEScct_to_ACES2065-1").
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltinTransform {
    /// Builtin style name.
    pub style: String,
    /// Direction.
    pub direction: TransformDirection,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(t: &Transform, rgb: [f64; 3]) -> [f64; 3] {
        let mut px = [rgb[0], rgb[1], rgb[2], 1.0];
        t.apply_leaf(&mut px);
        [px[0], px[1], px[2]]
    }

    #[test]
    fn direction_inverse() {
        assert_eq!(TransformDirection::Forward.inverse(), TransformDirection::Inverse);
        assert_eq!(TransformDirection::Inverse.inverse(), TransformDirection::Forward);
        assert_eq!(
            TransformDirection::Inverse.combine(TransformDirection::Inverse),
            TransformDirection::Forward
        );
    }

    #[test]
    fn group_inverse_flips_direction_only() {
        let g = Transform::group(vec![Transform::matrix(MatrixTransform::IDENTITY), Transform::exponent(2.2)]);
        let Transform::Group(inv) = g.inverse() else {
            panic!("expected group");
        };
        assert_eq!(inv.direction, TransformDirection::Inverse);
        assert_eq!(inv.transforms[0].kind(), "matrix");
        assert_eq!(inv.transforms[1].direction(), TransformDirection::Forward);
    }

    #[test]
    fn matrix_inverse_with_offset() {
        let mut m = MatrixTransform::from_mat3([2.0, 0.0, 0.0, 0.0, 4.0, 0.0, 0.0, 0.0, 0.5]);
        m.offset = [1.0, 2.0, 3.0, 0.0];
        let inv = m.inverted().unwrap();
        let mut px = [0.3, 0.6, 0.9, 1.0];
        m.apply(&mut px);
        inv.apply(&mut px);
        assert!((px[0] - 0.3).abs() < 1e-12);
        assert!((px[1] - 0.6).abs() < 1e-12);
        assert!((px[2] - 0.9).abs() < 1e-12);
        assert!(m.then(&inv).is_identity(1e-12));
    }

    #[test]
    fn singular_matrix_fails() {
        let m = MatrixTransform::from_mat3([1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 0.0, 1.0]);
        assert!(matches!(m.inverted(), Err(ConfigError::InvalidTransform { .. })));
    }

    #[test]
    fn exponent_round_trip() {
        let fwd = Transform::exponent(2.2);
        let inv = fwd.clone().inverse();
        let out = run(&inv, run(&fwd, [0.18, 0.5, 0.9]));
        assert!((out[0] - 0.18).abs() < 1e-12);
        assert!((out[2] - 0.9).abs() < 1e-12);
        assert_eq!(run(&fwd, [-0.5, 0.0, 1.0])[0], 0.0);
    }

    #[test]
    fn srgb_curve_values() {
        // Forward decodes sRGB.
        let t = Transform::exponent_with_linear(2.4, 0.055);
        let lin = run(&t, [0.5, 0.02, 1.0]);
        assert!((lin[0] - 0.214041).abs() < 1e-5);
        assert!((lin[1] - 0.02 / 12.923210180787857).abs() < 1e-9);
        assert!((lin[2] - 1.0).abs() < 1e-12);
        let enc = run(&t.inverse(), lin);
        assert!((enc[0] - 0.5).abs() < 1e-9);
        assert!((enc[1] - 0.02).abs() < 1e-9);
    }

    #[test]
    fn log_camera_continuity() {
        let t = LogCameraTransform {
            base: 2.0,
            log_side_slope: [1.0 / 17.52; 3],
            log_side_offset: [9.72 / 17.52; 3],
            lin_side_slope: [1.0; 3],
            lin_side_offset: [0.0; 3],
            lin_side_break: [0.0078125; 3],
            linear_slope: None,
            direction: TransformDirection::Forward,
        };
        let (slope, offset) = t.linear_segment(0);
        // ACEScct toe constants.
        assert!((slope - 10.5402377416545).abs() < 1e-9);
        assert!((offset - 0.0729055341958355).abs() < 1e-9);
        let below = t.encode(0, 0.0078125 - 1e-9);
        let above = t.encode(0, 0.0078125 + 1e-9);
        assert!((below - above).abs() < 1e-6);
        for x in [-0.01, 0.0, 0.005, 0.18, 1.0, 100.0] {
            assert!((t.decode(0, t.encode(0, x)) - x).abs() < 1e-9 * x.abs().max(1.0));
        }
    }

    #[test]
    fn log_affine_base10() {
        let mut t = LogAffineTransform::with_base(10.0);
        let mut px = [100.0, 1.0, 0.1, 0.5];
        t.apply(&mut px);
        assert!((px[0] - 2.0).abs() < 1e-12);
        assert!(px[1].abs() < 1e-12);
        assert!((px[2] + 1.0).abs() < 1e-12);
        assert_eq!(px[3], 0.5);
        t.direction = TransformDirection::Inverse;
        t.apply(&mut px);
        assert!((px[0] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_parameters_rejected() {
        assert!(Transform::exponent(2.2).validate().is_ok());
        assert!(Transform::exponent(0.0).validate().is_err());
        assert!(Transform::exponent_with_linear(2.4, 0.055).validate().is_ok());
        assert!(Transform::exponent_with_linear(1.0, 0.0).validate().is_err());
        assert!(Transform::exponent_with_linear(2.4, 0.0).validate().is_err());
        assert!(LogAffineTransform::with_base(1.0).validate().is_err());
        assert!(LogAffineTransform::with_base(10.0).validate().is_ok());

        let mut cam = crate::builtin_transforms::acescct_curve();
        assert!(cam.validate().is_ok());
        cam.lin_side_offset = [-1.0; 3];
        assert!(matches!(cam.validate(), Err(ConfigError::InvalidTransform { .. })));

        let group = Transform::group(vec![Transform::exponent(2.2), Transform::exponent(0.0)]);
        assert!(group.validate().is_err());
    }
}
