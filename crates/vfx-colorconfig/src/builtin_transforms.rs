//! Named builtin transforms.
//!
//! A [`BuiltinTransform`](crate::BuiltinTransform) refers to one of these styles
//! by name. Each style expands into forward-ordered leaf transforms so that
//! configs can reference common ACES conversions without spelling out the
//! matrices.

use crate::error::{ConfigError, ConfigResult};
use crate::transform::{LogCameraTransform, MatrixTransform, Transform, TransformDirection};

// ============================================================================
// ACES Matrices
// ============================================================================

/// AP1 (ACEScg) to AP0 (ACES2065-1).
pub const AP1_TO_AP0: [f64; 9] = [
    0.6954522413574519, 0.14067869562909, 0.16386906301345,
    0.04479456337232, 0.85967111403792, 0.09553432258977,
    -0.00552588255811, 0.00402521030597, 1.00150067225214,
];

/// AP0 (ACES2065-1) to AP1 (ACEScg).
pub const AP0_TO_AP1: [f64; 9] = [
    1.45143931607166, -0.23651074688972, -0.21492856918194,
    -0.07655377339067, 1.17622969983357, -0.09967592644290,
    0.00831614842569, -0.00603244979102, 0.99771630136533,
];

/// AP0 to linear Rec.709 primaries (Bradford adapted).
pub const AP0_TO_REC709: [f64; 9] = [
    2.52168618674388, -1.13413098823972, -0.387555198504164,
    -0.276479914229922, 1.37271908766826, -0.096239173438334,
    -0.0153780649660342, -0.152975335867399, 1.16835340083343,
];

/// AP0 to linear P3-D65 primaries.
pub const AP0_TO_P3_D65: [f64; 9] = [
    2.02490528596679, -0.689069761034766, -0.335835524932019,
    -0.183597032256178, 1.28950620775902, -0.105909175502841,
    0.00905856112234766, -0.0592796840575522, 1.0502211229352,
];

/// AP0 to linear Rec.2020 primaries.
pub const AP0_TO_REC2020: [f64; 9] = [
    1.49040952054172, -0.26617091926613, -0.224238601275593,
    -0.0801674998722558, 1.18216712109757, -0.10199962122531,
    0.00322763119162216, -0.0347764757450576, 1.03154884455344,
];

/// ACEScct curve as a log-camera transform (forward encodes).
pub fn acescct_curve() -> LogCameraTransform {
    LogCameraTransform {
        base: 2.0,
        log_side_slope: [1.0 / 17.52; 3],
        log_side_offset: [9.72 / 17.52; 3],
        lin_side_slope: [1.0; 3],
        lin_side_offset: [0.0; 3],
        lin_side_break: [0.0078125; 3],
        linear_slope: None,
        direction: TransformDirection::Forward,
    }
}

fn inverse_matrix(m: [f64; 9]) -> Transform {
    Transform::Matrix(MatrixTransform {
        direction: TransformDirection::Inverse,
        ..MatrixTransform::from_mat3(m)
    })
}

/// Style names understood by [`expand`].
pub const STYLES: &[&str] = &[
    "IDENTITY",
    "ACEScct_to_ACES2065-1",
    "ACEScg_to_ACES2065-1",
    "ACES2065-1_to_ACEScg",
    "Linear_Rec709_to_ACES2065-1",
    "Linear_P3-D65_to_ACES2065-1",
    "Linear_Rec2020_to_ACES2065-1",
];

/// Expands a builtin style into its leaf transforms, in forward order.
///
/// Lookup ignores case and separator characters.
pub fn expand(style: &str) -> ConfigResult<Vec<Transform>> {
    let key = style.to_lowercase().replace(['-', '_', ' ', '.'], "");

    let ops = match key.as_str() {
        "identity" => Vec::new(),
        "acesccttoaces20651" => vec![
            Transform::LogCamera(acescct_curve()).inverse(),
            Transform::matrix3(AP1_TO_AP0),
        ],
        "acescgtoaces20651" => vec![Transform::matrix3(AP1_TO_AP0)],
        "aces20651toacescg" => vec![Transform::matrix3(AP0_TO_AP1)],
        "linearrec709toaces20651" => vec![inverse_matrix(AP0_TO_REC709)],
        "linearp3d65toaces20651" => vec![inverse_matrix(AP0_TO_P3_D65)],
        "linearrec2020toaces20651" => vec![inverse_matrix(AP0_TO_REC2020)],
        _ => {
            return Err(ConfigError::UnknownBuiltinTransform {
                style: style.to_string(),
            });
        }
    };
    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_styles_expand() {
        for style in STYLES {
            assert!(expand(style).is_ok(), "{style}");
        }
    }

    #[test]
    fn lookup_is_lenient() {
        assert_eq!(expand("acescg_to_aces2065_1").unwrap().len(), 1);
        assert_eq!(expand("ACEScct to ACES2065-1").unwrap().len(), 2);
    }

    #[test]
    fn acescct_is_log_then_matrix() {
        let ops = expand("ACEScct_to_ACES2065-1").unwrap();
        match &ops[0] {
            Transform::LogCamera(t) => {
                assert_eq!(t.direction, TransformDirection::Inverse);
                assert!((t.log_side_slope[0] - 0.0570776).abs() < 1e-6);
            }
            other => panic!("unexpected {}", other.kind()),
        }
        assert_eq!(ops[1].kind(), "matrix");
    }

    #[test]
    fn ap0_ap1_are_inverses() {
        let a = MatrixTransform::from_mat3(AP0_TO_AP1);
        let b = MatrixTransform::from_mat3(AP1_TO_AP0);
        assert!(a.then(&b).is_identity(1e-7));
    }

    #[test]
    fn unknown_style() {
        assert!(matches!(
            expand("ARRI_LogC4_to_ACES2065-1"),
            Err(ConfigError::UnknownBuiltinTransform { .. })
        ));
    }
}
