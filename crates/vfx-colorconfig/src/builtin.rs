//! Builtin catalog of well-known color spaces.
//!
//! The catalog is a read-only [`Config`] describing common CG working and
//! texture spaces relative to ACES2065-1. Heuristic resolution matches user
//! configs against it. A process-wide instance is available through
//! [`BuiltinCatalog::global`].
//!
//! # Example
//!
//! ```
//! use vfx_colorconfig::BuiltinCatalog;
//!
//! let catalog = BuiltinCatalog::global();
//! let cs = catalog.colorspace("Utility - Gamma 2.2 - AP1 - Texture").unwrap();
//! assert_eq!(cs.name(), "Gamma 2.2 AP1 - Texture");
//! ```

use std::sync::OnceLock;

use crate::builtin_transforms::AP0_TO_REC709;
use crate::colorspace::{ColorSpace, ColorSpaceDirection};
use crate::config::Config;
use crate::role::{names, Roles};
use crate::transform::{NegativeStyle, Transform};

/// Linear spaces the heuristics try as candidate reference spaces, in order.
pub const LINEAR_SPACES: [&str; 5] = [
    "ACES2065-1",
    "ACEScg",
    "Linear Rec.709 (sRGB)",
    "Linear P3-D65",
    "Linear Rec.2020",
];

/// Name of the catalog's sRGB texture space.
pub const SRGB_TEXTURE: &str = "sRGB - Texture";

/// AP0 to AP1 as published in the CG config texture spaces.
const AP0_TO_AP1_TEXTURE: [f64; 9] = [
    1.45143931614567, -0.23651074689374, -0.214928569251925,
    -0.0765537733960206, 1.17622969983357, -0.0996759264375522,
    0.00831614842569772, -0.00603244979102102, 0.997716301365323,
];

static GLOBAL: OnceLock<BuiltinCatalog> = OnceLock::new();

/// Immutable catalog of reference color spaces.
#[derive(Debug, Clone)]
pub struct BuiltinCatalog {
    config: Config,
}

impl BuiltinCatalog {
    /// Wraps an externally supplied config as a catalog.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns the process-wide CG catalog.
    pub fn global() -> &'static BuiltinCatalog {
        GLOBAL.get_or_init(Self::cg)
    }

    /// Builds the CG catalog.
    pub fn cg() -> Self {
        let mut roles = Roles::new();
        roles.define(names::ACES_INTERCHANGE, "ACES2065-1");
        roles.define(names::SCENE_LINEAR, "ACEScg");
        roles.define(names::COLOR_TIMING, "ACEScct");
        roles.define(names::COMPOSITING_LOG, "ACEScct");
        roles.define(names::TEXTURE_PAINT, "ACEScct");
        roles.define(names::DATA, "Raw");
        roles.define(names::DEFAULT, SRGB_TEXTURE);

        Self::new(Config::from_parts("cg-config", cg_colorspaces(), roles))
    }

    /// The catalog contents.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Looks up a catalog space by name, alias or role.
    #[inline]
    pub fn colorspace(&self, name: &str) -> Option<&ColorSpace> {
        self.config.colorspace(name)
    }
}

/// Scene-referred space with a builtin to-reference transform.
fn scene(name: &str, aliases: &[&str], family: &str, encoding: &str, to_ref: Transform) -> ColorSpace {
    let mut cs = ColorSpace::new(name);
    for alias in aliases {
        cs.add_alias(*alias);
    }
    cs.set_family(family);
    cs.set_encoding(encoding);
    cs.add_category("file-io");
    cs.set_transform(ColorSpaceDirection::ToReference, Some(to_ref));
    cs
}

/// Texture space: primaries matrix then an encoding curve, from reference.
fn texture(name: &str, aliases: &[&str], matrix: [f64; 9], curve: Transform) -> ColorSpace {
    let mut cs = ColorSpace::new(name);
    for alias in aliases {
        cs.add_alias(*alias);
    }
    cs.set_family("Utility");
    cs.set_encoding("sdr-video");
    cs.add_category("file-io");
    cs.add_category("texture");
    cs.set_transform(
        ColorSpaceDirection::FromReference,
        Some(Transform::group(vec![Transform::matrix3(matrix), curve])),
    );
    cs
}

fn gamma(value: f64) -> Transform {
    match Transform::exponent(value).inverse() {
        Transform::Exponent(mut t) => {
            t.negative_style = NegativeStyle::PassThru;
            Transform::Exponent(t)
        }
        other => other,
    }
}

fn srgb_curve() -> Transform {
    Transform::exponent_with_linear(2.4, 0.055).inverse()
}

fn cg_colorspaces() -> Vec<ColorSpace> {
    let mut aces = ColorSpace::new("ACES2065-1");
    aces.add_alias("aces2065_1");
    aces.add_alias("ACES - ACES2065-1");
    aces.add_alias("lin_ap0");
    aces.set_family("ACES");
    aces.set_encoding("scene-linear");
    aces.set_description("The \"Academy Color Encoding System\" reference color space");
    aces.add_category("file-io");

    let mut raw = ColorSpace::new("Raw");
    raw.add_alias("Utility - Raw");
    raw.set_family("Utility");
    raw.set_is_data(true);
    raw.add_category("file-io");

    vec![
        aces,
        scene(
            "ACEScct",
            &["ACES - ACEScct", "acescct_ap1"],
            "ACES",
            "log",
            Transform::builtin("ACEScct_to_ACES2065-1"),
        ),
        scene(
            "ACEScg",
            &["ACES - ACEScg", "lin_ap1"],
            "ACES",
            "scene-linear",
            Transform::builtin("ACEScg_to_ACES2065-1"),
        ),
        scene(
            "Linear P3-D65",
            &["Utility - Linear - P3-D65", "lin_p3d65"],
            "Utility",
            "scene-linear",
            Transform::builtin("Linear_P3-D65_to_ACES2065-1"),
        ),
        scene(
            "Linear Rec.2020",
            &["Utility - Linear - Rec.2020", "lin_rec2020"],
            "Utility",
            "scene-linear",
            Transform::builtin("Linear_Rec2020_to_ACES2065-1"),
        ),
        scene(
            "Linear Rec.709 (sRGB)",
            &[
                "Utility - Linear - Rec.709",
                "Utility - Linear - sRGB",
                "lin_rec709_srgb",
                "lin_rec709",
                "lin_srgb",
            ],
            "Utility",
            "scene-linear",
            Transform::builtin("Linear_Rec709_to_ACES2065-1"),
        ),
        texture(
            "Gamma 1.8 Rec.709 - Texture",
            &["Utility - Gamma 1.8 - Rec.709 - Texture", "g18_rec709_tx"],
            AP0_TO_REC709,
            gamma(1.8),
        ),
        texture(
            "Gamma 2.2 AP1 - Texture",
            &["Utility - Gamma 2.2 - AP1 - Texture", "g22_ap1_tx"],
            AP0_TO_AP1_TEXTURE,
            gamma(2.2),
        ),
        texture(
            "Gamma 2.2 Rec.709 - Texture",
            &["Utility - Gamma 2.2 - Rec.709 - Texture", "g22_rec709_tx"],
            AP0_TO_REC709,
            gamma(2.2),
        ),
        texture(
            "sRGB Encoded AP1 - Texture",
            &["srgb_encoded_ap1_tx", "srgb_ap1_tx"],
            AP0_TO_AP1_TEXTURE,
            srgb_curve(),
        ),
        texture(
            SRGB_TEXTURE,
            &["sRGB", "Utility - sRGB - Texture", "srgb_tx", "Input - Generic - sRGB - Texture"],
            AP0_TO_REC709,
            srgb_curve(),
        ),
        raw,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lookup() {
        let catalog = BuiltinCatalog::global();
        assert_eq!(catalog.config().reference_colorspace_name(), Some("ACES2065-1"));
        assert_eq!(catalog.config().data_colorspace_name(), Some("Raw"));
        assert_eq!(catalog.colorspace("aces_interchange").unwrap().name(), "ACES2065-1");
        assert_eq!(catalog.colorspace("srgb_tx").unwrap().name(), SRGB_TEXTURE);
        for name in LINEAR_SPACES {
            assert!(catalog.config().is_colorspace_linear(name).unwrap(), "{name}");
        }
    }

    #[test]
    fn texture_spaces_round_trip() {
        let catalog = BuiltinCatalog::global();
        let cs = catalog.colorspace(SRGB_TEXTURE).unwrap();
        let to_ref = cs.transform_sequence(ColorSpaceDirection::ToReference).unwrap();
        let from_ref = cs.transform_sequence(ColorSpaceDirection::FromReference).unwrap();
        assert!(to_ref.then(from_ref).is_identity_on(&[[0.7, 0.4, 0.02], [1.0, 1.0, 1.0]], 1e-9));
    }

    #[test]
    fn linear_spaces_agree_with_texture_matrix() {
        // Rec.709 texture decoded to reference equals Linear Rec.709 to reference.
        let config = BuiltinCatalog::global().config();
        let a = config.processor("Gamma 2.2 Rec.709 - Texture", "Linear Rec.709 (sRGB)").unwrap();
        let rgb = a.eval_rgb([0.5, 0.25, 1.0]);
        assert!((rgb[0] - 0.5_f64.powf(2.2)).abs() < 1e-9);
        assert!((rgb[1] - 0.25_f64.powf(2.2)).abs() < 1e-9);
    }
}
