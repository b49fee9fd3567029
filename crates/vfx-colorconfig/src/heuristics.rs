//! Heuristic matching of user color spaces against the builtin catalog.
//!
//! User configs rarely say which standard space their reference space is.
//! The functions here find it by evaluating candidate pipelines on a few
//! sample colors and checking that they collapse to identity against known
//! catalog spaces. Once the interchange pair is known, conversions between
//! any user space and any catalog space can be built.
//!
//! # Example
//!
//! ```
//! use vfx_colorconfig::{heuristics, BuiltinCatalog, ColorSpace, Config, Transform};
//!
//! let mut config = Config::new();
//! config.add_colorspace(ColorSpace::new("scene")).unwrap();
//! config
//!     .add_colorspace(
//!         ColorSpace::builder("acescg")
//!             .to_reference(Transform::builtin("ACEScg_to_ACES2065-1"))
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let catalog = BuiltinCatalog::global();
//! let ichg = heuristics::identify_interchange_space(&config, None, catalog, "ACEScg").unwrap();
//! assert_eq!(ichg.config_space, "scene");
//! assert_eq!(ichg.builtin_space, "ACES2065-1");
//! ```

use tracing::{debug, trace};

use crate::builtin::{BuiltinCatalog, LINEAR_SPACES, SRGB_TEXTURE};
use crate::colorspace::{ColorSpace, ColorSpaceDirection, ReferenceSpaceType, name_key, same_name};
use crate::config::Config;
use crate::error::{ConfigError, ConfigResult};
use crate::processor::Processor;
use crate::transform::Transform;

/// Absolute tolerance for identity checks.
pub const TOLERANCE: f64 = 1e-3;

/// Off-diagonal magnitude that marks a real primaries conversion.
const MIN_OFF_DIAGONAL: f64 = 0.1;

/// Samples for sRGB-route and builtin-space identity checks.
pub const SRGB_SAMPLES: [[f64; 3]; 5] = [
    [0.7, 0.4, 0.02],
    [0.02, 0.6, 0.2],
    [0.3, 0.02, 0.5],
    [0.0, 0.0, 0.0],
    [1.0, 1.0, 1.0],
];

/// Samples for linear-route checks; includes out-of-gamut values.
pub const LINEAR_SAMPLES: [[f64; 3]; 5] = [
    [0.7, 0.4, 0.02],
    [0.02, 0.6, -0.2],
    [0.3, 0.02, 1.5],
    [0.0, 0.0, 0.0],
    [1.0, 1.0, 1.0],
];

/// Gray levels used to recognize the sRGB curve.
const NEUTRALS: [f64; 6] = [0.5, 0.03, 0.25, 0.75, 0.0, 1.0];

/// Result of interchange identification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interchange {
    /// Interchange space in the user config.
    pub config_space: String,
    /// Equivalent space in the builtin catalog.
    pub builtin_space: String,
    /// User space whose verification established the pair, if any.
    pub matched_colorspace: Option<String>,
}

// ----------------------------------------------------------------------------
// Name similarity
// ----------------------------------------------------------------------------

/// Lower-case alphanumeric runs.
fn tokens(label: &str) -> Vec<String> {
    label
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Similarity between two labels, 0..=100.
///
/// Exact case-insensitive match scores 100, equal token lists 80, and
/// otherwise the token-set Jaccard index scaled to 60.
pub fn name_similarity(a: &str, b: &str) -> u32 {
    if same_name(a, b) {
        return 100;
    }
    let ta = tokens(a);
    let tb = tokens(b);
    if !ta.is_empty() && ta == tb {
        return 80;
    }
    let mut sa = ta;
    sa.sort_unstable();
    sa.dedup();
    let mut sb = tb;
    sb.sort_unstable();
    sb.dedup();
    let inter = sa.iter().filter(|t| sb.binary_search(t).is_ok()).count();
    let union = sa.len() + sb.len() - inter;
    if union == 0 {
        return 0;
    }
    (60 * inter / union) as u32
}

/// Best similarity between any label of `candidate` and any label of `target`.
pub fn match_score(candidate: &ColorSpace, target: &ColorSpace) -> u32 {
    candidate
        .labels()
        .flat_map(|a| target.labels().map(move |b| name_similarity(a, b)))
        .max()
        .unwrap_or(0)
}

/// Highest score wins; the earliest candidate wins ties.
fn best<T>(scored: Vec<(T, u32)>) -> Option<T> {
    scored
        .into_iter()
        .fold(None, |best: Option<(T, u32)>, (item, score)| match best {
            Some((b, top)) if top >= score => Some((b, top)),
            _ => Some((item, score)),
        })
        .map(|(item, _)| item)
}

// ----------------------------------------------------------------------------
// Interchange identification
// ----------------------------------------------------------------------------

/// Spaces that never take part in matching.
fn is_excluded(cs: &ColorSpace, allow_reference: bool) -> bool {
    cs.is_data()
        || cs.reference_space_type() == ReferenceSpaceType::Display
        || (!allow_reference && cs.has_no_transforms())
}

fn contains_srgb(cs: &ColorSpace) -> bool {
    cs.labels().any(|label| name_key(label).contains("srgb"))
}

/// sRGB encoding of a linear value.
fn srgb_encode(x: f64) -> f64 {
    if x <= 0.0030399346397784323 {
        x * 12.923210180787857
    } else {
        1.055 * x.powf(1.0 / 2.4) - 0.055
    }
}

/// Checks for an sRGB-encoded texture space. Returns the linear space index
/// the config reference is equivalent to.
fn verify_srgb(
    config: &Config,
    cs: &ColorSpace,
    reference: &str,
    catalog: &BuiltinCatalog,
) -> ConfigResult<Option<usize>> {
    let to_ref = config.sequence_for(cs, ColorSpaceDirection::ToReference)?;
    let has_primaries = to_ref
        .iter()
        .any(|node| matches!(node, Transform::Matrix(m) if m.has_off_diagonal(MIN_OFF_DIAGONAL)));
    if !has_primaries {
        trace!(colorspace = cs.name(), "no primaries matrix");
        return Ok(None);
    }

    let curve_ok = NEUTRALS.iter().all(|&v| {
        let out = to_ref.eval_rgb([v, v, v]);
        out.iter().all(|&c| (srgb_encode(c) - v).abs() <= TOLERANCE)
    });
    if !curve_ok {
        trace!(colorspace = cs.name(), "not an sRGB curve");
        return Ok(None);
    }

    let to_src_ref = config.processor(cs.name(), reference)?;
    for (idx, linear) in LINEAR_SPACES.iter().enumerate() {
        let tail = catalog.config().processor(linear, SRGB_TEXTURE)?;
        if to_src_ref.then(&tail).is_identity_on(&SRGB_SAMPLES, TOLERANCE) {
            trace!(colorspace = cs.name(), linear, "sRGB route matched");
            return Ok(Some(idx));
        }
    }
    Ok(None)
}

/// Checks a linear space. Returns the indices of the linear spaces the
/// candidate and the config reference are equivalent to.
fn verify_linear(
    config: &Config,
    cs: &ColorSpace,
    reference: &str,
    catalog: &BuiltinCatalog,
) -> ConfigResult<Option<(usize, usize)>> {
    if !config.is_colorspace_linear(cs.name())? {
        return Ok(None);
    }
    let to_src_ref = config.processor(cs.name(), reference)?;
    for (i, target) in LINEAR_SPACES.iter().enumerate() {
        for (j, source) in LINEAR_SPACES.iter().enumerate() {
            if i == j {
                continue;
            }
            let tail = catalog.config().processor(source, target)?;
            if to_src_ref.then(&tail).is_identity_on(&LINEAR_SAMPLES, TOLERANCE) {
                trace!(colorspace = cs.name(), matched = target, reference = source, "linear route matched");
                return Ok(Some((i, j)));
            }
        }
    }
    Ok(None)
}

/// Runs both routes for one candidate. Returns the interchange index and
/// the catalog space the candidate matched.
fn verify(
    config: &Config,
    cs: &ColorSpace,
    reference: &str,
    catalog: &BuiltinCatalog,
) -> ConfigResult<Option<(usize, &'static str)>> {
    if contains_srgb(cs) {
        if let Some(idx) = verify_srgb(config, cs, reference, catalog)? {
            return Ok(Some((idx, SRGB_TEXTURE)));
        }
    }
    Ok(verify_linear(config, cs, reference, catalog)?.map(|(i, j)| (j, LINEAR_SPACES[i])))
}

/// Finds the interchange pair between `config` and `catalog`.
///
/// `src` names the config space the caller wants to convert, and only
/// appears in error messages. `builtin` is the requested catalog space.
pub fn identify_interchange_space(
    config: &Config,
    src: Option<&str>,
    catalog: &BuiltinCatalog,
    builtin: &str,
) -> ConfigResult<Interchange> {
    let src_label = src.unwrap_or("<config>");
    let target = catalog.config().colorspace_checked(builtin)?;

    if let (Some(cfg_ichg), Some(cat_ichg)) = (
        config.roles().aces_interchange(),
        catalog.config().roles().aces_interchange(),
    ) {
        let config_space = config.colorspace_checked(cfg_ichg)?.name().to_string();
        let builtin_space = catalog.config().colorspace_checked(cat_ichg)?.name().to_string();
        debug!(config_space = %config_space, builtin_space = %builtin_space, "interchange from roles");
        return Ok(Interchange {
            config_space,
            builtin_space,
            matched_colorspace: None,
        });
    }

    let reference = config.reference_colorspace_name().ok_or_else(|| {
        ConfigError::resolution(src_label, builtin, "config has no scene-referred reference space")
    })?;

    if target.reference_space_type() == ReferenceSpaceType::Display {
        return Err(ConfigError::resolution(
            src_label,
            builtin,
            "display-referred builtin spaces cannot be matched",
        ));
    }

    let mut survivors = Vec::new();
    for cs in config.active_colorspaces().filter(|cs| !is_excluded(cs, false)) {
        match verify(config, cs, reference, catalog) {
            Ok(Some((idx, matched))) => {
                let score = catalog
                    .colorspace(matched)
                    .map_or(0, |known| match_score(cs, known));
                debug!(colorspace = cs.name(), interchange = LINEAR_SPACES[idx], score, "candidate verified");
                survivors.push(((cs, idx), score));
            }
            Ok(None) => trace!(colorspace = cs.name(), "candidate rejected"),
            Err(err) => debug!(colorspace = cs.name(), error = %err, "candidate disqualified"),
        }
    }

    let (winner, idx) = best(survivors).ok_or_else(|| {
        ConfigError::resolution(
            src_label,
            builtin,
            format!(
                "heuristics were not able to find a known color space matching reference space '{reference}'"
            ),
        )
    })?;

    debug!(
        reference,
        builtin_space = LINEAR_SPACES[idx],
        via = winner.name(),
        "interchange identified"
    );
    Ok(Interchange {
        config_space: reference.to_string(),
        builtin_space: LINEAR_SPACES[idx].to_string(),
        matched_colorspace: Some(winner.name().to_string()),
    })
}

// ----------------------------------------------------------------------------
// Cross-config processors
// ----------------------------------------------------------------------------

/// Pipeline `src -> src_interchange` in `src_config` followed by
/// `dst_interchange -> dst` in `dst_config`.
pub fn processor_from_configs(
    src_config: &Config,
    src: &str,
    src_interchange: &str,
    dst_config: &Config,
    dst: &str,
    dst_interchange: &str,
) -> ConfigResult<Processor> {
    let head = src_config.processor(src, src_interchange)?;
    let tail = dst_config.processor(dst_interchange, dst)?;
    Ok(head.then(&tail))
}

/// Converts a config space to a catalog space.
pub fn processor_to_builtin(
    config: &Config,
    src: &str,
    catalog: &BuiltinCatalog,
    builtin: &str,
) -> ConfigResult<Processor> {
    let src_cs = config.colorspace_checked(src)?;
    let builtin_cs = catalog.config().colorspace_checked(builtin)?;
    if src_cs.is_data() || builtin_cs.is_data() {
        return Ok(Processor::new());
    }

    let ichg = identify_interchange_space(config, Some(src), catalog, builtin)?;
    processor_from_configs(
        config,
        src,
        &ichg.config_space,
        catalog.config(),
        builtin,
        &ichg.builtin_space,
    )
}

/// Converts a catalog space to a config space.
pub fn processor_from_builtin(
    catalog: &BuiltinCatalog,
    builtin: &str,
    config: &Config,
    dst: &str,
) -> ConfigResult<Processor> {
    let dst_cs = config.colorspace_checked(dst)?;
    let builtin_cs = catalog.config().colorspace_checked(builtin)?;
    if dst_cs.is_data() || builtin_cs.is_data() {
        return Ok(Processor::new());
    }

    let ichg = identify_interchange_space(config, Some(dst), catalog, builtin)?;
    processor_from_configs(
        catalog.config(),
        builtin,
        &ichg.builtin_space,
        config,
        dst,
        &ichg.config_space,
    )
}

// ----------------------------------------------------------------------------
// Space identification
// ----------------------------------------------------------------------------

/// Finds the config space equivalent to a catalog space.
///
/// For a data catalog space this is the config's data space.
pub fn identify_builtin_colorspace<'a>(
    config: &'a Config,
    catalog: &BuiltinCatalog,
    builtin: &str,
) -> ConfigResult<&'a ColorSpace> {
    let target = catalog.config().colorspace_checked(builtin)?;
    if target.is_data() {
        return config
            .data_colorspace_name()
            .and_then(|name| config.colorspace(name))
            .ok_or_else(|| ConfigError::resolution("<config>", builtin, "config has no data space"));
    }

    let ichg = identify_interchange_space(config, None, catalog, builtin)?;

    let mut survivors = Vec::new();
    for cs in config.active_colorspaces().filter(|cs| !is_excluded(cs, true)) {
        let proc = processor_from_configs(
            config,
            cs.name(),
            &ichg.config_space,
            catalog.config(),
            builtin,
            &ichg.builtin_space,
        );
        match proc {
            Ok(p) if p.is_identity_on(&SRGB_SAMPLES, TOLERANCE) => {
                let score = match_score(cs, target);
                debug!(colorspace = cs.name(), builtin, score, "builtin match");
                survivors.push((cs, score));
            }
            Ok(_) => trace!(colorspace = cs.name(), builtin, "not equivalent"),
            Err(err) => debug!(colorspace = cs.name(), error = %err, "candidate disqualified"),
        }
    }

    best(survivors).ok_or_else(|| {
        ConfigError::resolution("<config>", builtin, "no config color space is equivalent")
    })
}

/// Transform from the reference space of `src_config` to that of `dst_config`.
///
/// Both references are identified against the catalog and joined through the
/// catalog conversion between their builtin equivalents. The result is an
/// optimized group, ready for [`ColorSpace::update_reference`].
pub fn ref_space_converter(
    src_config: &Config,
    dst_config: &Config,
    catalog: &BuiltinCatalog,
) -> ConfigResult<Transform> {
    let target = catalog.config().reference_colorspace_name().ok_or_else(|| {
        ConfigError::resolution("<config>", "<catalog>", "catalog has no reference space")
    })?;
    let src = identify_interchange_space(src_config, None, catalog, target)?;
    let dst = identify_interchange_space(dst_config, None, catalog, target)?;

    let head = src_config.sequence_for(
        src_config.colorspace_checked(&src.config_space)?,
        ColorSpaceDirection::FromReference,
    )?;
    let middle = catalog.config().processor(&src.builtin_space, &dst.builtin_space)?;
    let tail = dst_config.sequence_for(
        dst_config.colorspace_checked(&dst.config_space)?,
        ColorSpaceDirection::ToReference,
    )?;

    let seq = head.then(middle.sequence().clone()).then(tail).optimized();
    debug!(
        src = %src.builtin_space,
        dst = %dst.builtin_space,
        nodes = seq.len(),
        "reference converter built"
    );
    Ok(Transform::group(seq.nodes().to_vec()))
}

/// First config space numerically equivalent to `cs`.
///
/// Compares `existing -> reference -> cs` against identity, so `cs` must
/// already use the config's reference (see [`ColorSpace::update_reference`]).
/// Data spaces and spaces of the other reference type are skipped. A data
/// `cs` maps to the config's data space.
pub fn find_equivalent_colorspace<'a>(config: &'a Config, cs: &ColorSpace) -> Option<&'a ColorSpace> {
    if cs.is_data() {
        return config.data_colorspace_name().and_then(|name| config.colorspace(name));
    }
    let from_ref = config.sequence_for(cs, ColorSpaceDirection::FromReference).ok()?;
    config
        .colorspaces()
        .iter()
        .filter(|existing| {
            !existing.is_data() && existing.reference_space_type() == cs.reference_space_type()
        })
        .find(|existing| {
            config
                .sequence_for(existing, ColorSpaceDirection::ToReference)
                .map(|to_ref| to_ref.then(from_ref.clone()).is_identity_on(&SRGB_SAMPLES, TOLERANCE))
                .unwrap_or(false)
        })
}

impl Config {
    /// Converts a space of this config to a space of the global catalog.
    pub fn processor_to_builtin(&self, src: &str, builtin: &str) -> ConfigResult<Processor> {
        processor_to_builtin(self, src, BuiltinCatalog::global(), builtin)
    }

    /// Converts a space of the global catalog to a space of this config.
    pub fn processor_from_builtin(&self, builtin: &str, dst: &str) -> ConfigResult<Processor> {
        processor_from_builtin(BuiltinCatalog::global(), builtin, self, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_config() -> Config {
        let mut config = Config::new();
        config.add_colorspace(ColorSpace::builder("raw").is_data(true).build().unwrap()).unwrap();
        config.add_colorspace(ColorSpace::new("ref")).unwrap();
        config
            .add_colorspace(
                ColorSpace::builder("working")
                    .to_reference(Transform::builtin("ACEScg_to_ACES2065-1"))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        config
    }

    #[test]
    fn similarity_scores() {
        assert_eq!(name_similarity("ACEScg", "acescg"), 100);
        assert_eq!(name_similarity("lin_ap1", "Lin AP1"), 80);
        assert_eq!(name_similarity("Linear Rec.709", "Linear Rec.2020"), 30);
        assert_eq!(name_similarity("abc", "xyz"), 0);
        assert_eq!(name_similarity("", "-"), 0);
    }

    #[test]
    fn srgb_encode_matches_curve() {
        let curve = Transform::exponent_with_linear(2.4, 0.055);
        let seq = crate::sequence::TransformSequence::from_transform(&curve).unwrap();
        for v in NEUTRALS {
            let lin = seq.eval_rgb([v, v, v])[0];
            assert!((srgb_encode(lin) - v).abs() < 1e-9, "{v}");
        }
    }

    #[test]
    fn interchange_from_linear_space() {
        let config = linear_config();
        let ichg = identify_interchange_space(&config, None, BuiltinCatalog::global(), "ACEScct").unwrap();
        assert_eq!(ichg.config_space, "ref");
        assert_eq!(ichg.builtin_space, "ACES2065-1");
        assert_eq!(ichg.matched_colorspace.as_deref(), Some("working"));
    }

    #[test]
    fn interchange_from_roles() {
        let mut config = linear_config();
        config.set_role("aces_interchange", "ref");
        let ichg = identify_interchange_space(&config, None, BuiltinCatalog::global(), "ACEScg").unwrap();
        assert_eq!(ichg.config_space, "ref");
        assert_eq!(ichg.builtin_space, "ACES2065-1");
        assert_eq!(ichg.matched_colorspace, None);
    }

    #[test]
    fn no_reference_space() {
        let mut config = Config::new();
        config
            .add_colorspace(
                ColorSpace::builder("only")
                    .to_reference(Transform::exponent(2.2))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let err = identify_interchange_space(&config, Some("only"), BuiltinCatalog::global(), "ACEScg");
        assert!(matches!(err, Err(ConfigError::Resolution { .. })));
    }

    #[test]
    fn identify_builtin() {
        let config = linear_config();
        let catalog = BuiltinCatalog::global();
        assert_eq!(identify_builtin_colorspace(&config, catalog, "lin_ap1").unwrap().name(), "working");
        assert_eq!(identify_builtin_colorspace(&config, catalog, "ACES2065-1").unwrap().name(), "ref");
        assert_eq!(identify_builtin_colorspace(&config, catalog, "Raw").unwrap().name(), "raw");
        assert!(identify_builtin_colorspace(&config, catalog, "ACEScct").is_err());
    }

    #[test]
    fn equivalent_colorspace() {
        let config = linear_config();
        let incoming = ColorSpace::builder("incoming")
            .from_reference(Transform::builtin("ACES2065-1_to_ACEScg"))
            .build()
            .unwrap();
        assert_eq!(find_equivalent_colorspace(&config, &incoming).unwrap().name(), "working");
        let gamma = ColorSpace::builder("gamma").to_reference(Transform::exponent(2.2)).build().unwrap();
        assert!(find_equivalent_colorspace(&config, &gamma).is_none());
    }

    #[test]
    fn equivalent_data_space() {
        let config = linear_config();
        let raw = ColorSpace::builder("Raw").is_data(true).build().unwrap();
        assert_eq!(find_equivalent_colorspace(&config, &raw).unwrap().name(), "raw");

        let mut no_data = Config::new();
        no_data.add_colorspace(ColorSpace::new("ref")).unwrap();
        assert!(find_equivalent_colorspace(&no_data, &raw).is_none());
    }

    /// Config whose reference is ACEScg, with an AP0 space expressed against it.
    fn ap1_config() -> Config {
        let mut config = Config::new();
        config.add_colorspace(ColorSpace::new("ap1 ref")).unwrap();
        config
            .add_colorspace(
                ColorSpace::builder("aces")
                    .to_reference(Transform::builtin("ACES2065-1_to_ACEScg"))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        config
    }

    #[test]
    fn converter_between_references() {
        let catalog = BuiltinCatalog::global();
        let conv = ref_space_converter(&linear_config(), &ap1_config(), catalog).unwrap();
        let conv = Processor::from_transform(&conv).unwrap();
        let expected = Processor::from_transform(&Transform::builtin("ACES2065-1_to_ACEScg")).unwrap();
        for rgb in LINEAR_SAMPLES {
            let (a, b) = (conv.eval_rgb(rgb), expected.eval_rgb(rgb));
            for c in 0..3 {
                assert!((a[c] - b[c]).abs() < 1e-6, "{rgb:?}");
            }
        }

        let same = ref_space_converter(&linear_config(), &linear_config(), catalog).unwrap();
        assert!(Processor::from_transform(&same).unwrap().is_identity());
    }

    #[test]
    fn rebased_space_finds_its_equivalent() {
        let catalog = BuiltinCatalog::global();
        let src = ap1_config();
        let dst = linear_config();
        let conv = ref_space_converter(&src, &dst, catalog).unwrap();

        let mut aces = src.colorspace("aces").unwrap().clone();
        assert!(find_equivalent_colorspace(&dst, &aces).is_none());
        aces.update_reference(&conv);
        assert_eq!(find_equivalent_colorspace(&dst, &aces).unwrap().name(), "ref");

        let mut reference = src.colorspace("ap1 ref").unwrap().clone();
        reference.update_reference(&conv);
        assert_eq!(find_equivalent_colorspace(&dst, &reference).unwrap().name(), "working");
    }

    #[test]
    fn data_endpoints_are_empty() {
        let config = linear_config();
        let proc = config.processor_to_builtin("raw", "ACEScg").unwrap();
        assert!(proc.is_empty());
    }
}
