//! YAML config loading.
//!
//! Reads the color space subset of OCIO v1/v2 configs: profile version,
//! roles, inactive list, scene and display color spaces, and the analytic
//! transforms supported by [`Transform`]. Displays, views, looks and file
//! rules are ignored.
//!
//! OCIO writes verbatim tags such as `!<MatrixTransform>`. Transform tags are
//! rewritten to local tags (`!MatrixTransform`) so they deserialize as enum
//! variants; container tags like `!<ColorSpace>` are dropped.
//!
//! # Example
//!
//! ```
//! use vfx_colorconfig::Config;
//!
//! let config = Config::from_yaml_str(r#"
//! ocio_profile_version: 2
//! colorspaces:
//!   - !<ColorSpace>
//!     name: ref
//!   - !<ColorSpace>
//!     name: gamma
//!     to_scene_reference: !<ExponentTransform> {value: 2.2}
//! "#).unwrap();
//!
//! assert_eq!(config.num_colorspaces(), 2);
//! ```

use std::collections::HashMap;
use std::path::Path;

use regex::{Captures, Regex};
use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;

use crate::colorspace::{Allocation, BitDepth, ColorSpace, ColorSpaceDirection, ReferenceSpaceType};
use crate::config::{Config, ConfigVersion};
use crate::error::{ConfigError, ConfigResult};
use crate::transform::{
    BuiltinTransform, ExponentTransform, ExponentWithLinearTransform, GroupTransform,
    LogAffineTransform, LogCameraTransform, MatrixTransform, NegativeStyle, Transform,
    TransformDirection,
};

impl Config {
    /// Loads a config from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading config");
        Self::from_yaml_str(&content)
    }

    /// Loads a config from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let yaml = normalize_tags(yaml)?;
        let raw: RawConfig = serde_yaml::from_str(&yaml)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> ConfigResult<Self> {
        let mut config = Config::new();
        config.set_version(parse_version(&raw.ocio_profile_version)?);
        if let Some(name) = raw.name {
            config.set_name(name);
        }
        if let Some(desc) = raw.description {
            config.set_description(desc);
        }

        let scene = raw.colorspaces.into_iter().map(|cs| (cs, ReferenceSpaceType::Scene));
        let display = raw
            .display_colorspaces
            .into_iter()
            .map(|cs| (cs, ReferenceSpaceType::Display));
        for (raw_cs, kind) in scene.chain(display) {
            let cs = raw_cs.into_colorspace(kind)?;
            // A repeated name in a file is an error, not a replacement.
            if let Some(existing) = config.colorspace(cs.name()) {
                return Err(ConfigError::DuplicateName {
                    name: cs.name().to_string(),
                    owner: existing.name().to_string(),
                });
            }
            config.add_colorspace(cs)?;
        }

        for (role, cs) in raw.roles {
            config.set_role(&role, cs);
        }
        if !raw.inactive_colorspaces.is_empty() {
            config.set_inactive_colorspaces(&raw.inactive_colorspaces.join(", "));
        }

        debug!(
            name = config.name(),
            colorspaces = config.num_colorspaces(),
            roles = config.roles().len(),
            "config loaded"
        );
        Ok(config)
    }
}

/// Rewrites `!<XTransform>` to `!XTransform` and drops other verbatim tags.
fn normalize_tags(yaml: &str) -> ConfigResult<String> {
    let re = Regex::new(r"!<(\w+)>")?;
    let out = re.replace_all(yaml, |caps: &Captures| {
        let name = &caps[1];
        if name.ends_with("Transform") {
            format!("!{name}")
        } else {
            String::new()
        }
    });
    Ok(out.into_owned())
}

fn parse_version(value: &Value) -> ConfigResult<ConfigVersion> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => format!("{other:?}"),
    };
    match text.trim().split('.').next() {
        Some("1") => Ok(ConfigVersion::V1),
        Some("2") => Ok(ConfigVersion::V2),
        _ => Err(ConfigError::UnsupportedVersion { version: text }),
    }
}

// ============================================================================
// Raw YAML structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawConfig {
    ocio_profile_version: Value,
    name: Option<String>,
    description: Option<String>,
    #[serde(default)]
    roles: HashMap<String, String>,
    #[serde(default, deserialize_with = "list_or_csv")]
    inactive_colorspaces: Vec<String>,
    #[serde(default)]
    colorspaces: Vec<RawColorSpace>,
    #[serde(default)]
    display_colorspaces: Vec<RawColorSpace>,
}

/// `inactive_colorspaces` may be a YAML list or a comma-separated string.
fn list_or_csv<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Form {
        List(Vec<String>),
        Csv(String),
    }
    Ok(match Form::deserialize(de)? {
        Form::List(v) => v,
        Form::Csv(s) => s.split(',').map(|e| e.trim().to_string()).collect(),
    })
}

#[derive(Debug, Deserialize)]
struct RawColorSpace {
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    family: Option<String>,
    equalitygroup: Option<String>,
    description: Option<String>,
    encoding: Option<String>,
    bitdepth: Option<String>,
    isdata: Option<bool>,
    #[serde(default)]
    categories: Vec<String>,
    allocation: Option<String>,
    allocationvars: Option<Vec<f32>>,
    to_reference: Option<Value>,
    from_reference: Option<Value>,
    to_scene_reference: Option<Value>,
    from_scene_reference: Option<Value>,
    to_display_reference: Option<Value>,
    from_display_reference: Option<Value>,
}

impl RawColorSpace {
    fn into_colorspace(self, kind: ReferenceSpaceType) -> ConfigResult<ColorSpace> {
        let mut cs = ColorSpace::new(self.name);
        cs.set_reference_space_type(kind);
        for alias in self.aliases {
            cs.add_alias(alias);
        }
        if let Some(v) = self.family {
            cs.set_family(v);
        }
        if let Some(v) = self.equalitygroup {
            cs.set_equality_group(v);
        }
        if let Some(v) = self.description {
            cs.set_description(v.trim_end().to_string());
        }
        if let Some(v) = self.encoding {
            cs.set_encoding(v);
        }
        if let Some(v) = self.bitdepth {
            let depth = BitDepth::parse(&v).ok_or_else(|| {
                ConfigError::Validation(format!("color space '{}': unknown bitdepth '{v}'", cs.name()))
            })?;
            cs.set_bit_depth(depth);
        }
        if let Some(v) = self.isdata {
            cs.set_is_data(v);
        }
        for category in self.categories {
            cs.add_category(category);
        }
        if let Some(v) = self.allocation {
            let allocation = Allocation::parse(&v).ok_or_else(|| {
                ConfigError::Validation(format!("color space '{}': unknown allocation '{v}'", cs.name()))
            })?;
            cs.set_allocation(allocation);
        }
        if let Some(vars) = self.allocationvars {
            cs.set_allocation_vars(vars)?;
        }

        // v2 reference-specific keys take precedence over the v1 generic ones.
        let (to_ref, from_ref) = match kind {
            ReferenceSpaceType::Scene => (self.to_scene_reference, self.from_scene_reference),
            ReferenceSpaceType::Display => (self.to_display_reference, self.from_display_reference),
        };
        let to_ref = to_ref.or(self.to_reference);
        let from_ref = from_ref.or(self.from_reference);

        if let Some(v) = to_ref {
            cs.set_transform(ColorSpaceDirection::ToReference, Some(parse_transform(v)?));
        }
        if let Some(v) = from_ref {
            cs.set_transform(ColorSpaceDirection::FromReference, Some(parse_transform(v)?));
        }
        Ok(cs)
    }
}

/// Converts a transform node. A bare list is an implicit group.
fn parse_transform(value: Value) -> ConfigResult<Transform> {
    match value {
        Value::Sequence(items) => Ok(Transform::group(
            items.into_iter().map(parse_transform).collect::<ConfigResult<_>>()?,
        )),
        other => {
            let t = serde_yaml::from_value::<RawTransform>(other)?.into_transform()?;
            if t.is_leaf() {
                t.validate()?;
            }
            Ok(t)
        }
    }
}

/// A number or a per-channel list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Channels {
    One(f64),
    Many(Vec<f64>),
}

impl Channels {
    fn rgb(&self, what: &str) -> ConfigResult<[f64; 3]> {
        match self {
            Self::One(v) => Ok([*v; 3]),
            Self::Many(v) if v.len() == 1 => Ok([v[0]; 3]),
            Self::Many(v) if v.len() == 3 => Ok([v[0], v[1], v[2]]),
            Self::Many(v) => Err(invalid(format!("{what}: expected 1 or 3 values, got {}", v.len()))),
        }
    }

    fn rgba(&self, what: &str, alpha: f64) -> ConfigResult<[f64; 4]> {
        match self {
            Self::Many(v) if v.len() == 4 => Ok([v[0], v[1], v[2], v[3]]),
            other => {
                let [r, g, b] = other.rgb(what)?;
                Ok([r, g, b, alpha])
            }
        }
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::InvalidTransform { reason }
}

fn direction(value: Option<&str>) -> ConfigResult<TransformDirection> {
    match value {
        None => Ok(TransformDirection::Forward),
        Some(s) => TransformDirection::parse(s).ok_or_else(|| invalid(format!("unknown direction '{s}'"))),
    }
}

fn negative_style(value: Option<&str>, default: NegativeStyle) -> ConfigResult<NegativeStyle> {
    match value {
        None => Ok(default),
        Some(s) => NegativeStyle::parse(s).ok_or_else(|| invalid(format!("unknown negative style '{s}'"))),
    }
}

#[derive(Debug, Deserialize)]
enum RawTransform {
    MatrixTransform(RawMatrix),
    LogTransform(RawLog),
    LogAffineTransform(RawLogAffine),
    LogCameraTransform(RawLogCamera),
    ExponentTransform(RawExponent),
    ExponentWithLinearTransform(RawExponentWithLinear),
    GroupTransform(RawGroup),
    BuiltinTransform(RawBuiltin),
}

#[derive(Debug, Deserialize)]
struct RawMatrix {
    matrix: Option<Vec<f64>>,
    offset: Option<Vec<f64>>,
    direction: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLog {
    base: Option<f64>,
    direction: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLogAffine {
    base: Option<f64>,
    log_side_slope: Option<Channels>,
    log_side_offset: Option<Channels>,
    lin_side_slope: Option<Channels>,
    lin_side_offset: Option<Channels>,
    direction: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLogCamera {
    base: Option<f64>,
    log_side_slope: Option<Channels>,
    log_side_offset: Option<Channels>,
    lin_side_slope: Option<Channels>,
    lin_side_offset: Option<Channels>,
    lin_side_break: Channels,
    linear_slope: Option<Channels>,
    direction: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawExponent {
    value: Channels,
    style: Option<String>,
    direction: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawExponentWithLinear {
    gamma: Channels,
    offset: Channels,
    style: Option<String>,
    direction: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    #[serde(default)]
    children: Vec<Value>,
    direction: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawBuiltin {
    style: String,
    direction: Option<String>,
}

fn rgb_or(value: Option<Channels>, what: &str, default: f64) -> ConfigResult<[f64; 3]> {
    value.map_or(Ok([default; 3]), |c| c.rgb(what))
}

impl RawTransform {
    fn into_transform(self) -> ConfigResult<Transform> {
        Ok(match self {
            Self::MatrixTransform(m) => {
                let matrix = match m.matrix {
                    None => MatrixTransform::IDENTITY,
                    Some(v) => v
                        .try_into()
                        .map_err(|v: Vec<f64>| invalid(format!("matrix needs 16 values, got {}", v.len())))?,
                };
                let offset = match m.offset {
                    None => [0.0; 4],
                    Some(v) => v
                        .try_into()
                        .map_err(|v: Vec<f64>| invalid(format!("offset needs 4 values, got {}", v.len())))?,
                };
                Transform::Matrix(MatrixTransform {
                    matrix,
                    offset,
                    direction: direction(m.direction.as_deref())?,
                })
            }
            Self::LogTransform(l) => Transform::LogAffine(LogAffineTransform {
                direction: direction(l.direction.as_deref())?,
                ..LogAffineTransform::with_base(l.base.unwrap_or(2.0))
            }),
            Self::LogAffineTransform(l) => Transform::LogAffine(LogAffineTransform {
                base: l.base.unwrap_or(2.0),
                log_side_slope: rgb_or(l.log_side_slope, "logSideSlope", 1.0)?,
                log_side_offset: rgb_or(l.log_side_offset, "logSideOffset", 0.0)?,
                lin_side_slope: rgb_or(l.lin_side_slope, "linSideSlope", 1.0)?,
                lin_side_offset: rgb_or(l.lin_side_offset, "linSideOffset", 0.0)?,
                direction: direction(l.direction.as_deref())?,
            }),
            Self::LogCameraTransform(l) => Transform::LogCamera(LogCameraTransform {
                base: l.base.unwrap_or(2.0),
                log_side_slope: rgb_or(l.log_side_slope, "logSideSlope", 1.0)?,
                log_side_offset: rgb_or(l.log_side_offset, "logSideOffset", 0.0)?,
                lin_side_slope: rgb_or(l.lin_side_slope, "linSideSlope", 1.0)?,
                lin_side_offset: rgb_or(l.lin_side_offset, "linSideOffset", 0.0)?,
                lin_side_break: l.lin_side_break.rgb("linSideBreak")?,
                linear_slope: l.linear_slope.map(|c| c.rgb("linearSlope")).transpose()?,
                direction: direction(l.direction.as_deref())?,
            }),
            Self::ExponentTransform(e) => Transform::Exponent(ExponentTransform {
                value: e.value.rgba("value", 1.0)?,
                negative_style: negative_style(e.style.as_deref(), NegativeStyle::Clamp)?,
                direction: direction(e.direction.as_deref())?,
            }),
            Self::ExponentWithLinearTransform(e) => {
                Transform::ExponentWithLinear(ExponentWithLinearTransform {
                    gamma: e.gamma.rgba("gamma", 1.0)?,
                    offset: e.offset.rgba("offset", 0.0)?,
                    negative_style: negative_style(e.style.as_deref(), NegativeStyle::Linear)?,
                    direction: direction(e.direction.as_deref())?,
                })
            }
            Self::GroupTransform(g) => Transform::Group(GroupTransform {
                transforms: g
                    .children
                    .into_iter()
                    .map(parse_transform)
                    .collect::<ConfigResult<_>>()?,
                direction: direction(g.direction.as_deref())?,
            }),
            Self::BuiltinTransform(b) => Transform::Builtin(BuiltinTransform {
                style: b.style,
                direction: direction(b.direction.as_deref())?,
            }),
        })
    }
}
