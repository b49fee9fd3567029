//! Color space definition and properties.
//!
//! A color space defines:
//! - How to convert to/from the reference space
//! - Identity metadata (name, aliases, family, equality group, encoding)
//! - Categories used for filtering
//! - Allocation hints for GPU texture mapping
//!
//! # Example
//!
//! ```
//! use vfx_colorconfig::{Allocation, ColorSpace, Encoding};
//!
//! let cs = ColorSpace::builder("ACEScg")
//!     .alias("lin_ap1")
//!     .family("ACES")
//!     .encoding("scene-linear")
//!     .allocation(Allocation::Lg2)
//!     .allocation_vars(vec![-8.0, 5.0, 0.00390625])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(cs.name(), "ACEScg");
//! assert_eq!(cs.encoding_kind(), Encoding::SceneLinear);
//! assert!(cs.matches_name("LIN_AP1"));
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::sequence::TransformSequence;
use crate::transform::Transform;

/// Case-folded key for name, alias and category comparisons.
#[inline]
pub(crate) fn name_key(s: &str) -> String {
    s.to_lowercase()
}

/// Case-insensitive label equality, consistent with [`name_key`].
#[inline]
pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a == b || name_key(a) == name_key(b)
}

/// Color encoding type.
///
/// Parsed interpretation of the free-form encoding string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// Scene-referred linear.
    SceneLinear,
    /// Display-referred linear.
    DisplayLinear,
    /// Logarithmic encoding.
    Log,
    /// OETF-encoded (sRGB, Rec.709, etc.).
    Sdr,
    /// HDR display encoding (PQ, HLG).
    Hdr,
    /// Non-color data (normals, masks).
    Data,
    /// Unknown/unspecified encoding.
    #[default]
    Unknown,
}

impl Encoding {
    /// Parses encoding from config string.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "scene-linear" | "scene_linear" | "linear" => Self::SceneLinear,
            "display-linear" | "display_linear" => Self::DisplayLinear,
            "log" => Self::Log,
            "sdr-video" | "sdr_video" | "sdr" => Self::Sdr,
            "hdr-video" | "hdr_video" | "hdr" => Self::Hdr,
            "data" => Self::Data,
            _ => Self::Unknown,
        }
    }

    /// Checks if this is a linear encoding.
    #[inline]
    pub fn is_linear(&self) -> bool {
        matches!(self, Self::SceneLinear | Self::DisplayLinear)
    }
}

/// Bit depth hint for the color space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitDepth {
    /// Not specified.
    #[default]
    Unknown,
    /// 8-bit unsigned integer.
    Uint8,
    /// 10-bit unsigned integer.
    Uint10,
    /// 12-bit unsigned integer.
    Uint12,
    /// 14-bit unsigned integer.
    Uint14,
    /// 16-bit unsigned integer.
    Uint16,
    /// 32-bit unsigned integer.
    Uint32,
    /// 16-bit float.
    F16,
    /// 32-bit float.
    F32,
}

impl BitDepth {
    /// Parses config bit depth strings ("8ui", "16f", ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unknown" => Some(Self::Unknown),
            "8ui" => Some(Self::Uint8),
            "10ui" => Some(Self::Uint10),
            "12ui" => Some(Self::Uint12),
            "14ui" => Some(Self::Uint14),
            "16ui" => Some(Self::Uint16),
            "32ui" => Some(Self::Uint32),
            "16f" => Some(Self::F16),
            "32f" => Some(Self::F32),
            _ => None,
        }
    }

    /// Returns config string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Uint8 => "8ui",
            Self::Uint10 => "10ui",
            Self::Uint12 => "12ui",
            Self::Uint14 => "14ui",
            Self::Uint16 => "16ui",
            Self::Uint32 => "32ui",
            Self::F16 => "16f",
            Self::F32 => "32f",
        }
    }
}

/// Allocation kind for GPU texture mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Allocation {
    /// Not specified.
    Unknown,
    /// Uniform distribution over `[min, max]`.
    #[default]
    Uniform,
    /// Log2 distribution over `[min, max]` with optional offset.
    Lg2,
}

impl Allocation {
    /// Parses allocation from config string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unknown" => Some(Self::Unknown),
            "uniform" => Some(Self::Uniform),
            "lg2" => Some(Self::Lg2),
            _ => None,
        }
    }

    /// Returns config string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Uniform => "uniform",
            Self::Lg2 => "lg2",
        }
    }

    /// Checks if `len` allocation variables are valid for this kind.
    #[inline]
    pub fn accepts_vars(&self, len: usize) -> bool {
        match self {
            Self::Uniform => matches!(len, 0 | 2),
            Self::Lg2 => matches!(len, 2 | 3),
            Self::Unknown => matches!(len, 0 | 2 | 3),
        }
    }

    fn expected_vars(&self) -> &'static str {
        match self {
            Self::Uniform => "0 or 2",
            Self::Lg2 => "2 or 3",
            Self::Unknown => "0, 2 or 3",
        }
    }
}

/// Which reference space a color space is defined against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReferenceSpaceType {
    /// Scene-referred reference.
    #[default]
    Scene,
    /// Display-referred reference.
    Display,
}

/// Direction of a color space transform relative to the reference space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpaceDirection {
    /// From this space into the reference space.
    ToReference,
    /// From the reference space into this space.
    FromReference,
}

impl ColorSpaceDirection {
    /// Returns the opposite direction.
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Self::ToReference => Self::FromReference,
            Self::FromReference => Self::ToReference,
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToReference => "to reference",
            Self::FromReference => "from reference",
        }
    }
}

/// Color space definition.
///
/// Owns its transforms outright; `clone()` is a full deep copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorSpace {
    name: String,
    aliases: Vec<String>,
    family: String,
    equality_group: String,
    description: String,
    encoding: String,
    bit_depth: BitDepth,
    is_data: bool,
    reference_space: ReferenceSpaceType,
    categories: Vec<String>,
    allocation: Allocation,
    allocation_vars: Vec<f32>,
    to_reference: Option<Transform>,
    from_reference: Option<Transform>,
}

impl ColorSpace {
    /// Creates a new color space with the given name and default properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates a builder for constructing color spaces.
    #[inline]
    pub fn builder(name: impl Into<String>) -> ColorSpaceBuilder {
        ColorSpaceBuilder::new(name)
    }

    /// Returns the color space name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the name. An alias equal to the new name is dropped.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        let name = &self.name;
        self.aliases.retain(|a| !same_name(a, name));
    }

    /// Returns the family.
    #[inline]
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Sets the family.
    pub fn set_family(&mut self, family: impl Into<String>) {
        self.family = family.into();
    }

    /// Returns the equality group.
    #[inline]
    pub fn equality_group(&self) -> &str {
        &self.equality_group
    }

    /// Sets the equality group.
    pub fn set_equality_group(&mut self, group: impl Into<String>) {
        self.equality_group = group.into();
    }

    /// Returns the description.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Sets the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Returns the encoding string as written in the config.
    #[inline]
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Returns the parsed encoding.
    #[inline]
    pub fn encoding_kind(&self) -> Encoding {
        Encoding::parse(&self.encoding)
    }

    /// Sets the encoding string.
    pub fn set_encoding(&mut self, encoding: impl Into<String>) {
        self.encoding = encoding.into();
    }

    /// Returns the bit depth hint.
    #[inline]
    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// Sets the bit depth hint.
    #[inline]
    pub fn set_bit_depth(&mut self, bit_depth: BitDepth) {
        self.bit_depth = bit_depth;
    }

    /// Checks if this is a data (non-color) space.
    #[inline]
    pub fn is_data(&self) -> bool {
        self.is_data
    }

    /// Marks the space as data (non-color).
    #[inline]
    pub fn set_is_data(&mut self, is_data: bool) {
        self.is_data = is_data;
    }

    /// Returns the reference space this space is defined against.
    #[inline]
    pub fn reference_space_type(&self) -> ReferenceSpaceType {
        self.reference_space
    }

    /// Sets the reference space type.
    #[inline]
    pub fn set_reference_space_type(&mut self, kind: ReferenceSpaceType) {
        self.reference_space = kind;
    }

    /// Returns the allocation kind.
    #[inline]
    pub fn allocation(&self) -> Allocation {
        self.allocation
    }

    /// Sets the allocation kind. Existing variables are kept as they are.
    #[inline]
    pub fn set_allocation(&mut self, allocation: Allocation) {
        self.allocation = allocation;
    }

    /// Returns the allocation variables.
    #[inline]
    pub fn allocation_vars(&self) -> &[f32] {
        &self.allocation_vars
    }

    /// Sets allocation variables, validated against the current allocation.
    ///
    /// On error the previous variables are left untouched.
    pub fn set_allocation_vars(&mut self, vars: impl Into<Vec<f32>>) -> ConfigResult<()> {
        let vars = vars.into();
        if !self.allocation.accepts_vars(vars.len()) {
            return Err(ConfigError::InvalidAllocationVars {
                allocation: self.allocation.as_str(),
                len: vars.len(),
                expected: self.allocation.expected_vars(),
            });
        }
        self.allocation_vars = vars;
        Ok(())
    }

    /// Returns the transform for a direction, if explicitly defined.
    #[inline]
    pub fn transform(&self, direction: ColorSpaceDirection) -> Option<&Transform> {
        match direction {
            ColorSpaceDirection::ToReference => self.to_reference.as_ref(),
            ColorSpaceDirection::FromReference => self.from_reference.as_ref(),
        }
    }

    /// Sets or clears the transform for a direction.
    pub fn set_transform(&mut self, direction: ColorSpaceDirection, transform: Option<Transform>) {
        match direction {
            ColorSpaceDirection::ToReference => self.to_reference = transform,
            ColorSpaceDirection::FromReference => self.from_reference = transform,
        }
    }

    /// Rebases the transforms onto a new reference space.
    ///
    /// `to_new_reference` converts from the current reference to the new one.
    /// It is appended to the to-reference transform and its inverse is
    /// prepended to the from-reference transform. A color space without
    /// transforms (other than a data space) gets `to_new_reference` as its
    /// to-reference transform. Nothing is simplified.
    pub fn update_reference(&mut self, to_new_reference: &Transform) {
        if let Some(to_ref) = self.to_reference.take() {
            self.to_reference = Some(Transform::group(vec![to_ref, to_new_reference.clone()]));
        }
        if let Some(from_ref) = self.from_reference.take() {
            self.from_reference = Some(Transform::group(vec![
                to_new_reference.clone().inverse(),
                from_ref,
            ]));
        }
        if self.has_no_transforms() && !self.is_data {
            self.to_reference = Some(Transform::group(vec![to_new_reference.clone()]));
        }
    }

    /// Returns the transform to reference space.
    #[inline]
    pub fn to_reference(&self) -> Option<&Transform> {
        self.to_reference.as_ref()
    }

    /// Returns the transform from reference space.
    #[inline]
    pub fn from_reference(&self) -> Option<&Transform> {
        self.from_reference.as_ref()
    }

    /// Checks if a transform is explicitly defined for `direction`.
    #[inline]
    pub fn has_transform(&self, direction: ColorSpaceDirection) -> bool {
        self.transform(direction).is_some()
    }

    /// Checks if neither direction is defined.
    #[inline]
    pub fn has_no_transforms(&self) -> bool {
        self.to_reference.is_none() && self.from_reference.is_none()
    }

    /// Checks if this is a reference space: color data with no transforms.
    #[inline]
    pub fn is_reference_space(&self) -> bool {
        !self.is_data && self.has_no_transforms()
    }

    /// Resolves the pipeline for `direction`.
    ///
    /// Uses the explicit transform when present, otherwise the inverse of the
    /// opposite one. Both are never mixed.
    pub fn transform_sequence(&self, direction: ColorSpaceDirection) -> ConfigResult<TransformSequence> {
        if let Some(t) = self.transform(direction) {
            return TransformSequence::from_transform(t);
        }
        if let Some(t) = self.transform(direction.opposite()) {
            return TransformSequence::from_transform(&t.clone().inverse());
        }
        Err(ConfigError::MissingTransform {
            colorspace: self.name.clone(),
            direction: direction.as_str(),
        })
    }

    /// Returns all aliases in insertion order.
    #[inline]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Returns the alias at `index`.
    pub fn alias(&self, index: usize) -> ConfigResult<&str> {
        self.aliases
            .get(index)
            .map(String::as_str)
            .ok_or(ConfigError::IndexOutOfRange {
                index,
                len: self.aliases.len(),
            })
    }

    /// Checks if `alias` is one of the aliases (case-insensitive).
    pub fn has_alias(&self, alias: &str) -> bool {
        self.aliases.iter().any(|a| same_name(a, alias))
    }

    /// Adds an alias.
    ///
    /// Empty strings, the space's own name and case-insensitive duplicates
    /// are ignored. Returns `true` if the alias was added.
    pub fn add_alias(&mut self, alias: impl Into<String>) -> bool {
        let alias = alias.into();
        if alias.is_empty() || same_name(&self.name, &alias) || self.has_alias(&alias) {
            return false;
        }
        self.aliases.push(alias);
        true
    }

    /// Removes an alias (case-insensitive). Returns `true` if one was removed.
    pub fn remove_alias(&mut self, alias: &str) -> bool {
        let before = self.aliases.len();
        self.aliases.retain(|a| !same_name(a, alias));
        self.aliases.len() != before
    }

    /// Removes all aliases.
    #[inline]
    pub fn clear_aliases(&mut self) {
        self.aliases.clear();
    }

    /// Checks if a name or alias matches (case-insensitive).
    pub fn matches_name(&self, name: &str) -> bool {
        same_name(&self.name, name) || self.has_alias(name)
    }

    /// Iterates the name followed by all aliases.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Returns all categories in insertion order.
    #[inline]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Returns the category at `index`.
    pub fn category(&self, index: usize) -> ConfigResult<&str> {
        self.categories
            .get(index)
            .map(String::as_str)
            .ok_or(ConfigError::IndexOutOfRange {
                index,
                len: self.categories.len(),
            })
    }

    /// Checks for a category (case-insensitive).
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| same_name(c, category))
    }

    /// Adds a category; duplicates and empty strings are ignored.
    pub fn add_category(&mut self, category: impl Into<String>) -> bool {
        let category = category.into();
        if category.is_empty() || self.has_category(&category) {
            return false;
        }
        self.categories.push(category);
        true
    }

    /// Removes a category (case-insensitive).
    pub fn remove_category(&mut self, category: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| !same_name(c, category));
        self.categories.len() != before
    }

    /// Removes all categories.
    #[inline]
    pub fn clear_categories(&mut self) {
        self.categories.clear();
    }
}

/// Builder for constructing color spaces.
#[derive(Debug)]
pub struct ColorSpaceBuilder {
    inner: ColorSpace,
    vars: Option<Vec<f32>>,
}

impl ColorSpaceBuilder {
    /// Creates a new builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: ColorSpace::new(name),
            vars: None,
        }
    }

    /// Adds an alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.inner.add_alias(alias);
        self
    }

    /// Sets the family.
    pub fn family(mut self, family: impl Into<String>) -> Self {
        self.inner.family = family.into();
        self
    }

    /// Sets the equality group.
    pub fn equality_group(mut self, group: impl Into<String>) -> Self {
        self.inner.equality_group = group.into();
        self
    }

    /// Sets the description.
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.inner.description = desc.into();
        self
    }

    /// Sets the encoding. The data flag is set separately with [`is_data`](Self::is_data).
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.inner.set_encoding(encoding);
        self
    }

    /// Sets the bit depth.
    pub fn bit_depth(mut self, depth: BitDepth) -> Self {
        self.inner.bit_depth = depth;
        self
    }

    /// Marks as data (non-color) space.
    pub fn is_data(mut self, is_data: bool) -> Self {
        self.inner.is_data = is_data;
        self
    }

    /// Sets the reference space type.
    pub fn reference_space(mut self, kind: ReferenceSpaceType) -> Self {
        self.inner.reference_space = kind;
        self
    }

    /// Adds a category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.inner.add_category(category);
        self
    }

    /// Sets the allocation kind.
    pub fn allocation(mut self, allocation: Allocation) -> Self {
        self.inner.allocation = allocation;
        self
    }

    /// Sets allocation variables; validated in [`build`](Self::build).
    pub fn allocation_vars(mut self, vars: Vec<f32>) -> Self {
        self.vars = Some(vars);
        self
    }

    /// Sets the transform to reference space.
    pub fn to_reference(mut self, transform: Transform) -> Self {
        self.inner.to_reference = Some(transform);
        self
    }

    /// Sets the transform from reference space.
    pub fn from_reference(mut self, transform: Transform) -> Self {
        self.inner.from_reference = Some(transform);
        self
    }

    /// Builds the color space.
    pub fn build(self) -> ConfigResult<ColorSpace> {
        let mut cs = self.inner;
        if let Some(vars) = self.vars {
            cs.set_allocation_vars(vars)?;
        }
        Ok(cs)
    }
}
