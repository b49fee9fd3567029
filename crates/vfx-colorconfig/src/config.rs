//! Color space registry.
//!
//! A [`Config`] owns an ordered list of color spaces together with name and
//! alias indices, the inactive list and role bindings. Indices are derived
//! data: every structural mutation rebuilds them, so lookups never observe a
//! stale name or alias.
//!
//! # Example
//!
//! ```
//! use vfx_colorconfig::{ColorSpace, Config, Transform};
//!
//! let mut config = Config::new();
//! config.add_colorspace(ColorSpace::new("ACES2065-1")).unwrap();
//! config
//!     .add_colorspace(
//!         ColorSpace::builder("ACEScg")
//!             .alias("lin_ap1")
//!             .to_reference(Transform::builtin("ACEScg_to_ACES2065-1"))
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! assert_eq!(config.colorspace("LIN_AP1").unwrap().name(), "ACEScg");
//! let proc = config.processor("ACEScg", "ACES2065-1").unwrap();
//! assert_eq!(proc.len(), 1);
//! ```

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::colorspace::{ColorSpace, ColorSpaceDirection, Encoding, ReferenceSpaceType, name_key};
use crate::error::{ConfigError, ConfigResult};
use crate::processor::Processor;
use crate::role::Roles;
use crate::sequence::TransformSequence;
use crate::transform::Transform;

/// Config format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigVersion {
    /// v1.x.
    V1,
    /// v2.x.
    #[default]
    V2,
}

/// Which color spaces a listing includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Only active spaces.
    #[default]
    Active,
    /// Only inactive spaces.
    Inactive,
    /// Everything.
    All,
}

/// Color space registry.
#[derive(Debug, Clone, Default)]
pub struct Config {
    name: String,
    description: String,
    version: ConfigVersion,
    colorspaces: Vec<ColorSpace>,
    /// Lower-cased name -> index.
    names: HashMap<String, usize>,
    /// Lower-cased alias -> index.
    aliases: HashMap<String, usize>,
    inactive: Vec<String>,
    roles: Roles,
}

impl Config {
    /// Creates a new empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a config from trusted parts without uniqueness checks.
    pub(crate) fn from_parts(name: &str, colorspaces: Vec<ColorSpace>, roles: Roles) -> Self {
        let mut config = Self {
            name: name.to_string(),
            colorspaces,
            roles,
            ..Self::default()
        };
        config.rebuild_indices();
        config
    }

    /// Returns config name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets config name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns config description.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Sets config description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Returns config version.
    #[inline]
    pub fn version(&self) -> ConfigVersion {
        self.version
    }

    /// Sets config version.
    #[inline]
    pub fn set_version(&mut self, version: ConfigVersion) {
        self.version = version;
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Returns all color spaces in declaration order.
    #[inline]
    pub fn colorspaces(&self) -> &[ColorSpace] {
        &self.colorspaces
    }

    /// Number of color spaces, active or not.
    #[inline]
    pub fn num_colorspaces(&self) -> usize {
        self.colorspaces.len()
    }

    /// Position of a color space by name or alias.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        let key = name_key(name);
        self.names.get(&key).or_else(|| self.aliases.get(&key)).copied()
    }

    /// Looks up a color space by name, alias or role.
    ///
    /// Inactive spaces are still returned.
    pub fn colorspace(&self, name: &str) -> Option<&ColorSpace> {
        let idx = self
            .index_of(name)
            .or_else(|| self.roles.get(name).and_then(|target| self.index_of(target)))?;
        self.colorspaces.get(idx)
    }

    /// Like [`colorspace`](Self::colorspace) but fails with `ColorSpaceNotFound`.
    pub fn colorspace_checked(&self, name: &str) -> ConfigResult<&ColorSpace> {
        self.colorspace(name).ok_or_else(|| ConfigError::not_found(name))
    }

    /// Names of color spaces with the given visibility, in declaration order.
    pub fn colorspace_names(&self, visibility: Visibility) -> Vec<&str> {
        self.colorspaces
            .iter()
            .filter(|cs| match visibility {
                Visibility::Active => self.is_active(cs),
                Visibility::Inactive => !self.is_active(cs),
                Visibility::All => true,
            })
            .map(ColorSpace::name)
            .collect()
    }

    /// Active color spaces in declaration order.
    pub fn active_colorspaces(&self) -> impl Iterator<Item = &ColorSpace> {
        self.colorspaces.iter().filter(|cs| self.is_active(cs))
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Adds a color space.
    ///
    /// A space with the same name is replaced in place. Fails with
    /// `DuplicateName` if the name or an alias belongs to another space.
    pub fn add_colorspace(&mut self, cs: ColorSpace) -> ConfigResult<()> {
        if cs.name().is_empty() {
            return Err(ConfigError::Validation("color space name is empty".into()));
        }
        let existing = self.names.get(&name_key(cs.name())).copied();
        self.check_unique(&cs, existing)?;

        debug!(name = cs.name(), replaced = existing.is_some(), "add colorspace");
        match existing {
            Some(idx) => self.colorspaces[idx] = cs,
            None => self.colorspaces.push(cs),
        }
        self.rebuild_indices();
        Ok(())
    }

    /// Removes a color space by name or alias and returns it.
    pub fn remove_colorspace(&mut self, name: &str) -> ConfigResult<ColorSpace> {
        let idx = self.index_of(name).ok_or_else(|| ConfigError::not_found(name))?;
        let cs = self.colorspaces.remove(idx);
        debug!(name = cs.name(), "remove colorspace");
        self.rebuild_indices();
        Ok(cs)
    }

    /// Edits a color space in place.
    ///
    /// The closure works on a copy; the result is committed only if the
    /// closure succeeds and the edited names stay unique.
    pub fn update_colorspace<F>(&mut self, name: &str, edit: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut ColorSpace) -> ConfigResult<()>,
    {
        let idx = self.index_of(name).ok_or_else(|| ConfigError::not_found(name))?;
        let mut cs = self.colorspaces[idx].clone();
        edit(&mut cs)?;
        if cs.name().is_empty() {
            return Err(ConfigError::Validation("color space name is empty".into()));
        }
        self.check_unique(&cs, Some(idx))?;
        self.colorspaces[idx] = cs;
        self.rebuild_indices();
        Ok(())
    }

    /// Renames a color space. Roles pointing at it follow the rename.
    pub fn rename_colorspace(&mut self, old: &str, new: &str) -> ConfigResult<()> {
        let old_name = self.colorspace_by_label(old)?.name().to_string();
        self.update_colorspace(old, |cs| {
            cs.set_name(new);
            Ok(())
        })?;
        self.roles.retarget(&old_name, new);
        debug!(old = %old_name, new, "rename colorspace");
        Ok(())
    }

    /// Adds an alias to a color space.
    pub fn add_colorspace_alias(&mut self, name: &str, alias: &str) -> ConfigResult<()> {
        self.update_colorspace(name, |cs| {
            cs.add_alias(alias);
            Ok(())
        })
    }

    /// Removes an alias from a color space. Returns `true` if it existed.
    pub fn remove_colorspace_alias(&mut self, name: &str, alias: &str) -> ConfigResult<bool> {
        let mut removed = false;
        self.update_colorspace(name, |cs| {
            removed = cs.remove_alias(alias);
            Ok(())
        })?;
        Ok(removed)
    }

    fn colorspace_by_label(&self, name: &str) -> ConfigResult<&ColorSpace> {
        self.index_of(name)
            .map(|idx| &self.colorspaces[idx])
            .ok_or_else(|| ConfigError::not_found(name))
    }

    /// Checks `cs` labels against every space except `skip`.
    fn check_unique(&self, cs: &ColorSpace, skip: Option<usize>) -> ConfigResult<()> {
        for label in cs.labels() {
            let key = name_key(label);
            let owner = self.names.get(&key).or_else(|| self.aliases.get(&key));
            if let Some(&idx) = owner {
                if Some(idx) != skip {
                    return Err(ConfigError::DuplicateName {
                        name: label.to_string(),
                        owner: self.colorspaces[idx].name().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn rebuild_indices(&mut self) {
        self.names.clear();
        self.aliases.clear();
        for (idx, cs) in self.colorspaces.iter().enumerate() {
            self.names.insert(name_key(cs.name()), idx);
            for alias in cs.aliases() {
                self.aliases.entry(name_key(alias)).or_insert(idx);
            }
        }
    }

    // ------------------------------------------------------------------
    // Inactive list
    // ------------------------------------------------------------------

    /// Sets the inactive color spaces from a comma-separated list.
    ///
    /// Entries are trimmed and may be names or aliases. Inactive spaces are
    /// skipped by heuristics and listings but remain reachable by name.
    pub fn set_inactive_colorspaces(&mut self, list: &str) {
        self.inactive = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        for entry in &self.inactive {
            if self.index_of(entry).is_none() {
                warn!(entry = %entry, "inactive color space is not defined");
            }
        }
        debug!(count = self.inactive.len(), "set inactive colorspaces");
    }

    /// Returns the inactive list as set.
    #[inline]
    pub fn inactive_colorspaces(&self) -> &[String] {
        &self.inactive
    }

    /// Checks if a color space is active. Unknown names are not active.
    pub fn is_colorspace_active(&self, name: &str) -> bool {
        self.colorspace(name).is_some_and(|cs| self.is_active(cs))
    }

    pub(crate) fn is_active(&self, cs: &ColorSpace) -> bool {
        !self.inactive.iter().any(|entry| cs.matches_name(entry))
    }

    // ------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------

    /// Returns role mappings.
    #[inline]
    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    /// Binds a role to a color space name.
    pub fn set_role(&mut self, role: &str, colorspace: impl Into<String>) {
        self.roles.define(role, colorspace);
    }

    /// Removes a role binding.
    pub fn unset_role(&mut self, role: &str) -> Option<String> {
        self.roles.remove(role)
    }

    /// Color space name bound to a role.
    #[inline]
    pub fn role(&self, role: &str) -> Option<&str> {
        self.roles.get(role)
    }

    /// Checks if a role is bound.
    #[inline]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    // ------------------------------------------------------------------
    // Structural queries
    // ------------------------------------------------------------------

    /// First scene-referred color space that is neither data nor has any
    /// transform. Inactive spaces are considered.
    pub fn reference_colorspace_name(&self) -> Option<&str> {
        self.colorspaces
            .iter()
            .find(|cs| {
                cs.reference_space_type() == ReferenceSpaceType::Scene && cs.is_reference_space()
            })
            .map(ColorSpace::name)
    }

    /// First scene-referred data color space.
    pub fn data_colorspace_name(&self) -> Option<&str> {
        self.colorspaces
            .iter()
            .find(|cs| cs.reference_space_type() == ReferenceSpaceType::Scene && cs.is_data())
            .map(ColorSpace::name)
    }

    /// Checks if a color space is linear relative to its reference.
    ///
    /// Uses the encoding when one is declared. Otherwise the space is linear
    /// when its path to the reference consists only of offset-free matrices.
    /// Data spaces are never linear.
    pub fn is_colorspace_linear(&self, name: &str) -> ConfigResult<bool> {
        let cs = self.colorspace_checked(name)?;
        if cs.is_data() {
            return Ok(false);
        }
        if !cs.encoding().is_empty() {
            let linear = match cs.reference_space_type() {
                ReferenceSpaceType::Scene => Encoding::SceneLinear,
                ReferenceSpaceType::Display => Encoding::DisplayLinear,
            };
            return Ok(cs.encoding_kind() == linear);
        }
        let seq = self.sequence_for(cs, ColorSpaceDirection::ToReference)?;
        Ok(seq.iter().all(|node| match node {
            Transform::Matrix(m) => m.offset.iter().all(|o| *o == 0.0),
            _ => false,
        }))
    }

    /// Pipeline for one color space and direction.
    ///
    /// Spaces without transforms (the reference and data spaces) resolve to
    /// the empty sequence.
    pub fn sequence_for(
        &self,
        cs: &ColorSpace,
        direction: ColorSpaceDirection,
    ) -> ConfigResult<TransformSequence> {
        if cs.has_no_transforms() {
            return Ok(TransformSequence::new());
        }
        cs.transform_sequence(direction)
    }

    // ------------------------------------------------------------------
    // Processors
    // ------------------------------------------------------------------

    /// Creates a processor between two color spaces of this config.
    ///
    /// Travels `src -> reference -> dst`. A data space at either end yields
    /// an empty processor.
    pub fn processor(&self, src: &str, dst: &str) -> ConfigResult<Processor> {
        let src_cs = self.colorspace_checked(src)?;
        let dst_cs = self.colorspace_checked(dst)?;

        if src_cs.is_data() || dst_cs.is_data() {
            debug!(src, dst, "data color space, empty processor");
            return Ok(Processor::new());
        }

        let seq = self
            .sequence_for(src_cs, ColorSpaceDirection::ToReference)?
            .then(self.sequence_for(dst_cs, ColorSpaceDirection::FromReference)?);
        Ok(Processor::from_sequence(seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::TransformDirection;

    fn sample() -> Config {
        let mut config = Config::new();
        config.add_colorspace(ColorSpace::builder("raw").is_data(true).build().unwrap()).unwrap();
        config.add_colorspace(ColorSpace::builder("ACES2065-1").alias("aces").build().unwrap()).unwrap();
        config
            .add_colorspace(
                ColorSpace::builder("ACEScg")
                    .alias("lin_ap1")
                    .to_reference(Transform::builtin("ACEScg_to_ACES2065-1"))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        config
            .add_colorspace(
                ColorSpace::builder("ACEScct")
                    .encoding("log")
                    .to_reference(Transform::builtin("ACEScct_to_ACES2065-1"))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        config.set_role("scene_linear", "ACEScg");
        config
    }

    #[test]
    fn lookup_by_name_alias_role() {
        let config = sample();
        assert_eq!(config.colorspace("acescg").unwrap().name(), "ACEScg");
        assert_eq!(config.colorspace("LIN_AP1").unwrap().name(), "ACEScg");
        assert_eq!(config.colorspace("scene_linear").unwrap().name(), "ACEScg");
        assert!(matches!(
            config.colorspace_checked("nope"),
            Err(ConfigError::ColorSpaceNotFound { .. })
        ));
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut config = sample();
        let err = config.add_colorspace(ColorSpace::builder("other").alias("ACEScg").build().unwrap());
        assert!(matches!(err, Err(ConfigError::DuplicateName { .. })));
        let err = config.add_colorspace(ColorSpace::new("LIN_AP1"));
        assert!(matches!(err, Err(ConfigError::DuplicateName { .. })));
        assert_eq!(config.num_colorspaces(), 4);
    }

    #[test]
    fn same_name_replaces_in_place() {
        let mut config = sample();
        config
            .add_colorspace(ColorSpace::builder("acescg").description("replaced").build().unwrap())
            .unwrap();
        assert_eq!(config.num_colorspaces(), 4);
        assert_eq!(config.colorspaces()[2].description(), "replaced");
        assert!(config.colorspace("lin_ap1").is_none());
    }

    #[test]
    fn rename_to_own_alias() {
        let mut config = sample();
        config.rename_colorspace("ACEScg", "lin_ap1").unwrap();
        let cs = config.colorspace("lin_ap1").unwrap();
        assert_eq!(cs.name(), "lin_ap1");
        assert!(cs.aliases().is_empty());
        assert!(config.colorspace("ACEScg").is_none());
        assert_eq!(config.role("scene_linear"), Some("lin_ap1"));
    }

    #[test]
    fn update_is_transactional() {
        let mut config = sample();
        let err = config.update_colorspace("ACEScct", |cs| {
            cs.set_description("changed");
            cs.add_alias("aces");
            Ok(())
        });
        assert!(err.is_err());
        assert_eq!(config.colorspace("ACEScct").unwrap().description(), "");

        let err = config.update_colorspace("ACEScct", |cs| {
            cs.set_description("changed");
            cs.set_allocation_vars(vec![1.0])
        });
        assert!(err.is_err());
        assert_eq!(config.colorspace("ACEScct").unwrap().description(), "");
    }

    #[test]
    fn alias_mutations_keep_index() {
        let mut config = sample();
        config.add_colorspace_alias("ACEScct", "cct").unwrap();
        assert_eq!(config.colorspace("CCT").unwrap().name(), "ACEScct");
        assert!(config.remove_colorspace_alias("ACEScct", "cct").unwrap());
        assert!(config.colorspace("cct").is_none());
        config.remove_colorspace("aces").unwrap();
        assert_eq!(config.index_of("ACEScg"), Some(1));
    }

    #[test]
    fn inactive_is_filter_only() {
        let mut config = sample();
        config.set_inactive_colorspaces(" lin_ap1 ,ACEScct,, ");
        assert_eq!(config.inactive_colorspaces(), &["lin_ap1".to_string(), "ACEScct".to_string()]);
        assert!(!config.is_colorspace_active("ACEScg"));
        assert!(config.colorspace("ACEScg").is_some());
        assert_eq!(config.colorspace_names(Visibility::Active), vec!["raw", "ACES2065-1"]);
        assert_eq!(config.colorspace_names(Visibility::Inactive), vec!["ACEScg", "ACEScct"]);
        assert_eq!(config.colorspace_names(Visibility::All).len(), 4);
    }

    #[test]
    fn structural_queries() {
        let config = sample();
        assert_eq!(config.reference_colorspace_name(), Some("ACES2065-1"));
        assert_eq!(config.data_colorspace_name(), Some("raw"));
        assert!(config.is_colorspace_linear("ACEScg").unwrap());
        assert!(!config.is_colorspace_linear("ACEScct").unwrap());
        assert!(!config.is_colorspace_linear("raw").unwrap());
    }

    #[test]
    fn linear_encoding_must_match_reference_type() {
        let mut config = sample();
        for (name, encoding, kind) in [
            ("scene lin", "scene-linear", ReferenceSpaceType::Scene),
            ("scene display-lin", "display-linear", ReferenceSpaceType::Scene),
            ("display lin", "display-linear", ReferenceSpaceType::Display),
            ("display scene-lin", "scene-linear", ReferenceSpaceType::Display),
        ] {
            config
                .add_colorspace(
                    ColorSpace::builder(name)
                        .encoding(encoding)
                        .reference_space(kind)
                        .to_reference(Transform::builtin("ACEScg_to_ACES2065-1"))
                        .build()
                        .unwrap(),
                )
                .unwrap();
        }
        assert!(config.is_colorspace_linear("scene lin").unwrap());
        assert!(!config.is_colorspace_linear("scene display-lin").unwrap());
        assert!(config.is_colorspace_linear("display lin").unwrap());
        assert!(!config.is_colorspace_linear("display scene-lin").unwrap());
    }

    #[test]
    fn processor_through_reference() {
        let config = sample();
        let proc = config.processor("ACEScct", "ACEScg").unwrap();
        assert_eq!(proc.len(), 3);
        assert_eq!(proc.node(0).unwrap().direction(), TransformDirection::Inverse);
        assert!(config.processor("raw", "ACEScg").unwrap().is_empty());
        assert!(config.processor("ACES2065-1", "aces").unwrap().is_empty());
    }
}
