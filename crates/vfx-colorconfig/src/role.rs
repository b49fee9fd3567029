//! Color space roles.
//!
//! Roles reference color spaces by purpose rather than by name, so that
//! tools can ask for "the scene-linear space" without knowing what a given
//! config calls it. Role names are matched case-insensitively.

use std::collections::HashMap;

use crate::colorspace::{name_key, same_name};

/// Well-known role names.
pub mod names {
    /// Default input color space.
    pub const DEFAULT: &str = "default";
    /// Non-color data (normals, masks).
    pub const DATA: &str = "data";
    /// Scene-referred linear working space.
    pub const SCENE_LINEAR: &str = "scene_linear";
    /// Compositing log space.
    pub const COMPOSITING_LOG: &str = "compositing_log";
    /// Color grading space.
    pub const COLOR_TIMING: &str = "color_timing";
    /// Texture painting space.
    pub const TEXTURE_PAINT: &str = "texture_paint";
    /// ACES2065-1 interchange, used to bridge scene-referred configs.
    pub const ACES_INTERCHANGE: &str = "aces_interchange";
    /// CIE XYZ D65 interchange, used to bridge display-referred configs.
    pub const CIE_XYZ_D65_INTERCHANGE: &str = "cie_xyz_d65_interchange";
}

/// Role to color space mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roles {
    /// Lower-cased role name -> color space name.
    mapping: HashMap<String, String>,
}

impl Roles {
    /// Creates an empty roles mapping.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines or replaces a role mapping.
    #[inline]
    pub fn define(&mut self, role: &str, colorspace: impl Into<String>) {
        self.mapping.insert(name_key(role), colorspace.into());
    }

    /// Removes a role. Returns the color space it pointed at.
    #[inline]
    pub fn remove(&mut self, role: &str) -> Option<String> {
        self.mapping.remove(&name_key(role))
    }

    /// Gets the color space name for a role.
    #[inline]
    pub fn get(&self, role: &str) -> Option<&str> {
        self.mapping.get(&name_key(role)).map(String::as_str)
    }

    /// Checks if a role is defined.
    #[inline]
    pub fn contains(&self, role: &str) -> bool {
        self.mapping.contains_key(&name_key(role))
    }

    /// Returns all roles sorted by role name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let mut pairs: Vec<_> = self
            .mapping
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs.into_iter()
    }

    /// Number of defined roles.
    #[inline]
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Checks if no roles are defined.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Points every role targeting `old` (case-insensitive) at `new`.
    pub fn retarget(&mut self, old: &str, new: &str) {
        for target in self.mapping.values_mut() {
            if same_name(target, old) {
                *target = new.to_string();
            }
        }
    }

    /// Gets the ACES interchange color space name.
    #[inline]
    pub fn aces_interchange(&self) -> Option<&str> {
        self.get(names::ACES_INTERCHANGE)
    }

    /// Gets the scene_linear color space name.
    #[inline]
    pub fn scene_linear(&self) -> Option<&str> {
        self.get(names::SCENE_LINEAR)
    }

    /// Gets the data color space name.
    #[inline]
    pub fn data(&self) -> Option<&str> {
        self.get(names::DATA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get() {
        let mut roles = Roles::new();
        roles.define("scene_linear", "ACEScg");
        roles.define("ACES_Interchange", "ACES2065-1");

        assert_eq!(roles.scene_linear(), Some("ACEScg"));
        assert_eq!(roles.aces_interchange(), Some("ACES2065-1"));
        assert!(roles.contains("SCENE_LINEAR"));
        assert_eq!(roles.len(), 2);
    }

    #[test]
    fn retarget_and_remove() {
        let mut roles = Roles::new();
        roles.define(names::DEFAULT, "raw");
        roles.define(names::DATA, "Raw");
        roles.retarget("RAW", "Utility - Raw");
        assert_eq!(roles.data(), Some("Utility - Raw"));
        assert_eq!(roles.remove("default").as_deref(), Some("Utility - Raw"));
        assert_eq!(roles.iter().collect::<Vec<_>>(), vec![("data", "Utility - Raw")]);
    }
}
