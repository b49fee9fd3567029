//! Registry behavior: lookup, mutation, inactive spaces and deterministic
//! candidate selection.

use vfx_colorconfig::{
    Allocation, BitDepth, BuiltinCatalog, ColorSpace, ColorSpaceDirection, Config, ConfigError,
    Transform, Visibility, identify_builtin_colorspace, identify_interchange_space,
};

fn acescg_like(name: &str) -> ColorSpace {
    ColorSpace::builder(name)
        .to_reference(Transform::builtin("ACEScg_to_ACES2065-1"))
        .build()
        .unwrap()
}

fn config_with(names: &[&str]) -> Config {
    let mut config = Config::new();
    config.add_colorspace(ColorSpace::new("reference")).unwrap();
    for name in names {
        config.add_colorspace(acescg_like(name)).unwrap();
    }
    config
}

#[test]
fn colorspace_defaults() {
    let cs = ColorSpace::default();
    assert_eq!(cs.name(), "");
    assert_eq!(cs.bit_depth(), BitDepth::Unknown);
    assert_eq!(cs.allocation(), Allocation::Uniform);
    assert!(cs.allocation_vars().is_empty());
    assert!(cs.aliases().is_empty());
    assert!(!cs.is_data());
}

#[test]
fn allocation_vars_round_trip_and_rejection() {
    let mut cs = ColorSpace::new("log");
    cs.set_allocation(Allocation::Lg2);
    cs.set_allocation_vars(vec![-8.0, 5.0, 0.00390625]).unwrap();
    assert_eq!(cs.allocation_vars(), [-8.0, 5.0, 0.00390625]);

    let err = cs.set_allocation_vars(vec![1.0]);
    assert!(matches!(err, Err(ConfigError::InvalidAllocationVars { len: 1, .. })));
    assert_eq!(cs.allocation_vars(), [-8.0, 5.0, 0.00390625]);
}

#[test]
fn clone_is_independent() {
    let mut a = ColorSpace::builder("a")
        .alias("first")
        .family("Utility")
        .equality_group("texture-group")
        .description("fully populated")
        .encoding("log")
        .bit_depth(BitDepth::F16)
        .category("texture")
        .allocation(Allocation::Lg2)
        .allocation_vars(vec![-8.0, 5.0, 0.00390625])
        .to_reference(Transform::builtin("ACEScct_to_ACES2065-1"))
        .from_reference(Transform::builtin("ACEScct_to_ACES2065-1").inverse())
        .build()
        .unwrap();
    let b = a.clone();
    assert_eq!(b, a);
    assert_eq!(b.family(), "Utility");
    assert_eq!(b.bit_depth(), BitDepth::F16);
    assert_eq!(b.allocation_vars(), [-8.0, 5.0, 0.00390625]);
    assert_eq!(b.transform(ColorSpaceDirection::FromReference), a.transform(ColorSpaceDirection::FromReference));

    a.add_alias("second");
    a.remove_category("texture");
    a.set_transform(ColorSpaceDirection::ToReference, Some(Transform::exponent(2.2)));

    assert_ne!(b, a);
    assert_eq!(b.aliases(), ["first"]);
    assert_eq!(b.categories(), ["texture"]);
    assert_eq!(b.to_reference(), Some(&Transform::builtin("ACEScct_to_ACES2065-1")));
}

#[test]
fn aliases_and_names_are_exclusive() {
    let mut cs = ColorSpace::new("name");
    assert!(cs.add_alias("alias"));
    assert!(!cs.add_alias("ALIAS"));
    assert!(!cs.add_alias("Name"));
    assert_eq!(cs.aliases(), ["alias"]);

    cs.set_name("Alias");
    assert!(cs.aliases().is_empty());
    assert!(matches!(cs.alias(0), Err(ConfigError::IndexOutOfRange { index: 0, len: 0 })));
}

#[test]
fn categories_keep_order() {
    let mut cs = ColorSpace::new("cs");
    for c in ["file-io", "working-space", "texture"] {
        cs.add_category(c);
    }
    assert_eq!(cs.category(1).unwrap(), "working-space");
    assert!(cs.remove_category("FILE-IO"));
    assert_eq!(cs.categories(), ["working-space", "texture"]);
    assert!(cs.category(2).is_err());
    cs.clear_categories();
    assert!(cs.categories().is_empty());
}

#[test]
fn non_ascii_names_fold_the_same_everywhere() {
    let mut config = config_with(&["Ärger"]);
    assert_eq!(config.colorspace("ÄRGER").unwrap().name(), "Ärger");

    config.set_inactive_colorspaces("ärger");
    assert!(!config.is_colorspace_active("Ärger"));
    assert_eq!(config.colorspace_names(Visibility::Inactive), ["Ärger"]);

    config.add_colorspace_alias("Ärger", "ärger").unwrap();
    assert!(config.colorspace("Ärger").unwrap().aliases().is_empty());

    let mut cs = ColorSpace::new("Ärger");
    assert!(!cs.add_alias("ÄRGER"));
    assert!(cs.add_alias("Öl"));
    assert!(cs.remove_alias("öL"));
}

#[test]
fn registry_rejects_cross_space_collisions() {
    let mut config = config_with(&["one"]);
    config.add_colorspace_alias("one", "uno").unwrap();
    let err = config.add_colorspace(acescg_like("UNO"));
    assert!(matches!(err, Err(ConfigError::DuplicateName { .. })));

    let err = config.add_colorspace_alias("reference", "one");
    assert!(matches!(err, Err(ConfigError::DuplicateName { .. })));
    assert!(config.colorspace("reference").unwrap().aliases().is_empty());
}

#[test]
fn rename_keeps_roles() {
    let mut config = config_with(&["one"]);
    config.set_role("scene_linear", "one");
    config.rename_colorspace("one", "working").unwrap();
    assert_eq!(config.role("scene_linear"), Some("working"));
    assert_eq!(config.colorspace("scene_linear").unwrap().name(), "working");
    assert!(config.colorspace("one").is_none());
}

#[test]
fn inactive_spaces_stay_reachable() {
    let mut config = config_with(&["one", "two"]);
    config.set_inactive_colorspaces(" two ,  missing");
    assert_eq!(config.colorspace_names(Visibility::Active), ["reference", "one"]);
    assert_eq!(config.colorspace_names(Visibility::Inactive), ["two"]);
    assert!(config.colorspace("two").is_some());
    assert!(config.processor("two", "reference").is_ok());
}

#[test]
fn tie_break_follows_registry_order() {
    let catalog = BuiltinCatalog::global();

    let config = config_with(&["cg one", "cg two"]);
    let ichg = identify_interchange_space(&config, None, catalog, "ACEScg").unwrap();
    assert_eq!(ichg.matched_colorspace.as_deref(), Some("cg one"));
    let found = identify_builtin_colorspace(&config, catalog, "ACEScg").unwrap();
    assert_eq!(found.name(), "cg one");

    let config = config_with(&["cg two", "cg one"]);
    let ichg = identify_interchange_space(&config, None, catalog, "ACEScg").unwrap();
    assert_eq!(ichg.matched_colorspace.as_deref(), Some("cg two"));
    let found = identify_builtin_colorspace(&config, catalog, "ACEScg").unwrap();
    assert_eq!(found.name(), "cg two");
}

#[test]
fn better_name_beats_registry_order() {
    let catalog = BuiltinCatalog::global();
    let config = config_with(&["working", "Lin AP1"]);
    let ichg = identify_interchange_space(&config, None, catalog, "ACEScg").unwrap();
    assert_eq!(ichg.matched_colorspace.as_deref(), Some("Lin AP1"));
    let found = identify_builtin_colorspace(&config, catalog, "ACEScg").unwrap();
    assert_eq!(found.name(), "Lin AP1");
}

#[test]
fn heuristics_skip_inactive_and_data() {
    let catalog = BuiltinCatalog::global();
    let mut config = config_with(&["one"]);
    config
        .add_colorspace(ColorSpace::builder("raw").is_data(true).build().unwrap())
        .unwrap();
    config.set_inactive_colorspaces("one");

    let err = identify_interchange_space(&config, Some("raw"), catalog, "ACEScg");
    assert!(matches!(err, Err(ConfigError::Resolution { .. })));
    assert!(config.processor_to_builtin("raw", "ACEScg").unwrap().is_empty());
}
