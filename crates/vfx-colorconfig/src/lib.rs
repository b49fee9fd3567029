//! Color space configuration and conversion for VFX pipelines.
//!
//! This crate models an OCIO-style color config:
//! - Color spaces with aliases, categories and to/from-reference transforms
//! - A registry with name/alias/role lookup and an inactive list
//! - Flattened transform sequences and immutable processors
//! - Heuristic matching of user configs against a builtin CG catalog
//!
//! # Quick Start
//!
//! ```
//! use vfx_colorconfig::{ColorSpace, Config, Transform};
//!
//! let mut config = Config::new();
//! config.add_colorspace(ColorSpace::new("ACES2065-1")).unwrap();
//! config
//!     .add_colorspace(
//!         ColorSpace::builder("ACEScct")
//!             .to_reference(Transform::builtin("ACEScct_to_ACES2065-1"))
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let processor = config.processor("ACEScct", "ACES2065-1").unwrap();
//! let mut pixels = [[0.4135_f32, 0.4135, 0.4135]];
//! processor.apply_rgb(&mut pixels);
//! assert!((pixels[0][0] - 0.18).abs() < 1e-3);
//! ```
//!
//! # Builtin Catalog
//!
//! Conversions to well-known spaces work even when the user config never
//! says which standard space its reference is:
//!
//! ```ignore
//! use vfx_colorconfig::Config;
//!
//! let config = Config::from_file("config.ocio")?;
//! let proc = config.processor_to_builtin("plate", "ACEScg")?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod transform;
mod sequence;
mod colorspace;
mod role;
mod config;
mod loader;
mod processor;

pub mod builtin;
pub mod builtin_transforms;
pub mod heuristics;

// Re-exports
pub use error::{ConfigError, ConfigResult};
pub use transform::{
    Transform, TransformDirection, NegativeStyle,
    MatrixTransform, LogAffineTransform, LogCameraTransform,
    ExponentTransform, ExponentWithLinearTransform,
    GroupTransform, BuiltinTransform,
};
pub use sequence::TransformSequence;
pub use colorspace::{
    ColorSpace, ColorSpaceBuilder, ColorSpaceDirection, Encoding, BitDepth, Allocation,
    ReferenceSpaceType,
};
pub use role::{Roles, names as role_names};
pub use config::{Config, ConfigVersion, Visibility};
pub use processor::Processor;
pub use builtin::BuiltinCatalog;
pub use heuristics::{
    Interchange, identify_interchange_space, identify_builtin_colorspace,
    find_equivalent_colorspace, processor_to_builtin, processor_from_builtin, ref_space_converter,
};
