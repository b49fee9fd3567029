//! Error types for color config construction and transform resolution.
//!
//! Covers:
//! - Config file loading (YAML)
//! - Color space lookup and registry mutation
//! - Transform validation and inversion
//! - Heuristic resolution against the builtin catalog

use thiserror::Error;

/// Result type for color config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while building or resolving a color config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading config files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Tag normalization pattern failed to compile.
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Invalid config version.
    #[error("unsupported config version: {version} (supported: 1.x, 2.x)")]
    UnsupportedVersion {
        /// Version string from config.
        version: String,
    },

    /// Color space not found in config.
    #[error("color space not found: {name}")]
    ColorSpaceNotFound {
        /// Name, alias or role that was requested.
        name: String,
    },

    /// A name or alias is already used by another color space.
    #[error("name '{name}' is already used by color space '{owner}'")]
    DuplicateName {
        /// The conflicting name or alias.
        name: String,
        /// Color space that already owns it.
        owner: String,
    },

    /// Indexed access past the end of an alias or category list.
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Current length.
        len: usize,
    },

    /// Allocation variables have the wrong length for the allocation kind.
    #[error("allocation '{allocation}' does not accept {len} variables (expected {expected})")]
    InvalidAllocationVars {
        /// Allocation kind name.
        allocation: &'static str,
        /// Number of variables supplied.
        len: usize,
        /// Human-readable list of accepted lengths.
        expected: &'static str,
    },

    /// Neither the requested direction nor its opposite is defined.
    #[error("color space '{colorspace}' has no transform {direction}")]
    MissingTransform {
        /// Color space name.
        colorspace: String,
        /// Requested direction.
        direction: &'static str,
    },

    /// Heuristic resolution found no viable candidate.
    #[error("cannot resolve '{src}' -> '{dst}': {reason}")]
    Resolution {
        /// Requested source identifier.
        src: String,
        /// Requested destination identifier.
        dst: String,
        /// What went wrong.
        reason: String,
    },

    /// Invalid transform definition.
    #[error("invalid transform: {reason}")]
    InvalidTransform {
        /// Description of what's wrong.
        reason: String,
    },

    /// Builtin transform style is not known.
    #[error("unknown builtin transform style: {style}")]
    UnknownBuiltinTransform {
        /// Requested style.
        style: String,
    },

    /// General validation error.
    #[error("validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    /// Creates a resolution error.
    pub(crate) fn resolution(
        src: impl Into<String>,
        dst: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Resolution {
            src: src.into(),
            dst: dst.into(),
            reason: reason.into(),
        }
    }

    /// Creates a not-found error.
    pub(crate) fn not_found(name: impl Into<String>) -> Self {
        Self::ColorSpaceNotFound { name: name.into() }
    }
}
