//! Parsing, validation, rendering, and fingerprinting of conda-style
//! environment manifests.
//!
//! This crate defines the schema layer: the line-oriented manifest parser
//! (`parse_manifest_str`) producing an immutable [`Environment`], match-spec
//! tokenization (`DependencySpec`), non-fatal linting (`validate`), canonical
//! rendering (`render_manifest`), and deterministic environment identity
//! (`compute_env_id`).

pub mod constraint;
pub mod dependency;
pub mod identity;
pub mod lint;
pub mod manifest;
pub mod normalize;
pub mod render;
mod scan;
pub mod types;

pub use constraint::{compare_versions, Constraint, Operator};
pub use dependency::{DependencySpec, SpecError};
pub use identity::{compute_env_id, EnvIdentity};
pub use lint::{validate, validate_with, ConfigError, LintConfig, Warning, WarningKind};
pub use manifest::{parse_manifest_file, parse_manifest_str, Environment, ManifestError};
pub use normalize::{NormalizedDependency, NormalizedEnvironment};
pub use render::{dropped_comments, render_manifest};
pub use types::{ChannelName, EnvId, PackageName, ShortId};
