//! Non-fatal diagnostics for a parsed [`Environment`].

use crate::constraint::{find_contradiction, Operator};
use crate::manifest::Environment;
use crate::types::PackageName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read lint config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse lint config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    UnusualOperator,
    BareIssueLink,
    DuplicateChannel,
    RedundantConstraint,
    UnsatisfiableConstraints,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UnusualOperator => "unusual_operator",
            Self::BareIssueLink => "bare_issue_link",
            Self::DuplicateChannel => "duplicate_channel",
            Self::RedundantConstraint => "redundant_constraint",
            Self::UnsatisfiableConstraints => "unsatisfiable_constraints",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageName>,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.package {
            Some(pkg) => write!(f, "[{}] {pkg}: {}", self.kind, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// Lint settings, read from TOML.
///
/// ```toml
/// unusual_operators = ["==", "<="]
/// allow = ["bare_issue_link"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LintConfig {
    /// Operators the target resolver treats surprisingly.
    pub unusual_operators: Vec<Operator>,
    /// Warning kinds to suppress.
    pub allow: Vec<WarningKind>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            unusual_operators: vec![Operator::Exact],
            allow: Vec::new(),
        }
    }
}

impl LintConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load `~/.config/envmanifest/lint.toml`, or defaults when it does not exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) if path.is_file() => {
                debug!("loading lint config from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    fn allows(&self, kind: WarningKind) -> bool {
        self.allow.contains(&kind)
    }
}

fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".config/envmanifest/lint.toml"))
}

/// Run every check with the default configuration.
pub fn validate(env: &Environment) -> Vec<Warning> {
    validate_with(env, &LintConfig::default())
}

pub fn validate_with(env: &Environment, config: &LintConfig) -> Vec<Warning> {
    let mut warnings = Vec::new();
    check_channels(env, &mut warnings);
    for dep in env.dependencies() {
        let pkg = Some(dep.package.clone());

        for c in &dep.constraints {
            if config.unusual_operators.contains(&c.operator) {
                warnings.push(Warning {
                    kind: WarningKind::UnusualOperator,
                    package: pkg.clone(),
                    message: format!(
                        "operator '{}' in '{}' is unusual for the resolver{}",
                        c.operator,
                        dep,
                        operator_hint(c.operator)
                    ),
                });
            }
        }

        for (i, c) in dep.constraints.iter().enumerate() {
            if dep.constraints[..i].contains(c) {
                warnings.push(Warning {
                    kind: WarningKind::RedundantConstraint,
                    package: pkg.clone(),
                    message: format!("constraint '{c}' is repeated"),
                });
            }
        }

        if let Some((lower, upper)) = find_contradiction(&dep.constraints) {
            warnings.push(Warning {
                kind: WarningKind::UnsatisfiableConstraints,
                package: pkg.clone(),
                message: format!("no version satisfies both '{lower}' and '{upper}'"),
            });
        }

        if let Some(comment) = dep.comment.as_deref() {
            if is_bare_link(comment) {
                warnings.push(Warning {
                    kind: WarningKind::BareIssueLink,
                    package: pkg,
                    message: format!("comment links to '{comment}' without saying why"),
                });
            }
        }
    }

    warnings.retain(|w| !config.allows(w.kind));
    debug!("lint of '{}' produced {} warnings", env.name(), warnings.len());
    warnings
}

fn check_channels(env: &Environment, warnings: &mut Vec<Warning>) {
    for (i, channel) in env.channels().iter().enumerate() {
        if env.channels()[..i].contains(channel) {
            warnings.push(Warning {
                kind: WarningKind::DuplicateChannel,
                package: None,
                message: format!("channel '{channel}' is listed more than once"),
            });
        }
    }
}

fn operator_hint(op: Operator) -> &'static str {
    match op {
        Operator::Exact => " (use '=' for a prefix pin; '==' requires an exact build match)",
        _ => "",
    }
}

/// A comment made of a single URL, optionally wrapped in punctuation.
fn is_bare_link(comment: &str) -> bool {
    let token = comment.trim().trim_matches(|c: char| matches!(c, '(' | ')' | '<' | '>' | '.' | ','));
    let is_url = token.starts_with("http://") || token.starts_with("https://");
    is_url && !token.contains(char::is_whitespace)
}
