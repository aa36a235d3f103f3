use crate::constraint::{is_valid_version, Constraint, Operator, OPERATOR_CHARS};
use crate::scan::{comment_text, split_comment, unquote};
use crate::types::PackageName;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Why a single dependency item could not be tokenized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("{0}")]
    Malformed(String),
    #[error("unsupported operator '{0}'")]
    UnsupportedOperator(String),
}

/// One entry of the `dependencies` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencySpec {
    pub package: PackageName,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Heading of the comment block this entry sits under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl DependencySpec {
    pub fn new(package: impl Into<PackageName>) -> Self {
        Self {
            package: package.into(),
            constraints: Vec::new(),
            comment: None,
            group: None,
        }
    }

    #[must_use]
    pub fn with_constraint(mut self, operator: Operator, version: &str) -> Self {
        self.constraints.push(Constraint::new(operator, version));
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_owned());
        self
    }

    pub fn is_pinned(&self) -> bool {
        !self.constraints.is_empty()
    }
}

/// Renders the match spec without comment or group, e.g. `numpy!=1.16.0,!=1.16.1`.
impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.package)?;
        for (i, c) in self.constraints.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Parses a list item body such as `foo !=1.0,!=2.0  # reason`.
impl FromStr for DependencySpec {
    type Err = SpecError;

    fn from_str(item: &str) -> Result<Self, Self::Err> {
        let (value, comment) = split_comment(item);
        let (package, constraints) = tokenize(&unquote(value.trim()))?;
        Ok(Self {
            package,
            constraints,
            comment: comment_text(comment),
            group: None,
        })
    }
}

fn tokenize(text: &str) -> Result<(PackageName, Vec<Constraint>), SpecError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SpecError::Malformed("empty dependency".to_owned()));
    }

    let name_end = text
        .find(|c: char| c.is_whitespace() || c == ',' || OPERATOR_CHARS.contains(&c))
        .unwrap_or(text.len());
    let name = &text[..name_end];
    if !PackageName::is_valid(name) {
        return Err(SpecError::Malformed(format!("invalid package name '{name}'")));
    }

    let rest = text[name_end..].trim_start();
    if rest.is_empty() {
        return Ok((PackageName::new(name), Vec::new()));
    }

    let mut constraints = Vec::new();
    for piece in rest.split(',') {
        constraints.push(parse_constraint(piece.trim())?);
    }
    Ok((PackageName::new(name), constraints))
}

fn parse_constraint(piece: &str) -> Result<Constraint, SpecError> {
    if piece.is_empty() {
        return Err(SpecError::Malformed("empty constraint".to_owned()));
    }
    let op_len = piece
        .find(|c: char| !OPERATOR_CHARS.contains(&c))
        .unwrap_or(piece.len());
    let symbol = &piece[..op_len];
    if symbol.is_empty() {
        return Err(SpecError::Malformed(format!(
            "expected a comparison operator before '{piece}'"
        )));
    }
    let operator = Operator::from_symbol(symbol)
        .ok_or_else(|| SpecError::UnsupportedOperator(symbol.to_owned()))?;

    let version = piece[op_len..].trim();
    if version.is_empty() {
        return Err(SpecError::Malformed(format!("missing version after '{symbol}'")));
    }
    if !is_valid_version(version) {
        return Err(SpecError::Malformed(format!("invalid version '{version}'")));
    }
    Ok(Constraint::new(operator, version))
}
