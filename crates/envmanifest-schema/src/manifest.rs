use crate::dependency::{DependencySpec, SpecError};
use crate::scan::{comment_text, split_comment, unquote};
use crate::types::{ChannelName, PackageName};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {reason}: '{content}'")]
    MalformedEntry {
        line: usize,
        content: String,
        reason: String,
    },
    #[error(
        "line {line}: unsupported operator '{operator}' in '{content}', expected one of =, ==, !=, >=, <=, >, <"
    )]
    UnsupportedOperator {
        line: usize,
        content: String,
        operator: String,
    },
    #[error("line {line}: duplicate package '{package}' (first declared on line {first_line}): '{content}'")]
    DuplicatePackage {
        package: String,
        line: usize,
        first_line: usize,
        content: String,
    },
    #[error("channels must list at least one channel{}", at_line(.line))]
    EmptyChannelList { line: Option<usize> },
    #[error("name must not be empty{}", at_line(.line))]
    EmptyName { line: Option<usize> },
}

#[allow(clippy::ref_option)]
fn at_line(line: &Option<usize>) -> String {
    line.map_or_else(|| " (key missing)".to_owned(), |n| format!(" (line {n})"))
}

impl ManifestError {
    /// Line the error points at, when there is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Io(_) => None,
            Self::MalformedEntry { line, .. }
            | Self::UnsupportedOperator { line, .. }
            | Self::DuplicatePackage { line, .. } => Some(*line),
            Self::EmptyChannelList { line } | Self::EmptyName { line } => *line,
        }
    }

    fn malformed(line: usize, content: &str, reason: impl Into<String>) -> Self {
        Self::MalformedEntry {
            line,
            content: content.to_owned(),
            reason: reason.into(),
        }
    }
}

/// A parsed environment manifest.
///
/// Only constructed by parsing, so the invariants hold for every value:
/// the name is non-empty, at least one channel is listed, and package
/// names are unique.
///
/// Comments that explain the manifest are kept so it can be rendered back
/// without losing them: the block above the first key, trailing comments on
/// channels, and the block after the last dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Environment {
    name: String,
    channels: Vec<ChannelName>,
    #[serde(skip)]
    channel_comments: Vec<Option<String>>,
    dependencies: Vec<DependencySpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<String>,
}

impl Environment {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Channels in priority order.
    pub fn channels(&self) -> &[ChannelName] {
        &self.channels
    }

    /// Trailing comment of the channel at `index`.
    pub fn channel_comment(&self, index: usize) -> Option<&str> {
        self.channel_comments.get(index)?.as_deref()
    }

    /// Comment block above the first key.
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    /// Comment block after the last dependency.
    pub fn footer(&self) -> Option<&str> {
        self.footer.as_deref()
    }

    /// Dependencies in document order.
    pub fn dependencies(&self) -> &[DependencySpec] {
        &self.dependencies
    }

    pub fn dependency(&self, package: &str) -> Option<&DependencySpec> {
        self.dependencies.iter().find(|d| d.package == package)
    }

    /// Distinct group headings, in the order they first appear.
    pub fn groups(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for group in self.dependencies.iter().filter_map(|d| d.group.as_deref()) {
            if !out.contains(&group) {
                out.push(group);
            }
        }
        out
    }

    pub fn dependencies_in_group<'a>(
        &'a self,
        group: &'a str,
    ) -> impl Iterator<Item = &'a DependencySpec> + 'a {
        self.dependencies
            .iter()
            .filter(move |d| d.group.as_deref() == Some(group))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Name,
    Channels,
    Dependencies,
}

impl Section {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" => Some(Self::Name),
            "channels" => Some(Self::Channels),
            "dependencies" => Some(Self::Dependencies),
            _ => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Channels => "channels",
            Self::Dependencies => "dependencies",
        }
    }
}

#[derive(Default)]
struct Parser {
    name: Option<String>,
    channels: Vec<ChannelName>,
    channels_line: Option<usize>,
    channel_comments: Vec<Option<String>>,
    header: Vec<String>,
    dependencies: Vec<DependencySpec>,
    first_seen: BTreeMap<PackageName, usize>,
    keys_seen: Vec<Section>,
    section: Option<Section>,
    pending_comments: Vec<String>,
    group: Option<String>,
}

impl Parser {
    fn line(&mut self, number: usize, raw: &str) -> Result<(), ManifestError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || (trimmed == raw.trim_end() && matches!(trimmed, "---" | "...")) {
            return Ok(());
        }

        if let Some(comment) = trimmed.strip_prefix('#') {
            match self.section {
                None => self.header.push(comment.trim().to_owned()),
                Some(Section::Dependencies) => {
                    self.pending_comments.push(comment.trim().to_owned());
                }
                Some(_) => {}
            }
            return Ok(());
        }

        if let Some(item) = list_item(trimmed) {
            return self.item(number, raw, item);
        }

        if raw.starts_with([' ', '\t']) {
            return Err(ManifestError::malformed(
                number,
                raw,
                "unexpected indented content",
            ));
        }
        self.key(number, raw)
    }

    fn key(&mut self, number: usize, raw: &str) -> Result<(), ManifestError> {
        let Some((key, rest)) = raw.split_once(':') else {
            return Err(ManifestError::malformed(number, raw, "expected 'key: value'"));
        };
        let key = unquote(key.trim());
        let (value, _) = split_comment(rest.trim_start());
        let value = unquote(value);

        let Some(section) = Section::from_key(&key) else {
            return Err(ManifestError::malformed(
                number,
                raw,
                format!("unrecognized key '{key}' (expected name, channels, dependencies)"),
            ));
        };
        if self.keys_seen.contains(&section) {
            return Err(ManifestError::malformed(
                number,
                raw,
                format!("duplicate key '{}'", section.key()),
            ));
        }
        self.keys_seen.push(section);
        self.section = Some(section);

        match section {
            Section::Name => {
                if value.trim().is_empty() {
                    return Err(ManifestError::EmptyName { line: Some(number) });
                }
                self.name = Some(value.into_owned());
            }
            Section::Channels | Section::Dependencies => {
                if section == Section::Channels {
                    self.channels_line = Some(number);
                }
                if !value.is_empty() && value != "[]" {
                    return Err(ManifestError::malformed(
                        number,
                        raw,
                        format!("'{}' must be a block list of '- item' lines", section.key()),
                    ));
                }
            }
        }
        Ok(())
    }

    fn item(&mut self, number: usize, raw: &str, item: &str) -> Result<(), ManifestError> {
        match self.section {
            Some(Section::Channels) => {
                let (value, comment) = split_comment(item);
                let channel = unquote(value);
                if !ChannelName::is_valid(&channel) {
                    return Err(ManifestError::malformed(
                        number,
                        raw,
                        format!("invalid channel '{channel}'"),
                    ));
                }
                self.channels.push(ChannelName::new(channel.into_owned()));
                self.channel_comments.push(comment_text(comment));
                Ok(())
            }
            Some(Section::Dependencies) => self.dependency(number, raw, item),
            _ => Err(ManifestError::malformed(
                number,
                raw,
                "list item outside of 'channels' or 'dependencies'",
            )),
        }
    }

    fn dependency(&mut self, number: usize, raw: &str, item: &str) -> Result<(), ManifestError> {
        let mut spec: DependencySpec = item.parse().map_err(|e| match e {
            SpecError::Malformed(reason) => ManifestError::malformed(number, raw, reason),
            SpecError::UnsupportedOperator(operator) => ManifestError::UnsupportedOperator {
                line: number,
                content: raw.to_owned(),
                operator,
            },
        })?;

        if let Some(&first_line) = self.first_seen.get(&spec.package) {
            return Err(ManifestError::DuplicatePackage {
                package: spec.package.into_inner(),
                line: number,
                first_line,
                content: raw.to_owned(),
            });
        }
        self.first_seen.insert(spec.package.clone(), number);

        if !self.pending_comments.is_empty() {
            self.group = Some(self.pending_comments.join("\n"));
            self.pending_comments.clear();
        }
        spec.group.clone_from(&self.group);
        self.dependencies.push(spec);
        Ok(())
    }

    fn finish(self) -> Result<Environment, ManifestError> {
        let Some(name) = self.name else {
            return Err(ManifestError::EmptyName { line: None });
        };
        if self.channels.is_empty() {
            return Err(ManifestError::EmptyChannelList {
                line: self.channels_line,
            });
        }
        Ok(Environment {
            name,
            channels: self.channels,
            channel_comments: self.channel_comments,
            dependencies: self.dependencies,
            header: join_block(&self.header),
            footer: join_block(&self.pending_comments),
        })
    }
}

fn join_block(lines: &[String]) -> Option<String> {
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Body of a `- item` line, or `None` when the line is not a list item.
fn list_item(trimmed: &str) -> Option<&str> {
    let rest = trimmed.strip_prefix('-')?;
    if rest.is_empty() || rest.starts_with([' ', '\t']) {
        Some(rest.trim_start())
    } else {
        None
    }
}

pub fn parse_manifest_str(input: &str) -> Result<Environment, ManifestError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut parser = Parser::default();
    for (idx, raw) in input.lines().enumerate() {
        parser.line(idx + 1, raw)?;
    }
    let env = parser.finish()?;
    debug!(
        "parsed manifest '{}': {} channels, {} dependencies",
        env.name,
        env.channels.len(),
        env.dependencies.len()
    );
    Ok(env)
}

pub fn parse_manifest_file(path: impl AsRef<Path>) -> Result<Environment, ManifestError> {
    let path = path.as_ref();
    debug!("reading manifest {}", path.display());
    let content = fs::read_to_string(path)?;
    parse_manifest_str(&content)
}
