//! Version constraints: comparison operators, version tokens, and a
//! conda-like ordering used by the linter to spot impossible ranges.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Characters that can make up a comparison operator.
pub(crate) const OPERATOR_CHARS: &[char] = &['=', '!', '<', '>', '~'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// `=`: prefix pin (`=1.2` accepts `1.2.x`).
    #[serde(rename = "=")]
    Pin,
    #[serde(rename = "==")]
    Exact,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = ">=")]
    GreaterEqual,
    #[serde(rename = "<=")]
    LessEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<")]
    Less,
}

impl Operator {
    pub const ALL: [Operator; 7] = [
        Operator::Pin,
        Operator::Exact,
        Operator::NotEqual,
        Operator::GreaterEqual,
        Operator::LessEqual,
        Operator::Greater,
        Operator::Less,
    ];

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Pin => "=",
            Operator::Exact => "==",
            Operator::NotEqual => "!=",
            Operator::GreaterEqual => ">=",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::Less => "<",
        }
    }

    fn is_lower_bound(self) -> bool {
        matches!(self, Operator::GreaterEqual | Operator::Greater)
    }

    fn is_upper_bound(self) -> bool {
        matches!(self, Operator::LessEqual | Operator::Less)
    }

    fn is_strict(self) -> bool {
        matches!(self, Operator::Greater | Operator::Less)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single `operator version` restriction on a package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Constraint {
    pub operator: Operator,
    pub version: String,
}

impl Constraint {
    pub fn new(operator: Operator, version: impl Into<String>) -> Self {
        Self {
            operator,
            version: version.into(),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.version)
    }
}

/// Version tokens use the conda alphabet: alphanumerics, `.`, `_`, `-`,
/// `+` (local part), `!` (epoch), and `*` wildcards.
pub fn is_valid_version(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphanumeric() || c == '*' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '+' | '*' | '!'))
}

#[derive(Debug, PartialEq, Eq)]
enum Part<'a> {
    Num(u64),
    Tag(&'a str),
}

fn split_parts(version: &str) -> Option<(u64, Vec<Part<'_>>)> {
    if version.contains('*') {
        return None;
    }
    let (epoch, rest) = match version.split_once('!') {
        Some((e, r)) => (e.parse().ok()?, r),
        None => (0, version),
    };
    // Local version labels do not participate in ordering.
    let public = rest.split('+').next().unwrap_or_default();

    let mut parts = Vec::new();
    for segment in public.split(['.', '-', '_']) {
        let mut start = 0;
        let bytes = segment.as_bytes();
        while start < bytes.len() {
            let digit = bytes[start].is_ascii_digit();
            let end = bytes[start..]
                .iter()
                .position(|b| b.is_ascii_digit() != digit)
                .map_or(bytes.len(), |n| start + n);
            let run = &segment[start..end];
            parts.push(if digit {
                Part::Num(run.parse().ok()?)
            } else {
                Part::Tag(run)
            });
            start = end;
        }
    }
    Some((epoch, parts))
}

/// Compare two version tokens. Returns `None` when either side contains a
/// wildcard or is otherwise not orderable.
///
/// Alphabetic tags sort before numbers and before a missing component, so
/// `1.0rc1 < 1.0 < 1.0.1`.
pub fn compare_versions(a: &str, b: &str) -> Option<Ordering> {
    let (epoch_a, parts_a) = split_parts(a)?;
    let (epoch_b, parts_b) = split_parts(b)?;
    if epoch_a != epoch_b {
        return Some(epoch_a.cmp(&epoch_b));
    }

    let len = parts_a.len().max(parts_b.len());
    for i in 0..len {
        let ord = match (parts_a.get(i), parts_b.get(i)) {
            (Some(Part::Num(x)), Some(Part::Num(y))) => x.cmp(y),
            (Some(Part::Tag(x)), Some(Part::Tag(y))) => {
                x.to_ascii_lowercase().cmp(&y.to_ascii_lowercase())
            }
            (Some(Part::Tag(_)), Some(Part::Num(_)) | None) => Ordering::Less,
            (Some(Part::Num(_)) | None, Some(Part::Tag(_))) => Ordering::Greater,
            (Some(Part::Num(x)), None) => x.cmp(&0),
            (None, Some(Part::Num(y))) => 0.cmp(y),
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return Some(ord);
        }
    }
    Some(Ordering::Equal)
}

/// Return the first lower/upper bound pair that cannot both hold.
pub fn find_contradiction(constraints: &[Constraint]) -> Option<(&Constraint, &Constraint)> {
    for lower in constraints.iter().filter(|c| c.operator.is_lower_bound()) {
        for upper in constraints.iter().filter(|c| c.operator.is_upper_bound()) {
            let impossible = match compare_versions(&lower.version, &upper.version) {
                Some(Ordering::Greater) => true,
                Some(Ordering::Equal) => lower.operator.is_strict() || upper.operator.is_strict(),
                _ => false,
            };
            if impossible {
                return Some((lower, upper));
            }
        }
    }
    None
}
