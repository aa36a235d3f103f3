//! Newtype wrappers for string identifiers, providing compile-time type safety.
//!
//! All newtypes serialize/deserialize as plain strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance from a string.
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Return the inner string as a slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<String> for $name {
            fn eq(&self, other: &String) -> bool {
                self.0 == *other
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

string_newtype!(
    /// Package name as understood by the resolver: lowercase alphanumerics,
    /// dots, hyphens, and underscores.
    PackageName
);

string_newtype!(
    /// A package source: a bare channel name (`conda-forge`), a labelled
    /// channel (`conda-forge/label/dev`), or a URL.
    ChannelName
);

string_newtype!(
    /// Full 64-character hex environment fingerprint, derived from normalized content.
    EnvId
);

string_newtype!(
    /// Truncated 12-character prefix of an [`EnvId`], used for display.
    ShortId
);

impl PackageName {
    /// Check a candidate against the resolver's naming grammar.
    pub fn is_valid(candidate: &str) -> bool {
        let mut chars = candidate.chars();
        match chars.next() {
            Some(c) if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' => {}
            _ => return false,
        }
        chars.all(is_package_char)
    }
}

impl ChannelName {
    /// Channels are opaque to us, but must be a single non-empty token.
    pub fn is_valid(candidate: &str) -> bool {
        !candidate.is_empty()
            && !candidate
                .chars()
                .any(|c| c.is_whitespace() || c == ',' || c == '#')
    }
}

pub(crate) fn is_package_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '-' | '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_name_display_and_as_ref() {
        let name = PackageName::new("iris");
        assert_eq!(name.to_string(), "iris");
        assert_eq!(name.as_str(), "iris");
        assert_eq!(AsRef::<str>::as_ref(&name), "iris");
    }

    #[test]
    fn package_name_serde_is_plain_string() {
        let name = PackageName::new("scitools-iris");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"scitools-iris\"");
        let back: PackageName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }

    #[test]
    fn package_grammar_accepts_conda_names() {
        for ok in ["python", "cf-units", "py-cpuinfo", "_libgcc_mutex", "r.utils", "3to2"] {
            assert!(PackageName::is_valid(ok), "{ok} should be valid");
        }
    }

    #[test]
    fn package_grammar_rejects_bad_names() {
        for bad in ["", "Iris", "-foo", ".foo", "foo bar", "foo:bar", "pip:"] {
            assert!(!PackageName::is_valid(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn channel_grammar() {
        assert!(ChannelName::is_valid("conda-forge"));
        assert!(ChannelName::is_valid("https://conda.anaconda.org/conda-forge"));
        assert!(ChannelName::is_valid("conda-forge/label/dev"));
        assert!(!ChannelName::is_valid(""));
        assert!(!ChannelName::is_valid("conda forge"));
    }

    #[test]
    fn short_id_into_inner() {
        let sid = ShortId::from("abc123def456");
        assert_eq!(sid.into_inner(), "abc123def456");
    }
}
