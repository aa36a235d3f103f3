use crate::constraint::Constraint;
use crate::manifest::Environment;
use serde::Serialize;

/// Canonical, sorted, deduplicated representation of a parsed environment.
///
/// Dependencies are sorted by package and their constraints sorted and
/// deduplicated. Comments and group headings are dropped. Channel order is
/// kept because it encodes priority. The name is taken exactly as parsed:
/// surrounding whitespace only survives parsing when it was quoted, and then
/// it is part of the name. This is the input to fingerprinting.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NormalizedEnvironment {
    pub name: String,
    pub channels: Vec<String>,
    pub dependencies: Vec<NormalizedDependency>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NormalizedDependency {
    pub package: String,
    pub constraints: Vec<Constraint>,
}

impl Environment {
    pub fn normalize(&self) -> NormalizedEnvironment {
        let mut channels: Vec<String> = Vec::with_capacity(self.channels().len());
        for channel in self.channels() {
            let channel = channel.trim_end_matches('/').to_owned();
            if !channels.contains(&channel) {
                channels.push(channel);
            }
        }

        let mut dependencies: Vec<NormalizedDependency> = self
            .dependencies()
            .iter()
            .map(|d| {
                let mut constraints = d.constraints.clone();
                constraints.sort();
                constraints.dedup();
                NormalizedDependency {
                    package: d.package.to_string(),
                    constraints,
                }
            })
            .collect();
        dependencies.sort_by(|a, b| a.package.cmp(&b.package));

        NormalizedEnvironment {
            name: self.name().to_owned(),
            channels,
            dependencies,
        }
    }
}

impl NormalizedEnvironment {
    pub fn canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::manifest::parse_manifest_str;

    #[test]
    fn normalizes_and_sorts_deterministically() {
        let env = parse_manifest_str(
            r"name: esmvaltool
channels:
  - conda-forge
  - conda-forge/
  - defaults
dependencies:
  - python>=3.6
  - numpy!=1.16.1,!=1.16.0,!=1.16.1
  - cdo
",
        )
        .unwrap();
        let normalized = env.normalize();

        assert_eq!(normalized.channels, vec!["conda-forge", "defaults"]);
        let names: Vec<_> = normalized
            .dependencies
            .iter()
            .map(|d| d.package.as_str())
            .collect();
        assert_eq!(names, vec!["cdo", "numpy", "python"]);
        let numpy = &normalized.dependencies[1];
        assert_eq!(numpy.constraints.len(), 2);
        assert_eq!(numpy.constraints[0].version, "1.16.0");
    }

    #[test]
    fn comments_and_order_do_not_affect_canonical_json() {
        let a = parse_manifest_str(
            "name: x\nchannels:\n  - c\ndependencies:\n  # tools\n  - git  # vcs\n  - cmake>=3\n",
        )
        .unwrap()
        .normalize();
        let b = parse_manifest_str("name: x\nchannels:\n  - c\ndependencies:\n  - cmake >=3\n  - git\n")
            .unwrap()
            .normalize();

        assert_eq!(a.canonical_json().unwrap(), b.canonical_json().unwrap());
    }

    #[test]
    fn channel_priority_is_preserved() {
        let a = parse_manifest_str("name: x\nchannels:\n  - a\n  - b\n")
            .unwrap()
            .normalize();
        let b = parse_manifest_str("name: x\nchannels:\n  - b\n  - a\n")
            .unwrap()
            .normalize();
        assert_ne!(a, b);
    }

    #[test]
    fn name_is_kept_as_parsed() {
        let bare = parse_manifest_str("name:   x   \nchannels:\n  - c\n")
            .unwrap()
            .normalize();
        assert_eq!(bare.name, "x");

        let quoted = parse_manifest_str("name: ' x '\nchannels:\n  - c\n")
            .unwrap()
            .normalize();
        assert_eq!(quoted.name, " x ");
        assert_ne!(bare, quoted);
    }
}
