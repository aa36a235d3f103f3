use crate::normalize::NormalizedEnvironment;
use crate::types::{EnvId, ShortId};
use serde::Serialize;

/// Deterministic fingerprint of an environment, derived from its normalized content.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EnvIdentity {
    pub env_id: EnvId,
    pub short_id: ShortId,
}

/// Compute the fingerprint of a normalized environment.
///
/// Two manifests that differ only in dependency order, comments, group
/// headings, or whitespace produce the same identity. Channel order,
/// package names, and constraints all change it. The hash input is the
/// canonical JSON, so every field is delimited and escaped.
pub fn compute_env_id(
    normalized: &NormalizedEnvironment,
) -> Result<EnvIdentity, serde_json::Error> {
    let mut hasher = blake3::Hasher::new();
    hasher.update(normalized.canonical_json()?.as_bytes());

    let hex = hasher.finalize().to_hex().to_string();
    let short = hex[..12].to_owned();

    Ok(EnvIdentity {
        env_id: EnvId::new(hex),
        short_id: ShortId::new(short),
    })
}
