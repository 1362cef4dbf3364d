use anyhow::{Context, Result, bail};
use std::collections::HashSet;
use std::hash::Hasher;
use twox_hash::XxHash64;

const DEFAULT_SEED: u64 = 1337;

/// A resolved CLI seed and the token it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    /// Original word for seeds derived from a phrase.
    pub phrase: Option<String>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self { seed, phrase: None }
    }

    #[must_use]
    pub fn from_phrase(phrase: &str) -> Self {
        Self {
            seed: phrase_seed(phrase),
            phrase: Some(phrase.to_ascii_lowercase()),
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        self.phrase
            .as_ref()
            .map_or_else(|| self.seed.to_string(), |phrase| format!("{phrase} ({})", self.seed))
    }
}

/// Stable seed for a word such as `tikbalang`. Case-insensitive.
#[must_use]
pub fn phrase_seed(phrase: &str) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(phrase.trim().to_ascii_lowercase().as_bytes());
    hasher.finish()
}

/// Resolve CLI seed tokens.
///
/// Accepts decimal integers (negative values use their magnitude), `0x` hex
/// literals, and words made of letters, digits, `-` or `_`, which are hashed.
/// Duplicates are dropped; an empty list resolves to the default seed.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut resolved = Vec::new();
    let mut seen = HashSet::new();

    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let info = parse_token(token)?;
        if seen.insert(info.seed) {
            resolved.push(info);
        }
    }

    if resolved.is_empty() {
        resolved.push(SeedInfo::from_numeric(DEFAULT_SEED));
    }
    Ok(resolved)
}

fn parse_token(token: &str) -> Result<SeedInfo> {
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        let seed = u64::from_str_radix(hex, 16)
            .with_context(|| format!("invalid hex seed: {token}"))?;
        return Ok(SeedInfo::from_numeric(seed));
    }
    if let Ok(value) = token.parse::<i64>() {
        return Ok(SeedInfo::from_numeric(value.unsigned_abs()));
    }
    if let Ok(value) = token.parse::<u64>() {
        return Ok(SeedInfo::from_numeric(value));
    }
    if token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Ok(SeedInfo::from_phrase(token));
    }
    bail!("Unrecognized seed token: {token}");
}
