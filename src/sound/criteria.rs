/// Criterion keys used to pick conditional sounds by discriminator.
///
/// Supported forms, matched case-insensitively:
///
/// - `ALL` or `*`: any discriminator
/// - `DIAMOND_SWORD`: exact token
/// - `DIAMOND_SWORD,IRON_SWORD`: any listed token
/// - `DIAMOND_*` / `*_SWORD`: one leading or trailing wildcard per token
///
/// Anything else is rejected when the configuration is loaded.
use crate::error::SoundConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    Any,
    Exact(String),
    Prefix(String),
    Suffix(String),
}

impl Pattern {
    fn parse(token: &str) -> Result<Self, String> {
        if token.is_empty() {
            return Err("empty token".to_string());
        }
        if token == "*" || token == "ALL" {
            return Ok(Pattern::Any);
        }

        let (body, pattern): (&str, fn(String) -> Pattern) =
            if let Some(rest) = token.strip_suffix('*') {
                (rest, Pattern::Prefix)
            } else if let Some(rest) = token.strip_prefix('*') {
                (rest, Pattern::Suffix)
            } else {
                (token, Pattern::Exact)
            };

        if body.is_empty() || body.contains('*') {
            return Err(format!("unsupported wildcard in {:?}", token));
        }
        if let Some(c) = body
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '-')))
        {
            return Err(format!("unexpected character {:?} in {:?}", c, token));
        }

        Ok(pattern(body.to_string()))
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Pattern::Any => true,
            Pattern::Exact(s) => value == s,
            Pattern::Prefix(s) => value.starts_with(s.as_str()),
            Pattern::Suffix(s) => value.ends_with(s.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criterion {
    key: String,
    patterns: Vec<Pattern>,
}

impl Criterion {
    pub fn parse(key: &str) -> Result<Self, SoundConfigError> {
        let patterns = key
            .split(',')
            .map(|token| Pattern::parse(&token.trim().to_ascii_uppercase()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|reason| SoundConfigError::invalid(key, format!("bad criterion: {}", reason)))?;

        Ok(Self {
            key: key.to_string(),
            patterns,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn matches(&self, discriminator: &str) -> bool {
        let value = discriminator.trim().to_ascii_uppercase();
        self.patterns.iter().any(|p| p.matches(&value))
    }
}

/// Parse-and-match in one step. An invalid key never matches.
pub fn matches(key: &str, discriminator: &str) -> bool {
    Criterion::parse(key)
        .map(|c| c.matches(discriminator))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_is_case_insensitive() {
        assert!(matches("DIAMOND_SWORD", "diamond_sword"));
        assert!(matches("diamond_sword", "DIAMOND_SWORD"));
        assert!(!matches("DIAMOND_SWORD", "DIAMOND_SWORDS"));
    }

    #[test]
    fn test_all_sentinels() {
        assert!(matches("ALL", "anything"));
        assert!(matches("all", "STONE"));
        assert!(matches("*", "STONE"));
    }

    #[test]
    fn test_sets() {
        let c = Criterion::parse("DIAMOND_SWORD, IRON_SWORD ,stone").unwrap();
        assert!(c.matches("IRON_SWORD"));
        assert!(c.matches("Stone"));
        assert!(!c.matches("GOLD_SWORD"));
        assert_eq!(c.key(), "DIAMOND_SWORD, IRON_SWORD ,stone");
    }

    #[test]
    fn test_wildcards() {
        assert!(matches("*_SWORD", "NETHERITE_SWORD"));
        assert!(!matches("*_SWORD", "SWORD_FISH"));
        assert!(matches("DIAMOND_*", "DIAMOND_PICKAXE"));
        assert!(matches("ZOMBIE,*_SPIDER", "CAVE_SPIDER"));
    }

    #[test]
    fn test_invalid_keys() {
        for key in ["", "A,,B", "DIA*MOND", "*SWORD*", "**", "SWORD FISH", "BAD!"] {
            assert!(
                matches!(Criterion::parse(key), Err(SoundConfigError::InvalidSoundConfig { .. })),
                "expected {:?} to be rejected",
                key
            );
            assert!(!matches(key, "SWORD"));
        }
    }
}
