use std::fmt;

use crate::storage::LocalPreferenceCache;

pub const LANGUAGE_KEY: &str = "settings.lang";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    Polish,
    English,
}

impl Language {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Polish => "pl",
            Self::English => "en",
        }
    }

    /// Accepts bare codes and region tags (`en`, `en-US`, `pl_PL`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "pl" => Some(Self::Polish),
            "en" => Some(Self::English),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Cached language, or Polish when nothing usable is stored.
pub fn detect_language(cache: &dyn LocalPreferenceCache, key: &str) -> Language {
    match cache.get(key) {
        Ok(Some(stored)) => Language::from_tag(&stored).unwrap_or_else(|| {
            tracing::warn!(stored = %stored, "unknown cached language; using default");
            Language::default()
        }),
        Ok(None) => Language::default(),
        Err(err) => {
            tracing::warn!(?err, "failed to read cached language; using default");
            Language::default()
        }
    }
}

pub fn cache_language(cache: &dyn LocalPreferenceCache, key: &str, language: Language) {
    if let Err(err) = cache.set(key, language.code()) {
        tracing::warn!(?err, language = %language, "failed to cache language");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryCache, StorageError, StorageResult};

    struct BrokenCache;

    impl LocalPreferenceCache for BrokenCache {
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Unavailable("disk gone".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Unavailable("disk gone".into()))
        }
    }

    #[test]
    fn tags_with_regions_are_accepted() {
        assert_eq!(Language::from_tag("en-US"), Some(Language::English));
        assert_eq!(Language::from_tag("pl_PL"), Some(Language::Polish));
        assert_eq!(Language::from_tag("EN"), Some(Language::English));
        assert_eq!(Language::from_tag("de"), None);
    }

    #[test]
    fn detect_defaults_to_polish() {
        assert_eq!(
            detect_language(&MemoryCache::new(), LANGUAGE_KEY),
            Language::Polish
        );
        assert_eq!(
            detect_language(&MemoryCache::with_entry(LANGUAGE_KEY, "fr"), LANGUAGE_KEY),
            Language::Polish
        );
        assert_eq!(detect_language(&BrokenCache, LANGUAGE_KEY), Language::Polish);
    }

    #[test]
    fn cached_language_round_trips_through_cache() {
        let cache = MemoryCache::new();
        cache_language(&cache, LANGUAGE_KEY, Language::English);
        assert_eq!(detect_language(&cache, LANGUAGE_KEY), Language::English);
    }

    #[test]
    fn cache_failures_are_swallowed() {
        cache_language(&BrokenCache, LANGUAGE_KEY, Language::English);
    }
}
