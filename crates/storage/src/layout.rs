//! Key/value layout of the persisted practice state.
//!
//! Every value is a JSON document stored under a fixed key. A missing key
//! reads as its default; a value that fails to decode also reads as the
//! default and is logged, so one corrupt entry never blocks the others.

use pinyin_core::model::{
    ItemId, LevelSelection, PracticeMode, PracticeSettings, ProgressRecord, Theme,
    VocabularyCategory,
};
use pinyin_core::stats::PracticeStats;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, BTreeSet};

use crate::repository::StorageError;

pub const STATS_KEY: &str = "chinese-practice-stats";
pub const CURRENT_INDEX_KEY: &str = "chinese-practice-current-index";
pub const PRACTICED_WORDS_KEY: &str = "chinese-practice-practiced-words";
pub const MODE_KEY: &str = "chinese-practice-mode";
pub const LEVEL_KEY: &str = "chinese-practice-hsk-level";
pub const PROGRESS_KEY: &str = "chinese-practice-progress";
pub const CATEGORIES_KEY: &str = "chinese-practice-categories";
pub const SHOW_TRANSLATION_KEY: &str = "chinese-practice-show-translation";
pub const THEME_KEY: &str = "chinese-practice-theme";

pub const ALL_KEYS: [&str; 9] = [
    STATS_KEY,
    CURRENT_INDEX_KEY,
    PRACTICED_WORDS_KEY,
    MODE_KEY,
    LEVEL_KEY,
    PROGRESS_KEY,
    CATEGORIES_KEY,
    SHOW_TRANSLATION_KEY,
    THEME_KEY,
];

/// Everything the practice engine keeps between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PracticeState {
    pub stats: PracticeStats,
    /// Position in the sequential word list.
    pub current_index: usize,
    /// Words already shown in the current random-mode cycle.
    pub practiced_words: BTreeSet<ItemId>,
    pub progress: ProgressRecord,
    pub settings: PracticeSettings,
}

impl PracticeState {
    /// Encode every key of the layout.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if a value cannot be encoded.
    pub fn to_entries(&self) -> Result<Vec<(&'static str, String)>, StorageError> {
        let categories: Vec<&str> = self
            .settings
            .selected_categories
            .iter()
            .map(|category| category.as_str())
            .collect();

        Ok(vec![
            (STATS_KEY, encode(&self.stats)?),
            (CURRENT_INDEX_KEY, encode(&self.current_index)?),
            (PRACTICED_WORDS_KEY, encode(&self.practiced_words)?),
            (MODE_KEY, encode(&self.settings.mode)?),
            (LEVEL_KEY, encode(&self.settings.level)?),
            (PROGRESS_KEY, encode(&self.progress)?),
            (CATEGORIES_KEY, encode(&categories)?),
            (SHOW_TRANSLATION_KEY, encode(&self.settings.show_translation)?),
            (THEME_KEY, encode(&self.settings.theme)?),
        ])
    }

    /// Decode the layout from raw entries, defaulting missing or corrupt keys.
    #[must_use]
    pub fn from_entries(entries: &BTreeMap<String, String>) -> Self {
        let defaults = PracticeSettings::default();
        let settings = PracticeSettings {
            selected_categories: decode_categories(entries)
                .unwrap_or(defaults.selected_categories),
            mode: decode::<PracticeMode>(entries, MODE_KEY).unwrap_or(defaults.mode),
            level: decode::<LevelSelection>(entries, LEVEL_KEY).unwrap_or(defaults.level),
            show_translation: decode(entries, SHOW_TRANSLATION_KEY)
                .unwrap_or(defaults.show_translation),
            theme: decode::<Theme>(entries, THEME_KEY).unwrap_or(defaults.theme),
        };

        Self {
            stats: decode(entries, STATS_KEY).unwrap_or_default(),
            current_index: decode(entries, CURRENT_INDEX_KEY).unwrap_or_default(),
            practiced_words: decode(entries, PRACTICED_WORDS_KEY).unwrap_or_default(),
            progress: decode(entries, PROGRESS_KEY).unwrap_or_default(),
            settings,
        }
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|err| StorageError::Serialization(err.to_string()))
}

fn decode<T: DeserializeOwned>(entries: &BTreeMap<String, String>, key: &str) -> Option<T> {
    let raw = entries.get(key)?;
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, error = %err, "ignoring corrupt persisted value");
            None
        }
    }
}

/// Unknown category names are dropped individually.
fn decode_categories(entries: &BTreeMap<String, String>) -> Option<Vec<VocabularyCategory>> {
    let names: Vec<String> = decode(entries, CATEGORIES_KEY)?;
    let categories = names
        .iter()
        .filter_map(|name| match name.parse() {
            Ok(category) => Some(category),
            Err(err) => {
                tracing::warn!(category = %name, error = %err, "dropping unknown category");
                None
            }
        })
        .collect();
    Some(categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinyin_core::stats::Outcome;
    use pinyin_core::time::fixed_now;

    fn entries(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn absent_keys_read_as_defaults() {
        let state = PracticeState::from_entries(&BTreeMap::new());
        assert_eq!(state, PracticeState::default());
        assert_eq!(
            state.settings.selected_categories,
            vec![VocabularyCategory::Pronouns]
        );
        assert!(state.settings.show_translation);
    }

    #[test]
    fn encoded_values_use_documented_shapes() {
        let id = ItemId::new("hsk1-001");
        let mut state = PracticeState {
            current_index: 4,
            ..PracticeState::default()
        };
        state.stats = state.stats.apply(&id, Outcome::Correct);
        state.practiced_words.insert(id.clone());
        state.progress.record(&id, true, fixed_now());
        state.settings.level = LevelSelection::Hsk1To3;

        let encoded: BTreeMap<_, _> = state.to_entries().unwrap().into_iter().collect();
        assert_eq!(encoded.len(), ALL_KEYS.len());
        assert_eq!(encoded[CURRENT_INDEX_KEY], "4");
        assert_eq!(encoded[PRACTICED_WORDS_KEY], r#"["hsk1-001"]"#);
        assert_eq!(encoded[MODE_KEY], r#""sequential""#);
        assert_eq!(encoded[LEVEL_KEY], r#""hsk1-3""#);
        assert_eq!(encoded[CATEGORIES_KEY], r#"["pronouns"]"#);
        assert_eq!(encoded[SHOW_TRANSLATION_KEY], "true");
        assert_eq!(encoded[THEME_KEY], r#""system""#);
        assert!(encoded[PROGRESS_KEY].contains(r#""correctCount":1"#));
        assert!(encoded[STATS_KEY].contains(r#""totalAttempts":1"#));
    }

    #[test]
    fn corrupt_value_falls_back_without_affecting_others() {
        let state = PracticeState::from_entries(&entries(&[
            (STATS_KEY, "{not json"),
            (MODE_KEY, r#""review""#),
            (CURRENT_INDEX_KEY, "-3"),
        ]));
        assert_eq!(state.stats, PracticeStats::default());
        assert_eq!(state.current_index, 0);
        assert_eq!(state.settings.mode, PracticeMode::Review);
    }

    #[test]
    fn unknown_categories_are_dropped() {
        let state = PracticeState::from_entries(&entries(&[(
            CATEGORIES_KEY,
            r#"["food", "spaceships", "verbs"]"#,
        )]));
        assert_eq!(
            state.settings.selected_categories,
            vec![VocabularyCategory::Food, VocabularyCategory::Verbs]
        );
    }

    #[test]
    fn empty_category_selection_is_kept() {
        let state = PracticeState::from_entries(&entries(&[(CATEGORIES_KEY, "[]")]));
        assert!(state.settings.selected_categories.is_empty());
    }
}
