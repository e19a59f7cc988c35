use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::ItemId;

const BUILTIN_VOCABULARY: &str = include_str!("../../data/vocabulary.json");

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VocabularyError {
    #[error("unknown vocabulary category: {0}")]
    UnknownCategory(String),

    #[error("unknown HSK level selection: {0}")]
    UnknownLevel(String),

    #[error("invalid vocabulary document: {0}")]
    Parse(String),

    #[error("duplicate vocabulary id: {0}")]
    DuplicateId(ItemId),

    #[error("vocabulary item {id} has an empty {field}")]
    EmptyField { id: ItemId, field: &'static str },
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocabularyCategory {
    Pronouns,
    Family,
    Numbers,
    Time,
    Countries,
    Food,
    Animals,
    Verbs,
    Other,
    Names,
}

impl VocabularyCategory {
    pub const ALL: [Self; 10] = [
        Self::Pronouns,
        Self::Family,
        Self::Numbers,
        Self::Time,
        Self::Countries,
        Self::Food,
        Self::Animals,
        Self::Verbs,
        Self::Other,
        Self::Names,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pronouns => "pronouns",
            Self::Family => "family",
            Self::Numbers => "numbers",
            Self::Time => "time",
            Self::Countries => "countries",
            Self::Food => "food",
            Self::Animals => "animals",
            Self::Verbs => "verbs",
            Self::Other => "other",
            Self::Names => "names",
        }
    }
}

impl fmt::Display for VocabularyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VocabularyCategory {
    type Err = VocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == needle)
            .ok_or_else(|| VocabularyError::UnknownCategory(s.to_string()))
    }
}

//
// ─── LEVELS ────────────────────────────────────────────────────────────────────
//

/// A single HSK proficiency tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HskLevel {
    Hsk1,
    Hsk2,
    Hsk3,
    Hsk4,
}

impl HskLevel {
    pub const ALL: [Self; 4] = [Self::Hsk1, Self::Hsk2, Self::Hsk3, Self::Hsk4];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hsk1 => "hsk1",
            Self::Hsk2 => "hsk2",
            Self::Hsk3 => "hsk3",
            Self::Hsk4 => "hsk4",
        }
    }
}

/// Which tiers a practice session draws from.
///
/// Cumulative selections (`hsk1-3`) concatenate the tiers in ascending order,
/// which is the order sequential mode walks them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LevelSelection {
    #[default]
    #[serde(rename = "hsk1")]
    Hsk1,
    #[serde(rename = "hsk2")]
    Hsk2,
    #[serde(rename = "hsk3")]
    Hsk3,
    #[serde(rename = "hsk4")]
    Hsk4,
    #[serde(rename = "hsk1-2")]
    Hsk1To2,
    #[serde(rename = "hsk1-3")]
    Hsk1To3,
    #[serde(rename = "hsk1-4")]
    Hsk1To4,
    #[serde(rename = "all")]
    All,
}

impl LevelSelection {
    pub const ALL: [Self; 8] = [
        Self::Hsk1,
        Self::Hsk2,
        Self::Hsk3,
        Self::Hsk4,
        Self::Hsk1To2,
        Self::Hsk1To3,
        Self::Hsk1To4,
        Self::All,
    ];

    #[must_use]
    pub fn levels(self) -> &'static [HskLevel] {
        use HskLevel::{Hsk1, Hsk2, Hsk3, Hsk4};
        match self {
            Self::Hsk1 => &[Hsk1],
            Self::Hsk2 => &[Hsk2],
            Self::Hsk3 => &[Hsk3],
            Self::Hsk4 => &[Hsk4],
            Self::Hsk1To2 => &[Hsk1, Hsk2],
            Self::Hsk1To3 => &[Hsk1, Hsk2, Hsk3],
            Self::Hsk1To4 | Self::All => &[Hsk1, Hsk2, Hsk3, Hsk4],
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hsk1 => "hsk1",
            Self::Hsk2 => "hsk2",
            Self::Hsk3 => "hsk3",
            Self::Hsk4 => "hsk4",
            Self::Hsk1To2 => "hsk1-2",
            Self::Hsk1To3 => "hsk1-3",
            Self::Hsk1To4 => "hsk1-4",
            Self::All => "all",
        }
    }
}

impl fmt::Display for LevelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LevelSelection {
    type Err = VocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == needle)
            .ok_or_else(|| VocabularyError::UnknownLevel(s.to_string()))
    }
}

//
// ─── ITEMS ─────────────────────────────────────────────────────────────────────
//

/// One word or phrase to practice. Never mutated after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub id: ItemId,
    pub chinese: String,
    pub pinyin: String,
    pub english: String,
    pub category: VocabularyCategory,
}

/// Read-only vocabulary partitioned by HSK level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    levels: BTreeMap<HskLevel, Vec<VocabularyItem>>,
}

impl Vocabulary {
    /// Parse a vocabulary document of the form `{"hsk1": [items], "hsk2": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns `VocabularyError::Parse` for malformed JSON, `DuplicateId` when an
    /// id appears twice across levels, and `EmptyField` for blank text fields.
    pub fn from_json(raw: &str) -> Result<Self, VocabularyError> {
        let levels: BTreeMap<HskLevel, Vec<VocabularyItem>> =
            serde_json::from_str(raw).map_err(|err| VocabularyError::Parse(err.to_string()))?;
        Self::from_levels(levels)
    }

    /// Build a vocabulary from already-partitioned items.
    ///
    /// # Errors
    ///
    /// Same validation as [`Vocabulary::from_json`].
    pub fn from_levels(
        levels: BTreeMap<HskLevel, Vec<VocabularyItem>>,
    ) -> Result<Self, VocabularyError> {
        let mut ids = HashSet::new();
        for item in levels.values().flatten() {
            for (field, value) in [
                ("id", item.id.as_str()),
                ("chinese", item.chinese.as_str()),
                ("pinyin", item.pinyin.as_str()),
            ] {
                if value.trim().is_empty() {
                    return Err(VocabularyError::EmptyField {
                        id: item.id.clone(),
                        field,
                    });
                }
            }
            if !ids.insert(item.id.clone()) {
                return Err(VocabularyError::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self { levels })
    }

    /// The starter word list compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns `VocabularyError` if the bundled document fails validation.
    pub fn builtin() -> Result<Self, VocabularyError> {
        Self::from_json(BUILTIN_VOCABULARY)
    }

    #[must_use]
    pub fn level(&self, level: HskLevel) -> &[VocabularyItem] {
        self.levels.get(&level).map_or(&[], Vec::as_slice)
    }

    /// Items of every tier in `selection`, in tier order.
    #[must_use]
    pub fn for_selection(&self, selection: LevelSelection) -> Vec<VocabularyItem> {
        selection
            .levels()
            .iter()
            .flat_map(|level| self.level(*level).iter().cloned())
            .collect()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&VocabularyItem> {
        self.levels
            .values()
            .flatten()
            .find(|item| item.id.as_str() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
