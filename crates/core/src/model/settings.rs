use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::vocabulary::{LevelSelection, VocabularyCategory};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {raw}")]
pub struct ParseSettingError {
    kind: &'static str,
    raw: String,
}

impl ParseSettingError {
    #[must_use]
    pub fn new(kind: &'static str, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }
}

/// How the next word is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeMode {
    #[default]
    Sequential,
    Random,
    Review,
}

impl PracticeMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Random => "random",
            Self::Review => "review",
        }
    }
}

impl fmt::Display for PracticeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PracticeMode {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "random" => Ok(Self::Random),
            "review" => Ok(Self::Review),
            _ => Err(ParseSettingError::new("practice mode", s)),
        }
    }
}

/// Presentation preference. Stored for the front end, not interpreted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

impl FromStr for Theme {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            _ => Err(ParseSettingError::new("theme", s)),
        }
    }
}

/// User-chosen practice setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeSettings {
    pub selected_categories: Vec<VocabularyCategory>,
    pub mode: PracticeMode,
    pub level: LevelSelection,
    pub show_translation: bool,
    pub theme: Theme,
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            selected_categories: vec![VocabularyCategory::Pronouns],
            mode: PracticeMode::default(),
            level: LevelSelection::default(),
            show_translation: true,
            theme: Theme::default(),
        }
    }
}

impl PracticeSettings {
    /// Whether switching from `self` to `other` changes which words are practiced.
    ///
    /// Presentation-only changes (translation, theme) keep the saved position.
    #[must_use]
    pub fn changes_word_list(&self, other: &Self) -> bool {
        self.selected_categories != other.selected_categories
            || self.mode != other.mode
            || self.level != other.level
    }
}
