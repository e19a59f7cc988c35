use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::ItemId;

/// Attempt counters for a single vocabulary item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemProgress {
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub last_practiced: DateTime<Utc>,
}

impl ItemProgress {
    #[must_use]
    pub fn has_mistakes(&self) -> bool {
        self.incorrect_count > 0
    }
}

/// Per-item attempt history keyed by item id.
///
/// Entries are only ever added or incremented; [`ProgressRecord::clear`] is
/// reserved for an explicit full reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressRecord {
    items: BTreeMap<ItemId, ItemProgress>,
}

impl ProgressRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one attempt for `id` and stamp it with `at`.
    pub fn record(&mut self, id: &ItemId, correct: bool, at: DateTime<Utc>) -> &ItemProgress {
        let entry = self.items.entry(id.clone()).or_insert(ItemProgress {
            correct_count: 0,
            incorrect_count: 0,
            last_practiced: at,
        });
        if correct {
            entry.correct_count = entry.correct_count.saturating_add(1);
        } else {
            entry.incorrect_count = entry.incorrect_count.saturating_add(1);
        }
        entry.last_practiced = at;
        entry
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ItemProgress> {
        self.items.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &ItemProgress)> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
