//! Application preferences model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{SortBy, SortOrder};

const SORT_BY_KEY: &str = "sortBy";
const SORT_ORDER_KEY: &str = "sortOrder";

/// Open-ended preferences map.
///
/// Keys the core does not know about are carried through untouched so other
/// front ends can keep their own settings in the same record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences(Map<String, Value>);

impl Preferences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Stored sort key, ignoring values this version does not understand
    pub fn sort_by(&self) -> Option<SortBy> {
        self.get(SORT_BY_KEY)?.as_str()?.parse().ok()
    }

    pub fn set_sort_by(&mut self, sort_by: SortBy) {
        self.set(SORT_BY_KEY, sort_by.as_str());
    }

    /// Stored sort direction, ignoring values this version does not understand
    pub fn sort_order(&self) -> Option<SortOrder> {
        self.get(SORT_ORDER_KEY)?.as_str()?.parse().ok()
    }

    pub fn set_sort_order(&mut self, sort_order: SortOrder) {
        self.set(SORT_ORDER_KEY, sort_order.as_str());
    }
}
