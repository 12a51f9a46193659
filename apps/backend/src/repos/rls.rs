//! Row-level security identifiers threaded through a request.

use std::collections::BTreeMap;

use uuid::Uuid;

/// Identifier constraints keyed by foreign-key column name, e.g.
/// `{"account_id": [..], "game_id": [..]}`.
///
/// For a table whose own RLS key (`<table>_id`) is present, that key constrains
/// the `id` column instead. Keys naming columns a table does not have are ignored
/// for that table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rls(BTreeMap<String, Vec<Uuid>>);

impl Rls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.0.insert(key.into(), ids.into_iter().collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&[Uuid]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// Column constraints for `table`, with the table's own key moved onto `id`.
    ///
    /// Works on a copy so the caller's identifiers stay untouched.
    pub fn constraints_for(&self, table: &str) -> BTreeMap<String, Vec<Uuid>> {
        let mut constraints = self.0.clone();
        if let Some(own) = constraints.remove(&format!("{table}_id")) {
            constraints.insert("id".to_string(), own);
        }
        constraints
    }
}
