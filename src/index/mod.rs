pub mod arity;
pub mod models;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use arity::Arity;
pub use models::*;

/// Below this length fuzzy matching is too noisy; prefix search is used instead.
const MIN_FUZZY_QUERY_LEN: usize = 4;

/// Multi-valued declaration store keyed by name.
///
/// Every name maps to the entries declared under it in insertion order, so a
/// class reopened three times yields three entries. All methods take `&self`;
/// a single lock serializes writers, which keeps per-name ordering stable when
/// several indexing workers share one index.
#[derive(Debug, Default)]
pub struct Index {
    entries: RwLock<HashMap<String, Vec<Entry>>>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<Entry>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Vec<Entry>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, entry: Entry) {
        self.write().entry(entry.name.clone()).or_default().push(entry);
    }

    /// Entries declared under exactly `name`, in insertion order.
    ///
    /// Returns a snapshot: the entries are cloned out of the lock, so a later
    /// [`Index::set_visibility`] or [`Index::update`] is visible to the next
    /// `get` but not to vectors already returned.
    pub fn get(&self, name: &str) -> Vec<Entry> {
        self.read().get(name).cloned().unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// All indexed names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Total number of entries across all names
    pub fn len(&self) -> usize {
        self.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Applies `f` to every entry under `name` in place. Returns how many entries were visited.
    pub fn update<F>(&self, name: &str, mut f: F) -> usize
    where
        F: FnMut(&mut Entry),
    {
        let mut entries = self.write();
        match entries.get_mut(name) {
            Some(bucket) => {
                bucket.iter_mut().for_each(&mut f);
                bucket.len()
            }
            None => 0,
        }
    }

    pub fn set_visibility(&self, name: &str, visibility: Visibility) -> usize {
        self.update(name, |entry| entry.visibility = visibility)
    }

    /// Swaps the bucket for `name`, e.g. after resolving aliases. An empty
    /// replacement removes the name.
    pub fn replace(&self, name: &str, replacement: Vec<Entry>) -> Vec<Entry> {
        let mut entries = self.write();
        let previous = if replacement.is_empty() {
            entries.remove(name)
        } else {
            entries.insert(name.to_string(), replacement)
        };
        previous.unwrap_or_default()
    }

    /// Every alias still waiting for a whole-index resolution pass
    pub fn unresolved_aliases(&self) -> Vec<Entry> {
        let entries = self.read();
        let mut aliases: Vec<Entry> = entries
            .values()
            .flatten()
            .filter(|entry| matches!(entry.kind, EntryKind::UnresolvedAlias { .. }))
            .cloned()
            .collect();
        aliases.sort_by(|a, b| a.name.cmp(&b.name));
        aliases
    }

    /// Drops every entry declared in `file_path`. Returns the number removed.
    pub fn remove_file(&self, file_path: &str) -> usize {
        let mut entries = self.write();
        let mut removed = 0;

        entries.retain(|_, bucket| {
            let before = bucket.len();
            bucket.retain(|entry| entry.file_path != file_path);
            removed += before - bucket.len();
            !bucket.is_empty()
        });

        removed
    }

    /// Entries whose name starts with `prefix`, grouped by name in sorted order
    pub fn prefix_search(&self, prefix: &str) -> Vec<Entry> {
        let entries = self.read();
        let mut names: Vec<&String> = entries.keys().filter(|name| name.starts_with(prefix)).collect();
        names.sort();

        names
            .into_iter()
            .flat_map(|name| entries[name].iter().cloned())
            .collect()
    }

    /// Entries whose name is similar to `query` (Jaro-Winkler, case-insensitive),
    /// best match first. Queries shorter than four characters use prefix search.
    pub fn fuzzy_search(&self, query: &str, threshold: f64) -> Vec<(Entry, f64)> {
        use strsim::jaro_winkler;

        if query.len() < MIN_FUZZY_QUERY_LEN {
            return self
                .prefix_search(query)
                .into_iter()
                .map(|entry| (entry, 1.0))
                .collect();
        }

        let query_lower = query.to_lowercase();
        let entries = self.read();

        let mut scored: Vec<(&String, f64)> = entries
            .keys()
            .map(|name| {
                // compare against both the full name and the last segment
                let lower = name.to_lowercase();
                let short = lower.rsplit("::").next().unwrap_or(lower.as_str());
                let score = jaro_winkler(&query_lower, &lower).max(jaro_winkler(&query_lower, short));
                (name, score)
            })
            .filter(|(_, score)| *score >= threshold)
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        scored
            .into_iter()
            .flat_map(|(name, score)| entries[name].iter().cloned().map(move |entry| (entry, score)))
            .collect()
    }

    pub fn stats(&self) -> IndexStats {
        let entries = self.read();
        let mut files = HashSet::new();
        let mut by_kind: BTreeMap<&'static str, usize> = BTreeMap::new();

        for entry in entries.values().flatten() {
            files.insert(entry.file_path.as_str());
            *by_kind.entry(entry.kind.as_str()).or_default() += 1;
        }

        IndexStats {
            total_files: files.len(),
            total_names: entries.len(),
            total_entries: entries.values().map(Vec::len).sum(),
            entries_by_kind: by_kind
                .into_iter()
                .map(|(kind, count)| (kind.to_string(), count))
                .collect(),
        }
    }

    pub fn clear(&self) {
        self.write().clear();
    }
}
