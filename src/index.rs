//! Collects [`IndexEntry`]s as posts are transformed and renders the index
//! page from them, newest first.

use crate::post::IndexEntry;
use crate::value::index_value;
use crate::write::{PageEmitter, Result, TemplateKind};
use std::path::Path;
use tracing::info;

/// The posts that will be listed on the index page.
#[derive(Debug, Default)]
pub struct Index {
    entries: Vec<IndexEntry>,
}

impl Index {
    pub fn push(&mut self, entry: IndexEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entries ordered by date, most recent first. Dates are
    /// compared as plain strings, which is chronological for `YYYY-MM-DD`;
    /// entries with the same date keep the order they were pushed in.
    pub fn into_sorted(self) -> Vec<IndexEntry> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        entries
    }

    /// Sorts the entries and renders them to `dest` with the index template.
    /// Returns the entries in the order they were rendered.
    pub fn write(self, emitter: &dyn PageEmitter, dest: &Path) -> Result<Vec<IndexEntry>> {
        let entries = self.into_sorted();
        emitter.emit(TemplateKind::Index, index_value(&entries), dest)?;
        info!(path = %dest.display(), posts = entries.len(), "generated blog index");
        Ok(entries)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(title: &str, date: &str) -> IndexEntry {
        IndexEntry {
            title: title.to_owned(),
            date: date.to_owned(),
            ..IndexEntry::default()
        }
    }

    fn titles(entries: &[IndexEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn test_newest_first() {
        let mut index = Index::default();
        index.push(entry("b", "2024-01-15"));
        index.push(entry("c", "2023-12-31"));
        index.push(entry("a", "2024-03-01"));
        assert_eq!(vec!["a", "b", "c"], titles(&index.into_sorted()));
    }

    #[test]
    fn test_ties_keep_push_order() {
        let mut index = Index::default();
        index.push(entry("first", "2024-01-01"));
        index.push(entry("newer", "2024-02-01"));
        index.push(entry("second", "2024-01-01"));
        index.push(entry("third", "2024-01-01"));
        assert_eq!(
            vec!["newer", "first", "second", "third"],
            titles(&index.into_sorted())
        );
    }

    #[test]
    fn test_malformed_dates_sort_as_strings() {
        let mut index = Index::default();
        index.push(entry("iso", "2024-03-01"));
        index.push(entry("bad", "not-a-date"));
        index.push(entry("empty", ""));
        assert_eq!(
            vec!["bad", "iso", "empty"],
            titles(&index.into_sorted())
        );
    }
}
