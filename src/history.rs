//! Search, render and delete over the saved prompt history.

use std::sync::Arc;

use chrono::Local;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::PromptRecord;
use crate::notify::ToastNotifier;
use crate::shared::Shared;
use crate::storage::HistoryStore;

pub const EMPTY_HISTORY: &str = "No saved prompts yet. Enhance a prompt and save it to see it here.";

const TITLE_CHARS: usize = 80;

/// Opens a saved record in the enhance feature.
pub type LoadRecord = Arc<dyn Fn(&PromptRecord) + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryItem {
    pub id: String,
    pub title: String,
    pub date: String,
}

impl From<&PromptRecord> for HistoryItem {
    fn from(record: &PromptRecord) -> Self {
        let mut title: String = record.original.chars().take(TITLE_CHARS).collect();
        if record.original.chars().count() > TITLE_CHARS {
            title.push('…');
        }
        Self {
            id: record.id.clone(),
            title,
            date: record
                .timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryListing {
    /// Nothing matched; show the placeholder instead of an empty list.
    Empty { placeholder: &'static str },
    Items(Vec<HistoryItem>),
}

/// Records whose `original` or `enhanced` text contains `term`, ignoring
/// case. Store order is preserved and an empty term matches everything.
pub fn filter_records(records: Vec<PromptRecord>, term: &str) -> Vec<PromptRecord> {
    let needle = term.to_lowercase();
    records
        .into_iter()
        .filter(|record| record.matches(&needle))
        .collect()
}

#[derive(Clone)]
pub struct HistoryController {
    store: HistoryStore,
    notifier: ToastNotifier,
    search: Shared<String>,
    on_load: LoadRecord,
}

impl HistoryController {
    pub fn new(store: HistoryStore, notifier: ToastNotifier, on_load: LoadRecord) -> Self {
        Self {
            store,
            notifier,
            search: Shared::default(),
            on_load,
        }
    }

    pub fn search(&self) -> String {
        self.search.snapshot()
    }

    /// Re-reads the whole history and renders what matches the current
    /// search term.
    pub async fn render(&self) -> Result<HistoryListing> {
        let term = self.search();
        let records = filter_records(self.store.list().await?, &term);
        debug!(count = records.len(), term = %term, "rendering history");
        if records.is_empty() {
            return Ok(HistoryListing::Empty {
                placeholder: EMPTY_HISTORY,
            });
        }
        Ok(HistoryListing::Items(
            records.iter().map(HistoryItem::from).collect(),
        ))
    }

    pub async fn set_search(&self, term: &str) -> Result<HistoryListing> {
        self.search.with(|search| *search = term.to_string());
        self.render().await
    }

    /// Click on an item. Returns false if the record is gone.
    pub async fn load(&self, id: &str) -> Result<bool> {
        let records = self.store.list().await?;
        let Some(record) = records.iter().find(|record| record.id == id) else {
            warn!(id, "history item no longer exists");
            return Ok(false);
        };
        (self.on_load)(record);
        self.notifier.success("Loaded", "Prompt loaded from history");
        Ok(true)
    }

    /// Click on an item's delete button: removes the record, re-renders and
    /// notifies. Never opens the item.
    pub async fn delete(&self, id: &str) -> Result<HistoryListing> {
        self.store.remove(id).await?;
        let listing = self.render().await?;
        self.notifier.success("Deleted", "Prompt removed from history");
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::storage::MemoryStore;

    fn record(original: &str, enhanced: &str) -> PromptRecord {
        PromptRecord::new(original, enhanced).unwrap()
    }

    struct Fixture {
        controller: HistoryController,
        store: HistoryStore,
        loaded: Shared<Vec<String>>,
        notifier: ToastNotifier,
    }

    fn fixture() -> Fixture {
        let store = HistoryStore::new(Arc::new(MemoryStore::new()));
        let notifier = ToastNotifier::new(Duration::from_secs(60));
        let loaded: Shared<Vec<String>> = Shared::default();
        let sink = loaded.clone();
        let controller = HistoryController::new(
            store.clone(),
            notifier.clone(),
            Arc::new(move |record: &PromptRecord| sink.with(|l| l.push(record.id.clone()))),
        );
        Fixture {
            controller,
            store,
            loaded,
            notifier,
        }
    }

    #[test]
    fn search_is_case_insensitive_over_both_fields() {
        let poem = record("Write a poem", "Compose a sonnet about the sea");
        let other = record("Fix my code", "Debug this Rust function");
        let records = vec![poem.clone(), other.clone()];

        for term in ["poem", "POEM", "write", "SONNET"] {
            assert_eq!(filter_records(records.clone(), term), vec![poem.clone()], "term {term}");
        }
        assert!(filter_records(records.clone(), "haiku").is_empty());
        assert_eq!(filter_records(records.clone(), ""), records);
    }

    #[test]
    fn long_titles_are_truncated() {
        let long = "x".repeat(100);
        let item = HistoryItem::from(&record(&long, "e"));
        assert_eq!(item.title.chars().count(), 81);
        assert!(item.title.ends_with('…'));

        let short = HistoryItem::from(&record("short", "e"));
        assert_eq!(short.title, "short");
    }

    #[tokio::test]
    async fn empty_history_renders_placeholder() {
        let f = fixture();
        assert_eq!(
            f.controller.render().await.unwrap(),
            HistoryListing::Empty {
                placeholder: EMPTY_HISTORY
            }
        );

        f.store.append(record("Write a poem", "e")).await.unwrap();
        assert_eq!(
            f.controller.set_search("haiku").await.unwrap(),
            HistoryListing::Empty {
                placeholder: EMPTY_HISTORY
            }
        );
    }

    #[tokio::test]
    async fn renders_matches_in_store_order() {
        let f = fixture();
        let first = record("Write a poem", "e1");
        let second = record("Write an essay", "e2");
        let third = record("Fix my code", "e3");
        for r in [first.clone(), second.clone(), third.clone()] {
            f.store.append(r).await.unwrap();
        }

        let HistoryListing::Items(items) = f.controller.set_search("write").await.unwrap() else {
            panic!("expected items");
        };
        let ids: Vec<_> = items.into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn delete_removes_without_loading() {
        let f = fixture();
        let keep = record("keep me", "e");
        let gone = record("drop me", "e");
        f.store.append(keep.clone()).await.unwrap();
        f.store.append(gone.clone()).await.unwrap();

        let listing = f.controller.delete(&gone.id).await.unwrap();
        assert_eq!(listing, HistoryListing::Items(vec![HistoryItem::from(&keep)]));
        assert!(f.loaded.snapshot().is_empty());
        assert_eq!(f.notifier.last().unwrap().title, "Deleted");
    }

    #[tokio::test]
    async fn load_invokes_callback() {
        let f = fixture();
        let saved = record("Write a poem", "e");
        f.store.append(saved.clone()).await.unwrap();

        assert!(f.controller.load(&saved.id).await.unwrap());
        assert_eq!(f.loaded.snapshot(), vec![saved.id]);
        assert_eq!(f.notifier.last().unwrap().title, "Loaded");

        assert!(!f.controller.load("missing").await.unwrap());
    }
}
