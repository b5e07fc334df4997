//! The postponed backlog and its per-partition view state.

use chrono::NaiveDate;
use datebook_core::MultiSelection;
use datebook_domain::{sort_items, EventId, PostponedEntry, PostponedView, SortMode};
use serde::Serialize;
use std::ops::{Index, IndexMut};

/// Where a transfer places its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum TransferTarget {
    Date(NaiveDate),
    Backlog(PostponedView),
}

/// One value per backlog partition.
#[derive(Debug, Clone, Default)]
pub struct Partitioned<T> {
    week: T,
    all: T,
}

impl<T> Partitioned<T> {
    pub fn iter(&self) -> impl Iterator<Item = (PostponedView, &T)> {
        [(PostponedView::Week, &self.week), (PostponedView::All, &self.all)].into_iter()
    }
}

impl<T> Index<PostponedView> for Partitioned<T> {
    type Output = T;

    fn index(&self, view: PostponedView) -> &T {
        match view {
            PostponedView::Week => &self.week,
            PostponedView::All => &self.all,
        }
    }
}

impl<T> IndexMut<PostponedView> for Partitioned<T> {
    fn index_mut(&mut self, view: PostponedView) -> &mut T {
        match view {
            PostponedView::Week => &mut self.week,
            PostponedView::All => &mut self.all,
        }
    }
}

/// UI state a partition keeps to itself.
#[derive(Debug, Clone, Default)]
pub struct PartitionState {
    pub sort: SortMode,
    pub selection: MultiSelection<EventId>,
    pub transfer_target: Option<TransferTarget>,
}

#[derive(Debug, Clone, Default)]
pub struct PostponedBacklog {
    entries: Partitioned<Vec<PostponedEntry>>,
    state: Partitioned<PartitionState>,
}

impl PostponedBacklog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries of one partition in that partition's sort order.
    pub fn entries(&self, view: PostponedView) -> Vec<PostponedEntry> {
        let mut entries = self.entries[view].clone();
        sort_items(&mut entries, self.state[view].sort);
        entries
    }

    pub fn find(&self, id: &EventId) -> Option<&PostponedEntry> {
        self.entries
            .iter()
            .flat_map(|(_, entries)| entries.iter())
            .find(|entry| &entry.id == id)
    }

    pub fn len(&self, view: PostponedView) -> usize {
        self.entries[view].len()
    }

    pub fn total(&self) -> usize {
        self.len(PostponedView::Week) + self.len(PostponedView::All)
    }

    pub fn state(&self, view: PostponedView) -> &PartitionState {
        &self.state[view]
    }

    pub fn state_mut(&mut self, view: PostponedView) -> &mut PartitionState {
        &mut self.state[view]
    }

    /// Replace all entries with a server listing. Selections lose ids that
    /// no longer exist in their partition.
    pub fn replace_all(&mut self, entries: Vec<PostponedEntry>) {
        self.entries = Partitioned::default();
        self.merge_optimistic(entries);
    }

    /// Insert or update entries, last write wins per id across partitions.
    pub fn merge_optimistic(&mut self, entries: Vec<PostponedEntry>) {
        for entry in entries {
            self.detach(&entry.id);
            self.entries[entry.postponed_view].push(entry);
        }
        self.prune_selections();
    }

    pub fn remove(&mut self, id: &EventId) -> Option<PostponedEntry> {
        let removed = self.detach(id);
        if removed.is_some() {
            self.prune_selections();
        }
        removed
    }

    /// Selected entries of a partition, in display order.
    pub fn selected(&self, view: PostponedView) -> Vec<PostponedEntry> {
        let selection = &self.state[view].selection;
        self.entries(view)
            .into_iter()
            .filter(|entry| selection.is_selected(&entry.id))
            .collect()
    }

    pub fn select_all(&mut self, view: PostponedView) {
        let ids: Vec<EventId> = self.entries[view].iter().map(|e| e.id.clone()).collect();
        self.state[view].selection.select_all(ids);
    }

    /// Drop every entry but keep the partitions' sort preferences.
    pub fn clear(&mut self) {
        self.entries = Partitioned::default();
        for view in PostponedView::ALL {
            let state = &mut self.state[view];
            state.selection.clear();
            state.transfer_target = None;
        }
    }

    fn detach(&mut self, id: &EventId) -> Option<PostponedEntry> {
        for view in PostponedView::ALL {
            let bucket = &mut self.entries[view];
            if let Some(position) = bucket.iter().position(|entry| &entry.id == id) {
                return Some(bucket.remove(position));
            }
        }
        None
    }

    fn prune_selections(&mut self) {
        for view in PostponedView::ALL {
            let existing: Vec<EventId> = self.entries[view].iter().map(|e| e.id.clone()).collect();
            self.state[view].selection.retain_existing(existing.iter());
        }
    }
}
