//! Generic multi-selection state.
//!
//! Tracks a checkbox-style set of selected item ids. The set is independent
//! of how the items are ordered or rendered.

use std::collections::HashSet;
use std::hash::Hash;

/// State for checkbox selection over a list of identified items.
#[derive(Clone, Debug)]
pub struct MultiSelection<Id: Eq + Hash + Clone> {
    selected: HashSet<Id>,
}

impl<Id: Eq + Hash + Clone> Default for MultiSelection<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: Eq + Hash + Clone> MultiSelection<Id> {
    /// Create a new selection with nothing selected.
    pub fn new() -> Self {
        Self {
            selected: HashSet::new(),
        }
    }

    /// Flip the selection state of one item. Returns the new state.
    pub fn toggle(&mut self, id: Id) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    pub fn select(&mut self, id: Id) {
        self.selected.insert(id);
    }

    pub fn deselect(&mut self, id: &Id) {
        self.selected.remove(id);
    }

    /// Replace the selection with every id in `ids`.
    pub fn select_all<I: IntoIterator<Item = Id>>(&mut self, ids: I) {
        self.selected = ids.into_iter().collect();
    }

    /// Clear the selection.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &Id) -> bool {
        self.selected.contains(id)
    }

    /// Check if anything is selected.
    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// True when every id of `universe` is selected and the universe is non-empty.
    pub fn covers<'a, I>(&self, universe: I) -> bool
    where
        I: IntoIterator<Item = &'a Id>,
        Id: 'a,
    {
        let mut any = false;
        for id in universe {
            any = true;
            if !self.selected.contains(id) {
                return false;
            }
        }
        any
    }

    /// Drop ids that are no longer present after the list changes.
    pub fn retain_existing<'a, I>(&mut self, existing: I)
    where
        I: IntoIterator<Item = &'a Id>,
        Id: 'a,
    {
        let existing: HashSet<&Id> = existing.into_iter().collect();
        self.selected.retain(|id| existing.contains(id));
    }

    /// Filter `items` down to the selected ones, preserving their order.
    pub fn pick<'a, T, F>(&self, items: &'a [T], id_of: F) -> Vec<&'a T>
    where
        F: Fn(&T) -> &Id,
    {
        items
            .iter()
            .filter(|item| self.selected.contains(id_of(*item)))
            .collect()
    }
}
