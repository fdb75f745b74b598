// Copyright © 2024 ToolHub. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Open/closed state of a page's FAQ list.
//!
//! Each item is independent: opening one never closes another. A fresh
//! accordion has its first item open.

use std::collections::BTreeSet;

/// Per-page FAQ accordion state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqAccordion {
    len: usize,
    open: BTreeSet<usize>,
}

impl FaqAccordion {
    /// State for `len` items, with the first one open.
    pub fn new(len: usize) -> Self {
        let mut open = BTreeSet::new();
        if len > 0 {
            _ = open.insert(0);
        }
        Self { len, open }
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether item `index` is open. Out-of-range indices are closed.
    pub fn is_open(&self, index: usize) -> bool {
        self.open.contains(&index)
    }

    /// Flips item `index` and returns its new state.
    ///
    /// Out-of-range indices are ignored and report `false`.
    pub fn toggle(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        if self.open.remove(&index) {
            false
        } else {
            self.open.insert(index)
        }
    }

    /// Indices of the open items, ascending.
    pub fn open_items(&self) -> impl Iterator<Item = usize> + '_ {
        self.open.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_item_open_by_default() {
        let accordion = FaqAccordion::new(2);
        assert!(accordion.is_open(0));
        assert!(!accordion.is_open(1));
    }

    #[test]
    fn test_toggles_are_independent() {
        let mut accordion = FaqAccordion::new(2);
        assert!(accordion.toggle(1));
        assert!(accordion.is_open(0));
        assert!(accordion.is_open(1));

        assert!(!accordion.toggle(0));
        assert!(!accordion.is_open(0));
        assert!(accordion.is_open(1));
        assert_eq!(accordion.open_items().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_empty_and_out_of_range() {
        let mut accordion = FaqAccordion::new(0);
        assert!(accordion.is_empty());
        assert!(!accordion.is_open(0));
        assert!(!accordion.toggle(0));
        assert_eq!(accordion.open_items().count(), 0);

        let mut accordion = FaqAccordion::new(1);
        assert!(!accordion.toggle(5));
        assert_eq!(accordion.len(), 1);
    }
}
