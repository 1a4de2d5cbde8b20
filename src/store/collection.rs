//! Ordered, id-deduplicated collections.

use std::collections::HashSet;

/// Anything addressable by a string id.
pub trait Keyed {
    fn id(&self) -> &str;
}

/// Items in first-seen order, unique by id.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceCollection<T> {
    items: Vec<T>,
}

impl<T> Default for ResourceCollection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Keyed + Clone> ResourceCollection<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Overwrite with a fresh result set. Duplicate ids inside `items` keep their first
    /// occurrence.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items.clear();
        self.append(items);
    }

    /// Append items whose id is not already present, in arrival order.
    /// Returns how many were added.
    pub fn append(&mut self, items: Vec<T>) -> usize {
        let mut seen: HashSet<String> = self.items.iter().map(|i| i.id().to_string()).collect();
        let before = self.items.len();
        for item in items {
            if seen.insert(item.id().to_string()) {
                self.items.push(item);
            }
        }
        self.items.len() - before
    }

    /// Put a newly created entity at the front. An existing entry with the same id is
    /// dropped first so the id stays unique.
    pub fn prepend(&mut self, item: T) {
        self.items.retain(|existing| existing.id() != item.id());
        self.items.insert(0, item);
    }

    /// Replace the entity with the same id in place. Returns false if absent.
    pub fn update(&mut self, item: T) -> bool {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    /// Replace in place if present, otherwise append.
    pub fn upsert(&mut self, item: T) {
        if !self.update(item.clone()) {
            self.items.push(item);
        }
    }

    /// Remove by id, returning the removed entity.
    pub fn remove(&mut self, id: &str) -> Option<T> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: &'static str,
        rev: u32,
    }

    impl Keyed for Item {
        fn id(&self) -> &str {
            self.id
        }
    }

    fn item(id: &'static str, rev: u32) -> Item {
        Item { id, rev }
    }

    fn ids(collection: &ResourceCollection<Item>) -> Vec<&str> {
        collection.items().iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_append_dedups_overlapping_pages() {
        let mut collection = ResourceCollection::default();
        collection.append(vec![item("a", 1), item("b", 1), item("c", 1)]);
        let added = collection.append(vec![item("c", 2), item("d", 1), item("a", 2), item("e", 1)]);

        assert_eq!(added, 2);
        assert_eq!(ids(&collection), vec!["a", "b", "c", "d", "e"]);
        // First-seen representation wins on append.
        assert_eq!(collection.get("c").unwrap().rev, 1);
    }

    #[test]
    fn test_replace_discards_previous_contents() {
        let mut collection = ResourceCollection::default();
        collection.append(vec![item("a", 1), item("b", 1)]);
        collection.replace(vec![item("x", 1), item("x", 2), item("y", 1)]);

        assert_eq!(ids(&collection), vec!["x", "y"]);
    }

    #[test]
    fn test_local_patches() {
        let mut collection = ResourceCollection::default();
        collection.append(vec![item("a", 1), item("b", 1), item("c", 1)]);

        collection.prepend(item("n", 1));
        assert_eq!(ids(&collection), vec!["n", "a", "b", "c"]);

        assert!(collection.update(item("b", 2)));
        assert_eq!(ids(&collection), vec!["n", "a", "b", "c"]);
        assert_eq!(collection.get("b").unwrap().rev, 2);
        assert!(!collection.update(item("zz", 1)));

        assert_eq!(collection.remove("a"), Some(item("a", 1)));
        assert_eq!(collection.remove("a"), None);
        assert_eq!(ids(&collection), vec!["n", "b", "c"]);
    }

    #[test]
    fn test_upsert_replaces_in_place_or_appends() {
        let mut collection = ResourceCollection::default();
        collection.append(vec![item("a", 1), item("b", 1)]);

        collection.upsert(item("a", 5));
        collection.upsert(item("c", 1));

        assert_eq!(ids(&collection), vec!["a", "b", "c"]);
        assert_eq!(collection.get("a").unwrap().rev, 5);
    }

    #[test]
    fn test_prepend_keeps_ids_unique() {
        let mut collection = ResourceCollection::default();
        collection.append(vec![item("a", 1), item("b", 1)]);
        collection.prepend(item("b", 2));

        assert_eq!(ids(&collection), vec!["b", "a"]);
        assert_eq!(collection.len(), 2);
    }
}
