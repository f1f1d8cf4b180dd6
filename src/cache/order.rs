//! Insertion Order Module
//!
//! FIFO queue of keys bounding the memory tier.

use std::collections::VecDeque;

// == Insertion Order ==
/// Tracks insertion order for FIFO eviction.
///
/// Keys are stored in a VecDeque where:
/// - Front = Oldest inserted
/// - Back = Most recently inserted
///
/// Reads never reorder keys.
#[derive(Debug, Default)]
pub struct InsertionOrder {
    order: VecDeque<String>,
}

impl InsertionOrder {
    // == Constructor ==
    /// Creates a new empty queue.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Push ==
    /// Records an insertion of `key`.
    ///
    /// A key already queued moves to the back, so each key appears once.
    pub fn push(&mut self, key: &str) {
        self.remove(key);
        self.order.push_back(key.to_string());
    }

    // == Remove ==
    /// Removes a key from the queue.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Pop Oldest ==
    /// Returns and removes the oldest inserted key.
    ///
    /// Returns None if the queue is empty.
    pub fn pop_oldest(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    /// Returns the oldest inserted key without removing it.
    pub fn oldest(&self) -> Option<&str> {
        self.order.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    /// Keys from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_new() {
        let order = InsertionOrder::new();
        assert!(order.is_empty());
        assert_eq!(order.len(), 0);
        assert_eq!(order.oldest(), None);
    }

    #[test]
    fn test_push_keeps_insertion_order() {
        let mut order = InsertionOrder::new();

        order.push("a");
        order.push("b");
        order.push("c");

        assert_eq!(order.len(), 3);
        assert_eq!(order.iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(order.oldest(), Some("a"));
    }

    #[test]
    fn test_push_existing_key_moves_to_back() {
        let mut order = InsertionOrder::new();

        order.push("a");
        order.push("b");
        order.push("a");

        assert_eq!(order.len(), 2);
        assert_eq!(order.oldest(), Some("b"));
    }

    #[test]
    fn test_pop_oldest() {
        let mut order = InsertionOrder::new();

        order.push("a");
        order.push("b");

        assert_eq!(order.pop_oldest(), Some("a".to_string()));
        assert_eq!(order.pop_oldest(), Some("b".to_string()));
        assert_eq!(order.pop_oldest(), None);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut order = InsertionOrder::new();

        order.push("a");
        order.push("b");
        order.push("c");
        order.remove("b");
        assert_eq!(order.iter().collect::<Vec<_>>(), vec!["a", "c"]);

        order.remove("missing");
        assert_eq!(order.len(), 2);

        order.clear();
        assert!(order.is_empty());
    }
}
