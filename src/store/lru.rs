//! LRU List Module
//!
//! Arena-backed map with an intrusive doubly linked recency list.

use std::collections::HashMap;

const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Node<V> {
    key: String,
    value: V,
    prev: usize,
    next: usize,
}

// == LRU List ==
/// Key/value map that remembers access order.
///
/// Nodes live in a slot vector and link to each other by index:
/// - `head` = most recently used
/// - `tail` = least recently used
///
/// Lookup, touch, insert, remove and eviction are all O(1).
#[derive(Debug)]
pub struct LruList<V> {
    index: HashMap<String, usize>,
    slots: Vec<Option<Node<V>>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
}

impl<V> Default for LruList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> LruList<V> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
        }
    }

    /// Creates an empty list with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Peek ==
    /// Looks up a value without changing its recency.
    pub fn peek(&self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.slots[idx].as_ref().map(|node| &node.value)
    }

    // == Get ==
    /// Looks up a value and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.detach(idx);
        self.attach_front(idx);
        self.slots[idx].as_ref().map(|node| &node.value)
    }

    // == Insert ==
    /// Inserts or overwrites a value and marks it most recently used.
    ///
    /// Returns the previous value on overwrite. Never evicts; capacity is the
    /// caller's concern.
    pub fn insert(&mut self, key: String, value: V) -> Option<V> {
        if let Some(&idx) = self.index.get(&key) {
            self.detach(idx);
            self.attach_front(idx);
            return self.slots[idx]
                .as_mut()
                .map(|node| std::mem::replace(&mut node.value, value));
        }

        let node = Node {
            key: key.clone(),
            value,
            prev: NIL,
            next: NIL,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.index.insert(key, idx);
        self.attach_front(idx);
        None
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let idx = self.index.remove(key)?;
        self.release(idx).map(|(_, value)| value)
    }

    // == Pop Oldest ==
    /// Removes and returns the least recently used entry.
    pub fn pop_oldest(&mut self) -> Option<(String, V)> {
        if self.tail == NIL {
            return None;
        }
        let (key, value) = self.release(self.tail)?;
        self.index.remove(&key);
        Some((key, value))
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&str> {
        self.slots
            .get(self.tail)?
            .as_ref()
            .map(|node| node.key.as_str())
    }

    // == Keys ==
    /// Keys from most to least recently used.
    pub fn keys(&self) -> Keys<'_, V> {
        Keys {
            list: self,
            cursor: self.head,
        }
    }

    // == Retain ==
    /// Drops every entry for which `keep` returns false, preserving the
    /// order of the rest. Returns how many were dropped.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str, &V) -> bool,
    {
        let doomed: Vec<usize> = self
            .index
            .values()
            .copied()
            .filter(|&idx| match &self.slots[idx] {
                Some(node) => !keep(&node.key, &node.value),
                None => false,
            })
            .collect();

        for &idx in &doomed {
            if let Some((key, _)) = self.release(idx) {
                self.index.remove(&key);
            }
        }
        doomed.len()
    }

    // == Internal Linking ==
    fn detach(&mut self, idx: usize) {
        let (prev, next) = match &self.slots[idx] {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            NIL => self.head = next,
            p => {
                if let Some(node) = self.slots[p].as_mut() {
                    node.next = next;
                }
            }
        }
        match next {
            NIL => self.tail = prev,
            n => {
                if let Some(node) = self.slots[n].as_mut() {
                    node.prev = prev;
                }
            }
        }
        if let Some(node) = self.slots[idx].as_mut() {
            node.prev = NIL;
            node.next = NIL;
        }
    }

    fn attach_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.slots[idx].as_mut() {
            node.prev = NIL;
            node.next = old_head;
        }
        match old_head {
            NIL => self.tail = idx,
            h => {
                if let Some(node) = self.slots[h].as_mut() {
                    node.prev = idx;
                }
            }
        }
        self.head = idx;
    }

    /// Unlinks a slot and returns it to the free list. The index map is left
    /// to the caller.
    fn release(&mut self, idx: usize) -> Option<(String, V)> {
        self.detach(idx);
        let node = self.slots[idx].take()?;
        self.free.push(idx);
        Some((node.key, node.value))
    }
}

// == Keys Iterator ==
pub struct Keys<'a, V> {
    list: &'a LruList<V>,
    cursor: usize,
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.slots.get(self.cursor)?.as_ref()?;
        self.cursor = node.next;
        Some(node.key.as_str())
    }
}
