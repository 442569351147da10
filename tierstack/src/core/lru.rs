use super::types::Entry;
use std::collections::HashMap;

/// Slot index inside the node arena
type NodeId = usize;

/// Node of the intrusive recency list
#[derive(Debug)]
struct Node {
    entry: Entry,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// LRU store backing a tier
///
/// A hash index maps each key to a node in an arena; the nodes form a
/// doubly-linked recency list (least recent at `head`, most recent at
/// `tail`). Lookup, touch, insert and eviction are all O(1).
///
/// `put` never evicts on its own: the store may hold `capacity + 1`
/// entries until `evict_lru` is called.
#[derive(Debug)]
pub struct LruStore {
    index: HashMap<String, NodeId>,
    nodes: Vec<Option<Node>>,
    free: Vec<NodeId>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    capacity: usize,
}

impl LruStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity + 1),
            nodes: Vec::with_capacity(capacity + 1),
            free: Vec::new(),
            head: None,
            tail: None,
            capacity,
        }
    }

    /// Get a value and mark it most-recently-used
    pub fn get(&mut self, key: &str) -> Option<&str> {
        let id = *self.index.get(key)?;
        self.move_to_tail(id);
        self.node(id).map(|node| node.entry.value.as_str())
    }

    /// Get a value without touching recency
    pub fn peek(&self, key: &str) -> Option<&str> {
        let id = *self.index.get(key)?;
        self.node(id).map(|node| node.entry.value.as_str())
    }

    /// Insert or update an entry, making it most-recently-used
    ///
    /// Returns `true` while the store is within capacity, `false` once it
    /// holds one entry more than allowed.
    pub fn put(&mut self, key: String, value: String) -> bool {
        if let Some(&id) = self.index.get(&key) {
            if let Some(node) = self.nodes[id].as_mut() {
                node.entry.value = value;
            }
            self.move_to_tail(id);
        } else {
            let node = Node {
                entry: Entry { key: key.clone(), value },
                prev: None,
                next: None,
            };
            let id = match self.free.pop() {
                Some(id) => {
                    self.nodes[id] = Some(node);
                    id
                }
                None => {
                    self.nodes.push(Some(node));
                    self.nodes.len() - 1
                }
            };
            self.index.insert(key, id);
            self.push_tail(id);
        }

        !self.is_over_capacity()
    }

    /// Remove and return the least-recently-used entry
    ///
    /// No-op unless the store is over capacity.
    pub fn evict_lru(&mut self) -> Option<Entry> {
        if !self.is_over_capacity() {
            return None;
        }
        let id = self.head?;
        self.unlink(id);
        let node = self.nodes[id].take()?;
        self.free.push(id);
        self.index.remove(&node.entry.key);
        Some(node.entry)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_over_capacity(&self) -> bool {
        self.index.len() > self.capacity
    }

    /// Keys from least to most recently used
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let Some(node) = self.node(id) else { break };
            keys.push(node.entry.key.clone());
            cursor = node.next;
        }
        keys
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id).and_then(Option::as_ref)
    }

    fn move_to_tail(&mut self, id: NodeId) {
        if self.tail == Some(id) {
            return;
        }
        self.unlink(id);
        self.push_tail(id);
    }

    fn unlink(&mut self, id: NodeId) {
        let (prev, next) = match self.nodes[id].as_mut() {
            Some(node) => (node.prev.take(), node.next.take()),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.nodes[p].as_mut() {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.nodes[n].as_mut() {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    fn push_tail(&mut self, id: NodeId) {
        let old_tail = self.tail;
        if let Some(node) = self.nodes[id].as_mut() {
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail {
            Some(t) => {
                if let Some(node) = self.nodes[t].as_mut() {
                    node.next = Some(id);
                }
            }
            None => self.head = Some(id),
        }
        self.tail = Some(id);
    }
}
