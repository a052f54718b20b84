//! Flat persistent trie: one 16-way node per key nibble, no path compression.
//!
//! Kept as a baseline for the radix tree. It offers the same persistence
//! guarantees with a much simpler shape: an insert copies exactly one node per
//! nibble of the key, plus the root.

use std::fmt;
use std::mem;
use std::sync::Arc;

use crate::error::Result;
use crate::nibbles::{self, FANOUT};
use crate::store::KvStore;

struct FlatNode<V> {
    children: [Option<Arc<FlatNode<V>>>; FANOUT],
    value: Option<Arc<V>>,
}

impl<V> FlatNode<V> {
    fn empty() -> Self {
        Self {
            children: Default::default(),
            value: None,
        }
    }

    fn copy(&self) -> Self {
        Self {
            children: self.children.clone(),
            value: self.value.clone(),
        }
    }
}

// One node per nibble: a long key is a chain as deep as the key is long.
impl<V> Drop for FlatNode<V> {
    fn drop(&mut self) {
        let mut stack: Vec<Arc<FlatNode<V>>> =
            mem::take(&mut self.children).into_iter().flatten().collect();

        while let Some(node) = stack.pop() {
            if let Some(mut node) = Arc::into_inner(node) {
                stack.extend(mem::take(&mut node.children).into_iter().flatten());
            }
        }
    }
}

pub struct FlatTrie<V> {
    root: Option<Arc<FlatNode<V>>>,
    len: usize,
}

impl<V> FlatTrie<V> {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn lookup(&self, key: &[u8]) -> Option<&V> {
        let mut node = self.root.as_ref()?;
        for &nibble in key {
            node = node.children.get(usize::from(nibble))?.as_ref()?;
        }
        node.value.as_deref()
    }

    pub fn insert(&self, key: &[u8], value: V) -> Result<Self> {
        nibbles::validate(key)?;

        // Copy every node on the path; the last one receives the value.
        let mut path: Vec<FlatNode<V>> = Vec::with_capacity(key.len() + 1);
        let mut current = self.root.as_deref();
        for &nibble in key {
            let copy = current.map_or_else(FlatNode::empty, FlatNode::copy);
            current = current.and_then(|n| n.children[usize::from(nibble)].as_deref());
            path.push(copy);
        }
        let mut last = current.map_or_else(FlatNode::empty, FlatNode::copy);
        let replaced = last.value.replace(Arc::new(value)).is_some();

        let root = path
            .into_iter()
            .zip(key)
            .rev()
            .fold(Arc::new(last), |child, (mut node, &nibble)| {
                node.children[usize::from(nibble)] = Some(child);
                Arc::new(node)
            });

        Ok(Self {
            root: Some(root),
            len: if replaced { self.len } else { self.len + 1 },
        })
    }
}

impl<V> Clone for FlatTrie<V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            len: self.len,
        }
    }
}

impl<V> Default for FlatTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for FlatTrie<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatTrie")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl<V> KvStore<V> for FlatTrie<V> {
    fn insert(&self, key: &[u8], value: V) -> Result<Self> {
        FlatTrie::insert(self, key, value)
    }

    fn lookup(&self, key: &[u8]) -> Option<&V> {
        FlatTrie::lookup(self, key)
    }

    fn len(&self) -> usize {
        self.len
    }
}
