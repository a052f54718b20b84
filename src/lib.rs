//! # nibble-radix
//!
//! A persistent radix tree over nibble keys.
//!
//! Every insert returns a new [`RadixTree`]; older trees stay valid and
//! unchanged. Only the nodes on the path to the inserted key are rebuilt,
//! everything else is shared by reference, so snapshots are free and any
//! number of threads may read any version without locks.
//!
//! ## Example
//!
//! ```rust
//! use nibble_radix::{nibbles, RadixTree};
//!
//! let t0: RadixTree<&str> = RadixTree::new();
//! let t1 = t0.insert(&nibbles::from_bytes(b"dog"), "one").unwrap();
//! let t2 = t1.insert(&nibbles::from_bytes(b"doge"), "three").unwrap();
//!
//! assert_eq!(t2.lookup(&nibbles::from_bytes(b"dog")), Some(&"one"));
//! assert_eq!(t2.lookup(&nibbles::from_bytes(b"doge")), Some(&"three"));
//! assert_eq!(t1.lookup(&nibbles::from_bytes(b"doge")), None);
//! ```

use std::fmt;
use std::sync::Arc;

mod error;
pub mod flat;
mod insert;
pub mod nibbles;
mod node;
mod store;

pub use error::{Error, Result};
pub use flat::FlatTrie;
pub use store::KvStore;

use node::Node;

// =============================================================================
// RadixTree handle
// =============================================================================

/// One immutable version of a path-compressed radix tree.
///
/// Cloning is O(1): the clone shares the whole structure.
pub struct RadixTree<V> {
    root: Option<Arc<Node<V>>>,
    len: usize,
}

impl<V> RadixTree<V> {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns a new tree that maps `key` to `value` and agrees with `self`
    /// on every other key. Inserting an existing key overwrites its value.
    ///
    /// Fails if `key` contains an element outside `0..16`.
    pub fn insert(&self, key: &[u8], value: V) -> Result<Self> {
        if let Err(err) = nibbles::validate(key) {
            tracing::trace!(%err, "rejected key");
            return Err(err);
        }

        let inserted = insert::insert(self.root.as_ref(), key, value);
        Ok(Self {
            root: Some(inserted.root),
            len: if inserted.replaced { self.len } else { self.len + 1 },
        })
    }

    pub fn lookup(&self, key: &[u8]) -> Option<&V> {
        node::lookup(self.root.as_ref(), key)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.lookup(key).is_some()
    }

    /// True if both handles are the same version (share the same root).
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<V> Clone for RadixTree<V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            len: self.len,
        }
    }
}

impl<V> Default for RadixTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

// Node structure is left out: printing it would recurse once per level.
impl<V> fmt::Debug for RadixTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RadixTree")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl<V> KvStore<V> for RadixTree<V> {
    fn insert(&self, key: &[u8], value: V) -> Result<Self> {
        RadixTree::insert(self, key, value)
    }

    fn lookup(&self, key: &[u8]) -> Option<&V> {
        RadixTree::lookup(self, key)
    }

    fn len(&self) -> usize {
        self.len
    }
}


#[cfg(test)]
mod proptests;
