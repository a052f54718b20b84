//! The store interface shared by the radix tree and the flat trie baseline.

use crate::error::Result;

/// A persistent key-value store over nibble keys.
///
/// `insert` never modifies `self`; it returns the next version.
pub trait KvStore<V>: Sized {
    fn insert(&self, key: &[u8], value: V) -> Result<Self>;

    fn lookup(&self, key: &[u8]) -> Option<&V>;

    /// Number of distinct keys stored.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
