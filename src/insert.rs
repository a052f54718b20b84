//! Copy-on-write insertion.
//!
//! Insertion walks down once, recording one [`Patch`] per level, until it
//! reaches the node that actually changes. The patches are then applied
//! innermost first to rebuild the path up to a new root. Only the nodes named
//! by a patch are rebuilt; every other subtree is shared with the old version.

use std::sync::Arc;

use crate::nibbles::shared_prefix_len;
use crate::node::{Branch, Compressed, Node, Prefix};

/// One rebuild step recorded during descent.
enum Patch<V> {
    /// Put the rebuilt child into `nibble` of this (already copied) branch.
    Slot { branch: Branch<V>, nibble: u8 },
    /// Wrap the rebuilt child in a compressed segment.
    Wrap { prefix: Prefix },
}

/// Where descent currently stands.
enum Cursor<V> {
    /// Nothing stored here yet.
    Vacant,
    /// A node of the old version.
    Shared(Arc<Node<V>>),
    /// A branch built during this insert that nothing references yet.
    Fresh(Branch<V>),
}

impl<V> From<Option<Arc<Node<V>>>> for Cursor<V> {
    fn from(node: Option<Arc<Node<V>>>) -> Self {
        node.map_or(Cursor::Vacant, Cursor::Shared)
    }
}

pub(crate) struct Inserted<V> {
    pub(crate) root: Arc<Node<V>>,
    /// An existing value was overwritten.
    pub(crate) replaced: bool,
}

/// Returns a new root holding `value` under `key`; `root` is left untouched.
///
/// `key` must already be validated: every element below `FANOUT`.
pub(crate) fn insert<V>(root: Option<&Arc<Node<V>>>, key: &[u8], value: V) -> Inserted<V> {
    let value = Arc::new(value);
    let mut plan: Vec<Patch<V>> = Vec::new();
    let mut cursor = Cursor::from(root.cloned());
    let mut key = key;
    let mut replaced = false;

    let changed = loop {
        cursor = match cursor {
            Cursor::Vacant => break Node::leaf(key, value),

            Cursor::Fresh(mut branch) => match key.split_first() {
                None => {
                    replaced = branch.value.is_some();
                    branch.value = Some(value);
                    break Node::Branch(branch);
                }
                Some((&nibble, rest)) => {
                    debug_assert!(usize::from(nibble) < branch.children.len());
                    let next = branch.children[usize::from(nibble)].clone();
                    plan.push(Patch::Slot { branch, nibble });
                    key = rest;
                    Cursor::from(next)
                }
            },

            Cursor::Shared(node) => match &*node {
                Node::Branch(branch) => Cursor::Fresh(branch.clone()),

                Node::Leaf(leaf) => {
                    if leaf.prefix.as_slice() == key {
                        replaced = true;
                        break Node::leaf(key, value);
                    }

                    let p = shared_prefix_len(key, &leaf.prefix);
                    let mut branch = Branch::empty();
                    match leaf.prefix.get(p) {
                        Some(&nibble) => {
                            let rest = Node::leaf(&leaf.prefix[p + 1..], Arc::clone(&leaf.value));
                            branch.children[usize::from(nibble)] = Some(Arc::new(rest));
                        }
                        None => branch.value = Some(Arc::clone(&leaf.value)),
                    }
                    if p > 0 {
                        plan.push(Patch::Wrap {
                            prefix: Prefix::from_slice(&key[..p]),
                        });
                    }
                    key = &key[p..];
                    Cursor::Fresh(branch)
                }

                Node::Compressed(c) => {
                    let p = shared_prefix_len(key, &c.prefix);
                    if p == c.prefix.len() {
                        plan.push(Patch::Wrap { prefix: c.prefix.clone() });
                        key = &key[p..];
                        Cursor::Shared(Arc::clone(&c.child))
                    } else {
                        let nibble = c.prefix[p];
                        let old = Node::compressed(&c.prefix[p + 1..], Arc::clone(&c.child));
                        let mut branch = Branch::empty();
                        branch.children[usize::from(nibble)] = Some(old);
                        if p > 0 {
                            plan.push(Patch::Wrap {
                                prefix: Prefix::from_slice(&key[..p]),
                            });
                        }
                        key = &key[p..];
                        Cursor::Fresh(branch)
                    }
                }
            },
        };
    };

    tracing::trace!(depth = plan.len(), replaced, "rebuilding insert path");

    let root = plan
        .into_iter()
        .rev()
        .fold(Arc::new(changed), |child, patch| match patch {
            Patch::Slot { mut branch, nibble } => {
                branch.children[usize::from(nibble)] = Some(child);
                Arc::new(Node::Branch(branch))
            }
            Patch::Wrap { prefix } => Arc::new(Node::Compressed(Compressed { prefix, child })),
        });

    Inserted { root, replaced }
}
