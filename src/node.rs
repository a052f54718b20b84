//! Node model and lookup.
//!
//! Nodes are immutable once built. A new tree version owns freshly built nodes
//! along the changed path and shares every other subtree through `Arc`.

use std::mem;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::nibbles::FANOUT;

/// Key suffix stored in leaves and compressed segments.
pub(crate) type Prefix = SmallVec<[u8; 16]>;

pub(crate) type Children<V> = [Option<Arc<Node<V>>>; FANOUT];

#[derive(Debug)]
pub(crate) enum Node<V> {
    Branch(Branch<V>),
    Leaf(Leaf<V>),
    Compressed(Compressed<V>),
}

/// 16-way fan-out, plus the value of a key ending exactly here.
#[derive(Debug)]
pub(crate) struct Branch<V> {
    pub(crate) children: Children<V>,
    pub(crate) value: Option<Arc<V>>,
}

/// Remaining key suffix and its value; no further branching below.
#[derive(Debug)]
pub(crate) struct Leaf<V> {
    pub(crate) prefix: Prefix,
    pub(crate) value: Arc<V>,
}

/// Key segment shared by everything below `child`. `prefix` is never empty.
#[derive(Debug)]
pub(crate) struct Compressed<V> {
    pub(crate) prefix: Prefix,
    pub(crate) child: Arc<Node<V>>,
}

impl<V> Branch<V> {
    pub(crate) fn empty() -> Self {
        Self {
            children: Default::default(),
            value: None,
        }
    }
}

// Shallow copy: slots and value are shared, only the table itself is new.
impl<V> Clone for Branch<V> {
    fn clone(&self) -> Self {
        Self {
            children: self.children.clone(),
            value: self.value.clone(),
        }
    }
}

// Drops iteratively: stack depth stays constant however deep the tree is.
// A subtree still referenced by another version is only released.
impl<V> Drop for Branch<V> {
    fn drop(&mut self) {
        let mut stack: Vec<Arc<Node<V>>> =
            mem::take(&mut self.children).into_iter().flatten().collect();

        while let Some(node) = stack.pop() {
            match Arc::into_inner(node) {
                Some(Node::Branch(mut branch)) => {
                    stack.extend(mem::take(&mut branch.children).into_iter().flatten());
                }
                Some(Node::Compressed(Compressed { child, .. })) => stack.push(child),
                Some(Node::Leaf(_)) | None => {}
            }
        }
    }
}

impl<V> Node<V> {
    pub(crate) fn leaf(suffix: &[u8], value: Arc<V>) -> Self {
        Node::Leaf(Leaf {
            prefix: Prefix::from_slice(suffix),
            value,
        })
    }

    /// Wraps `child` in a compressed segment, or returns it as is when
    /// `prefix` is empty.
    pub(crate) fn compressed(prefix: &[u8], child: Arc<Node<V>>) -> Arc<Self> {
        if prefix.is_empty() {
            return child;
        }
        Arc::new(Node::Compressed(Compressed {
            prefix: Prefix::from_slice(prefix),
            child,
        }))
    }
}

/// Finds the value stored under `key` below `root`.
pub(crate) fn lookup<'a, V>(root: Option<&'a Arc<Node<V>>>, key: &[u8]) -> Option<&'a V> {
    let mut current = root?;
    let mut key = key;

    loop {
        match &**current {
            Node::Branch(branch) => match key.split_first() {
                None => return branch.value.as_deref(),
                Some((&nibble, rest)) => {
                    // Out-of-range nibbles can never have been inserted.
                    current = branch.children.get(usize::from(nibble))?.as_ref()?;
                    key = rest;
                }
            },
            Node::Leaf(leaf) => {
                return (leaf.prefix.as_slice() == key).then(|| &*leaf.value);
            }
            Node::Compressed(c) => {
                key = key.strip_prefix(c.prefix.as_slice())?;
                current = &c.child;
            }
        }
    }
}
