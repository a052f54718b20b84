use super::*;

use crate::node::{Branch, Node};
use itertools::Itertools;
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

fn validate_tree<V>(t: &RadixTree<V>) {
    let mut stack: Vec<&Node<V>> = t.root.as_deref().into_iter().collect();

    let mut value_count = 0usize;
    while let Some(node) = stack.pop() {
        match node {
            Node::Branch(Branch { children, value }) => {
                value_count += usize::from(value.is_some());
                stack.extend(children.iter().flatten().map(|c| &**c));
            }
            Node::Leaf(leaf) => {
                assert!(
                    leaf.prefix.iter().all(|&n| usize::from(n) < nibbles::FANOUT),
                    "leaf suffix holds a non-nibble"
                );
                value_count += 1;
            }
            Node::Compressed(c) => {
                assert!(!c.prefix.is_empty(), "compressed prefix must not be empty");
                assert!(
                    c.prefix.iter().all(|&n| usize::from(n) < nibbles::FANOUT),
                    "compressed prefix holds a non-nibble"
                );
                assert!(
                    matches!(&*c.child, Node::Branch(_)),
                    "compressed child must be a branch"
                );
                stack.push(&c.child);
            }
        }
    }

    assert_eq!(value_count, t.len(), "reachable value count must match RadixTree::len");
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    // A narrow alphabet forces long shared prefixes and many splits.
    prop_oneof![
        prop::collection::vec(0u8..3, 0..=10),
        prop::collection::vec(0u8..16, 0..=24),
    ]
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 3)]
    Insert(#[proptest(strategy = "key_strategy()")] Vec<u8>, u64),
    Lookup(#[proptest(strategy = "key_strategy()")] Vec<u8>),
    /// Keep the current version; later checks prove it never changes.
    Snapshot,
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in prop::collection::vec(any::<Op>(), 0..=400)) {
        let mut t: RadixTree<u64> = RadixTree::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();
        let mut snapshots: Vec<(RadixTree<u64>, BTreeMap<Vec<u8>, u64>)> = Vec::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let before = t.lookup(&key).copied();
                    t = t.insert(&key, value).unwrap();
                    prop_assert_eq!(before, m.insert(key.clone(), value));
                    prop_assert_eq!(t.lookup(&key), Some(&value));
                }
                Op::Lookup(key) => {
                    prop_assert_eq!(t.lookup(&key), m.get(&key));
                }
                Op::Snapshot => snapshots.push((t.clone(), m.clone())),
            }
            prop_assert_eq!(t.len(), m.len());
        }

        validate_tree(&t);
        for (k, v) in &m {
            prop_assert_eq!(t.lookup(k), Some(v));
        }
        for (snap, model) in &snapshots {
            validate_tree(snap);
            prop_assert_eq!(snap.len(), model.len());
            for k in m.keys() {
                prop_assert_eq!(snap.lookup(k), model.get(k));
            }
        }
    }

    #[test]
    fn prop_non_interference(
        pairs in prop::collection::vec((key_strategy(), any::<u64>()), 0..=64),
        k1 in key_strategy(),
        k2 in key_strategy(),
        v in any::<u64>(),
    ) {
        prop_assume!(k1 != k2);
        let mut t = RadixTree::new();
        for (k, v) in pairs {
            t = t.insert(&k, v).unwrap();
        }
        let t2 = t.insert(&k1, v).unwrap();
        prop_assert_eq!(t2.lookup(&k2), t.lookup(&k2));
        prop_assert_eq!(t2.lookup(&k1), Some(&v));
    }

    #[test]
    fn prop_overwrite(
        pairs in prop::collection::vec((key_strategy(), any::<u64>()), 0..=64),
        k in key_strategy(),
        v1 in any::<u64>(),
        v2 in any::<u64>(),
    ) {
        let mut t = RadixTree::new();
        for (k, v) in pairs {
            t = t.insert(&k, v).unwrap();
        }
        let t1 = t.insert(&k, v1).unwrap();
        let t2 = t1.insert(&k, v2).unwrap();
        prop_assert_eq!(t2.lookup(&k), Some(&v2));
        prop_assert_eq!(t1.lookup(&k), Some(&v1));
        prop_assert_eq!(t2.len(), t1.len());
    }

    #[test]
    fn prop_flat_trie_agrees(pairs in prop::collection::vec((key_strategy(), any::<u64>()), 0..=200)) {
        let mut radix = RadixTree::new();
        let mut flat = FlatTrie::new();
        for (k, v) in &pairs {
            radix = radix.insert(k, *v).unwrap();
            flat = flat.insert(k, *v).unwrap();
        }
        prop_assert_eq!(radix.len(), flat.len());
        for (k, _) in &pairs {
            prop_assert_eq!(radix.lookup(k), flat.lookup(k));
        }
    }

    #[test]
    fn prop_rejects_non_nibbles(mut key in key_strategy(), bad in 16u8..=255, at in any::<prop::sample::Index>()) {
        let position = at.index(key.len() + 1);
        key.insert(position, bad);
        let t: RadixTree<u64> = RadixTree::new();
        let err = t.insert(&key, 1).unwrap_err();
        prop_assert_eq!(err, Error::InvalidNibble { position, nibble: bad });
    }
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<Vec<u8>> = vec![
        vec![],
        vec![1],
        vec![2],
        vec![1, 1],
        vec![1, 2],
        vec![1, 2, 3, 4],
        vec![2, 1],
    ];

    for perm in keys.iter().cloned().permutations(keys.len()) {
        let mut t: RadixTree<usize> = RadixTree::new();
        let mut m: BTreeMap<Vec<u8>, usize> = BTreeMap::new();

        for k in perm {
            // Values depend on the key only, so every order must agree.
            let v = k.len() * 100 + k.iter().map(|&n| usize::from(n)).sum::<usize>();
            t = t.insert(&k, v).unwrap();
            m.insert(k, v);
        }

        validate_tree(&t);
        assert_eq!(t.len(), m.len());
        for (k, v) in &m {
            assert_eq!(t.lookup(k), Some(v));
        }
        assert_eq!(t.lookup(&[3]), None);
        assert_eq!(t.lookup(&[1, 2, 3]), None);
    }
}

#[test]
fn test_randomized_versions() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(2);
    let mut versions: Vec<(RadixTree<u64>, BTreeMap<Vec<u8>, u64>)> =
        vec![(RadixTree::new(), BTreeMap::new())];

    for _ in 0..5_000 {
        // Branch off a random earlier version, not only the latest.
        let base = rng.gen_range(0..versions.len());
        let len = rng.gen_range(0..12);
        let key: Vec<u8> = (0..len).map(|_| rng.gen_range(0..16)).collect();
        let v: u64 = rng.gen();

        let (t, m) = &versions[base];
        let next = t.insert(&key, v).unwrap();
        let mut model = m.clone();
        model.insert(key, v);
        assert_eq!(next.len(), model.len());

        if versions.len() < 64 {
            versions.push((next, model));
        } else {
            versions[base] = (next, model);
        }
    }

    for (t, m) in &versions {
        validate_tree(t);
        for (k, v) in m {
            assert_eq!(t.lookup(k), Some(v));
        }
    }
}
