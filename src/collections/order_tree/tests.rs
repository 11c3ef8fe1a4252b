#![cfg(test)]

use std::collections::{BTreeSet, HashSet};
use std::iter;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};

use super::*;
use crate::collections::traits::Set;
use crate::util::alloc::CountedDrop;
use crate::util::panic::assert_panics;

/// An element whose ordering key can collide with others while its identity stays distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Tagged {
    key: u32,
    id: u64,
}

// Identities only need to be distinct within a test run, so a process-wide counter starting at
// zero is enough.
static NEXT_ID: AtomicU64 = AtomicU64::new(0);

impl Tagged {
    fn new(key: u32) -> Tagged {
        Tagged {
            key,
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
        }
    }
}

fn key_of(item: &Tagged) -> u32 {
    item.key
}

type ByKey = KeyComparator<fn(&Tagged) -> u32>;

fn by_key() -> ByKey {
    KeyComparator(key_of as fn(&Tagged) -> u32)
}

fn chained_tree() -> OrderTree<Tagged, ByKey, Chained> {
    OrderTree::with_comparator(by_key())
}

/// A fixed permutation of `0..n`, for any `n` not divisible by 7919.
fn scrambled(n: u64) -> impl Iterator<Item = u64> {
    (0..n).map(move |i| (i * 7919) % n)
}

#[test]
fn test_add_and_len() {
    let mut tree = OrderTree::new();
    assert!(tree.is_empty());

    assert!(tree.add(5));
    assert!(tree.add(3));
    assert!(tree.add(8));
    assert!(!tree.add(5), "Adding a present element to a unique tree should be rejected.");
    assert!(!tree.add(3));

    assert_eq!(tree.len(), 3, "Only accepted elements should be counted.");
    assert!(!tree.is_empty());
    assert_eq!(tree.validate(), Ok(()));
}

#[test]
fn test_select() {
    let mut tree = OrderTree::new();
    for i in scrambled(1000) {
        tree.add(i);
    }
    assert_eq!(tree.validate(), Ok(()));

    for i in 0..1000 {
        assert_eq!(tree.get(i as usize), Ok(&i), "get(i) should be the i-th smallest element.");
        assert_eq!(tree[i as usize], i);
    }
    assert_eq!(
        tree.get(1000),
        Err(IndexOutOfBounds { index: 1000, len: 1000 }),
        "Indexing past the end should be out of bounds."
    );
    assert_eq!(OrderTree::<u64>::new().get(0).map_err(|e| e.len), Err(0));
}

#[test]
fn test_large_sequential() {
    let mut tree = OrderTree::new();
    for i in 0..1_000_000_u32 {
        tree.add(i);
    }

    assert_eq!(tree.len(), 1_000_000);
    assert_eq!(tree.get(500_000), Ok(&500_000));
    assert!(tree.get(1_000_000).is_err());
    assert!(
        usize::try_from(-1_isize).is_err(),
        "A negative index can't even be expressed."
    );
    assert_eq!(tree.validate(), Ok(()), "Sequential insertion should stay balanced.");
}

#[test]
fn test_index_panics() {
    assert_panics!({
        let tree: OrderTree<i32> = (0..5).collect();
        let _ = &tree[5];
    });
}

#[test]
fn test_remove() {
    let mut tree: OrderTree<u64> = scrambled(500).collect();

    for i in (0..500).step_by(2) {
        assert!(tree.remove(&i), "Present elements should be removable.");
        assert_eq!(tree.validate(), Ok(()));
    }
    assert!(!tree.remove(&0), "Removing an absent element should be a no-op.");
    assert_eq!(tree.len(), 250);

    for i in 0..500 {
        assert_eq!(tree.contains(&i), i % 2 == 1);
    }
    assert!(tree.iter().copied().eq((1..500).step_by(2)));

    assert!(tree.add(0), "A removed element should be accepted again.");
    assert!(tree.contains(&0));

    for i in (1..500).step_by(2) {
        assert_eq!(tree.take(&i), Some(i));
    }
    assert_eq!(tree.take(&1), None);
    assert_eq!(tree.len(), 1);
    assert!(tree.remove(&0));
    assert!(tree.is_empty());
    assert_eq!(tree.validate(), Ok(()));
}

#[test]
fn test_remove_at() {
    let mut tree: OrderTree<u32> = (0..10).collect();

    assert_eq!(tree.remove_at(3), Ok(3));
    assert_eq!(tree.remove_at(0), Ok(0));
    assert_eq!(tree.remove_at(7), Ok(9));
    assert_eq!(tree.remove_at(7), Err(IndexOutOfBounds { index: 7, len: 7 }));
    assert!(tree.iter().copied().eq([1, 2, 4, 5, 6, 7, 8]));
    assert_eq!(tree.validate(), Ok(()));
}

#[test]
fn test_index_of() {
    let tree: OrderTree<u64> = scrambled(300).map(|i| i * 2).collect();

    for rank in 0..300 {
        assert_eq!(tree.index_of(&(rank * 2)), Some(rank as usize));
        assert_eq!(tree.index_of(&(rank * 2 + 1)), None);
    }
    for rank in 0..300 {
        assert_eq!(tree.index_of(tree.get(rank).unwrap()), Some(rank), "Rank should invert select.");
    }
}

#[test]
fn test_iteration() {
    let tree: OrderTree<u64> = scrambled(100).collect();

    assert!(tree.iter().copied().eq(0..100), "Iteration should be ascending.");
    assert!(tree.iter().copied().eq(0..100), "A fresh iterator should start over.");
    assert!(tree.iter().rev().copied().eq((0..100).rev()));
    assert_eq!(tree.iter().len(), 100);

    let mut iter = tree.iter();
    assert_eq!(iter.next(), Some(&0));
    assert_eq!(iter.next_back(), Some(&99));
    assert_eq!(iter.next_back(), Some(&98));
    assert_eq!(iter.next(), Some(&1));
    assert_eq!(iter.len(), 96);
    assert_eq!(iter.by_ref().count(), 96);
    assert_eq!(iter.next(), None);
    assert_eq!(iter.next_back(), None);

    assert!(tree.into_iter().eq(0..100));
    assert_eq!(OrderTree::<u8>::new().iter().next(), None);
}

#[test]
fn test_first_last_floor_ceiling() {
    let tree: OrderTree<u32> = [10, 20, 30, 40].into_iter().collect();

    assert_eq!(tree.first(), Some(&10));
    assert_eq!(tree.last(), Some(&40));

    assert_eq!(tree.floor(&25), Some(&20));
    assert_eq!(tree.floor(&20), Some(&20));
    assert_eq!(tree.floor(&5), None);
    assert_eq!(tree.ceiling(&25), Some(&30));
    assert_eq!(tree.ceiling(&30), Some(&30));
    assert_eq!(tree.ceiling(&45), None);

    assert_eq!(tree.lower(&20), Some(&10));
    assert_eq!(tree.lower(&10), None);
    assert_eq!(tree.higher(&20), Some(&30));
    assert_eq!(tree.higher(&40), None);

    let empty = OrderTree::<u32>::new();
    assert_eq!(empty.first(), None);
    assert_eq!(empty.floor(&1), None);
}

#[test]
fn test_retain_all() {
    let mut tree: OrderTree<u64> = scrambled(200).collect();
    let keep: HashSet<u64> = (0..400).step_by(3).collect();

    assert!(tree.retain_all(&keep), "Dropping elements should report a modification.");
    assert_eq!(tree.validate(), Ok(()));
    assert!(tree.iter().copied().eq((0..200).step_by(3)));
    assert_eq!(tree.len(), 67, "Size should be the size of the intersection.");

    assert!(!tree.retain_all(&keep), "Retaining a superset should change nothing.");
    assert_eq!(tree.len(), 67);

    let other: BTreeSet<u64> = [3, 6, 7].into_iter().collect();
    assert!(tree.retain_all(&other));
    assert!(tree.iter().copied().eq([3, 6]));
    assert_eq!(tree.validate(), Ok(()));

    assert!(tree.retain_all(&BTreeSet::new()));
    assert!(tree.is_empty());
    assert!(tree.add(1), "An emptied tree should still accept elements.");
}

#[test]
fn test_retain_rebuild_balance() {
    for n in 0..70 {
        let mut tree: OrderTree<u64> = (0..n).collect();
        tree.retain(|i| i % 5 != 0);
        assert_eq!(tree.validate(), Ok(()), "Rebuilding {n} elements should produce a valid tree.");
        assert_eq!(tree.len() as u64, n - n.div_ceil(5));
    }
}

#[test]
fn test_retain_panic_keeps_elements() {
    let mut tree: OrderTree<u32> = (0..10).collect();
    let mut seen = 0;

    let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
        tree.retain(|i| {
            seen += 1;
            if seen == 3 {
                panic!("predicate failed");
            }
            i % 2 == 0
        })
    }));

    assert!(result.is_err());
    assert_eq!(tree.len(), 10, "A panicking predicate shouldn't remove anything.");
    assert!(tree.iter().copied().eq(0..10));
    assert_eq!(tree.validate(), Ok(()));

    assert!(tree.retain(|i| i % 2 == 0), "The tree should still be usable afterwards.");
    assert!(tree.iter().copied().eq((0..10).step_by(2)));
}

#[test]
fn test_retain_unchanged() {
    let mut tree = chained_tree();
    let items: Vec<Tagged> = (0..20).map(|i| Tagged::new(i % 4)).collect();
    tree.add_all(items.iter().cloned());

    assert!(!tree.retain(|_| true), "Keeping everything should report no change.");
    let mut expected = items.clone();
    expected.sort_by_key(|item| item.key);
    assert!(tree.iter().eq(expected.iter()), "Collision order should survive a no-op retain.");

    assert!(tree.retain(|item| item.id % 3 != 0));
    assert!(items.iter().all(|item| tree.contains(item) == (item.id % 3 != 0)));
    assert_eq!(tree.validate(), Ok(()));
}

#[test]
fn test_add_all_remove_all() {
    let mut tree = OrderTree::new();
    assert!(tree.add_all([1, 2, 3]));
    assert!(tree.add_all([3, 4]), "Adding at least one new element should report a change.");
    assert!(!tree.add_all([1, 4]));
    assert_eq!(tree.len(), 4);

    assert!(tree.remove_all(&[1, 9]));
    assert!(!tree.remove_all(&[9, 10]));
    assert!(tree.iter().copied().eq([2, 3, 4]));
}

#[test]
fn test_collisions() {
    let mut tree = chained_tree();
    let a = Tagged::new(1);
    let b = Tagged::new(1);
    let c = Tagged::new(0);
    let d = Tagged::new(1);

    assert!(tree.add(a.clone()));
    assert!(tree.add(b.clone()), "Colliding elements should be kept in a chained tree.");
    assert!(tree.add(c.clone()));
    assert!(tree.add(d.clone()));
    assert!(tree.add(b.clone()), "A chained tree is a multiset.");
    assert_eq!(tree.len(), 5);
    assert_eq!(tree.validate(), Ok(()));

    assert_eq!(
        tree.iter().cloned().collect::<Vec<_>>(),
        [c.clone(), a.clone(), b.clone(), d.clone(), b.clone()],
        "Colliding elements should be iterated in insertion order."
    );
    assert_eq!(tree.get(3), Ok(&d));
    assert_eq!(tree.index_of(&d), Some(3));
    assert_eq!(tree.index_of(&Tagged::new(1)), None);

    assert!(!tree.contains(&Tagged::new(1)), "Comparing equal shouldn't be enough for membership.");
    assert!(!tree.remove(&Tagged::new(1)), "Removal should match identity, not just the key.");
    assert_eq!(tree.len(), 5);

    assert!(tree.remove(&a));
    assert!(!tree.contains(&a));
    assert!(tree.contains(&b) && tree.contains(&d));
    assert!(tree.remove(&b));
    assert!(tree.contains(&b), "Only one copy should be removed.");
    assert_eq!(tree.validate(), Ok(()));

    assert_eq!(tree.floor(&Tagged::new(5)), Some(&b), "floor should favour the latest collision.");
    assert_eq!(tree.ceiling(&Tagged::new(1)), Some(&d), "ceiling should favour the earliest.");

    assert!(tree.remove(&d) && tree.remove(&b) && tree.remove(&c));
    assert!(tree.is_empty());
    assert_eq!(tree.validate(), Ok(()));
}

#[test]
fn test_unique_rejects_collisions() {
    let mut tree: OrderTree<Tagged, ByKey> = OrderTree::with_comparator(by_key());
    let a = Tagged::new(1);
    let b = Tagged::new(1);

    assert!(tree.add(a.clone()));
    assert!(!tree.add(b.clone()), "Colliding elements should never overwrite each other.");
    assert!(tree.contains(&a));
    assert!(!tree.contains(&b));
    assert!(!tree.remove(&b));
    assert_eq!(tree.len(), 1);
}

#[test]
fn test_chained_stress() {
    let mut tree = chained_tree();
    let items: Vec<Tagged> = scrambled(3000).map(|i| Tagged::new((i % 37) as u32)).collect();

    for item in &items {
        assert!(tree.add(item.clone()));
    }
    assert_eq!(tree.len(), 3000);
    assert_eq!(tree.validate(), Ok(()));
    assert!(
        tree.iter().zip(tree.iter().skip(1)).all(|(a, b)| a.key <= b.key),
        "Iteration should be sorted by key."
    );

    for item in items.iter().step_by(2) {
        assert!(tree.remove(item));
    }
    assert_eq!(tree.len(), 1500);
    assert_eq!(tree.validate(), Ok(()));
    for (i, item) in items.iter().enumerate() {
        assert_eq!(tree.contains(item), i % 2 == 1);
    }

    let survivors: HashSet<u64> = items.iter().skip(1).step_by(4).map(|i| i.id).collect();
    assert!(tree.retain(|item| survivors.contains(&item.id)));
    assert_eq!(tree.len(), survivors.len());
    assert_eq!(tree.validate(), Ok(()));
}

#[test]
fn test_mixed_operations() {
    let mut tree = OrderTree::new();
    let mut oracle = BTreeSet::new();
    let mut state = 0x2545_f491_u64;

    for _ in 0..5000 {
        // Linear congruential generator, enough to shuffle the operations.
        state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        let value = (state >> 33) % 512;
        if state % 3 == 0 {
            assert_eq!(tree.remove(&value), oracle.remove(&value));
        } else {
            assert_eq!(tree.add(value), oracle.insert(value));
        }
        assert_eq!(tree.len(), oracle.len());
        assert_eq!(tree.validate(), Ok(()));
    }

    assert!(tree.iter().eq(oracle.iter()));
    for (rank, value) in oracle.iter().enumerate() {
        assert_eq!(tree.get(rank), Ok(value));
    }
}

#[test]
fn test_drop() {
    let counter = CountedDrop::new(0);
    let mut tree: OrderTree<_, _> =
        OrderTree::with_comparator(KeyComparator(|e: &(usize, CountedDrop)| e.0));
    for i in 0..100 {
        tree.add((i, counter.clone()));
    }

    let removed = tree.remove_at(10);
    assert!(removed.is_ok());
    drop(removed);
    assert_eq!(*counter.borrow(), 1, "A removed element should be handed back, then dropped.");

    drop(tree);
    assert_eq!(counter.take(), 100, "Dropping the tree should drop every element once.");

    let counter = CountedDrop::new(0);
    let mut tree: OrderTree<_, _, Chained> =
        OrderTree::with_comparator(KeyComparator(|e: &(usize, CountedDrop)| e.0 % 3));
    tree.extend(iter::repeat_with(|| counter.clone()).take(30).enumerate());
    assert_eq!(tree.len(), 30);

    tree.retain(|e| e.0 < 12);
    assert_eq!(*counter.borrow(), 18, "Elements dropped by retain should be freed.");
    drop(tree.into_iter());
    assert_eq!(counter.take(), 30, "Dropping an owned iterator should drop all elements.");
}

#[test]
fn test_clone_eq_display() {
    let tree: OrderTree<u32> = [3, 1, 2].into_iter().collect();
    let clone = tree.clone();

    assert_eq!(tree, clone, "A clone should hold the same elements.");
    assert_eq!(clone.validate(), Ok(()));
    assert_eq!(tree.to_string(), "{1, 2, 3}");
    assert!(format!("{tree:?}").contains("len: 3"));

    let mut other = clone;
    other.remove(&2);
    assert_ne!(tree, other);

    other.clear();
    assert!(other.is_empty());
    assert_eq!(other.to_string(), "{}");
}

#[test]
fn test_set_operations() {
    let tree: OrderTree<u32> = (0..10).collect();
    let evens: HashSet<u32> = (0..20).step_by(2).collect();

    assert!(Set::difference(&tree, &evens).copied().eq([1, 3, 5, 7, 9]));
    assert!(Set::intersection(&tree, &evens).copied().eq([0, 2, 4, 6, 8]));
    assert_eq!(Set::union(&tree, &evens).count(), 15);

    let small: OrderTree<u32> = [2, 4].into_iter().collect();
    assert!(small.is_subset(&tree));
    assert!(tree.is_superset(&small));
    assert!(!tree.is_subset(&evens));
}

#[test]
fn test_set_repeats_in_chained_tree() {
    let mut tree = OrderTree::chained();
    tree.add_all([2, 1, 2, 2]);

    assert_eq!(Set::iter(&tree).count(), 4, "A chained tree yields every copy.");
    assert!(Set::iter(&tree).copied().eq([1, 2, 2, 2]));

    let once: BTreeSet<u32> = [2].into_iter().collect();
    assert!(Set::intersection(&tree, &once).copied().eq([2, 2, 2]));
    assert!(Set::is_subset(&once, &tree));
}

#[cfg(feature = "concurrent")]
#[test]
fn test_concurrent_retain_panic() {
    let tree: ConcurrentOrderTree<u32> = ConcurrentOrderTree::from_tree((0..10).collect());

    let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
        tree.retain(|i| {
            if *i == 2 {
                panic!("predicate failed");
            }
            true
        })
    }));

    assert!(result.is_err());
    assert_eq!(tree.len(), 10, "Other callers should still see every element.");
    assert_eq!(tree.validate(), Ok(()));
}

#[cfg(feature = "concurrent")]
#[test]
fn test_concurrent_tree() {
    use std::sync::Arc;
    use std::thread;

    let tree = Arc::new(ConcurrentOrderTree::new());
    let handles: Vec<_> = (0..8_u64)
        .map(|t| {
            let tree = Arc::clone(&tree);
            thread::spawn(move || {
                for i in 0..1000 {
                    assert!(tree.add(t * 1000 + i));
                }
                for i in (0..1000).step_by(2) {
                    assert!(tree.remove(&(t * 1000 + i)));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(tree.len(), 4000);
    assert_eq!(tree.validate(), Ok(()));
    assert_eq!(tree.get(0), Ok(1));
    assert_eq!(tree.index_of(&7999), Some(3999));
    assert!(tree.to_vec().iter().all(|i| i % 2 == 1));
}
