use std::{cell::Cell, cmp::Ordering};

use link_arena::{Arena, Dir, Locate, RefError, RefPtr, TTree};
use rand_xoshiro::{
    rand_core::{RngCore, SeedableRng},
    Xoshiro128StarStar,
};
use testcrate::{ByElemKey, Elem, Tree0, P0};

macro_rules! next_inx {
    ($rng:ident, $len:expr) => {
        ($rng.next_u32() as usize) % ($len)
    };
}

fn dir_from(x: u32) -> Dir {
    if (x & 1) == 0 {
        Dir::LEFT
    } else {
        Dir::RIGHT
    }
}

/// The index that an element with `key` goes to, after all elements with
/// keys less than or equal to it
fn upper_bound(a: &Arena<P0, Elem>, list: &[P0], key: u64) -> usize {
    list.partition_point(|q| a[*q].key <= key)
}

#[test]
fn fuzz_tree() {
    let mut rng = Xoshiro128StarStar::seed_from_u64(0);

    let mut counter = 0u64;
    let mut a: Arena<P0, Elem> = Arena::new();
    let mut tree: Tree0 = TTree::new(ByElemKey);
    // the in order sequence
    let mut list: Vec<P0> = vec![];
    let mut unlinked: Vec<P0> = vec![];
    let mut max_len = 0;
    let mut rotations = 0u64;

    for _ in 0..200_000 {
        TTree::_check_invariants(&tree, &a).unwrap();
        assert_eq!(tree.is_empty(), list.is_empty());
        assert_eq!(tree.first(&a).unwrap(), list.first().copied());
        assert_eq!(tree.last(&a).unwrap(), list.last().copied());
        if let Some(root) = tree.root() {
            assert_eq!(a[root].node.top(), Some(RefPtr::Head));
        }
        let len = list.len();
        match rng.next_u32() % 1000 {
            0..=149 => {
                // new unlinked element
                counter += 1;
                let key = u64::from(rng.next_u32() % 32);
                unlinked.push(a.insert(Elem::new(counter, key)));
            }
            150..=299 => {
                // insert
                if !unlinked.is_empty() {
                    let p = unlinked.swap_remove(next_inx!(rng, unlinked.len()));
                    tree.insert(&mut a, p).unwrap();
                    let i = upper_bound(&a, &list, a[p].key);
                    list.insert(i, p);
                    assert_eq!(tree.insert(&mut a, p), Err(RefError::AlreadyLinked));
                }
            }
            300..=349 => {
                // locate and attach
                if !unlinked.is_empty() {
                    let p = unlinked.swap_remove(next_inx!(rng, unlinked.len()));
                    let key = a[p].key;
                    let vacant = tree
                        .locate(&a, |_: P0, e: &Elem| {
                            if e.key <= key {
                                Ordering::Less
                            } else {
                                Ordering::Greater
                            }
                        })
                        .unwrap();
                    let Locate::Vacant { parent, dir } = vacant else {
                        panic!("found an element with a predicate that never returns `Equal`")
                    };
                    if len == 0 {
                        assert_eq!((parent, dir), (RefPtr::Head, Dir::LEFT));
                    } else {
                        // occupied slots are rejected
                        assert_eq!(
                            tree.attach(&mut a, RefPtr::Head, Dir::LEFT, p),
                            Err(RefError::Boundary)
                        );
                    }
                    tree.attach(&mut a, parent, dir, p).unwrap();
                    let i = upper_bound(&a, &list, key);
                    list.insert(i, p);
                }
            }
            350..=449 => {
                // search
                let key = u64::from(rng.next_u32() % 32);
                let visits = Cell::new(0usize);
                let found = tree
                    .search(&a, |p: P0, e: &Elem| {
                        assert!(a.contains(p));
                        visits.set(visits.get() + 1);
                        e.key.cmp(&key)
                    })
                    .unwrap();
                assert!(visits.get() <= len);
                match found {
                    Some(p) => {
                        assert_eq!(a[p].key, key);
                        assert!(list.contains(&p));
                    }
                    None => assert!(list.iter().all(|p| a[*p].key != key)),
                }
            }
            450..=579 => {
                // unlink
                if len != 0 {
                    let p = list.remove(next_inx!(rng, len));
                    tree.unlink(&mut a, p).unwrap();
                    assert!(!a[p].node.is_linked());
                    assert_eq!(tree.unlink(&mut a, p), Err(RefError::NotLinked));
                    unlinked.push(p);
                }
            }
            580..=799 => {
                // rotate
                if len != 0 {
                    let p = list[next_inx!(rng, len)];
                    let dir = dir_from(rng.next_u32());
                    let res = tree.rotate(&mut a, p, dir);
                    match res {
                        Ok(()) => {
                            rotations += 1;
                            // `p` moved down to the `dir` side of its old child
                            let top = a[p].node.top().unwrap().elem().unwrap();
                            assert_eq!(a[top].node.child(dir), Some(RefPtr::Elem(p)));
                        }
                        Err(e) => {
                            assert_eq!(e, RefError::Boundary);
                            assert_eq!(a[p].node.child(dir.opposite()), Some(RefPtr::Tail));
                        }
                    }
                }
                if let Some(p) = unlinked.first().copied() {
                    assert_eq!(tree.rotate(&mut a, p, Dir::LEFT), Err(RefError::NotLinked));
                }
            }
            800..=899 => {
                // next and prev
                if len != 0 {
                    let i = next_inx!(rng, len);
                    let p = list[i];
                    assert_eq!(tree.next(&a, p).unwrap(), list.get(i + 1).copied());
                    let prev = if i == 0 { None } else { Some(list[i - 1]) };
                    assert_eq!(tree.prev(&a, p).unwrap(), prev);
                }
            }
            900..=989 => {
                // iter
                let ps: Vec<P0> = tree.iter(&a).map(|(p, _)| p).collect();
                assert_eq!(ps, list);
            }
            990..=999 => {
                // unlink everything through the root
                while let Some(root) = tree.root() {
                    tree.unlink(&mut a, root).unwrap();
                    unlinked.push(root);
                }
                list.clear();
            }
            _ => unreachable!(),
        }
        max_len = max_len.max(list.len());
    }
    assert!(max_len > 8);
    assert!(rotations > 1000);
}

#[test]
fn tree_rotations() {
    // build a right leaning chain and rotate it into a balanced tree
    let mut a: Arena<P0, Elem> = Arena::new();
    let mut tree: Tree0 = TTree::new(ByElemKey);
    let ps: Vec<P0> = (0..3).map(|i| a.insert(Elem::new(i, i))).collect();
    for p in &ps {
        tree.insert(&mut a, *p).unwrap();
    }
    assert_eq!(tree.root(), Some(ps[0]));
    assert_eq!(a[ps[0]].node.child(Dir::LEFT), Some(RefPtr::Tail));
    assert_eq!(a[ps[0]].node.child(Dir::RIGHT), Some(RefPtr::Elem(ps[1])));
    assert_eq!(a[ps[1]].node.child(Dir::RIGHT), Some(RefPtr::Elem(ps[2])));

    tree.rotate(&mut a, ps[0], Dir::LEFT).unwrap();
    TTree::_check_invariants(&tree, &a).unwrap();
    assert_eq!(tree.root(), Some(ps[1]));
    assert_eq!(a[ps[1]].node.top(), Some(RefPtr::Head));
    assert_eq!(a[ps[1]].node.child(Dir::LEFT), Some(RefPtr::Elem(ps[0])));
    assert_eq!(a[ps[1]].node.child(Dir::RIGHT), Some(RefPtr::Elem(ps[2])));
    assert_eq!(a[ps[0]].node.top(), Some(RefPtr::Elem(ps[1])));
    assert_eq!(a[ps[2]].node.top(), Some(RefPtr::Elem(ps[1])));

    // nothing on the left of a leaf
    assert_eq!(
        tree.rotate(&mut a, ps[0], Dir::RIGHT),
        Err(RefError::Boundary)
    );

    // rotating back restores the chain
    tree.rotate(&mut a, ps[1], Dir::RIGHT).unwrap();
    TTree::_check_invariants(&tree, &a).unwrap();
    assert_eq!(tree.root(), Some(ps[0]));
    assert_eq!(a[ps[1]].node.child(Dir::LEFT), Some(RefPtr::Tail));

    // removing the root with two children splices in its successor
    tree.rotate(&mut a, ps[0], Dir::LEFT).unwrap();
    tree.unlink(&mut a, ps[1]).unwrap();
    TTree::_check_invariants(&tree, &a).unwrap();
    assert_eq!(tree.root(), Some(ps[2]));
    assert_eq!(a[ps[2]].node.child(Dir::LEFT), Some(RefPtr::Elem(ps[0])));
    assert_eq!(a[ps[0]].node.top(), Some(RefPtr::Elem(ps[2])));
}
