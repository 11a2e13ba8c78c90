use std::cell::Cell;

use link_arena::{Arena, DChain, Dir, RefError, RefPtr, SChain};
use rand_xoshiro::{
    rand_core::{RngCore, SeedableRng},
    Xoshiro128StarStar,
};
use testcrate::{Elem, Queue0, Stack0, P0};

macro_rules! next_inx {
    ($rng:ident, $len:expr) => {
        ($rng.next_u32() as usize) % ($len)
    };
}

fn dir_from(x: u32) -> Dir {
    if (x & 1) == 0 {
        Dir::Next
    } else {
        Dir::Prev
    }
}

#[test]
fn fuzz_dchain() {
    let mut rng = Xoshiro128StarStar::seed_from_u64(0);

    let mut counter = 0u64;
    let mut a: Arena<P0, Elem> = Arena::new();
    let mut chain: Queue0 = DChain::new();
    // the chain order from head to tail
    let mut list: Vec<P0> = vec![];
    // elements in the arena that are not linked
    let mut unlinked: Vec<P0> = vec![];
    let mut removed: Vec<P0> = vec![];
    let mut max_len = 0;

    for _ in 0..300_000 {
        DChain::_check_invariants(&chain, &a).unwrap();
        Arena::_check_invariants(&a).unwrap();
        assert_eq!(a.len(), list.len() + unlinked.len());
        assert_eq!(chain.is_empty(), list.is_empty());
        assert_eq!(chain.first(), list.first().copied());
        assert_eq!(chain.last(), list.last().copied());
        let len = list.len();
        match rng.next_u32() % 1000 {
            0..=149 => {
                // new unlinked element
                counter += 1;
                unlinked.push(a.insert(Elem::new(counter, 0)));
            }
            150..=249 => {
                // push_front and push_back
                if !unlinked.is_empty() {
                    let p = unlinked.swap_remove(next_inx!(rng, unlinked.len()));
                    if (rng.next_u32() & 1) == 0 {
                        chain.push_front(&mut a, p).unwrap();
                        list.insert(0, p);
                    } else {
                        chain.push_back(&mut a, p).unwrap();
                        list.push(p);
                    }
                }
            }
            250..=399 => {
                // link at a random position and side
                if !unlinked.is_empty() {
                    let i = next_inx!(rng, unlinked.len());
                    let p = unlinked[i];
                    let dir = dir_from(rng.next_u32());
                    let choice = next_inx!(rng, len + 2);
                    let at = if choice == len {
                        RefPtr::Head
                    } else if choice == (len + 1) {
                        RefPtr::Tail
                    } else {
                        RefPtr::Elem(list[choice])
                    };
                    let res = chain.link(&mut a, at, dir, p);
                    match (at, dir) {
                        (RefPtr::Head, Dir::Prev) | (RefPtr::Tail, Dir::Next) => {
                            assert_eq!(res, Err(RefError::Boundary));
                        }
                        (RefPtr::Head, Dir::Next) => {
                            res.unwrap();
                            list.insert(0, p);
                        }
                        (RefPtr::Tail, Dir::Prev) => {
                            res.unwrap();
                            list.push(p);
                        }
                        (RefPtr::Elem(_), Dir::Next) => {
                            res.unwrap();
                            list.insert(choice + 1, p);
                        }
                        (RefPtr::Elem(_), Dir::Prev) => {
                            res.unwrap();
                            list.insert(choice, p);
                        }
                    }
                    if !a.field::<testcrate::Queue>(p).unwrap().is_linked() {
                        // the failed case must leave `p` untouched
                        assert_eq!(a[p].queue, link_arena::DRef::new());
                    } else {
                        unlinked.swap_remove(i);
                    }
                }
            }
            400..=429 => {
                // linking twice
                if len != 0 {
                    let p = list[next_inx!(rng, len)];
                    assert_eq!(
                        chain.push_back(&mut a, p),
                        Err(RefError::AlreadyLinked)
                    );
                }
            }
            430..=579 => {
                // unlink
                if len != 0 {
                    let p = list.remove(next_inx!(rng, len));
                    chain.unlink(&mut a, p).unwrap();
                    assert!(!a[p].queue.is_linked());
                    assert_eq!(chain.unlink(&mut a, p), Err(RefError::NotLinked));
                    unlinked.push(p);
                }
            }
            580..=649 => {
                // pop_front and pop_back
                if (rng.next_u32() & 1) == 0 {
                    let p = chain.pop_front(&mut a).unwrap();
                    if len != 0 {
                        assert_eq!(p, Some(list.remove(0)));
                    } else {
                        assert_eq!(p, None);
                    }
                    unlinked.extend(p);
                } else {
                    let p = chain.pop_back(&mut a).unwrap();
                    assert_eq!(p, list.pop());
                    unlinked.extend(p);
                }
            }
            650..=749 => {
                // step
                if len != 0 {
                    let i = next_inx!(rng, len);
                    let at = RefPtr::Elem(list[i]);
                    let next = chain.step(&a, at, Dir::Next).unwrap();
                    let prev = chain.step(&a, at, Dir::Prev).unwrap();
                    if i + 1 == len {
                        assert_eq!(next, RefPtr::Tail);
                    } else {
                        assert_eq!(next, RefPtr::Elem(list[i + 1]));
                    }
                    if i == 0 {
                        assert_eq!(prev, RefPtr::Head);
                    } else {
                        assert_eq!(prev, RefPtr::Elem(list[i - 1]));
                    }
                }
                assert_eq!(
                    chain.step(&a, RefPtr::Head, Dir::Prev),
                    Err(RefError::Boundary)
                );
                assert_eq!(
                    chain.step(&a, RefPtr::Tail, Dir::Next),
                    Err(RefError::Boundary)
                );
                if let Some(p) = unlinked.first() {
                    assert_eq!(
                        chain.step(&a, RefPtr::Elem(*p), Dir::Next),
                        Err(RefError::NotLinked)
                    );
                }
            }
            750..=849 => {
                // find, the matcher only ever sees elements
                let dir = dir_from(rng.next_u32());
                let target = if len != 0 {
                    a[list[next_inx!(rng, len)]].id
                } else {
                    u64::MAX
                };
                let visits = Cell::new(0usize);
                let from = match dir {
                    Dir::Next => RefPtr::Head,
                    Dir::Prev => RefPtr::Tail,
                };
                let found = chain
                    .find(&a, from, dir, |p: P0, e: &Elem| {
                        assert!(a.contains(p));
                        visits.set(visits.get() + 1);
                        e.id == target
                    })
                    .unwrap();
                if len != 0 {
                    let i = list.iter().position(|p| a[*p].id == target).unwrap();
                    assert_eq!(found, Some(list[i]));
                    match dir {
                        Dir::Next => assert_eq!(visits.get(), i + 1),
                        Dir::Prev => assert_eq!(visits.get(), len - i),
                    }
                } else {
                    assert_eq!(found, None);
                    assert_eq!(visits.get(), 0);
                }
            }
            850..=899 => {
                // iter both ways
                let forward: Vec<P0> = chain.iter(&a, Dir::Next).map(|(p, _)| p).collect();
                assert_eq!(forward, list);
                let mut backward: Vec<P0> = chain.iter(&a, Dir::Prev).map(|(p, _)| p).collect();
                backward.reverse();
                assert_eq!(backward, list);
            }
            900..=998 => {
                // remove an unlinked element from the arena
                if !unlinked.is_empty() {
                    let p = unlinked.swap_remove(next_inx!(rng, unlinked.len()));
                    a.remove(p).unwrap();
                    removed.push(p);
                }
                if !removed.is_empty() {
                    let p = removed[next_inx!(rng, removed.len())];
                    assert_eq!(chain.push_back(&mut a, p), Err(RefError::Dangling));
                    assert_eq!(chain.unlink(&mut a, p), Err(RefError::Dangling));
                }
            }
            999 => {
                // clear
                chain.clear(&mut a).unwrap();
                unlinked.append(&mut list);
            }
            _ => unreachable!(),
        }
        max_len = max_len.max(list.len());
    }
    assert!(max_len > 8);
}

#[test]
fn fuzz_schain() {
    let mut rng = Xoshiro128StarStar::seed_from_u64(0);

    let mut counter = 0u64;
    let mut a: Arena<P0, Elem> = Arena::new();
    let mut chain: Stack0 = SChain::new();
    let mut list: Vec<P0> = vec![];
    let mut unlinked: Vec<P0> = vec![];

    for _ in 0..100_000 {
        SChain::_check_invariants(&chain, &a).unwrap();
        assert_eq!(chain.is_empty(), list.is_empty());
        assert_eq!(chain.first(), list.first().copied());
        let len = list.len();
        match rng.next_u32() % 1000 {
            0..=199 => {
                counter += 1;
                unlinked.push(a.insert(Elem::new(counter, 0)));
            }
            200..=499 => {
                // link_after a random position
                if !unlinked.is_empty() {
                    let p = unlinked.swap_remove(next_inx!(rng, unlinked.len()));
                    let choice = next_inx!(rng, len + 1);
                    if choice == len {
                        chain.push_front(&mut a, p).unwrap();
                        list.insert(0, p);
                    } else {
                        chain.link_after(&mut a, RefPtr::Elem(list[choice]), p).unwrap();
                        list.insert(choice + 1, p);
                    }
                    assert_eq!(
                        chain.link_after(&mut a, RefPtr::Head, p),
                        Err(RefError::AlreadyLinked)
                    );
                }
            }
            500..=749 => {
                // unlink_after a random position
                let choice = next_inx!(rng, len + 1);
                let at = if choice == len {
                    RefPtr::Head
                } else {
                    RefPtr::Elem(list[choice])
                };
                let res = chain.unlink_after(&mut a, at).unwrap();
                let i = if choice == len { 0 } else { choice + 1 };
                if i < list.len() {
                    assert_eq!(res, Some(list.remove(i)));
                } else {
                    assert_eq!(res, None);
                }
                unlinked.extend(res);
            }
            750..=849 => {
                // pop_front
                let p = chain.pop_front(&mut a).unwrap();
                if len != 0 {
                    assert_eq!(p, Some(list.remove(0)));
                } else {
                    assert_eq!(p, None);
                }
                unlinked.extend(p);
            }
            850..=949 => {
                // find and iter
                let target = rng.next_u32() as u64 % (counter + 1);
                let found = chain
                    .find(&a, RefPtr::Head, |_: P0, e: &Elem| e.id == target)
                    .unwrap();
                assert_eq!(found, list.iter().copied().find(|p| a[*p].id == target));
                let ps: Vec<P0> = chain.iter(&a).map(|(p, _)| p).collect();
                assert_eq!(ps, list);
            }
            950..=999 => {
                // boundaries
                assert_eq!(chain.step(&a, RefPtr::Tail), Err(RefError::Boundary));
                assert_eq!(
                    chain.link_after(&mut a, RefPtr::Tail, P0::default()),
                    Err(RefError::Dangling)
                );
                if let Some(p) = unlinked.first().copied() {
                    assert_eq!(
                        chain.link_after(&mut a, RefPtr::Tail, p),
                        Err(RefError::Boundary)
                    );
                    assert_eq!(chain.step(&a, RefPtr::Elem(p)), Err(RefError::NotLinked));
                }
            }
            _ => unreachable!(),
        }
    }
}
