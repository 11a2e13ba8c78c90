#![cfg(feature = "serde_support")]

use link_arena::{Arena, DChain, Ptr, PtrGen, RefPtr, SChain, TTree};
use serde::{de::DeserializeOwned, Serialize};
use testcrate::{std_containers, Containers, Elem, Queue0, Stack0, Tree0, P0};

// RON version for debug
/*
fn round_trip<T: Serialize + DeserializeOwned>(t: &T) -> T {
    let s = ron::to_string(t).unwrap();
    let res: T = ron::from_str(&s).unwrap();
    res
}
*/

fn round_trip<T: Serialize + DeserializeOwned>(t: &T) -> T {
    let v = postcard::to_allocvec(t).unwrap();
    let res: T = postcard::from_bytes(&v).unwrap();
    res
}

#[test]
fn serde() {
    let c = std_containers();
    let a: Arena<P0, Elem> = round_trip(&c.a);
    Arena::_check_invariants(&a).unwrap();
    assert_eq!(a.len(), c.a.len());
    for (p, t) in &c.a {
        let q = P0::_from_raw(p.inx(), PtrGen::two());
        let e = a.get(q).unwrap();
        assert_eq!((e.id, e.key), (t.id, t.key));
        assert_eq!(e.node.is_linked(), t.node.is_linked());
    }

    let stack: Stack0 = round_trip(&c.stack);
    let queue: Queue0 = round_trip(&c.queue);
    let tree: Tree0 = round_trip(&c.tree);
    let d = Containers {
        a,
        stack,
        queue,
        tree,
    };
    d.check_invariants().unwrap();
    assert_eq!(d.ids(), c.ids());
}

#[test]
fn serde_empty_containers() {
    let stack: Stack0 = round_trip(&SChain::new());
    assert!(stack.is_empty());
    let queue: Queue0 = round_trip(&DChain::new());
    assert!(queue.is_empty());
    assert_eq!(queue.head().next(), Some(RefPtr::Tail));
    let tree: Tree0 = round_trip(&TTree::default());
    assert!(tree.is_empty());
}

#[test]
fn serde_rejects_bad_sentinels() {
    // a tail sentinel whose link does not point back to the head
    let mut queue: Queue0 = DChain::new();
    let mut a: Arena<P0, Elem> = Arena::new();
    let p = a.insert(Elem::new(0, 0));
    queue.push_back(&mut a, p).unwrap();
    let v = postcard::to_allocvec(&(queue.head(), link_arena::DRef::<P0>::new())).unwrap();
    assert!(postcard::from_bytes::<Queue0>(&v).is_err());
}
