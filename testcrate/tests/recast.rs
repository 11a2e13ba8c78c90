use link_arena::{Arena, Ptr, Recast, Recaster, RefPtr};
use testcrate::{std_containers, P0};

#[test]
fn compress_and_recast() {
    let mut c = std_containers();
    let ids = c.ids();
    let len = c.a.len();
    assert!(c.a.capacity() > len);
    let old: Vec<P0> = c.a.ptrs().collect();

    let r = c.a.compress_and_shrink_recaster();
    assert_eq!(c.a.capacity(), len);
    assert_eq!(r.len(), len);
    // old handles map to new handles in the same relative order
    for (i, p) in old.iter().enumerate() {
        let mut q = *p;
        r.recast_item(&mut q).unwrap();
        assert_eq!(q.inx(), i);
        assert!(c.a.contains(q));
    }

    // links still use the old handles until recast
    assert!(c.check_invariants().is_err());
    c.a.recast(&r).unwrap();
    c.stack.recast(&r).unwrap();
    c.queue.recast(&r).unwrap();
    c.tree.recast(&r).unwrap();
    c.check_invariants().unwrap();
    assert_eq!(c.ids(), ids);
}

#[test]
fn recast_failure() {
    let mut a: Arena<P0, u8> = Arena::new();
    let p0 = a.insert(0);
    let p1 = a.insert(1);
    a.remove(p0).unwrap();
    let r = a.compress_and_shrink_recaster();
    // `p0` was not allocated at the time of compression
    let mut link = RefPtr::Elem(p0);
    assert_eq!(link.recast(&r), Err(p0));
    let mut link = RefPtr::Elem(p1);
    link.recast(&r).unwrap();
    assert_eq!(a[link.elem().unwrap()], 1);
    // sentinels are unaffected
    let mut link = RefPtr::<P0>::Tail;
    link.recast(&r).unwrap();
    assert_eq!(link, RefPtr::Tail);
}
