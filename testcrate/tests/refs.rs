use link_arena::{
    Arena, DChain, DRef, Dir, Field, RefError, RefPtr, SRef, TRef, NEXT, PREV,
};
use testcrate::{Elem, Node, Queue, Queue0, Stack, P0};

#[test]
fn dir() {
    assert_eq!(Dir::Next.inx(), NEXT);
    assert_eq!(Dir::Prev.inx(), PREV);
    assert_eq!(Dir::LEFT, Dir::Next);
    assert_eq!(Dir::RIGHT, Dir::Prev);
    assert_eq!(Dir::Next.opposite(), Dir::Prev);
    assert_eq!(Dir::RIGHT.opposite(), Dir::LEFT);
    assert_eq!(Dir::from_inx(0), Some(Dir::Next));
    assert_eq!(Dir::from_inx(1), Some(Dir::Prev));
    assert_eq!(Dir::from_inx(2), None);
}

#[test]
fn ref_ptr() {
    let mut a: Arena<P0, Elem> = Arena::new();
    let p = a.insert(Elem::new(0, 0));
    let r: RefPtr<P0> = p.into();
    assert_eq!(r, RefPtr::Elem(p));
    assert_eq!(r.elem(), Ok(p));
    assert_eq!(r.as_elem(), Some(p));
    assert!(!r.is_sentinel());
    for s in [RefPtr::<P0>::Head, RefPtr::Tail] {
        assert!(s.is_sentinel());
        assert_eq!(s.elem(), Err(RefError::Sentinel));
        assert_eq!(s.as_elem(), None);
    }
}

#[test]
fn unlinked_records() {
    let s = SRef::<P0>::new();
    assert!(!s.is_linked());
    assert_eq!(s.next(), None);
    let d = DRef::<P0>::default();
    assert!(!d.is_linked());
    assert_eq!((d.next(), d.prev()), (None, None));
    assert_eq!(d[Dir::Next], None);
    let t = TRef::<P0>::new();
    assert!(!t.is_linked());
    assert_eq!((t.top(), t[Dir::LEFT], t.child(Dir::RIGHT)), (None, None, None));
}

#[test]
fn cast_and_field() {
    let mut a: Arena<P0, Elem> = Arena::new();
    let mut queue: Queue0 = DChain::new();
    let p0 = a.insert(Elem::new(0, 10));
    let p1 = a.insert(Elem::new(1, 11));
    queue.push_back(&mut a, p0).unwrap();
    queue.push_back(&mut a, p1).unwrap();

    // projecting a field out and casting back recovers the same owner
    let r = a.field::<Queue>(p0).unwrap().next().unwrap();
    assert_eq!(r, RefPtr::Elem(p1));
    let owner = a.cast(r).unwrap();
    assert_eq!(owner.id, 1);
    assert!(std::ptr::eq(Queue::get(owner), &a[p1].queue));
    assert_eq!(a.field::<Queue>(p0).unwrap().prev(), Some(RefPtr::Head));

    // sentinels have no owner
    let r = a.field::<Queue>(p1).unwrap().next().unwrap();
    assert_eq!(r, RefPtr::Tail);
    assert_eq!(a.cast(r).unwrap_err(), RefError::Sentinel);
    assert_eq!(a.cast_mut(RefPtr::Head).unwrap_err(), RefError::Sentinel);

    // fields are projected independently
    assert!(!a.field::<Stack>(p0).unwrap().is_linked());
    assert!(!a.field::<Node>(p0).unwrap().is_linked());
    a.cast_mut(RefPtr::Elem(p1)).unwrap().key = 12;
    assert_eq!(a[p1].key, 12);

    queue.unlink(&mut a, p1).unwrap();
    a.remove(p1).unwrap();
    assert_eq!(a.cast(RefPtr::Elem(p1)).unwrap_err(), RefError::Dangling);
    assert_eq!(a.field::<Queue>(p1).unwrap_err(), RefError::Dangling);
    assert_eq!(a.field_mut::<Stack>(p1).unwrap_err(), RefError::Dangling);
}

#[test]
fn errors_display() {
    for e in [
        RefError::Sentinel,
        RefError::Dangling,
        RefError::AlreadyLinked,
        RefError::NotLinked,
        RefError::Boundary,
    ] {
        assert!(!e.to_string().is_empty());
    }
}
