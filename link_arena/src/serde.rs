//! Serialization of arenas, references, and containers
//!
//! Serialization drops generation counters and deserialization sets them to
//! 2, so handles stored inside elements stay consistent with the
//! deserialized arena. A [RefPtr] is written as a `(tag, Option<index>)`
//! tuple where the tag is 0 for the head, 1 for the tail, and 2 for an
//! element. Containers only write their sentinel records, since all other
//! links are stored inside the elements of the arena.
//!
//! Unused capacity below the largest allocated index is inherited by the
//! deserializer. Use [Arena::compress_and_shrink_recaster] and recast the
//! elements and containers before serializing long lived state.
//!
//! ```
//! use link_arena::{ptr_struct, Arena, RefPtr};
//! use ron::{from_str, to_string};
//!
//! ptr_struct!(P0);
//!
//! let mut a: Arena<P0, (u64, Option<RefPtr<P0>>)> = Arena::new();
//! let p0 = a.insert((7, Some(RefPtr::Head)));
//! a.insert((8, Some(RefPtr::Elem(p0))));
//!
//! let serialized = to_string(&a).unwrap();
//! assert_eq!(serialized, "{0:(7,Some((0,None))),1:(8,Some((2,Some(0))))}");
//!
//! let b: Arena<P0, (u64, Option<RefPtr<P0>>)> = from_str(&serialized).unwrap();
//! assert_eq!(a, b);
//! ```

use core::{fmt, marker::PhantomData};

use serde::{
    de::{Error, MapAccess, Visitor},
    ser::{SerializeMap, SerializeTuple},
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::{
    arena::Entry, Arena, DChain, DRef, Ptr, PtrGen, RefPtr, SChain, SRef, TRef, TTree,
};

impl<P: Ptr, T: Serialize> Serialize for Arena<P, T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_map(Some(self.len()))?;
        for (p, t) in self {
            s.serialize_entry(&(p.inx() as u64), t)?;
        }
        s.end()
    }
}

struct ArenaVisitor<P: Ptr, T>(PhantomData<fn() -> (P, T)>);

impl<'de, P: Ptr, T> Visitor<'de> for ArenaVisitor<P, T>
where
    T: Deserialize<'de>,
{
    type Value = Arena<P, T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a `link_arena` arena")
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut a = Arena::new();
        if let Some(hint) = access.size_hint() {
            a.m.reserve(hint);
        }
        while let Some((inx, t)) = access.next_entry::<u64, T>()? {
            let inx = usize::try_from(inx)
                .map_err(|_| Error::custom("arena index does not fit in a `usize`"))?;
            while a.m.len() <= inx {
                // relinked by `rebuild_freelist`
                a.m.push(Entry::Free(0));
            }
            match a.m[inx] {
                Entry::Free(_) => {
                    a.m[inx] = Entry::Allocated(PtrGen::two(), t);
                    a.len += 1;
                }
                Entry::Allocated(..) => {
                    return Err(Error::custom(
                        "when deserializing a `link_arena` arena, encountered duplicate index keys",
                    ))
                }
            }
        }
        a.rebuild_freelist();
        Ok(a)
    }
}

impl<'de, P: Ptr, T> Deserialize<'de> for Arena<P, T>
where
    T: Deserialize<'de>,
{
    /// This function returns an error in case of duplicate index keys
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ArenaVisitor(PhantomData))
    }
}

impl<P: Ptr + Serialize> Serialize for RefPtr<P> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let (tag, p) = match self {
            RefPtr::Head => (0u8, None),
            RefPtr::Tail => (1, None),
            RefPtr::Elem(p) => (2, Some(p)),
        };
        let mut s = serializer.serialize_tuple(2)?;
        s.serialize_element(&tag)?;
        s.serialize_element(&p)?;
        s.end()
    }
}

impl<'de, P: Ptr + Deserialize<'de>> Deserialize<'de> for RefPtr<P> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (tag, p): (u8, Option<P>) = Deserialize::deserialize(deserializer)?;
        match (tag, p) {
            (0, None) => Ok(RefPtr::Head),
            (1, None) => Ok(RefPtr::Tail),
            (2, Some(p)) => Ok(RefPtr::Elem(p)),
            _ => Err(Error::custom("invalid `RefPtr` tag")),
        }
    }
}

impl<P: Ptr + Serialize> Serialize for SRef<P> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.next.serialize(serializer)
    }
}

impl<'de, P: Ptr + Deserialize<'de>> Deserialize<'de> for SRef<P> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let next = Deserialize::deserialize(deserializer)?;
        Ok(SRef { next })
    }
}

impl<P: Ptr + Serialize> Serialize for DRef<P> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_tuple(2)?;
        s.serialize_element(&self.r[0])?;
        s.serialize_element(&self.r[1])?;
        s.end()
    }
}

impl<'de, P: Ptr + Deserialize<'de>> Deserialize<'de> for DRef<P> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (r0, r1) = Deserialize::deserialize(deserializer)?;
        Ok(DRef { r: [r0, r1] })
    }
}

impl<P: Ptr + Serialize> Serialize for TRef<P> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_tuple(3)?;
        s.serialize_element(&self.top)?;
        s.serialize_element(&self.r[0])?;
        s.serialize_element(&self.r[1])?;
        s.end()
    }
}

impl<'de, P: Ptr + Deserialize<'de>> Deserialize<'de> for TRef<P> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (top, r0, r1) = Deserialize::deserialize(deserializer)?;
        Ok(TRef { r: [r0, r1], top })
    }
}

impl<P: Ptr + Serialize, F> Serialize for SChain<P, F> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (self.head(), self.tail()).serialize(serializer)
    }
}

impl<'de, P: Ptr + Deserialize<'de>, F> Deserialize<'de> for SChain<P, F> {
    /// The sentinels are restored as written, use `SChain::_check_invariants`
    /// together with the deserialized arena to validate the whole chain
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (head, tail): (SRef<P>, SRef<P>) = Deserialize::deserialize(deserializer)?;
        if head.next.is_none() || tail.next.is_some() {
            return Err(Error::custom("broken `SChain` sentinels"))
        }
        Ok(SChain::from_sentinels(head, tail))
    }
}

impl<P: Ptr + Serialize, F> Serialize for DChain<P, F> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (self.head(), self.tail()).serialize(serializer)
    }
}

impl<'de, P: Ptr + Deserialize<'de>, F> Deserialize<'de> for DChain<P, F> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (head, tail): (DRef<P>, DRef<P>) = Deserialize::deserialize(deserializer)?;
        if head.r[0].is_none() || head.r[1].is_some() || tail.r[0].is_some() || tail.r[1].is_none()
        {
            return Err(Error::custom("broken `DChain` sentinels"))
        }
        Ok(DChain::from_sentinels(head, tail))
    }
}

impl<P: Ptr + Serialize, F, C> Serialize for TTree<P, F, C> {
    /// The comparator is not serialized
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (self.head(), self.tail()).serialize(serializer)
    }
}

impl<'de, P: Ptr + Deserialize<'de>, F, C: Default> Deserialize<'de> for TTree<P, F, C> {
    /// The comparator is restored with `C::default()`
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (head, tail): (TRef<P>, TRef<P>) = Deserialize::deserialize(deserializer)?;
        if head.r[0].is_none() || head.r[1].is_some() || head.top.is_some() || tail.is_linked() {
            return Err(Error::custom("broken `TTree` sentinels"))
        }
        Ok(TTree::from_sentinels(head, tail, C::default()))
    }
}
