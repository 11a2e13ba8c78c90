use core::{
    fmt::Debug,
    hash::Hash,
    num::{NonZeroU128, NonZeroU16, NonZeroU32, NonZeroU64, NonZeroU8},
    panic::{RefUnwindSafe, UnwindSafe},
};

/// Generation counter type of a [Ptr].
///
/// Implemented for the `NonZeroU..` types and for `()` (no generation
/// counting). Users should never need to implement this.
pub trait PtrGen:
    Debug
    + Hash
    + Clone
    + Copy
    + PartialEq
    + Eq
    + PartialOrd
    + Ord
    + Send
    + Sync
    + Unpin
    + RefUnwindSafe
    + UnwindSafe
{
    /// The generation given to [Ptr::invalid]. Arenas start at generation
    /// two, so a `Ptr` with generation one can never be valid.
    fn one() -> Self;
    /// The starting generation of every arena
    fn two() -> Self;
    /// Returns `this + 1`, panicking on overflow
    fn increment(this: Self) -> Self;
}

macro_rules! impl_gen {
    ($($nz:ident)*) => {
        $(
            impl PtrGen for $nz {
                #[inline]
                fn one() -> Self {
                    Self::MIN
                }

                #[inline]
                fn two() -> Self {
                    Self::MIN.saturating_add(1)
                }

                #[inline]
                fn increment(this: Self) -> Self {
                    match this.checked_add(1) {
                        Some(x) => x,
                        None => panic!("generation overflow"),
                    }
                }
            }
        )*
    };
}

impl_gen!(NonZeroU8 NonZeroU16 NonZeroU32 NonZeroU64 NonZeroU128);

impl PtrGen for () {
    #[inline]
    fn one() -> Self {}

    #[inline]
    fn two() -> Self {}

    #[inline]
    fn increment(_this: Self) -> Self {}
}

/// A typed handle to an element of an [Arena](crate::Arena).
///
/// A `Ptr` is what a reference record stores instead of an address. Use
/// [ptr_struct](crate::ptr_struct) to create types implementing this, and use
/// different `Ptr` types for different arenas so that the type system rejects
/// handles from the wrong arena.
///
/// `PartialEq` must distinguish handles with the same index and different
/// generations, and `Ord` must order primarily by the index.
pub trait Ptr:
    Debug
    + Hash
    + Clone
    + Copy
    + PartialEq
    + Eq
    + PartialOrd
    + Ord
    + Send
    + Sync
    + Unpin
    + RefUnwindSafe
    + UnwindSafe
    + 'static
{
    /// `NonZeroU64` when generation tracking is wanted, otherwise `()`
    type Gen: PtrGen;

    /// Returns a `Ptr` with index `usize::MAX` and generation
    /// `PtrGen::one()`, which no arena will ever accept
    fn invalid() -> Self;

    /// The raw slot index
    fn inx(self) -> usize;

    /// The generation this `Ptr` was created with
    fn gen(self) -> Self::Gen;

    /// Do not use this unless you are manually managing internal details
    fn _from_raw(inx: usize, gen: Self::Gen) -> Self;
}

/// Creates structs implementing [Ptr].
///
/// The default generation type is `NonZeroU64`. A different `NonZeroU..`
/// type can be given in parenthesis after the name, and empty parenthesis
/// turn generation counting off. Attributes can follow as a comma separated
/// list, and multiple structs of the same kind can be separated by
/// semicolons.
///
/// ```
/// use core::num::NonZeroU32;
///
/// use link_arena::{ptr_struct, Arena, Ptr};
///
/// ptr_struct!(P0 doc="handles to tasks");
/// ptr_struct!(P1(NonZeroU32));
/// ptr_struct!(P2(); P3());
///
/// let mut a: Arena<P0, &str> = Arena::new();
/// let p = a.insert("task");
/// assert_eq!(format!("{p:?}"), "P0[0](2)");
/// assert!(!a.contains(P0::invalid()));
/// ```
#[macro_export]
macro_rules! ptr_struct {
    ($($name:ident($gen:path) $($attributes:meta),*);*) => {
        $(
            $(#[$attributes])*
            #[derive(
                core::hash::Hash,
                core::clone::Clone,
                core::marker::Copy,
                core::cmp::PartialEq,
                core::cmp::Eq,
                core::cmp::PartialOrd,
                core::cmp::Ord
            )]
            pub struct $name {
                // field order makes the derived `Ord` order by index first
                #[doc(hidden)]
                _internal_inx: usize,
                #[doc(hidden)]
                _internal_gen: $gen,
            }

            impl $crate::Ptr for $name {
                type Gen = $gen;

                #[inline]
                fn invalid() -> Self {
                    Self {
                        _internal_inx: usize::MAX,
                        _internal_gen: $crate::PtrGen::one(),
                    }
                }

                #[inline]
                fn inx(self) -> usize {
                    self._internal_inx
                }

                #[inline]
                fn gen(self) -> Self::Gen {
                    self._internal_gen
                }

                #[inline]
                #[doc(hidden)]
                fn _from_raw(_internal_inx: usize, _internal_gen: Self::Gen) -> Self {
                    Self {
                        _internal_inx,
                        _internal_gen,
                    }
                }
            }

            impl core::fmt::Debug for $name {
                fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                    f.write_fmt(format_args!(
                        "{}[{}]({:?})",
                        stringify!($name),
                        self._internal_inx,
                        self._internal_gen,
                    ))
                }
            }

            $crate::__ptr_common!($name);
        )*
    };
    ($($name:ident() $($attributes:meta),*);*) => {
        $(
            $(#[$attributes])*
            #[derive(
                core::hash::Hash,
                core::clone::Clone,
                core::marker::Copy,
                core::cmp::PartialEq,
                core::cmp::Eq,
                core::cmp::PartialOrd,
                core::cmp::Ord
            )]
            pub struct $name {
                #[doc(hidden)]
                _internal_inx: usize,
            }

            impl $crate::Ptr for $name {
                type Gen = ();

                #[inline]
                fn invalid() -> Self {
                    Self {
                        _internal_inx: usize::MAX,
                    }
                }

                #[inline]
                fn inx(self) -> usize {
                    self._internal_inx
                }

                #[inline]
                fn gen(self) -> Self::Gen {}

                #[inline]
                #[doc(hidden)]
                fn _from_raw(_internal_inx: usize, _internal_gen: ()) -> Self {
                    Self { _internal_inx }
                }
            }

            impl core::fmt::Debug for $name {
                fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                    f.write_fmt(format_args!("{}[{}]", stringify!($name), self._internal_inx))
                }
            }

            $crate::__ptr_common!($name);
        )*
    };
    ($($name:ident $($attributes:meta),*);*) => {
        $(
            $crate::ptr_struct!($name(core::num::NonZeroU64) $($attributes),*);
        )*
    };
}

/// Impls shared by all `ptr_struct` variants
#[doc(hidden)]
#[macro_export]
macro_rules! __ptr_common {
    ($name:ident) => {
        impl core::default::Default for $name {
            #[inline]
            fn default() -> Self {
                $crate::Ptr::invalid()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                core::fmt::Debug::fmt(self, f)
            }
        }

        impl $crate::Recast<$name> for $name {
            #[inline]
            fn recast<R: $crate::Recaster<Item = $name>>(
                &mut self,
                recaster: &R,
            ) -> core::result::Result<(), <R as $crate::Recaster>::Item> {
                recaster.recast_item(self)
            }
        }

        $crate::__ptr_serde!($name);
    };
}

// Serialization drops the generation, deserialization sets it to two like a
// fresh arena.
#[cfg(feature = "serde_support")]
#[doc(hidden)]
#[macro_export]
macro_rules! __ptr_serde {
    ($name:ident) => {
        impl $crate::__serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
            where
                S: $crate::__serde::Serializer,
            {
                serializer.serialize_u64($crate::Ptr::inx(*self) as u64)
            }
        }

        impl<'de> $crate::__serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
            where
                D: $crate::__serde::Deserializer<'de>,
            {
                let inx = <u64 as $crate::__serde::Deserialize>::deserialize(deserializer)?;
                Ok($crate::Ptr::_from_raw(
                    inx as usize,
                    $crate::PtrGen::two(),
                ))
            }
        }
    };
}

#[cfg(not(feature = "serde_support"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __ptr_serde {
    ($name:ident) => {};
}
