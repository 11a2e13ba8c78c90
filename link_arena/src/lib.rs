//! Intrusive references over a generation checked arena.
//!
//! Elements embed small reference records ([SRef], [DRef], [TRef]) as
//! fields, and containers link elements together by writing only those
//! records. Links are typed [Ptr] handles into an application owned [Arena]
//! instead of addresses, so recovering the owner of a reference is the
//! checked [Arena::cast] instead of pointer arithmetic.
//!
//! Every container owns a head and a tail sentinel record of the same shape
//! as the element records, named by [RefPtr::Head] and [RefPtr::Tail]. The
//! sentinels bound every walk, so linking at the ends of an empty or full
//! container needs no special cases, and they can never be cast to an
//! element.
//!
//! ```
//! use link_arena::{ptr_struct, ref_field, Arena, DChain, DRef, Dir, RefError, RefPtr};
//!
//! ptr_struct!(P0);
//!
//! #[derive(Debug)]
//! struct Task {
//!     name: &'static str,
//!     ready: DRef<P0>,
//! }
//!
//! ref_field!(Ready => Task { ready: DRef<P0> });
//!
//! let mut a: Arena<P0, Task> = Arena::new();
//! let mut ready: DChain<P0, Ready> = DChain::new();
//! for name in ["A", "B", "C"] {
//!     let p = a.insert(Task { name, ready: DRef::new() });
//!     ready.push_back(&mut a, p).unwrap();
//! }
//!
//! // H <-> A <-> B <-> C <-> T
//! let first = ready.first().unwrap();
//! assert_eq!(a[first].ready.prev(), Some(RefPtr::Head));
//! assert_eq!(a.cast(RefPtr::Head).unwrap_err(), RefError::Sentinel);
//!
//! let b = ready.step(&a, RefPtr::Elem(first), Dir::Next).unwrap();
//! assert_eq!(a.cast(b).unwrap().name, "B");
//!
//! // containers never own elements, unlink before removing
//! let b = b.elem().unwrap();
//! ready.unlink(&mut a, b).unwrap();
//! a.remove(b).unwrap();
//! let names: Vec<_> = ready.iter(&a, Dir::Next).map(|(_, t)| t.name).collect();
//! assert_eq!(names, ["A", "C"]);
//! ```

#![no_std]
// the `Ptr` impls come from user facing macros, so this crate avoids unsafe
// code entirely
#![deny(unsafe_code)]
// false positives
#![allow(clippy::while_let_on_iterator)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod advancer;
mod arena;
pub mod arena_iterators;
mod compare;
mod double;
mod error;
mod examine;
mod field;
mod ptr;
mod refs;
#[cfg(feature = "serde_support")]
pub mod serde;
mod single;
mod triple;

pub use advancer::Advancer;
pub use arena::Arena;
pub use compare::{default_compare, ByKey, ByOrd, Comparator, IdentityOrder};
pub use double::{DChain, DIter};
pub use error::RefError;
pub use examine::{Equals, IsPtr, Matcher, Order, Target};
pub use field::Field;
pub use ptr::{Ptr, PtrGen};
pub use recasting::{Recast, Recaster};
pub use refs::{DRef, Dir, RefPtr, SRef, TRef, NEXT, PREV};
pub use single::{SChain, SIter};
pub use triple::{Locate, TIter, TTree};

#[cfg(feature = "serde_support")]
#[doc(hidden)]
pub use ::serde as __serde;
