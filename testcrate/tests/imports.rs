//! makes sure all variations of the macros compile and do not require imports
//! other than the macros themselves

use std::num::{NonZeroU128, NonZeroU8};

use link_arena::{ptr_struct, ref_field};

ptr_struct!(P0(NonZeroU128));
ptr_struct!(P1());
ptr_struct!(P2);
ptr_struct!(P3(NonZeroU8) doc = "with attributes", allow(dead_code));
ptr_struct!(P4; Q0; Q1);
ptr_struct!(R0(); R1());

pub struct Elem {
    pub single: link_arena::SRef<P2>,
    pub double: link_arena::DRef<P2>,
    pub triple: link_arena::TRef<P2>,
}

ref_field!(Single => Elem { single: link_arena::SRef<P2> });
ref_field!(
    /// documented
    pub Double => Elem { double: link_arena::DRef<P2> };
    pub(crate) Triple => Elem { triple: link_arena::TRef<P2> };
);
