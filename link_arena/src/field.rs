/// Projects one embedded reference record out of an element type.
///
/// An element can be linked into several containers at once by embedding
/// several reference records, and a container is told which one it links
/// through by its `F: Field<T>` parameter. Implementors are usually zero sized
/// marker types made with [ref_field](crate::ref_field).
///
/// The projection must always return the same field, otherwise containers
/// read links they never wrote.
pub trait Field<T> {
    /// The reference shape, one of [SRef](crate::SRef), [DRef](crate::DRef),
    /// or [TRef](crate::TRef)
    type Ref;

    fn get(t: &T) -> &Self::Ref;
    fn get_mut(t: &mut T) -> &mut Self::Ref;
}

/// Creates zero sized marker types implementing [Field].
///
/// ```
/// use link_arena::{ptr_struct, ref_field, Arena, DRef, Field, TRef};
///
/// ptr_struct!(P0);
///
/// struct Job {
///     priority: u32,
///     queue: DRef<P0>,
///     by_priority: TRef<P0>,
/// }
///
/// ref_field!(
///     /// the run queue
///     pub QueueRef => Job { queue: DRef<P0> };
///     PriorityRef => Job { by_priority: TRef<P0> };
/// );
///
/// let mut a: Arena<P0, Job> = Arena::new();
/// let p = a.insert(Job {
///     priority: 3,
///     queue: DRef::new(),
///     by_priority: TRef::new(),
/// });
/// assert!(!a.field::<QueueRef>(p).unwrap().is_linked());
/// assert!(!PriorityRef::get(&a[p]).is_linked());
/// ```
#[macro_export]
macro_rules! ref_field {
    ($(
        $(#[$attributes:meta])*
        $vis:vis $name:ident => $owner:ty { $field:ident : $ref_type:ty }
    );* $(;)?) => {
        $(
            $(#[$attributes])*
            #[derive(
                core::fmt::Debug,
                core::clone::Clone,
                core::marker::Copy,
                core::cmp::PartialEq,
                core::cmp::Eq,
                core::hash::Hash,
                core::default::Default
            )]
            $vis struct $name;

            impl $crate::Field<$owner> for $name {
                type Ref = $ref_type;

                #[inline]
                fn get(t: &$owner) -> &$ref_type {
                    &t.$field
                }

                #[inline]
                fn get_mut(t: &mut $owner) -> &mut $ref_type {
                    &mut t.$field
                }
            }
        )*
    };
}
