/// An iterator that does not borrow its collection.
///
/// Structural algorithms on intrusive containers need to mutate the arena
/// while walking it (unlinking the element just visited, rewriting neighbor
/// links, and so on). A normal `Iterator` would hold a borrow for the whole
/// loop, so instead the collection is passed to every `advance` call:
///
/// ```text
/// let mut adv = arena.advancer();
/// while let Some(p) = adv.advance(&arena) {
///     ... arena.get_mut(p) ...
///     ... chain.unlink(&mut arena, p) ...
///     ... arena.remove(p) ...
/// }
/// ```
///
/// An advancer never returns the same `Item` twice, and any `Some` it returns
/// is valid at the point it is returned. Elements inserted during the loop may
/// or may not be witnessed.
pub trait Advancer {
    type Collection;
    type Item;

    fn advance(&mut self, collection: &Self::Collection) -> Option<Self::Item>;
}
