use thiserror::Error;

/// Failures of the checked reference operations.
///
/// Each variant replaces what would be undefined behavior with raw intrusive
/// pointers: dereferencing a sentinel, following a link to a freed element,
/// or linking a reference that is already part of a topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum RefError {
    /// A head or tail sentinel was cast to an element
    #[error("a head or tail sentinel cannot be cast to an element")]
    Sentinel,
    /// The handle does not point to a live element of the arena
    #[error("the reference points to an element that is not in the arena")]
    Dangling,
    /// The element's reference is already linked
    #[error("the reference is already linked into a container")]
    AlreadyLinked,
    /// The element's reference is not linked where a linked one is required
    #[error("the reference is not linked into a container")]
    NotLinked,
    /// The operation would go past the outer side of a head or tail sentinel
    #[error("nothing can be linked or stepped to beyond a container's sentinels")]
    Boundary,
}
