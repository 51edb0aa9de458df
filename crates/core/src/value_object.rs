//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity and are compared by their attribute values.
/// Permission tokens are the canonical example in this workspace: two
/// `"article.CREATE"` tokens are interchangeable wherever they come from.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
