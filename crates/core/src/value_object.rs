//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. A validated
/// catalog description is a value object; a catalog type (which keeps its
/// remote-assigned id across edits) is an entity.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Description(String);
///
/// impl ValueObject for Description {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
