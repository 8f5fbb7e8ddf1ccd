//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Session records and profiles carry no identity of their own: two records
/// holding the same fields are the same record. They are replaced wholesale,
/// never edited in place.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct SessionUser {
///     username: String,
/// }
///
/// impl ValueObject for SessionUser {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
