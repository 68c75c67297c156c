//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>` and `Into<i64>` implementations
/// - A transparent `sqlx::Type` implementation (with the `sqlite` feature)
///
/// # Example
///
/// ```rust
/// # use neurolab_core::define_id;
/// define_id!(ToolkitId);
/// define_id!(StudioId);
///
/// let toolkit_id = ToolkitId::new(1);
/// let studio_id = StudioId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: ToolkitId = studio_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[cfg_attr(feature = "sqlite", derive(::sqlx::Type))]
        #[cfg_attr(feature = "sqlite", sqlx(transparent))]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(ToolkitId);
define_id!(StudioId);
define_id!(WorkflowId);
define_id!(DatasetId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_as_i64() {
        let id = ToolkitId::new(42);
        assert_eq!(id.as_i64(), 42);
    }

    #[test]
    fn test_from_conversions() {
        let id: StudioId = 7_i64.into();
        let raw: i64 = id.into();
        assert_eq!(raw, 7);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", UserId::new(3)), "3");
    }

    #[test]
    fn test_serde_transparent() {
        let id = WorkflowId::new(11);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "11");

        let parsed: WorkflowId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
