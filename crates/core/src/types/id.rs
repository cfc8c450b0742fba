//! Newtype IDs for type-safe entity references.
//!
//! Every table uses `uuid` primary keys. The `define_id!` macro wraps them so a
//! notice id can never be passed where a resource id is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a type-safe ID wrapper around [`Uuid`].
///
/// Creates a newtype with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - `new()`, `random()`, `as_uuid()`
/// - `From<Uuid>` and `Into<Uuid>` implementations
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use studyspace_core::define_id;
/// define_id!(TopicId);
/// define_id!(ChapterId);
///
/// let topic = TopicId::random();
/// let chapter = ChapterId::new(topic.as_uuid());
///
/// // These are different types, so this won't compile:
/// // let _: TopicId = chapter;
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
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Wrap an existing UUID.
            #[must_use]
            pub const fn new(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Generate a fresh random (v4) ID.
            #[must_use]
            pub fn random() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Get the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> ::uuid::Uuid {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(id: ::uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for ::uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <::uuid::Uuid as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <::uuid::Uuid as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <::uuid::Uuid as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <::uuid::Uuid as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_id!(AdminKeyId);
define_id!(ResourceId);
define_id!(NoticeId);
define_id!(SyllabusId);
define_id!(BannedUserId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_serializes_as_bare_uuid() {
        let raw = Uuid::parse_str("0b8a4c1e-3f5d-4e2a-9c7b-1d2e3f4a5b6c").unwrap();
        let id = NoticeId::new(raw);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0b8a4c1e-3f5d-4e2a-9c7b-1d2e3f4a5b6c\"");
        let parsed: NoticeId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_random_ids_differ() {
        assert_ne!(ResourceId::random(), ResourceId::random());
    }

    #[test]
    fn test_uuid_conversions() {
        let raw = Uuid::new_v4();
        let id: SyllabusId = raw.into();
        let back: Uuid = id.into();
        assert_eq!(back, raw);
        assert_eq!(id.to_string(), raw.to_string());
    }

    #[derive(Serialize, Deserialize)]
    struct Wrapper {
        id: BannedUserId,
    }

    #[test]
    fn test_rejects_non_uuid() {
        assert!(serde_json::from_str::<Wrapper>(r#"{"id": 42}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"id": "not-a-uuid"}"#).is_err());
    }
}
