//! Backend identifiers
//!
//! The backend is not consistent about identifier encoding: some endpoints
//! return numeric ids, others return UUID strings. Every id is kept as its
//! string form and accepts either encoding on input.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into()))
            }
        }
    };
}

string_id!(
    /// Identifier of an application draft
    ApplicationId
);
string_id!(
    /// Identifier of a published scholarship
    ScholarshipId
);
string_id!(
    /// Identifier of an uploaded document on the backend
    DocumentId
);
string_id!(
    /// Identifier of an interview slot
    SlotId
);
string_id!(
    /// Identifier of an interview booking
    BookingId
);
string_id!(
    /// Identifier of a notification
    NotificationId
);
string_id!(
    /// Identifier of a user account
    UserId
);
