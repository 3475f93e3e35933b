//! Opaque record identifiers issued by the backend.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors returned when constructing an identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdValidationError {
    /// The identifier was empty.
    #[error("identifier must not be empty")]
    Empty,
    /// The identifier had leading or trailing whitespace.
    #[error("identifier must not contain surrounding whitespace")]
    SurroundingWhitespace,
}

fn validate(raw: &str) -> Result<(), IdValidationError> {
    if raw.is_empty() {
        return Err(IdValidationError::Empty);
    }
    if raw.trim() != raw {
        return Err(IdValidationError::SurroundingWhitespace);
    }
    Ok(())
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and construct the identifier.
            pub fn new(id: impl Into<String>) -> Result<Self, IdValidationError> {
                let raw = id.into();
                validate(&raw)?;
                Ok(Self(raw))
            }

            /// Borrow the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

record_id!(
    /// Identifier of a company or job-seeker account.
    UserId
);
record_id!(
    /// Identifier of a job posting.
    JobId
);
record_id!(
    /// Identifier of a job application record.
    ApplicationId
);
record_id!(
    /// Identifier of a saved-job record.
    FavoriteId
);
