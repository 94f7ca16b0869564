//! Newtype wrappers for identifiers to ensure type safety.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the inner string reference.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

string_id!(
    /// Identifier of one execution within its provider's namespace.
    ExecutionId
);

string_id!(
    /// Identifier of a job definition on the remote job runner.
    JobId
);

string_id!(
    /// Identifier of a delivery (errand).
    DeliveryId
);

string_id!(
    /// Identifier of a ride.
    RideId
);

impl DeliveryId {
    /// Generate a new random DeliveryId.
    pub fn generate() -> Self {
        Self(format!("errand-{}", Uuid::new_v4().simple()))
    }
}

impl RideId {
    /// Generate a new random RideId.
    pub fn generate() -> Self {
        Self(format!("ride-{}", Uuid::new_v4().simple()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ride_id_generate() {
        let id1 = RideId::generate();
        let id2 = RideId::generate();
        assert_ne!(id1, id2);
        assert!(id1.as_str().starts_with("ride-"));
    }

    #[test]
    fn test_id_display() {
        let id = ExecutionId::new("exec-123");
        assert_eq!(format!("{}", id), "exec-123");
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = JobId::new("doordash-watch");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"doordash-watch\"");
    }
}
