//! Opaque identifiers for persisted records and live connections.
//!
//! Each identifier wraps a `u64` so the compiler keeps user, group, event and
//! message keys apart. Storage layers mint the raw values.
//!
//! # Examples
//! ```
//! use connect_core::{GroupId, UserId};
//!
//! let user = UserId::new(7);
//! assert_eq!(user.get(), 7);
//! assert_eq!(user.to_string(), "7");
//! assert_eq!(GroupId::from(3).get(), 3);
//! ```

use std::fmt;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(transparent)
        )]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw identifier.
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Return the raw identifier.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

identifier!(
    /// Identifies a user account.
    UserId
);
identifier!(
    /// Identifies a group.
    GroupId
);
identifier!(
    /// Identifies an event.
    EventId
);
identifier!(
    /// Identifies a stored message.
    MessageId
);
identifier!(
    /// Identifies one live client connection in the presence registry.
    ConnectionId
);
