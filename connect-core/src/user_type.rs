//! The closed set of account kinds.
//!
//! # Examples
//! ```
//! use std::str::FromStr;
//! use connect_core::UserType;
//!
//! assert_eq!(UserType::default(), UserType::Student);
//! assert_eq!(UserType::from_str("Professional"), Ok(UserType::Professional));
//! assert_eq!(UserType::Hobbyist.to_string(), "hobbyist");
//! ```

use crate::label::labelled_enum;

labelled_enum! {
    /// What brings a user to the platform.
    ///
    /// Matching compares variants exactly: two students earn the shared-type
    /// bonus, a student and a hobbyist do not.
    #[derive(Default)]
    UserType as "user type" {
        /// Enrolled in study.
        #[default]
        Student => "student",
        /// Working in a field.
        Professional => "professional",
        /// Pursuing an interest for its own sake.
        Hobbyist => "hobbyist",
    }
}
