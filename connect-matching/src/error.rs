//! Error types raised by the recommendation service.

use connect_core::UserId;
use thiserror::Error;

/// Errors raised while producing recommendations for a user.
#[derive(Debug, Error)]
pub enum RecommendError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// The requested user does not exist.
    #[error("user {id} not found")]
    UnknownUser {
        /// Identifier that was looked up.
        id: UserId,
    },
    /// The community source failed.
    #[error("failed to load {operation}")]
    Source {
        /// Description of the failed lookup.
        operation: &'static str,
        /// Error returned by the source.
        #[source]
        source: E,
    },
}
