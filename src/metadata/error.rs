//! Errors raised while resolving metadata.

/// Why a resolve or fetch could not produce metadata.
///
/// Cloneable so a single fetch outcome can be handed to every request that
/// was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The media carried neither a show name nor a known series id.
    #[error("media has no show name or series id to resolve")]
    MissingShow,

    /// The remote search returned no series for the name.
    #[error("no series found for show {0:?}")]
    ShowNotFound(String),

    /// The search or package download failed.
    #[error("remote source unavailable: {0}")]
    RemoteUnavailable(String),

    /// The downloaded package could not be turned into records.
    #[error("malformed remote data: {0}")]
    MalformedRemoteData(String),
}
