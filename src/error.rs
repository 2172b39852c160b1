//! Error types shared by every layer of songcat.
//!
//! [`Error`] is what the session manager, the recommendation engine and the
//! HTTP handlers return. [`ProviderError`] is what the Spotify client returns;
//! it is converted into an [`Error`] at the call site so that a timeout always
//! stays distinguishable from a rejected request.

use thiserror::Error;

/// Broad class of a failure, used to pick the user-facing reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The user has to (re-)authenticate.
    Authentication,
    /// Nothing matched; the request itself was fine.
    NoData,
    /// Spotify or the catalog host failed.
    Upstream,
    /// The request named something that does not exist.
    BadRequest,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown tenant '{0}'")]
    UnknownTenant(String),

    #[error("no client credentials configured for tenant '{0}'")]
    MissingCredentials(String),

    #[error("authorization state is invalid or expired")]
    InvalidOrExpiredState,

    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("no track is currently playing")]
    NoActiveTrack,

    #[error("no audio features available for track {0}")]
    FeaturesUnavailable(String),

    #[error("no similar song found")]
    NoCompatibleCandidates,

    #[error("unknown catalog '{0}'")]
    UnknownCatalog(String),

    #[error("failed to fetch catalog: {0}")]
    CatalogFetchFailed(String),

    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("failed to create playlist: {0}")]
    PlaylistCreateFailed(String),

    #[error("failed to add batch {batch} to playlist: {reason}")]
    BatchAddFailed { batch: usize, reason: String },

    #[error("request to provider timed out: {0}")]
    ProviderTimeout(String),

    #[error("provider request failed: {0}")]
    Provider(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidOrExpiredState
            | Error::TokenExchangeFailed(_)
            | Error::NotAuthenticated => ErrorKind::Authentication,
            Error::NoActiveTrack | Error::FeaturesUnavailable(_) | Error::NoCompatibleCandidates => {
                ErrorKind::NoData
            }
            Error::UnknownTenant(_) | Error::UnknownCatalog(_) => ErrorKind::BadRequest,
            Error::MissingCredentials(_)
            | Error::CatalogFetchFailed(_)
            | Error::InvalidCatalog(_)
            | Error::PlaylistCreateFailed(_)
            | Error::BatchAddFailed { .. }
            | Error::ProviderTimeout(_)
            | Error::Provider(_)
            | Error::Config(_) => ErrorKind::Upstream,
        }
    }

    /// Converts a provider failure into `specific`, unless it was a timeout.
    pub fn classify(err: ProviderError, specific: impl FnOnce(String) -> Error) -> Error {
        match err {
            ProviderError::Timeout(msg) => Error::ProviderTimeout(msg),
            other => specific(other.to_string()),
        }
    }
}

/// Failure of a single call to the Spotify Web API or accounts service.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("timed out: {0}")]
    Timeout(String),

    #[error("status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ProviderError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

impl From<ProviderError> for Error {
    fn from(err: ProviderError) -> Self {
        Error::classify(err, Error::Provider)
    }
}
