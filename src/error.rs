//! Unified error type.

/// The error type returned by tsu's fallible operations.
///
/// Application-level errors (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// misconfiguration, links that cannot be built, and socket failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An absolute mode or params policy string that does not parse.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The request origin or the target path cannot form a well-formed URL.
    #[error("cannot resolve `{target}` against `{base}`: {reason}")]
    UrlResolution {
        base: String,
        target: String,
        reason: String,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub(crate) fn resolution(
        base: impl Into<String>,
        target: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::UrlResolution {
            base: base.into(),
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}
