use thiserror::Error;

/// Failures of the analyze action. All of them end up as a single
/// user-visible string in the uploader state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error("Please select an image first")]
    Validation,

    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    #[error("{0}")]
    Request(String),

    /// Not surfaced to the user: the analyze action is disabled while loading.
    #[error("An analysis is already in progress")]
    Busy,
}

impl From<reqwest::Error> for AnalyzeError {
    fn from(err: reqwest::Error) -> Self {
        AnalyzeError::Request(err.to_string())
    }
}

/// Failures of the file picker. The uploader state is left untouched.
#[derive(Error, Debug)]
pub enum SelectError {
    #[error("{0} is not an image file")]
    NotAnImage(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
