use thiserror::Error;

#[derive(Error, Debug)]
pub enum VocquizError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(Box<reqwest::Error>),

    #[error("CSV error: {0}")]
    Csv(Box<csv::Error>),

    /// Error message from the backend's JSON error body.
    #[error("{0}")]
    Api(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not logged in")]
    NotLoggedIn,
}

impl From<reqwest::Error> for VocquizError {
    fn from(error: reqwest::Error) -> Self {
        VocquizError::Http(Box::new(error))
    }
}

impl From<csv::Error> for VocquizError {
    fn from(error: csv::Error) -> Self {
        VocquizError::Csv(Box::new(error))
    }
}
