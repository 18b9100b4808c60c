use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Base URL of the device could not be turned into an API endpoint.
    #[error("invalid device url: {0}")]
    InvalidUrl(String),
    /// Transport failure, including timeouts.
    #[error("request to device failed: {0}")]
    Network(String),
    #[error("unexpected http status: {0}")]
    HttpStatus(http::StatusCode),
    #[error("error parsing json message: {0}")]
    Decode(String),
    /// Device answered with a non-zero `Head.Status.Code`.
    #[error("fronius status code={code}: msg={message} reason={reason}")]
    Protocol {
        code: i64,
        reason: String,
        message: String,
    },
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Error {
        Error::Network(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Decode(e.to_string())
    }
}
