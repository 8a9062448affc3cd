use thiserror::Error;

#[derive(Error, Debug)]
pub enum WikiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0} from prices wiki")]
    Status(u16),

    #[error("empty response body from prices wiki")]
    EmptyBody,

    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl WikiError {
    /// Connection-level failure, as opposed to a bad answer from the server.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}
