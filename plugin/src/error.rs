use market::WikiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("price tracking is already running")]
    AlreadyRunning,

    #[error("failed to build prices wiki client: {0}")]
    Client(#[from] WikiError),
}
