use crate::errors::hub_error::HubError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("client disconnected: {0}")]
    Disconnected(String),
    #[error(transparent)]
    Hub(#[from] HubError),
}
