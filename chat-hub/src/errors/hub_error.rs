use thiserror::Error;

#[derive(Error, Debug)]
pub enum HubError {
    #[error("hub is no longer running")]
    Closed,
}
