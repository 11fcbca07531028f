use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("could not read from client: {0}")]
    Read(String),
    #[error("could not write to client: {0}")]
    Write(String),
}
