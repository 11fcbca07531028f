pub mod hub_error;
pub mod session_error;
pub mod transport_error;
