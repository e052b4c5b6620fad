//! Adapters to the outside world: MIME encoding, HTTP and the Postal API

pub mod http;
pub mod mime;
pub mod postal;
