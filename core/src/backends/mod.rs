//! Transport implementations.

#[cfg(feature = "reqwest-client")]
mod reqwest_transport;
#[cfg(feature = "reqwest-client")]
pub use reqwest_transport::ReqwestTransport;
