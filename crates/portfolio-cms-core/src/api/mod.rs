//! HTTP layer for the portfolio API.
//!
//! - `RequestGateway`: base address, active bearer credential, single-attempt
//!   request execution with typed error decoding
//! - `Transport`: the network seam (`ReqwestTransport` in production)
//! - `ApiClient`: typed wrappers for the feature endpoints
//!
//! The session store is the only writer of the gateway's credential.

pub mod client;
pub mod credential;
pub mod error;
pub mod gateway;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use client::ApiClient;
pub use credential::Credential;
pub use error::ApiError;
pub use gateway::{RequestGateway, DEFAULT_REQUEST_TIMEOUT};
pub use transport::{FormField, Method, OutgoingRequest, ReqwestTransport, RequestBody, Transport, TransportResponse};
