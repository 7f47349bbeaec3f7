//! HTTP layer: header handling, transport and proxy preflight

pub mod client;
pub mod headers;
pub mod preflight;
pub use client::{HttpTransport, RawResponse, Transport, TransportOptions};
pub use headers::HeaderMultimap;
