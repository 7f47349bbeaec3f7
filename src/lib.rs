//! SessionProbe - authorization probing across many endpoints
//!
//! Sends one request per (URL, method) pair with a shared set of session
//! headers under a fixed concurrency limit, filters the responses by body
//! length and body regex, and writes the survivors grouped by status code.

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod probe;
pub mod report;
pub mod targets;
