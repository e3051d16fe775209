//! Client layer: HTTP round-trips to the remote classification endpoints.

pub mod http;

pub use http::{ClassifyClient, ClassifyError, ClassifyRequest, ClassifyResponse};
