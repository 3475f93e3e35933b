//! HTTP transport for the REST API client.

mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;
