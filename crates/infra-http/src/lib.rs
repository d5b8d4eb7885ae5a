// Overseer Infrastructure - HTTP Adapter
// Implements: HttpClient

pub mod reqwest_client;

pub use reqwest_client::{HttpClientConfig, ReqwestHttpClient};
