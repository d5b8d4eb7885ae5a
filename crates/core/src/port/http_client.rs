// HTTP Client Port
// Black-box GET capability used by remote modules

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::domain::Params;

/// Raw response of a GET round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Transport-level failures (no HTTP status was obtained)
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// HTTP client trait
///
/// Implementations:
/// - ReqwestHttpClient (infra-http)
/// - mocks::MockHttpClient (tests)
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue `GET url?params`
    ///
    /// Non-2xx statuses are returned as a normal `HttpResponse`; callers decide
    /// what a failure status means.
    async fn get(&self, url: &str, params: &Params) -> Result<HttpResponse, TransportError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock HTTP behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always answer with this response
        Respond(HttpResponse),
        /// Answer 200 with `{"ping_end": ping_start + offset}`
        EchoPing { offset_nanos: i64 },
        /// Fail at the transport level
        Fail(String),
    }

    /// A recorded GET
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedCall {
        pub url: String,
        pub params: Params,
    }

    /// Mock HTTP client recording every call
    pub struct MockHttpClient {
        behavior: Arc<Mutex<MockBehavior>>,
        calls: Arc<Mutex<Vec<RecordedCall>>>,
    }

    impl MockHttpClient {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_ok() -> Self {
            Self::new(MockBehavior::Respond(HttpResponse::new(200, "{}")))
        }

        pub fn new_status(status: u16) -> Self {
            Self::new(MockBehavior::Respond(HttpResponse::new(status, "")))
        }

        pub fn new_echo_ping(offset_nanos: i64) -> Self {
            Self::new(MockBehavior::EchoPing { offset_nanos })
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn set_behavior(&self, behavior: MockBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn get(&self, url: &str, params: &Params) -> Result<HttpResponse, TransportError> {
            self.calls.lock().unwrap().push(RecordedCall {
                url: url.to_string(),
                params: params.clone(),
            });

            let behavior = self.behavior.lock().unwrap().clone();

            match behavior {
                MockBehavior::Respond(response) => Ok(response),
                MockBehavior::EchoPing { offset_nanos } => {
                    let ping_start: i64 = params
                        .get("ping_start")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or_default();
                    Ok(HttpResponse::new(
                        200,
                        serde_json::json!({ "ping_end": ping_start + offset_nanos }).to_string(),
                    ))
                }
                MockBehavior::Fail(msg) => Err(TransportError::Connect(msg)),
            }
        }
    }
}
