//! The HTTP capability the client consumes.
//!
//! The client only ever needs a timed GET that hands back a status code, the response
//! headers and the raw body. [`Connector`] produces such a [`Transport`] on demand;
//! [`slot::TransportSlot`] decides when a handle is acquired and when it is thrown away.

pub mod error;
pub mod reqwest_connector;
pub mod slot;

use crate::config::ClientConfig;
use async_trait::async_trait;
use error::TransportError;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: vec![("Accept".to_string(), "application/json".to_string())],
            timeout,
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// A live handle able to perform GET requests.
///
/// Dropping the handle releases whatever it holds (connection pool, TLS sessions).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Creates fresh [`Transport`] handles.
pub trait Connector: Send + Sync {
    fn connect(&self, config: &ClientConfig) -> Result<Box<dyn Transport>, TransportError>;
}
