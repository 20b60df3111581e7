//! In-process stand-in for the HTTP service, used by the unit tests.

use crate::config::ClientConfig;
use crate::stations::catalog::Catalog;
use crate::transport::error::TransportError;
use crate::transport::{Connector, HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const METADATA_JSON: &str = include_str!("../tests/fixtures/metadata.json");
pub const DATA_STATION_JSON: &str = include_str!("../tests/fixtures/data_station.json");

const OBSERVATION_SUFFIX: &str = "/tawes-v1-10min";

pub fn sample_catalog() -> Catalog {
    Catalog::from_json(METADATA_JSON.as_bytes()).unwrap()
}

/// An observation payload for `station` with the given `(code, name, unit, value)` rows.
pub fn observation_json(
    station: &str,
    timestamp: &str,
    rows: &[(&str, &str, &str, Value)],
) -> String {
    let mut parameters = Map::new();
    for (code, name, unit, value) in rows {
        parameters.insert(
            code.to_string(),
            json!({ "name": name, "unit": unit, "data": [value] }),
        );
    }
    json!({
        "media_type": "application/json",
        "type": "FeatureCollection",
        "version": "v1",
        "timestamps": [timestamp],
        "features": [{
            "type": "Feature",
            "properties": { "parameters": parameters, "station": station }
        }]
    })
    .to_string()
}

/// Formats a timestamp the way the service does (minute precision).
pub fn service_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M+00:00").to_string()
}

#[derive(Debug, Clone)]
enum Reply {
    Body(u16, String),
    Fail,
    Timeout,
}

#[derive(Debug, Clone)]
pub struct Route {
    suffix: String,
    reply: Reply,
}

impl Route {
    pub fn json(suffix: &str, body: &str) -> Self {
        Self::with_status(suffix, 200, body)
    }

    pub fn status(suffix: &str, status: u16) -> Self {
        Self::with_status(suffix, status, "error")
    }

    pub fn fail(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
            reply: Reply::Fail,
        }
    }

    pub fn timeout(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
            reply: Reply::Timeout,
        }
    }

    pub fn metadata_ok() -> Self {
        Self::json("/metadata", METADATA_JSON)
    }

    pub fn observation(body: &str) -> Self {
        Self::json(OBSERVATION_SUFFIX, body)
    }

    pub fn observation_status(status: u16) -> Self {
        Self::status(OBSERVATION_SUFFIX, status)
    }

    pub fn observation_fail() -> Self {
        Self::fail(OBSERVATION_SUFFIX)
    }

    fn with_status(suffix: &str, status: u16, body: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
            reply: Reply::Body(status, body.to_string()),
        }
    }
}

#[derive(Debug, Default)]
pub struct Stats {
    acquired: AtomicUsize,
    released: AtomicUsize,
    requests: Mutex<Vec<HttpRequest>>,
}

impl Stats {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, suffix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.url.ends_with(suffix))
            .count()
    }

    pub fn observation_requests(&self) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.ends_with(OBSERVATION_SUFFIX))
            .collect()
    }
}

#[derive(Clone, Default)]
pub struct FakeConnector {
    routes: Arc<Mutex<Vec<Route>>>,
    stats: Arc<Stats>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, route: Route) -> Self {
        self.replace(route);
        self
    }

    /// Installs `route`, replacing any route with the same suffix.
    pub fn replace(&self, route: Route) {
        let mut routes = self.routes.lock().unwrap();
        routes.retain(|r| r.suffix != route.suffix);
        routes.push(route);
    }

    pub fn stats(&self) -> Arc<Stats> {
        Arc::clone(&self.stats)
    }
}

impl Connector for FakeConnector {
    fn connect(&self, _config: &ClientConfig) -> Result<Box<dyn Transport>, TransportError> {
        self.stats.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeTransport {
            routes: Arc::clone(&self.routes),
            stats: Arc::clone(&self.stats),
        }))
    }
}

struct FakeTransport {
    routes: Arc<Mutex<Vec<Route>>>,
    stats: Arc<Stats>,
}

impl Drop for FakeTransport {
    fn drop(&mut self) {
        self.stats.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.stats.requests.lock().unwrap().push(request.clone());
        let reply = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|r| request.url.ends_with(&r.suffix))
            .map(|r| r.reply.clone())
            .unwrap_or_else(|| Reply::Body(404, "not found".to_string()));

        match reply {
            Reply::Body(status, body) => Ok(HttpResponse {
                status,
                headers: vec![("content-type".to_string(), "application/json".to_string())],
                body: body.into_bytes(),
            }),
            Reply::Fail => Err(TransportError::Request {
                url: request.url.clone(),
                source: "connection refused".into(),
            }),
            Reply::Timeout => Err(TransportError::Timeout {
                url: request.url.clone(),
                timeout: request.timeout,
            }),
        }
    }
}
