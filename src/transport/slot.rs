use crate::config::ClientConfig;
use crate::transport::error::TransportError;
use crate::transport::{Connector, HttpRequest, HttpResponse, Transport};
use log::{debug, warn};

/// Holds at most one [`Transport`] handle.
///
/// The handle is acquired on the first request, dropped as soon as a request fails
/// (so the next attempt starts from a fresh one) and dropped for good by [`release`].
///
/// [`release`]: TransportSlot::release
pub struct TransportSlot {
    connector: Box<dyn Connector>,
    handle: Option<Box<dyn Transport>>,
}

impl TransportSlot {
    pub fn new(connector: Box<dyn Connector>) -> Self {
        Self {
            connector,
            handle: None,
        }
    }

    pub fn is_acquired(&self) -> bool {
        self.handle.is_some()
    }

    /// Performs a GET and requires a `200` answer.
    ///
    /// Any failure, including a non-200 status, invalidates the held handle.
    pub async fn get_ok(
        &mut self,
        config: &ClientConfig,
        request: &HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        let result = match self.acquire(config) {
            Ok(transport) => transport.get(request).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(response) if response.is_ok() => Ok(response),
            Ok(response) => {
                self.invalidate();
                Err(TransportError::HttpStatus {
                    url: request.url.clone(),
                    status: response.status,
                })
            }
            Err(e) => {
                self.invalidate();
                Err(e)
            }
        }
    }

    /// Drops the held handle. Calling it again is a no-op.
    pub fn release(&mut self) {
        if self.handle.take().is_some() {
            debug!("Released HTTP transport");
        }
    }

    fn acquire(&mut self, config: &ClientConfig) -> Result<&dyn Transport, TransportError> {
        let handle = match self.handle.take() {
            Some(handle) => handle,
            None => {
                debug!("Acquiring HTTP transport");
                self.connector.connect(config)?
            }
        };
        Ok(&**self.handle.insert(handle))
    }

    fn invalidate(&mut self) {
        if self.handle.take().is_some() {
            warn!("Discarding HTTP transport after a failed request");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeConnector, Route};

    #[tokio::test]
    async fn handle_is_acquired_lazily_and_reused() {
        let connector = FakeConnector::new().route(Route::metadata_ok());
        let stats = connector.stats();
        let mut slot = TransportSlot::new(Box::new(connector.clone()));
        let config = ClientConfig::default();
        assert!(!slot.is_acquired());
        assert_eq!(stats.acquired(), 0);

        let request = HttpRequest::get(config.metadata_url(), config.request_timeout);
        slot.get_ok(&config, &request).await.unwrap();
        slot.get_ok(&config, &request).await.unwrap();

        assert!(slot.is_acquired());
        assert_eq!(stats.acquired(), 1);
        assert_eq!(stats.requests().len(), 2);
    }

    #[tokio::test]
    async fn failed_request_invalidates_handle() {
        let connector = FakeConnector::new().route(Route::status("/metadata", 503));
        let stats = connector.stats();
        let mut slot = TransportSlot::new(Box::new(connector));
        let config = ClientConfig::default();
        let request = HttpRequest::get(config.metadata_url(), config.request_timeout);

        let err = slot.get_ok(&config, &request).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert!(!slot.is_acquired());
        assert_eq!(stats.released(), 1);

        let _ = slot.get_ok(&config, &request).await;
        assert_eq!(stats.acquired(), 2);
    }

    #[tokio::test]
    async fn release_happens_exactly_once() {
        let connector = FakeConnector::new().route(Route::metadata_ok());
        let stats = connector.stats();
        let mut slot = TransportSlot::new(Box::new(connector));
        let config = ClientConfig::default();
        let request = HttpRequest::get(config.metadata_url(), config.request_timeout);
        slot.get_ok(&config, &request).await.unwrap();

        slot.release();
        slot.release();
        assert_eq!(stats.released(), 1);
    }
}
