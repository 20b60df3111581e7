use crate::config::ClientConfig;
use crate::transport::error::TransportError;
use crate::transport::{Connector, HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use log::debug;
use reqwest::redirect::Policy;
use reqwest::Client;

/// Builds [`ReqwestTransport`] handles from the client configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestConnector;

impl Connector for ReqwestConnector {
    fn connect(&self, config: &ClientConfig) -> Result<Box<dyn Transport>, TransportError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(Policy::none())
            .danger_accept_invalid_certs(!config.verify_tls)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Connect(Box::new(e)))?;
        Ok(Box::new(ReqwestTransport { client }))
    }
}

pub struct ReqwestTransport {
    client: Client,
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!("GET {} {:?}", request.url, request.query);
        let mut builder = self
            .client
            .get(&request.url)
            .query(&request.query)
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_reqwest_error(request, e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        // A disconnect while streaming the body is a transport failure as well.
        let body = response
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(request, e))?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_reqwest_error(request: &HttpRequest, error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout {
            url: request.url.clone(),
            timeout: request.timeout,
        }
    } else {
        TransportError::Request {
            url: request.url.clone(),
            source: Box::new(error),
        }
    }
}
