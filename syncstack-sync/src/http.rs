//! reqwest-backed transport.
//!
//! GET and DELETE send parameters in the query string. POST and PUT send them
//! as a JSON or form-encoded body, per the request encoding. A non-2xx status
//! becomes [`ExchangeError::Status`] and a request that never got a response
//! becomes [`ExchangeError::Network`].

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::transport::Transport;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use syncstack_types::{
    value_to_string, Encoding, Exchange, ExchangeError, Method, PropertyMap, Request, Response,
};
use tracing::{debug, warn};

/// HTTP transport over a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a client from the configuration's user agent and timeout.
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        config.validate()?;
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder
            .build()
            .map_err(|e| SyncError::Http(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn string_pairs(params: &PropertyMap) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(k, v)| (k.clone(), value_to_string(v)))
        .collect()
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Exchange {
        let mut builder = self
            .client
            .request(to_reqwest(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(params) = &request.params {
            builder = if request.method.uses_query() {
                builder.query(&string_pairs(params))
            } else {
                match request.encoding {
                    Encoding::Json => builder.json(params),
                    Encoding::Url => builder.form(&string_pairs(params)),
                }
            };
        }

        debug!("{} {}", request.method, request.url);
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("{} {} failed: {e}", request.method, request.url);
                return Exchange::failure(request, None, ExchangeError::Network(e.to_string()));
            }
        };

        let head = Response {
            status: response.status().as_u16(),
            headers: response
                .headers()
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
                .collect(),
        };
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("reading body from {} failed: {e}", request.url);
                return Exchange::failure(request, Some(head), ExchangeError::Network(e.to_string()));
            }
        };

        if head.is_success() {
            return Exchange::success(request, head, Some(body));
        }
        warn!("{} {} returned {}", request.method, request.url, head.status);
        let status = head.status;
        let mut exchange = Exchange::failure(
            request,
            Some(head),
            ExchangeError::Status {
                status,
                body: Some(body.clone()),
            },
        );
        exchange.body = Some(body);
        exchange
    }
}
