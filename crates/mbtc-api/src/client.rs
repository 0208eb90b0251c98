//! HTTP client for the Mercado Bitcoin public data API.
//!
//! One client serves every resource variant: endpoint construction is
//! delegated to `ApiResource`, while the GET, status validation and JSON
//! parsing live here.

use crate::endpoint::{ApiResource, Endpoint};
use crate::error::{ApiError, ApiResult};
use crate::transport::{DynHttpTransport, HttpRequest};
use mbtc_core::Coin;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Public data API root.
pub const DEFAULT_BASE_URL: &str = "https://www.mercadobitcoin.net/api";

/// Client for fetching public market data.
#[derive(Clone)]
pub struct ApiClient {
    /// HTTP transport.
    transport: DynHttpTransport,
    /// API root URL, without trailing slash.
    base_url: String,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Arguments
    /// * `transport` - HTTP transport shared with other components
    /// * `base_url` - API root (e.g., "https://www.mercadobitcoin.net/api")
    pub fn new(transport: DynHttpTransport, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            base_url,
        }
    }

    /// Client pointed at the public Mercado Bitcoin API.
    pub fn mercado_bitcoin(transport: DynHttpTransport) -> Self {
        Self::new(transport, DEFAULT_BASE_URL)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the endpoint for `resource` without fetching it.
    pub fn endpoint<R: ApiResource>(&self, coin: &Coin, resource: &R) -> ApiResult<Endpoint> {
        resource.build_endpoint(&self.base_url, coin)
    }

    /// GET `endpoint` and parse the body as JSON.
    ///
    /// # Errors
    /// - `ApiError::Transport` if no response was received
    /// - `ApiError::Http` on any non-2xx status (not retried)
    /// - `ApiError::Parse` if the body is not valid JSON
    pub async fn fetch(&self, endpoint: &Endpoint) -> ApiResult<Value> {
        debug!(endpoint = %endpoint, "Fetching");

        let response = self
            .transport
            .execute(HttpRequest::get(endpoint.as_str()))
            .await?;

        if !response.is_success() {
            warn!(endpoint = %endpoint, status = response.status, "Non-success status");
            return Err(ApiError::Http {
                status: response.status,
                endpoint: endpoint.to_string(),
            });
        }

        serde_json::from_slice(&response.body).map_err(|source| ApiError::Parse {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    /// Build the endpoint for `resource` and fetch it.
    pub async fn get_data<R: ApiResource>(&self, coin: &Coin, resource: &R) -> ApiResult<Value> {
        let endpoint = self.endpoint(coin, resource)?;
        let data = self.fetch(&endpoint).await?;

        info!(
            coin = %coin,
            api = %R::KIND,
            records = record_count(&data),
            "Fetched data"
        );

        Ok(data)
    }
}

/// Array length, 1 for an object, 0 otherwise. Logging only.
fn record_count(data: &Value) -> usize {
    match data {
        Value::Array(items) => items.len(),
        Value::Object(_) => 1,
        _ => 0,
    }
}
