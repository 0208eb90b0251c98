//! Mercado Bitcoin public REST API client.
//!
//! Builds time-range-aware endpoint URLs per resource and performs
//! validated GET requests:
//! - `ApiResource`: One endpoint-construction hook per resource variant
//! - `ApiClient`: Shared fetch/validate/parse machinery
//! - `HttpTransport`: Injected HTTP seam (reqwest in production, mock in tests)

pub mod client;
pub mod endpoint;
pub mod error;
pub mod transport;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use endpoint::{ApiResource, DaySummaryApi, Endpoint, TradesApi};
pub use error::{ApiError, ApiResult};
pub use transport::{
    BoxFuture, DynHttpTransport, HttpMethod, HttpRequest, HttpResponse, HttpTransport,
    MockTransport, ReqwestTransport, TransportError,
};
