//! Coordinate transformation service abstraction
//!
//! The projection math between the geographic system and the session's
//! projected system is delegated to an external HTTP service. This module
//! provides the request/response types, the HTTP seam, and the
//! fire-and-forget client the sync controller talks to.
//!
//! ```ignore
//! use coordsync::transform::{AsyncReqwestClient, RemoteTransformService, SpawnedConversionClient};
//!
//! let http_client = AsyncReqwestClient::with_timeout(Duration::from_secs(10))?;
//! let service = RemoteTransformService::new("https://example.com/transform", http_client)?;
//! let client = SpawnedConversionClient::new(service);
//! ```

mod client;
mod http;
mod remote;
mod types;

pub use client::{ConversionCallback, ConversionClient, SpawnedConversionClient};
pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use remote::RemoteTransformService;
pub use types::{Direction, Point, TransformError, TransformRequest, TransformService};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
