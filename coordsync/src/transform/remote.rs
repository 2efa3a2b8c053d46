//! Remote transformation service.
//!
//! # Wire Format
//!
//! `GET {base_url}?x={x}&y={y}&target_srs={srs}` for a forward transformation,
//! `GET {base_url}?x={x}&y={y}&source_srs={srs}` for an inverse one. The
//! other side of the transformation is always EPSG:4326.
//!
//! A successful response is a JSON object `{"x": <number>, "y": <number>}`.
//! Any other body is a decode error.

use reqwest::Url;

use super::http::AsyncHttpClient;
use super::types::{Point, TransformError, TransformRequest, TransformService};

/// Transformation service reached over HTTP.
///
/// # Example
///
/// ```ignore
/// use coordsync::transform::{AsyncReqwestClient, RemoteTransformService};
///
/// let client = AsyncReqwestClient::new()?;
/// let service = RemoteTransformService::new("https://example.com/transform", client)?;
/// let point = service.transform(&request).await?;
/// ```
pub struct RemoteTransformService<C: AsyncHttpClient> {
    base_url: Url,
    http_client: C,
}

impl<C: AsyncHttpClient> RemoteTransformService<C> {
    /// Creates a service rooted at `base_url`.
    ///
    /// Only `http` and `https` URLs are accepted. Query parameters already on
    /// the base URL are kept and the transformation parameters appended.
    pub fn new(base_url: &str, http_client: C) -> Result<Self, TransformError> {
        let invalid = |reason: String| TransformError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };

        let url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
        }

        Ok(Self {
            base_url: url,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Builds the request URL for a transformation.
    pub fn build_url(&self, request: &TransformRequest) -> String {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in request.query_pairs() {
                query.append_pair(key, &value);
            }
        }
        url.into()
    }
}

impl<C: AsyncHttpClient> TransformService for RemoteTransformService<C> {
    async fn transform(&self, request: &TransformRequest) -> Result<Point, TransformError> {
        let url = self.build_url(request);
        let body = self.http_client.get(&url).await?;

        serde_json::from_slice::<Point>(&body).map_err(|e| TransformError::Decode(e.to_string()))
    }
}
