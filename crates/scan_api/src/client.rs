use futures_util::future::BoxFuture;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use tracing::{debug, warn};

use repo_scan::{ChunkStream, ScanRequest, ScanTransport, TransportError};

use crate::config::ScanApiConfig;
use crate::error::{parse_error_message, ScanApiError};
use crate::headers::build_headers;
use crate::payload::ScanRequestBody;
use crate::url::normalize_scan_url;

#[derive(Debug)]
pub struct ScanApiClient {
    http: Client,
    config: ScanApiConfig,
}

impl ScanApiClient {
    pub fn new(config: ScanApiConfig) -> Result<Self, ScanApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self { http, config })
    }

    pub fn endpoint(&self) -> String {
        normalize_scan_url(&self.config.base_url)
    }

    pub fn build_headers(&self) -> Result<HeaderMap, ScanApiError> {
        let mut out = HeaderMap::new();
        for (key, value) in build_headers(&self.config) {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                ScanApiError::InvalidHeader {
                    name: key.clone(),
                    reason: "invalid header name",
                }
            })?;
            let value = HeaderValue::from_str(&value).map_err(|_| ScanApiError::InvalidHeader {
                name: key.clone(),
                reason: "invalid header value",
            })?;
            out.insert(name, value);
        }
        Ok(out)
    }

    pub fn build_request(
        &self,
        request: &ScanRequest,
    ) -> Result<reqwest::RequestBuilder, ScanApiError> {
        let headers = self.build_headers()?;
        Ok(self
            .http
            .post(self.endpoint())
            .headers(headers)
            .json(&ScanRequestBody::from(request)))
    }

    /// Send the scan request and return the response once its status is known
    /// to be a success.
    pub async fn send(&self, request: &ScanRequest) -> Result<Response, ScanApiError> {
        debug!(
            endpoint = %self.endpoint(),
            target_repo = request.display_target(),
            "sending scan request"
        );
        let response = self.build_request(request)?.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = parse_error_message(status, &body);
        warn!(status = status.as_u16(), %message, "scan request rejected");
        Err(ScanApiError::Status { status, message })
    }

    /// Open the scan and expose the body as raw chunks.
    pub async fn open_stream(&self, request: &ScanRequest) -> Result<ChunkStream, ScanApiError> {
        let response = self.send(request).await?;
        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|error| TransportError::Read(error.to_string())));
        Ok(Box::pin(chunks))
    }
}

impl ScanTransport for ScanApiClient {
    fn open<'a>(
        &'a self,
        request: &'a ScanRequest,
    ) -> BoxFuture<'a, Result<ChunkStream, TransportError>> {
        Box::pin(async move { self.open_stream(request).await.map_err(TransportError::from) })
    }
}
