use repo_scan::ScanRequest;
use serde::Serialize;

/// JSON body posted to the scan endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanRequestBody<'a> {
    pub repository_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<&'a str>,
}

impl<'a> From<&'a ScanRequest> for ScanRequestBody<'a> {
    fn from(request: &'a ScanRequest) -> Self {
        Self {
            repository_url: request.repository_url(),
            access_token: request.access_token(),
        }
    }
}
