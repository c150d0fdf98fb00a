use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("repository URL is required")]
    EmptyRepositoryUrl,
}

/// Input for one scan: the repository to clone and an optional access token.
#[derive(Clone, PartialEq, Eq)]
pub struct ScanRequest {
    repository_url: String,
    access_token: Option<String>,
}

impl ScanRequest {
    pub fn new(repository_url: impl Into<String>) -> Result<Self, RequestError> {
        let repository_url = repository_url.into().trim().to_owned();
        if repository_url.is_empty() {
            return Err(RequestError::EmptyRepositoryUrl);
        }
        Ok(Self {
            repository_url,
            access_token: None,
        })
    }

    /// Attach an access token. Blank tokens are treated as absent.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into().trim().to_owned();
        self.access_token = (!token.is_empty()).then_some(token);
        self
    }

    pub fn repository_url(&self) -> &str {
        &self.repository_url
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Loggable description of the scan target that never includes the token.
    pub fn display_target(&self) -> &str {
        if self.access_token.is_some() {
            "provided URL with token"
        } else {
            &self.repository_url
        }
    }
}

impl std::fmt::Debug for ScanRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanRequest")
            .field("repository_url", &self.repository_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{RequestError, ScanRequest};

    #[test]
    fn rejects_blank_url() {
        assert_eq!(ScanRequest::new("   "), Err(RequestError::EmptyRepositoryUrl));
    }

    #[test]
    fn blank_token_is_dropped() {
        let request = ScanRequest::new(" https://github.com/o/r ")
            .expect("valid url")
            .with_access_token("  ");
        assert_eq!(request.repository_url(), "https://github.com/o/r");
        assert_eq!(request.access_token(), None);
        assert_eq!(request.display_target(), "https://github.com/o/r");
    }

    #[test]
    fn token_never_reaches_debug_or_display() {
        let request = ScanRequest::new("https://github.com/o/r")
            .expect("valid url")
            .with_access_token("ghp_secret");
        assert_eq!(request.display_target(), "provided URL with token");
        assert!(!format!("{request:?}").contains("ghp_secret"));
    }
}
