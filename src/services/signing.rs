use crate::error::UploadError;
use crate::models::SigningResponse;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

/// Authority on whether content is already stored, and issuer of upload policies.
#[async_trait]
pub trait SigningService: Send + Sync {
    /// Asks for a policy for content with the given MD5 digest and extension
    /// (extension includes the leading dot).
    async fn sign(&self, content_hash: &str, extension: &str) -> Result<SigningResponse, UploadError>;
}

/// Signing endpoint reached over HTTP: `GET <server_url>&md5=..&suffix=..`.
pub struct HttpSigningService {
    client: Client,
    endpoint: Url,
}

impl HttpSigningService {
    pub fn new(client: Client, server_url: &str) -> Result<Self, UploadError> {
        let endpoint = Url::parse(server_url).map_err(|e| {
            UploadError::Config(format!("Invalid signing endpoint '{}': {}", server_url, e))
        })?;
        Ok(Self { client, endpoint })
    }

    pub fn request_url(&self, content_hash: &str, extension: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("md5", content_hash)
            .append_pair("suffix", extension);
        url
    }
}

#[async_trait]
impl SigningService for HttpSigningService {
    async fn sign(&self, content_hash: &str, extension: &str) -> Result<SigningResponse, UploadError> {
        let url = self.request_url(content_hash, extension);
        tracing::debug!("Requesting upload policy from {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            tracing::warn!("Signing endpoint answered {}: {}", status, body);
            return Err(UploadError::Signing {
                status: status.as_u16(),
                body,
            });
        }

        SigningResponse::from_body(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_endpoint() {
        assert!(matches!(
            HttpSigningService::new(Client::new(), "not a url"),
            Err(UploadError::Config(_))
        ));
    }

    #[test]
    fn test_request_url_keeps_existing_query() {
        let service =
            HttpSigningService::new(Client::new(), "http://localhost:8080/admin/oss/policy?dir=avatar")
                .unwrap();
        let url = service.request_url("d41d8cd98f00b204e9800998ecf8427e", ".png");
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/admin/oss/policy?dir=avatar&md5=d41d8cd98f00b204e9800998ecf8427e&suffix=.png"
        );
    }
}
