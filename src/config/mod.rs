use crate::error::UploadError;
use crate::models::UploadResult;
use crate::utils::size::parse_size;
use std::env;
use std::fmt;
use std::sync::Arc;

/// Completion handler invoked with the result of a successful attempt.
pub type SuccessHandler = Arc<dyn Fn(&UploadResult) + Send + Sync>;

/// Options accepted when an uploader is created
#[derive(Clone)]
pub struct UploadOptions {
    /// Allowed extensions, comma separated without dots, or `*` (default: "*")
    pub suffixs: String,

    /// Identifier of the control that triggered the upload (default: "browse_button")
    pub button_id: String,

    /// Maximum file size, human readable (default: "100MB")
    pub max_file_size: String,

    /// Base URL of the signing endpoint (default: empty)
    pub server_url: String,

    /// Reject a file whose name and size match an earlier selection (default: false)
    pub prevent_duplicates: bool,

    /// Called once with the result of every successful attempt
    pub success: Option<SuccessHandler>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            suffixs: "*".to_string(),
            button_id: "browse_button".to_string(),
            max_file_size: "100MB".to_string(),
            server_url: String::new(),
            prevent_duplicates: false,
            success: None,
        }
    }
}

impl fmt::Debug for UploadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadOptions")
            .field("suffixs", &self.suffixs)
            .field("button_id", &self.button_id)
            .field("max_file_size", &self.max_file_size)
            .field("server_url", &self.server_url)
            .field("prevent_duplicates", &self.prevent_duplicates)
            .field("success", &self.success.as_ref().map(|_| "<handler>"))
            .finish()
    }
}

impl UploadOptions {
    /// Load options from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            suffixs: env::var("UPLOAD_SUFFIXS").unwrap_or(default.suffixs),

            button_id: env::var("UPLOAD_BUTTON_ID").unwrap_or(default.button_id),

            max_file_size: env::var("UPLOAD_MAX_FILE_SIZE").unwrap_or(default.max_file_size),

            server_url: env::var("UPLOAD_SERVER_URL").unwrap_or(default.server_url),

            prevent_duplicates: env::var("UPLOAD_PREVENT_DUPLICATES")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(default.prevent_duplicates),

            success: None,
        }
    }

    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }

    pub fn with_suffixs(mut self, suffixs: impl Into<String>) -> Self {
        self.suffixs = suffixs.into();
        self
    }

    pub fn with_max_file_size(mut self, max_file_size: impl Into<String>) -> Self {
        self.max_file_size = max_file_size.into();
        self
    }

    pub fn on_success<F>(mut self, handler: F) -> Self
    where
        F: Fn(&UploadResult) + Send + Sync + 'static,
    {
        self.success = Some(Arc::new(handler));
        self
    }

    pub fn max_file_size_bytes(&self) -> Result<u64, UploadError> {
        parse_size(&self.max_file_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = UploadOptions::default();
        assert_eq!(options.suffixs, "*");
        assert_eq!(options.button_id, "browse_button");
        assert_eq!(options.max_file_size, "100MB");
        assert!(options.server_url.is_empty());
        assert!(!options.prevent_duplicates);
        assert_eq!(options.max_file_size_bytes().unwrap(), 100 * 1024 * 1024);
    }

    #[test]
    fn test_builder_setters() {
        let options = UploadOptions::default()
            .with_server_url("http://localhost:8080/sign")
            .with_suffixs("jpg,png")
            .with_max_file_size("2MB")
            .on_success(|_| {});
        assert_eq!(options.server_url, "http://localhost:8080/sign");
        assert_eq!(options.suffixs, "jpg,png");
        assert_eq!(options.max_file_size_bytes().unwrap(), 2 * 1024 * 1024);
        assert!(options.success.is_some());
        assert!(format!("{:?}", options).contains("<handler>"));
    }

    #[test]
    fn test_invalid_max_size() {
        let options = UploadOptions::default().with_max_file_size("lots");
        assert!(matches!(
            options.max_file_size_bytes(),
            Err(UploadError::Config(_))
        ));
    }
}
