use thiserror::Error;

/// Numeric error codes reported by the file chooser and the upload transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorCode {
    /// Network or HTTP level failure while talking to storage (-200)
    Http,
    /// File exceeds the configured size limit (-600)
    FileSize,
    /// File extension is not in the allow-list (-601)
    FileExtension,
    /// Same file was already selected (-602)
    FileDuplicate,
    Other(i32),
}

impl TransportErrorCode {
    /// Maps a numeric code reported by a transport (e.g. a browser-side
    /// uploader relaying its own error event) onto the known codes.
    pub fn from_code(code: i32) -> Self {
        match code {
            -200 => Self::Http,
            -600 => Self::FileSize,
            -601 => Self::FileExtension,
            -602 => Self::FileDuplicate,
            other => Self::Other(other),
        }
    }

    /// Numeric form, as shown in logs and error text.
    pub fn code(self) -> i32 {
        match self {
            Self::Http => -200,
            Self::FileSize => -600,
            Self::FileExtension => -601,
            Self::FileDuplicate => -602,
            Self::Other(code) => code,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transport error {} for '{file_name}': {response}", .code.code())]
pub struct TransportError {
    pub code: TransportErrorCode,
    pub file_name: String,
    pub response: String,
}

impl TransportError {
    pub fn new(code: TransportErrorCode, file_name: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            code,
            file_name: file_name.into(),
            response: response.into(),
        }
    }

    pub fn http(file_name: impl Into<String>, response: impl Into<String>) -> Self {
        Self::new(TransportErrorCode::Http, file_name, response)
    }
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("An upload attempt is already in progress")]
    Busy,

    #[error("Signing request failed with status {status}: {body}")]
    Signing { status: u16, body: String },

    #[error("Malformed signing response: {raw}")]
    MalformedSignature {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Transfer failed with status {status}: {body}")]
    TransferFailed { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl UploadError {
    /// Text shown to the user in the blocking alert.
    ///
    /// `max_file_size` is the human-readable limit from the options, quoted
    /// back when the chooser rejects an oversized file.
    pub fn user_message(&self, max_file_size: &str) -> String {
        match self {
            UploadError::Signing { body, .. } => body.clone(),
            UploadError::MalformedSignature { raw, .. } => raw.clone(),
            UploadError::TransferFailed { body, .. } => body.clone(),
            UploadError::Transport(err) => match err.code {
                TransportErrorCode::FileSize => {
                    format!("File size exceeds the {} limit", max_file_size)
                }
                TransportErrorCode::FileExtension => {
                    format!("Invalid file type: {}", err.file_name)
                }
                TransportErrorCode::FileDuplicate => {
                    "This file has already been selected".to_string()
                }
                TransportErrorCode::Http | TransportErrorCode::Other(_) => {
                    format!("Error xml:{}", err.response)
                }
            },
            other => other.to_string(),
        }
    }
}
