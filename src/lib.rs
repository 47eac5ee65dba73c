pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::config::UploadOptions;
pub use crate::error::{TransportError, TransportErrorCode, UploadError};
pub use crate::models::{SigningResponse, TransferResponse, TransferTarget, UploadRequest, UploadResult};
pub use crate::services::notifier::{Notifier, TracingNotifier};
pub use crate::services::signing::{HttpSigningService, SigningService};
pub use crate::services::transport::{HttpUploadTransport, UploadTransport};
pub use crate::services::uploader::{UploadState, Uploader};
