use crate::config::UploadOptions;
use crate::error::UploadError;
use crate::models::{UploadRequest, UploadResult};
use crate::services::chooser::{FileChooser, SelectedFile};
use crate::services::notifier::{Notifier, ProgressGuard, TracingNotifier};
use crate::services::signing::{HttpSigningService, SigningService};
use crate::services::transport::{HttpUploadTransport, UploadTransport};
use crate::utils::hash::hash_reader;
use crate::utils::validation::ExtensionFilter;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::AsyncRead;
use tracing::{Instrument, error, info, info_span, warn};

/// Progress of the current (or last) attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Selecting,
    Hashing,
    Signing,
    /// Content already stored, transfer skipped.
    Skipping,
    Transferring,
    Done,
    Failed,
}

/// Runs the select → hash → sign → (skip | transfer) sequence, one attempt at a time.
pub struct Uploader {
    options: UploadOptions,
    chooser: FileChooser,
    signer: Arc<dyn SigningService>,
    transport: Arc<dyn UploadTransport>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<UploadState>,
    busy: AtomicBool,
}

/// Held for the duration of an attempt.
///
/// Dropping it writes the terminal state and clears the busy flag, so an
/// attempt whose future is dropped mid-way still ends as `Failed`.
struct InFlight<'a> {
    uploader: &'a Uploader,
    outcome: UploadState,
}

impl<'a> InFlight<'a> {
    fn acquire(uploader: &'a Uploader) -> Option<Self> {
        uploader
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        uploader.set_state(UploadState::Idle);
        Some(Self {
            uploader,
            outcome: UploadState::Failed,
        })
    }

    fn succeeded(&mut self) {
        self.outcome = UploadState::Done;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.uploader.set_state(self.outcome);
        self.uploader.busy.store(false, Ordering::Release);
    }
}

impl Uploader {
    pub fn new(
        options: UploadOptions,
        signer: Arc<dyn SigningService>,
        transport: Arc<dyn UploadTransport>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, UploadError> {
        let chooser = FileChooser::new(
            ExtensionFilter::parse(&options.suffixs),
            options.max_file_size_bytes()?,
            options.prevent_duplicates,
        );

        Ok(Self {
            options,
            chooser,
            signer,
            transport,
            notifier,
            state: Mutex::new(UploadState::Idle),
            busy: AtomicBool::new(false),
        })
    }

    /// Builds an uploader that signs and uploads over HTTP and reports through the log.
    pub fn from_options(options: UploadOptions) -> Result<Self, UploadError> {
        let client = reqwest::Client::new();
        let signer = Arc::new(HttpSigningService::new(client.clone(), &options.server_url)?);
        let transport = Arc::new(HttpUploadTransport::new(client));
        Self::new(options, signer, transport, Arc::new(TracingNotifier))
    }

    pub fn options(&self) -> &UploadOptions {
        &self.options
    }

    pub fn state(&self) -> UploadState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: UploadState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    /// Uploads the file at `path`, or reuses the stored copy when the signing
    /// service already has its content.
    ///
    /// Every failure is shown through the notifier and ends the attempt; call
    /// again to retry. Returns [`UploadError::Busy`] without side effects if
    /// another attempt is still running.
    pub async fn start_upload(&self, path: impl AsRef<Path>) -> Result<UploadResult, UploadError> {
        let path = path.as_ref();
        let mut flight = InFlight::acquire(self).ok_or(UploadError::Busy)?;

        let span = info_span!(
            "upload",
            button_id = %self.options.button_id,
            file = %path.display()
        );

        let outcome = self.run(self.attempt(path)).instrument(span).await;
        if outcome.is_ok() {
            flight.succeeded();
        }
        outcome
    }

    /// Drives one attempt under a progress indicator and surfaces its outcome.
    async fn run(
        &self,
        attempt: impl Future<Output = Result<UploadResult, UploadError>>,
    ) -> Result<UploadResult, UploadError> {
        let mut progress = ProgressGuard::show(self.notifier.as_ref(), "Checking file...");

        match attempt.await {
            Ok(result) => {
                info!("✅ Stored as {}", result.full_url);
                if let Some(handler) = &self.options.success {
                    handler(&result);
                }
                progress.dismiss();
                Ok(result)
            }
            Err(err) => {
                progress.dismiss();
                let message = err.user_message(&self.options.max_file_size);
                error!("Upload failed: {}", err);
                self.notifier.alert(&message);
                Err(err)
            }
        }
    }

    async fn attempt(&self, path: &Path) -> Result<UploadResult, UploadError> {
        self.set_state(UploadState::Selecting);
        let selected = self.chooser.select(path).await?;
        let file = tokio::fs::File::open(&selected.path).await?;
        self.upload_selected(selected, file).await
    }

    /// Hashes `content` (expected to hold `selected.size` bytes), then signs and
    /// transfers or reuses the stored copy.
    async fn upload_selected<R: AsyncRead + Unpin>(
        &self,
        selected: SelectedFile,
        content: R,
    ) -> Result<UploadResult, UploadError> {
        self.set_state(UploadState::Hashing);
        let digest = hash_reader(content, selected.size).await.map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("{} changed while hashing: {}", selected.path.display(), e),
            )
        })?;
        let request = UploadRequest::new(selected.path, selected.name, digest);
        info!(
            "🔑 {} hashed to {} ({} bytes)",
            request.file_name(),
            request.content_hash(),
            request.size_bytes()
        );

        self.set_state(UploadState::Signing);
        let signing = self
            .signer
            .sign(request.content_hash(), request.extension())
            .await?;

        if signing.exists {
            self.set_state(UploadState::Skipping);
            info!("⚡ Content already stored as {}, skipping transfer", signing.stored_object_key);
            return Ok(UploadResult::new(
                signing.stored_object_key,
                signing.upload_endpoint,
                request.content_hash().to_string(),
            ));
        }

        if signing.is_expired(chrono::Utc::now().timestamp()) {
            warn!("Upload policy expired at {}, storage may reject it", signing.expires_at);
        }

        self.set_state(UploadState::Transferring);
        let target = signing.into_transfer_target();
        let response = self
            .transport
            .upload(&target, &request, self.notifier.as_ref())
            .await?;

        if response.status != target.success_action_status {
            return Err(UploadError::TransferFailed {
                status: response.status,
                body: response.body,
            });
        }

        Ok(UploadResult::new(
            target.key,
            target.url,
            request.content_hash().to_string(),
        ))
    }
}
