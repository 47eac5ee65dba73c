use crate::error::TransportError;
use crate::models::{TransferResponse, TransferTarget, UploadRequest};
use crate::services::notifier::{Notifier, percent};
use crate::utils::hash::CHUNK_SIZE;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use tokio::sync::mpsc;
use tokio_util::io::ReaderStream;

/// Performs the signed direct-to-storage transfer.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Sends `request` to `target`, reporting progress to `progress`.
    ///
    /// Any HTTP answer is returned as a [`TransferResponse`]; only failures to
    /// complete the exchange are errors.
    async fn upload(
        &self,
        target: &TransferTarget,
        request: &UploadRequest,
        progress: &dyn Notifier,
    ) -> Result<TransferResponse, TransportError>;
}

/// Multipart POST upload over reqwest, streaming the file in hash-sized chunks.
#[derive(Debug, Clone, Default)]
pub struct HttpUploadTransport {
    client: Client,
}

impl HttpUploadTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UploadTransport for HttpUploadTransport {
    async fn upload(
        &self,
        target: &TransferTarget,
        request: &UploadRequest,
        progress: &dyn Notifier,
    ) -> Result<TransferResponse, TransportError> {
        let name = request.file_name().to_string();
        let total = request.size_bytes();

        let file = tokio::fs::File::open(request.path())
            .await
            .map_err(|e| TransportError::http(&name, e.to_string()))?;
        let found = file
            .metadata()
            .await
            .map_err(|e| TransportError::http(&name, e.to_string()))?
            .len();
        if found != total {
            return Err(TransportError::http(
                &name,
                format!(
                    "file changed since it was hashed: expected {} bytes, found {}",
                    total, found
                ),
            ));
        }

        let (sent_tx, mut sent_rx) = mpsc::unbounded_channel::<u64>();
        let stream = ReaderStream::with_capacity(file, CHUNK_SIZE).map(move |chunk| {
            if let Ok(bytes) = &chunk {
                let _ = sent_tx.send(bytes.len() as u64);
            }
            chunk
        });

        let file_part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(name.clone())
            .mime_str(mime::APPLICATION_OCTET_STREAM.as_ref())
            .map_err(|e| TransportError::http(&name, e.to_string()))?;

        let form = target
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (field, value)| form.text(field, value))
            .part("file", file_part);

        tracing::info!("📤 Uploading {} ({} bytes) to {}", name, total, target.url);

        let send = self.client.post(&target.url).multipart(form).send();
        tokio::pin!(send);

        let mut sent = 0u64;
        let response = loop {
            tokio::select! {
                result = &mut send => break result,
                Some(n) = sent_rx.recv() => {
                    sent += n;
                    progress.update_progress(percent(sent, total));
                }
            }
        }
        .map_err(|e| TransportError::http(&name, e.to_string()))?;

        let mut drained = false;
        while let Ok(n) = sent_rx.try_recv() {
            sent += n;
            drained = true;
        }
        if drained {
            progress.update_progress(percent(sent, total));
        }

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::http(&name, e.to_string()))?;

        tracing::debug!("Storage answered {} for {}", status, name);

        Ok(TransferResponse { status, body })
    }
}
