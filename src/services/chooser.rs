use crate::error::{TransportError, TransportErrorCode, UploadError};
use crate::utils::validation::{ExtensionFilter, validate_extension, validate_file_size};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A file accepted by the chooser's filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

/// Single-selection file picker with extension, size and duplicate filters.
///
/// Filters run in that order, and a rejection carries the matching transport
/// error code.
#[derive(Debug)]
pub struct FileChooser {
    filter: ExtensionFilter,
    max_file_size: u64,
    prevent_duplicates: bool,
    seen: Mutex<HashSet<(String, u64)>>,
}

impl FileChooser {
    pub fn new(filter: ExtensionFilter, max_file_size: u64, prevent_duplicates: bool) -> Self {
        Self {
            filter,
            max_file_size,
            prevent_duplicates,
            seen: Mutex::new(HashSet::new()),
        }
    }

    pub async fn select(&self, path: &Path) -> Result<SelectedFile, UploadError> {
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(UploadError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            )));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let size = metadata.len();

        validate_extension(&name, &self.filter).map_err(|e| {
            TransportError::new(TransportErrorCode::FileExtension, &name, e.message)
        })?;

        validate_file_size(size, self.max_file_size)
            .map_err(|e| TransportError::new(TransportErrorCode::FileSize, &name, e.message))?;

        if self.prevent_duplicates {
            let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
            if !seen.insert((name.clone(), size)) {
                return Err(TransportError::new(
                    TransportErrorCode::FileDuplicate,
                    &name,
                    "file already selected",
                )
                .into());
            }
        }

        tracing::debug!("Selected {} ({} bytes)", name, size);

        Ok(SelectedFile {
            path: path.to_path_buf(),
            name,
            size,
        })
    }
}
