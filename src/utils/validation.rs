use std::path::Path;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Allow-list of file extensions, parsed from a pattern like `jpg,png,gif` or `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionFilter {
    Any,
    Only(Vec<String>),
}

impl ExtensionFilter {
    pub fn parse(pattern: &str) -> Self {
        let extensions: Vec<String> = pattern
            .split(',')
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        if extensions.is_empty() || extensions.iter().any(|ext| ext == "*") {
            ExtensionFilter::Any
        } else {
            ExtensionFilter::Only(extensions)
        }
    }

    pub fn allows(&self, filename: &str) -> bool {
        match self {
            ExtensionFilter::Any => true,
            ExtensionFilter::Only(allowed) => {
                let suffix = get_suffix(filename);
                let ext = suffix.trim_start_matches('.').to_lowercase();
                !ext.is_empty() && allowed.contains(&ext)
            }
        }
    }
}

/// Returns the extension of `filename` including the leading dot, or an empty
/// string when there is none.
pub fn get_suffix(filename: &str) -> String {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    match name.rfind('.') {
        Some(pos) => name[pos..].to_string(),
        None => String::new(),
    }
}

/// Validates file size against maximum limit
pub fn validate_file_size(size: u64, max_size: u64) -> Result<(), ValidationError> {
    if size > max_size {
        return Err(ValidationError {
            code: "FILE_TOO_LARGE",
            message: format!(
                "File size {} bytes exceeds maximum allowed {} bytes",
                size, max_size
            ),
        });
    }
    Ok(())
}

pub fn validate_extension(filename: &str, filter: &ExtensionFilter) -> Result<(), ValidationError> {
    if !filter.allows(filename) {
        return Err(ValidationError {
            code: "INVALID_EXTENSION",
            message: format!("File extension of '{}' is not allowed", filename),
        });
    }
    Ok(())
}
