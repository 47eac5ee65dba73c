use crate::error::UploadError;
use crate::utils::hash::FileDigest;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// Storage is asked to answer a successful POST with this status instead of
/// its default `204 No Content`, so completion can be confirmed.
pub const SUCCESS_ACTION_STATUS: u16 = 200;

/// A selected local file whose content digest is known.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    path: PathBuf,
    file_name: String,
    size_bytes: u64,
    extension: String,
    content_hash: String,
}

impl UploadRequest {
    pub fn new(path: PathBuf, file_name: String, digest: FileDigest) -> Self {
        let extension = crate::utils::validation::get_suffix(&file_name);
        Self {
            path,
            file_name,
            size_bytes: digest.size,
            extension,
            content_hash: digest.hex,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Extension including the leading dot, empty when the name has none.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }
}

/// Credential bundle returned by the signing endpoint for one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningResponse {
    pub exists: bool,
    pub stored_object_key: String,
    pub upload_endpoint: String,
    pub policy_token: String,
    pub access_id: String,
    pub signature: String,
    pub callback_spec: String,
    pub expires_at: i64,
    pub dir: String,
}

#[derive(Debug, Deserialize)]
struct SignatureEnvelope {
    data: SignaturePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignaturePayload {
    #[serde(alias = "fileExist", deserialize_with = "lenient_bool")]
    exists: bool,
    #[serde(default)]
    file_name: String,
    #[serde(default)]
    host: String,
    #[serde(default)]
    policy: String,
    #[serde(default)]
    accessid: String,
    #[serde(default)]
    signature: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    expire: i64,
    #[serde(default)]
    callback: String,
    #[serde(default)]
    dir: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Loose::deserialize(deserializer)? {
        Loose::Bool(b) => Ok(b),
        Loose::Int(i) => Ok(i != 0),
        Loose::Text(s) => match s.trim().to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected \"true\" or \"false\", got \"{}\"",
                other
            ))),
        },
    }
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Loose::deserialize(deserializer)? {
        Loose::Int(i) => Ok(i),
        Loose::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid expire value \"{}\"", s))),
        Loose::Bool(_) => Err(serde::de::Error::custom("invalid expire value")),
    }
}

impl SigningResponse {
    /// Parses the signing endpoint body (`{ "data": { ... } }`). On failure the
    /// raw text is kept so it can be shown to the user as-is.
    pub fn from_body(body: &str) -> Result<Self, UploadError> {
        let envelope: SignatureEnvelope =
            serde_json::from_str(body).map_err(|source| UploadError::MalformedSignature {
                raw: body.to_string(),
                source,
            })?;
        let data = envelope.data;

        Ok(Self {
            exists: data.exists,
            stored_object_key: data.file_name,
            upload_endpoint: data.host,
            policy_token: data.policy,
            access_id: data.accessid,
            signature: data.signature,
            callback_spec: data.callback,
            expires_at: data.expire,
            dir: data.dir,
        })
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at > 0 && self.expires_at <= now
    }

    /// Consumes the response into the transfer configuration it authorizes.
    pub fn into_transfer_target(self) -> TransferTarget {
        TransferTarget {
            url: self.upload_endpoint,
            key: self.stored_object_key,
            policy: self.policy_token,
            access_id: self.access_id,
            signature: self.signature,
            callback: self.callback_spec,
            success_action_status: SUCCESS_ACTION_STATUS,
        }
    }
}

/// Everything the transport needs for one signed POST upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferTarget {
    pub url: String,
    pub key: String,
    pub policy: String,
    pub access_id: String,
    pub signature: String,
    pub callback: String,
    pub success_action_status: u16,
}

impl TransferTarget {
    /// Multipart text fields in the order storage expects them, before the file part.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("key", self.key.clone()),
            ("policy", self.policy.clone()),
            ("OSSAccessKeyId", self.access_id.clone()),
            ("success_action_status", self.success_action_status.to_string()),
            ("callback", self.callback.clone()),
            ("signature", self.signature.clone()),
        ]
    }
}

/// Terminal report of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferResponse {
    pub status: u16,
    pub body: String,
}

/// Locator of the stored object, handed to the caller on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub object_key: String,
    pub host_url: String,
    pub full_url: String,
    pub content_hash: String,
}

impl UploadResult {
    pub fn new(object_key: String, host_url: String, content_hash: String) -> Self {
        let full_url = format!("{}/{}", host_url, object_key);
        Self {
            object_key,
            host_url,
            full_url,
            content_hash,
        }
    }
}
