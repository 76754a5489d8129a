use std::fmt;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::errors::AttachmentError;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Advisory ceiling for uploaded resumes. Larger files are sent anyway.
pub const ADVISORY_SIZE_LIMIT_BYTES: usize = 5 * 1024 * 1024;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// The user's resume, kept as raw bytes and base64-encoded only when a request is built.
#[derive(Clone, PartialEq, Eq)]
pub struct ResumeAttachment {
    bytes: Bytes,
    media_type: String,
}

impl ResumeAttachment {
    pub fn pdf(bytes: impl Into<Bytes>) -> Self {
        let attachment = Self {
            bytes: bytes.into(),
            media_type: PDF_MEDIA_TYPE.to_string(),
        };
        attachment.warn_if_oversized();
        attachment
    }

    pub fn new(bytes: impl Into<Bytes>, media_type: &str) -> Result<Self, AttachmentError> {
        if !media_type.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE) {
            return Err(AttachmentError::UnsupportedMediaType(media_type.to_string()));
        }
        Ok(Self::pdf(bytes))
    }

    /// Accepts `data:application/pdf;base64,<payload>` or a bare base64 payload.
    pub fn from_data_url(data_url: &str) -> Result<Self, AttachmentError> {
        let data_url = data_url.trim();
        let payload = match data_url.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest.split_once(',').ok_or_else(|| {
                    AttachmentError::InvalidDataUrl("missing ',' separator".to_string())
                })?;
                let mut params = header.split(';');
                let media_type = params.next().unwrap_or_default();
                if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
                    return Err(AttachmentError::InvalidDataUrl(
                        "only base64 data URLs are supported".to_string(),
                    ));
                }
                if !media_type.eq_ignore_ascii_case(PDF_MEDIA_TYPE) {
                    return Err(AttachmentError::UnsupportedMediaType(media_type.to_string()));
                }
                payload
            }
            None => data_url,
        };

        let bytes = STANDARD.decode(payload)?;
        Ok(Self::pdf(bytes))
    }

    /// Reads a PDF from disk. The file is accepted by `.pdf` extension or PDF magic bytes.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AttachmentError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;

        let has_pdf_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if !has_pdf_extension && !bytes.starts_with(PDF_MAGIC) {
            let described = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| format!(".{ext} file"))
                .unwrap_or_else(|| "file without extension".to_string());
            return Err(AttachmentError::UnsupportedMediaType(described));
        }

        Ok(Self::pdf(bytes))
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Base64 (standard alphabet) form sent inline to the model.
    pub fn encoded(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn exceeds_advisory_limit(&self) -> bool {
        self.bytes.len() > ADVISORY_SIZE_LIMIT_BYTES
    }

    fn warn_if_oversized(&self) {
        if self.exceeds_advisory_limit() {
            warn!(
                "Resume attachment is {} bytes, above the advisory {} byte limit",
                self.bytes.len(),
                ADVISORY_SIZE_LIMIT_BYTES
            );
        }
    }
}

impl fmt::Debug for ResumeAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResumeAttachment")
            .field("media_type", &self.media_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

// Snapshots carry metadata only; the blob never leaves the process except inside a request.
impl Serialize for ResumeAttachment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ResumeAttachment", 2)?;
        s.serialize_field("media_type", &self.media_type)?;
        s.serialize_field("size_bytes", &self.bytes.len())?;
        s.end()
    }
}

/// Editable form fields of the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Age,
    Company,
    Industry,
    Position,
    Years,
}

/// What the user tells us about themselves before the persona is synthesized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub age: String,
    pub company: String,
    pub industry: String,
    pub position: String,
    pub years: String,
    pub resume: Option<ResumeAttachment>,
}

impl UserProfile {
    pub fn field(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Age => &self.age,
            ProfileField::Company => &self.company,
            ProfileField::Industry => &self.industry,
            ProfileField::Position => &self.position,
            ProfileField::Years => &self.years,
        }
    }

    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ProfileField::Age => self.age = value,
            ProfileField::Company => self.company = value,
            ProfileField::Industry => self.industry = value,
            ProfileField::Position => self.position = value,
            ProfileField::Years => self.years = value,
        }
    }

    /// All text fields filled in. The resume is optional here.
    pub fn is_ready(&self) -> bool {
        [
            ProfileField::Age,
            ProfileField::Company,
            ProfileField::Industry,
            ProfileField::Position,
            ProfileField::Years,
        ]
        .iter()
        .all(|&f| !self.field(f).trim().is_empty())
    }
}
