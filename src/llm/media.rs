use std::fmt;

use base64::{engine::general_purpose, Engine as _};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid image data URI: {0}")]
pub struct InvalidDataUri(pub String);

pub fn detect_mime_type(data: &[u8]) -> Option<String> {
    if data.len() > 12 {
        let ftyp = &data[4..12];
        if ftyp.starts_with(b"ftyp") {
            let brand = &ftyp[4..8];
            if brand == b"heic" || brand == b"heif" || brand == b"hevc" {
                return Some("image/heic".to_string());
            }
        }
    }

    infer::get(data).map(|kind| kind.mime_type().to_string())
}

pub fn normalize_image_mime_type(mime_type: &str) -> String {
    let lowered = mime_type.trim().to_ascii_lowercase();
    match lowered.as_str() {
        "image/jpg" | "image/pjpeg" => "image/jpeg".to_string(),
        "image/x-png" => "image/png".to_string(),
        _ => lowered,
    }
}

pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match normalize_image_mime_type(mime_type).as_str() {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/heic" | "image/heif" => "heic",
        "image/gif" => "gif",
        _ => "png",
    }
}

/// Image bytes carried inline as a MIME type plus a base64 payload.
///
/// This is the in-memory form of a `data:<mime>;base64,<payload>` URI and is
/// used for both the uploaded portrait and the edited result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn parse_data_uri(value: &str) -> Result<Self, InvalidDataUri> {
        let rest = value
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| InvalidDataUri("missing 'data:' prefix".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| InvalidDataUri("missing ',' separator".to_string()))?;

        let mut params = header.split(';');
        let mime_type = params.next().unwrap_or_default().trim();
        if mime_type.is_empty() {
            return Err(InvalidDataUri("missing MIME type".to_string()));
        }
        if !params.any(|param| param.trim().eq_ignore_ascii_case("base64")) {
            return Err(InvalidDataUri("payload is not base64 encoded".to_string()));
        }
        if payload.trim().is_empty() {
            return Err(InvalidDataUri("empty payload".to_string()));
        }

        Ok(Self::new(mime_type, payload.trim()))
    }

    pub fn from_bytes(bytes: &[u8], fallback_mime: &str) -> Self {
        let mime_type = detect_mime_type(bytes).unwrap_or_else(|| fallback_mime.to_string());
        Self::new(mime_type, general_purpose::STANDARD.encode(bytes))
    }

    pub fn decode_bytes(&self) -> Result<Vec<u8>, InvalidDataUri> {
        general_purpose::STANDARD
            .decode(self.data.as_bytes())
            .map_err(|err| InvalidDataUri(format!("payload is not valid base64: {err}")))
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.to_ascii_lowercase().starts_with("image/")
    }

    pub fn to_data_uri(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for InlineImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.data)
    }
}
