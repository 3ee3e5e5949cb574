//! `data:<mime>;base64,<payload>` strings and their two fields.
//!
//! Decoding never fails: inputs that don't follow the grammar are split on
//! the first comma and get a best-effort MIME type.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::path::Path;

use super::error::PortraitError;

/// MIME type assumed when none can be extracted
pub const DEFAULT_MIME_TYPE: &str = "image/png";

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// The two structural fields of a data URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrlParts {
    pub mime_type: String,
    /// Base64 payload, still encoded
    pub data: String,
}

/// Split a data URL into MIME type and base64 payload
pub fn decode(data_url: &str) -> DataUrlParts {
    strict_parse(data_url).unwrap_or_else(|| lenient_parse(data_url))
}

/// Build a data URL from a MIME type and a base64 payload
pub fn encode(mime_type: &str, data: &str) -> String {
    format!("{}{}{}{}", SCHEME, mime_type, BASE64_MARKER, data)
}

/// Build a data URL from raw bytes
pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> String {
    encode(mime_type, &BASE64.encode(bytes))
}

/// Decode the payload of a data URL back into bytes
pub fn to_bytes(data_url: &str) -> Result<Vec<u8>, PortraitError> {
    let parts = decode(data_url);
    BASE64
        .decode(parts.data.trim())
        .map_err(|e| PortraitError::InvalidDataUrl(e.to_string()))
}

/// `data:([^;]+);base64,(.+)`
fn strict_parse(data_url: &str) -> Option<DataUrlParts> {
    let rest = data_url.strip_prefix(SCHEME)?;
    let semi = rest.find(';')?;
    let (mime_type, tail) = rest.split_at(semi);
    let data = tail.strip_prefix(BASE64_MARKER)?;

    if mime_type.is_empty() || data.is_empty() || data.contains('\n') {
        return None;
    }

    Some(DataUrlParts {
        mime_type: mime_type.to_string(),
        data: data.to_string(),
    })
}

fn lenient_parse(data_url: &str) -> DataUrlParts {
    let (head, data) = data_url.split_once(',').unwrap_or((data_url, ""));

    let mime_type = head
        .split_once(':')
        .and_then(|(_, after)| after.split_once(';'))
        .map(|(mime, _)| mime)
        .filter(|mime| !mime.is_empty())
        .unwrap_or(DEFAULT_MIME_TYPE);

    DataUrlParts {
        mime_type: mime_type.to_string(),
        data: data.to_string(),
    }
}

/// Guess an image MIME type from a file extension
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        _ => DEFAULT_MIME_TYPE,
    }
}

/// File extension for an image MIME type
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/heic" => "heic",
        "image/heif" => "heif",
        _ => "png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_well_formed_url() {
        let parts = decode("data:image/jpeg;base64,AAA");
        assert_eq!(parts.mime_type, "image/jpeg");
        assert_eq!(parts.data, "AAA");
    }

    #[test]
    fn well_formed_urls_survive_decode_encode() {
        for url in [
            "data:image/png;base64,iVBORw0KGgo=",
            "data:image/jpeg;base64,/9j/4AAQSkZJRg==",
            "data:application/octet-stream;base64,a,b,c",
        ] {
            let parts = decode(url);
            assert_eq!(encode(&parts.mime_type, &parts.data), url);
        }
    }

    #[test]
    fn missing_base64_marker_falls_back_to_comma_split() {
        let parts = decode("data:image/webp;charset=utf-8,hello,world");
        assert_eq!(parts.mime_type, "image/webp");
        assert_eq!(parts.data, "hello,world");
    }

    #[test]
    fn unparseable_mime_defaults_to_png() {
        let parts = decode("just,some-data");
        assert_eq!(parts.mime_type, DEFAULT_MIME_TYPE);
        assert_eq!(parts.data, "some-data");

        let parts = decode("data:;base64,AAA");
        assert_eq!(parts.mime_type, DEFAULT_MIME_TYPE);
        assert_eq!(parts.data, "AAA");
    }

    #[test]
    fn input_without_comma_yields_empty_payload() {
        let parts = decode("garbage");
        assert_eq!(parts.mime_type, DEFAULT_MIME_TYPE);
        assert_eq!(parts.data, "");

        let parts = decode("");
        assert_eq!(parts.data, "");
    }

    #[test]
    fn bytes_round_trip() {
        let url = from_bytes("image/png", &[0x89, b'P', b'N', b'G']);
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(to_bytes(&url).unwrap(), vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn corrupt_payload_fails_to_bytes() {
        assert!(matches!(
            to_bytes("data:image/png;base64,@@@"),
            Err(PortraitError::InvalidDataUrl(_))
        ));
    }

    #[test]
    fn mime_guessing_from_extension() {
        assert_eq!(mime_for_path(Path::new("me.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("me.webp")), "image/webp");
        assert_eq!(mime_for_path(Path::new("me")), DEFAULT_MIME_TYPE);
        assert_eq!(extension_for_mime("image/jpeg"), "jpg");
        assert_eq!(extension_for_mime("text/plain"), "png");
    }
}
