//! Base64 transport decoding and media type sniffing.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Split an optional `data:<media>;base64,` prefix from base64 content.
pub fn split_data_url(content: &str) -> (Option<&str>, &str) {
    let trimmed = content.trim();
    if let Some(rest) = trimmed.strip_prefix("data:") {
        if let Some((header, body)) = rest.split_once(',') {
            let media_type = header.split(';').next().filter(|m| !m.is_empty());
            return (media_type, body);
        }
    }
    (None, trimmed)
}

/// Decode base64 transport content, ignoring a data-URL prefix and embedded
/// whitespace.
pub fn decode_base64(content: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let (_, body) = split_data_url(content);
    let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact)
}

/// Guess a media type from magic bytes.
pub fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"%PDF") {
        return Some("application/pdf");
    }
    image::guess_format(bytes).ok().map(|format| format.to_mime_type())
}
