//! Base64 image decoding.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;

use crate::error::AppError;

/// Raw image bytes with the file extension they will be stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
}

/// Decodes `data:image/<ext>;base64,<payload>` or a bare base64 payload.
///
/// The extension is the declared subtype when it is `jpeg`, `jpg` or `png`;
/// otherwise it is sniffed from the leading bytes, falling back to `png`.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if the payload is empty, the data-URI is not
/// base64, or the payload does not decode.
pub fn decode_image(input: &str) -> Result<DecodedImage, AppError> {
    let input = input.trim();

    let (declared, payload) = match input.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest.split_once(',').ok_or_else(|| {
                AppError::bad_request(
                    "Invalid image",
                    json!({ "reason": "data URI has no payload" }),
                )
            })?;
            let mime = header.strip_suffix(";base64").ok_or_else(|| {
                AppError::bad_request(
                    "Invalid image",
                    json!({ "reason": "data URI must be base64 encoded" }),
                )
            })?;
            (mime.strip_prefix("image/"), payload)
        }
        None => (None, input),
    };

    if payload.is_empty() {
        return Err(AppError::bad_request(
            "Invalid image",
            json!({ "reason": "image payload is empty" }),
        ));
    }

    let bytes = STANDARD.decode(payload).map_err(|e| {
        AppError::bad_request("Invalid image", json!({ "reason": e.to_string() }))
    })?;

    let extension = match declared {
        Some("jpeg") => "jpeg",
        Some("jpg") => "jpg",
        Some("png") => "png",
        _ => sniff_extension(&bytes),
    };

    Ok(DecodedImage { bytes, extension })
}

/// [`decode_image`] with the failure reported against a payload field.
///
/// The error details take the form `{"<field>": ["<reason>"]}`.
pub fn decode_field(field: &str, input: &str) -> Result<DecodedImage, AppError> {
    decode_image(input).map_err(|e| {
        let info = e.to_error_info();
        let reason = info
            .details
            .get("reason")
            .and_then(|r| r.as_str())
            .map(str::to_string)
            .unwrap_or(info.message);
        AppError::bad_request("Validation failed", json!({ field: [reason] }))
    })
}

fn sniff_extension(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "jpg"
    } else if bytes.starts_with(b"GIF8") {
        "gif"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "webp"
    } else {
        "png"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_decode_data_uri_uses_declared_type() {
        let uri = format!("data:image/jpeg;base64,{}", STANDARD.encode(b"fake-jpeg"));

        let image = decode_image(&uri).unwrap();

        assert_eq!(image.bytes, b"fake-jpeg");
        assert_eq!(image.extension, "jpeg");
    }

    #[test]
    fn test_decode_bare_payload_sniffs_png() {
        let image = decode_image(&STANDARD.encode(PNG_MAGIC)).unwrap();

        assert_eq!(image.extension, "png");
    }

    #[test]
    fn test_undeclared_type_sniffs_gif() {
        let uri = format!("data:image/svg+xml;base64,{}", STANDARD.encode(b"GIF89a..."));

        assert_eq!(decode_image(&uri).unwrap().extension, "gif");
    }

    #[test]
    fn test_unknown_bytes_fall_back_to_png() {
        let image = decode_image(&STANDARD.encode(b"plain bytes")).unwrap();

        assert_eq!(image.extension, "png");
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        let result = decode_image("data:image/png;base64,@@not-base64@@");

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_non_base64_data_uri_is_rejected() {
        let result = decode_image("data:image/png,rawdata");

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_decode_field_names_the_field() {
        let err = decode_field("image", "data:image/png;base64,").unwrap_err();

        let details = err.to_error_info().details;
        assert_eq!(details["image"][0], "image payload is empty");
    }

    #[test]
    fn test_empty_payload_is_rejected() {
        assert!(decode_image("").is_err());
        assert!(decode_image("data:image/png;base64,").is_err());
    }
}
