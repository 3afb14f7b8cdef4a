//! Binary payload codec for custom templates.
//!
//! # Responsibility
//! - Turn uploaded bytes into a self-contained data-URL string for storage.
//! - Reconstruct the exact original bytes from a stored payload.
//!
//! # Invariants
//! - `decode(&encode(bytes)) == bytes` for every byte sequence, empty included.
//! - Decoding ignores the declared media type; only the base64 body matters.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Media type attached to every encoded payload and exported artifact.
pub const SPREADSHEET_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const DATA_URL_SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug)]
pub enum CodecError {
    /// Payload lacks the `data:` scheme or the `;base64,` marker.
    MissingMarker,
    InvalidBase64(base64::DecodeError),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingMarker => {
                write!(f, "encoded payload is missing the base64 data-url marker")
            }
            Self::InvalidBase64(err) => write!(f, "encoded payload is not valid base64: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingMarker => None,
            Self::InvalidBase64(err) => Some(err),
        }
    }
}

impl From<base64::DecodeError> for CodecError {
    fn from(value: base64::DecodeError) -> Self {
        Self::InvalidBase64(value)
    }
}

/// Encodes raw bytes as `data:<spreadsheet type>;base64,<body>`.
pub fn encode(bytes: &[u8]) -> String {
    let body = BASE64.encode(bytes);
    let mut encoded = String::with_capacity(
        DATA_URL_SCHEME.len() + SPREADSHEET_CONTENT_TYPE.len() + BASE64_MARKER.len() + body.len(),
    );
    encoded.push_str(DATA_URL_SCHEME);
    encoded.push_str(SPREADSHEET_CONTENT_TYPE);
    encoded.push_str(BASE64_MARKER);
    encoded.push_str(&body);
    encoded
}

/// Decodes a data-URL payload back into its original bytes.
///
/// # Errors
/// - `MissingMarker` when the payload is not a base64 data URL.
/// - `InvalidBase64` when the body does not decode.
pub fn decode(encoded: &str) -> CodecResult<Vec<u8>> {
    let rest = encoded
        .strip_prefix(DATA_URL_SCHEME)
        .ok_or(CodecError::MissingMarker)?;
    let (_media_type, body) = rest
        .split_once(BASE64_MARKER)
        .ok_or(CodecError::MissingMarker)?;
    Ok(BASE64.decode(body.trim())?)
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, CodecError, SPREADSHEET_CONTENT_TYPE};
    use proptest::prelude::*;

    #[test]
    fn encode_embeds_media_type_marker() {
        let encoded = encode(b"PK\x03\x04");
        assert_eq!(
            encoded,
            format!("data:{SPREADSHEET_CONTENT_TYPE};base64,UEsDBA==")
        );
    }

    #[test]
    fn empty_input_round_trips() {
        let encoded = encode(&[]);
        assert!(encoded.ends_with(";base64,"));
        assert_eq!(decode(&encoded).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn decode_accepts_other_media_types() {
        let decoded = decode("data:application/octet-stream;base64,AAEC").unwrap();
        assert_eq!(decoded, vec![0, 1, 2]);
    }

    #[test]
    fn decode_rejects_payload_without_marker() {
        assert!(matches!(decode("AAEC"), Err(CodecError::MissingMarker)));
        assert!(matches!(
            decode("data:application/octet-stream,AAEC"),
            Err(CodecError::MissingMarker)
        ));
    }

    #[test]
    fn decode_rejects_corrupt_body() {
        let err = decode("data:x;base64,@@@").unwrap_err();
        assert!(matches!(err, CodecError::InvalidBase64(_)));
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(bytes in proptest::collection::vec(any::<u8>(), 0..4096)) {
            prop_assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);
        }
    }
}
