//! Response Codec Module
//!
//! Converts a [`CachedResponse`] to and from the printable string kept in the
//! store.
//!
//! # Layout
//! The blob is the lowercase hex form of:
//!
//! | field            | size                  |
//! |------------------|-----------------------|
//! | magic `MPRC`     | 4 bytes               |
//! | version          | 1 byte                |
//! | status           | u16, big endian       |
//! | content type len | u64, big endian       |
//! | content type     | UTF-8 bytes           |
//! | body len         | u64, big endian       |
//! | body             | raw bytes             |
//!
//! Hex keeps the blob safe for text-oriented stores while the body itself
//! stays binary.

use axum::http::StatusCode;
use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::cache::CachedResponse;
use crate::error::DecodeError;

// == Format Constants ==
const MAGIC: &[u8; 4] = b"MPRC";
const FORMAT_VERSION: u8 = 1;

// == Encode ==
/// Serializes a response into its store representation.
///
/// Deterministic: equal responses always produce equal blobs.
pub fn encode(response: &CachedResponse) -> String {
    let content_type = response.content_type.as_bytes();
    let mut buf = BytesMut::with_capacity(
        MAGIC.len() + 1 + 2 + 8 + content_type.len() + 8 + response.body.len(),
    );

    buf.put_slice(MAGIC);
    buf.put_u8(FORMAT_VERSION);
    buf.put_u16(response.status.as_u16());
    buf.put_u64(content_type.len() as u64);
    buf.put_slice(content_type);
    buf.put_u64(response.body.len() as u64);
    buf.put_slice(&response.body);

    hex::encode(buf)
}

// == Decode ==
/// Rebuilds a response from a blob produced by [`encode`].
///
/// Any deviation from the layout fails the whole decode.
pub fn decode(blob: &str) -> Result<CachedResponse, DecodeError> {
    let raw = hex::decode(blob)?;
    let mut buf = raw.as_slice();

    if take(&mut buf, MAGIC.len() as u64)? != MAGIC {
        return Err(DecodeError::BadMagic);
    }

    need(buf, 1)?;
    let version = buf.get_u8();
    if version != FORMAT_VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }

    need(buf, 2)?;
    let code = buf.get_u16();
    let status = StatusCode::from_u16(code).map_err(|_| DecodeError::InvalidStatus(code))?;

    need(buf, 8)?;
    let content_type_len = buf.get_u64();
    let content_type = std::str::from_utf8(take(&mut buf, content_type_len)?)
        .map_err(|_| DecodeError::InvalidContentType)?
        .to_string();

    need(buf, 8)?;
    let body_len = buf.get_u64();
    let body = Bytes::copy_from_slice(take(&mut buf, body_len)?);

    if !buf.is_empty() {
        return Err(DecodeError::TrailingBytes(buf.len()));
    }

    Ok(CachedResponse {
        status,
        content_type,
        body,
    })
}

// == Helpers ==
fn need(buf: &[u8], len: u64) -> Result<(), DecodeError> {
    if (buf.len() as u64) < len {
        return Err(DecodeError::Truncated {
            needed: len,
            remaining: buf.len(),
        });
    }
    Ok(())
}

/// Splits `len` bytes off the front of `buf`.
fn take<'a>(buf: &mut &'a [u8], len: u64) -> Result<&'a [u8], DecodeError> {
    need(buf, len)?;
    // need() guarantees len fits in the slice, hence in usize
    let (head, tail) = buf.split_at(len as usize);
    *buf = tail;
    Ok(head)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn help_page() -> CachedResponse {
        CachedResponse::new(StatusCode::OK, "text/html", "<html>help</html>")
    }

    #[test]
    fn test_roundtrip_text_body() {
        let response = help_page();
        assert_eq!(decode(&encode(&response)).unwrap(), response);
    }

    #[test]
    fn test_roundtrip_empty_body() {
        let response = CachedResponse::new(StatusCode::NO_CONTENT, "text/plain", Bytes::new());
        assert_eq!(decode(&encode(&response)).unwrap(), response);
    }

    #[test]
    fn test_roundtrip_every_byte_value() {
        let body: Vec<u8> = (0..=255u8).collect();
        let response = CachedResponse::new(StatusCode::OK, "application/x-bittorrent", body);
        let decoded = decode(&encode(&response)).unwrap();
        assert_eq!(decoded.body.len(), 256);
        assert_eq!(decoded, response);
    }

    #[test]
    fn test_encode_is_printable_and_deterministic() {
        let blob = encode(&help_page());
        assert!(blob.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(blob, encode(&help_page()));
    }

    #[test]
    fn test_decode_rejects_non_hex() {
        assert!(matches!(
            decode("not hex at all"),
            Err(DecodeError::InvalidHex(_))
        ));
        assert!(matches!(decode("abc"), Err(DecodeError::InvalidHex(_))));
    }

    #[test]
    fn test_decode_rejects_foreign_blob() {
        let blob = hex::encode(b"something else entirely");
        assert_eq!(decode(&blob), Err(DecodeError::BadMagic));
    }

    #[test]
    fn test_decode_rejects_empty_blob() {
        assert!(matches!(decode(""), Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let mut raw = hex::decode(encode(&help_page())).unwrap();
        raw[4] = 9;
        assert_eq!(
            decode(&hex::encode(raw)),
            Err(DecodeError::UnsupportedVersion(9))
        );
    }

    #[test]
    fn test_decode_rejects_invalid_status() {
        let mut raw = hex::decode(encode(&help_page())).unwrap();
        raw[5..7].copy_from_slice(&42u16.to_be_bytes());
        assert_eq!(decode(&hex::encode(raw)), Err(DecodeError::InvalidStatus(42)));
    }

    #[test]
    fn test_decode_rejects_non_utf8_content_type() {
        let mut raw = hex::decode(encode(&help_page())).unwrap();
        // first content type byte sits right after the length field
        raw[15] = 0xff;
        assert_eq!(
            decode(&hex::encode(raw)),
            Err(DecodeError::InvalidContentType)
        );
    }

    #[test]
    fn test_decode_rejects_every_truncation() {
        let raw = hex::decode(encode(&help_page())).unwrap();
        for cut in 0..raw.len() {
            let result = decode(&hex::encode(&raw[..cut]));
            assert!(result.is_err(), "prefix of {} bytes decoded", cut);
        }
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let mut raw = hex::decode(encode(&help_page())).unwrap();
        raw.extend_from_slice(b"xy");
        assert_eq!(decode(&hex::encode(raw)), Err(DecodeError::TrailingBytes(2)));
    }

    #[test]
    fn test_decode_rejects_oversized_length() {
        let mut raw = hex::decode(encode(&help_page())).unwrap();
        raw[7..15].copy_from_slice(&u64::MAX.to_be_bytes());
        assert!(matches!(
            decode(&hex::encode(raw)),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn test_decode_accepts_uppercase_hex() {
        let blob = encode(&help_page()).to_uppercase();
        assert_eq!(decode(&blob).unwrap(), help_page());
    }
}
