//! Compressed container for document text.
//!
//! The container is a single zstd frame holding the UTF-8 document. There is
//! no magic or length prefix of its own; zstd's frame header identifies it.

use std::io::{Read, Write};

use crate::error::{DecodeError, EncodeError};
use crate::limits::MAX_DOCUMENT_SIZE;

/// Compresses document text at the given zstd level.
pub fn compress(text: &str, level: i32) -> Result<Vec<u8>, EncodeError> {
    zstd::encode_all(text.as_bytes(), level)
        .map_err(|e| EncodeError::CompressionFailed(e.to_string()))
}

/// Decompresses a container back to document text.
///
/// Output is bounded by [`MAX_DOCUMENT_SIZE`].
pub fn decompress(input: &[u8]) -> Result<String, DecodeError> {
    read_document(input)
}

/// Compresses `text` and writes the container to `writer`.
pub fn write_document<W: Write>(writer: W, text: &str, level: i32) -> Result<(), EncodeError> {
    let mut encoder = zstd::Encoder::new(writer, level)
        .map_err(|e| EncodeError::CompressionFailed(e.to_string()))?;
    encoder
        .write_all(text.as_bytes())
        .map_err(|e| EncodeError::CompressionFailed(e.to_string()))?;
    let mut writer = encoder
        .finish()
        .map_err(|e| EncodeError::CompressionFailed(e.to_string()))?;
    writer
        .flush()
        .map_err(|e| EncodeError::CompressionFailed(e.to_string()))
}

/// Reads a container from `reader` and returns the document text.
pub fn read_document<R: Read>(reader: R) -> Result<String, DecodeError> {
    read_bounded(reader, MAX_DOCUMENT_SIZE)
}

fn read_bounded<R: Read>(reader: R, max: usize) -> Result<String, DecodeError> {
    let decoder =
        zstd::Decoder::new(reader).map_err(|e| DecodeError::DecompressionFailed(e.to_string()))?;

    // One byte past the limit tells us whether the limit was hit
    let mut bytes = Vec::new();
    decoder
        .take(max as u64 + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| DecodeError::DecompressionFailed(e.to_string()))?;

    if bytes.len() > max {
        return Err(DecodeError::DocumentTooLarge { max });
    }

    String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "// Generated with figport\n\n:R\nSport╵/static/sport.png\n";

    #[test]
    fn test_compress_roundtrip() {
        let compressed = compress(TEXT, 3).unwrap();
        assert_eq!(decompress(&compressed).unwrap(), TEXT);
    }

    #[test]
    fn test_stream_roundtrip() {
        let mut buf = Vec::new();
        write_document(&mut buf, TEXT, 19).unwrap();
        assert_eq!(read_document(buf.as_slice()).unwrap(), TEXT);
    }

    #[test]
    fn test_not_zstd() {
        let result = decompress(b"plain text, not a frame");
        assert!(matches!(result, Err(DecodeError::DecompressionFailed(_))));
    }

    #[test]
    fn test_size_limit() {
        let compressed = compress(TEXT, 3).unwrap();
        let len = TEXT.len();

        assert_eq!(read_bounded(compressed.as_slice(), len).unwrap(), TEXT);
        assert_eq!(
            read_bounded(compressed.as_slice(), len - 1),
            Err(DecodeError::DocumentTooLarge { max: len - 1 })
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let compressed = zstd::encode_all(&[0xffu8, 0xfe, 0x00][..], 3).unwrap();
        assert_eq!(decompress(&compressed), Err(DecodeError::InvalidUtf8));
    }
}
