//! String and payload conversions at the platform boundary
//!
//! Spooler APIs take NUL-terminated UTF-16 strings on Windows, while the
//! bridge works with UTF-8 everywhere else. Some label printers also expect
//! their text in a legacy code page. Everything here is pure so it can be
//! tested without touching a spooler.

use encoding_rs::Encoding;
use tracing::instrument;

use crate::error::{PrintError, PrintResult};

/// Convert a string to a NUL-terminated UTF-16 buffer
pub fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Convert a UTF-16 buffer back to a string
///
/// Stops at the first NUL, so buffers filled by the OS with trailing
/// terminators decode to just the name.
pub fn from_wide(buf: &[u16]) -> PrintResult<String> {
    let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16(&buf[..end])
        .map_err(|e| PrintError::Encoding(format!("UTF-16 decode failed: {}", e)))
}

/// Look up a payload encoding by its WHATWG label (e.g. "gbk", "windows-1252")
pub fn payload_encoding(label: &str) -> PrintResult<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| PrintError::InvalidConfig(format!("Unknown payload encoding: {}", label)))
}

/// Transcode a UTF-8 command stream into the printer's code page
///
/// ASCII bytes (0x00-0x7F) are copied unchanged so command syntax and
/// control characters survive. Only runs of non-ASCII bytes are decoded as
/// UTF-8 and re-encoded; invalid UTF-8 passes through as-is.
#[instrument(skip(bytes, encoding), fields(len = bytes.len(), encoding = encoding.name()))]
pub fn transcode_payload(bytes: &[u8], encoding: &'static Encoding) -> Vec<u8> {
    if encoding == encoding_rs::UTF_8 || bytes.is_ascii() {
        return bytes.to_vec();
    }

    let mut result = Vec::with_capacity(bytes.len());
    let mut buffer = Vec::new();

    for &b in bytes {
        if b < 128 {
            flush_buffer(&mut buffer, &mut result, encoding);
            result.push(b);
        } else {
            buffer.push(b);
        }
    }
    flush_buffer(&mut buffer, &mut result, encoding);

    result
}

/// Flush the non-ASCII buffer, converting UTF-8 to the target encoding
///
/// Bytes that are not valid UTF-8 (raw bitmap data, already-encoded text)
/// are copied through unchanged.
fn flush_buffer(buffer: &mut Vec<u8>, result: &mut Vec<u8>, encoding: &'static Encoding) {
    if buffer.is_empty() {
        return;
    }

    for chunk in buffer.utf8_chunks() {
        if !chunk.valid().is_empty() {
            let (encoded, _, _) = encoding.encode(chunk.valid());
            result.extend_from_slice(&encoded);
        }
        result.extend_from_slice(chunk.invalid());
    }
    buffer.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_wide_terminates() {
        let wide = to_wide("TTP244");
        assert_eq!(wide.len(), 7);
        assert_eq!(wide.last(), Some(&0));
    }

    #[test]
    fn test_from_wide_stops_at_nul() {
        let mut buf = to_wide("Label Printer");
        buf.extend_from_slice(&[0, 0, 0]);
        assert_eq!(from_wide(&buf).unwrap(), "Label Printer");
    }

    #[test]
    fn test_from_wide_without_terminator() {
        let buf: Vec<u16> = "TTP244".encode_utf16().collect();
        assert_eq!(from_wide(&buf).unwrap(), "TTP244");
    }

    #[test]
    fn test_wide_non_ascii() {
        let wide = to_wide("标签打印机");
        assert_eq!(from_wide(&wide).unwrap(), "标签打印机");
    }

    #[test]
    fn test_from_wide_rejects_lone_surrogate() {
        assert!(from_wide(&[0xD800, 0x0041]).is_err());
    }

    #[test]
    fn test_payload_encoding_labels() {
        assert_eq!(payload_encoding("gbk").unwrap(), encoding_rs::GBK);
        assert_eq!(payload_encoding(" utf-8 ").unwrap(), encoding_rs::UTF_8);
        assert!(payload_encoding("no-such-code-page").is_err());
    }

    #[test]
    fn test_transcode_keeps_ascii() {
        let tspl = b"SIZE 40 mm,30 mm\r\nCLS\r\nPRINT 1\r\n";
        assert_eq!(transcode_payload(tspl, encoding_rs::GBK), tspl.to_vec());
    }

    #[test]
    fn test_transcode_gbk() {
        let tspl = "TEXT 10,10,\"TSS24.BF2\",0,1,1,\"中\"\r\n";
        let out = transcode_payload(tspl.as_bytes(), encoding_rs::GBK);
        let expected: Vec<u8> = [
            b"TEXT 10,10,\"TSS24.BF2\",0,1,1,\"".as_slice(),
            &[0xD6, 0xD0],
            b"\"\r\n",
        ]
        .concat();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_transcode_utf8_is_identity() {
        let tspl = "TEXT 0,0,\"3\",0,1,1,\"Größe\"\n".as_bytes();
        assert_eq!(transcode_payload(tspl, encoding_rs::UTF_8), tspl.to_vec());
    }

    #[test]
    fn test_transcode_keeps_binary_runs() {
        let tspl = b"BITMAP 0,0,2,2,0,\xFF\x80\x00\xC3\nPRINT 1\n";
        assert_eq!(transcode_payload(tspl, encoding_rs::GBK), tspl.to_vec());
    }

    #[test]
    fn test_transcode_mixed_text_and_binary() {
        let mut tspl = "TEXT 0,0,\"TSS24.BF2\",0,1,1,\"中\"\n".as_bytes().to_vec();
        tspl.extend_from_slice(b"BITMAP 0,0,1,1,0,\xFF\xFE\n");

        let mut expected = b"TEXT 0,0,\"TSS24.BF2\",0,1,1,\"\xD6\xD0\"\n".to_vec();
        expected.extend_from_slice(b"BITMAP 0,0,1,1,0,\xFF\xFE\n");

        assert_eq!(transcode_payload(&tspl, encoding_rs::GBK), expected);
    }
}
