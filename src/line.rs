//! CRLF line framing for the IRC byte stream.
//!
//! [`LineCodec`] reassembles received bytes into protocol lines and
//! encodes outgoing lines. The wire encoding is ASCII: bytes outside the
//! 7-bit range decode to `?`, and non-ASCII characters encode as `?`.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{ProtocolError, Result};

/// Protocol line terminator.
pub const CRLF: &str = "\r\n";

/// Line-oriented codec with an optional upper bound on line length.
///
/// The decoder keeps a scan cursor so bytes already searched for a
/// terminator are not searched again after a partial read.
#[derive(Clone, Debug, Default)]
pub struct LineCodec {
    next_index: usize,
    max_len: Option<usize>,
}

impl LineCodec {
    /// A codec with no line length limit.
    pub fn new() -> LineCodec {
        LineCodec::default()
    }

    /// A codec that rejects lines longer than `max_len` bytes.
    pub fn with_max_len(max_len: usize) -> LineCodec {
        LineCodec {
            next_index: 0,
            max_len: Some(max_len),
        }
    }

    fn decode_ascii(bytes: &[u8]) -> String {
        bytes
            .iter()
            .map(|&b| if b.is_ascii() { char::from(b) } else { '?' })
            .collect()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        // A CR may already sit at the end of the previously scanned region.
        let start = self.next_index.saturating_sub(1).min(src.len());

        match src[start..].windows(2).position(|w| w == b"\r\n") {
            Some(offset) => {
                let end = start + offset;
                let line = src.split_to(end + CRLF.len());
                self.next_index = 0;
                if let Some(limit) = self.max_len.filter(|&limit| end > limit) {
                    return Err(ProtocolError::MessageTooLong { actual: end, limit });
                }
                Ok(Some(LineCodec::decode_ascii(&line[..end])))
            }
            None => {
                if let Some(limit) = self.max_len {
                    // A CR at the end may be the first half of the terminator.
                    let pending = src.len() - usize::from(src.ends_with(b"\r"));
                    if pending > limit {
                        return Err(ProtocolError::MessageTooLong {
                            actual: pending,
                            limit,
                        });
                    }
                }
                self.next_index = src.len();
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        match self.decode(src)? {
            Some(line) => Ok(Some(line)),
            None => {
                if !src.is_empty() {
                    tracing::trace!(bytes = src.len(), "discarding unterminated fragment at eof");
                    src.clear();
                }
                self.next_index = 0;
                Ok(None)
            }
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<()> {
        dst.reserve(line.len());
        for c in line.chars() {
            dst.put_u8(if c.is_ascii() { c as u8 } else { b'?' });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(codec: &mut LineCodec, buf: &mut BytesMut, chunk: &[u8]) -> Vec<String> {
        buf.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(line) = codec.decode(buf).unwrap() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_many_lines_in_one_read() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        let lines = feed(&mut codec, &mut buf, b"PING :a\r\nPING :b\r\nPIN");
        assert_eq!(lines, vec!["PING :a", "PING :b"]);
        assert_eq!(&buf[..], b"PIN");
    }

    #[test]
    fn test_line_spanning_reads() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        assert!(feed(&mut codec, &mut buf, b":srv 001 al").is_empty());
        assert!(feed(&mut codec, &mut buf, b"ice :Welcome\r").is_empty());
        assert_eq!(feed(&mut codec, &mut buf, b"\n"), vec![":srv 001 alice :Welcome"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_bare_lf_is_not_a_terminator() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        assert!(feed(&mut codec, &mut buf, b"a\nb").is_empty());
        assert_eq!(feed(&mut codec, &mut buf, b"\r\n"), vec!["a\nb"]);
    }

    #[test]
    fn test_empty_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        assert_eq!(feed(&mut codec, &mut buf, b"\r\nX\r\n"), vec!["", "X"]);
    }

    #[test]
    fn test_non_ascii_bytes_become_question_marks() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        let lines = feed(&mut codec, &mut buf, "caf\u{e9}\r\n".as_bytes());
        assert_eq!(lines, vec!["caf??"]);
    }

    #[test]
    fn test_max_len() {
        let mut codec = LineCodec::with_max_len(8);
        let mut buf = BytesMut::from(&b"0123456789"[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::MessageTooLong { actual: 10, limit: 8 })
        ));
    }

    #[test]
    fn test_max_len_line_split_at_cr() {
        let mut whole = LineCodec::with_max_len(4);
        let mut buf = BytesMut::new();
        assert_eq!(feed(&mut whole, &mut buf, b"abcd\r\n"), vec!["abcd"]);

        let mut split = LineCodec::with_max_len(4);
        let mut buf = BytesMut::new();
        assert!(feed(&mut split, &mut buf, b"abcd\r").is_empty());
        assert_eq!(feed(&mut split, &mut buf, b"\n"), vec!["abcd"]);

        let mut over = LineCodec::with_max_len(4);
        let mut buf = BytesMut::from(&b"abcde\r"[..]);
        assert!(matches!(
            over.decode(&mut buf),
            Err(ProtocolError::MessageTooLong { actual: 5, limit: 4 })
        ));
    }

    #[test]
    fn test_decode_eof_drops_fragment() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"done\r\npartial"[..]);
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), Some("done".to_string()));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_encode_ascii() {
        let mut codec = LineCodec::new();
        let mut dst = BytesMut::new();
        codec.encode("NICK b\u{f6}b\r\n".to_string(), &mut dst).unwrap();
        assert_eq!(&dst[..], b"NICK b?b\r\n");
    }
}
