//! Contains a sink adapter which transcodes UTF-8 output to another encoding.

use std::io::{self, Write};
use std::str;

use encoding_rs::{CoderResult, Encoder, Encoding};
use log::debug;

use crate::writer::ContentError;

const SCRATCH_SIZE: usize = 1024;

/// A wrapper around `Write` which converts the UTF-8 bytes written to it into
/// the specified encoding.
///
/// Characters which the encoding cannot represent are written as numeric character
/// references (`&#128512;`), which is what XML parsers expect. Code points split
/// across `write()` calls are handled correctly.
///
/// Call [`EncodingWriter::finish()`] when done so that stateful encodings get to
/// write their final bytes.
pub struct EncodingWriter<W: Write> {
    inner: W,
    encoder: Encoder,
    pending: [u8; 4],
    pending_len: usize,
    scratch: Vec<u8>,
}

impl<W: Write> EncodingWriter<W> {
    /// Wraps `inner` and encodes to the encoding named by `label`.
    ///
    /// Labels are resolved as in the WHATWG Encoding Standard, so e.g. `"latin1"`
    /// means windows-1252. Encodings which cannot be produced (UTF-16 and
    /// `replacement`) are rejected.
    pub fn new(inner: W, label: &str) -> Result<EncodingWriter<W>, ContentError> {
        let encoding = Encoding::for_label(label.as_bytes())
            .filter(|e| e.output_encoding() == *e)
            .ok_or_else(|| ContentError::UnsupportedEncoding { label: label.to_owned() })?;
        Ok(EncodingWriter::with_encoding(inner, encoding))
    }

    /// Wraps `inner` and encodes to `encoding`'s output encoding.
    pub fn with_encoding(inner: W, encoding: &'static Encoding) -> EncodingWriter<W> {
        debug!("encoding output as {}", encoding.output_encoding().name());
        EncodingWriter {
            inner,
            encoder: encoding.new_encoder(),
            pending: [0; 4],
            pending_len: 0,
            scratch: vec![0; SCRATCH_SIZE],
        }
    }

    #[inline]
    pub fn encoding(&self) -> &'static Encoding {
        self.encoder.encoding()
    }

    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Writes the final bytes of the encoding, flushes and returns the sink.
    ///
    /// Fails if the input ended in the middle of a code point.
    pub fn finish(mut self) -> io::Result<W> {
        if self.pending_len > 0 {
            return Err(invalid_data());
        }
        self.encode("", true)?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn encode(&mut self, mut src: &str, last: bool) -> io::Result<()> {
        loop {
            let (result, read, written, _) = self.encoder.encode_from_utf8(src, &mut self.scratch, last);
            self.inner.write_all(&self.scratch[..written])?;
            src = &src[read..];
            match result {
                CoderResult::InputEmpty => return Ok(()),
                CoderResult::OutputFull => {}
            }
        }
    }

    /// Feeds bytes to the pending partial code point. Returns how many were used.
    fn complete_pending(&mut self, buf: &[u8]) -> io::Result<usize> {
        let want = sequence_len(self.pending[0]);
        let take = (want - self.pending_len).min(buf.len());
        self.pending[self.pending_len..self.pending_len + take].copy_from_slice(&buf[..take]);
        self.pending_len += take;
        if self.pending_len < want {
            return Ok(take);
        }

        let (pending, len) = (self.pending, self.pending_len);
        self.pending_len = 0;
        let c = str::from_utf8(&pending[..len]).map_err(|_| invalid_data())?;
        self.encode(c, false)?;
        Ok(take)
    }
}

impl<W: Write> Write for EncodingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let consumed = if self.pending_len > 0 { self.complete_pending(buf)? } else { 0 };
        let rest = &buf[consumed..];

        let valid = match str::from_utf8(rest) {
            Ok(s) => s,
            Err(e) if e.error_len().is_none() => {
                let (valid, tail) = rest.split_at(e.valid_up_to());
                self.pending[..tail.len()].copy_from_slice(tail);
                self.pending_len = tail.len();
                str::from_utf8(valid).map_err(|_| invalid_data())?
            }
            Err(_) => return Err(invalid_data()),
        };
        self.encode(valid, false)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Length of the UTF-8 sequence introduced by a lead byte.
#[inline]
fn sequence_len(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    }
}

fn invalid_data() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "output is not valid UTF-8")
}
