//! Contains the buffered, escaping output printer shared by every node kind.

use std::io;
use std::io::prelude::*;
use std::sync::Arc;

use log::debug;

use crate::escape::{attribute_escape, escape_with, text_escape};
use crate::writer::error::{Error, Result};
use crate::writer::indent::IndentOutput;

/// Buffer capacity used when none is configured.
pub const DEFAULT_BUFFER_SIZE: usize = 2048;

/// A buffered sink which remembers its first I/O failure.
///
/// Once the underlying writer fails, the error is kept and every later call
/// returns it again without touching the sink.
pub(crate) struct Printer<W: Write> {
    sink: W,
    buf: Vec<u8>,
    capacity: usize,
    error: Option<Arc<io::Error>>,
}

impl<W: Write> Printer<W> {
    pub fn new(sink: W, capacity: usize) -> Printer<W> {
        let capacity = if capacity == 0 { DEFAULT_BUFFER_SIZE } else { capacity };
        Printer {
            sink,
            buf: Vec::with_capacity(capacity),
            capacity,
            error: None,
        }
    }

    /// Returns the first sink failure, if there was one.
    #[inline]
    pub fn cached_error(&self) -> Result<()> {
        match self.error {
            Some(ref cause) => Err(Error::Io { cause: cause.clone() }),
            None => Ok(()),
        }
    }

    fn record(&mut self, result: io::Result<()>) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                debug!("sink failed, caching error: {}", e);
                let cause = Arc::new(e);
                self.error = Some(cause.clone());
                Err(Error::Io { cause })
            }
        }
    }

    fn flush_buf(&mut self) -> Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let result = self.sink.write_all(&self.buf);
        self.buf.clear();
        self.record(result)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.cached_error()?;
        if self.buf.len() + bytes.len() > self.capacity {
            self.flush_buf()?;
        }
        if bytes.len() >= self.capacity {
            // too big to be worth buffering
            let result = self.sink.write_all(bytes);
            self.record(result)
        } else {
            self.buf.extend_from_slice(bytes);
            Ok(())
        }
    }

    #[inline]
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_bytes(s.as_bytes())
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) -> Result<()> {
        self.write_bytes(&[b])
    }

    /// Writes `s` escaped for use inside a double-quoted attribute value.
    pub fn escape_attr(&mut self, s: &str) -> Result<()> {
        escape_with(s, attribute_escape, |chunk| self.write_str(chunk))
    }

    /// Writes `s` escaped for use as character data.
    pub fn escape_text(&mut self, s: &str) -> Result<()> {
        escape_with(s, text_escape, |chunk| self.write_str(chunk))
    }

    /// Writes `prefix:name`, or just `name` if the prefix is empty.
    pub fn write_qualified_name(&mut self, prefix: &str, name: &str) -> Result<()> {
        if !prefix.is_empty() {
            self.write_str(prefix)?;
            self.write_byte(b':')?;
        }
        self.write_str(name)
    }

    /// Writes ` name="value"` with the value attribute-escaped.
    #[inline]
    pub fn print_attr(&mut self, name: &str, value: &str) -> Result<()> {
        self.print_qualified_attr("", name, value)
    }

    pub fn print_qualified_attr(&mut self, prefix: &str, name: &str, value: &str) -> Result<()> {
        self.write_byte(b' ')?;
        self.write_qualified_name(prefix, name)?;
        self.write_str("=\"")?;
        self.escape_attr(value)?;
        self.write_byte(b'"')
    }

    /// Writes a namespace declaration for `prefix`; the empty prefix declares
    /// the default namespace.
    pub fn print_namespace(&mut self, prefix: &str, uri: &str) -> Result<()> {
        if prefix.is_empty() {
            self.print_attr("xmlns", uri)
        } else {
            self.print_qualified_attr("xmlns", prefix, uri)
        }
    }

    /// Writes `'SYSTEM' S SystemLiteral` or `'PUBLIC' S PubidLiteral (S SystemLiteral)?`.
    ///
    /// Writes nothing if both identifiers are empty.
    pub fn write_external_id(&mut self, public_id: &str, system_id: &str) -> Result<()> {
        if !public_id.is_empty() {
            self.write_public_id(public_id)?;
            if !system_id.is_empty() {
                self.write_byte(b' ')?;
                self.write_system_id(system_id)?;
            }
            Ok(())
        } else if !system_id.is_empty() {
            self.write_str("SYSTEM ")?;
            self.write_system_id(system_id)
        } else {
            Ok(())
        }
    }

    /// Writes `PUBLIC "id"`.
    pub fn write_public_id(&mut self, public_id: &str) -> Result<()> {
        self.write_str("PUBLIC \"")?;
        self.write_str(public_id)?;
        self.write_byte(b'"')
    }

    /// Writes a system literal, single-quoted if it contains a double quote.
    #[inline]
    pub fn write_system_id(&mut self, system_id: &str) -> Result<()> {
        self.write_quoted(system_id)
    }

    /// Writes an entity value, single-quoted if it contains a double quote.
    #[inline]
    pub fn write_entity_value(&mut self, value: &str) -> Result<()> {
        self.write_quoted(value)
    }

    fn write_quoted(&mut self, literal: &str) -> Result<()> {
        let quote = if literal.contains('"') { b'\'' } else { b'"' };
        self.write_byte(quote)?;
        self.write_str(literal)?;
        self.write_byte(quote)
    }

    /// Writes out the buffer and flushes the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.cached_error()?;
        self.flush_buf()?;
        let result = self.sink.flush();
        self.record(result)
    }

    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Flushes and unwraps the sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.sink)
    }
}

/// Adapts a printer for indenters, which only ever see newlines and indent runs.
pub(crate) struct PrinterOutput<'p, W: Write> {
    pub printer: &'p mut Printer<W>,
    pub line_separator: &'p str,
}

impl<'p, W: Write> IndentOutput for PrinterOutput<'p, W> {
    fn write_newline(&mut self) -> Result<()> {
        self.printer.write_str(self.line_separator)
    }

    fn write_str(&mut self, s: &str) -> Result<()> {
        self.printer.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::io::prelude::*;

    use super::Printer;

    /// Fails every write after the first `budget` calls.
    struct DodgyWriter {
        out: Vec<u8>,
        budget: usize,
        calls: usize,
    }

    impl Write for DodgyWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.calls += 1;
            if self.calls > self.budget {
                return Err(io::Error::new(io::ErrorKind::Other, "failed"));
            }
            self.out.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn printed<F: FnOnce(&mut Printer<Vec<u8>>)>(f: F) -> String {
        let mut p = Printer::new(Vec::new(), 0);
        f(&mut p);
        String::from_utf8(p.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_escape_attr() {
        let cases = [("abc", "abc"), ("a-c", "a-c"), ("a\nb", "a&#xA;b"), ("\nb", "&#xA;b"), ("a\n", "a&#xA;")];
        for &(input, expected) in cases.iter() {
            assert_eq!(printed(|p| p.escape_attr(input).unwrap()), expected);
        }
    }

    #[test]
    fn test_print_attr() {
        assert_eq!(printed(|p| p.print_attr("a", "<\"b\">").unwrap()), " a=\"&lt;&#34;b&#34;&gt;\"");
        assert_eq!(printed(|p| p.print_qualified_attr("ns", "a", "").unwrap()), " ns:a=\"\"");
        assert_eq!(printed(|p| p.print_namespace("", "urn:x").unwrap()), " xmlns=\"urn:x\"");
    }

    #[test]
    fn test_external_id() {
        assert_eq!(printed(|p| p.write_external_id("", "sys").unwrap()), "SYSTEM \"sys\"");
        assert_eq!(printed(|p| p.write_external_id("pub", "sys").unwrap()), "PUBLIC \"pub\" \"sys\"");
        assert_eq!(printed(|p| p.write_external_id("pub", "").unwrap()), "PUBLIC \"pub\"");
        assert_eq!(printed(|p| p.write_external_id("", "a\"b").unwrap()), "SYSTEM 'a\"b'");
        assert_eq!(printed(|p| p.write_entity_value("it's").unwrap()), "\"it's\"");
    }

    #[test]
    fn test_buffering() {
        let mut p = Printer::new(Vec::new(), 4);
        p.write_str("ab").unwrap();
        assert!(p.get_ref().is_empty());
        p.write_str("cde").unwrap();
        assert_eq!(p.get_ref(), b"ab");
        p.write_str("longer than the buffer").unwrap();
        assert_eq!(p.get_ref(), b"abcdelonger than the buffer");
        p.flush().unwrap();
    }

    #[test]
    fn test_sticky_error() {
        let mut last = 0;
        for budget in 0..5 {
            let sink = DodgyWriter { out: Vec::new(), budget, calls: 0 };
            let mut p = Printer::new(sink, 1);
            let err = p.print_attr("hi", "yep").unwrap_err();
            assert_eq!(err.io_error().unwrap().to_string(), "failed");

            let written = p.get_ref().out.len();
            if budget > 0 {
                assert!(written > last);
            }
            last = written;

            // replayed without reaching the sink again
            let calls = p.get_ref().calls;
            assert!(p.write_str("more").is_err());
            assert!(p.flush().is_err());
            assert_eq!(p.get_ref().calls, calls);
        }
    }
}
