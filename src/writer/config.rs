//! Contains the writer configuration structure.

use std::borrow::Cow;
use std::io::Write;

use super::printer::DEFAULT_BUFFER_SIZE;
use super::Writer;

/// Writer configuration structure.
///
/// This structure contains various options which control behavior of an XML document writer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct WriterConfig {
    /// Whether or not nodes are checked before they are written. Default is true.
    ///
    /// This covers legal parent kinds, required fields, and the name, character
    /// and identifier productions of the XML specification. Turning it off trades
    /// safety for throughput: the writer still produces best-effort output for any
    /// sequence of calls, but it may not be well-formed.
    pub perform_validation: bool,

    /// Whether or not comment and CDATA content is also checked against the
    /// discouraged compatibility ranges. Default is true.
    ///
    /// Has no effect when `perform_validation` is off.
    pub strict_chars: bool,

    /// Whether or not the emitted document should be indented. Default is false.
    ///
    /// The writer is capable to perform automatic indentation of the emitted XML document.
    /// It is done in stream-like fashion and does not require the knowledge of the whole
    /// document in advance. Custom strategies can be installed with `Writer::set_indenter()`.
    pub perform_indent: bool,

    /// A string which will be used for a single level of indentation. Default is `" "`
    /// (one space).
    pub indent_string: Cow<'static, str>,

    /// Line separator used to separate lines in formatted output. Default is `"\n"`.
    pub line_separator: Cow<'static, str>,

    /// The `version="..."` pseudo-attribute written by a document node unless it
    /// overrides it. Default is `"1.0"`.
    pub version: Cow<'static, str>,

    /// Capacity of the output buffer in bytes. Default is 2048; zero means the default.
    pub buffer_size: usize,
}

impl WriterConfig {
    /// Creates a writer configuration with default values.
    ///
    /// You can tweak default options with builder-like pattern:
    ///
    /// ```rust
    /// use xmlwriter::WriterConfig;
    ///
    /// let config = WriterConfig::new()
    ///     .line_separator("\r\n")
    ///     .perform_indent(true)
    ///     .buffer_size(4096);
    /// ```
    #[inline]
    pub fn new() -> WriterConfig {
        WriterConfig {
            perform_validation: true,
            strict_chars: true,
            perform_indent: false,
            indent_string: " ".into(),
            line_separator: "\n".into(),
            version: "1.0".into(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Creates an XML writer with this configuration.
    ///
    /// This is a convenience method for configuring and creating a writer at the same time:
    ///
    /// ```rust
    /// use xmlwriter::WriterConfig;
    ///
    /// let mut target: Vec<u8> = Vec::new();
    ///
    /// let writer = WriterConfig::new()
    ///     .perform_indent(true)
    ///     .indent_string("    ")
    ///     .create_writer(&mut target);
    /// ```
    ///
    /// This method is exactly equivalent to calling `Writer::new_with_config()` with
    /// this configuration object.
    pub fn create_writer<W: Write>(self, sink: W) -> Writer<W> {
        Writer::new_with_config(sink, self)
    }
}

impl Default for WriterConfig {
    fn default() -> WriterConfig {
        WriterConfig::new()
    }
}

gen_setters!(WriterConfig,
    perform_validation: val bool,
    strict_chars: val bool,
    perform_indent: val bool,
    indent_string: into Cow<'static, str>,
    line_separator: into Cow<'static, str>,
    version: into Cow<'static, str>,
    buffer_size: val usize
);
