//! Contains the forward-only XML writer.
//!
//! The writer keeps a stack of the nodes which have been started but not yet
//! ended. Every node moves through three states: *open* (`<elem`), *opened*
//! (`<elem>`, children may follow) and *ended* (`</elem>`). Bytes are written as
//! soon as a state is entered and are never taken back, so every check a node
//! needs happens before its first byte is written.
//!
//! ```rust
//! use xmlwriter::{Attribute, Document, Element, NodeKind, Writer};
//!
//! let mut w = Writer::new(Vec::new());
//! w.start(Document::new()).unwrap();
//! w.start(Element::new("greeting")).unwrap();
//! w.write(Attribute::new("lang", "en")).unwrap();
//! w.write("hello & goodbye").unwrap();
//! w.end(NodeKind::Element).unwrap();
//! w.end_doc().unwrap();
//!
//! let out = w.into_inner().unwrap();
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<greeting lang=\"en\">hello &amp; goodbye</greeting>"
//! );
//! ```

use std::borrow::Cow;
use std::io::prelude::*;
use std::result::Result as StdResult;

use log::trace;

pub use self::config::WriterConfig;
pub use self::error::{ContentError, Error, Result, StructureError};
pub use self::indent::{IndentOutput, Indenter, StandardIndenter};
pub use self::node::{Event, NodeFlags, NodeKind, NodeState};
pub use self::nodes::{
    Attribute, CData, CDataContent, Comment, CommentContent, DocType, Document, DtdAttList, DtdAttr,
    DtdAttrDefault, DtdAttrType, DtdElement, DtdEntity, Element, Node, Notation, ProcessingInstruction, Raw,
    StartNode, Text,
};

use self::node::{Frame, FrameData, Span};
use self::printer::{Printer, PrinterOutput};
use crate::chars::{check_chars, check_encoding, check_name, check_pub_id, check_qualified_name};
use crate::encoding::EncodingWriter;

pub mod config;
pub mod error;
pub mod indent;
pub mod node;
pub mod nodes;
mod printer;

const INITIAL_DEPTH: usize = 8;
const INITIAL_NAMES: usize = 256;

/// A namespace declared on the element at the top of the stack.
#[derive(Copy, Clone, Debug)]
struct Binding {
    prefix: Span,
    uri: Span,
    written: bool,
}

/// A forward-only XML writer over any `Write` sink.
///
/// Output is buffered; call [`Writer::flush()`] (or [`Writer::end_all_flush()`])
/// when done, or it is lost. Once the sink fails, every later call returns
/// that first failure, so long runs of calls only need checking at the end.
pub struct Writer<W: Write> {
    printer: Printer<W>,
    frames: Vec<Frame>,
    /// Names and pending content of the frames, in stack order.
    names: String,
    namespaces: Vec<Binding>,
    encoding: Cow<'static, str>,
    last: Event,
    indenter: Option<Box<dyn Indenter>>,
    config: WriterConfig,
}

impl<W: Write> Writer<W> {
    /// Creates a new writer with the default configuration.
    #[inline]
    pub fn new(sink: W) -> Writer<W> {
        Writer::new_with_config(sink, WriterConfig::new())
    }

    pub fn new_with_config(sink: W, config: WriterConfig) -> Writer<W> {
        let indenter: Option<Box<dyn Indenter>> = if config.perform_indent {
            Some(Box::new(StandardIndenter::with_indent_string(config.indent_string.clone())))
        } else {
            None
        };
        Writer {
            printer: Printer::new(sink, config.buffer_size),
            frames: Vec::with_capacity(INITIAL_DEPTH),
            names: String::with_capacity(INITIAL_NAMES),
            namespaces: Vec::with_capacity(INITIAL_DEPTH),
            encoding: Cow::Borrowed("UTF-8"),
            last: Event::default(),
            indenter,
            config,
        }
    }

    /// Replaces the indentation strategy.
    pub fn set_indenter<I: Indenter + 'static>(&mut self, indenter: I) {
        self.indenter = Some(Box::new(indenter));
    }

    /// Turns indentation off.
    pub fn clear_indenter(&mut self) {
        self.indenter = None;
    }

    #[inline]
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// The encoding name written into document declarations.
    #[inline]
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Returns the number of started nodes on the stack.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns the most recent node state transition.
    #[inline]
    pub fn last_event(&self) -> Event {
        self.last
    }

    /// Writes any buffered output to the sink and flushes it.
    pub fn flush(&mut self) -> Result<()> {
        self.printer.flush()
    }

    /// Returns the sink. Output still sitting in the buffer is not visible here.
    #[inline]
    pub fn get_ref(&self) -> &W {
        self.printer.get_ref()
    }

    /// Flushes the buffer and returns the sink.
    pub fn into_inner(self) -> Result<W> {
        self.printer.into_inner()
    }

    // {{{ generic api

    /// Starts a node which can have children and pushes it onto the stack.
    pub fn start<'a, N: Into<StartNode<'a>>>(&mut self, node: N) -> Result<()> {
        match node.into() {
            StartNode::CData(cdata) => self.open_cdata(&cdata),
            StartNode::Comment(comment) => self.open_comment(&comment, false),
            StartNode::DocType(dtd) => self.open_doctype(&dtd),
            StartNode::Document(doc) => self.open_document(&doc),
            StartNode::DtdAttList(list) => self.open_dtd_att_list(&list),
            StartNode::Element(elem) => self.open_element(&elem),
        }
    }

    /// Writes a complete node. Nodes which can have children are started and
    /// ended straight away.
    pub fn write<'a, N: Into<Node<'a>>>(&mut self, node: N) -> Result<()> {
        self.write_node(&node.into())
    }

    /// Starts `start`, writes `children` into it and ends it.
    pub fn block<'a, S: Into<StartNode<'a>>>(&mut self, start: S, children: &[Node<'_>]) -> Result<()> {
        let start = start.into();
        let kind = start.kind();
        self.start(start)?;
        for child in children {
            self.write_node(child)?;
        }
        self.end(kind)
    }

    /// Makes sure the current node is opened, so that the next node lands
    /// after its start tag.
    ///
    /// Every node except raw output calls this before it is written, so it
    /// is only needed to terminate a start tag before writing raw output.
    pub fn next(&mut self) -> Result<()> {
        let open = match self.frames.last_mut() {
            Some(top) => {
                top.children += 1;
                top.state == NodeState::Open
            }
            None => false,
        };
        if open {
            self.opened()?;
        }
        Ok(())
    }

    fn write_node(&mut self, node: &Node<'_>) -> Result<()> {
        match *node {
            Node::Attribute(ref attr) => self.emit_attribute(attr),
            Node::CData(ref cdata) => {
                self.open_cdata(cdata)?;
                self.pop(Some(NodeKind::CData))
            }
            Node::CDataContent(CDataContent(content)) => self.emit_cdata_content(content),
            Node::Comment(ref comment) => {
                self.open_comment(comment, true)?;
                self.pop(Some(NodeKind::Comment))
            }
            Node::CommentContent(CommentContent(content)) => self.emit_comment_content(content),
            Node::DocType(ref dtd) => {
                self.open_doctype(dtd)?;
                self.pop(Some(NodeKind::DocType))
            }
            Node::DtdAttList(ref list) => {
                self.open_dtd_att_list(list)?;
                self.pop(Some(NodeKind::DtdAttList))
            }
            Node::DtdAttr(ref attr) => self.emit_dtd_attr(attr),
            Node::DtdElement(ref elem) => self.emit_dtd_element(elem),
            Node::DtdEntity(ref entity) => self.emit_dtd_entity(entity),
            Node::Element(ref elem) => {
                self.open_element(elem)?;
                self.pop(Some(NodeKind::Element))
            }
            Node::Notation(ref notation) => self.emit_notation(notation),
            Node::ProcessingInstruction(ref pi) => self.emit_pi(pi),
            Node::Raw(Raw(raw)) => self.emit_raw(raw),
            Node::Text(Text(text)) => self.emit_text(text),
        }
    }

    // }}}

    // {{{ typed start methods

    pub fn start_document(&mut self, doc: Document<'_>) -> Result<()> {
        self.open_document(&doc)
    }

    pub fn start_doctype(&mut self, dtd: DocType<'_>) -> Result<()> {
        self.open_doctype(&dtd)
    }

    pub fn start_dtd_att_list(&mut self, list: DtdAttList<'_>) -> Result<()> {
        self.open_dtd_att_list(&list)
    }

    pub fn start_element(&mut self, elem: Element<'_>) -> Result<()> {
        self.open_element(&elem)
    }

    /// Starts a comment; add to it with [`Writer::write_comment_content()`].
    pub fn start_comment(&mut self, comment: Comment<'_>) -> Result<()> {
        self.open_comment(&comment, false)
    }

    /// Starts a CDATA section; add to it with [`Writer::write_cdata_content()`].
    pub fn start_cdata(&mut self, cdata: CData<'_>) -> Result<()> {
        self.open_cdata(&cdata)
    }

    // }}}

    // {{{ typed write methods

    /// Writes a complete element, including its attributes and content.
    pub fn write_element(&mut self, elem: Element<'_>) -> Result<()> {
        self.open_element(&elem)?;
        self.pop(Some(NodeKind::Element))
    }

    pub fn write_attribute(&mut self, attr: Attribute<'_>) -> Result<()> {
        self.emit_attribute(&attr)
    }

    pub fn write_attributes(&mut self, attrs: &[Attribute<'_>]) -> Result<()> {
        for attr in attrs {
            self.emit_attribute(attr)?;
        }
        Ok(())
    }

    pub fn write_comment(&mut self, comment: Comment<'_>) -> Result<()> {
        self.open_comment(&comment, true)?;
        self.pop(Some(NodeKind::Comment))
    }

    pub fn write_cdata(&mut self, cdata: CData<'_>) -> Result<()> {
        self.open_cdata(&cdata)?;
        self.pop(Some(NodeKind::CData))
    }

    pub fn write_dtd_att_list(&mut self, list: DtdAttList<'_>) -> Result<()> {
        self.open_dtd_att_list(&list)?;
        self.pop(Some(NodeKind::DtdAttList))
    }

    pub fn write_dtd_attr(&mut self, attr: DtdAttr<'_>) -> Result<()> {
        self.emit_dtd_attr(&attr)
    }

    pub fn write_dtd_element(&mut self, elem: DtdElement<'_>) -> Result<()> {
        self.emit_dtd_element(&elem)
    }

    pub fn write_dtd_entity(&mut self, entity: DtdEntity<'_>) -> Result<()> {
        self.emit_dtd_entity(&entity)
    }

    pub fn write_notation(&mut self, notation: Notation<'_>) -> Result<()> {
        self.emit_notation(&notation)
    }

    pub fn write_pi(&mut self, pi: ProcessingInstruction<'_>) -> Result<()> {
        self.emit_pi(&pi)
    }

    /// Writes character data, escaping it as needed.
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        self.emit_text(text)
    }

    /// Writes `raw` exactly as given. Raw output is never checked and does not
    /// open the current node, so it can be written inside a start tag.
    pub fn write_raw(&mut self, raw: &str) -> Result<()> {
        self.emit_raw(raw)
    }

    pub fn write_comment_content(&mut self, content: &str) -> Result<()> {
        self.emit_comment_content(content)
    }

    pub fn write_cdata_content(&mut self, content: &str) -> Result<()> {
        self.emit_cdata_content(content)
    }

    // }}}

    // {{{ end methods

    /// Ends the current node if it is of the given kind.
    pub fn end(&mut self, kind: NodeKind) -> Result<()> {
        self.pop(Some(kind))
    }

    /// Ends the current node if it is of the given kind and its name matches.
    ///
    /// Only elements, document type declarations and attribute lists have names;
    /// for elements only the local part is compared.
    pub fn end_named(&mut self, kind: NodeKind, name: &str) -> Result<()> {
        let top = self.frames.last().ok_or(StructureError::EmptyStack)?;
        let actual = match (kind, top.data) {
            (NodeKind::Element, FrameData::Element { name: span, .. })
            | (NodeKind::DocType, FrameData::DocType { name: span })
            | (NodeKind::DtdAttList, FrameData::DtdAttList { name: span }) => span.get(&self.names),
            (NodeKind::Element, _) | (NodeKind::DocType, _) | (NodeKind::DtdAttList, _) => {
                return self.pop(Some(kind));
            }
            _ => return Err(StructureError::Unnamed { kind }.into()),
        };
        if actual != name {
            return Err(StructureError::NameMismatch {
                kind,
                actual: actual.to_owned(),
                expected: name.to_owned(),
            }
            .into());
        }
        self.pop(Some(kind))
    }

    /// Ends the current element if both its prefix and its name match.
    pub fn end_qualified(&mut self, kind: NodeKind, prefix: &str, name: &str) -> Result<()> {
        if kind != NodeKind::Element {
            return Err(StructureError::Unnamed { kind }.into());
        }
        let top = self.frames.last().ok_or(StructureError::EmptyStack)?;
        if let FrameData::Element { prefix: p, name: n, .. } = top.data {
            let (actual_prefix, actual_name) = (p.get(&self.names), n.get(&self.names));
            if actual_prefix != prefix || actual_name != name {
                return Err(StructureError::NameMismatch {
                    kind,
                    actual: qualified(actual_prefix, actual_name),
                    expected: qualified(prefix, name),
                }
                .into());
            }
        }
        self.pop(Some(kind))
    }

    /// Ends the current node, whatever it is.
    pub fn end_any(&mut self) -> Result<()> {
        self.pop(None)
    }

    /// Ends every node on the stack.
    pub fn end_all(&mut self) -> Result<()> {
        while !self.frames.is_empty() {
            self.pop(None)?;
        }
        Ok(())
    }

    /// Ends every node on the stack and flushes the output.
    pub fn end_all_flush(&mut self) -> Result<()> {
        self.end_all()?;
        self.flush()
    }

    /// Ends every node above the bottom one, which must be a document, then
    /// the document itself.
    pub fn end_doc(&mut self) -> Result<()> {
        while self.frames.len() > 1 {
            self.pop(None)?;
        }
        self.pop(Some(NodeKind::Document))
    }

    /// Ends nodes until `depth + 1` are left, then ends the top one if it is of
    /// the given kind.
    ///
    /// Useful to make sure everything started inside a scope gets closed:
    ///
    /// ```rust
    /// use xmlwriter::{Element, NodeKind, Writer};
    ///
    /// let mut w = Writer::new(Vec::new());
    /// w.start(Element::new("outer")).unwrap();
    ///
    /// let depth = w.depth();
    /// w.start(Element::new("inner")).unwrap();
    /// w.start(Element::new("deeper")).unwrap();
    /// w.end_to_depth(depth, NodeKind::Element).unwrap();
    ///
    /// assert_eq!(w.depth(), depth);
    /// ```
    pub fn end_to_depth(&mut self, depth: usize, kind: NodeKind) -> Result<()> {
        self.unwind_to(depth)?;
        self.pop(Some(kind))
    }

    /// Same as [`Writer::end_to_depth()`], but the last node's name must match too.
    pub fn end_to_depth_named(&mut self, depth: usize, kind: NodeKind, name: &str) -> Result<()> {
        self.unwind_to(depth)?;
        self.end_named(kind, name)
    }

    fn unwind_to(&mut self, depth: usize) -> Result<()> {
        while self.frames.len() > depth + 1 {
            self.pop(None)?;
        }
        Ok(())
    }

    pub fn end_document(&mut self) -> Result<()> {
        self.pop(Some(NodeKind::Document))
    }

    pub fn end_doctype(&mut self) -> Result<()> {
        self.pop(Some(NodeKind::DocType))
    }

    pub fn end_dtd_att_list(&mut self) -> Result<()> {
        self.pop(Some(NodeKind::DtdAttList))
    }

    /// Ends the current element, as `<elem/>` if nothing was written into it.
    pub fn end_element(&mut self) -> Result<()> {
        self.pop(Some(NodeKind::Element))
    }

    /// Ends the current element, as `<elem></elem>` even if it is empty.
    pub fn end_element_full(&mut self) -> Result<()> {
        if let Some(top) = self.frames.last_mut() {
            if let FrameData::Element { ref mut full, .. } = top.data {
                *full = true;
            }
        }
        self.pop(Some(NodeKind::Element))
    }

    pub fn end_comment(&mut self) -> Result<()> {
        self.pop(Some(NodeKind::Comment))
    }

    pub fn end_cdata(&mut self) -> Result<()> {
        self.pop(Some(NodeKind::CData))
    }

    // }}}

    // {{{ stack machinery

    #[inline]
    fn validating(&self) -> bool {
        self.config.perform_validation
    }

    #[inline]
    fn top_kind(&self) -> NodeKind {
        self.frames.last().map_or(NodeKind::None, Frame::kind)
    }

    fn check_parent(&self, kind: NodeKind) -> Result<()> {
        let actual = self.top_kind();
        let expected = kind.parents();
        if expected.allows(actual) {
            Ok(())
        } else {
            Err(StructureError::UnexpectedKind { actual, expected }.into())
        }
    }

    fn indent(&mut self, next: Event) -> Result<()> {
        if let Some(ref mut indenter) = self.indenter {
            let mut out = PrinterOutput {
                printer: &mut self.printer,
                line_separator: &*self.config.line_separator,
            };
            indenter.indent(&mut out, self.last, next)?;
        }
        Ok(())
    }

    /// Pushes a new frame in the open state. `mark` is the arena length before
    /// the frame interned its strings.
    fn push(&mut self, data: FrameData, mark: usize) -> Result<()> {
        let frame = Frame::new(mark, self.namespaces.len(), data);
        let event = frame.event();
        self.frames.push(frame);
        trace!("started {} at depth {}", event.kind, self.frames.len());
        self.indent(event)?;
        self.last = event;
        Ok(())
    }

    /// Moves the top frame from open to opened and writes whatever terminates
    /// its start.
    fn opened(&mut self) -> Result<()> {
        let (data, event) = match self.frames.last_mut() {
            Some(top) => {
                top.state = NodeState::Opened;
                (top.data, top.event())
            }
            None => return Err(StructureError::EmptyStack.into()),
        };
        self.indent(event)?;

        match data {
            FrameData::Element { full, .. } => {
                self.write_pending_namespaces()?;
                if event.children == 0 && !full {
                    self.printer.write_str("/>")?;
                } else {
                    self.printer.write_byte(b'>')?;
                }
            }
            FrameData::DocType { .. } if event.children > 0 => self.printer.write_str(" [")?,
            FrameData::Comment { pending, .. } if !pending.is_empty() => {
                self.emit_pending(NodeKind::CommentContent, pending)?
            }
            FrameData::CData { pending, .. } if !pending.is_empty() => self.emit_pending(NodeKind::CDataContent, pending)?,
            _ => {}
        }

        if let Some(top) = self.frames.last() {
            self.last = top.event();
        }
        Ok(())
    }

    /// Ends the top frame, if it is of the `expected` kind, and pops it.
    fn pop(&mut self, expected: Option<NodeKind>) -> Result<()> {
        let (kind, prev) = match self.frames.last() {
            Some(top) => (top.kind(), top.state),
            None => return Err(StructureError::EmptyStack.into()),
        };
        if let Some(expected) = expected {
            if kind != expected {
                return Err(StructureError::UnexpectedKind { actual: kind, expected: expected.flag() }.into());
            }
        }
        let dangling_dash = matches!(
            self.frames.last().map(|f| f.data),
            Some(FrameData::Comment { dash: true, .. })
        );
        if self.validating() && dangling_dash {
            return Err(ContentError::CommentEndsWithHyphen.into());
        }

        if prev == NodeState::Open {
            self.opened()?;
        }
        let (data, event) = match self.frames.last_mut() {
            Some(top) => {
                top.state = NodeState::Ended;
                (top.data, top.event())
            }
            None => return Err(StructureError::EmptyStack.into()),
        };
        self.indent(event)?;

        match data {
            FrameData::Document => {}
            FrameData::DocType { .. } => self.printer.write_str(if event.children > 0 { "]>" } else { ">" })?,
            FrameData::DtdAttList { .. } => self.printer.write_byte(b'>')?,
            FrameData::Element { prefix, name, full } => {
                // an element still open when ending was closed with "/>" already
                if prev != NodeState::Open || full || event.children > 0 {
                    self.printer.write_str("</")?;
                    self.printer.write_qualified_name(prefix.get(&self.names), name.get(&self.names))?;
                    self.printer.write_byte(b'>')?;
                }
            }
            FrameData::Comment { .. } => self.printer.write_str("-->")?,
            FrameData::CData { .. } => self.printer.write_str("]]>")?,
        }
        self.last = event;

        if let Some(frame) = self.frames.pop() {
            self.names.truncate(frame.mark);
            self.namespaces.truncate(frame.ns_start);
        }
        trace!("ended {} at depth {}", kind, self.frames.len());
        self.printer.cached_error()
    }

    /// Advances the parent and announces a leaf node.
    fn begin_next(&mut self, kind: NodeKind) -> Result<()> {
        self.next()?;
        self.begin_current(kind)
    }

    /// Announces a leaf node without advancing the parent.
    fn begin_current(&mut self, kind: NodeKind) -> Result<()> {
        self.indent(Event::new(NodeState::Open, kind, 0))?;
        self.last = Event::new(NodeState::Ended, kind, 0);
        Ok(())
    }

    /// Writes content which was handed to a comment or CDATA start.
    fn emit_pending(&mut self, kind: NodeKind, pending: Span) -> Result<()> {
        self.begin_next(kind)?;
        let content = pending.get(&self.names);
        match self.indenter {
            Some(ref mut indenter) if kind == NodeKind::CommentContent => {
                let wrapped = indenter.wrap(content);
                self.printer.write_str(&wrapped)
            }
            _ => self.printer.write_str(content),
        }
    }

    fn write_pending_namespaces(&mut self) -> Result<()> {
        let start = match self.frames.last() {
            Some(top) => top.ns_start,
            None => return Ok(()),
        };
        for binding in self.namespaces[start..].iter_mut().filter(|b| !b.written) {
            self.printer.print_namespace(binding.prefix.get(&self.names), binding.uri.get(&self.names))?;
            binding.written = true;
        }
        Ok(())
    }

    /// Whether `prefix` still has to be bound to `uri` on the top element.
    fn needs_binding(&self, prefix: &str, uri: &str) -> Result<bool> {
        let start = self.frames.last().map_or(self.namespaces.len(), |f| f.ns_start);
        let existing = self.namespaces[start..].iter().find(|b| b.prefix.get(&self.names) == prefix);
        match existing {
            Some(b) if b.uri.get(&self.names) != uri => {
                Err(StructureError::NamespaceConflict { prefix: prefix.to_owned() }.into())
            }
            Some(_) => Ok(false),
            None => Ok(true),
        }
    }

    /// The tail of the content written into the top comment (`-`) or CDATA
    /// section (`]` count).
    fn content_tail(&self) -> (bool, u8) {
        match self.frames.last().map(|f| f.data) {
            Some(FrameData::Comment { dash, .. }) => (dash, 0),
            Some(FrameData::CData { brackets, .. }) => (false, brackets),
            _ => (false, 0),
        }
    }

    /// Records the tail of a fragment written into the top comment or CDATA section.
    fn extend_tail(&mut self, content: &str) {
        if content.is_empty() {
            return;
        }
        if let Some(top) = self.frames.last_mut() {
            match top.data {
                FrameData::Comment { ref mut dash, .. } => *dash = content.ends_with('-'),
                FrameData::CData { ref mut brackets, .. } => *brackets = trailing_brackets(*brackets, content),
                _ => {}
            }
        }
    }

    // }}}

    // {{{ nestable nodes

    fn open_document(&mut self, doc: &Document<'_>) -> Result<()> {
        if self.validating() {
            self.check_parent(NodeKind::Document)?;
            if !doc.suppress_encoding {
                check_encoding(doc.encoding.unwrap_or(&*self.encoding))?;
            }
        }
        self.next()?;
        let mark = self.names.len();
        self.push(FrameData::Document, mark)?;

        self.printer.write_str("<?xml")?;
        let mut bare = true;
        if !doc.suppress_version {
            let version = match doc.version {
                Some(version) => version,
                None if self.config.version.is_empty() => "1.0",
                None => &*self.config.version,
            };
            self.printer.print_attr("version", version)?;
            bare = false;
        }
        if !doc.suppress_encoding {
            let encoding = doc.encoding.unwrap_or(&*self.encoding);
            if !encoding.is_empty() {
                self.printer.print_attr("encoding", encoding)?;
                bare = false;
            }
        }
        if let Some(standalone) = doc.standalone {
            self.printer.print_attr("standalone", if standalone { "yes" } else { "no" })?;
            bare = false;
        }
        if bare {
            self.printer.write_byte(b' ')?;
        }
        self.printer.write_str("?>")?;
        self.printer.write_str(&self.config.line_separator)
    }

    fn open_doctype(&mut self, dtd: &DocType<'_>) -> Result<()> {
        if self.validating() {
            self.check_parent(NodeKind::DocType)?;
            require(dtd.name, "doctype name")?;
            check_name(dtd.name)?;
            check_external_id(dtd.public_id, dtd.system_id, false)?;
        }
        self.next()?;
        let mark = self.names.len();
        let name = Span::intern(&mut self.names, dtd.name);
        self.push(FrameData::DocType { name }, mark)?;

        self.printer.write_str("<!DOCTYPE ")?;
        self.printer.write_str(dtd.name)?;
        if !dtd.public_id.is_empty() || !dtd.system_id.is_empty() {
            self.printer.write_byte(b' ')?;
            self.printer.write_external_id(dtd.public_id, dtd.system_id)?;
        }
        Ok(())
    }

    fn open_dtd_att_list(&mut self, list: &DtdAttList<'_>) -> Result<()> {
        if self.validating() {
            self.check_parent(NodeKind::DtdAttList)?;
            require(list.name, "attlist name")?;
            check_name(list.name)?;
        }
        self.next()?;
        let mark = self.names.len();
        let name = Span::intern(&mut self.names, list.name);
        self.push(FrameData::DtdAttList { name }, mark)?;

        self.printer.write_str("<!ATTLIST ")?;
        self.printer.write_str(list.name)?;
        for attr in list.attrs {
            self.emit_dtd_attr(attr)?;
        }
        Ok(())
    }

    fn open_element(&mut self, elem: &Element<'_>) -> Result<()> {
        if self.validating() {
            self.check_parent(NodeKind::Element)?;
            require(elem.name, "element name")?;
            check_qualified_name(elem.prefix, elem.name)?;
        }
        self.next()?;
        let mark = self.names.len();
        let prefix = Span::intern(&mut self.names, elem.prefix);
        let name = Span::intern(&mut self.names, elem.name);
        self.push(FrameData::Element { prefix, name, full: elem.full }, mark)?;

        self.printer.write_byte(b'<')?;
        self.printer.write_qualified_name(elem.prefix, elem.name)?;
        if !elem.uri.is_empty() {
            let uri = Span::intern(&mut self.names, elem.uri);
            self.namespaces.push(Binding { prefix, uri, written: true });
            self.printer.print_namespace(elem.prefix, elem.uri)?;
        }

        for attr in elem.attrs {
            self.emit_attribute(attr)?;
        }
        for child in elem.content {
            self.write_node(child)?;
        }
        Ok(())
    }

    /// `whole` is set when nothing can follow the initial content.
    fn open_comment(&mut self, comment: &Comment<'_>, whole: bool) -> Result<()> {
        if self.validating() {
            self.check_parent(NodeKind::Comment)?;
            check_comment(comment.content, self.config.strict_chars)?;
            if whole && comment.content.ends_with('-') {
                return Err(ContentError::CommentEndsWithHyphen.into());
            }
        }
        self.next()?;
        let mark = self.names.len();
        let pending = Span::intern(&mut self.names, comment.content);
        let dash = comment.content.ends_with('-');
        self.push(FrameData::Comment { pending, dash }, mark)?;
        self.printer.write_str("<!--")
    }

    fn open_cdata(&mut self, cdata: &CData<'_>) -> Result<()> {
        if self.validating() {
            self.check_parent(NodeKind::CData)?;
            check_cdata(cdata.content, self.config.strict_chars)?;
        }
        self.next()?;
        let mark = self.names.len();
        let pending = Span::intern(&mut self.names, cdata.content);
        let brackets = trailing_brackets(0, cdata.content);
        self.push(FrameData::CData { pending, brackets }, mark)?;
        self.printer.write_str("<![CDATA[")
    }

    // }}}

    // {{{ leaf nodes

    fn emit_attribute(&mut self, attr: &Attribute<'_>) -> Result<()> {
        if self.validating() {
            self.check_parent(NodeKind::Attribute)?;
            require(attr.name, "attribute name")?;
            check_qualified_name(attr.prefix, attr.name)?;
            if self.frames.last().map_or(false, |top| top.state != NodeState::Open) {
                return Err(StructureError::AttributeAfterStartTag.into());
            }
            if !attr.uri.is_empty() && attr.prefix.is_empty() {
                return Err(StructureError::UnprefixedNamespace { name: attr.name.to_owned() }.into());
            }
        }
        // unprefixed attributes never bind a namespace
        let bind = !attr.uri.is_empty()
            && !attr.prefix.is_empty()
            && self.top_kind() == NodeKind::Element
            && self.needs_binding(attr.prefix, attr.uri)?;

        self.indent(Event::new(NodeState::Open, NodeKind::Attribute, 0))?;
        if bind {
            let prefix = Span::intern(&mut self.names, attr.prefix);
            let uri = Span::intern(&mut self.names, attr.uri);
            self.namespaces.push(Binding { prefix, uri, written: false });
        }
        self.printer.print_qualified_attr(attr.prefix, attr.name, &attr.value)?;
        self.last = Event::new(NodeState::Ended, NodeKind::Attribute, 0);
        Ok(())
    }

    fn emit_text(&mut self, text: &str) -> Result<()> {
        if self.validating() {
            self.check_parent(NodeKind::Text)?;
        }
        self.begin_next(NodeKind::Text)?;
        match self.indenter {
            Some(ref mut indenter) => {
                let wrapped = indenter.wrap(text);
                self.printer.escape_text(&wrapped)
            }
            None => self.printer.escape_text(text),
        }
    }

    fn emit_raw(&mut self, raw: &str) -> Result<()> {
        self.begin_current(NodeKind::Raw)?;
        self.printer.write_str(raw)
    }

    fn emit_comment_content(&mut self, content: &str) -> Result<()> {
        if self.validating() {
            self.check_parent(NodeKind::CommentContent)?;
            check_comment(content, self.config.strict_chars)?;
            if self.content_tail().0 && content.starts_with('-') {
                return Err(ContentError::ForbiddenSequence { context: "comment", sequence: "--" }.into());
            }
        }
        self.begin_next(NodeKind::CommentContent)?;
        self.extend_tail(content);
        match self.indenter {
            Some(ref mut indenter) => {
                let wrapped = indenter.wrap(content);
                self.printer.write_str(&wrapped)
            }
            None => self.printer.write_str(content),
        }
    }

    fn emit_cdata_content(&mut self, content: &str) -> Result<()> {
        if self.validating() {
            self.check_parent(NodeKind::CDataContent)?;
            check_cdata(content, self.config.strict_chars)?;
            check_cdata_join(self.content_tail().1, content)?;
        }
        self.begin_next(NodeKind::CDataContent)?;
        self.extend_tail(content);
        self.printer.write_str(content)
    }

    fn emit_pi(&mut self, pi: &ProcessingInstruction<'_>) -> Result<()> {
        if self.validating() {
            self.check_parent(NodeKind::ProcessingInstruction)?;
            require(pi.target, "processing instruction target")?;
            check_name(pi.target)?;
            if pi.target.eq_ignore_ascii_case("xml") {
                return Err(ContentError::ReservedTarget.into());
            }
            if pi.content.contains("?>") {
                return Err(ContentError::ForbiddenSequence {
                    context: "processing instruction content",
                    sequence: "?>",
                }
                .into());
            }
        }
        self.begin_next(NodeKind::ProcessingInstruction)?;
        self.printer.write_str("<?")?;
        self.printer.write_str(pi.target)?;
        if !pi.content.is_empty() {
            self.printer.write_byte(b' ')?;
            self.printer.write_str(pi.content)?;
        }
        self.printer.write_str("?>")
    }

    fn emit_notation(&mut self, notation: &Notation<'_>) -> Result<()> {
        if self.validating() {
            self.check_parent(NodeKind::Notation)?;
            require(notation.name, "notation name")?;
            check_name(notation.name)?;
            if notation.public_id.is_empty() && notation.system_id.is_empty() {
                return Err(ContentError::MissingExternalId { context: "notation" }.into());
            }
            check_external_id(notation.public_id, notation.system_id, true)?;
        }
        self.begin_next(NodeKind::Notation)?;
        self.printer.write_str("<!NOTATION ")?;
        self.printer.write_str(notation.name)?;
        self.printer.write_byte(b' ')?;
        self.printer.write_external_id(notation.public_id, notation.system_id)?;
        self.printer.write_byte(b'>')
    }

    fn emit_dtd_element(&mut self, elem: &DtdElement<'_>) -> Result<()> {
        if self.validating() {
            self.check_parent(NodeKind::DtdElement)?;
            require(elem.name, "element name")?;
            require(elem.decl, "element decl")?;
            check_name(elem.name)?;
        }
        self.begin_next(NodeKind::DtdElement)?;
        self.printer.write_str("<!ELEMENT ")?;
        self.printer.write_str(elem.name)?;
        self.printer.write_byte(b' ')?;
        self.printer.write_str(elem.decl)?;
        self.printer.write_byte(b'>')
    }

    fn emit_dtd_entity(&mut self, entity: &DtdEntity<'_>) -> Result<()> {
        let external = !entity.public_id.is_empty() || !entity.system_id.is_empty();
        if self.validating() {
            self.check_parent(NodeKind::DtdEntity)?;
            require(entity.name, "entity name")?;
            check_name(entity.name)?;
            if external {
                if !entity.content.is_empty() {
                    return Err(ContentError::Conflicting { first: "external ID", second: "content" }.into());
                }
                check_external_id(entity.public_id, entity.system_id, false)?;
                if !entity.ndata.is_empty() {
                    if entity.parameter {
                        return Err(ContentError::Conflicting { first: "parameter entity", second: "NDATA" }.into());
                    }
                    check_name(entity.ndata)?;
                }
            } else {
                if !entity.ndata.is_empty() {
                    return Err(ContentError::MissingExternalId { context: "NDATA" }.into());
                }
                check_literal(entity.content, "entity value")?;
            }
        }

        self.begin_next(NodeKind::DtdEntity)?;
        self.printer.write_str("<!ENTITY ")?;
        if entity.parameter {
            self.printer.write_str("% ")?;
        }
        self.printer.write_str(entity.name)?;
        self.printer.write_byte(b' ')?;
        if external {
            self.printer.write_external_id(entity.public_id, entity.system_id)?;
            if !entity.ndata.is_empty() {
                self.printer.write_str(" NDATA ")?;
                self.printer.write_str(entity.ndata)?;
            }
        } else {
            self.printer.write_entity_value(entity.content)?;
        }
        self.printer.write_byte(b'>')
    }

    fn emit_dtd_attr(&mut self, attr: &DtdAttr<'_>) -> Result<()> {
        if self.validating() {
            self.check_parent(NodeKind::DtdAttr)?;
            require(attr.name, "attribute name")?;
            require(attr.ty.as_str(), "attribute type")?;
            check_name(attr.name)?;
        }
        self.begin_next(NodeKind::DtdAttr)?;

        // written with a leading space even outside of an attribute list
        self.printer.write_byte(b' ')?;
        self.printer.write_str(attr.name)?;
        self.printer.write_byte(b' ')?;
        self.printer.write_str(attr.ty.as_str())?;
        self.printer.write_byte(b' ')?;
        match attr.default {
            DtdAttrDefault::Inferred("") | DtdAttrDefault::Implied => self.printer.write_str("#IMPLIED"),
            DtdAttrDefault::Required => self.printer.write_str("#REQUIRED"),
            DtdAttrDefault::Inferred(value) | DtdAttrDefault::Default(value) => self.write_quoted_attr(value),
            DtdAttrDefault::Fixed(value) => {
                self.printer.write_str("#FIXED ")?;
                self.write_quoted_attr(value)
            }
        }
    }

    fn write_quoted_attr(&mut self, value: &str) -> Result<()> {
        self.printer.write_byte(b'"')?;
        self.printer.escape_attr(value)?;
        self.printer.write_byte(b'"')
    }

    // }}}
}

impl<W: Write> Writer<EncodingWriter<W>> {
    /// Creates a writer which transcodes its output to the encoding named by
    /// `label`, and declares that name in document declarations.
    ///
    /// Characters the encoding cannot represent are written as numeric
    /// character references.
    pub fn new_with_encoding(sink: W, label: &str, config: WriterConfig) -> Result<Writer<EncodingWriter<W>>> {
        let sink = EncodingWriter::new(sink, label)?;
        let mut writer = Writer::new_with_config(sink, config);
        writer.encoding = Cow::Owned(label.to_owned());
        Ok(writer)
    }
}

fn require(value: &str, field: &'static str) -> StdResult<(), ContentError> {
    if value.is_empty() {
        Err(ContentError::EmptyField { field })
    } else {
        Ok(())
    }
}

/// A literal can be quoted with whichever quote it does not contain, but not both.
fn check_literal(literal: &str, context: &'static str) -> StdResult<(), ContentError> {
    if literal.contains('"') && literal.contains('\'') {
        Err(ContentError::AmbiguousQuotes { context })
    } else {
        Ok(())
    }
}

fn check_external_id(public_id: &str, system_id: &str, public_only: bool) -> StdResult<(), ContentError> {
    if !public_id.is_empty() {
        if system_id.is_empty() && !public_only {
            return Err(ContentError::MissingSystemId);
        }
        check_pub_id(public_id)?;
    }
    check_literal(system_id, "system ID")
}

fn check_comment(content: &str, strict: bool) -> StdResult<(), ContentError> {
    if content.contains("--") {
        return Err(ContentError::ForbiddenSequence { context: "comment", sequence: "--" });
    }
    check_chars(content, strict)
}

fn check_cdata(content: &str, strict: bool) -> StdResult<(), ContentError> {
    if content.contains("]]>") {
        return Err(ContentError::ForbiddenSequence { context: "cdata", sequence: "]]>" });
    }
    check_chars(content, strict)
}

/// Rejects a CDATA fragment which would complete `]]>` with the `brackets`
/// trailing `]` written before it.
fn check_cdata_join(brackets: u8, content: &str) -> StdResult<(), ContentError> {
    let lead = content.bytes().take_while(|&b| b == b']').count();
    if brackets as usize + lead >= 2 && content.as_bytes().get(lead) == Some(&b'>') {
        Err(ContentError::ForbiddenSequence { context: "cdata", sequence: "]]>" })
    } else {
        Ok(())
    }
}

fn trailing_brackets(before: u8, content: &str) -> u8 {
    let trailing = content.bytes().rev().take_while(|&b| b == b']').count();
    let total = if trailing == content.len() { before as usize + trailing } else { trailing };
    total.min(2) as u8
}

fn qualified(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{}:{}", prefix, name)
    }
}
