#![forbid(non_camel_case_types)]
#![forbid(unsafe_code)]

//! A fast, forward-only streaming XML writer.
//!
//! Nodes are written as soon as they are handed over, through a small buffer,
//! and the writer only keeps the stack of nodes which are still open. It never
//! allocates once its buffers have warmed up, checks every node against the XML
//! productions before writing a byte of it, and can pretty-print its output or
//! transcode it to legacy encodings on the fly.
//!
//! ```rust
//! use xmlwriter::{Attribute, Element, Node, Writer, WriterConfig};
//!
//! let mut w = WriterConfig::new().perform_indent(true).create_writer(Vec::new());
//! w.write(
//!     Element::new("list")
//!         .attrs(&[Attribute::new("kind", "fruit")])
//!         .content(&[
//!             Node::from(Element::new("item").content(&[Node::from("apple")])),
//!             Node::from(Element::new("item").content(&[Node::from("pear")])),
//!         ]),
//! )
//! .unwrap();
//!
//! let out = w.into_inner().unwrap();
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "<list kind=\"fruit\">\n <item>apple</item>\n <item>pear</item>\n</list>"
//! );
//! ```

#[macro_use]
mod macros;

pub mod chars;
pub mod collector;
pub mod encoding;
pub mod escape;
pub mod writer;

pub use crate::collector::{CollectedError, ErrorCollector};
pub use crate::encoding::EncodingWriter;
pub use crate::writer::{
    Attribute, CData, CDataContent, Comment, CommentContent, ContentError, DocType, Document, DtdAttList, DtdAttr,
    DtdAttrDefault, DtdAttrType, DtdElement, DtdEntity, Element, Error, Event, IndentOutput, Indenter, Node,
    NodeFlags, NodeKind, NodeState, Notation, ProcessingInstruction, Raw, Result, StandardIndenter, StartNode,
    StructureError, Text, Writer, WriterConfig,
};
