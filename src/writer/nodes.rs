//! Node descriptors accepted by the writer.
//!
//! Descriptors only borrow their strings; nothing here allocates unless an
//! attribute value is built from a number.

use std::borrow::Cow;
use std::fmt;

use derive_more::From;

use crate::writer::node::NodeKind;

/// An attribute of an element.
///
/// A non-empty `uri` binds `prefix` on the owning element; the declaration is
/// written when the start tag is terminated.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Attribute<'a> {
    pub prefix: &'a str,
    pub uri: &'a str,
    pub name: &'a str,
    pub value: Cow<'a, str>,
}

impl<'a> Attribute<'a> {
    #[inline]
    pub fn new<V: Into<Cow<'a, str>>>(name: &'a str, value: V) -> Attribute<'a> {
        Attribute {
            name,
            value: value.into(),
            ..Attribute::default()
        }
    }

    #[inline]
    pub fn prefix(mut self, prefix: &'a str) -> Attribute<'a> {
        self.prefix = prefix;
        self
    }

    /// Sets the prefix and the namespace URI it is bound to.
    #[inline]
    pub fn namespace(mut self, prefix: &'a str, uri: &'a str) -> Attribute<'a> {
        self.prefix = prefix;
        self.uri = uri;
        self
    }

    #[inline]
    pub fn value<V: Into<Cow<'a, str>>>(mut self, value: V) -> Attribute<'a> {
        self.value = value.into();
        self
    }

    /// Sets the value to `true` or `false`.
    #[inline]
    pub fn bool(self, value: bool) -> Attribute<'a> {
        self.value(if value { "true" } else { "false" })
    }

    pub fn int<I: Into<i64>>(self, value: I) -> Attribute<'a> {
        self.value(value.into().to_string())
    }

    pub fn uint<U: Into<u64>>(self, value: U) -> Attribute<'a> {
        self.value(value.into().to_string())
    }

    /// Sets the value to the shortest representation which reads back as `value`.
    pub fn float(self, value: f64) -> Attribute<'a> {
        self.value(value.to_string())
    }

    pub fn float32(self, value: f32) -> Attribute<'a> {
        self.value(value.to_string())
    }
}

/// An element.
///
/// `attrs` are written straight after the name and `content` as soon as the
/// element is started, so both can be combined with further calls on the writer.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Element<'a> {
    pub prefix: &'a str,
    pub uri: &'a str,
    pub name: &'a str,
    pub attrs: &'a [Attribute<'a>],
    pub content: &'a [Node<'a>],
    /// Close with `<a></a>` even when empty.
    pub full: bool,
}

impl<'a> Element<'a> {
    #[inline]
    pub fn new(name: &'a str) -> Element<'a> {
        Element { name, ..Element::default() }
    }

    #[inline]
    pub fn prefix(mut self, prefix: &'a str) -> Element<'a> {
        self.prefix = prefix;
        self
    }

    /// Sets the prefix and declares its namespace URI on this element.
    #[inline]
    pub fn namespace(mut self, prefix: &'a str, uri: &'a str) -> Element<'a> {
        self.prefix = prefix;
        self.uri = uri;
        self
    }

    #[inline]
    pub fn attrs(mut self, attrs: &'a [Attribute<'a>]) -> Element<'a> {
        self.attrs = attrs;
        self
    }

    #[inline]
    pub fn content(mut self, content: &'a [Node<'a>]) -> Element<'a> {
        self.content = content;
        self
    }

    #[inline]
    pub fn full(mut self, full: bool) -> Element<'a> {
        self.full = full;
        self
    }
}

/// The XML declaration which starts a document.
///
/// ```text
/// Document::new()                        <?xml version="1.0" encoding="UTF-8"?>
/// Document::new().standalone(true)       <?xml version="1.0" encoding="UTF-8" standalone="yes"?>
/// Document::new().version("1.1")         <?xml version="1.1" encoding="UTF-8"?>
/// Document::new().suppress_version()
///     .suppress_encoding()               <?xml ?>
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Document<'a> {
    pub suppress_version: bool,
    /// Overrides the writer's configured version.
    pub version: Option<&'a str>,
    pub suppress_encoding: bool,
    /// Overrides the writer's encoding name.
    pub encoding: Option<&'a str>,
    /// If `None`, no `standalone` pseudo-attribute is written.
    pub standalone: Option<bool>,
}

impl<'a> Document<'a> {
    #[inline]
    pub fn new() -> Document<'a> {
        Document::default()
    }

    #[inline]
    pub fn suppress_version(mut self) -> Document<'a> {
        self.suppress_version = true;
        self
    }

    #[inline]
    pub fn version(mut self, version: &'a str) -> Document<'a> {
        self.version = Some(version);
        self
    }

    #[inline]
    pub fn suppress_encoding(mut self) -> Document<'a> {
        self.suppress_encoding = true;
        self
    }

    #[inline]
    pub fn encoding(mut self, encoding: &'a str) -> Document<'a> {
        self.encoding = Some(encoding);
        self
    }

    #[inline]
    pub fn standalone(mut self, standalone: bool) -> Document<'a> {
        self.standalone = Some(standalone);
        self
    }
}

/// A document type declaration, `<!DOCTYPE name ...>`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct DocType<'a> {
    pub name: &'a str,
    pub public_id: &'a str,
    pub system_id: &'a str,
}

impl<'a> DocType<'a> {
    #[inline]
    pub fn new(name: &'a str) -> DocType<'a> {
        DocType { name, ..DocType::default() }
    }

    #[inline]
    pub fn public_id(mut self, public_id: &'a str) -> DocType<'a> {
        self.public_id = public_id;
        self
    }

    #[inline]
    pub fn system_id(mut self, system_id: &'a str) -> DocType<'a> {
        self.system_id = system_id;
        self
    }
}

/// An attribute list declaration, `<!ATTLIST name ...>`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct DtdAttList<'a> {
    pub name: &'a str,
    pub attrs: &'a [DtdAttr<'a>],
}

impl<'a> DtdAttList<'a> {
    #[inline]
    pub fn new(name: &'a str) -> DtdAttList<'a> {
        DtdAttList { name, attrs: &[] }
    }

    #[inline]
    pub fn attrs(mut self, attrs: &'a [DtdAttr<'a>]) -> DtdAttList<'a> {
        self.attrs = attrs;
        self
    }
}

/// The declared type of an attribute in an attribute list.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum DtdAttrType<'a> {
    #[default]
    CData,
    Id,
    IdRef,
    IdRefs,
    Entity,
    Entities,
    NmToken,
    NmTokens,
    /// Written verbatim, e.g. an enumeration like `(yes|no)`.
    Other(&'a str),
}

impl<'a> DtdAttrType<'a> {
    pub fn as_str(&self) -> &'a str {
        match *self {
            DtdAttrType::CData => "CDATA",
            DtdAttrType::Id => "ID",
            DtdAttrType::IdRef => "IDREF",
            DtdAttrType::IdRefs => "IDREFS",
            DtdAttrType::Entity => "ENTITY",
            DtdAttrType::Entities => "ENTITIES",
            DtdAttrType::NmToken => "NMTOKEN",
            DtdAttrType::NmTokens => "NMTOKENS",
            DtdAttrType::Other(s) => s,
        }
    }
}

impl<'a> fmt::Display for DtdAttrType<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The default declaration of an attribute in an attribute list.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DtdAttrDefault<'a> {
    /// `#IMPLIED` if the value is empty, otherwise the quoted value.
    Inferred(&'a str),
    /// A quoted default value.
    Default(&'a str),
    /// `#REQUIRED`
    Required,
    /// `#IMPLIED`
    Implied,
    /// `#FIXED` and a quoted value.
    Fixed(&'a str),
}

impl<'a> Default for DtdAttrDefault<'a> {
    fn default() -> DtdAttrDefault<'a> {
        DtdAttrDefault::Inferred("")
    }
}

/// A single attribute definition, ` name TYPE DEFAULT`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct DtdAttr<'a> {
    pub name: &'a str,
    pub ty: DtdAttrType<'a>,
    pub default: DtdAttrDefault<'a>,
}

impl<'a> DtdAttr<'a> {
    #[inline]
    pub fn new(name: &'a str, ty: DtdAttrType<'a>) -> DtdAttr<'a> {
        DtdAttr { name, ty, default: DtdAttrDefault::default() }
    }

    #[inline]
    pub fn default_decl(mut self, default: DtdAttrDefault<'a>) -> DtdAttr<'a> {
        self.default = default;
        self
    }
}

/// An element type declaration, `<!ELEMENT name decl>`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct DtdElement<'a> {
    pub name: &'a str,
    pub decl: &'a str,
}

impl<'a> DtdElement<'a> {
    pub const EMPTY: &'static str = "EMPTY";
    pub const ANY: &'static str = "ANY";
    pub const PCDATA: &'static str = "(#PCDATA)";

    #[inline]
    pub fn new(name: &'a str, decl: &'a str) -> DtdElement<'a> {
        DtdElement { name, decl }
    }
}

/// An entity declaration.
///
/// ```text
/// DtdEntity::new("hi").content("yep")                     <!ENTITY hi "yep">
/// DtdEntity::new("hi").system_id("sys").parameter(true)   <!ENTITY % hi SYSTEM "sys">
/// DtdEntity::new("hi").public_id("pub").system_id("sys")
///     .ndata("nd")                                        <!ENTITY hi PUBLIC "pub" "sys" NDATA nd>
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct DtdEntity<'a> {
    pub name: &'a str,
    pub content: &'a str,
    /// Declares a parameter entity, `<!ENTITY % name ...>`.
    pub parameter: bool,
    pub public_id: &'a str,
    pub system_id: &'a str,
    pub ndata: &'a str,
}

impl<'a> DtdEntity<'a> {
    #[inline]
    pub fn new(name: &'a str) -> DtdEntity<'a> {
        DtdEntity { name, ..DtdEntity::default() }
    }

    #[inline]
    pub fn content(mut self, content: &'a str) -> DtdEntity<'a> {
        self.content = content;
        self
    }

    #[inline]
    pub fn parameter(mut self, parameter: bool) -> DtdEntity<'a> {
        self.parameter = parameter;
        self
    }

    #[inline]
    pub fn public_id(mut self, public_id: &'a str) -> DtdEntity<'a> {
        self.public_id = public_id;
        self
    }

    #[inline]
    pub fn system_id(mut self, system_id: &'a str) -> DtdEntity<'a> {
        self.system_id = system_id;
        self
    }

    #[inline]
    pub fn ndata(mut self, ndata: &'a str) -> DtdEntity<'a> {
        self.ndata = ndata;
        self
    }
}

/// A notation declaration, `<!NOTATION name ...>`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Notation<'a> {
    pub name: &'a str,
    pub public_id: &'a str,
    pub system_id: &'a str,
}

impl<'a> Notation<'a> {
    #[inline]
    pub fn new(name: &'a str) -> Notation<'a> {
        Notation { name, ..Notation::default() }
    }

    #[inline]
    pub fn public_id(mut self, public_id: &'a str) -> Notation<'a> {
        self.public_id = public_id;
        self
    }

    #[inline]
    pub fn system_id(mut self, system_id: &'a str) -> Notation<'a> {
        self.system_id = system_id;
        self
    }
}

/// A processing instruction, `<?target content?>`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ProcessingInstruction<'a> {
    pub target: &'a str,
    pub content: &'a str,
}

impl<'a> ProcessingInstruction<'a> {
    #[inline]
    pub fn new(target: &'a str, content: &'a str) -> ProcessingInstruction<'a> {
        ProcessingInstruction { target, content }
    }
}

/// A comment. `content` is written once the comment is opened; more can be
/// added with [`CommentContent`] nodes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Comment<'a> {
    pub content: &'a str,
}

impl<'a> Comment<'a> {
    #[inline]
    pub fn new(content: &'a str) -> Comment<'a> {
        Comment { content }
    }
}

/// A CDATA section. `content` is written once the section is opened; more can
/// be added with [`CDataContent`] nodes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct CData<'a> {
    pub content: &'a str,
}

impl<'a> CData<'a> {
    #[inline]
    pub fn new(content: &'a str) -> CData<'a> {
        CData { content }
    }
}

/// Character data, escaped when written.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Text<'a>(pub &'a str);

/// A string written exactly as given, anywhere, at any time.
///
/// Raw output does not advance the current node, so it can land inside a
/// start tag which has not been terminated yet.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Raw<'a>(pub &'a str);

/// Text inside a started comment.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct CommentContent<'a>(pub &'a str);

/// Text inside a started CDATA section.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct CDataContent<'a>(pub &'a str);

/// Any node which can be passed to `Writer::write()`.
///
/// Nodes which can have children are started and immediately ended.
#[derive(Clone, PartialEq, Debug, From)]
pub enum Node<'a> {
    Attribute(Attribute<'a>),
    CData(CData<'a>),
    CDataContent(CDataContent<'a>),
    Comment(Comment<'a>),
    CommentContent(CommentContent<'a>),
    DocType(DocType<'a>),
    DtdAttList(DtdAttList<'a>),
    DtdAttr(DtdAttr<'a>),
    DtdElement(DtdElement<'a>),
    DtdEntity(DtdEntity<'a>),
    Element(Element<'a>),
    Notation(Notation<'a>),
    ProcessingInstruction(ProcessingInstruction<'a>),
    Raw(Raw<'a>),
    Text(Text<'a>),
}

impl<'a> Node<'a> {
    pub fn kind(&self) -> NodeKind {
        match *self {
            Node::Attribute(_) => NodeKind::Attribute,
            Node::CData(_) => NodeKind::CData,
            Node::CDataContent(_) => NodeKind::CDataContent,
            Node::Comment(_) => NodeKind::Comment,
            Node::CommentContent(_) => NodeKind::CommentContent,
            Node::DocType(_) => NodeKind::DocType,
            Node::DtdAttList(_) => NodeKind::DtdAttList,
            Node::DtdAttr(_) => NodeKind::DtdAttr,
            Node::DtdElement(_) => NodeKind::DtdElement,
            Node::DtdEntity(_) => NodeKind::DtdEntity,
            Node::Element(_) => NodeKind::Element,
            Node::Notation(_) => NodeKind::Notation,
            Node::ProcessingInstruction(_) => NodeKind::ProcessingInstruction,
            Node::Raw(_) => NodeKind::Raw,
            Node::Text(_) => NodeKind::Text,
        }
    }
}

impl<'a> From<&'a str> for Node<'a> {
    #[inline]
    fn from(text: &'a str) -> Node<'a> {
        Node::Text(Text(text))
    }
}

/// Any node which can be passed to `Writer::start()` and can have children.
#[derive(Clone, PartialEq, Debug, From)]
pub enum StartNode<'a> {
    CData(CData<'a>),
    Comment(Comment<'a>),
    DocType(DocType<'a>),
    Document(Document<'a>),
    DtdAttList(DtdAttList<'a>),
    Element(Element<'a>),
}

impl<'a> StartNode<'a> {
    pub fn kind(&self) -> NodeKind {
        match *self {
            StartNode::CData(_) => NodeKind::CData,
            StartNode::Comment(_) => NodeKind::Comment,
            StartNode::DocType(_) => NodeKind::DocType,
            StartNode::Document(_) => NodeKind::Document,
            StartNode::DtdAttList(_) => NodeKind::DtdAttList,
            StartNode::Element(_) => NodeKind::Element,
        }
    }
}
