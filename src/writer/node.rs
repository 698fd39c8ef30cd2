//! Node kinds, their capability flags and the lifecycle states of stack frames.

use std::fmt;

use bitflags::bitflags;

/// The kind of a node.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum NodeKind {
    /// Sentinel for an empty stack.
    #[default]
    None,
    Attribute,
    CData,
    CDataContent,
    Comment,
    CommentContent,
    DocType,
    DtdAttList,
    DtdAttr,
    DtdElement,
    DtdEntity,
    Document,
    Element,
    Notation,
    ProcessingInstruction,
    Raw,
    Text,
}

impl NodeKind {
    pub const ALL: [NodeKind; 17] = [
        NodeKind::None,
        NodeKind::Attribute,
        NodeKind::CData,
        NodeKind::CDataContent,
        NodeKind::Comment,
        NodeKind::CommentContent,
        NodeKind::DocType,
        NodeKind::DtdAttList,
        NodeKind::DtdAttr,
        NodeKind::DtdElement,
        NodeKind::DtdEntity,
        NodeKind::Document,
        NodeKind::Element,
        NodeKind::Notation,
        NodeKind::ProcessingInstruction,
        NodeKind::Raw,
        NodeKind::Text,
    ];

    /// Returns a stable name for this kind, as used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::None => "none",
            NodeKind::Attribute => "attr",
            NodeKind::CData => "cdata",
            NodeKind::CDataContent => "cdatacontent",
            NodeKind::Comment => "comment",
            NodeKind::CommentContent => "commentcontent",
            NodeKind::DocType => "dtd",
            NodeKind::DtdAttList => "dtdattlist",
            NodeKind::DtdAttr => "dtdattr",
            NodeKind::DtdElement => "dtdelem",
            NodeKind::DtdEntity => "dtdentity",
            NodeKind::Document => "document",
            NodeKind::Element => "elem",
            NodeKind::Notation => "notation",
            NodeKind::ProcessingInstruction => "pi",
            NodeKind::Raw => "raw",
            NodeKind::Text => "text",
        }
    }

    /// Returns the single capability bit of this kind.
    #[inline]
    pub fn flag(self) -> NodeFlags {
        NodeFlags::from_bits_truncate(1 << self as u32)
    }

    /// Returns the set of kinds which may directly contain a node of this kind.
    ///
    /// `NodeKind::None` in the set means the node may be written at the top level.
    /// Raw output is never checked, so its set contains everything.
    pub fn parents(self) -> NodeFlags {
        let top = NodeFlags::NONE;
        match self {
            NodeKind::None | NodeKind::Document => top,
            NodeKind::Attribute | NodeKind::CData | NodeKind::Text => top | NodeFlags::ELEMENT,
            NodeKind::CDataContent => top | NodeFlags::CDATA,
            NodeKind::Comment => top | NodeFlags::DOCUMENT | NodeFlags::DOCTYPE | NodeFlags::ELEMENT,
            NodeKind::CommentContent => top | NodeFlags::COMMENT,
            NodeKind::DocType => top | NodeFlags::DOCUMENT,
            NodeKind::DtdAttList | NodeKind::DtdElement | NodeKind::DtdEntity | NodeKind::Notation => {
                top | NodeFlags::DOCTYPE
            }
            NodeKind::DtdAttr => top | NodeFlags::DTD_ATT_LIST,
            NodeKind::Element | NodeKind::ProcessingInstruction => {
                top | NodeFlags::DOCUMENT | NodeFlags::ELEMENT
            }
            NodeKind::Raw => NodeFlags::all(),
        }
    }

    /// Whether nodes of this kind are pushed onto the stack and can own children.
    pub fn is_nestable(self) -> bool {
        matches!(
            self,
            NodeKind::CData
                | NodeKind::Comment
                | NodeKind::DocType
                | NodeKind::DtdAttList
                | NodeKind::Document
                | NodeKind::Element
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// A set of node kinds, one bit per kind.
    #[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
    pub struct NodeFlags: u32 {
        const NONE = 1 << NodeKind::None as u32;
        const ATTRIBUTE = 1 << NodeKind::Attribute as u32;
        const CDATA = 1 << NodeKind::CData as u32;
        const CDATA_CONTENT = 1 << NodeKind::CDataContent as u32;
        const COMMENT = 1 << NodeKind::Comment as u32;
        const COMMENT_CONTENT = 1 << NodeKind::CommentContent as u32;
        const DOCTYPE = 1 << NodeKind::DocType as u32;
        const DTD_ATT_LIST = 1 << NodeKind::DtdAttList as u32;
        const DTD_ATTR = 1 << NodeKind::DtdAttr as u32;
        const DTD_ELEMENT = 1 << NodeKind::DtdElement as u32;
        const DTD_ENTITY = 1 << NodeKind::DtdEntity as u32;
        const DOCUMENT = 1 << NodeKind::Document as u32;
        const ELEMENT = 1 << NodeKind::Element as u32;
        const NOTATION = 1 << NodeKind::Notation as u32;
        const PROCESSING_INSTRUCTION = 1 << NodeKind::ProcessingInstruction as u32;
        const RAW = 1 << NodeKind::Raw as u32;
        const TEXT = 1 << NodeKind::Text as u32;
    }
}

impl NodeFlags {
    /// Whether `kind`'s bit is in this set.
    #[inline]
    pub fn allows(self, kind: NodeKind) -> bool {
        self.intersects(kind.flag())
    }
}

impl fmt::Display for NodeFlags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for kind in NodeKind::ALL.iter().filter(|k| self.allows(**k)) {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(kind.name())?;
            first = false;
        }
        Ok(())
    }
}

/// The lifecycle state of a node.
///
/// A frame only ever moves forward through these states.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub enum NodeState {
    /// The node is open but not opened, e.g. `<elem`.
    #[default]
    Open,
    /// The node is fully opened and children may follow, e.g. `<elem>`.
    Opened,
    /// The node has been closed, e.g. `</elem>`.
    Ended,
}

impl NodeState {
    pub fn name(self) -> &'static str {
        match self {
            NodeState::Open => "open",
            NodeState::Opened => "opened",
            NodeState::Ended => "ended",
        }
    }
}

/// A single state transition of a node, as seen by an indenter.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Event {
    pub state: NodeState,
    pub kind: NodeKind,
    pub children: usize,
}

impl Event {
    #[inline]
    pub fn new(state: NodeState, kind: NodeKind, children: usize) -> Event {
        Event { state, kind, children }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}\t+{}", self.state.name(), self.kind, self.children)
    }
}

/// A range of bytes in the writer's name arena.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Appends `s` to `arena` and returns where it landed.
    #[inline]
    pub fn intern(arena: &mut String, s: &str) -> Span {
        let start = arena.len();
        arena.push_str(s);
        Span { start, end: arena.len() }
    }

    #[inline]
    pub fn get(self, arena: &str) -> &str {
        &arena[self.start..self.end]
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }
}

/// The per-kind payload of a stack frame. Strings live in the writer's arena.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum FrameData {
    Document,
    DocType { name: Span },
    DtdAttList { name: Span },
    Element { prefix: Span, name: Span, full: bool },
    /// `dash` is set when the content written so far ends with `-`.
    Comment { pending: Span, dash: bool },
    /// `brackets` counts the trailing `]` of the content written so far, up to two.
    CData { pending: Span, brackets: u8 },
}

/// One slot of the node stack.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Frame {
    pub state: NodeState,
    pub children: usize,
    /// Length of the name arena before this frame interned anything.
    pub mark: usize,
    /// Index of this frame's first namespace binding.
    pub ns_start: usize,
    pub data: FrameData,
}

impl Frame {
    #[inline]
    pub fn new(mark: usize, ns_start: usize, data: FrameData) -> Frame {
        Frame {
            state: NodeState::Open,
            children: 0,
            mark,
            ns_start,
            data,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.data {
            FrameData::Document => NodeKind::Document,
            FrameData::DocType { .. } => NodeKind::DocType,
            FrameData::DtdAttList { .. } => NodeKind::DtdAttList,
            FrameData::Element { .. } => NodeKind::Element,
            FrameData::Comment { .. } => NodeKind::Comment,
            FrameData::CData { .. } => NodeKind::CData,
        }
    }

    #[inline]
    pub fn event(&self) -> Event {
        Event::new(self.state, self.kind(), self.children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_arena() {
        let mut arena = String::new();
        let a = Span::intern(&mut arena, "yep");
        let b = Span::intern(&mut arena, "");
        let c = Span::intern(&mut arena, "nup");
        assert_eq!(a.get(&arena), "yep");
        assert!(b.is_empty());
        assert_eq!(c.get(&arena), "nup");
        assert_eq!(Frame::new(0, 0, FrameData::Element { prefix: b, name: a, full: false }).kind(), NodeKind::Element);
    }

    #[test]
    fn test_flags_match_kinds() {
        for kind in NodeKind::ALL.iter() {
            assert_eq!(kind.flag().bits().count_ones(), 1, "{}", kind);
            assert!(kind.flag().allows(*kind));
        }
        assert_eq!(NodeKind::Element.flag(), NodeFlags::ELEMENT);
        assert_eq!(NodeKind::Text.flag(), NodeFlags::TEXT);
    }

    #[test]
    fn test_parent_names() {
        assert_eq!(NodeKind::Attribute.parents().to_string(), "none, elem");
        assert_eq!(NodeKind::Element.parents().to_string(), "none, document, elem");
        assert_eq!(NodeKind::DtdEntity.parents().to_string(), "none, dtd");
    }

    #[test]
    fn test_parents() {
        assert!(NodeKind::CData.parents().allows(NodeKind::Element));
        assert!(!NodeKind::CData.parents().allows(NodeKind::Document));
        assert!(NodeKind::DtdAttr.parents().allows(NodeKind::DtdAttList));
        assert!(!NodeKind::Element.parents().allows(NodeKind::DocType));
        assert!(NodeKind::Raw.parents().allows(NodeKind::Comment));
    }
}
