//! Pretty printing of the writer's output.
//!
//! Indentation is decided online: an [`Indenter`] sees every state transition
//! of every node together with the transition that preceded it, and may inject
//! whitespace in between. Nothing is buffered and nothing is looked ahead at.

use std::borrow::Cow;

use crate::writer::error::Result;
use crate::writer::node::{Event, NodeKind, NodeState};

/// The output an indenter may write to.
pub trait IndentOutput {
    /// Writes the writer's configured line separator.
    fn write_newline(&mut self) -> Result<()>;

    fn write_str(&mut self, s: &str) -> Result<()>;
}

/// A custom indentation strategy.
///
/// Getting indentation rules right for mixed content is fiddly; see
/// [`StandardIndenter`] for a worked example.
pub trait Indenter {
    /// Called every time a node moves from one state to another, before the
    /// bytes of the new state are written.
    fn indent(&mut self, out: &mut dyn IndentOutput, last: Event, next: Event) -> Result<()>;

    /// Called on every text and comment content fragment before it is written,
    /// allowing long runs of text to be reflowed.
    fn wrap<'c>(&mut self, content: &'c str) -> Cow<'c, str> {
        Cow::Borrowed(content)
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct IndentLevel {
    indents: usize,
}

const INITIAL_DEPTH: usize = 8;

/// Places nested elements and declarations on their own lines.
///
/// Elements which only contain text and inline children keep their closing
/// tag on the same line:
///
/// ```text
/// <a>
///  <b>Hi my name is <judge/>.</b>
/// </a>
/// ```
#[derive(Clone, Debug)]
pub struct StandardIndenter {
    indent_string: Cow<'static, str>,
    depth: usize,
    stack: Vec<IndentLevel>,
}

impl StandardIndenter {
    /// Creates an indenter which indents with a single space.
    pub fn new() -> StandardIndenter {
        StandardIndenter::with_indent_string(" ")
    }

    pub fn with_indent_string<S: Into<Cow<'static, str>>>(indent_string: S) -> StandardIndenter {
        let mut stack = Vec::with_capacity(INITIAL_DEPTH);
        stack.push(IndentLevel::default());
        StandardIndenter {
            indent_string: indent_string.into(),
            depth: 0,
            stack,
        }
    }

    #[inline]
    pub fn indent_string(&self) -> &str {
        &self.indent_string
    }
}

impl Default for StandardIndenter {
    fn default() -> StandardIndenter {
        StandardIndenter::new()
    }
}

/// Kinds which open a new indentation level.
#[inline]
fn is_indenting(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::Element | NodeKind::DocType | NodeKind::DtdAttList)
}

/// Declaration leaves, which always go on their own line.
#[inline]
fn is_declaration(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::DtdEntity | NodeKind::DtdAttr | NodeKind::DtdElement | NodeKind::Notation
    )
}

impl Indenter for StandardIndenter {
    fn indent(&mut self, out: &mut dyn IndentOutput, last: Event, next: Event) -> Result<()> {
        let next_is_indenting = is_indenting(next.kind);
        let mut next_is_indented = next_is_indenting;
        let indented_state = next.state == NodeState::Open || next.state == NodeState::Ended;

        let last_is_indenting = is_indenting(last.kind);
        let last_is_indented = last_is_indenting
            || is_declaration(last.kind)
            || (last.state == NodeState::Ended && last.kind == NodeKind::Comment);

        let mut inline = false;
        let level = self.depth;

        if next_is_indenting {
            match next.state {
                NodeState::Opened => {
                    self.stack.push(IndentLevel::default());
                    self.depth += 1;
                }
                NodeState::Ended => {
                    inline = self.stack.get(self.depth).map_or(true, |l| l.indents == 0);
                    if self.stack.len() > 1 {
                        self.stack.pop();
                    }
                    self.depth = self.depth.saturating_sub(1);
                }
                NodeState::Open => {}
            }
        } else if indented_state {
            next_is_indented = is_declaration(next.kind)
                || (next.state == NodeState::Open && next.kind == NodeKind::Comment);
        }

        let pair_is_indented = ((last_is_indenting && next_is_indented)
            || (last_is_indented && next_is_indenting)
            || (next_is_indented && last_is_indented))
            && last.kind != NodeKind::Document;

        if pair_is_indented && indented_state {
            let empty_element =
                next.kind == NodeKind::Element && next.state == NodeState::Ended && next.children == 0;
            let inline_closer = next.state == NodeState::Ended && inline;

            if !empty_element && !inline_closer {
                if next.state != NodeState::Ended {
                    if let Some(l) = self.stack.get_mut(level) {
                        l.indents += 1;
                    }
                }
                out.write_newline()?;
                for _ in 0..self.depth {
                    out.write_str(&self.indent_string)?;
                }
            }
        } else if next.kind == NodeKind::Document && next.state == NodeState::Ended {
            out.write_newline()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(String);

    impl IndentOutput for Recorder {
        fn write_newline(&mut self) -> Result<()> {
            self.0.push('\n');
            Ok(())
        }

        fn write_str(&mut self, s: &str) -> Result<()> {
            self.0.push_str(s);
            Ok(())
        }
    }

    fn ev(state: NodeState, kind: NodeKind, children: usize) -> Event {
        Event::new(state, kind, children)
    }

    #[test]
    fn test_nested_element_is_indented() {
        use crate::writer::node::NodeState::{Open, Opened};

        let mut indenter = StandardIndenter::with_indent_string("\t");
        let mut out = Recorder::default();

        indenter.indent(&mut out, Event::default(), ev(Open, NodeKind::Element, 0)).unwrap();
        assert_eq!(out.0, "");
        indenter.indent(&mut out, ev(Open, NodeKind::Element, 0), ev(Opened, NodeKind::Element, 1)).unwrap();
        assert_eq!(out.0, "");
        indenter.indent(&mut out, ev(Opened, NodeKind::Element, 1), ev(Open, NodeKind::Element, 0)).unwrap();
        assert_eq!(out.0, "\n\t");
    }

    #[test]
    fn test_document_end_forces_newline() {
        let mut indenter = StandardIndenter::new();
        let mut out = Recorder::default();
        indenter
            .indent(
                &mut out,
                ev(NodeState::Ended, NodeKind::Raw, 0),
                ev(NodeState::Ended, NodeKind::Document, 1),
            )
            .unwrap();
        assert_eq!(out.0, "\n");
    }

    #[test]
    fn test_unbalanced_end_does_not_underflow() {
        let mut indenter = StandardIndenter::new();
        let mut out = Recorder::default();
        indenter
            .indent(
                &mut out,
                ev(NodeState::Ended, NodeKind::Element, 0),
                ev(NodeState::Ended, NodeKind::Element, 1),
            )
            .unwrap();
        assert_eq!(indenter.depth, 0);
        assert_eq!(indenter.stack.len(), 1);
    }

    #[test]
    fn test_wrap_is_identity() {
        let mut indenter = StandardIndenter::new();
        assert!(matches!(indenter.wrap("text"), Cow::Borrowed("text")));
    }
}
