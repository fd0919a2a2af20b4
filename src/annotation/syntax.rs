//! Chunks, dependencies and constituency trees.

use serde::{Deserialize, Serialize};

use super::{push_attr, AnnotationRef, Attributes, Payload, Reference};
use crate::annotation_type::AnnotationType;
use crate::error::{KafError, Result};
use crate::span::Span;

/// A phrase over terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub phrase: String,
    pub case: Option<String>,
    pub span: Span<AnnotationRef>,
}

impl Chunk {
    /// Fails when `span` has no terms.
    pub fn new(phrase: impl Into<String>, span: Span<AnnotationRef>) -> Result<Self> {
        let chunk = Chunk {
            phrase: phrase.into(),
            case: None,
            span,
        };
        chunk.validate()?;
        Ok(chunk)
    }

    /// The head term, or the last term when no head is designated.
    pub fn head(&self) -> Option<AnnotationRef> {
        self.span.head().or_else(|| self.span.last_target()).copied()
    }
}

impl Payload for Chunk {
    fn references(&self, out: &mut Vec<Reference>) {
        out.extend(self.span.iter().map(|r| (AnnotationType::Term, *r)));
    }

    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        self.span = std::mem::take(&mut self.span).map(f);
    }

    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        self.span.retain(|r| keep(*r));
        true
    }

    fn validate(&self) -> Result<()> {
        if self.span.is_empty() {
            return Err(KafError::EmptySpan {
                annotation_type: AnnotationType::Chunk,
                what: "term",
            });
        }
        Ok(())
    }

    fn attributes(&self, out: &mut Attributes) {
        push_attr(out, "phrase", Some(&self.phrase));
        push_attr(out, "case", self.case.as_ref());
    }
}

/// A directed dependency `from → to` labelled with a relational function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dep {
    pub from: AnnotationRef,
    pub to: AnnotationRef,
    pub rfunc: String,
    pub case: Option<String>,
}

impl Dep {
    pub fn new(from: AnnotationRef, to: AnnotationRef, rfunc: impl Into<String>) -> Self {
        Dep {
            from,
            to,
            rfunc: rfunc.into(),
            case: None,
        }
    }
}

impl Payload for Dep {
    fn references(&self, out: &mut Vec<Reference>) {
        out.push((AnnotationType::Term, self.from));
        out.push((AnnotationType::Term, self.to));
    }

    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        self.from = f(self.from);
        self.to = f(self.to);
    }

    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        keep(self.from) && keep(self.to)
    }

    fn attributes(&self, out: &mut Attributes) {
        push_attr(out, "rfunc", Some(&self.rfunc));
        push_attr(out, "case", self.case.as_ref());
    }
}

/// A node of a constituency tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeNodeRef {
    NonTerminal(AnnotationRef),
    Terminal(AnnotationRef),
}

impl TreeNodeRef {
    pub fn handle(self) -> AnnotationRef {
        match self {
            TreeNodeRef::NonTerminal(r) | TreeNodeRef::Terminal(r) => r,
        }
    }

    pub fn annotation_type(self) -> AnnotationType {
        match self {
            TreeNodeRef::NonTerminal(_) => AnnotationType::NonTerminal,
            TreeNodeRef::Terminal(_) => AnnotationType::Terminal,
        }
    }

    fn map(self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) -> Self {
        match self {
            TreeNodeRef::NonTerminal(r) => TreeNodeRef::NonTerminal(f(r)),
            TreeNodeRef::Terminal(r) => TreeNodeRef::Terminal(f(r)),
        }
    }
}

/// A constituency parse rooted at one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub tree_type: Option<String>,
    pub root: TreeNodeRef,
}

impl Tree {
    pub fn new(root: TreeNodeRef) -> Self {
        Tree {
            tree_type: None,
            root,
        }
    }

    pub fn with_type(mut self, tree_type: impl Into<String>) -> Self {
        self.tree_type = Some(tree_type.into());
        self
    }
}

impl Payload for Tree {
    fn references(&self, out: &mut Vec<Reference>) {
        out.push((self.root.annotation_type(), self.root.handle()));
    }

    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        self.root = self.root.map(f);
    }

    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        keep(self.root.handle())
    }

    fn attributes(&self, out: &mut Attributes) {
        push_attr(out, "type", self.tree_type.as_ref());
    }
}

/// An internal tree node with a label and ordered children.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NonTerminal {
    pub label: String,
    /// Id of the edge to the parent node; minted when the node is adopted.
    pub edge_id: Option<String>,
    pub children: Span<TreeNodeRef>,
}

impl NonTerminal {
    pub fn new(label: impl Into<String>) -> Self {
        NonTerminal {
            label: label.into(),
            ..NonTerminal::default()
        }
    }

    pub fn head_child(&self) -> Option<TreeNodeRef> {
        self.children.head().copied()
    }
}

impl Payload for NonTerminal {
    fn references(&self, out: &mut Vec<Reference>) {
        out.extend(
            self.children
                .iter()
                .map(|child| (child.annotation_type(), child.handle())),
        );
    }

    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        self.children = std::mem::take(&mut self.children).map(|child| child.map(&mut *f));
    }

    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        self.children.retain(|child| keep(child.handle()));
        true
    }

    fn attributes(&self, out: &mut Attributes) {
        push_attr(out, "label", Some(&self.label));
        push_attr(out, "edge_id", self.edge_id.as_ref());
    }
}

/// A tree leaf over terms.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Terminal {
    pub edge_id: Option<String>,
    pub span: Span<AnnotationRef>,
}

impl Terminal {
    pub fn new(span: Span<AnnotationRef>) -> Self {
        Terminal {
            edge_id: None,
            span,
        }
    }
}

impl Payload for Terminal {
    fn references(&self, out: &mut Vec<Reference>) {
        out.extend(self.span.iter().map(|r| (AnnotationType::Term, *r)));
    }

    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        self.span = std::mem::take(&mut self.span).map(f);
    }

    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        self.span.retain(|r| keep(*r));
        true
    }

    fn attributes(&self, out: &mut Attributes) {
        push_attr(out, "edge_id", self.edge_id.as_ref());
    }
}
