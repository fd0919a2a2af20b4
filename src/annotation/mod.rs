//! Annotations: a handle type, the tagged payload enum and the payload structs.
//!
//! An [`Annotation`] is an optional id plus an [`AnnotationKind`]. The kind
//! decides the [`AnnotationType`], and from there every catalog property
//! (layer, identifiability, scope). Payloads point at other annotations of the
//! same container through [`AnnotationRef`] handles and declare those pointers
//! through [`Annotation::references`].

mod lexical;
mod semantics;
mod syntax;
mod temporal;

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::annotation_type::AnnotationType;
use crate::error::Result;

pub use lexical::{ExternalRef, Sentiment, Term, Wf};
pub use semantics::{
    Coref, Entity, Feature, LinkedEntity, Mark, Opinion, OpinionExpression, OpinionHolder,
    OpinionTarget, Predicate, Relation, RelationEndpoint, Role, Statement, StatementCue,
    StatementSource, StatementTarget, Topic,
};
pub use syntax::{Chunk, Dep, NonTerminal, Terminal, Tree, TreeNodeRef};
pub use temporal::{CLink, FactVal, Factuality, Factvalue, PredicateAnchor, TLink, TLinkEndpoint, Timex3};

/// Handle of an annotation stored in an [`AnnotationContainer`](crate::AnnotationContainer).
///
/// Handles are never reused within a container, so a handle to a removed
/// annotation keeps resolving to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnnotationRef(pub(crate) usize);

impl AnnotationRef {
    /// Position of the annotation in its container's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for AnnotationRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A declared forward edge: the expected type of the target and its handle.
pub type Reference = (AnnotationType, AnnotationRef);

/// String-keyed attribute bag in declaration order.
pub type Attributes = Vec<(&'static str, String)>;

pub(crate) fn push_attr<T: Display + ?Sized>(out: &mut Attributes, key: &'static str, value: Option<&T>) {
    if let Some(value) = value {
        out.push((key, value.to_string()));
    }
}

/// Behaviour shared by every payload struct.
pub(crate) trait Payload {
    /// Appends the declared forward references, in declaration order.
    fn references(&self, out: &mut Vec<Reference>);

    /// Rewrites every stored handle through `f`.
    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef);

    /// Drops handles rejected by `keep`. Returns `false` when a mandatory
    /// reference was rejected and the payload can no longer stand.
    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool;

    /// At-least-one rules of the payload.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn attributes(&self, out: &mut Attributes);

    fn external_refs(&self) -> &[ExternalRef] {
        &[]
    }
}

macro_rules! annotation_kinds {
    ($($variant:ident($payload:ty) => $as_ref:ident, $as_mut:ident;)*) => {
        /// The payload of an annotation, tagged by its type.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub enum AnnotationKind {
            $($variant($payload),)*
        }

        impl AnnotationKind {
            pub fn annotation_type(&self) -> AnnotationType {
                match self {
                    $(AnnotationKind::$variant(_) => AnnotationType::$variant,)*
                }
            }

            fn payload(&self) -> &dyn Payload {
                match self {
                    $(AnnotationKind::$variant(p) => p,)*
                }
            }

            fn payload_mut(&mut self) -> &mut dyn Payload {
                match self {
                    $(AnnotationKind::$variant(p) => p,)*
                }
            }

            $(
                pub fn $as_ref(&self) -> Option<&$payload> {
                    match self {
                        AnnotationKind::$variant(p) => Some(p),
                        _ => None,
                    }
                }

                pub fn $as_mut(&mut self) -> Option<&mut $payload> {
                    match self {
                        AnnotationKind::$variant(p) => Some(p),
                        _ => None,
                    }
                }
            )*
        }
    };
}

annotation_kinds! {
    Wf(Wf) => as_wf, as_wf_mut;
    Term(Term) => as_term, as_term_mut;
    Mw(Term) => as_compound, as_compound_mut;
    Component(Term) => as_component, as_component_mut;
    Entity(Entity) => as_entity, as_entity_mut;
    Chunk(Chunk) => as_chunk, as_chunk_mut;
    Dep(Dep) => as_dep, as_dep_mut;
    Tree(Tree) => as_tree, as_tree_mut;
    NonTerminal(NonTerminal) => as_non_terminal, as_non_terminal_mut;
    Terminal(Terminal) => as_terminal, as_terminal_mut;
    Coref(Coref) => as_coref, as_coref_mut;
    Opinion(Opinion) => as_opinion, as_opinion_mut;
    CLink(CLink) => as_clink, as_clink_mut;
    TLink(TLink) => as_tlink, as_tlink_mut;
    PredicateAnchor(PredicateAnchor) => as_predicate_anchor, as_predicate_anchor_mut;
    Predicate(Predicate) => as_predicate, as_predicate_mut;
    Role(Role) => as_role, as_role_mut;
    Timex3(Timex3) => as_timex3, as_timex3_mut;
    Factuality(Factuality) => as_factuality, as_factuality_mut;
    Factvalue(Factvalue) => as_factvalue, as_factvalue_mut;
    Mark(Mark) => as_mark, as_mark_mut;
    Property(Feature) => as_property, as_property_mut;
    Category(Feature) => as_category, as_category_mut;
    LinkedEntity(LinkedEntity) => as_linked_entity, as_linked_entity_mut;
    Relation(Relation) => as_relation, as_relation_mut;
    Topic(Topic) => as_topic, as_topic_mut;
    Statement(Statement) => as_statement, as_statement_mut;
}

impl AnnotationKind {
    /// Declared forward references in declaration order.
    pub fn references(&self) -> Vec<Reference> {
        let mut out = Vec::new();
        self.payload().references(&mut out);
        out
    }

    /// The at-least-one rules of this payload.
    pub fn validate(&self) -> Result<()> {
        self.payload().validate()
    }

    /// Scalar attributes in declaration order. Absent optional values are omitted.
    pub fn attributes(&self) -> Attributes {
        let mut out = Vec::new();
        self.payload().attributes(&mut out);
        out
    }

    pub fn external_refs(&self) -> &[ExternalRef] {
        self.payload().external_refs()
    }

    /// Any term-like payload, whatever its role.
    pub fn as_any_term(&self) -> Option<&Term> {
        match self {
            AnnotationKind::Term(t) | AnnotationKind::Mw(t) | AnnotationKind::Component(t) => Some(t),
            _ => None,
        }
    }

    pub(crate) fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        self.payload_mut().map_handles(f);
    }

    pub(crate) fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        self.payload_mut().retain_handles(keep)
    }

    /// Id of the edge to the parent node, for adopted tree nodes.
    pub fn edge_id(&self) -> Option<&str> {
        match self {
            AnnotationKind::NonTerminal(node) => node.edge_id.as_deref(),
            AnnotationKind::Terminal(node) => node.edge_id.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn edge_id_mut(&mut self) -> Option<&mut Option<String>> {
        match self {
            AnnotationKind::NonTerminal(node) => Some(&mut node.edge_id),
            AnnotationKind::Terminal(node) => Some(&mut node.edge_id),
            _ => None,
        }
    }
}

/// A stored annotation: optional id plus payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    id: Option<String>,
    kind: AnnotationKind,
}

impl Annotation {
    /// An identifiable annotation.
    pub fn new(id: impl Into<String>, kind: impl Into<AnnotationKind>) -> Self {
        Annotation {
            id: Some(id.into()),
            kind: kind.into(),
        }
    }

    /// An annotation without an id (dependencies, fact values, topics).
    pub fn anonymous(kind: impl Into<AnnotationKind>) -> Self {
        Annotation {
            id: None,
            kind: kind.into(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn kind(&self) -> &AnnotationKind {
        &self.kind
    }

    pub fn annotation_type(&self) -> AnnotationType {
        self.kind.annotation_type()
    }

    pub fn references(&self) -> Vec<Reference> {
        self.kind.references()
    }

    /// Forward references grouped by type, each list in declaration order.
    pub fn referenced(&self) -> BTreeMap<AnnotationType, Vec<AnnotationRef>> {
        let mut grouped: BTreeMap<AnnotationType, Vec<AnnotationRef>> = BTreeMap::new();
        for (ty, r) in self.references() {
            let list = grouped.entry(ty).or_default();
            if !list.contains(&r) {
                list.push(r);
            }
        }
        grouped
    }

    pub fn attributes(&self) -> Attributes {
        self.kind.attributes()
    }

    pub(crate) fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    pub(crate) fn kind_mut(&mut self) -> &mut AnnotationKind {
        &mut self.kind
    }
}

macro_rules! impl_into_kind {
    ($($payload:ident),*) => {
        $(
            impl From<$payload> for AnnotationKind {
                fn from(payload: $payload) -> Self {
                    AnnotationKind::$payload(payload)
                }
            }
        )*
    };
}

// Payloads that back exactly one variant. `Term` and `Feature` back several
// and are wrapped explicitly.
impl_into_kind!(
    Wf, Term, Entity, Chunk, Dep, Tree, NonTerminal, Terminal, Coref, Opinion, CLink, TLink,
    PredicateAnchor, Predicate, Role, Timex3, Factuality, Factvalue, Mark, LinkedEntity,
    Relation, Topic, Statement
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    #[test]
    fn referenced_groups_by_type() {
        let w1 = AnnotationRef(0);
        let c1 = AnnotationRef(3);
        let mut term = Term::new(Span::from_targets(vec![w1]));
        term.components.add_head_target(c1);
        let ann = Annotation::new("mw1", AnnotationKind::Mw(term));
        assert_eq!(ann.annotation_type(), AnnotationType::Mw);
        let referenced = ann.referenced();
        assert_eq!(referenced[&AnnotationType::Wf], vec![w1]);
        assert_eq!(referenced[&AnnotationType::Component], vec![c1]);
    }

    #[test]
    fn constructors_enforce_minimum_targets() {
        assert!(Chunk::new("NP", Span::new()).is_err());
        assert!(Coref::new(vec![]).is_err());
        assert!(Coref::new(vec![Span::new()]).is_err());
        assert!(Entity::new(vec![Span::from_targets(vec![AnnotationRef(1)])]).is_ok());
    }

    #[test]
    fn attributes_skip_absent_values() {
        let wf = Wf::new(3, 1, "a", 2);
        let attrs = AnnotationKind::from(wf).attributes();
        assert_eq!(
            attrs,
            vec![
                ("offset", "3".to_string()),
                ("length", "1".to_string()),
                ("sent", "2".to_string()),
                ("form", "a".to_string()),
            ]
        );
    }

    #[test]
    fn retain_reports_lost_mandatory_references() {
        let mut dep = AnnotationKind::from(Dep::new(AnnotationRef(1), AnnotationRef(2), "nsubj"));
        assert!(dep.retain_handles(&|r: AnnotationRef| r != AnnotationRef(5)));
        assert!(!dep.retain_handles(&|r: AnnotationRef| r != AnnotationRef(2)));
    }
}
