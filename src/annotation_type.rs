//! The fixed catalog of annotation types and layers.
//!
//! Everything the container needs to know about a type (whether it carries an
//! id, which layer it lives in, how it is scoped when a document is split) is
//! answered by the lookup tables in this module rather than by the payloads.

use serde::{Deserialize, Serialize};

/// Every kind of annotation the container can store.
///
/// `Edge` is never stored; it only names the id counter used for the edge ids
/// of tree nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnnotationType {
    Wf,
    Term,
    Mw,
    Component,
    Entity,
    Chunk,
    Dep,
    Tree,
    NonTerminal,
    Terminal,
    Edge,
    Coref,
    Opinion,
    CLink,
    TLink,
    PredicateAnchor,
    Predicate,
    Role,
    Timex3,
    Factuality,
    Factvalue,
    Mark,
    Property,
    Category,
    LinkedEntity,
    Relation,
    Topic,
    Statement,
}

/// Named buckets of top-level annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    Text,
    Terms,
    Entities,
    Chunks,
    Deps,
    Constituency,
    Coreferences,
    Opinions,
    CausalRelations,
    TemporalRelations,
    Srl,
    TimeExpressions,
    Factualities,
    FactualityLayer,
    Markables,
    Properties,
    Categories,
    LinkedEntities,
    Relations,
    Topics,
    Attribution,
}

/// How far an annotation type reaches when a document is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Never crosses a sentence; copied by both sentence and paragraph splits.
    Sentence,
    /// May link across sentences of one paragraph; copied by paragraph splits only.
    Paragraph,
    /// May link across paragraphs; never copied by a split.
    Document,
}

/// Top types in their canonical order. Layer-wide iteration (join, split,
/// snapshots) walks types in this order.
pub const TOP_TYPES: [AnnotationType; 23] = [
    AnnotationType::Wf,
    AnnotationType::Term,
    AnnotationType::Mw,
    AnnotationType::Entity,
    AnnotationType::Chunk,
    AnnotationType::Dep,
    AnnotationType::Tree,
    AnnotationType::Coref,
    AnnotationType::Opinion,
    AnnotationType::CLink,
    AnnotationType::TLink,
    AnnotationType::PredicateAnchor,
    AnnotationType::Predicate,
    AnnotationType::Timex3,
    AnnotationType::Factuality,
    AnnotationType::Factvalue,
    AnnotationType::Mark,
    AnnotationType::Property,
    AnnotationType::Category,
    AnnotationType::LinkedEntity,
    AnnotationType::Relation,
    AnnotationType::Topic,
    AnnotationType::Statement,
];

impl AnnotationType {
    /// Every storable type, in declaration order.
    pub const ALL: [AnnotationType; 27] = [
        AnnotationType::Wf,
        AnnotationType::Term,
        AnnotationType::Mw,
        AnnotationType::Component,
        AnnotationType::Entity,
        AnnotationType::Chunk,
        AnnotationType::Dep,
        AnnotationType::Tree,
        AnnotationType::NonTerminal,
        AnnotationType::Terminal,
        AnnotationType::Coref,
        AnnotationType::Opinion,
        AnnotationType::CLink,
        AnnotationType::TLink,
        AnnotationType::PredicateAnchor,
        AnnotationType::Predicate,
        AnnotationType::Role,
        AnnotationType::Timex3,
        AnnotationType::Factuality,
        AnnotationType::Factvalue,
        AnnotationType::Mark,
        AnnotationType::Property,
        AnnotationType::Category,
        AnnotationType::LinkedEntity,
        AnnotationType::Relation,
        AnnotationType::Topic,
        AnnotationType::Statement,
    ];

    /// The layer holding annotations of this type, or `None` for sub-annotations.
    pub fn layer(self) -> Option<Layer> {
        use AnnotationType::*;
        let layer = match self {
            Wf => Layer::Text,
            Term | Mw => Layer::Terms,
            Entity => Layer::Entities,
            Chunk => Layer::Chunks,
            Dep => Layer::Deps,
            Tree => Layer::Constituency,
            Coref => Layer::Coreferences,
            Opinion => Layer::Opinions,
            CLink => Layer::CausalRelations,
            TLink | PredicateAnchor => Layer::TemporalRelations,
            Predicate => Layer::Srl,
            Timex3 => Layer::TimeExpressions,
            Factuality => Layer::Factualities,
            Factvalue => Layer::FactualityLayer,
            Mark => Layer::Markables,
            Property => Layer::Properties,
            Category => Layer::Categories,
            LinkedEntity => Layer::LinkedEntities,
            Relation => Layer::Relations,
            Topic => Layer::Topics,
            Statement => Layer::Attribution,
            Component | NonTerminal | Terminal | Role | Edge => return None,
        };
        Some(layer)
    }

    /// Whether instances appear in a layer's ordered list.
    pub fn is_top(self) -> bool {
        self.layer().is_some()
    }

    /// Whether a reference declared as `self` may point at an annotation of `found`.
    ///
    /// Compounds stand in for terms everywhere a term is expected.
    pub fn accepts(self, found: AnnotationType) -> bool {
        self == found || (self == AnnotationType::Term && found == AnnotationType::Mw)
    }

    /// Whether instances carry a string id.
    pub fn is_identifiable(self) -> bool {
        !matches!(
            self,
            AnnotationType::Dep | AnnotationType::Factvalue | AnnotationType::Topic | AnnotationType::Edge
        )
    }

    /// Prefix used by the id counter for this type.
    pub fn id_prefix(self) -> &'static str {
        use AnnotationType::*;
        match self {
            Wf => "w",
            Term => "t",
            Mw => "mw",
            Component => "tc",
            Entity => "e",
            Chunk => "c",
            Dep => "dep",
            Tree => "tree",
            NonTerminal => "nter",
            Terminal => "ter",
            Edge => "tre",
            Coref => "coref",
            Opinion => "o",
            CLink => "clink",
            TLink => "tlink",
            PredicateAnchor => "an",
            Predicate => "pr",
            Role => "rl",
            Timex3 => "tmx",
            Factuality => "f",
            Factvalue => "fv",
            Mark => "m",
            Property => "p",
            Category => "cat",
            LinkedEntity => "le",
            Relation => "r",
            Topic => "top",
            Statement => "st",
        }
    }

    /// Split scope of a top type. Sub-annotations travel with their parent and
    /// report the parent-independent `Sentence` scope.
    pub fn scope(self) -> Scope {
        use AnnotationType::*;
        match self {
            TLink | CLink | PredicateAnchor | Property | Category | LinkedEntity | Relation => {
                Scope::Paragraph
            }
            Coref | Topic => Scope::Document,
            _ => Scope::Sentence,
        }
    }

    /// Copied when splitting a document into sentences.
    pub fn is_sentence_scoped(self) -> bool {
        self.scope() == Scope::Sentence
    }

    /// Copied when splitting a document into paragraphs.
    pub fn is_paragraph_scoped(self) -> bool {
        matches!(self.scope(), Scope::Sentence | Scope::Paragraph)
    }
}

impl Layer {
    /// Every layer, in catalog order.
    pub const ALL: [Layer; 21] = [
        Layer::Text,
        Layer::Terms,
        Layer::Entities,
        Layer::Chunks,
        Layer::Deps,
        Layer::Constituency,
        Layer::Coreferences,
        Layer::Opinions,
        Layer::CausalRelations,
        Layer::TemporalRelations,
        Layer::Srl,
        Layer::TimeExpressions,
        Layer::Factualities,
        Layer::FactualityLayer,
        Layer::Markables,
        Layer::Properties,
        Layer::Categories,
        Layer::LinkedEntities,
        Layer::Relations,
        Layer::Topics,
        Layer::Attribution,
    ];

    /// Top types routed into this layer, in canonical order.
    pub fn types(self) -> impl Iterator<Item = AnnotationType> {
        TOP_TYPES
            .into_iter()
            .filter(move |ty| ty.layer() == Some(self))
    }

    /// The element name used for this layer in KAF/NAF files.
    pub fn name(self) -> &'static str {
        use Layer::*;
        match self {
            Text => "text",
            Terms => "terms",
            Entities => "entities",
            Chunks => "chunks",
            Deps => "deps",
            Constituency => "constituency",
            Coreferences => "coreferences",
            Opinions => "opinions",
            CausalRelations => "causalRelations",
            TemporalRelations => "temporalRelations",
            Srl => "srl",
            TimeExpressions => "timeExpressions",
            Factualities => "factualities",
            FactualityLayer => "factualitylayer",
            Markables => "markables",
            Properties => "properties",
            Categories => "categories",
            LinkedEntities => "linkedEntities",
            Relations => "relations",
            Topics => "topics",
            Attribution => "attribution",
        }
    }

    /// Inverse of [`Layer::name`].
    pub fn from_name(name: &str) -> Option<Layer> {
        Layer::ALL.iter().copied().find(|layer| layer.name() == name)
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Selects annotations either by exact type or by layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    Type(AnnotationType),
    Layer(Layer),
}

impl Selector {
    /// Whether annotations of `ty` are selected.
    pub fn matches(self, ty: AnnotationType) -> bool {
        match self {
            Selector::Type(selected) => selected == ty,
            Selector::Layer(layer) => ty.layer() == Some(layer),
        }
    }
}

impl From<AnnotationType> for Selector {
    fn from(ty: AnnotationType) -> Self {
        Selector::Type(ty)
    }
}

impl From<Layer> for Selector {
    fn from(layer: Layer) -> Self {
        Selector::Layer(layer)
    }
}
