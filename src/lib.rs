#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]
//! Annotation graph core for KAF/NAF documents.
//!
//! Linguistic annotations (word forms, terms, chunks, dependencies, entities,
//! temporal expressions, ...) are stored in an [`AnnotationContainer`] and
//! point at each other through [`AnnotationRef`] handles. The container keeps
//! them ordered per type and per layer, indexes who references whom, and
//! answers positional queries by sentence and paragraph.
//!
//! ```
//! use layered_kaf::{Annotation, AnnotationContainer, AnnotationType, Dep, Span, Term, Wf};
//!
//! let mut container = AnnotationContainer::new();
//! let w1 = container.add_new(Wf::new(0, 4, "Dogs", 1)).unwrap();
//! let w2 = container.add_new(Wf::new(5, 4, "bark", 1)).unwrap();
//! let t1 = container.add_new(Term::new(Span::from_targets(vec![w1]))).unwrap();
//! let t2 = container.add_new(Term::new(Span::from_targets(vec![w2]))).unwrap();
//! container.add(Annotation::anonymous(Dep::new(t2, t1, "nsubj"))).unwrap();
//!
//! assert_eq!(container.annotations_by(w1, AnnotationType::Term), vec![t1]);
//! assert_eq!(container.dependency_graph().terms_head(&[t1, t2]), Some(t2));
//! ```

mod annotation;
mod annotation_type;
mod config;
mod container;
mod dep_graph;
mod display;
mod error;
mod id_manager;
mod reference_index;
mod snapshot;
mod span;

// Catalog
pub use annotation_type::{AnnotationType, Layer, Scope, Selector, TOP_TYPES};

// Annotations
pub use annotation::{
    Annotation, AnnotationKind, AnnotationRef, Attributes, CLink, Chunk, Coref, Dep, Entity,
    ExternalRef, FactVal, Factuality, Factvalue, Feature, LinkedEntity, Mark, NonTerminal,
    Opinion, OpinionExpression, OpinionHolder, OpinionTarget, Predicate, PredicateAnchor,
    Reference, Relation, RelationEndpoint, Role, Sentiment, Statement, StatementCue,
    StatementSource, StatementTarget, TLink, TLinkEndpoint, Term, Terminal, Timex3, Topic, Tree,
    TreeNodeRef, Wf,
};
pub use span::Span;

// Storage and queries
pub use config::{ContainerConfig, RemovalPolicy};
pub use container::{AnnotationContainer, ImportMap, UnknownLayer};
pub use dep_graph::{dep_path_letter, DependencyGraph};
pub use id_manager::IdManager;
pub use reference_index::ReferenceIndex;

// Inspection
pub use display::SentenceDisplay;
pub use snapshot::{AnnotationData, ContainerSnapshot, ReferenceData};

pub use error::{KafError, Result};
