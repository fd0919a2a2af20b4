//! Bidirectional index over declared annotation references.
//!
//! References are declared on the **source** annotation and point at
//! **targets**:
//!
//! ```text
//! [Chunk c1] --TERM--> [Term t1]
//!     ↑ source            ↑ target
//! ```
//!
//! Forward lookups read the declaration snapshot kept in `outgoing`. Reverse
//! lookups ("who points at t1?") read `incoming`, grouped by the type of the
//! referencing annotation so that typed reverse queries only touch the
//! relevant bucket.
//!
//! Edges added after the fact with [`ReferenceIndex::link`] are not part of
//! any payload. They are kept aside and merged into every later declaration
//! of their source until the source or the target is forgotten.

use std::collections::{BTreeMap, HashMap};

use crate::annotation::{AnnotationRef, Reference};
use crate::annotation_type::AnnotationType;

#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    /// source -> [(declared target type, target)], in declaration order
    outgoing: HashMap<AnnotationRef, Vec<Reference>>,
    /// source type, per source
    source_types: HashMap<AnnotationRef, AnnotationType>,
    /// target -> source type -> [source], in insertion order
    incoming: HashMap<AnnotationRef, BTreeMap<AnnotationType, Vec<AnnotationRef>>>,
    /// source -> edges added through `link`
    late: HashMap<AnnotationRef, Vec<Reference>>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the declared references of `source`, adding and removing the
    /// reverse entries that changed. Late edges of `source` are kept.
    pub fn set_outgoing(
        &mut self,
        source: AnnotationRef,
        source_type: AnnotationType,
        mut references: Vec<Reference>,
    ) {
        if let Some(late) = self.late.get(&source) {
            for edge in late {
                if !references.contains(edge) {
                    references.push(*edge);
                }
            }
        }
        self.source_types.insert(source, source_type);
        let previous = self.outgoing.remove(&source).unwrap_or_default();
        for (_, target) in previous.iter() {
            if !references.iter().any(|(_, r)| r == target) {
                self.unlink_incoming(*target, source_type, source);
            }
        }
        for (_, target) in references.iter() {
            self.link_incoming(*target, source_type, source);
        }
        self.outgoing.insert(source, references);
    }

    /// Adds a single edge without touching the rest of the declaration.
    ///
    /// The edge survives later calls to [`set_outgoing`](Self::set_outgoing).
    pub fn link(&mut self, source: AnnotationRef, source_type: AnnotationType, target: Reference) {
        let late = self.late.entry(source).or_default();
        if !late.contains(&target) {
            late.push(target);
        }
        self.source_types.insert(source, source_type);
        let outgoing = self.outgoing.entry(source).or_default();
        if !outgoing.contains(&target) {
            outgoing.push(target);
        }
        self.link_incoming(target.1, source_type, source);
    }

    /// Declared references of `source`.
    pub fn outgoing(&self, source: AnnotationRef) -> &[Reference] {
        self.outgoing.get(&source).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Annotations of `source_type` pointing directly at `target`.
    pub fn incoming(&self, target: AnnotationRef, source_type: AnnotationType) -> &[AnnotationRef] {
        self.incoming
            .get(&target)
            .and_then(|by_type| by_type.get(&source_type))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Every annotation pointing directly at `target`, grouped by type.
    pub fn referencing(&self, target: AnnotationRef) -> impl Iterator<Item = AnnotationRef> + '_ {
        self.incoming
            .get(&target)
            .into_iter()
            .flat_map(|by_type| by_type.values())
            .flat_map(|sources| sources.iter().copied())
    }

    /// Drops `source` from both directions.
    pub fn forget(&mut self, source: AnnotationRef) {
        let source_type = self.source_types.remove(&source);
        if let (Some(previous), Some(source_type)) = (self.outgoing.remove(&source), source_type) {
            for (_, target) in previous {
                self.unlink_incoming(target, source_type, source);
            }
        }
        self.incoming.remove(&source);
        self.late.remove(&source);
        self.late.retain(|_, edges| {
            edges.retain(|(_, target)| *target != source);
            !edges.is_empty()
        });
    }

    fn link_incoming(&mut self, target: AnnotationRef, source_type: AnnotationType, source: AnnotationRef) {
        let sources = self
            .incoming
            .entry(target)
            .or_default()
            .entry(source_type)
            .or_default();
        if !sources.contains(&source) {
            sources.push(source);
        }
    }

    fn unlink_incoming(&mut self, target: AnnotationRef, source_type: AnnotationType, source: AnnotationRef) {
        if let Some(by_type) = self.incoming.get_mut(&target) {
            if let Some(sources) = by_type.get_mut(&source_type) {
                sources.retain(|s| *s != source);
                if sources.is_empty() {
                    by_type.remove(&source_type);
                }
            }
            if by_type.is_empty() {
                self.incoming.remove(&target);
            }
        }
    }
}
