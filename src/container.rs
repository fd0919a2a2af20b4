//! The annotation container: storage, layer routing, reference indexing and
//! the query surface.
//!
//! Annotations live in an arena and are addressed by [`AnnotationRef`]. Three
//! ordered stores index the *member* annotations:
//!
//! - by type, for every stored type (sub-annotations included),
//! - by layer, for top types only,
//! - by id, for identifiable annotations.
//!
//! The sentence, paragraph and offset of an annotation are those of its
//! *anchor word form*: the first word form reached by walking its declared
//! references depth-first, in declaration order. A compound without word
//! forms of its own anchors through its first component.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::annotation::{Annotation, AnnotationKind, AnnotationRef, Reference, TreeNodeRef};
use crate::annotation_type::{AnnotationType, Layer, Selector};
use crate::config::{ContainerConfig, RemovalPolicy};
use crate::error::{KafError, Result};
use crate::id_manager::IdManager;
use crate::reference_index::ReferenceIndex;
use crate::span::Span;

/// A layer the model does not know, kept verbatim for round-tripping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownLayer {
    pub name: String,
    pub content: String,
}

impl UnknownLayer {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        UnknownLayer {
            name: name.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    annotation: Annotation,
    /// Registered in the stores. Non-member slots only keep copied references
    /// resolvable.
    member: bool,
}

/// Maps handles of a source container to their copies while importing.
#[derive(Debug, Clone, Default)]
pub struct ImportMap {
    copies: HashMap<AnnotationRef, AnnotationRef>,
}

impl ImportMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The copy of `source`, if it was imported.
    pub fn get(&self, source: AnnotationRef) -> Option<AnnotationRef> {
        self.copies.get(&source).copied()
    }

    pub fn len(&self) -> usize {
        self.copies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.copies.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnnotationContainer {
    config: ContainerConfig,
    slots: Vec<Option<Slot>>,
    by_type: HashMap<AnnotationType, Vec<AnnotationRef>>,
    by_layer: HashMap<Layer, Vec<AnnotationRef>>,
    by_id: HashMap<String, AnnotationRef>,
    index: ReferenceIndex,
    /// sub-annotation -> parent
    owners: HashMap<AnnotationRef, AnnotationRef>,
    /// sentence -> word forms
    sentences: BTreeMap<u32, Vec<AnnotationRef>>,
    /// paragraph -> sentences, in order of first appearance
    paragraphs: BTreeMap<u32, Vec<u32>>,
    current_para: u32,
    ids: IdManager,
    unknown_layers: Vec<UnknownLayer>,
    raw_text: Option<String>,
}

impl AnnotationContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        AnnotationContainer {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ContainerConfig) {
        self.config = config;
    }

    pub fn id_manager(&self) -> &IdManager {
        &self.ids
    }

    pub fn id_manager_mut(&mut self) -> &mut IdManager {
        &mut self.ids
    }

    // ---- insertion ----

    /// Stores `annotation` at the end of its type and layer lists.
    pub fn add(&mut self, annotation: Annotation) -> Result<AnnotationRef> {
        self.insert(annotation, None, true)
    }

    /// Mints the next id for the payload's type (when it is identifiable) and stores it.
    pub fn add_new(&mut self, kind: impl Into<AnnotationKind>) -> Result<AnnotationRef> {
        let kind = kind.into();
        let ty = kind.annotation_type();
        let annotation = if ty.is_identifiable() {
            Annotation::new(self.ids.next_id(ty), kind)
        } else {
            Annotation::anonymous(kind)
        };
        self.add(annotation)
    }

    /// Stores `annotation` at `index` of its type list. In the layer list it
    /// lands right before the annotation that now follows it in the type list.
    pub fn add_at(&mut self, annotation: Annotation, index: usize) -> Result<AnnotationRef> {
        self.insert(annotation, Some(index), true)
    }

    /// Registers an annotation that is stored but not yet a member.
    ///
    /// Returns `Ok(false)` when it already was a member.
    pub fn attach(&mut self, r: AnnotationRef) -> Result<bool> {
        self.promote(r, false)
    }

    /// Declares a reverse edge `from → to` after the fact.
    pub fn index_annotation_references(&mut self, from: AnnotationRef, to: AnnotationRef) -> Result<()> {
        let from_type = self.annotation(from)?.annotation_type();
        let to_type = self.annotation(to)?.annotation_type();
        self.index.link(from, from_type, (to_type, to));
        Ok(())
    }

    /// Mutates the payload of `r`.
    ///
    /// The edited payload is validated like a fresh insertion before it
    /// replaces the stored one; on error nothing changes. The reference index,
    /// the owner map and the sentence buckets are brought up to date.
    pub fn modify<R>(&mut self, r: AnnotationRef, f: impl FnOnce(&mut AnnotationKind) -> R) -> Result<R> {
        let annotation = self.annotation(r)?;
        let ty = annotation.annotation_type();
        let previous_refs = annotation.references();
        let mut kind = annotation.kind().clone();
        let out = f(&mut kind);
        if kind.annotation_type() != ty {
            return Err(KafError::TypeMismatch {
                expected: vec![ty],
                found: kind.annotation_type(),
            });
        }
        let references = kind.references();
        self.check_payload(r, &kind, &references)?;

        for (ref_type, target) in previous_refs {
            if !ref_type.is_top() && !references.iter().any(|(_, t)| *t == target) && self.owners.get(&target) == Some(&r) {
                self.owners.remove(&target);
            }
        }
        if let Some(slot) = self.slots.get_mut(r.0).and_then(|s| s.as_mut()) {
            *slot.annotation.kind_mut() = kind;
        }
        self.index.set_outgoing(r, ty, references.clone());
        self.adopt(r, &references);
        if ty == AnnotationType::Wf {
            self.rebuild_text_buckets();
        }
        Ok(out)
    }

    /// Appends `child` (a terminal or non-terminal) to the children of the non-terminal `parent`.
    pub fn add_tree_child(&mut self, parent: AnnotationRef, child: AnnotationRef, is_head: bool) -> Result<()> {
        let node = match self.annotation(child)?.annotation_type() {
            AnnotationType::NonTerminal => TreeNodeRef::NonTerminal(child),
            AnnotationType::Terminal => TreeNodeRef::Terminal(child),
            found => {
                return Err(KafError::TypeMismatch {
                    expected: vec![AnnotationType::NonTerminal, AnnotationType::Terminal],
                    found,
                })
            }
        };
        let found = self.annotation(parent)?.annotation_type();
        expect_type(found, &[AnnotationType::NonTerminal])?;
        self.modify(parent, |kind| {
            if let Some(parent) = kind.as_non_terminal_mut() {
                add_to_span(&mut parent.children, node, is_head);
            }
        })
    }

    /// Appends `component` to the components of the term or compound `compound`.
    pub fn add_component(&mut self, compound: AnnotationRef, component: AnnotationRef, is_head: bool) -> Result<()> {
        let found = self.annotation(compound)?.annotation_type();
        expect_type(found, &[AnnotationType::Term, AnnotationType::Mw])?;
        self.modify(compound, |kind| {
            if let AnnotationKind::Term(term) | AnnotationKind::Mw(term) = kind {
                add_to_span(&mut term.components, component, is_head);
            }
        })
    }

    /// Appends `role` to the roles of `predicate`.
    pub fn add_role(&mut self, predicate: AnnotationRef, role: AnnotationRef) -> Result<()> {
        let found = self.annotation(predicate)?.annotation_type();
        expect_type(found, &[AnnotationType::Predicate])?;
        self.modify(predicate, |kind| {
            if let Some(predicate) = kind.as_predicate_mut() {
                predicate.roles.push(role);
            }
        })
    }

    /// Copies `r` from `source` as a member of this container.
    ///
    /// Everything `r` references is copied too: owned sub-annotations as
    /// members, other annotations as non-members that only keep the copy's
    /// references resolvable. A non-member copy is promoted when it is
    /// imported explicitly later on. Identifiable members get fresh ids.
    pub fn import(&mut self, source: &AnnotationContainer, r: AnnotationRef, copies: &mut ImportMap) -> Result<AnnotationRef> {
        self.import_slot(source, r, copies, true)
    }

    fn import_slot(
        &mut self,
        source: &AnnotationContainer,
        r: AnnotationRef,
        copies: &mut ImportMap,
        member: bool,
    ) -> Result<AnnotationRef> {
        if let Some(copy) = copies.get(r) {
            if member {
                self.promote(copy, true)?;
            }
            return Ok(copy);
        }
        let original = source.annotation(r)?;
        for (ref_type, target) in original.references() {
            self.import_slot(source, target, copies, member && !ref_type.is_top())?;
        }

        let mut copy = original.clone();
        copy.kind_mut()
            .map_handles(&mut |h: AnnotationRef| copies.get(h).unwrap_or(h));
        if let Some(edge_id) = copy.kind_mut().edge_id_mut() {
            *edge_id = None;
        }
        let ty = copy.annotation_type();
        if member && ty.is_identifiable() {
            copy.set_id(Some(self.ids.next_id(ty)));
        }
        let new = self.insert(copy, None, member)?;
        copies.copies.insert(r, new);
        Ok(new)
    }

    fn insert(&mut self, annotation: Annotation, position: Option<usize>, member: bool) -> Result<AnnotationRef> {
        let ty = annotation.annotation_type();
        match (ty.is_identifiable(), annotation.id()) {
            (true, None) => return Err(KafError::MissingId(ty)),
            (false, Some(id)) => {
                return Err(KafError::UnexpectedId {
                    annotation_type: ty,
                    id: id.to_string(),
                })
            }
            _ => {}
        }
        if member {
            if let Some(id) = annotation.id() {
                if self.by_id.contains_key(id) {
                    return Err(KafError::DuplicateId(id.to_string()));
                }
            }
        }
        let r = AnnotationRef(self.slots.len());
        let references = annotation.references();
        self.check_payload(r, annotation.kind(), &references)?;

        if member {
            if let Some(id) = annotation.id() {
                self.ids.reconcile(ty, id);
            }
            if let Some(edge_id) = annotation.kind().edge_id() {
                self.ids.reconcile(AnnotationType::Edge, edge_id);
            }
        }
        log::trace!("storing {:?} {:?} as {}", ty, annotation.id(), r);
        self.slots.push(Some(Slot {
            annotation,
            member: false,
        }));
        self.index.set_outgoing(r, ty, references.clone());
        self.adopt(r, &references);
        if member {
            self.register(r, position);
        }
        Ok(r)
    }

    /// Validates the payload and its references as they would be stored under `r`.
    fn check_payload(&self, r: AnnotationRef, kind: &AnnotationKind, references: &[Reference]) -> Result<()> {
        kind.validate()?;
        for (expected, target) in references {
            let found = self.annotation(*target)?.annotation_type();
            if !expected.accepts(found) {
                return Err(KafError::TypeMismatch {
                    expected: vec![*expected],
                    found,
                });
            }
            if !expected.is_top() {
                if let Some(owner) = self.owners.get(target) {
                    if *owner != r {
                        return Err(KafError::AlreadyOwned {
                            child: target.0,
                            owner: owner.0,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Records `parent` as owner of its sub-annotations and mints edge ids for
    /// newly adopted tree nodes.
    fn adopt(&mut self, parent: AnnotationRef, references: &[Reference]) {
        for (ty, child) in references {
            if ty.is_top() {
                continue;
            }
            self.owners.insert(*child, parent);
            let Some(slot) = self.slots.get_mut(child.0).and_then(|s| s.as_mut()) else {
                continue;
            };
            if let Some(edge_id) = slot.annotation.kind_mut().edge_id_mut() {
                if edge_id.is_none() {
                    *edge_id = Some(self.ids.next_id(AnnotationType::Edge));
                }
            }
        }
    }

    /// Makes a stored annotation a member, with its owned sub-annotations.
    fn promote(&mut self, r: AnnotationRef, fresh_id: bool) -> Result<bool> {
        let (ty, member, id) = {
            let slot = self.slot(r)?;
            (
                slot.annotation.annotation_type(),
                slot.member,
                slot.annotation.id().map(str::to_string),
            )
        };
        if member {
            return Ok(false);
        }
        let id = match id {
            Some(_) if fresh_id => Some(self.ids.next_id(ty)),
            other => other,
        };
        if let Some(id) = &id {
            if self.by_id.contains_key(id) {
                return Err(KafError::DuplicateId(id.clone()));
            }
            self.ids.reconcile(ty, id);
        }
        let children: Vec<AnnotationRef> = self
            .index
            .outgoing(r)
            .iter()
            .filter(|(ty, _)| !ty.is_top())
            .map(|(_, child)| *child)
            .collect();
        if let Some(slot) = self.slots.get_mut(r.0).and_then(|s| s.as_mut()) {
            slot.annotation.set_id(id);
        }
        self.register(r, None);
        for child in children {
            if self.owners.get(&child) == Some(&r) {
                self.promote(child, fresh_id)?;
            }
        }
        Ok(true)
    }

    fn register(&mut self, r: AnnotationRef, position: Option<usize>) {
        let Some(slot) = self.slots.get_mut(r.0).and_then(|s| s.as_mut()) else {
            return;
        };
        slot.member = true;
        let ty = slot.annotation.annotation_type();

        if let AnnotationKind::Wf(wf) = slot.annotation.kind_mut() {
            let para = match wf.para {
                Some(para) => para,
                None if wf.paragraph_start || self.current_para == 0 => self.current_para + 1,
                None => self.current_para,
            };
            wf.para = Some(para);
            self.current_para = para;
        }
        if let Some(id) = slot.annotation.id() {
            self.by_id.insert(id.to_string(), r);
        }

        let type_list = self.by_type.entry(ty).or_default();
        let follower = match position {
            Some(index) if index < type_list.len() => {
                let follower = type_list[index];
                type_list.insert(index, r);
                Some(follower)
            }
            _ => {
                type_list.push(r);
                None
            }
        };
        if let Some(layer) = ty.layer() {
            let layer_list = self.by_layer.entry(layer).or_default();
            match follower.and_then(|f| layer_list.iter().position(|x| *x == f)) {
                Some(at) => layer_list.insert(at, r),
                None => layer_list.push(r),
            }
        }

        if ty == AnnotationType::Wf {
            if follower.is_some() {
                self.rebuild_text_buckets();
            } else {
                self.bucket_wf(r);
            }
        }
    }

    fn bucket_wf(&mut self, r: AnnotationRef) {
        let Some(wf) = self.get(r).and_then(|a| a.kind().as_wf()) else {
            return;
        };
        let (sent, para) = (wf.sent, wf.para.unwrap_or(1));
        self.sentences.entry(sent).or_default().push(r);
        let sents = self.paragraphs.entry(para).or_default();
        if !sents.contains(&sent) {
            sents.push(sent);
        }
    }

    fn rebuild_text_buckets(&mut self) {
        self.sentences.clear();
        self.paragraphs.clear();
        let wfs = self.by_type.get(&AnnotationType::Wf).cloned().unwrap_or_default();
        for wf in wfs {
            self.bucket_wf(wf);
        }
    }

    // ---- lookup ----

    /// The annotation behind `r`, member or not.
    pub fn get(&self, r: AnnotationRef) -> Option<&Annotation> {
        self.slots
            .get(r.0)
            .and_then(|s| s.as_ref())
            .map(|s| &s.annotation)
    }

    /// Whether `r` is registered in the stores.
    pub fn is_member(&self, r: AnnotationRef) -> bool {
        self.slots
            .get(r.0)
            .and_then(|s| s.as_ref())
            .map_or(false, |s| s.member)
    }

    pub fn annotation_by_id(&self, id: &str) -> Option<AnnotationRef> {
        self.by_id.get(id).copied()
    }

    /// The parent owning the sub-annotation `r`: the compound of a component,
    /// the predicate of a role, the parent node of a tree node.
    pub fn parent_of(&self, r: AnnotationRef) -> Option<AnnotationRef> {
        self.owners.get(&r).copied()
    }

    /// Member annotations of a type or layer, in insertion order.
    pub fn annotations(&self, selector: impl Into<Selector>) -> &[AnnotationRef] {
        let list = match selector.into() {
            Selector::Type(ty) => self.by_type.get(&ty),
            Selector::Layer(layer) => self.by_layer.get(&layer),
        };
        list.map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Number of member annotations.
    pub fn len(&self) -> usize {
        self.by_type.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn annotations_by_sent(&self, sent: u32, selector: impl Into<Selector>) -> Vec<AnnotationRef> {
        self.annotations(selector)
            .iter()
            .copied()
            .filter(|r| self.sent_of(*r) == Some(sent))
            .collect()
    }

    pub fn annotations_by_para(&self, para: u32, selector: impl Into<Selector>) -> Vec<AnnotationRef> {
        self.annotations(selector)
            .iter()
            .copied()
            .filter(|r| self.para_of(*r) == Some(para))
            .collect()
    }

    /// Members of the selected type or layer that reference `target`
    /// transitively, `target` itself included when it matches.
    pub fn annotations_by(&self, target: AnnotationRef, selector: impl Into<Selector>) -> Vec<AnnotationRef> {
        self.annotations_by_any(&[target], selector)
    }

    /// Union of [`annotations_by`](Self::annotations_by) over `targets`.
    pub fn annotations_by_any(&self, targets: &[AnnotationRef], selector: impl Into<Selector>) -> Vec<AnnotationRef> {
        let mut seen: HashSet<AnnotationRef> = targets.iter().copied().collect();
        let mut queue: VecDeque<AnnotationRef> = targets.iter().copied().collect();
        while let Some(next) = queue.pop_front() {
            for source in self.index.referencing(next) {
                if seen.insert(source) {
                    queue.push_back(source);
                }
            }
        }
        self.annotations(selector)
            .iter()
            .copied()
            .filter(|r| seen.contains(r))
            .collect()
    }

    /// Everything reachable from `r` through declared references, grouped by
    /// type in depth-first discovery order. `r` itself is not included.
    pub fn referenced_closure(&self, r: AnnotationRef) -> BTreeMap<AnnotationType, Vec<AnnotationRef>> {
        let mut grouped: BTreeMap<AnnotationType, Vec<AnnotationRef>> = BTreeMap::new();
        let mut seen = HashSet::new();
        seen.insert(r);
        let mut stack: Vec<AnnotationRef> = self.declared_targets(r).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            let Some(annotation) = self.get(next) else {
                continue;
            };
            grouped.entry(annotation.annotation_type()).or_default().push(next);
            stack.extend(self.declared_targets(next).into_iter().rev());
        }
        grouped
    }

    fn declared_targets(&self, r: AnnotationRef) -> Vec<AnnotationRef> {
        self.get(r)
            .map(|a| a.references().into_iter().map(|(_, t)| t).collect())
            .unwrap_or_default()
    }

    /// The word form defining the sentence, paragraph and offset of `r`.
    pub fn anchor_wf(&self, r: AnnotationRef) -> Option<AnnotationRef> {
        let mut seen = HashSet::new();
        let mut stack = vec![r];
        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            let Some(annotation) = self.get(next) else {
                continue;
            };
            if annotation.annotation_type() == AnnotationType::Wf {
                return Some(next);
            }
            stack.extend(self.declared_targets(next).into_iter().rev());
        }
        None
    }

    pub fn sent_of(&self, r: AnnotationRef) -> Option<u32> {
        self.anchor(r).map(|wf| wf.sent)
    }

    pub fn para_of(&self, r: AnnotationRef) -> Option<u32> {
        self.anchor(r).and_then(|wf| wf.para)
    }

    pub fn offset_of(&self, r: AnnotationRef) -> Option<usize> {
        self.anchor(r).map(|wf| wf.offset)
    }

    /// Offset of the first target of `span`.
    pub fn span_offset(&self, span: &Span<AnnotationRef>) -> Option<usize> {
        span.first_target().and_then(|r| self.offset_of(*r))
    }

    fn anchor(&self, r: AnnotationRef) -> Option<&crate::annotation::Wf> {
        self.anchor_wf(r)
            .and_then(|wf| self.get(wf))
            .and_then(|a| a.kind().as_wf())
    }

    /// Word forms of `sent`, in insertion order.
    pub fn sentence_wfs(&self, sent: u32) -> &[AnnotationRef] {
        self.sentences.get(&sent).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Sentence numbers in ascending order.
    pub fn sentences(&self) -> impl Iterator<Item = u32> + '_ {
        self.sentences.keys().copied()
    }

    /// Paragraph numbers in ascending order.
    pub fn paragraphs(&self) -> impl Iterator<Item = u32> + '_ {
        self.paragraphs.keys().copied()
    }

    pub fn first_sentence(&self) -> Option<u32> {
        self.sentences.keys().next().copied()
    }

    pub fn num_sentences(&self) -> usize {
        self.sentences.len()
    }

    pub fn first_paragraph(&self) -> Option<u32> {
        self.paragraphs.keys().next().copied()
    }

    pub fn num_paragraphs(&self) -> usize {
        self.paragraphs.len()
    }

    /// Sentences of `para`, in order of first appearance.
    pub fn sents_by_para(&self, para: u32) -> &[u32] {
        self.paragraphs.get(&para).map(|v| v.as_slice()).unwrap_or(&[])
    }

    // ---- pass-through data ----

    pub fn add_unknown_layer(&mut self, layer: UnknownLayer) {
        self.unknown_layers.push(layer);
    }

    pub fn unknown_layers(&self) -> &[UnknownLayer] {
        &self.unknown_layers
    }

    pub fn raw_text(&self) -> Option<&str> {
        self.raw_text.as_deref()
    }

    pub fn set_raw_text(&mut self, raw_text: impl Into<String>) {
        self.raw_text = Some(raw_text.into());
    }

    // ---- removal ----

    /// Drops every annotation of `layer`, with the sub-annotations they own.
    ///
    /// Surviving annotations that reference the layer are handled according
    /// to [`ContainerConfig::removal_policy`]. Returns the removed handles.
    pub fn remove(&mut self, layer: Layer) -> Result<Vec<AnnotationRef>> {
        let roots = self.by_layer.get(&layer).cloned().unwrap_or_default();
        let dropped = self.with_owned_descendants(roots);
        let dropped_set: HashSet<AnnotationRef> = dropped.iter().copied().collect();

        if self.config.removal_policy == RemovalPolicy::Refuse {
            for r in dropped.iter() {
                if let Some(survivor) = self.index.referencing(*r).find(|s| !dropped_set.contains(s)) {
                    return Err(KafError::LayerReferenced {
                        layer,
                        referenced_by: self.describe(survivor),
                    });
                }
            }
        }

        log::debug!("removing layer {} ({} annotations)", layer, dropped.len());
        self.drop_slots(&dropped);
        let mut removed = dropped;
        if self.config.removal_policy == RemovalPolicy::Detach {
            removed.extend(self.detach_stale());
        }
        Ok(removed)
    }

    fn with_owned_descendants(&self, roots: Vec<AnnotationRef>) -> Vec<AnnotationRef> {
        let mut all = roots;
        let mut i = 0;
        while i < all.len() {
            let parent = all[i];
            for (ty, child) in self.index.outgoing(parent) {
                if !ty.is_top() && self.owners.get(child) == Some(&parent) && !all.contains(child) {
                    all.push(*child);
                }
            }
            i += 1;
        }
        all
    }

    fn drop_slots(&mut self, dropped: &[AnnotationRef]) {
        let dropped_set: HashSet<AnnotationRef> = dropped.iter().copied().collect();
        let mut touched_text = false;
        for r in dropped {
            let Some(slot) = self.slots.get_mut(r.0).and_then(|s| s.take()) else {
                continue;
            };
            if let Some(id) = slot.annotation.id() {
                if self.by_id.get(id) == Some(r) {
                    self.by_id.remove(id);
                }
            }
            touched_text |= slot.annotation.annotation_type() == AnnotationType::Wf;
            self.index.forget(*r);
            self.owners.remove(r);
        }
        for list in self.by_type.values_mut().chain(self.by_layer.values_mut()) {
            list.retain(|r| !dropped_set.contains(r));
        }
        if touched_text {
            self.rebuild_text_buckets();
        }
    }

    /// Strips handles to removed annotations from survivors, removing the
    /// survivors that cannot stand without them.
    fn detach_stale(&mut self) -> Vec<AnnotationRef> {
        let mut cascaded = Vec::new();
        loop {
            let stale: Vec<AnnotationRef> = (0..self.slots.len())
                .map(AnnotationRef)
                .filter(|r| {
                    self.index
                        .outgoing(*r)
                        .iter()
                        .any(|(_, t)| self.get(*t).is_none())
                })
                .collect();
            if stale.is_empty() {
                return cascaded;
            }
            let mut invalid = Vec::new();
            for r in stale {
                let live: HashSet<AnnotationRef> = self
                    .index
                    .outgoing(r)
                    .iter()
                    .map(|(_, t)| *t)
                    .filter(|t| self.get(*t).is_some())
                    .collect();
                let Some(slot) = self.slots.get_mut(r.0).and_then(|s| s.as_mut()) else {
                    continue;
                };
                let kind = slot.annotation.kind_mut();
                let intact = kind.retain_handles(&|h: AnnotationRef| live.contains(&h));
                let valid = intact && kind.validate().is_ok();
                let ty = kind.annotation_type();
                let references = kind.references();
                self.index.set_outgoing(r, ty, references);
                if !valid {
                    invalid.push(r);
                }
            }
            if invalid.is_empty() {
                return cascaded;
            }
            for r in invalid.iter() {
                log::warn!("removing {} after its references were removed", self.describe(*r));
            }
            let invalid = self.with_owned_descendants(invalid);
            self.drop_slots(&invalid);
            cascaded.extend(invalid);
        }
    }

    // ---- helpers ----

    fn slot(&self, r: AnnotationRef) -> Result<&Slot> {
        self.slots
            .get(r.0)
            .and_then(|s| s.as_ref())
            .ok_or(KafError::UnknownAnnotation(r.0))
    }

    fn annotation(&self, r: AnnotationRef) -> Result<&Annotation> {
        self.slot(r).map(|s| &s.annotation)
    }

    /// Id of `r` or its handle, for messages.
    fn describe(&self, r: AnnotationRef) -> String {
        match self.get(r) {
            Some(annotation) => match annotation.id() {
                Some(id) => id.to_string(),
                None => format!("{:?} {}", annotation.annotation_type(), r),
            },
            None => r.to_string(),
        }
    }
}

fn add_to_span<T: Clone + PartialEq>(span: &mut Span<T>, target: T, is_head: bool) {
    if is_head {
        span.add_head_target(target);
    } else {
        span.add_target(target);
    }
}

fn expect_type(found: AnnotationType, expected: &[AnnotationType]) -> Result<()> {
    if expected.contains(&found) {
        Ok(())
    } else {
        Err(KafError::TypeMismatch {
            expected: expected.to_vec(),
            found,
        })
    }
}
