//! Entities, coreference, semantic roles, opinions and the other
//! meaning-level layers.

use serde::{Deserialize, Serialize};

use super::{push_attr, AnnotationRef, Attributes, ExternalRef, Payload, Reference};
use crate::annotation_type::AnnotationType;
use crate::error::{KafError, Result};
use crate::span::Span;

fn term_refs(span: &Span<AnnotationRef>, out: &mut Vec<Reference>) {
    out.extend(span.iter().map(|r| (AnnotationType::Term, *r)));
}

fn map_span(span: &mut Span<AnnotationRef>, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
    *span = std::mem::take(span).map(f);
}

fn retain_spans(spans: &mut Vec<Span<AnnotationRef>>, keep: &dyn Fn(AnnotationRef) -> bool) {
    for span in spans.iter_mut() {
        span.retain(|r| keep(*r));
    }
    spans.retain(|span| !span.is_empty());
}

fn require_mentions(
    annotation_type: AnnotationType,
    spans: &[Span<AnnotationRef>],
) -> Result<()> {
    if spans.is_empty() {
        return Err(KafError::EmptySpan {
            annotation_type,
            what: "span",
        });
    }
    if spans.iter().any(|span| span.is_empty()) {
        return Err(KafError::EmptySpan {
            annotation_type,
            what: "term per span",
        });
    }
    Ok(())
}

/// A named entity: one or more term spans plus a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_type: Option<String>,
    pub source: Option<String>,
    pub references: Vec<Span<AnnotationRef>>,
    pub external_refs: Vec<ExternalRef>,
}

impl Entity {
    /// Fails unless there is at least one span and every span has a term.
    pub fn new(references: Vec<Span<AnnotationRef>>) -> Result<Self> {
        let entity = Entity {
            entity_type: None,
            source: None,
            references,
            external_refs: Vec::new(),
        };
        entity.validate()?;
        Ok(entity)
    }

    pub fn with_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }
}

impl Payload for Entity {
    fn references(&self, out: &mut Vec<Reference>) {
        for span in &self.references {
            term_refs(span, out);
        }
    }

    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        for span in self.references.iter_mut() {
            map_span(span, f);
        }
    }

    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        retain_spans(&mut self.references, keep);
        true
    }

    fn validate(&self) -> Result<()> {
        require_mentions(AnnotationType::Entity, &self.references)
    }

    fn attributes(&self, out: &mut Attributes) {
        push_attr(out, "type", self.entity_type.as_ref());
        push_attr(out, "source", self.source.as_ref());
    }

    fn external_refs(&self) -> &[ExternalRef] {
        &self.external_refs
    }
}

/// A coreference cluster of term-span mentions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coref {
    pub coref_type: Option<String>,
    pub mentions: Vec<Span<AnnotationRef>>,
    pub external_refs: Vec<ExternalRef>,
}

impl Coref {
    /// Fails unless there is at least one mention and every mention has a term.
    pub fn new(mentions: Vec<Span<AnnotationRef>>) -> Result<Self> {
        let coref = Coref {
            coref_type: None,
            mentions,
            external_refs: Vec::new(),
        };
        coref.validate()?;
        Ok(coref)
    }
}

impl Payload for Coref {
    fn references(&self, out: &mut Vec<Reference>) {
        for span in &self.mentions {
            term_refs(span, out);
        }
    }

    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        for span in self.mentions.iter_mut() {
            map_span(span, f);
        }
    }

    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        retain_spans(&mut self.mentions, keep);
        true
    }

    fn validate(&self) -> Result<()> {
        require_mentions(AnnotationType::Coref, &self.mentions)
    }

    fn attributes(&self, out: &mut Attributes) {
        push_attr(out, "type", self.coref_type.as_ref());
    }

    fn external_refs(&self) -> &[ExternalRef] {
        &self.external_refs
    }
}

/// A property or category: a lemma plus the term spans that express it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Feature {
    pub lemma: String,
    pub references: Vec<Span<AnnotationRef>>,
    pub external_refs: Vec<ExternalRef>,
}

impl Feature {
    pub fn new(lemma: impl Into<String>, references: Vec<Span<AnnotationRef>>) -> Self {
        Feature {
            lemma: lemma.into(),
            references,
            external_refs: Vec::new(),
        }
    }
}

impl Payload for Feature {
    fn references(&self, out: &mut Vec<Reference>) {
        for span in &self.references {
            term_refs(span, out);
        }
    }

    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        for span in self.references.iter_mut() {
            map_span(span, f);
        }
    }

    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        retain_spans(&mut self.references, keep);
        true
    }

    fn attributes(&self, out: &mut Attributes) {
        push_attr(out, "lemma", Some(&self.lemma));
    }

    fn external_refs(&self) -> &[ExternalRef] {
        &self.external_refs
    }
}

/// Endpoint of a [`Relation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationEndpoint {
    Entity(AnnotationRef),
    Property(AnnotationRef),
    Category(AnnotationRef),
}

impl RelationEndpoint {
    pub fn handle(self) -> AnnotationRef {
        match self {
            RelationEndpoint::Entity(r) | RelationEndpoint::Property(r) | RelationEndpoint::Category(r) => r,
        }
    }

    pub fn annotation_type(self) -> AnnotationType {
        match self {
            RelationEndpoint::Entity(_) => AnnotationType::Entity,
            RelationEndpoint::Property(_) => AnnotationType::Property,
            RelationEndpoint::Category(_) => AnnotationType::Category,
        }
    }

    fn map(self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) -> Self {
        match self {
            RelationEndpoint::Entity(r) => RelationEndpoint::Entity(f(r)),
            RelationEndpoint::Property(r) => RelationEndpoint::Property(f(r)),
            RelationEndpoint::Category(r) => RelationEndpoint::Category(f(r)),
        }
    }
}

/// A typed link between entities and features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub from: RelationEndpoint,
    pub to: RelationEndpoint,
    pub confidence: Option<f64>,
    pub external_refs: Vec<ExternalRef>,
}

impl Relation {
    pub fn new(from: RelationEndpoint, to: RelationEndpoint) -> Self {
        Relation {
            from,
            to,
            confidence: None,
            external_refs: Vec::new(),
        }
    }
}

impl Payload for Relation {
    fn references(&self, out: &mut Vec<Reference>) {
        out.push((self.from.annotation_type(), self.from.handle()));
        out.push((self.to.annotation_type(), self.to.handle()));
    }

    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        self.from = self.from.map(f);
        self.to = self.to.map(f);
    }

    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        keep(self.from.handle()) && keep(self.to.handle())
    }

    fn attributes(&self, out: &mut Attributes) {
        push_attr(out, "confidence", self.confidence.as_ref());
    }

    fn external_refs(&self) -> &[ExternalRef] {
        &self.external_refs
    }
}

/// A link from word forms to an entry of a knowledge base.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinkedEntity {
    pub resource: Option<String>,
    pub reference: Option<String>,
    pub confidence: Option<f64>,
    pub span: Span<AnnotationRef>,
    pub external_refs: Vec<ExternalRef>,
}

impl LinkedEntity {
    pub fn new(span: Span<AnnotationRef>) -> Self {
        LinkedEntity {
            span,
            ..LinkedEntity::default()
        }
    }
}

impl Payload for LinkedEntity {
    fn references(&self, out: &mut Vec<Reference>) {
        out.extend(self.span.iter().map(|r| (AnnotationType::Wf, *r)));
    }

    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        map_span(&mut self.span, f);
    }

    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        self.span.retain(|r| keep(*r));
        true
    }

    fn attributes(&self, out: &mut Attributes) {
        push_attr(out, "resource", self.resource.as_ref());
        push_attr(out, "reference", self.reference.as_ref());
        push_attr(out, "confidence", self.confidence.as_ref());
    }

    fn external_refs(&self) -> &[ExternalRef] {
        &self.external_refs
    }
}

/// A document topic. Anonymous and not tied to any text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Topic {
    pub value: String,
    pub source: Option<String>,
    pub method: Option<String>,
    pub confidence: Option<f64>,
    pub uri: Option<String>,
}

impl Topic {
    pub fn new(value: impl Into<String>) -> Self {
        Topic {
            value: value.into(),
            ..Topic::default()
        }
    }
}

impl Payload for Topic {
    fn references(&self, _out: &mut Vec<Reference>) {}

    fn map_handles(&mut self, _f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {}

    fn retain_handles(&mut self, _keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        true
    }

    fn attributes(&self, out: &mut Attributes) {
        push_attr(out, "source", self.source.as_ref());
        push_attr(out, "method", self.method.as_ref());
        push_attr(out, "confidence", self.confidence.as_ref());
        push_attr(out, "uri", self.uri.as_ref());
        push_attr(out, "value", Some(&self.value));
    }
}

/// A markable over word forms.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mark {
    pub source: Option<String>,
    pub mark_type: Option<String>,
    pub lemma: Option<String>,
    pub pos: Option<String>,
    pub morphofeat: Option<String>,
    pub case: Option<String>,
    pub span: Span<AnnotationRef>,
    pub external_refs: Vec<ExternalRef>,
}

impl Mark {
    pub fn new(span: Span<AnnotationRef>) -> Self {
        Mark {
            span,
            ..Mark::default()
        }
    }
}

impl Payload for Mark {
    fn references(&self, out: &mut Vec<Reference>) {
        out.extend(self.span.iter().map(|r| (AnnotationType::Wf, *r)));
    }

    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        map_span(&mut self.span, f);
    }

    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        self.span.retain(|r| keep(*r));
        true
    }

    fn attributes(&self, out: &mut Attributes) {
        push_attr(out, "source", self.source.as_ref());
        push_attr(out, "type", self.mark_type.as_ref());
        push_attr(out, "lemma", self.lemma.as_ref());
        push_attr(out, "pos", self.pos.as_ref());
        push_attr(out, "morphofeat", self.morphofeat.as_ref());
        push_attr(out, "case", self.case.as_ref());
    }

    fn external_refs(&self) -> &[ExternalRef] {
        &self.external_refs
    }
}

/// A semantic-role predicate over terms.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Predicate {
    pub uri: Option<String>,
    pub confidence: Option<f64>,
    pub span: Span<AnnotationRef>,
    /// Owned [`Role`] annotations, in argument order.
    pub roles: Vec<AnnotationRef>,
    pub external_refs: Vec<ExternalRef>,
    pub flags: Vec<String>,
}

impl Predicate {
    pub fn new(span: Span<AnnotationRef>) -> Self {
        Predicate {
            span,
            ..Predicate::default()
        }
    }
}

impl Payload for Predicate {
    fn references(&self, out: &mut Vec<Reference>) {
        term_refs(&self.span, out);
        out.extend(self.roles.iter().map(|r| (AnnotationType::Role, *r)));
    }

    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        map_span(&mut self.span, f);
        for role in self.roles.iter_mut() {
            *role = f(*role);
        }
    }

    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        self.span.retain(|r| keep(*r));
        self.roles.retain(|r| keep(*r));
        true
    }

    fn attributes(&self, out: &mut Attributes) {
        push_attr(out, "uri", self.uri.as_ref());
        push_attr(out, "confidence", self.confidence.as_ref());
        if !self.flags.is_empty() {
            out.push(("flags", self.flags.join(" ")));
        }
    }

    fn external_refs(&self) -> &[ExternalRef] {
        &self.external_refs
    }
}

/// A semantic role of a predicate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Role {
    pub sem_role: String,
    pub span: Span<AnnotationRef>,
    pub external_refs: Vec<ExternalRef>,
    pub flags: Vec<String>,
}

impl Role {
    pub fn new(sem_role: impl Into<String>, span: Span<AnnotationRef>) -> Self {
        Role {
            sem_role: sem_role.into(),
            span,
            ..Role::default()
        }
    }
}

impl Payload for Role {
    fn references(&self, out: &mut Vec<Reference>) {
        term_refs(&self.span, out);
    }

    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        map_span(&mut self.span, f);
    }

    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        self.span.retain(|r| keep(*r));
        true
    }

    fn attributes(&self, out: &mut Attributes) {
        push_attr(out, "semRole", Some(&self.sem_role));
        if !self.flags.is_empty() {
            out.push(("flags", self.flags.join(" ")));
        }
    }

    fn external_refs(&self) -> &[ExternalRef] {
        &self.external_refs
    }
}

/// Who holds an opinion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OpinionHolder {
    pub holder_type: Option<String>,
    pub span: Span<AnnotationRef>,
}

/// What an opinion is about.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OpinionTarget {
    pub span: Span<AnnotationRef>,
}

/// The words expressing an opinion, with its sentiment attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OpinionExpression {
    pub polarity: Option<String>,
    pub strength: Option<String>,
    pub subjectivity: Option<String>,
    pub sentiment_semantic_type: Option<String>,
    pub sentiment_product_feature: Option<String>,
    pub span: Span<AnnotationRef>,
}

/// A holder / target / expression triple. Every part is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Opinion {
    pub holder: Option<OpinionHolder>,
    pub target: Option<OpinionTarget>,
    pub expression: Option<OpinionExpression>,
}

impl Opinion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spans of the parts that are present, in holder / target / expression order.
    fn spans_mut(&mut self) -> impl Iterator<Item = &mut Span<AnnotationRef>> {
        let holder = self.holder.as_mut().map(|h| &mut h.span);
        let target = self.target.as_mut().map(|t| &mut t.span);
        let expression = self.expression.as_mut().map(|e| &mut e.span);
        holder.into_iter().chain(target).chain(expression)
    }
}

impl Payload for Opinion {
    fn references(&self, out: &mut Vec<Reference>) {
        if let Some(holder) = &self.holder {
            term_refs(&holder.span, out);
        }
        if let Some(target) = &self.target {
            term_refs(&target.span, out);
        }
        if let Some(expression) = &self.expression {
            term_refs(&expression.span, out);
        }
    }

    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        for span in self.spans_mut() {
            map_span(span, f);
        }
    }

    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        for span in self.spans_mut() {
            span.retain(|r| keep(*r));
        }
        true
    }

    fn attributes(&self, out: &mut Attributes) {
        if let Some(holder) = &self.holder {
            push_attr(out, "holder_type", holder.holder_type.as_ref());
        }
        if let Some(expression) = &self.expression {
            push_attr(out, "polarity", expression.polarity.as_ref());
            push_attr(out, "strength", expression.strength.as_ref());
            push_attr(out, "subjectivity", expression.subjectivity.as_ref());
            push_attr(
                out,
                "sentiment_semantic_type",
                expression.sentiment_semantic_type.as_ref(),
            );
            push_attr(
                out,
                "sentiment_product_feature",
                expression.sentiment_product_feature.as_ref(),
            );
        }
    }
}

/// The attributed content of a statement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatementTarget {
    pub span: Span<AnnotationRef>,
}

/// Who the statement is attributed to.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatementSource {
    pub span: Span<AnnotationRef>,
}

/// The words signalling the attribution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatementCue {
    pub span: Span<AnnotationRef>,
}

/// An attribution statement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Statement {
    pub target: StatementTarget,
    pub source: Option<StatementSource>,
    pub cue: Option<StatementCue>,
}

impl Statement {
    pub fn new(target: Span<AnnotationRef>) -> Self {
        Statement {
            target: StatementTarget { span: target },
            source: None,
            cue: None,
        }
    }

    fn spans_mut(&mut self) -> impl Iterator<Item = &mut Span<AnnotationRef>> {
        let source = self.source.as_mut().map(|s| &mut s.span);
        let cue = self.cue.as_mut().map(|c| &mut c.span);
        std::iter::once(&mut self.target.span)
            .chain(source)
            .chain(cue)
    }
}

impl Payload for Statement {
    fn references(&self, out: &mut Vec<Reference>) {
        term_refs(&self.target.span, out);
        if let Some(source) = &self.source {
            term_refs(&source.span, out);
        }
        if let Some(cue) = &self.cue {
            term_refs(&cue.span, out);
        }
    }

    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        for span in self.spans_mut() {
            map_span(span, f);
        }
    }

    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        for span in self.spans_mut() {
            span.retain(|r| keep(*r));
        }
        true
    }

    fn attributes(&self, _out: &mut Attributes) {}
}
