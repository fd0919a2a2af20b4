//! Word forms, terms and the inline records they carry.

use serde::{Deserialize, Serialize};

use super::{push_attr, AnnotationRef, Attributes, Payload, Reference};
use crate::annotation_type::AnnotationType;
use crate::span::Span;

/// A token of the raw text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Wf {
    pub offset: usize,
    pub length: usize,
    pub form: String,
    pub sent: u32,
    /// Explicit paragraph. When absent the container assigns one on insertion.
    pub para: Option<u32>,
    pub page: Option<u32>,
    pub xpath: Option<String>,
    /// Marks the first word form of a new paragraph.
    pub paragraph_start: bool,
}

impl Wf {
    pub fn new(offset: usize, length: usize, form: impl Into<String>, sent: u32) -> Self {
        Wf {
            offset,
            length,
            form: form.into(),
            sent,
            ..Wf::default()
        }
    }

    pub fn with_para(mut self, para: u32) -> Self {
        self.para = Some(para);
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Opens a new paragraph at this word form.
    pub fn starting_paragraph(mut self) -> Self {
        self.paragraph_start = true;
        self
    }
}

impl Payload for Wf {
    fn references(&self, _out: &mut Vec<Reference>) {}

    fn map_handles(&mut self, _f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {}

    fn retain_handles(&mut self, _keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        true
    }

    fn attributes(&self, out: &mut Attributes) {
        push_attr(out, "offset", Some(&self.offset));
        push_attr(out, "length", Some(&self.length));
        push_attr(out, "sent", Some(&self.sent));
        push_attr(out, "para", self.para.as_ref());
        push_attr(out, "page", self.page.as_ref());
        push_attr(out, "xpath", self.xpath.as_ref());
        push_attr(out, "form", Some(&self.form));
    }
}

/// Sentiment properties of a term.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sentiment {
    pub resource: Option<String>,
    pub polarity: Option<String>,
    pub strength: Option<String>,
    pub subjectivity: Option<String>,
    pub semantic_type: Option<String>,
    pub modifier: Option<String>,
    pub marker: Option<String>,
    pub product_feature: Option<String>,
}

impl Sentiment {
    pub(crate) fn attributes(&self, out: &mut Attributes) {
        push_attr(out, "resource", self.resource.as_ref());
        push_attr(out, "polarity", self.polarity.as_ref());
        push_attr(out, "strength", self.strength.as_ref());
        push_attr(out, "subjectivity", self.subjectivity.as_ref());
        push_attr(out, "sentiment_semantic_type", self.semantic_type.as_ref());
        push_attr(out, "sentiment_modifier", self.modifier.as_ref());
        push_attr(out, "sentiment_marker", self.marker.as_ref());
        push_attr(out, "sentiment_product_feature", self.product_feature.as_ref());
    }
}

/// Pointer into an external lexicon or ontology. May nest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExternalRef {
    pub resource: String,
    pub reference: String,
    pub reftype: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub confidence: Option<f64>,
    pub timestamp: Option<String>,
    pub children: Vec<ExternalRef>,
}

impl ExternalRef {
    pub fn new(resource: impl Into<String>, reference: impl Into<String>) -> Self {
        ExternalRef {
            resource: resource.into(),
            reference: reference.into(),
            ..ExternalRef::default()
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_child(mut self, child: ExternalRef) -> Self {
        self.children.push(child);
        self
    }
}

/// A lexical unit over word forms. The same payload backs plain terms,
/// multi-word compounds and the components of a compound.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Term {
    pub term_type: Option<String>,
    pub lemma: Option<String>,
    pub pos: Option<String>,
    pub morphofeat: Option<String>,
    pub case: Option<String>,
    pub sentiment: Option<Sentiment>,
    /// Word forms.
    pub span: Span<AnnotationRef>,
    /// Component terms, head component included. Only compounds have any.
    pub components: Span<AnnotationRef>,
    pub external_refs: Vec<ExternalRef>,
}

impl Term {
    pub fn new(span: Span<AnnotationRef>) -> Self {
        Term {
            span,
            ..Term::default()
        }
    }

    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = Some(lemma.into());
        self
    }

    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = Some(pos.into());
        self
    }

    pub fn with_type(mut self, term_type: impl Into<String>) -> Self {
        self.term_type = Some(term_type.into());
        self
    }

    pub fn is_compound(&self) -> bool {
        !self.components.is_empty()
    }

    pub fn head_component(&self) -> Option<AnnotationRef> {
        self.components.head().copied()
    }
}

impl Payload for Term {
    fn references(&self, out: &mut Vec<Reference>) {
        out.extend(self.span.iter().map(|r| (AnnotationType::Wf, *r)));
        out.extend(self.components.iter().map(|r| (AnnotationType::Component, *r)));
    }

    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        self.span = std::mem::take(&mut self.span).map(&mut *f);
        self.components = std::mem::take(&mut self.components).map(&mut *f);
    }

    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        self.span.retain(|r| keep(*r));
        self.components.retain(|r| keep(*r));
        true
    }

    fn attributes(&self, out: &mut Attributes) {
        push_attr(out, "type", self.term_type.as_ref());
        push_attr(out, "lemma", self.lemma.as_ref());
        push_attr(out, "pos", self.pos.as_ref());
        push_attr(out, "morphofeat", self.morphofeat.as_ref());
        push_attr(out, "case", self.case.as_ref());
        if let Some(sentiment) = &self.sentiment {
            sentiment.attributes(out);
        }
    }

    fn external_refs(&self) -> &[ExternalRef] {
        &self.external_refs
    }
}
