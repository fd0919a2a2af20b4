//! Time expressions, temporal and causal links, and factuality.

use serde::{Deserialize, Serialize};

use super::{push_attr, AnnotationRef, Attributes, Payload, Reference};
use crate::annotation_type::AnnotationType;
use crate::span::Span;

/// A TimeML-style temporal expression.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Timex3 {
    pub timex_type: String,
    /// Another time expression marking the start of this one.
    pub begin_point: Option<AnnotationRef>,
    pub end_point: Option<AnnotationRef>,
    pub quant: Option<String>,
    pub freq: Option<String>,
    pub function_in_document: Option<String>,
    pub temporal_function: Option<bool>,
    pub value: Option<String>,
    pub value_from_function: Option<String>,
    pub modifier: Option<String>,
    pub anchor_time_id: Option<String>,
    pub comment: Option<String>,
    /// Word forms, absent for document-creation times.
    pub span: Option<Span<AnnotationRef>>,
}

impl Timex3 {
    pub fn new(timex_type: impl Into<String>) -> Self {
        Timex3 {
            timex_type: timex_type.into(),
            ..Timex3::default()
        }
    }

    pub fn with_span(mut self, span: Span<AnnotationRef>) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl Payload for Timex3 {
    fn references(&self, out: &mut Vec<Reference>) {
        if let Some(span) = &self.span {
            out.extend(span.iter().map(|r| (AnnotationType::Wf, *r)));
        }
        out.extend(
            self.begin_point
                .iter()
                .chain(self.end_point.iter())
                .map(|r| (AnnotationType::Timex3, *r)),
        );
    }

    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        if let Some(span) = self.span.take() {
            self.span = Some(span.map(&mut *f));
        }
        self.begin_point = self.begin_point.map(&mut *f);
        self.end_point = self.end_point.map(&mut *f);
    }

    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        if let Some(span) = self.span.as_mut() {
            span.retain(|r| keep(*r));
        }
        self.begin_point = self.begin_point.filter(|r| keep(*r));
        self.end_point = self.end_point.filter(|r| keep(*r));
        true
    }

    fn attributes(&self, out: &mut Attributes) {
        push_attr(out, "type", Some(&self.timex_type));
        push_attr(out, "quant", self.quant.as_ref());
        push_attr(out, "freq", self.freq.as_ref());
        push_attr(out, "functionInDocument", self.function_in_document.as_ref());
        push_attr(out, "temporalFunction", self.temporal_function.as_ref());
        push_attr(out, "value", self.value.as_ref());
        push_attr(out, "valueFromFunction", self.value_from_function.as_ref());
        push_attr(out, "mod", self.modifier.as_ref());
        push_attr(out, "anchorTimeID", self.anchor_time_id.as_ref());
        push_attr(out, "comment", self.comment.as_ref());
    }
}

/// Endpoint of a [`TLink`]: a time expression or a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TLinkEndpoint {
    Timex3(AnnotationRef),
    Predicate(AnnotationRef),
}

impl TLinkEndpoint {
    pub fn handle(self) -> AnnotationRef {
        match self {
            TLinkEndpoint::Timex3(r) | TLinkEndpoint::Predicate(r) => r,
        }
    }

    pub fn annotation_type(self) -> AnnotationType {
        match self {
            TLinkEndpoint::Timex3(_) => AnnotationType::Timex3,
            TLinkEndpoint::Predicate(_) => AnnotationType::Predicate,
        }
    }

    fn map(self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) -> Self {
        match self {
            TLinkEndpoint::Timex3(r) => TLinkEndpoint::Timex3(f(r)),
            TLinkEndpoint::Predicate(r) => TLinkEndpoint::Predicate(f(r)),
        }
    }
}

/// A temporal relation between two events or times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TLink {
    pub from: TLinkEndpoint,
    pub to: TLinkEndpoint,
    pub rel_type: String,
}

impl TLink {
    pub fn new(from: TLinkEndpoint, to: TLinkEndpoint, rel_type: impl Into<String>) -> Self {
        TLink {
            from,
            to,
            rel_type: rel_type.into(),
        }
    }
}

impl Payload for TLink {
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
        push_attr(out, "relType", Some(&self.rel_type));
    }
}

/// A causal relation between two predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CLink {
    pub from: AnnotationRef,
    pub to: AnnotationRef,
    pub rel_type: Option<String>,
}

impl CLink {
    pub fn new(from: AnnotationRef, to: AnnotationRef) -> Self {
        CLink {
            from,
            to,
            rel_type: None,
        }
    }
}

impl Payload for CLink {
    fn references(&self, out: &mut Vec<Reference>) {
        out.push((AnnotationType::Predicate, self.from));
        out.push((AnnotationType::Predicate, self.to));
    }

    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        self.from = f(self.from);
        self.to = f(self.to);
    }

    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        keep(self.from) && keep(self.to)
    }

    fn attributes(&self, out: &mut Attributes) {
        push_attr(out, "relType", self.rel_type.as_ref());
    }
}

/// Anchors predicates to time expressions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PredicateAnchor {
    pub anchor_time: Option<AnnotationRef>,
    pub begin_point: Option<AnnotationRef>,
    pub end_point: Option<AnnotationRef>,
    /// Anchored predicates.
    pub span: Span<AnnotationRef>,
}

impl PredicateAnchor {
    pub fn new(span: Span<AnnotationRef>) -> Self {
        PredicateAnchor {
            span,
            ..PredicateAnchor::default()
        }
    }
}

impl Payload for PredicateAnchor {
    fn references(&self, out: &mut Vec<Reference>) {
        out.extend(self.span.iter().map(|r| (AnnotationType::Predicate, *r)));
        out.extend(
            self.anchor_time
                .iter()
                .chain(self.begin_point.iter())
                .chain(self.end_point.iter())
                .map(|r| (AnnotationType::Timex3, *r)),
        );
    }

    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        self.span = std::mem::take(&mut self.span).map(&mut *f);
        self.anchor_time = self.anchor_time.map(&mut *f);
        self.begin_point = self.begin_point.map(&mut *f);
        self.end_point = self.end_point.map(&mut *f);
    }

    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        self.span.retain(|r| keep(*r));
        self.anchor_time = self.anchor_time.filter(|r| keep(*r));
        self.begin_point = self.begin_point.filter(|r| keep(*r));
        self.end_point = self.end_point.filter(|r| keep(*r));
        true
    }

    fn attributes(&self, _out: &mut Attributes) {}
}

/// One factuality judgement from one resource.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FactVal {
    pub value: String,
    pub resource: String,
    pub confidence: Option<f64>,
    pub source: Option<String>,
}

/// Factuality of the events expressed by a term span.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Factuality {
    pub span: Span<AnnotationRef>,
    pub values: Vec<FactVal>,
}

impl Factuality {
    pub fn new(span: Span<AnnotationRef>) -> Self {
        Factuality {
            span,
            values: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: FactVal) -> Self {
        self.values.push(value);
        self
    }

    /// The highest-confidence judgement.
    pub fn max_value(&self) -> Option<&FactVal> {
        self.values.iter().max_by(|a, b| {
            let a = a.confidence.unwrap_or(0.0);
            let b = b.confidence.unwrap_or(0.0);
            a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

impl Payload for Factuality {
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
        if let Some(max) = self.max_value() {
            push_attr(out, "value", Some(&max.value));
        }
    }
}

/// The older single-word factuality layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factvalue {
    pub wf: AnnotationRef,
    pub prediction: String,
    pub confidence: Option<f64>,
}

impl Factvalue {
    pub fn new(wf: AnnotationRef, prediction: impl Into<String>) -> Self {
        Factvalue {
            wf,
            prediction: prediction.into(),
            confidence: None,
        }
    }
}

impl Payload for Factvalue {
    fn references(&self, out: &mut Vec<Reference>) {
        out.push((AnnotationType::Wf, self.wf));
    }

    fn map_handles(&mut self, f: &mut dyn FnMut(AnnotationRef) -> AnnotationRef) {
        self.wf = f(self.wf);
    }

    fn retain_handles(&mut self, keep: &dyn Fn(AnnotationRef) -> bool) -> bool {
        keep(self.wf)
    }

    fn attributes(&self, out: &mut Attributes) {
        push_attr(out, "prediction", Some(&self.prediction));
        push_attr(out, "confidence", self.confidence.as_ref());
    }
}
