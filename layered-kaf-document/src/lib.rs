#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]
//! Document-level aggregate for `layered-kaf`.
//!
//! A [`KafDocument`] owns an [`AnnotationContainer`](layered_kaf::AnnotationContainer)
//! and adds what a KAF/NAF header carries: language, version, file
//! description, publication ids and the linguistic processors that produced
//! each layer. Documents can be split per sentence or paragraph and joined
//! back, and constituency trees can be read from bracketed parses.
//!
//! ```
//! use layered_kaf::{Span, Term, Wf};
//! use layered_kaf_document::KafDocument;
//!
//! let mut doc = KafDocument::new("en", "v3");
//! let container = doc.container_mut();
//! let w1 = container.add_new(Wf::new(0, 5, "Hello", 1)).unwrap();
//! container.add_new(Term::new(Span::from_targets(vec![w1]))).unwrap();
//! doc.add_linguistic_processor("terms", "tagger").version = Some("1.0".into());
//!
//! assert!(doc.linguistic_processor_exists("terms", "tagger", Some("1.0")));
//! assert_eq!(doc.split_in_sentences().unwrap().len(), 1);
//! ```

mod config;
mod constituency;
mod document;
mod error;
mod header;
mod processor;

pub use config::DocumentConfig;
pub use document::KafDocument;
pub use error::{DocumentError, DocumentResult};
pub use header::{FileDesc, Public};
pub use processor::{timestamp, LinguisticProcessor, LinguisticProcessors, TIMESTAMP_FORMAT};

#[cfg(test)]
mod tests {
    mod constituency;
    mod split_join;
}
