//! The document aggregate: header metadata, processor provenance and the
//! annotation container, plus splitting and joining.

use layered_kaf::{
    AnnotationContainer, AnnotationRef, AnnotationType, DependencyGraph, ImportMap, Tree,
    TreeNodeRef, TOP_TYPES,
};

use crate::config::DocumentConfig;
use crate::constituency::BracketNode;
use crate::error::{DocumentError, DocumentResult};
use crate::header::{FileDesc, Public};
use crate::processor::{LinguisticProcessor, LinguisticProcessors};

/// A KAF/NAF document.
#[derive(Debug, Clone)]
pub struct KafDocument {
    lang: String,
    version: String,
    file_desc: Option<FileDesc>,
    public: Option<Public>,
    processors: LinguisticProcessors,
    container: AnnotationContainer,
    config: DocumentConfig,
}

impl Default for KafDocument {
    fn default() -> Self {
        KafDocument::with_config(DocumentConfig::default())
    }
}

impl KafDocument {
    pub fn new(lang: impl Into<String>, version: impl Into<String>) -> Self {
        KafDocument::with_config(DocumentConfig::default().with_lang(lang).with_version(version))
    }

    /// An empty document with the language, version and container settings of `config`.
    pub fn with_config(config: DocumentConfig) -> Self {
        KafDocument {
            lang: config.lang.clone(),
            version: config.version.clone(),
            file_desc: None,
            public: None,
            processors: LinguisticProcessors::new(),
            container: AnnotationContainer::with_config(config.container.clone()),
            config,
        }
    }

    /// An empty document sharing the language, version, raw text and settings of `self`.
    fn empty_like(&self) -> Self {
        let mut document = KafDocument::with_config(self.config.clone());
        document.lang = self.lang.clone();
        document.version = self.version.clone();
        if let Some(raw_text) = self.raw_text() {
            document.set_raw_text(raw_text);
        }
        document
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn set_lang(&mut self, lang: impl Into<String>) {
        self.lang = lang.into();
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    pub fn file_desc(&self) -> Option<&FileDesc> {
        self.file_desc.as_ref()
    }

    /// The file description, created empty on first access.
    pub fn file_desc_mut(&mut self) -> &mut FileDesc {
        self.file_desc.get_or_insert_with(FileDesc::default)
    }

    pub fn set_file_desc(&mut self, file_desc: FileDesc) {
        self.file_desc = Some(file_desc);
    }

    pub fn public(&self) -> Option<&Public> {
        self.public.as_ref()
    }

    /// The publication record, created empty on first access.
    pub fn public_mut(&mut self) -> &mut Public {
        self.public.get_or_insert_with(Public::default)
    }

    pub fn set_public(&mut self, public: Public) {
        self.public = Some(public);
    }

    pub fn raw_text(&self) -> Option<&str> {
        self.container.raw_text()
    }

    pub fn set_raw_text(&mut self, raw_text: impl Into<String>) {
        self.container.set_raw_text(raw_text);
    }

    pub fn container(&self) -> &AnnotationContainer {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut AnnotationContainer {
        &mut self.container
    }

    pub fn dependency_graph(&self) -> DependencyGraph<'_> {
        self.container.dependency_graph()
    }

    // ---- linguistic processors ----

    /// Appends a processor record for `layer`. No timestamp is set.
    pub fn add_linguistic_processor(
        &mut self,
        layer: impl Into<String>,
        name: impl Into<String>,
    ) -> &mut LinguisticProcessor {
        self.processors.add(LinguisticProcessor::new(layer, name))
    }

    /// Appends a processor record stamped with the current time as its
    /// beginning, and with this host's name when hostname stamping is enabled.
    pub fn begin_linguistic_processor(
        &mut self,
        layer: impl Into<String>,
        name: impl Into<String>,
    ) -> &mut LinguisticProcessor {
        let stamp_hostname = self.config.stamp_hostname;
        let processor = self.processors.add(LinguisticProcessor::new(layer, name));
        processor.stamp_begin();
        if stamp_hostname && !processor.record_hostname() {
            log::debug!("no host name available for processor {}", processor.name);
        }
        processor
    }

    /// Copies every processor record of `other`.
    pub fn add_linguistic_processors(&mut self, other: &LinguisticProcessors) {
        self.processors.extend_from(other);
    }

    pub fn linguistic_processors(&self) -> &LinguisticProcessors {
        &self.processors
    }

    pub fn linguistic_processor_exists(&self, layer: &str, name: &str, version: Option<&str>) -> bool {
        self.processors.exists(layer, name, version)
    }

    /// All processor records, layer by layer.
    pub fn linguistic_processor_list(&self) -> Vec<&LinguisticProcessor> {
        self.processors.iter().collect()
    }

    // ---- constituency ----

    /// Builds a constituency tree from a bracketed parse whose leaves are
    /// all terms of the document, in order.
    ///
    /// Fails without touching the document when the parse is malformed or
    /// its leaves do not match the terms one to one.
    pub fn add_constituency_from_parentheses(&mut self, parse: &str) -> DocumentResult<AnnotationRef> {
        let terms = self.container.annotations(AnnotationType::Term).to_vec();
        self.add_constituency_over(parse, &terms)
    }

    /// Like [`add_constituency_from_parentheses`](Self::add_constituency_from_parentheses),
    /// with the leaves covering the terms of sentence `sent`.
    pub fn add_sentence_constituency_from_parentheses(&mut self, sent: u32, parse: &str) -> DocumentResult<AnnotationRef> {
        let terms = self.container.annotations_by_sent(sent, AnnotationType::Term);
        self.add_constituency_over(parse, &terms)
    }

    fn add_constituency_over(&mut self, parse: &str, terms: &[AnnotationRef]) -> DocumentResult<AnnotationRef> {
        let root = BracketNode::parse(parse)?;
        let leaves = root.leaves();
        if leaves != terms.len() {
            return Err(DocumentError::LeafCountMismatch {
                leaves,
                terms: terms.len(),
            });
        }
        let mut next = 0;
        let root = root.build(&mut self.container, terms, &mut next)?;
        let tree = self.container.add_new(Tree::new(TreeNodeRef::NonTerminal(root)))?;
        log::debug!("added constituency tree over {} terms", leaves);
        Ok(tree)
    }

    // ---- split & join ----

    /// Copies `r` of `source` into this document. Identifiable copies get
    /// ids minted by this document.
    pub fn add_existing_annotation(
        &mut self,
        source: &AnnotationContainer,
        r: AnnotationRef,
        copies: &mut ImportMap,
    ) -> DocumentResult<AnnotationRef> {
        Ok(self.container.import(source, r, copies)?)
    }

    fn copy_top_annotations(
        &mut self,
        source: &AnnotationContainer,
        scoped: impl Fn(AnnotationType) -> bool,
        select: impl Fn(AnnotationType) -> Vec<AnnotationRef>,
    ) -> DocumentResult<()> {
        let mut copies = ImportMap::new();
        for ty in TOP_TYPES.into_iter().filter(|ty| scoped(*ty)) {
            for r in select(ty) {
                self.add_existing_annotation(source, r, &mut copies)?;
            }
        }
        Ok(())
    }

    /// One document per sentence, paragraph by paragraph, holding copies of
    /// that sentence's sentence-scoped annotations.
    pub fn split_in_sentences(&self) -> DocumentResult<Vec<KafDocument>> {
        let mut documents = Vec::new();
        for para in self.container.paragraphs() {
            for sent in self.container.sents_by_para(para) {
                let mut document = self.empty_like();
                document.copy_top_annotations(
                    &self.container,
                    AnnotationType::is_sentence_scoped,
                    |ty| self.container.annotations_by_sent(*sent, ty),
                )?;
                documents.push(document);
            }
        }
        log::debug!("split into {} sentence documents", documents.len());
        Ok(documents)
    }

    /// One document per paragraph holding copies of that paragraph's
    /// paragraph-scoped annotations.
    pub fn split_in_paragraphs(&self) -> DocumentResult<Vec<KafDocument>> {
        let mut documents = Vec::new();
        for para in self.container.paragraphs() {
            let mut document = self.empty_like();
            document.copy_top_annotations(
                &self.container,
                AnnotationType::is_paragraph_scoped,
                |ty| self.container.annotations_by_para(para, ty),
            )?;
            documents.push(document);
        }
        log::debug!("split into {} paragraph documents", documents.len());
        Ok(documents)
    }

    /// A document with the language, version and raw text of the first part
    /// and copies of every top annotation of every part, re-identified.
    pub fn join(parts: &[KafDocument]) -> DocumentResult<KafDocument> {
        let first = parts.first().ok_or(DocumentError::EmptyJoin)?;
        let mut joined = first.empty_like();
        for part in parts {
            joined.copy_top_annotations(
                &part.container,
                |_| true,
                |ty| part.container.annotations(ty).to_vec(),
            )?;
        }
        log::debug!(
            "joined {} documents into {} annotations",
            parts.len(),
            joined.container.len()
        );
        Ok(joined)
    }
}
