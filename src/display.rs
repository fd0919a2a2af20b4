use std::fmt::Write;

use unicode_width::UnicodeWidthStr;

use crate::annotation::AnnotationRef;
use crate::annotation_type::{AnnotationType, Selector};
use crate::container::AnnotationContainer;

struct IncludedAnnotation {
    /// first and last word form index within the sentence
    range: (usize, usize),
    label: String,
}

/// Renders one sentence with the word forms covered by selected annotations
/// marked underneath.
///
/// ```text
/// The  cat  sat
/// ╰─╯Term(t1)
///      ╰──────╯Chunk(c2)
/// ╰──────╯Dep(nsubj)
/// ```
pub struct SentenceDisplay<'a> {
    container: &'a AnnotationContainer,
    sent: u32,
    include_annotations: Vec<IncludedAnnotation>,
}

impl<'a> std::fmt::Display for SentenceDisplay<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const SPACE_PADDING: usize = 2;
        let mut wf_idx_to_start_display_char_idx = Vec::new();
        let mut wf_idx_to_end_display_char_idx = Vec::new();
        let mut opening_line = String::new();
        for (i, wf) in self.wfs().iter().enumerate() {
            if i > 0 {
                opening_line.extend(std::iter::repeat(' ').take(SPACE_PADDING));
            }
            wf_idx_to_start_display_char_idx.push(UnicodeWidthStr::width(&*opening_line));
            let form = self
                .container
                .get(*wf)
                .and_then(|a| a.kind().as_wf())
                .map_or("", |wf| wf.form.as_str());
            opening_line.push_str(form);
            wf_idx_to_end_display_char_idx.push(UnicodeWidthStr::width(&*opening_line));
        }

        f.write_str(&opening_line)?;

        for included in self.include_annotations.iter() {
            f.write_char('\n')?;

            let start_char_idx = wf_idx_to_start_display_char_idx[included.range.0];
            for _ in 0..start_char_idx {
                f.write_char(' ')?;
            }

            f.write_char('╰')?;

            let end_char_idx = wf_idx_to_end_display_char_idx[included.range.1];
            let char_len = end_char_idx - start_char_idx;
            for _ in (start_char_idx + 1)..end_char_idx.saturating_sub(1) {
                f.write_char('─')?;
            }

            if char_len > 1 {
                f.write_char('╯')?;
            }

            f.write_str(&included.label)?;
        }

        Ok(())
    }
}

impl<'a> SentenceDisplay<'a> {
    pub fn new(container: &'a AnnotationContainer, sent: u32) -> Self {
        SentenceDisplay {
            container,
            sent,
            include_annotations: Vec::new(),
        }
    }

    fn wfs(&self) -> &'a [AnnotationRef] {
        self.container.sentence_wfs(self.sent)
    }

    /// Adds a marker line for every annotation of the selected type or layer
    /// anchored in this sentence.
    pub fn include(&mut self, selector: impl Into<Selector>) {
        let wfs = self.wfs();
        for r in self.container.annotations_by_sent(self.sent, selector) {
            let Some(annotation) = self.container.get(r) else {
                continue;
            };
            let covered: Vec<AnnotationRef> = if annotation.annotation_type() == AnnotationType::Wf {
                vec![r]
            } else {
                self.container
                    .referenced_closure(r)
                    .remove(&AnnotationType::Wf)
                    .unwrap_or_default()
            };
            let mut positions = covered
                .iter()
                .filter_map(|wf| wfs.iter().position(|x| x == wf));
            let Some(first) = positions.next() else {
                continue;
            };
            let (start, end) = positions.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
            let label = match (annotation.id(), annotation.kind().as_dep()) {
                (Some(id), _) => format!("{:?}({})", annotation.annotation_type(), id),
                (None, Some(dep)) => format!("Dep({})", dep.rfunc),
                (None, None) => format!("{:?}", annotation.annotation_type()),
            };
            self.include_annotations.push(IncludedAnnotation {
                range: (start, end),
                label,
            });
        }
    }

    /// Builder form of [`include`](Self::include), for chaining several selectors.
    pub fn with(mut self, selector: impl Into<Selector>) -> Self {
        self.include(selector);
        self
    }
}
