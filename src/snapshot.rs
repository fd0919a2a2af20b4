//! Serializable views of a container.
//!
//! A [`ContainerSnapshot`] names every annotation by its id (or `#n` for
//! anonymous ones) so two containers built the same way produce the same
//! snapshot. Sub-annotations are nested under their owner.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::annotation::{AnnotationRef, ExternalRef};
use crate::annotation_type::{AnnotationType, Layer};
use crate::container::{AnnotationContainer, UnknownLayer};
use crate::error::{KafError, Result};

/// A declared reference, by target name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub annotation_type: AnnotationType,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationData {
    /// The id, or `#n` for anonymous annotations
    pub id: String,
    pub annotation_type: AnnotationType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<ReferenceData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_refs: Vec<ExternalRef>,
    /// Owned sub-annotations: components, roles, tree nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AnnotationData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    /// Schema version
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    /// Top-level annotations per non-empty layer, in insertion order
    pub layers: BTreeMap<Layer, Vec<AnnotationData>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_layers: Vec<UnknownLayer>,
}

impl ContainerSnapshot {
    pub fn capture(container: &AnnotationContainer) -> Self {
        let mut layers = BTreeMap::new();
        for layer in Layer::ALL {
            let annotations: Vec<AnnotationData> = container
                .annotations(layer)
                .iter()
                .filter_map(|r| annotation_data(container, *r))
                .collect();
            if !annotations.is_empty() {
                layers.insert(layer, annotations);
            }
        }
        ContainerSnapshot {
            version: 1,
            raw_text: container.raw_text().map(str::to_string),
            layers,
            unknown_layers: container.unknown_layers().to_vec(),
        }
    }

    pub fn layer(&self, layer: Layer) -> &[AnnotationData] {
        self.layers.get(&layer).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Number of top-level annotations.
    pub fn len(&self) -> usize {
        self.layers.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_ron(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::new()
            .depth_limit(8)
            .separate_tuple_members(false)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(self, config).map_err(|e| KafError::Snapshot(e.to_string()))
    }

    pub fn from_ron(s: &str) -> Result<Self> {
        ron::from_str(s).map_err(|e| KafError::Snapshot(e.to_string()))
    }
}

fn name_of(container: &AnnotationContainer, r: AnnotationRef) -> String {
    container
        .get(r)
        .and_then(|a| a.id())
        .map_or_else(|| r.to_string(), str::to_string)
}

fn annotation_data(container: &AnnotationContainer, r: AnnotationRef) -> Option<AnnotationData> {
    let annotation = container.get(r)?;
    let references = annotation.references();
    let children = references
        .iter()
        .filter(|(ty, child)| !ty.is_top() && container.parent_of(*child) == Some(r))
        .filter_map(|(_, child)| annotation_data(container, *child))
        .collect();
    Some(AnnotationData {
        id: name_of(container, r),
        annotation_type: annotation.annotation_type(),
        attributes: annotation
            .attributes()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
        references: references
            .iter()
            .map(|(annotation_type, target)| ReferenceData {
                annotation_type: *annotation_type,
                target: name_of(container, *target),
            })
            .collect(),
        external_refs: annotation.kind().external_refs().to_vec(),
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Annotation, AnnotationKind, Dep, Term, Wf};
    use crate::span::Span;

    fn build() -> AnnotationContainer {
        let mut container = AnnotationContainer::new();
        container.set_raw_text("New York rocks");
        let w1 = container.add_new(Wf::new(0, 3, "New", 1)).unwrap();
        let w2 = container.add_new(Wf::new(4, 4, "York", 1)).unwrap();
        let w3 = container.add_new(Wf::new(9, 5, "rocks", 1)).unwrap();
        let c1 = container
            .add_new(AnnotationKind::Component(Term::new(Span::from_targets(vec![w1]))))
            .unwrap();
        let c2 = container
            .add_new(AnnotationKind::Component(Term::new(Span::from_targets(vec![w2]))))
            .unwrap();
        let mut compound = Term::new(Span::from_targets(vec![w1, w2])).with_lemma("New York");
        compound.components = Span::with_head(vec![c1, c2], c2).unwrap();
        compound
            .external_refs
            .push(ExternalRef::new("wikidata", "Q60").with_confidence(0.9));
        let mw = container.add_new(AnnotationKind::Mw(compound)).unwrap();
        let t = container
            .add_new(Term::new(Span::from_targets(vec![w3])).with_pos("V"))
            .unwrap();
        container
            .add(Annotation::anonymous(Dep::new(t, mw, "nsubj")))
            .unwrap();
        container.add_unknown_layer(UnknownLayer::new("srl2", "<srl2/>"));
        container
    }

    #[test]
    fn names_nest_and_layers() {
        let snapshot = ContainerSnapshot::capture(&build());

        let terms = snapshot.layer(Layer::Terms);
        assert_eq!(
            terms.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
            vec!["mw1", "t1"]
        );
        let compound = &terms[0];
        assert_eq!(compound.annotation_type, AnnotationType::Mw);
        assert_eq!(
            compound.children.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
            vec!["tc1", "tc2"]
        );
        assert_eq!(compound.external_refs[0].reference, "Q60");
        assert!(compound
            .attributes
            .contains(&("lemma".to_string(), "New York".to_string())));

        let deps = snapshot.layer(Layer::Deps);
        assert_eq!(deps.len(), 1);
        assert!(deps[0].id.starts_with('#'));
        assert_eq!(
            deps[0].references.iter().map(|r| r.target.as_str()).collect::<Vec<_>>(),
            vec!["t1", "mw1"]
        );
        assert_eq!(snapshot.layer(Layer::Text).len(), 3);
        assert_eq!(snapshot.len(), 6);
        assert_eq!(snapshot.unknown_layers[0].name, "srl2");
        assert_eq!(snapshot.raw_text.as_deref(), Some("New York rocks"));
    }

    #[test]
    fn ron_text_reads_back() {
        let snapshot = ContainerSnapshot::capture(&build());
        let text = snapshot.to_ron().unwrap();
        assert!(text.contains("\"mw1\""));
        assert_eq!(ContainerSnapshot::from_ron(&text).unwrap(), snapshot);
    }

    #[test]
    fn malformed_ron_is_a_snapshot_error() {
        assert!(matches!(
            ContainerSnapshot::from_ron("(version: "),
            Err(KafError::Snapshot(_))
        ));
    }

    #[test]
    fn empty_container() {
        let snapshot = ContainerSnapshot::capture(&AnnotationContainer::new());
        assert!(snapshot.is_empty());
        assert!(snapshot.layers.is_empty());
    }
}
