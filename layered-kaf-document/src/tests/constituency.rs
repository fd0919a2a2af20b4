use layered_kaf::{AnnotationContainer, AnnotationRef, AnnotationType, Layer, Span, Term, TreeNodeRef, Wf};

use crate::{DocumentError, KafDocument};

/// One term per `(form, sent)`, ids `w<n>`/`t<n>`.
fn document(words: &[(&str, u32)]) -> KafDocument {
    let mut doc = KafDocument::new("en", "v3");
    let container = doc.container_mut();
    let mut offset = 0;
    for (form, sent) in words {
        let wf = container
            .add_new(Wf::new(offset, form.len(), *form, *sent))
            .unwrap();
        container
            .add_new(Term::new(Span::from_targets(vec![wf])))
            .unwrap();
        offset += form.len() + 1;
    }
    doc
}

/// Writes a stored tree back as brackets, with term ids as leaves.
fn brackets(container: &AnnotationContainer, node: TreeNodeRef, is_head: bool) -> String {
    let kind = container.get(node.handle()).unwrap().kind();
    match node {
        TreeNodeRef::Terminal(_) => {
            let terminal = kind.as_terminal().unwrap();
            let ids: Vec<&str> = terminal
                .span
                .iter()
                .map(|t| container.get(*t).unwrap().id().unwrap())
                .collect();
            ids.join(" ")
        }
        TreeNodeRef::NonTerminal(_) => {
            let nt = kind.as_non_terminal().unwrap();
            let children: Vec<String> = nt
                .children
                .iter()
                .map(|child| brackets(container, *child, nt.head_child() == Some(*child)))
                .collect();
            format!("({}{} {})", nt.label, if is_head { "=H" } else { "" }, children.join(" "))
        }
    }
}

fn tree_root(container: &AnnotationContainer, tree: AnnotationRef) -> TreeNodeRef {
    container.get(tree).unwrap().kind().as_tree().unwrap().root
}

#[test]
fn tree_from_brackets() {
    let mut doc = document(&[("The", 1), ("cat", 1), ("sat", 1)]);
    let tree = doc
        .add_constituency_from_parentheses("(ROOT (S (NP (DT The) (NN cat)) (VP=H (VBD sat))))")
        .unwrap();

    let container = doc.container();
    assert_eq!(
        brackets(container, tree_root(container, tree), false),
        "(ROOT (S (NP (DT t1) (NN t2)) (VP=H (VBD t3))))"
    );
    assert_eq!(container.annotations(Layer::Constituency), &[tree]);
    assert_eq!(container.annotations(AnnotationType::NonTerminal).len(), 7);
    assert_eq!(container.annotations(AnnotationType::Terminal).len(), 3);
    assert_eq!(container.sent_of(tree), Some(1));

    let closure = container.referenced_closure(tree);
    assert_eq!(closure[&AnnotationType::Term], container.annotations(AnnotationType::Term).to_vec());
    // every adopted node has an edge id
    for node in container
        .annotations(AnnotationType::NonTerminal)
        .iter()
        .chain(container.annotations(AnnotationType::Terminal))
    {
        let has_parent = container.parent_of(*node).is_some();
        assert!(has_parent);
        assert!(container.get(*node).unwrap().kind().edge_id().is_some());
    }
}

#[test]
fn one_tree_per_sentence() {
    let mut doc = document(&[("Dogs", 1), ("bark", 1), ("Cats", 2), ("purr", 2)]);
    let first = doc
        .add_sentence_constituency_from_parentheses(1, "(S (NP Dogs) (VP=H bark))")
        .unwrap();
    let second = doc
        .add_sentence_constituency_from_parentheses(2, "(S (NP Cats) (VP=H purr))")
        .unwrap();

    let container = doc.container();
    assert_eq!(
        brackets(container, tree_root(container, second), false),
        "(S (NP t3) (VP=H t4))"
    );
    assert_eq!(container.sent_of(first), Some(1));
    assert_eq!(container.sent_of(second), Some(2));
    assert_eq!(container.annotations_by_sent(2, Layer::Constituency), vec![second]);
}

#[test]
fn rejected_parses_leave_the_document_alone() {
    let mut doc = document(&[("Dogs", 1), ("bark", 1), ("loudly", 1)]);

    assert!(matches!(
        doc.add_constituency_from_parentheses("(S (NP Dogs) (VP bark)"),
        Err(DocumentError::MalformedParse { .. })
    ));
    assert!(matches!(
        doc.add_constituency_from_parentheses("(S (NP Dogs) (VP bark))"),
        Err(DocumentError::LeafCountMismatch { leaves: 2, terms: 3 })
    ));
    assert!(matches!(
        doc.add_sentence_constituency_from_parentheses(2, "(S a)"),
        Err(DocumentError::LeafCountMismatch { leaves: 1, terms: 0 })
    ));

    let container = doc.container();
    assert!(container.annotations(Layer::Constituency).is_empty());
    assert!(container.annotations(AnnotationType::NonTerminal).is_empty());
    assert!(container.annotations(AnnotationType::Terminal).is_empty());
}
