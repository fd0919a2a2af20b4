use crate::*;

fn two_words(container: &mut AnnotationContainer) -> (AnnotationRef, AnnotationRef, AnnotationRef, AnnotationRef) {
    let w1 = container.add(Annotation::new("w1", Wf::new(3, 1, "a", 2))).unwrap();
    let w2 = container.add(Annotation::new("w2", Wf::new(5, 1, "b", 2))).unwrap();
    let t1 = container
        .add(Annotation::new("t1", Term::new(Span::from_targets(vec![w1]))))
        .unwrap();
    let t2 = container
        .add(Annotation::new("t2", Term::new(Span::from_targets(vec![w2]))))
        .unwrap();
    (w1, w2, t1, t2)
}

#[test]
fn word_forms_and_terms() {
    let mut container = AnnotationContainer::new();
    let (w1, _, t1, t2) = two_words(&mut container);

    assert_eq!(container.annotations(Layer::Terms), &[t1, t2]);
    assert_eq!(container.annotation_by_id("t1"), Some(t1));
    assert_eq!(container.annotations_by(t1, Layer::Terms), vec![t1]);
    assert_eq!(container.annotations_by(w1, AnnotationType::Term), vec![t1]);
    assert_eq!(container.sent_of(t2), Some(2));
    assert_eq!(container.offset_of(t2), Some(5));
}

#[test]
fn constituent_tree() {
    let mut container = AnnotationContainer::new();
    let (w1, w2, t1, t2) = two_words(&mut container);
    let ter1 = container
        .add(Annotation::new("ter1", Terminal::new(Span::from_targets(vec![t1]))))
        .unwrap();
    let ter2 = container
        .add(Annotation::new("ter2", Terminal::new(Span::from_targets(vec![t2]))))
        .unwrap();
    let nter2 = container.add(Annotation::new("nter2", NonTerminal::new("NP"))).unwrap();
    let nter3 = container.add(Annotation::new("nter3", NonTerminal::new("VP"))).unwrap();
    let nter1 = container.add(Annotation::new("nter1", NonTerminal::new("ROOT"))).unwrap();
    container.add_tree_child(nter2, ter1, false).unwrap();
    container.add_tree_child(nter3, ter2, false).unwrap();
    container.add_tree_child(nter1, nter2, false).unwrap();
    container.add_tree_child(nter1, nter3, true).unwrap();
    let tree = container
        .add(Annotation::new(
            "tree1",
            Tree::new(TreeNodeRef::NonTerminal(nter1)).with_type("type1"),
        ))
        .unwrap();

    let closure = container.referenced_closure(tree);
    assert_eq!(closure[&AnnotationType::Wf], vec![w1, w2]);
    assert_eq!(closure[&AnnotationType::Term], vec![t1, t2]);
    assert_eq!(closure[&AnnotationType::Terminal], vec![ter1, ter2]);
    assert_eq!(closure[&AnnotationType::NonTerminal], vec![nter1, nter2, nter3]);
    assert_eq!(closure.len(), 4);
    assert_eq!(container.offset_of(tree), Some(3));
    assert_eq!(container.sent_of(tree), Some(2));

    let root = container.get(nter1).unwrap().kind().as_non_terminal().unwrap();
    assert_eq!(root.head_child(), Some(TreeNodeRef::NonTerminal(nter3)));
    assert_eq!(container.parent_of(nter3), Some(nter1));
    assert_eq!(container.parent_of(nter1), Some(tree));

    // every adopted node got its own edge id
    let mut edge_ids: Vec<&str> = [ter1, ter2, nter2, nter3]
        .iter()
        .map(|r| container.get(*r).unwrap().kind().edge_id().unwrap())
        .collect();
    edge_ids.sort();
    edge_ids.dedup();
    assert_eq!(edge_ids.len(), 4);
    assert!(edge_ids.iter().all(|id| id.starts_with("tre")));
}

#[test]
fn caller_ids_advance_the_counter() {
    let mut container = AnnotationContainer::new();
    container.add(Annotation::new("w17", Wf::new(0, 1, "x", 1))).unwrap();
    assert_eq!(container.id_manager_mut().next_id(AnnotationType::Wf), "w18");
    let next = container.add_new(Wf::new(2, 1, "y", 1)).unwrap();
    assert_eq!(container.get(next).unwrap().id(), Some("w19"));
}

#[test]
fn coref_mentions_resolve_transitively() {
    let mut container = AnnotationContainer::new();
    let (w1, _, t1, t2) = two_words(&mut container);
    let c1 = container
        .add_new(Coref::new(vec![Span::from_targets(vec![t1, t2])]).unwrap())
        .unwrap();

    assert_eq!(container.annotations_by(t1, AnnotationType::Coref), vec![c1]);
    assert_eq!(container.annotations_by(w1, AnnotationType::Coref), vec![c1]);
    assert_eq!(container.annotations_by(w1, Layer::Coreferences), vec![c1]);
}

#[test]
fn dep_path_between_siblings() {
    let mut container = AnnotationContainer::new();
    let (_, _, t1, t2) = two_words(&mut container);
    let w3 = container.add(Annotation::new("w3", Wf::new(7, 1, "c", 2))).unwrap();
    let t3 = container
        .add(Annotation::new("t3", Term::new(Span::from_targets(vec![w3]))))
        .unwrap();
    let d1 = container.add(Annotation::anonymous(Dep::new(t1, t2, "nsubj"))).unwrap();
    let d2 = container.add(Annotation::anonymous(Dep::new(t3, t2, "obj"))).unwrap();

    let graph = container.dependency_graph();
    let path = graph.dep_path(t1, t3).unwrap();
    assert_eq!(path, vec![d1, d2]);

    let a = dep_path_letter("nsubj");
    let b = dep_path_letter("obj");
    assert_eq!(graph.encode_dep_path(t1, &path), format!("_+{}_-{}_", a, b));
    assert!(graph.match_dep_path(t1, &path, &format!("{}-{}", a, b)).unwrap());
    assert!(!graph.match_dep_path(t1, &path, &format!("{}{}", a, b)).unwrap());
    // t1 and t3 both govern t2
    assert_eq!(graph.terms_head(&[t1, t2, t3]), None);
    assert_eq!(graph.terms_head(&[t1, t2]), Some(t1));
}
