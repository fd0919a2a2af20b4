use crate::*;

fn words(container: &mut AnnotationContainer, sents: &[u32]) -> Vec<AnnotationRef> {
    sents
        .iter()
        .enumerate()
        .map(|(i, sent)| {
            container
                .add_new(Wf::new(i * 2, 1, format!("w{}", i), *sent))
                .unwrap()
        })
        .collect()
}

fn term(container: &mut AnnotationContainer, wf: AnnotationRef) -> AnnotationRef {
    container
        .add_new(Term::new(Span::from_targets(vec![wf])))
        .unwrap()
}

#[test]
fn paragraphs_follow_paragraph_starts() {
    let mut container = AnnotationContainer::new();
    let w1 = container.add_new(Wf::new(0, 1, "a", 1)).unwrap();
    let w2 = container.add_new(Wf::new(2, 1, "b", 1)).unwrap();
    let w3 = container
        .add_new(Wf::new(4, 1, "c", 2).starting_paragraph())
        .unwrap();
    let w4 = container.add_new(Wf::new(6, 1, "d", 3).with_para(5)).unwrap();
    let w5 = container.add_new(Wf::new(8, 1, "e", 3)).unwrap();

    let paras: Vec<_> = [w1, w2, w3, w4, w5]
        .iter()
        .map(|r| container.para_of(*r))
        .collect();
    assert_eq!(paras, vec![Some(1), Some(1), Some(2), Some(5), Some(5)]);
    assert_eq!(container.paragraphs().collect::<Vec<_>>(), vec![1, 2, 5]);
    assert_eq!(container.num_paragraphs(), 3);
    assert_eq!(container.first_paragraph(), Some(1));
    assert_eq!(container.sents_by_para(5), &[3]);
    assert_eq!(container.sentences().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(container.first_sentence(), Some(1));
    assert_eq!(container.sentence_wfs(3), &[w4, w5]);
}

#[test]
fn sentence_and_paragraph_queries() {
    let mut container = AnnotationContainer::new();
    let w = words(&mut container, &[1, 1, 2]);
    let t: Vec<_> = w.iter().map(|wf| term(&mut container, *wf)).collect();
    let chunk = container
        .add_new(Chunk::new("NP", Span::from_targets(vec![t[0], t[1]])).unwrap())
        .unwrap();

    assert_eq!(container.annotations_by_sent(1, AnnotationType::Term), vec![t[0], t[1]]);
    assert_eq!(container.annotations_by_sent(2, Layer::Terms), vec![t[2]]);
    assert_eq!(container.annotations_by_sent(1, Layer::Chunks), vec![chunk]);
    assert!(container.annotations_by_sent(2, Layer::Chunks).is_empty());
    assert_eq!(container.annotations_by_para(1, AnnotationType::Term).len(), 3);
    assert!(container.annotations_by_sent(9, AnnotationType::Term).is_empty());
}

#[test]
fn insertion_at_a_position() {
    let mut container = AnnotationContainer::new();
    let w = words(&mut container, &[1, 1, 1, 1]);
    let t1 = term(&mut container, w[0]);
    let mw = container
        .add_new(AnnotationKind::Mw(Term::new(Span::from_targets(vec![w[1], w[2]]))))
        .unwrap();
    let t2 = term(&mut container, w[3]);
    let early = container
        .add_at(Annotation::new("t9", Term::new(Span::from_targets(vec![w[3]]))), 1)
        .unwrap();

    assert_eq!(container.annotations(AnnotationType::Term), &[t1, early, t2]);
    assert_eq!(container.annotations(Layer::Terms), &[t1, mw, early, t2]);

    // past the end appends
    let late = container
        .add_at(Annotation::new("t10", Term::new(Span::from_targets(vec![w[0]]))), 99)
        .unwrap();
    assert_eq!(container.annotations(Layer::Terms).last(), Some(&late));
}

#[test]
fn compounds_anchor_through_components() {
    let mut container = AnnotationContainer::new();
    let w = words(&mut container, &[4, 4]);
    let c1 = container
        .add_new(AnnotationKind::Component(Term::new(Span::from_targets(vec![w[0]]))))
        .unwrap();
    let c2 = container
        .add_new(AnnotationKind::Component(Term::new(Span::from_targets(vec![w[1]]))))
        .unwrap();
    let mw = container
        .add_new(AnnotationKind::Mw(Term::new(Span::new())))
        .unwrap();
    container.add_component(mw, c1, false).unwrap();
    container.add_component(mw, c2, true).unwrap();

    assert_eq!(container.anchor_wf(mw), Some(w[0]));
    assert_eq!(container.sent_of(mw), Some(4));
    assert_eq!(container.parent_of(c2), Some(mw));
    let compound = container.get(mw).unwrap().kind().as_compound().unwrap();
    assert_eq!(compound.head_component(), Some(c2));
    assert!(compound.is_compound());
    assert_eq!(container.annotations_by(w[1], Layer::Terms), vec![mw]);
    // components are stored by type but never by layer
    assert_eq!(container.annotations(AnnotationType::Component), &[c1, c2]);
    assert_eq!(container.annotations(Layer::Terms), &[mw]);
}

#[test]
fn dependencies_accept_compounds() {
    let mut container = AnnotationContainer::new();
    let w = words(&mut container, &[1, 1, 1]);
    let mw = container
        .add_new(AnnotationKind::Mw(Term::new(Span::from_targets(vec![w[0], w[1]]))))
        .unwrap();
    let t = term(&mut container, w[2]);
    let dep = container
        .add(Annotation::anonymous(Dep::new(t, mw, "nsubj")))
        .unwrap();
    assert_eq!(container.annotations_by(w[1], AnnotationType::Dep), vec![dep]);
}

#[test]
fn insertion_errors() {
    let mut container = AnnotationContainer::new();
    let w = words(&mut container, &[1, 1]);
    let t1 = term(&mut container, w[0]);

    assert_eq!(
        container.add(Annotation::anonymous(Wf::new(0, 1, "x", 1))),
        Err(KafError::MissingId(AnnotationType::Wf))
    );
    assert!(matches!(
        container.add(Annotation::new("dep1", Dep::new(t1, t1, "x"))),
        Err(KafError::UnexpectedId { .. })
    ));
    let duplicate = container.get(t1).unwrap().id().unwrap().to_string();
    assert_eq!(
        container.add(Annotation::new(duplicate.clone(), Term::new(Span::from_targets(vec![w[1]])))),
        Err(KafError::DuplicateId(duplicate))
    );
    assert_eq!(
        container.add_new(Term::new(Span::from_targets(vec![t1]))),
        Err(KafError::TypeMismatch {
            expected: vec![AnnotationType::Wf],
            found: AnnotationType::Term
        })
    );
    assert_eq!(
        container.add_new(Term::new(Span::from_targets(vec![AnnotationRef(99)]))),
        Err(KafError::UnknownAnnotation(99))
    );
    assert!(matches!(
        container.add_tree_child(t1, t1, false),
        Err(KafError::TypeMismatch { .. })
    ));

    // failed insertions leave nothing behind
    assert_eq!(container.annotations(AnnotationType::Term), &[t1]);
    assert_eq!(container.len(), 3);
}

#[test]
fn sub_annotations_have_one_owner() {
    let mut container = AnnotationContainer::new();
    let w = words(&mut container, &[1]);
    let component = container
        .add_new(AnnotationKind::Component(Term::new(Span::from_targets(vec![w[0]]))))
        .unwrap();
    let first = container
        .add_new(AnnotationKind::Mw(Term::new(Span::new())))
        .unwrap();
    let second = container
        .add_new(AnnotationKind::Mw(Term::new(Span::new())))
        .unwrap();
    container.add_component(first, component, true).unwrap();
    assert_eq!(
        container.add_component(second, component, false),
        Err(KafError::AlreadyOwned {
            child: component.index(),
            owner: first.index()
        })
    );
}

#[test]
fn modify_reindexes() {
    let mut container = AnnotationContainer::new();
    let w = words(&mut container, &[1, 1, 2]);
    let t: Vec<_> = w.iter().map(|wf| term(&mut container, *wf)).collect();
    let chunk = container
        .add_new(Chunk::new("NP", Span::from_targets(vec![t[0]])).unwrap())
        .unwrap();
    assert_eq!(container.annotations_by(t[0], AnnotationType::Chunk), vec![chunk]);

    container
        .modify(chunk, |kind| {
            if let Some(chunk) = kind.as_chunk_mut() {
                chunk.span = Span::from_targets(vec![t[2]]);
            }
        })
        .unwrap();
    assert!(container.annotations_by(t[0], AnnotationType::Chunk).is_empty());
    assert_eq!(container.annotations_by(t[2], AnnotationType::Chunk), vec![chunk]);
    assert_eq!(container.sent_of(chunk), Some(2));

    // an edit that breaks the payload is rejected and leaves it untouched
    let emptied = container.modify(chunk, |kind| {
        if let Some(chunk) = kind.as_chunk_mut() {
            chunk.span = Span::new();
        }
    });
    assert!(matches!(emptied, Err(KafError::EmptySpan { .. })));
    assert_eq!(container.sent_of(chunk), Some(2));

    // moving a word form to another sentence moves its bucket
    container
        .modify(w[0], |kind| {
            if let Some(wf) = kind.as_wf_mut() {
                wf.sent = 2;
            }
        })
        .unwrap();
    assert_eq!(container.sentence_wfs(2), &[w[0], w[2]]);
    assert_eq!(container.sentence_wfs(1), &[w[1]]);
}

#[test]
fn reverse_queries_over_many_targets() {
    let mut container = AnnotationContainer::new();
    let w = words(&mut container, &[1, 1, 1]);
    let t: Vec<_> = w.iter().map(|wf| term(&mut container, *wf)).collect();
    let e1 = container
        .add_new(Entity::new(vec![Span::from_targets(vec![t[0]])]).unwrap().with_type("PER"))
        .unwrap();
    let e2 = container
        .add_new(Entity::new(vec![Span::from_targets(vec![t[2]])]).unwrap())
        .unwrap();
    let relation = container
        .add_new(Relation::new(RelationEndpoint::Entity(e1), RelationEndpoint::Entity(e2)))
        .unwrap();

    assert_eq!(container.annotations_by_any(&[w[0], w[2]], Layer::Entities), vec![e1, e2]);
    assert!(container.annotations_by_any(&[w[1]], Layer::Entities).is_empty());
    assert_eq!(container.annotations_by(w[2], AnnotationType::Relation), vec![relation]);

    let closure = container.referenced_closure(relation);
    assert_eq!(closure[&AnnotationType::Entity], vec![e1, e2]);
    assert_eq!(closure[&AnnotationType::Wf], vec![w[0], w[2]]);
    assert!(!closure.values().any(|refs| refs.contains(&relation)));
}

#[test]
fn late_reverse_edges() {
    let mut container = AnnotationContainer::new();
    let w = words(&mut container, &[1]);
    let t = term(&mut container, w[0]);
    let topic = container.add_new(Topic::new("sports")).unwrap();
    assert!(container.annotations_by(t, AnnotationType::Topic).is_empty());
    container.index_annotation_references(topic, t).unwrap();
    assert_eq!(container.annotations_by(w[0], AnnotationType::Topic), vec![topic]);

    // editing the source keeps the edge
    container
        .modify(topic, |kind| {
            if let Some(topic) = kind.as_topic_mut() {
                topic.value = "chess".to_string();
            }
        })
        .unwrap();
    assert_eq!(container.annotations_by(t, AnnotationType::Topic), vec![topic]);

    let chunk = container
        .add_new(Chunk::new("NP", Span::from_targets(vec![t])).unwrap())
        .unwrap();
    let other = term(&mut container, w[0]);
    container.index_annotation_references(chunk, other).unwrap();
    container
        .modify(chunk, |kind| {
            if let Some(chunk) = kind.as_chunk_mut() {
                chunk.phrase = "VP".to_string();
            }
        })
        .unwrap();
    assert_eq!(container.annotations_by(other, AnnotationType::Chunk), vec![chunk]);
    assert_eq!(container.annotations_by(t, AnnotationType::Chunk), vec![chunk]);
}

#[test]
fn import_carries_references_and_promotes() {
    let mut source = AnnotationContainer::new();
    let w = words(&mut source, &[1, 1]);
    let t: Vec<_> = w.iter().map(|wf| term(&mut source, *wf)).collect();
    let chunk = source
        .add_new(Chunk::new("NP", Span::with_head(t.clone(), t[1]).unwrap()).unwrap())
        .unwrap();

    let mut target = AnnotationContainer::new();
    target.id_manager_mut().next_id(AnnotationType::Chunk);
    let mut copies = ImportMap::new();
    let chunk_copy = target.import(&source, chunk, &mut copies).unwrap();

    assert_eq!(target.get(chunk_copy).unwrap().id(), Some("c2"));
    assert_eq!(target.annotations(Layer::Chunks), &[chunk_copy]);
    assert!(target.annotations(Layer::Terms).is_empty());
    let t1_copy = copies.get(t[0]).unwrap();
    assert!(!target.is_member(t1_copy));
    assert_eq!(target.sent_of(chunk_copy), Some(1));
    assert_eq!(copies.len(), 5);

    let promoted = target.import(&source, t[0], &mut copies).unwrap();
    assert_eq!(promoted, t1_copy);
    assert!(target.is_member(t1_copy));
    assert_eq!(target.annotation_by_id("t1"), Some(t1_copy));
    assert_eq!(target.annotations(Layer::Terms), &[t1_copy]);
    let copy = target.get(chunk_copy).unwrap().kind().as_chunk().unwrap();
    assert_eq!(copy.head(), copies.get(t[1]));
}

#[test]
fn attach_registers_carried_annotations() {
    let mut source = AnnotationContainer::new();
    let w = words(&mut source, &[1]);
    let t = term(&mut source, w[0]);
    let mut target = AnnotationContainer::new();
    let mut copies = ImportMap::new();
    target.import(&source, t, &mut copies).unwrap();
    let wf = copies.get(w[0]).unwrap();

    assert!(target.sentence_wfs(1).is_empty());
    assert_eq!(target.attach(wf), Ok(true));
    assert_eq!(target.attach(wf), Ok(false));
    assert_eq!(target.sentence_wfs(1), &[wf]);
    assert_eq!(target.annotation_by_id("w1"), Some(wf));
}

#[test]
fn unknown_layers_and_raw_text_pass_through() {
    let mut container = AnnotationContainer::new();
    assert_eq!(container.raw_text(), None);
    container.set_raw_text("Hello");
    container.add_unknown_layer(UnknownLayer::new("ext", "<ext/>"));
    assert_eq!(container.raw_text(), Some("Hello"));
    assert_eq!(container.unknown_layers()[0].content, "<ext/>");
    assert!(container.is_empty());
}
