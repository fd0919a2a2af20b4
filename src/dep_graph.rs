//! Read-only view over the dependency layer.
//!
//! Besides neighbourhood queries, the view finds paths between terms and
//! matches them against compact patterns. A path is encoded as a string in
//! which every dependency label (lower-cased, split on `-`) is replaced by a
//! single letter, prefixed by `+` when the edge is walked `from → to` and `-`
//! otherwise, with `_` between edges:
//!
//! ```text
//! t1 --nsubj--> t2 <--obj-- t3      dep_path(t1, t3) encodes as "_+a_-b_"
//! ```
//!
//! Letters are allocated process-wide on first sight of a label (`a..z`,
//! then `A..Z`, then CJK ideographs), so encodings are comparable across
//! documents. Patterns use the same letters: `"a-b"` matches the path above.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::annotation::{AnnotationRef, Dep};
use crate::annotation_type::AnnotationType;
use crate::container::AnnotationContainer;
use crate::error::{KafError, Result};

static DEP_PATH_ALPHABET: Lazy<Mutex<HashMap<String, char>>> = Lazy::new(|| Mutex::new(HashMap::new()));
static DEP_PATH_PATTERNS: Lazy<Mutex<HashMap<String, Regex>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// The letter standing for `label` in encoded paths and patterns.
///
/// `label` is lower-cased first. A label never seen before gets the next free letter.
pub fn dep_path_letter(label: &str) -> char {
    let label = label.to_lowercase();
    let mut alphabet = DEP_PATH_ALPHABET.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(letter) = alphabet.get(&label) {
        return *letter;
    }
    let letter = nth_letter(alphabet.len());
    log::trace!("dependency label {:?} encoded as {:?}", label, letter);
    alphabet.insert(label, letter);
    letter
}

fn nth_letter(n: usize) -> char {
    match n {
        0..=25 => (b'a' + n as u8) as char,
        26..=51 => (b'A' + (n - 26) as u8) as char,
        _ => char::from_u32(0x4E00 + (n - 52) as u32).unwrap_or(char::REPLACEMENT_CHARACTER),
    }
}

/// Translates a letter pattern into an anchored regular expression.
///
/// Every letter becomes one path segment containing that letter (walked
/// forward, or backward when preceded by `-`). Whitespace is dropped and any
/// other character is kept as regex syntax. A `-` with no letter after it is
/// an error.
fn pattern_to_regex(pattern: &str) -> Result<String> {
    let mut regex = String::from("^_");
    let mut inverse = false;
    for c in pattern.chars() {
        if c.is_whitespace() {
            continue;
        }
        if c == '-' {
            inverse = true;
        } else if c.is_alphabetic() {
            let sign = if inverse { '-' } else { '+' };
            regex.push_str("[^_]*");
            regex.push_str(&regex::escape(&format!("{}{}", sign, c)));
            regex.push_str("[^_]*_");
            inverse = false;
        } else {
            regex.push(c);
        }
    }
    if inverse {
        return Err(KafError::InvalidPattern {
            pattern: pattern.to_string(),
            message: "`-` is not followed by a label".to_string(),
        });
    }
    regex.push('$');
    Ok(regex)
}

fn compiled_pattern(pattern: &str) -> Result<Regex> {
    let mut patterns = DEP_PATH_PATTERNS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(regex) = patterns.get(pattern) {
        return Ok(regex.clone());
    }
    let regex = Regex::new(&pattern_to_regex(pattern)?).map_err(|e| KafError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;
    patterns.insert(pattern.to_string(), regex.clone());
    Ok(regex)
}

/// Dependency queries over the DEP annotations of a container.
#[derive(Debug, Clone, Copy)]
pub struct DependencyGraph<'a> {
    container: &'a AnnotationContainer,
}

impl AnnotationContainer {
    pub fn dependency_graph(&self) -> DependencyGraph<'_> {
        DependencyGraph::new(self)
    }
}

impl<'a> DependencyGraph<'a> {
    pub fn new(container: &'a AnnotationContainer) -> Self {
        DependencyGraph { container }
    }

    /// All dependencies, in insertion order.
    pub fn deps(&self) -> &'a [AnnotationRef] {
        self.container.annotations(AnnotationType::Dep)
    }

    pub fn dep(&self, r: AnnotationRef) -> Option<&'a Dep> {
        self.container.get(r).and_then(|a| a.kind().as_dep())
    }

    /// Dependencies touching `term` at either end, in insertion order.
    pub fn deps_by_term(&self, term: AnnotationRef) -> Vec<AnnotationRef> {
        self.container
            .annotations_by(term, AnnotationType::Dep)
            .into_iter()
            .filter(|r| {
                self.dep(*r)
                    .map_or(false, |dep| dep.from == term || dep.to == term)
            })
            .collect()
    }

    /// Dependencies whose source is `term`.
    pub fn deps_from_term(&self, term: AnnotationRef) -> Vec<AnnotationRef> {
        self.deps_by_term(term)
            .into_iter()
            .filter(|r| self.dep(*r).map_or(false, |dep| dep.from == term))
            .collect()
    }

    /// The dependency whose target is `term` (the first one if the layer is not a tree).
    pub fn dep_to_term(&self, term: AnnotationRef) -> Option<AnnotationRef> {
        self.deps_by_term(term)
            .into_iter()
            .find(|r| self.dep(*r).map_or(false, |dep| dep.to == term))
    }

    /// The only term of `terms` whose governor (the source of its
    /// [`dep_to_term`](Self::dep_to_term)) is not in `terms`.
    ///
    /// `None` when there are no such terms or more than one.
    pub fn terms_head(&self, terms: &[AnnotationRef]) -> Option<AnnotationRef> {
        let members: HashSet<AnnotationRef> = terms.iter().copied().collect();
        let mut heads = terms.iter().copied().filter(|term| {
            self.dep_to_term(*term)
                .and_then(|r| self.dep(r))
                .map_or(true, |dep| !members.contains(&dep.from))
        });
        let head = heads.next()?;
        if heads.any(|other| other != head) {
            return None;
        }
        Some(head)
    }

    /// `terms` and all their descendants, breadth-first, without duplicates.
    pub fn terms_by_dep_ancestors(&self, terms: &[AnnotationRef]) -> Vec<AnnotationRef> {
        let mut seen: HashSet<AnnotationRef> = HashSet::new();
        let mut result = Vec::new();
        let mut queue: VecDeque<AnnotationRef> = VecDeque::new();
        for term in terms {
            if seen.insert(*term) {
                queue.push_back(*term);
            }
        }
        while let Some(term) = queue.pop_front() {
            result.push(term);
            for dep in self.deps_from_term(term) {
                if let Some(dep) = self.dep(dep) {
                    if seen.insert(dep.to) {
                        queue.push_back(dep.to);
                    }
                }
            }
        }
        result
    }

    /// Descendants of `terms` whose path from the ancestor matches `pattern`.
    ///
    /// An ancestor itself is kept only if `pattern` matches the empty path.
    pub fn terms_by_dep_ancestors_matching(&self, terms: &[AnnotationRef], pattern: &str) -> Result<Vec<AnnotationRef>> {
        let mut result: Vec<AnnotationRef> = Vec::new();
        for ancestor in terms {
            for descendant in self.terms_by_dep_ancestors(&[*ancestor]) {
                if result.contains(&descendant) {
                    continue;
                }
                let Some(path) = self.dep_path(*ancestor, descendant) else {
                    continue;
                };
                if self.match_dep_path(*ancestor, &path, pattern)? {
                    result.push(descendant);
                }
            }
        }
        Ok(result)
    }

    /// Shortest path of dependencies between two terms, each edge walkable in
    /// both directions.
    ///
    /// Empty when `from == to`, `None` when the terms are not connected. On a
    /// tree this is the chain from `from` up to the lowest common ancestor,
    /// followed by the chain down to `to`.
    pub fn dep_path(&self, from: AnnotationRef, to: AnnotationRef) -> Option<Vec<AnnotationRef>> {
        if from == to {
            return Some(Vec::new());
        }
        let terms = pathfinding::prelude::bfs(
            &from,
            |term| self.neighbours(*term),
            |term| *term == to,
        )?;
        terms
            .windows(2)
            .map(|pair| self.edge_between(pair[0], pair[1]))
            .collect()
    }

    fn neighbours(&self, term: AnnotationRef) -> Vec<AnnotationRef> {
        self.deps_by_term(term)
            .into_iter()
            .filter_map(|r| self.dep(r))
            .map(|dep| if dep.from == term { dep.to } else { dep.from })
            .collect()
    }

    fn edge_between(&self, a: AnnotationRef, b: AnnotationRef) -> Option<AnnotationRef> {
        self.deps_by_term(a).into_iter().find(|r| {
            self.dep(*r).map_or(false, |dep| {
                (dep.from == a && dep.to == b) || (dep.from == b && dep.to == a)
            })
        })
    }

    /// Encodes `path`, walked starting at `from`.
    pub fn encode_dep_path(&self, from: AnnotationRef, path: &[AnnotationRef]) -> String {
        let mut encoded = String::from("_");
        let mut current = from;
        for r in path {
            let Some(dep) = self.dep(*r) else {
                continue;
            };
            let (sign, next) = if dep.from == current {
                ('+', dep.to)
            } else {
                ('-', dep.from)
            };
            for label in dep.rfunc.to_lowercase().split('-').filter(|l| !l.is_empty()) {
                encoded.push(sign);
                encoded.push(dep_path_letter(label));
            }
            encoded.push('_');
            current = next;
        }
        encoded
    }

    /// Whether `path`, walked starting at `from`, matches `pattern` as a whole.
    pub fn match_dep_path(&self, from: AnnotationRef, path: &[AnnotationRef], pattern: &str) -> Result<bool> {
        let regex = compiled_pattern(pattern)?;
        Ok(regex.is_match(&self.encode_dep_path(from, path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Annotation, Term, Wf};
    use crate::span::Span;

    fn terms(container: &mut AnnotationContainer, n: usize) -> Vec<AnnotationRef> {
        (0..n)
            .map(|i| {
                let wf = container
                    .add_new(Wf::new(i * 2, 1, "x", 1))
                    .unwrap();
                container
                    .add_new(Term::new(Span::from_targets(vec![wf])))
                    .unwrap()
            })
            .collect()
    }

    fn dep(container: &mut AnnotationContainer, from: AnnotationRef, to: AnnotationRef, rfunc: &str) -> AnnotationRef {
        container
            .add(Annotation::anonymous(Dep::new(from, to, rfunc)))
            .unwrap()
    }

    #[test]
    fn letters_are_stable() {
        let a = dep_path_letter("graph-test-label");
        assert_eq!(dep_path_letter("Graph-Test-Label"), a);
        assert!(a.is_alphabetic());
    }

    #[test]
    fn nth_letter_ranges() {
        assert_eq!(nth_letter(0), 'a');
        assert_eq!(nth_letter(25), 'z');
        assert_eq!(nth_letter(26), 'A');
        assert_eq!(nth_letter(52), '\u{4E00}');
        assert!(nth_letter(60).is_alphabetic());
    }

    #[test]
    fn pattern_translation() {
        assert_eq!(pattern_to_regex("a -b").unwrap(), r"^_[^_]*\+a[^_]*_[^_]*\-b[^_]*_$");
        assert_eq!(pattern_to_regex("(a)*").unwrap(), r"^_([^_]*\+a[^_]*_)*$");
    }

    #[test]
    fn invalid_patterns_are_reported() {
        let mut container = AnnotationContainer::new();
        let t = terms(&mut container, 1);
        let graph = container.dependency_graph();
        assert!(matches!(
            graph.match_dep_path(t[0], &[], "(a"),
            Err(KafError::InvalidPattern { .. })
        ));
        for dangling in ["a-", "-", "a - "] {
            assert!(
                matches!(
                    graph.match_dep_path(t[0], &[], dangling),
                    Err(KafError::InvalidPattern { .. })
                ),
                "{:?}",
                dangling
            );
        }
    }

    #[test]
    fn neighbourhood_queries() {
        let mut container = AnnotationContainer::new();
        let t = terms(&mut container, 4);
        // t2 heads t1 and t3, t3 heads t4
        let d1 = dep(&mut container, t[1], t[0], "nsubj");
        let d2 = dep(&mut container, t[1], t[2], "obj");
        let d3 = dep(&mut container, t[2], t[3], "amod");
        let graph = container.dependency_graph();

        assert_eq!(graph.deps_from_term(t[1]), vec![d1, d2]);
        assert_eq!(graph.dep_to_term(t[2]), Some(d2));
        assert_eq!(graph.dep_to_term(t[1]), None);
        assert_eq!(graph.deps_by_term(t[2]), vec![d2, d3]);
        assert_eq!(graph.terms_head(&[t[0], t[1], t[2], t[3]]), Some(t[1]));
        assert_eq!(graph.terms_head(&[t[0], t[1], t[3]]), None);
        assert_eq!(graph.terms_head(&[t[0], t[3]]), None);
        assert_eq!(graph.terms_head(&[]), None);
        assert_eq!(graph.terms_by_dep_ancestors(&[t[2]]), vec![t[2], t[3]]);
        assert_eq!(graph.terms_by_dep_ancestors(&[t[1], t[2]]), vec![t[1], t[2], t[0], t[3]]);
    }

    #[test]
    fn heads_only_look_at_the_direct_governor() {
        let mut container = AnnotationContainer::new();
        let t = terms(&mut container, 3);
        dep(&mut container, t[0], t[1], "obj");
        dep(&mut container, t[1], t[2], "amod");
        let graph = container.dependency_graph();

        // t2 hangs from t1, which is not in the set
        assert_eq!(graph.terms_head(&[t[0], t[2]]), None);
        assert_eq!(graph.terms_head(&[t[1], t[2]]), Some(t[1]));
        assert_eq!(graph.terms_head(&[t[2], t[2]]), Some(t[2]));
    }

    #[test]
    fn paths_climb_to_the_common_ancestor() {
        let mut container = AnnotationContainer::new();
        let t = terms(&mut container, 5);
        let d1 = dep(&mut container, t[1], t[0], "det");
        let d2 = dep(&mut container, t[2], t[1], "nsubj");
        let d3 = dep(&mut container, t[2], t[3], "obj");
        let d4 = dep(&mut container, t[3], t[4], "amod");
        let graph = container.dependency_graph();

        assert_eq!(graph.dep_path(t[0], t[4]), Some(vec![d1, d2, d3, d4]));
        assert_eq!(graph.dep_path(t[4], t[3]), Some(vec![d4]));
        assert_eq!(graph.dep_path(t[2], t[2]), Some(vec![]));

        let det = dep_path_letter("det");
        let nsubj = dep_path_letter("nsubj");
        let obj = dep_path_letter("obj");
        let amod = dep_path_letter("amod");
        let path = graph.dep_path(t[0], t[4]).unwrap();
        assert_eq!(
            graph.encode_dep_path(t[0], &path),
            format!("_-{}_-{}_+{}_+{}_", det, nsubj, obj, amod)
        );
        let pattern = format!("-{} -{} {} {}", det, nsubj, obj, amod);
        assert!(graph.match_dep_path(t[0], &path, &pattern).unwrap());
        let prefix_only = format!("-{} -{}", det, nsubj);
        assert!(!graph.match_dep_path(t[0], &path, &prefix_only).unwrap());
    }

    #[test]
    fn unconnected_terms_have_no_path() {
        let mut container = AnnotationContainer::new();
        let t = terms(&mut container, 3);
        dep(&mut container, t[0], t[1], "nsubj");
        let graph = container.dependency_graph();
        assert_eq!(graph.dep_path(t[0], t[2]), None);
    }

    #[test]
    fn compound_labels_encode_every_part() {
        let mut container = AnnotationContainer::new();
        let t = terms(&mut container, 2);
        let d = dep(&mut container, t[0], t[1], "OBJ-coord");
        let graph = container.dependency_graph();
        let obj = dep_path_letter("obj");
        let coord = dep_path_letter("coord");
        assert_eq!(graph.encode_dep_path(t[1], &[d]), format!("_-{}-{}_", obj, coord));
        assert!(graph.match_dep_path(t[1], &[d], &format!("-{}", coord)).unwrap());
        assert!(!graph.match_dep_path(t[1], &[d], &coord.to_string()).unwrap());
    }

    #[test]
    fn descendants_filtered_by_pattern() {
        let mut container = AnnotationContainer::new();
        let t = terms(&mut container, 4);
        dep(&mut container, t[0], t[1], "dobj");
        dep(&mut container, t[0], t[2], "advmod");
        dep(&mut container, t[1], t[3], "dobj");
        let graph = container.dependency_graph();
        let dobj = dep_path_letter("dobj");

        let one_step = graph
            .terms_by_dep_ancestors_matching(&[t[0]], &dobj.to_string())
            .unwrap();
        assert_eq!(one_step, vec![t[1]]);
        let chain = graph
            .terms_by_dep_ancestors_matching(&[t[0]], &format!("({})+", dobj))
            .unwrap();
        assert_eq!(chain, vec![t[1], t[3]]);
    }
}
