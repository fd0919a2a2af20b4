//! Bracketed constituency parses.
//!
//! ```text
//! (ROOT (S (NP (DT The) (NN cat)) (VP=H (VBD sat))))
//! ```
//!
//! Every bracket opens a labelled non-terminal, every bare word is a leaf
//! standing for the next term. A `=H` suffix marks the head child of its
//! parent.

use layered_kaf::{AnnotationContainer, AnnotationRef, NonTerminal, Span, Terminal};

use crate::error::{DocumentError, DocumentResult};

const HEAD_MARK: &str = "=H";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BracketNode {
    label: String,
    is_head: bool,
    children: Vec<BracketChild>,
}

#[derive(Debug, Clone, PartialEq)]
enum BracketChild {
    Node(BracketNode),
    Leaf(String),
}

fn tokenize(input: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (at, c) in input.char_indices() {
        if c == '(' || c == ')' || c.is_whitespace() {
            if let Some(from) = start.take() {
                tokens.push((from, &input[from..at]));
            }
            if !c.is_whitespace() {
                tokens.push((at, &input[at..at + 1]));
            }
        } else if start.is_none() {
            start = Some(at);
        }
    }
    if let Some(from) = start {
        tokens.push((from, &input[from..]));
    }
    tokens
}

fn malformed(position: usize, message: &'static str) -> DocumentError {
    DocumentError::MalformedParse { position, message }
}

impl BracketNode {
    /// Parses exactly one bracketed tree.
    pub(crate) fn parse(input: &str) -> DocumentResult<BracketNode> {
        let tokens = tokenize(input);
        let mut next = 0;
        let root = Self::parse_node(&tokens, &mut next, input.len())?;
        if let Some((at, _)) = tokens.get(next) {
            return Err(malformed(*at, "unexpected content after the tree"));
        }
        Ok(root)
    }

    fn parse_node(tokens: &[(usize, &str)], next: &mut usize, end: usize) -> DocumentResult<BracketNode> {
        match tokens.get(*next) {
            Some((_, "(")) => *next += 1,
            Some((at, _)) => return Err(malformed(*at, "expected `(`")),
            None => return Err(malformed(end, "expected `(`")),
        }
        let label = match tokens.get(*next) {
            Some((_, "(")) | Some((_, ")")) | None => {
                let at = tokens.get(*next).map_or(end, |(at, _)| *at);
                return Err(malformed(at, "constituent without a label"));
            }
            Some((_, label)) => {
                *next += 1;
                *label
            }
        };
        let (label, is_head) = match label.strip_suffix(HEAD_MARK) {
            Some(stripped) => (stripped, true),
            None => (label, false),
        };

        let mut children = Vec::new();
        loop {
            match tokens.get(*next) {
                None => return Err(malformed(end, "unclosed `(`")),
                Some((at, ")")) => {
                    if children.is_empty() {
                        return Err(malformed(*at, "constituent without children"));
                    }
                    *next += 1;
                    break;
                }
                Some((_, "(")) => children.push(BracketChild::Node(Self::parse_node(tokens, next, end)?)),
                Some((_, word)) => {
                    children.push(BracketChild::Leaf(word.to_string()));
                    *next += 1;
                }
            }
        }
        Ok(BracketNode {
            label: label.to_string(),
            is_head,
            children,
        })
    }

    /// Number of leaves below this node.
    pub(crate) fn leaves(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                BracketChild::Node(node) => node.leaves(),
                BracketChild::Leaf(_) => 1,
            })
            .sum()
    }

    /// Stores this node and everything below it. Leaves take `terms` in
    /// order starting at `*next`.
    pub(crate) fn build(
        &self,
        container: &mut AnnotationContainer,
        terms: &[AnnotationRef],
        next: &mut usize,
    ) -> DocumentResult<AnnotationRef> {
        let node = container.add_new(NonTerminal::new(self.label.as_str()))?;
        for child in self.children.iter() {
            let (child, is_head) = match child {
                BracketChild::Node(inner) => (inner.build(container, terms, next)?, inner.is_head),
                BracketChild::Leaf(word) => {
                    let term = *terms.get(*next).ok_or(DocumentError::LeafCountMismatch {
                        leaves: *next + 1,
                        terms: terms.len(),
                    })?;
                    *next += 1;
                    log::trace!("leaf {:?} over {}", word, term);
                    (container.add_new(Terminal::new(Span::from_targets(vec![term])))?, false)
                }
            };
            container.add_tree_child(node, child, is_head)?;
        }
        Ok(node)
    }
}
