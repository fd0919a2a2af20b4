//! Ordered selections of annotations with an optional head.

use serde::{Deserialize, Serialize};

use crate::error::{KafError, Result};

/// An ordered list of targets of one kind, optionally designating one of them
/// as the head.
///
/// Targets keep insertion order. The head, when present, is always one of the
/// targets. Two spans are equal when their targets are equal in order and
/// their heads are equal.
///
/// ```
/// use layered_kaf::Span;
///
/// let mut span = Span::from_targets(vec![1, 2]);
/// span.add_head_target(3);
/// assert_eq!(span.targets(), &[1, 2, 3]);
/// assert_eq!(span.head(), Some(&3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span<T> {
    targets: Vec<T>,
    head: Option<T>,
}

impl<T> Default for Span<T> {
    fn default() -> Self {
        Span {
            targets: Vec::new(),
            head: None,
        }
    }
}

impl<T> Span<T> {
    /// An empty span.
    pub fn new() -> Self {
        Self::default()
    }

    /// A span over `targets` without a head.
    pub fn from_targets(targets: Vec<T>) -> Self {
        Span {
            targets,
            head: None,
        }
    }

    pub fn targets(&self) -> &[T] {
        &self.targets
    }

    pub fn head(&self) -> Option<&T> {
        self.head.as_ref()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn first_target(&self) -> Option<&T> {
        self.targets.first()
    }

    pub fn last_target(&self) -> Option<&T> {
        self.targets.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.targets.iter()
    }

    /// Appends a target.
    pub fn add_target(&mut self, target: T) {
        self.targets.push(target);
    }

    /// Re-targets every element (and the head) through `f`.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Span<U> {
        Span {
            targets: self.targets.into_iter().map(&mut f).collect(),
            head: self.head.map(f),
        }
    }
}

impl<T: Clone + PartialEq> Span<T> {
    /// A span over `targets` whose head is `head`.
    ///
    /// Fails with [`KafError::HeadNotInSpan`] when `head` is not one of the targets.
    pub fn with_head(targets: Vec<T>, head: T) -> Result<Self> {
        if !targets.contains(&head) {
            return Err(KafError::HeadNotInSpan);
        }
        Ok(Span {
            targets,
            head: Some(head),
        })
    }

    pub fn contains(&self, target: &T) -> bool {
        self.targets.contains(target)
    }

    /// Appends a target and makes it the head, replacing any previous head.
    pub fn add_head_target(&mut self, target: T) {
        self.head = Some(target.clone());
        self.targets.push(target);
    }

    /// Designates an existing target as the head.
    pub fn set_head(&mut self, head: T) -> Result<()> {
        if !self.contains(&head) {
            return Err(KafError::HeadNotInSpan);
        }
        self.head = Some(head);
        Ok(())
    }

    pub fn clear_head(&mut self) {
        self.head = None;
    }

    /// Removes every occurrence of `target`. Returns whether anything was removed.
    pub fn remove_target(&mut self, target: &T) -> bool {
        let before = self.targets.len();
        self.targets.retain(|t| t != target);
        if self.head.as_ref() == Some(target) {
            self.head = None;
        }
        before != self.targets.len()
    }

    /// Keeps only the targets accepted by `keep`; drops the head if it is rejected.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.targets.retain(|t| keep(t));
        if let Some(head) = &self.head {
            if !keep(head) {
                self.head = None;
            }
        }
    }
}

impl<T> From<Vec<T>> for Span<T> {
    fn from(targets: Vec<T>) -> Self {
        Span::from_targets(targets)
    }
}

impl<'a, T> IntoIterator for &'a Span<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut span = Span::new();
        assert!(span.is_empty());
        span.add_target("b");
        span.add_target("a");
        assert_eq!(span.targets(), &["b", "a"]);
        assert_eq!(span.first_target(), Some(&"b"));
        assert_eq!(span.last_target(), Some(&"a"));
        assert_eq!(span.len(), 2);
        assert_eq!(span.head(), None);
    }

    #[test]
    fn second_head_overwrites_first() {
        let mut span = Span::new();
        span.add_head_target(1);
        span.add_head_target(2);
        assert_eq!(span.targets(), &[1, 2]);
        assert_eq!(span.head(), Some(&2));
    }

    #[test]
    fn head_must_be_member() {
        assert_eq!(Span::with_head(vec![1, 2], 3), Err(KafError::HeadNotInSpan));
        let mut span = Span::with_head(vec![1, 2], 2).unwrap();
        assert_eq!(span.set_head(5), Err(KafError::HeadNotInSpan));
        span.set_head(1).unwrap();
        assert_eq!(span.head(), Some(&1));
    }

    #[test]
    fn equality_is_structural() {
        let a = Span::with_head(vec![1, 2], 1).unwrap();
        let b = Span::with_head(vec![1, 2], 1).unwrap();
        let c = Span::with_head(vec![1, 2], 2).unwrap();
        let d = Span::with_head(vec![2, 1], 1).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn removing_the_head_clears_it() {
        let mut span = Span::with_head(vec![1, 2, 3], 2).unwrap();
        assert!(span.remove_target(&2));
        assert!(!span.remove_target(&9));
        assert_eq!(span.targets(), &[1, 3]);
        assert_eq!(span.head(), None);
    }
}
