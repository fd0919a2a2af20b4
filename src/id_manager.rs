//! Per-type id counters.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::annotation_type::AnnotationType;

/// Mints `<prefix><n>` ids and keeps the counters ahead of ids supplied by callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdManager {
    counters: HashMap<AnnotationType, u64>,
}

impl IdManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counter value for `ty` (0 when nothing was minted or reconciled).
    pub fn counter(&self, ty: AnnotationType) -> u64 {
        self.counters.get(&ty).copied().unwrap_or(0)
    }

    /// Returns `<prefix><counter + 1>` and advances the counter.
    pub fn next_id(&mut self, ty: AnnotationType) -> String {
        let counter = self.counters.entry(ty).or_insert(0);
        *counter += 1;
        format!("{}{}", ty.id_prefix(), counter)
    }

    /// Advances the counter of `ty` to the numeric tail of `id` when that tail is larger.
    ///
    /// Ids without a numeric tail, or whose tail does not fit a `u64`, are
    /// accepted without touching the counter.
    pub fn reconcile(&mut self, ty: AnnotationType, id: &str) {
        let Some(n) = numeric_tail(id) else {
            log::trace!("id {:?} has no numeric tail, {:?} counter unchanged", id, ty);
            return;
        };
        let counter = self.counters.entry(ty).or_insert(0);
        if n > *counter {
            *counter = n;
        }
    }
}

fn numeric_tail(id: &str) -> Option<u64> {
    let digits = id.len() - id.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    id[id.len() - digits..].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mints_sequential_ids_per_type() {
        let mut ids = IdManager::new();
        assert_eq!(ids.next_id(AnnotationType::Wf), "w1");
        assert_eq!(ids.next_id(AnnotationType::Wf), "w2");
        assert_eq!(ids.next_id(AnnotationType::Term), "t1");
        assert_eq!(ids.next_id(AnnotationType::Coref), "coref1");
        assert_eq!(ids.next_id(AnnotationType::Edge), "tre1");
    }

    #[test]
    fn reconcile_skips_past_supplied_ids() {
        let mut ids = IdManager::new();
        ids.reconcile(AnnotationType::Wf, "w17");
        assert_eq!(ids.next_id(AnnotationType::Wf), "w18");
        ids.reconcile(AnnotationType::Wf, "w3");
        assert_eq!(ids.counter(AnnotationType::Wf), 18);
    }

    #[test]
    fn malformed_ids_do_not_advance() {
        let mut ids = IdManager::new();
        ids.reconcile(AnnotationType::Term, "term_x");
        ids.reconcile(AnnotationType::Term, "t99999999999999999999999");
        assert_eq!(ids.counter(AnnotationType::Term), 0);
        ids.reconcile(AnnotationType::Term, "mw1.c4");
        assert_eq!(ids.counter(AnnotationType::Term), 4);
    }
}
