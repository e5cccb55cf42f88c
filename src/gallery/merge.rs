use super::record::{ContentKey, ImageRecord};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Collapse records sharing an identity into the original capture and order
/// the survivors newest first.
///
/// Within an identity group the record with the smallest `created_at` wins;
/// equal timestamps keep whichever came first in `records`. The output is
/// sorted by `created_at` descending with ties broken by identity, so the
/// order of the survivors does not depend on arrival order and
/// `merge(&merge(l)) == merge(l)` for every `l`.
pub fn merge(records: &[ImageRecord]) -> Vec<ImageRecord> {
    let mut winners: HashMap<&ContentKey, usize> = HashMap::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        match winners.entry(&record.identity) {
            Entry::Vacant(slot) => {
                slot.insert(idx);
            }
            Entry::Occupied(mut slot) => {
                if record.created_at < records[*slot.get()].created_at {
                    slot.insert(idx);
                }
            }
        }
    }

    let mut kept: Vec<usize> = winners.into_values().collect();
    kept.sort_by(|&a, &b| {
        records[b]
            .created_at
            .cmp(&records[a].created_at)
            .then_with(|| records[a].identity.cmp(&records[b].identity))
    });
    let dropped = records.len() - kept.len();
    if dropped > 0 {
        tracing::debug!(dropped, kept = kept.len(), "merged duplicate captures");
    }
    kept.into_iter().map(|idx| records[idx].clone()).collect()
}
