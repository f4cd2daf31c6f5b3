//! Provenance reconstruction.
//!
//! Walks the registry backwards from every sequence matching a target profile.
//! Edges are implicit: event `E` has parents `E.left` and `E.right`, and each
//! parent's recorded events are its own incoming edges. The walk is a FIFO
//! worklist with a seen-set over sequence ids, so it terminates on any finite
//! registry and expands every sequence at most once. Entries with no events
//! (the reference, or sequences whose history was not recorded) are roots of
//! the provenance forest.

use std::collections::VecDeque;

use bitvec::prelude::*;
use tracing::debug;

use crate::chunks::Profile;
use crate::recombination::RecombinationEvent;
use crate::registry::{CnvRegistry, SequenceId};

/// Events contributing to a target profile, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct Provenance {
    events: Vec<RecombinationEvent>,
    direct: usize,
    expanded: usize,
}

impl Provenance {
    /// All contributing events, each exactly once.
    pub fn events(&self) -> &[RecombinationEvent] {
        &self.events
    }

    /// Number of events recorded directly on sequences matching the target
    /// profile (the leading block of [`events`](Self::events)).
    pub fn direct_histories(&self) -> usize {
        self.direct
    }

    /// Number of ancestor sequences expanded during the walk.
    pub fn expanded_sequences(&self) -> usize {
        self.expanded
    }

    /// Total events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing contributed.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Recover every event that contributed, directly or through its ancestors,
/// to a sequence with the `target` profile.
pub fn reconstruct(registry: &CnvRegistry, target: &Profile) -> Provenance {
    let mut seen = bitvec![0; registry.len()];
    let mut worklist = VecDeque::new();

    for id in registry.ids_matching_profile(target) {
        seen.set(id.index(), true);
        worklist.extend(registry.events(id).iter().copied());
    }
    let direct = worklist.len();

    let mut events = Vec::with_capacity(direct);
    let mut expanded = 0;
    while let Some(event) = worklist.pop_front() {
        events.push(event);
        for parent in event.parents() {
            if mark_seen(&mut seen, parent) {
                expanded += 1;
                worklist.extend(registry.events(parent).iter().copied());
            }
        }
    }

    debug!(
        "Reconstructed {} events ({} direct) across {} ancestor sequences",
        events.len(),
        direct,
        expanded
    );
    Provenance {
        events,
        direct,
        expanded,
    }
}

/// Mark `id` seen; true if it was not seen before.
fn mark_seen(seen: &mut BitVec, id: SequenceId) -> bool {
    let was_seen = seen[id.index()];
    if !was_seen {
        seen.set(id.index(), true);
    }
    !was_seen
}
