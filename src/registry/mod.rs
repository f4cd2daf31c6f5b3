//! CNV registry: every distinct sequence ever produced, with provenance.
//!
//! Sequences are interned in an append-only arena and addressed by
//! [`SequenceId`]. A sorted index maps each sequence back to its id and fixes
//! the deterministic iteration order (lexicographic by chunk).
//!
//! Entries are never removed or replaced. A batch merged after a generation
//! only adds sequences that are not yet present; the first generation and the
//! event list of an existing entry are frozen at first discovery.

use std::collections::BTreeMap;

use crate::chunks::{ChunkSequence, Profile};
use crate::recombination::RecombinationEvent;

/// Stable handle to a registry sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceId(u32);

impl SequenceId {
    /// Arena slot of this sequence.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A registry entry: one distinct sequence and how it was first made.
#[derive(Debug, Clone)]
pub struct CnvEntry {
    sequence: ChunkSequence,
    first_generation: usize,
    events: Vec<RecombinationEvent>,
}

impl CnvEntry {
    /// The sequence.
    pub fn sequence(&self) -> &ChunkSequence {
        &self.sequence
    }

    /// Generation in which the sequence was first inserted.
    pub fn first_generation(&self) -> usize {
        self.first_generation
    }

    /// Events recorded as producing the sequence (empty for the reference).
    pub fn events(&self) -> &[RecombinationEvent] {
        &self.events
    }
}

/// Registry of copy-number variants.
#[derive(Debug, Clone)]
pub struct CnvRegistry {
    entries: Vec<CnvEntry>,
    index: BTreeMap<ChunkSequence, SequenceId>,
    generations: usize,
}

impl CnvRegistry {
    /// Registry holding only the reference sequence at generation 0.
    pub fn new(reference: ChunkSequence) -> Self {
        let mut registry = Self {
            entries: Vec::new(),
            index: BTreeMap::new(),
            generations: 0,
        };
        registry.insert_if_absent(reference, 0, Vec::new());
        registry
    }

    /// Id of the reference sequence.
    pub fn root(&self) -> SequenceId {
        SequenceId(0)
    }

    /// Number of distinct sequences.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the reference is present from construction.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of generations merged so far.
    pub fn generations(&self) -> usize {
        self.generations
    }

    /// Entry for `id`.
    ///
    /// # Panics
    /// If `id` was issued by a different registry.
    pub fn entry(&self, id: SequenceId) -> &CnvEntry {
        &self.entries[id.index()]
    }

    /// Sequence for `id`.
    pub fn sequence(&self, id: SequenceId) -> &ChunkSequence {
        &self.entry(id).sequence
    }

    /// First generation of `id`.
    pub fn first_generation(&self, id: SequenceId) -> usize {
        self.entry(id).first_generation
    }

    /// Recorded events for `id`.
    pub fn events(&self, id: SequenceId) -> &[RecombinationEvent] {
        &self.entry(id).events
    }

    /// Exact lookup.
    pub fn id_of(&self, sequence: &ChunkSequence) -> Option<SequenceId> {
        self.index.get(sequence).copied()
    }

    /// Whether `sequence` has been discovered.
    pub fn contains(&self, sequence: &ChunkSequence) -> bool {
        self.index.contains_key(sequence)
    }

    /// Ids in lexicographic sequence order.
    pub fn ids(&self) -> impl Iterator<Item = SequenceId> + '_ {
        self.index.values().copied()
    }

    /// Entries in lexicographic sequence order.
    pub fn iter(&self) -> impl Iterator<Item = (SequenceId, &CnvEntry)> + '_ {
        self.ids().map(move |id| (id, self.entry(id)))
    }

    /// Total number of recorded events across all entries.
    pub fn event_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.events.len()).sum()
    }

    /// Ids of every sequence with the given copy-number profile.
    pub fn ids_matching_profile<'a>(
        &'a self,
        profile: &'a Profile,
    ) -> impl Iterator<Item = SequenceId> + 'a {
        self.iter()
            .filter(move |(_, entry)| profile.matches(&entry.sequence))
            .map(|(id, _)| id)
    }

    /// Every event recorded for sequences matching `profile`, in registry
    /// order.
    pub fn histories_for_profile(&self, profile: &Profile) -> Vec<RecombinationEvent> {
        self.ids_matching_profile(profile)
            .flat_map(|id| self.events(id).iter().copied())
            .collect()
    }

    /// Events recorded for exactly `sequence`; empty if it is unknown.
    pub fn histories_for_arrangement(&self, sequence: &ChunkSequence) -> &[RecombinationEvent] {
        self.id_of(sequence)
            .map(|id| self.events(id))
            .unwrap_or(&[])
    }

    /// Insert `sequence` unless already present. Returns the id of the new
    /// entry, or `None` if the sequence was known (and left untouched).
    ///
    /// # Panics
    /// If the registry already holds `u32::MAX + 1` sequences.
    pub fn insert_if_absent(
        &mut self,
        sequence: ChunkSequence,
        first_generation: usize,
        events: Vec<RecombinationEvent>,
    ) -> Option<SequenceId> {
        if self.index.contains_key(&sequence) {
            return None;
        }
        let id = next_id(self.entries.len());
        self.index.insert(sequence.clone(), id);
        self.entries.push(CnvEntry {
            sequence,
            first_generation,
            events,
        });
        Some(id)
    }

    /// Merge one generation's batch with insert-if-absent semantics and
    /// advance the generation counter. Returns the number of new sequences.
    pub fn merge_generation<I>(&mut self, generation: usize, batch: I) -> usize
    where
        I: IntoIterator<Item = (ChunkSequence, usize, Vec<RecombinationEvent>)>,
    {
        let mut added = 0;
        for (sequence, first_generation, events) in batch {
            if self.insert_if_absent(sequence, first_generation, events).is_some() {
                added += 1;
            }
        }
        self.generations = self.generations.max(generation);
        added
    }
}

/// Id for the arena slot at `len`.
fn next_id(len: usize) -> SequenceId {
    match u32::try_from(len) {
        Ok(slot) => SequenceId(slot),
        Err(_) => panic!("CNV registry is full: sequence ids are limited to {}", u32::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_reference_only() {
        let registry = CnvRegistry::new(ChunkSequence::from("0123"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.generations(), 0);
        let root = registry.root();
        assert_eq!(registry.sequence(root).to_string(), "0123");
        assert_eq!(registry.first_generation(root), 0);
        assert!(registry.events(root).is_empty());
    }

    #[test]
    fn test_insert_if_absent_keeps_first_entry() {
        let mut registry = CnvRegistry::new(ChunkSequence::from("012"));
        let root = registry.root();
        let event = RecombinationEvent::new_unchecked(root, 1, root, 1);

        assert!(registry
            .insert_if_absent(ChunkSequence::from("012"), 1, vec![event])
            .is_none());
        assert_eq!(registry.first_generation(root), 0);
        assert!(registry.events(root).is_empty());

        let id = registry
            .insert_if_absent(ChunkSequence::from("02"), 1, vec![event])
            .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.events(id).len(), 1);
    }

    #[test]
    fn test_iteration_is_lexicographic() {
        let mut registry = CnvRegistry::new(ChunkSequence::from("012"));
        registry.merge_generation(
            1,
            vec![
                (ChunkSequence::from("02"), 1, Vec::new()),
                (ChunkSequence::from("0112"), 1, Vec::new()),
            ],
        );
        let order: Vec<String> = registry
            .iter()
            .map(|(_, entry)| entry.sequence().to_string())
            .collect();
        assert_eq!(order, vec!["0112", "012", "02"]);
        assert_eq!(registry.generations(), 1);
    }

    #[test]
    fn test_histories_for_unknown_arrangement_is_empty() {
        let registry = CnvRegistry::new(ChunkSequence::from("012"));
        assert!(registry
            .histories_for_arrangement(&ChunkSequence::from("0112"))
            .is_empty());
    }

    #[test]
    fn test_next_id_follows_arena_length() {
        assert_eq!(next_id(0), SequenceId(0));
        assert_eq!(next_id(u32::MAX as usize).index(), u32::MAX as usize);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    #[should_panic(expected = "CNV registry is full")]
    fn test_id_exhaustion_is_not_reported_as_present() {
        next_id(u32::MAX as usize + 1);
    }
}
