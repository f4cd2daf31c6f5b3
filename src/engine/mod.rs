//! Generation engine: breeds every pairwise recombinant of the registry.
//!
//! One generation visits every ordered pair `(left, right)` of known sequences
//! (including `left == right`) at every interior breakpoint pair. Cost is
//! `O(S² · L²)` for `S` sequences of length at most `L`, which is why runs are
//! capped at [`MAX_GENERATIONS`](crate::config::MAX_GENERATIONS).
//!
//! Children are collected in a batch computed against the registry as it stood
//! at the start of the generation, and merged only once the generation
//! completes. Sequences found during generation `g` are therefore never bred
//! within `g`.

mod policy;

pub use policy::{
    target_or_frontier, EarliestGeneration, Either, IsFrontierAndNotFinal, MatchesTargetProfile,
    PolicyKind, RecordEverything, RecordingPolicy,
};

use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use tracing::{debug, info};

use crate::chunks::ChunkSequence;
use crate::recombination::{recombine, RecombinationEvent};
use crate::registry::{CnvRegistry, SequenceId};

/// Batch sizes at which a progress line is logged.
const PROGRESS_INTERVAL: usize = 1_000_000;

/// Left sequences bred per worker before their partial batches are absorbed.
const LEFTS_PER_WORKER: usize = 2;

/// A child sequence's slot in the per-generation batch.
#[derive(Debug, Clone)]
struct BatchEntry {
    first_generation: usize,
    events: Vec<RecombinationEvent>,
}

/// Children discovered in one generation, keyed by sequence.
#[derive(Debug, Default)]
struct Batch {
    entries: BTreeMap<ChunkSequence, BatchEntry>,
}

impl Batch {
    /// Append `other`, keeping this batch's events first for shared children.
    fn absorb(&mut self, other: Batch) {
        for (sequence, entry) in other.entries {
            match self.entries.get_mut(&sequence) {
                Some(existing) => existing.events.extend(entry.events),
                None => {
                    self.entries.insert(sequence, entry);
                }
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn event_count(&self) -> usize {
        self.entries.values().map(|entry| entry.events.len()).sum()
    }

    fn into_merge_items(
        self,
    ) -> impl Iterator<Item = (ChunkSequence, usize, Vec<RecombinationEvent>)> {
        self.entries
            .into_iter()
            .map(|(sequence, entry)| (sequence, entry.first_generation, entry.events))
    }
}

/// Logs a line each time the batch crosses another multiple of the interval.
struct Progress {
    lefts: usize,
    interval: usize,
    next_report: usize,
}

impl Progress {
    fn new(lefts: usize, interval: usize) -> Self {
        let interval = interval.max(1);
        Self {
            lefts,
            interval,
            next_report: interval,
        }
    }

    fn update(&mut self, lefts_done: usize, children: usize) {
        if children >= self.next_report {
            info!(
                "Looked at {lefts_done} of {} CNVs on left ({children} CNVs and counting...)",
                self.lefts
            );
            self.next_report = (children / self.interval + 1) * self.interval;
        }
    }
}

/// What one call to [`GenerationEngine::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Generation number (1-based).
    pub generation: usize,
    /// Distinct children produced, including ones already known.
    pub distinct_children: usize,
    /// Events retained in the batch by the recording policy.
    pub recorded_events: usize,
    /// Sequences added to the registry.
    pub new_sequences: usize,
    /// Registry size after the merge.
    pub total_sequences: usize,
}

/// Drives generations over a [`CnvRegistry`].
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    pool: Option<Arc<ThreadPool>>,
    sequential: bool,
    progress_interval: usize,
}

impl Default for GenerationEngine {
    fn default() -> Self {
        Self {
            pool: None,
            sequential: false,
            progress_interval: PROGRESS_INTERVAL,
        }
    }
}

impl GenerationEngine {
    /// Engine breeding on rayon's global pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that breeds on the calling thread only.
    pub fn sequential() -> Self {
        Self {
            sequential: true,
            ..Self::default()
        }
    }

    /// Engine with a dedicated pool of `threads` workers. One thread means
    /// sequential breeding.
    pub fn with_threads(threads: usize) -> Result<Self, ThreadPoolBuildError> {
        if threads <= 1 {
            return Ok(Self::sequential());
        }
        let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;
        Ok(Self {
            pool: Some(Arc::new(pool)),
            ..Self::default()
        })
    }

    /// Log progress every `interval` distinct children instead of every
    /// million.
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Run `generations` further generations.
    pub fn run<P>(
        &self,
        registry: &mut CnvRegistry,
        generations: usize,
        policy: &P,
    ) -> Vec<GenerationSummary>
    where
        P: RecordingPolicy + ?Sized,
    {
        (0..generations)
            .map(|_| self.advance(registry, policy))
            .collect()
    }

    /// Breed one generation and merge it into `registry`.
    pub fn advance<P>(&self, registry: &mut CnvRegistry, policy: &P) -> GenerationSummary
    where
        P: RecordingPolicy + ?Sized,
    {
        let generation = registry.generations() + 1;
        info!("Computing CNVs in generation {generation}...");

        let snapshot: Vec<SequenceId> = registry.ids().collect();
        let mut progress = Progress::new(snapshot.len(), self.progress_interval);
        let batch = if self.sequential {
            breed_sequential(registry, &snapshot, generation, policy, &mut progress)
        } else {
            self.breed_parallel(registry, &snapshot, generation, policy, &mut progress)
        };

        let distinct_children = batch.len();
        let recorded_events = batch.event_count();
        let new_sequences = registry.merge_generation(generation, batch.into_merge_items());
        info!(
            "After generation {generation}: {} haplotypes.",
            registry.len()
        );

        GenerationSummary {
            generation,
            distinct_children,
            recorded_events,
            new_sequences,
            total_sequences: registry.len(),
        }
    }

    /// Breed the snapshot in left-ordered chunks, one partial batch per left
    /// sequence, absorbing each chunk on the calling thread before the next
    /// one starts.
    fn breed_parallel<P>(
        &self,
        registry: &CnvRegistry,
        snapshot: &[SequenceId],
        generation: usize,
        policy: &P,
        progress: &mut Progress,
    ) -> Batch
    where
        P: RecordingPolicy + ?Sized,
    {
        let workers = match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        };
        let chunk_len = workers.max(1) * LEFTS_PER_WORKER;

        let breed = |&left: &SequenceId| {
            let mut partial = Batch::default();
            breed_left(&mut partial, registry, left, snapshot, generation, policy);
            partial
        };

        let mut batch = Batch::default();
        let mut lefts_done = 0;
        for lefts in snapshot.chunks(chunk_len) {
            let partials: Vec<Batch> = match &self.pool {
                Some(pool) => pool.install(|| lefts.par_iter().map(breed).collect()),
                None => lefts.par_iter().map(breed).collect(),
            };
            for partial in partials {
                batch.absorb(partial);
                lefts_done += 1;
                progress.update(lefts_done, batch.len());
            }
        }
        batch
    }
}

/// Breed every left sequence straight into one batch on the calling thread.
fn breed_sequential<P>(
    registry: &CnvRegistry,
    snapshot: &[SequenceId],
    generation: usize,
    policy: &P,
    progress: &mut Progress,
) -> Batch
where
    P: RecordingPolicy + ?Sized,
{
    let mut batch = Batch::default();
    for (done, &left) in snapshot.iter().enumerate() {
        breed_left(&mut batch, registry, left, snapshot, generation, policy);
        progress.update(done + 1, batch.len());
    }
    batch
}

/// Add every recombinant with `left` as prefix donor to `batch`.
fn breed_left<P>(
    batch: &mut Batch,
    registry: &CnvRegistry,
    left: SequenceId,
    rights: &[SequenceId],
    generation: usize,
    policy: &P,
) where
    P: RecordingPolicy + ?Sized,
{
    let left_sequence = registry.sequence(left);
    let mut bred = 0usize;

    for &right in rights {
        let right_sequence = registry.sequence(right);
        for pos1 in 1..left_sequence.len() {
            for pos2 in 1..right_sequence.len() {
                let event = RecombinationEvent::new_unchecked(left, pos1, right, pos2);
                let child = recombine(left_sequence, pos1, right_sequence, pos2);
                let entry = batch
                    .entries
                    .entry(child.clone())
                    .or_insert_with(|| BatchEntry {
                        first_generation: generation,
                        events: Vec::new(),
                    });
                if policy.should_record(generation, &child, entry.first_generation) {
                    entry.events.push(event);
                }
                bred += 1;
            }
        }
    }

    debug!("Bred {bred} recombinants from {left_sequence} in generation {generation}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::sync::Mutex;
    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Collects the message of every event emitted on the current thread.
    #[derive(Clone, Default)]
    struct Messages(Arc<Mutex<Vec<String>>>);

    struct MessageField(String);

    impl Visit for MessageField {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    impl<S: Subscriber> Layer<S> for Messages {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut message = MessageField(String::new());
            event.record(&mut message);
            self.0.lock().unwrap().push(message.0);
        }
    }

    impl Messages {
        fn capture(&self, f: impl FnOnce()) -> Vec<String> {
            let subscriber = tracing_subscriber::registry().with(self.clone());
            tracing::subscriber::with_default(subscriber, f);
            self.0.lock().unwrap().clone()
        }
    }

    fn rendered(registry: &CnvRegistry) -> Vec<(String, usize, usize)> {
        registry
            .iter()
            .map(|(_, entry)| {
                (
                    entry.sequence().to_string(),
                    entry.first_generation(),
                    entry.events().len(),
                )
            })
            .collect()
    }

    #[test]
    fn test_single_generation_from_three_chunks() {
        let mut registry = CnvRegistry::new(ChunkSequence::from("012"));
        let summary = GenerationEngine::sequential().advance(&mut registry, &RecordEverything);

        assert_eq!(summary.generation, 1);
        assert_eq!(summary.distinct_children, 3);
        assert_eq!(summary.recorded_events, 4);
        assert_eq!(summary.new_sequences, 2);
        assert_eq!(
            rendered(&registry),
            vec![
                ("0112".to_string(), 1, 1),
                ("012".to_string(), 0, 0),
                ("02".to_string(), 1, 1),
            ]
        );
    }

    #[test]
    fn test_children_are_not_bred_within_their_generation() {
        let mut registry = CnvRegistry::new(ChunkSequence::from("012"));
        let engine = GenerationEngine::sequential();
        engine.advance(&mut registry, &RecordEverything);
        assert!(!registry.contains(&ChunkSequence::from("01112")));

        engine.advance(&mut registry, &RecordEverything);
        let id = registry.id_of(&ChunkSequence::from("01112")).unwrap();
        assert_eq!(registry.first_generation(id), 2);
        assert_eq!(registry.generations(), 2);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let reference = ChunkSequence::from("0123");
        let policy = target_or_frontier(ChunkSequence::from("01123").profile(), 2);

        let mut sequential = CnvRegistry::new(reference.clone());
        GenerationEngine::sequential().run(&mut sequential, 2, &policy);

        let mut parallel = CnvRegistry::new(reference);
        GenerationEngine::with_threads(4)
            .unwrap()
            .run(&mut parallel, 2, &policy);

        assert_eq!(rendered(&sequential), rendered(&parallel));
        for ((_, a), (_, b)) in sequential.iter().zip(parallel.iter()) {
            assert_eq!(a.events(), b.events());
        }
    }

    #[test]
    fn test_final_generation_keeps_only_target_histories() {
        let mut registry = CnvRegistry::new(ChunkSequence::from("012"));
        let policy = target_or_frontier(ChunkSequence::from("0112").profile(), 1);
        GenerationEngine::sequential().advance(&mut registry, &policy);

        let target = registry.id_of(&ChunkSequence::from("0112")).unwrap();
        let deletion = registry.id_of(&ChunkSequence::from("02")).unwrap();
        assert_eq!(registry.events(target).len(), 1);
        assert!(registry.events(deletion).is_empty());
    }

    #[test]
    fn test_parallel_chunks_match_sequential() {
        // Seven sequences after generation 1, so two threads breed three chunks.
        let reference = ChunkSequence::from("0123");

        let mut sequential = CnvRegistry::new(reference.clone());
        GenerationEngine::sequential().run(&mut sequential, 2, &RecordEverything);

        let mut parallel = CnvRegistry::new(reference);
        let summaries = GenerationEngine::with_threads(2)
            .unwrap()
            .run(&mut parallel, 2, &RecordEverything);

        assert_eq!(summaries[0].total_sequences, 7);
        assert_eq!(rendered(&sequential), rendered(&parallel));
        for ((_, a), (_, b)) in sequential.iter().zip(parallel.iter()) {
            assert_eq!(a.events(), b.events());
        }
    }

    #[test]
    fn test_progress_is_logged_between_left_sequences() {
        let mut registry = CnvRegistry::new(ChunkSequence::from("012"));
        let engine = GenerationEngine::sequential().with_progress_interval(1);
        engine.advance(&mut registry, &RecordEverything);

        let messages = Messages::default().capture(|| {
            engine.advance(&mut registry, &RecordEverything);
        });

        let first_progress = messages
            .iter()
            .position(|m| m.starts_with("Looked at 1 of 3 CNVs on left"))
            .unwrap();
        let last_bred = messages
            .iter()
            .rposition(|m| m.starts_with("Bred "))
            .unwrap();
        assert!(first_progress < last_bred, "{messages:#?}");
    }

    #[test]
    fn test_parallel_progress_reports_each_chunk() {
        let mut registry = CnvRegistry::new(ChunkSequence::from("0123"));
        let engine = GenerationEngine::with_threads(2)
            .unwrap()
            .with_progress_interval(1);
        engine.advance(&mut registry, &RecordEverything);

        let messages = Messages::default().capture(|| {
            engine.advance(&mut registry, &RecordEverything);
        });

        let lefts_done: Vec<usize> = messages
            .iter()
            .filter_map(|m| m.strip_prefix("Looked at "))
            .filter_map(|rest| rest.split(' ').next())
            .map(|n| n.parse().unwrap())
            .collect();
        assert_eq!(lefts_done.first(), Some(&1));
        assert!(lefts_done.windows(2).all(|w| w[0] < w[1]));
    }
}
