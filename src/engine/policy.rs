use std::fmt;

use clap::ValueEnum;

use crate::chunks::{ChunkSequence, Profile};

/// Decides whether an event producing `candidate` is kept in the batch.
///
/// `candidate_first_generation` is the generation the candidate's batch entry
/// was created in. Recording fewer events bounds memory at the cost of
/// provenance completeness.
pub trait RecordingPolicy: Send + Sync {
    /// Whether to append the event to the candidate's event list.
    fn should_record(
        &self,
        generation: usize,
        candidate: &ChunkSequence,
        candidate_first_generation: usize,
    ) -> bool;

    /// Record whenever either policy would.
    fn or<Q>(self, other: Q) -> Either<Self, Q>
    where
        Self: Sized,
        Q: RecordingPolicy,
    {
        Either(self, other)
    }
}

impl<F> RecordingPolicy for F
where
    F: Fn(usize, &ChunkSequence, usize) -> bool + Send + Sync,
{
    fn should_record(
        &self,
        generation: usize,
        candidate: &ChunkSequence,
        candidate_first_generation: usize,
    ) -> bool {
        self(generation, candidate, candidate_first_generation)
    }
}

/// Keep every event. Only feasible for tiny state spaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordEverything;

impl RecordingPolicy for RecordEverything {
    fn should_record(&self, _: usize, _: &ChunkSequence, _: usize) -> bool {
        true
    }
}

/// Keep events only in the generation a sequence first appears.
#[derive(Debug, Clone, Copy, Default)]
pub struct EarliestGeneration;

impl RecordingPolicy for EarliestGeneration {
    fn should_record(&self, generation: usize, _: &ChunkSequence, first: usize) -> bool {
        generation == first
    }
}

/// Keep every event whose child has the target copy-number profile.
#[derive(Debug, Clone)]
pub struct MatchesTargetProfile {
    profile: Profile,
}

impl MatchesTargetProfile {
    /// Policy for the given target profile.
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }
}

impl RecordingPolicy for MatchesTargetProfile {
    fn should_record(&self, _: usize, candidate: &ChunkSequence, _: usize) -> bool {
        self.profile.matches(candidate)
    }
}

/// Keep events for sequences new in this generation, except in the final
/// generation, whose sequences are never bred again.
#[derive(Debug, Clone, Copy)]
pub struct IsFrontierAndNotFinal {
    total_generations: usize,
}

impl IsFrontierAndNotFinal {
    /// Policy for a run of `total_generations`.
    pub fn new(total_generations: usize) -> Self {
        Self { total_generations }
    }
}

impl RecordingPolicy for IsFrontierAndNotFinal {
    fn should_record(&self, generation: usize, _: &ChunkSequence, first: usize) -> bool {
        generation == first && generation < self.total_generations
    }
}

/// Logical OR of two policies.
#[derive(Debug, Clone)]
pub struct Either<A, B>(pub A, pub B);

impl<A: RecordingPolicy, B: RecordingPolicy> RecordingPolicy for Either<A, B> {
    fn should_record(&self, generation: usize, candidate: &ChunkSequence, first: usize) -> bool {
        self.0.should_record(generation, candidate, first)
            || self.1.should_record(generation, candidate, first)
    }
}

/// Production policy: every route to the target profile plus just enough
/// frontier history to keep breeding towards it.
pub fn target_or_frontier(
    profile: Profile,
    total_generations: usize,
) -> Either<MatchesTargetProfile, IsFrontierAndNotFinal> {
    MatchesTargetProfile::new(profile).or(IsFrontierAndNotFinal::new(total_generations))
}

/// Named recording policies selectable from configuration and the command
/// line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PolicyKind {
    /// Histories of the target profile plus the breeding frontier.
    #[default]
    TargetOrFrontier,
    /// Only histories of the target profile.
    TargetOnly,
    /// Every sequence's events from its first generation.
    Earliest,
    /// Every event (small targets only).
    Everything,
}

impl PolicyKind {
    /// Instantiate the policy for a target profile and run length.
    pub fn build(self, profile: Profile, total_generations: usize) -> Box<dyn RecordingPolicy> {
        match self {
            PolicyKind::TargetOrFrontier => Box::new(target_or_frontier(profile, total_generations)),
            PolicyKind::TargetOnly => Box::new(MatchesTargetProfile::new(profile)),
            PolicyKind::Earliest => Box::new(EarliestGeneration),
            PolicyKind::Everything => Box::new(RecordEverything),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => Ok(()),
        }
    }
}
