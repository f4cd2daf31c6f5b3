//! # Unequal-crossover event simulation
//!
//! Enumerates every chunk arrangement reachable from a reference haplotype by
//! a bounded number of generations of unequal crossover (UC), and reconstructs
//! every chain of events that could produce a target copy-number profile.
//!
//! ## Core Algorithm
//!
//! 1. **Generation engine**: breed every ordered pair of known sequences at
//!    every interior breakpoint pair; merge new children insert-if-absent
//! 2. **Recording policy**: keep only the events needed to explain the target
//!    (bounds memory, not just the number of distinct sequences)
//! 3. **Provenance walk**: worklist traversal from the target profile back to
//!    the reference through recorded parent sequences
//!
//! Cost per generation: O(S² · L²) for S sequences of length ≤ L, hence the
//! hard cap of three generations.
//!
//! ## Usage Example
//!
//! ```no_run
//! use uc_events::{Report, SimulationConfig, Simulator};
//!
//! let config = SimulationConfig::new("01215456", 2)?;
//! let result = Simulator::new(config)?.run();
//! print!("{}", Report::new(&result));
//! # Ok::<(), uc_events::SimulationError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

// Core modules
pub mod chunks;        // Chunk sequences and profiles
pub mod recombination; // UC events
pub mod registry;      // CNV registry arena
pub mod engine;        // Generation engine and recording policies
pub mod matching;      // Profile / arrangement matchers
pub mod provenance;    // Backward provenance walk
pub mod config;        // Validated run configuration
pub mod report;        // Tab-separated report

// Re-exports for convenience
pub use chunks::{Chunk, ChunkSequence, Profile};
pub use config::{ConfigError, SimulationConfig, MAX_GENERATIONS};
pub use engine::{GenerationEngine, GenerationSummary, PolicyKind, RecordingPolicy};
pub use matching::{arrangement_match, profile_match};
pub use provenance::{reconstruct, Provenance};
pub use recombination::{RecombinationError, RecombinationEvent};
pub use registry::{CnvEntry, CnvRegistry, SequenceId};
pub use report::{Report, ReportRow};

use thiserror::Error;
use tracing::info;

/// Errors that can occur while setting up or running a simulation
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Target or generation count rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Event construction rejected a breakpoint
    #[error(transparent)]
    Recombination(#[from] RecombinationError),

    /// Worker pool could not be started
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Main simulation orchestrator
///
/// Owns a validated configuration and the engine that breeds it.
#[derive(Debug)]
pub struct Simulator {
    config: SimulationConfig,
    engine: GenerationEngine,
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Configuration the run used
    pub config: SimulationConfig,

    /// Every distinct sequence discovered
    pub registry: CnvRegistry,

    /// Events contributing to the target profile
    pub provenance: Provenance,

    /// Per-generation statistics
    pub generations: Vec<GenerationSummary>,
}

impl SimulationResult {
    /// Number of distinct sequences (CNVs) discovered.
    pub fn cnv_count(&self) -> usize {
        self.registry.len()
    }

    /// Whether the exact target arrangement was reached.
    pub fn reached_target(&self) -> bool {
        self.registry.contains(self.config.target())
    }

    /// Report view over this result.
    pub fn report(&self) -> Report<'_> {
        Report::new(self)
    }
}

impl Simulator {
    /// Create a simulator; starts a dedicated worker pool if the
    /// configuration pins a thread count.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        let engine = match config.threads() {
            Some(threads) => GenerationEngine::with_threads(threads)?,
            None => GenerationEngine::new(),
        };
        Ok(Self { config, engine })
    }

    /// Create a simulator around an existing engine.
    pub fn with_engine(config: SimulationConfig, engine: GenerationEngine) -> Self {
        Self { config, engine }
    }

    /// Configuration in use.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run the simulation
    ///
    /// 1. Seed the registry with the reference haplotype
    /// 2. Breed the configured number of generations
    /// 3. Reconstruct provenance for the target profile
    pub fn run(&self) -> SimulationResult {
        let config = &self.config;
        let policy = config
            .policy()
            .build(config.target_profile().clone(), config.generations());
        info!(
            "Breeding {} generations from {} towards {} (recording: {})",
            config.generations(),
            config.reference(),
            config.target(),
            config.policy()
        );

        let mut registry = CnvRegistry::new(config.reference().clone());
        let generations = self
            .engine
            .run(&mut registry, config.generations(), &*policy);
        let provenance = reconstruct(&registry, config.target_profile());

        SimulationResult {
            config: config.clone(),
            registry,
            provenance,
            generations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_generations() {
        let config = SimulationConfig::new("0123", 0).unwrap();
        let result = Simulator::with_engine(config, GenerationEngine::sequential()).run();
        assert_eq!(result.cnv_count(), 1);
        assert!(result.provenance.is_empty());
        assert!(result.generations.is_empty());
    }

    #[test]
    fn test_reached_target() {
        let config = SimulationConfig::new("0112", 1).unwrap();
        let result = Simulator::with_engine(config, GenerationEngine::sequential()).run();
        assert!(result.reached_target());
        assert_eq!(result.generations.len(), 1);
        assert_eq!(result.generations[0].total_sequences, 3);
    }
}
