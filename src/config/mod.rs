//! Run configuration and target validation.
//!
//! The target names the flanks: its first and last chunks bound the alphabet
//! run that forms the reference haplotype. Validation happens once, up front;
//! nothing downstream can fail on a configuration built here.

use thiserror::Error;
use tracing::warn;

use crate::chunks::{Chunk, ChunkSequence, Profile};
use crate::engine::PolicyKind;

/// Upper bound on generations. Registry size grows combinatorially per round.
pub const MAX_GENERATIONS: usize = 3;

/// Configuration and target validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// More generations than the engine is allowed to run.
    #[error("{requested} generations requested; more than {max} may exhaust memory")]
    TooManyGenerations {
        /// Requested generation count.
        requested: usize,
        /// Allowed maximum.
        max: usize,
    },

    /// Target has fewer than two chunks.
    #[error("target should have at least 2 elements (got {len})")]
    TargetTooShort {
        /// Length of the supplied target.
        len: usize,
    },

    /// First chunk not strictly below last chunk.
    #[error(
        "target first chunk '{}' should be less than last chunk '{}' (suggest using 0....n)",
        char::from(*first),
        char::from(*last)
    )]
    FlanksOutOfOrder {
        /// Leftmost chunk.
        first: Chunk,
        /// Rightmost chunk.
        last: Chunk,
    },

    /// Target contains a non-ASCII character.
    #[error("target should contain only ASCII chunk symbols")]
    NonAsciiTarget,
}

/// Validated configuration for one simulation run.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    target: ChunkSequence,
    target_profile: Profile,
    reference: ChunkSequence,
    generations: usize,
    policy: PolicyKind,
    threads: Option<usize>,
}

impl SimulationConfig {
    /// Validate `target` and `generations` and derive the reference haplotype.
    ///
    /// A target containing chunks outside its flank range is accepted with a
    /// warning.
    pub fn new(target: &str, generations: usize) -> Result<Self, ConfigError> {
        if generations > MAX_GENERATIONS {
            return Err(ConfigError::TooManyGenerations {
                requested: generations,
                max: MAX_GENERATIONS,
            });
        }
        if !target.is_ascii() {
            return Err(ConfigError::NonAsciiTarget);
        }
        let target = ChunkSequence::from(target);
        let (first, last) = match (target.first(), target.last()) {
            (Some(first), Some(last)) if target.len() >= 2 => (first, last),
            _ => return Err(ConfigError::TargetTooShort { len: target.len() }),
        };
        if first >= last {
            return Err(ConfigError::FlanksOutOfOrder { first, last });
        }

        let target_profile = target.profile();
        let config = Self {
            reference: ChunkSequence::reference_run(first, last),
            target,
            target_profile,
            generations,
            policy: PolicyKind::default(),
            threads: None,
        };
        if config.has_chunks_outside_flanks() {
            warn!(
                "target {} should contain only characters between the first and last (suggest using 0....n)",
                config.target
            );
        }
        Ok(config)
    }

    /// Use a different recording policy.
    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    /// Breed on a dedicated pool of `threads` workers.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Target arrangement.
    pub fn target(&self) -> &ChunkSequence {
        &self.target
    }

    /// Target copy-number profile.
    pub fn target_profile(&self) -> &Profile {
        &self.target_profile
    }

    /// Reference haplotype: every chunk from the first flank to the last.
    pub fn reference(&self) -> &ChunkSequence {
        &self.reference
    }

    /// Number of generations to breed.
    pub fn generations(&self) -> usize {
        self.generations
    }

    /// Recording policy.
    pub fn policy(&self) -> PolicyKind {
        self.policy
    }

    /// Worker threads, if pinned.
    pub fn threads(&self) -> Option<usize> {
        self.threads
    }

    /// Whether the target uses chunks that sort outside its own flanks.
    pub fn has_chunks_outside_flanks(&self) -> bool {
        let profile = self.target_profile.as_sequence();
        profile.first() != self.target.first() || profile.last() != self.target.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_is_flank_run() {
        let config = SimulationConfig::new("01215456", 2).unwrap();
        assert_eq!(config.reference().to_string(), "0123456");
        assert_eq!(config.target_profile().to_string(), "01124556");
        assert!(!config.has_chunks_outside_flanks());
        assert_eq!(config.policy(), PolicyKind::TargetOrFrontier);
    }

    #[test]
    fn test_rejects_too_many_generations() {
        assert_eq!(
            SimulationConfig::new("0123", 4).unwrap_err(),
            ConfigError::TooManyGenerations {
                requested: 4,
                max: MAX_GENERATIONS
            }
        );
    }

    #[test]
    fn test_rejects_bad_targets() {
        assert_eq!(
            SimulationConfig::new("0", 1).unwrap_err(),
            ConfigError::TargetTooShort { len: 1 }
        );
        assert_eq!(
            SimulationConfig::new("", 1).unwrap_err(),
            ConfigError::TargetTooShort { len: 0 }
        );
        assert_eq!(
            SimulationConfig::new("30", 1).unwrap_err(),
            ConfigError::FlanksOutOfOrder {
                first: b'3',
                last: b'0'
            }
        );
        assert!(SimulationConfig::new("11", 1).is_err());
    }

    #[test]
    fn test_out_of_range_chunks_only_warn() {
        let config = SimulationConfig::new("1923", 1).unwrap();
        assert!(config.has_chunks_outside_flanks());
        assert_eq!(config.reference().to_string(), "123");
    }
}
