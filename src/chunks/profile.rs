use std::fmt;

use super::ChunkSequence;

/// Copy-number profile: the chunks of a sequence in sorted order.
///
/// Two sequences share a profile when they carry the same number of copies of
/// every chunk, regardless of arrangement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Profile(ChunkSequence);

impl Profile {
    /// Profile of the given sequence.
    pub fn of(sequence: &ChunkSequence) -> Self {
        let mut chunks = sequence.as_chunks().to_vec();
        chunks.sort_unstable();
        Self(ChunkSequence::new(chunks))
    }

    /// Whether `sequence` has exactly this copy-number profile.
    pub fn matches(&self, sequence: &ChunkSequence) -> bool {
        sequence.len() == self.0.len() && Profile::of(sequence) == *self
    }

    /// Sorted chunks as a sequence.
    pub fn as_sequence(&self) -> &ChunkSequence {
        &self.0
    }

    /// Number of copies of `chunk` in the profile.
    pub fn copies(&self, chunk: u8) -> usize {
        self.0.as_chunks().iter().filter(|&&c| c == chunk).count()
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
