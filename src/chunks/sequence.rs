use std::fmt;
use std::sync::Arc;

use super::Profile;

/// A single chunk of the modelled chromosome.
pub type Chunk = u8;

/// Immutable, ordered list of chunks.
///
/// Cloning is cheap: the chunks live behind an `Arc`. Sequences order
/// lexicographically by chunk value, which fixes the iteration order of the
/// CNV registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkSequence(Arc<[Chunk]>);

impl ChunkSequence {
    /// Wrap the given chunks.
    pub fn new(chunks: impl Into<Arc<[Chunk]>>) -> Self {
        Self(chunks.into())
    }

    /// Contiguous ascending run of chunks from `first` to `last` inclusive.
    ///
    /// This is the reference haplotype before any recombination.
    pub fn reference_run(first: Chunk, last: Chunk) -> Self {
        Self::new((first..=last).collect::<Vec<_>>())
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the sequence holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw chunk slice.
    pub fn as_chunks(&self) -> &[Chunk] {
        &self.0
    }

    /// Chunk at `index`, if any.
    pub fn get(&self, index: usize) -> Option<Chunk> {
        self.0.get(index).copied()
    }

    /// Leftmost (flanking) chunk.
    pub fn first(&self) -> Option<Chunk> {
        self.0.first().copied()
    }

    /// Rightmost (flanking) chunk.
    pub fn last(&self) -> Option<Chunk> {
        self.0.last().copied()
    }

    /// Order-insensitive copy-number profile of this sequence.
    pub fn profile(&self) -> Profile {
        Profile::of(self)
    }

    /// `self[..pos1] ++ right[pos2..]`.
    ///
    /// Callers guarantee `pos1 <= self.len()` and `pos2 <= right.len()`.
    pub(crate) fn splice(&self, pos1: usize, right: &ChunkSequence, pos2: usize) -> ChunkSequence {
        let suffix = &right.0[pos2..];
        let mut chunks = Vec::with_capacity(pos1 + suffix.len());
        chunks.extend_from_slice(&self.0[..pos1]);
        chunks.extend_from_slice(suffix);
        ChunkSequence::new(chunks)
    }

    /// Display adaptor inserting a `|` marker before the chunk at `position`.
    pub fn with_breakpoint(&self, position: usize) -> BreakpointDisplay<'_> {
        BreakpointDisplay {
            sequence: self,
            position,
        }
    }
}

impl From<&str> for ChunkSequence {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<&[Chunk]> for ChunkSequence {
    fn from(value: &[Chunk]) -> Self {
        Self::new(value)
    }
}

impl From<Vec<Chunk>> for ChunkSequence {
    fn from(value: Vec<Chunk>) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for ChunkSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &chunk in self.0.iter() {
            write!(f, "{}", char::from(chunk))?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ChunkSequence {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Sequence rendered with a breakpoint marker, e.g. `01|2`.
#[derive(Debug, Clone, Copy)]
pub struct BreakpointDisplay<'a> {
    sequence: &'a ChunkSequence,
    position: usize,
}

impl fmt::Display for BreakpointDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &chunk) in self.sequence.as_chunks().iter().enumerate() {
            if i == self.position {
                f.write_str("|")?;
            }
            write!(f, "{}", char::from(chunk))?;
        }
        Ok(())
    }
}
