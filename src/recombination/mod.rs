//! Unequal-crossover events.
//!
//! An event copies the left parent up to (but excluding) `pos1` and then the
//! right parent from `pos2` onwards:
//!
//! ```text
//! left   0 1 | 2        pos1 = 2
//! right  0 | 1 2        pos2 = 1
//! child  0 1 1 2
//! ```
//!
//! Parents are referenced by [`SequenceId`], never copied, so an event stays
//! valid for the whole lifetime of the registry that issued the ids.

use std::fmt;

use thiserror::Error;

use crate::chunks::{Chunk, ChunkSequence};
use crate::registry::{CnvRegistry, SequenceId};

/// Which parent a breakpoint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Prefix donor.
    Left,
    /// Suffix donor.
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// Errors raised when constructing a recombination event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecombinationError {
    /// Breakpoint would consume a flanking chunk or fall outside the parent.
    #[error("{side} breakpoint {position} outside interior range 1..{len}")]
    InvalidBreakpoint {
        /// Parent the breakpoint applies to.
        side: Side,
        /// Requested breakpoint.
        position: usize,
        /// Length of that parent.
        len: usize,
    },
}

/// A parent sequence as seen by an event: its registry handle and chunks.
#[derive(Debug, Clone, Copy)]
pub struct Parent<'a> {
    /// Registry handle.
    pub id: SequenceId,
    /// The parent's chunks.
    pub sequence: &'a ChunkSequence,
}

impl<'a> Parent<'a> {
    /// Pair a handle with its chunks.
    pub fn new(id: SequenceId, sequence: &'a ChunkSequence) -> Self {
        Self { id, sequence }
    }
}

/// One crossover between two registry sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecombinationEvent {
    left: SequenceId,
    pos1: usize,
    right: SequenceId,
    pos2: usize,
}

impl RecombinationEvent {
    /// Build an event, enforcing `0 < pos1 < len(left)` and
    /// `0 < pos2 < len(right)`.
    pub fn new(
        left: Parent<'_>,
        pos1: usize,
        right: Parent<'_>,
        pos2: usize,
    ) -> Result<Self, RecombinationError> {
        check_interior(Side::Left, pos1, left.sequence.len())?;
        check_interior(Side::Right, pos2, right.sequence.len())?;
        Ok(Self::new_unchecked(left.id, pos1, right.id, pos2))
    }

    /// Build an event whose breakpoints the caller has already bounded.
    pub(crate) fn new_unchecked(
        left: SequenceId,
        pos1: usize,
        right: SequenceId,
        pos2: usize,
    ) -> Self {
        debug_assert!(pos1 > 0 && pos2 > 0);
        Self {
            left,
            pos1,
            right,
            pos2,
        }
    }

    /// Left parent handle.
    pub fn left(&self) -> SequenceId {
        self.left
    }

    /// Right parent handle.
    pub fn right(&self) -> SequenceId {
        self.right
    }

    /// Breakpoint in the left parent.
    pub fn pos1(&self) -> usize {
        self.pos1
    }

    /// Breakpoint in the right parent.
    pub fn pos2(&self) -> usize {
        self.pos2
    }

    /// Both parent handles, left first.
    pub fn parents(&self) -> [SequenceId; 2] {
        [self.left, self.right]
    }

    /// The recombinant sequence this event produces.
    pub fn generate(&self, registry: &CnvRegistry) -> ChunkSequence {
        recombine(
            registry.sequence(self.left),
            self.pos1,
            registry.sequence(self.right),
            self.pos2,
        )
    }

    /// Generation at which this event can first happen:
    /// `max(left generation, right generation) + 1`.
    pub fn generation(&self, registry: &CnvRegistry) -> usize {
        registry
            .first_generation(self.left)
            .max(registry.first_generation(self.right))
            + 1
    }

    /// The two chunks that end up adjacent across the junction:
    /// `left[pos1 - 1]` and `right[pos2]`.
    pub fn junction(&self, registry: &CnvRegistry) -> (Chunk, Chunk) {
        let left = registry.sequence(self.left).as_chunks();
        let right = registry.sequence(self.right).as_chunks();
        (left[self.pos1 - 1], right[self.pos2])
    }
}

/// `left[..pos1] ++ right[pos2..]`.
///
/// The child length is always `pos1 + (len(right) - pos2)`.
pub fn recombine(
    left: &ChunkSequence,
    pos1: usize,
    right: &ChunkSequence,
    pos2: usize,
) -> ChunkSequence {
    left.splice(pos1, right, pos2)
}

fn check_interior(side: Side, position: usize, len: usize) -> Result<(), RecombinationError> {
    if position == 0 || position >= len {
        return Err(RecombinationError::InvalidBreakpoint {
            side,
            position,
            len,
        });
    }
    Ok(())
}
