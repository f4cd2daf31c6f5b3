//! Chunk sequences and copy-number profiles.
//!
//! A chromosome is modelled as an ordered list of chunks. Each chunk is one
//! byte drawn from a small ordered alphabet (typically `'0'..='9'`), and the
//! reference haplotype is the contiguous run of chunks between two flanks:
//!
//! ```text
//! reference  0 1 2 3 4 5 6
//! DUP4       0 1 2 1 5 4 5 4 5 6
//! ```
//!
//! The flanking chunks (first and last) are never consumed by a breakpoint.

mod profile;
mod sequence;

pub use profile::Profile;
pub use sequence::{BreakpointDisplay, Chunk, ChunkSequence};
