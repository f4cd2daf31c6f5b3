//! Tab-separated report of a simulation run.
//!
//! Header lines start with `#`; one row follows per contributing event, in
//! provenance discovery order.

use std::fmt;
use std::io::{self, Write};

use crate::chunks::{Chunk, ChunkSequence};
use crate::matching::MatchFlags;
use crate::SimulationResult;

/// Column header of the event table.
pub const TABLE_HEADER: &str =
    "index\tresult\tgeneration\tleft\tright\tbreak\tcopy_number_profile_match\texact_match";

/// One table row: a single contributing event, resolved against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReportRow {
    /// Running index.
    pub index: usize,
    /// Child produced by the event.
    pub result: ChunkSequence,
    /// `max(left generation, right generation) + 1`.
    pub generation: usize,
    /// Left parent.
    pub left: ChunkSequence,
    /// Breakpoint in the left parent.
    pub pos1: usize,
    /// Right parent.
    pub right: ChunkSequence,
    /// Breakpoint in the right parent.
    pub pos2: usize,
    /// Chunks adjacent across the junction.
    pub junction: (Chunk, Chunk),
    /// Match against the target.
    pub matches: MatchFlags,
}

impl fmt::Display for ReportRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}|{}\t{}\t{}",
            self.index,
            self.result,
            self.generation,
            self.left.with_breakpoint(self.pos1),
            self.right.with_breakpoint(self.pos2),
            char::from(self.junction.0),
            char::from(self.junction.1),
            u8::from(self.matches.profile),
            u8::from(self.matches.exact),
        )
    }
}

/// Full report for a finished run.
#[derive(Debug)]
pub struct Report<'a> {
    result: &'a SimulationResult,
}

impl<'a> Report<'a> {
    /// Report over `result`.
    pub fn new(result: &'a SimulationResult) -> Self {
        Self { result }
    }

    /// Table rows in provenance order.
    pub fn rows(&self) -> impl Iterator<Item = ReportRow> + 'a {
        let result = self.result;
        let registry = &result.registry;
        let target = result.config.target();
        result
            .provenance
            .events()
            .iter()
            .enumerate()
            .map(move |(index, event)| {
                let child = event.generate(registry);
                let matches = MatchFlags::compare(&child, target);
                ReportRow {
                    index,
                    generation: event.generation(registry),
                    left: registry.sequence(event.left()).clone(),
                    pos1: event.pos1(),
                    right: registry.sequence(event.right()).clone(),
                    pos2: event.pos2(),
                    junction: event.junction(registry),
                    matches,
                    result: child,
                }
            })
    }

    /// Write the report to `out`.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{self}")
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = &self.result.config;
        let generations = config.generations();
        writeln!(f, "# simulate_uc_events")?;
        writeln!(f, "# Starting sequence is: {}", config.reference())?;
        writeln!(f, "# Target is: {}", config.target())?;
        writeln!(
            f,
            "# Attempting to make target in {generations} generations."
        )?;
        writeln!(
            f,
            "# After {generations} generations, a total of {} CNVs are possible.",
            self.result.registry.len()
        )?;
        writeln!(
            f,
            "# After {generations} generations, a total of {} histories match target copy number profile.",
            self.result.provenance.direct_histories()
        )?;
        writeln!(f, "{TABLE_HEADER}")?;
        for row in self.rows() {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}
