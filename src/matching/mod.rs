//! Sequence matchers used to steer recording and to query the registry.

use crate::chunks::ChunkSequence;

/// True iff `a` and `b` carry the same chunks, regardless of order.
pub fn profile_match(a: &ChunkSequence, b: &ChunkSequence) -> bool {
    a.len() == b.len() && a.profile() == b.profile()
}

/// True iff `a` and `b` are identical chunk for chunk.
pub fn arrangement_match(a: &ChunkSequence, b: &ChunkSequence) -> bool {
    a == b
}

/// Outcome of comparing a candidate against the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MatchFlags {
    /// Candidate has the target's copy-number profile.
    pub profile: bool,
    /// Candidate is the target arrangement.
    pub exact: bool,
}

impl MatchFlags {
    /// Compare `candidate` against `target`.
    pub fn compare(candidate: &ChunkSequence, target: &ChunkSequence) -> Self {
        Self {
            profile: profile_match(candidate, target),
            exact: arrangement_match(candidate, target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_match_is_order_insensitive() {
        let a = ChunkSequence::from("12");
        let b = ChunkSequence::from("21");
        assert!(profile_match(&a, &b));
        assert!(!arrangement_match(&a, &b));
    }

    #[test]
    fn test_exact_implies_profile() {
        let target = ChunkSequence::from("01215456");
        let flags = MatchFlags::compare(&target.clone(), &target);
        assert!(flags.exact && flags.profile);

        let shuffled = ChunkSequence::from("01125456");
        let flags = MatchFlags::compare(&shuffled, &target);
        assert!(flags.profile);
        assert!(!flags.exact);
    }

    #[test]
    fn test_different_lengths_never_match() {
        let a = ChunkSequence::from("012");
        let b = ChunkSequence::from("0122");
        assert!(!profile_match(&a, &b));
    }
}
