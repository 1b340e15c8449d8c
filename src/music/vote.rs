//! Majority vote over a fixed set of listeners, used by `/clearqueue`.

use std::collections::HashSet;

#[derive(Debug)]
pub struct VoteTally {
    eligible: HashSet<u64>,
    yes: HashSet<u64>,
    no: HashSet<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ballot {
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastResult {
    /// Vote registered; `passed` is true once the yes side reaches majority.
    Registered { passed: bool },
    /// The same ballot was pressed again and has been withdrawn.
    Withdrawn,
    NotEligible,
}

impl VoteTally {
    pub fn new(eligible: impl IntoIterator<Item = u64>) -> Self {
        Self {
            eligible: eligible.into_iter().collect(),
            yes: HashSet::new(),
            no: HashSet::new(),
        }
    }

    /// Simple majority of the eligible voters.
    pub fn required(&self) -> usize {
        self.eligible.len() / 2 + 1
    }

    pub fn eligible_count(&self) -> usize {
        self.eligible.len()
    }

    pub fn yes_count(&self) -> usize {
        self.yes.len()
    }

    pub fn no_count(&self) -> usize {
        self.no.len()
    }

    pub fn passed(&self) -> bool {
        self.yes.len() >= self.required()
    }

    /// Casting the same ballot twice withdraws it; casting the opposite
    /// ballot supplants the previous one.
    pub fn cast(&mut self, user: u64, ballot: Ballot) -> CastResult {
        if !self.eligible.contains(&user) {
            return CastResult::NotEligible;
        }
        let (own, other) = match ballot {
            Ballot::Yes => (&mut self.yes, &mut self.no),
            Ballot::No => (&mut self.no, &mut self.yes),
        };
        if own.contains(&user) {
            own.remove(&user);
            return CastResult::Withdrawn;
        }
        other.remove(&user);
        own.insert(user);
        CastResult::Registered {
            passed: self.passed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn majority_threshold() {
        assert_eq!(VoteTally::new([1]).required(), 1);
        assert_eq!(VoteTally::new([1, 2]).required(), 2);
        assert_eq!(VoteTally::new([1, 2, 3]).required(), 2);
        assert_eq!(VoteTally::new([1, 2, 3, 4]).required(), 3);
    }

    #[test]
    fn passes_at_majority() {
        let mut tally = VoteTally::new([1, 2, 3]);
        assert_eq!(tally.cast(1, Ballot::Yes), CastResult::Registered { passed: false });
        assert_eq!(tally.cast(2, Ballot::Yes), CastResult::Registered { passed: true });
        assert!(tally.passed());
    }

    #[test]
    fn repeated_ballot_withdraws() {
        let mut tally = VoteTally::new([1, 2, 3]);
        tally.cast(1, Ballot::Yes);
        assert_eq!(tally.cast(1, Ballot::Yes), CastResult::Withdrawn);
        assert_eq!(tally.yes_count(), 0);
    }

    #[test]
    fn opposite_ballot_supplants() {
        let mut tally = VoteTally::new([1, 2, 3]);
        tally.cast(1, Ballot::Yes);
        assert_eq!(tally.cast(1, Ballot::No), CastResult::Registered { passed: false });
        assert_eq!(tally.yes_count(), 0);
        assert_eq!(tally.no_count(), 1);
    }

    #[test]
    fn outsiders_cannot_vote() {
        let mut tally = VoteTally::new([1, 2]);
        assert_eq!(tally.cast(99, Ballot::Yes), CastResult::NotEligible);
        assert_eq!(tally.yes_count(), 0);
    }
}
