//! Fork choice: longest valid chain wins.
//!
//! A candidate replaces the local chain only when it is valid and strictly
//! longer. Ties keep the incumbent, so two nodes with equal-length forks do
//! not flip-flop.

use super::error::LedgerError;

/// Result of offering a candidate chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// The candidate is now the local chain.
    Replaced { length: usize },
    /// The local chain was kept.
    Rejected(LedgerError),
}

/// Result of offering a single gossiped block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The block extended the tip.
    Appended,
    /// A block with this hash is already in the chain.
    Duplicate,
    /// The block failed validation or did not extend the tip.
    Rejected(LedgerError),
}

/// Longest-chain rule.
pub fn prefers_candidate(local_len: usize, candidate_len: usize) -> bool {
    candidate_len > local_len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strictly_longer_only() {
        assert!(prefers_candidate(1, 2));
        assert!(!prefers_candidate(2, 2));
        assert!(!prefers_candidate(3, 2));
    }
}
