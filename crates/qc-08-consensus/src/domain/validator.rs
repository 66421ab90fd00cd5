//! Validator allow-list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Validators authorized by default.
pub const DEFAULT_VALIDATORS: [&str; 2] = ["validator_001", "validator_002"];

/// Static set of validator identities allowed to seal blocks.
///
/// Read-only once the ledger is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidatorSet {
    validators: BTreeSet<String>,
}

impl ValidatorSet {
    /// Create a validator set from identities.
    pub fn new<I, S>(validators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            validators: validators.into_iter().map(Into::into).collect(),
        }
    }

    /// Get the number of validators
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Check if a validator is in the set
    pub fn contains(&self, validator_id: &str) -> bool {
        self.validators.contains(validator_id)
    }

    /// Iterate identities in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.validators.iter().map(String::as_str)
    }
}

impl Default for ValidatorSet {
    fn default() -> Self {
        Self::new(DEFAULT_VALIDATORS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set() {
        let set = ValidatorSet::default();
        assert_eq!(set.len(), 2);
        assert!(set.contains("validator_001"));
        assert!(set.contains("validator_002"));
        assert!(!set.contains("system"));
    }

    #[test]
    fn test_deserialize_from_list() {
        let set: ValidatorSet = serde_json::from_str(r#"["a","b","a"]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
