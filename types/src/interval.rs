//! Sequence-number intervals covered by a commit

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{TypesError, TypesResult};

/// Inclusive range of sequence numbers committed under one merkle root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitInterval {
    pub min: u64,
    pub max: u64,
}

impl CommitInterval {
    pub fn new(min: u64, max: u64) -> TypesResult<Self> {
        if min > max {
            return Err(TypesError::InvalidInterval { min, max });
        }
        Ok(Self { min, max })
    }

    /// Number of sequence numbers in the interval
    pub fn len(&self) -> u64 {
        self.max.saturating_sub(self.min).saturating_add(1)
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    pub fn contains(&self, seq_nr: u64) -> bool {
        seq_nr >= self.min && seq_nr <= self.max
    }

    /// Position of `seq_nr` within the interval, if it belongs to it
    pub fn offset_of(&self, seq_nr: u64) -> Option<u64> {
        self.contains(seq_nr).then(|| seq_nr - self.min)
    }
}

impl fmt::Display for CommitInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_bounds() {
        let interval = CommitInterval::new(10, 14).unwrap();
        assert_eq!(interval.len(), 5);
        assert!(interval.contains(10));
        assert!(interval.contains(14));
        assert!(!interval.contains(15));
        assert_eq!(interval.offset_of(12), Some(2));
        assert_eq!(interval.offset_of(9), None);
        assert_eq!(interval.to_string(), "[10, 14]");
    }

    #[test]
    fn test_inverted_interval_rejected() {
        assert_eq!(
            CommitInterval::new(5, 4),
            Err(TypesError::InvalidInterval { min: 5, max: 4 })
        );
        assert_eq!(CommitInterval::new(3, 3).unwrap().len(), 1);
    }
}
