//! Correspondence table construction errors.

/// Why a correspondence row was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedReason {
    #[error("null {column} zone")]
    NullZone { column: &'static str },

    #[error("splitting factor '{value}' is not a number")]
    NonNumericFactor { value: String },

    #[error("splitting factor {value} is not finite")]
    NonFiniteFactor { value: f64 },

    #[error("splitting factor {value} is negative")]
    NegativeFactor { value: f64 },

    #[error("duplicate pair ({old_zone}, {new_zone}) with conflicting factors {first} and {second}")]
    ConflictingDuplicate {
        old_zone: String,
        new_zone: String,
        first: f64,
        second: f64,
    },
}

/// Errors raised while building a correspondence table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CorrespondenceError {
    #[error("malformed correspondence row {row}: {reason}")]
    Malformed { row: usize, reason: MalformedReason },
}

impl CorrespondenceError {
    pub fn malformed(row: usize, reason: MalformedReason) -> Self {
        Self::Malformed { row, reason }
    }

    /// The 1-based data row that was rejected.
    pub fn row(&self) -> usize {
        match self {
            Self::Malformed { row, .. } => *row,
        }
    }
}
