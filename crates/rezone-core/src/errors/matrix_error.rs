//! OD matrix construction errors.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatrixError {
    #[error("invalid trip value {value} for cell ({origin}, {destination}): trips must be finite and non-negative")]
    InvalidTrips {
        origin: String,
        destination: String,
        value: f64,
    },

    #[error("invalid cost {value} for cell ({origin}, {destination}): costs must be finite and non-negative")]
    InvalidCost {
        origin: String,
        destination: String,
        value: f64,
    },

    #[error("invalid scale factor {factor}: must be finite and non-negative")]
    InvalidFactor { factor: f64 },
}
