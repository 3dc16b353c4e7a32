// Errors raised by the period model
use thiserror::Error;

pub type PeriodResult<T> = Result<T, PeriodError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    #[error("invalid calendar coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("{operation} is not supported for {period}")]
    Unsupported {
        operation: &'static str,
        period: &'static str,
    },

    #[error("bucket index {index} is out of range for a period with {buckets} buckets")]
    IndexOutOfRange { index: usize, buckets: usize },

    #[error("instant {0} does not fall inside the period")]
    InstantOutOfRange(chrono::NaiveDateTime),

    #[error("{0} periods have no finer period to drill down into")]
    NoFinerPeriod(&'static str),

    #[error("malformed period url: {0}")]
    MalformedUrl(String),
}
