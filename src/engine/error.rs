use crate::grid;
use crate::model::{Day, Hour};

/// Errors surfaced by the scheduling engine. A detected conflict is not
/// an error — it is a flow outcome awaiting a replace/cancel decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// A required form field is empty or unselected.
    MissingField(&'static str),
    /// `start >= end`.
    InvalidTimeRange { start: Hour, end: Hour },
    /// Hour outside the bookable grid.
    HourOutOfRange(Hour),
    /// Day not offered by this deployment's picker.
    DayNotBookable(Day),
    /// Mutation attempted without the mutate capability.
    PermissionDenied,
    /// A commit is already in flight; submissions are serialized.
    Busy,
    /// Operation not valid in the current phase.
    InvalidState(&'static str),
    /// The system of record rejected or failed the operation.
    Store { op: &'static str, message: String },
    /// The system of record did not answer within the commit timeout.
    Timeout { op: &'static str },
}

impl std::fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleError::MissingField(field) => write!(f, "missing required field: {field}"),
            ScheduleError::InvalidTimeRange { start, end } => {
                write!(
                    f,
                    "end time must be after start time ({start}:00 is not before {end}:00)"
                )
            }
            ScheduleError::HourOutOfRange(hour) => {
                write!(
                    f,
                    "hour {hour}:00 outside bookable range {}:00-{}:00",
                    grid::OPENING_HOUR,
                    grid::CLOSING_HOUR
                )
            }
            ScheduleError::DayNotBookable(day) => {
                write!(f, "{day} is not bookable in this deployment")
            }
            ScheduleError::PermissionDenied => write!(f, "permission denied: read-only access"),
            ScheduleError::Busy => write!(f, "a commit is already in flight"),
            ScheduleError::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            ScheduleError::Store { op, message } => write!(f, "{op} failed: {message}"),
            ScheduleError::Timeout { op } => write!(f, "{op} timed out"),
        }
    }
}

impl std::error::Error for ScheduleError {}
