//! Error types.
//!
//! Calendar errors are local and recoverable: the search skips the
//! candidate that produced them. Solver errors are the only failures a
//! caller of [`TimetableSolver`](crate::scheduler::TimetableSolver) sees.

use thiserror::Error;

use crate::models::Slot;
use crate::validation::ValidationError;

/// Rejected calendar commit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("{entity} is not available on {day} at slot {slot}")]
    SlotUnavailable {
        entity: String,
        day: String,
        slot: Slot,
    },

    #[error("{entity} capacity exceeded: {detail}")]
    CapacityExceeded { entity: String, detail: String },
}

/// Solver failure surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("Invalid input: {} issue(s), first: {}", .0.len(), first_issue(.0))]
    InvalidInput(Vec<ValidationError>),

    #[error("No feasible timetable found after {attempts} attempt(s) in {elapsed_ms} ms")]
    NoFeasibleSolution { attempts: usize, elapsed_ms: u128 },
}

fn first_issue(errors: &[ValidationError]) -> String {
    errors
        .first()
        .map_or_else(|| "none".to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_calendar_error_messages() {
        let err = CalendarError::SlotUnavailable {
            entity: "R1".into(),
            day: "Mon".into(),
            slot: 3,
        };
        assert_eq!(err.to_string(), "R1 is not available on Mon at slot 3");

        let err = CalendarError::CapacityExceeded {
            entity: "F1".into(),
            detail: "weekly hours 11 > 10".into(),
        };
        assert!(err.to_string().contains("weekly hours"));
    }

    #[test]
    fn test_invalid_input_reports_first_issue() {
        let err = SolverError::InvalidInput(vec![ValidationError {
            kind: ValidationErrorKind::UnknownSubject,
            message: "Batch B1 references unknown subject S9".into(),
        }]);
        let text = err.to_string();
        assert!(text.contains("1 issue(s)"));
        assert!(text.contains("S9"));
    }
}
