use std::fmt;

use crate::graph::GraphError;
use crate::model::InvalidRecord;
use crate::plan::Version;
use crate::seating::SeatingError;

/// Machine-readable error codes the presentation layer maps to localized
/// prompts. Each kind has its own code and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidRecord,
    AttendeeNotFound,
    TableNotFound,
    CycleDetected,
    DuplicateAttendee,
    DuplicateTableNumber,
    TableOverlap,
    OutOfBounds,
    CapacityExceeded,
    AlreadySeated,
    StaleVersion,
}

impl ErrorCode {
    pub const ALL: [Self; 11] = [
        Self::InvalidRecord,
        Self::AttendeeNotFound,
        Self::TableNotFound,
        Self::CycleDetected,
        Self::DuplicateAttendee,
        Self::DuplicateTableNumber,
        Self::TableOverlap,
        Self::OutOfBounds,
        Self::CapacityExceeded,
        Self::AlreadySeated,
        Self::StaleVersion,
    ];

    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidRecord => "E1001",
            Self::AttendeeNotFound => "E2001",
            Self::TableNotFound => "E2002",
            Self::CycleDetected => "E2003",
            Self::DuplicateAttendee => "E2004",
            Self::DuplicateTableNumber => "E3001",
            Self::TableOverlap => "E3002",
            Self::OutOfBounds => "E3003",
            Self::CapacityExceeded => "E4001",
            Self::AlreadySeated => "E4002",
            Self::StaleVersion => "E5001",
        }
    }

    /// Short human-facing summary.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidRecord => "Record is structurally invalid",
            Self::AttendeeNotFound => "Guest not found",
            Self::TableNotFound => "Table not found",
            Self::CycleDetected => "Relationship would loop back on itself",
            Self::DuplicateAttendee => "Guest already exists",
            Self::DuplicateTableNumber => "Table number already in use",
            Self::TableOverlap => "Table overlaps another table or a fixed zone",
            Self::OutOfBounds => "Table does not fit inside the venue",
            Self::CapacityExceeded => "Table is full",
            Self::AlreadySeated => "Guest is already seated at another table",
            Self::StaleVersion => "Seating plan changed since it was loaded",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InvalidRecord => Some("Fix the record before submitting it."),
            Self::AttendeeNotFound | Self::TableNotFound => {
                Some("Reload the guest list; the record may have been deleted.")
            }
            Self::CycleDetected => Some("Pick a relative who is not a descendant of this guest."),
            Self::DuplicateAttendee => None,
            Self::DuplicateTableNumber => Some("Choose an unused table number."),
            Self::TableOverlap => Some("Move the table away from neighbours and fixed zones."),
            Self::OutOfBounds => Some("Move the table further inside the venue walls."),
            Self::CapacityExceeded => Some("Free a seat or choose another table."),
            Self::AlreadySeated => Some("Unseat the guest from their current table first."),
            Self::StaleVersion => Some("Reload the plan and retry."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Every failure a plan mutation can report.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Seating(#[from] SeatingError),

    #[error(transparent)]
    Invalid(#[from] InvalidRecord),

    /// The caller's version token no longer matches the plan.
    #[error("plan version {expected} is stale (current is {current})")]
    StaleVersion { expected: Version, current: Version },
}

impl PlanError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Graph(e) => e.code(),
            Self::Seating(e) => e.code(),
            Self::Invalid(_) => ErrorCode::InvalidRecord,
            Self::StaleVersion { .. } => ErrorCode::StaleVersion,
        }
    }

    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::StaleVersion { .. })
    }

    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ErrorCode::ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn all_messages_are_distinct() {
        let messages: HashSet<_> = ErrorCode::ALL.iter().map(|c| c.message()).collect();
        assert_eq!(messages.len(), ErrorCode::ALL.len());
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for code in ErrorCode::ALL {
            let s = code.code();
            assert_eq!(s.len(), 5);
            assert!(s.starts_with('E'));
            assert!(s.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn stale_version_display_names_both_versions() {
        let err = PlanError::StaleVersion {
            expected: Version::new(3),
            current: Version::new(5),
        };
        assert!(err.is_stale());
        assert_eq!(err.code(), ErrorCode::StaleVersion);
        let s = err.to_string();
        assert!(s.contains("v3") && s.contains("v5"), "display: {s}");
    }
}
