use serde::{Deserialize, Serialize};

/// Message stored on a rejection when the doctor supplies none.
pub const DEFAULT_REJECTION_MESSAGE: &str = "No reason provided";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "patient" => Some(Role::Patient),
            "doctor" => Some(Role::Doctor),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Approved => "approved",
            AppointmentStatus::Rejected => "rejected",
            AppointmentStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<AppointmentStatus> {
        match s {
            "pending" => Some(AppointmentStatus::Pending),
            "approved" => Some(AppointmentStatus::Approved),
            "rejected" => Some(AppointmentStatus::Rejected),
            "completed" => Some(AppointmentStatus::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a doctor may move an appointment from `from` to `to`.
///
/// Currently every transition is allowed, including leaving `completed`.
/// All callers go through this function, so tightening the lifecycle is a
/// one-place change.
pub fn transition_allowed(_from: AppointmentStatus, _to: AppointmentStatus) -> bool {
    true
}

/// Doctor message to store alongside a status update.
///
/// Only rejections carry a message, stored verbatim; a rejection with no
/// message (or an empty one) gets the fixed default. Every other status
/// clears the field.
pub fn doctor_message_for(status: AppointmentStatus, supplied: Option<&str>) -> String {
    match status {
        AppointmentStatus::Rejected => supplied
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_REJECTION_MESSAGE)
            .to_string(),
        _ => String::new(),
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Not authenticated")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("Server error")]
    Internal,
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips() {
        assert_eq!(Role::parse("patient"), Some(Role::Patient));
        assert_eq!(Role::parse("doctor"), Some(Role::Doctor));
        assert_eq!(Role::Doctor.as_str(), "doctor");
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::parse("Doctor"), None);
    }

    #[test]
    fn status_vocabulary_is_closed() {
        for s in ["pending", "approved", "rejected", "completed"] {
            let parsed = AppointmentStatus::parse(s).unwrap();
            assert_eq!(parsed.as_str(), s);
        }
        assert_eq!(AppointmentStatus::parse("cancelled"), None);
        assert_eq!(AppointmentStatus::parse(""), None);
    }

    #[test]
    fn transitions_are_unrestricted() {
        use AppointmentStatus::*;
        for from in [Pending, Approved, Rejected, Completed] {
            for to in [Pending, Approved, Rejected, Completed] {
                assert!(transition_allowed(from, to));
            }
        }
    }

    #[test]
    fn rejection_without_message_gets_default() {
        let msg = doctor_message_for(AppointmentStatus::Rejected, None);
        assert_eq!(msg, DEFAULT_REJECTION_MESSAGE);
        let msg = doctor_message_for(AppointmentStatus::Rejected, Some(""));
        assert_eq!(msg, DEFAULT_REJECTION_MESSAGE);
    }

    #[test]
    fn rejection_keeps_supplied_message_verbatim() {
        let msg = doctor_message_for(AppointmentStatus::Rejected, Some("fully booked"));
        assert_eq!(msg, "fully booked");
        // Not normalized, not even whitespace.
        let msg = doctor_message_for(AppointmentStatus::Rejected, Some("  on leave  "));
        assert_eq!(msg, "  on leave  ");
    }

    #[test]
    fn non_rejection_clears_message() {
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Approved,
            AppointmentStatus::Completed,
        ] {
            assert_eq!(doctor_message_for(status, Some("ignored")), "");
        }
    }
}
