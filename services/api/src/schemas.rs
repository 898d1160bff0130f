use common::{AppError, Role};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub specialization: Option<String>,
    pub phone: Option<String>,
    pub symptoms: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub available_days: Option<Vec<String>>,
    pub available_slots: Option<Vec<String>>,
}

impl RegisterInput {
    pub fn validate(&self) -> Result<Role, AppError> {
        if self.name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
        {
            return Err(AppError::BadRequest("Missing fields".into()));
        }
        Role::parse(&self.role).ok_or_else(|| AppError::BadRequest("Invalid role".into()))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentInput {
    pub doctor_id: Uuid,
    pub date: String,
    pub time: String,
    pub reason: Option<String>,
    pub patient_notes: Option<String>,
    pub symptoms: Option<String>,
}

impl BookAppointmentInput {
    /// Date and time are opaque strings to the ledger; only presence is
    /// enforced here.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.date.trim().is_empty() || self.time.trim().is_empty() {
            return Err(AppError::BadRequest("Missing fields".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateInput {
    pub status: String,
    pub doctor_message: Option<String>,
}

/// GET /doctors query params, names matching the public contract.
#[derive(Debug, Deserialize, Default)]
pub struct DoctorQuery {
    pub name: Option<String>,
    pub spec: Option<String>,
    pub availability: Option<String>,
    pub time: Option<String>,
    pub symptoms: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

impl ProfileUpdateInput {
    pub fn wants_password_change(&self) -> bool {
        self.old_password.is_some()
            || self.new_password.is_some()
            || self.confirm_password.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_requires_core_fields() {
        let input = RegisterInput {
            name: "  ".into(),
            email: "a@b.c".into(),
            password: "pw".into(),
            role: "patient".into(),
            specialization: None,
            phone: None,
            symptoms: None,
            age: None,
            gender: None,
            available_days: None,
            available_slots: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn register_rejects_unknown_role() {
        let input = RegisterInput {
            name: "Aarti".into(),
            email: "a@b.c".into(),
            password: "pw".into(),
            role: "admin".into(),
            specialization: None,
            phone: None,
            symptoms: None,
            age: None,
            gender: None,
            available_days: None,
            available_slots: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn booking_body_uses_camel_case_wire_names() {
        let body = serde_json::json!({
            "doctorId": "7f8ce7a5-0a8a-4c0b-9c2e-3f4f4cf2f6a0",
            "date": "2024-05-01",
            "time": "10:00",
            "reason": "checkup"
        });
        let input: BookAppointmentInput = serde_json::from_value(body).unwrap();
        assert_eq!(input.date, "2024-05-01");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn booking_requires_date_and_time() {
        let body = serde_json::json!({
            "doctorId": "7f8ce7a5-0a8a-4c0b-9c2e-3f4f4cf2f6a0",
            "date": "",
            "time": "10:00"
        });
        let input: BookAppointmentInput = serde_json::from_value(body).unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn status_update_reads_doctor_message() {
        let body = serde_json::json!({ "status": "rejected", "doctorMessage": "on leave" });
        let input: StatusUpdateInput = serde_json::from_value(body).unwrap();
        assert_eq!(input.doctor_message.as_deref(), Some("on leave"));
    }
}
