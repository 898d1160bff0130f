use chrono::{DateTime, Utc};
use common::AppointmentStatus;
use serde::Serialize;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Db(pub PgPool);

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub async fn connect(database_url: &str, max: u32) -> Result<Db, DbError> {
    let pool = PgPoolOptions::new()
        .max_connections(max)
        .connect(database_url)
        .await?;
    Ok(Db(pool))
}

pub async fn migrate(db: &Db) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(&db.0).await?;
    Ok(())
}

pub async fn close(db: &Db) {
    db.0.close().await;
}

// ==== Users ====

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub symptoms: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub photo: Option<String>,
    pub available_days: Option<Vec<String>>,
    pub available_slots: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub role: &'a str,
    pub phone: Option<&'a str>,
    pub specialization: Option<&'a str>,
    pub symptoms: Option<&'a str>,
    pub age: Option<i32>,
    pub gender: Option<&'a str>,
    pub available_days: Option<&'a [String]>,
    pub available_slots: Option<&'a [String]>,
}

/// Returns `None` when the email is already registered: the unique
/// constraint is the authority, so two concurrent registrations cannot
/// both succeed.
pub async fn insert_user(db: &Db, u: NewUser<'_>) -> Result<Option<UserRow>, DbError> {
    let res = sqlx::query_as::<_, UserRow>(
        r#"INSERT INTO users
            (email, password_hash, name, role, phone, specialization,
             symptoms, age, gender, available_days, available_slots)
           VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
           RETURNING *"#,
    )
    .bind(u.email)
    .bind(u.password_hash)
    .bind(u.name)
    .bind(u.role)
    .bind(u.phone)
    .bind(u.specialization)
    .bind(u.symptoms)
    .bind(u.age)
    .bind(u.gender)
    .bind(u.available_days)
    .bind(u.available_slots)
    .fetch_one(&db.0)
    .await;

    match res {
        Ok(row) => Ok(Some(row)),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub async fn find_user_by_email(db: &Db, email: &str) -> Result<Option<UserRow>, DbError> {
    let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(&db.0)
        .await?;
    Ok(row)
}

pub async fn find_user_by_id(db: &Db, id: Uuid) -> Result<Option<UserRow>, DbError> {
    let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&db.0)
        .await?;
    Ok(row)
}

/// Partial profile update; absent fields keep their stored value.
pub async fn update_user_profile(
    db: &Db,
    id: Uuid,
    name: Option<&str>,
    email: Option<&str>,
    phone: Option<&str>,
    specialization: Option<&str>,
) -> Result<Option<UserRow>, DbError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"UPDATE users SET
               name = COALESCE($2, name),
               email = COALESCE($3, email),
               phone = COALESCE($4, phone),
               specialization = COALESCE($5, specialization)
           WHERE id = $1
           RETURNING *"#,
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(specialization)
    .fetch_optional(&db.0)
    .await?;
    Ok(row)
}

pub async fn set_user_password(db: &Db, id: Uuid, password_hash: &str) -> Result<u64, DbError> {
    let res = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(&db.0)
        .await?;
    Ok(res.rows_affected())
}

// ==== Doctor directory ====

#[derive(Debug, Clone, Default)]
pub struct DoctorFilter {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub symptoms: Option<String>,
    pub availability: Option<String>,
    pub time_slot: Option<String>,
}

/// Doctors matching every present filter field. `name` and `symptoms` match
/// case-insensitively by substring; the rest match exactly.
pub async fn find_doctors(db: &Db, filter: &DoctorFilter) -> Result<Vec<UserRow>, DbError> {
    let rows = sqlx::query_as::<_, UserRow>(
        r#"SELECT * FROM users
           WHERE role = 'doctor'
             AND ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
             AND ($2::text IS NULL OR specialization = $2)
             AND ($3::text IS NULL OR symptoms ILIKE '%' || $3 || '%')
             AND ($4::text IS NULL OR $4 = ANY(available_days))
             AND ($5::text IS NULL OR $5 = ANY(available_slots))"#,
    )
    .bind(filter.name.as_deref())
    .bind(filter.specialization.as_deref())
    .bind(filter.symptoms.as_deref())
    .bind(filter.availability.as_deref())
    .bind(filter.time_slot.as_deref())
    .fetch_all(&db.0)
    .await?;
    Ok(rows)
}

// ==== Appointment ledger ====

/// Which existing appointments occupy their (doctor, date, time) slot for
/// the booking conflict check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotBlocking {
    /// Any record blocks the slot, whatever its status (observed behavior:
    /// a rejected appointment keeps its slot forever).
    AllStatuses,
    /// Only pending/approved records block; rejected and completed slots
    /// become rebookable.
    ActiveOnly,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct AppointmentRow {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appt_date: String,
    pub appt_time: String,
    pub reason: String,
    pub patient_notes: String,
    pub symptoms: String,
    pub status: String,
    pub doctor_message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An appointment joined with both parties' public contact fields.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct AppointmentWithParties {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub appointment: AppointmentRow,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: Option<String>,
    pub patient_symptoms: Option<String>,
    pub doctor_name: String,
    pub doctor_email: String,
    pub doctor_phone: Option<String>,
    pub doctor_specialization: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAppointment<'a> {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: &'a str,
    pub time: &'a str,
    pub reason: &'a str,
    pub patient_notes: &'a str,
    pub symptoms: &'a str,
}

/// Conditional insert: the conflict check and the insert are one statement,
/// so two sequential bookings of the same slot cannot both succeed. The
/// partial unique index on active rows backstops concurrent inserts; a
/// unique violation is reported as a taken slot, not an error.
///
/// Returns `None` when the slot is already occupied under `blocking`.
pub async fn book_appointment(
    db: &Db,
    appt: NewAppointment<'_>,
    blocking: SlotBlocking,
) -> Result<Option<AppointmentRow>, DbError> {
    let res = sqlx::query_as::<_, AppointmentRow>(
        r#"INSERT INTO appointments
            (patient_id, doctor_id, appt_date, appt_time, reason, patient_notes, symptoms)
           SELECT $1, $2, $3, $4, $5, $6, $7
           WHERE NOT EXISTS (
               SELECT 1 FROM appointments
               WHERE doctor_id = $2 AND appt_date = $3 AND appt_time = $4
                 AND ($8 OR status IN ('pending', 'approved'))
           )
           RETURNING *"#,
    )
    .bind(appt.patient_id)
    .bind(appt.doctor_id)
    .bind(appt.date)
    .bind(appt.time)
    .bind(appt.reason)
    .bind(appt.patient_notes)
    .bind(appt.symptoms)
    .bind(blocking == SlotBlocking::AllStatuses)
    .fetch_optional(&db.0)
    .await;

    match res {
        Ok(row) => Ok(row),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

const APPOINTMENTS_JOINED: &str = r#"
    SELECT a.*,
           p.name AS patient_name, p.email AS patient_email,
           p.phone AS patient_phone, p.symptoms AS patient_symptoms,
           d.name AS doctor_name, d.email AS doctor_email,
           d.phone AS doctor_phone, d.specialization AS doctor_specialization
    FROM appointments a
    JOIN users p ON p.id = a.patient_id
    JOIN users d ON d.id = a.doctor_id
"#;

/// Earliest first; created_at keeps ties in insertion order.
pub async fn appointments_for_patient(
    db: &Db,
    patient_id: Uuid,
) -> Result<Vec<AppointmentWithParties>, DbError> {
    let sql = format!(
        "{APPOINTMENTS_JOINED} WHERE a.patient_id = $1 \
         ORDER BY a.appt_date ASC, a.appt_time ASC, a.created_at ASC"
    );
    let rows = sqlx::query_as::<_, AppointmentWithParties>(&sql)
        .bind(patient_id)
        .fetch_all(&db.0)
        .await?;
    Ok(rows)
}

pub async fn appointments_for_doctor(
    db: &Db,
    doctor_id: Uuid,
) -> Result<Vec<AppointmentWithParties>, DbError> {
    let sql = format!(
        "{APPOINTMENTS_JOINED} WHERE a.doctor_id = $1 \
         ORDER BY a.appt_date ASC, a.appt_time ASC, a.created_at ASC"
    );
    let rows = sqlx::query_as::<_, AppointmentWithParties>(&sql)
        .bind(doctor_id)
        .fetch_all(&db.0)
        .await?;
    Ok(rows)
}

pub async fn get_appointment(db: &Db, id: Uuid) -> Result<Option<AppointmentRow>, DbError> {
    let row = sqlx::query_as::<_, AppointmentRow>("SELECT * FROM appointments WHERE id = $1")
        .bind(id)
        .fetch_optional(&db.0)
        .await?;
    Ok(row)
}

pub async fn set_appointment_status(
    db: &Db,
    id: Uuid,
    status: AppointmentStatus,
    doctor_message: &str,
) -> Result<Option<AppointmentRow>, DbError> {
    let row = sqlx::query_as::<_, AppointmentRow>(
        r#"UPDATE appointments
           SET status = $2, doctor_message = $3, updated_at = NOW()
           WHERE id = $1
           RETURNING *"#,
    )
    .bind(id)
    .bind(status.as_str())
    .bind(doctor_message)
    .fetch_optional(&db.0)
    .await?;
    Ok(row)
}

// ==== Refresh tokens (rotation) ====

#[derive(sqlx::FromRow, Debug, Serialize, Clone)]
pub struct RefreshRow {
    pub id: i64,
    pub user_id: Uuid,
    pub jti: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

pub async fn insert_refresh(
    db: &Db,
    user_id: Uuid,
    jti: &str,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), DbError> {
    sqlx::query(
        r#"INSERT INTO refresh_tokens (user_id, jti, token_hash, expires_at)
           VALUES ($1, $2, $3, $4)"#,
    )
    .bind(user_id)
    .bind(jti)
    .bind(token_hash)
    .bind(expires_at)
    .execute(&db.0)
    .await?;
    Ok(())
}

pub async fn get_refresh_by_jti(db: &Db, jti: &str) -> Result<Option<RefreshRow>, DbError> {
    let row = sqlx::query_as::<_, RefreshRow>("SELECT * FROM refresh_tokens WHERE jti = $1")
        .bind(jti)
        .fetch_optional(&db.0)
        .await?;
    Ok(row)
}

pub async fn revoke_refresh(db: &Db, jti: &str) -> Result<u64, DbError> {
    let res = sqlx::query("UPDATE refresh_tokens SET revoked = true WHERE jti = $1")
        .bind(jti)
        .execute(&db.0)
        .await?;
    Ok(res.rows_affected())
}
