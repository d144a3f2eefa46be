//! Row mapping shared by the PostgreSQL store and reader.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::domain::account::{Student, Tutor};
use crate::domain::foundation::{
    DomainError, ErrorCode, Level, RegistrationId, RegistrationStatus, RequestId, RequestStatus,
    SessionId, SessionStatus, StudentId, Timestamp, TutorId,
};
use crate::domain::registration::{Cancellation, CancellationReason, Registration};
use crate::domain::request::{RequestParticipation, SessionRequest};
use crate::domain::scheduling::TimeSlot;
use crate::domain::session::{AuditedField, DeliveryMode, Session, SessionUpdate};

/// Columns selected for every session read, aliased as `s`.
pub(crate) const SESSION_COLUMNS: &str = "s.id, s.tutor_id, s.subject, s.topic, s.level, \
     s.details, s.date, s.start_time, s.end_time, s.duration_minutes, s.mode, s.location, \
     s.online_link, s.status, s.request_id";

/// Columns selected for every request read, aliased as `r`.
pub(crate) const REQUEST_COLUMNS: &str =
    "r.id, r.student_id, r.subject, r.topic, r.level, r.details, r.created_on, r.status";

/// Columns selected for every registration read, aliased as `g`.
pub(crate) const REGISTRATION_COLUMNS: &str =
    "g.id, g.student_id, g.session_id, g.registered_on, g.status";

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| DomainError::database(&format!("get {}", column), e))
}

/// Stored values that no longer parse are reported as database errors.
fn corrupt(column: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} in database: {}", column, err),
    )
}

pub(crate) fn row_to_student(row: &PgRow) -> Result<Student, DomainError> {
    Ok(Student {
        id: StudentId::new(get::<String>(row, "id")?).map_err(|e| corrupt("student id", e))?,
        name: get(row, "name")?,
        email: get(row, "email")?,
    })
}

pub(crate) fn row_to_tutor(row: &PgRow) -> Result<Tutor, DomainError> {
    Ok(Tutor {
        id: TutorId::new(get::<String>(row, "id")?).map_err(|e| corrupt("tutor id", e))?,
        name: get(row, "name")?,
        email: get(row, "email")?,
    })
}

pub(crate) fn row_to_session(row: &PgRow) -> Result<Session, DomainError> {
    let id = SessionId::new(get::<String>(row, "id")?).map_err(|e| corrupt("session id", e))?;
    let tutor_id =
        TutorId::new(get::<String>(row, "tutor_id")?).map_err(|e| corrupt("tutor id", e))?;
    let level: Level = get::<String>(row, "level")?
        .parse()
        .map_err(|e| corrupt("level", e))?;
    let date: NaiveDate = get(row, "date")?;
    let start: NaiveTime = get(row, "start_time")?;
    let end: NaiveTime = get(row, "end_time")?;
    let duration: i32 = get(row, "duration_minutes")?;
    let mode = DeliveryMode::from_columns(
        &get::<String>(row, "mode")?,
        get(row, "location")?,
        get(row, "online_link")?,
    )
    .map_err(|e| corrupt("mode", e))?;
    let status: SessionStatus = get::<String>(row, "status")?
        .parse()
        .map_err(|e| corrupt("session status", e))?;
    let request_id = get::<Option<String>>(row, "request_id")?
        .map(RequestId::new)
        .transpose()
        .map_err(|e| corrupt("request id", e))?;

    Ok(Session::reconstitute(
        id,
        tutor_id,
        get(row, "subject")?,
        get(row, "topic")?,
        level,
        get(row, "details")?,
        TimeSlot::from_bounds(date, start, end),
        u32::try_from(duration).map_err(|e| corrupt("duration", e))?,
        mode,
        status,
        request_id,
    ))
}

pub(crate) fn row_to_request(row: &PgRow) -> Result<SessionRequest, DomainError> {
    let id = RequestId::new(get::<String>(row, "id")?).map_err(|e| corrupt("request id", e))?;
    let student_id =
        StudentId::new(get::<String>(row, "student_id")?).map_err(|e| corrupt("student id", e))?;
    let level: Level = get::<String>(row, "level")?
        .parse()
        .map_err(|e| corrupt("level", e))?;
    let status: RequestStatus = get::<String>(row, "status")?
        .parse()
        .map_err(|e| corrupt("request status", e))?;

    Ok(SessionRequest::reconstitute(
        id,
        student_id,
        get(row, "subject")?,
        get(row, "topic")?,
        level,
        get(row, "details")?,
        get(row, "created_on")?,
        status,
    ))
}

pub(crate) fn row_to_participation(row: &PgRow) -> Result<RequestParticipation, DomainError> {
    Ok(RequestParticipation {
        request_id: RequestId::new(get::<String>(row, "request_id")?)
            .map_err(|e| corrupt("request id", e))?,
        student_id: StudentId::new(get::<String>(row, "student_id")?)
            .map_err(|e| corrupt("student id", e))?,
        joined_on: get(row, "joined_on")?,
    })
}

pub(crate) fn row_to_registration(row: &PgRow) -> Result<Registration, DomainError> {
    let status: RegistrationStatus = get::<String>(row, "status")?
        .parse()
        .map_err(|e| corrupt("registration status", e))?;
    Ok(Registration::reconstitute(
        RegistrationId::new(get::<String>(row, "id")?)
            .map_err(|e| corrupt("registration id", e))?,
        StudentId::new(get::<String>(row, "student_id")?)
            .map_err(|e| corrupt("student id", e))?,
        SessionId::new(get::<String>(row, "session_id")?)
            .map_err(|e| corrupt("session id", e))?,
        get(row, "registered_on")?,
        status,
    ))
}

pub(crate) fn row_to_session_update(row: &PgRow) -> Result<SessionUpdate, DomainError> {
    let field: AuditedField = get::<String>(row, "field")?
        .parse()
        .map_err(|e| corrupt("audited field", e))?;
    let updated_at: DateTime<Utc> = get(row, "updated_at")?;
    Ok(SessionUpdate {
        session_id: SessionId::new(get::<String>(row, "session_id")?)
            .map_err(|e| corrupt("session id", e))?,
        field,
        old_value: get(row, "old_value")?,
        new_value: get(row, "new_value")?,
        updated_at: Timestamp::from_datetime(updated_at),
    })
}

pub(crate) fn row_to_cancellation(row: &PgRow) -> Result<Cancellation, DomainError> {
    let cancelled_at: DateTime<Utc> = get(row, "cancelled_at")?;
    Ok(Cancellation {
        session_id: SessionId::new(get::<String>(row, "session_id")?)
            .map_err(|e| corrupt("session id", e))?,
        student_id: StudentId::new(get::<String>(row, "student_id")?)
            .map_err(|e| corrupt("student id", e))?,
        reason: CancellationReason::new(get::<String>(row, "reason")?)
            .map_err(|e| corrupt("reason", e))?,
        cancelled_at: Timestamp::from_datetime(cancelled_at),
    })
}

/// Read a `COUNT(*)` column as `u32`.
pub(crate) fn count(row: &PgRow, column: &str) -> Result<u32, DomainError> {
    let n: i64 = get(row, column)?;
    u32::try_from(n).map_err(|e| corrupt(column, e))
}
