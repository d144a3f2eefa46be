//! PostgreSQL implementation of SchedulingStore.
//!
//! Each engine transaction maps onto one `sqlx::Transaction`, which rolls
//! back when dropped without `commit`. Storage-level uniqueness is enforced
//! by partial unique indexes (see `migrations/`); their violations are
//! reported with dedicated error codes.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};

use super::rows::{
    row_to_participation, row_to_registration, row_to_request, row_to_session, row_to_student,
    row_to_tutor, REGISTRATION_COLUMNS, REQUEST_COLUMNS, SESSION_COLUMNS,
};
use crate::domain::account::{Student, Tutor};
use crate::domain::foundation::{
    DomainError, EntityKind, ErrorCode, Level, RequestId, SessionId, StudentId, TutorId,
};
use crate::domain::registration::{Cancellation, Registration};
use crate::domain::request::{RequestParticipation, SessionRequest};
use crate::domain::scheduling::ConflictScope;
use crate::domain::session::{Session, SessionUpdate};
use crate::ports::{SchedulingStore, SchedulingTransaction};

const SESSIONS_TUTOR_SLOT_KEY: &str = "sessions_tutor_slot_key";
const REGISTRATIONS_ACTIVE_KEY: &str = "registrations_active_key";
const SESSION_REQUESTS_PENDING_KEY: &str = "session_requests_pending_key";
const STUDENTS_EMAIL_KEY: &str = "students_email_key";
const TUTORS_EMAIL_KEY: &str = "tutors_email_key";

/// PostgreSQL implementation of SchedulingStore.
#[derive(Clone)]
pub struct PostgresSchedulingStore {
    pool: PgPool,
}

impl PostgresSchedulingStore {
    /// Creates a new PostgresSchedulingStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchedulingStore for PostgresSchedulingStore {
    async fn begin(&self) -> Result<Box<dyn SchedulingTransaction>, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("begin transaction", e))?;
        Ok(Box::new(PostgresTransaction { tx }))
    }
}

/// One open database transaction.
pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

/// Table holding identifiers of `kind`.
fn table_of(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Student => "students",
        EntityKind::Tutor => "tutors",
        EntityKind::Request => "session_requests",
        EntityKind::Session => "sessions",
        EntityKind::Registration => "registrations",
    }
}

/// Transaction-scoped advisory lock key serialising id allocation per kind.
fn allocation_lock_key(kind: EntityKind) -> i64 {
    0x7475_7400 + EntityKind::all().iter().position(|k| *k == kind).unwrap_or(0) as i64
}

fn constraint_of(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint(),
        _ => None,
    }
}

fn slot_taken(session: &Session, err: &sqlx::Error) -> Option<DomainError> {
    (constraint_of(err) == Some(SESSIONS_TUTOR_SLOT_KEY)).then(|| {
        DomainError::new(
            ErrorCode::SlotTaken,
            format!(
                "Tutor {} already has a session at {} {}",
                session.tutor_id(),
                session.date(),
                session.start_time()
            ),
        )
        .with_detail("tutor_id", session.tutor_id().as_str())
        .with_detail("session_id", session.id().as_str())
    })
}

fn duplicate_email(constraint: &str, email: &str, err: &sqlx::Error) -> Option<DomainError> {
    (constraint_of(err) == Some(constraint)).then(|| {
        DomainError::new(
            ErrorCode::DuplicateEmail,
            format!("Email {} is already in use", email),
        )
    })
}

#[async_trait]
impl SchedulingTransaction for PostgresTransaction {
    async fn max_sequence(&mut self, kind: EntityKind) -> Result<Option<u64>, DomainError> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(allocation_lock_key(kind))
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DomainError::database("lock id allocation", e))?;

        let sql = format!(
            "SELECT MAX(CAST(SUBSTRING(id FROM $1) AS BIGINT)) FROM {}",
            table_of(kind)
        );
        let (max,): (Option<i64>,) = sqlx::query_as(&sql)
            .bind(format!("^{}([0-9]+)$", kind.prefix()))
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| DomainError::database("read max sequence", e))?;

        Ok(max.map(|n| n.max(0) as u64))
    }

    async fn find_student(&mut self, id: &StudentId) -> Result<Option<Student>, DomainError> {
        let row = sqlx::query("SELECT id, name, email FROM students WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| DomainError::database("fetch student", e))?;
        row.as_ref().map(row_to_student).transpose()
    }

    async fn find_tutor(&mut self, id: &TutorId) -> Result<Option<Tutor>, DomainError> {
        let row = sqlx::query("SELECT id, name, email FROM tutors WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| DomainError::database("fetch tutor", e))?;
        row.as_ref().map(row_to_tutor).transpose()
    }

    async fn insert_student(&mut self, student: &Student) -> Result<(), DomainError> {
        sqlx::query("INSERT INTO students (id, name, email) VALUES ($1, $2, $3)")
            .bind(student.id.as_str())
            .bind(&student.name)
            .bind(&student.email)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                duplicate_email(STUDENTS_EMAIL_KEY, &student.email, &e)
                    .unwrap_or_else(|| DomainError::database("insert student", e))
            })?;
        Ok(())
    }

    async fn insert_tutor(&mut self, tutor: &Tutor) -> Result<(), DomainError> {
        sqlx::query("INSERT INTO tutors (id, name, email) VALUES ($1, $2, $3)")
            .bind(tutor.id.as_str())
            .bind(&tutor.name)
            .bind(&tutor.email)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                duplicate_email(TUTORS_EMAIL_KEY, &tutor.email, &e)
                    .unwrap_or_else(|| DomainError::database("insert tutor", e))
            })?;
        Ok(())
    }

    async fn find_session(&mut self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        let sql = format!("SELECT {} FROM sessions s WHERE s.id = $1 FOR UPDATE", SESSION_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| DomainError::database("fetch session", e))?;
        row.as_ref().map(row_to_session).transpose()
    }

    async fn sessions_in_scope(
        &mut self,
        scope: &ConflictScope,
        date: NaiveDate,
    ) -> Result<Vec<Session>, DomainError> {
        let rows = match scope {
            ConflictScope::Tutor(tutor_id) => {
                let sql = format!(
                    "SELECT {} FROM sessions s \
                     WHERE s.tutor_id = $1 AND s.date = $2 AND s.status = 'active'",
                    SESSION_COLUMNS
                );
                sqlx::query(&sql)
                    .bind(tutor_id.as_str())
                    .bind(date)
                    .fetch_all(&mut *self.tx)
                    .await
            }
            ConflictScope::Student(student_id) => {
                let sql = format!(
                    "SELECT {} FROM sessions s \
                     JOIN registrations g ON g.session_id = s.id \
                     WHERE g.student_id = $1 AND g.status = 'registered' \
                       AND s.date = $2 AND s.status = 'active'",
                    SESSION_COLUMNS
                );
                sqlx::query(&sql)
                    .bind(student_id.as_str())
                    .bind(date)
                    .fetch_all(&mut *self.tx)
                    .await
            }
        }
        .map_err(|e| DomainError::database("fetch sessions in scope", e))?;

        rows.iter().map(row_to_session).collect()
    }

    async fn insert_session(&mut self, session: &Session) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                id, tutor_id, subject, topic, level, details, date, start_time, end_time,
                duration_minutes, mode, location, online_link, status, request_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(session.id().as_str())
        .bind(session.tutor_id().as_str())
        .bind(session.subject())
        .bind(session.topic())
        .bind(session.level().as_str())
        .bind(session.details())
        .bind(session.date())
        .bind(session.start_time())
        .bind(session.end_time())
        .bind(session.duration_minutes() as i32)
        .bind(session.mode().kind())
        .bind(session.mode().location())
        .bind(session.mode().online_link())
        .bind(session.status().as_str())
        .bind(session.request_id().map(|id| id.as_str()))
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            slot_taken(session, &e).unwrap_or_else(|| DomainError::database("insert session", e))
        })?;

        Ok(())
    }

    async fn update_session(&mut self, session: &Session) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions SET
                subject = $2,
                topic = $3,
                level = $4,
                details = $5,
                date = $6,
                start_time = $7,
                end_time = $8,
                duration_minutes = $9,
                mode = $10,
                location = $11,
                online_link = $12,
                status = $13
            WHERE id = $1
            "#,
        )
        .bind(session.id().as_str())
        .bind(session.subject())
        .bind(session.topic())
        .bind(session.level().as_str())
        .bind(session.details())
        .bind(session.date())
        .bind(session.start_time())
        .bind(session.end_time())
        .bind(session.duration_minutes() as i32)
        .bind(session.mode().kind())
        .bind(session.mode().location())
        .bind(session.mode().online_link())
        .bind(session.status().as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            slot_taken(session, &e).unwrap_or_else(|| DomainError::database("update session", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", session.id()),
            )
            .with_detail("id", session.id().as_str()));
        }

        Ok(())
    }

    async fn insert_session_update(&mut self, update: &SessionUpdate) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO session_updates (session_id, field, old_value, new_value, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(update.session_id.as_str())
        .bind(update.field.as_str())
        .bind(update.old_value.as_deref())
        .bind(update.new_value.as_deref())
        .bind(update.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database("insert session update", e))?;
        Ok(())
    }

    async fn find_request(&mut self, id: &RequestId) -> Result<Option<SessionRequest>, DomainError> {
        let sql = format!(
            "SELECT {} FROM session_requests r WHERE r.id = $1 FOR UPDATE",
            REQUEST_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| DomainError::database("fetch request", e))?;
        row.as_ref().map(row_to_request).transpose()
    }

    async fn find_pending_request(
        &mut self,
        subject: &str,
        topic: &str,
        level: Level,
    ) -> Result<Option<SessionRequest>, DomainError> {
        let sql = format!(
            "SELECT {} FROM session_requests r \
             WHERE LOWER(r.subject) = LOWER($1) AND LOWER(r.topic) = LOWER($2) \
               AND r.level = $3 AND r.status = 'pending' \
             FOR UPDATE",
            REQUEST_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(subject.trim())
            .bind(topic.trim())
            .bind(level.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| DomainError::database("fetch pending request", e))?;
        row.as_ref().map(row_to_request).transpose()
    }

    async fn insert_request(&mut self, request: &SessionRequest) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO session_requests (
                id, student_id, subject, topic, level, details, created_on, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(request.id().as_str())
        .bind(request.student_id().as_str())
        .bind(request.subject())
        .bind(request.topic())
        .bind(request.level().as_str())
        .bind(request.details())
        .bind(request.created_on())
        .bind(request.status().as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if constraint_of(&e) == Some(SESSION_REQUESTS_PENDING_KEY) {
                return DomainError::new(
                    ErrorCode::DuplicateRequest,
                    format!(
                        "A pending request for {} / {} ({}) already exists",
                        request.subject(),
                        request.topic(),
                        request.level()
                    ),
                );
            }
            DomainError::database("insert request", e)
        })?;
        Ok(())
    }

    async fn update_request(&mut self, request: &SessionRequest) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE session_requests SET status = $2 WHERE id = $1")
            .bind(request.id().as_str())
            .bind(request.status().as_str())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DomainError::database("update request", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::RequestNotFound,
                format!("Request not found: {}", request.id()),
            )
            .with_detail("id", request.id().as_str()));
        }
        Ok(())
    }

    async fn insert_participation(
        &mut self,
        participation: &RequestParticipation,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO request_participations (request_id, student_id, joined_on)
            VALUES ($1, $2, $3)
            ON CONFLICT (request_id, student_id) DO NOTHING
            "#,
        )
        .bind(participation.request_id.as_str())
        .bind(participation.student_id.as_str())
        .bind(participation.joined_on)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database("insert participation", e))?;
        Ok(result.rows_affected() == 1)
    }

    async fn participants(
        &mut self,
        request_id: &RequestId,
    ) -> Result<Vec<RequestParticipation>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT request_id, student_id, joined_on
            FROM request_participations
            WHERE request_id = $1
            ORDER BY joined_on, student_id
            "#,
        )
        .bind(request_id.as_str())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database("fetch participants", e))?;
        rows.iter().map(row_to_participation).collect()
    }

    async fn find_active_registration(
        &mut self,
        student_id: &StudentId,
        session_id: &SessionId,
    ) -> Result<Option<Registration>, DomainError> {
        let sql = format!(
            "SELECT {} FROM registrations g \
             WHERE g.student_id = $1 AND g.session_id = $2 AND g.status = 'registered' \
             FOR UPDATE",
            REGISTRATION_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(student_id.as_str())
            .bind(session_id.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| DomainError::database("fetch registration", e))?;
        row.as_ref().map(row_to_registration).transpose()
    }

    async fn insert_registration(&mut self, registration: &Registration) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO registrations (id, student_id, session_id, registered_on, status)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(registration.id().as_str())
        .bind(registration.student_id().as_str())
        .bind(registration.session_id().as_str())
        .bind(registration.registered_on())
        .bind(registration.status().as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if constraint_of(&e) == Some(REGISTRATIONS_ACTIVE_KEY) {
                return DomainError::new(
                    ErrorCode::DuplicateRegistration,
                    "Student is already registered for this session",
                )
                .with_detail("student_id", registration.student_id().as_str())
                .with_detail("session_id", registration.session_id().as_str());
            }
            DomainError::database("insert registration", e)
        })?;
        Ok(())
    }

    async fn update_registration(&mut self, registration: &Registration) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE registrations SET status = $2 WHERE id = $1")
            .bind(registration.id().as_str())
            .bind(registration.status().as_str())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DomainError::database("update registration", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::RegistrationNotFound,
                format!("Registration not found: {}", registration.id()),
            )
            .with_detail("id", registration.id().as_str()));
        }
        Ok(())
    }

    async fn insert_cancellation(&mut self, cancellation: &Cancellation) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO cancellations (session_id, student_id, reason, cancelled_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(cancellation.session_id.as_str())
        .bind(cancellation.student_id.as_str())
        .bind(cancellation.reason.as_str())
        .bind(cancellation.cancelled_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database("insert cancellation", e))?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(|e| DomainError::database("commit transaction", e))
    }
}
