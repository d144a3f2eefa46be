//! PostgreSQL implementation of ScheduleReader.
//!
//! Read-only queries against the pool; no locks are taken.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::rows::{
    count, row_to_cancellation, row_to_registration, row_to_request, row_to_session,
    row_to_session_update, REGISTRATION_COLUMNS, REQUEST_COLUMNS, SESSION_COLUMNS,
};
use crate::domain::account::Student;
use crate::domain::foundation::{DomainError, SessionId, StudentId, TutorId};
use crate::domain::registration::Cancellation;
use crate::domain::session::SessionUpdate;
use crate::ports::{
    PendingRequestView, RosterEntry, ScheduleReader, ScheduledSessionView, SessionListing,
};

/// PostgreSQL implementation of ScheduleReader.
#[derive(Clone)]
pub struct PostgresScheduleReader {
    pool: PgPool,
}

impl PostgresScheduleReader {
    /// Creates a new PostgresScheduleReader.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn listings(
        &self,
        filter: &str,
        tutor_id: Option<&TutorId>,
        today: Option<NaiveDate>,
        single: Option<&SessionId>,
    ) -> Result<Vec<SessionListing>, DomainError> {
        let sql = format!(
            "SELECT {}, t.name AS tutor_name, \
                    (SELECT COUNT(*) FROM registrations g \
                      WHERE g.session_id = s.id AND g.status = 'registered') AS active_registrations \
             FROM sessions s \
             JOIN tutors t ON t.id = s.tutor_id \
             WHERE {} \
             ORDER BY s.date, s.start_time, s.id",
            SESSION_COLUMNS, filter
        );
        let mut query = sqlx::query(&sql);
        if let Some(id) = single {
            query = query.bind(id.as_str());
        }
        if let Some(tutor_id) = tutor_id {
            query = query.bind(tutor_id.as_str());
        }
        if let Some(today) = today {
            query = query.bind(today);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database("fetch session listings", e))?;
        rows.iter().map(row_to_listing).collect()
    }

    async fn updates_for(
        &self,
        session_ids: &[String],
    ) -> Result<HashMap<String, Vec<SessionUpdate>>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT session_id, field, old_value, new_value, updated_at
            FROM session_updates
            WHERE session_id = ANY($1)
            ORDER BY updated_at, id
            "#,
        )
        .bind(session_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("fetch session updates", e))?;

        let mut grouped: HashMap<String, Vec<SessionUpdate>> = HashMap::new();
        for row in &rows {
            let update = row_to_session_update(row)?;
            grouped
                .entry(update.session_id.as_str().to_string())
                .or_default()
                .push(update);
        }
        Ok(grouped)
    }
}

fn row_to_listing(row: &PgRow) -> Result<SessionListing, DomainError> {
    Ok(SessionListing {
        session: row_to_session(row)?,
        tutor_name: row
            .try_get("tutor_name")
            .map_err(|e| DomainError::database("get tutor_name", e))?,
        active_registrations: count(row, "active_registrations")?,
    })
}

#[async_trait]
impl ScheduleReader for PostgresScheduleReader {
    async fn available_sessions(&self, today: NaiveDate) -> Result<Vec<SessionListing>, DomainError> {
        self.listings("s.status = 'active' AND s.date >= $1", None, Some(today), None)
            .await
    }

    async fn tutor_sessions(
        &self,
        tutor_id: &TutorId,
        today: NaiveDate,
    ) -> Result<Vec<SessionListing>, DomainError> {
        self.listings(
            "s.tutor_id = $1 AND s.status = 'active' AND s.date >= $2",
            Some(tutor_id),
            Some(today),
            None,
        )
        .await
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<SessionListing>, DomainError> {
        Ok(self
            .listings("s.id = $1", None, None, Some(id))
            .await?
            .into_iter()
            .next())
    }

    async fn pending_requests(&self, viewer: &StudentId) -> Result<Vec<PendingRequestView>, DomainError> {
        let sql = format!(
            "SELECT {}, \
                    (SELECT COUNT(*) FROM request_participations p \
                      WHERE p.request_id = r.id) AS participant_count, \
                    EXISTS (SELECT 1 FROM request_participations p \
                      WHERE p.request_id = r.id AND p.student_id = $1) AS viewer_participates \
             FROM session_requests r \
             WHERE r.status = 'pending' \
             ORDER BY r.created_on DESC, r.id DESC",
            REQUEST_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(viewer.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database("fetch pending requests", e))?;

        rows.iter()
            .map(|row| {
                Ok(PendingRequestView {
                    request: row_to_request(row)?,
                    participant_count: count(row, "participant_count")?,
                    viewer_participates: row
                        .try_get("viewer_participates")
                        .map_err(|e| DomainError::database("get viewer_participates", e))?,
                })
            })
            .collect()
    }

    async fn student_schedule(
        &self,
        student_id: &StudentId,
        today: NaiveDate,
    ) -> Result<Vec<ScheduledSessionView>, DomainError> {
        let sql = format!(
            "SELECT {}, t.name AS tutor_name, g.registered_on \
             FROM registrations g \
             JOIN sessions s ON s.id = g.session_id \
             JOIN tutors t ON t.id = s.tutor_id \
             WHERE g.student_id = $1 AND g.status = 'registered' \
               AND s.status = 'active' AND s.date >= $2 \
             ORDER BY s.date, s.start_time, s.id",
            SESSION_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(student_id.as_str())
            .bind(today)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database("fetch student schedule", e))?;

        let ids: Vec<String> = rows
            .iter()
            .map(|row| row.try_get::<String, _>("id"))
            .collect::<Result<_, _>>()
            .map_err(|e| DomainError::database("get id", e))?;
        let mut updates = self.updates_for(&ids).await?;

        rows.iter()
            .map(|row| {
                let session = row_to_session(row)?;
                Ok(ScheduledSessionView {
                    updates: updates.remove(session.id().as_str()).unwrap_or_default(),
                    tutor_name: row
                        .try_get("tutor_name")
                        .map_err(|e| DomainError::database("get tutor_name", e))?,
                    registered_on: row
                        .try_get("registered_on")
                        .map_err(|e| DomainError::database("get registered_on", e))?,
                    session,
                })
            })
            .collect()
    }

    async fn session_history(&self, session_id: &SessionId) -> Result<Vec<SessionUpdate>, DomainError> {
        let ids = [session_id.as_str().to_string()];
        Ok(self
            .updates_for(&ids)
            .await?
            .remove(session_id.as_str())
            .unwrap_or_default())
    }

    async fn session_cancellations(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<Cancellation>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT session_id, student_id, reason, cancelled_at
            FROM cancellations
            WHERE session_id = $1
            ORDER BY cancelled_at, id
            "#,
        )
        .bind(session_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("fetch cancellations", e))?;
        rows.iter().map(row_to_cancellation).collect()
    }

    async fn session_roster(&self, session_id: &SessionId) -> Result<Vec<RosterEntry>, DomainError> {
        let sql = format!(
            "SELECT {}, st.name, st.email \
             FROM registrations g \
             JOIN students st ON st.id = g.student_id \
             WHERE g.session_id = $1 AND g.status = 'registered' \
             ORDER BY g.registered_on, g.id",
            REGISTRATION_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(session_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database("fetch roster", e))?;

        rows.iter()
            .map(|row| {
                let registration = row_to_registration(row)?;
                let student = Student {
                    id: registration.student_id().clone(),
                    name: row
                        .try_get("name")
                        .map_err(|e| DomainError::database("get name", e))?,
                    email: row
                        .try_get("email")
                        .map_err(|e| DomainError::database("get email", e))?,
                };
                Ok(RosterEntry {
                    registration,
                    student,
                })
            })
            .collect()
    }
}

