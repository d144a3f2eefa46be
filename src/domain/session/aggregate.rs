//! Session aggregate entity.
//!
//! A session is a single, fixed-duration tutoring meeting owned by one
//! tutor. Only the owning tutor may edit or cancel it, and only while it
//! is active.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::changes::{format_date, format_time};
use super::{AuditedField, DeliveryMode, FieldChange, SessionChange};
use crate::domain::foundation::{
    DomainError, ErrorCode, Level, RequestId, SessionId, SessionStatus, StateMachine, TutorId,
    ValidationError,
};
use crate::domain::scheduling::{validate_details, validate_label, TimeSlot};

/// Tutor-supplied fields of a new session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDetails {
    pub subject: String,
    pub topic: String,
    pub level: Level,
    #[serde(default)]
    pub details: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    #[serde(flatten)]
    pub mode: DeliveryMode,
}

impl SessionDetails {
    /// Validates the timing fields and returns the slot they describe.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the date is before `today`, the duration is
    ///   outside `1..=max_duration_minutes`, or the session crosses midnight
    pub fn time_slot(&self, today: NaiveDate, max_duration_minutes: u32) -> Result<TimeSlot, DomainError> {
        validate_date(self.date, today)?;
        validate_duration(self.duration_minutes, max_duration_minutes)?;
        Ok(TimeSlot::new(self.date, self.start_time, self.duration_minutes)?)
    }

    fn normalized(self) -> Result<Self, ValidationError> {
        Ok(Self {
            subject: validate_label("subject", &self.subject)?,
            topic: validate_label("topic", &self.topic)?,
            details: validate_details(&self.details)?,
            mode: self.mode.validated()?,
            ..self
        })
    }
}

/// Scheduling fields a tutor supplies when fulfilling a request.
///
/// The subject, topic, level and details always come from the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSchedule {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    #[serde(flatten)]
    pub mode: DeliveryMode,
}

impl SessionSchedule {
    /// Combines this schedule with the requested topic.
    pub fn for_topic(self, subject: &str, topic: &str, level: Level, details: &str) -> SessionDetails {
        SessionDetails {
            subject: subject.to_string(),
            topic: topic.to_string(),
            level,
            details: details.to_string(),
            date: self.date,
            start_time: self.start_time,
            duration_minutes: self.duration_minutes,
            mode: self.mode,
        }
    }

    /// Validates the timing fields and returns the slot they describe.
    pub fn time_slot(&self, today: NaiveDate, max_duration_minutes: u32) -> Result<TimeSlot, DomainError> {
        validate_date(self.date, today)?;
        validate_duration(self.duration_minutes, max_duration_minutes)?;
        Ok(TimeSlot::new(self.date, self.start_time, self.duration_minutes)?)
    }
}

fn validate_date(date: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    if date < today {
        return Err(ValidationError::invalid_format(
            "date",
            "session date cannot be in the past",
        ));
    }
    Ok(())
}

fn validate_duration(minutes: u32, max: u32) -> Result<(), ValidationError> {
    if minutes == 0 || minutes > max {
        return Err(ValidationError::out_of_range(
            "duration_minutes",
            1,
            i64::from(max),
            i64::from(minutes),
        ));
    }
    Ok(())
}

/// Session aggregate.
///
/// # Invariants
///
/// - `slot.end` is always `slot.start + duration_minutes` on `slot.date`
/// - exactly one of link/location is present, matching the mode
/// - cancelled sessions cannot be modified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    tutor_id: TutorId,
    subject: String,
    topic: String,
    level: Level,
    details: String,
    slot: TimeSlot,
    duration_minutes: u32,
    mode: DeliveryMode,
    status: SessionStatus,
    request_id: Option<RequestId>,
}

impl Session {
    /// Creates a new active session posted directly by a tutor.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if any field is invalid
    pub fn new(
        id: SessionId,
        tutor_id: TutorId,
        details: SessionDetails,
        today: NaiveDate,
        max_duration_minutes: u32,
    ) -> Result<Self, DomainError> {
        Self::build(id, tutor_id, details, None, today, max_duration_minutes)
    }

    /// Creates a new active session that fulfills a pending request.
    pub fn from_request(
        id: SessionId,
        tutor_id: TutorId,
        details: SessionDetails,
        request_id: RequestId,
        today: NaiveDate,
        max_duration_minutes: u32,
    ) -> Result<Self, DomainError> {
        Self::build(id, tutor_id, details, Some(request_id), today, max_duration_minutes)
    }

    fn build(
        id: SessionId,
        tutor_id: TutorId,
        details: SessionDetails,
        request_id: Option<RequestId>,
        today: NaiveDate,
        max_duration_minutes: u32,
    ) -> Result<Self, DomainError> {
        let details = details.normalized()?;
        let slot = details.time_slot(today, max_duration_minutes)?;
        Ok(Self {
            id,
            tutor_id,
            subject: details.subject,
            topic: details.topic,
            level: details.level,
            details: details.details,
            slot,
            duration_minutes: details.duration_minutes,
            mode: details.mode,
            status: SessionStatus::Active,
            request_id,
        })
    }

    /// Reconstitute a session from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        tutor_id: TutorId,
        subject: String,
        topic: String,
        level: Level,
        details: String,
        slot: TimeSlot,
        duration_minutes: u32,
        mode: DeliveryMode,
        status: SessionStatus,
        request_id: Option<RequestId>,
    ) -> Self {
        Self {
            id,
            tutor_id,
            subject,
            topic,
            level,
            details,
            slot,
            duration_minutes,
            mode,
            status,
            request_id,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn tutor_id(&self) -> &TutorId {
        &self.tutor_id
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn slot(&self) -> TimeSlot {
        self.slot
    }

    pub fn date(&self) -> NaiveDate {
        self.slot.date()
    }

    pub fn start_time(&self) -> NaiveTime {
        self.slot.start()
    }

    /// Derived from start time and duration.
    pub fn end_time(&self) -> NaiveTime {
        self.slot.end()
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn mode(&self) -> &DeliveryMode {
        &self.mode
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// True if the session was created by fulfilling a request.
    pub fn from_request_flag(&self) -> bool {
        self.request_id.is_some()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Active and dated today or later.
    pub fn is_bookable(&self, today: NaiveDate) -> bool {
        self.status.is_active() && self.date() >= today
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authorization
    // ─────────────────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// - `Forbidden` if `tutor_id` does not own this session
    pub fn authorize(&self, tutor_id: &TutorId) -> Result<(), DomainError> {
        if &self.tutor_id == tutor_id {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                format!("Tutor {} does not own session {}", tutor_id, self.id),
            ))
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Applies a batch of edits atomically and reports every column that
    /// actually changed, derived columns included.
    ///
    /// Nothing is applied if any edit fails validation. Edits that leave a
    /// value unchanged produce no entry.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the session is cancelled
    /// - `ValidationFailed` if any edit is invalid
    pub fn apply_changes(
        &mut self,
        changes: &[SessionChange],
        today: NaiveDate,
        max_duration_minutes: u32,
    ) -> Result<Vec<FieldChange>, DomainError> {
        self.ensure_active()?;

        let mut next = self.clone();
        let mut date = self.date();
        let mut start = self.start_time();

        for change in changes {
            match change {
                SessionChange::Subject(v) => next.subject = validate_label("subject", v)?,
                SessionChange::Topic(v) => next.topic = validate_label("topic", v)?,
                SessionChange::Level(v) => next.level = *v,
                SessionChange::Details(v) => next.details = validate_details(v)?,
                SessionChange::Date(v) => {
                    if *v != self.date() {
                        validate_date(*v, today)?;
                    }
                    date = *v;
                }
                SessionChange::StartTime(v) => start = *v,
                SessionChange::Duration(v) => {
                    validate_duration(*v, max_duration_minutes)?;
                    next.duration_minutes = *v;
                }
                SessionChange::Mode(v) => next.mode = v.clone().validated()?,
            }
        }
        next.slot = TimeSlot::new(date, start, next.duration_minutes)?;

        let diff = self.diff(&next);
        *self = next;
        Ok(diff)
    }

    /// Withdraws the session.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if already cancelled
    pub fn cancel(&mut self) -> Result<FieldChange, DomainError> {
        let old = self.status;
        self.status = self.status.transition_to(SessionStatus::Cancelled)?;
        Ok(FieldChange {
            field: AuditedField::Status,
            old_value: Some(old.to_string()),
            new_value: Some(self.status.to_string()),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn ensure_active(&self) -> Result<(), DomainError> {
        if self.status.is_active() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Cannot modify a cancelled session",
            ))
        }
    }

    fn diff(&self, next: &Session) -> Vec<FieldChange> {
        let s = |v: &str| Some(v.to_string());
        let opt = |v: Option<&str>| v.map(str::to_string);
        [
            FieldChange::diff(AuditedField::Subject, s(self.subject.as_str()), s(next.subject.as_str())),
            FieldChange::diff(AuditedField::Topic, s(self.topic.as_str()), s(next.topic.as_str())),
            FieldChange::diff(
                AuditedField::Level,
                s(self.level.as_str()),
                s(next.level.as_str()),
            ),
            FieldChange::diff(AuditedField::Details, s(self.details.as_str()), s(next.details.as_str())),
            FieldChange::diff(
                AuditedField::Date,
                Some(format_date(self.date())),
                Some(format_date(next.date())),
            ),
            FieldChange::diff(
                AuditedField::StartTime,
                Some(format_time(self.start_time())),
                Some(format_time(next.start_time())),
            ),
            FieldChange::diff(
                AuditedField::Duration,
                Some(self.duration_minutes.to_string()),
                Some(next.duration_minutes.to_string()),
            ),
            FieldChange::diff(
                AuditedField::EndTime,
                Some(format_time(self.end_time())),
                Some(format_time(next.end_time())),
            ),
            FieldChange::diff(AuditedField::Mode, s(self.mode.kind()), s(next.mode.kind())),
            FieldChange::diff(
                AuditedField::Location,
                opt(self.mode.location()),
                opt(next.mode.location()),
            ),
            FieldChange::diff(
                AuditedField::OnlineLink,
                opt(self.mode.online_link()),
                opt(next.mode.online_link()),
            ),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
