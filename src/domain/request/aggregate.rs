//! Topic request aggregate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, Level, RequestId, RequestStatus, StateMachine, StudentId,
};
use crate::domain::scheduling::{validate_details, validate_label};

/// Student-supplied fields of a new topic request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTopic {
    pub subject: String,
    pub topic: String,
    pub level: Level,
    #[serde(default)]
    pub details: String,
}

impl RequestTopic {
    /// Trims and validates every field.
    pub fn normalized(self) -> Result<Self, DomainError> {
        Ok(Self {
            subject: validate_label("subject", &self.subject)?,
            topic: validate_label("topic", &self.topic)?,
            details: validate_details(&self.details)?,
            level: self.level,
        })
    }
}

/// A pending interest in a topic, shared by one or more students.
///
/// # Invariants
///
/// - at most one pending request exists per case-insensitive
///   (subject, topic) and level
/// - fulfilled exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    id: RequestId,
    student_id: StudentId,
    subject: String,
    topic: String,
    level: Level,
    details: String,
    created_on: NaiveDate,
    status: RequestStatus,
}

impl SessionRequest {
    /// Opens a new pending request owned by `student_id`.
    pub fn new(
        id: RequestId,
        student_id: StudentId,
        topic: RequestTopic,
        created_on: NaiveDate,
    ) -> Result<Self, DomainError> {
        let topic = topic.normalized()?;
        Ok(Self {
            id,
            student_id,
            subject: topic.subject,
            topic: topic.topic,
            level: topic.level,
            details: topic.details,
            created_on,
            status: RequestStatus::Pending,
        })
    }

    /// Reconstitute a request from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: RequestId,
        student_id: StudentId,
        subject: String,
        topic: String,
        level: Level,
        details: String,
        created_on: NaiveDate,
        status: RequestStatus,
    ) -> Self {
        Self {
            id,
            student_id,
            subject,
            topic,
            level,
            details,
            created_on,
            status,
        }
    }

    pub fn id(&self) -> &RequestId {
        &self.id
    }

    /// The student who opened the request.
    pub fn student_id(&self) -> &StudentId {
        &self.student_id
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

    pub fn created_on(&self) -> NaiveDate {
        self.created_on
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    /// Case-insensitive match on subject and topic, exact on level.
    pub fn matches(&self, subject: &str, topic: &str, level: Level) -> bool {
        self.level == level
            && self.subject.to_lowercase() == subject.trim().to_lowercase()
            && self.topic.to_lowercase() == topic.trim().to_lowercase()
    }

    /// Marks the request fulfilled.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if already fulfilled
    pub fn fulfill(&mut self) -> Result<(), DomainError> {
        self.status = self.status.transition_to(RequestStatus::Fulfilled)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic() -> RequestTopic {
        RequestTopic {
            subject: "Math".into(),
            topic: "Algebra".into(),
            level: Level::Beginner,
            details: String::new(),
        }
    }

    fn request() -> SessionRequest {
        SessionRequest::new(
            RequestId::new("req_001").unwrap(),
            StudentId::new("st_001").unwrap(),
            topic(),
            NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn new_request_is_pending() {
        assert_eq!(request().status(), RequestStatus::Pending);
    }

    #[test]
    fn matching_ignores_case_but_not_level() {
        let req = request();
        assert!(req.matches("math", "ALGEBRA", Level::Beginner));
        assert!(req.matches(" Math ", "Algebra", Level::Beginner));
        assert!(!req.matches("Math", "Algebra", Level::Advanced));
        assert!(!req.matches("Math", "Geometry", Level::Beginner));
    }

    #[test]
    fn fulfill_is_one_way() {
        let mut req = request();
        req.fulfill().unwrap();
        assert_eq!(req.status(), RequestStatus::Fulfilled);
        assert!(req.fulfill().is_err());
    }

    #[test]
    fn blank_topic_is_rejected() {
        let mut bad = topic();
        bad.topic = " ".into();
        assert!(bad.normalized().is_err());
    }
}
