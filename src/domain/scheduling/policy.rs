//! Tunable scheduling rules.

use super::{ConflictOverride, ConflictScope, ConflictingSession, SchedulingError};
use crate::domain::foundation::{IdentifierGenerator, DEFAULT_IDENTIFIER_WIDTH};

/// Default upper bound on a session's duration (eight hours).
pub const DEFAULT_MAX_DURATION_MINUTES: u32 = 480;

/// Rules the engine applies to every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulingPolicy {
    /// Zero-padded width of generated identifiers.
    pub identifier_width: usize,
    /// Whether a tutor may knowingly schedule over their own sessions.
    pub allow_tutor_override: bool,
    /// Longest session a tutor may post.
    pub max_duration_minutes: u32,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            identifier_width: DEFAULT_IDENTIFIER_WIDTH,
            allow_tutor_override: true,
            max_duration_minutes: DEFAULT_MAX_DURATION_MINUTES,
        }
    }
}

impl SchedulingPolicy {
    pub fn identifiers(&self) -> IdentifierGenerator {
        IdentifierGenerator::new(self.identifier_width)
    }

    /// Decides whether detected conflicts block the operation.
    ///
    /// Student conflicts are always soft. Tutor conflicts are soft only
    /// when the policy allows tutor overrides.
    ///
    /// # Errors
    ///
    /// - `Conflict` carrying every conflicting session when the caller did
    ///   not opt in, or opted in where overriding is not allowed
    pub fn resolve(
        &self,
        scope: &ConflictScope,
        conflicts: Vec<ConflictingSession>,
        choice: ConflictOverride,
    ) -> Result<(), SchedulingError> {
        if conflicts.is_empty() {
            return Ok(());
        }
        let may_override = match scope {
            ConflictScope::Tutor(_) => self.allow_tutor_override,
            ConflictScope::Student(_) => true,
        };
        if may_override && choice.is_proceed() {
            Ok(())
        } else {
            Err(SchedulingError::Conflict { conflicts })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{SessionId, StudentId, TutorId};
    use chrono::{NaiveDate, NaiveTime};

    fn conflict() -> ConflictingSession {
        ConflictingSession {
            session_id: SessionId::new("sess_001").unwrap(),
            tutor_id: TutorId::new("ttr_001").unwrap(),
            subject: "Math".into(),
            topic: "Algebra".into(),
            date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        }
    }

    fn tutor() -> ConflictScope {
        ConflictScope::Tutor(TutorId::new("ttr_001").unwrap())
    }

    #[test]
    fn no_conflicts_always_passes() {
        let policy = SchedulingPolicy::default();
        assert!(policy.resolve(&tutor(), vec![], ConflictOverride::Reject).is_ok());
    }

    #[test]
    fn conflicts_block_without_override() {
        let policy = SchedulingPolicy::default();
        let err = policy
            .resolve(&tutor(), vec![conflict()], ConflictOverride::Reject)
            .unwrap_err();
        match err {
            SchedulingError::Conflict { conflicts } => assert_eq!(conflicts.len(), 1),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn tutor_override_respects_policy_switch() {
        let strict = SchedulingPolicy {
            allow_tutor_override: false,
            ..SchedulingPolicy::default()
        };
        assert!(SchedulingPolicy::default()
            .resolve(&tutor(), vec![conflict()], ConflictOverride::Proceed)
            .is_ok());
        assert!(strict
            .resolve(&tutor(), vec![conflict()], ConflictOverride::Proceed)
            .is_err());
    }

    #[test]
    fn student_override_is_always_allowed() {
        let strict = SchedulingPolicy {
            allow_tutor_override: false,
            ..SchedulingPolicy::default()
        };
        let student = ConflictScope::Student(StudentId::new("st_001").unwrap());
        assert!(strict
            .resolve(&student, vec![conflict()], ConflictOverride::Proceed)
            .is_ok());
    }
}
