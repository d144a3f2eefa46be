//! SchedulingEngine - one entry point for every scheduling operation.
//!
//! Built once from the store, reader, clock and policy, then shared by the
//! HTTP layer (and tests) behind an `Arc`.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, StudentId, TutorId};
use crate::domain::registration::Cancellation;
use crate::domain::scheduling::{SchedulingError, SchedulingPolicy};
use crate::domain::session::SessionUpdate;
use crate::ports::{
    Clock, PendingRequestView, RosterEntry, ScheduleReader, ScheduledSessionView,
    SchedulingStore, SessionListing,
};

use super::handlers::{
    CancelRegistrationCommand, CancelRegistrationHandler, CancelRegistrationResult,
    CancelSessionCommand, CancelSessionHandler, CancelSessionResult, CreateSessionCommand,
    CreateSessionHandler, CreateSessionResult, FulfillRequestCommand, FulfillRequestHandler,
    FulfillRequestResult, JoinRequestCommand, ListRequestsHandler, RegisterCommand,
    RegisterHandler, RegisterResult, RequestParticipationResult, SessionQueryHandler,
    StudentScheduleHandler, SubmitRequestCommand, SubmitRequestHandler, UpdateSessionCommand,
    UpdateSessionHandler, UpdateSessionResult,
};

/// Facade over the command and query handlers.
pub struct SchedulingEngine {
    create_session: CreateSessionHandler,
    update_session: UpdateSessionHandler,
    cancel_session: CancelSessionHandler,
    sessions: SessionQueryHandler,
    submit_request: SubmitRequestHandler,
    fulfill_request: FulfillRequestHandler,
    list_requests: ListRequestsHandler,
    register: RegisterHandler,
    cancel_registration: CancelRegistrationHandler,
    student_schedule: StudentScheduleHandler,
}

impl SchedulingEngine {
    pub fn new(
        store: Arc<dyn SchedulingStore>,
        reader: Arc<dyn ScheduleReader>,
        clock: Arc<dyn Clock>,
        policy: SchedulingPolicy,
    ) -> Self {
        Self {
            create_session: CreateSessionHandler::new(store.clone(), clock.clone(), policy.clone()),
            update_session: UpdateSessionHandler::new(store.clone(), clock.clone(), policy.clone()),
            cancel_session: CancelSessionHandler::new(store.clone(), clock.clone()),
            sessions: SessionQueryHandler::new(reader.clone(), clock.clone()),
            submit_request: SubmitRequestHandler::new(store.clone(), clock.clone(), policy.clone()),
            fulfill_request: FulfillRequestHandler::new(store.clone(), clock.clone(), policy.clone()),
            list_requests: ListRequestsHandler::new(reader.clone()),
            register: RegisterHandler::new(store.clone(), clock.clone(), policy),
            cancel_registration: CancelRegistrationHandler::new(store, clock.clone()),
            student_schedule: StudentScheduleHandler::new(reader, clock),
        }
    }

    // ─── Sessions ───────────────────────────────────────────────────────────

    pub async fn create_session(
        &self,
        cmd: CreateSessionCommand,
    ) -> Result<CreateSessionResult, SchedulingError> {
        self.create_session.handle(cmd).await
    }

    pub async fn update_session(
        &self,
        cmd: UpdateSessionCommand,
    ) -> Result<UpdateSessionResult, SchedulingError> {
        self.update_session.handle(cmd).await
    }

    pub async fn cancel_session(
        &self,
        cmd: CancelSessionCommand,
    ) -> Result<CancelSessionResult, SchedulingError> {
        self.cancel_session.handle(cmd).await
    }

    pub async fn available_sessions(&self) -> Result<Vec<SessionListing>, SchedulingError> {
        self.sessions.available_sessions().await
    }

    pub async fn tutor_sessions(
        &self,
        tutor_id: &TutorId,
    ) -> Result<Vec<SessionListing>, SchedulingError> {
        self.sessions.tutor_sessions(tutor_id).await
    }

    pub async fn get_session(&self, id: &SessionId) -> Result<SessionListing, SchedulingError> {
        self.sessions.get_session(id).await
    }

    pub async fn session_history(
        &self,
        id: &SessionId,
    ) -> Result<Vec<SessionUpdate>, SchedulingError> {
        self.sessions.session_history(id).await
    }

    pub async fn session_cancellations(
        &self,
        id: &SessionId,
        tutor_id: &TutorId,
    ) -> Result<Vec<Cancellation>, SchedulingError> {
        self.sessions.session_cancellations(id, tutor_id).await
    }

    pub async fn session_roster(
        &self,
        id: &SessionId,
        tutor_id: &TutorId,
    ) -> Result<Vec<RosterEntry>, SchedulingError> {
        self.sessions.session_roster(id, tutor_id).await
    }

    // ─── Requests ───────────────────────────────────────────────────────────

    pub async fn submit_request(
        &self,
        cmd: SubmitRequestCommand,
    ) -> Result<RequestParticipationResult, SchedulingError> {
        self.submit_request.submit(cmd).await
    }

    pub async fn join_request(
        &self,
        cmd: JoinRequestCommand,
    ) -> Result<RequestParticipationResult, SchedulingError> {
        self.submit_request.join(cmd).await
    }

    pub async fn fulfill_request(
        &self,
        cmd: FulfillRequestCommand,
    ) -> Result<FulfillRequestResult, SchedulingError> {
        self.fulfill_request.handle(cmd).await
    }

    pub async fn pending_requests(
        &self,
        viewer: &StudentId,
    ) -> Result<Vec<PendingRequestView>, SchedulingError> {
        self.list_requests.handle(viewer).await
    }

    // ─── Registrations ──────────────────────────────────────────────────────

    pub async fn register(&self, cmd: RegisterCommand) -> Result<RegisterResult, SchedulingError> {
        self.register.handle(cmd).await
    }

    pub async fn cancel_registration(
        &self,
        cmd: CancelRegistrationCommand,
    ) -> Result<CancelRegistrationResult, SchedulingError> {
        self.cancel_registration.handle(cmd).await
    }

    pub async fn student_schedule(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<ScheduledSessionView>, SchedulingError> {
        self.student_schedule.handle(student_id).await
    }
}
