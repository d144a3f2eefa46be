//! StudentScheduleHandler - Query handler for a student's upcoming sessions.

use std::sync::Arc;

use crate::domain::foundation::StudentId;
use crate::domain::scheduling::SchedulingError;
use crate::ports::{Clock, ScheduleReader, ScheduledSessionView};

/// Handler for the student schedule view.
pub struct StudentScheduleHandler {
    reader: Arc<dyn ScheduleReader>,
    clock: Arc<dyn Clock>,
}

impl StudentScheduleHandler {
    pub fn new(reader: Arc<dyn ScheduleReader>, clock: Arc<dyn Clock>) -> Self {
        Self { reader, clock }
    }

    /// Upcoming active sessions the student holds a seat in, each with its
    /// update history.
    pub async fn handle(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<ScheduledSessionView>, SchedulingError> {
        Ok(self
            .reader
            .student_schedule(student_id, self.clock.today())
            .await?)
    }
}
