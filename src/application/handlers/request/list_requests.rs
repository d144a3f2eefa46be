//! ListRequestsHandler - Query handler for pending requests.

use std::sync::Arc;

use crate::domain::foundation::StudentId;
use crate::domain::scheduling::SchedulingError;
use crate::ports::{PendingRequestView, ScheduleReader};

/// Handler for listing pending requests.
pub struct ListRequestsHandler {
    reader: Arc<dyn ScheduleReader>,
}

impl ListRequestsHandler {
    pub fn new(reader: Arc<dyn ScheduleReader>) -> Self {
        Self { reader }
    }

    /// Pending requests, newest first, flagged with the viewer's participation.
    pub async fn handle(
        &self,
        viewer: &StudentId,
    ) -> Result<Vec<PendingRequestView>, SchedulingError> {
        Ok(self.reader.pending_requests(viewer).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::InMemorySchedulingStore;
    use crate::application::handlers::request::{SubmitRequestCommand, SubmitRequestHandler};
    use crate::domain::account::Student;
    use crate::domain::foundation::Level;
    use crate::domain::request::RequestTopic;
    use crate::domain::scheduling::SchedulingPolicy;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn listing_flags_viewer_participation() {
        let store = Arc::new(InMemorySchedulingStore::new());
        for n in 1..=2 {
            store
                .seed_student(Student {
                    id: StudentId::new(format!("st_00{n}")).unwrap(),
                    name: format!("Student {n}"),
                    email: format!("s{n}@example.com"),
                })
                .await
                .unwrap();
        }
        let clock = Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2026, 11, 1).unwrap()));
        let submit = SubmitRequestHandler::new(store.clone(), clock, SchedulingPolicy::default());
        submit
            .submit(SubmitRequestCommand {
                student_id: StudentId::new("st_001").unwrap(),
                topic: RequestTopic {
                    subject: "History".into(),
                    topic: "Rome".into(),
                    level: Level::Beginner,
                    details: String::new(),
                },
            })
            .await
            .unwrap();

        let list = ListRequestsHandler::new(store);
        let mine = list.handle(&StudentId::new("st_001").unwrap()).await.unwrap();
        let theirs = list.handle(&StudentId::new("st_002").unwrap()).await.unwrap();

        assert_eq!(mine.len(), 1);
        assert!(mine[0].viewer_participates);
        assert_eq!(mine[0].participant_count, 1);
        assert!(!theirs[0].viewer_participates);
    }
}
