//! Appointment booking
//!
//! Wraps `POST /appointments`. A successful booking changes doctor
//! availability, so every registered dependent cache is invalidated.

use std::sync::Arc;

use crate::api::models::{Appointment, AppointmentRequest, MutationEnvelope};
use crate::api::{ApiClient, ApiError};
use crate::notify::{Notification, Notifier};
use crate::pagination::Invalidate;

pub struct BookingService {
    client: ApiClient,
    notifier: Arc<dyn Notifier>,
    dependents: Vec<Arc<dyn Invalidate>>,
}

impl BookingService {
    pub fn new(
        client: ApiClient,
        notifier: Arc<dyn Notifier>,
        dependents: Vec<Arc<dyn Invalidate>>,
    ) -> Self {
        Self {
            client,
            notifier,
            dependents,
        }
    }

    pub async fn create_appointment(
        &self,
        request: &AppointmentRequest,
    ) -> Result<MutationEnvelope<Appointment>, ApiError> {
        tracing::info!(
            pet_id = %request.pet_id,
            doctor_id = %request.doctor_id,
            date = %request.date,
            "Creating appointment"
        );

        match self.client.create_appointment(request).await {
            Ok(envelope) => {
                for dependent in &self.dependents {
                    dependent.invalidate_all();
                }
                let message = envelope
                    .message
                    .clone()
                    .unwrap_or_else(|| "Appointment booked".to_string());
                self.notifier.notify(Notification::success(message));
                Ok(envelope)
            }
            Err(e) => {
                self.notifier.notify(Notification::error(e.user_message()));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{MockNotifier, NotificationLevel};
    use chrono::{NaiveDate, NaiveTime};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl Invalidate for Counter {
        fn invalidate_all(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn request() -> AppointmentRequest {
        AppointmentRequest {
            pet_id: "pet-1".into(),
            doctor_id: "doc-1".into(),
            branch_id: "b1".into(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            note: None,
        }
    }

    #[tokio::test]
    async fn test_failed_booking_keeps_caches_and_notifies_error() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|n| n.level == NotificationLevel::Error)
            .times(1)
            .return_const(());

        let counter = Arc::new(Counter::default());
        // Nothing listens on port 1.
        let client = ApiClient::new("http://127.0.0.1:1", Duration::from_secs(2));
        let booking = BookingService::new(client, Arc::new(notifier), vec![counter.clone()]);

        let err = booking.create_appointment(&request()).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);
    }
}
