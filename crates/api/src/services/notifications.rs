//! Delivery of transition notifications after a write commits.

use domain::models::RepairRequest;
use domain::services::{
    build_notifications, Audience, NotificationResult, NotificationService, TransitionEvent,
};
use persistence::repositories::UserRepository;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::warn;

use crate::middleware::metrics::{record_notification, record_transition};

/// Resolves recipients and hands messages to the notification service.
#[derive(Clone)]
pub struct NotificationDispatcher {
    users: UserRepository,
    service: Arc<dyn NotificationService>,
}

impl NotificationDispatcher {
    pub fn new(pool: PgPool, service: Arc<dyn NotificationService>) -> Self {
        Self {
            users: UserRepository::new(pool),
            service,
        }
    }

    /// Sends notifications for `events` on a background task.
    ///
    /// Delivery is at-most-once; failures are logged and never reach the caller.
    pub fn dispatch(&self, request: RepairRequest, events: Vec<TransitionEvent>) {
        for event in &events {
            record_transition(event.name());
        }
        if events.is_empty() {
            return;
        }

        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.deliver(&request, &events).await;
        });
    }

    /// Sends notifications for `events` and returns how many were delivered.
    pub async fn deliver(&self, request: &RepairRequest, events: &[TransitionEvent]) -> usize {
        let mut delivered = 0;
        for event in events {
            let (owner_email, manager_emails) = match self.recipients(event, request).await {
                Ok(recipients) => recipients,
                Err(e) => {
                    warn!(
                        request_id = %request.id,
                        event = event.name(),
                        error = %e,
                        "Failed to resolve notification recipients"
                    );
                    continue;
                }
            };

            for notification in build_notifications(event, request, &owner_email, &manager_emails)
            {
                match self.service.send(&notification).await {
                    NotificationResult::Sent => {
                        record_notification(true);
                        delivered += 1;
                    }
                    NotificationResult::Failed(reason) => {
                        record_notification(false);
                        warn!(
                            request_id = %request.id,
                            event = notification.event,
                            recipient = %notification.recipient,
                            error = %reason,
                            "Notification delivery failed"
                        );
                    }
                }
            }
        }
        delivered
    }

    /// Owner e-mail and manager e-mails, loading only what the event needs.
    async fn recipients(
        &self,
        event: &TransitionEvent,
        request: &RepairRequest,
    ) -> Result<(String, Vec<String>), sqlx::Error> {
        match event.audience() {
            Audience::Owner => {
                let owner_email = self
                    .users
                    .find_by_id(request.owner_id)
                    .await?
                    .map(|u| u.email)
                    .ok_or(sqlx::Error::RowNotFound)?;
                Ok((owner_email, Vec::new()))
            }
            Audience::Managers => Ok((String::new(), self.users.manager_emails().await?)),
        }
    }
}
