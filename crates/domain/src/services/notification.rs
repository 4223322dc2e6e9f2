//! Notification intents and the service that delivers them.
//!
//! Transition events are turned into addressed [`Notification`]s here; the
//! API layer resolves e-mail addresses and hands each message to a
//! [`NotificationService`].

use std::sync::{Arc, Mutex};

use uuid::Uuid;

use super::transition::TransitionEvent;
use crate::models::RepairRequest;

/// Who receives a notification for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Owner,
    Managers,
}

impl TransitionEvent {
    pub fn audience(&self) -> Audience {
        match self {
            TransitionEvent::Submitted | TransitionEvent::ConfirmedByUser => Audience::Managers,
            TransitionEvent::Approved
            | TransitionEvent::Rejected { .. }
            | TransitionEvent::Restored
            | TransitionEvent::MasterAssigned
            | TransitionEvent::Completed => Audience::Owner,
        }
    }
}

/// An addressed message ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub request_id: Uuid,
    pub event: &'static str,
}

/// Renders subject and body for an event.
pub fn render(event: &TransitionEvent, request: &RepairRequest) -> (String, String) {
    let code = &request.code;
    let name = &request.name;

    match event {
        TransitionEvent::Submitted => (
            format!("New repair request #{}", code),
            format!(
                "Request #{} \"{}\" ({}) was submitted and awaits review.",
                code, name, request.type_request
            ),
        ),
        TransitionEvent::Approved => (
            format!("Request #{} approved", code),
            format!("Your request #{} \"{}\" was approved.", code, name),
        ),
        TransitionEvent::Rejected { reason } => (
            format!("Request #{} rejected", code),
            format!(
                "Your request #{} \"{}\" was rejected. Reason: {}. \
                 You can edit it and submit again.",
                code, name, reason
            ),
        ),
        TransitionEvent::Restored => (
            format!("Request #{} reopened", code),
            format!(
                "Your request #{} \"{}\" was reopened and is approved again.",
                code, name
            ),
        ),
        TransitionEvent::MasterAssigned => {
            let master = request
                .assigned_master_name
                .as_deref()
                .unwrap_or("a maintenance contact");
            let when = request
                .work_date
                .map(|d| format!(" Work is scheduled for {}.", d.format("%Y-%m-%d %H:%M UTC")))
                .unwrap_or_default();
            (
                format!("Master assigned to request #{}", code),
                format!(
                    "{} was assigned to your request #{} \"{}\".{}",
                    master, code, name, when
                ),
            )
        }
        TransitionEvent::Completed => (
            format!("Request #{} completed", code),
            format!("Your request #{} \"{}\" was marked as done.", code, name),
        ),
        TransitionEvent::ConfirmedByUser => (
            format!("Request #{} confirmed by user", code),
            format!(
                "The owner of request #{} \"{}\" confirmed the work was completed.",
                code, name
            ),
        ),
    }
}

/// Builds one notification per recipient of `event`.
pub fn build_notifications(
    event: &TransitionEvent,
    request: &RepairRequest,
    owner_email: &str,
    manager_emails: &[String],
) -> Vec<Notification> {
    let (subject, body) = render(event, request);

    let recipients: Vec<&str> = match event.audience() {
        Audience::Owner => vec![owner_email],
        Audience::Managers => manager_emails.iter().map(String::as_str).collect(),
    };

    recipients
        .into_iter()
        .map(|recipient| Notification {
            recipient: recipient.to_string(),
            subject: subject.clone(),
            body: body.clone(),
            request_id: request.id,
            event: event.name(),
        })
        .collect()
}

/// Result of a notification send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationResult {
    Sent,
    /// Delivery failed; callers log and move on.
    Failed(String),
}

/// Delivers notifications.
#[async_trait::async_trait]
pub trait NotificationService: Send + Sync {
    async fn send(&self, notification: &Notification) -> NotificationResult;
}

/// Records notifications in memory instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct MockNotificationService {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl MockNotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock service that simulates failures.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Notifications delivered so far.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl NotificationService for MockNotificationService {
    async fn send(&self, notification: &Notification) -> NotificationResult {
        if self.simulate_failure {
            tracing::warn!(
                recipient = %notification.recipient,
                request_id = %notification.request_id,
                "Mock notification service simulating failure"
            );
            return NotificationResult::Failed("Simulated failure".to_string());
        }

        tracing::info!(
            recipient = %notification.recipient,
            request_id = %notification.request_id,
            event = notification.event,
            "Mock: recorded notification"
        );

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification.clone());
        }
        NotificationResult::Sent
    }
}
