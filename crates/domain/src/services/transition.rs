//! Request lifecycle authorization.
//!
//! A [`TransitionPolicy`] decides whether an actor may apply a patch to a
//! request, which status results and which notification intents fire.
//! Policies are pure: callers load the request under a row lock, ask the
//! policy for a [`Decision`], apply it and dispatch the events after commit.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::repair_request::OWNER_FIELDS;
use crate::models::{RepairRequest, RequestPatch, RequestStatus, Role};
use crate::DomainError;

/// Default reason attached to a rejection without a comment.
pub const DEFAULT_REJECTION_REASON: &str = "not specified";

/// Notification intent produced by an accepted transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionEvent {
    Submitted,
    Approved,
    Rejected { reason: String },
    Restored,
    MasterAssigned,
    Completed,
    ConfirmedByUser,
}

impl TransitionEvent {
    /// Stable name used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            TransitionEvent::Submitted => "request_submitted",
            TransitionEvent::Approved => "request_approved",
            TransitionEvent::Rejected { .. } => "request_rejected",
            TransitionEvent::Restored => "request_restored",
            TransitionEvent::MasterAssigned => "master_assigned",
            TransitionEvent::Completed => "request_completed",
            TransitionEvent::ConfirmedByUser => "confirmed_by_user",
        }
    }
}

/// Outcome of an authorized write.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub status: RequestStatus,
    pub completed_at: Option<DateTime<Utc>>,
    /// A new master assignment needs a fresh owner confirmation.
    pub clear_confirmation: bool,
    pub events: Vec<TransitionEvent>,
}

impl Decision {
    fn unchanged(request: &RepairRequest) -> Self {
        Self {
            status: request.status,
            completed_at: request.completed_at,
            clear_confirmation: false,
            events: Vec::new(),
        }
    }
}

/// Clock and configuration the rules depend on.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext {
    pub now: DateTime<Utc>,
    /// Time after `work_date` past which a manager may close without confirmation.
    pub grace: Duration,
}

impl TransitionContext {
    pub fn new(now: DateTime<Utc>, grace: Duration) -> Self {
        Self { now, grace }
    }
}

/// Result of the done-eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoneCheck {
    pub allowed: bool,
    pub reason: &'static str,
}

/// Whether a manager may move the request to `done`.
pub fn can_set_done(request: &RepairRequest, now: DateTime<Utc>, grace: Duration) -> DoneCheck {
    if request.user_confirmed {
        return DoneCheck {
            allowed: true,
            reason: "user confirmed completion",
        };
    }

    match request.work_date {
        Some(work_date) if now > work_date + grace => DoneCheck {
            allowed: true,
            reason: "grace period elapsed",
        },
        _ => DoneCheck {
            allowed: false,
            reason: "not confirmed by user and grace period not elapsed",
        },
    }
}

/// Role-specific write rules.
pub trait TransitionPolicy: Send + Sync {
    /// Refuses fields the role may never write, naming the first one.
    ///
    /// Runs on the raw payload keys, so a forbidden field is reported
    /// before its value is parsed or validated.
    fn check_fields(&self, fields: &[&str]) -> Result<(), DomainError>;

    fn authorize(
        &self,
        actor_id: Uuid,
        request: &RepairRequest,
        patch: &RequestPatch,
        ctx: &TransitionContext,
    ) -> Result<Decision, DomainError>;
}

/// Selects the policy for a role.
pub fn policy_for(role: Role) -> &'static dyn TransitionPolicy {
    match role {
        Role::Manager => &ManagerPolicy,
        Role::Student | Role::Lecturer => &OwnerPolicy,
    }
}

/// Rule applied to a manager status write `(from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerRule {
    /// Target equals current status.
    NoOp,
    /// Any other write without side effects.
    Plain,
    Approve,
    Restore,
    Reject,
    Complete,
}

/// Manager status transition table.
pub fn manager_rule(from: RequestStatus, to: RequestStatus) -> ManagerRule {
    use RequestStatus::*;

    match (from, to) {
        (from, to) if from == to => ManagerRule::NoOp,
        (_, Done) => ManagerRule::Complete,
        (_, Rejected) => ManagerRule::Reject,
        (Done, Approved) => ManagerRule::Restore,
        (_, Approved) => ManagerRule::Approve,
        (_, Empty | Pending | OnCheck) => ManagerRule::Plain,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ManagerPolicy;

impl TransitionPolicy for ManagerPolicy {
    fn check_fields(&self, fields: &[&str]) -> Result<(), DomainError> {
        match fields
            .iter()
            .find(|f| OWNER_FIELDS.contains(f) || **f == "user_confirmed")
        {
            Some(field) => Err(DomainError::permission_denied(format!(
                "Managers cannot modify field '{}'",
                field
            ))),
            None => Ok(()),
        }
    }

    fn authorize(
        &self,
        _actor_id: Uuid,
        request: &RepairRequest,
        patch: &RequestPatch,
        ctx: &TransitionContext,
    ) -> Result<Decision, DomainError> {
        let touched = patch.touched_fields();
        if touched.is_empty() {
            return Err(DomainError::validation("No fields to update"));
        }
        self.check_fields(&touched)?;

        if patch.touches_master_fields() {
            if request.status != RequestStatus::Approved {
                return Err(DomainError::permission_denied(
                    "Master can only be assigned while the request is approved",
                ));
            }

            return Ok(Decision {
                status: RequestStatus::OnCheck,
                completed_at: request.completed_at,
                clear_confirmation: true,
                events: vec![TransitionEvent::MasterAssigned],
            });
        }

        let Some(target) = patch.status else {
            return Ok(Decision::unchanged(request));
        };

        let mut decision = Decision {
            status: target,
            completed_at: request.completed_at,
            clear_confirmation: false,
            events: Vec::new(),
        };

        match manager_rule(request.status, target) {
            ManagerRule::Plain => {}
            ManagerRule::NoOp => {
                // Re-rejecting with a new comment tells the owner the new reason.
                if target == RequestStatus::Rejected {
                    if let Some(Some(comment)) = &patch.rejection_comment {
                        if request.rejection_comment.as_ref() != Some(comment) {
                            decision.events.push(TransitionEvent::Rejected {
                                reason: comment.clone(),
                            });
                        }
                    }
                }
            }
            ManagerRule::Complete => {
                let check = can_set_done(request, ctx.now, ctx.grace);
                if !check.allowed {
                    return Err(DomainError::permission_denied(format!(
                        "Cannot mark request as done: {}",
                        check.reason
                    )));
                }
                decision.completed_at = request.completed_at.or(Some(ctx.now));
                decision.events.push(TransitionEvent::Completed);
            }
            ManagerRule::Reject => {
                let reason = match &patch.rejection_comment {
                    Some(comment) => comment.clone(),
                    None => request.rejection_comment.clone(),
                }
                .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());
                decision.events.push(TransitionEvent::Rejected { reason });
            }
            ManagerRule::Approve => decision.events.push(TransitionEvent::Approved),
            ManagerRule::Restore => decision.events.push(TransitionEvent::Restored),
        }

        Ok(decision)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerPolicy;

impl TransitionPolicy for OwnerPolicy {
    fn check_fields(&self, fields: &[&str]) -> Result<(), DomainError> {
        match fields.iter().find(|f| !OWNER_FIELDS.contains(f)) {
            Some(field) => Err(DomainError::permission_denied(format!(
                "Field '{}' cannot be modified by students or lecturers",
                field
            ))),
            None => Ok(()),
        }
    }

    fn authorize(
        &self,
        actor_id: Uuid,
        request: &RepairRequest,
        patch: &RequestPatch,
        _ctx: &TransitionContext,
    ) -> Result<Decision, DomainError> {
        ensure_owner(actor_id, request)?;

        let touched = patch.touched_fields();
        self.check_fields(&touched)?;
        if touched.is_empty() {
            return Err(DomainError::validation("No fields to update"));
        }

        let status = match request.status {
            RequestStatus::Empty | RequestStatus::Rejected => RequestStatus::Empty,
            other => {
                return Err(DomainError::permission_denied(format!(
                    "Request cannot be edited while it is {}",
                    other
                )))
            }
        };

        Ok(Decision {
            status,
            completed_at: request.completed_at,
            clear_confirmation: false,
            events: Vec::new(),
        })
    }
}

fn ensure_owner(actor_id: Uuid, request: &RepairRequest) -> Result<(), DomainError> {
    if request.is_owned_by(actor_id) {
        Ok(())
    } else {
        Err(DomainError::permission_denied(
            "Only the owner can modify this request",
        ))
    }
}

/// `empty -> pending`. Requires a description and at least one image.
pub fn authorize_submit(
    actor_id: Uuid,
    request: &RepairRequest,
    image_count: i64,
) -> Result<Decision, DomainError> {
    ensure_owner(actor_id, request)?;

    if request.status != RequestStatus::Empty {
        return Err(DomainError::permission_denied(format!(
            "Only empty requests can be submitted, current status is {}",
            request.status
        )));
    }
    if request.description.trim().is_empty() {
        return Err(DomainError::validation(
            "Description is required before submitting",
        ));
    }
    if image_count < 1 {
        return Err(DomainError::validation(
            "At least one image is required before submitting",
        ));
    }

    Ok(Decision {
        status: RequestStatus::Pending,
        completed_at: request.completed_at,
        clear_confirmation: false,
        events: vec![TransitionEvent::Submitted],
    })
}

/// Owner confirmation of completed work.
///
/// Returns the event to dispatch, or `None` when the request was already
/// confirmed.
pub fn authorize_confirm(
    actor_id: Uuid,
    request: &RepairRequest,
    now: DateTime<Utc>,
) -> Result<Option<TransitionEvent>, DomainError> {
    ensure_owner(actor_id, request)?;

    if request.status != RequestStatus::OnCheck {
        return Err(DomainError::permission_denied(format!(
            "Only requests on check can be confirmed, current status is {}",
            request.status
        )));
    }
    if let Some(work_date) = request.work_date {
        if now < work_date {
            return Err(DomainError::permission_denied(
                "Work date has not arrived yet",
            ));
        }
    }

    if request.user_confirmed {
        Ok(None)
    } else {
        Ok(Some(TransitionEvent::ConfirmedByUser))
    }
}
