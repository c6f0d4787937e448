//! Email application state machine

use super::TransitionDenied;
use crate::models::email_application::EmailApplication;
use crate::models::enums::{ApprovalStage, EmailApplicationStatus};
use crate::validation::FieldErrors;

/// Actions that move an email application between statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailAction {
    /// Requester submits the draft
    Submit,
    /// An officer approves the named stage
    Approve(ApprovalStage),
    /// An officer rejects (terminal, reason required)
    Reject,
    /// Admin hands the approved application to the directory backend
    StartProvisioning,
    ProvisionSucceeded,
    ProvisionFailed,
    /// Failed provisioning may be retried; the attempt counter grows
    RetryProvisioning,
}

impl EmailAction {
    fn name(&self) -> &'static str {
        match self {
            EmailAction::Submit => "submit",
            EmailAction::Approve(ApprovalStage::Support) => "approve_support",
            EmailAction::Approve(ApprovalStage::Admin) => "approve_admin",
            EmailAction::Reject => "reject",
            EmailAction::StartProvisioning => "start_provisioning",
            EmailAction::ProvisionSucceeded => "provision_succeeded",
            EmailAction::ProvisionFailed => "provision_failed",
            EmailAction::RetryProvisioning => "retry_provisioning",
        }
    }
}

/// The transition table. Anything not listed is refused; terminal states
/// (completed, rejected) accept nothing.
pub fn transition(
    current: EmailApplicationStatus,
    action: EmailAction,
) -> Result<EmailApplicationStatus, TransitionDenied> {
    use EmailApplicationStatus as S;

    match (current, action) {
        (S::Draft, EmailAction::Submit) => Ok(S::PendingSupport),
        (S::PendingSupport, EmailAction::Approve(ApprovalStage::Support)) => Ok(S::PendingAdmin),
        (S::PendingAdmin, EmailAction::Approve(ApprovalStage::Admin)) => Ok(S::Approved),
        (S::Approved, EmailAction::StartProvisioning) => Ok(S::Processing),
        (S::Processing, EmailAction::ProvisionSucceeded) => Ok(S::Completed),
        (S::Processing, EmailAction::ProvisionFailed) => Ok(S::ProvisionFailed),
        (S::ProvisionFailed, EmailAction::RetryProvisioning) => Ok(S::Processing),
        (S::PendingSupport | S::PendingAdmin | S::Processing, EmailAction::Reject) => {
            Ok(S::Rejected)
        }
        (current, action) => Err(TransitionDenied {
            current: current.as_str(),
            action: action.name(),
        }),
    }
}

/// Full pre-submission check, stricter than draft-update validation. Runs to
/// completion so every failing field is reported together.
pub fn validate_for_submission(app: &EmailApplication) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if !app.certification_accepted {
        errors.add(
            "certification_accepted",
            "Certification must be accepted before submission",
        );
    }
    if app.purpose.as_deref().map_or(true, |p| p.trim().is_empty()) {
        errors.add("purpose", "Purpose is required");
    }

    // Group mailbox fields are required together when any one is present
    let group_fields = [
        ("group_email", app.group_email.as_deref()),
        ("group_admin_name", app.group_admin_name.as_deref()),
        ("group_admin_email", app.group_admin_email.as_deref()),
    ];
    let any_group = group_fields.iter().any(|(_, v)| v.is_some());
    if any_group {
        for (field, value) in group_fields {
            if value.map_or(true, |v| v.trim().is_empty()) {
                errors.add(
                    field,
                    "All group mailbox fields are required when requesting a group email",
                );
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::ServiceStatus;
    use chrono::Utc;

    fn draft() -> EmailApplication {
        EmailApplication {
            id: 1,
            user_id: 10,
            service_status: ServiceStatus::Permanent,
            purpose: Some("New officer mailbox".to_string()),
            proposed_email: Some("rahim@motac.gov.my".to_string()),
            group_email: None,
            group_admin_name: None,
            group_admin_email: None,
            certification_accepted: true,
            certification_at: Some(Utc::now()),
            status: EmailApplicationStatus::Draft,
            rejection_reason: None,
            final_assigned_email: None,
            final_assigned_user_id: None,
            provisioned_at: None,
            provision_attempts: 0,
            provision_failure_reason: None,
            submitted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn happy_path_reaches_completed() {
        use EmailApplicationStatus as S;

        let mut status = S::Draft;
        for action in [
            EmailAction::Submit,
            EmailAction::Approve(ApprovalStage::Support),
            EmailAction::Approve(ApprovalStage::Admin),
            EmailAction::StartProvisioning,
            EmailAction::ProvisionSucceeded,
        ] {
            status = transition(status, action).expect("transition in table");
        }
        assert_eq!(status, S::Completed);
    }

    #[test]
    fn statuses_never_move_backwards() {
        // The only backward-looking edge is the explicit retry loop
        assert!(transition(
            EmailApplicationStatus::PendingAdmin,
            EmailAction::Approve(ApprovalStage::Support)
        )
        .is_err());
        assert!(transition(EmailApplicationStatus::Approved, EmailAction::Submit).is_err());
    }

    #[test]
    fn terminal_states_refuse_everything() {
        for action in [
            EmailAction::Submit,
            EmailAction::Approve(ApprovalStage::Admin),
            EmailAction::Reject,
            EmailAction::ProvisionSucceeded,
        ] {
            assert!(transition(EmailApplicationStatus::Completed, action).is_err());
            assert!(transition(EmailApplicationStatus::Rejected, action).is_err());
        }
    }

    #[test]
    fn second_approve_on_completed_is_a_conflict() {
        let denied = transition(
            EmailApplicationStatus::Completed,
            EmailAction::Approve(ApprovalStage::Admin),
        )
        .unwrap_err();
        assert_eq!(denied.current, "completed");
    }

    #[test]
    fn rejection_reachable_from_pending_and_processing() {
        for status in [
            EmailApplicationStatus::PendingSupport,
            EmailApplicationStatus::PendingAdmin,
            EmailApplicationStatus::Processing,
        ] {
            assert_eq!(
                transition(status, EmailAction::Reject).unwrap(),
                EmailApplicationStatus::Rejected
            );
        }
        assert!(transition(EmailApplicationStatus::Draft, EmailAction::Reject).is_err());
    }

    #[test]
    fn failed_provisioning_is_retryable() {
        let status = transition(
            EmailApplicationStatus::Processing,
            EmailAction::ProvisionFailed,
        )
        .unwrap();
        assert_eq!(status, EmailApplicationStatus::ProvisionFailed);
        assert_eq!(
            transition(status, EmailAction::RetryProvisioning).unwrap(),
            EmailApplicationStatus::Processing
        );
    }

    #[test]
    fn certification_gate_blocks_submission() {
        let mut app = draft();
        app.certification_accepted = false;

        let errors = validate_for_submission(&app);
        assert!(errors.contains("certification_accepted"));
    }

    #[test]
    fn group_fields_required_together() {
        let mut app = draft();
        app.group_email = Some("unit-ict@motac.gov.my".to_string());

        let errors = validate_for_submission(&app);
        assert!(errors.contains("group_admin_name"));
        assert!(errors.contains("group_admin_email"));
        assert!(!errors.contains("group_email"));

        app.group_admin_name = Some("Puan Salmah".to_string());
        app.group_admin_email = Some("salmah@motac.gov.my".to_string());
        assert!(validate_for_submission(&app).is_empty());
    }

    #[test]
    fn complete_draft_passes_submission_validation() {
        assert!(validate_for_submission(&draft()).is_empty());
    }
}
