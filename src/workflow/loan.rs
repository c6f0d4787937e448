//! Loan application state machine

use chrono::NaiveDate;

use super::TransitionDenied;
use crate::models::enums::{ApprovalStage, LoanApplicationStatus};
use crate::models::loan_application::{LoanApplication, LoanApplicationItem};
use crate::validation::FieldErrors;

/// Actions that move a loan application between statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanAction {
    Submit,
    Approve(ApprovalStage),
    Reject,
    /// BPM staff hands the units over (creates open loan transactions)
    Issue,
    /// BPM staff accepts the units back (closes the transactions)
    Return,
    /// Administrative close-out after return
    Complete,
}

impl LoanAction {
    fn name(&self) -> &'static str {
        match self {
            LoanAction::Submit => "submit",
            LoanAction::Approve(ApprovalStage::Support) => "approve_support",
            LoanAction::Approve(ApprovalStage::Admin) => "approve_admin",
            LoanAction::Reject => "reject",
            LoanAction::Issue => "issue",
            LoanAction::Return => "return",
            LoanAction::Complete => "complete",
        }
    }
}

/// The transition table. Anything not listed is refused.
pub fn transition(
    current: LoanApplicationStatus,
    action: LoanAction,
) -> Result<LoanApplicationStatus, TransitionDenied> {
    use LoanApplicationStatus as S;

    match (current, action) {
        (S::Draft, LoanAction::Submit) => Ok(S::PendingSupport),
        (S::PendingSupport, LoanAction::Approve(ApprovalStage::Support)) => Ok(S::PendingAdmin),
        (S::PendingAdmin, LoanAction::Approve(ApprovalStage::Admin)) => Ok(S::Approved),
        (S::PendingSupport | S::PendingAdmin, LoanAction::Reject) => Ok(S::Rejected),
        (S::Approved, LoanAction::Issue) => Ok(S::Issued),
        (S::Issued, LoanAction::Return) => Ok(S::Returned),
        (S::Returned, LoanAction::Complete) => Ok(S::Completed),
        (current, action) => Err(TransitionDenied {
            current: current.as_str(),
            action: action.name(),
        }),
    }
}

/// Full pre-submission check. `today` is passed in so the rule stays a pure
/// function.
pub fn validate_for_submission(
    app: &LoanApplication,
    items: &[LoanApplicationItem],
    today: NaiveDate,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if !app.applicant_confirmed {
        errors.add(
            "applicant_confirmed",
            "Applicant confirmation is required before submission",
        );
    }
    if app.purpose.as_deref().map_or(true, |p| p.trim().is_empty()) {
        errors.add("purpose", "Purpose is required");
    }
    if app.location.as_deref().map_or(true, |l| l.trim().is_empty()) {
        errors.add("location", "Usage location is required");
    }

    match (app.loan_start_date, app.loan_end_date) {
        (None, _) => errors.add("loan_start_date", "Loan start date is required"),
        (Some(start), _) if start < today => {
            errors.add("loan_start_date", "Loan start date must not be in the past");
        }
        _ => {}
    }
    match (app.loan_start_date, app.loan_end_date) {
        (_, None) => errors.add("loan_end_date", "Loan end date is required"),
        (Some(start), Some(end)) if end < start => {
            errors.add(
                "loan_end_date",
                "Loan end date must not be earlier than the start date",
            );
        }
        _ => {}
    }

    if !app.applicant_is_responsible && app.responsible_officer_id.is_none() {
        errors.add(
            "responsible_officer_id",
            "A responsible officer is required unless the applicant is responsible",
        );
    }

    if items.is_empty() {
        errors.add("items", "At least one equipment item is required");
    }
    for (index, item) in items.iter().enumerate() {
        if item.quantity < 1 {
            errors.add(
                &format!("items[{}].quantity", index),
                "Quantity must be at least 1",
            );
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::AssetType;
    use chrono::Utc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn draft() -> LoanApplication {
        LoanApplication {
            id: 1,
            user_id: 10,
            purpose: Some("Site visit to Langkawi".to_string()),
            location: Some("Langkawi".to_string()),
            loan_start_date: Some(today()),
            loan_end_date: Some(today() + chrono::Duration::days(4)),
            applicant_is_responsible: true,
            responsible_officer_id: None,
            applicant_confirmed: true,
            confirmed_at: Some(Utc::now()),
            status: LoanApplicationStatus::Draft,
            rejection_reason: None,
            submitted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn one_laptop() -> Vec<LoanApplicationItem> {
        vec![LoanApplicationItem {
            id: 1,
            loan_application_id: 1,
            equipment_type: AssetType::Laptop,
            quantity: 1,
            notes: None,
            position: 0,
        }]
    }

    #[test]
    fn happy_path_reaches_completed() {
        use LoanApplicationStatus as S;

        let mut status = S::Draft;
        for action in [
            LoanAction::Submit,
            LoanAction::Approve(ApprovalStage::Support),
            LoanAction::Approve(ApprovalStage::Admin),
            LoanAction::Issue,
            LoanAction::Return,
            LoanAction::Complete,
        ] {
            status = transition(status, action).expect("transition in table");
        }
        assert_eq!(status, S::Completed);
    }

    #[test]
    fn issue_requires_approved() {
        assert!(transition(LoanApplicationStatus::PendingAdmin, LoanAction::Issue).is_err());
        assert!(transition(LoanApplicationStatus::Issued, LoanAction::Issue).is_err());
    }

    #[test]
    fn terminal_states_refuse_everything() {
        for action in [LoanAction::Submit, LoanAction::Issue, LoanAction::Reject] {
            assert!(transition(LoanApplicationStatus::Completed, action).is_err());
            assert!(transition(LoanApplicationStatus::Rejected, action).is_err());
        }
    }

    #[test]
    fn end_before_start_flags_end_date_field() {
        let mut app = draft();
        app.loan_end_date = Some(today() - chrono::Duration::days(1));

        let errors = validate_for_submission(&app, &one_laptop(), today());
        assert!(errors.contains("loan_end_date"));
        assert!(!errors.contains("loan_start_date"));
    }

    #[test]
    fn start_in_the_past_is_rejected() {
        let mut app = draft();
        app.loan_start_date = Some(today() - chrono::Duration::days(2));

        let errors = validate_for_submission(&app, &one_laptop(), today());
        assert!(errors.contains("loan_start_date"));
    }

    #[test]
    fn responsible_officer_required_when_not_self() {
        let mut app = draft();
        app.applicant_is_responsible = false;

        let errors = validate_for_submission(&app, &one_laptop(), today());
        assert!(errors.contains("responsible_officer_id"));

        app.responsible_officer_id = Some(22);
        assert!(validate_for_submission(&app, &one_laptop(), today()).is_empty());
    }

    #[test]
    fn at_least_one_item_is_required() {
        let errors = validate_for_submission(&draft(), &[], today());
        assert!(errors.contains("items"));
    }

    #[test]
    fn confirmation_gate_blocks_submission() {
        let mut app = draft();
        app.applicant_confirmed = false;

        let errors = validate_for_submission(&app, &one_laptop(), today());
        assert!(errors.contains("applicant_confirmed"));
    }
}
