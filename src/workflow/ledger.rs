//! Approval ledger derivation
//!
//! The ledger is read in ascending creation order. Submitting an application
//! seeds a pending row for the support stage; each stage approval appends a
//! decision row and seeds the next stage. The current stage is whatever
//! pending row has not yet been answered by a later decision for the same
//! stage; no open pending row means the application has moved past the
//! approval phase.

use crate::models::approval::Approval;
use crate::models::enums::{ApprovalDecision, ApprovalStage};

/// Derive the stage currently awaiting a decision
pub fn current_stage(rows: &[Approval]) -> Option<ApprovalStage> {
    let mut open: Option<ApprovalStage> = None;
    for row in rows {
        match row.decision {
            ApprovalDecision::Pending => open = Some(row.stage),
            ApprovalDecision::Approved | ApprovalDecision::Rejected => {
                if open == Some(row.stage) {
                    open = None;
                }
            }
        }
    }
    open
}

/// True once any stage has recorded a rejection
pub fn has_rejection(rows: &[Approval]) -> bool {
    rows.iter()
        .any(|row| row.decision == ApprovalDecision::Rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::ApplicationType;
    use chrono::{Duration, Utc};

    fn row(seq: i32, stage: ApprovalStage, decision: ApprovalDecision) -> Approval {
        Approval {
            id: seq,
            application_type: ApplicationType::Loan,
            application_id: 1,
            stage,
            officer_id: (decision != ApprovalDecision::Pending).then_some(99),
            decision,
            comment: None,
            created_at: Utc::now() + Duration::seconds(seq as i64),
        }
    }

    #[test]
    fn seeded_pending_row_is_the_current_stage() {
        let rows = vec![row(1, ApprovalStage::Support, ApprovalDecision::Pending)];
        assert_eq!(current_stage(&rows), Some(ApprovalStage::Support));
    }

    #[test]
    fn decision_closes_the_stage_and_next_seed_opens_it() {
        let rows = vec![
            row(1, ApprovalStage::Support, ApprovalDecision::Pending),
            row(2, ApprovalStage::Support, ApprovalDecision::Approved),
            row(3, ApprovalStage::Admin, ApprovalDecision::Pending),
        ];
        assert_eq!(current_stage(&rows), Some(ApprovalStage::Admin));
    }

    #[test]
    fn no_open_pending_means_past_the_approval_phase() {
        let rows = vec![
            row(1, ApprovalStage::Support, ApprovalDecision::Pending),
            row(2, ApprovalStage::Support, ApprovalDecision::Approved),
            row(3, ApprovalStage::Admin, ApprovalDecision::Pending),
            row(4, ApprovalStage::Admin, ApprovalDecision::Approved),
        ];
        assert_eq!(current_stage(&rows), None);
    }

    #[test]
    fn rejection_is_visible_in_history() {
        let rows = vec![
            row(1, ApprovalStage::Support, ApprovalDecision::Pending),
            row(2, ApprovalStage::Support, ApprovalDecision::Rejected),
        ];
        assert_eq!(current_stage(&rows), None);
        assert!(has_rejection(&rows));
    }

    #[test]
    fn empty_ledger_has_no_stage() {
        assert_eq!(current_stage(&[]), None);
    }
}
