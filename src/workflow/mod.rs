//! Application lifecycle core
//!
//! Status transitions are driven by explicit transition tables rather than
//! free-form status writes: an action either maps `(current, action)` to the
//! next status or is refused with a conflict. Authorization is a pure
//! function of the actor and the requested capability.

pub mod email;
pub mod ledger;
pub mod loan;

use crate::error::AppError;
use crate::models::enums::{ApprovalStage, Role};
use crate::models::user::Actor;

/// A transition absent from the table. Distinct from validation errors:
/// the request was well-formed, the entity's state does not permit it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionDenied {
    pub current: &'static str,
    pub action: &'static str,
}

impl From<TransitionDenied> for AppError {
    fn from(denied: TransitionDenied) -> Self {
        AppError::Conflict(format!(
            "Action '{}' is not permitted from status '{}'",
            denied.action, denied.current
        ))
    }
}

/// Capabilities a state-mutating action may demand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Decide an approval stage
    Decide(ApprovalStage),
    /// Hand equipment over / accept it back
    ManageIssuance,
    /// Run or retry account provisioning
    Provision,
    /// Edit attendance records and run sheet imports
    ManageAttendance,
}

/// Pure allow/deny check. Admins hold every capability.
pub fn allows(actor: &Actor, capability: Capability) -> bool {
    if actor.role == Role::Admin {
        return true;
    }
    match capability {
        Capability::Decide(ApprovalStage::Support) => actor.is_approver,
        Capability::Decide(ApprovalStage::Admin) => false,
        Capability::ManageIssuance => actor.role == Role::BpmStaff,
        Capability::Provision => false,
        Capability::ManageAttendance => actor.role == Role::BpmStaff,
    }
}

/// `allows` as a result, for `?` chaining in services
pub fn require(actor: &Actor, capability: Capability) -> Result<(), AppError> {
    if allows(actor, capability) {
        Ok(())
    } else {
        Err(AppError::Authorization(format!(
            "user {} lacks capability {:?}",
            actor.user_id, capability
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role, is_approver: bool) -> Actor {
        Actor {
            user_id: 7,
            role,
            grade_level: 41,
            is_approver,
        }
    }

    #[test]
    fn support_stage_needs_approver_grade() {
        assert!(allows(
            &actor(Role::Staff, true),
            Capability::Decide(ApprovalStage::Support)
        ));
        assert!(!allows(
            &actor(Role::Staff, false),
            Capability::Decide(ApprovalStage::Support)
        ));
    }

    #[test]
    fn admin_stage_is_admin_only() {
        assert!(!allows(
            &actor(Role::Approver, true),
            Capability::Decide(ApprovalStage::Admin)
        ));
        assert!(allows(
            &actor(Role::Admin, false),
            Capability::Decide(ApprovalStage::Admin)
        ));
    }

    #[test]
    fn issuance_is_bpm_or_admin() {
        assert!(allows(&actor(Role::BpmStaff, false), Capability::ManageIssuance));
        assert!(allows(&actor(Role::Admin, false), Capability::ManageIssuance));
        assert!(!allows(&actor(Role::Staff, false), Capability::ManageIssuance));
    }

    #[test]
    fn denial_reason_stays_generic_for_clients() {
        let err = require(&actor(Role::Staff, false), Capability::Provision).unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }
}
