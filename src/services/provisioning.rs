//! Directory backend seam for account provisioning
//!
//! Provisioning talks to an external directory. The trait keeps the workflow
//! testable without that backend; the default client derives the mailbox
//! address deterministically, which is what the development environment runs
//! against.

use async_trait::async_trait;

use crate::models::email_application::{EmailApplication, ProvisionedAccount};
use crate::models::user::User;

/// Outcome of one provisioning call. An `Err` moves the application to its
/// failure status and surfaces as an external error.
pub type ProvisionResult = Result<ProvisionedAccount, String>;

#[async_trait]
pub trait EmailProvisioner: Send + Sync {
    async fn provision(&self, application: &EmailApplication, requester: &User)
        -> ProvisionResult;
}

/// Default directory client
#[derive(Debug, Clone, Default)]
pub struct DirectoryClient {
    pub domain: String,
}

impl DirectoryClient {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }
}

#[async_trait]
impl EmailProvisioner for DirectoryClient {
    async fn provision(
        &self,
        application: &EmailApplication,
        requester: &User,
    ) -> ProvisionResult {
        // Group requests provision the group address, personal requests the
        // proposed one; last resort is the login localpart on our domain.
        let assigned_email = application
            .group_email
            .clone()
            .or_else(|| application.proposed_email.clone())
            .unwrap_or_else(|| {
                let localpart = requester.email.split('@').next().unwrap_or("user");
                format!("{}@{}", localpart, self.domain)
            });

        Ok(ProvisionedAccount {
            assigned_email,
            assigned_user_id: format!("motac-{:06}", requester.id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{EmailApplicationStatus, Role, ServiceStatus};
    use chrono::Utc;

    fn requester() -> User {
        User {
            id: 42,
            name: "Rahim bin Abdullah".to_string(),
            email: "rahim@motac.gov.my".to_string(),
            personal_email: None,
            nric: "880101-14-5523".to_string(),
            phone: None,
            grade_id: 1,
            department: None,
            position: None,
            role: Role::Staff,
            password: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn application(proposed: Option<&str>, group: Option<&str>) -> EmailApplication {
        EmailApplication {
            id: 1,
            user_id: 42,
            service_status: ServiceStatus::Permanent,
            purpose: Some("mailbox".to_string()),
            proposed_email: proposed.map(str::to_string),
            group_email: group.map(str::to_string),
            group_admin_name: None,
            group_admin_email: None,
            certification_accepted: true,
            certification_at: Some(Utc::now()),
            status: EmailApplicationStatus::Processing,
            rejection_reason: None,
            final_assigned_email: None,
            final_assigned_user_id: None,
            provisioned_at: None,
            provision_attempts: 1,
            provision_failure_reason: None,
            submitted_at: Some(Utc::now()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn group_address_wins_over_proposed() {
        let client = DirectoryClient::new("motac.gov.my");
        let account = client
            .provision(
                &application(Some("rahim2@motac.gov.my"), Some("unit-ict@motac.gov.my")),
                &requester(),
            )
            .await
            .expect("provision");
        assert_eq!(account.assigned_email, "unit-ict@motac.gov.my");
    }

    #[tokio::test]
    async fn falls_back_to_login_localpart() {
        let client = DirectoryClient::new("motac.gov.my");
        let account = client
            .provision(&application(None, None), &requester())
            .await
            .expect("provision");
        assert_eq!(account.assigned_email, "rahim@motac.gov.my");
        assert_eq!(account.assigned_user_id, "motac-000042");
    }
}
