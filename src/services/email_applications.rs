//! Email / account provisioning application service
//!
//! Drives the application lifecycle: draft editing, submission, the two-stage
//! approval and the provisioning handoff. Every status write goes through the
//! transition table; every decision appends to the approval ledger.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::approval::DecisionRequest,
    models::email_application::{
        CreateEmailApplication, EmailApplication, EmailApplicationDetails, EmailApplicationQuery,
        UpdateEmailApplication,
    },
    models::enums::{
        ApplicationType, ApprovalDecision, ApprovalStage, EmailApplicationStatus,
    },
    models::user::Actor,
    repository::Repository,
    validation::check,
    workflow::{self, email, Capability},
};

use super::{can_view_all, provisioning::EmailProvisioner};

#[derive(Clone)]
pub struct EmailApplicationsService {
    repository: Repository,
    provisioner: Arc<dyn EmailProvisioner>,
}

impl EmailApplicationsService {
    pub fn new(repository: Repository, provisioner: Arc<dyn EmailProvisioner>) -> Self {
        Self {
            repository,
            provisioner,
        }
    }

    pub async fn list(
        &self,
        actor: &Actor,
        mut query: EmailApplicationQuery,
    ) -> AppResult<Vec<EmailApplication>> {
        // Plain staff only ever see their own applications
        if !can_view_all(actor) {
            query.user_id = Some(actor.user_id);
        }
        self.repository.email_applications.list(&query).await
    }

    pub async fn get_details(&self, actor: &Actor, id: i32) -> AppResult<EmailApplicationDetails> {
        let application = self.repository.email_applications.get_by_id(id).await?;
        if application.user_id != actor.user_id && !can_view_all(actor) {
            return Err(AppError::Authorization(format!(
                "user {} may not view email application {}",
                actor.user_id, id
            )));
        }
        let approvals = self
            .repository
            .approvals
            .list_for(ApplicationType::Email, id)
            .await?;
        Ok(EmailApplicationDetails {
            application,
            approvals,
        })
    }

    pub async fn create(
        &self,
        actor: &Actor,
        data: &CreateEmailApplication,
    ) -> AppResult<EmailApplication> {
        check(data).into_result()?;
        self.repository
            .email_applications
            .create(actor.user_id, data)
            .await
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: i32,
        data: &UpdateEmailApplication,
    ) -> AppResult<EmailApplication> {
        let application = self.owned_application(actor, id).await?;
        if application.status != EmailApplicationStatus::Draft {
            return Err(AppError::Conflict(
                "Only draft applications can be edited".to_string(),
            ));
        }
        check(data).into_result()?;
        self.repository.email_applications.update_draft(id, data).await
    }

    /// Submit the draft: full validation, then the transition, then the
    /// support stage is seeded in the ledger.
    pub async fn submit(&self, actor: &Actor, id: i32) -> AppResult<EmailApplicationDetails> {
        let application = self.owned_application(actor, id).await?;

        email::validate_for_submission(&application).into_result()?;
        let next = email::transition(application.status, email::EmailAction::Submit)?;

        self.repository
            .email_applications
            .store_submission(id, next, Utc::now())
            .await?;
        self.repository
            .approvals
            .append(
                ApplicationType::Email,
                id,
                ApprovalStage::Support,
                None,
                ApprovalDecision::Pending,
                None,
            )
            .await?;

        tracing::info!(application_id = id, "email application submitted");
        self.get_details(actor, id).await
    }

    /// Decide the stage currently awaiting a decision
    pub async fn decide(
        &self,
        actor: &Actor,
        id: i32,
        request: &DecisionRequest,
    ) -> AppResult<EmailApplicationDetails> {
        let application = self.repository.email_applications.get_by_id(id).await?;
        let ledger = self
            .repository
            .approvals
            .list_for(ApplicationType::Email, id)
            .await?;
        // Past the approval phase, the admin stage still owns rejection of a
        // stuck provisioning; the transition table refuses everything else.
        let stage = workflow::ledger::current_stage(&ledger)
            .or_else(|| {
                (application.status == EmailApplicationStatus::Processing)
                    .then_some(ApprovalStage::Admin)
            })
            .ok_or_else(|| {
                AppError::Conflict("No approval stage is awaiting a decision".to_string())
            })?;
        workflow::require(actor, Capability::Decide(stage))?;

        let mut errors = check(request);
        let comment = request.comment.as_deref().map(str::trim).filter(|c| !c.is_empty());
        let action = match request.decision {
            ApprovalDecision::Approved => email::EmailAction::Approve(stage),
            ApprovalDecision::Rejected => {
                if comment.is_none() {
                    errors.add("comment", "A reason is required when rejecting");
                }
                email::EmailAction::Reject
            }
            ApprovalDecision::Pending => {
                errors.add("decision", "Decision must be approved or rejected");
                return Err(AppError::Validation(errors));
            }
        };
        errors.into_result()?;

        let next = email::transition(application.status, action)?;

        self.repository
            .approvals
            .append(
                ApplicationType::Email,
                id,
                stage,
                Some(actor.user_id),
                request.decision,
                comment,
            )
            .await?;

        match request.decision {
            ApprovalDecision::Approved => {
                if stage == ApprovalStage::Support {
                    // Seed the next stage so the ledger always names what is
                    // awaited
                    self.repository
                        .approvals
                        .append(
                            ApplicationType::Email,
                            id,
                            ApprovalStage::Admin,
                            None,
                            ApprovalDecision::Pending,
                            None,
                        )
                        .await?;
                }
                self.repository
                    .email_applications
                    .store_status(id, next)
                    .await?;
            }
            ApprovalDecision::Rejected => {
                self.repository
                    .email_applications
                    .store_rejection(id, comment.unwrap_or_default())
                    .await?;
            }
            ApprovalDecision::Pending => unreachable!("rejected above"),
        }

        tracing::info!(
            application_id = id,
            stage = stage.as_str(),
            decision = request.decision.as_str(),
            officer_id = actor.user_id,
            "email application decided"
        );
        self.get_details(actor, id).await
    }

    /// Hand an approved application to the directory backend, or retry a
    /// failed one. A backend failure parks the application in its failure
    /// status before surfacing.
    pub async fn provision(&self, actor: &Actor, id: i32) -> AppResult<EmailApplicationDetails> {
        workflow::require(actor, Capability::Provision)?;
        let application = self.repository.email_applications.get_by_id(id).await?;

        let action = if application.status == EmailApplicationStatus::ProvisionFailed {
            email::EmailAction::RetryProvisioning
        } else {
            email::EmailAction::StartProvisioning
        };
        email::transition(application.status, action)?;

        self.repository
            .email_applications
            .store_provision_start(id)
            .await?;

        let requester = self.repository.users.get_by_id(application.user_id).await?;
        match self.provisioner.provision(&application, &requester).await {
            Ok(account) => {
                self.repository
                    .email_applications
                    .store_provision_success(id, &account.assigned_email, &account.assigned_user_id)
                    .await?;
                tracing::info!(
                    application_id = id,
                    assigned_email = account.assigned_email,
                    "account provisioned"
                );
                self.get_details(actor, id).await
            }
            Err(reason) => {
                self.repository
                    .email_applications
                    .store_provision_failure(id, &reason)
                    .await?;
                tracing::warn!(application_id = id, reason, "provisioning failed");
                Err(AppError::External(reason))
            }
        }
    }

    async fn owned_application(&self, actor: &Actor, id: i32) -> AppResult<EmailApplication> {
        let application = self.repository.email_applications.get_by_id(id).await?;
        if application.user_id != actor.user_id {
            return Err(AppError::Authorization(format!(
                "user {} does not own email application {}",
                actor.user_id, id
            )));
        }
        Ok(application)
    }
}
