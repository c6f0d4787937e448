//! Equipment loan application service
//!
//! Same lifecycle shape as email applications up to approval; after that the
//! path runs through physical issuance and return, which mutate equipment
//! availability inside the issuing/returning database transaction.

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::approval::DecisionRequest,
    models::enums::{ApplicationType, ApprovalDecision, ApprovalStage, LoanApplicationStatus},
    models::loan_application::{
        CreateLoanApplication, LoanApplication, LoanApplicationDetails, LoanApplicationQuery,
        UpdateLoanApplication,
    },
    models::loan_transaction::{IssueRequest, ReturnRequest},
    models::user::Actor,
    repository::Repository,
    validation::check,
    workflow::{self, loan, Capability},
};

use super::can_view_all;

#[derive(Clone)]
pub struct LoanApplicationsService {
    repository: Repository,
}

impl LoanApplicationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(
        &self,
        actor: &Actor,
        mut query: LoanApplicationQuery,
    ) -> AppResult<Vec<LoanApplication>> {
        if !can_view_all(actor) {
            query.user_id = Some(actor.user_id);
        }
        self.repository.loan_applications.list(&query).await
    }

    pub async fn get_details(&self, actor: &Actor, id: i32) -> AppResult<LoanApplicationDetails> {
        let application = self.repository.loan_applications.get_by_id(id).await?;
        if application.user_id != actor.user_id && !can_view_all(actor) {
            return Err(AppError::Authorization(format!(
                "user {} may not view loan application {}",
                actor.user_id, id
            )));
        }
        self.assemble(application).await
    }

    pub async fn create(
        &self,
        actor: &Actor,
        data: &CreateLoanApplication,
    ) -> AppResult<LoanApplication> {
        check(data).into_result()?;
        self.repository
            .loan_applications
            .create(actor.user_id, data)
            .await
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: i32,
        data: &UpdateLoanApplication,
    ) -> AppResult<LoanApplication> {
        let application = self.owned_application(actor, id).await?;
        if application.status != LoanApplicationStatus::Draft {
            return Err(AppError::Conflict(
                "Only draft applications can be edited".to_string(),
            ));
        }
        check(data).into_result()?;
        self.repository.loan_applications.update_draft(id, data).await
    }

    /// Submit the draft: full validation against today's date, then the
    /// transition, then the support stage is seeded.
    pub async fn submit(&self, actor: &Actor, id: i32) -> AppResult<LoanApplicationDetails> {
        let application = self.owned_application(actor, id).await?;
        let items = self.repository.loan_applications.get_items(id).await?;

        loan::validate_for_submission(&application, &items, Utc::now().date_naive())
            .into_result()?;
        let next = loan::transition(application.status, loan::LoanAction::Submit)?;

        self.repository
            .loan_applications
            .store_submission(id, next, Utc::now())
            .await?;
        self.repository
            .approvals
            .append(
                ApplicationType::Loan,
                id,
                ApprovalStage::Support,
                None,
                ApprovalDecision::Pending,
                None,
            )
            .await?;

        tracing::info!(application_id = id, "loan application submitted");
        self.get_details(actor, id).await
    }

    /// Decide the stage currently awaiting a decision
    pub async fn decide(
        &self,
        actor: &Actor,
        id: i32,
        request: &DecisionRequest,
    ) -> AppResult<LoanApplicationDetails> {
        let application = self.repository.loan_applications.get_by_id(id).await?;
        let ledger = self
            .repository
            .approvals
            .list_for(ApplicationType::Loan, id)
            .await?;
        let stage = workflow::ledger::current_stage(&ledger).ok_or_else(|| {
            AppError::Conflict("No approval stage is awaiting a decision".to_string())
        })?;
        workflow::require(actor, Capability::Decide(stage))?;

        let mut errors = check(request);
        let comment = request.comment.as_deref().map(str::trim).filter(|c| !c.is_empty());
        let action = match request.decision {
            ApprovalDecision::Approved => loan::LoanAction::Approve(stage),
            ApprovalDecision::Rejected => {
                if comment.is_none() {
                    errors.add("comment", "A reason is required when rejecting");
                }
                loan::LoanAction::Reject
            }
            ApprovalDecision::Pending => {
                errors.add("decision", "Decision must be approved or rejected");
                return Err(AppError::Validation(errors));
            }
        };
        errors.into_result()?;

        let next = loan::transition(application.status, action)?;

        self.repository
            .approvals
            .append(
                ApplicationType::Loan,
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
                    self.repository
                        .approvals
                        .append(
                            ApplicationType::Loan,
                            id,
                            ApprovalStage::Admin,
                            None,
                            ApprovalDecision::Pending,
                            None,
                        )
                        .await?;
                }
                self.repository
                    .loan_applications
                    .store_status(id, next)
                    .await?;
            }
            ApprovalDecision::Rejected => {
                self.repository
                    .loan_applications
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
            "loan application decided"
        );
        self.get_details(actor, id).await
    }

    /// Hand the named units over. The repository runs the whole issuance in
    /// one database transaction; any unavailable unit rolls everything back.
    pub async fn issue(
        &self,
        actor: &Actor,
        id: i32,
        request: &IssueRequest,
    ) -> AppResult<LoanApplicationDetails> {
        workflow::require(actor, Capability::ManageIssuance)?;
        check(request).into_result()?;

        let application = self.repository.loan_applications.get_by_id(id).await?;
        loan::transition(application.status, loan::LoanAction::Issue)?;

        let items = self.repository.loan_applications.get_items(id).await?;
        self.repository
            .loan_transactions
            .issue(id, &request.equipment_ids, actor.user_id, &items)
            .await?;

        tracing::info!(
            application_id = id,
            units = request.equipment_ids.len(),
            officer_id = actor.user_id,
            "equipment issued"
        );
        self.get_details(actor, id).await
    }

    /// Accept the units back and release them per the observed condition
    pub async fn accept_return(
        &self,
        actor: &Actor,
        id: i32,
        request: &ReturnRequest,
    ) -> AppResult<LoanApplicationDetails> {
        workflow::require(actor, Capability::ManageIssuance)?;

        let application = self.repository.loan_applications.get_by_id(id).await?;
        loan::transition(application.status, loan::LoanAction::Return)?;

        self.repository
            .loan_transactions
            .process_return(id, actor.user_id, request.condition)
            .await?;

        tracing::info!(
            application_id = id,
            condition = request.condition.as_str(),
            officer_id = actor.user_id,
            "equipment returned"
        );
        self.get_details(actor, id).await
    }

    /// Administrative close-out after all units are back
    pub async fn complete(&self, actor: &Actor, id: i32) -> AppResult<LoanApplicationDetails> {
        workflow::require(actor, Capability::ManageIssuance)?;

        let application = self.repository.loan_applications.get_by_id(id).await?;
        let next = loan::transition(application.status, loan::LoanAction::Complete)?;
        self.repository
            .loan_applications
            .store_status(id, next)
            .await?;
        self.get_details(actor, id).await
    }

    async fn assemble(&self, application: LoanApplication) -> AppResult<LoanApplicationDetails> {
        let id = application.id;
        let items = self.repository.loan_applications.get_items(id).await?;
        let approvals = self
            .repository
            .approvals
            .list_for(ApplicationType::Loan, id)
            .await?;
        let transactions = self
            .repository
            .loan_transactions
            .list_for_application(id)
            .await?;
        Ok(LoanApplicationDetails {
            application,
            items,
            approvals,
            transactions,
        })
    }

    async fn owned_application(&self, actor: &Actor, id: i32) -> AppResult<LoanApplication> {
        let application = self.repository.loan_applications.get_by_id(id).await?;
        if application.user_id != actor.user_id {
            return Err(AppError::Authorization(format!(
                "user {} does not own loan application {}",
                actor.user_id, id
            )));
        }
        Ok(application)
    }
}
