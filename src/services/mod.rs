//! Business logic services

pub mod auth;
pub mod email_applications;
pub mod equipment;
pub mod fingerprints;
pub mod grades;
pub mod loan_applications;
pub mod provisioning;
pub mod users;

use std::sync::Arc;

use crate::{
    config::{AuthConfig, ImportConfig},
    models::enums::Role,
    models::user::Actor,
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub grades: grades::GradesService,
    pub equipment: equipment::EquipmentService,
    pub email_applications: email_applications::EmailApplicationsService,
    pub loan_applications: loan_applications::LoanApplicationsService,
    pub fingerprints: fingerprints::FingerprintsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        import_config: ImportConfig,
        provisioner: Arc<dyn provisioning::EmailProvisioner>,
    ) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            users: users::UsersService::new(repository.clone()),
            grades: grades::GradesService::new(repository.clone()),
            equipment: equipment::EquipmentService::new(repository.clone()),
            email_applications: email_applications::EmailApplicationsService::new(
                repository.clone(),
                provisioner,
            ),
            loan_applications: loan_applications::LoanApplicationsService::new(repository.clone()),
            fingerprints: fingerprints::FingerprintsService::new(
                repository.clone(),
                import_config,
            ),
            repository,
        }
    }

    /// Database pool, for readiness probes
    pub fn pool(&self) -> sqlx::Pool<sqlx::Postgres> {
        self.repository.pool.clone()
    }
}

/// Whether the actor may see applications they do not own. Approving
/// officers, BPM staff and admins review other people's requests.
pub(crate) fn can_view_all(actor: &Actor) -> bool {
    matches!(actor.role, Role::Admin | Role::BpmStaff) || actor.is_approver
}
