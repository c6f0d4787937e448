//! Repository layer for database operations

pub mod approvals;
pub mod email_applications;
pub mod equipment;
pub mod fingerprints;
pub mod grades;
pub mod loan_applications;
pub mod loan_transactions;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub grades: grades::GradesRepository,
    pub equipment: equipment::EquipmentRepository,
    pub email_applications: email_applications::EmailApplicationsRepository,
    pub loan_applications: loan_applications::LoanApplicationsRepository,
    pub loan_transactions: loan_transactions::LoanTransactionsRepository,
    pub approvals: approvals::ApprovalsRepository,
    pub fingerprints: fingerprints::FingerprintsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            grades: grades::GradesRepository::new(pool.clone()),
            equipment: equipment::EquipmentRepository::new(pool.clone()),
            email_applications: email_applications::EmailApplicationsRepository::new(pool.clone()),
            loan_applications: loan_applications::LoanApplicationsRepository::new(pool.clone()),
            loan_transactions: loan_transactions::LoanTransactionsRepository::new(pool.clone()),
            approvals: approvals::ApprovalsRepository::new(pool.clone()),
            fingerprints: fingerprints::FingerprintsRepository::new(pool.clone()),
            pool,
        }
    }
}
