//! Attendance service: fingerprint records, sheet import and export

use std::io::Cursor;

use crate::{
    config::ImportConfig,
    error::{AppError, AppResult},
    importer::{self, SheetError},
    models::enums::ImportStatus,
    models::fingerprint::{
        CreateFingerprint, Fingerprint, FingerprintQuery, ImportJob, RowFailure, UpdateFingerprint,
    },
    models::user::Actor,
    repository::Repository,
    validation::FieldErrors,
    workflow::{self, Capability},
};

#[derive(Clone)]
pub struct FingerprintsService {
    repository: Repository,
    config: ImportConfig,
}

impl FingerprintsService {
    pub fn new(repository: Repository, config: ImportConfig) -> Self {
        Self { repository, config }
    }

    pub async fn list(&self, query: &FingerprintQuery) -> AppResult<Vec<Fingerprint>> {
        self.repository.fingerprints.list(query).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Fingerprint> {
        self.repository.fingerprints.get_by_id(id).await
    }

    pub async fn create(&self, actor: &Actor, data: &CreateFingerprint) -> AppResult<Fingerprint> {
        workflow::require(actor, Capability::ManageAttendance)?;

        let mut errors = FieldErrors::new();
        if let (Some(check_in), Some(check_out)) = (data.check_in, data.check_out) {
            errors.add_if(
                check_out <= check_in,
                "check_out",
                "Check-out must be after check-in",
            );
        }
        errors.into_result()?;

        self.repository.users.get_by_id(data.user_id).await?;
        self.repository.fingerprints.create(data).await
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: i32,
        data: &UpdateFingerprint,
    ) -> AppResult<Fingerprint> {
        workflow::require(actor, Capability::ManageAttendance)?;

        let current = self.repository.fingerprints.get_by_id(id).await?;
        let check_in = data.check_in.or(current.check_in);
        let check_out = data.check_out.or(current.check_out);
        let mut errors = FieldErrors::new();
        if let (Some(check_in), Some(check_out)) = (check_in, check_out) {
            errors.add_if(
                check_out <= check_in,
                "check_out",
                "Check-out must be after check-in",
            );
        }
        errors.into_result()?;

        self.repository.fingerprints.update(id, data).await
    }

    pub async fn delete(&self, actor: &Actor, id: i32) -> AppResult<()> {
        workflow::require(actor, Capability::ManageAttendance)?;
        self.repository.fingerprints.delete(id).await
    }

    /// Run one sheet import. Row failures never abort the batch; the job
    /// record carries every failed row with its reason. Whole-sheet failures
    /// (bad header, row cap, unreadable file) park the job in a failure
    /// status without touching any attendance record.
    pub async fn import(
        &self,
        actor: &Actor,
        file_name: &str,
        bytes: &[u8],
    ) -> AppResult<ImportJob> {
        workflow::require(actor, Capability::ManageAttendance)?;

        let job = self.repository.fingerprints.create_job(file_name).await?;
        let nric_map = self.repository.users.nric_map().await?;

        let outcome = match importer::parse_sheet(Cursor::new(bytes), self.config.max_rows, |n| {
            nric_map.get(n).copied()
        }) {
            Ok(outcome) => outcome,
            Err(e) => {
                let status = match e {
                    SheetError::BadHeader | SheetError::TooManyRows { .. } => {
                        ImportStatus::FailedValidation
                    }
                    SheetError::Io(_) | SheetError::Csv(_) => ImportStatus::Failed,
                };
                let failures = vec![RowFailure {
                    row: 0,
                    reason: e.to_string(),
                }];
                tracing::warn!(job_id = job.id, file_name, error = %e, "sheet import aborted");
                return self
                    .repository
                    .fingerprints
                    .finish_job(job.id, status, 0, 0, &failures)
                    .await;
            }
        };

        self.repository
            .fingerprints
            .insert_parsed(&outcome.rows)
            .await?;

        let status = if outcome.failures.is_empty() {
            ImportStatus::Completed
        } else {
            ImportStatus::CompletedWithErrors
        };
        tracing::info!(
            job_id = job.id,
            file_name,
            total = outcome.total(),
            imported = outcome.rows.len(),
            failed = outcome.failures.len(),
            "sheet import finished"
        );
        self.repository
            .fingerprints
            .finish_job(
                job.id,
                status,
                outcome.total() as i32,
                outcome.rows.len() as i32,
                &outcome.failures,
            )
            .await
    }

    /// Export matching records as sheet bytes, same column contract as the
    /// import
    pub async fn export(&self, query: &FingerprintQuery) -> AppResult<Vec<u8>> {
        let rows = self.repository.fingerprints.export_rows(query).await?;
        importer::write_sheet(&rows)
            .map_err(|e| AppError::Internal(format!("Failed to write sheet: {}", e)))
    }

    pub async fn get_job(&self, id: i32) -> AppResult<ImportJob> {
        self.repository.fingerprints.get_job(id).await
    }

    pub async fn list_jobs(&self) -> AppResult<Vec<ImportJob>> {
        self.repository.fingerprints.list_jobs().await
    }
}
