//! User management service

use crate::{
    error::{AppError, AppResult},
    models::enums::Role,
    models::grade::CreateGrade,
    models::user::{CreateUser, UpdateUser, User, UserQuery, UserShort},
    repository::Repository,
    validation::{check, NRIC_RE, PHONE_RE},
};

use super::auth::hash_password;

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &UserQuery) -> AppResult<Vec<UserShort>> {
        self.repository.users.list(query).await
    }

    pub async fn get(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let mut errors = check(data);
        errors.add_if(
            !NRIC_RE.is_match(&data.nric),
            "nric",
            "NRIC must be 12 digits, optionally dash-separated",
        );
        if let Some(phone) = &data.phone {
            errors.add_if(!PHONE_RE.is_match(phone), "phone", "Invalid phone number");
        }
        if self.repository.users.email_taken(&data.email, None).await? {
            errors.add("email", "Email is already in use");
        }
        if self.repository.users.nric_taken(&data.nric, None).await? {
            errors.add("nric", "NRIC is already registered");
        }
        if let Err(AppError::NotFound(_)) = self.repository.grades.get_by_id(data.grade_id).await {
            errors.add("grade_id", "Grade does not exist");
        }
        errors.into_result()?;

        let password_hash = data.password.as_deref().map(hash_password).transpose()?;
        self.repository.users.create(data, password_hash).await
    }

    pub async fn update(&self, id: i32, data: &UpdateUser) -> AppResult<User> {
        let mut errors = check(data);
        if let Some(nric) = &data.nric {
            errors.add_if(
                !NRIC_RE.is_match(nric),
                "nric",
                "NRIC must be 12 digits, optionally dash-separated",
            );
            if self.repository.users.nric_taken(nric, Some(id)).await? {
                errors.add("nric", "NRIC is already registered");
            }
        }
        if let Some(phone) = &data.phone {
            errors.add_if(!PHONE_RE.is_match(phone), "phone", "Invalid phone number");
        }
        if let Some(email) = &data.email {
            if self.repository.users.email_taken(email, Some(id)).await? {
                errors.add("email", "Email is already in use");
            }
        }
        if let Some(grade_id) = data.grade_id {
            if let Err(AppError::NotFound(_)) = self.repository.grades.get_by_id(grade_id).await {
                errors.add("grade_id", "Grade does not exist");
            }
        }
        errors.into_result()?;

        let password_hash = data.password.as_deref().map(hash_password).transpose()?;
        self.repository.users.update(id, data, password_hash).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.users.soft_delete(id).await
    }

    /// Create the default admin account on an empty database so the first
    /// operator can log in. Runs once; a populated user table is left alone.
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<()> {
        if self.repository.users.any_active().await? {
            return Ok(());
        }

        let grades = self.repository.grades.list().await?;
        let grade = match grades.into_iter().find(|g| g.is_approver) {
            Some(grade) => grade,
            None => {
                self.repository
                    .grades
                    .create(&CreateGrade {
                        name: "JUSA C".to_string(),
                        level: 54,
                        is_approver: Some(true),
                    })
                    .await?
            }
        };

        let password_hash = hash_password("admin")?;
        self.repository
            .users
            .create(
                &CreateUser {
                    name: "Administrator".to_string(),
                    email: "admin@motac.gov.my".to_string(),
                    personal_email: None,
                    nric: "000000-00-0000".to_string(),
                    phone: None,
                    grade_id: grade.id,
                    department: Some("BPM".to_string()),
                    position: None,
                    role: Some(Role::Admin),
                    password: None,
                },
                Some(password_hash),
            )
            .await?;

        tracing::warn!("created bootstrap admin account admin@motac.gov.my with default password");
        Ok(())
    }
}
