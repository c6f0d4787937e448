//! Grade management service

use crate::{
    error::AppResult,
    models::grade::{CreateGrade, Grade, UpdateGrade},
    repository::Repository,
    validation::check,
};

#[derive(Clone)]
pub struct GradesService {
    repository: Repository,
}

impl GradesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Grade>> {
        self.repository.grades.list().await
    }

    pub async fn get(&self, id: i32) -> AppResult<Grade> {
        self.repository.grades.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateGrade) -> AppResult<Grade> {
        let mut errors = check(data);
        if self.repository.grades.name_taken(&data.name, None).await? {
            errors.add("name", "Grade name is already in use");
        }
        if self.repository.grades.level_taken(data.level, None).await? {
            errors.add("level", "Grade level is already in use");
        }
        errors.into_result()?;

        self.repository.grades.create(data).await
    }

    pub async fn update(&self, id: i32, data: &UpdateGrade) -> AppResult<Grade> {
        let mut errors = check(data);
        if let Some(name) = &data.name {
            if self.repository.grades.name_taken(name, Some(id)).await? {
                errors.add("name", "Grade name is already in use");
            }
        }
        if let Some(level) = data.level {
            if self.repository.grades.level_taken(level, Some(id)).await? {
                errors.add("level", "Grade level is already in use");
            }
        }
        errors.into_result()?;

        self.repository.grades.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.grades.delete(id).await
    }
}
