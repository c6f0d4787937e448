//! Equipment inventory service

use crate::{
    error::{AppError, AppResult},
    models::enums::EquipmentAvailability,
    models::equipment::{
        CreateEquipment, Equipment, EquipmentDetails, EquipmentQuery, UpdateEquipment,
    },
    repository::Repository,
    validation::check,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &EquipmentQuery) -> AppResult<Vec<EquipmentDetails>> {
        self.repository.equipment.list(query).await
    }

    pub async fn get(&self, id: i32) -> AppResult<EquipmentDetails> {
        self.repository.equipment.get_details(id).await
    }

    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        let mut errors = check(data);
        if self
            .repository
            .equipment
            .serial_taken(&data.serial_number, None)
            .await?
        {
            errors.add("serial_number", "Serial number is already registered");
        }
        if let Some(tag) = &data.tag_id {
            if self.repository.equipment.tag_taken(tag, None).await? {
                errors.add("tag_id", "Tag ID is already registered");
            }
        }
        if let (Some(purchase), Some(warranty)) = (data.purchase_date, data.warranty_end_date) {
            errors.add_if(
                warranty < purchase,
                "warranty_end_date",
                "Warranty end must not be earlier than the purchase date",
            );
        }
        errors.into_result()?;

        self.repository.equipment.create(data).await
    }

    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        let current = self.repository.equipment.get_by_id(id).await?;

        let mut errors = check(data);
        if let Some(serial) = &data.serial_number {
            if self.repository.equipment.serial_taken(serial, Some(id)).await? {
                errors.add("serial_number", "Serial number is already registered");
            }
        }
        if let Some(tag) = &data.tag_id {
            if self.repository.equipment.tag_taken(tag, Some(id)).await? {
                errors.add("tag_id", "Tag ID is already registered");
            }
        }

        // Cross-field rule runs against the values after the merge
        let purchase = data.purchase_date.or(current.purchase_date);
        let warranty = data.warranty_end_date.or(current.warranty_end_date);
        if let (Some(purchase), Some(warranty)) = (purchase, warranty) {
            errors.add_if(
                warranty < purchase,
                "warranty_end_date",
                "Warranty end must not be earlier than the purchase date",
            );
        }

        // The stored availability is only editable at rest. `on_loan` is
        // written by issuance and return, never by hand.
        if let Some(availability) = data.availability_status {
            errors.add_if(
                availability == EquipmentAvailability::OnLoan,
                "availability_status",
                "on_loan is recorded by issuance, not by edits",
            );
        }
        errors.into_result()?;

        if data.availability_status.is_some() && self.repository.equipment.has_open_loan(id).await?
        {
            return Err(AppError::Conflict(
                "Equipment is out on an open loan; availability follows its return".to_string(),
            ));
        }

        self.repository.equipment.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.equipment.delete(id).await
    }
}
