//! Shared domain enums
//!
//! Every status column is persisted as a constrained text set. The
//! `text_enum!` macro generates the string and sqlx conversions so a status
//! can never be written outside its enumerated values.

/// Declare an enum persisted as snake_case text in Postgres.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self { $(Self::$variant => $text,)+ }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!("unknown {} value: {}", stringify!($name), other)),
                }
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = sqlx::Decode::<sqlx::Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <String as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str().to_string(), buf)
            }
        }
    };
}

text_enum! {
    /// User roles driving the capability checks
    Role {
        Staff => "staff",
        /// Grade officers entitled to decide the support stage
        Approver => "approver",
        /// ICT asset-management staff (issue / accept return)
        BpmStaff => "bpm_staff",
        Admin => "admin",
    }
}

text_enum! {
    /// Service status category on an email application
    ServiceStatus {
        Permanent => "permanent",
        Contract => "contract",
        Intern => "intern",
        OtherAgency => "other_agency",
    }
}

text_enum! {
    /// Email application lifecycle status
    EmailApplicationStatus {
        Draft => "draft",
        PendingSupport => "pending_support",
        PendingAdmin => "pending_admin",
        /// Admin decision recorded, waiting for provisioning to start
        Approved => "approved",
        /// Provisioning in flight
        Processing => "processing",
        Completed => "completed",
        Rejected => "rejected",
        ProvisionFailed => "provision_failed",
    }
}

impl EmailApplicationStatus {
    /// Terminal states accept no further transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }
}

text_enum! {
    /// Loan application lifecycle status
    LoanApplicationStatus {
        Draft => "draft",
        PendingSupport => "pending_support",
        PendingAdmin => "pending_admin",
        Approved => "approved",
        Issued => "issued",
        Returned => "returned",
        Completed => "completed",
        Rejected => "rejected",
    }
}

impl LoanApplicationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }
}

text_enum! {
    /// Stored equipment availability. Authoritative only at rest: while a
    /// unit is out, the open loan transaction is the source of truth.
    EquipmentAvailability {
        Available => "available",
        OnLoan => "on_loan",
        UnderMaintenance => "under_maintenance",
        Disposed => "disposed",
    }
}

text_enum! {
    /// Physical condition of an equipment unit
    EquipmentCondition {
        Good => "good",
        Fine => "fine",
        Damaged => "damaged",
        Unserviceable => "unserviceable",
    }
}

impl EquipmentCondition {
    /// Availability a returned unit lands on for this condition
    pub fn availability_after_return(&self) -> EquipmentAvailability {
        match self {
            Self::Good | Self::Fine => EquipmentAvailability::Available,
            Self::Damaged => EquipmentAvailability::UnderMaintenance,
            Self::Unserviceable => EquipmentAvailability::Disposed,
        }
    }
}

text_enum! {
    /// Equipment asset categories
    AssetType {
        Laptop => "laptop",
        Projector => "projector",
        Printer => "printer",
        Scanner => "scanner",
        Monitor => "monitor",
        Camera => "camera",
        Other => "other",
    }
}

text_enum! {
    /// Named step in the approval sequence
    ApprovalStage {
        Support => "support",
        Admin => "admin",
    }
}

text_enum! {
    /// Decision recorded on one approval row
    ApprovalDecision {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

text_enum! {
    /// Which application kind an approval row belongs to
    ApplicationType {
        Email => "email",
        Loan => "loan",
    }
}

text_enum! {
    /// Attendance import job status
    ImportStatus {
        Waiting => "waiting",
        Completed => "completed",
        CompletedWithErrors => "completed_with_errors",
        Failed => "failed",
        FailedValidation => "failed_validation",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trip() {
        assert_eq!(
            "pending_support".parse::<EmailApplicationStatus>().unwrap(),
            EmailApplicationStatus::PendingSupport
        );
        assert_eq!(ImportStatus::CompletedWithErrors.as_str(), "completed_with_errors");
        assert!("issued".parse::<EmailApplicationStatus>().is_err());
    }

    #[test]
    fn damaged_returns_go_to_maintenance() {
        assert_eq!(
            EquipmentCondition::Damaged.availability_after_return(),
            EquipmentAvailability::UnderMaintenance
        );
        assert_eq!(
            EquipmentCondition::Good.availability_after_return(),
            EquipmentAvailability::Available
        );
    }

    #[test]
    fn terminal_states() {
        assert!(EmailApplicationStatus::Completed.is_terminal());
        assert!(EmailApplicationStatus::Rejected.is_terminal());
        assert!(!EmailApplicationStatus::Processing.is_terminal());
        assert!(LoanApplicationStatus::Rejected.is_terminal());
        assert!(!LoanApplicationStatus::Issued.is_terminal());
    }
}
