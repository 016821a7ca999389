use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "issuetype")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueType {
    #[sea_orm(string_value = "BUG")]
    Bug,
    #[sea_orm(string_value = "TASK")]
    Task,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "issuepriority")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssuePriority {
    #[sea_orm(string_value = "LOWEST")]
    Lowest,
    #[sea_orm(string_value = "LOW")]
    Low,
    #[sea_orm(string_value = "MEDIUM")]
    Medium,
    #[sea_orm(string_value = "HIGH")]
    High,
    #[sea_orm(string_value = "HIGHEST")]
    Highest,
}

/// Workflow states the local tracker understands. Anything the remote side
/// reports outside this list is coerced to `InProgress` by the normalizer.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "issuestatus")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    #[sea_orm(string_value = "CANCELED")]
    Canceled,
    #[sea_orm(string_value = "PAUSE")]
    Pause,
    #[sea_orm(string_value = "READY_FOR_REVIEW")]
    ReadyForReview,
    #[sea_orm(string_value = "READY_FOR_TEST")]
    ReadyForTest,
    #[sea_orm(string_value = "READY_FOR_DEV")]
    ReadyForDev,
    #[sea_orm(string_value = "RETURNED_FROM_CODE_REVIEW")]
    ReturnedFromCodeReview,
    #[sea_orm(string_value = "RETURNED_FROM_TESTING")]
    ReturnedFromTesting,
    #[sea_orm(string_value = "CODE_REVIEW")]
    CodeReview,
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "IN_TESTING")]
    InTesting,
    #[sea_orm(string_value = "TESTED")]
    Tested,
    #[sea_orm(string_value = "TO_DO")]
    ToDo,
    #[sea_orm(string_value = "DONE")]
    Done,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "userrole")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[sea_orm(string_value = "USER")]
    User,
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    #[sea_orm(string_value = "SUPER_ADMIN")]
    SuperAdmin,
}
