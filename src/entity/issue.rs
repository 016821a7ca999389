use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::{IssuePriority, IssueStatus, IssueType};

/// Issue mirrored from the remote tracker. `id` is the remote issue id, so
/// local and remote rows share identity once created.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "issues")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub key: String,
    #[sea_orm(column_name = "type")]
    pub issue_type: IssueType,
    pub priority: IssuePriority,
    pub developer_id: Option<i16>,
    pub reviewer_id: Option<i16>,
    pub qa_id: Option<i16>,
    pub status: IssueStatus,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub project_id: i16,
    pub parent_issue_id: Option<i64>,  // epic / parent link, cycles are not rejected
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade",
        fk_name = "fk_issue_project"
    )]
    Project,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::DeveloperId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict",
        fk_name = "fk_issue_developer"
    )]
    Developer,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReviewerId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict",
        fk_name = "fk_issue_reviewer"
    )]
    Reviewer,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::QaId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict",
        fk_name = "fk_issue_qa"
    )]
    Qa,

    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentIssueId",
        to = "Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict",
        fk_name = "fk_issue_parent"
    )]
    ParentIssue,

    #[sea_orm(has_many = "super::worklog::Entity")]
    Worklog,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::worklog::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Worklog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    /// Every column explicitly set, ids included: nothing here is generated by the database.
    pub fn for_insert(model: &Model) -> Self {
        Self {
            id: Set(model.id),
            name: Set(model.name.clone()),
            key: Set(model.key.clone()),
            issue_type: Set(model.issue_type),
            priority: Set(model.priority),
            developer_id: Set(model.developer_id),
            reviewer_id: Set(model.reviewer_id),
            qa_id: Set(model.qa_id),
            status: Set(model.status),
            start_date: Set(model.start_date),
            end_date: Set(model.end_date),
            project_id: Set(model.project_id),
            parent_issue_id: Set(model.parent_issue_id),
        }
    }
}
