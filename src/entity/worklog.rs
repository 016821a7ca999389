use chrono::TimeDelta;
use sea_orm::Set;
use sea_orm::entity::prelude::*;

use super::duration::WorkDuration;

/// One logged span of work. `id` is the remote worklog id.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "worklog")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub issue_id: i64,
    pub user_id: i16,
    /// Written through an `interval` cast; see [`WorkDuration`].
    #[sea_orm(column_type = "Interval(None, None)", save_as = "interval")]
    pub hour: WorkDuration,
    pub date_created: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::issue::Entity",
        from = "Column::IssueId",
        to = "super::issue::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict",
        fk_name = "fk_worklog_issue"
    )]
    Issue,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict",
        fk_name = "fk_worklog_user"
    )]
    User,
}

impl Related<super::issue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Issue.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn for_insert(model: &Model) -> Self {
        Self {
            id: Set(model.id),
            issue_id: Set(model.issue_id),
            user_id: Set(model.user_id),
            hour: Set(model.hour),
            date_created: Set(model.date_created),
        }
    }
}

impl Model {
    pub fn time_spent(&self) -> TimeDelta {
        self.hour.as_time_delta()
    }

    /// True when the stored row already carries the given date and duration.
    pub fn matches(&self, date_created: Date, hour: WorkDuration) -> bool {
        self.date_created == date_created && self.hour == hour
    }
}
