//! Task entity - a to-do item on the planning checklist.
//!
//! Tasks are ordered by due date, earliest first. Tasks without a due date sort ahead of
//! dated ones, matching how the backend orders NULLs.

use crate::core::{
    record::{Direction, Record},
    remote::{TableMapping, changed},
    session::Identity,
};
use crate::errors::{self, Error};
use chrono::{DateTime, Utc};
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Task urgency.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Needs attention first
    #[sea_orm(string_value = "high")]
    High,
    /// Default urgency
    #[default]
    #[sea_orm(string_value = "medium")]
    Medium,
    /// Can wait
    #[sea_orm(string_value = "low")]
    Low,
}

/// Default category for new tasks.
pub const DEFAULT_CATEGORY: &str = "General";

/// Task database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    /// Server-assigned identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Short title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Deadline, if any
    pub due_date: Option<Date>,
    /// Whether the task is done
    pub completed: bool,
    /// Urgency
    pub priority: Priority,
    /// Grouping label
    pub category: String,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// Owning identity
    pub user_id: String,
}

/// Tasks have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Field values for a new task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Required
    pub title: String,
    /// Description
    pub description: String,
    /// Deadline
    pub due_date: Option<Date>,
    /// Done already
    pub completed: bool,
    /// Urgency
    pub priority: Priority,
    /// Grouping label
    pub category: String,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: None,
            completed: false,
            priority: Priority::default(),
            category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

/// Partial update of a task. `due_date: Some(None)` clears the deadline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New deadline
    pub due_date: Option<Option<Date>>,
    /// New completion state
    pub completed: Option<bool>,
    /// New urgency
    pub priority: Option<Priority>,
    /// New category
    pub category: Option<String>,
}

fn check_title(title: &str) -> errors::Result<()> {
    if title.trim().is_empty() {
        return Err(Error::validation(Model::COLLECTION, "task title cannot be empty"));
    }
    Ok(())
}

impl Record for Model {
    type Draft = TaskDraft;
    type Patch = TaskPatch;
    type SortKey = Option<Date>;

    const COLLECTION: &'static str = "tasks";
    const DIRECTION: Direction = Direction::Ascending;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> &str {
        &self.user_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn sort_key(&self) -> Option<Date> {
        self.due_date
    }

    fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(category) = &patch.category {
            self.category.clone_from(category);
        }
    }

    fn check_draft(draft: &TaskDraft) -> errors::Result<()> {
        check_title(&draft.title)
    }

    fn check_patch(patch: &TaskPatch) -> errors::Result<()> {
        patch.title.as_deref().map_or(Ok(()), check_title)
    }
}

impl TableMapping for Model {
    type Entity = Entity;
    type ActiveModel = ActiveModel;

    fn id_column() -> Column {
        Column::Id
    }

    fn owner_column() -> Column {
        Column::UserId
    }

    fn sort_column() -> Column {
        Column::DueDate
    }

    fn created_column() -> Column {
        Column::CreatedAt
    }

    fn draft_into_active(draft: TaskDraft, owner: &Identity) -> ActiveModel {
        ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(draft.title),
            description: Set(draft.description),
            due_date: Set(draft.due_date),
            completed: Set(draft.completed),
            priority: Set(draft.priority),
            category: Set(draft.category),
            created_at: Set(Utc::now()),
            user_id: Set(owner.as_str().to_owned()),
        }
    }

    fn patch_into_active(patch: &TaskPatch) -> ActiveModel {
        ActiveModel {
            title: changed(patch.title.clone()),
            description: changed(patch.description.clone()),
            due_date: changed(patch.due_date),
            completed: changed(patch.completed),
            priority: changed(patch.priority),
            category: changed(patch.category.clone()),
            ..Default::default()
        }
    }
}
