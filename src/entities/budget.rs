//! Budget entity - one line item of the wedding budget.
//!
//! Each item has a planned and an actual amount. Items are ordered alphabetically by
//! category, byte-wise like the backend's default collation.

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

/// Budget item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budget")]
pub struct Model {
    /// Server-assigned identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Spending category (e.g. "Catering")
    pub category: String,
    /// Amount set aside
    pub planned_amount: f64,
    /// Amount actually spent so far
    pub actual_amount: f64,
    /// Free-form notes
    pub notes: String,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// Owning identity
    pub user_id: String,
}

/// Budget items have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Field values for a new budget item.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetDraft {
    /// Required
    pub category: String,
    /// Planned amount
    pub planned_amount: f64,
    /// Spent amount
    pub actual_amount: f64,
    /// Notes
    pub notes: String,
}

/// Partial update of a budget item.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetPatch {
    /// New category
    pub category: Option<String>,
    /// New planned amount
    pub planned_amount: Option<f64>,
    /// New spent amount
    pub actual_amount: Option<f64>,
    /// New notes
    pub notes: Option<String>,
}

fn check_category(category: &str) -> errors::Result<()> {
    if category.trim().is_empty() {
        return Err(Error::validation(
            Model::COLLECTION,
            "budget category cannot be empty",
        ));
    }
    Ok(())
}

fn check_amount(amount: f64) -> errors::Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::validation(
            Model::COLLECTION,
            format!("invalid budget amount {amount}"),
        ));
    }
    Ok(())
}

impl Record for Model {
    type Draft = BudgetDraft;
    type Patch = BudgetPatch;
    type SortKey = String;

    const COLLECTION: &'static str = "budget";
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

    fn sort_key(&self) -> String {
        self.category.clone()
    }

    fn apply(&mut self, patch: &BudgetPatch) {
        if let Some(category) = &patch.category {
            self.category.clone_from(category);
        }
        if let Some(planned) = patch.planned_amount {
            self.planned_amount = planned;
        }
        if let Some(actual) = patch.actual_amount {
            self.actual_amount = actual;
        }
        if let Some(notes) = &patch.notes {
            self.notes.clone_from(notes);
        }
    }

    fn check_draft(draft: &BudgetDraft) -> errors::Result<()> {
        check_category(&draft.category)?;
        check_amount(draft.planned_amount)?;
        check_amount(draft.actual_amount)
    }

    fn check_patch(patch: &BudgetPatch) -> errors::Result<()> {
        if let Some(category) = &patch.category {
            check_category(category)?;
        }
        if let Some(planned) = patch.planned_amount {
            check_amount(planned)?;
        }
        patch.actual_amount.map_or(Ok(()), check_amount)
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
        Column::Category
    }

    fn created_column() -> Column {
        Column::CreatedAt
    }

    fn draft_into_active(draft: BudgetDraft, owner: &Identity) -> ActiveModel {
        ActiveModel {
            id: Set(Uuid::new_v4()),
            category: Set(draft.category),
            planned_amount: Set(draft.planned_amount),
            actual_amount: Set(draft.actual_amount),
            notes: Set(draft.notes),
            created_at: Set(Utc::now()),
            user_id: Set(owner.as_str().to_owned()),
        }
    }

    fn patch_into_active(patch: &BudgetPatch) -> ActiveModel {
        ActiveModel {
            category: changed(patch.category.clone()),
            planned_amount: changed(patch.planned_amount),
            actual_amount: changed(patch.actual_amount),
            notes: changed(patch.notes.clone()),
            ..Default::default()
        }
    }
}
