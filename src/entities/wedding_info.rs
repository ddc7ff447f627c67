//! Wedding info entity - the one metadata row per identity.
//!
//! Holds the couple's names, date, venue and headline numbers. Written with an upsert
//! keyed by `user_id`, which is unique.

use crate::core::record::SingletonRecord;
use crate::errors::{self, Error};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Default wedding style.
pub const DEFAULT_STYLE: &str = "Classic";

/// Wedding info database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wedding_info")]
pub struct Model {
    /// Server-assigned identifier, kept across upserts
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Names of the couple as displayed on the dashboard
    pub couple_names: String,
    /// Wedding day, if decided
    pub wedding_date: Option<Date>,
    /// Venue name
    pub venue: String,
    /// Expected number of guests
    pub guest_count: i32,
    /// Overall budget
    pub budget_total: f64,
    /// Style of the celebration (e.g. "Classic", "Beach")
    pub style: String,
    /// When the row was first written
    pub created_at: DateTimeUtc,
    /// When the row was last written
    pub updated_at: DateTimeUtc,
    /// Owning identity, one row each
    #[sea_orm(unique)]
    pub user_id: String,
}

/// Wedding info has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Every writable field of the wedding info row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeddingInfoFields {
    /// Names of the couple
    pub couple_names: String,
    /// Wedding day
    pub wedding_date: Option<Date>,
    /// Venue
    pub venue: String,
    /// Expected guests, non-negative
    pub guest_count: i32,
    /// Overall budget, finite and non-negative
    pub budget_total: f64,
    /// Style
    pub style: String,
}

impl Default for WeddingInfoFields {
    fn default() -> Self {
        Self {
            couple_names: String::new(),
            wedding_date: None,
            venue: String::new(),
            guest_count: 0,
            budget_total: 0.0,
            style: DEFAULT_STYLE.to_string(),
        }
    }
}

impl SingletonRecord for Model {
    type Fields = WeddingInfoFields;

    const COLLECTION: &'static str = "wedding_info";

    fn owner_id(&self) -> &str {
        &self.user_id
    }

    fn check_fields(fields: &WeddingInfoFields) -> errors::Result<()> {
        if fields.guest_count < 0 {
            return Err(Error::validation(
                Self::COLLECTION,
                format!("guest count {} is negative", fields.guest_count),
            ));
        }
        if !fields.budget_total.is_finite() || fields.budget_total < 0.0 {
            return Err(Error::validation(
                Self::COLLECTION,
                format!("invalid budget total {}", fields.budget_total),
            ));
        }
        Ok(())
    }
}
