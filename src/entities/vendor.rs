//! Vendor entity - a booked or prospective supplier (photographer, florist, buffet...).
//!
//! Vendors are listed newest first and carry a quoted price and a booking status.

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

/// Booking status of a vendor.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum VendorStatus {
    /// Quoted or contacted, not yet booked
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Booked
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
}

/// Vendor database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vendors")]
pub struct Model {
    /// Server-assigned identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Business name
    pub name: String,
    /// Service category (e.g. "Photography", "Flowers")
    pub category: String,
    /// Contact person, phone or e-mail
    pub contact: String,
    /// Quoted price
    pub price: f64,
    /// Booking status
    pub status: VendorStatus,
    /// Free-form notes
    pub notes: String,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// Owning identity
    pub user_id: String,
}

/// Vendors have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Field values for a new vendor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorDraft {
    /// Required
    pub name: String,
    /// Required
    pub category: String,
    /// Contact details
    pub contact: String,
    /// Quoted price, finite and non-negative
    pub price: f64,
    /// Starts as [`VendorStatus::Pending`] by default
    pub status: VendorStatus,
    /// Notes
    pub notes: String,
}

/// Partial update of a vendor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorPatch {
    /// New name
    pub name: Option<String>,
    /// New category
    pub category: Option<String>,
    /// New contact details
    pub contact: Option<String>,
    /// New price
    pub price: Option<f64>,
    /// New status
    pub status: Option<VendorStatus>,
    /// New notes
    pub notes: Option<String>,
}

fn check_price(price: f64) -> errors::Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::validation(
            Model::COLLECTION,
            format!("invalid vendor price {price}"),
        ));
    }
    Ok(())
}

fn check_required(field: &str, value: &str) -> errors::Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(
            Model::COLLECTION,
            format!("vendor {field} cannot be empty"),
        ));
    }
    Ok(())
}

impl Record for Model {
    type Draft = VendorDraft;
    type Patch = VendorPatch;
    type SortKey = DateTime<Utc>;

    const COLLECTION: &'static str = "vendors";
    const DIRECTION: Direction = Direction::Descending;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> &str {
        &self.user_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn sort_key(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn apply(&mut self, patch: &VendorPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(category) = &patch.category {
            self.category.clone_from(category);
        }
        if let Some(contact) = &patch.contact {
            self.contact.clone_from(contact);
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(notes) = &patch.notes {
            self.notes.clone_from(notes);
        }
    }

    fn check_draft(draft: &VendorDraft) -> errors::Result<()> {
        check_required("name", &draft.name)?;
        check_required("category", &draft.category)?;
        check_price(draft.price)
    }

    fn check_patch(patch: &VendorPatch) -> errors::Result<()> {
        if let Some(name) = &patch.name {
            check_required("name", name)?;
        }
        if let Some(category) = &patch.category {
            check_required("category", category)?;
        }
        patch.price.map_or(Ok(()), check_price)
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
        Column::CreatedAt
    }

    fn created_column() -> Column {
        Column::CreatedAt
    }

    fn draft_into_active(draft: VendorDraft, owner: &Identity) -> ActiveModel {
        ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(draft.name),
            category: Set(draft.category),
            contact: Set(draft.contact),
            price: Set(draft.price),
            status: Set(draft.status),
            notes: Set(draft.notes),
            created_at: Set(Utc::now()),
            user_id: Set(owner.as_str().to_owned()),
        }
    }

    fn patch_into_active(patch: &VendorPatch) -> ActiveModel {
        ActiveModel {
            name: changed(patch.name.clone()),
            category: changed(patch.category.clone()),
            contact: changed(patch.contact.clone()),
            price: changed(patch.price),
            status: changed(patch.status),
            notes: changed(patch.notes.clone()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> VendorDraft {
        VendorDraft {
            name: "Flor de Lis".to_string(),
            category: "Flowers".to_string(),
            price: 1200.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_draft_defaults_to_pending() {
        assert_eq!(VendorDraft::default().status, VendorStatus::Pending);
    }

    #[test]
    fn test_draft_validation() {
        assert!(Model::check_draft(&draft()).is_ok());

        let unnamed = VendorDraft {
            name: String::new(),
            ..draft()
        };
        assert!(Model::check_draft(&unnamed).is_err());

        let uncategorized = VendorDraft {
            category: " ".to_string(),
            ..draft()
        };
        assert!(Model::check_draft(&uncategorized).is_err());

        let negative = VendorDraft {
            price: -1.0,
            ..draft()
        };
        assert!(Model::check_draft(&negative).is_err());

        let nan = VendorDraft {
            price: f64::NAN,
            ..draft()
        };
        assert!(Model::check_draft(&nan).is_err());
    }

    #[test]
    fn test_patch_validation() {
        let bad_price = VendorPatch {
            price: Some(f64::INFINITY),
            ..Default::default()
        };
        assert!(Model::check_patch(&bad_price).is_err());

        let confirm = VendorPatch {
            status: Some(VendorStatus::Confirmed),
            ..Default::default()
        };
        assert!(Model::check_patch(&confirm).is_ok());
    }
}
