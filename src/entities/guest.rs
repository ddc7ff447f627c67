//! Guest entity - one invited person on the guest list.
//!
//! Tracks contact details, RSVP confirmation, plus-one and dietary notes.
//! The list is shown newest first.

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

/// Guest database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "guests")]
pub struct Model {
    /// Server-assigned identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Full name as printed on the invitation
    pub name: String,
    /// Contact e-mail, may be empty
    pub email: String,
    /// Contact phone, may be empty
    pub phone: String,
    /// Whether the guest has confirmed attendance
    pub confirmed: bool,
    /// Whether the guest brings a companion
    pub plus_one: bool,
    /// Free-form dietary notes
    pub dietary_restrictions: String,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// Owning identity
    pub user_id: String,
}

/// Guests have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Field values for a new guest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestDraft {
    /// Required, must not be blank
    pub name: String,
    /// Contact e-mail
    pub email: String,
    /// Contact phone
    pub phone: String,
    /// RSVP state
    pub confirmed: bool,
    /// Brings a companion
    pub plus_one: bool,
    /// Dietary notes
    pub dietary_restrictions: String,
}

/// Partial update of a guest; `None` leaves the field as is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestPatch {
    /// New name
    pub name: Option<String>,
    /// New e-mail
    pub email: Option<String>,
    /// New phone
    pub phone: Option<String>,
    /// New RSVP state
    pub confirmed: Option<bool>,
    /// New plus-one flag
    pub plus_one: Option<bool>,
    /// New dietary notes
    pub dietary_restrictions: Option<String>,
}

fn check_name(name: &str) -> errors::Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation(Model::COLLECTION, "guest name cannot be empty"));
    }
    Ok(())
}

impl Record for Model {
    type Draft = GuestDraft;
    type Patch = GuestPatch;
    type SortKey = DateTime<Utc>;

    const COLLECTION: &'static str = "guests";
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

    fn apply(&mut self, patch: &GuestPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(email) = &patch.email {
            self.email.clone_from(email);
        }
        if let Some(phone) = &patch.phone {
            self.phone.clone_from(phone);
        }
        if let Some(confirmed) = patch.confirmed {
            self.confirmed = confirmed;
        }
        if let Some(plus_one) = patch.plus_one {
            self.plus_one = plus_one;
        }
        if let Some(notes) = &patch.dietary_restrictions {
            self.dietary_restrictions.clone_from(notes);
        }
    }

    fn check_draft(draft: &GuestDraft) -> errors::Result<()> {
        check_name(&draft.name)
    }

    fn check_patch(patch: &GuestPatch) -> errors::Result<()> {
        patch.name.as_deref().map_or(Ok(()), check_name)
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

    fn draft_into_active(draft: GuestDraft, owner: &Identity) -> ActiveModel {
        ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(draft.name),
            email: Set(draft.email),
            phone: Set(draft.phone),
            confirmed: Set(draft.confirmed),
            plus_one: Set(draft.plus_one),
            dietary_restrictions: Set(draft.dietary_restrictions),
            created_at: Set(Utc::now()),
            user_id: Set(owner.as_str().to_owned()),
        }
    }

    fn patch_into_active(patch: &GuestPatch) -> ActiveModel {
        ActiveModel {
            name: changed(patch.name.clone()),
            email: changed(patch.email.clone()),
            phone: changed(patch.phone.clone()),
            confirmed: changed(patch.confirmed),
            plus_one: changed(patch.plus_one),
            dietary_restrictions: changed(patch.dietary_restrictions.clone()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Model {
        Model {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            phone: String::new(),
            confirmed: false,
            plus_one: false,
            dietary_restrictions: String::new(),
            created_at: Utc::now(),
            user_id: "alice".to_string(),
        }
    }

    #[test]
    fn test_apply_merges_only_present_fields() {
        let mut guest = sample();
        let original = guest.clone();
        guest.apply(&GuestPatch {
            confirmed: Some(true),
            phone: Some("555-0101".to_string()),
            ..Default::default()
        });

        assert!(guest.confirmed);
        assert_eq!(guest.phone, "555-0101");
        assert_eq!(guest.name, original.name);
        assert_eq!(guest.email, original.email);
        assert_eq!(guest.id, original.id);
        assert_eq!(guest.created_at, original.created_at);
        assert_eq!(guest.user_id, original.user_id);
    }

    #[test]
    fn test_draft_requires_name() {
        assert!(Model::check_draft(&GuestDraft::default()).is_err());
        let blank = GuestDraft {
            name: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            Model::check_draft(&blank),
            Err(Error::Validation {
                collection: "guests",
                ..
            })
        ));
        let named = GuestDraft {
            name: "Ana".to_string(),
            ..Default::default()
        };
        assert!(Model::check_draft(&named).is_ok());
    }

    #[test]
    fn test_patch_cannot_blank_name() {
        let patch = GuestPatch {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(Model::check_patch(&patch).is_err());
        assert!(Model::check_patch(&GuestPatch::default()).is_ok());
    }
}
