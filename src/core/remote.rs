//! Remote store seams and their SeaORM implementation.
//!
//! [`RemoteTable`] and [`RemoteSingleton`] are the row-oriented calls the sync stores
//! make against the hosted backend. [`SeaRemote`] implements them over any SeaORM
//! connection. Every query filters on the owner column, which stands in for the
//! backend's row-level security.

use crate::{
    core::{
        record::{Direction, Record, SingletonRecord},
        session::Identity,
    },
    entities::{WeddingInfo, wedding_info},
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, FromQueryResult, IntoActiveModel, Order, PaginatorTrait, QueryFilter,
    QueryOrder, Set, Value, prelude::Uuid, sea_query::OnConflict,
};
use tracing::{debug, instrument};

/// Row-oriented collection API for list-shaped collections.
#[async_trait]
pub trait RemoteTable<R: Record>: Send + Sync {
    /// All rows owned by `owner`, in [`crate::core::record::compare`] order.
    async fn select_owned(&self, owner: &Identity) -> Result<Vec<R>>;
    /// Inserts `draft` owned by `owner` and returns the stored row.
    async fn insert(&self, owner: &Identity, draft: R::Draft) -> Result<R>;
    /// Applies `patch` to row `id` if `owner` can see it.
    async fn update(&self, owner: &Identity, id: Uuid, patch: &R::Patch) -> Result<()>;
    /// Deletes row `id` if `owner` can see it.
    async fn delete(&self, owner: &Identity, id: Uuid) -> Result<()>;
}

/// Row-oriented API for one-row-per-identity collections.
#[async_trait]
pub trait RemoteSingleton<R: SingletonRecord>: Send + Sync {
    /// The row owned by `owner`, if one exists.
    async fn select_one(&self, owner: &Identity) -> Result<Option<R>>;
    /// Writes `fields` as `owner`'s row, inserting or replacing, and returns it.
    async fn upsert(&self, owner: &Identity, fields: R::Fields) -> Result<R>;
}

/// How a [`Record`] maps onto its SeaORM entity.
///
/// The record type is the entity's `Model`; the mapping also builds the active models
/// for inserts (where the backend assigns id and creation time) and partial updates.
pub trait TableMapping: Record {
    /// Entity whose model is this record.
    type Entity: EntityTrait<Model = Self>;
    /// Active model of [`TableMapping::Entity`].
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + 'static;

    /// Primary key column.
    fn id_column() -> <Self::Entity as EntityTrait>::Column;
    /// Owner column used as the visibility filter.
    fn owner_column() -> <Self::Entity as EntityTrait>::Column;
    /// Column the collection is ordered by.
    fn sort_column() -> <Self::Entity as EntityTrait>::Column;
    /// Creation time column, the tie-breaker after [`TableMapping::sort_column`].
    fn created_column() -> <Self::Entity as EntityTrait>::Column;
    /// Full row for an insert, including the server-assigned id and timestamp.
    fn draft_into_active(draft: Self::Draft, owner: &Identity) -> Self::ActiveModel;
    /// Only the fields present in `patch` are set.
    fn patch_into_active(patch: &Self::Patch) -> Self::ActiveModel;
}

/// `Set` when a patch carries a value, `NotSet` otherwise.
pub fn changed<V>(value: Option<V>) -> ActiveValue<V>
where
    V: Into<Value>,
{
    value.map_or(ActiveValue::NotSet, ActiveValue::Set)
}

/// SeaORM-backed remote store.
#[derive(Debug, Clone)]
pub struct SeaRemote {
    db: DatabaseConnection,
}

impl SeaRemote {
    /// Wraps an open connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

const fn order_of(direction: Direction) -> Order {
    match direction {
        Direction::Ascending => Order::Asc,
        Direction::Descending => Order::Desc,
    }
}

#[async_trait]
impl<R> RemoteTable<R> for SeaRemote
where
    R: TableMapping + IntoActiveModel<<R as TableMapping>::ActiveModel> + FromQueryResult,
{
    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    async fn select_owned(&self, owner: &Identity) -> Result<Vec<R>> {
        let rows = <R::Entity as EntityTrait>::find()
            .filter(R::owner_column().eq(owner.as_str()))
            .order_by(R::sort_column(), order_of(R::DIRECTION))
            .order_by_asc(R::created_column())
            .order_by_asc(R::id_column())
            .all(&self.db)
            .await?;
        debug!("Selected {} rows", rows.len());
        Ok(rows)
    }

    #[instrument(skip(self, draft), fields(collection = R::COLLECTION))]
    async fn insert(&self, owner: &Identity, draft: R::Draft) -> Result<R> {
        R::draft_into_active(draft, owner)
            .insert(&self.db)
            .await
            .map_err(Into::into)
    }

    #[instrument(skip(self, patch), fields(collection = R::COLLECTION))]
    async fn update(&self, owner: &Identity, id: Uuid, patch: &R::Patch) -> Result<()> {
        let changes = R::patch_into_active(patch);
        let matched = if changes.is_changed() {
            <R::Entity as EntityTrait>::update_many()
                .set(changes)
                .filter(R::id_column().eq(id))
                .filter(R::owner_column().eq(owner.as_str()))
                .exec(&self.db)
                .await?
                .rows_affected
        } else {
            // Nothing to write, but an unknown id is still reported
            <R::Entity as EntityTrait>::find()
                .filter(R::id_column().eq(id))
                .filter(R::owner_column().eq(owner.as_str()))
                .count(&self.db)
                .await?
        };

        if matched == 0 {
            return Err(Error::RowNotFound {
                collection: R::COLLECTION,
                id,
            });
        }
        Ok(())
    }

    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    async fn delete(&self, owner: &Identity, id: Uuid) -> Result<()> {
        let result = <R::Entity as EntityTrait>::delete_many()
            .filter(R::id_column().eq(id))
            .filter(R::owner_column().eq(owner.as_str()))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(Error::RowNotFound {
                collection: R::COLLECTION,
                id,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteSingleton<wedding_info::Model> for SeaRemote {
    #[instrument(skip(self))]
    async fn select_one(&self, owner: &Identity) -> Result<Option<wedding_info::Model>> {
        WeddingInfo::find()
            .filter(wedding_info::Column::UserId.eq(owner.as_str()))
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    #[instrument(skip(self, fields))]
    async fn upsert(
        &self,
        owner: &Identity,
        fields: wedding_info::WeddingInfoFields,
    ) -> Result<wedding_info::Model> {
        use wedding_info::Column;

        let now = Utc::now();
        let row = wedding_info::ActiveModel {
            id: Set(Uuid::new_v4()),
            couple_names: Set(fields.couple_names),
            wedding_date: Set(fields.wedding_date),
            venue: Set(fields.venue),
            guest_count: Set(fields.guest_count),
            budget_total: Set(fields.budget_total),
            style: Set(fields.style),
            created_at: Set(now),
            updated_at: Set(now),
            user_id: Set(owner.as_str().to_owned()),
        };

        // An existing row keeps its id and creation time
        WeddingInfo::insert(row)
            .on_conflict(
                OnConflict::column(Column::UserId)
                    .update_columns([
                        Column::CoupleNames,
                        Column::WeddingDate,
                        Column::Venue,
                        Column::GuestCount,
                        Column::BudgetTotal,
                        Column::Style,
                        Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        self.select_one(owner).await?.ok_or_else(|| {
            Error::Database(DbErr::RecordNotFound(format!(
                "{} row for {owner} missing after upsert",
                wedding_info::Model::COLLECTION
            )))
        })
    }
}
