//! Client-side reflection of one remote collection.
//!
//! [`SyncStore`] caches the active identity's rows of a single collection and keeps them
//! consistent with the remote store, assuming this client is the only writer. Local state
//! changes only after the remote call reports success; a failed call leaves the cache
//! exactly as it was and returns the error.

use crate::{
    core::{
        record::{Record, insertion_index},
        remote::RemoteTable,
        session::Identity,
    },
    errors::{Error, Result},
};
use sea_orm::prelude::Uuid;
use std::marker::PhantomData;
use tracing::{debug, info, instrument, trace, warn};

/// Cached, ordered rows of one collection for one identity.
#[derive(Debug)]
pub struct SyncStore<R, B> {
    remote: B,
    owner: Option<Identity>,
    rows: Vec<R>,
    loaded: bool,
    _record: PhantomData<fn() -> R>,
}

impl<R, B> SyncStore<R, B>
where
    R: Record,
    B: RemoteTable<R>,
{
    /// Creates an empty store with no identity.
    pub const fn new(remote: B) -> Self {
        Self {
            remote,
            owner: None,
            rows: Vec::new(),
            loaded: false,
            _record: PhantomData,
        }
    }

    /// Current cached rows in collection order. Empty before the first successful fetch.
    pub fn list(&self) -> &[R] {
        &self.rows
    }

    /// Cached row with `id`, if any.
    pub fn get(&self, id: Uuid) -> Option<&R> {
        self.rows.iter().find(|row| row.id() == id)
    }

    /// Identity the cache belongs to.
    pub const fn owner(&self) -> Option<&Identity> {
        self.owner.as_ref()
    }

    /// Whether a fetch has succeeded for the current identity.
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The remote store this cache reflects.
    pub const fn remote(&self) -> &B {
        &self.remote
    }

    fn reset(&mut self, identity: Option<Identity>) {
        self.rows.clear();
        self.loaded = false;
        self.owner = identity;
    }

    /// Re-targets the store at `identity`.
    ///
    /// The previous identity's rows are dropped before anything is awaited, so the cache
    /// is empty until the new identity's rows arrive (or stays empty when signed out).
    pub async fn switch_identity(&mut self, identity: Option<Identity>) -> Result<()> {
        self.reset(identity.clone());
        match identity {
            Some(identity) => self.refresh(&identity).await,
            None => {
                debug!("{} store cleared, no active identity", R::COLLECTION);
                Ok(())
            }
        }
    }

    /// Replaces the cache with every row `identity` owns.
    ///
    /// On failure the cache is left untouched (empty, if `identity` is new to this store).
    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    pub async fn refresh(&mut self, identity: &Identity) -> Result<()> {
        if self.owner.as_ref() != Some(identity) {
            self.reset(Some(identity.clone()));
        }

        let mut rows = self
            .remote
            .select_owned(identity)
            .await
            .inspect_err(|e| warn!("Failed to fetch {}: {}", R::COLLECTION, e))?;

        let fetched = rows.len();
        rows.retain(|row| row.owner_id() == identity.as_str());
        if rows.len() != fetched {
            warn!(
                "Dropped {} {} rows owned by another identity",
                fetched - rows.len(),
                R::COLLECTION
            );
        }

        self.rows = rows;
        self.loaded = true;
        info!("{} cache refreshed with {} rows", R::COLLECTION, self.rows.len());
        trace!("{} cache now contains: {:?}", R::COLLECTION, self.rows);
        Ok(())
    }

    /// Persists `draft` as a new row owned by `identity` and caches it in sorted position.
    ///
    /// # Errors
    /// - [`Error::Validation`] when the draft is incomplete; nothing is sent
    /// - [`Error::IdentityMismatch`] when the cache belongs to another identity, or to
    ///   none yet (a signed-out store does not create); use [`crate::core::planner::Planner`]
    ///   for the signed-out no-op
    /// - the remote failure, with the cache unchanged
    #[instrument(skip(self, draft), fields(collection = R::COLLECTION))]
    pub async fn create(&mut self, identity: &Identity, draft: R::Draft) -> Result<R> {
        R::check_draft(&draft)?;
        if self.owner.as_ref() != Some(identity) {
            return Err(Error::IdentityMismatch {
                collection: R::COLLECTION,
            });
        }

        let record = self
            .remote
            .insert(identity, draft)
            .await
            .inspect_err(|e| warn!("Failed to create {} row: {}", R::COLLECTION, e))?;

        let at = insertion_index(&self.rows, &record);
        self.rows.insert(at, record.clone());
        debug!("Created {} row {} at position {}", R::COLLECTION, record.id(), at);
        Ok(record)
    }

    /// Sends `patch` for row `id`, then merges it into the cached row.
    ///
    /// Id, owner and creation time are untouched. A row whose sort key changed moves to
    /// its sorted position. A no-op when no identity is active.
    #[instrument(skip(self, patch), fields(collection = R::COLLECTION))]
    pub async fn update(&mut self, id: Uuid, patch: R::Patch) -> Result<()> {
        let Some(owner) = self.owner.clone() else {
            debug!("Ignoring {} update, no active identity", R::COLLECTION);
            return Ok(());
        };
        R::check_patch(&patch)?;

        self.remote
            .update(&owner, id, &patch)
            .await
            .inspect_err(|e| warn!("Failed to update {} row {}: {}", R::COLLECTION, id, e))?;

        if let Some(at) = self.rows.iter().position(|row| row.id() == id) {
            let mut row = self.rows.remove(at);
            row.apply(&patch);
            let to = insertion_index(&self.rows, &row);
            self.rows.insert(to, row);
            trace!("{} row {} moved from {} to {}", R::COLLECTION, id, at, to);
        }
        Ok(())
    }

    /// Deletes row `id` remotely, then drops it from the cache.
    ///
    /// A no-op when no identity is active.
    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    pub async fn delete(&mut self, id: Uuid) -> Result<()> {
        let Some(owner) = self.owner.clone() else {
            debug!("Ignoring {} delete, no active identity", R::COLLECTION);
            return Ok(());
        };

        self.remote
            .delete(&owner, id)
            .await
            .inspect_err(|e| warn!("Failed to delete {} row {}: {}", R::COLLECTION, id, e))?;

        self.rows.retain(|row| row.id() != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::remote::SeaRemote;
    use crate::entities::{
        BudgetModel, GuestModel, TaskModel, VendorModel, budget, guest, task, vendor,
    };
    use crate::test_utils::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use sea_orm::EntityTrait;

    /// Returns every guest row regardless of owner.
    #[derive(Debug, Clone)]
    struct IgnoresOwner(SeaRemote);

    #[async_trait]
    impl RemoteTable<GuestModel> for IgnoresOwner {
        async fn select_owned(&self, _owner: &Identity) -> Result<Vec<GuestModel>> {
            Ok(crate::entities::Guest::find().all(self.0.connection()).await?)
        }

        async fn insert(&self, owner: &Identity, draft: guest::GuestDraft) -> Result<GuestModel> {
            RemoteTable::<GuestModel>::insert(&self.0, owner, draft).await
        }

        async fn update(
            &self,
            owner: &Identity,
            id: Uuid,
            patch: &guest::GuestPatch,
        ) -> Result<()> {
            RemoteTable::<GuestModel>::update(&self.0, owner, id, patch).await
        }

        async fn delete(&self, owner: &Identity, id: Uuid) -> Result<()> {
            RemoteTable::<GuestModel>::delete(&self.0, owner, id).await
        }
    }

    fn titles(store: &SyncStore<TaskModel, impl RemoteTable<TaskModel>>) -> Vec<&str> {
        store.list().iter().map(|t| t.title.as_str()).collect()
    }

    async fn remote_rows<R, B>(store: &SyncStore<R, B>) -> Vec<R>
    where
        R: Record,
        B: RemoteTable<R>,
    {
        let owner = store.owner().unwrap();
        store.remote().select_owned(owner).await.unwrap()
    }

    async fn signed_in<R, B>(remote: B, who: &str) -> SyncStore<R, B>
    where
        R: Record,
        B: RemoteTable<R>,
    {
        let mut store = SyncStore::new(remote);
        store.switch_identity(Some(Identity::from(who))).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_list_empty_before_first_fetch() -> Result<()> {
        init_test_tracing();
        let store: SyncStore<GuestModel, _> = SyncStore::new(setup_remote().await?);
        assert!(store.list().is_empty());
        assert!(!store.is_loaded());
        assert!(store.owner().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_round_trip_consistency_for_guests() -> Result<()> {
        init_test_tracing();
        let mut store: SyncStore<GuestModel, _> = signed_in(setup_remote().await?, "alice").await;
        let alice = Identity::from("alice");
        assert!(store.is_loaded());

        let ana = store.create(&alice, guest_draft("Ana")).await?;
        assert_eq!(store.list(), remote_rows(&store).await.as_slice());

        let bia = store.create(&alice, guest_draft("Bia")).await?;
        assert_eq!(store.list()[0].id, bia.id, "newest guest first");
        assert_eq!(store.list(), remote_rows(&store).await.as_slice());

        store
            .update(
                ana.id,
                guest::GuestPatch {
                    confirmed: Some(true),
                    dietary_restrictions: Some("vegetarian".to_string()),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(store.list(), remote_rows(&store).await.as_slice());
        let cached = store.get(ana.id).unwrap();
        assert!(cached.confirmed);
        assert_eq!(cached.created_at, ana.created_at);
        assert_eq!(cached.user_id, "alice");

        store.delete(bia.id).await?;
        assert_eq!(store.list(), remote_rows(&store).await.as_slice());
        assert_eq!(store.list().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_vendors_newest_first() -> Result<()> {
        let mut store: SyncStore<VendorModel, _> = signed_in(setup_remote().await?, "alice").await;
        let alice = Identity::from("alice");

        store.create(&alice, vendor_draft("Foto Arte", "Photography")).await?;
        let florist = store.create(&alice, vendor_draft("Flor de Lis", "Flowers")).await?;

        assert_eq!(store.list()[0].id, florist.id);
        assert_eq!(store.list(), remote_rows(&store).await.as_slice());

        store
            .update(
                florist.id,
                vendor::VendorPatch {
                    status: Some(vendor::VendorStatus::Confirmed),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(store.list()[0].status, vendor::VendorStatus::Confirmed);
        assert_eq!(store.list(), remote_rows(&store).await.as_slice());
        Ok(())
    }

    #[tokio::test]
    async fn test_task_inserted_in_due_date_order() -> Result<()> {
        let mut store: SyncStore<TaskModel, _> = signed_in(setup_remote().await?, "alice").await;
        let alice = Identity::from("alice");

        store.create(&alice, task_draft("Fitting", "2024-02-01")).await?;
        store.create(&alice, task_draft("Cake tasting", "2024-03-01")).await?;
        store.create(&alice, task_draft("Book venue", "2024-01-01")).await?;

        let dues: Vec<String> = store
            .list()
            .iter()
            .map(|t| t.due_date.unwrap().to_string())
            .collect();
        assert_eq!(dues, ["2024-01-01", "2024-02-01", "2024-03-01"]);
        assert_eq!(store.list(), remote_rows(&store).await.as_slice());
        Ok(())
    }

    #[tokio::test]
    async fn test_budget_inserted_in_category_order() -> Result<()> {
        let mut store: SyncStore<BudgetModel, _> = signed_in(setup_remote().await?, "alice").await;
        let alice = Identity::from("alice");

        store.create(&alice, budget_draft("Catering")).await?;
        store.create(&alice, budget_draft("Music")).await?;
        store.create(&alice, budget_draft("Flowers")).await?;

        let categories: Vec<&str> = store.list().iter().map(|b| b.category.as_str()).collect();
        assert_eq!(categories, ["Catering", "Flowers", "Music"]);
        assert_eq!(store.list(), remote_rows(&store).await.as_slice());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_keeps_position_when_key_unchanged() -> Result<()> {
        let mut store: SyncStore<TaskModel, _> = signed_in(setup_remote().await?, "alice").await;
        let alice = Identity::from("alice");

        let early = store.create(&alice, task_draft("Invitations", "2024-01-10")).await?;
        store.create(&alice, task_draft("Rings", "2024-02-10")).await?;

        store
            .update(
                early.id,
                task::TaskPatch {
                    title: Some("Send invitations".to_string()),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(store.list()[0].title, "Send invitations");
        assert_eq!(store.list()[0].id, early.id);
        assert_eq!(store.list()[0].created_at, early.created_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_due_date_change_moves_task() -> Result<()> {
        let mut store: SyncStore<TaskModel, _> = signed_in(setup_remote().await?, "alice").await;
        let alice = Identity::from("alice");

        let jan = store.create(&alice, task_draft("Jan", "2024-01-01")).await?;
        store.create(&alice, task_draft("Feb", "2024-02-01")).await?;

        store
            .update(
                jan.id,
                task::TaskPatch {
                    due_date: Some(NaiveDate::from_ymd_opt(2024, 4, 1)),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(titles(&store), ["Feb", "Jan"]);
        assert_eq!(store.list(), remote_rows(&store).await.as_slice());

        store.create(&alice, task_draft("Mar", "2024-03-01")).await?;
        assert_eq!(titles(&store), ["Feb", "Mar", "Jan"]);
        assert_eq!(store.list(), remote_rows(&store).await.as_slice());
        Ok(())
    }

    #[tokio::test]
    async fn test_category_rename_moves_budget_item() -> Result<()> {
        let mut store: SyncStore<BudgetModel, _> = signed_in(setup_remote().await?, "alice").await;
        let alice = Identity::from("alice");

        let catering = store.create(&alice, budget_draft("Catering")).await?;
        store.create(&alice, budget_draft("Music")).await?;
        store
            .update(
                catering.id,
                budget::BudgetPatch {
                    category: Some("Venue".to_string()),
                    actual_amount: Some(120.0),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(store.list(), remote_rows(&store).await.as_slice());

        store.create(&alice, budget_draft("Flowers")).await?;
        let categories: Vec<&str> = store.list().iter().map(|b| b.category.as_str()).collect();
        assert_eq!(categories, ["Flowers", "Music", "Venue"]);
        assert_eq!(store.list(), remote_rows(&store).await.as_slice());
        Ok(())
    }

    #[tokio::test]
    async fn test_undated_tasks_come_first() -> Result<()> {
        let mut store: SyncStore<TaskModel, _> = signed_in(setup_remote().await?, "alice").await;
        let alice = Identity::from("alice");
        let undated = |title: &str| task::TaskDraft {
            title: title.to_string(),
            ..Default::default()
        };

        store.create(&alice, task_draft("Fitting", "2024-02-01")).await?;
        store.create(&alice, undated("Playlist")).await?;
        store.create(&alice, task_draft("Book venue", "2024-01-01")).await?;
        store.create(&alice, undated("Favors")).await?;

        assert_eq!(titles(&store), ["Playlist", "Favors", "Book venue", "Fitting"]);
        assert_eq!(store.list(), remote_rows(&store).await.as_slice());

        let mut fresh: SyncStore<TaskModel, _> = SyncStore::new(store.remote().clone());
        fresh.refresh(&alice).await?;
        assert_eq!(fresh.list(), store.list());
        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_drops_rows_of_other_identities() -> Result<()> {
        let remote = IgnoresOwner(setup_remote().await?);
        let alice = Identity::from("alice");
        let bob = Identity::from("bob");
        RemoteTable::<GuestModel>::insert(&remote, &bob, guest_draft("Bruno")).await?;

        let mut store: SyncStore<GuestModel, _> = signed_in(remote, "alice").await;
        assert!(store.list().is_empty());

        store.create(&alice, guest_draft("Ana")).await?;
        store.refresh(&alice).await?;
        let names: Vec<&str> = store.list().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["Ana"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_operations_leave_cache_unchanged() -> Result<()> {
        init_test_tracing();
        let remote = FlakyRemote::new(setup_remote().await?);
        let mut store: SyncStore<GuestModel, _> = signed_in(remote.clone(), "alice").await;
        let alice = Identity::from("alice");
        let ana = store.create(&alice, guest_draft("Ana")).await?;
        let before = store.list().to_vec();

        remote.fail(true);

        let created = store.create(&alice, guest_draft("Bia")).await;
        assert!(matches!(created, Err(Error::Database(_))));
        assert_eq!(store.list(), before.as_slice());

        let patch = guest::GuestPatch {
            confirmed: Some(true),
            ..Default::default()
        };
        assert!(store.update(ana.id, patch).await.is_err());
        assert_eq!(store.list(), before.as_slice());

        assert!(store.delete(ana.id).await.is_err());
        assert_eq!(store.list(), before.as_slice());

        assert!(store.refresh(&alice).await.is_err());
        assert_eq!(store.list(), before.as_slice());
        assert!(store.is_loaded());

        remote.fail(false);
        assert_eq!(store.list(), remote_rows(&store).await.as_slice());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_id_leaves_cache_unchanged() -> Result<()> {
        let mut store: SyncStore<BudgetModel, _> = signed_in(setup_remote().await?, "alice").await;
        let alice = Identity::from("alice");
        store.create(&alice, budget_draft("Catering")).await?;
        let before = store.list().to_vec();

        let result = store.delete(Uuid::new_v4()).await;
        assert!(matches!(
            result,
            Err(Error::RowNotFound {
                collection: "budget",
                ..
            })
        ));
        assert_eq!(store.list(), before.as_slice());
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_draft_is_not_sent() -> Result<()> {
        let remote = FlakyRemote::new(setup_remote().await?);
        let mut store: SyncStore<GuestModel, _> = signed_in(remote.clone(), "alice").await;
        let calls = remote.calls();

        let result = store
            .create(&Identity::from("alice"), guest::GuestDraft::default())
            .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert_eq!(remote.calls(), calls);
        assert!(store.list().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_for_other_identity_is_rejected() -> Result<()> {
        let remote = FlakyRemote::new(setup_remote().await?);
        let mut store: SyncStore<GuestModel, _> = signed_in(remote.clone(), "alice").await;
        let calls = remote.calls();

        let result = store.create(&Identity::from("bob"), guest_draft("Bruno")).await;
        assert!(matches!(result, Err(Error::IdentityMismatch { .. })));
        assert_eq!(remote.calls(), calls);
        Ok(())
    }

    #[tokio::test]
    async fn test_switch_identity_never_shows_previous_rows() -> Result<()> {
        let remote = FlakyRemote::new(setup_remote().await?);
        let alice = Identity::from("alice");
        let bob = Identity::from("bob");

        let mut store: SyncStore<GuestModel, _> = signed_in(remote.clone(), "alice").await;
        store.create(&alice, guest_draft("Ana")).await?;

        store.switch_identity(Some(bob.clone())).await?;
        assert!(store.list().is_empty());
        store.create(&bob, guest_draft("Bruno")).await?;
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.list()[0].user_id, "bob");

        // A failed fetch for the new identity leaves the cache empty, not Alice's
        remote.fail(true);
        assert!(store.switch_identity(Some(alice.clone())).await.is_err());
        assert!(store.list().is_empty());
        assert!(!store.is_loaded());
        assert_eq!(store.owner(), Some(&alice));

        remote.fail(false);
        store.switch_identity(None).await?;
        assert!(store.list().is_empty());
        assert!(store.owner().is_none());

        store.refresh(&alice).await?;
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.list()[0].name, "Ana");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_without_identity_are_noops() -> Result<()> {
        let remote = FlakyRemote::new(setup_remote().await?);
        let mut store: SyncStore<GuestModel, _> = SyncStore::new(remote.clone());

        store.update(Uuid::new_v4(), guest::GuestPatch::default()).await?;
        store.delete(Uuid::new_v4()).await?;
        assert_eq!(remote.calls(), 0);
        Ok(())
    }
}
