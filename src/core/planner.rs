//! The planner: every synced collection of the dashboard behind one session.
//!
//! [`Planner`] owns a store per collection over a shared remote backend and follows the
//! session's identity. Whenever the identity changes every store is re-targeted, so rows
//! of a previous identity are never visible. Writes issued while signed out are no-ops.

use crate::{
    core::{
        remote::{RemoteSingleton, RemoteTable},
        session::{Identity, IdentityWatch, Session},
        singleton::SingletonStore,
        store::SyncStore,
        summary::{self, DashboardSummary},
    },
    entities::{
        BudgetModel, GuestModel, TaskModel, VendorModel, WeddingInfoModel,
        budget::{BudgetDraft, BudgetPatch},
        guest::{GuestDraft, GuestPatch},
        task::{TaskDraft, TaskPatch},
        vendor::{VendorDraft, VendorPatch},
        wedding_info::WeddingInfoFields,
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::prelude::Uuid;
use tracing::{debug, info, warn};

/// Guest list store.
pub type GuestStore<B> = SyncStore<GuestModel, B>;
/// Vendor store.
pub type VendorStore<B> = SyncStore<VendorModel, B>;
/// Task store.
pub type TaskStore<B> = SyncStore<TaskModel, B>;
/// Budget store.
pub type BudgetStore<B> = SyncStore<BudgetModel, B>;
/// Wedding info store.
pub type WeddingStore<B> = SingletonStore<WeddingInfoModel, B>;

/// Every backend call a planner needs.
pub trait PlannerBackend:
    RemoteTable<GuestModel>
    + RemoteTable<VendorModel>
    + RemoteTable<TaskModel>
    + RemoteTable<BudgetModel>
    + RemoteSingleton<WeddingInfoModel>
    + Clone
{
}

impl<B> PlannerBackend for B where
    B: RemoteTable<GuestModel>
        + RemoteTable<VendorModel>
        + RemoteTable<TaskModel>
        + RemoteTable<BudgetModel>
        + RemoteSingleton<WeddingInfoModel>
        + Clone
{
}

/// All dashboard collections for the session's identity.
#[derive(Debug)]
pub struct Planner<B> {
    session: IdentityWatch,
    identity: Option<Identity>,
    guests: GuestStore<B>,
    vendors: VendorStore<B>,
    tasks: TaskStore<B>,
    budget: BudgetStore<B>,
    wedding: WeddingStore<B>,
}

impl<B: PlannerBackend> Planner<B> {
    /// Creates a planner subscribed to `session`. Call [`Planner::sync_identity`] to load.
    pub fn new(remote: B, session: &Session) -> Self {
        Self {
            session: session.subscribe(),
            identity: None,
            guests: SyncStore::new(remote.clone()),
            vendors: SyncStore::new(remote.clone()),
            tasks: SyncStore::new(remote.clone()),
            budget: SyncStore::new(remote.clone()),
            wedding: SingletonStore::new(remote),
        }
    }

    /// Identity the planner currently serves.
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Guest list.
    pub const fn guests(&self) -> &GuestStore<B> {
        &self.guests
    }

    /// Vendors.
    pub const fn vendors(&self) -> &VendorStore<B> {
        &self.vendors
    }

    /// Tasks.
    pub const fn tasks(&self) -> &TaskStore<B> {
        &self.tasks
    }

    /// Budget items.
    pub const fn budget(&self) -> &BudgetStore<B> {
        &self.budget
    }

    /// Wedding info.
    pub const fn wedding(&self) -> &WeddingStore<B> {
        &self.wedding
    }

    /// Adopts the session's current identity, re-targeting every store if it changed.
    ///
    /// Every store is re-targeted even when one of them fails to load; the first
    /// failure is returned afterwards.
    pub async fn sync_identity(&mut self) -> Result<()> {
        let current = self.session.borrow_and_update().clone();
        if current == self.identity {
            debug!("Identity unchanged, stores kept");
            return Ok(());
        }

        match &current {
            Some(identity) => info!("Loading planner for {}", identity),
            None => info!("Signed out, clearing planner"),
        }
        self.identity.clone_from(&current);

        let results = [
            self.guests.switch_identity(current.clone()).await,
            self.vendors.switch_identity(current.clone()).await,
            self.tasks.switch_identity(current.clone()).await,
            self.budget.switch_identity(current.clone()).await,
            self.wedding.switch_identity(current).await,
        ];
        first_failure(results)
    }

    /// Waits for the next identity change and applies it.
    ///
    /// Returns `Ok(false)` once the session has been dropped.
    pub async fn next_identity_change(&mut self) -> Result<bool> {
        if self.session.changed().await.is_err() {
            warn!("Session closed, planner stops following identity changes");
            return Ok(false);
        }
        self.sync_identity().await?;
        Ok(true)
    }

    /// Re-fetches every collection for the current identity. A no-op when signed out.
    pub async fn refresh_all(&mut self) -> Result<()> {
        let Some(identity) = self.identity.clone() else {
            return Ok(());
        };
        let results = [
            self.guests.refresh(&identity).await,
            self.vendors.refresh(&identity).await,
            self.tasks.refresh(&identity).await,
            self.budget.refresh(&identity).await,
            self.wedding.refresh(&identity).await,
        ];
        first_failure(results)
    }

    /// Adds a guest. `Ok(None)` when signed out.
    pub async fn add_guest(&mut self, draft: GuestDraft) -> Result<Option<GuestModel>> {
        let Some(identity) = self.identity.clone() else {
            return Ok(None);
        };
        self.guests.create(&identity, draft).await.map(Some)
    }

    /// Adds a vendor. `Ok(None)` when signed out.
    pub async fn add_vendor(&mut self, draft: VendorDraft) -> Result<Option<VendorModel>> {
        let Some(identity) = self.identity.clone() else {
            return Ok(None);
        };
        self.vendors.create(&identity, draft).await.map(Some)
    }

    /// Adds a task. `Ok(None)` when signed out.
    pub async fn add_task(&mut self, draft: TaskDraft) -> Result<Option<TaskModel>> {
        let Some(identity) = self.identity.clone() else {
            return Ok(None);
        };
        self.tasks.create(&identity, draft).await.map(Some)
    }

    /// Adds a budget item. `Ok(None)` when signed out.
    pub async fn add_budget_item(&mut self, draft: BudgetDraft) -> Result<Option<BudgetModel>> {
        let Some(identity) = self.identity.clone() else {
            return Ok(None);
        };
        self.budget.create(&identity, draft).await.map(Some)
    }

    /// Saves the wedding info. `Ok(None)` when signed out.
    pub async fn save_wedding_info(
        &mut self,
        fields: WeddingInfoFields,
    ) -> Result<Option<WeddingInfoModel>> {
        let Some(identity) = self.identity.clone() else {
            return Ok(None);
        };
        self.wedding.upsert(&identity, fields).await.map(Some)
    }

    /// Updates a guest. A no-op when signed out.
    pub async fn update_guest(&mut self, id: Uuid, patch: GuestPatch) -> Result<()> {
        self.guests.update(id, patch).await
    }

    /// Removes a guest. A no-op when signed out.
    pub async fn remove_guest(&mut self, id: Uuid) -> Result<()> {
        self.guests.delete(id).await
    }

    /// Updates a vendor. A no-op when signed out.
    pub async fn update_vendor(&mut self, id: Uuid, patch: VendorPatch) -> Result<()> {
        self.vendors.update(id, patch).await
    }

    /// Removes a vendor. A no-op when signed out.
    pub async fn remove_vendor(&mut self, id: Uuid) -> Result<()> {
        self.vendors.delete(id).await
    }

    /// Updates a task. A no-op when signed out.
    pub async fn update_task(&mut self, id: Uuid, patch: TaskPatch) -> Result<()> {
        self.tasks.update(id, patch).await
    }

    /// Removes a task. A no-op when signed out.
    pub async fn remove_task(&mut self, id: Uuid) -> Result<()> {
        self.tasks.delete(id).await
    }

    /// Updates a budget item. A no-op when signed out.
    pub async fn update_budget_item(&mut self, id: Uuid, patch: BudgetPatch) -> Result<()> {
        self.budget.update(id, patch).await
    }

    /// Removes a budget item. A no-op when signed out.
    pub async fn remove_budget_item(&mut self, id: Uuid) -> Result<()> {
        self.budget.delete(id).await
    }

    /// Dashboard figures over the current caches.
    pub fn summary(&self, today: NaiveDate) -> DashboardSummary {
        summary::summarize(
            self.guests.list(),
            self.tasks.list(),
            self.budget.list(),
            self.wedding.value(),
            today,
        )
    }

    /// The first `limit` open tasks.
    pub fn upcoming_tasks(&self, limit: usize) -> Vec<&TaskModel> {
        summary::upcoming_tasks(self.tasks.list(), limit)
    }
}

fn first_failure<const N: usize>(results: [Result<()>; N]) -> Result<()> {
    results.into_iter().find(Result::is_err).unwrap_or(Ok(()))
}
