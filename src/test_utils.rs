//! Shared test utilities for the planner.
//!
//! Helpers for setting up an in-memory remote, building drafts with sensible defaults,
//! and injecting backend failures.

use crate::{
    core::{
        record::{Record, SingletonRecord},
        remote::{RemoteSingleton, RemoteTable, SeaRemote},
        session::Identity,
    },
    entities::{
        budget::BudgetDraft, guest::GuestDraft, task::TaskDraft, vendor::VendorDraft,
        wedding_info::WeddingInfoFields,
    },
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, DbErr, prelude::Uuid};
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly subscriber once. Set `RUST_LOG` to see output.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = crate::config::database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A [`SeaRemote`] over a fresh in-memory database.
pub async fn setup_remote() -> Result<SeaRemote> {
    Ok(SeaRemote::new(setup_test_db().await?))
}

/// Guest draft with only a name.
pub fn guest_draft(name: &str) -> GuestDraft {
    GuestDraft {
        name: name.to_string(),
        ..Default::default()
    }
}

/// Pending vendor draft with a price of 1000.
pub fn vendor_draft(name: &str, category: &str) -> VendorDraft {
    VendorDraft {
        name: name.to_string(),
        category: category.to_string(),
        price: 1_000.0,
        ..Default::default()
    }
}

/// Open task draft due on `due` (`YYYY-MM-DD`).
///
/// # Panics
/// If `due` is not a valid date.
#[allow(clippy::unwrap_used)]
pub fn task_draft(title: &str, due: &str) -> TaskDraft {
    TaskDraft {
        title: title.to_string(),
        due_date: Some(NaiveDate::parse_from_str(due, "%Y-%m-%d").unwrap()),
        ..Default::default()
    }
}

/// Budget draft planning 500 with nothing spent.
pub fn budget_draft(category: &str) -> BudgetDraft {
    BudgetDraft {
        category: category.to_string(),
        planned_amount: 500.0,
        ..Default::default()
    }
}

/// Wedding info for `couple_names` with default everything else.
pub fn wedding_fields(couple_names: &str) -> WeddingInfoFields {
    WeddingInfoFields {
        couple_names: couple_names.to_string(),
        ..Default::default()
    }
}

/// Wraps a backend, counting calls and failing every call while switched on.
#[derive(Debug, Clone)]
pub struct FlakyRemote<B = SeaRemote> {
    inner: B,
    fail: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl<B> FlakyRemote<B> {
    /// Wraps `inner`, initially healthy.
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            fail: Arc::new(AtomicBool::new(false)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Makes every following call fail (or succeed again).
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Calls received so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, operation: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Database(DbErr::Custom(format!(
                "injected failure during {operation}"
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl<R, B> RemoteTable<R> for FlakyRemote<B>
where
    R: Record,
    B: RemoteTable<R>,
{
    async fn select_owned(&self, owner: &Identity) -> Result<Vec<R>> {
        self.check("select")?;
        self.inner.select_owned(owner).await
    }

    async fn insert(&self, owner: &Identity, draft: R::Draft) -> Result<R> {
        self.check("insert")?;
        self.inner.insert(owner, draft).await
    }

    async fn update(&self, owner: &Identity, id: Uuid, patch: &R::Patch) -> Result<()> {
        self.check("update")?;
        self.inner.update(owner, id, patch).await
    }

    async fn delete(&self, owner: &Identity, id: Uuid) -> Result<()> {
        self.check("delete")?;
        self.inner.delete(owner, id).await
    }
}

#[async_trait]
impl<R, B> RemoteSingleton<R> for FlakyRemote<B>
where
    R: SingletonRecord,
    B: RemoteSingleton<R>,
{
    async fn select_one(&self, owner: &Identity) -> Result<Option<R>> {
        self.check("select")?;
        self.inner.select_one(owner).await
    }

    async fn upsert(&self, owner: &Identity, fields: R::Fields) -> Result<R> {
        self.check("upsert")?;
        self.inner.upsert(owner, fields).await
    }
}
