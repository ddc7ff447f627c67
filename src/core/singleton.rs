//! Client-side reflection of a one-row-per-identity collection.
//!
//! Same contract as [`crate::core::store::SyncStore`], except the cache holds at most
//! one value and writes go through a single upsert.

use crate::{
    core::{record::SingletonRecord, remote::RemoteSingleton, session::Identity},
    errors::{Error, Result},
};
use std::marker::PhantomData;
use tracing::{debug, info, instrument, warn};

/// Cached singleton row for one identity.
#[derive(Debug)]
pub struct SingletonStore<R, B> {
    remote: B,
    owner: Option<Identity>,
    value: Option<R>,
    loaded: bool,
    _record: PhantomData<fn() -> R>,
}

impl<R, B> SingletonStore<R, B>
where
    R: SingletonRecord,
    B: RemoteSingleton<R>,
{
    /// Creates an empty store with no identity.
    pub const fn new(remote: B) -> Self {
        Self {
            remote,
            owner: None,
            value: None,
            loaded: false,
            _record: PhantomData,
        }
    }

    /// The cached row, if one has been fetched or written.
    pub const fn value(&self) -> Option<&R> {
        self.value.as_ref()
    }

    /// Identity the cache belongs to.
    pub const fn owner(&self) -> Option<&Identity> {
        self.owner.as_ref()
    }

    /// Whether a fetch has succeeded for the current identity.
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn reset(&mut self, identity: Option<Identity>) {
        self.value = None;
        self.loaded = false;
        self.owner = identity;
    }

    /// Re-targets the store at `identity`, dropping the previous value first.
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

    /// Fetches `identity`'s row. A missing row is not an error; the cache becomes empty.
    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    pub async fn refresh(&mut self, identity: &Identity) -> Result<()> {
        if self.owner.as_ref() != Some(identity) {
            self.reset(Some(identity.clone()));
        }

        let value = self
            .remote
            .select_one(identity)
            .await
            .inspect_err(|e| warn!("Failed to fetch {}: {}", R::COLLECTION, e))?
            .filter(|row| {
                let owned = row.owner_id() == identity.as_str();
                if !owned {
                    warn!("Dropped {} row owned by another identity", R::COLLECTION);
                }
                owned
            });

        info!(
            "{} cache refreshed, row {}",
            R::COLLECTION,
            if value.is_some() { "present" } else { "absent" }
        );
        self.value = value;
        self.loaded = true;
        Ok(())
    }

    /// Writes `fields` as `identity`'s row and caches the stored result.
    #[instrument(skip(self, fields), fields(collection = R::COLLECTION))]
    pub async fn upsert(&mut self, identity: &Identity, fields: R::Fields) -> Result<R> {
        R::check_fields(&fields)?;
        if self.owner.as_ref() != Some(identity) {
            return Err(Error::IdentityMismatch {
                collection: R::COLLECTION,
            });
        }

        let record = self
            .remote
            .upsert(identity, fields)
            .await
            .inspect_err(|e| warn!("Failed to upsert {}: {}", R::COLLECTION, e))?;

        self.value = Some(record.clone());
        Ok(record)
    }
}
