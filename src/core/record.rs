//! Record contracts shared by every synced collection.
//!
//! A collection is described once, on its record type: the table name, the sort key and
//! its direction, plus how a patch merges into a cached row. The stores are generic over
//! these traits so the ordering and merge rules live in one place.

use crate::errors::Result;
use chrono::{DateTime, Utc};
use sea_orm::prelude::Uuid;
use std::cmp::Ordering;
use std::fmt::Debug;

/// Sort direction of a collection's ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest key first
    Ascending,
    /// Largest key first
    Descending,
}

/// A row of a list-shaped collection owned by one identity.
pub trait Record: Clone + Debug + Send + Sync + 'static {
    /// Field values for a not-yet-persisted row (no id, owner or timestamps).
    type Draft: Send + 'static;
    /// Optional field values merged into an existing row.
    type Patch: Send + Sync + 'static;
    /// Value the collection is ordered by.
    type SortKey: Ord;

    /// Remote collection name.
    const COLLECTION: &'static str;
    /// Direction of [`Record::sort_key`] ordering.
    const DIRECTION: Direction;

    /// Server-assigned id.
    fn id(&self) -> Uuid;
    /// Owning identity's user id.
    fn owner_id(&self) -> &str;
    /// Server-assigned creation time, the tie-breaker after the sort key.
    fn created_at(&self) -> DateTime<Utc>;
    /// Ordering key of this row.
    fn sort_key(&self) -> Self::SortKey;
    /// Merges `patch` into the row. Never touches id, owner or creation time.
    fn apply(&mut self, patch: &Self::Patch);

    /// Rejects drafts the dashboard would refuse to submit.
    fn check_draft(_draft: &Self::Draft) -> Result<()> {
        Ok(())
    }

    /// Rejects patches that would leave the row invalid.
    fn check_patch(_patch: &Self::Patch) -> Result<()> {
        Ok(())
    }
}

/// A collection holding at most one row per identity.
pub trait SingletonRecord: Clone + Debug + Send + Sync + 'static {
    /// Every writable field; an upsert always sends all of them.
    type Fields: Send + 'static;

    /// Remote collection name.
    const COLLECTION: &'static str;

    /// Owning identity's user id.
    fn owner_id(&self) -> &str;

    /// Rejects field sets the dashboard would refuse to save.
    fn check_fields(_fields: &Self::Fields) -> Result<()> {
        Ok(())
    }
}

/// Order of two rows as a fresh fetch returns them.
///
/// The sort key in the collection's direction decides first, then creation time
/// (oldest first), then id.
pub fn compare<R: Record>(a: &R, b: &R) -> Ordering {
    let by_key = a.sort_key().cmp(&b.sort_key());
    let by_key = match R::DIRECTION {
        Direction::Ascending => by_key,
        Direction::Descending => by_key.reverse(),
    };
    by_key
        .then_with(|| a.created_at().cmp(&b.created_at()))
        .then_with(|| a.id().cmp(&b.id()))
}

/// Position at which `record` keeps `rows` ordered by [`compare`].
///
/// `rows` must already be in that order.
pub fn insertion_index<R: Record>(rows: &[R], record: &R) -> usize {
    rows.partition_point(|row| compare(row, record) == Ordering::Less)
}
