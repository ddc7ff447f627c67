//! Core planner logic.
//!
//! Sync stores mirror the remote collections for the signed-in identity; the planner
//! ties them to a session and derives the dashboard figures.

/// Chat assistant transcript and reply generators
pub mod assistant;
/// All collections for the session's identity
pub mod planner;
/// Record traits and cache ordering
pub mod record;
/// Remote store seams and the SeaORM backend
pub mod remote;
/// Signed-in identity tracking
pub mod session;
/// Cache for one-row-per-identity collections
pub mod singleton;
/// Cache for list-shaped collections
pub mod store;
/// Dashboard figures
pub mod summary;
