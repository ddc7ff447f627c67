//! Entity module - Contains all SeaORM entity definitions for the remote tables.
//! Each table is scoped by a `user_id` owner column. Each entity has a Model struct
//! for data, an Entity struct for operations, and draft/patch types for writes.

pub mod budget;
pub mod guest;
pub mod task;
pub mod vendor;
pub mod wedding_info;

// Re-export specific types to avoid conflicts
pub use budget::{Column as BudgetColumn, Entity as Budget, Model as BudgetModel};
pub use guest::{Column as GuestColumn, Entity as Guest, Model as GuestModel};
pub use task::{Column as TaskColumn, Entity as Task, Model as TaskModel};
pub use vendor::{Column as VendorColumn, Entity as Vendor, Model as VendorModel};
pub use wedding_info::{
    Column as WeddingInfoColumn, Entity as WeddingInfo, Model as WeddingInfoModel,
};
