pub mod catalog_session;
pub mod filter_store;
pub mod sync_controller;

pub use catalog_session::CatalogSession;
pub use filter_store::{ChangeOrigin, FilterChange, FilterStore};
pub use sync_controller::{SyncController, SyncPhase, SyncStats};
