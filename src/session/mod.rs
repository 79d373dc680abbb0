//! Session state: the uploaded file set and asynchronous decode
//! orchestration.

pub mod loader;
pub mod store;

pub use loader::{LoaderError, LoaderEvent, RefreshOutcome, RouteLoader};
pub use store::{FileStore, StoreEvent, StoreSnapshot};
