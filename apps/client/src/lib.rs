//! Client-side view-state layer for the CV analyzer: backend payload
//! normalization, tracked async operations, the notification center and
//! filterable collections, all driven through one `Store`.

pub mod backend;
pub mod config;
pub mod errors;
pub mod export;
pub mod format;
pub mod listing;
pub mod models;
pub mod normalize;
pub mod notifications;
pub mod state;
pub mod tracker;
pub mod upload;

pub use config::Config;
pub use errors::ClientError;
pub use notifications::{NotificationCenter, Notifier};
pub use state::{Store, ViewState};
