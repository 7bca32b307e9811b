pub mod backup_store;
pub use backup_store::*;

pub mod state_store;
pub use state_store::*;

pub mod symlink_manager;
pub use symlink_manager::*;
