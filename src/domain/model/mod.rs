pub mod backup;
pub mod link;
pub mod record;

pub use backup::*;
pub use link::*;
pub use record::*;
