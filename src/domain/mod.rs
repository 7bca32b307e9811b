//! Domain layer: the linked-module records and the services that persist them.

pub mod model;
pub mod service;
