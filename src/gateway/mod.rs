//! Service assembly and the memoizing entity gateway

mod builder;
pub mod entity;
mod service;

pub use builder::HuginnBuilder;
pub use entity::{EntityGateway, fallback_repos};
pub use service::Huginn;
