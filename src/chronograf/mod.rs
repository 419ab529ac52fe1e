pub mod api;
pub mod client;
pub mod types;

pub use api::KapacitorApi;
pub use client::ChronografClient;
pub use types::*;
