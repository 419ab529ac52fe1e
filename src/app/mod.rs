pub mod notifications;
pub mod state;
pub mod store;

pub use state::{AppState, Page};
