pub mod kapacitor;
pub mod rules;

pub use kapacitor::{KapacitorAction, KapacitorPage};
pub use rules::{RulesAction, RulesPage, RulesView};
