pub mod kapacitor_step;

use crate::chronograf::Kapacitor;

pub use kapacitor_step::{Field, FieldValue, KapacitorChoice, KapacitorStep};

/// Outcome of advancing a wizard step
#[derive(Debug, Clone, PartialEq)]
pub struct NextReturn {
    pub error: bool,
    pub payload: Option<Kapacitor>,
}

impl NextReturn {
    pub fn success(payload: Kapacitor) -> Self {
        Self {
            error: false,
            payload: Some(payload),
        }
    }

    pub fn failure() -> Self {
        Self {
            error: true,
            payload: None,
        }
    }
}
