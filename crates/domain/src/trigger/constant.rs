//! Constant leaf: a condition with a fixed result.

use serde::{Deserialize, Serialize};

use super::Trigger;
use crate::error::TreeError;

/// Leaf that always evaluates to the same value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantTrigger {
    pub value: bool,
}

impl ConstantTrigger {
    pub const TAG: &'static str = "ruletree.constant";

    #[must_use]
    pub fn new(value: bool) -> Self {
        Self { value }
    }
}

impl Trigger for ConstantTrigger {
    fn type_tag(&self) -> &'static str {
        Self::TAG
    }

    fn evaluate(&self) -> bool {
        self.value
    }

    fn describe(&self) -> String {
        if self.value { "always" } else { "never" }.to_string()
    }

    fn to_data(&self) -> serde_json::Value {
        serde_json::json!({ "value": self.value })
    }

    fn load(&mut self, data: &serde_json::Value) -> Result<(), TreeError> {
        *self = Self::deserialize(data)?;
        Ok(())
    }
}
