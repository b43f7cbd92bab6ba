//! Connector type: the boolean operator a connector folds its children with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TreeError;

/// Operator combining the children of a connector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConnectorType {
    #[default]
    And,
    Or,
    Xor,
}

impl ConnectorType {
    /// Every connector type, in selection order.
    pub const ALL: [Self; 3] = [Self::And, Self::Or, Self::Xor];

    /// Combine two results with this operator.
    #[must_use]
    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            Self::And => a && b,
            Self::Or => a || b,
            Self::Xor => a ^ b,
        }
    }

    /// Display label, inserted between children in descriptions.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
        }
    }

    /// Name used in serialized documents.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
        }
    }

    /// All connector types in selection order.
    #[must_use]
    pub fn values() -> &'static [Self] {
        &Self::ALL
    }

    /// Labels of [`Self::values`], in the same order.
    #[must_use]
    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|t| t.label()).collect()
    }
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ConnectorType {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            "XOR" => Ok(Self::Xor),
            other => Err(TreeError::UnknownConnectorType(other.to_string())),
        }
    }
}
