#![forbid(unsafe_code)]

//! Caller-facing errors.
//!
//! Only call-site contract violations surface here. Derived state that
//! drifts because a list was mutated (a selected pane or option that left
//! its list) is repaired in place and never reported.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VmError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    #[error("invariant violation on {node}: {reason}")]
    InvariantViolation { node: String, reason: String },

    #[error("duplicate key on {node}: {key}")]
    DuplicateKey { node: String, key: String },
}

impl VmError {
    #[must_use]
    pub fn invariant(node: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            node: node.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn duplicate(node: impl Into<String>, key: impl Into<String>) -> Self {
        Self::DuplicateKey {
            node: node.into(),
            key: key.into(),
        }
    }

    /// Name of the node that rejected the operation.
    #[must_use]
    pub fn node(&self) -> &str {
        match self {
            Self::InvariantViolation { node, .. } | Self::DuplicateKey { node, .. } => node,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_node() {
        let e = VmError::invariant("ThemeColor", "option not present");
        assert_eq!(
            e.to_string(),
            "invariant violation on ThemeColor: option not present"
        );
        assert_eq!(e.node(), "ThemeColor");

        let d = VmError::duplicate("ThemeColor", "\"Dark\"");
        assert_eq!(d.to_string(), "duplicate key on ThemeColor: \"Dark\"");
    }
}
