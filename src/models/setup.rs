use serde::{Deserialize, Serialize};

/// Outcome of one setup rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupResult {
    pub name: String,
    pub description: String,
    pub active: bool,
    pub details: String,
}

impl SetupResult {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        active: bool,
        details: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            active,
            details: details.into(),
        }
    }

    /// Inactive result standing in for a rule that failed to evaluate.
    pub fn failed(rule_id: &str, error: &anyhow::Error) -> Self {
        Self::new(rule_id, "Setup evaluation failed.", false, format!("{:#}", error))
    }
}
