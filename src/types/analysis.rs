//! Relationship analysis results.

use serde::{Deserialize, Serialize};

use super::result::Status;

/// Free-text explanation of how two nodes relate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub status: Status,
    /// Empty on error.
    pub analysis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AnalysisResult {
    pub fn success(analysis: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            analysis: analysis.into(),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            analysis: String::new(),
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}
