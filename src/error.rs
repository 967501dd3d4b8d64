//! Error type for everything around the calculation core.
//!
//! The income-planning engine itself never fails; these errors come from
//! storage, request parsing and the command line.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),

    /// Plan ids become directory names, so only a safe alphabet is accepted
    #[error("Invalid plan id '{0}': use 1-64 letters, digits, '-' or '_'")]
    InvalidPlanId(String),

    #[error("Unknown workbook section: {0}")]
    UnknownSection(String),

    #[error("{section} not found for plan {plan_id}")]
    NotFound { plan_id: String, section: String },

    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl WorkbookError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for errors caused by the caller's request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Json(_)
                | Self::InvalidPlanId(_)
                | Self::UnknownSection(_)
                | Self::NotFound { .. }
                | Self::InvalidUpdate(_)
        )
    }
}

impl From<std::io::Error> for WorkbookError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for WorkbookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

pub type WorkbookResult<T> = Result<T, WorkbookError>;
