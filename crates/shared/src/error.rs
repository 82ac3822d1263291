use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    State,
    EmptyDataset,
    Persistence,
}

/// Rejected prompt submissions. The session is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("empty input while {step}")]
    EmptyInput { step: Step },
    #[error("submission expected {expected} but session is {actual}")]
    UnexpectedStep { expected: Step, actual: Step },
    #[error("session already finished; erase or restart to continue")]
    SessionFinished,
}

impl EntryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EntryError::EmptyInput { .. } => ErrorCode::Validation,
            EntryError::UnexpectedStep { .. } | EntryError::SessionFinished => ErrorCode::State,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("no block or item data collected to generate the report")]
    EmptyDataset,
}

impl ReportError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::EmptyDataset
    }
}

/// A load or save against the durable store failed. Logged, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {reason}")]
pub struct PersistenceUnavailable {
    pub operation: &'static str,
    pub reason: String,
}

impl PersistenceUnavailable {
    pub fn new(operation: &'static str, reason: impl std::fmt::Display) -> Self {
        Self {
            operation,
            reason: reason.to_string(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        ErrorCode::Persistence
    }
}
