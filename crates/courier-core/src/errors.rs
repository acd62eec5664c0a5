//! Errores del core (taxonomía NotFound / Validation / Storage).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreError {
    #[error("user not found: {0}")] UserNotFound(Uuid),
    #[error("order not found: {0}")] OrderNotFound(Uuid),
    #[error("step not found: {0}")] StepNotFound(String),
    #[error("validation: {0}")] Validation(String),
    #[error("storage: {0}")] Storage(String),
}

impl CoreError {
    /// Agrupa las variantes NotFound (lecturas degradan, escrituras abortan).
    pub fn is_not_found(&self) -> bool {
        matches!(self,
                 CoreError::UserNotFound(_) | CoreError::OrderNotFound(_) | CoreError::StepNotFound(_))
    }
}

impl From<courier_domain::DomainError> for CoreError {
    fn from(e: courier_domain::DomainError) -> Self {
        CoreError::Validation(e.to_string())
    }
}
