use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::DomainError;

/// Categoría de un status dentro del catálogo configurado externamente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCategory {
    Order,
    Payment,
    Delivery,
}

impl StatusCategory {
    /// Forma persistida/transportada de la categoría (mayúsculas).
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCategory::Order => "ORDER",
            StatusCategory::Payment => "PAYMENT",
            StatusCategory::Delivery => "DELIVERY",
        }
    }

    pub fn parse(value: &str) -> Option<StatusCategory> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ORDER" => Some(StatusCategory::Order),
            "PAYMENT" => Some(StatusCategory::Payment),
            "DELIVERY" => Some(StatusCategory::Delivery),
            _ => None,
        }
    }

    /// Nombres de status considerados válidos para la categoría. Un nombre
    /// fuera de esta lista nunca se muestra como label derivado: el resolver
    /// cae al label fijo de "no alcanzado".
    pub fn valid_names(&self) -> &'static [&'static str] {
        match self {
            StatusCategory::Order => &["Pending", "Processing", "Completed", "Cancelled"],
            StatusCategory::Payment => &["Pending", "Paid", "Failed", "Refunded"],
            StatusCategory::Delivery => &["Scheduled", "Shipped", "In Transit", "Delivered", "Failed"],
        }
    }

    pub fn is_valid_name(&self, name: &str) -> bool {
        self.valid_names().iter().any(|n| *n == name)
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fila del catálogo de statuses. Dato de referencia sembrado externamente;
/// el core solo lo lee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    id: Uuid,
    category: StatusCategory,
    name: String,
}

impl Status {
    pub fn new(category: StatusCategory, name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::Validation("El nombre de un status no puede estar vacío".to_string()));
        }
        Ok(Status { id: Uuid::new_v4(),
                    category,
                    name })
    }

    /// Reconstruye una fila ya persistida (id conocido).
    pub fn from_parts(id: Uuid, category: StatusCategory, name: impl Into<String>) -> Self {
        Status { id, category, name: name.into() }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
    pub fn category(&self) -> StatusCategory {
        self.category
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitelist_filters_by_category() {
        assert!(StatusCategory::Delivery.is_valid_name("Shipped"));
        assert!(StatusCategory::Order.is_valid_name("Pending"));
        assert!(!StatusCategory::Order.is_valid_name("Shipped"));
        assert!(!StatusCategory::Payment.is_valid_name("In Transit"));
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(Status::new(StatusCategory::Order, "  ").is_err());
    }
}
