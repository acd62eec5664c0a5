use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::DomainError;

/// Pedido de entrega. El status vive en el catálogo externo (`status_id`);
/// este tipo no interpreta el nombre del status por sí mismo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: Uuid,
    code: String,
    created_by: Uuid,
    status_id: Uuid,
    created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(code: impl Into<String>, created_by: Uuid, status_id: Uuid) -> Result<Self, DomainError> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(DomainError::Validation("El código de un pedido no puede estar vacío".to_string()));
        }
        Ok(Order { id: Uuid::new_v4(),
                   code,
                   created_by,
                   status_id,
                   created_at: Utc::now() })
    }

    /// Reconstruye una fila ya persistida.
    pub fn from_parts(id: Uuid, code: impl Into<String>, created_by: Uuid, status_id: Uuid, created_at: DateTime<Utc>) -> Self {
        Order { id,
                code: code.into(),
                created_by,
                status_id,
                created_at }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
    pub fn code(&self) -> &str {
        &self.code
    }
    pub fn created_by(&self) -> Uuid {
        self.created_by
    }
    pub fn status_id(&self) -> Uuid {
        self.status_id
    }
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn set_status_id(&mut self, status_id: Uuid) {
        self.status_id = status_id;
    }
}

/// Fase tipada del ciclo de vida de un pedido.
///
/// Las transiciones válidas son:
/// - `Pending` -> `Processing` (el dispatcher acepta)
/// - `Processing` -> `Scheduled` (driver asignado)
/// - `Scheduled` -> `Shipped` (el driver recibe el pedido)
/// - `Shipped` -> `InTransit` (el driver comienza el reparto)
/// - `InTransit` -> `Delivered` | `Failed`
///
/// `Delivered` y `Failed` son terminales: no admiten transición posterior.
/// Esta máquina es consumida (no poseída) por el motor de workflow, que la
/// usa para detectar aplicaciones fuera de orden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderPhase {
    Pending,
    Processing,
    Scheduled,
    Shipped,
    InTransit,
    Delivered,
    Failed,
}

impl OrderPhase {
    /// Parseo desde el nombre de status del catálogo. Case-insensitive.
    pub fn parse(name: &str) -> Option<OrderPhase> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(OrderPhase::Pending),
            "processing" => Some(OrderPhase::Processing),
            "scheduled" => Some(OrderPhase::Scheduled),
            "shipped" => Some(OrderPhase::Shipped),
            "in transit" => Some(OrderPhase::InTransit),
            "delivered" => Some(OrderPhase::Delivered),
            "failed" => Some(OrderPhase::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderPhase::Pending => "Pending",
            OrderPhase::Processing => "Processing",
            OrderPhase::Scheduled => "Scheduled",
            OrderPhase::Shipped => "Shipped",
            OrderPhase::InTransit => "In Transit",
            OrderPhase::Delivered => "Delivered",
            OrderPhase::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderPhase::Delivered | OrderPhase::Failed)
    }

    /// Valida una transición según la cadena documentada arriba.
    pub fn can_transition_to(&self, next: OrderPhase) -> bool {
        use OrderPhase::*;
        matches!((self, next),
                 (Pending, Processing)
                 | (Processing, Scheduled)
                 | (Scheduled, Shipped)
                 | (Shipped, InTransit)
                 | (InTransit, Delivered)
                 | (InTransit, Failed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_phases_have_no_successors() {
        for next in [OrderPhase::Pending,
                     OrderPhase::Processing,
                     OrderPhase::Scheduled,
                     OrderPhase::Shipped,
                     OrderPhase::InTransit,
                     OrderPhase::Delivered,
                     OrderPhase::Failed]
        {
            assert!(!OrderPhase::Delivered.can_transition_to(next));
            assert!(!OrderPhase::Failed.can_transition_to(next));
        }
    }

    #[test]
    fn happy_path_chain_is_valid() {
        assert!(OrderPhase::Pending.can_transition_to(OrderPhase::Processing));
        assert!(OrderPhase::Processing.can_transition_to(OrderPhase::Scheduled));
        assert!(OrderPhase::Scheduled.can_transition_to(OrderPhase::Shipped));
        assert!(OrderPhase::Shipped.can_transition_to(OrderPhase::InTransit));
        assert!(OrderPhase::InTransit.can_transition_to(OrderPhase::Delivered));
        assert!(OrderPhase::InTransit.can_transition_to(OrderPhase::Failed));
    }

    #[test]
    fn skipping_phases_is_invalid() {
        assert!(!OrderPhase::Pending.can_transition_to(OrderPhase::InTransit));
        assert!(!OrderPhase::Processing.can_transition_to(OrderPhase::Delivered));
    }
}
