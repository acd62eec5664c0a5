use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::DomainError;

/// Pago asociado a un pedido. Un pedido puede acumular varios intentos de
/// pago; el resolver de estado de negocio solo mira el más reciente por
/// `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    id: Uuid,
    order_id: Uuid,
    amount_cents: i64,
    status_id: Uuid,
    created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(order_id: Uuid, amount_cents: i64, status_id: Uuid) -> Result<Self, DomainError> {
        if amount_cents <= 0 {
            return Err(DomainError::Validation(format!("El monto de un pago debe ser positivo, recibido {amount_cents}")));
        }
        Ok(Payment { id: Uuid::new_v4(),
                     order_id,
                     amount_cents,
                     status_id,
                     created_at: Utc::now() })
    }

    /// Reconstruye una fila ya persistida.
    pub fn from_parts(id: Uuid, order_id: Uuid, amount_cents: i64, status_id: Uuid, created_at: DateTime<Utc>) -> Self {
        Payment { id,
                  order_id,
                  amount_cents,
                  status_id,
                  created_at }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
    pub fn order_id(&self) -> Uuid {
        self.order_id
    }
    pub fn amount_cents(&self) -> i64 {
        self.amount_cents
    }
    pub fn status_id(&self) -> Uuid {
        self.status_id
    }
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
