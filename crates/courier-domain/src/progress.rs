use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Evidencia durable de que un paso fue completado para un pedido.
///
/// Invariante: como máximo un registro por par `(order_id, step_code)`, sin
/// importar qué usuario lo completó. Una segunda completación sobreescribe
/// actor, timestamp y detalle; no se retiene historial (proyección
/// último-por-paso, la auditoría pasa por el log).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    id: Uuid,
    user_id: Uuid,
    order_id: Uuid,
    step_code: String,
    completed: bool,
    completed_at: DateTime<Utc>,
    details: String,
}

impl ProgressRecord {
    /// Crea el registro de la primera completación de un `(order, step)`.
    pub fn completed_now(user_id: Uuid, order_id: Uuid, step_code: impl Into<String>, details: impl Into<String>) -> Self {
        ProgressRecord { id: Uuid::new_v4(),
                         user_id,
                         order_id,
                         step_code: step_code.into(),
                         completed: true,
                         completed_at: Utc::now(),
                         details: details.into() }
    }

    /// Reconstruye una fila ya persistida.
    pub fn from_parts(id: Uuid,
                      user_id: Uuid,
                      order_id: Uuid,
                      step_code: impl Into<String>,
                      completed: bool,
                      completed_at: DateTime<Utc>,
                      details: impl Into<String>)
                      -> Self {
        ProgressRecord { id,
                         user_id,
                         order_id,
                         step_code: step_code.into(),
                         completed,
                         completed_at,
                         details: details.into() }
    }

    /// Sobreescritura last-writer-wins: nuevo actor, timestamp y detalle.
    /// El `id` y la clave `(order_id, step_code)` se conservan.
    pub fn overwrite(&mut self, user_id: Uuid, details: impl Into<String>) {
        self.user_id = user_id;
        self.completed = true;
        self.completed_at = Utc::now();
        self.details = details.into();
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }
    pub fn order_id(&self) -> Uuid {
        self.order_id
    }
    pub fn step_code(&self) -> &str {
        &self.step_code
    }
    pub fn completed(&self) -> bool {
        self.completed
    }
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
    pub fn details(&self) -> &str {
        &self.details
    }
}
