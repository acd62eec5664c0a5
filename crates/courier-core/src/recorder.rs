//! Registrador de completaciones (el único camino de escritura al registro
//! de progreso).
//!
//! Contrato:
//! - Precondición: usuario, pedido y definición de paso deben resolver; si
//!   alguno falta se aborta con NotFound y no se escribe nada.
//! - Upsert sobre `(order_id, step_code)` ignorando qué usuario posee el
//!   registro existente: last-writer-wins sobre actor, timestamp y detalle.
//! - Todo intento (éxito o fallo) se loguea con usuario, pedido, paso y
//!   resultado para reconciliación posterior.

use log::{info, warn};
use uuid::Uuid;

use courier_domain::ProgressRecord;

use crate::errors::CoreError;
use crate::ports::WorkflowBackend;

pub struct CompletionRecorder<'a, B: WorkflowBackend> {
    backend: &'a B,
}

impl<'a, B: WorkflowBackend> CompletionRecorder<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Marca un paso como completado para un pedido, atribuido a un usuario.
    pub fn complete_step(&self, user_id: Uuid, order_id: Uuid, step_code: &str, details: &str)
                         -> Result<ProgressRecord, CoreError> {
        let result = self.validate_and_upsert(user_id, order_id, step_code, details);
        match &result {
            Ok(record) => {
                info!("complete_step: ok user={user_id} order={order_id} step={step_code} at={}",
                      record.completed_at());
            }
            Err(e) => {
                warn!("complete_step: rejected user={user_id} order={order_id} step={step_code} err={e}");
            }
        }
        result
    }

    fn validate_and_upsert(&self, user_id: Uuid, order_id: Uuid, step_code: &str, details: &str)
                           -> Result<ProgressRecord, CoreError> {
        if step_code.trim().is_empty() {
            return Err(CoreError::Validation("step code must not be empty".to_string()));
        }
        self.backend.get_user(user_id).ok_or(CoreError::UserNotFound(user_id))?;
        self.backend.get_order(order_id).ok_or(CoreError::OrderNotFound(order_id))?;
        self.backend
            .find_step(step_code)
            .ok_or_else(|| CoreError::StepNotFound(step_code.to_string()))?;
        self.backend.upsert_completion(order_id, step_code, user_id, details)
    }
}
