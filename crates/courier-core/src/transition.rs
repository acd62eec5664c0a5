//! Transiciones de workflow: acoplamiento explícito paso → status.
//!
//! Antes, cada call site que completaba un paso repetía su propio lookup de
//! status y su propio update del pedido. Este módulo es el único dueño de la
//! tabla "qué paso implica qué cambio de status" y de su aplicación:
//! `apply_workflow_transition` ejecuta upsert de progreso + cambio de status
//! como una sola unidad (both-or-neither) a través de
//! `WorkflowBackend::complete_with_status`.
//!
//! Semántica de éxito parcial (decisión documentada): si la tabla pide un
//! status que el catálogo configurado no tiene, la completación se registra
//! igual y el pedido queda intacto. `validate_required_statuses` convierte
//! ese caso en un fallo de arranque, de modo que en operación normal solo
//! aparece tras ediciones del catálogo en caliente.

use log::{info, warn};
use uuid::Uuid;

use courier_domain::{OrderPhase, ProgressRecord, Status, StatusCategory};

use crate::constants::step_codes;
use crate::errors::CoreError;
use crate::ports::{StatusCatalog, WorkflowBackend};

/// Tabla de acoplamiento paso → status destino `(código, categoría, nombre)`.
pub const TRANSITION_TABLE: &[(&str, StatusCategory, &str)] =
    &[(step_codes::DISPATCHER_ACCEPT_ORDER, StatusCategory::Order, "Processing"),
      (step_codes::DISPATCHER_ASSIGN_DRIVER, StatusCategory::Delivery, "Scheduled"),
      (step_codes::DRIVER_RECEIVE_ORDER, StatusCategory::Delivery, "Shipped"),
      (step_codes::DRIVER_START_DELIVERY, StatusCategory::Delivery, "In Transit"),
      (step_codes::DRIVER_DELIVERED, StatusCategory::Delivery, "Delivered")];

/// Status destino que implica completar un paso, si el paso está acoplado.
pub fn transition_target(step_code: &str) -> Option<(StatusCategory, &'static str)> {
    TRANSITION_TABLE.iter()
                    .find(|(code, _, _)| *code == step_code)
                    .map(|(_, category, name)| (*category, *name))
}

/// Resultado de aplicar una transición de workflow.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub record: ProgressRecord,
    /// Status efectivamente aplicado al pedido; `None` si el paso no está
    /// acoplado o el catálogo no tiene el status destino (éxito parcial).
    pub status_applied: Option<Status>,
}

/// Verifica en arranque que todos los status que la tabla referencia existen
/// en el catálogo configurado. Falla rápido listando los faltantes.
pub fn validate_required_statuses<C: StatusCatalog>(catalog: &C) -> Result<(), CoreError> {
    let missing: Vec<String> = TRANSITION_TABLE.iter()
                                               .filter(|(_, category, name)| {
                                                   catalog.get_by_type_and_name(*category, name).is_none()
                                               })
                                               .map(|(code, category, name)| format!("{code} -> ({category}, {name})"))
                                               .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("status catalog is missing required entries: {}", missing.join(", "))))
    }
}

/// Completa un paso y aplica el cambio de status que implica, como una sola
/// operación de dominio.
///
/// Precondiciones idénticas a `complete_step` (actor, pedido y paso deben
/// resolver). Cuando el status destino existe en el catálogo, el upsert y el
/// update del pedido se confirman juntos o no se confirman. Todo intento
/// queda logueado con su resultado.
pub fn apply_workflow_transition<B: WorkflowBackend>(backend: &B,
                                                     order_id: Uuid,
                                                     step_code: &str,
                                                     actor_id: Uuid,
                                                     details: &str)
                                                     -> Result<TransitionOutcome, CoreError> {
    let result = validate_and_apply(backend, order_id, step_code, actor_id, details);
    match &result {
        Ok(outcome) => {
            info!("apply_workflow_transition: ok order={order_id} step={step_code} actor={actor_id} status={:?}",
                  outcome.status_applied.as_ref().map(|s| s.name()));
        }
        Err(e) => {
            warn!("apply_workflow_transition: rejected order={order_id} step={step_code} actor={actor_id} err={e}");
        }
    }
    result
}

fn validate_and_apply<B: WorkflowBackend>(backend: &B,
                                          order_id: Uuid,
                                          step_code: &str,
                                          actor_id: Uuid,
                                          details: &str)
                                          -> Result<TransitionOutcome, CoreError> {
    backend.get_user(actor_id).ok_or(CoreError::UserNotFound(actor_id))?;
    let order = backend.get_order(order_id).ok_or(CoreError::OrderNotFound(order_id))?;
    backend.find_step(step_code)
           .ok_or_else(|| CoreError::StepNotFound(step_code.to_string()))?;

    let target = transition_target(step_code).and_then(|(category, name)| {
        let status = backend.get_by_type_and_name(category, name);
        if status.is_none() {
            // éxito parcial documentado: se registra el paso sin tocar el pedido
            warn!("apply_workflow_transition: status ({category}, {name}) missing from catalog, \
                   completing step={step_code} order={order_id} without status change");
        }
        status
    });

    if let Some(status) = &target {
        check_phase_order(backend, &order, status, step_code, order_id);
    }

    let record = backend.complete_with_status(order_id, step_code, actor_id, details, target.as_ref())?;
    Ok(TransitionOutcome { record,
                           status_applied: target })
}

/// La máquina de fases es consumida, no poseída: una aplicación fuera de
/// orden se loguea para reconciliación pero no bloquea la operación.
fn check_phase_order<B: WorkflowBackend>(backend: &B, order: &courier_domain::Order, next: &Status, step_code: &str, order_id: Uuid) {
    let current_phase = backend.get_status(order.status_id())
                               .and_then(|s| OrderPhase::parse(s.name()));
    let next_phase = OrderPhase::parse(next.name());
    if let (Some(current), Some(next)) = (current_phase, next_phase) {
        if !current.can_transition_to(next) {
            warn!("apply_workflow_transition: out-of-order phase change {current:?} -> {next:?} \
                   (order={order_id} step={step_code})");
        }
    }
}
