//! Fachada del motor de workflow.
//!
//! Agrupa recorder, agregador, timeline y transiciones sobre un backend que
//! implementa todos los puertos. Es la superficie que una capa de transporte
//! (HTTP u otra) mapea a endpoints; aquí no hay estado propio más allá del
//! backend.

use uuid::Uuid;

use courier_domain::{ProgressRecord, Role, StepDefinition};

use crate::aggregator::ProgressAggregator;
use crate::errors::CoreError;
use crate::ports::WorkflowBackend;
use crate::recorder::CompletionRecorder;
use crate::timeline::TimelineBuilder;
use crate::transition::{self, TransitionOutcome};
use crate::view::{ProgressView, RoleStats, TimelineEntry};

pub struct WorkflowEngine<B: WorkflowBackend> {
    backend: B,
}

impl<B: WorkflowBackend> WorkflowEngine<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Catálogo de un rol por nombre. Case-insensitive; rol desconocido
    /// devuelve lista vacía, nunca error.
    pub fn steps_for_role(&self, role: &str) -> Vec<StepDefinition> {
        match Role::parse(role) {
            Some(role) => self.backend.steps_for(role),
            None => Vec::new(),
        }
    }

    pub fn complete_step(&self, user_id: Uuid, order_id: Uuid, step_code: &str, details: &str)
                         -> Result<ProgressRecord, CoreError> {
        CompletionRecorder::new(&self.backend).complete_step(user_id, order_id, step_code, details)
    }

    pub fn apply_workflow_transition(&self, order_id: Uuid, step_code: &str, actor_id: Uuid, details: &str)
                                     -> Result<TransitionOutcome, CoreError> {
        transition::apply_workflow_transition(&self.backend, order_id, step_code, actor_id, details)
    }

    pub fn progress_for_user(&self, user_id: Uuid) -> Result<ProgressView, CoreError> {
        ProgressAggregator::new(&self.backend).progress_for_user(user_id, None)
    }

    /// Variante acotada a un pedido (contexto driver/dispatcher).
    pub fn progress_for_user_in_order(&self, user_id: Uuid, order_id: Uuid) -> Result<ProgressView, CoreError> {
        ProgressAggregator::new(&self.backend).progress_for_user(user_id, Some(order_id))
    }

    pub fn progress_for_order(&self, order_id: Uuid) -> Result<ProgressView, CoreError> {
        ProgressAggregator::new(&self.backend).progress_for_order(order_id)
    }

    pub fn timeline_for_order(&self, order_id: Uuid) -> Result<Vec<TimelineEntry>, CoreError> {
        TimelineBuilder::new(&self.backend).timeline_for_order(order_id)
    }

    pub fn incomplete_users(&self, role: Role) -> Vec<Uuid> {
        ProgressAggregator::new(&self.backend).incomplete_users(role)
    }

    pub fn stats_for_role(&self, role: Role) -> RoleStats {
        ProgressAggregator::new(&self.backend).stats_for_role(role)
    }

    /// Chequeo de arranque: la tabla de transiciones debe resolver completa
    /// contra el catálogo de statuses configurado.
    pub fn validate_required_statuses(&self) -> Result<(), CoreError> {
        transition::validate_required_statuses(&self.backend)
    }
}
