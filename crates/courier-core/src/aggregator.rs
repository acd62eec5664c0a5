//! Agregador de progreso.
//!
//! Une catálogo de pasos + registro de progreso + resolver de estado de
//! negocio en una vista por usuario (o por pedido) con porcentaje de
//! completación. Contrato de resiliencia: devuelve un `Result` estructurado
//! y nunca entra en pánico cruzando el borde de agregación; las operaciones
//! de población (`incomplete_users`, `stats_for_role`) saltan usuarios que
//! no agregan en lugar de fallar el request completo.

use log::warn;
use uuid::Uuid;

use courier_domain::{Role, StepDefinition};

use crate::constants::LABEL_COMPLETED;
use crate::errors::CoreError;
use crate::ports::WorkflowBackend;
use crate::resolver::{BusinessStateResolver, ProgressScope};
use crate::view::{ProgressView, RoleStats, StepView};

pub struct ProgressAggregator<'a, B: WorkflowBackend> {
    backend: &'a B,
}

impl<'a, B: WorkflowBackend> ProgressAggregator<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Vista de progreso de un usuario sobre el catálogo de su rol.
    ///
    /// `order_scope` acota la búsqueda de registros a un pedido (contexto
    /// driver/dispatcher); sin él, se toma el registro más reciente del
    /// usuario para cada paso.
    pub fn progress_for_user(&self, user_id: Uuid, order_scope: Option<Uuid>) -> Result<ProgressView, CoreError> {
        let user = self.backend.get_user(user_id).ok_or(CoreError::UserNotFound(user_id))?;
        let steps = self.backend.steps_for(user.role());
        let scope = match order_scope {
            Some(order_id) => ProgressScope::Order(order_id),
            None => ProgressScope::User(user_id),
        };

        let views: Vec<StepView> = steps.iter()
                                        .map(|step| {
                                            let record =
                                                self.backend.find_for_user(user_id, step.code(), order_scope);
                                            self.step_view(step, record.as_ref(), scope)
                                        })
                                        .collect();
        Ok(assemble_view(Some(user.role()), views))
    }

    /// Vista cruzada de un pedido: catálogos de los tres roles contra los
    /// registros de ese pedido, en orden de índice.
    pub fn progress_for_order(&self, order_id: Uuid) -> Result<ProgressView, CoreError> {
        self.backend.get_order(order_id).ok_or(CoreError::OrderNotFound(order_id))?;

        let mut steps: Vec<StepDefinition> = Role::ALL.iter()
                                                      .flat_map(|role| self.backend.steps_for(*role))
                                                      .collect();
        steps.sort_by_key(|s| s.order_index());

        let scope = ProgressScope::Order(order_id);
        let views: Vec<StepView> = steps.iter()
                                        .map(|step| {
                                            let record = self.backend.find_record(order_id, step.code());
                                            self.step_view(step, record.as_ref(), scope)
                                        })
                                        .collect();
        Ok(assemble_view(None, views))
    }

    /// Usuarios de un rol con progreso < 100%. Los usuarios que no agregan
    /// se saltan con un warn (dashboards parciales, nunca hard-fail).
    pub fn incomplete_users(&self, role: Role) -> Vec<Uuid> {
        self.backend
            .list_by_role(role)
            .into_iter()
            .filter_map(|user| match self.progress_for_user(user.id(), None) {
                Ok(view) if view.percentage < 100.0 => Some(user.id()),
                Ok(_) => None,
                Err(e) => {
                    warn!("incomplete_users: skipping user={} err={e}", user.id());
                    None
                }
            })
            .collect()
    }

    /// Estadísticas agregadas de la población de un rol.
    pub fn stats_for_role(&self, role: Role) -> RoleStats {
        let users = self.backend.list_by_role(role);
        let total_users = users.len();
        let mut aggregated = 0usize;
        let mut completed_users = 0usize;
        let mut progress_sum = 0.0f64;

        for user in &users {
            match self.progress_for_user(user.id(), None) {
                Ok(view) => {
                    aggregated += 1;
                    progress_sum += view.percentage;
                    if view.percentage >= 100.0 {
                        completed_users += 1;
                    }
                }
                Err(e) => warn!("stats_for_role: skipping user={} err={e}", user.id()),
            }
        }

        let average_progress = if aggregated == 0 { 0.0 } else { progress_sum / aggregated as f64 };
        let completion_rate = if total_users == 0 {
            0.0
        } else {
            completed_users as f64 / total_users as f64 * 100.0
        };
        RoleStats { total_users,
                    completed_users,
                    average_progress,
                    completion_rate }
    }

    fn step_view(&self,
                 step: &StepDefinition,
                 record: Option<&courier_domain::ProgressRecord>,
                 scope: ProgressScope)
                 -> StepView {
        let completed = record.map_or(false, |r| r.completed());
        let status_label = if completed {
            LABEL_COMPLETED.to_string()
        } else {
            BusinessStateResolver::new(self.backend).resolve(step.code(), scope)
        };
        StepView { code: step.code().to_string(),
                   name: step.name().to_string(),
                   description: step.description().to_string(),
                   completed,
                   status_label,
                   completion_detail: record.map(|r| r.details().to_string()) }
    }
}

/// Porcentaje = completados / total * 100; catálogo vacío define 0, no NaN.
fn assemble_view(role: Option<Role>, steps: Vec<StepView>) -> ProgressView {
    let total_steps = steps.len();
    let completed_steps = steps.iter().filter(|s| s.completed).count();
    let percentage = if total_steps == 0 {
        0.0
    } else {
        completed_steps as f64 / total_steps as f64 * 100.0
    };
    ProgressView { role,
                   total_steps,
                   completed_steps,
                   percentage,
                   steps }
}
