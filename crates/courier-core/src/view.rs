//! Read-models efímeros del motor.
//!
//! Ninguno de estos tipos se persiste: se computan por request a partir del
//! catálogo, el registro de progreso y el estado de dominio vivo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use courier_domain::Role;

/// Estado de un paso del catálogo para un usuario o pedido concreto.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepView {
    pub code: String,
    pub name: String,
    pub description: String,
    pub completed: bool,
    pub status_label: String,
    pub completion_detail: Option<String>,
}

/// Vista agregada de progreso. `role` es `None` en la variante cruzada por
/// pedido (catálogos de todos los roles combinados).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressView {
    pub role: Option<Role>,
    pub total_steps: usize,
    pub completed_steps: usize,
    pub percentage: f64,
    pub steps: Vec<StepView>,
}

/// Estadísticas de una población de usuarios de un rol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleStats {
    pub total_users: usize,
    pub completed_users: usize,
    pub average_progress: f64,
    pub completion_rate: f64,
}

/// Descriptor del actor que registró una completación.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRef {
    pub id: Uuid,
    pub display_name: String,
    pub role: Role,
    pub phone: String,
}

/// Entrada del timeline de un pedido: campos del paso + del registro + actor.
///
/// `order_index` es `None` cuando el registro apunta a un código ya ausente
/// del catálogo; esas entradas se ordenan al final. `actor` es `None` cuando
/// el usuario que registró ya no resuelve (la entrada se conserva).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub step_code: String,
    pub step_name: Option<String>,
    pub description: Option<String>,
    pub order_index: Option<u32>,
    pub completed: bool,
    pub completed_at: DateTime<Utc>,
    pub details: String,
    pub actor: Option<ActorRef>,
}
