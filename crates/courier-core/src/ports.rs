//! Contratos de almacenamiento que el motor consume.
//!
//! El core no posee la tecnología de persistencia: define traits mínimos y
//! cada backend (en memoria para tests/demo, Postgres en
//! `courier-persistence`) los implementa. Las lecturas devuelven
//! `Option`/`Vec` y nunca entran en pánico; las escrituras devuelven
//! `Result` y fallan cerradas.

use uuid::Uuid;

use courier_domain::{Order, Payment, ProgressRecord, Role, Status, StatusCategory, StepDefinition, User};

use crate::errors::CoreError;

/// Catálogo estático de pasos por rol (dato de referencia, solo lectura).
pub trait StepCatalog {
    /// Pasos de un rol, orden estricto ascendente por `order_index`.
    fn steps_for(&self, role: Role) -> Vec<StepDefinition>;

    /// Busca una definición por código exacto.
    fn find_step(&self, code: &str) -> Option<StepDefinition>;
}

/// Registro durable de completaciones de pasos.
pub trait ProgressStore {
    /// Registro para `(order, step)`, sin importar qué usuario lo posee.
    fn find_record(&self, order_id: Uuid, step_code: &str) -> Option<ProgressRecord>;

    /// Todos los registros de un pedido, de todos los roles.
    fn records_for_order(&self, order_id: Uuid) -> Vec<ProgressRecord>;

    /// Registro más reciente de un usuario para un paso, globalmente o
    /// acotado a un pedido.
    fn find_for_user(&self, user_id: Uuid, step_code: &str, order_scope: Option<Uuid>) -> Option<ProgressRecord>;

    /// Upsert atómico sobre la clave `(order_id, step_code)`: crea el
    /// registro si no existe o sobreescribe actor/timestamp/detalle si
    /// existe. Dos llamadas concurrentes nunca materializan dos filas.
    fn upsert_completion(&self, order_id: Uuid, step_code: &str, user_id: Uuid, details: &str)
                         -> Result<ProgressRecord, CoreError>;
}

/// Pedidos (colaborador externo, solo el contrato que el motor necesita).
pub trait OrderStore {
    fn get_order(&self, id: Uuid) -> Option<Order>;

    /// Cambia el status del pedido. `OrderNotFound` si el pedido no existe.
    fn update_status(&self, id: Uuid, status_id: Uuid) -> Result<(), CoreError>;

    /// Pedidos creados por un usuario, más reciente primero.
    fn list_by_creator(&self, user_id: Uuid) -> Vec<Order>;
}

/// Pagos (colaborador externo).
pub trait PaymentStore {
    /// Pagos de un pedido, más reciente primero.
    fn list_by_order(&self, order_id: Uuid) -> Vec<Payment>;
}

/// Usuarios (colaborador externo).
pub trait UserStore {
    fn get_user(&self, id: Uuid) -> Option<User>;
    fn get_by_username(&self, username: &str) -> Option<User>;
    fn list_by_role(&self, role: Role) -> Vec<User>;
}

/// Catálogo de statuses configurado externamente.
pub trait StatusCatalog {
    fn get_status(&self, id: Uuid) -> Option<Status>;
    fn get_by_type_and_name(&self, category: StatusCategory, name: &str) -> Option<Status>;
    fn list_by_type(&self, category: StatusCategory) -> Vec<Status>;
}

/// Backend completo del motor: la unión de todos los puertos más la
/// operación transaccional de transición.
///
/// `complete_with_status` es el cierre del gap de atomicidad: cuando hay un
/// status destino, el upsert de progreso y el cambio de status del pedido
/// deben confirmarse juntos o no confirmarse (both-or-neither). Con
/// `status = None` equivale a `upsert_completion` (semántica de éxito
/// parcial documentada: el paso se registra y el pedido queda intacto).
pub trait WorkflowBackend: StepCatalog + ProgressStore + OrderStore + PaymentStore + UserStore + StatusCatalog {
    fn complete_with_status(&self,
                            order_id: Uuid,
                            step_code: &str,
                            user_id: Uuid,
                            details: &str,
                            status: Option<&Status>)
                            -> Result<ProgressRecord, CoreError>;
}
