//! Backend en memoria del motor de workflow.
//!
//! Útil para tests, demos y como referencia de paridad frente al backend
//! Postgres de `courier-persistence`. Los datos de referencia (catálogo de
//! pasos y de statuses) se siembran en construcción con `&mut self` y quedan
//! de solo lectura; las entidades mutables en runtime viven en `DashMap`,
//! cuyo `entry` por clave hace atómico el upsert de progreso frente a
//! completaciones concurrentes del mismo `(order, step)`.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use indexmap::IndexMap;
use uuid::Uuid;

use courier_domain::{Order, Payment, ProgressRecord, Role, Status, StatusCategory, StepDefinition, User};

use crate::constants::step_codes;
use crate::errors::CoreError;
use crate::ports::{OrderStore, PaymentStore, ProgressStore, StatusCatalog, StepCatalog, UserStore, WorkflowBackend};

pub struct MemoryBackend {
    steps: IndexMap<String, StepDefinition>,
    statuses: IndexMap<Uuid, Status>,
    users: DashMap<Uuid, User>,
    orders: DashMap<Uuid, Order>,
    payments: DashMap<Uuid, Payment>,
    progress: DashMap<(Uuid, String), ProgressRecord>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        MemoryBackend { steps: IndexMap::new(),
                        statuses: IndexMap::new(),
                        users: DashMap::new(),
                        orders: DashMap::new(),
                        payments: DashMap::new(),
                        progress: DashMap::new() }
    }

    /// Backend con el catálogo de fulfillment y todos los statuses válidos
    /// ya sembrados (el camino estándar de tests y demo).
    pub fn with_default_seed() -> Self {
        let mut backend = MemoryBackend::new();
        for status in default_statuses() {
            backend.seed_status(status);
        }
        for step in default_step_definitions() {
            backend.seed_step(step);
        }
        backend
    }

    /// Siembra una definición de paso (solo en construcción).
    pub fn seed_step(&mut self, step: StepDefinition) {
        self.steps.insert(step.code().to_string(), step);
    }

    /// Siembra una fila del catálogo de statuses (solo en construcción).
    pub fn seed_status(&mut self, status: Status) {
        self.statuses.insert(status.id(), status);
    }

    pub fn insert_user(&self, user: User) {
        self.users.insert(user.id(), user);
    }

    pub fn insert_order(&self, order: Order) {
        self.orders.insert(order.id(), order);
    }

    pub fn insert_payment(&self, payment: Payment) {
        self.payments.insert(payment.id(), payment);
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StepCatalog for MemoryBackend {
    fn steps_for(&self, role: Role) -> Vec<StepDefinition> {
        let mut steps: Vec<StepDefinition> = self.steps
                                                 .values()
                                                 .filter(|s| s.role() == role)
                                                 .cloned()
                                                 .collect();
        steps.sort_by_key(|s| s.order_index());
        steps
    }

    fn find_step(&self, code: &str) -> Option<StepDefinition> {
        self.steps.get(code).cloned()
    }
}

impl ProgressStore for MemoryBackend {
    fn find_record(&self, order_id: Uuid, step_code: &str) -> Option<ProgressRecord> {
        self.progress.get(&(order_id, step_code.to_string())).map(|r| r.value().clone())
    }

    fn records_for_order(&self, order_id: Uuid) -> Vec<ProgressRecord> {
        let mut records: Vec<ProgressRecord> = self.progress
                                                   .iter()
                                                   .filter(|e| e.key().0 == order_id)
                                                   .map(|e| e.value().clone())
                                                   .collect();
        // orden estable: el iterador de DashMap no lo garantiza
        records.sort_by(|a, b| a.completed_at()
                                .cmp(&b.completed_at())
                                .then_with(|| a.step_code().cmp(b.step_code())));
        records
    }

    fn find_for_user(&self, user_id: Uuid, step_code: &str, order_scope: Option<Uuid>) -> Option<ProgressRecord> {
        self.progress
            .iter()
            .filter(|e| {
                let r = e.value();
                r.user_id() == user_id
                && r.step_code() == step_code
                && order_scope.map_or(true, |oid| r.order_id() == oid)
            })
            .map(|e| e.value().clone())
            .max_by_key(|r| r.completed_at())
    }

    fn upsert_completion(&self, order_id: Uuid, step_code: &str, user_id: Uuid, details: &str)
                         -> Result<ProgressRecord, CoreError> {
        let record = match self.progress.entry((order_id, step_code.to_string())) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().overwrite(user_id, details);
                occupied.get().clone()
            }
            Entry::Vacant(vacant) => vacant.insert(ProgressRecord::completed_now(user_id, order_id, step_code, details))
                                           .clone(),
        };
        Ok(record)
    }
}

impl OrderStore for MemoryBackend {
    fn get_order(&self, id: Uuid) -> Option<Order> {
        self.orders.get(&id).map(|o| o.value().clone())
    }

    fn update_status(&self, id: Uuid, status_id: Uuid) -> Result<(), CoreError> {
        match self.orders.get_mut(&id) {
            Some(mut order) => {
                order.set_status_id(status_id);
                Ok(())
            }
            None => Err(CoreError::OrderNotFound(id)),
        }
    }

    fn list_by_creator(&self, user_id: Uuid) -> Vec<Order> {
        let mut orders: Vec<Order> = self.orders
                                         .iter()
                                         .filter(|e| e.value().created_by() == user_id)
                                         .map(|e| e.value().clone())
                                         .collect();
        orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        orders
    }
}

impl PaymentStore for MemoryBackend {
    fn list_by_order(&self, order_id: Uuid) -> Vec<Payment> {
        let mut payments: Vec<Payment> = self.payments
                                             .iter()
                                             .filter(|e| e.value().order_id() == order_id)
                                             .map(|e| e.value().clone())
                                             .collect();
        payments.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        payments
    }
}

impl UserStore for MemoryBackend {
    fn get_user(&self, id: Uuid) -> Option<User> {
        self.users.get(&id).map(|u| u.value().clone())
    }

    fn get_by_username(&self, username: &str) -> Option<User> {
        self.users
            .iter()
            .find(|e| e.value().username() == username)
            .map(|e| e.value().clone())
    }

    fn list_by_role(&self, role: Role) -> Vec<User> {
        let mut users: Vec<User> = self.users
                                       .iter()
                                       .filter(|e| e.value().role() == role)
                                       .map(|e| e.value().clone())
                                       .collect();
        users.sort_by(|a, b| a.username().cmp(b.username()));
        users
    }
}

impl StatusCatalog for MemoryBackend {
    fn get_status(&self, id: Uuid) -> Option<Status> {
        self.statuses.get(&id).cloned()
    }

    fn get_by_type_and_name(&self, category: StatusCategory, name: &str) -> Option<Status> {
        self.statuses
            .values()
            .find(|s| s.category() == category && s.name() == name)
            .cloned()
    }

    fn list_by_type(&self, category: StatusCategory) -> Vec<Status> {
        self.statuses.values().filter(|s| s.category() == category).cloned().collect()
    }
}

impl WorkflowBackend for MemoryBackend {
    fn complete_with_status(&self,
                            order_id: Uuid,
                            step_code: &str,
                            user_id: Uuid,
                            details: &str,
                            status: Option<&Status>)
                            -> Result<ProgressRecord, CoreError> {
        let status = match status {
            None => return self.upsert_completion(order_id, step_code, user_id, details),
            Some(s) => s,
        };
        // conserva el valor previo para revertir si el pedido desapareció
        // entre el upsert y el cambio de status (both-or-neither)
        let previous = self.find_record(order_id, step_code);
        let record = self.upsert_completion(order_id, step_code, user_id, details)?;
        if let Err(e) = self.update_status(order_id, status.id()) {
            match previous {
                Some(p) => {
                    self.progress.insert((order_id, step_code.to_string()), p);
                }
                None => {
                    self.progress.remove(&(order_id, step_code.to_string()));
                }
            }
            return Err(e);
        }
        Ok(record)
    }
}

/// Catálogo de fulfillment por defecto: ocho pasos sobre los tres roles con
/// índices globalmente crecientes (estrictamente crecientes dentro de cada
/// rol).
pub fn default_step_definitions() -> Vec<StepDefinition> {
    let defs = [(Role::Customer, step_codes::CUSTOMER_CREATE_ORDER, "Create order", "Customer places the delivery order", 1),
                (Role::Customer, step_codes::CUSTOMER_PAYMENT, "Pay order", "Customer pays for the order", 2),
                (Role::Dispatcher, step_codes::DISPATCHER_ACCEPT_ORDER, "Accept order", "Dispatcher accepts the order for processing", 3),
                (Role::Dispatcher, step_codes::DISPATCHER_ASSIGN_DRIVER, "Assign driver", "Dispatcher assigns a driver and schedules delivery", 4),
                (Role::Driver, step_codes::DRIVER_RECEIVE_ORDER, "Receive order", "Driver picks the order up at the depot", 5),
                (Role::Driver, step_codes::DRIVER_START_DELIVERY, "Start delivery", "Driver starts the delivery run", 6),
                (Role::Driver, step_codes::DRIVER_DELIVERED, "Deliver order", "Driver hands the order to the customer", 7),
                (Role::Customer, step_codes::CUSTOMER_CONFIRM_RECEIPT, "Confirm receipt", "Customer confirms the order arrived", 8)];
    defs.into_iter()
        .map(|(role, code, name, description, idx)| {
            StepDefinition::new(role, code, name, description, idx).expect("default catalog definition")
        })
        .collect()
}

/// Todos los statuses válidos de cada categoría, listos para sembrar.
pub fn default_statuses() -> Vec<Status> {
    let mut statuses = Vec::new();
    for category in [StatusCategory::Order, StatusCategory::Payment, StatusCategory::Delivery] {
        for name in category.valid_names() {
            statuses.push(Status::new(category, *name).expect("default status"));
        }
    }
    statuses
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_indices_are_strictly_increasing_per_role() {
        let mut backend = MemoryBackend::new();
        for step in default_step_definitions() {
            backend.seed_step(step);
        }
        for role in Role::ALL {
            let steps = backend.steps_for(role);
            assert!(!steps.is_empty());
            for pair in steps.windows(2) {
                assert!(pair[0].order_index() < pair[1].order_index(),
                        "índices no crecientes para {role}");
            }
        }
    }

    #[test]
    fn steps_for_unknown_code_is_none() {
        let backend = MemoryBackend::with_default_seed();
        assert!(backend.find_step("NOT_A_STEP").is_none());
    }

    #[test]
    fn upsert_is_last_writer_wins() {
        let backend = MemoryBackend::with_default_seed();
        let order_id = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        backend.upsert_completion(order_id, step_codes::DRIVER_RECEIVE_ORDER, first, "a").unwrap();
        backend.upsert_completion(order_id, step_codes::DRIVER_RECEIVE_ORDER, second, "b").unwrap();

        let records = backend.records_for_order(order_id);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user_id(), second);
        assert_eq!(records[0].details(), "b");
    }
}
