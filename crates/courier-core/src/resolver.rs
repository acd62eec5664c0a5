//! Resolver de estado de negocio.
//!
//! Algunos pasos no tienen evento de completación propio: se *observan*
//! desde entidades de dominio ajenas al registro de progreso (el pedido, el
//! pago más reciente). Este módulo deriva el label humano de esos pasos a
//! partir del status vivo, filtrado por la whitelist de nombres válidos de
//! su categoría; fuera de la whitelist devuelve el label fijo de "no
//! alcanzado".

use uuid::Uuid;

use courier_domain::Order;

use crate::constants::{step_codes, LABEL_NOT_REACHED};
use crate::ports::{OrderStore, PaymentStore, StatusCatalog};

/// Alcance de la resolución: un pedido explícito, o el pedido más reciente
/// creado por un usuario (vista de dashboard por usuario).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressScope {
    Order(Uuid),
    User(Uuid),
}

/// Fuente de dominio que alimenta un paso-hito.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MilestoneSource {
    OrderStatus,
    LatestPaymentStatus,
}

/// Pasos cuyo estado se deriva del dominio en lugar de un registro explícito.
fn milestone_source(step_code: &str) -> Option<MilestoneSource> {
    match step_code {
        step_codes::CUSTOMER_CREATE_ORDER => Some(MilestoneSource::OrderStatus),
        step_codes::CUSTOMER_PAYMENT => Some(MilestoneSource::LatestPaymentStatus),
        _ => None,
    }
}

pub struct BusinessStateResolver<'a, B>
    where B: OrderStore + PaymentStore + StatusCatalog
{
    backend: &'a B,
}

impl<'a, B> BusinessStateResolver<'a, B>
    where B: OrderStore + PaymentStore + StatusCatalog
{
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Label derivado para un paso dentro de un alcance. Para pasos sin
    /// fuente de hito, o cuando la entidad/status no resuelve, devuelve
    /// `LABEL_NOT_REACHED`; nunca falla.
    pub fn resolve(&self, step_code: &str, scope: ProgressScope) -> String {
        let source = match milestone_source(step_code) {
            Some(s) => s,
            None => return LABEL_NOT_REACHED.to_string(),
        };
        let order = match self.scoped_order(scope) {
            Some(o) => o,
            None => return LABEL_NOT_REACHED.to_string(),
        };
        let status_id = match source {
            MilestoneSource::OrderStatus => Some(order.status_id()),
            MilestoneSource::LatestPaymentStatus => {
                PaymentStore::list_by_order(self.backend, order.id()).first().map(|p| p.status_id())
            }
        };
        status_id.and_then(|id| self.backend.get_status(id))
                 .filter(|s| s.category().is_valid_name(s.name()))
                 .map(|s| s.name().to_string())
                 .unwrap_or_else(|| LABEL_NOT_REACHED.to_string())
    }

    fn scoped_order(&self, scope: ProgressScope) -> Option<Order> {
        match scope {
            ProgressScope::Order(order_id) => self.backend.get_order(order_id),
            ProgressScope::User(user_id) => self.backend.list_by_creator(user_id).into_iter().next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use courier_domain::{Payment, Role, Status, StatusCategory, User};

    fn seeded_order(backend: &MemoryBackend, status_name: &str) -> (Uuid, Uuid) {
        let customer = User::new("cust", "Customer", "555-0100", Role::Customer).unwrap();
        let status = backend.get_by_type_and_name(StatusCategory::Order, status_name).unwrap();
        let order = courier_domain::Order::new("ORD-1", customer.id(), status.id()).unwrap();
        backend.insert_user(customer.clone());
        backend.insert_order(order.clone());
        (customer.id(), order.id())
    }

    #[test]
    fn order_milestone_reflects_live_status() {
        let backend = MemoryBackend::with_default_seed();
        let (_, order_id) = seeded_order(&backend, "Pending");
        let resolver = BusinessStateResolver::new(&backend);
        assert_eq!(resolver.resolve(step_codes::CUSTOMER_CREATE_ORDER, ProgressScope::Order(order_id)),
                   "Pending");
    }

    #[test]
    fn user_scope_uses_most_recent_order() {
        let backend = MemoryBackend::with_default_seed();
        let (customer_id, _) = seeded_order(&backend, "Processing");
        let resolver = BusinessStateResolver::new(&backend);
        assert_eq!(resolver.resolve(step_codes::CUSTOMER_CREATE_ORDER, ProgressScope::User(customer_id)),
                   "Processing");
    }

    #[test]
    fn payment_milestone_uses_latest_payment() {
        use chrono::{Duration, Utc};

        let backend = MemoryBackend::with_default_seed();
        let (_, order_id) = seeded_order(&backend, "Pending");
        let pending = backend.get_by_type_and_name(StatusCategory::Payment, "Pending").unwrap();
        let paid = backend.get_by_type_and_name(StatusCategory::Payment, "Paid").unwrap();
        let earlier = Utc::now() - Duration::minutes(5);
        backend.insert_payment(Payment::from_parts(Uuid::new_v4(), order_id, 1500, pending.id(), earlier));
        backend.insert_payment(Payment::from_parts(Uuid::new_v4(), order_id, 1500, paid.id(), Utc::now()));

        let resolver = BusinessStateResolver::new(&backend);
        let label = resolver.resolve(step_codes::CUSTOMER_PAYMENT, ProgressScope::Order(order_id));
        // más reciente primero: el intento Paid gana
        assert_eq!(label, "Paid");
    }

    #[test]
    fn status_outside_whitelist_falls_back() {
        let mut backend = MemoryBackend::with_default_seed();
        let bogus = Status::new(StatusCategory::Order, "Limbo").unwrap();
        backend.seed_status(bogus.clone());
        let (_, order_id) = seeded_order(&backend, "Pending");
        backend.update_status(order_id, bogus.id()).unwrap();

        let resolver = BusinessStateResolver::new(&backend);
        assert_eq!(resolver.resolve(step_codes::CUSTOMER_CREATE_ORDER, ProgressScope::Order(order_id)),
                   LABEL_NOT_REACHED);
    }

    #[test]
    fn non_milestone_step_is_not_reached() {
        let backend = MemoryBackend::with_default_seed();
        let (_, order_id) = seeded_order(&backend, "Pending");
        let resolver = BusinessStateResolver::new(&backend);
        assert_eq!(resolver.resolve(step_codes::DRIVER_DELIVERED, ProgressScope::Order(order_id)),
                   LABEL_NOT_REACHED);
    }
}
