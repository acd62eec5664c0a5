//! Timeline por pedido: vista cronológica, agnóstica de rol.
//!
//! Lectura pura sobre el registro de progreso: refleja exactamente lo que se
//! registró de forma explícita, sin fallback al resolver de estado de
//! negocio. El orden es determinista por `order_index` del paso; registros
//! cuyo código ya no existe en el catálogo se ordenan al final.

use uuid::Uuid;

use crate::errors::CoreError;
use crate::ports::WorkflowBackend;
use crate::view::{ActorRef, TimelineEntry};

pub struct TimelineBuilder<'a, B: WorkflowBackend> {
    backend: &'a B,
}

impl<'a, B: WorkflowBackend> TimelineBuilder<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Entradas del timeline de un pedido, orden no decreciente por índice.
    pub fn timeline_for_order(&self, order_id: Uuid) -> Result<Vec<TimelineEntry>, CoreError> {
        self.backend.get_order(order_id).ok_or(CoreError::OrderNotFound(order_id))?;

        let mut entries: Vec<TimelineEntry> = self.backend
                                                  .records_for_order(order_id)
                                                  .into_iter()
                                                  .map(|record| {
                                                      let step = self.backend.find_step(record.step_code());
                                                      let actor = self.backend.get_user(record.user_id()).map(|u| {
                                                          ActorRef { id: u.id(),
                                                                     display_name: u.display_name().to_string(),
                                                                     role: u.role(),
                                                                     phone: u.phone().to_string() }
                                                      });
                                                      TimelineEntry { step_code: record.step_code().to_string(),
                                                                      step_name: step.as_ref().map(|s| s.name().to_string()),
                                                                      description: step.as_ref()
                                                                                       .map(|s| s.description().to_string()),
                                                                      order_index: step.as_ref().map(|s| s.order_index()),
                                                                      completed: record.completed(),
                                                                      completed_at: record.completed_at(),
                                                                      details: record.details().to_string(),
                                                                      actor }
                                                  })
                                                  .collect();
        // índices faltantes al final, empate roto por timestamp
        entries.sort_by(|a, b| {
                   let ka = (a.order_index.is_none(), a.order_index.unwrap_or(u32::MAX), a.completed_at);
                   let kb = (b.order_index.is_none(), b.order_index.unwrap_or(u32::MAX), b.completed_at);
                   ka.cmp(&kb)
               });
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::step_codes;
    use crate::memory::MemoryBackend;
    use crate::ports::{ProgressStore, StatusCatalog};
    use courier_domain::{Order, Role, StatusCategory, User};

    fn seeded() -> (MemoryBackend, Uuid, Uuid, Uuid) {
        let backend = MemoryBackend::with_default_seed();
        let dispatcher = User::new("dsp", "Dispatcher One", "555-0200", Role::Dispatcher).unwrap();
        let driver = User::new("drv", "Driver One", "555-0001", Role::Driver).unwrap();
        let pending = backend.get_by_type_and_name(StatusCategory::Order, "Pending").unwrap();
        let order = Order::new("ORD-42", Uuid::new_v4(), pending.id()).unwrap();
        let ids = (dispatcher.id(), driver.id(), order.id());
        backend.insert_user(dispatcher);
        backend.insert_user(driver);
        backend.insert_order(order);
        (backend, ids.0, ids.1, ids.2)
    }

    #[test]
    fn entries_are_sorted_by_step_index_across_roles() {
        let (backend, dispatcher_id, driver_id, order_id) = seeded();
        // registrado en desorden a propósito
        backend.upsert_completion(order_id, step_codes::DRIVER_RECEIVE_ORDER, driver_id, "picked up").unwrap();
        backend.upsert_completion(order_id, step_codes::DISPATCHER_ASSIGN_DRIVER, dispatcher_id, "driver drv").unwrap();

        let entries = TimelineBuilder::new(&backend).timeline_for_order(order_id).unwrap();
        let indices: Vec<Option<u32>> = entries.iter().map(|e| e.order_index).collect();
        assert_eq!(indices, vec![Some(4), Some(5)]);
        assert_eq!(entries[0].actor.as_ref().unwrap().role, Role::Dispatcher);
        assert_eq!(entries[1].actor.as_ref().unwrap().id, driver_id);
    }

    #[test]
    fn unknown_step_codes_sort_last_and_keep_the_entry() {
        let (backend, _, driver_id, order_id) = seeded();
        backend.upsert_completion(order_id, step_codes::DRIVER_DELIVERED, driver_id, "delivered").unwrap();
        // registro huérfano: el código ya no está en el catálogo
        backend.upsert_completion(order_id, "LEGACY_STEP", driver_id, "imported").unwrap();

        let entries = TimelineBuilder::new(&backend).timeline_for_order(order_id).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].step_code, step_codes::DRIVER_DELIVERED);
        assert_eq!(entries[1].step_code, "LEGACY_STEP");
        assert_eq!(entries[1].order_index, None);
        assert_eq!(entries[1].step_name, None);
    }

    #[test]
    fn missing_actor_keeps_the_entry() {
        let (backend, _, _, order_id) = seeded();
        let ghost = Uuid::new_v4();
        backend.upsert_completion(order_id, step_codes::DRIVER_DELIVERED, ghost, "delivered").unwrap();

        let entries = TimelineBuilder::new(&backend).timeline_for_order(order_id).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].actor.is_none());
        assert!(entries[0].completed);
    }

    #[test]
    fn unknown_order_is_not_found() {
        let (backend, _, _, _) = seeded();
        let err = TimelineBuilder::new(&backend).timeline_for_order(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, CoreError::OrderNotFound(_)));
    }
}
