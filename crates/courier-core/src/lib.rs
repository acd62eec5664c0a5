//! courier-core: motor de progreso de workflow de fulfillment
pub mod aggregator;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod memory;
pub mod ports;
pub mod recorder;
pub mod resolver;
pub mod timeline;
pub mod transition;
pub mod view;

pub use aggregator::ProgressAggregator;
pub use engine::WorkflowEngine;
pub use errors::CoreError;
pub use memory::{default_statuses, default_step_definitions, MemoryBackend};
pub use ports::{OrderStore, PaymentStore, ProgressStore, StatusCatalog, StepCatalog, UserStore, WorkflowBackend};
pub use recorder::CompletionRecorder;
pub use resolver::{BusinessStateResolver, ProgressScope};
pub use timeline::TimelineBuilder;
pub use transition::{apply_workflow_transition, transition_target, validate_required_statuses, TransitionOutcome, TRANSITION_TABLE};
pub use view::{ActorRef, ProgressView, RoleStats, StepView, TimelineEntry};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::step_codes;
    use courier_domain::{Order, Role, StatusCategory, User};
    use uuid::Uuid;

    fn engine_with_scenario() -> (WorkflowEngine<MemoryBackend>, Uuid, Uuid) {
        let backend = MemoryBackend::with_default_seed();
        let driver = User::new("drv", "Driver One", "555-0001", Role::Driver).unwrap();
        let pending = backend.get_by_type_and_name(StatusCategory::Order, "Pending").unwrap();
        let order = Order::new("ORD-42", Uuid::new_v4(), pending.id()).unwrap();
        let driver_id = driver.id();
        let order_id = order.id();
        backend.insert_user(driver);
        backend.insert_order(order);
        (WorkflowEngine::new(backend), driver_id, order_id)
    }

    #[test]
    fn driver_receive_order_scenario() {
        // Escenario de referencia: el driver recibe el pedido. El timeline
        // debe mostrar el paso completado con su actor, y el pedido debe
        // moverse a Shipped porque el catálogo lo tiene configurado.
        let (engine, driver_id, order_id) = engine_with_scenario();
        engine.validate_required_statuses().unwrap();

        let outcome = engine.apply_workflow_transition(order_id, step_codes::DRIVER_RECEIVE_ORDER, driver_id, "picked up")
                            .unwrap();
        assert_eq!(outcome.status_applied.as_ref().map(|s| s.name()), Some("Shipped"));

        let timeline = engine.timeline_for_order(order_id).unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].step_code, step_codes::DRIVER_RECEIVE_ORDER);
        assert!(timeline[0].completed);
        assert_eq!(timeline[0].actor.as_ref().map(|a| a.id), Some(driver_id));

        let order = engine.backend().get_order(order_id).unwrap();
        assert_eq!(engine.backend().get_status(order.status_id()).unwrap().name(), "Shipped");
    }

    #[test]
    fn steps_for_role_is_case_insensitive_and_total() {
        let (engine, _, _) = engine_with_scenario();
        let lower = engine.steps_for_role("driver");
        let upper = engine.steps_for_role("DRIVER");
        assert_eq!(lower, upper);
        assert_eq!(lower.len(), 3);
        assert!(engine.steps_for_role("supervisor").is_empty());
    }

    #[test]
    fn complete_step_with_unknown_code_leaves_store_unchanged() {
        let (engine, driver_id, order_id) = engine_with_scenario();
        let before = engine.timeline_for_order(order_id).unwrap();

        let err = engine.complete_step(driver_id, order_id, "NOT_IN_CATALOG", "x").unwrap_err();
        assert!(matches!(err, CoreError::StepNotFound(_)));

        let after = engine.timeline_for_order(order_id).unwrap();
        assert_eq!(before.len(), after.len());
    }

    #[test]
    fn second_completion_reattributes_the_record() {
        let (engine, driver_id, order_id) = engine_with_scenario();
        let second = User::new("drv2", "Driver Two", "555-0002", Role::Driver).unwrap();
        let second_id = second.id();
        engine.backend().insert_user(second);

        engine.complete_step(driver_id, order_id, step_codes::DRIVER_RECEIVE_ORDER, "first").unwrap();
        engine.complete_step(second_id, order_id, step_codes::DRIVER_RECEIVE_ORDER, "second").unwrap();

        let timeline = engine.timeline_for_order(order_id).unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].actor.as_ref().map(|a| a.id), Some(second_id));
        assert_eq!(timeline[0].details, "second");
    }
}
