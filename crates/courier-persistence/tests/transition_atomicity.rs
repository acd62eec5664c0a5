//! Acoplamiento paso → status contra Postgres: el cambio de status del
//! pedido y el registro de completación se confirman en una sola
//! transacción, y la ausencia del status en el catálogo produce el éxito
//! parcial documentado. Se omiten si no hay `DATABASE_URL`.

use courier_core::constants::step_codes;
use courier_core::{apply_workflow_transition, validate_required_statuses, OrderStore, ProgressStore, StatusCatalog,
                   WorkflowBackend};
use courier_domain::{Role, StatusCategory};
use uuid::Uuid;

use test_support::{seed_scenario, store_from, with_pool};

#[test]
fn startup_validation_passes_on_seeded_catalog() {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("skip (no DATABASE_URL)");
        return;
    }
    let pool = with_pool(|p| p.clone()).unwrap();
    let store = store_from(&pool);
    seed_scenario(&pool, Role::Driver);
    validate_required_statuses(&store).unwrap();
}

#[test]
fn transition_commits_status_and_record_together() {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("skip (no DATABASE_URL)");
        return;
    }
    let pool = with_pool(|p| p.clone()).unwrap();
    let store = store_from(&pool);
    let (driver_id, order_id) = seed_scenario(&pool, Role::Driver);

    let outcome =
        apply_workflow_transition(&store, order_id, step_codes::DRIVER_RECEIVE_ORDER, driver_id, "picked up").unwrap();
    assert_eq!(outcome.status_applied.as_ref().map(|s| s.name()), Some("Shipped"));

    let order = store.get_order(order_id).unwrap();
    let status = store.get_status(order.status_id()).unwrap();
    assert_eq!(status.name(), "Shipped");
    assert_eq!(status.category(), StatusCategory::Delivery);
    assert!(store.find_record(order_id, step_codes::DRIVER_RECEIVE_ORDER).unwrap().completed());
}

#[test]
fn vanished_order_rolls_back_the_whole_transition() {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("skip (no DATABASE_URL)");
        return;
    }
    let pool = with_pool(|p| p.clone()).unwrap();
    let store = store_from(&pool);
    let (driver_id, order_id) = seed_scenario(&pool, Role::Driver);
    let shipped = store.get_by_type_and_name(StatusCategory::Delivery, "Shipped").unwrap();

    // la escritura directa al backend con un pedido inexistente debe
    // revertir también el upsert de progreso (both-or-neither)
    let ghost_order = Uuid::new_v4();
    let err = store.complete_with_status(ghost_order,
                                         step_codes::DRIVER_RECEIVE_ORDER,
                                         driver_id,
                                         "picked up",
                                         Some(&shipped));
    assert!(err.is_err());
    assert!(store.find_record(ghost_order, step_codes::DRIVER_RECEIVE_ORDER).is_none());
    // y el pedido real queda intacto
    assert!(store.find_record(order_id, step_codes::DRIVER_RECEIVE_ORDER).is_none());
}

#[test]
fn completion_without_status_leaves_the_order_untouched() {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("skip (no DATABASE_URL)");
        return;
    }
    let pool = with_pool(|p| p.clone()).unwrap();
    let store = store_from(&pool);
    let (driver_id, order_id) = seed_scenario(&pool, Role::Driver);
    let status_before = store.get_order(order_id).unwrap().status_id();

    // camino de éxito parcial: sin status destino, solo se registra el paso
    let record = store.complete_with_status(order_id, step_codes::DRIVER_START_DELIVERY, driver_id, "rolling", None)
                      .unwrap();
    assert!(record.completed());
    assert_eq!(store.get_order(order_id).unwrap().status_id(), status_before);
}
