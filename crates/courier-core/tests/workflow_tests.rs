use courier_core::constants::{step_codes, LABEL_COMPLETED};
use courier_core::{MemoryBackend, OrderStore, StatusCatalog, WorkflowEngine};
use courier_domain::{Order, Payment, Role, StatusCategory, User};
use uuid::Uuid;

struct Scenario {
    engine: WorkflowEngine<MemoryBackend>,
    customer: Uuid,
    dispatcher: Uuid,
    driver: Uuid,
    order: Uuid,
}

fn full_scenario() -> Scenario {
    let backend = MemoryBackend::with_default_seed();
    let customer = User::new("cust", "Customer One", "555-0100", Role::Customer).unwrap();
    let dispatcher = User::new("dsp", "Dispatcher One", "555-0200", Role::Dispatcher).unwrap();
    let driver = User::new("drv", "Driver One", "555-0001", Role::Driver).unwrap();
    let pending = backend.get_by_type_and_name(StatusCategory::Order, "Pending").unwrap();
    let order = Order::new("ORD-42", customer.id(), pending.id()).unwrap();

    let ids = (customer.id(), dispatcher.id(), driver.id(), order.id());
    backend.insert_user(customer);
    backend.insert_user(dispatcher);
    backend.insert_user(driver);
    backend.insert_order(order);

    Scenario { engine: WorkflowEngine::new(backend),
               customer: ids.0,
               dispatcher: ids.1,
               driver: ids.2,
               order: ids.3 }
}

#[test]
fn happy_path_walks_the_status_chain() {
    let s = full_scenario();
    s.engine.validate_required_statuses().unwrap();

    let steps = [(s.dispatcher, step_codes::DISPATCHER_ACCEPT_ORDER, Some("Processing")),
                 (s.dispatcher, step_codes::DISPATCHER_ASSIGN_DRIVER, Some("Scheduled")),
                 (s.driver, step_codes::DRIVER_RECEIVE_ORDER, Some("Shipped")),
                 (s.driver, step_codes::DRIVER_START_DELIVERY, Some("In Transit")),
                 (s.driver, step_codes::DRIVER_DELIVERED, Some("Delivered")),
                 (s.customer, step_codes::CUSTOMER_CONFIRM_RECEIPT, None)];

    for (actor, code, expected_status) in steps {
        let outcome = s.engine.apply_workflow_transition(s.order, code, actor, "ok").unwrap();
        assert_eq!(outcome.status_applied.as_ref().map(|st| st.name()), expected_status, "paso {code}");
    }

    let order = s.engine.backend().get_order(s.order).unwrap();
    assert_eq!(s.engine.backend().get_status(order.status_id()).unwrap().name(), "Delivered");

    // timeline completo, monótono no decreciente por índice
    let timeline = s.engine.timeline_for_order(s.order).unwrap();
    assert_eq!(timeline.len(), 6);
    for pair in timeline.windows(2) {
        assert!(pair[0].order_index <= pair[1].order_index);
    }
}

#[test]
fn progress_views_track_each_role() {
    let s = full_scenario();
    s.engine.apply_workflow_transition(s.order, step_codes::DISPATCHER_ACCEPT_ORDER, s.dispatcher, "accepted").unwrap();

    let dispatcher_view = s.engine.progress_for_user(s.dispatcher).unwrap();
    assert_eq!(dispatcher_view.role, Some(Role::Dispatcher));
    assert_eq!(dispatcher_view.completed_steps, 1);
    assert!((dispatcher_view.percentage - 50.0).abs() < 1e-9);
    let accept = dispatcher_view.steps
                                .iter()
                                .find(|v| v.code == step_codes::DISPATCHER_ACCEPT_ORDER)
                                .unwrap();
    assert_eq!(accept.status_label, LABEL_COMPLETED);

    // la vista del customer observa el status del pedido (hito sin registro)
    let customer_view = s.engine.progress_for_user(s.customer).unwrap();
    let create = customer_view.steps
                              .iter()
                              .find(|v| v.code == step_codes::CUSTOMER_CREATE_ORDER)
                              .unwrap();
    assert_eq!(create.status_label, "Processing");

    let driver_view = s.engine.progress_for_user(s.driver).unwrap();
    assert_eq!(driver_view.completed_steps, 0);
}

#[test]
fn payment_milestone_shows_in_customer_progress() {
    let s = full_scenario();
    let paid = s.engine.backend().get_by_type_and_name(StatusCategory::Payment, "Paid").unwrap();
    s.engine.backend().insert_payment(Payment::new(s.order, 2500, paid.id()).unwrap());

    let view = s.engine.progress_for_user(s.customer).unwrap();
    let payment = view.steps.iter().find(|v| v.code == step_codes::CUSTOMER_PAYMENT).unwrap();
    assert!(!payment.completed);
    assert_eq!(payment.status_label, "Paid");
}

#[test]
fn order_scoped_progress_ignores_other_orders() {
    let s = full_scenario();
    let pending = s.engine.backend().get_by_type_and_name(StatusCategory::Order, "Pending").unwrap();
    let other = Order::new("ORD-43", s.customer, pending.id()).unwrap();
    let other_id = other.id();
    s.engine.backend().insert_order(other);

    s.engine.complete_step(s.driver, other_id, step_codes::DRIVER_RECEIVE_ORDER, "other order").unwrap();

    let scoped = s.engine.progress_for_user_in_order(s.driver, s.order).unwrap();
    assert_eq!(scoped.completed_steps, 0);
    let global = s.engine.progress_for_user(s.driver).unwrap();
    assert_eq!(global.completed_steps, 1);
}

#[test]
fn write_paths_fail_closed_on_unresolved_references() {
    let s = full_scenario();

    let err = s.engine.complete_step(Uuid::new_v4(), s.order, step_codes::DRIVER_RECEIVE_ORDER, "x").unwrap_err();
    assert!(err.is_not_found());

    let err = s.engine.complete_step(s.driver, Uuid::new_v4(), step_codes::DRIVER_RECEIVE_ORDER, "x").unwrap_err();
    assert!(err.is_not_found());

    let err = s.engine.apply_workflow_transition(s.order, "GHOST_STEP", s.driver, "x").unwrap_err();
    assert!(err.is_not_found());

    assert!(s.engine.timeline_for_order(s.order).unwrap().is_empty());
}
