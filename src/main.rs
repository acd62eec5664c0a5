use courier_core::constants::step_codes;
use courier_core::{MemoryBackend, OrderStore, ProgressStore, StatusCatalog, WorkflowEngine};
use courier_domain::{Order, Role, StatusCategory, User};
use uuid::Uuid;

/// Validación: el catálogo de pasos es estable, case-insensitive y total.
fn run_catalog_validation() {
    let engine = WorkflowEngine::new(MemoryBackend::with_default_seed());

    let first = engine.steps_for_role("driver");
    let second = engine.steps_for_role("DRIVER");
    assert_eq!(first, second, "el catálogo debe ser estable entre llamadas");
    for pair in first.windows(2) {
        assert!(pair[0].order_index() < pair[1].order_index(),
                "order_index estrictamente creciente");
    }
    assert!(engine.steps_for_role("supervisor").is_empty(),
            "rol desconocido devuelve lista vacía, no error");
    println!("catálogo: {} pasos de driver, orden estable", first.len());
}

/// Validación: camino feliz completo de un pedido a través de los tres roles,
/// con la cadena de statuses aplicada transaccionalmente.
fn run_fulfillment_validation() {
    let backend = MemoryBackend::with_default_seed();
    let customer = User::new("cust", "Customer One", "555-0100", Role::Customer).expect("customer");
    let dispatcher = User::new("dsp", "Dispatcher One", "555-0200", Role::Dispatcher).expect("dispatcher");
    let driver = User::new("drv", "Driver One", "555-0001", Role::Driver).expect("driver");
    let pending = backend.get_by_type_and_name(StatusCategory::Order, "Pending").expect("status Pending");
    let order = Order::new("ORD-42", customer.id(), pending.id()).expect("order");
    let (customer_id, dispatcher_id, driver_id, order_id) = (customer.id(), dispatcher.id(), driver.id(), order.id());
    backend.insert_user(customer);
    backend.insert_user(dispatcher);
    backend.insert_user(driver);
    backend.insert_order(order);

    let engine = WorkflowEngine::new(backend);
    engine.validate_required_statuses().expect("catálogo de statuses completo");

    let plan = [(dispatcher_id, step_codes::DISPATCHER_ACCEPT_ORDER, "accepted"),
                (dispatcher_id, step_codes::DISPATCHER_ASSIGN_DRIVER, "driver drv"),
                (driver_id, step_codes::DRIVER_RECEIVE_ORDER, "picked up"),
                (driver_id, step_codes::DRIVER_START_DELIVERY, "rolling"),
                (driver_id, step_codes::DRIVER_DELIVERED, "at the door"),
                (customer_id, step_codes::CUSTOMER_CONFIRM_RECEIPT, "all good")];
    for (actor, code, details) in plan {
        let outcome = engine.apply_workflow_transition(order_id, code, actor, details).expect("transición");
        println!("paso {code} -> status {:?}", outcome.status_applied.as_ref().map(|s| s.name()));
    }

    let order = engine.backend().get_order(order_id).expect("order");
    let final_status = engine.backend().get_status(order.status_id()).expect("status");
    assert_eq!(final_status.name(), "Delivered");

    let timeline = engine.timeline_for_order(order_id).expect("timeline");
    println!("timeline de {}:", order_id);
    for entry in &timeline {
        println!("  [{}] {} por {:?} - {}",
                 entry.order_index.map_or("-".to_string(), |i| i.to_string()),
                 entry.step_code,
                 entry.actor.as_ref().map(|a| a.display_name.as_str()),
                 entry.details);
    }
    assert_eq!(timeline.len(), 6);
}

/// Validación: semántica de éxito parcial cuando el catálogo no tiene el
/// status destino (el paso se registra, el pedido no cambia).
fn run_partial_success_validation() {
    let mut backend = MemoryBackend::new();
    for status in courier_core::default_statuses() {
        if !(status.category() == StatusCategory::Delivery && status.name() == "Shipped") {
            backend.seed_status(status);
        }
    }
    for step in courier_core::default_step_definitions() {
        backend.seed_step(step);
    }
    let driver = User::new("drv", "Driver One", "555-0001", Role::Driver).expect("driver");
    let pending = backend.get_by_type_and_name(StatusCategory::Order, "Pending").expect("status Pending");
    let order = Order::new("ORD-43", Uuid::new_v4(), pending.id()).expect("order");
    let (driver_id, order_id) = (driver.id(), order.id());
    backend.insert_user(driver);
    backend.insert_order(order);

    let engine = WorkflowEngine::new(backend);
    // el chequeo de arranque detecta el hueco
    assert!(engine.validate_required_statuses().is_err(),
            "validación debe fallar con Shipped ausente");

    let status_before = engine.backend().get_order(order_id).expect("order").status_id();
    let outcome = engine.apply_workflow_transition(order_id, step_codes::DRIVER_RECEIVE_ORDER, driver_id, "picked up")
                        .expect("transición parcial");
    assert!(outcome.status_applied.is_none());
    assert_eq!(engine.backend().get_order(order_id).expect("order").status_id(), status_before);
    assert!(engine.backend()
                  .find_record(order_id, step_codes::DRIVER_RECEIVE_ORDER)
                  .expect("registro")
                  .completed());
    println!("éxito parcial: paso registrado, pedido intacto");
}

/// Validación: vistas de progreso, usuarios incompletos y estadísticas.
fn run_dashboard_validation() {
    let backend = MemoryBackend::with_default_seed();
    let driver_one = User::new("drv1", "Driver One", "555-0001", Role::Driver).expect("driver");
    let driver_two = User::new("drv2", "Driver Two", "555-0002", Role::Driver).expect("driver");
    let pending = backend.get_by_type_and_name(StatusCategory::Order, "Pending").expect("status Pending");
    let order = Order::new("ORD-44", Uuid::new_v4(), pending.id()).expect("order");
    let (one_id, two_id, order_id) = (driver_one.id(), driver_two.id(), order.id());
    backend.insert_user(driver_one);
    backend.insert_user(driver_two);
    backend.insert_order(order);

    let engine = WorkflowEngine::new(backend);
    engine.complete_step(one_id, order_id, step_codes::DRIVER_RECEIVE_ORDER, "picked up").expect("complete");

    let view = engine.progress_for_user(one_id).expect("progress");
    println!("progreso drv1: {}", serde_json::to_string(&view).expect("serializar vista"));
    assert_eq!(view.completed_steps, 1);

    let incomplete = engine.incomplete_users(Role::Driver);
    assert!(incomplete.contains(&one_id) && incomplete.contains(&two_id));

    let stats = engine.stats_for_role(Role::Driver);
    println!("stats driver: total={} completos={} promedio={:.1}%",
             stats.total_users, stats.completed_users, stats.average_progress);
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.completed_users, 0);
}

/// Demo opcional contra Postgres (requiere DATABASE_URL).
#[cfg(feature = "pg_demo")]
fn run_pg_demo() {
    use courier_persistence::{build_dev_pool_from_env, PgWorkflowStore, PoolProvider};

    let _ = dotenvy::dotenv();
    if std::env::var("DATABASE_URL").is_err() {
        println!("pg_demo: sin DATABASE_URL, se omite");
        return;
    }
    let pool = match build_dev_pool_from_env() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("pg_demo: pool error: {e}");
            return;
        }
    };
    let engine = WorkflowEngine::new(PgWorkflowStore::new(PoolProvider { pool }));
    match engine.validate_required_statuses() {
        Ok(()) => println!("pg_demo: catálogo de statuses completo"),
        Err(e) => println!("pg_demo: catálogo incompleto ({e}) - sembrar statuses antes de escribir"),
    }
    println!("pg_demo: {} pasos de driver en catálogo", engine.steps_for_role("driver").len());
}

fn main() {
    println!("== validación de catálogo ==");
    run_catalog_validation();
    println!("\n== validación de fulfillment ==");
    run_fulfillment_validation();
    println!("\n== validación de éxito parcial ==");
    run_partial_success_validation();
    println!("\n== validación de dashboards ==");
    run_dashboard_validation();
    #[cfg(feature = "pg_demo")]
    {
        println!("\n== demo Postgres ==");
        run_pg_demo();
    }
}
