use courier_domain::{Order, OrderPhase, Payment, Role, Status, StatusCategory, StepDefinition, User};
use uuid::Uuid;

#[test]
fn test_role_parse_roundtrip() {
    for role in Role::ALL {
        assert_eq!(Role::parse(role.as_str()), Some(role));
        assert_eq!(Role::parse(&role.as_str().to_uppercase()), Some(role));
    }
}

#[test]
fn test_step_definition_accessors() {
    let step = StepDefinition::new(Role::Dispatcher,
                                   "DISPATCHER_ASSIGN_DRIVER",
                                   "Assign driver",
                                   "Pick a driver for the order",
                                   4).unwrap();
    assert_eq!(step.role(), Role::Dispatcher);
    assert_eq!(step.code(), "DISPATCHER_ASSIGN_DRIVER");
    assert_eq!(step.order_index(), 4);
}

#[test]
fn test_order_rejects_empty_code() {
    assert!(Order::new("", Uuid::new_v4(), Uuid::new_v4()).is_err());
}

#[test]
fn test_order_status_mutation() {
    let mut order = Order::new("ORD-42", Uuid::new_v4(), Uuid::new_v4()).unwrap();
    let shipped = Status::new(StatusCategory::Delivery, "Shipped").unwrap();
    order.set_status_id(shipped.id());
    assert_eq!(order.status_id(), shipped.id());
}

#[test]
fn test_payment_rejects_non_positive_amount() {
    assert!(Payment::new(Uuid::new_v4(), 0, Uuid::new_v4()).is_err());
    assert!(Payment::new(Uuid::new_v4(), -500, Uuid::new_v4()).is_err());
}

#[test]
fn test_user_rejects_empty_username() {
    assert!(User::new("", "x", "555-0000", Role::Driver).is_err());
}

#[test]
fn test_phase_parse_matches_catalog_names() {
    for category in [StatusCategory::Order, StatusCategory::Delivery] {
        for name in category.valid_names() {
            // Completed/Cancelled son nombres de catálogo sin fase de workflow
            if matches!(*name, "Completed" | "Cancelled") {
                continue;
            }
            assert!(OrderPhase::parse(name).is_some(), "fase no parseable: {name}");
        }
    }
}
