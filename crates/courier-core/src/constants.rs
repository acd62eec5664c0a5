//! Constantes del motor de workflow.
//!
//! Este módulo agrupa los códigos de paso del catálogo de fulfillment y los
//! labels fijos que el agregador y el resolver devuelven hacia las vistas.
//! Los códigos deben coincidir con los sembrados en el catálogo de referencia;
//! la tabla de transiciones (`transition`) y el resolver (`resolver`) se
//! indexan por estos valores.

/// Códigos de paso del catálogo por defecto, por rol.
pub mod step_codes {
    // Customer
    pub const CUSTOMER_CREATE_ORDER: &str = "CUSTOMER_CREATE_ORDER";
    pub const CUSTOMER_PAYMENT: &str = "CUSTOMER_PAYMENT";
    pub const CUSTOMER_CONFIRM_RECEIPT: &str = "CUSTOMER_CONFIRM_RECEIPT";

    // Dispatcher
    pub const DISPATCHER_ACCEPT_ORDER: &str = "DISPATCHER_ACCEPT_ORDER";
    pub const DISPATCHER_ASSIGN_DRIVER: &str = "DISPATCHER_ASSIGN_DRIVER";

    // Driver
    pub const DRIVER_RECEIVE_ORDER: &str = "DRIVER_RECEIVE_ORDER";
    pub const DRIVER_START_DELIVERY: &str = "DRIVER_START_DELIVERY";
    pub const DRIVER_DELIVERED: &str = "DRIVER_DELIVERED";
}

/// Label fijo para pasos cuyo estado derivado no puede determinarse (sin
/// registro explícito y sin status de dominio válido que observar).
pub const LABEL_NOT_REACHED: &str = "Not yet reached";

/// Label para pasos con registro de completación explícito.
pub const LABEL_COMPLETED: &str = "Completed";
