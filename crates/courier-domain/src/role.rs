use serde::{Deserialize, Serialize};
use std::fmt;

/// Rol cerrado de un usuario dentro del flujo de fulfillment.
///
/// Cada rol tiene su propio catálogo ordenado de pasos. El parseo desde texto
/// es case-insensitive y devuelve `None` para roles desconocidos: los caminos
/// de lectura degradan a catálogo vacío, los de escritura lo convierten en un
/// error de validación.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Customer,
    Dispatcher,
    Driver,
}

impl Role {
    /// Todos los roles, en el orden canónico del catálogo.
    pub const ALL: [Role; 3] = [Role::Customer, Role::Dispatcher, Role::Driver];

    /// Parseo case-insensitive. `None` si el texto no corresponde a un rol.
    pub fn parse(value: &str) -> Option<Role> {
        match value.trim().to_ascii_lowercase().as_str() {
            "customer" => Some(Role::Customer),
            "dispatcher" => Some(Role::Dispatcher),
            "driver" => Some(Role::Driver),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "Customer",
            Role::Dispatcher => "Dispatcher",
            Role::Driver => "Driver",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Role::parse("DRIVER"), Some(Role::Driver));
        assert_eq!(Role::parse("customer"), Some(Role::Customer));
        assert_eq!(Role::parse(" Dispatcher "), Some(Role::Dispatcher));
    }

    #[test]
    fn parse_unknown_is_none() {
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::parse(""), None);
    }
}
