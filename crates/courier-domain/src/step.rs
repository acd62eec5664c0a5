use serde::{Deserialize, Serialize};

use crate::{DomainError, Role};

/// Definición inmutable de un paso del workflow (dato de referencia).
///
/// Cada paso pertenece al catálogo de exactamente un rol y lleva un
/// `order_index` estrictamente creciente dentro de ese catálogo. El seed usa
/// índices globalmente crecientes para que el timeline cruzado entre roles
/// quede intercalado de forma determinista.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    role: Role,
    code: String,
    name: String,
    description: String,
    order_index: u32,
}

impl StepDefinition {
    /// Crea una definición validada.
    ///
    /// # Errores
    /// Retorna `DomainError::Validation` si el código está vacío o el índice
    /// no es positivo.
    pub fn new(role: Role,
               code: impl Into<String>,
               name: impl Into<String>,
               description: impl Into<String>,
               order_index: u32)
               -> Result<Self, DomainError> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(DomainError::Validation("El código de un paso no puede estar vacío".to_string()));
        }
        if order_index == 0 {
            return Err(DomainError::Validation(format!("order_index debe ser positivo para el paso {code}")));
        }
        Ok(StepDefinition { role,
                            code,
                            name: name.into(),
                            description: description.into(),
                            order_index })
    }

    pub fn role(&self) -> Role {
        self.role
    }
    pub fn code(&self) -> &str {
        &self.code
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn order_index(&self) -> u32 {
        self.order_index
    }
}
