use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{DomainError, Role};

/// Usuario participante del flujo (customer, dispatcher o driver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: Uuid,
    username: String,
    display_name: String,
    phone: String,
    role: Role,
}

impl User {
    pub fn new(username: impl Into<String>,
               display_name: impl Into<String>,
               phone: impl Into<String>,
               role: Role)
               -> Result<Self, DomainError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(DomainError::Validation("El username no puede estar vacío".to_string()));
        }
        Ok(User { id: Uuid::new_v4(),
                  username,
                  display_name: display_name.into(),
                  phone: phone.into(),
                  role })
    }

    /// Reconstruye una fila ya persistida.
    pub fn from_parts(id: Uuid,
                      username: impl Into<String>,
                      display_name: impl Into<String>,
                      phone: impl Into<String>,
                      role: Role)
                      -> Self {
        User { id,
               username: username.into(),
               display_name: display_name.into(),
               phone: phone.into(),
               role }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
    pub fn username(&self) -> &str {
        &self.username
    }
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
    pub fn phone(&self) -> &str {
        &self.phone
    }
    pub fn role(&self) -> Role {
        self.role
    }
}
