use serde::{Deserialize, Serialize};

/// Identidad del usuario autenticado, armada por la capa de presentación
/// tras verificar credenciales y pasada explícitamente a cada operación.
///
/// `es_admin` sale del registro de credenciales; es la única fuente de
/// privilegio que el repositorio consulta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sesion {
    /// Cuenta con la que inició sesión.
    pub usuario: String,
    /// Nombre visible en pantalla.
    pub nombre: String,
    pub es_admin: bool,
    /// Base elegida en la interfaz, si el usuario seleccionó alguna.
    pub base_seleccionada: Option<String>,
}

impl Sesion {
    pub fn nueva(usuario: impl Into<String>, nombre: impl Into<String>, es_admin: bool) -> Self {
        Sesion {
            usuario: usuario.into(),
            nombre: nombre.into(),
            es_admin,
            base_seleccionada: None,
        }
    }

    pub fn con_base(mut self, base: impl Into<String>) -> Self {
        self.base_seleccionada = Some(base.into());
        self
    }
}
