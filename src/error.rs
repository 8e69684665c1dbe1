use thiserror::Error;

pub type Resultado<T> = Result<T, Error>;

/// Fallas que el repositorio devuelve a la capa de presentación.
///
/// Las escrituras siempre levantan error; las consultas de listado
/// degradan a colecciones vacías y solo dejan registro en el log.
#[derive(Debug, Error)]
pub enum Error {
    /// Falta un dato obligatorio o llegó con un valor inservible.
    #[error("validación: {0}")]
    Validacion(String),

    /// El servidor MySQL rechazó la operación o no respondió.
    #[error("almacenamiento: {0}")]
    Almacenamiento(#[from] mysql::Error),

    /// Parámetros de conexión incompletos o malformados.
    #[error("configuración: {0}")]
    Configuracion(String),
}

impl Error {
    pub fn validacion(mensaje: impl Into<String>) -> Self {
        Error::Validacion(mensaje.into())
    }

    pub fn configuracion(mensaje: impl Into<String>) -> Self {
        Error::Configuracion(mensaje.into())
    }
}
