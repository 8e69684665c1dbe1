//! Capa de datos del registro de clientes de la agencia de carga:
//! esquema con migración aditiva y repositorio tipado sobre MySQL,
//! con particiones por usuario y paso de administrador.
//!
//! La capa de presentación construye una [`Config`], conecta la
//! [`Database`], llama una vez a `crear_tablas()` y de ahí en adelante
//! usa las operaciones de [`database::clientes`] y compañía pasando la
//! [`Sesion`] del usuario autenticado.

pub mod config;
pub mod database;
pub mod error;
pub mod modelos;
pub mod sesion;

pub use config::Config;
pub use database::Database;
pub use error::{Error, Resultado};
pub use modelos::{
    normalizar_fecha, CambiosCliente, Canal, Cliente, Contacto, DetalleCliente, FiltroClientes,
    NuevoCliente, Visita, BASE_COMPARTIDA,
};
pub use sesion::Sesion;
