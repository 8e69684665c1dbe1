use std::path::Path;

use mysql::{Opts, OptsBuilder};
use serde::Deserialize;

use crate::error::{Error, Resultado};

const PUERTO_MYSQL: u16 = 3306;

/// Parámetros de conexión al servidor MySQL.
///
/// Vienen del entorno (`DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER`,
/// `DB_PASS`) o de un archivo JSON con los mismos campos en español.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    #[serde(default = "puerto_por_defecto")]
    pub puerto: u16,
    pub base_datos: String,
    pub usuario: String,
    pub clave: String,
}

fn puerto_por_defecto() -> u16 {
    PUERTO_MYSQL
}

impl Config {
    pub fn desde_entorno() -> Resultado<Self> {
        Ok(Config {
            host: variable("DB_HOST")?,
            puerto: match std::env::var("DB_PORT") {
                Ok(valor) => valor
                    .parse()
                    .map_err(|_| Error::configuracion(format!("DB_PORT no es un puerto: {valor}")))?,
                Err(_) => PUERTO_MYSQL,
            },
            base_datos: variable("DB_NAME")?,
            usuario: variable("DB_USER")?,
            clave: variable("DB_PASS")?,
        })
    }

    pub fn desde_archivo(ruta: impl AsRef<Path>) -> Resultado<Self> {
        let ruta = ruta.as_ref();
        let contenido = std::fs::read_to_string(ruta)
            .map_err(|e| Error::configuracion(format!("no se pudo leer {}: {e}", ruta.display())))?;
        serde_json::from_str(&contenido)
            .map_err(|e| Error::configuracion(format!("{} no es un JSON válido: {e}", ruta.display())))
    }

    /// La clave viaja como campo aparte, nunca incrustada en una URL,
    /// así que puede contener `@`, `/`, `:` o `%` sin codificar.
    pub(crate) fn opciones(&self) -> Opts {
        Opts::from(
            OptsBuilder::new()
                .ip_or_hostname(Some(self.host.clone()))
                .tcp_port(self.puerto)
                .db_name(Some(self.base_datos.clone()))
                .user(Some(self.usuario.clone()))
                .pass(Some(self.clave.clone())),
        )
    }
}

fn variable(nombre: &str) -> Resultado<String> {
    std::env::var(nombre).map_err(|_| Error::configuracion(format!("falta la variable {nombre}")))
}
