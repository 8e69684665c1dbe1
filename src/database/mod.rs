use mysql::{prelude::Queryable, Pool, PooledConn};

pub mod clientes;
pub mod contactos;
pub mod esquema;
pub mod preferencias;
pub mod visitas;

use crate::config::Config;
use crate::error::Resultado;

/// Acceso al almacenamiento: un pool de conexiones MySQL.
///
/// Se abre una vez al arrancar y se comparte por referencia; cada
/// operación del repositorio saca su propia conexión del pool.
pub struct Database {
    pool: Pool,
}

impl Database {
    /// Abre el pool y comprueba de entrada que el servidor responda.
    pub fn conectar(config: &Config) -> Resultado<Self> {
        let pool = Pool::new(config.opciones())?;
        let db = Database { pool };
        db.conexion()?;
        Ok(db)
    }

    /// Saca una conexión viva del pool.
    ///
    /// Una conexión reposada puede llevar horas abierta y el servidor
    /// pudo haberla cerrado; se sondea con SELECT 1 y se reemplaza una
    /// vez antes de rendirse.
    pub(crate) fn conexion(&self) -> Resultado<PooledConn> {
        let mut conn = self.pool.get_conn()?;
        if conn.query_drop("SELECT 1").is_err() {
            conn = self.pool.get_conn()?;
            conn.query_drop("SELECT 1")?;
        }
        Ok(conn)
    }
}
