use mysql::{prelude::Queryable, PooledConn};
use tracing::info;

use super::Database;
use crate::error::Resultado;
use crate::modelos::BASE_COMPARTIDA;

pub struct Esquema;

impl Esquema {
    /// Registro principal de clientes.
    ///
    /// `contactado` y `fecha_contacto` van juntos: sin contactar no hay fecha.
    /// `propietario` es la cuenta que dio de alta el registro.
    /// `base` es la clave de partición: `SHARED` o `usuario__etiqueta`.
    /// Los campos de detalle (tipo_operacion..mercancia) se llenan en una
    /// pantalla posterior y arrancan vacíos.
    pub const CLIENTES: &str = "CREATE TABLE IF NOT EXISTS clientes(
            id INT AUTO_INCREMENT,
            nombre TEXT,
            nit TEXT,
            contacto TEXT,
            telefono TEXT,
            email TEXT,
            ciudad TEXT,
            direccion TEXT,
            fecha_contacto DATE NULL,
            observacion TEXT,
            contactado BOOLEAN DEFAULT FALSE,
            tipo_operacion TEXT,
            modalidad TEXT,
            origen TEXT,
            destino TEXT,
            mercancia TEXT,
            propietario VARCHAR(64),
            base VARCHAR(130) DEFAULT 'SHARED',
            PRIMARY KEY (id)
        )
    ";
    /// Bitácora de interacciones; solo se agrega, nunca se edita.
    pub const CONTACTOS: &str = "CREATE TABLE IF NOT EXISTS contactos(
            id INT AUTO_INCREMENT,
            cliente_id INT NOT NULL,
            fecha DATE NOT NULL,
            canal VARCHAR(20) NOT NULL,
            notas TEXT,
            PRIMARY KEY (id),
            FOREIGN KEY (cliente_id) REFERENCES clientes(id) ON DELETE CASCADE
        )
    ";
    /// Visitas agendadas. `creado_en` lo pone el servidor al insertar.
    pub const VISITAS: &str = "CREATE TABLE IF NOT EXISTS visitas(
            id INT AUTO_INCREMENT,
            cliente_id INT NOT NULL,
            fecha DATE NOT NULL,
            canal VARCHAR(20) NOT NULL,
            creado_por VARCHAR(64) NOT NULL,
            creado_en TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (id),
            FOREIGN KEY (cliente_id) REFERENCES clientes(id) ON DELETE CASCADE
        )
    ";
    /// Nombre visible que cada usuario le puso a su base privada.
    pub const PREFERENCIAS: &str = "CREATE TABLE IF NOT EXISTS preferencias(
            usuario VARCHAR(64) NOT NULL,
            nombre_base VARCHAR(64) NULL,
            PRIMARY KEY (usuario)
        )
    ";

    pub const TABLAS: [&str; 4] = [
        Self::CLIENTES,
        Self::CONTACTOS,
        Self::VISITAS,
        Self::PREFERENCIAS,
    ];

    /// Columnas que no existían en la primera revisión de `clientes`.
    /// Solo se agregan; nunca se elimina ni se renombra una columna.
    pub const COLUMNAS_NUEVAS: [(&str, &str); 3] = [
        ("direccion", "ALTER TABLE clientes ADD COLUMN direccion TEXT"),
        (
            "propietario",
            "ALTER TABLE clientes ADD COLUMN propietario VARCHAR(64)",
        ),
        (
            "base",
            "ALTER TABLE clientes ADD COLUMN base VARCHAR(130) DEFAULT 'SHARED'",
        ),
    ];

    pub const INDICES: [(&str, &str); 2] = [
        (
            "idx_clientes_propietario",
            "CREATE INDEX idx_clientes_propietario ON clientes (propietario)",
        ),
        (
            "idx_clientes_base",
            "CREATE INDEX idx_clientes_base ON clientes (base)",
        ),
    ];

    /// Las filas anteriores a la partición quedan visibles en la base común.
    pub const RELLENO_BASE: &str =
        "UPDATE clientes SET base = 'SHARED' WHERE base IS NULL";
}

impl Database {
    /// Crea el esquema si falta y lo pone al día en el sitio.
    ///
    /// Es seguro llamarla en cada arranque: cada paso verifica antes de
    /// ejecutar y ninguno toca datos existentes. Si una sentencia falla
    /// el arranque debe detenerse; operar con medio esquema corrompe.
    pub fn crear_tablas(&self) -> Resultado<()> {
        let mut conn = self.conexion()?;
        for ddl in Esquema::TABLAS {
            conn.query_drop(ddl)?;
        }
        for (columna, ddl) in Esquema::COLUMNAS_NUEVAS {
            if !existe_columna(&mut conn, "clientes", columna)? {
                info!("agregando columna clientes.{columna}");
                conn.query_drop(ddl)?;
            }
        }
        for (indice, ddl) in Esquema::INDICES {
            if !existe_indice(&mut conn, "clientes", indice)? {
                info!("creando índice {indice}");
                conn.query_drop(ddl)?;
            }
        }
        let resultado = conn.exec_iter(Esquema::RELLENO_BASE, ())?;
        let rellenadas = resultado.affected_rows();
        if rellenadas > 0 {
            info!("{rellenadas} clientes sin base pasaron a {BASE_COMPARTIDA}");
        }
        Ok(())
    }
}

// MySQL no trae ADD COLUMN IF NOT EXISTS ni CREATE INDEX IF NOT EXISTS;
// se pregunta al information_schema de la base actual.
fn existe_columna(conn: &mut PooledConn, tabla: &str, columna: &str) -> Resultado<bool> {
    let fila: Option<i64> = conn.exec_first(
        "SELECT 1 FROM information_schema.COLUMNS
        WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND COLUMN_NAME = ?",
        (tabla, columna),
    )?;
    Ok(fila.is_some())
}

fn existe_indice(conn: &mut PooledConn, tabla: &str, indice: &str) -> Resultado<bool> {
    let fila: Option<i64> = conn.exec_first(
        "SELECT 1 FROM information_schema.STATISTICS
        WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND INDEX_NAME = ?
        LIMIT 1",
        (tabla, indice),
    )?;
    Ok(fila.is_some())
}
