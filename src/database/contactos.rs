use chrono::NaiveDate;
use mysql::{params, prelude::Queryable};
use tracing::error;

use super::Database;
use crate::error::Resultado;
use crate::modelos::{Canal, Contacto};

/// Asienta una interacción en la bitácora del cliente y devuelve su id.
/// Las filas existentes nunca se editan.
pub fn registrar_contacto(
    db: &Database,
    cliente_id: i64,
    fecha: NaiveDate,
    canal: Canal,
    notas: &str,
) -> Resultado<i64> {
    let mut conn = db.conexion()?;
    let resultado = conn.exec_iter(
        "INSERT INTO contactos (cliente_id, fecha, canal, notas)
        VALUES (:cliente_id, :fecha, :canal, :notas)",
        params! {
            "cliente_id" => cliente_id,
            "fecha" => fecha,
            "canal" => canal.como_str(),
            "notas" => notas
        },
    )?;
    Ok(resultado.last_insert_id().unwrap_or(0) as i64)
}

/// Bitácora completa del cliente, de la interacción más reciente a la
/// más vieja. Un id desconocido o una consulta caída devuelven vacío.
pub fn obtener_contactos(db: &Database, cliente_id: i64) -> Vec<Contacto> {
    match listar(db, cliente_id) {
        Ok(lista) => lista,
        Err(e) => {
            error!("no se pudo leer la bitácora del cliente {cliente_id}: {e}");
            Vec::new()
        }
    }
}

fn listar(db: &Database, cliente_id: i64) -> Resultado<Vec<Contacto>> {
    let mut conn = db.conexion()?;
    let lista = conn.exec_map(
        "SELECT id, cliente_id, fecha, canal, COALESCE(notas, '') AS notas
        FROM contactos WHERE cliente_id = ? ORDER BY fecha DESC, id DESC",
        (cliente_id,),
        |contacto: Contacto| contacto,
    )?;
    Ok(lista)
}
