use chrono::NaiveDate;
use mysql::{params, prelude::Queryable};
use tracing::error;

use super::Database;
use crate::error::Resultado;
use crate::modelos::{Canal, Visita};

/// Agenda una visita para el cliente y devuelve su id. `creado_por` es
/// la cuenta que la agenda; la marca de creación la pone el servidor.
pub fn agendar_visita(
    db: &Database,
    cliente_id: i64,
    fecha: NaiveDate,
    canal: Canal,
    creado_por: &str,
) -> Resultado<i64> {
    let mut conn = db.conexion()?;
    let resultado = conn.exec_iter(
        "INSERT INTO visitas (cliente_id, fecha, canal, creado_por)
        VALUES (:cliente_id, :fecha, :canal, :creado_por)",
        params! {
            "cliente_id" => cliente_id,
            "fecha" => fecha,
            "canal" => canal.como_str(),
            "creado_por" => creado_por
        },
    )?;
    Ok(resultado.last_insert_id().unwrap_or(0) as i64)
}

/// Visitas del cliente, de la más próxima en fecha hacia atrás. Un id
/// desconocido o una consulta caída devuelven vacío.
pub fn obtener_visitas(db: &Database, cliente_id: i64) -> Vec<Visita> {
    match listar(db, cliente_id) {
        Ok(lista) => lista,
        Err(e) => {
            error!("no se pudo leer las visitas del cliente {cliente_id}: {e}");
            Vec::new()
        }
    }
}

fn listar(db: &Database, cliente_id: i64) -> Resultado<Vec<Visita>> {
    let mut conn = db.conexion()?;
    let lista = conn.exec_map(
        "SELECT id, cliente_id, fecha, canal, creado_por, creado_en
        FROM visitas WHERE cliente_id = ? ORDER BY fecha DESC, id DESC",
        (cliente_id,),
        |visita: Visita| visita,
    )?;
    Ok(lista)
}
