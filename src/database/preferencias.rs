use mysql::{params, prelude::Queryable};

use super::Database;
use crate::error::Resultado;
use crate::modelos::clave_privada;

/// Guarda o reemplaza el nombre visible de la base privada del usuario.
pub fn guardar_nombre_base(db: &Database, usuario: &str, nombre: &str) -> Resultado<()> {
    let mut conn = db.conexion()?;
    conn.exec_drop(
        "INSERT INTO preferencias (usuario, nombre_base) VALUES (:usuario, :nombre_base)
        ON DUPLICATE KEY UPDATE nombre_base = VALUES(nombre_base)",
        params! {
            "usuario" => usuario,
            "nombre_base" => nombre
        },
    )?;
    Ok(())
}

/// Nombre visible guardado por el usuario; None si nunca guardó uno.
pub fn obtener_nombre_base(db: &Database, usuario: &str) -> Resultado<Option<String>> {
    let mut conn = db.conexion()?;
    let fila: Option<Option<String>> = conn.exec_first(
        "SELECT nombre_base FROM preferencias WHERE usuario = ?",
        (usuario,),
    )?;
    Ok(fila.flatten())
}

/// Clave interna de la base privada del usuario, resolviendo su nombre
/// guardado; sin preferencia cae en la etiqueta por defecto.
pub fn resolver_base_privada(db: &Database, usuario: &str) -> Resultado<String> {
    let guardado = obtener_nombre_base(db, usuario)?;
    Ok(clave_privada(usuario, guardado.as_deref()))
}
