use mysql::{params, prelude::Queryable, Value};
use tracing::error;

use super::{preferencias, Database};
use crate::error::{Error, Resultado};
use crate::modelos::{
    normalizar_base, normalizar_fecha, CambiosCliente, Cliente, DetalleCliente, FiltroClientes,
    NuevoCliente, BASE_COMPARTIDA,
};
use crate::sesion::Sesion;

// Las columnas de texto son anulables en el esquema; se leen con
// COALESCE para que la fila llegue completa a Cliente.
const SELECCION: &str = "SELECT id, COALESCE(nombre, '') AS nombre, COALESCE(nit, '') AS nit,
    COALESCE(contacto, '') AS contacto, COALESCE(telefono, '') AS telefono,
    COALESCE(email, '') AS email, COALESCE(ciudad, '') AS ciudad,
    COALESCE(direccion, '') AS direccion, fecha_contacto,
    COALESCE(observacion, '') AS observacion,
    COALESCE(contactado, FALSE) AS contactado,
    COALESCE(tipo_operacion, '') AS tipo_operacion,
    COALESCE(modalidad, '') AS modalidad,
    COALESCE(origen, '') AS origen,
    COALESCE(destino, '') AS destino,
    COALESCE(mercancia, '') AS mercancia,
    COALESCE(propietario, '') AS propietario,
    COALESCE(base, 'SHARED') AS base
    FROM clientes";

/// Da de alta un cliente y devuelve su id.
///
/// Sin propietario no hay alta. Un cliente sin contactar queda sin
/// fecha de contacto aunque el formulario traiga una; una fecha
/// ilegible se descarta en lugar de tumbar el registro completo.
pub fn agregar_cliente(db: &Database, nuevo: &NuevoCliente) -> Resultado<i64> {
    let propietario = nuevo.propietario.trim();
    if propietario.is_empty() {
        return Err(Error::validacion("un cliente nuevo necesita propietario"));
    }
    let fecha_contacto = if nuevo.contactado {
        nuevo.fecha_contacto.as_deref().and_then(normalizar_fecha)
    } else {
        None
    };
    let base = normalizar_base(propietario, nuevo.base.as_deref());

    let mut conn = db.conexion()?;
    let resultado = conn.exec_iter(
        "INSERT INTO clientes
        (nombre, nit, contacto, telefono, email, ciudad, direccion,
        fecha_contacto, observacion, contactado, propietario, base)
        VALUES
        (:nombre, :nit, :contacto, :telefono, :email, :ciudad, :direccion,
        :fecha_contacto, :observacion, :contactado, :propietario, :base)",
        params! {
            "nombre" => &nuevo.nombre,
            "nit" => &nuevo.nit,
            "contacto" => &nuevo.contacto,
            "telefono" => &nuevo.telefono,
            "email" => &nuevo.email,
            "ciudad" => &nuevo.ciudad,
            "direccion" => &nuevo.direccion,
            "fecha_contacto" => fecha_contacto,
            "observacion" => &nuevo.observacion,
            "contactado" => nuevo.contactado,
            "propietario" => propietario,
            "base" => &base
        },
    )?;
    Ok(resultado.last_insert_id().unwrap_or(0) as i64)
}

/// Lista clientes según el filtro y lo que la sesión tiene permitido ver.
///
/// Un administrador puede pedir cualquier base por su clave exacta; sin
/// base pedida recorre todas. Un usuario común solo alcanza la base
/// compartida o la suya: cualquier otra clave que pida se reduce a su
/// propia base, de modo que este es el único punto que decide visibilidad
/// entre usuarios. Si la consulta falla se registra y se devuelve vacío;
/// un tropiezo de lectura no debe tumbar la sesión.
pub fn obtener_clientes(db: &Database, filtro: &FiltroClientes, sesion: &Sesion) -> Vec<Cliente> {
    match listar(db, filtro, sesion) {
        Ok(lista) => lista,
        Err(e) => {
            error!("no se pudo listar clientes: {e}");
            Vec::new()
        }
    }
}

fn listar(db: &Database, filtro: &FiltroClientes, sesion: &Sesion) -> Resultado<Vec<Cliente>> {
    let alcance = if sesion.es_admin {
        base_explicita(filtro, sesion).map(str::to_string)
    } else {
        Some(alcance_propio(
            base_explicita(filtro, sesion),
            preferencias::resolver_base_privada(db, &sesion.usuario)?,
        ))
    };

    let mut condiciones: Vec<&str> = Vec::new();
    let mut valores: Vec<Value> = Vec::new();
    if let Some(contactado) = filtro.contactado {
        condiciones.push("COALESCE(contactado, FALSE) = ?");
        valores.push(Value::from(contactado));
    }
    if let Some(base) = alcance {
        condiciones.push("base = ?");
        valores.push(Value::from(base));
    }
    let sql = if condiciones.is_empty() {
        format!("{SELECCION} ORDER BY id")
    } else {
        format!("{SELECCION} WHERE {} ORDER BY id", condiciones.join(" AND "))
    };

    let mut conn = db.conexion()?;
    let lista = conn.exec_map(sql, valores, |cliente: Cliente| cliente)?;
    Ok(lista)
}

/// Base pedida expresamente: primero la del filtro, si no la elegida en
/// la sesión. Espacios solos cuentan como no pedida.
fn base_explicita<'a>(filtro: &'a FiltroClientes, sesion: &'a Sesion) -> Option<&'a str> {
    let del_filtro = filtro
        .base
        .as_deref()
        .map(str::trim)
        .filter(|base| !base.is_empty());
    del_filtro.or_else(|| {
        sesion
            .base_seleccionada
            .as_deref()
            .map(str::trim)
            .filter(|base| !base.is_empty())
    })
}

/// Visibilidad de un usuario sin privilegios: la base compartida cuando
/// la pide por nombre, su propia base privada en todo otro caso. Una
/// clave ajena pedida a mano termina acá y queda reducida a la propia.
fn alcance_propio(explicita: Option<&str>, clave_propia: String) -> String {
    match explicita {
        Some(BASE_COMPARTIDA) => BASE_COMPARTIDA.to_string(),
        _ => clave_propia,
    }
}

/// Sobrescribe los cinco campos operativos del cliente dado.
///
/// Devuelve cuántas filas cambiaron; 0 con un id inexistente. Ninguna
/// otra fila se toca.
pub fn actualizar_cliente_detalle(
    db: &Database,
    id: i64,
    detalle: &DetalleCliente,
) -> Resultado<u64> {
    let mut conn = db.conexion()?;
    let resultado = conn.exec_iter(
        "UPDATE clientes SET tipo_operacion = :tipo_operacion, modalidad = :modalidad,
        origen = :origen, destino = :destino, mercancia = :mercancia
        WHERE id = :id LIMIT 1",
        params! {
            "tipo_operacion" => &detalle.tipo_operacion,
            "modalidad" => &detalle.modalidad,
            "origen" => &detalle.origen,
            "destino" => &detalle.destino,
            "mercancia" => &detalle.mercancia,
            "id" => id
        },
    )?;
    Ok(resultado.affected_rows())
}

/// Aplica un parche disperso: solo escribe los campos presentes.
///
/// Mantiene la regla del alta: descontactar borra la fecha, y una fecha
/// parchada sola solo queda si la fila ya está marcada como contactada.
/// Un parche vacío no toca la base y devuelve 0.
pub fn actualizar_cliente_campos(
    db: &Database,
    id: i64,
    cambios: &CambiosCliente,
) -> Resultado<u64> {
    let (sql, mut valores) = match armar_actualizacion(cambios) {
        Some(par) => par,
        None => return Ok(0),
    };
    valores.push(Value::from(id));
    let mut conn = db.conexion()?;
    let resultado = conn.exec_iter(sql, valores)?;
    Ok(resultado.affected_rows())
}

/// Borra el cliente; sus contactos y visitas caen en cascada.
pub fn eliminar_cliente(db: &Database, id: i64) -> Resultado<u64> {
    let mut conn = db.conexion()?;
    let resultado = conn.exec_iter("DELETE FROM clientes WHERE id = ? LIMIT 1", (id,))?;
    Ok(resultado.affected_rows())
}

fn armar_actualizacion(cambios: &CambiosCliente) -> Option<(String, Vec<Value>)> {
    let mut asignaciones: Vec<String> = Vec::new();
    let mut valores: Vec<Value> = Vec::new();

    let textos = [
        ("nombre", &cambios.nombre),
        ("nit", &cambios.nit),
        ("contacto", &cambios.contacto),
        ("telefono", &cambios.telefono),
        ("email", &cambios.email),
        ("ciudad", &cambios.ciudad),
        ("direccion", &cambios.direccion),
        ("observacion", &cambios.observacion),
    ];
    for (columna, valor) in textos {
        if let Some(texto) = valor {
            asignaciones.push(format!("{columna} = ?"));
            valores.push(Value::from(texto.as_str()));
        }
    }

    match (cambios.contactado, &cambios.fecha_contacto) {
        (Some(true), fecha) => {
            asignaciones.push("contactado = ?".into());
            valores.push(Value::from(true));
            if let Some(texto) = fecha {
                asignaciones.push("fecha_contacto = ?".into());
                valores.push(Value::from(normalizar_fecha(texto)));
            }
        }
        (Some(false), _) => {
            // un cliente sin contactar no conserva fecha de contacto
            asignaciones.push("contactado = ?".into());
            valores.push(Value::from(false));
            asignaciones.push("fecha_contacto = NULL".into());
        }
        (None, Some(texto)) => {
            // la fecha sola depende del estado ya guardado en la fila
            asignaciones
                .push("fecha_contacto = IF(COALESCE(contactado, FALSE), ?, NULL)".into());
            valores.push(Value::from(normalizar_fecha(texto)));
        }
        (None, None) => {}
    }

    if asignaciones.is_empty() {
        return None;
    }
    let sql = format!(
        "UPDATE clientes SET {} WHERE id = ? LIMIT 1",
        asignaciones.join(", ")
    );
    Some((sql, valores))
}
