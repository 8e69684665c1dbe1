use chrono::{DateTime, NaiveDate, NaiveDateTime};
use mysql_common::prelude::FromRow;
use serde::{Deserialize, Serialize};

/// Base común visible para todos los usuarios.
pub const BASE_COMPARTIDA: &str = "SHARED";
/// Separa usuario y etiqueta dentro de una clave de base privada.
pub const SEPARADOR_BASE: &str = "__";

/// Medio por el que se habló con el cliente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Canal {
    Presencial,
    Llamada,
    Correo,
}

impl Canal {
    /// Valor que se guarda en la columna `canal`.
    pub fn como_str(&self) -> &'static str {
        match self {
            Canal::Presencial => "presencial",
            Canal::Llamada => "llamada",
            Canal::Correo => "correo",
        }
    }
}

impl std::fmt::Display for Canal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.como_str())
    }
}

impl std::str::FromStr for Canal {
    type Err = crate::error::Error;

    fn from_str(texto: &str) -> Result<Self, Self::Err> {
        match texto.trim().to_ascii_lowercase().as_str() {
            "presencial" | "in-person" => Ok(Canal::Presencial),
            "llamada" | "call" => Ok(Canal::Llamada),
            "correo" | "email" => Ok(Canal::Correo),
            otro => Err(crate::error::Error::validacion(format!(
                "canal desconocido: {otro}"
            ))),
        }
    }
}

// La columna solo contiene los valores de como_str(); cualquier otra
// cosa es un retoque manual y se lee como presencial.
impl From<String> for Canal {
    fn from(valor: String) -> Self {
        valor.parse().unwrap_or(Canal::Presencial)
    }
}

impl mysql::prelude::FromValue for Canal {
    type Intermediate = String;
}

/// Fila completa de la tabla `clientes`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cliente {
    pub id: i64,
    pub nombre: String,
    pub nit: String,
    pub contacto: String,
    pub telefono: String,
    pub email: String,
    pub ciudad: String,
    pub direccion: String,
    pub fecha_contacto: Option<NaiveDate>,
    pub observacion: String,
    pub contactado: bool,
    pub tipo_operacion: String,
    pub modalidad: String,
    pub origen: String,
    pub destino: String,
    pub mercancia: String,
    pub propietario: String,
    pub base: String,
}

/// Datos del formulario de registro. La fecha llega como texto libre y
/// se normaliza al guardar; el detalle operativo se completa después.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NuevoCliente {
    pub nombre: String,
    pub nit: String,
    pub contacto: String,
    pub telefono: String,
    pub email: String,
    pub ciudad: String,
    pub direccion: String,
    pub fecha_contacto: Option<String>,
    pub observacion: String,
    pub contactado: bool,
    pub propietario: String,
    pub base: Option<String>,
}

/// Parche disperso sobre un cliente: solo se escriben los campos en Some.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CambiosCliente {
    pub nombre: Option<String>,
    pub nit: Option<String>,
    pub contacto: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub ciudad: Option<String>,
    pub direccion: Option<String>,
    pub observacion: Option<String>,
    pub contactado: Option<bool>,
    pub fecha_contacto: Option<String>,
}

/// Los cinco campos operativos que edita la pantalla de detalle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetalleCliente {
    pub tipo_operacion: String,
    pub modalidad: String,
    pub origen: String,
    pub destino: String,
    pub mercancia: String,
}

/// Interacción registrada en la bitácora de un cliente.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Contacto {
    pub id: i64,
    pub cliente_id: i64,
    pub fecha: NaiveDate,
    pub canal: Canal,
    pub notas: String,
}

/// Visita agendada; `creado_en` lo asigna el servidor al insertar.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Visita {
    pub id: i64,
    pub cliente_id: i64,
    pub fecha: NaiveDate,
    pub canal: Canal,
    pub creado_por: String,
    pub creado_en: NaiveDateTime,
}

/// Criterios del listado de clientes. El alcance real de la consulta
/// sale de combinarlos con la sesión; ver database::clientes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FiltroClientes {
    pub contactado: Option<bool>,
    pub base: Option<String>,
}

const FORMATOS_FECHA_HORA: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Reduce un texto de fecha a fecha de calendario.
///
/// Acepta `YYYY-MM-DD`, `DD/MM/YYYY`, fecha-hora ISO con `T` o espacio
/// y RFC 3339. Lo que no se entienda queda en None; un dato de contacto
/// ilegible no debe tumbar el alta completa.
pub fn normalizar_fecha(texto: &str) -> Option<NaiveDate> {
    let texto = texto.trim();
    if texto.is_empty() {
        return None;
    }
    if let Ok(fecha) = NaiveDate::parse_from_str(texto, "%Y-%m-%d") {
        return Some(fecha);
    }
    if let Ok(fecha) = NaiveDate::parse_from_str(texto, "%d/%m/%Y") {
        return Some(fecha);
    }
    for formato in FORMATOS_FECHA_HORA {
        if let Ok(fecha_hora) = NaiveDateTime::parse_from_str(texto, formato) {
            return Some(fecha_hora.date());
        }
    }
    if let Ok(con_zona) = DateTime::parse_from_rfc3339(texto) {
        return Some(con_zona.date_naive());
    }
    None
}

/// Clave de base bajo la que queda un cliente nuevo.
///
/// Vacío u omitido cae en la base compartida. Una etiqueta sin el
/// separador es el nombre visible de una base privada y se expande a
/// `{propietario}__{etiqueta}`; si ya trae el separador viene calificada
/// y se respeta tal cual.
pub fn normalizar_base(propietario: &str, base: Option<&str>) -> String {
    match base.map(str::trim) {
        None | Some("") => BASE_COMPARTIDA.to_string(),
        Some(BASE_COMPARTIDA) => BASE_COMPARTIDA.to_string(),
        Some(etiqueta) if etiqueta.contains(SEPARADOR_BASE) => etiqueta.to_string(),
        Some(etiqueta) => format!("{propietario}{SEPARADOR_BASE}{etiqueta}"),
    }
}

/// Clave interna de la base privada de un usuario.
///
/// `nombre_guardado` es la preferencia guardada en `preferencias`; sin
/// ella la etiqueta por defecto es `{usuario}_PRIVADA`.
pub fn clave_privada(usuario: &str, nombre_guardado: Option<&str>) -> String {
    match nombre_guardado.map(str::trim) {
        Some(nombre) if !nombre.is_empty() => {
            format!("{usuario}{SEPARADOR_BASE}{nombre}")
        }
        _ => format!("{usuario}{SEPARADOR_BASE}{usuario}_PRIVADA"),
    }
}
