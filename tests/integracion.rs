//! Pruebas contra un MySQL real, nombrado por DB_HOST/DB_PORT/DB_NAME/
//! DB_USER/DB_PASS. Corren con `cargo test -- --ignored` apuntando a una
//! base de pruebas desechable; comparten servidor, por eso van en serie.

use chrono::NaiveDate;
use mylocaldata::database::{clientes, contactos, preferencias, visitas};
use mylocaldata::{
    CambiosCliente, Canal, Cliente, Config, Database, DetalleCliente, Error, FiltroClientes,
    NuevoCliente, Sesion, BASE_COMPARTIDA,
};
use serial_test::serial;

fn abrir() -> Database {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let config = Config::desde_entorno().expect("faltan variables DB_*");
    let db = Database::conectar(&config).expect("sin conexión al MySQL de pruebas");
    db.crear_tablas().expect("no se pudo preparar el esquema");
    db
}

fn admin() -> Sesion {
    Sesion::nueva("admin", "Administración", true)
}

// la base es compartida entre corridas; cada prueba usa cuentas propias
fn usuario_unico(prefijo: &str) -> String {
    let marca = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("reloj antes de 1970")
        .as_nanos();
    format!("{prefijo}_{marca}")
}

fn cliente_de(propietario: &str) -> NuevoCliente {
    NuevoCliente {
        nombre: format!("Cliente de {propietario}"),
        nit: "900123456-7".into(),
        contacto: "María Rojas".into(),
        telefono: "3001234567".into(),
        email: format!("{propietario}@ejemplo.co"),
        ciudad: "Bogotá".into(),
        direccion: "Cra 7 # 12-34".into(),
        observacion: "llegó por referido".into(),
        propietario: propietario.into(),
        ..NuevoCliente::default()
    }
}

fn fecha(anio: i32, mes: u32, dia: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(anio, mes, dia).unwrap()
}

fn buscar(db: &Database, id: i64) -> Option<Cliente> {
    clientes::obtener_clientes(db, &FiltroClientes::default(), &admin())
        .into_iter()
        .find(|cliente| cliente.id == id)
}

#[test]
#[serial]
#[ignore = "necesita un MySQL de pruebas en DB_HOST/DB_PORT/DB_NAME/DB_USER/DB_PASS"]
fn crear_tablas_es_idempotente_y_no_toca_datos() {
    let db = abrir();
    db.crear_tablas().unwrap();
    db.crear_tablas().unwrap();

    let dueno = usuario_unico("esquema");
    let id = clientes::agregar_cliente(&db, &cliente_de(&dueno)).unwrap();
    db.crear_tablas().unwrap();
    assert!(buscar(&db, id).is_some());

    clientes::eliminar_cliente(&db, id).unwrap();
}

#[test]
#[serial]
#[ignore = "necesita un MySQL de pruebas en DB_HOST/DB_PORT/DB_NAME/DB_USER/DB_PASS"]
fn el_alta_normaliza_contacto_y_base() {
    let db = abrir();
    let dueno = usuario_unico("alta");

    let mut sin_contactar = cliente_de(&dueno);
    sin_contactar.contactado = false;
    sin_contactar.fecha_contacto = Some("2024-03-01".into());
    sin_contactar.base = Some("Prospectos".into());
    let id_uno = clientes::agregar_cliente(&db, &sin_contactar).unwrap();

    let fila = buscar(&db, id_uno).unwrap();
    assert!(!fila.contactado);
    assert_eq!(fila.fecha_contacto, None);
    assert_eq!(fila.base, format!("{dueno}__Prospectos"));
    assert_eq!(fila.propietario, dueno);

    let mut fecha_rota = cliente_de(&dueno);
    fecha_rota.contactado = true;
    fecha_rota.fecha_contacto = Some("por confirmar".into());
    let id_dos = clientes::agregar_cliente(&db, &fecha_rota).unwrap();

    let fila = buscar(&db, id_dos).unwrap();
    assert!(fila.contactado);
    assert_eq!(fila.fecha_contacto, None);
    assert_eq!(fila.base, BASE_COMPARTIDA);

    clientes::eliminar_cliente(&db, id_uno).unwrap();
    clientes::eliminar_cliente(&db, id_dos).unwrap();
}

#[test]
#[serial]
#[ignore = "necesita un MySQL de pruebas en DB_HOST/DB_PORT/DB_NAME/DB_USER/DB_PASS"]
fn el_alta_sin_propietario_no_pasa() {
    let db = abrir();
    let mut nuevo = cliente_de("cualquiera");
    nuevo.propietario = "   ".into();

    let error = clientes::agregar_cliente(&db, &nuevo).unwrap_err();
    assert!(matches!(error, Error::Validacion(_)));
}

#[test]
#[serial]
#[ignore = "necesita un MySQL de pruebas en DB_HOST/DB_PORT/DB_NAME/DB_USER/DB_PASS"]
fn la_ronda_completa_respeta_el_nombre_guardado() {
    let db = abrir();
    let alicia = usuario_unico("alicia");

    preferencias::guardar_nombre_base(&db, &alicia, "MiBase").unwrap();
    assert_eq!(
        preferencias::obtener_nombre_base(&db, &alicia)
            .unwrap()
            .as_deref(),
        Some("MiBase")
    );

    let mut nuevo = cliente_de(&alicia);
    nuevo.base = Some("MiBase".into());
    let id = clientes::agregar_cliente(&db, &nuevo).unwrap();

    // sin pedir base, alicia cae en su base privada resuelta
    let sesion = Sesion::nueva(&alicia, "Alicia", false);
    let vista = clientes::obtener_clientes(&db, &FiltroClientes::default(), &sesion);
    assert_eq!(vista.len(), 1);
    assert_eq!(vista[0].id, id);
    assert_eq!(vista[0].base, format!("{alicia}__MiBase"));

    clientes::eliminar_cliente(&db, id).unwrap();
}

#[test]
#[serial]
#[ignore = "necesita un MySQL de pruebas en DB_HOST/DB_PORT/DB_NAME/DB_USER/DB_PASS"]
fn la_preferencia_se_reemplaza_al_volver_a_guardar() {
    let db = abrir();
    let dueno = usuario_unico("pref");

    assert_eq!(preferencias::obtener_nombre_base(&db, &dueno).unwrap(), None);
    preferencias::guardar_nombre_base(&db, &dueno, "Cartera").unwrap();
    preferencias::guardar_nombre_base(&db, &dueno, "Clientes2024").unwrap();
    assert_eq!(
        preferencias::obtener_nombre_base(&db, &dueno)
            .unwrap()
            .as_deref(),
        Some("Clientes2024")
    );
}

#[test]
#[serial]
#[ignore = "necesita un MySQL de pruebas en DB_HOST/DB_PORT/DB_NAME/DB_USER/DB_PASS"]
fn un_usuario_comun_no_escapa_de_su_base() {
    let db = abrir();
    let bruno = usuario_unico("bruno");
    let alicia = usuario_unico("alicia");

    let mut reservado = cliente_de(&bruno);
    reservado.base = Some("Reservada".into());
    let id_bruno = clientes::agregar_cliente(&db, &reservado).unwrap();
    let clave_de_bruno = format!("{bruno}__Reservada");

    // pedir la base ajena por el filtro no la alcanza
    let filtro = FiltroClientes {
        base: Some(clave_de_bruno.clone()),
        ..FiltroClientes::default()
    };
    let sesion = Sesion::nueva(&alicia, "Alicia", false);
    let vista = clientes::obtener_clientes(&db, &filtro, &sesion);
    assert!(vista.iter().all(|cliente| cliente.propietario != bruno));

    // ni tampoco por la base seleccionada en la sesión
    let con_base_ajena = Sesion::nueva(&alicia, "Alicia", false).con_base(clave_de_bruno.clone());
    let vista = clientes::obtener_clientes(&db, &FiltroClientes::default(), &con_base_ajena);
    assert!(vista.iter().all(|cliente| cliente.propietario != bruno));

    // el administrador sí entra a cualquier base por su clave exacta
    let filtro = FiltroClientes {
        base: Some(clave_de_bruno),
        ..FiltroClientes::default()
    };
    let vista = clientes::obtener_clientes(&db, &filtro, &admin());
    assert!(vista.iter().any(|cliente| cliente.id == id_bruno));

    clientes::eliminar_cliente(&db, id_bruno).unwrap();
}

#[test]
#[serial]
#[ignore = "necesita un MySQL de pruebas en DB_HOST/DB_PORT/DB_NAME/DB_USER/DB_PASS"]
fn la_base_compartida_es_visible_para_todos() {
    let db = abrir();
    let dueno = usuario_unico("comun");
    let id = clientes::agregar_cliente(&db, &cliente_de(&dueno)).unwrap();

    let visitante = Sesion::nueva(usuario_unico("visitante"), "Visitante", false)
        .con_base(BASE_COMPARTIDA);
    let vista = clientes::obtener_clientes(&db, &FiltroClientes::default(), &visitante);
    assert!(vista.iter().any(|cliente| cliente.id == id));
    assert!(vista.iter().all(|cliente| cliente.base == BASE_COMPARTIDA));

    clientes::eliminar_cliente(&db, id).unwrap();
}

#[test]
#[serial]
#[ignore = "necesita un MySQL de pruebas en DB_HOST/DB_PORT/DB_NAME/DB_USER/DB_PASS"]
fn el_filtro_de_contactado_se_respeta() {
    let db = abrir();
    let dueno = usuario_unico("filtros");

    let id_frio = clientes::agregar_cliente(&db, &cliente_de(&dueno)).unwrap();
    let mut contactado = cliente_de(&dueno);
    contactado.contactado = true;
    contactado.fecha_contacto = Some("2024-02-10".into());
    let id_tibio = clientes::agregar_cliente(&db, &contactado).unwrap();

    let filtro = FiltroClientes {
        contactado: Some(true),
        ..FiltroClientes::default()
    };
    let vista = clientes::obtener_clientes(&db, &filtro, &admin());
    assert!(vista.iter().any(|cliente| cliente.id == id_tibio));
    assert!(vista.iter().all(|cliente| cliente.contactado));
    assert!(vista.iter().all(|cliente| cliente.id != id_frio));

    clientes::eliminar_cliente(&db, id_frio).unwrap();
    clientes::eliminar_cliente(&db, id_tibio).unwrap();
}

#[test]
#[serial]
#[ignore = "necesita un MySQL de pruebas en DB_HOST/DB_PORT/DB_NAME/DB_USER/DB_PASS"]
fn el_detalle_solo_toca_su_fila() {
    let db = abrir();
    let dueno = usuario_unico("detalle");
    let id_editado = clientes::agregar_cliente(&db, &cliente_de(&dueno)).unwrap();
    let id_testigo = clientes::agregar_cliente(&db, &cliente_de(&dueno)).unwrap();

    let detalle = DetalleCliente {
        tipo_operacion: "Importación".into(),
        modalidad: "Marítima".into(),
        origen: "Shanghái".into(),
        destino: "Buenaventura".into(),
        mercancia: "Repuestos industriales".into(),
    };
    let cambiadas = clientes::actualizar_cliente_detalle(&db, id_editado, &detalle).unwrap();
    assert_eq!(cambiadas, 1);

    let editado = buscar(&db, id_editado).unwrap();
    assert_eq!(editado.tipo_operacion, "Importación");
    assert_eq!(editado.destino, "Buenaventura");

    let testigo = buscar(&db, id_testigo).unwrap();
    assert_eq!(testigo.tipo_operacion, "");
    assert_eq!(testigo.mercancia, "");

    // un id inexistente no cambia nada y se nota en el conteo
    assert_eq!(
        clientes::actualizar_cliente_detalle(&db, -1, &detalle).unwrap(),
        0
    );

    clientes::eliminar_cliente(&db, id_editado).unwrap();
    clientes::eliminar_cliente(&db, id_testigo).unwrap();
}

#[test]
#[serial]
#[ignore = "necesita un MySQL de pruebas en DB_HOST/DB_PORT/DB_NAME/DB_USER/DB_PASS"]
fn el_parche_disperso_deja_el_resto_intacto() {
    let db = abrir();
    let dueno = usuario_unico("parche");
    let id = clientes::agregar_cliente(&db, &cliente_de(&dueno)).unwrap();
    let antes = buscar(&db, id).unwrap();

    let cambios = CambiosCliente {
        contactado: Some(true),
        fecha_contacto: Some("2024-03-01".into()),
        ..CambiosCliente::default()
    };
    let cambiadas = clientes::actualizar_cliente_campos(&db, id, &cambios).unwrap();
    assert_eq!(cambiadas, 1);

    let despues = buscar(&db, id).unwrap();
    assert!(despues.contactado);
    assert_eq!(despues.fecha_contacto, Some(fecha(2024, 3, 1)));
    assert_eq!(despues.nombre, antes.nombre);
    assert_eq!(despues.telefono, antes.telefono);
    assert_eq!(despues.base, antes.base);
    assert_eq!(despues.observacion, antes.observacion);

    // el parche vacío ni siquiera va a la base
    let cambiadas = clientes::actualizar_cliente_campos(&db, id, &CambiosCliente::default()).unwrap();
    assert_eq!(cambiadas, 0);

    // descontactar limpia la fecha recién puesta
    let cambios = CambiosCliente {
        contactado: Some(false),
        ..CambiosCliente::default()
    };
    clientes::actualizar_cliente_campos(&db, id, &cambios).unwrap();
    let limpio = buscar(&db, id).unwrap();
    assert!(!limpio.contactado);
    assert_eq!(limpio.fecha_contacto, None);

    clientes::eliminar_cliente(&db, id).unwrap();
}

#[test]
#[serial]
#[ignore = "necesita un MySQL de pruebas en DB_HOST/DB_PORT/DB_NAME/DB_USER/DB_PASS"]
fn la_bitacora_guarda_y_ordena_los_contactos() {
    let db = abrir();
    let dueno = usuario_unico("bitacora");
    let id = clientes::agregar_cliente(&db, &cliente_de(&dueno)).unwrap();

    contactos::registrar_contacto(&db, id, fecha(2024, 1, 1), Canal::Llamada, "dejó mensaje de voz")
        .unwrap();
    let lista = contactos::obtener_contactos(&db, id);
    assert_eq!(lista.len(), 1);
    assert_eq!(lista[0].canal, Canal::Llamada);
    assert_eq!(lista[0].notas, "dejó mensaje de voz");

    contactos::registrar_contacto(&db, id, fecha(2024, 2, 15), Canal::Correo, "").unwrap();
    let lista = contactos::obtener_contactos(&db, id);
    assert_eq!(lista.len(), 2);
    // la más reciente primero
    assert_eq!(lista[0].fecha, fecha(2024, 2, 15));
    assert_eq!(lista[0].canal, Canal::Correo);
    assert_eq!(lista[0].notas, "");

    clientes::eliminar_cliente(&db, id).unwrap();
}

#[test]
#[serial]
#[ignore = "necesita un MySQL de pruebas en DB_HOST/DB_PORT/DB_NAME/DB_USER/DB_PASS"]
fn las_visitas_llevan_autor_y_marca_del_servidor() {
    let db = abrir();
    let dueno = usuario_unico("visitas");
    let id = clientes::agregar_cliente(&db, &cliente_de(&dueno)).unwrap();

    visitas::agendar_visita(&db, id, fecha(2024, 5, 10), Canal::Presencial, &dueno).unwrap();
    visitas::agendar_visita(&db, id, fecha(2024, 6, 1), Canal::Llamada, &dueno).unwrap();

    let lista = visitas::obtener_visitas(&db, id);
    assert_eq!(lista.len(), 2);
    assert_eq!(lista[0].fecha, fecha(2024, 6, 1));
    assert_eq!(lista[1].fecha, fecha(2024, 5, 10));
    assert_eq!(lista[0].creado_por, dueno);
    // creado_en lo asignó el servidor al insertar, no el cliente
    assert!(lista[0].creado_en >= lista[1].creado_en);

    clientes::eliminar_cliente(&db, id).unwrap();
}

#[test]
#[serial]
#[ignore = "necesita un MySQL de pruebas en DB_HOST/DB_PORT/DB_NAME/DB_USER/DB_PASS"]
fn borrar_un_cliente_arrastra_contactos_y_visitas() {
    let db = abrir();
    let dueno = usuario_unico("cascada");
    let id = clientes::agregar_cliente(&db, &cliente_de(&dueno)).unwrap();
    contactos::registrar_contacto(&db, id, fecha(2024, 1, 1), Canal::Correo, "cotización enviada")
        .unwrap();
    visitas::agendar_visita(&db, id, fecha(2024, 1, 20), Canal::Presencial, &dueno).unwrap();

    assert_eq!(clientes::eliminar_cliente(&db, id).unwrap(), 1);
    assert!(buscar(&db, id).is_none());
    assert!(contactos::obtener_contactos(&db, id).is_empty());
    assert!(visitas::obtener_visitas(&db, id).is_empty());

    // borrar lo ya borrado se nota en el conteo
    assert_eq!(clientes::eliminar_cliente(&db, id).unwrap(), 0);
}
