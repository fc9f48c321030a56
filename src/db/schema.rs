//! Hospital schema
//!
//! DDL for the four tables the dashboard reads. The dashboard never runs
//! this; it exists for the demo seeding utility and for tests.

use rusqlite::{params, Connection};

use super::connection::DbResult;

/// Create the hospital tables if they don't exist
pub fn create_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS doctores (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre TEXT NOT NULL,
            especialidad TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS pacientes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre TEXT NOT NULL,
            fecha_nacimiento TEXT              -- ISO date: "1980-04-12"
        );

        CREATE TABLE IF NOT EXISTS citas (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            fecha TEXT NOT NULL,               -- ISO date: "2024-01-01"
            hora TEXT NOT NULL,                -- "09:30" or "09:30:00"
            estado TEXT NOT NULL,
            doctor_id INTEGER REFERENCES doctores(id),
            paciente_id INTEGER REFERENCES pacientes(id)
        );

        CREATE INDEX IF NOT EXISTS idx_citas_fecha ON citas(fecha);
        CREATE INDEX IF NOT EXISTS idx_citas_doctor ON citas(doctor_id);
        CREATE INDEX IF NOT EXISTS idx_citas_paciente ON citas(paciente_id);

        CREATE TABLE IF NOT EXISTS servicios (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre TEXT NOT NULL,
            tipo TEXT NOT NULL,
            costo REAL NOT NULL DEFAULT 0
        );
        "#,
    )?;
    Ok(())
}

/// Insert a small demonstration data set
///
/// Returns the number of appointments inserted.
pub fn insert_demo_data(conn: &Connection) -> DbResult<usize> {
    let doctors = [
        ("Dra. Ana Torres", "Cardiología"),
        ("Dr. Luis Gómez", "Pediatría"),
        ("Dra. Carmen Ruiz", "Dermatología"),
        ("Dr. Jorge Salas", "Cardiología"),
        ("Dra. Elena Vidal", "Neurología"),
        ("Dr. Pablo Mena", "Traumatología"),
    ];
    for (nombre, especialidad) in doctors {
        conn.execute(
            "INSERT INTO doctores (nombre, especialidad) VALUES (?1, ?2)",
            params![nombre, especialidad],
        )?;
    }

    let patients = [
        ("María López", "1985-03-14"),
        ("Juan Pérez", "1972-11-02"),
        ("Lucía Fernández", "1990-07-21"),
        ("Carlos Díaz", "1985-01-30"),
        ("Sofía Romero", "2001-05-09"),
        ("Diego Herrera", "1968-09-17"),
        ("Valentina Castro", "1990-12-25"),
        ("Andrés Molina", "1979-06-03"),
    ];
    for (nombre, nacimiento) in patients {
        conn.execute(
            "INSERT INTO pacientes (nombre, fecha_nacimiento) VALUES (?1, ?2)",
            params![nombre, nacimiento],
        )?;
    }

    // (fecha, hora, estado, doctor_id, paciente_id)
    let appointments = [
        ("2024-01-08", "08:30", "Completada", 1, 1),
        ("2024-01-08", "09:00", "Completada", 2, 2),
        ("2024-01-08", "10:15", "Cancelada", 1, 3),
        ("2024-01-09", "08:45", "Completada", 3, 4),
        ("2024-01-09", "11:30", "Pendiente", 4, 1),
        ("2024-01-10", "09:30", "Completada", 1, 5),
        ("2024-01-10", "12:00", "Completada", 2, 6),
        ("2024-01-10", "15:45", "Cancelada", 5, 2),
        ("2024-01-11", "10:00", "Pendiente", 1, 1),
        ("2024-01-11", "16:30", "Completada", 4, 3),
        ("2024-01-12", "09:15", "Completada", 2, 4),
        ("2024-01-12", "17:00", "Pendiente", 3, 6),
    ];
    for (fecha, hora, estado, doctor_id, paciente_id) in appointments {
        conn.execute(
            "INSERT INTO citas (fecha, hora, estado, doctor_id, paciente_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![fecha, hora, estado, doctor_id, paciente_id],
        )?;
    }

    let services = [
        ("Consulta general", "Consulta", 35.0),
        ("Consulta especialista", "Consulta", 60.0),
        ("Electrocardiograma", "Diagnóstico", 80.0),
        ("Resonancia magnética", "Diagnóstico", 420.0),
        ("Radiografía", "Diagnóstico", 55.0),
        ("Análisis de sangre", "Laboratorio", 25.0),
        ("Perfil lipídico", "Laboratorio", 30.0),
        ("Fisioterapia", "Tratamiento", 45.0),
        ("Cirugía menor", "Tratamiento", 650.0),
        ("Vacunación", "Prevención", 20.0),
        ("Ecografía", "Diagnóstico", 95.0),
        ("Holter 24h", "Diagnóstico", 120.0),
    ];
    for (nombre, tipo, costo) in services {
        conn.execute(
            "INSERT INTO servicios (nombre, tipo, costo) VALUES (?1, ?2, ?3)",
            params![nombre, tipo, costo],
        )?;
    }

    Ok(appointments.len())
}
