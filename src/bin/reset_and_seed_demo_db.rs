// ==========================================
// MedEquip OMS - demo database reset & seed
// ==========================================
// Deletes the database file and rebuilds a small realistic scenario:
// clients, modalities, equipment and work orders in assorted states,
// exercised through the repositories and the guards so history and
// activity rows look like real traffic.
// ==========================================

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Duration;
use medequip_oms::config::default_db_path;
use medequip_oms::db::{ensure_core_schema, open_sqlite_connection};
use medequip_oms::domain::activity_log::ActivityLogEntry;
use medequip_oms::domain::types::{ManualPriority, OperationKind, OrderStatus};
use medequip_oms::domain::work_order::WorkOrder;
use medequip_oms::engine::{
    AuditTrail, PostponementGuard, SqliteActivityRecorder, StateTransitionGuard,
};
use medequip_oms::logging;
use medequip_oms::repository::{
    ActivityLogRepository, EquipmentRepository, WorkOrderRepository,
};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let db_path = match std::env::args().nth(1) {
        Some(path) => std::path::PathBuf::from(path),
        None => default_db_path(),
    };

    if db_path.exists() {
        std::fs::remove_file(&db_path)
            .with_context(|| format!("cannot remove {}", db_path.display()))?;
        tracing::info!("removed existing database {}", db_path.display());
    }
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_path_str = db_path.to_string_lossy().to_string();
    let conn = open_sqlite_connection(&db_path_str)?;
    ensure_core_schema(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    let equipment_repo = EquipmentRepository::new(conn.clone());
    let order_repo = Arc::new(WorkOrderRepository::new(conn.clone()));
    let activity_repo = Arc::new(ActivityLogRepository::new(conn.clone()));
    let audit = AuditTrail::with_recorder(Arc::new(SqliteActivityRecorder::new(activity_repo)));

    // ===== reference data =====
    let hospital = equipment_repo.insert_client("Hospital Central del Norte", Some("ing. biomédica"))?;
    let clinica = equipment_repo.insert_client("Clínica Santa Rosa", None)?;

    let tomografia = equipment_repo.insert_modality("Tomografía", true)?;
    let resonancia = equipment_repo.insert_modality("Resonancia Magnética", true)?;
    let rayos_x = equipment_repo.insert_modality("Rayos X", false)?;
    let ultrasonido = equipment_repo.insert_modality("Ultrasonido", false)?;

    let ct_scanner = equipment_repo.insert_equipment(
        hospital,
        tomografia,
        "Tomógrafo Aquilion 64",
        Some("AQ64-2291"),
        Some("Imagenología, piso 2"),
    )?;
    let mri = equipment_repo.insert_equipment(
        hospital,
        resonancia,
        "Resonador Magnetom 1.5T",
        Some("MG15-0077"),
        Some("Imagenología, piso 1"),
    )?;
    let xray = equipment_repo.insert_equipment(
        clinica,
        rayos_x,
        "Rayos X portátil Mobilett",
        Some("MB-4410"),
        None,
    )?;
    let ultrasound = equipment_repo.insert_equipment(
        clinica,
        ultrasonido,
        "Ecógrafo Voluson P8",
        Some("VP8-1802"),
        Some("Consulta externa"),
    )?;

    // ===== work orders =====
    let today = chrono::Local::now().date_naive();

    let mut seeded = Vec::new();
    let overdue = order_repo.create(
        &WorkOrder::new(ct_scanner, hospital)
            .with_priority(ManualPriority::Critical)
            .with_due_date(today - Duration::days(2))
            .with_reported_fault("no inicia la adquisición de imágenes")
            .with_origin("telefónico"),
    )?;
    seeded.push(overdue);

    let due_soon = order_repo.create(
        &WorkOrder::new(mri, hospital)
            .with_priority(ManualPriority::High)
            .with_due_date(today + Duration::days(1))
            .with_reported_fault("ruido anómalo del compresor de helio")
            .with_origin("portal"),
    )?;
    seeded.push(due_soon);

    let routine = order_repo.create(
        &WorkOrder::new(xray, clinica)
            .with_due_date(today + Duration::days(20))
            .with_reported_fault("mantenimiento preventivo semestral")
            .with_origin("contrato"),
    )?;
    seeded.push(routine);

    let no_due_date = order_repo.create(
        &WorkOrder::new(ultrasound, clinica)
            .with_priority(ManualPriority::Low)
            .with_reported_fault("imagen con artefactos intermitentes")
            .with_origin("correo"),
    )?;
    seeded.push(no_due_date);

    for order_id in &seeded {
        audit
            .record(
                ActivityLogEntry::new(
                    OperationKind::Create,
                    "work_order",
                    &order_id.to_string(),
                    "Alta de orden de trabajo",
                    "seed",
                )
                .with_description("carga de escenario de demostración"),
            )
            .await;
    }

    // ===== guarded traffic =====
    let transition_guard = StateTransitionGuard::new(order_repo.clone(), audit.clone());
    let postponement_guard = PostponementGuard::new(order_repo.clone(), audit.clone());

    transition_guard
        .change_status(
            due_soon,
            OrderStatus::InProgress,
            "técnico en sitio, diagnóstico iniciado",
            "jlopez",
            None,
        )
        .await
        .map_err(|e| anyhow::anyhow!("seed transition failed: {}", e))?;

    postponement_guard
        .postpone_due_date(
            routine,
            today + Duration::days(30),
            "el cliente reprogramó la ventana de mantenimiento",
            "mgarcia",
            None,
        )
        .await
        .map_err(|e| anyhow::anyhow!("seed postponement failed: {}", e))?;

    transition_guard
        .change_status(
            no_due_date,
            OrderStatus::Cancelled,
            "equipo dado de baja por el cliente",
            "mgarcia",
            None,
        )
        .await
        .map_err(|e| anyhow::anyhow!("seed cancellation failed: {}", e))?;

    tracing::info!(
        "seeded {} work orders into {}",
        seeded.len(),
        db_path.display()
    );
    println!("Base de demostración lista: {}", db_path.display());

    Ok(())
}
