// ==========================================
// MedEquip OMS - operator CLI
// ==========================================
// Prints the prioritized active work-order queue (decision-support view).
// The HTTP transport in front of the API layer is a separate deployment;
// this binary talks to the same database directly.
// ==========================================

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use medequip_oms::api::{ListActiveOrdersQuery, OrderApi};
use medequip_oms::config::{default_db_path, ConfigManager};
use medequip_oms::db::{
    ensure_core_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION,
};
use medequip_oms::engine::{AuditTrail, SqliteActivityRecorder};
use medequip_oms::repository::{
    ActivityLogRepository, StatusHistoryRepository, WorkOrderRepository,
};
use medequip_oms::{i18n, logging};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    i18n::set_locale("es");

    let db_path = match std::env::args().nth(1) {
        Some(path) => std::path::PathBuf::from(path),
        None => default_db_path(),
    };

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create data dir {}", parent.display()))?;
    }

    let db_path_str = db_path.to_string_lossy().to_string();
    let conn = open_sqlite_connection(&db_path_str)
        .with_context(|| format!("cannot open database {}", db_path_str))?;
    ensure_core_schema(&conn)?;

    match read_schema_version(&conn)? {
        Some(v) if v != CURRENT_SCHEMA_VERSION => {
            tracing::warn!(
                "schema version mismatch: database={}, expected={}",
                v,
                CURRENT_SCHEMA_VERSION
            );
        }
        _ => {}
    }

    let conn = Arc::new(Mutex::new(conn));
    let order_repo = Arc::new(WorkOrderRepository::new(conn.clone()));
    let history_repo = Arc::new(StatusHistoryRepository::new(conn.clone()));
    let activity_repo = Arc::new(ActivityLogRepository::new(conn.clone()));
    let config_manager = Arc::new(
        ConfigManager::from_connection(conn.clone())
            .map_err(|e| anyhow::anyhow!("config manager init failed: {}", e))?,
    );
    let audit = AuditTrail::with_recorder(Arc::new(SqliteActivityRecorder::new(activity_repo)));

    let api = OrderApi::new(order_repo, history_repo, config_manager, audit);

    let response = api
        .list_active_orders(ListActiveOrdersQuery::default())
        .await
        .map_err(|e| anyhow::anyhow!("listing failed: {}", e))?;

    println!("{} ({})", i18n::t("cli.queue_header"), response.pagination.total);
    if response.data.is_empty() {
        println!("{}", i18n::t("cli.empty_queue"));
        return Ok(());
    }

    println!(
        "{:>6}  {:>6}  {:<12}  {:<9}  {:<10}  {:<22}  {}",
        "orden", "score", "estado", "prioridad", "vence", "cliente", "equipo"
    );
    for view in &response.data {
        println!(
            "{:>6}  {:>6}  {:<12}  {:<9}  {:<10}  {:<22}  {}",
            view.order_id,
            view.score,
            view.status.to_string(),
            view.manual_priority.to_string(),
            view.due_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            view.client_name,
            view.equipment_name,
        );
    }

    Ok(())
}
