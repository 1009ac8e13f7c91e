// ==========================================
// Integration test helpers
// ==========================================
// One temp-file SQLite database per test, with the repositories, guards
// and API wired the way the binaries wire them.
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tempfile::NamedTempFile;

use medequip_oms::api::OrderApi;
use medequip_oms::config::ConfigManager;
use medequip_oms::db::{ensure_core_schema, open_sqlite_connection};
use medequip_oms::domain::work_order::WorkOrder;
use medequip_oms::engine::{
    AuditTrail, PostponementGuard, SqliteActivityRecorder, StateTransitionGuard,
};
use medequip_oms::repository::{
    ActivityLogRepository, EquipmentRepository, StatusHistoryRepository, WorkOrderRepository,
};

// ==========================================
// Test environment
// ==========================================

/// Shared wiring for integration tests
pub struct TestEnv {
    pub conn: Arc<Mutex<Connection>>,
    pub order_repo: Arc<WorkOrderRepository>,
    pub history_repo: Arc<StatusHistoryRepository>,
    pub activity_repo: Arc<ActivityLogRepository>,
    pub equipment_repo: EquipmentRepository,
    pub config_manager: Arc<ConfigManager>,
    pub audit: AuditTrail,
    pub api: OrderApi,

    // seeded reference data
    pub client_id: i64,
    /// equipment of a high-priority modality (CT)
    pub flagged_equipment_id: i64,
    /// equipment of an unflagged modality (portable X-ray)
    pub plain_equipment_id: i64,

    // keep the temp database alive for the whole test
    _temp_file: NamedTempFile,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_file = NamedTempFile::new().expect("temp database file");
        let db_path = temp_file.path().to_string_lossy().to_string();

        let conn = open_sqlite_connection(&db_path).expect("open test database");
        ensure_core_schema(&conn).expect("bootstrap schema");
        let conn = Arc::new(Mutex::new(conn));

        let order_repo = Arc::new(WorkOrderRepository::new(conn.clone()));
        let history_repo = Arc::new(StatusHistoryRepository::new(conn.clone()));
        let activity_repo = Arc::new(ActivityLogRepository::new(conn.clone()));
        let equipment_repo = EquipmentRepository::new(conn.clone());
        let config_manager =
            Arc::new(ConfigManager::from_connection(conn.clone()).expect("config manager"));

        let audit =
            AuditTrail::with_recorder(Arc::new(SqliteActivityRecorder::new(activity_repo.clone())));

        let api = OrderApi::new(
            order_repo.clone(),
            history_repo.clone(),
            config_manager.clone(),
            audit.clone(),
        );

        // minimal inventory every test can hang orders on
        let client_id = equipment_repo
            .insert_client("Hospital Central del Norte", None)
            .expect("seed client");
        let ct = equipment_repo
            .insert_modality("Tomografía", true)
            .expect("seed CT modality");
        let xray = equipment_repo
            .insert_modality("Rayos X", false)
            .expect("seed X-ray modality");
        let flagged_equipment_id = equipment_repo
            .insert_equipment(client_id, ct, "Tomógrafo Aquilion 64", Some("AQ64-2291"), None)
            .expect("seed CT scanner");
        let plain_equipment_id = equipment_repo
            .insert_equipment(client_id, xray, "Rayos X portátil Mobilett", None, None)
            .expect("seed X-ray unit");

        Self {
            conn,
            order_repo,
            history_repo,
            activity_repo,
            equipment_repo,
            config_manager,
            audit,
            api,
            client_id,
            flagged_equipment_id,
            plain_equipment_id,
            _temp_file: temp_file,
        }
    }

    /// Guard wired against this environment's repository and audit trail
    pub fn transition_guard(&self) -> StateTransitionGuard {
        StateTransitionGuard::new(self.order_repo.clone(), self.audit.clone())
    }

    /// Guard with a caller-chosen audit trail (failure-injection tests)
    pub fn transition_guard_with_audit(&self, audit: AuditTrail) -> StateTransitionGuard {
        StateTransitionGuard::new(self.order_repo.clone(), audit)
    }

    pub fn postponement_guard(&self) -> PostponementGuard {
        PostponementGuard::new(self.order_repo.clone(), self.audit.clone())
    }

    /// Insert a work order built from the intake defaults, shaped by `build`
    pub fn create_order(&self, equipment_id: i64, build: impl FnOnce(WorkOrder) -> WorkOrder) -> i64 {
        let order = build(WorkOrder::new(equipment_id, self.client_id));
        self.order_repo.create(&order).expect("insert work order")
    }

    /// Reload one order, panicking when it is gone
    pub fn load_order(&self, order_id: i64) -> WorkOrder {
        self.order_repo
            .find_by_id(order_id)
            .expect("query work order")
            .expect("work order exists")
    }
}
