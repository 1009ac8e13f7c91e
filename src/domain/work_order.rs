// ==========================================
// MedEquip OMS - work-order domain model
// ==========================================
// A work order tracks one repair/maintenance job against one piece of
// equipment for one client. Status and due date are mutated only through
// the lifecycle guards; everything else is ordinary field editing owned by
// the CRUD collaborators.
// ==========================================

use crate::domain::types::{ManualPriority, OrderStatus};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// WorkOrder
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    // ===== identity =====
    pub order_id: i64,

    // ===== references =====
    pub equipment_id: i64,
    pub client_id: i64,
    pub contract_id: Option<i64>,

    // ===== lifecycle =====
    pub status: OrderStatus,
    pub manual_priority: ManualPriority,
    pub opened_at: NaiveDateTime, // set at creation, immutable afterwards
    pub closed_at: Option<NaiveDateTime>, // set iff status is terminal
    pub due_date: Option<NaiveDate>, // mutable only through PostponementGuard

    // ===== descriptive fields (not consulted by the engines) =====
    pub reported_fault: Option<String>,
    pub origin: Option<String>,

    // ===== row audit =====
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl WorkOrder {
    /// New order with the intake defaults: Open, Medium priority,
    /// opened now. order_id stays 0 until the store assigns it.
    pub fn new(equipment_id: i64, client_id: i64) -> Self {
        let now = chrono::Local::now().naive_local();
        Self {
            order_id: 0,
            equipment_id,
            client_id,
            contract_id: None,
            status: OrderStatus::Open,
            manual_priority: ManualPriority::default(),
            opened_at: now,
            closed_at: None,
            due_date: None,
            reported_fault: None,
            origin: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_priority(mut self, priority: ManualPriority) -> Self {
        self.manual_priority = priority;
        self
    }

    pub fn with_reported_fault(mut self, fault: &str) -> Self {
        self.reported_fault = Some(fault.to_string());
        self
    }

    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = Some(origin.to_string());
        self
    }

    pub fn with_contract(mut self, contract_id: i64) -> Self {
        self.contract_id = Some(contract_id);
        self
    }

    /// Whether the order sits in a terminal status
    pub fn is_closed(&self) -> bool {
        self.status.is_terminal()
    }
}

// ==========================================
// Equipment (read-only input to the scorer)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    pub equipment_id: i64,
    pub client_id: i64,
    pub modality_id: i64,
    pub name: String,
    pub serial_no: Option<String>,
    pub location: Option<String>,
    pub created_at: NaiveDateTime,
}

// ==========================================
// Modality (medical-imaging category, e.g. CT, MRI)
// ==========================================
// high_priority_flag feeds the urgency score: equipment of a flagged
// modality jumps the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Modality {
    pub modality_id: i64,
    pub name: String,
    pub high_priority_flag: bool,
    pub created_at: NaiveDateTime,
}

// ==========================================
// Client
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub client_id: i64,
    pub name: String,
    pub contact: Option<String>,
    pub created_at: NaiveDateTime,
}
