// ==========================================
// MedEquip OMS - work-order API
// ==========================================
// Entry points the HTTP collaborator invokes: active listing (scored and
// sorted), guarded status change, guarded postponement, order history.
// Wire field names match what the existing web client sends (estado,
// prioridad, estado_nuevo, nueva_fecha, justificacion).
// ==========================================

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::status_history::StatusHistoryEntry;
use crate::domain::types::{ManualPriority, OrderStatus};
use crate::domain::work_order::WorkOrder;
use crate::engine::audit::AuditTrail;
use crate::engine::error::GuardError;
use crate::engine::postponement::PostponementGuard;
use crate::engine::priority::PriorityScorer;
use crate::engine::transition::StateTransitionGuard;
use crate::i18n;
use crate::repository::status_history_repo::StatusHistoryRepository;
use crate::repository::work_order_repo::{ActiveOrderFilter, WorkOrderRepository};

// ==========================================
// Wire DTOs
// ==========================================

/// Query parameters of the active listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListActiveOrdersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "estado")]
    pub status: Option<String>,
    #[serde(rename = "prioridad")]
    pub priority: Option<String>,
    pub search: Option<String>,
}

/// One row of the listing: order fields, display context, computed score
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub order_id: i64,
    pub status: OrderStatus,
    pub manual_priority: ManualPriority,
    pub due_date: Option<NaiveDate>,
    pub opened_at: NaiveDateTime,
    pub reported_fault: Option<String>,
    pub score: i64,
    pub equipment_id: i64,
    pub equipment_name: String,
    pub client_id: i64,
    pub client_name: String,
    pub modality_name: String,
    pub modality_high_priority: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListActiveOrdersResponse {
    pub success: bool,
    pub data: Vec<OrderView>,
    pub pagination: Pagination,
}

/// Status-change request body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeStatusRequest {
    #[serde(rename = "estado_nuevo")]
    pub new_status: Option<String>,
    #[serde(rename = "justificacion")]
    pub justification: Option<String>,
}

/// Postponement request body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostponeDueDateRequest {
    #[serde(rename = "nueva_fecha")]
    pub new_due_date: Option<NaiveDate>,
    #[serde(rename = "justificacion")]
    pub justification: Option<String>,
}

/// Reply of both guarded mutations
#[derive(Debug, Clone, Serialize)]
pub struct MutationResponse {
    pub success: bool,
    pub message: String,
    pub data: WorkOrder,
}

/// Reply of the history endpoint (most recent first)
#[derive(Debug, Clone, Serialize)]
pub struct OrderHistoryResponse {
    pub success: bool,
    pub data: Vec<StatusHistoryEntry>,
}

// ==========================================
// OrderApi
// ==========================================
pub struct OrderApi {
    order_repo: Arc<WorkOrderRepository>,
    history_repo: Arc<StatusHistoryRepository>,
    config_manager: Arc<ConfigManager>,
    scorer: PriorityScorer,
    transition_guard: StateTransitionGuard,
    postponement_guard: PostponementGuard,
}

impl OrderApi {
    /// Build the API with its guards sharing one repository and one
    /// audit trail
    pub fn new(
        order_repo: Arc<WorkOrderRepository>,
        history_repo: Arc<StatusHistoryRepository>,
        config_manager: Arc<ConfigManager>,
        audit: AuditTrail,
    ) -> Self {
        let transition_guard = StateTransitionGuard::new(order_repo.clone(), audit.clone());
        let postponement_guard = PostponementGuard::new(order_repo.clone(), audit);

        Self {
            order_repo,
            history_repo,
            config_manager,
            scorer: PriorityScorer::new(),
            transition_guard,
            postponement_guard,
        }
    }

    // ==========================================
    // Listing
    // ==========================================

    /// Active work orders, scored and sorted by urgency (descending)
    ///
    /// Terminal orders never appear, whatever the filters say. The store
    /// applies filters and pagination first; the returned page is scored
    /// with a single "today" and sorted, so ordering is consistent within
    /// one response (top-N is per page, not global).
    pub async fn list_active_orders(
        &self,
        query: ListActiveOrdersQuery,
    ) -> ApiResult<ListActiveOrdersResponse> {
        let page = query.page.unwrap_or(1);
        if page < 1 {
            return Err(ApiError::InvalidInput(
                "La página debe ser mayor o igual a 1".to_string(),
            ));
        }

        let default_limit = self
            .config_manager
            .default_page_limit()
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        let max_limit = self
            .config_manager
            .max_page_limit()
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        let limit = query.limit.unwrap_or(default_limit);
        if limit < 1 || limit > max_limit {
            return Err(ApiError::InvalidInput(format!(
                "El límite debe estar entre 1 y {}",
                max_limit
            )));
        }

        let filter = build_filter(&query)?;
        let offset = (page - 1) * limit;

        let rows = self.order_repo.find_active_paged(&filter, limit, offset)?;
        let total = self.order_repo.count_active(&filter)?;

        // one "today" for the whole request: rows scored in the same
        // response never disagree about the evaluation date
        let today = chrono::Local::now().date_naive();

        let mut views: Vec<OrderView> = rows
            .into_iter()
            .map(|row| {
                let score = self
                    .scorer
                    .score(&row.order, row.modality_high_priority, today);
                OrderView {
                    order_id: row.order.order_id,
                    status: row.order.status,
                    manual_priority: row.order.manual_priority,
                    due_date: row.order.due_date,
                    opened_at: row.order.opened_at,
                    reported_fault: row.order.reported_fault,
                    score,
                    equipment_id: row.order.equipment_id,
                    equipment_name: row.equipment_name,
                    client_id: row.order.client_id,
                    client_name: row.client_name,
                    modality_name: row.modality_name,
                    modality_high_priority: row.modality_high_priority,
                }
            })
            .collect();

        views.sort_by(|a, b| b.score.cmp(&a.score).then(a.order_id.cmp(&b.order_id)));

        let total_pages = if total == 0 { 0 } else { (total + limit - 1) / limit };

        Ok(ListActiveOrdersResponse {
            success: true,
            data: views,
            pagination: Pagination {
                page,
                limit,
                total,
                total_pages,
            },
        })
    }

    // ==========================================
    // Guarded mutations
    // ==========================================

    /// Change the status of an order (justification mandatory)
    pub async fn change_status(
        &self,
        order_id: i64,
        request: ChangeStatusRequest,
        actor: &str,
        source_addr: Option<&str>,
    ) -> ApiResult<MutationResponse> {
        let raw_status = request.new_status.unwrap_or_default();
        if raw_status.trim().is_empty() {
            return Err(ApiError::ValidationError(
                "El nuevo estado es obligatorio".to_string(),
            ));
        }
        let new_status = OrderStatus::parse(&raw_status)
            .ok_or_else(|| ApiError::from(GuardError::UnknownStatus(raw_status)))?;

        let justification = request.justification.unwrap_or_default();

        let order = self
            .transition_guard
            .change_status(order_id, new_status, &justification, actor, source_addr)
            .await?;

        Ok(MutationResponse {
            success: true,
            message: i18n::t("order.status_changed"),
            data: order,
        })
    }

    /// Postpone the due date of an order (justification mandatory,
    /// terminal orders and past dates rejected)
    pub async fn postpone_due_date(
        &self,
        order_id: i64,
        request: PostponeDueDateRequest,
        actor: &str,
        source_addr: Option<&str>,
    ) -> ApiResult<MutationResponse> {
        let new_due_date = request
            .new_due_date
            .ok_or_else(|| ApiError::from(GuardError::MissingDueDate))?;

        let justification = request.justification.unwrap_or_default();

        let order = self
            .postponement_guard
            .postpone_due_date(order_id, new_due_date, &justification, actor, source_addr)
            .await?;

        Ok(MutationResponse {
            success: true,
            message: i18n::t("order.postponed"),
            data: order,
        })
    }

    // ==========================================
    // History
    // ==========================================

    /// Full audited history of one order, most recent first
    pub async fn get_order_history(&self, order_id: i64) -> ApiResult<OrderHistoryResponse> {
        if self.order_repo.find_by_id(order_id)?.is_none() {
            return Err(ApiError::from(GuardError::OrderNotFound(order_id)));
        }

        let entries = self.history_repo.find_by_order(order_id)?;
        Ok(OrderHistoryResponse {
            success: true,
            data: entries,
        })
    }
}

/// Translate the raw query filters, rejecting unknown labels
fn build_filter(query: &ListActiveOrdersQuery) -> ApiResult<ActiveOrderFilter> {
    let status = match query.status.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(
            OrderStatus::parse(raw)
                .ok_or_else(|| ApiError::from(GuardError::UnknownStatus(raw.to_string())))?,
        ),
        _ => None,
    };

    let priority = match query.priority.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(
            ManualPriority::parse(raw)
                .ok_or_else(|| ApiError::from(GuardError::UnknownPriority(raw.to_string())))?,
        ),
        _ => None,
    };

    Ok(ActiveOrderFilter {
        status,
        priority,
        search: query.search.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_bodies_use_spanish_field_names() {
        let change: ChangeStatusRequest = serde_json::from_str(
            r#"{"estado_nuevo": "Completada", "justificacion": "trabajo terminado"}"#,
        )
        .unwrap();
        assert_eq!(change.new_status.as_deref(), Some("Completada"));
        assert_eq!(change.justification.as_deref(), Some("trabajo terminado"));

        let postpone: PostponeDueDateRequest = serde_json::from_str(
            r#"{"nueva_fecha": "2026-09-15", "justificacion": "repuesto en tránsito"}"#,
        )
        .unwrap();
        assert_eq!(
            postpone.new_due_date,
            Some(NaiveDate::from_ymd_opt(2026, 9, 15).unwrap())
        );
    }

    #[test]
    fn test_missing_body_fields_deserialize_as_none() {
        let change: ChangeStatusRequest = serde_json::from_str("{}").unwrap();
        assert!(change.new_status.is_none());
        assert!(change.justification.is_none());

        let postpone: PostponeDueDateRequest = serde_json::from_str("{}").unwrap();
        assert!(postpone.new_due_date.is_none());
    }

    #[test]
    fn test_listing_query_field_names() {
        let query: ListActiveOrdersQuery = serde_json::from_str(
            r#"{"page": 2, "limit": 10, "estado": "abierta", "prioridad": "alta", "search": "4"}"#,
        )
        .unwrap();
        assert_eq!(query.page, Some(2));
        assert_eq!(query.status.as_deref(), Some("abierta"));
        assert_eq!(query.priority.as_deref(), Some("alta"));
    }

    #[test]
    fn test_pagination_serializes_total_pages_camel_case() {
        let pagination = Pagination {
            page: 1,
            limit: 20,
            total: 41,
            total_pages: 3,
        };
        let json = serde_json::to_string(&pagination).unwrap();
        assert!(json.contains("\"totalPages\":3"));
    }

    #[test]
    fn test_build_filter_rejects_unknown_labels() {
        let query = ListActiveOrdersQuery {
            status: Some("archivada".to_string()),
            ..Default::default()
        };
        let err = build_filter(&query).unwrap_err();
        assert_eq!(err.http_status(), 400);

        let query = ListActiveOrdersQuery {
            priority: Some("urgentísima".to_string()),
            ..Default::default()
        };
        let err = build_filter(&query).unwrap_err();
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn test_build_filter_accepts_spanish_labels() {
        let query = ListActiveOrdersQuery {
            status: Some("en proceso".to_string()),
            priority: Some("normal".to_string()),
            search: Some("12".to_string()),
            ..Default::default()
        };
        let filter = build_filter(&query).unwrap();
        assert_eq!(filter.status, Some(OrderStatus::InProgress));
        assert_eq!(filter.priority, Some(ManualPriority::Medium));
        assert_eq!(filter.search.as_deref(), Some("12"));
    }
}
