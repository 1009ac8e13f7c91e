// ==========================================
// MedEquip OMS - API layer
// ==========================================
// Business interfaces the HTTP transport collaborator invokes.
// ==========================================

pub mod error;
pub mod order_api;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use order_api::{
    ChangeStatusRequest, ListActiveOrdersQuery, ListActiveOrdersResponse, MutationResponse,
    OrderApi, OrderHistoryResponse, OrderView, Pagination, PostponeDueDateRequest,
};
