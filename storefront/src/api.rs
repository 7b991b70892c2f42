use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{FieldError, OrderError};
use crate::model::{CreateOrderRequest, OrderChanges, OrderStatus};
use crate::service::{OrderService, DEFAULT_PAGE_SIZE};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<OrderService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/{id}", get(get_order).patch(update_order))
        .route("/api/orders/{id}/cancel", post(cancel_order))
        .route("/api/orders/{id}/tracking", get(get_tracking))
        .route("/health", get(health_check))
        .with_state(state)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Customer,
    Admin,
}

/// Identity injected by the fronting authentication layer.
///
/// This service trusts the `x-user-id` / `x-user-role` headers set by the
/// session-handling proxy in front of it; a request without an identity is
/// rejected with 401 before any handler runs.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = OrderError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or(OrderError::Unauthorized)?
            .to_string();

        let role = match parts.headers.get("x-user-role").and_then(|v| v.to_str().ok()) {
            Some("admin") => UserRole::Admin,
            _ => UserRole::Customer,
        };

        Ok(AuthUser { id, role })
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
}

async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, OrderError> {
    // A blank `?status=` means no filter, same as omitting the parameter.
    let status = match params.status.as_deref().filter(|raw| !raw.is_empty()) {
        Some(raw) => Some(OrderStatus::from_str(raw).map_err(|_| {
            OrderError::Validation(vec![FieldError::new(
                "status",
                format!("Unknown order status: {}", raw),
            )])
        })?),
        None => None,
    };

    let listed = state
        .service
        .list_orders(
            &user.id,
            params.page.unwrap_or(1),
            params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            status,
        )
        .await?;

    Ok(Json(json!({ "orders": listed.orders, "meta": listed.meta })))
}

async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, OrderError> {
    let Json(request) = payload.map_err(body_rejection)?;

    tracing::info!(user_id = %user.id, items = request.items.len(), "Processing order creation");
    let order = state.service.create_order(&user.id, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Order created successfully", "order": order })),
    ))
}

async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, OrderError> {
    let (order, timeline) = state.service.get_order(&user.id, &id).await?;
    Ok(Json(json!({ "order": order, "timeline": timeline })))
}

async fn update_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<OrderChanges>, JsonRejection>,
) -> Result<impl IntoResponse, OrderError> {
    // Only admin users can update orders.
    if !user.is_admin() {
        return Err(OrderError::Forbidden);
    }

    let Json(changes) = payload.map_err(body_rejection)?;
    let order = state.service.update_order(&id, changes).await?;

    Ok(Json(json!({ "order": order })))
}

async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, OrderError> {
    let order = state.service.cancel_order(&user.id, &id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Order cancelled successfully",
        "order": order,
    })))
}

async fn get_tracking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, OrderError> {
    let tracking = state.service.tracking(&user.id, &id).await?;
    Ok(Json(json!({ "tracking": tracking })))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK").into_response()
}

fn body_rejection(rejection: JsonRejection) -> OrderError {
    OrderError::Validation(vec![FieldError::new("body", rejection.body_text())])
}
