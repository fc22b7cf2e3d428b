// 🌐 HTTP API - JSON front end over the Workbench
//
// All handlers share one Workbench behind a Mutex, so requests are applied one at a time.

use crate::catalog::{ProductRecord, Upsert};
use crate::classifier::{describe, ScanAnalysis};
use crate::error::StoreError;
use crate::ledger::ScanEvent;
use crate::workbench::{ScanReport, Workbench};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tower_http::cors::CorsLayer;
use tracing::error;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    bench: Arc<Mutex<Workbench>>,
}

impl AppState {
    pub fn new(bench: Workbench) -> Self {
        AppState {
            bench: Arc::new(Mutex::new(bench)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Workbench> {
        // A panicked handler leaves the stores consistent (each mutation is one call)
        self.bench.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// StoreError on its way out as an HTTP response
pub struct ApiError(StoreError);

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StoreError::Validation { .. } => StatusCode::BAD_REQUEST,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Storage { .. } => {
                error!(error = %self.0, "storage failure while serving request");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ApiResponse::<()>::err(self.0.to_string()))).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

// ============================================================================
// Request / response bodies
// ============================================================================

#[derive(Deserialize)]
pub struct ProductInput {
    pub id: String,
    pub name: String,
    pub price: String,
}

#[derive(Deserialize)]
pub struct ProductChanges {
    pub name: String,
    pub price: String,
}

#[derive(Serialize)]
pub struct ProductSaved {
    pub product: ProductRecord,
    pub created: bool,
}

#[derive(Deserialize)]
pub struct ScanInput {
    pub payload: String,
}

#[derive(Deserialize)]
pub struct HistorySelection {
    pub indices: Vec<usize>,
}

#[derive(Serialize)]
pub struct HistoryDeleted {
    pub removed: usize,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/products
async fn list_products(State(state): State<AppState>) -> ApiResult<Vec<ProductRecord>> {
    let bench = state.lock();
    Ok(Json(ApiResponse::ok(bench.catalog().products().to_vec())))
}

/// POST /api/products - create, or replace an existing id
async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<ApiResponse<ProductSaved>>), ApiError> {
    let mut bench = state.lock();
    let catalog = bench.catalog_mut();

    let outcome = catalog.create_or_replace(&input.id, &input.name, &input.price)?;
    let product = catalog
        .lookup(input.id.trim())
        .cloned()
        .ok_or_else(|| StoreError::not_found(format!("Product '{}'", input.id.trim())))?;

    let created = outcome == Upsert::Created;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(ApiResponse::ok(ProductSaved { product, created }))))
}

/// GET /api/products/:id
async fn get_product(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ProductRecord> {
    let bench = state.lock();
    let product = bench
        .catalog()
        .lookup(&id)
        .cloned()
        .ok_or_else(|| StoreError::not_found(format!("Product '{}'", id)))?;
    Ok(Json(ApiResponse::ok(product)))
}

/// PUT /api/products/:id
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<ProductChanges>,
) -> ApiResult<ProductRecord> {
    let mut bench = state.lock();
    let product = bench
        .catalog_mut()
        .update(&id, &changes.name, &changes.price)?
        .clone();
    Ok(Json(ApiResponse::ok(product)))
}

/// DELETE /api/products/:id
async fn delete_product(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ProductRecord> {
    let mut bench = state.lock();
    let removed = bench.catalog_mut().delete(&id)?;
    Ok(Json(ApiResponse::ok(removed)))
}

/// GET /api/export - catalog as CSV
async fn export_products(State(state): State<AppState>) -> Result<Response, ApiError> {
    let bench = state.lock();
    let mut buf = Vec::new();
    bench.catalog().export(&mut buf)?;
    let body = String::from_utf8(buf).map_err(|e| StoreError::storage_target("csv export", e))?;

    Ok((
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        body,
    )
        .into_response())
}

/// GET /api/scans - history, newest first
async fn list_scans(State(state): State<AppState>) -> ApiResult<Vec<ScanEvent>> {
    let bench = state.lock();
    Ok(Json(ApiResponse::ok(bench.ledger().all().to_vec())))
}

/// POST /api/scans - record a decoded payload
async fn record_scan(State(state): State<AppState>, Json(input): Json<ScanInput>) -> ApiResult<ScanReport> {
    let mut bench = state.lock();
    Ok(Json(ApiResponse::ok(bench.record_scan(&input.payload))))
}

/// DELETE /api/scans - remove the selected history rows
async fn delete_scans(
    State(state): State<AppState>,
    Json(selection): Json<HistorySelection>,
) -> ApiResult<HistoryDeleted> {
    let mut bench = state.lock();
    let removed = bench.delete_history(selection.indices)?;
    Ok(Json(ApiResponse::ok(HistoryDeleted { removed })))
}

/// POST /api/classify - classify without recording
async fn classify_payload(State(state): State<AppState>, Json(input): Json<ScanInput>) -> ApiResult<ScanAnalysis> {
    let bench = state.lock();
    Ok(Json(ApiResponse::ok(describe(&input.payload, bench.catalog()))))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/export", get(export_products))
        .route("/scans", get(list_scans).post(record_scan).delete(delete_scans))
        .route("/classify", post(classify_payload))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}
