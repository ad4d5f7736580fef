//! REST API Handlers
//!
//! Implements the REST API endpoints for file-system lifecycle, SKU
//! capability queries, subnet sizing and archive jobs. Request bodies use
//! the kebab-case option names (`root-squash-mode`, `maintenance-day`, ...).

use crate::controlplane::LustreService;
use crate::error::{Error, ErrorKind};
use crate::model::{LustreFileSystem, ProjectedSkuRecord};
use crate::validation::{ArchiveFields, CreateFields, SubnetFields, UpdateFields};
use axum::{
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Query for listing file systems
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFileSystemsQuery {
    #[serde(default)]
    pub resource_group: Option<String>,
}

/// Query for SKU capability records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkuQuery {
    #[serde(default)]
    pub region: Option<String>,
}

/// Body of an archive start request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartArchiveRequest {
    #[serde(default)]
    pub path: Option<String>,
}

/// File system list response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSystemListResponse {
    pub file_systems: Vec<LustreFileSystem>,
}

/// SKU capability response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuInfoResponse {
    pub skus: Vec<ProjectedSkuRecord>,
}

/// Subnet sizing response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetSizeResponse {
    pub number_of_required_ips: u32,
}

/// Subnet check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetCheckResponse {
    pub valid: bool,
}

/// Archive status response; `status` is absent when no job ever ran
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveStatusResponse {
    pub file_system: String,
    pub status: Option<String>,
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// =============================================================================
// REST Router
// =============================================================================

/// REST API router builder
pub struct RestRouter {
    service: Arc<LustreService>,
}

impl RestRouter {
    /// Create a new REST router
    pub fn new(service: Arc<LustreService>) -> Self {
        Self { service }
    }

    /// Build the Axum router
    pub fn build(self) -> Router {
        let state = AppState {
            service: self.service,
        };

        Router::new()
            // File system endpoints
            .route(
                "/v1/filesystems",
                post(create_file_system).get(list_file_systems),
            )
            .route(
                "/v1/resourceGroups/:resource_group/filesystems/:name",
                patch(update_file_system),
            )
            // Archive endpoints
            .route(
                "/v1/resourceGroups/:resource_group/filesystems/:name/archive",
                post(start_archive)
                    .get(archive_status)
                    .delete(cancel_archive),
            )
            // Catalog endpoint
            .route("/v1/skus", get(sku_info))
            // Subnet endpoints
            .route("/v1/subnets/size", post(subnet_size))
            .route("/v1/subnets/validate", post(subnet_check))
            // Metrics and health
            .route("/metrics", get(metrics))
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    service: Arc<LustreService>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Create a file system
async fn create_file_system(
    State(state): State<AppState>,
    Json(fields): Json<CreateFields>,
) -> Response {
    match state.service.create_file_system(&fields).await {
        Ok(fs) => (StatusCode::CREATED, Json(fs)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// List file systems
async fn list_file_systems(
    State(state): State<AppState>,
    Query(query): Query<ListFileSystemsQuery>,
) -> Response {
    match state
        .service
        .list_file_systems(query.resource_group.as_deref())
        .await
    {
        Ok(file_systems) => {
            (StatusCode::OK, Json(FileSystemListResponse { file_systems })).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// Update maintenance window and/or root squash
async fn update_file_system(
    State(state): State<AppState>,
    Path((resource_group, name)): Path<(String, String)>,
    Json(fields): Json<UpdateFields>,
) -> Response {
    let fields = UpdateFields {
        name: Some(name),
        resource_group: Some(resource_group),
        ..fields
    };

    match state.service.update_file_system(&fields).await {
        Ok(fs) => (StatusCode::OK, Json(fs)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Projected SKU capability records
async fn sku_info(State(state): State<AppState>, Query(query): Query<SkuQuery>) -> Response {
    match state.service.sku_info(query.region.as_deref()).await {
        Ok(skus) => (StatusCode::OK, Json(SkuInfoResponse { skus })).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Number of IPs required for a SKU and size
async fn subnet_size(
    State(state): State<AppState>,
    Json(fields): Json<SubnetFields>,
) -> Response {
    match state.service.required_subnet_size(&fields).await {
        Ok(number_of_required_ips) => (
            StatusCode::OK,
            Json(SubnetSizeResponse {
                number_of_required_ips,
            }),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Check whether a subnet can host a file system
async fn subnet_check(
    State(state): State<AppState>,
    Json(fields): Json<SubnetFields>,
) -> Response {
    match state.service.check_subnet(&fields).await {
        Ok(valid) => (StatusCode::OK, Json(SubnetCheckResponse { valid })).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Start an archive job
async fn start_archive(
    State(state): State<AppState>,
    Path((resource_group, name)): Path<(String, String)>,
    Json(body): Json<StartArchiveRequest>,
) -> Response {
    let fields = ArchiveFields {
        name: Some(name),
        resource_group: Some(resource_group),
        path: body.path,
    };

    match state.service.start_archive(&fields).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(e) => error_response(&e),
    }
}

/// Status of the most recent archive job
async fn archive_status(
    State(state): State<AppState>,
    Path((resource_group, name)): Path<(String, String)>,
) -> Response {
    let fields = ArchiveFields {
        name: Some(name.clone()),
        resource_group: Some(resource_group.clone()),
        path: None,
    };

    match state.service.archive_status(&fields).await {
        Ok(status) => (
            StatusCode::OK,
            Json(ArchiveStatusResponse {
                file_system: format!("{}/{}", resource_group, name),
                status,
            }),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Cancel the running archive job
async fn cancel_archive(
    State(state): State<AppState>,
    Path((resource_group, name)): Path<(String, String)>,
) -> Response {
    let fields = ArchiveFields {
        name: Some(name),
        resource_group: Some(resource_group),
        path: None,
    };

    match state.service.cancel_archive(&fields).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

/// Prometheus text exposition
async fn metrics(State(state): State<AppState>) -> Response {
    match state.service.metrics().render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Health check
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// =============================================================================
// Error Mapping
// =============================================================================

/// HTTP status for an error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidField
        | ErrorKind::MissingRequiredGroup
        | ErrorKind::ConflictingConfiguration
        | ErrorKind::EmptyUpdatePatch
        | ErrorKind::ZoneUnsupported => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::CatalogFetchFailed | ErrorKind::Backend => StatusCode::BAD_GATEWAY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(e: &Error) -> Response {
    let status = status_for(e.kind());
    if status.is_server_error() {
        error!("Request failed: {}", e);
    } else {
        debug!("Request rejected: {}", e);
    }

    let details = match e {
        Error::CatalogFetchFailed(inner) => Some(inner.to_string()),
        _ => None,
    };

    (
        status,
        Json(ApiErrorResponse {
            error: e.kind().to_string(),
            message: e.to_string(),
            details,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controlplane::{InMemoryLustreBackend, ServiceConfig};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router() -> Router {
        let backend = Arc::new(InMemoryLustreBackend::default());
        let service =
            LustreService::with_in_memory_backend(ServiceConfig::default(), backend).unwrap();
        RestRouter::new(service).build()
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn create_body() -> Value {
        json!({
            "name": "fs1",
            "resource-group": "rg1",
            "location": "eastus",
            "sku": "AMLFS-Durable-Premium-40",
            "size": 48,
            "subnet-id": "subnet-a",
            "zone": "1",
            "maintenance-day": "Tuesday",
            "maintenance-time": "01:00",
            "hsm-container": "data",
            "hsm-log-container": "logs"
        })
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::EmptyUpdatePatch), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(ErrorKind::ConflictingConfiguration),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(ErrorKind::ZoneUnsupported), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::CatalogFetchFailed), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(ErrorKind::Internal), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_create_list_and_update() {
        let router = router();

        let (status, created) = send(&router, "POST", "/v1/filesystems", Some(create_body())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["storageCapacityTib"], 48);

        let (status, listed) = send(&router, "GET", "/v1/filesystems?resourceGroup=rg1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["fileSystems"].as_array().unwrap().len(), 1);

        let (status, updated) = send(
            &router,
            "PATCH",
            "/v1/resourceGroups/rg1/filesystems/fs1",
            Some(json!({"maintenance-day": "Wednesday", "maintenance-time": "02:15"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["maintenanceDay"], "Wednesday");
    }

    #[tokio::test]
    async fn test_validation_errors_are_bad_requests() {
        let router = router();
        let mut body = create_body();
        body["root-squash-mode"] = json!("RootOnly");

        let (status, error) = send(&router, "POST", "/v1/filesystems", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "missing_required_group");
        assert!(error["message"].as_str().unwrap().contains("no-squash-nid-list"));

        let (status, error) = send(
            &router,
            "PATCH",
            "/v1/resourceGroups/rg1/filesystems/fs1",
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "empty_update_patch");
    }

    #[tokio::test]
    async fn test_sku_and_subnet_endpoints() {
        let router = router();

        let (status, skus) = send(&router, "GET", "/v1/skus?region=uaenorth", None).await;
        assert_eq!(status, StatusCode::OK);
        let skus = skus["skus"].as_array().unwrap();
        assert_eq!(skus.len(), 4);
        assert_eq!(skus[0]["supportsZones"], false);

        let (status, size) = send(
            &router,
            "POST",
            "/v1/subnets/size",
            Some(json!({"sku": "AMLFS-Durable-Premium-40", "size": 96})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(size["numberOfRequiredIps"], 12);

        let (status, check) = send(
            &router,
            "POST",
            "/v1/subnets/validate",
            Some(json!({"sku": "AMLFS-Durable-Premium-40", "size": 96, "subnet-id": "subnet-a"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(check["error"], "invalid_field");
        assert!(check["message"].as_str().unwrap().contains("location"));

        let (status, check) = send(
            &router,
            "POST",
            "/v1/subnets/validate",
            Some(json!({
                "sku": "AMLFS-Durable-Premium-40",
                "size": 96,
                "subnet-id": "subnet-a",
                "location": "eastus"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(check["valid"], true);
    }

    #[tokio::test]
    async fn test_archive_endpoints() {
        let router = router();
        send(&router, "POST", "/v1/filesystems", Some(create_body())).await;
        let uri = "/v1/resourceGroups/rg1/filesystems/fs1/archive";

        let (status, _) = send(&router, "POST", uri, Some(json!({"path": "/"}))).await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let (status, body) = send(&router, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "InProgress: /");

        let (status, _) = send(&router, "DELETE", uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(
            &router,
            "GET",
            "/v1/resourceGroups/rg1/filesystems/missing/archive",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_metrics_and_health() {
        let router = router();
        send(&router, "GET", "/v1/skus", None).await;

        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let text = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(text.to_vec()).unwrap();
        assert!(text.contains("amlfs_requests_total{operation=\"sku_info\"} 1"));

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
