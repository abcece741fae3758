use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::certificate::model::{CertificateState, MetadataPatch};
use crate::errors::{AppError, AppJson, EditError};
use crate::geometry::Edge;
use crate::sections::SectionId;
use crate::state::{AppState, SessionView};

// ────────────────────────────────────────────────────────────────────────────
// Request / response bodies
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct FormatRequest {
    pub format: String,
}

#[derive(Deserialize)]
pub struct UnitRequest {
    pub unit: String,
}

#[derive(Deserialize)]
pub struct MarginRequest {
    pub edge: Edge,
    pub value: f64,
}

#[derive(Deserialize)]
pub struct LinkedRequest {
    pub linked: bool,
}

#[derive(Deserialize)]
pub struct DimensionsRequest {
    pub width: f64,
    pub height: f64,
}

#[derive(Deserialize)]
pub struct AddSectionRequest {
    pub name: String,
    pub component: String,
    #[serde(default)]
    pub index: Option<usize>,
}

#[derive(Deserialize)]
pub struct RenameSectionRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct PositionRequest {
    pub index: usize,
}

#[derive(Deserialize)]
pub struct HeightRequest {
    pub height: f64,
}

#[derive(Deserialize)]
pub struct MeasuredHeight {
    pub id: SectionId,
    pub height: f64,
}

#[derive(Deserialize)]
pub struct HeightsRequest {
    pub heights: Vec<MeasuredHeight>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationRequest {
    pub enabled: bool,
}

#[derive(Deserialize)]
pub struct CurrentPageRequest {
    pub page: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionCreatedResponse {
    pub section_id: SectionId,
    #[serde(flatten)]
    pub session: SessionView,
}

type SessionResult = Result<Json<SessionView>, AppError>;

// ────────────────────────────────────────────────────────────────────────────
// Sessions
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/certificates
pub async fn handle_create(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let id = state.open_session().await?;
    let view = state.view(id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/certificates/:id
pub async fn handle_get(State(state): State<AppState>, Path(id): Path<Uuid>) -> SessionResult {
    Ok(Json(state.view(id).await?))
}

/// PUT /api/v1/certificates/:id
///
/// The body is parsed here rather than by the extractor so that a certificate
/// breaking its own invariants reports `INVALID_PAYLOAD`.
pub async fn handle_load(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(body): AppJson<Value>,
) -> SessionResult {
    let certificate: CertificateState = serde_json::from_value(body)
        .map_err(|e| EditError::InvalidPayload(format!("certificate rejected: {e}")))?;
    let ((), view) = state
        .with_session(id, move |store| store.load(certificate))
        .await?;
    Ok(Json(view))
}

/// DELETE /api/v1/certificates/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.close_session(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Page geometry
// ────────────────────────────────────────────────────────────────────────────

/// PATCH /api/v1/certificates/:id/page/format
pub async fn handle_set_format(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<FormatRequest>,
) -> SessionResult {
    let ((), view) = state
        .with_session(id, |store| store.set_format(&req.format))
        .await?;
    Ok(Json(view))
}

/// PATCH /api/v1/certificates/:id/page/unit
pub async fn handle_set_unit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<UnitRequest>,
) -> SessionResult {
    let ((), view) = state
        .with_session(id, |store| store.set_unit(&req.unit))
        .await?;
    Ok(Json(view))
}

/// PATCH /api/v1/certificates/:id/page/margin
pub async fn handle_set_margin(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<MarginRequest>,
) -> SessionResult {
    let ((), view) = state
        .with_session(id, |store| store.set_margin(req.edge, req.value))
        .await?;
    Ok(Json(view))
}

/// PATCH /api/v1/certificates/:id/page/linked
pub async fn handle_set_linked(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<LinkedRequest>,
) -> SessionResult {
    let ((), view) = state
        .with_session(id, |store| store.set_linked(req.linked))
        .await?;
    Ok(Json(view))
}

/// PATCH /api/v1/certificates/:id/page/dimensions
pub async fn handle_set_dimensions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<DimensionsRequest>,
) -> SessionResult {
    let ((), view) = state
        .with_session(id, |store| store.set_dimensions(req.width, req.height))
        .await?;
    Ok(Json(view))
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/certificates/:id/sections
pub async fn handle_add_section(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<AddSectionRequest>,
) -> Result<(StatusCode, Json<SectionCreatedResponse>), AppError> {
    let (section_id, session) = state
        .with_session(id, |store| {
            store.add_section(&req.name, &req.component, req.index)
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SectionCreatedResponse {
            section_id,
            session,
        }),
    ))
}

/// PATCH /api/v1/certificates/:id/sections/:section_id
pub async fn handle_rename_section(
    State(state): State<AppState>,
    Path((id, section_id)): Path<(Uuid, u32)>,
    AppJson(req): AppJson<RenameSectionRequest>,
) -> SessionResult {
    let ((), view) = state
        .with_session(id, |store| {
            store.rename_section(SectionId(section_id), &req.name)
        })
        .await?;
    Ok(Json(view))
}

/// DELETE /api/v1/certificates/:id/sections/:section_id
pub async fn handle_remove_section(
    State(state): State<AppState>,
    Path((id, section_id)): Path<(Uuid, u32)>,
) -> SessionResult {
    let (_removed, view) = state
        .with_session(id, |store| store.remove_section(SectionId(section_id)))
        .await?;
    Ok(Json(view))
}

/// PATCH /api/v1/certificates/:id/sections/:section_id/position
pub async fn handle_reorder_section(
    State(state): State<AppState>,
    Path((id, section_id)): Path<(Uuid, u32)>,
    AppJson(req): AppJson<PositionRequest>,
) -> SessionResult {
    let ((), view) = state
        .with_session(id, |store| {
            store.reorder_section(SectionId(section_id), req.index)
        })
        .await?;
    Ok(Json(view))
}

/// PATCH /api/v1/certificates/:id/sections/:section_id/height
pub async fn handle_update_height(
    State(state): State<AppState>,
    Path((id, section_id)): Path<(Uuid, u32)>,
    AppJson(req): AppJson<HeightRequest>,
) -> SessionResult {
    let ((), view) = state
        .with_session(id, |store| {
            store.update_render_height(SectionId(section_id), req.height)
        })
        .await?;
    Ok(Json(view))
}

/// PUT /api/v1/certificates/:id/sections/heights
pub async fn handle_update_heights(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<HeightsRequest>,
) -> SessionResult {
    if req.heights.is_empty() {
        return Err(AppError::Validation("heights must not be empty".to_string()));
    }
    let heights: Vec<(SectionId, f64)> = req.heights.iter().map(|m| (m.id, m.height)).collect();
    let ((), view) = state
        .with_session(id, |store| store.update_render_heights(&heights))
        .await?;
    Ok(Json(view))
}

// ────────────────────────────────────────────────────────────────────────────
// Pagination & payload
// ────────────────────────────────────────────────────────────────────────────

/// PATCH /api/v1/certificates/:id/pagination
pub async fn handle_set_pagination(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<PaginationRequest>,
) -> SessionResult {
    let ((), view) = state
        .with_session(id, |store| store.set_pagination_enabled(req.enabled))
        .await?;
    Ok(Json(view))
}

/// PATCH /api/v1/certificates/:id/pagination/current
pub async fn handle_set_current_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<CurrentPageRequest>,
) -> SessionResult {
    let ((), view) = state
        .with_session(id, |store| store.set_current_page(req.page))
        .await?;
    Ok(Json(view))
}

/// PATCH /api/v1/certificates/:id/data
///
/// Body is an RFC 7396 merge patch against the current payload.
pub async fn handle_set_data(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(patch): AppJson<Value>,
) -> SessionResult {
    let ((), view) = state
        .with_session(id, |store| store.set_data(&patch))
        .await?;
    Ok(Json(view))
}

/// PATCH /api/v1/certificates/:id/metadata
pub async fn handle_set_metadata(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(patch): AppJson<MetadataPatch>,
) -> SessionResult {
    let ((), view) = state
        .with_session(id, move |store| store.set_metadata(patch))
        .await?;
    Ok(Json(view))
}
