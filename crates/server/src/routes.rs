// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP handlers.
//!
//! Each handler extracts the session and request, locks persistence, and
//! delegates to the matching `repatria_api` function.

use std::path::PathBuf;
use std::str::FromStr;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use repatria_api::{
    AddToQueueRequest, CaseNoteKind, CreateUserRequest, CreateUserResponse, DashboardResponse,
    EditRepatriantRequest, EventRequest, ExportFormat, ExportKind, ExportParams, FamilyReport,
    FamilyResponse, FileDownload, HousingDepartmentRequest, HousingRecordRequest,
    HousingViewResponse, LoginRequest, LoginResponse, LogsParams, LogsResponse, LookupParams,
    MessageResponse, OtherRecordRequest, QueueEntryResponse, RecordResponse,
    RegisterRepatriantRequest, RegisterRepatriantResponse, RepatriantDetailResponse,
    RepatriantHistoryResponse, RepatriantsReport, SearchParams, SearchResponse, SocialHelpRequest,
    SocialReport, SocialViewResponse, StatusResponse, StorageStatsResponse, SummaryReport,
    ToggleUserResponse, UpdateQueueRequest, UploadResponse, UserActivityReport, UserInfo,
    WhoAmIResponse,
};
use repatria_persistence::{
    EventRecordData, HousingDepartmentRecordData, HousingRecordData, OtherRecordData,
    RankedQueueEntry, RepatriantSummary, SocialHelpRecordData,
};
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::session::{SessionOperator, expired_session_cookie, session_cookie};
use crate::{AppState, HttpError};

/// The multipart field carrying an upload.
const UPLOAD_FIELD: &str = "file";

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

fn header_value(value: &str) -> Result<HeaderValue, HttpError> {
    HeaderValue::from_str(value).map_err(|e| HttpError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: format!("Invalid header value: {e}"),
    })
}

/// Sends a generated file as an attachment.
fn attachment(file: FileDownload) -> Result<Response, HttpError> {
    let disposition: HeaderValue =
        header_value(&format!("attachment; filename=\"{}\"", file.file_name))?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(file.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.body,
    )
        .into_response())
}

fn content_type_for(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Reads the `file` part of a multipart upload.
async fn read_upload(mut multipart: Multipart) -> Result<(String, Vec<u8>), HttpError> {
    let bad_request = |message: String| HttpError {
        status: StatusCode::BAD_REQUEST,
        message,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name: String = field.file_name().unwrap_or_default().to_string();
        if file_name.is_empty() {
            return Err(bad_request(String::from("No file selected")));
        }
        let bytes: Vec<u8> = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("Failed to read upload: {e}")))?
            .to_vec();
        return Ok((file_name, bytes));
    }

    Err(bad_request(String::from("No file part in the request")))
}

// ========================================================================
// Authentication
// ========================================================================

/// Handler for POST `/auth/login`.
///
/// Returns the session and sets it as an `HttpOnly` cookie.
pub async fn handle_login(
    State(app_state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, HttpError> {
    info!(username = %req.username, "Handling login request");

    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse = repatria_api::login(&mut persistence, &req, now())?;
    drop(persistence);

    let cookie: HeaderValue = header_value(&session_cookie(&response.session_token))?;
    Ok(([(header::SET_COOKIE, cookie)], Json(response)).into_response())
}

/// Handler for POST `/auth/logout`.
pub async fn handle_logout(
    State(app_state): State<AppState>,
    SessionOperator(actor, token): SessionOperator,
) -> Result<Response, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: MessageResponse = repatria_api::logout(&mut persistence, &token, &actor)?;
    drop(persistence);

    let cookie: HeaderValue = header_value(&expired_session_cookie())?;
    Ok(([(header::SET_COOKIE, cookie)], Json(response)).into_response())
}

/// Handler for GET `/auth/whoami`.
pub async fn handle_whoami(
    SessionOperator(actor, _): SessionOperator,
) -> Json<WhoAmIResponse> {
    Json(repatria_api::whoami(&actor))
}

/// Handler for GET `/dashboard`.
pub async fn handle_dashboard(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
) -> Result<Json<DashboardResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::dashboard(
        &mut persistence,
        &actor,
        now().date(),
    )?))
}

// ========================================================================
// Repatriants
// ========================================================================

/// Handler for GET `/repatriants/search`.
pub async fn handle_search(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::search_repatriants(
        &mut persistence,
        &params,
        &actor,
        now().year(),
    )?))
}

/// Handler for GET `/api/search-repatriants`.
pub async fn handle_lookup(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Query(params): Query<LookupParams>,
) -> Result<Json<Vec<RepatriantSummary>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::lookup_repatriants(
        &mut persistence,
        &params,
        &actor,
    )?))
}

/// Handler for POST `/repatriants`.
pub async fn handle_register(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Json(req): Json<RegisterRepatriantRequest>,
) -> Result<(StatusCode, Json<RegisterRepatriantResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RegisterRepatriantResponse = repatria_api::register_repatriant(
        &mut persistence,
        &app_state.storage,
        &req,
        &actor,
        now().date(),
    )?;

    info!(
        repatriant_id = response.repatriant_id,
        username = %actor.username,
        "Registered repatriant"
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/repatriants/{id}`.
pub async fn handle_get_repatriant(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
) -> Result<Json<RepatriantDetailResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::get_repatriant(
        &mut persistence,
        id,
        &actor,
        now().date(),
    )?))
}

/// Handler for PUT `/repatriants/{id}`.
pub async fn handle_edit_repatriant(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
    Json(req): Json<EditRepatriantRequest>,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::edit_repatriant(
        &mut persistence,
        &app_state.storage,
        id,
        &req,
        &actor,
    )?))
}

/// Handler for DELETE `/repatriants/{id}`.
pub async fn handle_delete_repatriant(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::delete_repatriant(
        &mut persistence,
        id,
        &actor,
    )?))
}

/// Handler for GET `/repatriants/{id}/family`.
pub async fn handle_family(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
) -> Result<Json<FamilyResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::get_family(&mut persistence, id, &actor)?))
}

/// Handler for GET `/repatriants/{id}/status`.
pub async fn handle_status(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
) -> Result<Json<StatusResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::check_repatriant_status(
        &mut persistence,
        id,
        &actor,
        now().date(),
    )?))
}

/// Handler for GET `/repatriants/{id}/social`.
pub async fn handle_social_view(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
) -> Result<Json<SocialViewResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::social_view(&mut persistence, id, &actor)?))
}

/// Handler for GET `/repatriants/{id}/housing`.
pub async fn handle_housing_view(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
) -> Result<Json<HousingViewResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::housing_view(&mut persistence, id, &actor)?))
}

/// Handler for GET `/repatriants/{id}/history`.
pub async fn handle_history(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
) -> Result<Json<RepatriantHistoryResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::repatriant_history(
        &mut persistence,
        id,
        &actor,
    )?))
}

/// Handler for GET `/repatriants/{id}/form`.
pub async fn handle_form(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
) -> Result<Response, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let file: FileDownload =
        repatria_api::generate_form(&mut persistence, &app_state.form_template, id, &actor)?;
    drop(persistence);
    attachment(file)
}

// ========================================================================
// Case notes
// ========================================================================

/// Handler for GET `/repatriants/{id}/housing-records`.
pub async fn handle_list_housing_records(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
) -> Result<Json<Vec<HousingRecordData>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::list_housing_records(
        &mut persistence,
        id,
        &actor,
    )?))
}

/// Handler for POST `/repatriants/{id}/housing-records`.
pub async fn handle_create_housing_record(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
    Json(req): Json<HousingRecordRequest>,
) -> Result<(StatusCode, Json<RecordResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RecordResponse =
        repatria_api::create_housing_record(&mut persistence, id, &req, &actor)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for PUT `/housing-records/{id}`.
pub async fn handle_update_housing_record(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
    Json(req): Json<HousingRecordRequest>,
) -> Result<Json<RecordResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::update_housing_record(
        &mut persistence,
        id,
        &req,
        &actor,
    )?))
}

/// Handler for GET `/repatriants/{id}/social-help`.
pub async fn handle_list_social_help(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
) -> Result<Json<Vec<SocialHelpRecordData>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::list_social_help_records(
        &mut persistence,
        id,
        &actor,
    )?))
}

/// Handler for POST `/repatriants/{id}/social-help`.
pub async fn handle_create_social_help(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
    Json(req): Json<SocialHelpRequest>,
) -> Result<(StatusCode, Json<RecordResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RecordResponse =
        repatria_api::create_social_help_record(&mut persistence, id, &req, &actor)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for PUT `/social-help/{id}`.
pub async fn handle_update_social_help(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
    Json(req): Json<SocialHelpRequest>,
) -> Result<Json<RecordResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::update_social_help_record(
        &mut persistence,
        id,
        &req,
        &actor,
    )?))
}

/// Handler for GET `/repatriants/{id}/events`.
pub async fn handle_list_events(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
) -> Result<Json<Vec<EventRecordData>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::list_event_records(
        &mut persistence,
        id,
        &actor,
    )?))
}

/// Handler for POST `/repatriants/{id}/events`.
pub async fn handle_create_event(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
    Json(req): Json<EventRequest>,
) -> Result<(StatusCode, Json<RecordResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RecordResponse =
        repatria_api::create_event_record(&mut persistence, id, &req, &actor)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for PUT `/events/{id}`.
pub async fn handle_update_event(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
    Json(req): Json<EventRequest>,
) -> Result<Json<RecordResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::update_event_record(
        &mut persistence,
        id,
        &req,
        &actor,
    )?))
}

/// Handler for GET `/repatriants/{id}/other`.
pub async fn handle_list_other(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
) -> Result<Json<Vec<OtherRecordData>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::list_other_records(
        &mut persistence,
        id,
        &actor,
    )?))
}

/// Handler for POST `/repatriants/{id}/other`.
pub async fn handle_create_other(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
    Json(req): Json<OtherRecordRequest>,
) -> Result<(StatusCode, Json<RecordResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RecordResponse =
        repatria_api::create_other_record(&mut persistence, id, &req, &actor)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for PUT `/other/{id}`.
pub async fn handle_update_other(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
    Json(req): Json<OtherRecordRequest>,
) -> Result<Json<RecordResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::update_other_record(
        &mut persistence,
        id,
        &req,
        &actor,
    )?))
}

/// Soft-deletes a case note. Routed once per [`CaseNoteKind`].
pub async fn handle_delete_case_note(
    kind: CaseNoteKind,
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
) -> Result<Json<RecordResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::delete_case_note(
        &mut persistence,
        kind,
        id,
        &actor,
    )?))
}

/// Restores a soft-deleted case note. Routed once per [`CaseNoteKind`].
pub async fn handle_restore_case_note(
    kind: CaseNoteKind,
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
) -> Result<Json<RecordResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::restore_case_note(
        &mut persistence,
        kind,
        id,
        &actor,
    )?))
}

// ========================================================================
// Housing department
// ========================================================================

/// Handler for GET `/repatriants/{id}/housing-department`.
pub async fn handle_list_department_records(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
) -> Result<Json<Vec<HousingDepartmentRecordData>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::list_housing_department_records(
        &mut persistence,
        id,
        &actor,
    )?))
}

/// Handler for POST `/repatriants/{id}/housing-department`.
pub async fn handle_create_department_record(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
    Json(req): Json<HousingDepartmentRequest>,
) -> Result<(StatusCode, Json<RecordResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RecordResponse =
        repatria_api::create_housing_department_record(&mut persistence, id, &req, &actor)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for PUT `/housing-department/{id}`.
pub async fn handle_update_department_record(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
    Json(req): Json<HousingDepartmentRequest>,
) -> Result<Json<RecordResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::update_housing_department_record(
        &mut persistence,
        id,
        &req,
        &actor,
    )?))
}

/// Handler for DELETE `/housing-department/{id}`.
pub async fn handle_delete_department_record(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
) -> Result<Json<RecordResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::delete_housing_department_record(
        &mut persistence,
        id,
        &actor,
    )?))
}

/// Handler for POST `/housing-department/{id}/restore`.
pub async fn handle_restore_department_record(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
) -> Result<Json<RecordResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::restore_housing_department_record(
        &mut persistence,
        id,
        &actor,
    )?))
}

// ========================================================================
// Housing queue
// ========================================================================

/// Handler for GET `/housing-queue`.
pub async fn handle_list_queue(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
) -> Result<Json<Vec<RankedQueueEntry>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::list_housing_queue(
        &mut persistence,
        &actor,
        now(),
    )?))
}

/// Handler for POST `/housing-queue`.
pub async fn handle_add_to_queue(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Json(req): Json<AddToQueueRequest>,
) -> Result<(StatusCode, Json<QueueEntryResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: QueueEntryResponse =
        repatria_api::add_to_queue(&mut persistence, &req, &actor, now())?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for PUT `/housing-queue/{id}`.
pub async fn handle_update_queue_entry(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
    Json(req): Json<UpdateQueueRequest>,
) -> Result<Json<QueueEntryResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::update_queue_entry(
        &mut persistence,
        id,
        &req,
        &actor,
        now(),
    )?))
}

/// Handler for DELETE `/housing-queue/{id}`.
pub async fn handle_remove_from_queue(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
) -> Result<Json<QueueEntryResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::remove_from_queue(
        &mut persistence,
        id,
        &actor,
        now(),
    )?))
}

// ========================================================================
// Files
// ========================================================================

/// Handler for POST `/uploads/{category}`.
pub async fn handle_upload(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(category): Path<String>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpError> {
    let (file_name, bytes) = read_upload(multipart).await?;
    Ok(Json(repatria_api::upload_file(
        &app_state.storage,
        &category,
        &file_name,
        &bytes,
        &actor,
    )?))
}

/// Handler for POST `/uploads/pdf-preview`.
pub async fn handle_pdf_preview(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpError> {
    let (file_name, bytes) = read_upload(multipart).await?;
    Ok(Json(repatria_api::upload_pdf_preview(
        &app_state.storage,
        &file_name,
        &bytes,
        &actor,
    )?))
}

/// Handler for GET `/files/{category}/{name}`.
pub async fn handle_serve_file(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path((category, name)): Path<(String, String)>,
) -> Result<Response, HttpError> {
    let path: PathBuf = repatria_api::resolve_file(&app_state.storage, &category, &name, &actor)?;
    let body: Vec<u8> = tokio::fs::read(&path).await.map_err(|e| {
        warn!(path = %path.display(), error = %e, "Failed to read stored file");
        HttpError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Failed to read file: {e}"),
        }
    })?;

    Ok((
        [(header::CONTENT_TYPE, HeaderValue::from_static(content_type_for(&path)))],
        body,
    )
        .into_response())
}

// ========================================================================
// Administration
// ========================================================================

/// Handler for GET `/admin/storage`.
pub async fn handle_storage_stats(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
) -> Result<Json<StorageStatsResponse>, HttpError> {
    Ok(Json(repatria_api::storage_stats(&app_state.storage, &actor)?))
}

/// Handler for GET `/admin/users`.
pub async fn handle_list_users(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
) -> Result<Json<Vec<UserInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::list_users(&mut persistence, &actor)?))
}

/// Handler for POST `/admin/users`.
pub async fn handle_create_user(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: CreateUserResponse = repatria_api::create_user(&mut persistence, &req, &actor)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for POST `/admin/users/{id}/toggle`.
pub async fn handle_toggle_user(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
) -> Result<Json<ToggleUserResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::toggle_user(&mut persistence, id, &actor)?))
}

/// Handler for DELETE `/admin/users/{id}`.
pub async fn handle_delete_user(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::delete_user(&mut persistence, id, &actor)?))
}

/// Handler for GET `/admin/logs`.
pub async fn handle_logs(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Query(params): Query<LogsParams>,
) -> Result<Json<LogsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::list_logs(&mut persistence, &params, &actor)?))
}

/// Handler for GET `/admin/reports/summary`.
pub async fn handle_report_summary(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
) -> Result<Json<SummaryReport>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::report_summary(
        &mut persistence,
        &actor,
        now().date(),
    )?))
}

/// Handler for GET `/admin/reports/repatriants`.
pub async fn handle_report_repatriants(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
) -> Result<Json<RepatriantsReport>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::report_repatriants(&mut persistence, &actor)?))
}

/// Handler for GET `/admin/reports/social`.
pub async fn handle_report_social(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
) -> Result<Json<SocialReport>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::report_social(&mut persistence, &actor)?))
}

/// Handler for GET `/admin/reports/user-activity`.
pub async fn handle_report_user_activity(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
) -> Result<Json<UserActivityReport>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::report_user_activity(
        &mut persistence,
        &actor,
    )?))
}

/// Handler for GET `/admin/reports/family`.
pub async fn handle_report_family(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
) -> Result<Json<FamilyReport>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(repatria_api::report_family(&mut persistence, &actor)?))
}

/// Handler for GET `/admin/export/{kind}`.
pub async fn handle_export(
    State(app_state): State<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(kind): Path<String>,
    Query(params): Query<ExportParams>,
) -> Result<Response, HttpError> {
    let kind: ExportKind = ExportKind::from_str(&kind)?;
    let format: ExportFormat =
        ExportFormat::from_str(params.format.as_deref().unwrap_or("csv"))?;

    let mut persistence = app_state.persistence.lock().await;
    let file: FileDownload = repatria_api::export(&mut persistence, kind, format, &actor, now())?;
    drop(persistence);

    info!(file = %file.file_name, username = %actor.username, "Export generated");
    attachment(file)
}
