// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every handler takes the persistence layer and the authenticated actor,
//! checks authorization first, normalizes input, and records an audit entry
//! after a successful write.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use repatria_audit::{Action, AuditEntry, actions};
use repatria_domain::{
    DomainError, QueueFactors, Role, SearchCriteria, SearchMode, check_status, format_date,
    non_blank, normalize_nationality, page_count, parse_amount, parse_date, parse_optional_date,
    resolve_nationality, status_expiry, to_upper,
};
use repatria_persistence::{
    DependentInput, EventRecordChanges, EventRecordData, Family, HousingDepartmentInput,
    HousingDepartmentRecordData, HousingDocument, HousingRecordChanges, HousingRecordData,
    LOG_PAGE_SIZE, LogEntryData, NewEventRecord, NewHousingRecord, NewOtherRecord,
    NewSocialHelpRecord, OtherRecordChanges, OtherRecordData, Persistence, PersistenceError,
    QueueEntryData, RankedQueueEntry, RepatriantChanges, RepatriantData, RepatriantFields,
    RepatriantSummary, SearchPage, SocialHelpRecordChanges, SocialHelpRecordData, UserData,
};
use time::{Date, OffsetDateTime};
use tracing::{info, warn};

use crate::auth::{AuthenticatedActor, AuthenticationService, AuthorizationService};
use crate::capabilities::{compute_capabilities, compute_user_capabilities};
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::export::{
    ExportFormat, ExportKind, FileDownload, export_families, export_logs, export_repatriants,
    export_stamp, export_users,
};
use crate::forms::{DOCX_CONTENT_TYPE, fill_template, form_values};
use crate::request_response::{
    AddToQueueRequest, CreateUserRequest, CreateUserResponse, DashboardResponse,
    EditRepatriantRequest, EventRequest, FamilyReport, FamilyResponse, HousingDepartmentRequest,
    HousingRecordRequest, HousingViewResponse, LargeFamily, LoginRequest, LoginResponse,
    LogsParams, LogsResponse, LookupParams, MessageResponse, OtherRecordRequest, QueueEntryResponse,
    RecordResponse, RegisterRepatriantRequest, RegisterRepatriantResponse, RepatriantDetailResponse,
    RepatriantForm, RepatriantHistoryResponse, RepatriantsReport, SearchParams, SearchResponse,
    SocialHelpRequest, SocialReport, SocialViewResponse, StatusResponse, StorageStatsResponse,
    SummaryReport, ToggleUserResponse, UpdateQueueRequest, UploadResponse, UserActivityReport,
    UserInfo, WhoAmIResponse,
};
use crate::storage::FileStorage;

/// The help type whose free-text companion is kept.
pub const CUSTOM_HELP_TYPE: &str = "другое";

/// How many recent logins the activity report lists.
const RECENT_LOGIN_LIMIT: i64 = 10;

// ========================================================================
// Shared helpers
// ========================================================================

/// Appends an audit entry attributed to `actor`.
fn record_audit(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    action_name: &str,
    details: String,
    repatriant_id: Option<i64>,
) -> Result<(), ApiError> {
    let entry: AuditEntry = AuditEntry::new(
        actor.to_audit_actor(),
        Action::new(action_name.to_string(), Some(details)),
        repatriant_id,
    );

    persistence
        .log_action(&entry)
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to record audit entry: {e}"),
        })?;

    Ok(())
}

/// Loads a repatriant or fails with `ResourceNotFound`.
fn require_repatriant(
    persistence: &mut Persistence,
    repatriant_id: i64,
) -> Result<RepatriantData, ApiError> {
    persistence
        .get_repatriant(repatriant_id)
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to load repatriant: {e}"),
        })?
        .ok_or_else(|| ApiError::not_found("Repatriant", repatriant_id))
}

/// Trimmed and uppercased; blank becomes `None`.
fn upper(value: Option<&str>) -> Option<String> {
    non_blank(value).map(|v| to_upper(&v))
}

/// A valid ISO date, reformatted; anything else becomes `None`.
fn date_field(value: Option<&str>) -> Option<String> {
    non_blank(value)
        .and_then(|v| parse_date(&v))
        .map(format_date)
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ApiError> {
    value.ok_or_else(|| translate_domain_error(DomainError::MissingField(field)))
}

fn clean_paths(paths: &[String]) -> Vec<String> {
    paths
        .iter()
        .filter_map(|p| non_blank(Some(p.as_str())))
        .collect()
}

fn is_custom_help_type(help_type: &str) -> bool {
    help_type.trim().to_lowercase() == CUSTOM_HELP_TYPE
}

/// Uppercases a dependent's text. Rows without a name or relationship are
/// dropped as empty form rows.
fn normalize_dependent(dependent: &DependentInput) -> Option<DependentInput> {
    let relationship: Option<String> = upper(dependent.relationship.as_deref());
    let full_name: Option<String> = upper(dependent.full_name.as_deref());
    if relationship.is_none() && full_name.is_none() {
        return None;
    }

    Some(DependentInput {
        relationship,
        full_name,
        birth_year: non_blank(dependent.birth_year.as_deref()),
        birthplace: upper(dependent.birthplace.as_deref()),
        citizenship: upper(dependent.citizenship.as_deref()),
        nationality: non_blank(dependent.nationality.as_deref())
            .map(|n| to_upper(&normalize_nationality(&n))),
        address: upper(dependent.address.as_deref()),
        lives_with_parent: dependent.lives_with_parent,
    })
}

fn normalize_dependents<'a, I>(dependents: I) -> Vec<DependentInput>
where
    I: IntoIterator<Item = &'a DependentInput>,
{
    dependents
        .into_iter()
        .filter_map(normalize_dependent)
        .collect()
}

fn form_nationality(form: &RepatriantForm) -> Option<String> {
    resolve_nationality(form.nationality.as_deref(), form.nationality_other.as_deref())
        .map(|n| to_upper(&n))
}

/// Builds the columns of a new repatriant. Registration defaults to `today`.
fn form_to_fields(form: &RepatriantForm, today: Date) -> RepatriantFields {
    RepatriantFields {
        file_code: upper(form.file_code.as_deref()),
        birth_surname: upper(form.birth_surname.as_deref()),
        surname: upper(form.surname.as_deref()),
        given_name: upper(form.given_name.as_deref()),
        patronymic: upper(form.patronymic.as_deref()),
        country_of_residence: upper(form.country_of_residence.as_deref()),
        arrived_from: upper(form.arrived_from.as_deref()),
        commission_decision: form.commission_decision.unwrap_or(false),
        birth_date: date_field(form.birth_date.as_deref()),
        sex: upper(form.sex.as_deref()),
        birthplace: upper(form.birthplace.as_deref()),
        family_status: upper(form.family_status.as_deref()),
        status_granted_on: date_field(form.status_granted_on.as_deref()),
        registered_on: date_field(form.registered_on.as_deref())
            .or_else(|| Some(format_date(today))),
        additional_info: upper(form.additional_info.as_deref()),
        avatar_path: non_blank(form.avatar_path.as_deref()),
        documents_path: non_blank(form.documents_path.as_deref()),
        identity_document: upper(form.identity_document.as_deref()),
        identity_document_number: upper(form.identity_document_number.as_deref()),
        address: upper(form.address.as_deref()),
        phone: upper(form.phone.as_deref()),
        email: non_blank(form.email.as_deref()),
        nationality: form_nationality(form),
    }
}

/// Builds a partial update; blank or malformed values keep the stored value.
fn form_to_changes(form: &RepatriantForm) -> RepatriantChanges {
    RepatriantChanges {
        file_code: upper(form.file_code.as_deref()),
        birth_surname: upper(form.birth_surname.as_deref()),
        surname: upper(form.surname.as_deref()),
        given_name: upper(form.given_name.as_deref()),
        patronymic: upper(form.patronymic.as_deref()),
        country_of_residence: upper(form.country_of_residence.as_deref()),
        arrived_from: upper(form.arrived_from.as_deref()),
        commission_decision: form.commission_decision,
        birth_date: date_field(form.birth_date.as_deref()),
        sex: upper(form.sex.as_deref()),
        birthplace: upper(form.birthplace.as_deref()),
        family_status: upper(form.family_status.as_deref()),
        status_granted_on: date_field(form.status_granted_on.as_deref()),
        registered_on: date_field(form.registered_on.as_deref()),
        additional_info: upper(form.additional_info.as_deref()),
        avatar_path: non_blank(form.avatar_path.as_deref()),
        documents_path: non_blank(form.documents_path.as_deref()),
        identity_document: upper(form.identity_document.as_deref()),
        identity_document_number: upper(form.identity_document_number.as_deref()),
        address: upper(form.address.as_deref()),
        phone: upper(form.phone.as_deref()),
        email: non_blank(form.email.as_deref()),
        nationality: form_nationality(form),
    }
}

// ========================================================================
// Authentication
// ========================================================================

/// Authenticates an operator and opens a session.
///
/// # Errors
///
/// Returns an error if the credentials are wrong, the account is disabled,
/// or database operations fail.
pub fn login(
    persistence: &mut Persistence,
    request: &LoginRequest,
    now: OffsetDateTime,
) -> Result<LoginResponse, ApiError> {
    let (session_token, actor, session) =
        AuthenticationService::login(persistence, &request.username, &request.password, now)?;

    record_audit(
        persistence,
        &actor,
        actions::LOGIN,
        String::from("Logged in"),
        None,
    )?;

    Ok(LoginResponse {
        session_token,
        user_id: actor.user_id,
        username: actor.username,
        full_name: actor.full_name,
        role: actor.role,
        expires_at: session.expires_at,
    })
}

/// Logs out by deleting the session.
///
/// # Errors
///
/// Returns an error if the logout fails.
pub fn logout(
    persistence: &mut Persistence,
    session_token: &str,
    actor: &AuthenticatedActor,
) -> Result<MessageResponse, ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    record_audit(
        persistence,
        actor,
        actions::LOGOUT,
        String::from("Logged out"),
        None,
    )?;
    Ok(MessageResponse::ok("Logged out"))
}

/// Returns the current operator with capabilities.
#[must_use]
pub fn whoami(actor: &AuthenticatedActor) -> WhoAmIResponse {
    WhoAmIResponse {
        user_id: actor.user_id,
        username: actor.username.clone(),
        full_name: actor.full_name.clone(),
        role: actor.role,
        capabilities: compute_capabilities(actor),
    }
}

/// Creates the first admin when no users exist.
///
/// Returns the new user's ID, or `None` when users already exist.
///
/// # Errors
///
/// Returns an error if database operations fail.
pub fn bootstrap_admin(
    persistence: &mut Persistence,
    username: &str,
    password: &str,
    full_name: &str,
) -> Result<Option<i64>, ApiError> {
    let existing: i64 = persistence
        .count_users()
        .map_err(|e| translate_persistence_error(e, "User"))?;
    if existing > 0 {
        return Ok(None);
    }

    let user_id: i64 = persistence
        .create_user(username.trim(), password, &to_upper(full_name.trim()), Role::Admin, None)
        .map_err(|e| translate_persistence_error(e, "User"))?;

    info!(user_id, username, "Created bootstrap admin");
    Ok(Some(user_id))
}

/// Headline figures for the landing page.
///
/// # Errors
///
/// Returns an error if database queries fail.
pub fn dashboard(
    persistence: &mut Persistence,
    _actor: &AuthenticatedActor,
    today: Date,
) -> Result<DashboardResponse, ApiError> {
    let today_text: String = format_date(today);
    let total_repatriants: i64 = persistence
        .count_repatriants()
        .map_err(|e| translate_persistence_error(e, "Repatriant"))?;
    let registered_today: i64 = persistence
        .count_registered_on(&today_text)
        .map_err(|e| translate_persistence_error(e, "Repatriant"))?;

    Ok(DashboardResponse {
        total_repatriants,
        registered_today,
        today: today_text,
    })
}

// ========================================================================
// Repatriants
// ========================================================================

/// Runs the advanced or quick search and returns one page.
///
/// # Errors
///
/// Returns an error if database queries fail.
pub fn search_repatriants(
    persistence: &mut Persistence,
    params: &SearchParams,
    actor: &AuthenticatedActor,
    current_year: i32,
) -> Result<SearchResponse, ApiError> {
    let criteria: SearchCriteria = params.criteria().for_role(actor.role);
    let mode: SearchMode = SearchMode::select(criteria, params.query());

    let result: SearchPage = persistence
        .search_repatriants(&mode, actor.role, params.page(), current_year)
        .map_err(|e| translate_persistence_error(e, "Repatriant"))?;

    let housing_records: Option<HashMap<i64, HousingDepartmentRecordData>> =
        if actor.role.can_view_housing() {
            let ids: Vec<i64> = result.rows.iter().map(|r| r.repatriant_id).collect();
            Some(
                persistence
                    .latest_housing_department_records(&ids)
                    .map_err(|e| translate_persistence_error(e, "Housing department record"))?,
            )
        } else {
            None
        };

    Ok(SearchResponse {
        rows: result.rows,
        page: result.page,
        total: result.total,
        pages: result.pages,
        housing_records,
    })
}

/// Picker lookup by name or file code.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn lookup_repatriants(
    persistence: &mut Persistence,
    params: &LookupParams,
    _actor: &AuthenticatedActor,
) -> Result<Vec<RepatriantSummary>, ApiError> {
    let Some(query) = non_blank(params.q.as_deref()) else {
        return Ok(Vec::new());
    };

    persistence
        .lookup_repatriants(&query)
        .map_err(|e| translate_persistence_error(e, "Repatriant"))
}

/// Registers a repatriant with dependents.
///
/// A PDF preview, when given, is moved onto a storage disk as the
/// repatriant's document. A failed move is logged and does not undo the
/// registration.
///
/// # Errors
///
/// Returns an error if:
/// - The actor's role may not register repatriants
/// - The surname is missing
/// - Database operations fail
pub fn register_repatriant(
    persistence: &mut Persistence,
    storage: &FileStorage,
    request: &RegisterRepatriantRequest,
    actor: &AuthenticatedActor,
    today: Date,
) -> Result<RegisterRepatriantResponse, ApiError> {
    AuthorizationService::authorize_register_repatriant(actor)?;

    let fields: RepatriantFields = form_to_fields(&request.form, today);
    if fields.surname.is_none() {
        return Err(translate_domain_error(DomainError::MissingField("surname")));
    }

    let dependents: Vec<DependentInput> =
        normalize_dependents(request.children.iter().chain(&request.family_members));

    let repatriant_id: i64 = persistence
        .register_repatriant(&fields, &dependents)
        .map_err(|e| translate_persistence_error(e, "Repatriant"))?;

    if let Some(preview) = non_blank(request.form.pdf_preview_path.as_deref()) {
        adopt_preview(persistence, storage, repatriant_id, &preview)?;
    }

    let full_name: String = [&fields.surname, &fields.given_name, &fields.patronymic]
        .into_iter()
        .flatten()
        .cloned()
        .collect::<Vec<String>>()
        .join(" ");

    record_audit(
        persistence,
        actor,
        actions::REGISTER_REPATRIANT,
        format!("Registered repatriant {full_name}"),
        Some(repatriant_id),
    )?;

    Ok(RegisterRepatriantResponse {
        repatriant_id,
        message: format!("Repatriant {full_name} registered"),
    })
}

/// Moves a temp preview into documents and stores the new path.
fn adopt_preview(
    persistence: &mut Persistence,
    storage: &FileStorage,
    repatriant_id: i64,
    preview: &str,
) -> Result<Option<String>, ApiError> {
    match storage.promote_preview(preview, repatriant_id) {
        Ok(documents_path) => {
            let changes: RepatriantChanges = RepatriantChanges {
                documents_path: Some(documents_path.clone()),
                ..RepatriantChanges::default()
            };
            persistence
                .update_repatriant(repatriant_id, &changes, None)
                .map_err(|e| translate_persistence_error(e, "Repatriant"))?;
            Ok(Some(documents_path))
        }
        Err(e) => {
            warn!(repatriant_id, preview, error = %e, "Failed to adopt PDF preview");
            Ok(None)
        }
    }
}

/// A repatriant with dependents and status.
///
/// # Errors
///
/// Returns an error if the repatriant does not exist or a query fails.
pub fn get_repatriant(
    persistence: &mut Persistence,
    repatriant_id: i64,
    _actor: &AuthenticatedActor,
    today: Date,
) -> Result<RepatriantDetailResponse, ApiError> {
    let repatriant: RepatriantData = require_repatriant(persistence, repatriant_id)?;
    let family: Family = persistence
        .get_family(repatriant_id)
        .map_err(|e| translate_persistence_error(e, "Repatriant"))?;
    let status: StatusResponse = status_of(&repatriant, today);

    Ok(RepatriantDetailResponse {
        full_name: repatriant.full_name(),
        repatriant,
        children: family.children,
        family_members: family.family_members,
        status,
    })
}

fn status_of(repatriant: &RepatriantData, today: Date) -> StatusResponse {
    let granted: Option<Date> = parse_optional_date(repatriant.status_granted_on.as_deref());
    StatusResponse {
        repatriant_id: repatriant.repatriant_id,
        status_granted_on: repatriant.status_granted_on.clone(),
        expires_on: granted.and_then(status_expiry).map(format_date),
        check: check_status(granted, today),
    }
}

/// Edits a repatriant.
///
/// Absent fields keep their value. Either dependent list replaces the
/// stored dependents. Replacing the avatar or document deletes the old file.
///
/// # Errors
///
/// Returns an error if:
/// - The actor's role may not edit repatriants
/// - The repatriant does not exist
/// - Database operations fail
pub fn edit_repatriant(
    persistence: &mut Persistence,
    storage: &FileStorage,
    repatriant_id: i64,
    request: &EditRepatriantRequest,
    actor: &AuthenticatedActor,
) -> Result<MessageResponse, ApiError> {
    AuthorizationService::authorize_register_repatriant(actor)?;

    let existing: RepatriantData = require_repatriant(persistence, repatriant_id)?;
    let changes: RepatriantChanges = form_to_changes(&request.form);

    let dependents: Option<Vec<DependentInput>> =
        if request.children.is_some() || request.family_members.is_some() {
            Some(normalize_dependents(
                request
                    .children
                    .iter()
                    .flatten()
                    .chain(request.family_members.iter().flatten()),
            ))
        } else {
            None
        };

    persistence
        .update_repatriant(repatriant_id, &changes, dependents.as_deref())
        .map_err(|e| translate_persistence_error(e, "Repatriant"))?;

    let mut replaced_document: Option<String> = changes.documents_path.clone();
    if let Some(preview) = non_blank(request.form.pdf_preview_path.as_deref())
        && let Some(adopted) = adopt_preview(persistence, storage, repatriant_id, &preview)?
        && let Some(uploaded) = replaced_document.replace(adopted)
    {
        storage.delete(&uploaded);
    }

    for (old, new) in [
        (&existing.avatar_path, &changes.avatar_path),
        (&existing.documents_path, &replaced_document),
    ] {
        if let (Some(old), Some(new)) = (old, new)
            && old != new
        {
            storage.delete(old);
        }
    }

    if dependents.is_some() {
        record_audit(
            persistence,
            actor,
            actions::REPLACE_FAMILY,
            format!("Replaced family of repatriant {repatriant_id}"),
            Some(repatriant_id),
        )?;
    }

    record_audit(
        persistence,
        actor,
        actions::EDIT_REPATRIANT,
        format!("Edited repatriant {}", existing.full_name()),
        Some(repatriant_id),
    )?;

    Ok(MessageResponse::ok("Repatriant updated"))
}

/// Deletes a repatriant with dependents and every owned row.
///
/// # Errors
///
/// Returns an error if the actor's role may not edit repatriants, the
/// repatriant does not exist, or the delete fails.
pub fn delete_repatriant(
    persistence: &mut Persistence,
    repatriant_id: i64,
    actor: &AuthenticatedActor,
) -> Result<MessageResponse, ApiError> {
    AuthorizationService::authorize_register_repatriant(actor)?;

    let existing: RepatriantData = require_repatriant(persistence, repatriant_id)?;
    persistence
        .delete_repatriant(repatriant_id)
        .map_err(|e| translate_persistence_error(e, "Repatriant"))?;

    record_audit(
        persistence,
        actor,
        actions::DELETE_REPATRIANT,
        format!("Deleted repatriant {}", existing.full_name()),
        Some(repatriant_id),
    )?;

    Ok(MessageResponse::ok("Repatriant deleted"))
}

/// # Errors
///
/// Returns an error if the repatriant does not exist or a query fails.
pub fn get_family(
    persistence: &mut Persistence,
    repatriant_id: i64,
    _actor: &AuthenticatedActor,
) -> Result<FamilyResponse, ApiError> {
    require_repatriant(persistence, repatriant_id)?;
    let family: Family = persistence
        .get_family(repatriant_id)
        .map_err(|e| translate_persistence_error(e, "Repatriant"))?;

    Ok(FamilyResponse {
        repatriant_id,
        children: family.children,
        family_members: family.family_members,
    })
}

/// Checks whether the repatriant's status has expired.
///
/// # Errors
///
/// Returns an error if the repatriant does not exist.
pub fn check_repatriant_status(
    persistence: &mut Persistence,
    repatriant_id: i64,
    _actor: &AuthenticatedActor,
    today: Date,
) -> Result<StatusResponse, ApiError> {
    let repatriant: RepatriantData = require_repatriant(persistence, repatriant_id)?;
    Ok(status_of(&repatriant, today))
}

/// The social adaptation view: every case note of a repatriant.
///
/// # Errors
///
/// Returns an error if the actor may not use the social view, the
/// repatriant does not exist, or a query fails.
pub fn social_view(
    persistence: &mut Persistence,
    repatriant_id: i64,
    actor: &AuthenticatedActor,
) -> Result<SocialViewResponse, ApiError> {
    AuthorizationService::authorize_social(actor, "social_view")?;

    let repatriant: RepatriantData = require_repatriant(persistence, repatriant_id)?;
    let include_deleted: bool = actor.role.sees_deleted_records();
    let map = |e: PersistenceError| translate_persistence_error(e, "Case note");

    Ok(SocialViewResponse {
        full_name: repatriant.full_name(),
        repatriant,
        housing_records: persistence
            .list_housing_records(repatriant_id, include_deleted)
            .map_err(map)?,
        social_help_records: persistence
            .list_social_help_records(repatriant_id, include_deleted)
            .map_err(map)?,
        event_records: persistence
            .list_event_records(repatriant_id, include_deleted)
            .map_err(map)?,
        other_records: persistence
            .list_other_records(repatriant_id, include_deleted)
            .map_err(map)?,
    })
}

/// The housing department view of a repatriant.
///
/// # Errors
///
/// Returns an error if the actor may not use the housing view, the
/// repatriant does not exist, or a query fails.
pub fn housing_view(
    persistence: &mut Persistence,
    repatriant_id: i64,
    actor: &AuthenticatedActor,
) -> Result<HousingViewResponse, ApiError> {
    AuthorizationService::authorize_housing(actor, "housing_view")?;

    let repatriant: RepatriantData = require_repatriant(persistence, repatriant_id)?;
    let family: Family = persistence
        .get_family(repatriant_id)
        .map_err(|e| translate_persistence_error(e, "Repatriant"))?;
    let records: Vec<HousingDepartmentRecordData> = persistence
        .list_housing_department_records(repatriant_id, actor.role.sees_deleted_records())
        .map_err(|e| translate_persistence_error(e, "Housing department record"))?;
    let queue_entry: Option<QueueEntryData> = persistence
        .active_queue_entry_for(repatriant_id)
        .map_err(|e| translate_persistence_error(e, "Queue entry"))?;

    Ok(HousingViewResponse {
        full_name: repatriant.full_name(),
        repatriant,
        children: family.children,
        family_members: family.family_members,
        records,
        queue_entry,
    })
}

/// The audit history of a repatriant, newest first.
///
/// History outlives the repatriant, so a deleted ID still answers.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the query fails.
pub fn repatriant_history(
    persistence: &mut Persistence,
    repatriant_id: i64,
    actor: &AuthenticatedActor,
) -> Result<RepatriantHistoryResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "repatriant_history")?;

    let entries: Vec<LogEntryData> = persistence
        .logs_for_repatriant(repatriant_id)
        .map_err(|e| translate_persistence_error(e, "Log"))?;

    Ok(RepatriantHistoryResponse {
        repatriant_id,
        entries,
    })
}

/// Fills the application form template for a repatriant.
///
/// # Errors
///
/// Returns an error if the repatriant does not exist, the template cannot be
/// read, or it is not a valid document.
pub fn generate_form(
    persistence: &mut Persistence,
    template: &Path,
    repatriant_id: i64,
    actor: &AuthenticatedActor,
) -> Result<FileDownload, ApiError> {
    let repatriant: RepatriantData = require_repatriant(persistence, repatriant_id)?;
    let family: Family = persistence
        .get_family(repatriant_id)
        .map_err(|e| translate_persistence_error(e, "Repatriant"))?;

    let file: File = File::open(template).map_err(|e| ApiError::Internal {
        message: format!("Failed to open form template {}: {e}", template.display()),
    })?;
    let body: Vec<u8> = fill_template(file, &form_values(&repatriant, &family))?;

    record_audit(
        persistence,
        actor,
        actions::GENERATE_FORM,
        format!("Generated form for {}", repatriant.full_name()),
        Some(repatriant_id),
    )?;

    Ok(FileDownload {
        file_name: format!("form_{repatriant_id}.docx"),
        content_type: DOCX_CONTENT_TYPE,
        body,
    })
}

// ========================================================================
// Case notes
// ========================================================================

/// The four soft-deletable case-note kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseNoteKind {
    HousingRecord,
    SocialHelp,
    Event,
    Other,
}

impl CaseNoteKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::HousingRecord => "housing record",
            Self::SocialHelp => "social help record",
            Self::Event => "event record",
            Self::Other => "other record",
        }
    }

    const fn resource_type(self) -> &'static str {
        match self {
            Self::HousingRecord => "Housing record",
            Self::SocialHelp => "Social help record",
            Self::Event => "Event record",
            Self::Other => "Other record",
        }
    }
}

/// Audits a case-note write and builds the response.
fn case_note_written(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    kind: CaseNoteKind,
    action_name: &str,
    verb: &str,
    record_id: i64,
    repatriant_id: i64,
) -> Result<RecordResponse, ApiError> {
    record_audit(
        persistence,
        actor,
        action_name,
        format!("{verb} {} {record_id}", kind.label()),
        Some(repatriant_id),
    )?;

    Ok(RecordResponse {
        record_id,
        repatriant_id,
        message: format!("{} {record_id} {}", kind.resource_type(), verb.to_lowercase()),
    })
}

/// # Errors
///
/// Returns an error if the actor may not use case notes, the repatriant does
/// not exist, or the query fails.
pub fn list_housing_records(
    persistence: &mut Persistence,
    repatriant_id: i64,
    actor: &AuthenticatedActor,
) -> Result<Vec<HousingRecordData>, ApiError> {
    AuthorizationService::authorize_social(actor, "list_housing_records")?;
    require_repatriant(persistence, repatriant_id)?;
    persistence
        .list_housing_records(repatriant_id, actor.role.sees_deleted_records())
        .map_err(|e| translate_persistence_error(e, "Housing record"))
}

/// # Errors
///
/// Returns an error if the actor may not use case notes, a required field is
/// missing, or the repatriant does not exist.
pub fn create_housing_record(
    persistence: &mut Persistence,
    repatriant_id: i64,
    request: &HousingRecordRequest,
    actor: &AuthenticatedActor,
) -> Result<RecordResponse, ApiError> {
    AuthorizationService::authorize_social(actor, "create_housing_record")?;

    let record: NewHousingRecord = NewHousingRecord {
        contract_number: upper(request.contract_number.as_deref()),
        address: required(upper(request.address.as_deref()), "address")?,
        start_date: required(date_field(request.start_date.as_deref()), "start_date")?,
        end_date: date_field(request.end_date.as_deref()),
        cost: parse_amount(request.cost.as_deref()),
        documents: clean_paths(request.documents.as_deref().unwrap_or_default()),
        notes: upper(request.notes.as_deref()),
    };

    let record_id: i64 = persistence
        .create_housing_record(repatriant_id, &record, actor.user_id)
        .map_err(|e| translate_persistence_error(e, "Repatriant"))?;

    case_note_written(
        persistence,
        actor,
        CaseNoteKind::HousingRecord,
        actions::CREATE_CASE_NOTE,
        "Created",
        record_id,
        repatriant_id,
    )
}

/// # Errors
///
/// Returns an error if the actor may not use case notes or there is no
/// active record with the ID.
pub fn update_housing_record(
    persistence: &mut Persistence,
    record_id: i64,
    request: &HousingRecordRequest,
    actor: &AuthenticatedActor,
) -> Result<RecordResponse, ApiError> {
    AuthorizationService::authorize_social(actor, "update_housing_record")?;

    let changes: HousingRecordChanges = HousingRecordChanges {
        contract_number: upper(request.contract_number.as_deref()),
        address: upper(request.address.as_deref()),
        start_date: date_field(request.start_date.as_deref()),
        end_date: date_field(request.end_date.as_deref()),
        cost: parse_amount(request.cost.as_deref()),
        documents: request.documents.as_deref().map(clean_paths),
        notes: upper(request.notes.as_deref()),
    };

    let repatriant_id: i64 = persistence
        .update_housing_record(record_id, &changes)
        .map_err(|e| translate_persistence_error(e, "Housing record"))?;

    case_note_written(
        persistence,
        actor,
        CaseNoteKind::HousingRecord,
        actions::UPDATE_CASE_NOTE,
        "Updated",
        record_id,
        repatriant_id,
    )
}

/// # Errors
///
/// Returns an error if the actor may not use case notes, the repatriant does
/// not exist, or the query fails.
pub fn list_social_help_records(
    persistence: &mut Persistence,
    repatriant_id: i64,
    actor: &AuthenticatedActor,
) -> Result<Vec<SocialHelpRecordData>, ApiError> {
    AuthorizationService::authorize_social(actor, "list_social_help_records")?;
    require_repatriant(persistence, repatriant_id)?;
    persistence
        .list_social_help_records(repatriant_id, actor.role.sees_deleted_records())
        .map_err(|e| translate_persistence_error(e, "Social help record"))
}

/// The custom help type survives only next to the custom help type value.
fn custom_help_type(help_type: &str, custom: Option<&str>) -> Option<String> {
    if is_custom_help_type(help_type) {
        upper(custom)
    } else {
        None
    }
}

/// # Errors
///
/// Returns an error if the actor may not use case notes, a required field is
/// missing, or the repatriant does not exist.
pub fn create_social_help_record(
    persistence: &mut Persistence,
    repatriant_id: i64,
    request: &SocialHelpRequest,
    actor: &AuthenticatedActor,
) -> Result<RecordResponse, ApiError> {
    AuthorizationService::authorize_social(actor, "create_social_help_record")?;

    let help_type: String = required(non_blank(request.help_type.as_deref()), "help_type")?;
    let record: NewSocialHelpRecord = NewSocialHelpRecord {
        custom_help_type: custom_help_type(&help_type, request.custom_help_type.as_deref()),
        help_type: to_upper(&help_type),
        responsible: upper(request.responsible.as_deref()),
        help_date: required(date_field(request.help_date.as_deref()), "help_date")?,
        amount: upper(request.amount.as_deref()),
        documents: clean_paths(request.documents.as_deref().unwrap_or_default()),
        description: upper(request.description.as_deref()),
    };

    let record_id: i64 = persistence
        .create_social_help_record(repatriant_id, &record, actor.user_id)
        .map_err(|e| translate_persistence_error(e, "Repatriant"))?;

    case_note_written(
        persistence,
        actor,
        CaseNoteKind::SocialHelp,
        actions::CREATE_CASE_NOTE,
        "Created",
        record_id,
        repatriant_id,
    )
}

/// Changing the help type away from the custom value clears the custom
/// help type.
///
/// # Errors
///
/// Returns an error if the actor may not use case notes or there is no
/// active record with the ID.
pub fn update_social_help_record(
    persistence: &mut Persistence,
    record_id: i64,
    request: &SocialHelpRequest,
    actor: &AuthenticatedActor,
) -> Result<RecordResponse, ApiError> {
    AuthorizationService::authorize_social(actor, "update_social_help_record")?;

    let help_type: Option<String> = non_blank(request.help_type.as_deref());
    let custom: Option<String> = match &help_type {
        Some(help_type) => Some(
            custom_help_type(help_type, request.custom_help_type.as_deref()).unwrap_or_default(),
        ),
        None => upper(request.custom_help_type.as_deref()),
    };

    let changes: SocialHelpRecordChanges = SocialHelpRecordChanges {
        help_type: help_type.map(|h| to_upper(&h)),
        custom_help_type: custom,
        responsible: upper(request.responsible.as_deref()),
        help_date: date_field(request.help_date.as_deref()),
        amount: upper(request.amount.as_deref()),
        documents: request.documents.as_deref().map(clean_paths),
        description: upper(request.description.as_deref()),
    };

    let repatriant_id: i64 = persistence
        .update_social_help_record(record_id, &changes)
        .map_err(|e| translate_persistence_error(e, "Social help record"))?;

    case_note_written(
        persistence,
        actor,
        CaseNoteKind::SocialHelp,
        actions::UPDATE_CASE_NOTE,
        "Updated",
        record_id,
        repatriant_id,
    )
}

/// # Errors
///
/// Returns an error if the actor may not use case notes, the repatriant does
/// not exist, or the query fails.
pub fn list_event_records(
    persistence: &mut Persistence,
    repatriant_id: i64,
    actor: &AuthenticatedActor,
) -> Result<Vec<EventRecordData>, ApiError> {
    AuthorizationService::authorize_social(actor, "list_event_records")?;
    require_repatriant(persistence, repatriant_id)?;
    persistence
        .list_event_records(repatriant_id, actor.role.sees_deleted_records())
        .map_err(|e| translate_persistence_error(e, "Event record"))
}

/// # Errors
///
/// Returns an error if the actor may not use case notes, a required field is
/// missing, or the repatriant does not exist.
pub fn create_event_record(
    persistence: &mut Persistence,
    repatriant_id: i64,
    request: &EventRequest,
    actor: &AuthenticatedActor,
) -> Result<RecordResponse, ApiError> {
    AuthorizationService::authorize_social(actor, "create_event_record")?;

    let record: NewEventRecord = NewEventRecord {
        event_name: required(upper(request.event_name.as_deref()), "event_name")?,
        event_start_date: required(
            date_field(request.event_start_date.as_deref()),
            "event_start_date",
        )?,
        event_end_date: date_field(request.event_end_date.as_deref()),
        event_location: upper(request.event_location.as_deref()),
        event_type: upper(request.event_type.as_deref()),
        event_amount: parse_amount(request.event_amount.as_deref()),
        description: upper(request.description.as_deref()),
    };

    let record_id: i64 = persistence
        .create_event_record(repatriant_id, &record, actor.user_id)
        .map_err(|e| translate_persistence_error(e, "Repatriant"))?;

    case_note_written(
        persistence,
        actor,
        CaseNoteKind::Event,
        actions::CREATE_CASE_NOTE,
        "Created",
        record_id,
        repatriant_id,
    )
}

/// # Errors
///
/// Returns an error if the actor may not use case notes or there is no
/// active record with the ID.
pub fn update_event_record(
    persistence: &mut Persistence,
    record_id: i64,
    request: &EventRequest,
    actor: &AuthenticatedActor,
) -> Result<RecordResponse, ApiError> {
    AuthorizationService::authorize_social(actor, "update_event_record")?;

    let changes: EventRecordChanges = EventRecordChanges {
        event_name: upper(request.event_name.as_deref()),
        event_start_date: date_field(request.event_start_date.as_deref()),
        event_end_date: date_field(request.event_end_date.as_deref()),
        event_location: upper(request.event_location.as_deref()),
        event_type: upper(request.event_type.as_deref()),
        event_amount: parse_amount(request.event_amount.as_deref()),
        description: upper(request.description.as_deref()),
    };

    let repatriant_id: i64 = persistence
        .update_event_record(record_id, &changes)
        .map_err(|e| translate_persistence_error(e, "Event record"))?;

    case_note_written(
        persistence,
        actor,
        CaseNoteKind::Event,
        actions::UPDATE_CASE_NOTE,
        "Updated",
        record_id,
        repatriant_id,
    )
}

/// # Errors
///
/// Returns an error if the actor may not use case notes, the repatriant does
/// not exist, or the query fails.
pub fn list_other_records(
    persistence: &mut Persistence,
    repatriant_id: i64,
    actor: &AuthenticatedActor,
) -> Result<Vec<OtherRecordData>, ApiError> {
    AuthorizationService::authorize_social(actor, "list_other_records")?;
    require_repatriant(persistence, repatriant_id)?;
    persistence
        .list_other_records(repatriant_id, actor.role.sees_deleted_records())
        .map_err(|e| translate_persistence_error(e, "Other record"))
}

/// # Errors
///
/// Returns an error if the actor may not use case notes, a required field is
/// missing, or the repatriant does not exist.
pub fn create_other_record(
    persistence: &mut Persistence,
    repatriant_id: i64,
    request: &OtherRecordRequest,
    actor: &AuthenticatedActor,
) -> Result<RecordResponse, ApiError> {
    AuthorizationService::authorize_social(actor, "create_other_record")?;

    let record: NewOtherRecord = NewOtherRecord {
        title: required(upper(request.title.as_deref()), "title")?,
        record_date: required(date_field(request.record_date.as_deref()), "record_date")?,
        category: upper(request.category.as_deref()),
        content: required(upper(request.content.as_deref()), "content")?,
    };

    let record_id: i64 = persistence
        .create_other_record(repatriant_id, &record, actor.user_id)
        .map_err(|e| translate_persistence_error(e, "Repatriant"))?;

    case_note_written(
        persistence,
        actor,
        CaseNoteKind::Other,
        actions::CREATE_CASE_NOTE,
        "Created",
        record_id,
        repatriant_id,
    )
}

/// # Errors
///
/// Returns an error if the actor may not use case notes or there is no
/// active record with the ID.
pub fn update_other_record(
    persistence: &mut Persistence,
    record_id: i64,
    request: &OtherRecordRequest,
    actor: &AuthenticatedActor,
) -> Result<RecordResponse, ApiError> {
    AuthorizationService::authorize_social(actor, "update_other_record")?;

    let changes: OtherRecordChanges = OtherRecordChanges {
        title: upper(request.title.as_deref()),
        record_date: date_field(request.record_date.as_deref()),
        category: upper(request.category.as_deref()),
        content: upper(request.content.as_deref()),
    };

    let repatriant_id: i64 = persistence
        .update_other_record(record_id, &changes)
        .map_err(|e| translate_persistence_error(e, "Other record"))?;

    case_note_written(
        persistence,
        actor,
        CaseNoteKind::Other,
        actions::UPDATE_CASE_NOTE,
        "Updated",
        record_id,
        repatriant_id,
    )
}

/// Soft-deletes a case note.
///
/// # Errors
///
/// Returns an error if the actor may not use case notes or there is no
/// active record with the ID.
pub fn delete_case_note(
    persistence: &mut Persistence,
    kind: CaseNoteKind,
    record_id: i64,
    actor: &AuthenticatedActor,
) -> Result<RecordResponse, ApiError> {
    AuthorizationService::authorize_social(actor, "delete_case_note")?;

    let result: Result<i64, PersistenceError> = match kind {
        CaseNoteKind::HousingRecord => persistence.soft_delete_housing_record(record_id, actor.user_id),
        CaseNoteKind::SocialHelp => {
            persistence.soft_delete_social_help_record(record_id, actor.user_id)
        }
        CaseNoteKind::Event => persistence.soft_delete_event_record(record_id, actor.user_id),
        CaseNoteKind::Other => persistence.soft_delete_other_record(record_id, actor.user_id),
    };
    let repatriant_id: i64 = result.map_err(|e| translate_persistence_error(e, kind.resource_type()))?;

    case_note_written(
        persistence,
        actor,
        kind,
        actions::DELETE_CASE_NOTE,
        "Deleted",
        record_id,
        repatriant_id,
    )
}

/// Restores a soft-deleted case note. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or there is no deleted
/// record with the ID.
pub fn restore_case_note(
    persistence: &mut Persistence,
    kind: CaseNoteKind,
    record_id: i64,
    actor: &AuthenticatedActor,
) -> Result<RecordResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "restore_case_note")?;

    let result: Result<i64, PersistenceError> = match kind {
        CaseNoteKind::HousingRecord => persistence.restore_housing_record(record_id),
        CaseNoteKind::SocialHelp => persistence.restore_social_help_record(record_id),
        CaseNoteKind::Event => persistence.restore_event_record(record_id),
        CaseNoteKind::Other => persistence.restore_other_record(record_id),
    };
    let repatriant_id: i64 = result.map_err(|e| translate_persistence_error(e, kind.resource_type()))?;

    case_note_written(
        persistence,
        actor,
        kind,
        actions::RESTORE_CASE_NOTE,
        "Restored",
        record_id,
        repatriant_id,
    )
}

// ========================================================================
// Housing department
// ========================================================================

/// Normalizes a department record. Notes keep their case.
fn department_input(request: &HousingDepartmentRequest) -> HousingDepartmentInput {
    HousingDepartmentInput {
        category: upper(request.category.as_deref()),
        received_housing: request.received_housing,
        housing_type: upper(request.housing_type.as_deref()),
        housing_acquisition: upper(request.housing_acquisition.as_deref()),
        address: upper(request.address.as_deref()),
        has_warrant: request.has_warrant,
        repair_amount: parse_amount(request.repair_amount.as_deref()),
        documents: request.documents.as_ref().map(|documents| {
            documents
                .iter()
                .filter_map(|d| {
                    non_blank(Some(d.path.as_str())).map(|path| HousingDocument {
                        path,
                        name: d.name.trim().to_string(),
                    })
                })
                .collect()
        }),
        notes: non_blank(request.notes.as_deref()),
        protocol_number: upper(request.protocol_number.as_deref()),
    }
    .with_received_housing_rule()
}

fn department_family(request: &HousingDepartmentRequest) -> Option<Vec<DependentInput>> {
    request.family_composition.as_ref().map(|composition| {
        normalize_dependents(
            composition
                .children
                .iter()
                .chain(&composition.family_members),
        )
    })
}

/// # Errors
///
/// Returns an error if the actor may not use housing features, the
/// repatriant does not exist, or the query fails.
pub fn list_housing_department_records(
    persistence: &mut Persistence,
    repatriant_id: i64,
    actor: &AuthenticatedActor,
) -> Result<Vec<HousingDepartmentRecordData>, ApiError> {
    AuthorizationService::authorize_housing(actor, "list_housing_department_records")?;
    require_repatriant(persistence, repatriant_id)?;
    persistence
        .list_housing_department_records(repatriant_id, actor.role.sees_deleted_records())
        .map_err(|e| translate_persistence_error(e, "Housing department record"))
}

/// Creates a department record, optionally replacing the dependents.
///
/// # Errors
///
/// Returns an error if the actor may not use housing features or the
/// repatriant does not exist.
pub fn create_housing_department_record(
    persistence: &mut Persistence,
    repatriant_id: i64,
    request: &HousingDepartmentRequest,
    actor: &AuthenticatedActor,
) -> Result<RecordResponse, ApiError> {
    AuthorizationService::authorize_housing(actor, "create_housing_department_record")?;

    let family: Option<Vec<DependentInput>> = department_family(request);
    let record_id: i64 = persistence
        .create_housing_department_record(
            repatriant_id,
            department_input(request),
            actor.user_id,
            family.as_deref(),
        )
        .map_err(|e| translate_persistence_error(e, "Repatriant"))?;

    record_audit(
        persistence,
        actor,
        actions::CREATE_HOUSING_RECORD,
        format!("Created housing department record for repatriant {repatriant_id}"),
        Some(repatriant_id),
    )?;

    Ok(RecordResponse {
        record_id,
        repatriant_id,
        message: String::from("Housing department record created"),
    })
}

/// Rewrites a department record, optionally replacing the dependents.
///
/// # Errors
///
/// Returns an error if the actor may not use housing features or there is
/// no active record with the ID.
pub fn update_housing_department_record(
    persistence: &mut Persistence,
    record_id: i64,
    request: &HousingDepartmentRequest,
    actor: &AuthenticatedActor,
) -> Result<RecordResponse, ApiError> {
    AuthorizationService::authorize_housing(actor, "update_housing_department_record")?;

    let family: Option<Vec<DependentInput>> = department_family(request);
    let repatriant_id: i64 = persistence
        .update_housing_department_record(record_id, department_input(request), family.as_deref())
        .map_err(|e| translate_persistence_error(e, "Housing department record"))?;

    record_audit(
        persistence,
        actor,
        actions::UPDATE_HOUSING_RECORD,
        format!("Updated housing department record {record_id}"),
        Some(repatriant_id),
    )?;

    Ok(RecordResponse {
        record_id,
        repatriant_id,
        message: String::from("Housing department record updated"),
    })
}

/// # Errors
///
/// Returns an error if the actor may not use housing features or there is
/// no active record with the ID.
pub fn delete_housing_department_record(
    persistence: &mut Persistence,
    record_id: i64,
    actor: &AuthenticatedActor,
) -> Result<RecordResponse, ApiError> {
    AuthorizationService::authorize_housing(actor, "delete_housing_department_record")?;

    let repatriant_id: i64 = persistence
        .soft_delete_housing_department_record(record_id, actor.user_id)
        .map_err(|e| translate_persistence_error(e, "Housing department record"))?;

    record_audit(
        persistence,
        actor,
        actions::DELETE_HOUSING_RECORD,
        format!("Deleted housing department record {record_id}"),
        Some(repatriant_id),
    )?;

    Ok(RecordResponse {
        record_id,
        repatriant_id,
        message: String::from("Housing department record deleted"),
    })
}

/// Restores a soft-deleted department record. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or there is no deleted
/// record with the ID.
pub fn restore_housing_department_record(
    persistence: &mut Persistence,
    record_id: i64,
    actor: &AuthenticatedActor,
) -> Result<RecordResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "restore_housing_department_record")?;

    let repatriant_id: i64 = persistence
        .restore_housing_department_record(record_id)
        .map_err(|e| translate_persistence_error(e, "Housing department record"))?;

    record_audit(
        persistence,
        actor,
        actions::RESTORE_CASE_NOTE,
        format!("Restored housing department record {record_id}"),
        Some(repatriant_id),
    )?;

    Ok(RecordResponse {
        record_id,
        repatriant_id,
        message: String::from("Housing department record restored"),
    })
}

// ========================================================================
// Housing queue
// ========================================================================

/// The active queue, rescored and renumbered as of `now`.
///
/// # Errors
///
/// Returns an error if the actor may not use housing features or the
/// recompute fails.
pub fn list_housing_queue(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<Vec<RankedQueueEntry>, ApiError> {
    AuthorizationService::authorize_housing(actor, "list_housing_queue")?;
    persistence
        .rank_active_queue(now)
        .map_err(|e| translate_persistence_error(e, "Queue entry"))
}

/// Puts a repatriant on the queue.
///
/// # Errors
///
/// Returns an error if the actor may not use housing features, the
/// repatriant does not exist, or it is already queued.
pub fn add_to_queue(
    persistence: &mut Persistence,
    request: &AddToQueueRequest,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<QueueEntryResponse, ApiError> {
    AuthorizationService::authorize_housing(actor, "add_to_queue")?;

    let factors: QueueFactors = QueueFactors::new(
        request.has_children,
        request.has_work,
        request.has_law_violations,
    );
    let entry_id: i64 = persistence
        .add_to_queue(request.repatriant_id, factors, actor.user_id, now)
        .map_err(|e| translate_persistence_error(e, "Repatriant"))?;

    let entry: QueueEntryData = persistence
        .get_queue_entry(entry_id)
        .map_err(|e| translate_persistence_error(e, "Queue entry"))?
        .ok_or_else(|| ApiError::Internal {
            message: format!("Queue entry {entry_id} not found after insert"),
        })?;

    record_audit(
        persistence,
        actor,
        actions::QUEUE_ADD,
        format!("Added to housing queue with score {}", entry.total_score),
        Some(entry.repatriant_id),
    )?;

    Ok(QueueEntryResponse {
        entry,
        message: String::from("Added to housing queue"),
    })
}

/// Changes an entry's scoring inputs.
///
/// # Errors
///
/// Returns an error if the actor may not use housing features or there is
/// no active entry with the ID.
pub fn update_queue_entry(
    persistence: &mut Persistence,
    entry_id: i64,
    request: &UpdateQueueRequest,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<QueueEntryResponse, ApiError> {
    AuthorizationService::authorize_housing(actor, "update_queue_entry")?;

    let factors: QueueFactors = QueueFactors::new(
        request.has_children,
        request.has_work,
        request.has_law_violations,
    );
    let entry: QueueEntryData = persistence
        .update_queue_entry(entry_id, factors, now)
        .map_err(|e| translate_persistence_error(e, "Queue entry"))?;

    record_audit(
        persistence,
        actor,
        actions::QUEUE_UPDATE,
        format!("Updated housing queue entry, score {}", entry.total_score),
        Some(entry.repatriant_id),
    )?;

    Ok(QueueEntryResponse {
        entry,
        message: String::from("Queue entry updated"),
    })
}

/// Takes an entry off the queue.
///
/// # Errors
///
/// Returns an error if the actor may not use housing features or there is
/// no active entry with the ID.
pub fn remove_from_queue(
    persistence: &mut Persistence,
    entry_id: i64,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<QueueEntryResponse, ApiError> {
    AuthorizationService::authorize_housing(actor, "remove_from_queue")?;

    let entry: QueueEntryData = persistence
        .remove_from_queue(entry_id, actor.user_id, now)
        .map_err(|e| translate_persistence_error(e, "Queue entry"))?;

    record_audit(
        persistence,
        actor,
        actions::QUEUE_REMOVE,
        String::from("Removed from housing queue"),
        Some(entry.repatriant_id),
    )?;

    Ok(QueueEntryResponse {
        entry,
        message: String::from("Removed from housing queue"),
    })
}

// ========================================================================
// Files
// ========================================================================

fn upload_prefix(category: &str) -> &str {
    match category {
        "avatars" => "avatar",
        "documents" => "doc",
        other => other,
    }
}

/// Stores an upload and returns its logical path.
///
/// # Errors
///
/// Returns an error if the name or extension is not allowed or the write
/// fails.
pub fn upload_file(
    storage: &FileStorage,
    category: &str,
    original_name: &str,
    bytes: &[u8],
    actor: &AuthenticatedActor,
) -> Result<UploadResponse, ApiError> {
    let path: String = storage.save(category, upload_prefix(category), original_name, bytes)?;
    info!(user_id = actor.user_id, path = %path, "Stored upload");

    Ok(UploadResponse {
        success: true,
        path,
        filename: original_name.to_string(),
    })
}

/// Stores a temp PDF for preview before registration.
///
/// # Errors
///
/// Returns an error if the file is not a PDF or the write fails.
pub fn upload_pdf_preview(
    storage: &FileStorage,
    original_name: &str,
    bytes: &[u8],
    _actor: &AuthenticatedActor,
) -> Result<UploadResponse, ApiError> {
    let path: String = storage.save_pdf_preview(original_name, bytes)?;

    Ok(UploadResponse {
        success: true,
        path,
        filename: original_name.to_string(),
    })
}

/// Locates a stored file for serving.
///
/// # Errors
///
/// Returns an error if the path is malformed or no file exists.
pub fn resolve_file(
    storage: &FileStorage,
    category: &str,
    name: &str,
    _actor: &AuthenticatedActor,
) -> Result<PathBuf, ApiError> {
    storage
        .resolve(&format!("{category}/{name}"))
        .map_err(ApiError::from)
}

/// Per-disk usage. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an admin.
pub fn storage_stats(
    storage: &FileStorage,
    actor: &AuthenticatedActor,
) -> Result<StorageStatsResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "storage_stats")?;

    Ok(StorageStatsResponse {
        disks: storage.disk_stats(),
        best_disk: storage.best_disk().map(|disk| disk.name.clone()),
    })
}

// ========================================================================
// Administration
// ========================================================================

/// Lists operators with per-user capabilities.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the query fails.
pub fn list_users(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<Vec<UserInfo>, ApiError> {
    AuthorizationService::authorize_admin(actor, "list_users")?;

    let users: Vec<UserData> = persistence
        .list_users()
        .map_err(|e| translate_persistence_error(e, "User"))?;

    Ok(users
        .into_iter()
        .map(|user| {
            let (can_toggle, can_delete) = compute_user_capabilities(actor, user.user_id);
            UserInfo {
                user,
                can_toggle,
                can_delete,
            }
        })
        .collect())
}

/// Creates an operator. The username is kept as typed; the full name is
/// uppercased.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - A field is blank or the role is unknown
/// - The username already exists
pub fn create_user(
    persistence: &mut Persistence,
    request: &CreateUserRequest,
    actor: &AuthenticatedActor,
) -> Result<CreateUserResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "create_user")?;

    let username: String = required(non_blank(Some(request.username.as_str())), "username")?;
    let full_name: String = required(upper(Some(request.full_name.as_str())), "full_name")?;
    if request.password.is_empty() {
        return Err(translate_domain_error(DomainError::MissingField("password")));
    }
    let role: Role = Role::from_str(request.role.trim()).map_err(translate_domain_error)?;

    let user_id: i64 = persistence
        .create_user(
            &username,
            &request.password,
            &full_name,
            role,
            Some(actor.user_id),
        )
        .map_err(|e| translate_persistence_error(e, "User"))?;

    record_audit(
        persistence,
        actor,
        actions::CREATE_USER,
        format!("Created user {username} with role {role}"),
        None,
    )?;

    Ok(CreateUserResponse {
        user_id,
        username,
        full_name,
        role,
        message: String::from("User created"),
    })
}

fn require_other_user(
    persistence: &mut Persistence,
    user_id: i64,
    actor: &AuthenticatedActor,
    action: &str,
) -> Result<UserData, ApiError> {
    if user_id == actor.user_id {
        return Err(translate_domain_error(DomainError::SelfModification(
            action.to_string(),
        )));
    }

    persistence
        .get_user_by_id(user_id)
        .map_err(|e| translate_persistence_error(e, "User"))?
        .ok_or_else(|| ApiError::not_found("User", user_id))
}

/// Flips a user's active flag. Deactivation ends the user's sessions.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, targets itself, or the
/// user does not exist.
pub fn toggle_user(
    persistence: &mut Persistence,
    user_id: i64,
    actor: &AuthenticatedActor,
) -> Result<ToggleUserResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "toggle_user")?;

    let user: UserData = require_other_user(persistence, user_id, actor, "deactivate")?;
    let is_active: bool = !user.is_active;

    persistence
        .set_user_active(user_id, is_active)
        .map_err(|e| translate_persistence_error(e, "User"))?;
    if !is_active {
        persistence
            .delete_sessions_for_user(user_id)
            .map_err(|e| translate_persistence_error(e, "User"))?;
    }

    let verb: &str = if is_active { "Activated" } else { "Deactivated" };
    record_audit(
        persistence,
        actor,
        actions::TOGGLE_USER,
        format!("{verb} user {}", user.username),
        None,
    )?;

    Ok(ToggleUserResponse {
        user_id,
        is_active,
        message: format!("{verb} user {}", user.username),
    })
}

/// Deletes a user.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, targets itself, or the
/// user does not exist.
pub fn delete_user(
    persistence: &mut Persistence,
    user_id: i64,
    actor: &AuthenticatedActor,
) -> Result<MessageResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "delete_user")?;

    let user: UserData = require_other_user(persistence, user_id, actor, "delete")?;
    persistence
        .delete_user(user_id)
        .map_err(|e| translate_persistence_error(e, "User"))?;

    record_audit(
        persistence,
        actor,
        actions::DELETE_USER,
        format!("Deleted user {}", user.username),
        None,
    )?;

    Ok(MessageResponse::ok(format!("Deleted user {}", user.username)))
}

/// One page of the audit trail, newest first.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the query fails.
pub fn list_logs(
    persistence: &mut Persistence,
    params: &LogsParams,
    actor: &AuthenticatedActor,
) -> Result<LogsResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "list_logs")?;

    let page: i64 = params.page();
    let (logs, total) = persistence
        .list_logs(page)
        .map_err(|e| translate_persistence_error(e, "Log"))?;

    Ok(LogsResponse {
        logs,
        page,
        total,
        pages: page_count(total, LOG_PAGE_SIZE),
    })
}

// ========================================================================
// Reports
// ========================================================================

/// # Errors
///
/// Returns an error if the actor is not an admin or a query fails.
pub fn report_summary(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    today: Date,
) -> Result<SummaryReport, ApiError> {
    AuthorizationService::authorize_admin(actor, "report_summary")?;
    let map = |e: PersistenceError| translate_persistence_error(e, "Report");

    Ok(SummaryReport {
        total_repatriants: persistence.count_repatriants().map_err(map)?,
        registered_today: persistence
            .count_registered_on(&format_date(today))
            .map_err(map)?,
        total_users: persistence.count_users().map_err(map)?,
        active_users: persistence.count_active_users().map_err(map)?,
        housing_department_records: persistence
            .count_housing_department_records()
            .map_err(map)?,
        active_queue_entries: persistence.count_active_queue_entries().map_err(map)?,
        case_notes: persistence.case_note_counts().map_err(map)?,
    })
}

/// # Errors
///
/// Returns an error if the actor is not an admin or a query fails.
pub fn report_repatriants(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<RepatriantsReport, ApiError> {
    AuthorizationService::authorize_admin(actor, "report_repatriants")?;
    let map = |e: PersistenceError| translate_persistence_error(e, "Report");

    Ok(RepatriantsReport {
        by_sex: persistence.repatriants_by_sex().map_err(map)?,
        top_origins: persistence.top_origins().map_err(map)?,
        top_nationalities: persistence.top_nationalities().map_err(map)?,
        by_family_status: persistence.repatriants_by_family_status().map_err(map)?,
    })
}

/// # Errors
///
/// Returns an error if the actor is not an admin or a query fails.
pub fn report_social(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<SocialReport, ApiError> {
    AuthorizationService::authorize_admin(actor, "report_social")?;
    let map = |e: PersistenceError| translate_persistence_error(e, "Report");

    Ok(SocialReport {
        case_notes: persistence.case_note_counts().map_err(map)?,
        help_types: persistence.help_type_counts().map_err(map)?,
        event_types: persistence.event_type_counts().map_err(map)?,
    })
}

/// # Errors
///
/// Returns an error if the actor is not an admin or a query fails.
pub fn report_user_activity(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<UserActivityReport, ApiError> {
    AuthorizationService::authorize_admin(actor, "report_user_activity")?;
    let map = |e: PersistenceError| translate_persistence_error(e, "Report");

    Ok(UserActivityReport {
        activity: persistence.user_activity().map_err(map)?,
        recent_logins: persistence
            .recent_logins(RECENT_LOGIN_LIMIT)
            .map_err(map)?,
    })
}

/// # Errors
///
/// Returns an error if the actor is not an admin or a query fails.
pub fn report_family(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<FamilyReport, ApiError> {
    AuthorizationService::authorize_admin(actor, "report_family")?;
    let map = |e: PersistenceError| translate_persistence_error(e, "Report");

    Ok(FamilyReport {
        large_families: persistence
            .large_families()
            .map_err(map)?
            .into_iter()
            .map(|(repatriant, children)| LargeFamily {
                repatriant,
                children,
            })
            .collect(),
        without_dependents: persistence
            .repatriants_without_dependents()
            .map_err(map)?,
    })
}

// ========================================================================
// Exports
// ========================================================================

/// Renders an export. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, a query fails, or
/// serialization fails.
pub fn export(
    persistence: &mut Persistence,
    kind: ExportKind,
    format: ExportFormat,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<FileDownload, ApiError> {
    AuthorizationService::authorize_admin(actor, "export")?;

    let stamp: String = export_stamp(now)?;
    let map = |e: PersistenceError| translate_persistence_error(e, "Export");

    let file: FileDownload = match kind {
        ExportKind::Repatriants => {
            export_repatriants(&persistence.list_all_repatriants().map_err(map)?, format, &stamp)?
        }
        ExportKind::Logs => export_logs(&persistence.list_all_logs().map_err(map)?, format, &stamp)?,
        ExportKind::Users => export_users(&persistence.list_users().map_err(map)?, format, &stamp)?,
        ExportKind::Families => export_families(
            &persistence.list_all_children().map_err(map)?,
            &persistence.list_all_family_members().map_err(map)?,
            format,
            &stamp,
        )?,
    };

    record_audit(
        persistence,
        actor,
        actions::EXPORT,
        format!("Exported {} as {}", kind.as_str(), format.extension()),
        None,
    )?;

    Ok(file)
}
