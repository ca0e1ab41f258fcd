// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Transport-independent API for the Repatria case registry.
//!
//! Handlers take the persistence layer, an [`AuthenticatedActor`], and a
//! typed request. They authorize, normalize input, write through
//! persistence, record an audit entry, and return a typed response. The
//! HTTP server is a thin layer on top.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod capabilities;
mod error;
mod export;
mod forms;
mod handlers;
mod request_response;
mod storage;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService};
pub use capabilities::{compute_capabilities, compute_user_capabilities};
pub use error::{ApiError, AuthError, translate_domain_error, translate_persistence_error};
pub use export::{
    ExportFormat, ExportKind, FileDownload, REPATRIANT_CSV_HEADER, export_families, export_logs,
    export_repatriants, export_stamp, export_users,
};
pub use forms::{
    DOCUMENT_ENTRY, DOCX_CONTENT_TYPE, fill_placeholders, fill_template, form_values, xml_escape,
};
pub use handlers::{
    CUSTOM_HELP_TYPE, CaseNoteKind, add_to_queue, bootstrap_admin, check_repatriant_status,
    create_event_record, create_housing_department_record, create_housing_record,
    create_other_record, create_social_help_record, create_user, dashboard, delete_case_note,
    delete_housing_department_record, delete_repatriant, delete_user, edit_repatriant, export,
    generate_form, get_family, get_repatriant, housing_view, list_event_records,
    list_housing_department_records, list_housing_queue, list_housing_records, list_logs,
    list_other_records, list_social_help_records, list_users, login, logout, lookup_repatriants,
    register_repatriant, remove_from_queue, repatriant_history, report_family,
    report_repatriants, report_social, report_summary, report_user_activity, resolve_file,
    restore_case_note, restore_housing_department_record, search_repatriants, social_view,
    storage_stats, toggle_user, update_event_record, update_housing_department_record,
    update_housing_record, update_other_record, update_queue_entry, update_social_help_record,
    upload_file, upload_pdf_preview, whoami,
};
pub use request_response::{
    AddToQueueRequest, Capabilities, Capability, CreateUserRequest, CreateUserResponse,
    DashboardResponse, EditRepatriantRequest, EventRequest, ExportParams, FamilyComposition,
    FamilyReport, FamilyResponse, HousingDepartmentRequest, HousingDocumentRequest,
    HousingRecordRequest, HousingViewResponse, LargeFamily, LoginRequest, LoginResponse,
    LogsParams, LogsResponse, LookupParams, MessageResponse, OtherRecordRequest,
    QueueEntryResponse, RecordResponse, RegisterRepatriantRequest, RegisterRepatriantResponse,
    RepatriantDetailResponse, RepatriantForm, RepatriantHistoryResponse, RepatriantsReport,
    SearchParams, SearchResponse, SocialHelpRequest, SocialReport, SocialViewResponse,
    StatusResponse, StorageStatsResponse, SummaryReport, ToggleUserResponse, UpdateQueueRequest,
    UploadResponse, UserActivityReport, UserInfo, WhoAmIResponse,
};
pub use storage::{
    ALLOWED_EXTENSIONS, DISK_CATEGORIES, DiskStats, FileStorage, Fs2Probe, SpaceProbe,
    StorageDisk, StorageError, TEMP_FOLDER, is_allowed_file,
};
