// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod config;
mod routes;
mod session;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{MethodRouter, get, post, put},
};
use clap::Parser;
use repatria_api::{ApiError, CaseNoteKind, FileStorage, bootstrap_admin};
use repatria_persistence::Persistence;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::{Overrides, ServerConfig};
use crate::session::SessionOperator;

/// Repatria Server - HTTP server for the repatriant case registry
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to [default: 3000]
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root folder for uploads
    #[arg(long)]
    upload_folder: Option<PathBuf>,

    /// The `.docx` application form template
    #[arg(long)]
    form_template: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            database: self.database.clone(),
            port: self.port,
            upload_folder: self.upload_folder.clone(),
            form_template: self.form_template.clone(),
        }
    }
}

/// Application state shared across handlers.
///
/// The persistence layer sits behind a Mutex, so requests touching the
/// database are serialized.
#[derive(Clone)]
struct AppState {
    persistence: Arc<Mutex<Persistence>>,
    storage: Arc<FileStorage>,
    form_template: Arc<PathBuf>,
}

impl AppState {
    fn new(persistence: Persistence, storage: FileStorage, form_template: PathBuf) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            storage: Arc::new(storage),
            form_template: Arc::new(form_template),
        }
    }
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Routes `PUT`/`DELETE /{base}/{id}` and `POST /{base}/{id}/restore` for
/// one case-note kind.
fn case_note_routes(
    router: Router<AppState>,
    base: &str,
    kind: CaseNoteKind,
    update: MethodRouter<AppState>,
) -> Router<AppState> {
    router
        .route(
            &format!("/{base}/{{id}}"),
            update.delete(
                move |state: State<AppState>, session: SessionOperator, path: Path<i64>| {
                    routes::handle_delete_case_note(kind, state, session, path)
                },
            ),
        )
        .route(
            &format!("/{base}/{{id}}/restore"),
            post(
                move |state: State<AppState>, session: SessionOperator, path: Path<i64>| {
                    routes::handle_restore_case_note(kind, state, session, path)
                },
            ),
        )
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState, max_upload_bytes: usize) -> Router {
    let router: Router<AppState> = Router::new()
        .route("/auth/login", post(routes::handle_login))
        .route("/auth/logout", post(routes::handle_logout))
        .route("/auth/whoami", get(routes::handle_whoami))
        .route("/dashboard", get(routes::handle_dashboard))
        .route("/repatriants", post(routes::handle_register))
        .route("/repatriants/search", get(routes::handle_search))
        .route("/api/search-repatriants", get(routes::handle_lookup))
        .route(
            "/repatriants/{id}",
            get(routes::handle_get_repatriant)
                .put(routes::handle_edit_repatriant)
                .delete(routes::handle_delete_repatriant),
        )
        .route("/repatriants/{id}/family", get(routes::handle_family))
        .route("/repatriants/{id}/status", get(routes::handle_status))
        .route("/repatriants/{id}/social", get(routes::handle_social_view))
        .route("/repatriants/{id}/housing", get(routes::handle_housing_view))
        .route("/repatriants/{id}/history", get(routes::handle_history))
        .route("/repatriants/{id}/form", get(routes::handle_form))
        .route(
            "/repatriants/{id}/housing-records",
            get(routes::handle_list_housing_records).post(routes::handle_create_housing_record),
        )
        .route(
            "/repatriants/{id}/social-help",
            get(routes::handle_list_social_help).post(routes::handle_create_social_help),
        )
        .route(
            "/repatriants/{id}/events",
            get(routes::handle_list_events).post(routes::handle_create_event),
        )
        .route(
            "/repatriants/{id}/other",
            get(routes::handle_list_other).post(routes::handle_create_other),
        )
        .route(
            "/repatriants/{id}/housing-department",
            get(routes::handle_list_department_records)
                .post(routes::handle_create_department_record),
        )
        .route(
            "/housing-department/{id}",
            put(routes::handle_update_department_record)
                .delete(routes::handle_delete_department_record),
        )
        .route(
            "/housing-department/{id}/restore",
            post(routes::handle_restore_department_record),
        )
        .route(
            "/housing-queue",
            get(routes::handle_list_queue).post(routes::handle_add_to_queue),
        )
        .route(
            "/housing-queue/{id}",
            put(routes::handle_update_queue_entry).delete(routes::handle_remove_from_queue),
        )
        .route("/uploads/pdf-preview", post(routes::handle_pdf_preview))
        .route("/uploads/{category}", post(routes::handle_upload))
        .route("/files/{category}/{name}", get(routes::handle_serve_file))
        .route(
            "/admin/users",
            get(routes::handle_list_users).post(routes::handle_create_user),
        )
        .route("/admin/users/{id}", axum::routing::delete(routes::handle_delete_user))
        .route("/admin/users/{id}/toggle", post(routes::handle_toggle_user))
        .route("/admin/logs", get(routes::handle_logs))
        .route("/admin/storage", get(routes::handle_storage_stats))
        .route("/admin/reports/summary", get(routes::handle_report_summary))
        .route(
            "/admin/reports/repatriants",
            get(routes::handle_report_repatriants),
        )
        .route("/admin/reports/social", get(routes::handle_report_social))
        .route(
            "/admin/reports/user-activity",
            get(routes::handle_report_user_activity),
        )
        .route("/admin/reports/family", get(routes::handle_report_family))
        .route("/admin/export/{kind}", get(routes::handle_export));

    let router: Router<AppState> = case_note_routes(
        router,
        "housing-records",
        CaseNoteKind::HousingRecord,
        put(routes::handle_update_housing_record),
    );
    let router: Router<AppState> = case_note_routes(
        router,
        "social-help",
        CaseNoteKind::SocialHelp,
        put(routes::handle_update_social_help),
    );
    let router: Router<AppState> = case_note_routes(
        router,
        "events",
        CaseNoteKind::Event,
        put(routes::handle_update_event),
    );
    let router: Router<AppState> = case_note_routes(
        router,
        "other",
        CaseNoteKind::Other,
        put(routes::handle_update_other),
    );

    router
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing, forwarding `log` records from dependencies
    tracing_log::LogTracer::init()?;
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Initializing Repatria Server");

    let config: ServerConfig =
        ServerConfig::load(args.config.as_deref())?.with_overrides(args.overrides());

    // Initialize persistence (in-memory or file-based based on configuration)
    let mut persistence: Persistence = if let Some(db_path) = &config.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    if let Some(admin) = &config.bootstrap_admin
        && let Some(user_id) = bootstrap_admin(
            &mut persistence,
            &admin.username,
            &admin.password,
            &admin.full_name,
        )?
    {
        info!(user_id, username = %admin.username, "Created bootstrap administrator");
    }

    let storage: FileStorage = FileStorage::new(
        config.storage_disks.clone(),
        config.upload_folder.clone(),
        config.backup_folder.clone(),
    );
    storage.create_folders();

    if !config.form_template.is_file() {
        warn!(
            path = %config.form_template.display(),
            "Form template not found; form generation will fail"
        );
    }

    let app_state: AppState =
        AppState::new(persistence, storage, config.form_template.clone());

    // Build router
    let app: Router = build_router(app_state, config.max_upload_bytes);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", config.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
