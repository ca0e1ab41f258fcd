// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV and JSON exports for admins.

use std::str::FromStr;

use repatria_persistence::{ChildData, FamilyMemberData, LogEntryData, RepatriantData, UserData};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::FormatItem;
use time::macros::format_description;

use crate::error::ApiError;

/// Column header of the repatriant CSV, kept from the legacy registry.
pub const REPATRIANT_CSV_HEADER: [&str; 9] = [
    "ID",
    "F",
    "I",
    "O",
    "SEX",
    "DATE_R",
    "FROM_LOC",
    "SEM_POLOJ",
    "REZERV",
];

const LOG_CSV_HEADER: [&str; 6] = ["ID", "REPATRIANT_ID", "USERNAME", "ACTION", "DATE", "TIME"];
const USER_CSV_HEADER: [&str; 7] = [
    "ID",
    "USERNAME",
    "FULL_NAME",
    "ROLE",
    "IS_ACTIVE",
    "CREATED_AT",
    "LAST_LOGIN",
];
const FAMILY_CSV_HEADER: [&str; 9] = [
    "REPATRIANT_ID",
    "KIND",
    "RELATIONSHIP",
    "FULL_NAME",
    "BIRTH_YEAR",
    "CITIZENSHIP",
    "NATIONALITY",
    "ADDRESS",
    "LIVES_WITH_PARENT",
];

const STAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year][month][day]_[hour][minute][second]");

/// What an admin can export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Repatriants,
    Logs,
    Users,
    Families,
}

impl ExportKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Repatriants => "repatriants",
            Self::Logs => "logs",
            Self::Users => "users",
            Self::Families => "families",
        }
    }
}

impl FromStr for ExportKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "repatriants" => Ok(Self::Repatriants),
            "logs" => Ok(Self::Logs),
            "users" => Ok(Self::Users),
            "families" => Ok(Self::Families),
            _ => Err(ApiError::ResourceNotFound {
                resource_type: String::from("Export"),
                message: format!("Unknown export '{s}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json; charset=utf-8",
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(ApiError::InvalidInput {
                field: String::from("format"),
                message: format!("Unsupported export format '{s}'. Use 'csv' or 'json'"),
            }),
        }
    }
}

/// A generated file sent as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDownload {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl FileDownload {
    pub(crate) fn new(stem: &str, stamp: &str, format: ExportFormat, body: Vec<u8>) -> Self {
        Self {
            file_name: format!("{stem}_{stamp}.{}", format.extension()),
            content_type: format.content_type(),
            body,
        }
    }
}

#[derive(Serialize)]
struct RepatriantExportRow<'a> {
    id: i64,
    surname: Option<&'a str>,
    given_name: Option<&'a str>,
    patronymic: Option<&'a str>,
    sex: Option<&'a str>,
    birth_date: Option<&'a str>,
    arrived_from: Option<&'a str>,
    family_status: Option<&'a str>,
    nationality: Option<&'a str>,
}

impl<'a> From<&'a RepatriantData> for RepatriantExportRow<'a> {
    fn from(r: &'a RepatriantData) -> Self {
        Self {
            id: r.repatriant_id,
            surname: r.surname.as_deref(),
            given_name: r.given_name.as_deref(),
            patronymic: r.patronymic.as_deref(),
            sex: r.sex.as_deref(),
            birth_date: r.birth_date.as_deref(),
            arrived_from: r.arrived_from.as_deref(),
            family_status: r.family_status.as_deref(),
            nationality: r.nationality.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct FamilyExport<'a> {
    children: &'a [ChildData],
    family_members: &'a [FamilyMemberData],
}

fn csv_error(err: impl std::fmt::Display) -> ApiError {
    ApiError::Internal {
        message: format!("Failed to write CSV: {err}"),
    }
}

fn json_error(err: &serde_json::Error) -> ApiError {
    ApiError::Internal {
        message: format!("Failed to write JSON: {err}"),
    }
}

/// Writes rows of string cells under a header.
fn write_csv<I>(header: &[&str], rows: I) -> Result<Vec<u8>, ApiError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header).map_err(csv_error)?;
    for row in rows {
        writer.write_record(&row).map_err(csv_error)?;
    }
    writer.into_inner().map_err(csv_error)
}

/// `YYYYMMDD_HHMMSS`, the suffix of export file names.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be formatted.
pub fn export_stamp(now: OffsetDateTime) -> Result<String, ApiError> {
    now.format(STAMP_FORMAT).map_err(|e| ApiError::Internal {
        message: format!("Failed to format export timestamp: {e}"),
    })
}

fn cell(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

/// Exports repatriants in ID order.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn export_repatriants(
    repatriants: &[RepatriantData],
    format: ExportFormat,
    stamp: &str,
) -> Result<FileDownload, ApiError> {
    let mut rows: Vec<RepatriantExportRow<'_>> =
        repatriants.iter().map(RepatriantExportRow::from).collect();
    rows.sort_by_key(|row| row.id);

    let body: Vec<u8> = match format {
        ExportFormat::Csv => write_csv(
            &REPATRIANT_CSV_HEADER,
            rows.iter().map(|r| {
                vec![
                    r.id.to_string(),
                    cell(r.surname),
                    cell(r.given_name),
                    cell(r.patronymic),
                    cell(r.sex),
                    cell(r.birth_date),
                    cell(r.arrived_from),
                    cell(r.family_status),
                    cell(r.nationality),
                ]
            }),
        )?,
        ExportFormat::Json => serde_json::to_vec_pretty(&rows).map_err(|e| json_error(&e))?,
    };

    Ok(FileDownload::new("repatriants", stamp, format, body))
}

/// Exports the audit trail, newest first.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn export_logs(
    logs: &[LogEntryData],
    format: ExportFormat,
    stamp: &str,
) -> Result<FileDownload, ApiError> {
    let body: Vec<u8> = match format {
        ExportFormat::Csv => write_csv(
            &LOG_CSV_HEADER,
            logs.iter().map(|log| {
                vec![
                    log.log_id.to_string(),
                    log.repatriant_id.map(|id| id.to_string()).unwrap_or_default(),
                    log.username.clone(),
                    log.action_text.clone(),
                    log.logged_on.clone(),
                    log.logged_at.clone(),
                ]
            }),
        )?,
        ExportFormat::Json => serde_json::to_vec_pretty(logs).map_err(|e| json_error(&e))?,
    };

    Ok(FileDownload::new("logs", stamp, format, body))
}

/// Exports operators. Password hashes are never included.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn export_users(
    users: &[UserData],
    format: ExportFormat,
    stamp: &str,
) -> Result<FileDownload, ApiError> {
    let body: Vec<u8> = match format {
        ExportFormat::Csv => write_csv(
            &USER_CSV_HEADER,
            users.iter().map(|user| {
                vec![
                    user.user_id.to_string(),
                    user.username.clone(),
                    user.full_name.clone(),
                    user.role.to_string(),
                    user.is_active.to_string(),
                    user.created_at.clone(),
                    user.last_login_at.clone().unwrap_or_default(),
                ]
            }),
        )?,
        ExportFormat::Json => serde_json::to_vec_pretty(users).map_err(|e| json_error(&e))?,
    };

    Ok(FileDownload::new("users", stamp, format, body))
}

/// Exports children and adult family members.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn export_families(
    children: &[ChildData],
    family_members: &[FamilyMemberData],
    format: ExportFormat,
    stamp: &str,
) -> Result<FileDownload, ApiError> {
    let body: Vec<u8> = match format {
        ExportFormat::Csv => {
            let child_rows = children.iter().map(|c| {
                vec![
                    c.repatriant_id.to_string(),
                    String::from("CHILD"),
                    cell(c.relationship.as_deref()),
                    cell(c.full_name.as_deref()),
                    cell(c.birth_year.as_deref()),
                    cell(c.citizenship.as_deref()),
                    cell(c.nationality.as_deref()),
                    String::new(),
                    c.lives_with_parent.to_string(),
                ]
            });
            let member_rows = family_members.iter().map(|m| {
                vec![
                    m.repatriant_id.to_string(),
                    String::from("ADULT"),
                    cell(m.relationship.as_deref()),
                    cell(m.full_name.as_deref()),
                    m.birth_year.map(|y| y.to_string()).unwrap_or_default(),
                    cell(m.citizenship.as_deref()),
                    cell(m.nationality.as_deref()),
                    cell(m.address.as_deref()),
                    m.lives_with_parent.to_string(),
                ]
            });
            write_csv(&FAMILY_CSV_HEADER, child_rows.chain(member_rows))?
        }
        ExportFormat::Json => serde_json::to_vec_pretty(&FamilyExport {
            children,
            family_members,
        })
        .map_err(|e| json_error(&e))?,
    };

    Ok(FileDownload::new("families", stamp, format, body))
}
