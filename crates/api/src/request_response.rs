// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use std::collections::HashMap;

use repatria_domain::{
    AddressPart, DateRange, HousingCriteria, Role, SearchCriteria, StatusCheck, TextField,
    parse_amount, parse_date,
};
use repatria_persistence::{
    CaseNoteCounts, ChildData, CountRow, DependentInput, EventRecordData, FamilyMemberData,
    HousingDepartmentRecordData, HousingRecordData, LogEntryData, OtherRecordData,
    QueueEntryData, RepatriantData, RepatriantSummary, SocialHelpRecordData, UserActivity,
    UserData,
};
use serde::{Deserialize, Serialize};

use crate::storage::DiskStats;

// ========================================================================
// Capabilities
// ========================================================================

/// Represents whether a specific action is permitted.
///
/// This enum provides better type safety than raw booleans and serializes
/// to JSON as true/false for API compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The action is permitted.
    Allowed,
    /// The action is not permitted.
    Denied,
}

impl Capability {
    /// Returns true if the capability is allowed.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Creates a capability from a boolean value.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::Allowed } else { Self::Denied }
    }
}

impl Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bool(matches!(self, Self::Allowed))
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let b = bool::deserialize(deserializer)?;
        Ok(Self::from_bool(b))
    }
}

/// What the current operator may do, for UI gating.
///
/// Advisory only; every handler checks authorization itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub can_register_repatriants: Capability,
    pub can_view_social: Capability,
    pub can_view_housing: Capability,
    pub can_manage_housing_queue: Capability,
    pub can_manage_users: Capability,
    pub can_view_logs: Capability,
    pub can_view_reports: Capability,
    pub can_export: Capability,
    pub can_view_storage: Capability,
    pub can_restore_records: Capability,
}

// ========================================================================
// Authentication
// ========================================================================

/// API request to log in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// API response for a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The session token, also set as the `session` cookie.
    pub session_token: String,
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    /// When the session lapses without further activity.
    pub expires_at: String,
}

/// API response describing the current operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub capabilities: Capabilities,
}

/// Generic acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Landing page figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub total_repatriants: i64,
    pub registered_today: i64,
    pub today: String,
}

// ========================================================================
// Repatriants
// ========================================================================

/// Repatriant columns as submitted by the registration and edit forms.
///
/// Absent fields are left untouched on edit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct RepatriantForm {
    pub file_code: Option<String>,
    pub birth_surname: Option<String>,
    pub surname: Option<String>,
    pub given_name: Option<String>,
    pub patronymic: Option<String>,
    pub country_of_residence: Option<String>,
    pub arrived_from: Option<String>,
    pub commission_decision: Option<bool>,
    pub birth_date: Option<String>,
    pub sex: Option<String>,
    pub birthplace: Option<String>,
    pub family_status: Option<String>,
    pub status_granted_on: Option<String>,
    pub registered_on: Option<String>,
    pub additional_info: Option<String>,
    pub identity_document: Option<String>,
    pub identity_document_number: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// The nationality selector value.
    pub nationality: Option<String>,
    /// Free text used when the selector is `OTHER`.
    pub nationality_other: Option<String>,
    /// Logical path of an uploaded avatar.
    pub avatar_path: Option<String>,
    /// Logical path of an uploaded document.
    pub documents_path: Option<String>,
    /// Logical path of a temp PDF preview to adopt as the document.
    pub pdf_preview_path: Option<String>,
}

/// API request to register a repatriant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RegisterRepatriantRequest {
    #[serde(flatten)]
    pub form: RepatriantForm,
    #[serde(default)]
    pub children: Vec<DependentInput>,
    #[serde(default)]
    pub family_members: Vec<DependentInput>,
}

/// API response for a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRepatriantResponse {
    pub repatriant_id: i64,
    pub message: String,
}

/// API request to edit a repatriant.
///
/// Providing either dependent list replaces the stored dependents.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct EditRepatriantRequest {
    #[serde(flatten)]
    pub form: RepatriantForm,
    #[serde(default)]
    pub children: Option<Vec<DependentInput>>,
    #[serde(default)]
    pub family_members: Option<Vec<DependentInput>>,
}

/// Status validity of a repatriant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusResponse {
    pub repatriant_id: i64,
    pub status_granted_on: Option<String>,
    pub expires_on: Option<String>,
    #[serde(flatten)]
    pub check: StatusCheck,
}

/// A repatriant with dependents and status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepatriantDetailResponse {
    pub repatriant: RepatriantData,
    pub full_name: String,
    pub children: Vec<ChildData>,
    pub family_members: Vec<FamilyMemberData>,
    pub status: StatusResponse,
}

/// Dependents of a repatriant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyResponse {
    pub repatriant_id: i64,
    pub children: Vec<ChildData>,
    pub family_members: Vec<FamilyMemberData>,
}

/// The social adaptation view of a repatriant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialViewResponse {
    pub repatriant: RepatriantData,
    pub full_name: String,
    pub housing_records: Vec<HousingRecordData>,
    pub social_help_records: Vec<SocialHelpRecordData>,
    pub event_records: Vec<EventRecordData>,
    pub other_records: Vec<OtherRecordData>,
}

/// The housing department view of a repatriant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HousingViewResponse {
    pub repatriant: RepatriantData,
    pub full_name: String,
    pub children: Vec<ChildData>,
    pub family_members: Vec<FamilyMemberData>,
    pub records: Vec<HousingDepartmentRecordData>,
    pub queue_entry: Option<QueueEntryData>,
}

/// Audit history of one repatriant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepatriantHistoryResponse {
    pub repatriant_id: i64,
    pub entries: Vec<LogEntryData>,
}

// ========================================================================
// Search
// ========================================================================

/// Query parameters of the search page.
///
/// Every value arrives as text; malformed dates and numbers are ignored.
/// Housing parameters carry a `housing_` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<String>,
    pub surname: Option<String>,
    pub given_name: Option<String>,
    pub patronymic: Option<String>,
    pub birth_surname: Option<String>,
    pub country_of_residence: Option<String>,
    pub arrived_from: Option<String>,
    pub nationality: Option<String>,
    pub identity_document: Option<String>,
    pub identity_document_number: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub birthplace: Option<String>,
    pub additional_info: Option<String>,
    pub file_code: Option<String>,
    pub sex: Option<String>,
    pub family_status: Option<String>,
    pub birth_date_from: Option<String>,
    pub birth_date_to: Option<String>,
    pub status_granted_from: Option<String>,
    pub status_granted_to: Option<String>,
    pub children_count: Option<String>,
    pub housing_category: Option<String>,
    pub housing_protocol_number: Option<String>,
    pub housing_notes: Option<String>,
    pub housing_received_housing: Option<String>,
    pub housing_has_warrant: Option<String>,
    pub housing_status: Option<String>,
    pub housing_address_city: Option<String>,
    pub housing_address_street: Option<String>,
    pub housing_address_house: Option<String>,
    pub housing_address_apartment: Option<String>,
    pub housing_repair_amount: Option<String>,
    pub housing_created_at_from: Option<String>,
    pub housing_created_at_to: Option<String>,
}

fn filled(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn date_range(from: Option<&String>, to: Option<&String>) -> DateRange {
    DateRange::new(
        filled(from).and_then(|v| parse_date(&v)),
        filled(to).and_then(|v| parse_date(&v)),
    )
}

/// `true` means true; any other non-empty value means false.
fn flag(value: Option<&String>) -> Option<bool> {
    filled(value).map(|v| v == "true")
}

impl SearchParams {
    /// The requested page, at least 1.
    #[must_use]
    pub fn page(&self) -> i64 {
        filled(self.page.as_ref())
            .and_then(|p| p.parse::<i64>().ok())
            .map_or(1, |p| p.max(1))
    }

    /// The quick query text.
    #[must_use]
    pub fn query(&self) -> &str {
        self.q.as_deref().map_or("", str::trim)
    }

    /// Builds the advanced criteria from the non-empty parameters.
    #[must_use]
    pub fn criteria(&self) -> SearchCriteria {
        let text_fields: [(TextField, Option<&String>); 14] = [
            (TextField::Surname, self.surname.as_ref()),
            (TextField::GivenName, self.given_name.as_ref()),
            (TextField::Patronymic, self.patronymic.as_ref()),
            (TextField::BirthSurname, self.birth_surname.as_ref()),
            (
                TextField::CountryOfResidence,
                self.country_of_residence.as_ref(),
            ),
            (TextField::ArrivedFrom, self.arrived_from.as_ref()),
            (TextField::Nationality, self.nationality.as_ref()),
            (TextField::IdentityDocument, self.identity_document.as_ref()),
            (
                TextField::IdentityDocumentNumber,
                self.identity_document_number.as_ref(),
            ),
            (TextField::Phone, self.phone.as_ref()),
            (TextField::Email, self.email.as_ref()),
            (TextField::Address, self.address.as_ref()),
            (TextField::Birthplace, self.birthplace.as_ref()),
            (TextField::AdditionalInfo, self.additional_info.as_ref()),
        ];

        let text: Vec<(TextField, String)> = text_fields
            .into_iter()
            .filter_map(|(field, value)| filled(value).map(|v| (field, v)))
            .collect();

        let address_parts: [(AddressPart, Option<&String>); 4] = [
            (AddressPart::City, self.housing_address_city.as_ref()),
            (AddressPart::Street, self.housing_address_street.as_ref()),
            (AddressPart::House, self.housing_address_house.as_ref()),
            (
                AddressPart::Apartment,
                self.housing_address_apartment.as_ref(),
            ),
        ];

        let housing: HousingCriteria = HousingCriteria {
            category: filled(self.housing_category.as_ref()),
            protocol_number: filled(self.housing_protocol_number.as_ref()),
            notes: filled(self.housing_notes.as_ref()),
            received_housing: flag(self.housing_received_housing.as_ref()),
            has_warrant: flag(self.housing_has_warrant.as_ref()),
            housing_status: filled(self.housing_status.as_ref()),
            address: address_parts
                .into_iter()
                .filter_map(|(part, value)| filled(value).map(|v| (part, v)))
                .collect(),
            repair_amount: filled(self.housing_repair_amount.as_ref())
                .and_then(|v| parse_amount(Some(&v))),
            created: date_range(
                self.housing_created_at_from.as_ref(),
                self.housing_created_at_to.as_ref(),
            ),
        };

        SearchCriteria {
            text,
            file_code: filled(self.file_code.as_ref()),
            sex: filled(self.sex.as_ref()),
            family_status: filled(self.family_status.as_ref()),
            birth_date: date_range(self.birth_date_from.as_ref(), self.birth_date_to.as_ref()),
            status_date: date_range(
                self.status_granted_from.as_ref(),
                self.status_granted_to.as_ref(),
            ),
            children_count: filled(self.children_count.as_ref())
                .and_then(|v| v.parse::<u32>().ok()),
            housing,
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub rows: Vec<RepatriantData>,
    pub page: i64,
    pub total: i64,
    pub pages: i64,
    /// Latest housing department record per listed repatriant, for housing
    /// staff and admins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub housing_records: Option<HashMap<i64, HousingDepartmentRecordData>>,
}

/// Query parameters of the picker lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct LookupParams {
    pub q: Option<String>,
}

// ========================================================================
// Case notes
// ========================================================================

/// A housing record as submitted. Required on create: address, start date.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct HousingRecordRequest {
    pub contract_number: Option<String>,
    pub address: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub cost: Option<String>,
    pub documents: Option<Vec<String>>,
    pub notes: Option<String>,
}

/// A social help record as submitted. Required on create: help type, date.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct SocialHelpRequest {
    pub help_type: Option<String>,
    pub custom_help_type: Option<String>,
    pub responsible: Option<String>,
    pub help_date: Option<String>,
    pub amount: Option<String>,
    pub documents: Option<Vec<String>>,
    pub description: Option<String>,
}

/// An event record as submitted. Required on create: name, start date.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct EventRequest {
    pub event_name: Option<String>,
    pub event_start_date: Option<String>,
    pub event_end_date: Option<String>,
    pub event_location: Option<String>,
    pub event_type: Option<String>,
    pub event_amount: Option<String>,
    pub description: Option<String>,
}

/// An other record as submitted. Required on create: title, date, content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct OtherRecordRequest {
    pub title: Option<String>,
    pub record_date: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
}

/// API response for a write to a record owned by a repatriant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordResponse {
    pub record_id: i64,
    pub repatriant_id: i64,
    pub message: String,
}

// ========================================================================
// Housing department
// ========================================================================

/// A document attached to a department record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HousingDocumentRequest {
    pub path: String,
    #[serde(default)]
    pub name: String,
}

/// Dependents submitted with a department record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct FamilyComposition {
    pub children: Vec<DependentInput>,
    pub family_members: Vec<DependentInput>,
}

/// A housing department record as submitted.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct HousingDepartmentRequest {
    pub category: Option<String>,
    pub received_housing: bool,
    pub housing_type: Option<String>,
    pub housing_acquisition: Option<String>,
    /// `city, street, house, apartment`.
    pub address: Option<String>,
    pub has_warrant: bool,
    pub repair_amount: Option<String>,
    /// `None` keeps the stored documents on update.
    pub documents: Option<Vec<HousingDocumentRequest>>,
    pub notes: Option<String>,
    pub protocol_number: Option<String>,
    /// When present, replaces the repatriant's stored dependents.
    pub family_composition: Option<FamilyComposition>,
}

// ========================================================================
// Housing queue
// ========================================================================

/// API request to put a repatriant on the housing queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AddToQueueRequest {
    pub repatriant_id: i64,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default)]
    pub has_work: bool,
    #[serde(default)]
    pub has_law_violations: bool,
}

/// API request to change an entry's scoring inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct UpdateQueueRequest {
    pub has_children: bool,
    pub has_work: bool,
    pub has_law_violations: bool,
}

/// API response for a queue write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueEntryResponse {
    pub entry: QueueEntryData,
    pub message: String,
}

// ========================================================================
// Files
// ========================================================================

/// API response for a stored upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    /// The logical path to store on the owning row.
    pub path: String,
    /// The name the file was uploaded with.
    pub filename: String,
}

/// Per-disk usage for admins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageStatsResponse {
    pub disks: Vec<DiskStats>,
    /// The disk the next upload would go to.
    pub best_disk: Option<String>,
}

// ========================================================================
// Administration
// ========================================================================

/// API request to create an operator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    /// One of `ADMIN`, `USER`, `SOCIAL_ADAPTATION`, `HOUSING_DEPARTMENT`.
    pub role: String,
}

/// API response for a created operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub message: String,
}

/// API response for an activation toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleUserResponse {
    pub user_id: i64,
    pub is_active: bool,
    pub message: String,
}

/// Operators with what the caller may do to each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    #[serde(flatten)]
    pub user: UserData,
    pub can_toggle: Capability,
    pub can_delete: Capability,
}

/// Query parameters of the log page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct LogsParams {
    pub page: Option<String>,
}

impl LogsParams {
    #[must_use]
    pub fn page(&self) -> i64 {
        filled(self.page.as_ref())
            .and_then(|p| p.parse::<i64>().ok())
            .map_or(1, |p| p.max(1))
    }
}

/// One page of the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogsResponse {
    pub logs: Vec<LogEntryData>,
    pub page: i64,
    pub total: i64,
    pub pages: i64,
}

/// Query parameters of the export endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ExportParams {
    pub format: Option<String>,
}

// ========================================================================
// Reports
// ========================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryReport {
    pub total_repatriants: i64,
    pub registered_today: i64,
    pub total_users: i64,
    pub active_users: i64,
    pub housing_department_records: i64,
    pub active_queue_entries: i64,
    pub case_notes: CaseNoteCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepatriantsReport {
    pub by_sex: Vec<CountRow>,
    pub top_origins: Vec<CountRow>,
    pub top_nationalities: Vec<CountRow>,
    pub by_family_status: Vec<CountRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialReport {
    pub case_notes: CaseNoteCounts,
    pub help_types: Vec<CountRow>,
    pub event_types: Vec<CountRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserActivityReport {
    pub activity: Vec<UserActivity>,
    /// Most recent logins of active users.
    pub recent_logins: Vec<UserData>,
}

/// A repatriant with many children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LargeFamily {
    #[serde(flatten)]
    pub repatriant: RepatriantSummary,
    pub children: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyReport {
    pub large_families: Vec<LargeFamily>,
    pub without_dependents: Vec<RepatriantSummary>,
}
