// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Records returned by queries and the inputs accepted by mutations.
//!
//! Text inputs are stored as given; normalization happens before they reach
//! this crate.

use diesel::prelude::*;
use repatria_domain::{DependentKind, Role, classify_relationship};
use serde::{Deserialize, Serialize};

use crate::diesel_schema::{
    action_log, children, event_records, family_members, housing_queue, housing_records,
    other_records, repatriants, social_help_records,
};

/// A registered repatriant.
#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable)]
#[diesel(table_name = repatriants)]
pub struct RepatriantData {
    pub repatriant_id: i64,
    pub file_code: Option<String>,
    pub birth_surname: Option<String>,
    pub surname: Option<String>,
    pub given_name: Option<String>,
    pub patronymic: Option<String>,
    pub country_of_residence: Option<String>,
    pub arrived_from: Option<String>,
    pub commission_decision: bool,
    pub birth_date: Option<String>,
    pub sex: Option<String>,
    pub birthplace: Option<String>,
    pub family_status: Option<String>,
    pub status_granted_on: Option<String>,
    pub registered_on: Option<String>,
    pub additional_info: Option<String>,
    pub avatar_path: Option<String>,
    pub documents_path: Option<String>,
    pub identity_document: Option<String>,
    pub identity_document_number: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub nationality: Option<String>,
}

impl RepatriantData {
    /// Surname, given name and patronymic joined by spaces, skipping blanks.
    #[must_use]
    pub fn full_name(&self) -> String {
        join_name(&[
            self.surname.as_deref(),
            self.given_name.as_deref(),
            self.patronymic.as_deref(),
        ])
    }
}

pub(crate) fn join_name(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Every column of a repatriant except the id, as written on register.
#[derive(Debug, Clone, PartialEq, Default, Insertable)]
#[diesel(table_name = repatriants)]
pub struct RepatriantFields {
    pub file_code: Option<String>,
    pub birth_surname: Option<String>,
    pub surname: Option<String>,
    pub given_name: Option<String>,
    pub patronymic: Option<String>,
    pub country_of_residence: Option<String>,
    pub arrived_from: Option<String>,
    pub commission_decision: bool,
    pub birth_date: Option<String>,
    pub sex: Option<String>,
    pub birthplace: Option<String>,
    pub family_status: Option<String>,
    pub status_granted_on: Option<String>,
    pub registered_on: Option<String>,
    pub additional_info: Option<String>,
    pub avatar_path: Option<String>,
    pub documents_path: Option<String>,
    pub identity_document: Option<String>,
    pub identity_document_number: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub nationality: Option<String>,
}

/// A partial update of a repatriant. `None` keeps the stored value.
#[derive(Debug, Clone, PartialEq, Default, AsChangeset)]
#[diesel(table_name = repatriants)]
pub struct RepatriantChanges {
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
    pub avatar_path: Option<String>,
    pub documents_path: Option<String>,
    pub identity_document: Option<String>,
    pub identity_document_number: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub nationality: Option<String>,
}

impl RepatriantChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A dependent as submitted. The relationship decides whether it is stored
/// as a child or as an adult family member.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct DependentInput {
    pub relationship: Option<String>,
    pub full_name: Option<String>,
    pub birth_year: Option<String>,
    pub birthplace: Option<String>,
    pub citizenship: Option<String>,
    pub nationality: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub lives_with_parent: bool,
}

impl DependentInput {
    #[must_use]
    pub fn kind(&self) -> DependentKind {
        classify_relationship(self.relationship.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Queryable, Selectable)]
#[diesel(table_name = children)]
pub struct ChildData {
    pub child_id: i64,
    pub repatriant_id: i64,
    pub relationship: Option<String>,
    pub full_name: Option<String>,
    pub birth_year: Option<String>,
    pub birthplace: Option<String>,
    pub citizenship: Option<String>,
    pub nationality: Option<String>,
    pub lives_with_parent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Queryable, Selectable)]
#[diesel(table_name = family_members)]
pub struct FamilyMemberData {
    pub member_id: i64,
    pub repatriant_id: i64,
    pub relationship: Option<String>,
    pub full_name: Option<String>,
    pub birth_year: Option<i32>,
    pub citizenship: Option<String>,
    pub nationality: Option<String>,
    pub address: Option<String>,
    pub lives_with_parent: bool,
}

/// The dependents of one repatriant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Family {
    pub children: Vec<ChildData>,
    pub family_members: Vec<FamilyMemberData>,
}

/// A system operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub user_id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: String,
    pub last_login_at: Option<String>,
    pub created_by: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub user_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    pub expires_at: String,
}

/// Soft-delete bookkeeping shared by every case-note kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordMeta {
    pub created_at: String,
    pub created_by: Option<i64>,
    pub is_deleted: bool,
    pub deleted_at: Option<String>,
    pub deleted_by: Option<i64>,
}

/// A rented or provided accommodation of a repatriant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HousingRecordData {
    pub record_id: i64,
    pub repatriant_id: i64,
    pub contract_number: Option<String>,
    pub address: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub cost: Option<f64>,
    pub documents: Vec<String>,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewHousingRecord {
    pub contract_number: Option<String>,
    pub address: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub cost: Option<f64>,
    pub documents: Vec<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HousingRecordChanges {
    pub contract_number: Option<String>,
    pub address: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub cost: Option<f64>,
    pub documents: Option<Vec<String>>,
    pub notes: Option<String>,
}

#[derive(AsChangeset)]
#[diesel(table_name = housing_records)]
pub(crate) struct HousingRecordChangeset {
    pub contract_number: Option<String>,
    pub address: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub cost: Option<f64>,
    pub documents: Option<String>,
    pub notes: Option<String>,
}

/// Material or financial help given to a repatriant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialHelpRecordData {
    pub record_id: i64,
    pub repatriant_id: i64,
    pub help_type: String,
    pub custom_help_type: Option<String>,
    pub responsible: Option<String>,
    pub help_date: String,
    pub amount: Option<String>,
    pub documents: Vec<String>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewSocialHelpRecord {
    pub help_type: String,
    pub custom_help_type: Option<String>,
    pub responsible: Option<String>,
    pub help_date: String,
    pub amount: Option<String>,
    pub documents: Vec<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SocialHelpRecordChanges {
    pub help_type: Option<String>,
    pub custom_help_type: Option<String>,
    pub responsible: Option<String>,
    pub help_date: Option<String>,
    pub amount: Option<String>,
    pub documents: Option<Vec<String>>,
    pub description: Option<String>,
}

#[derive(AsChangeset)]
#[diesel(table_name = social_help_records)]
pub(crate) struct SocialHelpRecordChangeset {
    pub help_type: Option<String>,
    pub custom_help_type: Option<String>,
    pub responsible: Option<String>,
    pub help_date: Option<String>,
    pub amount: Option<String>,
    pub documents: Option<String>,
    pub description: Option<String>,
}

/// An event a repatriant took part in.
#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable)]
#[diesel(table_name = event_records)]
pub struct EventRecordData {
    pub record_id: i64,
    pub repatriant_id: i64,
    pub event_name: String,
    pub event_start_date: String,
    pub event_end_date: Option<String>,
    pub event_location: Option<String>,
    pub event_type: Option<String>,
    pub event_amount: Option<f64>,
    pub description: Option<String>,
    pub created_at: String,
    pub created_by: Option<i64>,
    pub is_deleted: bool,
    pub deleted_at: Option<String>,
    pub deleted_by: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Default, Insertable)]
#[diesel(table_name = event_records)]
pub struct NewEventRecord {
    pub event_name: String,
    pub event_start_date: String,
    pub event_end_date: Option<String>,
    pub event_location: Option<String>,
    pub event_type: Option<String>,
    pub event_amount: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, AsChangeset)]
#[diesel(table_name = event_records)]
pub struct EventRecordChanges {
    pub event_name: Option<String>,
    pub event_start_date: Option<String>,
    pub event_end_date: Option<String>,
    pub event_location: Option<String>,
    pub event_type: Option<String>,
    pub event_amount: Option<f64>,
    pub description: Option<String>,
}

/// A free-form note about a repatriant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Queryable, Selectable)]
#[diesel(table_name = other_records)]
pub struct OtherRecordData {
    pub record_id: i64,
    pub repatriant_id: i64,
    pub title: String,
    pub record_date: String,
    pub category: Option<String>,
    pub content: String,
    pub created_at: String,
    pub created_by: Option<i64>,
    pub is_deleted: bool,
    pub deleted_at: Option<String>,
    pub deleted_by: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Insertable)]
#[diesel(table_name = other_records)]
pub struct NewOtherRecord {
    pub title: String,
    pub record_date: String,
    pub category: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, AsChangeset)]
#[diesel(table_name = other_records)]
pub struct OtherRecordChanges {
    pub title: Option<String>,
    pub record_date: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
}

/// A document attached to a housing department record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HousingDocument {
    pub path: String,
    #[serde(default)]
    pub name: String,
}

/// Older rows store bare paths instead of `{path, name}` objects.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum StoredHousingDocument {
    Named(HousingDocument),
    Bare(String),
}

impl From<StoredHousingDocument> for HousingDocument {
    fn from(stored: StoredHousingDocument) -> Self {
        match stored {
            StoredHousingDocument::Named(document) => document,
            StoredHousingDocument::Bare(path) => Self {
                path,
                name: String::new(),
            },
        }
    }
}

/// The housing outcome recorded by the housing department.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HousingDepartmentRecordData {
    pub record_id: i64,
    pub repatriant_id: i64,
    pub category: Option<String>,
    pub received_housing: bool,
    pub housing_type: Option<String>,
    pub housing_acquisition: Option<String>,
    pub address: Option<String>,
    pub has_warrant: bool,
    pub repair_amount: Option<f64>,
    pub documents: Vec<HousingDocument>,
    pub notes: Option<String>,
    pub protocol_number: Option<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

/// Fields of a housing department record as written on create or update.
///
/// `documents` of `None` keeps the stored list on update and means an empty
/// list on create.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HousingDepartmentInput {
    pub category: Option<String>,
    pub received_housing: bool,
    pub housing_type: Option<String>,
    pub housing_acquisition: Option<String>,
    pub address: Option<String>,
    pub has_warrant: bool,
    pub repair_amount: Option<f64>,
    pub documents: Option<Vec<HousingDocument>>,
    pub notes: Option<String>,
    pub protocol_number: Option<String>,
}

impl HousingDepartmentInput {
    /// Acquisition and address only exist for housing that was received.
    #[must_use]
    pub fn with_received_housing_rule(mut self) -> Self {
        if !self.received_housing {
            self.housing_acquisition = None;
            self.address = None;
        }
        self
    }
}

/// A row of the housing waitlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Queryable, Selectable)]
#[diesel(table_name = housing_queue)]
pub struct QueueEntryData {
    pub entry_id: i64,
    pub repatriant_id: i64,
    pub has_children: bool,
    pub has_work: bool,
    pub has_law_violations: bool,
    pub total_score: i64,
    pub queue_position: Option<i32>,
    pub added_at: String,
    pub added_by: Option<i64>,
    pub removed_at: Option<String>,
    pub removed_by: Option<i64>,
    pub is_active: bool,
}

/// An active queue entry after ranking, with the repatriant's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedQueueEntry {
    #[serde(flatten)]
    pub entry: QueueEntryData,
    pub full_name: String,
}

/// A line of the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Queryable, Selectable)]
#[diesel(table_name = action_log)]
pub struct LogEntryData {
    pub log_id: i64,
    pub repatriant_id: Option<i64>,
    pub user_id: Option<i64>,
    pub username: String,
    pub action_name: String,
    pub action_text: String,
    pub logged_on: String,
    pub logged_at: String,
}

impl LogEntryData {
    /// `username: ACTION`, the form shown in the history views.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{}: {}", self.username, self.action_text)
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    pub rows: Vec<RepatriantData>,
    pub page: i64,
    pub total: i64,
    pub pages: i64,
}

/// A repatriant as shown by the picker lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepatriantSummary {
    pub repatriant_id: i64,
    pub file_code: Option<String>,
    pub full_name: String,
}

/// A value and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountRow {
    pub value: String,
    pub count: i64,
}
