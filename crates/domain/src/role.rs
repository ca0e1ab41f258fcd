// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Operator roles.
///
/// The stored string values are part of the database contract. Registration
/// staff are stored as `USER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full access, including users, logs, reports, and restores.
    #[serde(rename = "ADMIN")]
    Admin,
    /// Registration staff: register, edit, and search repatriants.
    #[serde(rename = "USER")]
    Registrar,
    /// Social adaptation department: case notes and the social view.
    #[serde(rename = "SOCIAL_ADAPTATION")]
    SocialAdaptation,
    /// Housing department: department records and the housing queue.
    #[serde(rename = "HOUSING_DEPARTMENT")]
    HousingDepartment,
}

impl Role {
    /// Returns the stored string for this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Registrar => "USER",
            Self::SocialAdaptation => "SOCIAL_ADAPTATION",
            Self::HousingDepartment => "HOUSING_DEPARTMENT",
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Department roles may not register or edit repatriants.
    #[must_use]
    pub const fn can_register_repatriants(self) -> bool {
        !matches!(self, Self::SocialAdaptation | Self::HousingDepartment)
    }

    #[must_use]
    pub const fn can_view_social(self) -> bool {
        matches!(self, Self::SocialAdaptation | Self::Admin)
    }

    #[must_use]
    pub const fn can_view_housing(self) -> bool {
        matches!(self, Self::HousingDepartment | Self::Admin)
    }

    /// Whether soft-deleted case notes are included in reads.
    #[must_use]
    pub const fn sees_deleted_records(self) -> bool {
        self.is_admin()
    }

    /// Social adaptation staff see repatriants with a status date first.
    #[must_use]
    pub const fn orders_by_status_first(self) -> bool {
        matches!(self, Self::SocialAdaptation)
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::Registrar),
            "SOCIAL_ADAPTATION" => Ok(Self::SocialAdaptation),
            "HOUSING_DEPARTMENT" => Ok(Self::HousingDepartment),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
