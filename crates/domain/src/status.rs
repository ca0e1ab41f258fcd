// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::Serialize;
use time::{Date, Duration};

/// Repatriant status is valid for five 365-day years from the grant date.
pub const STATUS_VALIDITY_DAYS: i64 = 5 * 365;

/// Validity of a repatriant's status on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusCheck {
    /// No status grant date recorded.
    NotSet,
    /// The status is still valid.
    Active {
        /// Days remaining until expiry (0 on the expiry day itself).
        days_left: i64,
    },
    /// The status has lapsed.
    Expired {
        /// Days elapsed since expiry.
        days_expired: i64,
    },
}

impl StatusCheck {
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        matches!(self, Self::Expired { .. })
    }
}

/// Returns the expiry date for a status granted on `granted`.
#[must_use]
pub fn status_expiry(granted: Date) -> Option<Date> {
    granted.checked_add(Duration::days(STATUS_VALIDITY_DAYS))
}

/// Checks a status grant date against `today`.
#[must_use]
pub fn check_status(granted: Option<Date>, today: Date) -> StatusCheck {
    let Some(expiry) = granted.and_then(status_expiry) else {
        return StatusCheck::NotSet;
    };

    if today > expiry {
        StatusCheck::Expired {
            days_expired: (today - expiry).whole_days(),
        }
    } else {
        StatusCheck::Active {
            days_left: (expiry - today).whole_days(),
        }
    }
}
