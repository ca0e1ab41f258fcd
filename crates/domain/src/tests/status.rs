// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::macros::date;

use crate::{StatusCheck, check_status, status_expiry};

#[test]
fn test_status_not_set_without_grant_date() {
    assert_eq!(check_status(None, date!(2026 - 01 - 01)), StatusCheck::NotSet);
}

#[test]
fn test_expiry_is_five_365_day_years() {
    assert_eq!(
        status_expiry(date!(2020 - 01 - 01)),
        Some(date!(2024 - 12 - 30))
    );
}

#[test]
fn test_status_active_until_expiry_day_inclusive() {
    let granted = date!(2020 - 01 - 01);
    assert_eq!(
        check_status(Some(granted), date!(2024 - 12 - 20)),
        StatusCheck::Active { days_left: 10 }
    );
    assert_eq!(
        check_status(Some(granted), date!(2024 - 12 - 30)),
        StatusCheck::Active { days_left: 0 }
    );
}

#[test]
fn test_status_expired_after_expiry_day() {
    let check: StatusCheck = check_status(Some(date!(2020 - 01 - 01)), date!(2025 - 01 - 04));
    assert_eq!(check, StatusCheck::Expired { days_expired: 5 });
    assert!(check.is_expired());
}
