// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::DomainError;

#[test]
fn test_domain_error_display() {
    let err: DomainError = DomainError::InvalidRole(String::from("GUEST"));
    assert_eq!(format!("{err}"), "Invalid role: GUEST");

    let err: DomainError = DomainError::MissingField("address");
    assert_eq!(format!("{err}"), "Required field 'address' is missing");

    let err: DomainError = DomainError::AlreadyQueued { repatriant_id: 7 };
    assert_eq!(
        format!("{err}"),
        "Repatriant 7 is already in the housing queue"
    );

    let err: DomainError = DomainError::SelfModification(String::from("delete"));
    assert_eq!(format!("{err}"), "Cannot delete your own account");

    let err: DomainError = DomainError::DuplicateUsername(String::from("ivanov"));
    assert_eq!(format!("{err}"), "Username 'ivanov' already exists");
}
