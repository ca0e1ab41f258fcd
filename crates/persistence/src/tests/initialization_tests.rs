// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::Persistence;

#[test]
fn test_in_memory_databases_are_isolated() {
    let mut first = Persistence::new_in_memory().unwrap();
    let mut second = Persistence::new_in_memory().unwrap();

    super::register_test_repatriant(&mut first, "ПЕТРОВ");

    assert_eq!(first.count_repatriants().unwrap(), 1);
    assert_eq!(second.count_repatriants().unwrap(), 0);
}

#[test]
fn test_foreign_keys_are_enforced() {
    let mut persistence = super::create_test_persistence();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_file_database_persists_between_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("repatria.db");

    {
        let mut persistence = Persistence::new_with_file(&path).unwrap();
        super::register_test_repatriant(&mut persistence, "СИДОРОВ");
    }

    let mut reopened = Persistence::new_with_file(&path).unwrap();
    assert_eq!(reopened.count_repatriants().unwrap(), 1);
}
