// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use repatria_domain::Role;
use repatria_persistence::{DependentInput, Persistence};
use tempfile::TempDir;
use time::macros::{date, datetime};
use time::{Date, OffsetDateTime};

use crate::{
    AuthenticatedActor, FileStorage, RegisterRepatriantRequest, RepatriantForm, SpaceProbe,
    StorageDisk, register_repatriant,
};

pub const TEST_PASSWORD: &str = "secret-password";

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().unwrap()
}

/// Creates a user with the given role and returns it as an actor.
pub fn create_actor(persistence: &mut Persistence, username: &str, role: Role) -> AuthenticatedActor {
    let user_id: i64 = persistence
        .create_user(username, TEST_PASSWORD, "TEST OPERATOR", role, None)
        .unwrap();
    AuthenticatedActor::new(
        user_id,
        username.to_string(),
        String::from("TEST OPERATOR"),
        role,
    )
}

pub fn create_test_admin(persistence: &mut Persistence) -> AuthenticatedActor {
    create_actor(persistence, "admin", Role::Admin)
}

pub fn create_test_registrar(persistence: &mut Persistence) -> AuthenticatedActor {
    create_actor(persistence, "registrar", Role::Registrar)
}

pub fn create_test_social(persistence: &mut Persistence) -> AuthenticatedActor {
    create_actor(persistence, "social", Role::SocialAdaptation)
}

pub fn create_test_housing(persistence: &mut Persistence) -> AuthenticatedActor {
    create_actor(persistence, "housing", Role::HousingDepartment)
}

pub const fn test_today() -> Date {
    date!(2026 - 03 - 01)
}

pub const fn test_now() -> OffsetDateTime {
    datetime!(2026-03-01 12:00:00 UTC)
}

pub fn create_test_form(surname: &str) -> RepatriantForm {
    RepatriantForm {
        surname: Some(surname.to_string()),
        given_name: Some(String::from("иван")),
        patronymic: Some(String::from("петрович")),
        sex: Some(String::from("м")),
        birth_date: Some(String::from("1980-05-17")),
        arrived_from: Some(String::from("казахстан")),
        ..RepatriantForm::default()
    }
}

pub fn create_test_dependent(relationship: &str, full_name: &str, birth_year: &str) -> DependentInput {
    DependentInput {
        relationship: Some(relationship.to_string()),
        full_name: Some(full_name.to_string()),
        birth_year: Some(birth_year.to_string()),
        ..DependentInput::default()
    }
}

/// A storage rooted in a temp dir with two disks.
pub struct TestStorage {
    pub dir: TempDir,
    pub storage: FileStorage,
}

impl TestStorage {
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }
}

/// Probe reporting fixed free space per disk path.
pub struct FixedProbe {
    pub free: HashMap<PathBuf, u64>,
    pub total: u64,
}

impl SpaceProbe for FixedProbe {
    fn available_space(&self, path: &Path) -> io::Result<u64> {
        self.free
            .get(path)
            .copied()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "unknown disk"))
    }

    fn total_space(&self, path: &Path) -> io::Result<u64> {
        self.available_space(path).map(|_| self.total)
    }
}

/// Two disks, `disk2` having more free space. Missing entries in `free`
/// make the probe fail for that disk.
pub fn create_test_storage_with(free: &[(&str, u64)]) -> TestStorage {
    let dir: TempDir = TempDir::new().unwrap();
    let disks: Vec<StorageDisk> = ["disk1", "disk2"]
        .iter()
        .enumerate()
        .map(|(i, name)| StorageDisk {
            name: (*name).to_string(),
            path: dir.path().join(name),
            priority: u32::try_from(i).unwrap(),
        })
        .collect();
    let probe: FixedProbe = FixedProbe {
        free: free
            .iter()
            .map(|(name, bytes)| (dir.path().join(name), *bytes))
            .collect(),
        total: 100 * 1024 * 1024 * 1024,
    };
    let storage: FileStorage = FileStorage::with_probe(
        disks,
        dir.path().join("uploads"),
        Some(dir.path().join("backups")),
        Box::new(probe),
    );
    storage.create_folders();
    TestStorage { dir, storage }
}

pub fn create_test_storage() -> TestStorage {
    create_test_storage_with(&[("disk1", 10), ("disk2", 20)])
}

/// Registers a repatriant through the API and returns its ID.
pub fn register_test_repatriant(
    persistence: &mut Persistence,
    storage: &FileStorage,
    actor: &AuthenticatedActor,
    surname: &str,
) -> i64 {
    let request: RegisterRepatriantRequest = RegisterRepatriantRequest {
        form: create_test_form(surname),
        ..RegisterRepatriantRequest::default()
    };
    register_repatriant(persistence, storage, &request, actor, test_today())
        .unwrap()
        .repatriant_id
}
