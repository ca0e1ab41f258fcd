// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::path::{Path, PathBuf};

use crate::config::{ConfigError, DEFAULT_MAX_UPLOAD_BYTES, Overrides, ServerConfig};

#[test]
fn test_empty_file_uses_defaults() {
    let config: ServerConfig = ServerConfig::from_toml("").unwrap();

    assert_eq!(config, ServerConfig::default());
    assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    assert_eq!(config.port, 3000);
    assert!(config.database.is_none());
}

#[test]
fn test_full_file_is_parsed() {
    let text: &str = r#"
        database = "repatria.db"
        upload_folder = "/srv/uploads"
        backup_folder = "/srv/backups"
        max_upload_bytes = 1024
        form_template = "/srv/form.docx"

        [[storage_disks]]
        name = "disk1"
        path = "/mnt/disk1"

        [[storage_disks]]
        name = "disk2"
        path = "/mnt/disk2"
        priority = 1

        [bootstrap_admin]
        username = "admin"
        password = "changeme"
    "#;

    let config: ServerConfig = ServerConfig::from_toml(text).unwrap();

    assert_eq!(config.database.as_deref(), Some("repatria.db"));
    assert_eq!(config.upload_folder, PathBuf::from("/srv/uploads"));
    assert_eq!(config.backup_folder, Some(PathBuf::from("/srv/backups")));
    assert_eq!(config.max_upload_bytes, 1024);
    assert_eq!(config.storage_disks.len(), 2);
    assert_eq!(config.storage_disks[1].priority, 1);
    let admin = config.bootstrap_admin.unwrap();
    assert_eq!(admin.username, "admin");
    assert_eq!(admin.full_name, "ADMINISTRATOR");
}

#[test]
fn test_wrong_type_is_a_parse_error() {
    let result: Result<ServerConfig, ConfigError> = ServerConfig::from_toml("port = \"eighty\"");

    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_missing_file_is_a_read_error() {
    let result: Result<ServerConfig, ConfigError> =
        ServerConfig::load(Some(Path::new("/nonexistent/repatria.toml")));

    assert!(matches!(result, Err(ConfigError::Read { .. })));
}

#[test]
fn test_command_line_overrides_file_values() {
    let config: ServerConfig = ServerConfig::from_toml("port = 8080\ndatabase = \"file.db\"")
        .unwrap()
        .with_overrides(Overrides {
            database: Some(String::from("cli.db")),
            upload_folder: Some(PathBuf::from("/tmp/uploads")),
            ..Overrides::default()
        });

    assert_eq!(config.database.as_deref(), Some("cli.db"));
    assert_eq!(config.port, 8080);
    assert_eq!(config.upload_folder, PathBuf::from("/tmp/uploads"));
}
