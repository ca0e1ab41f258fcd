// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Server configuration.
//!
//! Settings come from an optional TOML file. Command-line arguments take
//! precedence over file values.

use std::fs;
use std::path::{Path, PathBuf};

use repatria_api::StorageDisk;
use serde::Deserialize;
use thiserror::Error;

/// Uploads larger than this are rejected unless configured otherwise.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Credentials of the administrator created on an empty database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
    #[serde(default = "default_admin_name")]
    pub full_name: String,
}

fn default_admin_name() -> String {
    String::from("ADMINISTRATOR")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Path to the `SQLite` database file. In-memory when absent.
    pub database: Option<String>,
    pub port: u16,
    /// Root of the legacy upload folders and the temp preview folder.
    pub upload_folder: PathBuf,
    pub backup_folder: Option<PathBuf>,
    /// Disks that receive documents and avatars, best free space first.
    pub storage_disks: Vec<StorageDisk>,
    pub max_upload_bytes: usize,
    /// The `.docx` application form template.
    pub form_template: PathBuf,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database: None,
            port: 3000,
            upload_folder: PathBuf::from("uploads"),
            backup_folder: None,
            storage_disks: Vec::new(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            form_template: PathBuf::from("templates/form.docx"),
            bootstrap_admin: None,
        }
    }
}

impl ServerConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or has fields of
    /// the wrong type.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads the file at `path`, or the defaults when no path is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text: String = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Applies command-line values on top of the file values.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(database) = overrides.database {
            self.database = Some(database);
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(upload_folder) = overrides.upload_folder {
            self.upload_folder = upload_folder;
        }
        if let Some(form_template) = overrides.form_template {
            self.form_template = form_template;
        }
        self
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub database: Option<String>,
    pub port: Option<u16>,
    pub upload_folder: Option<PathBuf>,
    pub form_template: Option<PathBuf>,
}
