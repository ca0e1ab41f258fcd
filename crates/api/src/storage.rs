// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Uploaded file placement.
//!
//! Documents and avatars go to whichever configured disk reports the most
//! free space at write time. Everything else, including PDF previews, goes
//! under the legacy upload folder. There is no rebalancing and no
//! replication; a file lives on exactly one disk.
//!
//! Stored paths are logical: `documents/<file>` and `avatars/<file>` name a
//! file on some disk, `<category>/<file>` names a file under the upload
//! folder.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Extensions accepted for uploads, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["pdf", "png", "jpg", "jpeg", "gif"];

/// Categories placed on the storage disks.
pub const DISK_CATEGORIES: [&str; 2] = ["documents", "avatars"];

/// Folder under the upload folder that holds PDF previews.
pub const TEMP_FOLDER: &str = "temp";

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File type not allowed: {0}")]
    DisallowedExtension(String),

    #[error("Invalid file path: {0}")]
    InvalidPath(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Form template error: {0}")]
    Template(String),
}

/// A configured storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageDisk {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub priority: u32,
}

/// Reads capacity figures for the filesystem holding a path.
pub trait SpaceProbe: Send + Sync {
    /// Bytes available to this process.
    ///
    /// # Errors
    ///
    /// Returns an error if the filesystem cannot be queried.
    fn available_space(&self, path: &Path) -> io::Result<u64>;

    /// Total capacity in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the filesystem cannot be queried.
    fn total_space(&self, path: &Path) -> io::Result<u64>;
}

/// Probe backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fs2Probe;

impl SpaceProbe for Fs2Probe {
    fn available_space(&self, path: &Path) -> io::Result<u64> {
        fs2::available_space(path)
    }

    fn total_space(&self, path: &Path) -> io::Result<u64> {
        fs2::total_space(path)
    }
}

/// Usage figures of one disk, as shown to admins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskStats {
    pub name: String,
    pub path: String,
    pub total_gb: Option<f64>,
    pub used_gb: Option<f64>,
    pub free_gb: Option<f64>,
    pub usage_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Placement and lookup of uploaded files.
pub struct FileStorage {
    disks: Vec<StorageDisk>,
    upload_folder: PathBuf,
    backup_folder: Option<PathBuf>,
    probe: Box<dyn SpaceProbe>,
}

impl std::fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStorage")
            .field("disks", &self.disks)
            .field("upload_folder", &self.upload_folder)
            .field("backup_folder", &self.backup_folder)
            .finish_non_exhaustive()
    }
}

impl FileStorage {
    /// Creates a storage using the operating system probe.
    #[must_use]
    pub fn new(
        disks: Vec<StorageDisk>,
        upload_folder: PathBuf,
        backup_folder: Option<PathBuf>,
    ) -> Self {
        Self::with_probe(disks, upload_folder, backup_folder, Box::new(Fs2Probe))
    }

    #[must_use]
    pub fn with_probe(
        disks: Vec<StorageDisk>,
        upload_folder: PathBuf,
        backup_folder: Option<PathBuf>,
        probe: Box<dyn SpaceProbe>,
    ) -> Self {
        Self {
            disks,
            upload_folder,
            backup_folder,
            probe,
        }
    }

    #[must_use]
    pub fn disks(&self) -> &[StorageDisk] {
        &self.disks
    }

    #[must_use]
    pub fn upload_folder(&self) -> &Path {
        &self.upload_folder
    }

    /// Creates the backup folder, the legacy upload subfolders, and every
    /// disk folder. Failures are logged and skipped.
    pub fn create_folders(&self) {
        let mut folders: Vec<PathBuf> = Vec::new();
        if let Some(backup) = &self.backup_folder {
            folders.push(backup.clone());
        }
        folders.push(self.upload_folder.join(TEMP_FOLDER));
        for category in DISK_CATEGORIES {
            folders.push(self.upload_folder.join(category));
        }
        folders.extend(self.disks.iter().map(|disk| disk.path.clone()));

        for folder in folders {
            match fs::create_dir_all(&folder) {
                Ok(()) => debug!(folder = %folder.display(), "Storage folder ready"),
                Err(e) => warn!(folder = %folder.display(), error = %e, "Failed to create storage folder"),
            }
        }
    }

    /// Picks the disk with the most available space.
    ///
    /// Disks whose probe fails are skipped; ties go to the disk listed
    /// first. When every probe fails the first disk is used.
    #[must_use]
    pub fn best_disk(&self) -> Option<&StorageDisk> {
        let mut best: Option<(&StorageDisk, u64)> = None;

        for disk in &self.disks {
            match self.probe.available_space(&disk.path) {
                Ok(free) => {
                    debug!(disk = %disk.name, free, "Probed disk");
                    if best.is_none_or(|(_, best_free)| free > best_free) {
                        best = Some((disk, free));
                    }
                }
                Err(e) => warn!(disk = %disk.name, error = %e, "Failed to probe disk"),
            }
        }

        match best {
            Some((disk, _)) => Some(disk),
            None => {
                let fallback: Option<&StorageDisk> = self.disks.first();
                if let Some(disk) = fallback {
                    warn!(disk = %disk.name, "No disk could be probed, using the first one");
                }
                fallback
            }
        }
    }

    /// Saves an upload and returns its logical path.
    ///
    /// The stored name is `{prefix}_{8 hex}.{ext}` with the extension of
    /// `original_name`, lowercased.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not allowed, the category is not
    /// a plain folder name, or the write fails.
    pub fn save(
        &self,
        category: &str,
        prefix: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        validate_component(category)?;
        let extension: String = allowed_extension(original_name)?;
        let file_name: String = format!("{}_{}.{extension}", sanitize_prefix(prefix), short_id());

        let folder: PathBuf = self.folder_for(category)?;
        fs::create_dir_all(&folder)?;
        fs::write(folder.join(&file_name), bytes)?;

        let logical: String = format!("{category}/{file_name}");
        info!(path = %logical, folder = %folder.display(), size = bytes.len(), "Saved file");
        Ok(logical)
    }

    /// Saves a PDF for preview before registration and returns
    /// `temp/temp_<8 hex>.pdf`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is not a PDF or the write fails.
    pub fn save_pdf_preview(
        &self,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        let extension: String = allowed_extension(original_name)?;
        if extension != "pdf" {
            return Err(StorageError::DisallowedExtension(extension));
        }

        let file_name: String = format!("temp_{}.pdf", short_id());
        let folder: PathBuf = self.upload_folder.join(TEMP_FOLDER);
        fs::create_dir_all(&folder)?;
        fs::write(folder.join(&file_name), bytes)?;

        info!(file = %file_name, "Saved PDF preview");
        Ok(format!("{TEMP_FOLDER}/{file_name}"))
    }

    /// Moves a PDF preview onto the best disk as the repatriant's document
    /// and returns the new logical path.
    ///
    /// # Errors
    ///
    /// Returns an error if the preview path is not a temp file, it does not
    /// exist, or the move fails.
    pub fn promote_preview(
        &self,
        temp_path: &str,
        repatriant_id: i64,
    ) -> Result<String, StorageError> {
        let (folder, name) = split_logical(temp_path)?;
        if folder != TEMP_FOLDER {
            return Err(StorageError::InvalidPath(temp_path.to_string()));
        }

        let source: PathBuf = self.upload_folder.join(TEMP_FOLDER).join(name);
        if !source.is_file() {
            return Err(StorageError::NotFound(temp_path.to_string()));
        }

        let file_name: String = format!("doc_{repatriant_id}_{}.pdf", short_id());
        let target_folder: PathBuf = self.folder_for("documents")?;
        fs::create_dir_all(&target_folder)?;
        let target: PathBuf = target_folder.join(&file_name);

        // A rename cannot cross filesystems.
        if fs::rename(&source, &target).is_err() {
            fs::copy(&source, &target)?;
            fs::remove_file(&source)?;
        }

        info!(repatriant_id, file = %file_name, "Moved PDF preview to documents");
        Ok(format!("documents/{file_name}"))
    }

    /// Locates a stored file.
    ///
    /// Disk categories are searched on every disk first, then under the
    /// upload folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is malformed or no file exists.
    pub fn resolve(&self, logical_path: &str) -> Result<PathBuf, StorageError> {
        let (category, name) = split_logical(logical_path)?;

        if DISK_CATEGORIES.contains(&category) {
            if let Some(found) = self
                .disks
                .iter()
                .map(|disk| disk.path.join(name))
                .find(|candidate| candidate.is_file())
            {
                return Ok(found);
            }
        }

        let legacy: PathBuf = self.upload_folder.join(category).join(name);
        if legacy.is_file() {
            Ok(legacy)
        } else {
            Err(StorageError::NotFound(logical_path.to_string()))
        }
    }

    /// Deletes a stored file. Returns whether a file was removed.
    pub fn delete(&self, logical_path: &str) -> bool {
        let Ok(path) = self.resolve(logical_path) else {
            debug!(path = %logical_path, "Nothing to delete");
            return false;
        };

        match fs::remove_file(&path) {
            Ok(()) => {
                info!(path = %path.display(), "Deleted file");
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to delete file");
                false
            }
        }
    }

    /// Capacity figures of every disk.
    #[must_use]
    pub fn disk_stats(&self) -> Vec<DiskStats> {
        self.disks
            .iter()
            .map(|disk| {
                let figures: io::Result<(u64, u64)> = self
                    .probe
                    .total_space(&disk.path)
                    .and_then(|total| Ok((total, self.probe.available_space(&disk.path)?)));

                match figures {
                    Ok((total, free)) => {
                        let used: u64 = total.saturating_sub(free);
                        DiskStats {
                            name: disk.name.clone(),
                            path: disk.path.display().to_string(),
                            total_gb: Some(round_to(to_gb(total), 2)),
                            used_gb: Some(round_to(to_gb(used), 2)),
                            free_gb: Some(round_to(to_gb(free), 2)),
                            usage_percent: Some(usage_percent(used, total)),
                            error: None,
                        }
                    }
                    Err(e) => DiskStats {
                        name: disk.name.clone(),
                        path: disk.path.display().to_string(),
                        total_gb: None,
                        used_gb: None,
                        free_gb: None,
                        usage_percent: None,
                        error: Some(e.to_string()),
                    },
                }
            })
            .collect()
    }

    fn folder_for(&self, category: &str) -> Result<PathBuf, StorageError> {
        if DISK_CATEGORIES.contains(&category) {
            match self.best_disk() {
                Some(disk) => Ok(disk.path.clone()),
                None => Ok(self.upload_folder.join(category)),
            }
        } else {
            Ok(self.upload_folder.join(category))
        }
    }
}

/// Returns the lowercased extension if it is allowed.
fn allowed_extension(file_name: &str) -> Result<String, StorageError> {
    let extension: String = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .ok_or_else(|| StorageError::DisallowedExtension(file_name.to_string()))?;

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(StorageError::DisallowedExtension(extension))
    }
}

/// Whether a file name has an allowed extension.
#[must_use]
pub fn is_allowed_file(file_name: &str) -> bool {
    allowed_extension(file_name).is_ok()
}

/// Rejects anything that is not a single plain path component.
fn validate_component(value: &str) -> Result<(), StorageError> {
    let invalid: bool = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0'])
        || value.contains(':');
    if invalid {
        Err(StorageError::InvalidPath(value.to_string()))
    } else {
        Ok(())
    }
}

/// Splits `category/name` into its two components.
fn split_logical(logical_path: &str) -> Result<(&str, &str), StorageError> {
    let (category, name) = logical_path
        .split_once('/')
        .ok_or_else(|| StorageError::InvalidPath(logical_path.to_string()))?;
    validate_component(category)?;
    validate_component(name)?;
    Ok((category, name))
}

fn sanitize_prefix(prefix: &str) -> String {
    let cleaned: String = prefix
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        String::from("file")
    } else {
        cleaned
    }
}

fn short_id() -> String {
    format!("{:08x}", rand::random::<u32>())
}

#[allow(clippy::cast_precision_loss)]
fn to_gb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GB
}

#[allow(clippy::cast_precision_loss)]
fn usage_percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        round_to(used as f64 / total as f64 * 100.0, 1)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor: f64 = 10_f64.powi(decimals);
    (value * factor).round() / factor
}
