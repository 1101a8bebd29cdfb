//! Backup export and restore.
//!
//! A backup is the zip archive produced by `POST /api/data/backup`:
//! a `data.json` document tagged `metadata.type = "inventory_backup"`,
//! plus item images under `images/`. Archives are checked locally before
//! they are saved or uploaded so a truncated download or a stray zip
//! file is caught without touching the service.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::client::HttpBackend;
use crate::config::Config;
use crate::confirm::{confirm, Approval};

const DATA_FILE: &str = "data.json";
const BACKUP_TYPE: &str = "inventory_backup";

/// What a verified archive contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSummary {
    pub version: Option<String>,
    pub created: Option<String>,
    pub items: usize,
    pub shelves: usize,
    pub containers: usize,
    pub images: usize,
}

#[derive(Deserialize)]
struct BackupData {
    #[serde(default)]
    metadata: BackupMetadata,
    #[serde(default)]
    storage: BackupStorage,
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

#[derive(Deserialize, Default)]
struct BackupMetadata {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

#[derive(Deserialize, Default)]
struct BackupStorage {
    #[serde(default)]
    shelves: Vec<serde_json::Value>,
    #[serde(default)]
    containers: Vec<serde_json::Value>,
}

/// Opens the archive and validates its `data.json`.
pub fn inspect_archive(bytes: &[u8]) -> Result<BackupSummary> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).context("Not a valid zip archive")?;

    let images = archive
        .file_names()
        .filter(|name| name.starts_with("images/") && !name.ends_with('/'))
        .count();

    let mut body = String::new();
    archive
        .by_name(DATA_FILE)
        .with_context(|| format!("Invalid backup file: missing {}", DATA_FILE))?
        .read_to_string(&mut body)
        .with_context(|| format!("Failed to read {} from archive", DATA_FILE))?;

    let data: BackupData = serde_json::from_str(&body)
        .with_context(|| format!("Invalid backup file: {} is not valid JSON", DATA_FILE))?;
    if data.metadata.kind.as_deref() != Some(BACKUP_TYPE) {
        bail!("Invalid backup file: incorrect format");
    }

    Ok(BackupSummary {
        version: data.metadata.version,
        created: data.metadata.date,
        items: data.items.len(),
        shelves: data.storage.shelves.len(),
        containers: data.storage.containers.len(),
        images,
    })
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn default_backup_name() -> PathBuf {
    PathBuf::from(
        chrono::Local::now()
            .format("inventory_backup_%Y%m%d_%H%M%S.zip")
            .to_string(),
    )
}

fn print_summary(summary: &BackupSummary) {
    if let Some(version) = &summary.version {
        println!("  Version:     {}", version);
    }
    if let Some(created) = &summary.created {
        println!("  Created:     {}", created);
    }
    println!("  Items:       {}", summary.items);
    println!("  Shelves:     {}", summary.shelves);
    println!("  Containers:  {}", summary.containers);
    println!("  Images:      {}", summary.images);
}

pub async fn run_export(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let backend = HttpBackend::new(&config.service)?;
    let bytes = backend
        .export_backup()
        .await
        .context("Error creating backup")?;
    let summary = inspect_archive(&bytes).context("Service returned an unusable backup")?;

    let path = output.unwrap_or_else(default_backup_name);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    std::fs::write(&path, &bytes)
        .with_context(|| format!("Failed to write backup: {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "backup saved");

    println!("Backup saved to {}", path.display());
    print_summary(&summary);
    println!("  SHA-256:     {}", sha256_hex(&bytes));
    Ok(())
}

pub async fn run_import(config: &Config, path: &Path, yes: bool) -> Result<()> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read backup: {}", path.display()))?;
    let summary = inspect_archive(&bytes)?;

    println!("Backup {}", path.display());
    print_summary(&summary);
    println!("  SHA-256:     {}", sha256_hex(&bytes));

    match confirm(
        "Restoring replaces all inventory data on the service. Continue?",
        yes,
    )? {
        Approval::Granted => {}
        Approval::Declined => {
            println!("Cancelled.");
            return Ok(());
        }
        Approval::Unavailable => {
            bail!("Refusing to restore without confirmation. Re-run with --yes.")
        }
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("backup.zip");
    let backend = HttpBackend::new(&config.service)?;
    let message = backend
        .restore_backup(file_name, bytes)
        .await
        .context("Error restoring backup")?;
    println!("{}", message);
    Ok(())
}
