// src/cache.rs
// =============================================================================
// Durable per-account storage: one pretty-printed JSON file per account,
// `<data_dir>/<account>.json`.
//
// - exists(): the file is there
// - load():   NotFound if absent, CorruptRecord if it doesn't parse (or is
//             filed under the wrong name)
// - store():  write to a temp file in the same directory, fsync, then rename
//             over the target. A crash leaves either the old file or the new
//             one, never half of one.
// - scan():   every record in the directory, for graph assembly
// =============================================================================

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::account::{AccountId, AccountRecord};
use crate::error::{CrawlError, Result};

#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

// Result of reading the whole cache directory
#[derive(Debug, Default)]
pub struct CacheScan {
    /// Parsed records, sorted by username.
    pub records: Vec<AccountRecord>,
    /// Files that looked like records but could not be used.
    pub corrupt: Vec<PathBuf>,
}

impl FileCache {
    /// Opens the cache directory. With `create`, a missing directory is
    /// created; otherwise it is a StorageUnavailable error.
    pub fn open(dir: impl Into<PathBuf>, create: bool) -> Result<Self> {
        let dir = dir.into();

        if !dir.exists() {
            if !create {
                return Err(CrawlError::storage(&dir, "directory does not exist"));
            }
            fs::create_dir_all(&dir).map_err(|e| CrawlError::storage(&dir, e))?;
            debug!(dir = %dir.display(), "created data directory");
        }

        // Something else (a plain file) is in the way
        if !dir.is_dir() {
            return Err(CrawlError::storage(&dir, "not a directory"));
        }

        // Try a throwaway temp file: fail now rather than after the first fetch
        if create {
            NamedTempFile::new_in(&dir).map_err(|e| CrawlError::storage(&dir, e))?;
        }

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, account: &AccountId) -> PathBuf {
        self.dir.join(format!("{}.json", account))
    }

    pub fn exists(&self, account: &AccountId) -> bool {
        self.path_for(account).is_file()
    }

    pub fn load(&self, account: &AccountId) -> Result<AccountRecord> {
        let path = self.path_for(account);

        // Read raw bytes: a file that isn't valid UTF-8 is a corrupt record,
        // not an I/O failure, so serde_json gets to reject it below
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            // Absent is the normal cache-miss case
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CrawlError::NotFound(account.clone()))
            }
            // Permissions, a directory where the file should be, ...
            Err(e) => return Err(CrawlError::RecordUnavailable { path, source: e }),
        };

        let record: AccountRecord =
            serde_json::from_slice(&bytes).map_err(|e| CrawlError::corrupt(&path, e))?;

        // A record filed under another account's name can't be trusted either
        if &record.username != account {
            return Err(CrawlError::corrupt(
                &path,
                format!("record is for '{}'", record.username),
            ));
        }

        Ok(record)
    }

    pub fn store(&self, record: &AccountRecord) -> Result<()> {
        let path = self.path_for(&record.username);

        // Failing to create or fill a temp file means the directory itself
        // is unusable (gone, read-only, disk full): every later store would
        // fail the same way
        let storage_err = |e: io::Error| CrawlError::storage(&self.dir, e);
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(storage_err)?;
        serde_json::to_writer_pretty(&mut tmp, record)
            .map_err(|e| storage_err(io::Error::from(e)))?;
        tmp.write_all(b"\n").map_err(storage_err)?;
        tmp.as_file().sync_all().map_err(storage_err)?;

        // The rename is the only step tied to this account's path. If it
        // fails (say a directory sits at <id>.json), only this record is lost.
        // The temp file is removed when the PersistError is dropped.
        tmp.persist(&path).map_err(|e| CrawlError::RecordUnavailable {
            path: path.clone(),
            source: e.error,
        })?;

        debug!(account = %record.username, path = %path.display(), "stored record");
        Ok(())
    }

    /// Reads every `*.json` record. Unusable files are logged and reported in
    /// `corrupt` instead of failing the scan.
    pub fn scan(&self) -> Result<CacheScan> {
        let mut scan = CacheScan::default();

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();

            // Only *.json files are records; temp files and notes are ignored
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            // The file name must already be a normalized id, otherwise
            // load() would look for it under a different name
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            let account = match AccountId::parse(stem) {
                Ok(id) if id.as_str() == stem => id,
                _ => {
                    warn!(path = %path.display(), "file name is not a normalized account id; skipping");
                    scan.corrupt.push(path);
                    continue;
                }
            };

            match self.load(&account) {
                Ok(record) => scan.records.push(record),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable record");
                    scan.corrupt.push(path);
                }
            }
        }

        // read_dir order is platform-dependent; sort so scans are repeatable
        scan.records.sort_by(|a, b| a.username.cmp(&b.username));
        scan.corrupt.sort();
        Ok(scan)
    }
}
