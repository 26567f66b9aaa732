//! Backlog store: whole-collection load/save of news records.
//!
//! The backlog is one JSON file holding an ordered list of records. Writes
//! go through a temp file + rename so a crash never leaves a torn backlog,
//! and an internal mutex serializes file cycles between the batch pass and
//! an on-demand cache write-back.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::record::NewsRecord;

pub trait BacklogStore: Send + Sync {
    fn load(&self) -> Result<Vec<NewsRecord>>;
    fn save(&self, records: &[NewsRecord]) -> Result<()>;
}

pub struct JsonStore {
    path: PathBuf,
    file_lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BacklogStore for JsonStore {
    /// A missing backlog file is an empty backlog, not an error.
    fn load(&self) -> Result<Vec<NewsRecord>> {
        let _guard = self.file_lock.lock().expect("backlog file lock poisoned");
        let raw = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading backlog {}", self.path.display()))
            }
        };
        serde_json::from_str(&raw)
            .with_context(|| format!("decoding backlog {}", self.path.display()))
    }

    fn save(&self, records: &[NewsRecord]) -> Result<()> {
        let _guard = self.file_lock.lock().expect("backlog file lock poisoned");
        let json = serde_json::to_string_pretty(records).context("encoding backlog")?;
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut f = fs::File::create(&tmp)
                .with_context(|| format!("creating {}", tmp.display()))?;
            f.write_all(json.as_bytes())
                .with_context(|| format!("writing {}", tmp.display()))?;
        }
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing backlog {}", self.path.display()))?;
        Ok(())
    }
}
