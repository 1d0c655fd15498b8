//! Directory-backed feedback store
//!
//! Each feedback item lives in `<dir>/<id>.json` as pretty-printed JSON. The
//! whole directory is loaded into memory on open; writes go to both the cache
//! and disk.

use crate::models::{Feedback, FeedbackSeverity, FeedbackStatus, FeedbackType};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default store location, relative to the working directory
pub const DEFAULT_STORE_DIR: &str = "data/feedback";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    pub total_feedbacks: usize,
    /// Bytes used by the JSON files
    pub storage_size: u64,
}

#[derive(Debug)]
pub struct FeedbackStorage {
    dir: PathBuf,
    cache: HashMap<String, Feedback>,
}

impl FeedbackStorage {
    /// Open (creating if needed) a store directory and load its contents
    ///
    /// Files that cannot be read or parsed are skipped with a warning.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let mut cache = HashMap::new();
        for path in json_files(&dir)? {
            match load_file(&path) {
                Ok(feedback) => {
                    cache.insert(feedback.id.clone(), feedback);
                }
                Err(e) => log::warn!("Skipping {}: {e}", path.display()),
            }
        }

        log::info!("Opened feedback store {} ({} items)", dir.display(), cache.len());
        Ok(Self { dir, cache })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_feedback(&mut self, feedback: &Feedback) -> Result<()> {
        let path = self.file_path(&feedback.id)?;
        super::ensure_finite_metrics(feedback)?;
        let json = serde_json::to_string_pretty(feedback)?;
        fs::write(&path, json)?;
        self.cache.insert(feedback.id.clone(), feedback.clone());
        log::debug!("Saved feedback {} to {}", feedback.id, path.display());
        Ok(())
    }

    pub fn update_feedback(&mut self, feedback: &Feedback) -> Result<()> {
        self.save_feedback(feedback)
    }

    #[must_use]
    pub fn get_feedback(&self, feedback_id: &str) -> Option<&Feedback> {
        self.cache.get(feedback_id)
    }

    /// All feedback, oldest first (ties broken by id)
    #[must_use]
    pub fn all_feedbacks(&self) -> Vec<&Feedback> {
        let mut all: Vec<&Feedback> = self.cache.values().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        all
    }

    /// Remove feedback from cache and disk; a missing item is not an error
    pub fn delete_feedback(&mut self, feedback_id: &str) -> Result<()> {
        let path = self.file_path(feedback_id)?;
        self.cache.remove(feedback_id);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn feedbacks_by_plan(&self, plan_id: &str) -> Vec<&Feedback> {
        self.filtered(|f| f.plan_id == plan_id)
    }

    #[must_use]
    pub fn feedbacks_by_type(&self, feedback_type: FeedbackType) -> Vec<&Feedback> {
        self.filtered(|f| f.feedback_type == feedback_type)
    }

    #[must_use]
    pub fn feedbacks_by_severity(&self, severity: FeedbackSeverity) -> Vec<&Feedback> {
        self.filtered(|f| f.severity == severity)
    }

    #[must_use]
    pub fn feedbacks_by_status(&self, status: FeedbackStatus) -> Vec<&Feedback> {
        self.filtered(|f| f.status == status)
    }

    /// Delete every stored feedback file
    pub fn clear_storage(&mut self) -> Result<()> {
        self.cache.clear();
        for path in json_files(&self.dir)? {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn storage_stats(&self) -> Result<StorageStats> {
        let mut storage_size = 0;
        for path in json_files(&self.dir)? {
            storage_size += fs::metadata(path)?.len();
        }
        Ok(StorageStats {
            total_feedbacks: self.cache.len(),
            storage_size,
        })
    }

    fn filtered(&self, keep: impl Fn(&Feedback) -> bool) -> Vec<&Feedback> {
        self.all_feedbacks().into_iter().filter(|f| keep(f)).collect()
    }

    fn file_path(&self, feedback_id: &str) -> Result<PathBuf> {
        if feedback_id.is_empty()
            || feedback_id.contains(['/', '\\'])
            || feedback_id == "."
            || feedback_id == ".."
        {
            return Err(Error::InvalidInput(format!(
                "feedback id {feedback_id:?} cannot be used as a file name"
            )));
        }
        Ok(self.dir.join(format!("{feedback_id}.json")))
    }
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn load_file(path: &Path) -> Result<Feedback> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
