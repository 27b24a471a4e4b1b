//! Flat JSON document store.
//!
//! Every document lives in its own file under the data directory and is read
//! and written whole. There is no locking: the store assumes a single writer
//! per data directory, and two processes editing the same files can lose each
//! other's updates.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{
    grades::Grades,
    homework::{homework_from_json, Homework},
    schedule::FullSchedule,
    subjects::subject_list_from_json,
};

const SCHEDULE_FILE: &str = "schedule.json";
const HOMEWORK_FILE: &str = "homework.json";
const SUBJECTS_FILE: &str = "subjects.json";
const GRADES_FILE: &str = "grades.json";
const HIDDEN_SUBJECTS_FILE: &str = "hidden_subjects.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn data_dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Parsed contents of a document, or `None` when the file is missing or
    /// does not hold valid JSON.
    fn read_document(&self, file: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path(file);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "document missing, using default");
                return Ok(None);
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!(path = %path.display(), "document is not valid UTF-8, using default");
                return Ok(None);
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "document is not valid JSON, using default");
                Ok(None)
            }
        }
    }

    /// Overwrites a document with pretty-printed JSON.
    fn write_document<T: Serialize + ?Sized>(&self, file: &str, data: &T) -> Result<(), StoreError> {
        let path = self.path(file);
        let text = serde_json::to_string_pretty(data).map_err(|source| StoreError::Encode {
            path: path.clone(),
            source,
        })?;
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Write {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, text).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "document saved");
        Ok(())
    }

    /// Reads a document through a lenient parser, falling back to the
    /// type's default when the file is missing or has the wrong shape.
    fn load_with<T, F>(&self, file: &str, parse: F) -> Result<T, StoreError>
    where
        T: Default,
        F: FnOnce(&Value) -> Option<T>,
    {
        let Some(value) = self.read_document(file)? else {
            return Ok(T::default());
        };
        Ok(parse(&value).unwrap_or_else(|| {
            warn!(file, "document has an unexpected shape, using default");
            T::default()
        }))
    }

    /// Schedule document; legacy day lists are upgraded in memory. Missing or
    /// unreadable documents give [`FullSchedule::seeded`].
    pub fn load_schedule(&self) -> Result<FullSchedule, StoreError> {
        let Some(value) = self.read_document(SCHEDULE_FILE)? else {
            return Ok(FullSchedule::seeded());
        };
        Ok(FullSchedule::from_json(&value).unwrap_or_else(|| {
            warn!("schedule document is not an object, using default");
            FullSchedule::seeded()
        }))
    }

    pub fn save_schedule(&self, schedule: &FullSchedule) -> Result<(), StoreError> {
        self.write_document(SCHEDULE_FILE, schedule)
    }

    pub fn load_subjects(&self) -> Result<Vec<String>, StoreError> {
        self.load_with(SUBJECTS_FILE, subject_list_from_json)
    }

    pub fn save_subjects(&self, subjects: &[String]) -> Result<(), StoreError> {
        self.write_document(SUBJECTS_FILE, subjects)
    }

    pub fn load_hidden_subjects(&self) -> Result<Vec<String>, StoreError> {
        self.load_with(HIDDEN_SUBJECTS_FILE, subject_list_from_json)
    }

    pub fn save_hidden_subjects(&self, hidden: &[String]) -> Result<(), StoreError> {
        self.write_document(HIDDEN_SUBJECTS_FILE, hidden)
    }

    pub fn load_homework(&self) -> Result<Homework, StoreError> {
        self.load_with(HOMEWORK_FILE, homework_from_json)
    }

    pub fn save_homework(&self, homework: &Homework) -> Result<(), StoreError> {
        self.write_document(HOMEWORK_FILE, homework)
    }

    pub fn load_grades(&self) -> Result<Grades, StoreError> {
        self.load_with(GRADES_FILE, Grades::from_disk)
    }

    pub fn save_grades(&self, grades: &Grades) -> Result<(), StoreError> {
        self.write_document(GRADES_FILE, &grades.to_disk())
    }
}
