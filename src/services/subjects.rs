use tracing::info;

use crate::{
    error::{DiaryError, DiaryResult},
    store::JsonStore,
};

/// Canonical spelling of a subject name: trimmed, first letter upper case,
/// the rest lower case. `None` when nothing is left after trimming.
pub fn normalize_subject(name: &str) -> Option<String> {
    let mut chars = name.trim().chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect())
}

/// Position of a subject equal to `name` ignoring case, skipping `except`.
fn find_duplicate(subjects: &[String], name: &str, except: Option<&str>) -> Option<usize> {
    let wanted = name.to_lowercase();
    subjects
        .iter()
        .position(|s| s.to_lowercase() == wanted && Some(s.as_str()) != except)
}

fn require_name(name: &str) -> DiaryResult<String> {
    normalize_subject(name).ok_or_else(|| DiaryError::Validation("Subject name is required".into()))
}

pub struct SubjectService;

impl SubjectService {
    pub fn list(store: &JsonStore) -> DiaryResult<Vec<String>> {
        Ok(store.load_subjects()?)
    }

    pub fn replace_all(store: &JsonStore, subjects: Vec<String>) -> DiaryResult<Vec<String>> {
        store.save_subjects(&subjects)?;
        Ok(subjects)
    }

    /// Appends a subject after normalising it. Case-insensitive duplicates
    /// are rejected.
    pub fn add(store: &JsonStore, name: &str) -> DiaryResult<Vec<String>> {
        let name = require_name(name)?;
        let mut subjects = store.load_subjects()?;
        if find_duplicate(&subjects, &name, None).is_some() {
            return Err(DiaryError::Conflict(format!("Subject already exists: {name}")));
        }
        subjects.push(name.clone());
        store.save_subjects(&subjects)?;
        info!(subject = %name, "subject added");
        Ok(subjects)
    }

    /// Renames `old` in place, keeping its position in the list.
    pub fn rename(store: &JsonStore, old: &str, new: &str) -> DiaryResult<Vec<String>> {
        let new = require_name(new)?;
        let mut subjects = store.load_subjects()?;
        let index = subjects
            .iter()
            .position(|s| s == old)
            .ok_or_else(|| DiaryError::not_found("subject", old))?;
        if subjects[index] == new {
            return Ok(subjects);
        }
        if find_duplicate(&subjects, &new, Some(old)).is_some() {
            return Err(DiaryError::Conflict(format!("Subject already exists: {new}")));
        }
        subjects[index] = new;
        store.save_subjects(&subjects)?;
        info!(from = old, to = %subjects[index], "subject renamed");
        Ok(subjects)
    }

    pub fn remove(store: &JsonStore, name: &str) -> DiaryResult<Vec<String>> {
        let mut subjects = store.load_subjects()?;
        let index = subjects
            .iter()
            .position(|s| s == name)
            .ok_or_else(|| DiaryError::not_found("subject", name))?;
        subjects.remove(index);
        store.save_subjects(&subjects)?;
        info!(subject = name, "subject removed");
        Ok(subjects)
    }

    pub fn hidden(store: &JsonStore) -> DiaryResult<Vec<String>> {
        Ok(store.load_hidden_subjects()?)
    }

    pub fn set_hidden(store: &JsonStore, mut hidden: Vec<String>) -> DiaryResult<Vec<String>> {
        hidden.sort();
        hidden.dedup();
        store.save_hidden_subjects(&hidden)?;
        Ok(hidden)
    }

    /// Hides a subject from the grades view.
    pub fn hide(store: &JsonStore, name: &str) -> DiaryResult<Vec<String>> {
        let mut hidden = store.load_hidden_subjects()?;
        hidden.push(name.to_string());
        Self::set_hidden(store, hidden)
    }

    /// Shows a hidden subject again.
    pub fn unhide(store: &JsonStore, name: &str) -> DiaryResult<Vec<String>> {
        let mut hidden = store.load_hidden_subjects()?;
        let before = hidden.len();
        hidden.retain(|h| h != name);
        if hidden.len() == before {
            return Err(DiaryError::not_found("hidden subject", name));
        }
        Self::set_hidden(store, hidden)
    }

    /// Subjects in list order, minus the hidden ones.
    pub fn visible(store: &JsonStore) -> DiaryResult<Vec<String>> {
        let hidden = store.load_hidden_subjects()?;
        let mut subjects = store.load_subjects()?;
        subjects.retain(|s| !hidden.contains(s));
        Ok(subjects)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn setup_store(subjects: &[&str]) -> (TempDir, JsonStore) {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path());
        let subjects: Vec<String> = subjects.iter().map(|s| s.to_string()).collect();
        store.save_subjects(&subjects).unwrap();
        (tmp, store)
    }

    #[test]
    fn test_normalize_subject() {
        assert_eq!(normalize_subject("  алгебра "), Some("Алгебра".to_string()));
        assert_eq!(normalize_subject("РУССКИЙ ЯЗЫК"), Some("Русский язык".to_string()));
        assert_eq!(normalize_subject("   "), None);
    }

    #[test]
    fn test_add_normalizes_and_rejects_duplicates() {
        let (_tmp, store) = setup_store(&["Математика"]);
        let subjects = SubjectService::add(&store, " физика ").unwrap();
        assert_eq!(subjects, vec!["Математика", "Физика"]);

        let err = SubjectService::add(&store, "МАТЕМАТИКА").unwrap_err();
        assert!(matches!(err, DiaryError::Conflict(_)));
        let err = SubjectService::add(&store, "  ").unwrap_err();
        assert!(matches!(err, DiaryError::Validation(_)));
        assert_eq!(store.load_subjects().unwrap().len(), 2);
    }

    #[test]
    fn test_rename_keeps_position() {
        let (_tmp, store) = setup_store(&["История", "Химия", "Физика"]);
        let subjects = SubjectService::rename(&store, "Химия", "органическая химия").unwrap();
        assert_eq!(subjects, vec!["История", "Органическая химия", "Физика"]);
    }

    #[test]
    fn test_rename_conflicts_and_missing() {
        let (_tmp, store) = setup_store(&["История", "Химия"]);
        let err = SubjectService::rename(&store, "Химия", "история").unwrap_err();
        assert!(matches!(err, DiaryError::Conflict(_)));
        let err = SubjectService::rename(&store, "Астрономия", "Космос").unwrap_err();
        assert!(matches!(err, DiaryError::NotFound { .. }));
        // Changing only the case of the same subject is allowed.
        let subjects = SubjectService::rename(&store, "Химия", "ХИМИЯ").unwrap();
        assert_eq!(subjects, vec!["История", "Химия"]);
    }

    #[test]
    fn test_remove() {
        let (_tmp, store) = setup_store(&["История", "Химия"]);
        assert_eq!(SubjectService::remove(&store, "История").unwrap(), vec!["Химия"]);
        let err = SubjectService::remove(&store, "История").unwrap_err();
        assert!(matches!(err, DiaryError::NotFound { .. }));
    }

    #[test]
    fn test_hidden_subjects_filter_visible() {
        let (_tmp, store) = setup_store(&["История", "Химия", "Физика"]);
        SubjectService::hide(&store, "Химия").unwrap();
        SubjectService::hide(&store, "Химия").unwrap();
        assert_eq!(SubjectService::hidden(&store).unwrap(), vec!["Химия"]);
        assert_eq!(SubjectService::visible(&store).unwrap(), vec!["История", "Физика"]);

        SubjectService::unhide(&store, "Химия").unwrap();
        assert!(SubjectService::hidden(&store).unwrap().is_empty());
        assert_eq!(SubjectService::visible(&store).unwrap().len(), 3);
        assert!(matches!(
            SubjectService::unhide(&store, "Химия"),
            Err(DiaryError::NotFound { .. })
        ));
    }
}
