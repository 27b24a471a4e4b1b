use serde_json::Value;
use tracing::info;

use crate::{
    error::{DiaryError, DiaryResult},
    models::{
        coerce_text,
        grades::{format_average, Grades, SubjectGrades, GRADE_OPTIONS, TERMS, TERM_DAYS},
    },
    store::JsonStore,
};

fn check_term(term: usize) -> DiaryResult<()> {
    if term >= TERMS {
        return Err(DiaryError::Validation(format!(
            "Term must be between 0 and {}",
            TERMS - 1
        )));
    }
    Ok(())
}

pub struct GradeService;

impl GradeService {
    pub fn list_all(store: &JsonStore) -> DiaryResult<Grades> {
        Ok(store.load_grades()?)
    }

    pub fn get(store: &JsonStore, subject: &str) -> DiaryResult<SubjectGrades> {
        store
            .load_grades()?
            .remove(subject)
            .ok_or_else(|| DiaryError::not_found("grades for subject", subject))
    }

    /// Replaces all terms of one subject. Marks are stored as text.
    pub fn put(store: &JsonStore, subject: &str, terms: Vec<Vec<Value>>) -> DiaryResult<SubjectGrades> {
        let terms: Vec<Vec<String>> = terms
            .iter()
            .map(|marks| marks.iter().map(coerce_text).collect())
            .collect();
        let grades = SubjectGrades::from_terms(terms)
            .ok_or_else(|| DiaryError::Validation(format!("Expected exactly {TERMS} terms")))?;

        let mut all = store.load_grades()?;
        all.insert(subject, grades.clone());
        store.save_grades(&all)?;
        info!(subject, "grades replaced");
        Ok(grades)
    }

    pub fn delete(store: &JsonStore, subject: &str) -> DiaryResult<()> {
        let mut all = store.load_grades()?;
        if all.remove(subject).is_none() {
            return Err(DiaryError::not_found("grades for subject", subject));
        }
        store.save_grades(&all)?;
        info!(subject, "grades deleted");
        Ok(())
    }

    /// Sets one mark. Unknown subjects start with empty terms.
    pub fn set_mark(
        store: &JsonStore,
        subject: &str,
        term: usize,
        index: usize,
        mark: &str,
    ) -> DiaryResult<SubjectGrades> {
        check_term(term)?;
        let mark = mark.trim();
        if !GRADE_OPTIONS.contains(&mark) {
            return Err(DiaryError::Validation(format!(
                "Invalid mark {mark:?}, expected one of {GRADE_OPTIONS:?}"
            )));
        }

        if index >= TERM_DAYS[term] {
            return Err(DiaryError::Validation(format!(
                "Mark index must be below {} for term {term}",
                TERM_DAYS[term]
            )));
        }

        let mut all = store.load_grades()?;
        let grades = all.entry(subject);
        grades.set(term, index, mark);
        let grades = grades.clone();
        store.save_grades(&all)?;
        info!(subject, term, index, mark, "mark set");
        Ok(grades)
    }

    /// Average of a subject's term as shown in the table ("0.00" when the
    /// subject has no numeric marks).
    pub fn average(store: &JsonStore, subject: &str, term: usize) -> DiaryResult<String> {
        check_term(term)?;
        let all = store.load_grades()?;
        Ok(format_average(all.get(subject).and_then(|g| g.average(term))))
    }

    pub fn visible_columns(store: &JsonStore, term: usize) -> DiaryResult<usize> {
        check_term(term)?;
        Ok(store.load_grades()?.visible_columns(term))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn setup_store() -> (TempDir, JsonStore) {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path());
        (tmp, store)
    }

    #[test]
    fn test_put_coerces_numbers() {
        let (_tmp, store) = setup_store();
        let terms = vec![vec![json!(5), json!("4")], vec![], vec![json!("Н")], vec![]];
        let grades = GradeService::put(&store, "Алгебра", terms).unwrap();
        assert_eq!(grades.term(0), ["5", "4"]);
        assert_eq!(GradeService::get(&store, "Алгебра").unwrap(), grades);
    }

    #[test]
    fn test_put_requires_four_terms() {
        let (_tmp, store) = setup_store();
        let err = GradeService::put(&store, "Алгебра", vec![vec![json!(5)]]).unwrap_err();
        assert!(matches!(err, DiaryError::Validation(_)));
    }

    #[test]
    fn test_set_mark_validates() {
        let (_tmp, store) = setup_store();
        assert!(matches!(
            GradeService::set_mark(&store, "Химия", 0, 0, "6"),
            Err(DiaryError::Validation(_))
        ));
        assert!(matches!(
            GradeService::set_mark(&store, "Химия", TERMS, 0, "5"),
            Err(DiaryError::Validation(_))
        ));
    }

    #[test]
    fn test_set_mark_rejects_index_past_term_end() {
        let (_tmp, store) = setup_store();
        for index in [TERM_DAYS[0], usize::MAX / 2, usize::MAX] {
            assert!(matches!(
                GradeService::set_mark(&store, "Алгебра", 0, index, "5"),
                Err(DiaryError::Validation(_))
            ));
        }
        assert!(GradeService::list_all(&store).unwrap().get("Алгебра").is_none());

        let grades = GradeService::set_mark(&store, "Алгебра", 0, TERM_DAYS[0] - 1, "5").unwrap();
        assert_eq!(grades.term(0).len(), TERM_DAYS[0]);
    }

    #[test]
    fn test_set_mark_and_average() {
        let (_tmp, store) = setup_store();
        GradeService::set_mark(&store, "Химия", 2, 0, "5").unwrap();
        GradeService::set_mark(&store, "Химия", 2, 2, "4").unwrap();
        let grades = GradeService::set_mark(&store, "Химия", 2, 3, "Б").unwrap();
        assert_eq!(grades.term(2), ["5", "", "4", "Б"]);

        assert_eq!(GradeService::average(&store, "Химия", 2).unwrap(), "4.50");
        assert_eq!(GradeService::average(&store, "Химия", 0).unwrap(), "0.00");
        assert_eq!(GradeService::average(&store, "Незнакомый", 0).unwrap(), "0.00");
        assert_eq!(GradeService::visible_columns(&store, 2).unwrap(), 4);
    }

    #[test]
    fn test_delete() {
        let (_tmp, store) = setup_store();
        GradeService::set_mark(&store, "История", 0, 0, "3").unwrap();
        GradeService::delete(&store, "История").unwrap();
        assert!(matches!(
            GradeService::get(&store, "История"),
            Err(DiaryError::NotFound { .. })
        ));
        assert!(matches!(
            GradeService::delete(&store, "История"),
            Err(DiaryError::NotFound { .. })
        ));
    }
}
