use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::coerce_text;

/// Number of school terms per year.
pub const TERMS: usize = 4;

/// Maximum number of marks per term.
pub const TERM_DAYS: [usize; TERMS] = [53, 44, 59, 45];

/// Marks accepted by the grade editor: blank, 2..5, absent (Н) and sick (Б).
pub const GRADE_OPTIONS: &[&str] = &["", "2", "3", "4", "5", "Н", "Б"];

const DISK_KEY_PREFIX: &str = "grade_";

/// Marks of one subject, one list per term.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectGrades {
    terms: [Vec<String>; TERMS],
}

impl SubjectGrades {
    /// Requires exactly one list per term; each term is capped at its length.
    pub fn from_terms(terms: Vec<Vec<String>>) -> Option<Self> {
        let terms: [Vec<String>; TERMS] = terms.try_into().ok()?;
        let mut grades = Self { terms };
        for (term, marks) in grades.terms.iter_mut().enumerate() {
            marks.truncate(TERM_DAYS[term]);
        }
        Some(grades)
    }

    /// Lenient read of stored terms: anything other than four lists resets to
    /// four empty terms, and a term that is not a list reads as empty.
    fn from_stored_terms(terms: &[Value]) -> Self {
        let mut grades = Self::default();
        if terms.len() != TERMS {
            return grades;
        }
        for (slot, term) in grades.terms.iter_mut().zip(terms) {
            if let Some(marks) = term.as_array() {
                *slot = marks.iter().map(coerce_text).collect();
            }
        }
        grades
    }

    pub fn term(&self, term: usize) -> &[String] {
        self.terms.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sets the mark at `index`, padding the term with blanks up to it.
    /// Returns `false` and leaves the term alone when `index` is past the
    /// last day of the term.
    pub fn set(&mut self, term: usize, index: usize, mark: &str) -> bool {
        let (Some(marks), Some(&days)) = (self.terms.get_mut(term), TERM_DAYS.get(term)) else {
            return false;
        };
        if index >= days {
            return false;
        }
        if marks.len() <= index {
            marks.resize(index + 1, String::new());
        }
        marks[index] = mark.to_string();
        marks.truncate(days);
        true
    }

    /// Number of non-blank marks in a term.
    pub fn filled(&self, term: usize) -> usize {
        self.term(term).iter().filter(|m| !m.is_empty()).count()
    }

    /// Mean of the numeric marks of a term, if there are any.
    pub fn average(&self, term: usize) -> Option<f64> {
        let numeric: Vec<f64> = self.term(term).iter().filter_map(|m| numeric_mark(m)).collect();
        if numeric.is_empty() {
            return None;
        }
        Some(numeric.iter().sum::<f64>() / numeric.len() as f64)
    }
}

/// A mark counts toward the average when it is digits with at most one dot.
fn numeric_mark(mark: &str) -> Option<f64> {
    let digits = mark.replacen('.', "", 1);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    mark.parse().ok()
}

/// Average formatted the way the grades table shows it.
pub fn format_average(average: Option<f64>) -> String {
    format!("{:.2}", average.unwrap_or(0.0))
}

/// The grades document, keyed by subject.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grades(BTreeMap<String, SubjectGrades>);

impl Grades {
    /// Reads the stored layout `{subject: {"grade_0": .., "grade_1": ..}}`.
    /// Entries are ordered by their numeric suffix. Returns `None` when the
    /// document is not a JSON object.
    pub fn from_disk(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let subjects = object
            .iter()
            .map(|(subject, stored)| {
                let terms = match stored {
                    Value::Object(entries) => ordered_entries(entries),
                    Value::Array(items) => items.clone(),
                    _ => Vec::new(),
                };
                (subject.clone(), SubjectGrades::from_stored_terms(&terms))
            })
            .collect();
        Some(Self(subjects))
    }

    /// Stored layout, the inverse of [`Grades::from_disk`].
    pub fn to_disk(&self) -> Value {
        let subjects = self
            .0
            .iter()
            .map(|(subject, grades)| {
                let entries: Map<String, Value> = grades
                    .terms
                    .iter()
                    .enumerate()
                    .map(|(i, marks)| (format!("{DISK_KEY_PREFIX}{i}"), Value::from(marks.clone())))
                    .collect();
                (subject.clone(), Value::Object(entries))
            })
            .collect();
        Value::Object(subjects)
    }

    pub fn get(&self, subject: &str) -> Option<&SubjectGrades> {
        self.0.get(subject)
    }

    pub fn entry(&mut self, subject: &str) -> &mut SubjectGrades {
        self.0.entry(subject.to_string()).or_default()
    }

    pub fn insert(&mut self, subject: &str, grades: SubjectGrades) {
        self.0.insert(subject.to_string(), grades);
    }

    pub fn remove(&mut self, subject: &str) -> Option<SubjectGrades> {
        self.0.remove(subject)
    }

    /// Mark columns the grades table shows for a term: one past the fullest
    /// subject, at least one, capped at the term length.
    pub fn visible_columns(&self, term: usize) -> usize {
        let Some(&limit) = TERM_DAYS.get(term) else {
            return 1;
        };
        let widest = self
            .0
            .values()
            .map(|g| g.filled(term) + 1)
            .max()
            .unwrap_or(1)
            .max(1);
        widest.min(limit)
    }
}

/// Values of a `grade_N` map ordered by N; keys without a numeric suffix go
/// last in key order.
fn ordered_entries(entries: &Map<String, Value>) -> Vec<Value> {
    let mut keyed: Vec<(Option<usize>, &String, &Value)> = entries
        .iter()
        .map(|(key, value)| {
            let index = key
                .strip_prefix(DISK_KEY_PREFIX)
                .and_then(|n| n.parse::<usize>().ok());
            (index, key, value)
        })
        .collect();
    keyed.sort_by(|a, b| match (a.0, b.0) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.1.cmp(b.1),
    });
    keyed.into_iter().map(|(_, _, value)| value.clone()).collect()
}

/// Body for PUT /grades/{subject}.
#[derive(Debug, Deserialize)]
pub struct GradesPayload {
    pub grades: Vec<Vec<Value>>,
}

/// Body for PUT /grades/{subject}/mark.
#[derive(Debug, Deserialize)]
pub struct SetMarkRequest {
    pub term: usize,
    pub index: usize,
    #[serde(default)]
    pub mark: String,
}

/// Query params for GET /grades/{subject}/average and /grades/columns.
#[derive(Debug, Deserialize)]
pub struct TermQuery {
    #[serde(default)]
    pub term: usize,
}
