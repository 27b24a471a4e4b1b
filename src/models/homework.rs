use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::coerce_text;

/// Homework of one day, keyed by subject name.
pub type DayHomework = BTreeMap<String, String>;

/// The homework document, keyed by date ("YYYY-MM-DD" on disk).
pub type Homework = BTreeMap<NaiveDate, DayHomework>;

/// Reads a stored homework document entry by entry. Keys that are not
/// `YYYY-MM-DD` dates and days that are not objects are skipped; texts are
/// coerced. Returns `None` only when the document is not a JSON object.
pub fn homework_from_json(value: &Value) -> Option<Homework> {
    let object = value.as_object()?;
    let mut homework = Homework::new();
    for (key, day) in object {
        let Ok(date) = key.parse::<NaiveDate>() else {
            warn!(key = %key, "skipping homework entry with an unreadable date");
            continue;
        };
        let Some(entries) = day.as_object() else {
            warn!(%date, "skipping homework entry that is not an object");
            continue;
        };
        let day = entries
            .iter()
            .map(|(subject, text)| (subject.clone(), coerce_text(text)))
            .collect();
        homework.insert(date, day);
    }
    Some(homework)
}

/// Body for PUT /homework/{date} (replace the whole day).
#[derive(Debug, Deserialize)]
pub struct HomeworkDayPayload {
    pub homework: DayHomework,
}

/// Body for PUT /homework/{date}/{subject}.
#[derive(Debug, Deserialize)]
pub struct HomeworkEntryPayload {
    #[serde(default)]
    pub text: String,
}
