use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Weekday};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use super::coerce_text;

/// Lesson slots per day. Stored documents always carry exactly this many.
pub const MAX_LESSONS: usize = 9;

/// Days shown in the week view (Monday through Saturday).
pub const SCHOOL_DAYS: usize = 6;

/// Start date given to versions that predate versioning: legacy day lists
/// and the default document.
pub fn epoch() -> NaiveDate {
    // NaiveDate's default is 1970-01-01.
    NaiveDate::default()
}

/// Day-of-week key of the schedule document. Variants are declared in
/// canonical order, which is also the `Ord` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    #[serde(rename = "Понедельник")]
    Monday,
    #[serde(rename = "Вторник")]
    Tuesday,
    #[serde(rename = "Среда")]
    Wednesday,
    #[serde(rename = "Четверг")]
    Thursday,
    #[serde(rename = "Пятница")]
    Friday,
    #[serde(rename = "Суббота")]
    Saturday,
    #[serde(rename = "Воскресенье")]
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Key used for this day in stored documents and the API.
    pub fn label(self) -> &'static str {
        match self {
            Day::Monday => "Понедельник",
            Day::Tuesday => "Вторник",
            Day::Wednesday => "Среда",
            Day::Thursday => "Четверг",
            Day::Friday => "Пятница",
            Day::Saturday => "Суббота",
            Day::Sunday => "Воскресенье",
        }
    }

    pub fn from_label(label: &str) -> Option<Day> {
        Day::ALL.into_iter().find(|d| d.label() == label)
    }

    pub fn from_weekday(weekday: Weekday) -> Day {
        Day::ALL[weekday.num_days_from_monday() as usize]
    }

    /// Zero-based offset from Monday.
    pub fn offset(self) -> usize {
        self as usize
    }

    pub fn labels() -> Vec<&'static str> {
        Day::ALL.iter().map(|d| d.label()).collect()
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown day {0:?}")]
pub struct UnknownDay(pub String);

impl FromStr for Day {
    type Err = UnknownDay;

    /// Accepts the stored label or the English weekday name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(day) = Day::from_label(s) {
            return Ok(day);
        }
        s.parse::<Weekday>()
            .map(Day::from_weekday)
            .map_err(|_| UnknownDay(s.to_string()))
    }
}

/// The nine lesson slots of one day. Empty string means no lesson.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Lessons([String; MAX_LESSONS]);

impl Lessons {
    /// Builds slots from raw document values: coerced to text, trimmed,
    /// truncated to nine and padded with empty strings.
    pub fn from_values(values: &[Value]) -> Self {
        let mut lessons = Lessons::default();
        for (slot, value) in values.iter().take(MAX_LESSONS).enumerate() {
            lessons.0[slot] = coerce_text(value);
        }
        lessons
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lessons = Lessons::default();
        for (slot, name) in names.into_iter().take(MAX_LESSONS).enumerate() {
            lessons.0[slot] = name.as_ref().trim().to_string();
        }
        lessons
    }

    pub fn get(&self, slot: usize) -> Option<&str> {
        self.0.get(slot).map(String::as_str)
    }

    /// Sets one slot, storing the subject trimmed like every value read from
    /// a document. Slots past the last one are dropped and `false` is
    /// returned.
    pub fn set(&mut self, slot: usize, subject: &str) -> bool {
        match self.0.get_mut(slot) {
            Some(current) => {
                *current = subject.trim().to_string();
                true
            }
            None => false,
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_blank(&self) -> bool {
        self.0.iter().all(String::is_empty)
    }
}

impl<'de> Deserialize<'de> for Lessons {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<Value>::deserialize(deserializer)?;
        Ok(Lessons::from_values(&values))
    }
}

/// Lessons of one day effective from `start_date` until a later version of
/// the same day takes over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleVersion {
    pub start_date: NaiveDate,
    #[serde(default)]
    pub subjects: Lessons,
}

/// The whole schedule document: every day's versions.
///
/// Versions are kept in document order. Resolution never relies on that
/// order except to break ties between equal start dates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct FullSchedule {
    days: BTreeMap<Day, Vec<ScheduleVersion>>,
}

impl FullSchedule {
    /// Document used when nothing usable is stored: every day has a single
    /// blank version dated at the epoch.
    pub fn seeded() -> Self {
        let days = Day::ALL
            .into_iter()
            .map(|day| {
                let version = ScheduleVersion {
                    start_date: epoch(),
                    subjects: Lessons::default(),
                };
                (day, vec![version])
            })
            .collect();
        Self { days }
    }

    /// Reads a stored document leniently.
    ///
    /// A day holding a plain list of strings is the pre-versioning layout and
    /// becomes one epoch-dated version. Unreadable version entries and
    /// unknown keys are skipped. Returns `None` only when the document is not
    /// a JSON object.
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut days = BTreeMap::new();

        for day in Day::ALL {
            let Some(entry) = object.get(day.label()) else {
                continue;
            };
            let Some(items) = entry.as_array() else {
                warn!(day = day.label(), "schedule entry is not a list, ignoring it");
                continue;
            };

            let versions = if items.iter().all(Value::is_string) {
                vec![ScheduleVersion {
                    start_date: epoch(),
                    subjects: Lessons::from_values(items),
                }]
            } else {
                items
                    .iter()
                    .filter_map(|item| {
                        serde_json::from_value::<ScheduleVersion>(item.clone())
                            .map_err(|e| {
                                warn!(day = day.label(), error = %e, "skipping unreadable schedule version")
                            })
                            .ok()
                    })
                    .collect()
            };
            days.insert(day, versions);
        }

        Some(Self { days })
    }

    pub fn versions(&self, day: Day) -> &[ScheduleVersion] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn versions_mut(&mut self, day: Day) -> &mut Vec<ScheduleVersion> {
        self.days.entry(day).or_default()
    }

    pub fn has_day(&self, day: Day) -> bool {
        self.days.contains_key(&day)
    }

    pub fn version_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}

impl<'de> Deserialize<'de> for FullSchedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        FullSchedule::from_json(&value)
            .ok_or_else(|| de::Error::custom("schedule must be a JSON object keyed by day"))
    }
}

/// Effective lessons of every day as of one date.
pub type ResolvedWeek = BTreeMap<Day, Lessons>;

/// One column of the week view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekColumn {
    pub day: Day,
    pub date: NaiveDate,
    pub lessons: Lessons,
}

/// Query params for the date-based schedule views. Defaults to today.
#[derive(Debug, Deserialize)]
pub struct ScheduleDateQuery {
    pub date: Option<NaiveDate>,
}

/// Body for PUT /schedule/edit (set one slot for the week containing `date`).
#[derive(Debug, Deserialize)]
pub struct ScheduleEditRequest {
    pub day: Day,
    pub date: NaiveDate,
    pub slot: usize,
    #[serde(default)]
    pub subject: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_day_labels_in_canonical_order() {
        assert_eq!(
            Day::labels(),
            vec!["Понедельник", "Вторник", "Среда", "Четверг", "Пятница", "Суббота", "Воскресенье"]
        );
        for (i, day) in Day::ALL.iter().enumerate() {
            assert_eq!(day.offset(), i);
            assert_eq!(Day::from_label(day.label()), Some(*day));
        }
    }

    #[test]
    fn test_day_from_str_accepts_label_and_english() {
        assert_eq!("Среда".parse::<Day>(), Ok(Day::Wednesday));
        assert_eq!("friday".parse::<Day>(), Ok(Day::Friday));
        assert!("Someday".parse::<Day>().is_err());
    }

    #[test]
    fn test_day_serializes_as_label() {
        assert_eq!(serde_json::to_value(Day::Thursday).unwrap(), json!("Четверг"));
        let day: Day = serde_json::from_value(json!("Суббота")).unwrap();
        assert_eq!(day, Day::Saturday);
    }

    #[test]
    fn test_lessons_pad_and_truncate() {
        let short = Lessons::from_values(&[json!("Математика")]);
        assert_eq!(short.as_slice().len(), MAX_LESSONS);
        assert_eq!(short.get(0), Some("Математика"));
        assert!(short.iter().skip(1).all(str::is_empty));

        let long: Vec<Value> = (0..12).map(|i| json!(format!("L{i}"))).collect();
        let truncated = Lessons::from_values(&long);
        assert_eq!(truncated.as_slice().len(), MAX_LESSONS);
        assert_eq!(truncated.get(8), Some("L8"));
    }

    #[test]
    fn test_lessons_set_out_of_range_is_dropped() {
        let mut lessons = Lessons::default();
        assert!(lessons.set(3, " Химия "));
        assert_eq!(lessons.get(3), Some("Химия"));
        assert!(!lessons.set(MAX_LESSONS, "Физика"));
        assert!(!lessons.iter().any(|s| s == "Физика"));
    }

    #[test]
    fn test_legacy_day_list_becomes_epoch_version() {
        let doc = json!({ "Понедельник": ["Математика", "", " Русский язык "] });
        let schedule = FullSchedule::from_json(&doc).unwrap();

        let versions = schedule.versions(Day::Monday);
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].start_date, date("1970-01-01"));
        assert_eq!(versions[0].subjects.get(0), Some("Математика"));
        assert_eq!(versions[0].subjects.get(2), Some("Русский язык"));
        assert_eq!(versions[0].subjects.as_slice().len(), MAX_LESSONS);
        assert!(!schedule.has_day(Day::Tuesday));
    }

    #[test]
    fn test_empty_legacy_list_is_blank_epoch_version() {
        let schedule = FullSchedule::from_json(&json!({ "Вторник": [] })).unwrap();
        let versions = schedule.versions(Day::Tuesday);
        assert_eq!(versions.len(), 1);
        assert!(versions[0].subjects.is_blank());
    }

    #[test]
    fn test_versioned_document_coerces_subjects() {
        let doc = json!({
            "Среда": [
                { "start_date": "2024-09-02", "subjects": [5, null, "  История  "] }
            ]
        });
        let schedule = FullSchedule::from_json(&doc).unwrap();
        let version = &schedule.versions(Day::Wednesday)[0];
        assert_eq!(version.start_date, date("2024-09-02"));
        assert_eq!(version.subjects.get(0), Some("5"));
        assert_eq!(version.subjects.get(1), Some(""));
        assert_eq!(version.subjects.get(2), Some("История"));
    }

    #[test]
    fn test_unreadable_versions_and_unknown_keys_are_skipped() {
        let doc = json!({
            "Пятница": [
                { "start_date": "not a date", "subjects": [] },
                { "subjects": ["Музыка"] },
                { "start_date": "2024-01-08", "subjects": ["ИЗО"] }
            ],
            "Holiday": ["ignored"],
            "Суббота": "nonsense"
        });
        let schedule = FullSchedule::from_json(&doc).unwrap();
        let versions = schedule.versions(Day::Friday);
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].subjects.get(0), Some("ИЗО"));
        assert!(!schedule.has_day(Day::Saturday));
        assert_eq!(schedule.version_count(), 1);
    }

    #[test]
    fn test_non_object_document_is_rejected() {
        assert!(FullSchedule::from_json(&json!(["Математика"])).is_none());
        assert!(FullSchedule::from_json(&json!(null)).is_none());
    }

    #[test]
    fn test_seeded_has_one_blank_epoch_version_per_day() {
        let schedule = FullSchedule::seeded();
        for day in Day::ALL {
            let versions = schedule.versions(day);
            assert_eq!(versions.len(), 1);
            assert_eq!(versions[0].start_date, epoch());
            assert!(versions[0].subjects.is_blank());
        }
    }

    #[test]
    fn test_serialized_shape() {
        let mut schedule = FullSchedule::default();
        schedule.versions_mut(Day::Monday).push(ScheduleVersion {
            start_date: date("2024-03-11"),
            subjects: Lessons::from_names(["Физика"]),
        });
        let value = serde_json::to_value(&schedule).unwrap();
        assert_eq!(
            value,
            json!({
                "Понедельник": [
                    { "start_date": "2024-03-11", "subjects": ["Физика", "", "", "", "", "", "", "", ""] }
                ]
            })
        );

        let back: FullSchedule = serde_json::from_value(value).unwrap();
        assert_eq!(back, schedule);
    }
}
