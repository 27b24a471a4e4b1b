use chrono::NaiveDate;
use tracing::info;

use crate::{
    error::{DiaryError, DiaryResult},
    models::homework::{DayHomework, Homework},
    store::JsonStore,
};

pub struct HomeworkService;

impl HomeworkService {
    pub fn list_all(store: &JsonStore) -> DiaryResult<Homework> {
        Ok(store.load_homework()?)
    }

    pub fn get(store: &JsonStore, date: NaiveDate) -> DiaryResult<DayHomework> {
        store
            .load_homework()?
            .remove(&date)
            .ok_or_else(|| DiaryError::not_found("homework", date))
    }

    /// Replaces the homework of one day.
    pub fn put(store: &JsonStore, date: NaiveDate, day: DayHomework) -> DiaryResult<DayHomework> {
        let mut homework = store.load_homework()?;
        homework.insert(date, day.clone());
        store.save_homework(&homework)?;
        info!(%date, subjects = day.len(), "homework replaced");
        Ok(day)
    }

    pub fn delete(store: &JsonStore, date: NaiveDate) -> DiaryResult<()> {
        let mut homework = store.load_homework()?;
        if homework.remove(&date).is_none() {
            return Err(DiaryError::not_found("homework", date));
        }
        store.save_homework(&homework)?;
        info!(%date, "homework deleted");
        Ok(())
    }

    /// Sets the homework text of one subject on one day, creating the day.
    pub fn set_entry(
        store: &JsonStore,
        date: NaiveDate,
        subject: &str,
        text: &str,
    ) -> DiaryResult<DayHomework> {
        let mut homework = store.load_homework()?;
        let day = homework.entry(date).or_default();
        day.insert(subject.to_string(), text.to_string());
        let day = day.clone();
        store.save_homework(&homework)?;
        info!(%date, subject, "homework entry saved");
        Ok(day)
    }
}
