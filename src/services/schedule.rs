use chrono::{Datelike, Days, NaiveDate};
use tracing::{info, warn};

use crate::{
    error::{DiaryError, DiaryResult},
    models::schedule::{
        Day, FullSchedule, Lessons, ResolvedWeek, ScheduleVersion, WeekColumn, SCHOOL_DAYS,
    },
    store::JsonStore,
};

fn out_of_range(date: NaiveDate) -> DiaryError {
    DiaryError::Validation(format!("Date {date} is outside the supported calendar range"))
}

pub struct ScheduleService;

impl ScheduleService {
    /// Monday of the week containing `date`. Versions created by edits are
    /// always dated on a week start. Fails for dates whose Monday falls
    /// before the first representable date.
    pub fn week_start(date: NaiveDate) -> DiaryResult<NaiveDate> {
        let back = Days::new(u64::from(date.weekday().num_days_from_monday()));
        date.checked_sub_days(back).ok_or_else(|| out_of_range(date))
    }

    /// Lessons of `day` as of `target`: the latest version starting on or
    /// before `target`, or all blank when there is none. Among versions with
    /// the same start date the one appended last wins.
    pub fn resolve_day(schedule: &FullSchedule, day: Day, target: NaiveDate) -> Lessons {
        schedule
            .versions(day)
            .iter()
            .enumerate()
            .filter(|(_, v)| v.start_date <= target)
            .max_by_key(|(position, v)| (v.start_date, *position))
            .map(|(_, v)| v.subjects.clone())
            .unwrap_or_default()
    }

    /// Effective lessons of every day as of `target`. Days missing from the
    /// document resolve to blank lessons.
    pub fn resolve_for_date(schedule: &FullSchedule, target: NaiveDate) -> ResolvedWeek {
        Day::ALL
            .into_iter()
            .map(|day| (day, Self::resolve_day(schedule, day, target)))
            .collect()
    }

    /// Lessons on the weekday `date` falls on.
    pub fn lessons_on(schedule: &FullSchedule, date: NaiveDate) -> Lessons {
        Self::resolve_day(schedule, Day::from_weekday(date.weekday()), date)
    }

    /// Monday to Saturday of the week containing `date`, each column
    /// resolved as of its own date.
    pub fn week_view(schedule: &FullSchedule, date: NaiveDate) -> DiaryResult<Vec<WeekColumn>> {
        let monday = Self::week_start(date)?;
        Day::ALL
            .into_iter()
            .take(SCHOOL_DAYS)
            .map(|day| -> DiaryResult<WeekColumn> {
                let date = monday
                    .checked_add_days(Days::new(day.offset() as u64))
                    .ok_or_else(|| out_of_range(date))?;
                Ok(WeekColumn {
                    day,
                    date,
                    lessons: Self::resolve_day(schedule, day, date),
                })
            })
            .collect()
    }

    /// Sets one slot of `day` for the week containing `date`.
    ///
    /// The version dated on that week's Monday is edited in place. When there
    /// is none, a new one is seeded from the lessons in effect the day before
    /// the Monday and appended, so earlier weeks keep resolving as before.
    pub fn apply_edit(
        mut schedule: FullSchedule,
        day: Day,
        date: NaiveDate,
        slot: usize,
        subject: &str,
    ) -> DiaryResult<FullSchedule> {
        let week_start = Self::week_start(date)?;
        let existing = schedule
            .versions(day)
            .iter()
            .rposition(|v| v.start_date == week_start);

        let stored = match existing {
            Some(position) => schedule.versions_mut(day)[position].subjects.set(slot, subject),
            None => {
                let mut subjects = match week_start.pred_opt() {
                    Some(previous) => Self::resolve_day(&schedule, day, previous),
                    None => Lessons::default(),
                };
                let stored = subjects.set(slot, subject);
                schedule.versions_mut(day).push(ScheduleVersion {
                    start_date: week_start,
                    subjects,
                });
                stored
            }
        };

        if !stored {
            warn!(%day, slot, "lesson slot out of range, value dropped");
        }
        Ok(schedule)
    }

    /// Loads the schedule, applies one edit and saves the whole document.
    pub fn edit(
        store: &JsonStore,
        day: Day,
        date: NaiveDate,
        slot: usize,
        subject: &str,
    ) -> DiaryResult<FullSchedule> {
        let schedule = store.load_schedule()?;
        let schedule = Self::apply_edit(schedule, day, date, slot, subject)?;
        store.save_schedule(&schedule)?;
        info!(%day, %date, slot, "schedule edited");
        Ok(schedule)
    }

    /// Rewrites the stored schedule in the current layout.
    pub fn upgrade(store: &JsonStore) -> DiaryResult<FullSchedule> {
        let schedule = store.load_schedule()?;
        store.save_schedule(&schedule)?;
        Ok(schedule)
    }
}
