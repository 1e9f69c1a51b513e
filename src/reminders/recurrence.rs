//! Fire times for repeating reminders.
//!
//! Repeats are not a rule engine: a repeating reminder is expanded into a
//! fixed number of one-shot fire times, which the notification layer
//! schedules individually.

use chrono::{DateTime, Duration, Months, Utc};

use super::types::{Frequency, ReminderFields};

/// Number of fire times expanded for a repeating reminder.
pub const DEFAULT_OCCURRENCES: usize = 5;

/// Upper bound on expanded fire times, a year of daily repeats.
pub const MAX_OCCURRENCES: usize = 366;

/// The next `count` fire times of a reminder, starting with its own time.
///
/// `once` and `custom` reminders yield only the base time; a `custom`
/// rule lives on the backend. `count` is capped at [`MAX_OCCURRENCES`].
#[must_use]
pub fn upcoming_occurrences(fields: &ReminderFields, count: usize) -> Vec<DateTime<Utc>> {
    let base = fields.reminder_datetime;
    if count == 0 {
        return Vec::new();
    }
    let count = count.min(MAX_OCCURRENCES);

    match fields.frequency {
        Frequency::Once | Frequency::Custom => vec![base],
        Frequency::Daily => step_by(base, count, |t, n| t.checked_add_signed(Duration::days(n))),
        Frequency::Weekly => step_by(base, count, |t, n| t.checked_add_signed(Duration::weeks(n))),
        Frequency::Monthly => step_by(base, count, |t, n| {
            u32::try_from(n)
                .ok()
                .and_then(|months| t.checked_add_months(Months::new(months)))
        }),
    }
}

fn step_by<F>(base: DateTime<Utc>, count: usize, advance: F) -> Vec<DateTime<Utc>>
where
    F: Fn(DateTime<Utc>, i64) -> Option<DateTime<Utc>>,
{
    (0..count)
        .map_while(|n| i64::try_from(n).ok().and_then(|n| advance(base, n)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fields(frequency: Frequency) -> ReminderFields {
        let mut fields =
            ReminderFields::new("Water plants", Utc.with_ymd_and_hms(2025, 1, 31, 8, 0, 0).unwrap());
        fields.frequency = frequency;
        fields
    }

    #[test]
    fn test_once_yields_single_time() {
        let times = upcoming_occurrences(&fields(Frequency::Once), DEFAULT_OCCURRENCES);
        assert_eq!(times.len(), 1);
    }

    #[test]
    fn test_custom_yields_single_time() {
        let times = upcoming_occurrences(&fields(Frequency::Custom), DEFAULT_OCCURRENCES);
        assert_eq!(times, vec![Utc.with_ymd_and_hms(2025, 1, 31, 8, 0, 0).unwrap()]);
    }

    #[test]
    fn test_daily_expands_five() {
        let times = upcoming_occurrences(&fields(Frequency::Daily), DEFAULT_OCCURRENCES);
        assert_eq!(times.len(), 5);
        assert_eq!(times[4], Utc.with_ymd_and_hms(2025, 2, 4, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_weekly_steps_seven_days() {
        let times = upcoming_occurrences(&fields(Frequency::Weekly), 3);
        assert_eq!(times[1] - times[0], Duration::weeks(1));
        assert_eq!(times[2], Utc.with_ymd_and_hms(2025, 2, 14, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_monthly_clamps_to_month_end() {
        let times = upcoming_occurrences(&fields(Frequency::Monthly), 3);
        assert_eq!(times[1], Utc.with_ymd_and_hms(2025, 2, 28, 8, 0, 0).unwrap());
        assert_eq!(times[2], Utc.with_ymd_and_hms(2025, 3, 31, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_zero_count() {
        assert!(upcoming_occurrences(&fields(Frequency::Daily), 0).is_empty());
    }

    #[test]
    fn test_count_capped_at_max() {
        let times = upcoming_occurrences(&fields(Frequency::Daily), usize::MAX);
        assert_eq!(times.len(), MAX_OCCURRENCES);
        assert_eq!(times[MAX_OCCURRENCES - 1] - times[0], Duration::days(365));
    }
}
