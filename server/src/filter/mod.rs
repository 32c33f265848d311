//! Date-range filtering for `GET /events`.
//!
//! A listing is narrowed by an optional category and at most one time window.
//! An explicit `date` wins over a `time_filter`; both produce a half-open
//! `[start, end)` window over the event's start timestamp, computed in UTC.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::Event;
use crate::utils::error::{AppError, AppResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Calendar-relative windows anchored to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    Today,
    Week,
    Month,
    Year,
}

/// Raw query string of `GET /events`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEventsParams {
    pub category_id: Option<i32>,
    pub date: Option<String>,
    pub time_filter: Option<TimeFilter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: start.and_time(NaiveTime::MIN).and_utc(),
            end: end.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    /// `[day 00:00, day+1 00:00)`.
    pub fn for_day(day: NaiveDate) -> Option<Self> {
        Some(Self::between(day, day.succ_opt()?))
    }

    /// The window `filter` names for the instant `now`.
    pub fn relative(filter: TimeFilter, now: DateTime<Utc>) -> Option<Self> {
        let today = now.date_naive();
        match filter {
            TimeFilter::Today => Self::for_day(today),
            TimeFilter::Week => {
                let monday =
                    today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
                let next_monday = monday.checked_add_signed(Duration::days(7))?;
                Some(Self::between(monday, next_monday))
            }
            TimeFilter::Month => {
                let first = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)?;
                let next = if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)?
                };
                Some(Self::between(first, next))
            }
            TimeFilter::Year => {
                let first = NaiveDate::from_ymd_opt(today.year(), 1, 1)?;
                let next = NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?;
                Some(Self::between(first, next))
            }
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// A resolved listing query, ready for a store to execute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    pub category_id: Option<i32>,
    pub owner: Option<Uuid>,
    pub window: Option<TimeWindow>,
}

impl EventQuery {
    pub fn from_params(params: &ListEventsParams, now: DateTime<Utc>) -> AppResult<Self> {
        let date = params.date.as_deref().map(str::trim).filter(|d| !d.is_empty());

        let window = match (date, params.time_filter) {
            (Some(date), _) => {
                let day = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| {
                    AppError::ValidationError(format!(
                        "Invalid date '{}'. Use format YYYY-MM-DD",
                        date
                    ))
                })?;
                Some(TimeWindow::for_day(day).ok_or_else(out_of_range)?)
            }
            (None, Some(filter)) => {
                Some(TimeWindow::relative(filter, now).ok_or_else(out_of_range)?)
            }
            (None, None) => None,
        };

        Ok(Self {
            category_id: params.category_id,
            owner: None,
            window,
        })
    }

    pub fn owned_by(owner: Uuid) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.category_id.map_or(true, |id| event.category_id == id)
            && self.owner.map_or(true, |owner| event.user_id == owner)
            && self
                .window
                .map_or(true, |window| window.contains(event.start_date))
    }
}

fn out_of_range() -> AppError {
    AppError::ValidationError("Date is outside the supported range".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn midnight(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        at(y, m, d, 0, 0)
    }

    fn params(date: Option<&str>, time_filter: Option<TimeFilter>) -> ListEventsParams {
        ListEventsParams {
            category_id: None,
            date: date.map(str::to_string),
            time_filter,
        }
    }

    fn event_starting(start: DateTime<Utc>, category_id: i32) -> Event {
        Event {
            id: Uuid::new_v4(),
            name: "e".to_string(),
            description: String::new(),
            start_date: start,
            end_date: start,
            location: "here".to_string(),
            prize: None,
            category_id,
            user_id: Uuid::nil(),
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn test_explicit_date_window() {
        let query =
            EventQuery::from_params(&params(Some("2024-03-15"), None), Utc::now()).unwrap();
        let window = query.window.unwrap();
        assert_eq!(window.start, midnight(2024, 3, 15));
        assert_eq!(window.end, midnight(2024, 3, 16));

        assert!(query.matches(&event_starting(midnight(2024, 3, 15), 1)));
        assert!(query.matches(&event_starting(at(2024, 3, 15, 23, 59), 1)));
        assert!(!query.matches(&event_starting(midnight(2024, 3, 16), 1)));
        assert!(!query.matches(&event_starting(at(2024, 3, 14, 23, 59), 1)));
    }

    #[test]
    fn test_malformed_date_is_a_validation_error() {
        for bad in ["15-03-2024", "2024-13-01", "2024-02-30", "tomorrow"] {
            let result = EventQuery::from_params(&params(Some(bad), None), Utc::now());
            assert!(
                matches!(result, Err(AppError::ValidationError(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_blank_date_is_ignored() {
        let now = at(2024, 3, 13, 12, 0);
        let query =
            EventQuery::from_params(&params(Some(""), Some(TimeFilter::Today)), now).unwrap();
        assert_eq!(query.window.unwrap().start, midnight(2024, 3, 13));
    }

    #[test]
    fn test_date_takes_precedence_over_time_filter() {
        let now = at(2024, 6, 1, 8, 0);
        let query =
            EventQuery::from_params(&params(Some("2024-03-15"), Some(TimeFilter::Year)), now)
                .unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(query.window, TimeWindow::for_day(day));
    }

    #[test]
    fn test_no_filters_means_no_window() {
        let query = EventQuery::from_params(&ListEventsParams::default(), Utc::now()).unwrap();
        assert_eq!(query, EventQuery::default());
        assert!(query.matches(&event_starting(midnight(1999, 1, 1), 7)));
    }

    #[test]
    fn test_today_window() {
        let window = TimeWindow::relative(TimeFilter::Today, at(2024, 3, 13, 17, 45)).unwrap();
        assert_eq!(window.start, midnight(2024, 3, 13));
        assert_eq!(window.end, midnight(2024, 3, 14));
    }

    #[test]
    fn test_week_window_on_wednesday() {
        // 2024-03-13 is a Wednesday
        let window = TimeWindow::relative(TimeFilter::Week, at(2024, 3, 13, 10, 0)).unwrap();
        assert_eq!(window.start, midnight(2024, 3, 11));
        assert_eq!(window.end, midnight(2024, 3, 18));
    }

    #[test]
    fn test_week_window_edges() {
        let monday = TimeWindow::relative(TimeFilter::Week, midnight(2024, 3, 11)).unwrap();
        assert_eq!(monday.start, midnight(2024, 3, 11));

        let sunday = TimeWindow::relative(TimeFilter::Week, at(2024, 3, 17, 23, 59)).unwrap();
        assert_eq!(sunday.start, midnight(2024, 3, 11));
        assert_eq!(sunday.end, midnight(2024, 3, 18));

        // crosses a year boundary
        let window = TimeWindow::relative(TimeFilter::Week, at(2025, 1, 1, 9, 0)).unwrap();
        assert_eq!(window.start, midnight(2024, 12, 30));
        assert_eq!(window.end, midnight(2025, 1, 6));
    }

    #[test]
    fn test_month_window() {
        let window = TimeWindow::relative(TimeFilter::Month, at(2024, 2, 20, 10, 0)).unwrap();
        assert_eq!(window.start, midnight(2024, 2, 1));
        assert_eq!(window.end, midnight(2024, 3, 1));
    }

    #[test]
    fn test_month_window_rolls_over_in_december() {
        let window = TimeWindow::relative(TimeFilter::Month, at(2023, 12, 31, 23, 0)).unwrap();
        assert_eq!(window.start, midnight(2023, 12, 1));
        assert_eq!(window.end, midnight(2024, 1, 1));
    }

    #[test]
    fn test_year_window() {
        let window = TimeWindow::relative(TimeFilter::Year, at(2024, 7, 4, 12, 0)).unwrap();
        assert_eq!(window.start, midnight(2024, 1, 1));
        assert_eq!(window.end, midnight(2025, 1, 1));
    }

    #[test]
    fn test_category_and_owner_restrictions() {
        let owner = Uuid::new_v4();
        let mut event = event_starting(midnight(2024, 3, 15), 2);
        event.user_id = owner;

        let query = EventQuery {
            category_id: Some(2),
            ..EventQuery::default()
        };
        assert!(query.matches(&event));
        assert!(!query.matches(&event_starting(midnight(2024, 3, 15), 3)));

        assert!(EventQuery::owned_by(owner).matches(&event));
        assert!(!EventQuery::owned_by(Uuid::new_v4()).matches(&event));
    }

    #[test]
    fn test_time_filter_deserializes_lowercase() {
        let params: ListEventsParams =
            serde_json::from_value(serde_json::json!({ "time_filter": "week" })).unwrap();
        assert_eq!(params.time_filter, Some(TimeFilter::Week));
        assert!(serde_json::from_value::<ListEventsParams>(
            serde_json::json!({ "time_filter": "decade" })
        )
        .is_err());
    }
}
