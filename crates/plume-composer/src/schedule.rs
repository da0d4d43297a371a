use chrono::{DateTime, Days, Duration, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// Formats accepted from a local date/time input, seconds optional.
const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Enter a valid date and time")]
    Unparseable(String),

    #[error("Schedule at least {min_minutes} minutes in the future")]
    TooSoon { min_minutes: i64 },

    #[error("Schedule no more than {max_days} days ahead")]
    TooFar { max_days: i64 },
}

/// Allowed range for a scheduled publish time, relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleWindow {
    pub min_lead: Duration,
    pub max_ahead: Duration,
}

impl Default for ScheduleWindow {
    fn default() -> Self {
        Self {
            min_lead: Duration::minutes(5),
            max_ahead: Duration::days(365),
        }
    }
}

impl ScheduleWindow {
    pub fn check(&self, candidate: DateTime<Utc>, now: DateTime<Utc>) -> Result<DateTime<Utc>, ScheduleError> {
        if candidate < now + self.min_lead {
            return Err(ScheduleError::TooSoon {
                min_minutes: self.min_lead.num_minutes(),
            });
        }
        if candidate > now + self.max_ahead {
            return Err(ScheduleError::TooFar {
                max_days: self.max_ahead.num_days(),
            });
        }
        Ok(candidate)
    }

    /// Parse a user-typed time in `tz` and check it against the window.
    pub fn parse<Tz: TimeZone>(
        &self,
        raw: &str,
        tz: &Tz,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, ScheduleError> {
        let candidate = parse_local(raw, tz)?;
        self.check(candidate, now)
    }
}

/// RFC 3339 with offset, or a naive local time interpreted in `tz`.
pub fn parse_local<Tz: TimeZone>(raw: &str, tz: &Tz) -> Result<DateTime<Utc>, ScheduleError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| ScheduleError::Unparseable(raw.to_string()))?;

    // Nonexistent local times (DST gap) are rejected; ambiguous ones take the
    // earlier instant.
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ScheduleError::Unparseable(raw.to_string()))
}

/// Shortcuts that skip manual entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickSelect {
    In30Minutes,
    In1Hour,
    Tomorrow9Am,
}

impl QuickSelect {
    pub const ALL: [QuickSelect; 3] = [QuickSelect::In30Minutes, QuickSelect::In1Hour, QuickSelect::Tomorrow9Am];

    pub fn label(self) -> &'static str {
        match self {
            QuickSelect::In30Minutes => "In 30 minutes",
            QuickSelect::In1Hour => "In 1 hour",
            QuickSelect::Tomorrow9Am => "Tomorrow 9 AM",
        }
    }

    pub fn resolve<Tz: TimeZone>(self, tz: &Tz, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            QuickSelect::In30Minutes => now + Duration::minutes(30),
            QuickSelect::In1Hour => now + Duration::hours(1),
            QuickSelect::Tomorrow9Am => {
                now.with_timezone(tz)
                    .date_naive()
                    .checked_add_days(Days::new(1))
                    .and_then(|day| day.and_hms_opt(9, 0, 0))
                    .and_then(|at| tz.from_local_datetime(&at).earliest())
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|| now + Duration::days(1))
            }
        }
    }
}

/// Schedule form field. Holds the last accepted value; rejected input leaves
/// the value alone and records the error instead.
#[derive(Debug, Clone, Default)]
pub struct ScheduleField {
    window: ScheduleWindow,
    value: Option<DateTime<Utc>>,
    error: Option<ScheduleError>,
}

impl ScheduleField {
    pub fn new(window: ScheduleWindow) -> Self {
        Self {
            window,
            value: None,
            error: None,
        }
    }

    pub fn window(&self) -> &ScheduleWindow {
        &self.window
    }

    /// `None` means publish immediately.
    pub fn value(&self) -> Option<DateTime<Utc>> {
        self.value
    }

    pub fn error(&self) -> Option<&ScheduleError> {
        self.error.as_ref()
    }

    /// Manual entry. Empty input clears the field.
    pub fn input<Tz: TimeZone>(
        &mut self,
        raw: &str,
        tz: &Tz,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, ScheduleError> {
        if raw.trim().is_empty() {
            self.clear();
            return Ok(None);
        }
        match self.window.parse(raw, tz, now) {
            Ok(at) => {
                self.value = Some(at);
                self.error = None;
                Ok(Some(at))
            }
            Err(e) => {
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub fn quick_select<Tz: TimeZone>(&mut self, choice: QuickSelect, tz: &Tz, now: DateTime<Utc>) -> DateTime<Utc> {
        let at = choice.resolve(tz, now);
        self.value = Some(at);
        self.error = None;
        at
    }

    /// Restore a previously accepted value (e.g. from a saved draft).
    pub fn set(&mut self, value: Option<DateTime<Utc>>) {
        self.value = value;
        self.error = None;
    }

    pub fn clear(&mut self) {
        self.value = None;
        self.error = None;
    }
}
