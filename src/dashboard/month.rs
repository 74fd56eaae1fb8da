//! The dashboard's month cursor.
//!
//! The selected month is carried in the `month=YYYY-MM` query parameter.
//! Moving backward always succeeds; moving forward stops at the current
//! calendar month. "Now" is evaluated wherever a [time::Date] for today is
//! passed in, so the boundary shifts correctly when a session crosses
//! midnight.

use time::{Date, Month};

/// A calendar month selected on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedMonth {
    /// The calendar year.
    pub year: i32,
    /// The calendar month.
    pub month: Month,
}

impl SelectedMonth {
    /// The month that `date` falls in.
    pub fn for_date(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse a `YYYY-MM` query value, e.g. "2025-07".
    pub fn parse(raw: &str) -> Option<Self> {
        let (raw_year, raw_month) = raw.split_once('-')?;

        let year: i32 = raw_year.parse().ok()?;
        let month_number: u8 = raw_month.parse().ok()?;
        let month = Month::try_from(month_number).ok()?;

        Some(Self { year, month })
    }

    /// The `YYYY-MM` query value for this month, e.g. "2025-07".
    pub fn query_value(self) -> String {
        format!("{:04}-{:02}", self.year, self.month as u8)
    }

    /// The heading for this month, e.g. "July 2025".
    pub fn title(self) -> String {
        format!("{} {}", self.month, self.year)
    }

    /// Whether this is the month that `today` falls in.
    pub fn is_current(self, today: Date) -> bool {
        self == Self::for_date(today)
    }

    /// The month before this one. Always succeeds; January wraps to December
    /// of the previous year.
    pub fn previous(self) -> Self {
        let year = if self.month == Month::January {
            self.year - 1
        } else {
            self.year
        };

        Self {
            year,
            month: self.month.previous(),
        }
    }

    /// The month after this one, without ever advancing past the month that
    /// `today` falls in. At (or past) the current month this is a no-op.
    pub fn next(self, today: Date) -> Self {
        if self.key() >= Self::for_date(today).key() {
            return self;
        }

        let year = if self.month == Month::December {
            self.year + 1
        } else {
            self.year
        };

        Self {
            year,
            month: self.month.next(),
        }
    }

    /// Pull a cursor that points at a future month back to the current month.
    ///
    /// Query parameters are user input, so a forced `month=2099-01` must not
    /// let the cursor escape into the future.
    pub fn clamp_to(self, today: Date) -> Self {
        let current = Self::for_date(today);

        if self.key() > current.key() { current } else { self }
    }

    /// A sort key ordered by calendar position: year first, then month as its
    /// calendar number (January < February < … < December).
    pub fn key(self) -> (i32, u8) {
        (self.year, self.month as u8)
    }
}
