use crate::core::currency::CurrencyCode;
use chrono::{Datelike, NaiveDate, Weekday};
use log::debug;
use std::fmt;
use thiserror::Error;

const DAYS_PER_WEEK: usize = 7;

const WEEK: [Weekday; DAYS_PER_WEEK] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Currencies settled through the Sunday–Thursday partner.
const GULF_CURRENCIES: [&str; 2] = ["AED", "SAR"];

/// Errors arising from calendar construction and date rolling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("operational week has no entry for {0}")]
    IncompleteWeek(Weekday),
    #[error("operational week lists {0} more than once")]
    DuplicateWeekday(Weekday),
    #[error("operational week has no operational day")]
    NoOperationalDays,
    #[error("no operational day within {days} days of {start}")]
    NoOperationalDayWithin { start: NaiveDate, days: usize },
}

/// Which weekdays a settlement partner processes.
///
/// Always holds exactly one entry per weekday and at least one
/// operational day, so a forward search from any date ends within a week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationalWeek {
    /// Indexed by `Weekday::num_days_from_monday`.
    days: [bool; DAYS_PER_WEEK],
}

impl OperationalWeek {
    /// Sunday through Thursday.
    pub const GULF: OperationalWeek = OperationalWeek {
        days: [true, true, true, true, false, false, true],
    };

    /// Monday through Friday.
    pub const STANDARD: OperationalWeek = OperationalWeek {
        days: [true, true, true, true, true, false, false],
    };

    /// Build a week from an explicit weekday table.
    ///
    /// Every weekday must appear exactly once and at least one must be
    /// operational.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Weekday;
    /// use settlement_report::calendar::policy::{CalendarError, OperationalWeek};
    ///
    /// let err = OperationalWeek::from_days(&[(Weekday::Mon, true)]).unwrap_err();
    /// assert_eq!(err, CalendarError::IncompleteWeek(Weekday::Tue));
    /// ```
    pub fn from_days(table: &[(Weekday, bool)]) -> Result<Self, CalendarError> {
        let mut days: [Option<bool>; DAYS_PER_WEEK] = [None; DAYS_PER_WEEK];
        for &(weekday, operational) in table {
            let slot = &mut days[weekday.num_days_from_monday() as usize];
            if slot.is_some() {
                return Err(CalendarError::DuplicateWeekday(weekday));
            }
            *slot = Some(operational);
        }

        let mut resolved = [false; DAYS_PER_WEEK];
        for (i, weekday) in WEEK.iter().enumerate() {
            resolved[i] = days[i].ok_or(CalendarError::IncompleteWeek(*weekday))?;
        }
        if !resolved.iter().any(|open| *open) {
            return Err(CalendarError::NoOperationalDays);
        }
        Ok(Self { days: resolved })
    }

    pub fn is_operational(&self, weekday: Weekday) -> bool {
        self.days[weekday.num_days_from_monday() as usize]
    }


    pub fn is_operational_day(&self, date: NaiveDate) -> bool {
        self.is_operational(date.weekday())
    }

    /// The earliest operational date on or after `date`.
    ///
    /// Looks at most one week ahead.
    pub fn next_operational_day(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        date.iter_days()
            .take(DAYS_PER_WEEK)
            .find(|candidate| self.is_operational_day(*candidate))
            .ok_or(CalendarError::NoOperationalDayWithin {
                start: date,
                days: DAYS_PER_WEEK,
            })
    }
}

/// Partner calendar an instruction settles against.
///
/// Selection is a pure function of the currency code: AED and SAR go
/// through the Gulf partner, everything else through the default one.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use settlement_report::calendar::policy::CalendarPolicy;
/// use settlement_report::core::currency::CurrencyCode;
///
/// let policy = CalendarPolicy::for_currency(&CurrencyCode::new("AED"));
/// let friday = NaiveDate::from_ymd_opt(2018, 7, 27).unwrap();
/// assert!(!policy.is_operational_day(friday));
/// assert_eq!(
///     policy.next_operational_day(friday).unwrap(),
///     NaiveDate::from_ymd_opt(2018, 7, 29).unwrap(),
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarPolicy {
    /// Sunday–Thursday, closed Friday and Saturday.
    Gulf,
    /// Monday–Friday, closed Saturday and Sunday.
    Default,
}

impl CalendarPolicy {
    pub fn for_currency(currency: &CurrencyCode) -> Self {
        if GULF_CURRENCIES.contains(&currency.as_str()) {
            CalendarPolicy::Gulf
        } else {
            CalendarPolicy::Default
        }
    }

    pub fn week(&self) -> &'static OperationalWeek {
        match self {
            CalendarPolicy::Gulf => &OperationalWeek::GULF,
            CalendarPolicy::Default => &OperationalWeek::STANDARD,
        }
    }

    pub fn is_operational_day(&self, date: NaiveDate) -> bool {
        let operational = self.week().is_operational_day(date);
        debug!("policy={} date={} operational={}", self, date, operational);
        operational
    }

    pub fn next_operational_day(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        self.week().next_operational_day(date)
    }
}

impl fmt::Display for CalendarPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarPolicy::Gulf => write!(f, "Gulf"),
            CalendarPolicy::Default => write!(f, "Default"),
        }
    }
}
