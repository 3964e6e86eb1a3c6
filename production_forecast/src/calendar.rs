//! Calendar and holiday annotations for a date

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Source of public holidays for the configured jurisdiction
pub trait HolidayCalendar {
    /// Whether `date` is a public holiday
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

impl<C: HolidayCalendar + ?Sized> HolidayCalendar for &C {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        (**self).is_holiday(date)
    }
}

impl<C: HolidayCalendar + ?Sized> HolidayCalendar for Box<C> {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        (**self).is_holiday(date)
    }
}

/// Brazilian national public holidays
#[derive(Debug, Clone, Copy, Default)]
pub struct BrazilianHolidays;

impl HolidayCalendar for BrazilianHolidays {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        let year = date.year();

        let fixed = matches!(
            (date.month(), date.day()),
            (1, 1)     // Universal Fraternization
            | (4, 21)  // Tiradentes
            | (5, 1)   // Labour Day
            | (9, 7)   // Independence Day
            | (11, 2)  // All Souls' Day
            | (11, 15) // Republic Proclamation
            | (12, 25) // Christmas
        );
        if fixed {
            return true;
        }

        // Our Lady of Aparecida
        if year >= 1980 && date.month() == 10 && date.day() == 12 {
            return true;
        }

        // Black Awareness Day
        if year >= 2024 && date.month() == 11 && date.day() == 20 {
            return true;
        }

        easter_sunday(year)
            .and_then(|easter| easter.pred_opt())
            .and_then(|saturday| saturday.pred_opt())
            .map_or(false, |good_friday| good_friday == date)
    }
}

/// Gregorian Easter Sunday (anonymous Gregorian algorithm)
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// An explicit set of holiday dates
#[derive(Debug, Clone, Default)]
pub struct HolidaySet {
    dates: HashSet<NaiveDate>,
}

impl HolidaySet {
    /// Create a holiday set from a list of dates
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }
}

impl HolidayCalendar for HolidaySet {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

/// A base calendar plus additional configured dates
#[derive(Debug, Clone)]
pub struct ExtendedCalendar<C> {
    base: C,
    extra: HolidaySet,
}

impl<C: HolidayCalendar> ExtendedCalendar<C> {
    /// Combine `base` with `extra` holiday dates
    pub fn new(base: C, extra: HolidaySet) -> Self {
        Self { base, extra }
    }
}

impl<C: HolidayCalendar> HolidayCalendar for ExtendedCalendar<C> {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.extra.is_holiday(date) || self.base.is_holiday(date)
    }
}

/// Half of the month a date falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fortnight {
    /// Days 1 to 15
    First,
    /// Days 16 to the end of the month
    Second,
}

impl Fortnight {
    /// Fortnight of a date
    pub fn of(date: NaiveDate) -> Self {
        if date.day() <= 15 {
            Fortnight::First
        } else {
            Fortnight::Second
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Fortnight::First => "First Fortnight",
            Fortnight::Second => "Second Fortnight",
        }
    }

    /// Ordinal code used when the field is fed to a model as a number
    pub fn code(&self) -> f64 {
        match self {
            Fortnight::First => 0.0,
            Fortnight::Second => 1.0,
        }
    }
}

/// Calendar features of a single date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalendarFeatures {
    /// Weekday index, Monday = 0
    pub weekday: u32,
    /// Month number, 1 to 12
    pub month: u32,
    /// Last day of its month
    pub is_month_end: bool,
    /// Half of the month
    pub fortnight: Fortnight,
    /// Saturday or Sunday
    pub is_weekend: bool,
    /// The date is a holiday
    pub is_holiday: bool,
    /// The next calendar day is a holiday
    pub is_pre_holiday: bool,
    /// The previous calendar day is a holiday
    pub is_post_holiday: bool,
}

impl CalendarFeatures {
    /// Annotate a date, looking up both neighbouring days in `calendar`
    pub fn for_date<C: HolidayCalendar + ?Sized>(date: NaiveDate, calendar: &C) -> Self {
        let weekday = date.weekday().num_days_from_monday();

        Self {
            weekday,
            month: date.month(),
            is_month_end: date.succ_opt().map_or(true, |next| next.month() != date.month()),
            fortnight: Fortnight::of(date),
            is_weekend: weekday > 4,
            is_holiday: calendar.is_holiday(date),
            is_pre_holiday: date.succ_opt().map_or(false, |next| calendar.is_holiday(next)),
            is_post_holiday: date.pred_opt().map_or(false, |prev| calendar.is_holiday(prev)),
        }
    }

    /// English name of the weekday
    pub fn day_name(&self) -> &'static str {
        weekday_name(self.weekday)
    }
}

/// English name for a Monday-based weekday index
pub fn weekday_name(index: u32) -> &'static str {
    match index {
        0 => "Monday",
        1 => "Tuesday",
        2 => "Wednesday",
        3 => "Thursday",
        4 => "Friday",
        5 => "Saturday",
        _ => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(2023, date(2023, 4, 9))]
    #[case(2024, date(2024, 3, 31))]
    #[case(2025, date(2025, 4, 20))]
    fn test_easter_sunday(#[case] year: i32, #[case] expected: NaiveDate) {
        assert_eq!(easter_sunday(year), Some(expected));
    }

    #[rstest]
    #[case(date(2024, 1, 1), true)]
    #[case(date(2024, 3, 29), true)] // Good Friday
    #[case(date(2024, 11, 20), true)]
    #[case(date(2023, 11, 20), false)]
    #[case(date(2024, 10, 12), true)]
    #[case(date(2024, 3, 28), false)]
    fn test_brazilian_holidays(#[case] day: NaiveDate, #[case] expected: bool) {
        assert_eq!(BrazilianHolidays.is_holiday(day), expected);
    }

    #[test]
    fn test_calendar_features_around_christmas() {
        let cal = BrazilianHolidays;

        let eve = CalendarFeatures::for_date(date(2023, 12, 24), &cal);
        assert!(eve.is_pre_holiday);
        assert!(!eve.is_holiday);
        assert!(eve.is_weekend); // Sunday
        assert_eq!(eve.day_name(), "Sunday");
        assert_eq!(eve.fortnight.label(), "Second Fortnight");

        let boxing = CalendarFeatures::for_date(date(2023, 12, 26), &cal);
        assert!(boxing.is_post_holiday);
        assert!(!boxing.is_pre_holiday);
        assert_eq!(boxing.weekday, 1);
    }

    #[test]
    fn test_month_end_and_fortnight() {
        let cal = HolidaySet::default();

        let feb = CalendarFeatures::for_date(date(2024, 2, 29), &cal);
        assert!(feb.is_month_end);
        assert_eq!(feb.month, 2);

        let mid = CalendarFeatures::for_date(date(2024, 2, 15), &cal);
        assert!(!mid.is_month_end);
        assert_eq!(mid.fortnight, Fortnight::First);
    }

    #[test]
    fn test_extended_calendar_adds_dates() {
        let extra = HolidaySet::new([date(2024, 6, 13)]);
        let cal = ExtendedCalendar::new(BrazilianHolidays, extra);

        assert!(cal.is_holiday(date(2024, 6, 13)));
        assert!(cal.is_holiday(date(2024, 12, 25)));
        assert!(!cal.is_holiday(date(2024, 6, 14)));
    }
}
