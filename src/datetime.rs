//! `DateTime` conversion and register utilities for the ISL12026 RTC.
//!
//! This module provides the internal representation and conversion logic for
//! the ISL12026's date and time registers. It enables safe, validated
//! conversion between the chip's BCD-encoded registers and chrono's
//! `NaiveDateTime`.
//!
//! # Register Model
//!
//! The ISL12026 stores date and time in 8 consecutive registers:
//! - Seconds, Minutes, Hours, Date, Month, Year, Day of week, Century
//!
//! The century register extends the two-digit year to an absolute year, and
//! the hours register carries the 24-hour (military) flag. Writes always use
//! the 24-hour encoding; reads also accept the chip's legacy 12-hour form.
//!
//! # Error Handling
//!
//! Conversion errors are reported via [`ISL12026DateTimeError`].

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::{Date, DayOfWeek, Hours, Minutes, Month, Seconds, Y2k, Year};

/// Internal representation of the ISL12026 RTC date and time.
///
/// This struct models the 8 contiguous date/time registers of the ISL12026,
/// using strongly-typed bitfield wrappers for each field, in register order
/// so it converts directly to and from the block read/written on the bus.
///
/// The day-of-week register is carried verbatim: it is written from the
/// calendar date but never used to derive anything on decode.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct ISL12026DateTime {
    seconds: Seconds,
    minutes: Minutes,
    hours: Hours,
    date: Date,
    month: Month,
    year: Year,
    day_of_week: DayOfWeek,
    y2k: Y2k,
}

impl ISL12026DateTime {
    /// Helper function to convert a number to BCD format with validation
    pub(crate) fn make_bcd(value: u32, max_value: u32) -> Result<(u8, u8), ISL12026DateTimeError> {
        if value > max_value {
            return Err(ISL12026DateTimeError::InvalidDateTime);
        }
        let ones = u8::try_from(value % 10).map_err(|_| ISL12026DateTimeError::InvalidDateTime)?;
        let tens = u8::try_from(value / 10).map_err(|_| ISL12026DateTimeError::InvalidDateTime)?;
        Ok((ones, tens))
    }

    fn convert_seconds(seconds: u32) -> Result<Seconds, ISL12026DateTimeError> {
        let (ones, tens) = Self::make_bcd(seconds, 59)?;
        let mut value = Seconds::default();
        value.set_seconds(ones);
        value.set_ten_seconds(tens);
        Ok(value)
    }

    fn convert_minutes(minutes: u32) -> Result<Minutes, ISL12026DateTimeError> {
        let (ones, tens) = Self::make_bcd(minutes, 59)?;
        let mut value = Minutes::default();
        value.set_minutes(ones);
        value.set_ten_minutes(tens);
        Ok(value)
    }

    /// Encodes an hour 0-23. The military flag is always set on the way out;
    /// the 12-hour encoding exists only on the read path.
    pub(crate) fn convert_hours(hour: u32) -> Result<Hours, ISL12026DateTimeError> {
        if hour > 23 {
            return Err(ISL12026DateTimeError::InvalidDateTime);
        }
        let ones = u8::try_from(hour % 10).map_err(|_| ISL12026DateTimeError::InvalidDateTime)?;
        let ten_hours = u8::from((10..20).contains(&hour));
        let twenty_hours = u8::from(hour >= 20);
        let mut value = Hours::default();
        value.set_military(true);
        value.set_hours(ones);
        value.set_ten_hours(ten_hours);
        value.set_pm_or_twenty_hours(twenty_hours);
        Ok(value)
    }

    fn convert_date(date: u32) -> Result<Date, ISL12026DateTimeError> {
        let (ones, tens) = Self::make_bcd(date, 31)?;
        let mut value = Date::default();
        value.set_date(ones);
        value.set_ten_date(tens);
        Ok(value)
    }

    fn convert_month(month: u32) -> Result<Month, ISL12026DateTimeError> {
        let (ones, tens) = Self::make_bcd(month, 12)?;
        let mut value = Month::default();
        value.set_month(ones);
        value.set_ten_month(tens);
        Ok(value)
    }

    fn convert_day_of_week(weekday: u32) -> Result<DayOfWeek, ISL12026DateTimeError> {
        if weekday > 6 {
            return Err(ISL12026DateTimeError::InvalidDateTime);
        }
        let mut value = DayOfWeek::default();
        value.set_day_of_week(
            u8::try_from(weekday).map_err(|_| ISL12026DateTimeError::InvalidDateTime)?,
        );
        Ok(value)
    }

    /// Splits an absolute year into the year and century registers.
    ///
    /// The stored century is year/100 plus a fixed offset of 19, so the
    /// registers can hold years 0 through 8099.
    pub(crate) fn convert_year(year: i32) -> Result<(Year, Y2k), ISL12026DateTimeError> {
        let century = year / 100 + 19;
        if year < 0 || century > 99 {
            #[cfg(feature = "log")]
            log::error!("year {} does not fit the year/century registers", year);
            #[cfg(feature = "defmt")]
            defmt::error!("year {} does not fit the year/century registers", year);
            return Err(ISL12026DateTimeError::YearOutOfRange);
        }

        let (ones, tens) = Self::make_bcd(year.unsigned_abs() % 100, 99)?;
        let mut value = Year::default();
        value.set_year(ones);
        value.set_ten_year(tens);

        let (ones, tens) = Self::make_bcd(century.unsigned_abs(), 99)?;
        let mut y2k = Y2k::default();
        y2k.set_century(ones);
        y2k.set_ten_century(tens);

        Ok((value, y2k))
    }

    pub(crate) fn from_datetime(datetime: &NaiveDateTime) -> Result<Self, ISL12026DateTimeError> {
        let seconds = Self::convert_seconds(datetime.second())?;
        let minutes = Self::convert_minutes(datetime.minute())?;
        let hours = Self::convert_hours(datetime.hour())?;
        let date = Self::convert_date(datetime.day())?;
        // chrono months are 1-12, exactly what the register holds
        let month = Self::convert_month(datetime.month())?;
        let (year, y2k) = Self::convert_year(datetime.year())?;
        let day_of_week = Self::convert_day_of_week(datetime.weekday().num_days_from_sunday())?;

        Ok(ISL12026DateTime {
            seconds,
            minutes,
            hours,
            date,
            month,
            year,
            day_of_week,
            y2k,
        })
    }

    pub(crate) fn into_datetime(self) -> Result<NaiveDateTime, ISL12026DateTimeError> {
        let seconds =
            10 * u32::from(self.seconds.ten_seconds()) + u32::from(self.seconds.seconds());
        let minutes =
            10 * u32::from(self.minutes.ten_minutes()) + u32::from(self.minutes.minutes());
        let hours = 10 * u32::from(self.hours.ten_hours()) + u32::from(self.hours.hours());
        let hours = if self.hours.military() {
            hours + 20 * u32::from(self.hours.pm_or_twenty_hours())
        } else {
            // Legacy 12-hour content with bit 5 as AM/PM. This driver never
            // writes the format, but the chip may hold it from elsewhere.
            hours + 12 * u32::from(self.hours.pm_or_twenty_hours())
        };

        let century = 10 * i32::from(self.y2k.ten_century()) + i32::from(self.y2k.century());
        let year = 10 * i32::from(self.year.ten_year())
            + i32::from(self.year.year())
            + 100 * (century - 19);
        let month = 10 * u32::from(self.month.ten_month()) + u32::from(self.month.month());
        let date = 10 * u32::from(self.date.ten_date()) + u32::from(self.date.date());

        // Validate the date components before creating NaiveDateTime
        NaiveDate::from_ymd_opt(year, month, date)
            .and_then(|d| d.and_hms_opt(hours, minutes, seconds))
            .ok_or(ISL12026DateTimeError::InvalidDateTime)
    }
}

impl From<[u8; 8]> for ISL12026DateTime {
    fn from(data: [u8; 8]) -> Self {
        ISL12026DateTime {
            seconds: Seconds(data[0]),
            minutes: Minutes(data[1]),
            hours: Hours(data[2]),
            date: Date(data[3]),
            month: Month(data[4]),
            year: Year(data[5]),
            day_of_week: DayOfWeek(data[6]),
            y2k: Y2k(data[7]),
        }
    }
}

impl From<&ISL12026DateTime> for [u8; 8] {
    fn from(dt: &ISL12026DateTime) -> [u8; 8] {
        [
            dt.seconds.0,
            dt.minutes.0,
            dt.hours.0,
            dt.date.0,
            dt.month.0,
            dt.year.0,
            dt.day_of_week.0,
            dt.y2k.0,
        ]
    }
}

#[derive(Debug)]
/// Errors that can occur during ISL12026 date/time conversion or validation.
pub enum ISL12026DateTimeError {
    /// The provided or decoded date/time is invalid (e.g., out of range, not representable)
    InvalidDateTime,
    /// The year cannot be represented by the two-digit year and century registers
    YearOutOfRange,
}
