//! Register definitions and bitfield structures for the ISL12026 RTC.
//!
//! This module contains all register addresses, bitfield definitions, and
//! related types for interacting with the ISL12026 Real-Time Clock registers.
//!
//! The ISL12026 addresses its clock/control registers (CCR) with a 2-byte
//! register address whose high byte is never used; every transaction sends
//! [`REG_ADDR_MSB`] followed by the low address byte.

use bitfield::bitfield;

/// High byte of the 2-byte register address. The whole CCR fits in the low
/// byte, so this is always zero on the wire.
pub const REG_ADDR_MSB: u8 = 0x00;

/// Register addresses for the ISL12026 RTC.
///
/// The eight time registers are contiguous from [`RegAddr::Seconds`] and are
/// read in a single transaction. The status register is not contiguous with
/// the time block and needs its own transaction.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Power control register (battery switchover behavior)
    Power = 0x14,
    /// Seconds register (0-59)
    Seconds = 0x30,
    /// Minutes register (0-59)
    Minutes = 0x31,
    /// Hours register (0-23, or 1-12 + AM/PM when the MIL bit is clear)
    Hours = 0x32,
    /// Date register (1-31)
    Date = 0x33,
    /// Month register (1-12)
    Month = 0x34,
    /// Year register (0-99)
    Year = 0x35,
    /// Day of week register (0-6)
    DayOfWeek = 0x36,
    /// Century register, paired with the year register
    Y2k = 0x37,
    /// Status register (write latches and failure flags)
    Status = 0x3F,
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Seconds register (0-59) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Seconds(u8);
    impl Debug;
    /// Tens place of seconds (0-5)
    pub ten_seconds, set_ten_seconds: 6, 4;
    /// Ones place of seconds (0-9)
    pub seconds, set_seconds: 3, 0;
}
from_register_u8!(Seconds);

#[cfg(feature = "defmt")]
impl defmt::Format for Seconds {
    fn format(&self, f: defmt::Formatter) {
        let seconds = 10 * self.ten_seconds() + self.seconds();
        defmt::write!(f, "Seconds({}s)", seconds);
    }
}

bitfield! {
    /// Minutes register (0-59) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Minutes(u8);
    impl Debug;
    /// Tens place of minutes (0-5)
    pub ten_minutes, set_ten_minutes: 6, 4;
    /// Ones place of minutes (0-9)
    pub minutes, set_minutes: 3, 0;
}
from_register_u8!(Minutes);

#[cfg(feature = "defmt")]
impl defmt::Format for Minutes {
    fn format(&self, f: defmt::Formatter) {
        let minutes = 10 * self.ten_minutes() + self.minutes();
        defmt::write!(f, "Minutes({}m)", minutes);
    }
}

bitfield! {
    /// Hours register with military (24-hour) flag and BCD encoding.
    ///
    /// When the MIL bit is clear the register holds a legacy 12-hour value
    /// and bit 5 is the AM/PM flag instead of the twenty-hours digit. This
    /// driver always writes with MIL set.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Hours(u8);
    impl Debug;
    /// Military (24-hour) format flag
    pub military, set_military: 7;
    /// PM flag (12-hour) or twenty-hours bit (24-hour)
    pub pm_or_twenty_hours, set_pm_or_twenty_hours: 5, 5;
    /// Tens place of hours
    pub ten_hours, set_ten_hours: 4, 4;
    /// Ones place of hours
    pub hours, set_hours: 3, 0;
}
from_register_u8!(Hours);

#[cfg(feature = "defmt")]
impl defmt::Format for Hours {
    fn format(&self, f: defmt::Formatter) {
        let hours = 10 * self.ten_hours() + self.hours();
        if self.military() {
            let hours = hours + 20 * self.pm_or_twenty_hours();
            defmt::write!(f, "Hours({}h 24h)", hours);
        } else {
            let is_pm = self.pm_or_twenty_hours() != 0;
            defmt::write!(f, "Hours({}h {})", hours, if is_pm { "PM" } else { "AM" });
        }
    }
}

bitfield! {
    /// Date register (1-31) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Date(u8);
    impl Debug;
    /// Tens place of date (0-3)
    pub ten_date, set_ten_date: 5, 4;
    /// Ones place of date (0-9)
    pub date, set_date: 3, 0;
}
from_register_u8!(Date);

#[cfg(feature = "defmt")]
impl defmt::Format for Date {
    fn format(&self, f: defmt::Formatter) {
        let date = 10 * self.ten_date() + self.date();
        defmt::write!(f, "Date({})", date);
    }
}

bitfield! {
    /// Month register (1-12) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Month(u8);
    impl Debug;
    /// Tens place of month (0-1)
    pub ten_month, set_ten_month: 4, 4;
    /// Ones place of month (0-9)
    pub month, set_month: 3, 0;
}
from_register_u8!(Month);

#[cfg(feature = "defmt")]
impl defmt::Format for Month {
    fn format(&self, f: defmt::Formatter) {
        let month = 10 * self.ten_month() + self.month();
        defmt::write!(f, "Month({})", month);
    }
}

bitfield! {
    /// Year register (0-99) with BCD encoding; the century lives in [`Y2k`].
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Year(u8);
    impl Debug;
    /// Tens place of year (0-9)
    pub ten_year, set_ten_year: 7, 4;
    /// Ones place of year (0-9)
    pub year, set_year: 3, 0;
}
from_register_u8!(Year);

#[cfg(feature = "defmt")]
impl defmt::Format for Year {
    fn format(&self, f: defmt::Formatter) {
        let year = 10 * self.ten_year() + self.year();
        defmt::write!(f, "Year({})", year);
    }
}

bitfield! {
    /// Day of week register (0-6), raw binary rather than BCD.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct DayOfWeek(u8);
    impl Debug;
    /// Day of week (0 = Sunday)
    pub day_of_week, set_day_of_week: 2, 0;
}
from_register_u8!(DayOfWeek);

#[cfg(feature = "defmt")]
impl defmt::Format for DayOfWeek {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "DayOfWeek({})", self.day_of_week());
    }
}

bitfield! {
    /// Century (Y2K) register with BCD encoding.
    ///
    /// Holds the high two digits of the year plus a fixed offset of 19, so
    /// together with [`Year`] it reconstructs an absolute year.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Y2k(u8);
    impl Debug;
    /// Tens place of the century value
    pub ten_century, set_ten_century: 7, 4;
    /// Ones place of the century value
    pub century, set_century: 3, 0;
}
from_register_u8!(Y2k);

#[cfg(feature = "defmt")]
impl defmt::Format for Y2k {
    fn format(&self, f: defmt::Formatter) {
        let century = 10 * self.ten_century() + self.century();
        defmt::write!(f, "Y2k({})", century);
    }
}

bitfield! {
    /// Status register for failure flags and the write-enable latches.
    ///
    /// Latch bits are transient hardware state toggled by the unlock
    /// sequence itself, so this register is always read fresh and never
    /// cached.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Status(u8);
    impl Debug;
    /// Oscillator failure flag
    pub oscillator_failed, set_oscillator_failed: 4;
    /// Register write enable latch (armed by the second unlock step)
    pub register_write_enable_latch, set_register_write_enable_latch: 2;
    /// Write enable latch (armed by the first unlock step)
    pub write_enable_latch, set_write_enable_latch: 1;
    /// Total power failure flag; the time is meaningless until rewritten
    pub power_failed, set_power_failed: 0;
}
from_register_u8!(Status);

impl Status {
    /// WEL bit mask as written on the wire by the unlock sequence.
    pub const WEL: u8 = 1 << 1;
    /// RWEL bit mask as written on the wire by the unlock sequence.
    pub const RWEL: u8 = 1 << 2;
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Status(");
        let mut first = true;
        if self.oscillator_failed() {
            defmt::write!(f, "OSCF");
            first = false;
        }
        if self.register_write_enable_latch() {
            if !first {
                defmt::write!(f, ", ");
            }
            defmt::write!(f, "RWEL");
            first = false;
        }
        if self.write_enable_latch() {
            if !first {
                defmt::write!(f, ", ");
            }
            defmt::write!(f, "WEL");
            first = false;
        }
        if self.power_failed() {
            if !first {
                defmt::write!(f, ", ");
            }
            defmt::write!(f, "RTCF");
            first = false;
        }
        if first {
            defmt::write!(f, "clear");
        }
        defmt::write!(f, ")");
    }
}

bitfield! {
    /// Power control register for battery switchover behavior.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Power(u8);
    impl Debug;
    /// Disable the bus interface while running from battery backup
    pub disable_bus_on_battery, set_disable_bus_on_battery: 7;
    /// Battery switch mode, selects when to switch to battery power
    pub battery_switch_mode, set_battery_switch_mode: 6;
}
from_register_u8!(Power);

#[cfg(feature = "defmt")]
impl defmt::Format for Power {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Power(");
        let mut first = true;
        if self.disable_bus_on_battery() {
            defmt::write!(f, "SBIB");
            first = false;
        }
        if self.battery_switch_mode() {
            if !first {
                defmt::write!(f, ", ");
            }
            defmt::write!(f, "BSW");
            first = false;
        }
        if first {
            defmt::write!(f, "clear");
        }
        defmt::write!(f, ")");
    }
}
