#![no_std]

//! A platform-agnostic driver for the Intersil ISL12026 real-time clock.
//!
//! The ISL12026 keeps time through power loss on a backup battery and sits
//! on I2C at the fixed address 0x6F. Two things set it apart from most RTCs:
//!
//! - Registers are addressed with two bytes, the high byte always zero.
//! - The clock/control registers are write-protected. Every write must be
//!   preceded by two status register writes arming the write enable latches,
//!   each issued as its own bus transaction.
//!
//! This crate covers the unlock protocol, the BCD date/time codec including
//! the chip's century register, the battery power options, and the failure
//! diagnostics carried in the status register.
//!
//! # Example
//!
//! ```rust,ignore
//! use isl12026::{Config, ISL12026};
//!
//! let mut rtc = ISL12026::new(i2c);
//!
//! // Battery power options. A failure here is reported but the clock keeps
//! // time without it, so bring-up may continue.
//! let _ = rtc.configure(&Config::default());
//!
//! let now = rtc.datetime()?;
//! ```
//!
//! # Features
//!
//! - `async`: async driver in [`asynch`] using `embedded-hal-async`
//! - `log`: debug and warning output through the `log` crate
//! - `defmt`: the same output through `defmt` for embedded targets

use chrono::NaiveDateTime;
use embedded_hal::i2c::I2c;
use paste::paste;

#[cfg(feature = "async")]
pub mod asynch;
mod datetime;
mod diagnostics;
mod registers;
mod unlock;

pub(crate) use datetime::ISL12026DateTime;
pub use datetime::ISL12026DateTimeError;
pub use diagnostics::Diagnostic;
pub use registers::{
    Date, DayOfWeek, Hours, Minutes, Month, Power, REG_ADDR_MSB, RegAddr, Seconds, Status, Y2k,
    Year,
};
pub(crate) use unlock::UnlockSequence;

/// Fixed I2C address of the ISL12026. The chip has no address straps.
pub const DEVICE_ADDRESS: u8 = 0x6F;

/// Errors returned by the ISL12026 driver.
#[derive(Debug)]
pub enum ISL12026Error<I2CE> {
    /// An I2C bus error
    I2c(I2CE),
    /// The date/time could not be encoded for the chip's registers
    Encode(ISL12026DateTimeError),
    /// The chip's registers did not decode to a valid date/time
    Decode(ISL12026DateTimeError),
}

impl<I2CE> From<I2CE> for ISL12026Error<I2CE> {
    fn from(e: I2CE) -> Self {
        ISL12026Error::I2c(e)
    }
}

/// Battery power behavior applied by [`ISL12026::configure`].
///
/// The default matches the recommended bring-up: keep the bus quiet while on
/// battery and use the standard switchover mode.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Config {
    /// Disable the I2C interface while running from battery backup (SBIB)
    pub disable_bus_on_battery: bool,
    /// Battery switch mode bit (BSW), selects the switchover threshold
    pub battery_switch_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            disable_bus_on_battery: true,
            battery_switch_mode: true,
        }
    }
}

/// ISL12026 Real-Time Clock driver.
///
/// This struct provides the blocking interface to the ISL12026 RTC device
/// through the `embedded-hal` I2C traits. The async twin lives in
/// [`asynch`](crate::asynch) behind the `async` feature.
pub struct ISL12026<I2C: I2c> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> ISL12026<I2C> {
    /// Creates a new ISL12026 driver instance at the chip's fixed address.
    ///
    /// # Arguments
    /// * `i2c` - The I2C bus implementation
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            address: DEVICE_ADDRESS,
        }
    }

    /// Creates a driver instance with a non-standard address, for bus
    /// multiplexers or translators that remap the device.
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Consumes the driver and releases the I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Reads consecutive registers starting at `reg` into `buf`.
    fn read_regs(&mut self, reg: RegAddr, buf: &mut [u8]) -> Result<(), ISL12026Error<I2C::Error>> {
        self.i2c
            .write_read(self.address, &[REG_ADDR_MSB, reg as u8], buf)?;
        Ok(())
    }

    /// Performs one protected write.
    ///
    /// `payload` is a complete transfer starting with the 2-byte register
    /// address. The two latch-arming writes and the payload each go out as
    /// separate transactions; a failed step aborts the sequence with the
    /// remaining steps unsent.
    fn write_ccr(&mut self, payload: &[u8]) -> Result<(), ISL12026Error<I2C::Error>> {
        for step in UnlockSequence::new(payload) {
            self.i2c.write(self.address, step)?;
        }
        Ok(())
    }

    /// Performs a protected write of a single register.
    fn write_ccr_reg(&mut self, reg: RegAddr, value: u8) -> Result<(), ISL12026Error<I2C::Error>> {
        self.write_ccr(&[REG_ADDR_MSB, reg as u8, value])
    }

    /// Applies the battery power configuration.
    ///
    /// The error is reported so the caller can decide; timekeeping works
    /// without this configuration, so it is safe to ignore during bring-up.
    ///
    /// # Arguments
    /// * `config` - The configuration to apply
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(ISL12026Error)` on error
    pub fn configure(&mut self, config: &Config) -> Result<(), ISL12026Error<I2C::Error>> {
        let mut power = Power::default();
        power.set_disable_bus_on_battery(config.disable_bus_on_battery);
        power.set_battery_switch_mode(config.battery_switch_mode);
        if let Err(e) = self.write_ccr_reg(RegAddr::Power, power.into()) {
            #[cfg(feature = "log")]
            log::warn!("unable to apply the battery power configuration");
            #[cfg(feature = "defmt")]
            defmt::warn!("unable to apply the battery power configuration");
            return Err(e);
        }
        Ok(())
    }

    /// Gets the current date and time from the device.
    ///
    /// Reads the eight time registers in one transaction, then the status
    /// register in a second one. Failure flags in the status register are
    /// reported as warnings and do not fail the read; the time returned by a
    /// chip with diagnostics pending should not be trusted though.
    ///
    /// # Returns
    /// * `Ok(NaiveDateTime)` - The current date and time
    /// * `Err(ISL12026Error)` on error
    pub fn datetime(&mut self) -> Result<NaiveDateTime, ISL12026Error<I2C::Error>> {
        let mut data = [0; 8];
        self.read_regs(RegAddr::Seconds, &mut data)?;
        let raw = ISL12026DateTime::from(data);

        // The status register is not adjacent to the time block and needs its
        // own transaction.
        let status = self.status()?;
        for _diagnostic in status.diagnostics() {
            #[cfg(feature = "log")]
            log::warn!("{}", _diagnostic.message());
            #[cfg(feature = "defmt")]
            defmt::warn!("{=str}", _diagnostic.message());
        }

        #[cfg(feature = "log")]
        log::debug!("raw={:?}", raw);
        #[cfg(feature = "defmt")]
        defmt::debug!("raw={}", raw);

        raw.into_datetime().map_err(ISL12026Error::Decode)
    }

    /// Sets the current date and time on the device.
    ///
    /// The date/time is encoded before any bus traffic, always in 24-hour
    /// form, and written with one protected write covering all eight time
    /// registers.
    ///
    /// # Arguments
    /// * `datetime` - The date and time to set
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(ISL12026Error)` on error
    pub fn set_datetime(
        &mut self,
        datetime: &NaiveDateTime,
    ) -> Result<(), ISL12026Error<I2C::Error>> {
        let raw = ISL12026DateTime::from_datetime(datetime).map_err(ISL12026Error::Encode)?;
        #[cfg(feature = "log")]
        log::debug!("raw={:?}", raw);
        #[cfg(feature = "defmt")]
        defmt::debug!("raw={}", raw);
        let data: [u8; 8] = (&raw).into();
        self.write_ccr(&[
            REG_ADDR_MSB,
            RegAddr::Seconds as u8,
            data[0],
            data[1],
            data[2],
            data[3],
            data[4],
            data[5],
            data[6],
            data[7],
        ])
    }

    /// Reads the status register.
    ///
    /// Always a fresh read; the latch bits change as a side effect of every
    /// protected write. Use [`Status::diagnostics`] to interpret the failure
    /// flags.
    ///
    /// # Returns
    /// * `Ok(Status)` - The status register value on success
    /// * `Err(ISL12026Error)` on error
    pub fn status(&mut self) -> Result<Status, ISL12026Error<I2C::Error>> {
        let mut data = [0];
        self.read_regs(RegAddr::Status, &mut data)?;
        Ok(Status(data[0]))
    }
}

// Register access implementations
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> ISL12026<I2C> {
            $(
                paste! {
                    #[doc = concat!("Gets the value of the ", stringify!($name), " register.")]
                    #[doc = "\n\n# Returns"]
                    #[doc = concat!("* `Ok(", stringify!($typ), ")` - The register value on success")]
                    #[doc = "* `Err(ISL12026Error)` on error"]
                    pub fn $name(&mut self) -> Result<$typ, ISL12026Error<I2C::Error>> {
                        let mut data = [0];
                        self.read_regs($regaddr, &mut data)?;
                        Ok($typ(data[0]))
                    }

                    #[doc = concat!("Sets the value of the ", stringify!($name), " register with a protected write.")]
                    #[doc = "\n\n# Arguments"]
                    #[doc = concat!("* `value` - The value to write to the ", stringify!($name), " register")]
                    #[doc = "\n\n# Returns"]
                    #[doc = "* `Ok(())` on success"]
                    #[doc = "* `Err(ISL12026Error)` on error"]
                    pub fn [<set_ $name>](&mut self, value: $typ) -> Result<(), ISL12026Error<I2C::Error>> {
                        self.write_ccr_reg($regaddr, value.into())
                    }
                }
            )+
        }
    }
}

impl_register_access!(
    (second, RegAddr::Seconds, Seconds),
    (minute, RegAddr::Minutes, Minutes),
    (hour, RegAddr::Hours, Hours),
    (date, RegAddr::Date, Date),
    (month, RegAddr::Month, Month),
    (year, RegAddr::Year, Year),
    (day_of_week, RegAddr::DayOfWeek, DayOfWeek),
    (y2k, RegAddr::Y2k, Y2k),
    (power, RegAddr::Power, Power)
);

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use alloc::vec;
    use chrono::{Datelike, NaiveDate, Timelike};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    fn datetime(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    #[test]
    fn test_read_datetime() {
        let mock = I2cMock::new(&[
            // Block read of the eight time registers
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![0x00, 0x30],
                vec![0x00, 0x30, 0x95, 0x14, 0x03, 0x24, 0x04, 0x39],
            ),
            // Separate status read
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00, 0x3F], vec![0x00]),
        ]);
        let mut dev = ISL12026::new(mock);

        let dt = dev.datetime().unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 3);
        assert_eq!(dt.day(), 14);
        assert_eq!(dt.hour(), 15);
        assert_eq!(dt.minute(), 30);
        assert_eq!(dt.second(), 0);
        dev.i2c.done();
    }

    #[test]
    fn test_read_datetime_with_diagnostics() {
        // OSCF and RTCF set: the read warns but still returns the time.
        let mock = I2cMock::new(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![0x00, 0x30],
                vec![0x00, 0x30, 0x95, 0x14, 0x03, 0x24, 0x04, 0x39],
            ),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00, 0x3F], vec![0x15]),
        ]);
        let mut dev = ISL12026::new(mock);

        let dt = dev.datetime().unwrap();
        assert_eq!(dt, datetime(2024, 3, 14, 15, 30, 0));
        dev.i2c.done();
    }

    #[test]
    fn test_read_datetime_twelve_hour_content() {
        // Hours register with the military flag clear, PM bit set, BCD 3.
        let mock = I2cMock::new(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![0x00, 0x30],
                vec![0x00, 0x00, 0x23, 0x14, 0x03, 0x24, 0x04, 0x39],
            ),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00, 0x3F], vec![0x00]),
        ]);
        let mut dev = ISL12026::new(mock);

        let dt = dev.datetime().unwrap();
        assert_eq!(dt.hour(), 15);
        dev.i2c.done();
    }

    #[test]
    fn test_read_datetime_invalid_date_rejected() {
        // April 31st does not exist; the status read still happens first.
        let mock = I2cMock::new(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![0x00, 0x30],
                vec![0x00, 0x00, 0x80, 0x31, 0x04, 0x24, 0x01, 0x39],
            ),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00, 0x3F], vec![0x00]),
        ]);
        let mut dev = ISL12026::new(mock);

        assert!(matches!(
            dev.datetime(),
            Err(ISL12026Error::Decode(
                ISL12026DateTimeError::InvalidDateTime
            ))
        ));
        dev.i2c.done();
    }

    #[test]
    fn test_set_datetime() {
        let mock = I2cMock::new(&[
            // Unlock: WEL, then WEL and RWEL, as separate writes
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x3F, 0x02]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x3F, 0x06]),
            // Payload covering all eight time registers
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![0x00, 0x30, 0x00, 0x30, 0x95, 0x14, 0x03, 0x24, 0x04, 0x39],
            ),
        ]);
        let mut dev = ISL12026::new(mock);

        dev.set_datetime(&datetime(2024, 3, 14, 15, 30, 0)).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_set_datetime_century_bytes() {
        // 1999-12-31 23:59:59 was a Friday; century byte is BCD(19 + 19).
        let mock = I2cMock::new(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x3F, 0x02]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x3F, 0x06]),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![0x00, 0x30, 0x59, 0x59, 0xA3, 0x31, 0x12, 0x99, 0x05, 0x38],
            ),
        ]);
        let mut dev = ISL12026::new(mock);

        dev.set_datetime(&datetime(1999, 12, 31, 23, 59, 59))
            .unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_set_datetime_unlock_failure_aborts() {
        // The second unlock step fails; the payload write is never issued.
        let mock = I2cMock::new(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x3F, 0x02]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x3F, 0x06]).with_error(ErrorKind::Other),
        ]);
        let mut dev = ISL12026::new(mock);

        assert!(matches!(
            dev.set_datetime(&datetime(2024, 3, 14, 15, 30, 0)),
            Err(ISL12026Error::I2c(_))
        ));
        dev.i2c.done();
    }

    #[test]
    fn test_set_datetime_year_out_of_range_no_bus_traffic() {
        // Encoding fails before anything touches the bus.
        let mock = I2cMock::new(&[]);
        let mut dev = ISL12026::new(mock);

        assert!(matches!(
            dev.set_datetime(&datetime(8100, 1, 1, 0, 0, 0)),
            Err(ISL12026Error::Encode(ISL12026DateTimeError::YearOutOfRange))
        ));
        dev.i2c.done();
    }

    #[test]
    fn test_configure() {
        // The power register write goes through the same unlock protocol.
        let mock = I2cMock::new(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x3F, 0x02]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x3F, 0x06]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x14, 0xC0]),
        ]);
        let mut dev = ISL12026::new(mock);

        dev.configure(&Config::default()).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_configure_failure_is_reported() {
        let mock = I2cMock::new(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x3F, 0x02]).with_error(ErrorKind::Other),
        ]);
        let mut dev = ISL12026::new(mock);

        // The caller sees the error and may choose to continue without the
        // battery power options.
        assert!(matches!(
            dev.configure(&Config::default()),
            Err(ISL12026Error::I2c(_))
        ));
        dev.i2c.done();
    }

    #[test]
    fn test_status() {
        let mock = I2cMock::new(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![0x00, 0x3F],
            vec![0x15],
        )]);
        let mut dev = ISL12026::new(mock);

        let status = dev.status().unwrap();
        assert!(status.oscillator_failed());
        assert!(status.register_write_enable_latch());
        assert!(!status.write_enable_latch());
        assert!(status.power_failed());
        assert_eq!(status.diagnostics().count(), 2);
        dev.i2c.done();
    }

    #[test]
    fn test_register_operations() {
        let mock = I2cMock::new(&[
            // Read the seconds register
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00, 0x30], vec![0x45]),
            // Setting it is a protected write
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x3F, 0x02]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x3F, 0x06]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x30, 0x30]),
            // Read the power register
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00, 0x14], vec![0xC0]),
        ]);
        let mut dev = ISL12026::new(mock);

        let seconds = dev.second().unwrap();
        assert_eq!(seconds.ten_seconds(), 4);
        assert_eq!(seconds.seconds(), 5);
        dev.set_second(Seconds(0x30)).unwrap();

        let power = dev.power().unwrap();
        assert!(power.disable_bus_on_battery());
        assert!(power.battery_switch_mode());
        dev.i2c.done();
    }

    #[test]
    fn test_with_address() {
        let mock = I2cMock::new(&[I2cTrans::write_read(0x57, vec![0x00, 0x3F], vec![0x00])]);
        let mut dev = ISL12026::with_address(mock, 0x57);

        dev.status().unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_release() {
        let mock = I2cMock::new(&[]);
        let dev = ISL12026::new(mock);
        let mut i2c = dev.release();
        i2c.done();
    }
}
