//! Async implementation of the ISL12026 driver.
//!
//! This module provides an async interface to the ISL12026 RTC device using
//! `embedded-hal-async` traits. It is only available when the `async` feature
//! is enabled.
//!
//! # Example
//!
//! ```rust,ignore
//! use isl12026::asynch::ISL12026;
//!
//! // Initialize device
//! let mut rtc = ISL12026::new(i2c);
//!
//! // Configure asynchronously
//! rtc.configure(&config).await?;
//!
//! // Get current date/time asynchronously
//! let datetime = rtc.datetime().await?;
//! ```

use chrono::NaiveDateTime;
use embedded_hal_async::i2c::I2c;
use paste::paste;

use crate::{
    Config, DEVICE_ADDRESS, Date, DayOfWeek, Hours, ISL12026DateTime, ISL12026Error, Minutes,
    Month, Power, REG_ADDR_MSB, RegAddr, Seconds, Status, UnlockSequence, Y2k, Year,
};

/// ISL12026 Real-Time Clock async driver.
///
/// This struct provides the async interface to the ISL12026 RTC device.
/// It supports async I2C operations through the `embedded-hal-async` traits.
pub struct ISL12026<I2C: I2c> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> ISL12026<I2C> {
    /// Creates a new ISL12026 async driver instance at the chip's fixed
    /// address.
    ///
    /// # Arguments
    /// * `i2c` - The async I2C bus implementation
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
    async fn read_regs(
        &mut self,
        reg: RegAddr,
        buf: &mut [u8],
    ) -> Result<(), ISL12026Error<I2C::Error>> {
        self.i2c
            .write_read(self.address, &[REG_ADDR_MSB, reg as u8], buf)
            .await?;
        Ok(())
    }

    /// Performs one protected write.
    ///
    /// `payload` is a complete transfer starting with the 2-byte register
    /// address. The two latch-arming writes and the payload each go out as
    /// separate transactions; a failed step aborts the sequence with the
    /// remaining steps unsent.
    async fn write_ccr(&mut self, payload: &[u8]) -> Result<(), ISL12026Error<I2C::Error>> {
        for step in UnlockSequence::new(payload) {
            self.i2c.write(self.address, step).await?;
        }
        Ok(())
    }

    /// Performs a protected write of a single register.
    async fn write_ccr_reg(
        &mut self,
        reg: RegAddr,
        value: u8,
    ) -> Result<(), ISL12026Error<I2C::Error>> {
        self.write_ccr(&[REG_ADDR_MSB, reg as u8, value]).await
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
    pub async fn configure(&mut self, config: &Config) -> Result<(), ISL12026Error<I2C::Error>> {
        let mut power = Power::default();
        power.set_disable_bus_on_battery(config.disable_bus_on_battery);
        power.set_battery_switch_mode(config.battery_switch_mode);
        if let Err(e) = self.write_ccr_reg(RegAddr::Power, power.into()).await {
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
    /// reported as warnings and do not fail the read.
    ///
    /// # Returns
    /// * `Ok(NaiveDateTime)` - The current date and time
    /// * `Err(ISL12026Error)` on error
    pub async fn datetime(&mut self) -> Result<NaiveDateTime, ISL12026Error<I2C::Error>> {
        let mut data = [0; 8];
        self.read_regs(RegAddr::Seconds, &mut data).await?;
        let raw = ISL12026DateTime::from(data);

        // The status register is not adjacent to the time block and needs its
        // own transaction.
        let status = self.status().await?;
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
    pub async fn set_datetime(
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
        .await
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
    pub async fn status(&mut self) -> Result<Status, ISL12026Error<I2C::Error>> {
        let mut data = [0];
        self.read_regs(RegAddr::Status, &mut data).await?;
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
                    pub async fn $name(&mut self) -> Result<$typ, ISL12026Error<I2C::Error>> {
                        let mut data = [0];
                        self.read_regs($regaddr, &mut data).await?;
                        Ok($typ(data[0]))
                    }

                    #[doc = concat!("Sets the value of the ", stringify!($name), " register with a protected write.")]
                    #[doc = "\n\n# Arguments"]
                    #[doc = concat!("* `value` - The value to write to the ", stringify!($name), " register")]
                    #[doc = "\n\n# Returns"]
                    #[doc = "* `Ok(())` on success"]
                    #[doc = "* `Err(ISL12026Error)` on error"]
                    pub async fn [<set_ $name>](&mut self, value: $typ) -> Result<(), ISL12026Error<I2C::Error>> {
                        self.write_ccr_reg($regaddr, value.into()).await
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

    async fn setup_mock(expectations: &[I2cTrans]) -> I2cMock {
        I2cMock::new(expectations)
    }

    #[tokio::test]
    async fn test_async_read_datetime() {
        let mock = setup_mock(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![0x00, 0x30],
                vec![0x00, 0x30, 0x95, 0x14, 0x03, 0x24, 0x04, 0x39],
            ),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00, 0x3F], vec![0x00]),
        ])
        .await;
        let mut dev = ISL12026::new(mock);

        let dt = dev.datetime().await.unwrap();
        assert_eq!(dt.hour(), 15);
        assert_eq!(dt.minute(), 30);
        assert_eq!(dt.second(), 0);
        assert_eq!(dt.day(), 14);
        assert_eq!(dt.month(), 3);
        assert_eq!(dt.year(), 2024);
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_set_datetime() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();

        let mock = setup_mock(&[
            // Unlock steps, each its own transaction
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x3F, 0x02]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x3F, 0x06]),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![0x00, 0x30, 0x00, 0x30, 0x95, 0x14, 0x03, 0x24, 0x04, 0x39],
            ),
        ])
        .await;
        let mut dev = ISL12026::new(mock);

        dev.set_datetime(&dt).await.unwrap();
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_configure() {
        let mock = setup_mock(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x3F, 0x02]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x3F, 0x06]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x14, 0xC0]),
        ])
        .await;
        let mut dev = ISL12026::new(mock);

        dev.configure(&Config::default()).await.unwrap();
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_unlock_failure_aborts() {
        let mock = setup_mock(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x3F, 0x02]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x3F, 0x06]).with_error(ErrorKind::Other),
        ])
        .await;
        let mut dev = ISL12026::new(mock);

        let dt = NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        assert!(matches!(
            dev.set_datetime(&dt).await,
            Err(ISL12026Error::I2c(_))
        ));
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_status() {
        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![0x00, 0x3F],
            vec![0x15],
        )])
        .await;
        let mut dev = ISL12026::new(mock);

        let status = dev.status().await.unwrap();
        assert!(status.oscillator_failed());
        assert!(status.power_failed());
        assert_eq!(status.diagnostics().count(), 2);
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_register_operations() {
        let mock = setup_mock(&[
            // Test second register
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00, 0x30], vec![0x45]),
            // Setting it runs the full unlock protocol
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x3F, 0x02]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x3F, 0x06]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x30, 0x30]),
            // Test power register
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00, 0x14], vec![0x80]),
        ])
        .await;
        let mut dev = ISL12026::new(mock);

        let seconds = dev.second().await.unwrap();
        assert_eq!(seconds.seconds(), 5);
        assert_eq!(seconds.ten_seconds(), 4);
        dev.set_second(Seconds(0x30)).await.unwrap();

        let power = dev.power().await.unwrap();
        assert!(power.disable_bus_on_battery());
        assert!(!power.battery_switch_mode());

        dev.i2c.done();
    }
}
