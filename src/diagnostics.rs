//! Status diagnostics for the ISL12026 RTC.
//!
//! The status register carries two sticky failure flags next to the write
//! latches: oscillator failure (OSCF) and total power failure (RTCF). This
//! module turns a status read into the conditions worth reporting, so the
//! driver can warn about them without failing a time read.

use crate::Status;

/// A reportable condition from the status register.
///
/// Diagnostics are warnings rather than errors. A chip reporting one still
/// answers reads; the time it returns just should not be trusted until the
/// cause is addressed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Diagnostic {
    /// The oscillator is not running, so the time does not advance.
    OscillatorFailure,
    /// Both supplies failed at some point; the time is meaningless until it
    /// is written again.
    PowerInterrupted,
}

impl Diagnostic {
    /// Human-readable description, suitable for log output.
    pub fn message(self) -> &'static str {
        match self {
            Diagnostic::OscillatorFailure => "the oscillator is not operating",
            Diagnostic::PowerInterrupted => {
                "power was interrupted, set the time before trusting the clock"
            }
        }
    }
}

impl Status {
    /// Returns the diagnostics raised by this status value, oscillator
    /// failure first.
    ///
    /// The write-enable latches are not diagnostics; they only reflect where
    /// the unlock sequence last left the chip.
    pub fn diagnostics(self) -> impl Iterator<Item = Diagnostic> {
        [
            self.oscillator_failed().then_some(Diagnostic::OscillatorFailure),
            self.power_failed().then_some(Diagnostic::PowerInterrupted),
        ]
        .into_iter()
        .flatten()
    }
}
