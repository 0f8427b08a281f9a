//! Write-unlock sequencing for the ISL12026 clock/control registers.
//!
//! The chip ignores plain writes to its clock/control registers. Every write
//! must be preceded by two status register writes: one setting the write
//! enable latch (WEL), then one setting the register write enable latch
//! (RWEL) on top of it. Only after both latches are armed does the payload
//! write take effect.
//!
//! [`UnlockSequence`] captures that protocol as an iterator over the exact
//! bus writes, in order. Each item must be issued as its own transaction;
//! the latches only arm across transaction boundaries.

use crate::{REG_ADDR_MSB, RegAddr, Status};

static WEL_STEP: [u8; 3] = [REG_ADDR_MSB, RegAddr::Status as u8, Status::WEL];
static RWEL_STEP: [u8; 3] = [REG_ADDR_MSB, RegAddr::Status as u8, Status::WEL | Status::RWEL];

#[derive(Debug, Copy, Clone, PartialEq)]
enum State {
    Idle,
    WelSet,
    RwelSet,
    Written,
}

/// Iterator over the bus writes of one protected register write.
///
/// Yields the WEL step, the RWEL step, then the caller's payload (a complete
/// transfer starting with the 2-byte register address). A sequence is single
/// use: abandoning it mid-way leaves the latches wherever the issued steps
/// put them, and a retry starts over with a fresh sequence.
pub(crate) struct UnlockSequence<'a> {
    payload: &'a [u8],
    state: State,
}

impl<'a> UnlockSequence<'a> {
    pub(crate) fn new(payload: &'a [u8]) -> Self {
        Self {
            payload,
            state: State::Idle,
        }
    }
}

impl<'a> Iterator for UnlockSequence<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        match self.state {
            State::Idle => {
                self.state = State::WelSet;
                Some(&WEL_STEP)
            }
            State::WelSet => {
                self.state = State::RwelSet;
                Some(&RWEL_STEP)
            }
            State::RwelSet => {
                self.state = State::Written;
                Some(self.payload)
            }
            State::Written => None,
        }
    }
}
