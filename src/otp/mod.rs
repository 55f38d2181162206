//! One-time password slot configuration
//!
//! The OTP application of a YubiKey has two slots, each holding a single
//! credential: a Yubico OTP, an OATH-HOTP or static password typed over the
//! keyboard interface, or an HMAC-SHA1 challenge-response secret.
//!
//! A slot is programmed by sending it a fixed-size record. The record is
//! assembled with a [`ConfigurationBuilder`], or with one of the
//! [`SlotConfiguration`] presets which pick the right flags for each
//! credential type:
//!
//! ```
//! use yubikey_config::otp::{Slot, SlotConfiguration};
//!
//! let config = SlotConfiguration::hmac_sha1(b"0123456789abcdef0123", true)?;
//! let record = config.build();
//!
//! assert_eq!(config.command(Slot::Two), 0x03);
//! assert_eq!(record.len(), 58);
//! # Ok::<(), yubikey_config::Error>(())
//! ```

mod builder;
mod flags;
pub mod layout;
mod record;
mod slot_config;

pub use self::{
    builder::{ConfigurationBuilder, KeyMode, Record},
    flags::{ConfigFlags, ExtendedFlags, TicketFlags},
    record::SlotRecord,
    slot_config::SlotConfiguration,
};

use crate::{Error, Result};
use std::{
    fmt::{self, Display},
    str::FromStr,
};

/// YubiKey OTP Applet ID
pub const APPLET_ID: &[u8] = &[0xa0, 0x00, 0x00, 0x05, 0x27, 0x20, 0x01, 0x01];

/// OTP slots
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Slot {
    /// First slot (short touch)
    One,

    /// Second slot (long touch)
    Two,
}

impl Slot {
    /// Command code which writes a new configuration to this slot
    pub fn configure_command(self) -> u8 {
        match self {
            Slot::One => 0x01,
            Slot::Two => 0x03,
        }
    }

    /// Command code which updates the configuration stored in this slot
    pub fn update_command(self) -> u8 {
        match self {
            Slot::One => 0x04,
            Slot::Two => 0x05,
        }
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::One => f.write_str("1"),
            Slot::Two => f.write_str("2"),
        }
    }
}

impl FromStr for Slot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "1" => Ok(Slot::One),
            "2" => Ok(Slot::Two),
            _ => Err(Error::ParseError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_commands() {
        assert_eq!(Slot::One.configure_command(), 0x01);
        assert_eq!(Slot::Two.configure_command(), 0x03);
        assert_eq!(Slot::One.update_command(), 0x04);
        assert_eq!(Slot::Two.update_command(), 0x05);
    }

    #[test]
    fn slot_from_str() {
        assert_eq!("1".parse::<Slot>().unwrap(), Slot::One);
        assert_eq!("2".parse::<Slot>().unwrap(), Slot::Two);
        assert_eq!("3".parse::<Slot>(), Err(Error::ParseError));
        assert_eq!(Slot::Two.to_string(), "2");
    }
}
