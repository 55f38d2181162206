//! Management application: device information and configuration
//!
//! The management application reports what a YubiKey is (firmware version,
//! serial number, form factor, which capabilities each transport supports)
//! and holds the part of its configuration which can be changed: which
//! capabilities are enabled, timeouts, and device flags.
//!
//! Both travel as TLV payloads preceded by a single length byte.

// Adapted from yubikit-android:
// <https://github.com/Yubico/yubikit-android/>
//
// Copyright (C) 2020-2022 Yubico.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//       http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod device_config;
mod device_info;

pub use self::{
    device_config::{DeviceConfig, DeviceConfigBuilder, LOCK_CODE_SIZE},
    device_info::DeviceInfo,
};

use crate::{Error, Result};
use bitflags::bitflags;
use std::{
    fmt::{self, Display},
    str::FromStr,
};

/// Management Application ID
pub const APPLET_ID: &[u8] = &[0xa0, 0x00, 0x00, 0x05, 0x27, 0x47, 0x11, 0x17];

pub(crate) const TAG_USB_SUPPORTED: u32 = 0x01;
pub(crate) const TAG_SERIAL_NUMBER: u32 = 0x02;
pub(crate) const TAG_USB_ENABLED: u32 = 0x03;
pub(crate) const TAG_FORM_FACTOR: u32 = 0x04;
pub(crate) const TAG_FIRMWARE_VERSION: u32 = 0x05;
pub(crate) const TAG_AUTO_EJECT_TIMEOUT: u32 = 0x06;
pub(crate) const TAG_CHALLENGE_RESPONSE_TIMEOUT: u32 = 0x07;
pub(crate) const TAG_DEVICE_FLAGS: u32 = 0x08;
pub(crate) const TAG_CONFIG_LOCK: u32 = 0x0a;
pub(crate) const TAG_UNLOCK: u32 = 0x0b;
pub(crate) const TAG_REBOOT: u32 = 0x0c;
pub(crate) const TAG_NFC_SUPPORTED: u32 = 0x0d;
pub(crate) const TAG_NFC_ENABLED: u32 = 0x0e;

/// YubiKey Serial Number
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Serial(pub u32);

impl From<u32> for Serial {
    fn from(num: u32) -> Serial {
        Serial(num)
    }
}

impl From<Serial> for u32 {
    fn from(serial: Serial) -> u32 {
        serial.0
    }
}

impl Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Serial {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        u32::from_str(s.trim())
            .map(Serial)
            .map_err(|_| Error::ParseError)
    }
}

/// Physical interface a YubiKey is reached through
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Transport {
    /// USB
    Usb,

    /// NFC
    Nfc,
}

impl Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transport::Usb => "USB",
            Transport::Nfc => "NFC",
        })
    }
}

bitflags! {
    /// Applications a YubiKey can expose over a transport
    #[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
    pub struct Capability: u32 {
        /// Yubico OTP and the other slot credentials
        const OTP = 0x01;

        /// FIDO U2F
        const U2F = 0x02;

        /// OpenPGP card
        const OPENPGP = 0x08;

        /// Personal Identity Verification (PIV) card
        const PIV = 0x10;

        /// OATH TOTP/HOTP
        const OATH = 0x20;

        /// YubiHSM Auth
        const HSMAUTH = 0x100;

        /// FIDO2 / CTAP2
        const FIDO2 = 0x200;
    }
}

impl Capability {
    /// Names of the known capabilities set in `self`
    pub fn names(self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

bitflags! {
    /// Device-wide behavior flags
    #[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
    pub struct DeviceFlags: u32 {
        /// Allow the device to wake the host
        const REMOTE_WAKEUP = 0x40;

        /// CCID eject support
        const EJECT = 0x80;
    }
}

/// Physical form factor of a YubiKey
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum FormFactor {
    /// Unknown or unreported
    Unknown,

    /// USB-A keychain
    UsbAKeychain,

    /// USB-A nano
    UsbANano,

    /// USB-C keychain
    UsbCKeychain,

    /// USB-C nano
    UsbCNano,

    /// USB-C and Lightning
    UsbCLightning,

    /// USB-A with fingerprint reader
    UsbABio,

    /// USB-C with fingerprint reader
    UsbCBio,
}

impl FormFactor {
    /// Decode the form factor from the low nibble of `code`.
    ///
    /// The high bits carry unrelated device attributes and are ignored.
    pub fn from_code(code: u32) -> Self {
        match code & 0x0f {
            0x01 => FormFactor::UsbAKeychain,
            0x02 => FormFactor::UsbANano,
            0x03 => FormFactor::UsbCKeychain,
            0x04 => FormFactor::UsbCNano,
            0x05 => FormFactor::UsbCLightning,
            0x06 => FormFactor::UsbABio,
            0x07 => FormFactor::UsbCBio,
            _ => FormFactor::Unknown,
        }
    }

    /// Code of this form factor
    pub fn code(self) -> u8 {
        match self {
            FormFactor::Unknown => 0x00,
            FormFactor::UsbAKeychain => 0x01,
            FormFactor::UsbANano => 0x02,
            FormFactor::UsbCKeychain => 0x03,
            FormFactor::UsbCNano => 0x04,
            FormFactor::UsbCLightning => 0x05,
            FormFactor::UsbABio => 0x06,
            FormFactor::UsbCBio => 0x07,
        }
    }
}

impl Display for FormFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FormFactor::Unknown => "Unknown",
            FormFactor::UsbAKeychain => "Keychain (USB-A)",
            FormFactor::UsbANano => "Nano (USB-A)",
            FormFactor::UsbCKeychain => "Keychain (USB-C)",
            FormFactor::UsbCNano => "Nano (USB-C)",
            FormFactor::UsbCLightning => "Keychain (USB-C, Lightning)",
            FormFactor::UsbABio => "Bio (USB-A)",
            FormFactor::UsbCBio => "Bio (USB-C)",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_factor_ignores_high_bits() {
        assert_eq!(FormFactor::from_code(0x03), FormFactor::UsbCKeychain);
        assert_eq!(FormFactor::from_code(0x83), FormFactor::UsbCKeychain);
        assert_eq!(FormFactor::from_code(0x41), FormFactor::UsbAKeychain);
        assert_eq!(FormFactor::from_code(0x0c), FormFactor::Unknown);
        assert_eq!(FormFactor::UsbCBio.code(), 0x07);
    }

    #[test]
    fn serial_from_str() {
        assert_eq!("12345678".parse::<Serial>(), Ok(Serial(12345678)));
        assert_eq!("-1".parse::<Serial>(), Err(Error::ParseError));
        assert_eq!(Serial(42).to_string(), "42");
    }

    #[test]
    fn capability_names() {
        let caps = Capability::from_bits_retain(0x0211 | 0x1000);
        assert_eq!(caps.names(), ["OTP", "PIV", "FIDO2"]);
        assert!(caps.contains(Capability::PIV));
    }

    #[test]
    fn transports_are_ordered() {
        assert!(Transport::Usb < Transport::Nfc);
        assert_eq!(Transport::Nfc.to_string(), "NFC");
    }
}
